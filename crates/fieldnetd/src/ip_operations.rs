//! Interface address operations through iproute2.
//!
//! The bring-up pass only ever clears a whole interface and adds CIDR
//! entries, so that is the entire collaborator surface.

use async_trait::async_trait;
use ipnetwork::Ipv4Network;
use tracing::{debug, info};

use fieldnet_common::danger::SafetyGate;
use fieldnet_common::shell::{self, IP_CMD};
use fieldnet_common::{FieldNetError, FieldNetResult};

use crate::types::LinkHandle;

/// Host network-interface service.
#[async_trait]
pub trait NetIf: Send + Sync {
    /// Whether an interface with this name exists.
    async fn exists(&self, name: &str) -> bool;

    /// Resolves an interface name to a handle.
    async fn lookup(&self, name: &str) -> FieldNetResult<LinkHandle>;

    /// Removes every address currently assigned to the interface.
    async fn clear_addresses(&self, link: &LinkHandle) -> FieldNetResult<()>;

    /// Adds one CIDR entry to the interface.
    async fn add_address(&self, link: &LinkHandle, cidr: Ipv4Network) -> FieldNetResult<()>;
}

/// Production implementation driving `/sbin/ip`.
pub struct SysNetIf {
    gate: SafetyGate,
}

impl SysNetIf {
    pub fn new(gate: SafetyGate) -> Self {
        Self { gate }
    }
}

/// Build the link listing command used for lookups.
fn build_show_link_cmd(name: &str) -> String {
    format!("{} -o link show dev {}", IP_CMD, shell::shellquote(name))
}

/// Build the address flush command.
fn build_flush_cmd(name: &str) -> String {
    format!("{} address flush dev {}", IP_CMD, shell::shellquote(name))
}

/// Build the address add command.
fn build_add_addr_cmd(cidr: &Ipv4Network, name: &str) -> String {
    format!(
        "{} address add {} dev {}",
        IP_CMD,
        shell::shellquote(&cidr.to_string()),
        shell::shellquote(name)
    )
}

/// `ip -o link show` prints "3: eth2: <BROADCAST,...>"; the leading field is
/// the kernel link index.
fn parse_link_index(line: &str) -> Option<u32> {
    line.split(':').next()?.trim().parse().ok()
}

#[async_trait]
impl NetIf for SysNetIf {
    async fn exists(&self, name: &str) -> bool {
        self.lookup(name).await.is_ok()
    }

    async fn lookup(&self, name: &str) -> FieldNetResult<LinkHandle> {
        let out = match shell::exec_or_throw(&build_show_link_cmd(name)).await {
            Ok(out) => out,
            Err(_) => return Err(FieldNetError::link_not_found(name)),
        };

        let index = parse_link_index(&out).ok_or_else(|| {
            FieldNetError::internal(format!("unparseable link listing for '{name}': {out}"))
        })?;

        Ok(LinkHandle::new(name, index))
    }

    async fn clear_addresses(&self, link: &LinkHandle) -> FieldNetResult<()> {
        if !self.gate.is_armed() {
            info!(iface = %link.name(), "dry run: would flush interface addresses");
            return Ok(());
        }

        debug!(iface = %link.name(), "flushing interface addresses");
        shell::exec_or_throw(&build_flush_cmd(link.name()))
            .await
            .map(|_| ())
            .map_err(|e| FieldNetError::interface_mutation(link.name(), "flush", e))
    }

    async fn add_address(&self, link: &LinkHandle, cidr: Ipv4Network) -> FieldNetResult<()> {
        if !self.gate.is_armed() {
            info!(iface = %link.name(), %cidr, "dry run: would add address");
            return Ok(());
        }

        debug!(iface = %link.name(), %cidr, "adding address");
        shell::exec_or_throw(&build_add_addr_cmd(&cidr, link.name()))
            .await
            .map(|_| ())
            .map_err(|e| FieldNetError::interface_mutation(link.name(), "add", e))
    }
}
