//! Ordered bring-up of the whole arena network.
//!
//! One pass walks `Init -> AdminUp -> TeamsUp -> DhcpConfigured ->
//! FirewallConfigured -> Ready`. The first failing step aborts the pass;
//! nothing after it is attempted, and there is no rollback. A re-run is
//! expected to converge, since every step clears before setting.

use std::fmt;
use std::sync::Arc;

use tracing::{error, info};

use fieldnet_common::{FieldNetError, FieldNetResult};

use crate::dhcp::DhcpService;
use crate::firewall::FirewallService;
use crate::ip_operations::NetIf;
use crate::types::{AdminNetwork, ArenaNetwork, TeamNetwork};

/// A failable step of the bring-up sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BringUpStep {
    AdminUp,
    TeamsUp,
    DhcpConfigured,
    FirewallConfigured,
}

impl BringUpStep {
    pub fn name(&self) -> &'static str {
        match self {
            BringUpStep::AdminUp => "AdminUp",
            BringUpStep::TeamsUp => "TeamsUp",
            BringUpStep::DhcpConfigured => "DhcpConfigured",
            BringUpStep::FirewallConfigured => "FirewallConfigured",
        }
    }
}

impl fmt::Display for BringUpStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Where a bring-up pass currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BringUpState {
    Init,
    AdminUp,
    TeamsUp,
    DhcpConfigured,
    FirewallConfigured,
    Ready,
    Aborted(BringUpStep),
}

/// Drives the activation sequence over the collaborator seams.
pub struct NetworkBringUp {
    netif: Arc<dyn NetIf>,
    dhcp: DhcpService,
    firewall: FirewallService,
    state: BringUpState,
    visited: Vec<BringUpState>,
}

impl NetworkBringUp {
    pub fn new(netif: Arc<dyn NetIf>, dhcp: DhcpService, firewall: FirewallService) -> Self {
        Self {
            netif,
            dhcp,
            firewall,
            state: BringUpState::Init,
            visited: vec![BringUpState::Init],
        }
    }

    pub fn state(&self) -> BringUpState {
        self.state
    }

    /// Every state entered so far, in order.
    pub fn visited(&self) -> &[BringUpState] {
        &self.visited
    }

    /// Runs the full sequence.
    ///
    /// Holds the orchestrator exclusively for the duration of the pass, so
    /// two passes cannot interleave.
    pub async fn up(&mut self, net: &ArenaNetwork) -> FieldNetResult<()> {
        info!("bringing arena network up");

        self.enter(BringUpState::AdminUp);
        info!("configuring admin network");
        if let Err(cause) = self.admin_up(&net.admin).await {
            return Err(self.abort(BringUpStep::AdminUp, cause));
        }

        self.enter(BringUpState::TeamsUp);
        info!("configuring team networks");
        if let Err(cause) = self.teams_up(&net.teams).await {
            return Err(self.abort(BringUpStep::TeamsUp, cause));
        }

        self.enter(BringUpState::DhcpConfigured);
        info!("configuring DHCP");
        if let Err(cause) = self.dhcp.configure(net).await {
            return Err(self.abort(BringUpStep::DhcpConfigured, cause));
        }

        self.enter(BringUpState::FirewallConfigured);
        info!("configuring firewall");
        if let Err(cause) = self.firewall.apply(net).await {
            return Err(self.abort(BringUpStep::FirewallConfigured, cause));
        }

        self.enter(BringUpState::Ready);
        info!("arena network is up");
        Ok(())
    }

    fn enter(&mut self, state: BringUpState) {
        self.state = state;
        self.visited.push(state);
    }

    fn abort(&mut self, step: BringUpStep, cause: FieldNetError) -> FieldNetError {
        error!(step = step.name(), error = %cause, "bring-up aborted");
        self.state = BringUpState::Aborted(step);
        self.visited.push(self.state);
        FieldNetError::aborted(step.name(), cause)
    }

    async fn admin_up(&self, admin: &AdminNetwork) -> FieldNetResult<()> {
        info!(network = %admin, "admin network going up");
        self.netif.clear_addresses(&admin.iface).await?;
        // Router first, then the server alias the driver stations expect.
        self.netif
            .add_address(&admin.iface, admin.router_cidr())
            .await?;
        self.netif
            .add_address(&admin.iface, admin.server_cidr())
            .await?;
        Ok(())
    }

    async fn teams_up(&self, teams: &[TeamNetwork]) -> FieldNetResult<()> {
        for team in teams {
            info!(network = %team, "team network going up");
            self.netif.clear_addresses(&team.iface).await?;
            if let Some(cidr) = team.router_cidr() {
                self.netif.add_address(&team.iface, cidr).await?;
            }
        }
        Ok(())
    }
}
