//! DHCP service configuration and reload.
//!
//! The reload sequence is stop, patch the main config include, restart,
//! settle, verify. The daemon only reads its config while starting, and the
//! service manager reports "started" before the listening socket is bound,
//! so both the step order and the settle wait are load-bearing.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use fieldnet_common::danger::SafetyGate;
use fieldnet_common::shell::{self, SYSTEMCTL_CMD};
use fieldnet_common::{FieldNetError, FieldNetResult};

use crate::render;
use crate::tables::{
    ACTIVE_STATE_OK, ACTIVE_STATE_PROPERTY, DHCP_CONF_FILE, DHCP_MASTER_CONF_FILE,
    DHCP_SETTLE_DELAY, DHCP_UNIT,
};
use crate::types::ArenaNetwork;

/// Process/service-manager surface used by the reload sequence.
#[async_trait]
pub trait ServiceManager: Send + Sync {
    /// Stops the unit and waits for the manager to finish the job.
    async fn stop(&self, unit: &str) -> FieldNetResult<()>;

    /// Starts or restarts the unit and waits for the manager to finish the job.
    async fn restart(&self, unit: &str) -> FieldNetResult<()>;

    /// Reads one unit property.
    async fn get_property(&self, unit: &str, key: &str) -> FieldNetResult<String>;
}

/// systemctl-backed implementation.
///
/// `systemctl stop` and `systemctl restart` block until systemd has finished
/// the queued job, which is the completion signal the sequence relies on.
pub struct SystemCtl {
    gate: SafetyGate,
}

impl SystemCtl {
    pub fn new(gate: SafetyGate) -> Self {
        Self { gate }
    }
}

#[async_trait]
impl ServiceManager for SystemCtl {
    async fn stop(&self, unit: &str) -> FieldNetResult<()> {
        if !self.gate.is_armed() {
            info!(unit, "dry run: would stop unit");
            return Ok(());
        }
        let cmd = format!("{} stop {}", SYSTEMCTL_CMD, shell::shellquote(unit));
        shell::exec_or_throw(&cmd)
            .await
            .map(|_| ())
            .map_err(|e| FieldNetError::service_control(unit, "stop", e))
    }

    async fn restart(&self, unit: &str) -> FieldNetResult<()> {
        if !self.gate.is_armed() {
            info!(unit, "dry run: would restart unit");
            return Ok(());
        }
        let cmd = format!("{} restart {}", SYSTEMCTL_CMD, shell::shellquote(unit));
        shell::exec_or_throw(&cmd)
            .await
            .map(|_| ())
            .map_err(|e| FieldNetError::service_control(unit, "restart", e))
    }

    async fn get_property(&self, unit: &str, key: &str) -> FieldNetResult<String> {
        if !self.gate.is_armed() {
            // The unit was never really restarted; report it healthy so a
            // dry run takes the same path as a production run.
            info!(unit, key, "dry run: reporting unit property as nominal");
            return Ok(ACTIVE_STATE_OK.to_string());
        }
        let cmd = format!(
            "{} show -p {} --value {}",
            SYSTEMCTL_CMD,
            shell::shellquote(key),
            shell::shellquote(unit)
        );
        shell::exec_or_throw(&cmd)
            .await
            .map(|out| out.trim().to_string())
            .map_err(|e| FieldNetError::service_control(unit, "show", e))
    }
}

/// Writes the generated DHCP configuration and drives the reload sequence.
pub struct DhcpService {
    svc: Arc<dyn ServiceManager>,
    gate: SafetyGate,
    conf_path: PathBuf,
    master_conf_path: PathBuf,
    settle: Duration,
}

impl DhcpService {
    pub fn new(svc: Arc<dyn ServiceManager>, gate: SafetyGate) -> Self {
        Self {
            svc,
            gate,
            conf_path: DHCP_CONF_FILE.into(),
            master_conf_path: DHCP_MASTER_CONF_FILE.into(),
            settle: DHCP_SETTLE_DELAY,
        }
    }

    /// Redirects the config files, for tests.
    pub fn with_paths(mut self, conf: impl Into<PathBuf>, master: impl Into<PathBuf>) -> Self {
        self.conf_path = conf.into();
        self.master_conf_path = master.into();
        self
    }

    /// Overrides the settle delay, for tests.
    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    /// Renders the configuration for the arena model, installs it and
    /// reloads the DHCP daemon.
    pub async fn configure(&self, net: &ArenaNetwork) -> FieldNetResult<()> {
        info!("generating DHCP configuration");
        let conf = render::render_dhcp_conf(net);
        self.write_conf(&conf)?;
        self.reload().await?;
        info!("DHCP service is up");
        Ok(())
    }

    fn write_conf(&self, text: &str) -> FieldNetResult<()> {
        if !self.gate.is_armed() {
            info!(path = %self.conf_path.display(), "dry run: would write DHCP configuration");
            return Ok(());
        }
        fs::write(&self.conf_path, text).map_err(|e| FieldNetError::io(&self.conf_path, e))
    }

    async fn reload(&self) -> FieldNetResult<()> {
        info!("stopping DHCP service");
        self.svc.stop(DHCP_UNIT).await?;

        self.ensure_master_include();

        info!("starting DHCP service");
        self.svc.restart(DHCP_UNIT).await?;

        // "started" from the manager does not yet mean dhcpd has read the
        // new config and bound its sockets.
        tokio::time::sleep(self.settle).await;

        debug!("checking DHCP service state");
        let state = self
            .svc
            .get_property(DHCP_UNIT, ACTIVE_STATE_PROPERTY)
            .await?;
        if state != ACTIVE_STATE_OK {
            return Err(FieldNetError::ServiceNotActive {
                unit: DHCP_UNIT.to_string(),
                state,
            });
        }
        Ok(())
    }

    /// First-run convenience: make sure the daemon's main config includes
    /// the generated file. Failures are logged and skipped; an operator can
    /// add the line by hand.
    fn ensure_master_include(&self) {
        if !self.gate.is_armed() {
            debug!(path = %self.master_conf_path.display(), "dry run: would check master config include");
            return;
        }

        let include_line = format!("include \"{}\";", self.conf_path.display());

        let content = match fs::read_to_string(&self.master_conf_path) {
            Ok(content) => content,
            Err(e) => {
                warn!(
                    path = %self.master_conf_path.display(),
                    error = %e,
                    "cannot check DHCP master config"
                );
                return;
            }
        };
        if content.contains(&include_line) {
            return;
        }

        let appended = OpenOptions::new()
            .append(true)
            .open(&self.master_conf_path)
            .and_then(|mut f| writeln!(f, "\n# Automatically added by fieldnetd\n{include_line}"));
        match appended {
            Ok(()) => info!(
                path = %self.master_conf_path.display(),
                "added include for the generated DHCP configuration"
            ),
            Err(e) => warn!(
                path = %self.master_conf_path.display(),
                error = %e,
                "cannot append to DHCP master config"
            ),
        }
    }
}
