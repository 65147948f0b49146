//! Firewall configuration: IP forwarding plus a wholesale iptables restore.
//!
//! The ruleset is replaced in one shot via `iptables-restore` rather than
//! edited incrementally, so a re-run converges no matter what the previous
//! pass left behind.

use std::io::Write;
use std::sync::Arc;

use async_trait::async_trait;
use tempfile::NamedTempFile;
use tokio::process::Command;
use tracing::{debug, info};

use fieldnet_common::danger::SafetyGate;
use fieldnet_common::shell::{ExecResult, IPTABLES_RESTORE_CMD, SYSCTL_CMD};
use fieldnet_common::{FieldNetError, FieldNetResult};

use crate::render;
use crate::tables::{FIREWALL_RULES_PREFIX, FIREWALL_RULES_SUFFIX};
use crate::types::ArenaNetwork;

/// External command execution with inherited environment.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, program: &str, args: &[&str]) -> FieldNetResult<ExecResult>;
}

/// Spawns the real processes. A disarmed gate turns every invocation into a
/// logged success.
pub struct SysCommandRunner {
    gate: SafetyGate,
}

impl SysCommandRunner {
    pub fn new(gate: SafetyGate) -> Self {
        Self { gate }
    }
}

#[async_trait]
impl CommandRunner for SysCommandRunner {
    async fn run(&self, program: &str, args: &[&str]) -> FieldNetResult<ExecResult> {
        if !self.gate.is_armed() {
            info!(program, ?args, "dry run: would run command");
            return Ok(ExecResult {
                exit_code: 0,
                stdout: String::new(),
                stderr: String::new(),
            });
        }

        debug!(program, ?args, "running command");
        let output = Command::new(program)
            .args(args)
            .output()
            .await
            .map_err(|e| FieldNetError::ShellExec {
                command: display_cmd(program, args),
                source: e,
            })?;

        Ok(ExecResult {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

fn display_cmd(program: &str, args: &[&str]) -> String {
    if args.is_empty() {
        program.to_string()
    } else {
        format!("{} {}", program, args.join(" "))
    }
}

/// Renders the ruleset for an arena model and loads it into the firewall.
pub struct FirewallService {
    runner: Arc<dyn CommandRunner>,
}

impl FirewallService {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    pub async fn apply(&self, net: &ArenaNetwork) -> FieldNetResult<()> {
        info!("generating firewall ruleset");
        let rules = render::render_firewall_rules(net);
        let file = self.write_rules(&rules)?;
        info!(path = %file.path().display(), "firewall ruleset file");

        // Forwarding between the station subnets and the admin network is
        // off on a stock host.
        self.run_checked(SYSCTL_CMD, &["-q", "net.ipv4.ip_forward=1"])
            .await?;

        let path = file.path().to_string_lossy().into_owned();
        self.run_checked(IPTABLES_RESTORE_CMD, &[path.as_str()])
            .await?;

        info!("firewall ruleset applied");
        Ok(())
    }

    fn write_rules(&self, rules: &str) -> FieldNetResult<NamedTempFile> {
        let mut file = tempfile::Builder::new()
            .prefix(FIREWALL_RULES_PREFIX)
            .suffix(FIREWALL_RULES_SUFFIX)
            .tempfile()
            .map_err(|e| FieldNetError::io(std::env::temp_dir(), e))?;
        file.write_all(rules.as_bytes())
            .map_err(|e| FieldNetError::io(file.path(), e))?;
        Ok(file)
    }

    async fn run_checked(&self, program: &str, args: &[&str]) -> FieldNetResult<()> {
        let result = self.runner.run(program, args).await?;
        if result.success() {
            Ok(())
        } else {
            Err(FieldNetError::ShellCommandFailed {
                command: display_cmd(program, args),
                exit_code: result.exit_code,
                output: result.combined_output(),
            })
        }
    }
}
