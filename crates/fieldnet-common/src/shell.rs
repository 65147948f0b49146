//! Shell command execution utilities for the field network daemons.
//!
//! This module provides safe shell command execution with proper quoting
//! to prevent command injection through interface names or unit names that
//! originate in configuration files.
//!
//! # Example
//!
//! ```ignore
//! use fieldnet_common::shell::{self, IP_CMD, shellquote};
//!
//! let iface = "eth2";
//! let cmd = format!("{} address flush dev {}", IP_CMD, shellquote(iface));
//! let result = shell::exec(&cmd).await?;
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use std::process::Stdio;
use tokio::process::Command;

use crate::error::{FieldNetError, FieldNetResult};

/// Path to the `ip` command for interface address configuration.
pub const IP_CMD: &str = "/sbin/ip";

/// Path to the `sysctl` command for kernel toggles.
pub const SYSCTL_CMD: &str = "sysctl";

/// Path to the `systemctl` command for service control.
pub const SYSTEMCTL_CMD: &str = "/bin/systemctl";

/// Path to the `iptables-restore` command for wholesale ruleset loads.
pub const IPTABLES_RESTORE_CMD: &str = "/sbin/iptables-restore";

/// Regex for characters that need escaping in shell double-quotes.
/// Matches: $, `, ", \, and newline
static SHELL_ESCAPE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"([$`"\\\n])"#).expect("Invalid regex pattern"));

/// Quotes a string for safe use in shell commands.
///
/// Wraps the string in double quotes and escapes the characters that have
/// special meaning inside double quotes: `$`, `` ` ``, `"`, `\` and newline.
///
/// # Example
///
/// ```
/// use fieldnet_common::shell::shellquote;
///
/// assert_eq!(shellquote("eth0"), "\"eth0\"");
/// assert_eq!(shellquote("with$var"), "\"with\\$var\"");
/// ```
pub fn shellquote(s: &str) -> String {
    let escaped = SHELL_ESCAPE_RE.replace_all(s, r"\$1");
    format!("\"{}\"", escaped)
}

/// Result of a shell command execution.
#[derive(Debug, Clone)]
pub struct ExecResult {
    /// The exit code of the command (0 = success).
    pub exit_code: i32,
    /// The combined stdout output.
    pub stdout: String,
    /// The combined stderr output.
    pub stderr: String,
}

impl ExecResult {
    /// Returns true if the command succeeded (exit code 0).
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Returns the combined output (stdout + stderr) for error messages.
    pub fn combined_output(&self) -> String {
        if self.stderr.is_empty() {
            self.stdout.clone()
        } else if self.stdout.is_empty() {
            self.stderr.clone()
        } else {
            format!("{}\n{}", self.stdout, self.stderr)
        }
    }
}

/// Executes a shell command asynchronously.
///
/// The command runs through `/bin/sh -c` to support shell features like
/// flag-bearing subcommands and redirects.
///
/// # Returns
///
/// * `Ok(ExecResult)` - The command execution result
/// * `Err(FieldNetError)` - If the command could not be spawned
pub async fn exec(cmd: &str) -> FieldNetResult<ExecResult> {
    tracing::debug!(command = %cmd, "Executing shell command");

    let output = Command::new("/bin/sh")
        .arg("-c")
        .arg(cmd)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|e| FieldNetError::ShellExec {
            command: cmd.to_string(),
            source: e,
        })?;

    let exit_code = output.status.code().unwrap_or(-1);
    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

    let result = ExecResult {
        exit_code,
        stdout,
        stderr,
    };

    if result.success() {
        tracing::trace!(command = %cmd, exit_code = exit_code, "Command succeeded");
    } else {
        tracing::warn!(
            command = %cmd,
            exit_code = exit_code,
            stderr = %result.stderr,
            "Command failed"
        );
    }

    Ok(result)
}

/// Executes a shell command and returns an error on non-zero exit.
///
/// # Returns
///
/// * `Ok(String)` - The stdout output on success
/// * `Err(FieldNetError)` - If the command fails or returns non-zero
pub async fn exec_or_throw(cmd: &str) -> FieldNetResult<String> {
    let result = exec(cmd).await?;
    if result.success() {
        Ok(result.stdout)
    } else {
        Err(FieldNetError::ShellCommandFailed {
            command: cmd.to_string(),
            exit_code: result.exit_code,
            output: result.combined_output(),
        })
    }
}
