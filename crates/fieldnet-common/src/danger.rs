//! The safety gate separating dry runs from production runs.
//!
//! A bring-up pass rewrites interface addressing, the DHCP server
//! configuration and the firewall ruleset of the host it runs on. The gate
//! keeps all of that inert unless the operator has explicitly opted in, so
//! the same code path can be exercised harmlessly during development.
//!
//! The gate is armed in one of two ways:
//!
//! - placing the exact consent string in `/etc/fieldnet-danger-zone`
//! - setting `FIELDNET_DANGER_ENABLED=true` (also usable to force the gate
//!   off while the sentinel file is present)
//!
//! It is resolved once at process start and handed to every collaborator
//! that can mutate host state. Disarmed collaborators log the action they
//! would have taken and return success, so control flow and error surface
//! are identical in both modes.

use std::{env, fs};

use tracing::{info, warn};

/// Sentinel file whose content arms the gate.
pub const DANGER_FILE: &str = "/etc/fieldnet-danger-zone";

/// Environment override; truthy values arm, any other non-empty value disarms.
pub const DANGER_ENV_VAR: &str = "FIELDNET_DANGER_ENABLED";

/// Required content of the sentinel file, trimmed.
pub const CONSENT_TEXT: &str = "I CONSENT TO FIELDNETD RECONFIGURING THIS HOST";

/// Whether mutating calls actually execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SafetyGate {
    armed: bool,
}

impl SafetyGate {
    /// A gate that lets mutations through.
    pub const fn armed() -> Self {
        Self { armed: true }
    }

    /// A gate that turns every mutation into a logged no-op.
    pub const fn disarmed() -> Self {
        Self { armed: false }
    }

    /// Returns true if mutations execute.
    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Resolves the gate from the host sentinel file and environment.
    ///
    /// Called once at process start; the result is passed to collaborator
    /// constructors rather than stashed in process-wide state.
    pub fn from_host() -> Self {
        let file = fs::read_to_string(DANGER_FILE).ok();
        let env = env::var(DANGER_ENV_VAR).ok();
        let gate = Self::resolve(file.as_deref(), env.as_deref());

        if gate.armed {
            warn!("======!!!!======= DANGER ZONE ENABLED ======!!!!=======");
            warn!("fieldnetd is in production mode and will rewrite the");
            warn!("host's interface, DHCP and firewall configuration.");
            warn!(
                "If this is not what you intend, stop now, delete {} and unset {}.",
                DANGER_FILE, DANGER_ENV_VAR
            );
            warn!("================= DANGER ZONE ENABLED =================");
        } else {
            info!(
                "running in development mode, no lasting configuration changes will be made \
                 (populate {} or set {} to arm)",
                DANGER_FILE, DANGER_ENV_VAR
            );
        }

        gate
    }

    /// Pure resolution from the sentinel content and the env override.
    ///
    /// The env override, when non-empty, wins over the file either way.
    pub fn resolve(file_content: Option<&str>, env_value: Option<&str>) -> Self {
        let mut armed = matches!(file_content, Some(s) if s.trim() == CONSENT_TEXT);

        if let Some(value) = env_value {
            let value = value.trim();
            if !value.is_empty() {
                armed = is_truthy(value);
            }
        }

        if armed {
            Self::armed()
        } else {
            Self::disarmed()
        }
    }
}

fn is_truthy(s: &str) -> bool {
    matches!(
        s.to_ascii_lowercase().as_str(),
        "true" | "t" | "yes" | "y" | "1"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_disarmed() {
        assert!(!SafetyGate::resolve(None, None).is_armed());
    }

    #[test]
    fn test_consent_file_arms() {
        assert!(SafetyGate::resolve(Some(CONSENT_TEXT), None).is_armed());
        // Trailing newline from an editor is fine.
        let with_newline = format!("{}\n", CONSENT_TEXT);
        assert!(SafetyGate::resolve(Some(&with_newline), None).is_armed());
    }

    #[test]
    fn test_wrong_file_content_does_not_arm() {
        assert!(!SafetyGate::resolve(Some("i consent"), None).is_armed());
        assert!(!SafetyGate::resolve(Some(""), None).is_armed());
    }

    #[test]
    fn test_env_truthy_forms() {
        for value in ["true", "t", "yes", "y", "1", "TRUE", "Yes"] {
            assert!(
                SafetyGate::resolve(None, Some(value)).is_armed(),
                "{value} should arm the gate"
            );
        }
    }

    #[test]
    fn test_env_other_values_are_false() {
        for value in ["false", "0", "no", "enabled", "armed"] {
            assert!(
                !SafetyGate::resolve(None, Some(value)).is_armed(),
                "{value} should not arm the gate"
            );
        }
    }

    #[test]
    fn test_env_overrides_file_both_ways() {
        assert!(!SafetyGate::resolve(Some(CONSENT_TEXT), Some("false")).is_armed());
        assert!(SafetyGate::resolve(Some("garbage"), Some("yes")).is_armed());
        // Empty env value leaves the file's verdict alone.
        assert!(SafetyGate::resolve(Some(CONSENT_TEXT), Some("")).is_armed());
    }
}
