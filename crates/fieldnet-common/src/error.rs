//! Error types shared by the field network daemons.
//!
//! Every failure is wrapped with the step or entity it occurred in and
//! propagated upward unmodified. There is no local recovery; the top-level
//! caller logs the chain and exits nonzero.

use std::io;
use std::path::Path;
use thiserror::Error;

/// Result type alias for field network operations.
pub type FieldNetResult<T> = Result<T, FieldNetError>;

/// Errors that can occur while provisioning the field network.
#[derive(Debug, Error)]
pub enum FieldNetError {
    /// Failed to spawn a shell command.
    #[error("failed to execute shell command '{command}': {source}")]
    ShellExec {
        /// The command that failed to execute.
        command: String,
        /// The underlying IO error.
        #[source]
        source: io::Error,
    },

    /// Shell command returned a non-zero exit code.
    #[error("shell command failed: '{command}' (exit code {exit_code}): {output}")]
    ShellCommandFailed {
        /// The command that failed.
        command: String,
        /// The exit code.
        exit_code: i32,
        /// Combined stdout/stderr output.
        output: String,
    },

    /// An interface declaration failed validation.
    #[error("invalid interface configuration for {role}: {message}")]
    InvalidConfig {
        /// The network role whose declaration is invalid.
        role: String,
        /// What is wrong with it.
        message: String,
    },

    /// Two network roles claim the same physical interface.
    #[error("duplicate interface '{iface}' (in: {role}, previously in: {prev_role})")]
    DuplicateInterface {
        /// The interface name claimed twice.
        iface: String,
        /// The role that tried to claim it.
        role: String,
        /// The role that already holds it.
        prev_role: String,
    },

    /// The configuration file could not be parsed.
    #[error("failed to parse configuration {path}: {message}")]
    ConfigParse {
        /// Path of the offending file.
        path: String,
        /// Parser error message.
        message: String,
    },

    /// No interface with this name exists on the host.
    #[error("network interface '{name}' not found")]
    LinkNotFound {
        /// The interface name.
        name: String,
    },

    /// A station could not be resolved to a physical interface.
    #[error("could not resolve interface for station {station}")]
    StationLookup {
        /// The station being resolved.
        station: String,
        /// The underlying lookup failure.
        #[source]
        source: Box<FieldNetError>,
    },

    /// Subnet derivation produced an unusable CIDR.
    #[error("address derivation failed: {detail}")]
    AddressDerivation {
        /// What went wrong.
        detail: String,
    },

    /// Team number cannot be encoded into the 10.TE.AM.0/24 scheme.
    #[error("team number {team} is outside the supported range 1-9999")]
    TeamOutOfRange {
        /// The offending team number.
        team: u16,
    },

    /// An address clear or add failed on an interface.
    #[error("address {op} failed on interface {iface}")]
    InterfaceMutation {
        /// The interface being configured.
        iface: String,
        /// The operation, "flush" or "add".
        op: String,
        /// The underlying failure.
        #[source]
        source: Box<FieldNetError>,
    },

    /// A service-manager call failed.
    #[error("service manager {action} failed for unit {unit}")]
    ServiceControl {
        /// The unit being controlled.
        unit: String,
        /// The action that failed, e.g. "stop" or "restart".
        action: String,
        /// The underlying failure.
        #[source]
        source: Box<FieldNetError>,
    },

    /// A service did not come up after a restart.
    #[error("service {unit} failed to start (state '{state}')")]
    ServiceNotActive {
        /// The unit that should be running.
        unit: String,
        /// The ActiveState value actually observed.
        state: String,
    },

    /// File create/read/write failure.
    #[error("I/O error on {path}")]
    Io {
        /// Path of the file involved.
        path: String,
        /// The underlying IO error.
        #[source]
        source: io::Error,
    },

    /// A bring-up step failed; nothing after it was attempted.
    #[error("bring-up aborted during {step}")]
    Aborted {
        /// Name of the failing step.
        step: &'static str,
        /// The failure that caused the abort.
        #[source]
        source: Box<FieldNetError>,
    },

    /// Internal error (unexpected state).
    #[error("internal error: {message}")]
    Internal {
        /// Error message.
        message: String,
    },
}

impl FieldNetError {
    /// Creates an invalid configuration error.
    pub fn invalid_config(role: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            role: role.into(),
            message: message.into(),
        }
    }

    /// Creates a link not found error.
    pub fn link_not_found(name: impl Into<String>) -> Self {
        Self::LinkNotFound { name: name.into() }
    }

    /// Wraps a lookup failure with the station it was resolving.
    pub fn station_lookup(station: impl Into<String>, source: FieldNetError) -> Self {
        Self::StationLookup {
            station: station.into(),
            source: Box::new(source),
        }
    }

    /// Wraps an address-configuration failure with the interface and operation.
    pub fn interface_mutation(
        iface: impl Into<String>,
        op: impl Into<String>,
        source: FieldNetError,
    ) -> Self {
        Self::InterfaceMutation {
            iface: iface.into(),
            op: op.into(),
            source: Box::new(source),
        }
    }

    /// Wraps a service-manager failure with the unit and action.
    pub fn service_control(
        unit: impl Into<String>,
        action: impl Into<String>,
        source: FieldNetError,
    ) -> Self {
        Self::ServiceControl {
            unit: unit.into(),
            action: action.into(),
            source: Box::new(source),
        }
    }

    /// Creates an IO error carrying the path it occurred on.
    pub fn io(path: impl AsRef<Path>, source: io::Error) -> Self {
        Self::Io {
            path: path.as_ref().display().to_string(),
            source,
        }
    }

    /// Wraps a step failure into the terminal abort error.
    pub fn aborted(step: &'static str, source: FieldNetError) -> Self {
        Self::Aborted {
            step,
            source: Box::new(source),
        }
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}
