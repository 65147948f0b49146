//! Common infrastructure for the field network daemons.
//!
//! This crate provides the shared functionality the bring-up daemon is
//! built on:
//!
//! - [`shell`]: safe shell command execution with proper quoting
//! - [`danger`]: the safety gate separating dry runs from production runs
//! - [`error`]: the shared error taxonomy
//!
//! # Architecture
//!
//! The daemons follow this pattern:
//!
//! 1. Load and validate the interface mapping and roster
//! 2. Derive the network topology from the team numbers
//! 3. Execute shell commands to configure the Linux network stack
//! 4. Reload the system services that depend on the generated files
//!
//! Every mutating primitive takes a [`SafetyGate`] at construction; a
//! disarmed gate turns the mutation into a logged no-op that still reports
//! success, so a development run exercises the full control flow.

pub mod danger;
pub mod error;
pub mod shell;

// Re-export commonly used items at crate root
pub use danger::SafetyGate;
pub use error::{FieldNetError, FieldNetResult};
