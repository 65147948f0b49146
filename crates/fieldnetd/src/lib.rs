//! fieldnetd - Competition field network bring-up daemon
//!
//! fieldnetd provisions the physical/IP network for a competition field:
//!
//! - fixed subnets per team station (10.TE.AM.0/24) plus the administrative
//!   network, each bound to one physical interface
//! - interface-mapping validation before anything is touched
//! - an ordered bring-up sequence across interfaces, DHCP and firewall
//! - safety-gated dry-run semantics so the same code path runs harmlessly in
//!   development and destructively in production

pub mod arena;
pub mod bringup;
pub mod config;
pub mod dhcp;
pub mod firewall;
pub mod ip_operations;
pub mod render;
pub mod tables;
pub mod types;
pub mod validation;

pub use arena::build_arena_network;
pub use bringup::{BringUpState, BringUpStep, NetworkBringUp};
pub use types::{Alliance, ArenaNetwork, DriverStation, LinkHandle, TeamNetwork};
