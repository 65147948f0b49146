//! Path, unit and addressing constants.

use std::time::Duration;

// DHCP service
/// Generated DHCP configuration, included from the daemon's main config.
pub const DHCP_CONF_FILE: &str = "/etc/dhcp/fieldnet-dhcp.conf";
/// Main ISC dhcpd configuration on the host.
pub const DHCP_MASTER_CONF_FILE: &str = "/etc/dhcp/dhcpd.conf";
/// systemd unit of the DHCP daemon.
pub const DHCP_UNIT: &str = "isc-dhcp-server.service";
/// Unit property consulted after a restart.
pub const ACTIVE_STATE_PROPERTY: &str = "ActiveState";
/// The only ActiveState value accepted as running.
pub const ACTIVE_STATE_OK: &str = "active";
/// Wait after the restart signal before trusting the daemon to have read its
/// config and bound its sockets.
pub const DHCP_SETTLE_DELAY: Duration = Duration::from_secs(2);

// Firewall
/// Temp-file naming for the rendered ruleset.
pub const FIREWALL_RULES_PREFIX: &str = "fieldnet-firewall-";
pub const FIREWALL_RULES_SUFFIX: &str = ".rules";

// Addressing
/// Vacant station sentinel.
pub const NO_TEAM: u16 = 0;
/// Largest team number the 10.TE.AM.0/24 derivation supports.
pub const MAX_TEAM: u16 = 9999;
/// Every field subnet is a /24.
pub const SUBNET_PREFIX_LEN: u8 = 24;
/// Host octet of the router address in every subnet.
pub const ROUTER_HOST: u8 = 1;
/// Host octet the driver stations expect the field server at.
pub const SERVER_HOST: u8 = 5;
/// DHCP pool bounds within each subnet.
pub const DHCP_RANGE_LOW_HOST: u8 = 100;
pub const DHCP_RANGE_HIGH_HOST: u8 = 200;
