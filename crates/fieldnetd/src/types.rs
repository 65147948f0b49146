//! Arena network topology model.
//!
//! Addressing follows the 10.TE.AM.0/24 convention: team 3132 lives in
//! 10.31.32.0/24 with the field router at .1 and DHCP leases handed out
//! between .100 and .200. The admin network is the fixed 10.0.100.0/24
//! block regardless of the roster.

use std::fmt;
use std::net::Ipv4Addr;

use ipnetwork::Ipv4Network;

use fieldnet_common::{FieldNetError, FieldNetResult};

use crate::tables::{
    DHCP_RANGE_HIGH_HOST, DHCP_RANGE_LOW_HOST, MAX_TEAM, NO_TEAM, ROUTER_HOST, SERVER_HOST,
    SUBNET_PREFIX_LEN,
};

/// Alliance colour of a driver station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Alliance {
    Blue,
    Red,
}

impl Alliance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Alliance::Blue => "Blue",
            Alliance::Red => "Red",
        }
    }
}

impl fmt::Display for Alliance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A driver station slot on the field, the identity key for a team network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DriverStation {
    pub alliance: Alliance,
    /// Station position, 1 through 3.
    pub position: u8,
}

impl DriverStation {
    pub fn new(alliance: Alliance, position: u8) -> Self {
        Self { alliance, position }
    }

    /// Blue 1..3 then Red 1..3, the order every bring-up pass walks.
    pub fn all() -> impl Iterator<Item = DriverStation> {
        [Alliance::Blue, Alliance::Red]
            .into_iter()
            .flat_map(|alliance| (1..=3).map(move |position| DriverStation::new(alliance, position)))
    }
}

impl fmt::Display for DriverStation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.alliance, self.position)
    }
}

/// A physical interface resolved against the host network stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkHandle {
    name: String,
    index: u32,
}

impl LinkHandle {
    pub fn new(name: impl Into<String>, index: u32) -> Self {
        Self {
            name: name.into(),
            index,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Kernel link index at resolution time.
    pub fn index(&self) -> u32 {
        self.index
    }
}

impl fmt::Display for LinkHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Derives the /24 subnet, router address and DHCP pool for a team number.
///
/// Octet 2 is team / 100 and octet 3 is team % 100, so the team number reads
/// straight out of the address. Anything above 9999 would overflow the
/// two-octet encoding onto unrelated subnets and is rejected.
pub fn team_to_subnet(team: u16) -> FieldNetResult<(Ipv4Network, Ipv4Addr, Ipv4Addr, Ipv4Addr)> {
    if team == NO_TEAM || team > MAX_TEAM {
        return Err(FieldNetError::TeamOutOfRange { team });
    }

    let octet2 = (team / 100) as u8;
    let octet3 = (team % 100) as u8;

    let network = Ipv4Network::new(Ipv4Addr::new(10, octet2, octet3, 0), SUBNET_PREFIX_LEN)
        .map_err(|e| FieldNetError::AddressDerivation {
            detail: e.to_string(),
        })?;

    Ok((
        network,
        Ipv4Addr::new(10, octet2, octet3, ROUTER_HOST),
        Ipv4Addr::new(10, octet2, octet3, DHCP_RANGE_LOW_HOST),
        Ipv4Addr::new(10, octet2, octet3, DHCP_RANGE_HIGH_HOST),
    ))
}

/// Addresses derived for a station with a team assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TeamAddressing {
    pub network: Ipv4Network,
    pub router: Ipv4Addr,
    pub dhcp_range: (Ipv4Addr, Ipv4Addr),
}

/// One station slot's network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamNetwork {
    pub station: DriverStation,
    pub team: u16,
    pub iface: LinkHandle,
    /// None for a vacant station. The interface is still cleared at bring-up
    /// but no addresses are derived or assigned.
    pub addressing: Option<TeamAddressing>,
}

impl TeamNetwork {
    pub fn new(station: DriverStation, team: u16, iface: LinkHandle) -> FieldNetResult<Self> {
        let addressing = if team == NO_TEAM {
            None
        } else {
            let (network, router, low, high) = team_to_subnet(team)?;
            Some(TeamAddressing {
                network,
                router,
                dhcp_range: (low, high),
            })
        };

        Ok(Self {
            station,
            team,
            iface,
            addressing,
        })
    }

    /// Whether a team currently occupies this station.
    pub fn present(&self) -> bool {
        self.addressing.is_some()
    }

    /// Router address in CIDR form, for interface assignment.
    pub fn router_cidr(&self) -> Option<Ipv4Network> {
        self.addressing
            .as_ref()
            .map(|a| cidr_on(a.router, &a.network))
    }
}

impl fmt::Display for TeamNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.addressing {
            Some(a) => write!(
                f,
                "NET[{}:{} (Team {}) - {}]",
                self.station, self.iface, self.team, a.network
            ),
            None => write!(f, "NET[{}:{} (vacant)]", self.station, self.iface),
        }
    }
}

/// The administrative network, fixed at 10.0.100.0/24.
///
/// Router and server are distinct addresses assigned to the same physical
/// interface; driver stations are hardcoded to find the field server at .5.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminNetwork {
    pub iface: LinkHandle,
    pub network: Ipv4Network,
    pub router: Ipv4Addr,
    pub server: Ipv4Addr,
    pub dhcp_range: (Ipv4Addr, Ipv4Addr),
}

impl AdminNetwork {
    pub fn new(iface: LinkHandle) -> Self {
        let network = Ipv4Network::new(Ipv4Addr::new(10, 0, 100, 0), SUBNET_PREFIX_LEN)
            .expect("fixed /24 prefix");

        Self {
            iface,
            network,
            router: Ipv4Addr::new(10, 0, 100, ROUTER_HOST),
            server: Ipv4Addr::new(10, 0, 100, SERVER_HOST),
            dhcp_range: (
                Ipv4Addr::new(10, 0, 100, DHCP_RANGE_LOW_HOST),
                Ipv4Addr::new(10, 0, 100, DHCP_RANGE_HIGH_HOST),
            ),
        }
    }

    pub fn router_cidr(&self) -> Ipv4Network {
        cidr_on(self.router, &self.network)
    }

    pub fn server_cidr(&self) -> Ipv4Network {
        cidr_on(self.server, &self.network)
    }
}

impl fmt::Display for AdminNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NET[Admin:{} - {}]", self.iface, self.network)
    }
}

/// The uplink. Never address-configured by the bring-up pass; the firewall
/// masquerades outbound traffic through it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WanNetwork {
    pub iface: LinkHandle,
}

impl fmt::Display for WanNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NET[WAN:{}]", self.iface)
    }
}

/// The whole field network: uplink, admin block and the six station slots in
/// Blue 1..3, Red 1..3 order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArenaNetwork {
    pub wan: WanNetwork,
    pub admin: AdminNetwork,
    pub teams: Vec<TeamNetwork>,
}

fn cidr_on(ip: Ipv4Addr, network: &Ipv4Network) -> Ipv4Network {
    Ipv4Network::new(ip, network.prefix()).expect("prefix comes from an existing network")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn link(name: &str) -> LinkHandle {
        LinkHandle::new(name, 1)
    }

    #[test]
    fn test_team_to_subnet_derivation() {
        let cases = [
            (3132u16, "10.31.32.0/24", "10.31.32.1"),
            (5333, "10.53.33.0/24", "10.53.33.1"),
            (254, "10.2.54.0/24", "10.2.54.1"),
            (1, "10.0.1.0/24", "10.0.1.1"),
            (9999, "10.99.99.0/24", "10.99.99.1"),
        ];
        for (team, subnet, router) in cases {
            let (network, r, low, high) = team_to_subnet(team).unwrap();
            assert_eq!(network.to_string(), subnet, "team {team}");
            assert_eq!(r.to_string(), router, "team {team}");
            assert_eq!(low.octets()[3], 100);
            assert_eq!(high.octets()[3], 200);
            assert_eq!(low.octets()[..3], r.octets()[..3]);
        }
    }

    #[test]
    fn test_team_to_subnet_dhcp_range() {
        let (_, _, low, high) = team_to_subnet(3132).unwrap();
        assert_eq!(low, Ipv4Addr::new(10, 31, 32, 100));
        assert_eq!(high, Ipv4Addr::new(10, 31, 32, 200));
    }

    #[test]
    fn test_team_to_subnet_rejects_out_of_range() {
        for team in [0u16, 10000, 25599, u16::MAX] {
            match team_to_subnet(team) {
                Err(FieldNetError::TeamOutOfRange { team: t }) => assert_eq!(t, team),
                other => panic!("team {team} should be rejected, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_vacant_team_network() {
        let station = DriverStation::new(Alliance::Blue, 2);
        let nw = TeamNetwork::new(station, NO_TEAM, link("eth3")).unwrap();
        assert!(!nw.present());
        assert_eq!(nw.addressing, None);
        assert_eq!(nw.router_cidr(), None);
    }

    #[test]
    fn test_team_network_addressing() {
        let station = DriverStation::new(Alliance::Red, 1);
        let nw = TeamNetwork::new(station, 4613, link("eth5")).unwrap();
        assert!(nw.present());
        let addr = nw.addressing.unwrap();
        assert_eq!(addr.network.to_string(), "10.46.13.0/24");
        assert_eq!(addr.router, Ipv4Addr::new(10, 46, 13, 1));
        assert_eq!(nw.router_cidr().unwrap().to_string(), "10.46.13.1/24");
    }

    #[test]
    fn test_team_network_rejects_oversized_team() {
        let station = DriverStation::new(Alliance::Red, 3);
        assert!(TeamNetwork::new(station, 12000, link("eth7")).is_err());
    }

    #[test]
    fn test_admin_network_constants() {
        let admin = AdminNetwork::new(link("eth1"));
        assert_eq!(admin.network.to_string(), "10.0.100.0/24");
        assert_eq!(admin.router, Ipv4Addr::new(10, 0, 100, 1));
        assert_eq!(admin.server, Ipv4Addr::new(10, 0, 100, 5));
        assert_eq!(admin.dhcp_range.0, Ipv4Addr::new(10, 0, 100, 100));
        assert_eq!(admin.dhcp_range.1, Ipv4Addr::new(10, 0, 100, 200));
        assert_eq!(admin.network.mask(), Ipv4Addr::new(255, 255, 255, 0));
        assert_eq!(admin.router_cidr().to_string(), "10.0.100.1/24");
        assert_eq!(admin.server_cidr().to_string(), "10.0.100.5/24");
    }

    #[test]
    fn test_station_walk_order() {
        let stations: Vec<_> = DriverStation::all().collect();
        assert_eq!(stations.len(), 6);
        assert_eq!(stations[0].to_string(), "Blue 1");
        assert_eq!(stations[2].to_string(), "Blue 3");
        assert_eq!(stations[3].to_string(), "Red 1");
        assert_eq!(stations[5].to_string(), "Red 3");
    }

    #[test]
    fn test_team_network_display() {
        let station = DriverStation::new(Alliance::Blue, 1);
        let nw = TeamNetwork::new(station, 3132, link("eth2")).unwrap();
        assert_eq!(nw.to_string(), "NET[Blue 1:eth2 (Team 3132) - 10.31.32.0/24]");
    }
}
