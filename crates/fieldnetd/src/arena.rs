//! Arena network assembly.

use tracing::debug;

use fieldnet_common::{FieldNetError, FieldNetResult};

use crate::config::{InterfaceMap, TeamRoster};
use crate::ip_operations::NetIf;
use crate::types::{AdminNetwork, ArenaNetwork, DriverStation, TeamNetwork, WanNetwork};

/// Resolves the interface mapping and roster into the full aggregate.
///
/// Exactly one team network is produced per station, in Blue 1..3 then
/// Red 1..3 order. Any failure aborts the whole build; callers never see a
/// partial arena.
pub async fn build_arena_network(
    map: &InterfaceMap,
    roster: &TeamRoster,
    netif: &dyn NetIf,
) -> FieldNetResult<ArenaNetwork> {
    let wan = WanNetwork {
        iface: netif.lookup(&map.wan).await?,
    };
    let admin = AdminNetwork::new(netif.lookup(&map.admin).await?);

    let mut teams = Vec::with_capacity(6);
    for station in DriverStation::all() {
        let name = map.station_iface(station).ok_or_else(|| {
            FieldNetError::invalid_config(station.to_string(), "no interface declared for station")
        })?;

        let iface = netif
            .lookup(name)
            .await
            .map_err(|e| FieldNetError::station_lookup(station.to_string(), e))?;

        let team = roster.team_at(station);
        debug!(%station, team, iface = name, "resolved station");
        teams.push(TeamNetwork::new(station, team, iface)?);
    }

    Ok(ArenaNetwork { wan, admin, teams })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Alliance, LinkHandle};
    use async_trait::async_trait;
    use ipnetwork::Ipv4Network;
    use pretty_assertions::assert_eq;

    struct FakeNetIf {
        known: Vec<&'static str>,
    }

    #[async_trait]
    impl NetIf for FakeNetIf {
        async fn exists(&self, name: &str) -> bool {
            self.known.contains(&name)
        }

        async fn lookup(&self, name: &str) -> FieldNetResult<LinkHandle> {
            self.known
                .iter()
                .position(|k| *k == name)
                .map(|i| LinkHandle::new(name, i as u32 + 1))
                .ok_or_else(|| FieldNetError::link_not_found(name))
        }

        async fn clear_addresses(&self, _link: &LinkHandle) -> FieldNetResult<()> {
            Ok(())
        }

        async fn add_address(&self, _link: &LinkHandle, _cidr: Ipv4Network) -> FieldNetResult<()> {
            Ok(())
        }
    }

    fn host() -> FakeNetIf {
        FakeNetIf {
            known: vec!["eth0", "eth1", "eth2", "eth3", "eth4", "eth5", "eth6", "eth7"],
        }
    }

    fn map() -> InterfaceMap {
        InterfaceMap {
            wan: "eth0".into(),
            admin: "eth1".into(),
            blue: vec!["eth2".into(), "eth3".into(), "eth4".into()],
            red: vec!["eth5".into(), "eth6".into(), "eth7".into()],
        }
    }

    fn roster() -> TeamRoster {
        TeamRoster {
            blue: vec![5333, 0, 1114],
            red: vec![3132, 4613, 0],
        }
    }

    #[tokio::test]
    async fn test_builds_six_stations_in_order() {
        let net = build_arena_network(&map(), &roster(), &host()).await.unwrap();

        assert_eq!(net.teams.len(), 6);
        let order: Vec<_> = net.teams.iter().map(|t| t.station.to_string()).collect();
        assert_eq!(
            order,
            ["Blue 1", "Blue 2", "Blue 3", "Red 1", "Red 2", "Red 3"]
        );

        let red1 = &net.teams[3];
        assert_eq!(red1.team, 3132);
        assert_eq!(red1.iface.name(), "eth5");
        assert_eq!(
            red1.addressing.as_ref().unwrap().network.to_string(),
            "10.31.32.0/24"
        );

        let blue2 = &net.teams[1];
        assert!(!blue2.present());
    }

    #[tokio::test]
    async fn test_admin_fixed_regardless_of_roster() {
        let occupied = build_arena_network(&map(), &roster(), &host()).await.unwrap();
        let vacant = build_arena_network(&map(), &TeamRoster::default(), &host())
            .await
            .unwrap();

        for net in [&occupied, &vacant] {
            assert_eq!(net.admin.network.to_string(), "10.0.100.0/24");
            assert_eq!(net.admin.router.to_string(), "10.0.100.1");
            assert_eq!(net.admin.server.to_string(), "10.0.100.5");
        }
        assert!(vacant.teams.iter().all(|t| !t.present()));
    }

    #[tokio::test]
    async fn test_unresolvable_station_names_it() {
        let netif = FakeNetIf {
            known: vec!["eth0", "eth1", "eth2", "eth3", "eth4", "eth5", "eth7"],
        };
        let err = build_arena_network(&map(), &roster(), &netif)
            .await
            .unwrap_err();
        match err {
            FieldNetError::StationLookup { station, .. } => assert_eq!(station, "Red 2"),
            other => panic!("expected StationLookup, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_station_declaration() {
        let mut short = map();
        short.blue.truncate(2);
        let err = build_arena_network(&short, &roster(), &host())
            .await
            .unwrap_err();
        match err {
            FieldNetError::InvalidConfig { role, .. } => assert_eq!(role, "Blue 3"),
            other => panic!("expected InvalidConfig, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_bad_team_number_aborts_build() {
        let mut bad = roster();
        bad.blue[0] = 10000;
        assert!(build_arena_network(&map(), &bad, &host()).await.is_err());
    }

    #[tokio::test]
    async fn test_wan_never_addressed() {
        let net = build_arena_network(&map(), &roster(), &host()).await.unwrap();
        // The WAN carries nothing but its handle.
        assert_eq!(net.wan.iface.name(), "eth0");
    }

    #[tokio::test]
    async fn test_station_alliance_split() {
        let net = build_arena_network(&map(), &roster(), &host()).await.unwrap();
        let blue: Vec<_> = net
            .teams
            .iter()
            .filter(|t| t.station.alliance == Alliance::Blue)
            .collect();
        assert_eq!(blue.len(), 3);
        assert_eq!(blue[0].iface.name(), "eth2");
    }
}
