//! Reusable arena scenarios.

use fieldnetd::arena::build_arena_network;
use fieldnetd::config::{InterfaceMap, TeamRoster};
use fieldnetd::types::ArenaNetwork;

use crate::MockNetIf;

/// Interface names the standard scenario host knows about.
pub fn all_links() -> Vec<&'static str> {
    vec![
        "lo", "eth0", "eth1", "eth2", "eth3", "eth4", "eth5", "eth6", "eth7",
    ]
}

/// WAN on eth0, admin on eth1, stations on eth2..eth7, all distinct.
pub fn interface_map() -> InterfaceMap {
    InterfaceMap {
        wan: "eth0".into(),
        admin: "eth1".into(),
        blue: vec!["eth2".into(), "eth3".into(), "eth4".into()],
        red: vec!["eth5".into(), "eth6".into(), "eth7".into()],
    }
}

/// Blue 2 and Red 3 vacant, the rest occupied.
pub fn roster() -> TeamRoster {
    TeamRoster {
        blue: vec![5333, 0, 1114],
        red: vec![3132, 4613, 0],
    }
}

/// A standard host mock carrying [`all_links`].
pub fn host() -> MockNetIf {
    MockNetIf::new(&all_links())
}

/// The standard scenario arena, resolved through the given mock.
pub async fn arena(netif: &MockNetIf) -> ArenaNetwork {
    build_arena_network(&interface_map(), &roster(), netif)
        .await
        .expect("fixture arena builds")
}
