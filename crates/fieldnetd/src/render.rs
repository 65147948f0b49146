//! Rendering of the generated service configurations.
//!
//! The bring-up steps treat these as opaque serializers: the whole arena
//! model goes in, ready-to-write file text comes out.

use crate::types::ArenaNetwork;

/// ISC dhcpd configuration covering the admin block and every occupied
/// station subnet. Vacant stations get no stanza.
pub fn render_dhcp_conf(net: &ArenaNetwork) -> String {
    let mut out = String::new();
    out.push_str("# Generated by fieldnetd. Rewritten on every bring-up; do not edit.\n");

    let admin = &net.admin;
    out.push_str("\n# Admin network\n");
    out.push_str(&format!(
        "subnet {} netmask {} {{\n",
        admin.network.network(),
        admin.network.mask()
    ));
    out.push_str(&format!("  option routers {};\n", admin.router));
    out.push_str(&format!("  option domain-name-servers {};\n", admin.server));
    out.push_str(&format!(
        "  range {} {};\n",
        admin.dhcp_range.0, admin.dhcp_range.1
    ));
    out.push_str("}\n");

    for team in &net.teams {
        let Some(addr) = &team.addressing else {
            continue;
        };
        out.push_str(&format!("\n# {} (Team {})\n", team.station, team.team));
        out.push_str(&format!(
            "subnet {} netmask {} {{\n",
            addr.network.network(),
            addr.network.mask()
        ));
        out.push_str(&format!("  option routers {};\n", addr.router));
        out.push_str(&format!(
            "  range {} {};\n",
            addr.dhcp_range.0, addr.dhcp_range.1
        ));
        out.push_str("}\n");
    }

    out
}

/// iptables-restore input: NAT out the uplink, default-drop forwarding with
/// station-to-admin and admin-to-uplink openings.
pub fn render_firewall_rules(net: &ArenaNetwork) -> String {
    let wan = net.wan.iface.name();
    let admin = net.admin.iface.name();

    let mut out = String::new();
    out.push_str("# Generated by fieldnetd. Loaded wholesale via iptables-restore.\n");

    out.push_str("*nat\n");
    out.push_str(":PREROUTING ACCEPT [0:0]\n");
    out.push_str(":INPUT ACCEPT [0:0]\n");
    out.push_str(":OUTPUT ACCEPT [0:0]\n");
    out.push_str(":POSTROUTING ACCEPT [0:0]\n");
    out.push_str(&format!("-A POSTROUTING -o {wan} -j MASQUERADE\n"));
    out.push_str("COMMIT\n");

    out.push_str("*filter\n");
    out.push_str(":INPUT ACCEPT [0:0]\n");
    out.push_str(":FORWARD DROP [0:0]\n");
    out.push_str(":OUTPUT ACCEPT [0:0]\n");
    out.push_str("-A FORWARD -m state --state ESTABLISHED,RELATED -j ACCEPT\n");
    out.push_str(&format!("-A FORWARD -i {admin} -o {wan} -j ACCEPT\n"));
    for team in &net.teams {
        if !team.present() {
            continue;
        }
        let iface = team.iface.name();
        out.push_str(&format!("-A FORWARD -i {iface} -o {admin} -j ACCEPT\n"));
        out.push_str(&format!("-A FORWARD -i {admin} -o {iface} -j ACCEPT\n"));
    }
    out.push_str("COMMIT\n");

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{
        AdminNetwork, Alliance, ArenaNetwork, DriverStation, LinkHandle, TeamNetwork, WanNetwork,
    };

    fn arena() -> ArenaNetwork {
        let teams = vec![
            (Alliance::Blue, 1, "eth2", 5333u16),
            (Alliance::Blue, 2, "eth3", 0),
            (Alliance::Blue, 3, "eth4", 1114),
            (Alliance::Red, 1, "eth5", 3132),
            (Alliance::Red, 2, "eth6", 4613),
            (Alliance::Red, 3, "eth7", 0),
        ]
        .into_iter()
        .map(|(alliance, position, iface, team)| {
            TeamNetwork::new(
                DriverStation::new(alliance, position),
                team,
                LinkHandle::new(iface, position as u32),
            )
            .unwrap()
        })
        .collect();

        ArenaNetwork {
            wan: WanNetwork {
                iface: LinkHandle::new("eth0", 1),
            },
            admin: AdminNetwork::new(LinkHandle::new("eth1", 2)),
            teams,
        }
    }

    #[test]
    fn test_dhcp_admin_stanza_always_present() {
        let mut vacant = arena();
        for team in &mut vacant.teams {
            team.addressing = None;
        }
        let conf = render_dhcp_conf(&vacant);
        assert!(conf.contains("subnet 10.0.100.0 netmask 255.255.255.0"));
        assert!(conf.contains("option routers 10.0.100.1;"));
        assert!(conf.contains("option domain-name-servers 10.0.100.5;"));
        assert!(conf.contains("range 10.0.100.100 10.0.100.200;"));
    }

    #[test]
    fn test_dhcp_team_stanzas() {
        let conf = render_dhcp_conf(&arena());
        assert!(conf.contains("subnet 10.31.32.0 netmask 255.255.255.0"));
        assert!(conf.contains("option routers 10.31.32.1;"));
        assert!(conf.contains("range 10.31.32.100 10.31.32.200;"));
        assert!(conf.contains("# Red 1 (Team 3132)"));

        // Vacant stations have no stanza and no subnet ever derives to 10.0.0.0.
        assert!(!conf.contains("Blue 2"));
        assert!(!conf.contains("subnet 10.0.0.0"));
    }

    #[test]
    fn test_dhcp_stanza_count() {
        let conf = render_dhcp_conf(&arena());
        // Admin plus the four occupied stations.
        assert_eq!(conf.matches("subnet ").count(), 5);
    }

    #[test]
    fn test_firewall_masquerades_wan() {
        let rules = render_firewall_rules(&arena());
        assert!(rules.contains("-A POSTROUTING -o eth0 -j MASQUERADE"));
        assert!(rules.contains(":FORWARD DROP [0:0]"));
        assert!(rules.contains("-A FORWARD -i eth1 -o eth0 -j ACCEPT"));
    }

    #[test]
    fn test_firewall_opens_occupied_stations_only() {
        let rules = render_firewall_rules(&arena());
        assert!(rules.contains("-A FORWARD -i eth5 -o eth1 -j ACCEPT"));
        assert!(rules.contains("-A FORWARD -i eth1 -o eth5 -j ACCEPT"));
        // eth3 and eth7 are vacant stations.
        assert!(!rules.contains("-i eth3"));
        assert!(!rules.contains("-o eth7"));
    }

    #[test]
    fn test_firewall_is_restore_input() {
        let rules = render_firewall_rules(&arena());
        assert_eq!(rules.matches("COMMIT\n").count(), 2);
        assert!(rules.contains("*nat\n"));
        assert!(rules.contains("*filter\n"));
    }
}
