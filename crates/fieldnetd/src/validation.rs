//! Interface-mapping validation.
//!
//! Runs before any host state is touched. The first violation aborts the
//! whole validation, so nothing downstream ever sees a partially valid
//! mapping.

use std::collections::HashMap;
use std::fmt;

use fieldnet_common::{FieldNetError, FieldNetResult};

use crate::config::InterfaceMap;
use crate::ip_operations::NetIf;

/// Network role an interface is declared for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Wan,
    Admin,
    Blue(u8),
    Red(u8),
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Wan => f.write_str("WAN"),
            Role::Admin => f.write_str("Admin"),
            Role::Blue(position) => write!(f, "Blue[{position}]"),
            Role::Red(position) => write!(f, "Red[{position}]"),
        }
    }
}

/// Checks every declared interface: named, present on the host, and claimed
/// by exactly one role.
pub async fn validate_interface_map(map: &InterfaceMap, netif: &dyn NetIf) -> FieldNetResult<()> {
    let mut claimed: HashMap<String, Role> = HashMap::new();

    for (role, name) in declared_roles(map) {
        if name.is_empty() {
            return Err(FieldNetError::invalid_config(
                role.to_string(),
                "no interface name set",
            ));
        }

        if !netif.exists(name).await {
            return Err(FieldNetError::invalid_config(
                role.to_string(),
                format!("interface '{name}' does not exist"),
            ));
        }

        if let Some(prev_role) = claimed.get(name) {
            return Err(FieldNetError::DuplicateInterface {
                iface: name.to_string(),
                role: role.to_string(),
                prev_role: prev_role.to_string(),
            });
        }
        claimed.insert(name.to_string(), role);
    }

    Ok(())
}

fn declared_roles(map: &InterfaceMap) -> Vec<(Role, &str)> {
    let mut roles = vec![
        (Role::Wan, map.wan.as_str()),
        (Role::Admin, map.admin.as_str()),
    ];
    roles.extend(
        map.blue
            .iter()
            .enumerate()
            .map(|(i, name)| (Role::Blue(i as u8 + 1), name.as_str())),
    );
    roles.extend(
        map.red
            .iter()
            .enumerate()
            .map(|(i, name)| (Role::Red(i as u8 + 1), name.as_str())),
    );
    roles
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LinkHandle;
    use async_trait::async_trait;
    use ipnetwork::Ipv4Network;

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

    fn full_map() -> InterfaceMap {
        InterfaceMap {
            wan: "eth0".into(),
            admin: "eth1".into(),
            blue: vec!["eth2".into(), "eth3".into(), "eth4".into()],
            red: vec!["eth5".into(), "eth6".into(), "eth7".into()],
        }
    }

    fn host_with_all() -> FakeNetIf {
        FakeNetIf {
            known: vec!["eth0", "eth1", "eth2", "eth3", "eth4", "eth5", "eth6", "eth7"],
        }
    }

    #[tokio::test]
    async fn test_valid_mapping_passes() {
        validate_interface_map(&full_map(), &host_with_all())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_duplicate_names_both_roles() {
        let mut map = full_map();
        map.red[0] = "eth2".into();

        let err = validate_interface_map(&map, &host_with_all())
            .await
            .unwrap_err();
        match err {
            FieldNetError::DuplicateInterface {
                iface,
                role,
                prev_role,
            } => {
                assert_eq!(iface, "eth2");
                assert_eq!(role, "Red[1]");
                assert_eq!(prev_role, "Blue[1]");
            }
            other => panic!("expected DuplicateInterface, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_nonexistent_interface_rejected() {
        let mut map = full_map();
        map.admin = "eno99".into();

        let err = validate_interface_map(&map, &host_with_all())
            .await
            .unwrap_err();
        match err {
            FieldNetError::InvalidConfig { role, message } => {
                assert_eq!(role, "Admin");
                assert!(message.contains("eno99"));
            }
            other => panic!("expected InvalidConfig, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_name_rejected() {
        let mut map = full_map();
        map.blue[1] = String::new();

        let err = validate_interface_map(&map, &host_with_all())
            .await
            .unwrap_err();
        match err {
            FieldNetError::InvalidConfig { role, .. } => assert_eq!(role, "Blue[2]"),
            other => panic!("expected InvalidConfig, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_first_violation_wins() {
        // WAN is checked before the duplicate further down the list.
        let mut map = full_map();
        map.wan = "missing0".into();
        map.red[2] = "eth2".into();

        let err = validate_interface_map(&map, &host_with_all())
            .await
            .unwrap_err();
        match err {
            FieldNetError::InvalidConfig { role, .. } => assert_eq!(role, "WAN"),
            other => panic!("expected the WAN violation first, got {other:?}"),
        }
    }
}
