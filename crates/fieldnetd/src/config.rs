//! Daemon configuration: the interface mapping and the team roster.
//!
//! Loaded once at startup from a YAML file:
//!
//! ```yaml
//! interfaces:
//!   wan: eth0
//!   admin: eth1
//!   blue: [eth2, eth3, eth4]
//!   red: [eth5, eth6, eth7]
//! teams:
//!   blue: [5333, 0, 1114]
//!   red: [3132, 4613, 0]
//! ```

use std::fs;
use std::path::Path;

use serde::Deserialize;

use fieldnet_common::{FieldNetError, FieldNetResult};

use crate::tables::NO_TEAM;
use crate::types::{Alliance, DriverStation};

/// Top-level daemon configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct FieldConfig {
    pub interfaces: InterfaceMap,
    #[serde(default)]
    pub teams: TeamRoster,
}

/// Physical interface declared for each network role.
#[derive(Debug, Clone, Deserialize)]
pub struct InterfaceMap {
    pub wan: String,
    pub admin: String,
    #[serde(default)]
    pub blue: Vec<String>,
    #[serde(default)]
    pub red: Vec<String>,
}

impl InterfaceMap {
    /// Interface declared for a station, if any.
    pub fn station_iface(&self, station: DriverStation) -> Option<&str> {
        let list = match station.alliance {
            Alliance::Blue => &self.blue,
            Alliance::Red => &self.red,
        };
        list.get(station.position as usize - 1).map(String::as_str)
    }
}

/// Team numbers per station. 0 leaves a station vacant.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TeamRoster {
    #[serde(default)]
    pub blue: Vec<u16>,
    #[serde(default)]
    pub red: Vec<u16>,
}

impl TeamRoster {
    /// Team assigned to a station; a missing entry reads as vacant.
    pub fn team_at(&self, station: DriverStation) -> u16 {
        let list = match station.alliance {
            Alliance::Blue => &self.blue,
            Alliance::Red => &self.red,
        };
        list.get(station.position as usize - 1)
            .copied()
            .unwrap_or(NO_TEAM)
    }
}

/// Loads and parses the daemon configuration.
pub fn load(path: &Path) -> FieldNetResult<FieldConfig> {
    let raw = fs::read_to_string(path).map_err(|e| FieldNetError::io(path, e))?;
    serde_yaml::from_str(&raw).map_err(|e| FieldNetError::ConfigParse {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}
