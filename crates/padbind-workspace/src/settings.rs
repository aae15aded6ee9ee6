use serde::Deserialize;

use crate::v1::SettingsV1;
use crate::SettingsError;

pub(crate) const DEFAULT_MAPPINGS_FILE: &str = "gamecontrollerdb.txt";

/// Workspace settings read from `padbind.yaml`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Mappings database file name, relative to the workspace.
    pub mappings: String,
    /// Write the mappings of seen gamepads back on exit.
    pub save_on_exit: bool,
    /// Reload the mappings file when it changes.
    pub watch: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mappings: DEFAULT_MAPPINGS_FILE.to_string(),
            save_on_exit: true,
            watch: true,
        }
    }
}

/// Parse yaml settings.
pub fn parse_settings(input: &str) -> Result<Settings, SettingsError> {
    let version = parse_version(input)?;
    match version {
        1 => {
            let settings: SettingsV1 = serde_yaml::from_str(input)?;
            settings.to_settings()
        }
        _ => Err(SettingsError::UnsupportedVersion(version)),
    }
}

/// Settings with a version.
#[derive(Debug, Clone, Deserialize)]
struct VersionedSettings {
    version: u8,
}

fn parse_version(input: &str) -> Result<u8, SettingsError> {
    let raw: VersionedSettings = serde_yaml::from_str(input)?;
    Ok(raw.version)
}
