use serde::Deserialize;

use crate::settings::{Settings, DEFAULT_MAPPINGS_FILE};
use crate::SettingsError;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct SettingsV1 {
    pub version: u8,
    #[serde(default)]
    pub mappings: Option<String>,
    #[serde(default)]
    pub save_on_exit: Option<bool>,
    #[serde(default)]
    pub watch: Option<bool>,
}

impl SettingsV1 {
    pub fn to_settings(&self) -> Result<Settings, SettingsError> {
        let mappings = self
            .mappings
            .clone()
            .unwrap_or_else(|| DEFAULT_MAPPINGS_FILE.to_string());
        // The watcher only sees files directly inside the workspace.
        if mappings.is_empty() || mappings.contains(['/', '\\']) {
            return Err(SettingsError::InvalidMappingsFile(mappings));
        }

        Ok(Settings {
            mappings,
            save_on_exit: self.save_on_exit.unwrap_or(true),
            watch: self.watch.unwrap_or(true),
        })
    }
}
