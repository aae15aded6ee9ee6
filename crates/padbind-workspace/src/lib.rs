mod settings;
mod v1;
mod watcher;
mod workspace;

use thiserror::Error;

pub use settings::{parse_settings, Settings};
pub use watcher::{MappingsEvent, MappingsEventReceiver, MappingsWatcher, WatcherError};
pub use workspace::Workspace;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("yaml deserialize error: {0}")]
    YamlDeserializeError(#[from] serde_yaml::Error),
    #[error("unsupported version: {0}")]
    UnsupportedVersion(u8),
    #[error("invalid mappings file name: \"{0}\"")]
    InvalidMappingsFile(String),
}

#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("environment variable not set: {0}")]
    EnvVarNotSet(String),
    #[error("path is not a directory: {0}")]
    PathIsNotDirectory(String),
    #[error("path error: {0}")]
    PathError(#[from] std::io::Error),
    #[error("settings error: {0}")]
    SettingsError(#[from] SettingsError),
    #[error("watcher error: {0}")]
    WatcherError(#[from] WatcherError),
}
