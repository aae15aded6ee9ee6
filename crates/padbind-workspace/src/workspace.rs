use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use log::debug;
use tempfile::NamedTempFile;

use crate::settings::{parse_settings, Settings};
use crate::watcher::{MappingsEventReceiver, MappingsWatcher};
use crate::WorkspaceError;

#[cfg(target_os = "macos")]
const DEFAULT_WORKSPACE_PATH: &str = "Library/Application Support/padbind";
#[cfg(not(target_os = "macos"))]
const DEFAULT_WORKSPACE_PATH: &str = ".config/padbind";
const WORKSPACE_DIR_NAME: &str = "padbind";
const SETTINGS_FILE_NAME: &str = "padbind.yaml";

/// Directory holding the settings file and the mappings database.
pub struct Workspace {
    path: PathBuf,
    settings: Settings,
}

impl Workspace {
    /// Opens the workspace at `path`, or at the default location, creating
    /// the directory when missing. A missing settings file means defaults.
    pub fn new(path: Option<&Path>) -> Result<Self, WorkspaceError> {
        let path = {
            if let Some(path) = path {
                path.to_owned()
            } else {
                Self::default_path()?
            }
        };

        if !path.exists() {
            fs::create_dir_all(&path)?;
        } else if !path.is_dir() {
            return Err(WorkspaceError::PathIsNotDirectory(
                path.display().to_string(),
            ));
        }

        let settings = match fs::read_to_string(path.join(SETTINGS_FILE_NAME)) {
            Ok(content) => parse_settings(&content)?,
            Err(e) if e.kind() == ErrorKind::NotFound => Settings::default(),
            Err(e) => return Err(e.into()),
        };

        Ok(Self { path, settings })
    }

    pub fn start_mappings_watcher(
        &self,
    ) -> Result<(MappingsWatcher, MappingsEventReceiver), WorkspaceError> {
        MappingsWatcher::new(&self.mappings_path()).map_err(WorkspaceError::WatcherError)
    }

    pub fn path(&self) -> PathBuf {
        self.path.clone()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn mappings_path(&self) -> PathBuf {
        self.path.join(&self.settings.mappings)
    }

    /// Contents of the mappings database, `None` if it does not exist yet.
    pub fn read_mappings(&self) -> Result<Option<String>, WorkspaceError> {
        match fs::read_to_string(self.mappings_path()) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Replaces the mappings database atomically. Readers and the watcher
    /// only ever see a complete file.
    pub fn write_mappings(&self, mappings: &str) -> Result<(), WorkspaceError> {
        let path = self.mappings_path();
        let mut file = NamedTempFile::new_in(&self.path)?;
        file.write_all(mappings.as_bytes())?;
        if let Ok(meta) = fs::metadata(&path) {
            file.as_file().set_permissions(meta.permissions())?;
        }
        file.persist(&path).map_err(|e| e.error)?;
        debug!("wrote {} bytes to {}", mappings.len(), path.display());
        Ok(())
    }

    pub fn default_path() -> Result<PathBuf, WorkspaceError> {
        if !cfg!(target_os = "macos") {
            if let Some(config) = std::env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
                return Ok(PathBuf::from(config).join(WORKSPACE_DIR_NAME));
            }
        }
        let path = std::env::var("HOME")
            .map(PathBuf::from)
            .map(|p| p.join(DEFAULT_WORKSPACE_PATH))
            .map_err(|_| WorkspaceError::EnvVarNotSet("HOME".to_string()))?;

        Ok(path)
    }
}
