use std::ffi::OsString;
use std::path::Path;
use std::sync::mpsc;
use std::time::Duration;
use std::fs;

use notify::{Config, Error as NotifyError, RecommendedWatcher, RecursiveMode};
use notify_debouncer_mini::{
    new_debouncer_opt, DebounceEventResult, DebouncedEventKind, Debouncer,
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WatcherError {
    #[error("notify error: {0}")]
    Notify(#[from] NotifyError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("path has no file name: {0}")]
    NoFileName(String),
}

/// Watches the mappings database inside a workspace directory.
///
/// The directory is watched rather than the file so that editors which
/// replace the file on save keep producing events.
pub struct MappingsWatcher {
    #[allow(dead_code)]
    watcher: Debouncer<RecommendedWatcher>,
}

#[derive(Debug)]
pub enum MappingsEvent {
    Changed(String),
    Removed,
    Error(WatcherError),
}

type MappingsEventSender = mpsc::Sender<MappingsEvent>;
pub type MappingsEventReceiver = mpsc::Receiver<MappingsEvent>;

fn send_mappings_event(path: &Path, tx: &MappingsEventSender) {
    match fs::read_to_string(path) {
        Ok(content) => {
            let _ = tx.send(MappingsEvent::Changed(content));
        }
        Err(e) => {
            let _ = tx.send(MappingsEvent::Error(WatcherError::Io(e)));
        }
    };
}

impl MappingsWatcher {
    pub fn new_with_sender(
        path: &Path,
        tx: MappingsEventSender,
    ) -> Result<Self, WatcherError> {
        let file_name: OsString = path
            .file_name()
            .ok_or_else(|| WatcherError::NoFileName(path.display().to_string()))?
            .to_owned();
        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_owned(),
            _ => Path::new(".").to_owned(),
        };
        let path_c = path.to_owned();

        let debouncer_config = notify_debouncer_mini::Config::default()
            .with_timeout(Duration::from_millis(1000))
            .with_notify_config(Config::default());
        let mut debouncer = new_debouncer_opt::<_, RecommendedWatcher>(
            debouncer_config,
            move |events: DebounceEventResult| match events {
                Ok(events) => {
                    let touched = events.iter().any(|event| {
                        matches!(
                            event.kind,
                            DebouncedEventKind::Any | DebouncedEventKind::AnyContinuous
                        ) && event.path.file_name() == Some(file_name.as_os_str())
                    });
                    if !touched {
                        return;
                    }
                    if path_c.exists() {
                        send_mappings_event(&path_c, &tx);
                    } else {
                        let _ = tx.send(MappingsEvent::Removed);
                    }
                }
                Err(e) => {
                    let _ = tx.send(MappingsEvent::Error(WatcherError::Notify(e)));
                }
            },
        )?;

        debouncer
            .watcher()
            .watch(&dir, RecursiveMode::NonRecursive)?;

        Ok(Self { watcher: debouncer })
    }

    pub fn new(path: &Path) -> Result<(Self, MappingsEventReceiver), WatcherError> {
        let (tx, rx) = mpsc::channel();

        Ok((Self::new_with_sender(path, tx)?, rx))
    }
}
