mod cli;
mod logging;
mod merge;

use std::fs;
use std::process::ExitCode;

use clap::Parser;
use crossbeam_channel::{never, select, unbounded, Receiver};
use log::{debug, error, info, warn};
use thiserror::Error;

use padbind_gamepad::{JoystickEvent, JoystickInfo, JoystickManager};
use padbind_joystick::{GamepadInput, JoystickInput};
use padbind_workspace::{MappingsEvent, Workspace, WorkspaceError};

use crate::cli::{Cli, Command};
use crate::merge::merge_mappings;

#[derive(Debug, Error)]
enum DaemonError {
    #[error("{0}")]
    Workspace(#[from] WorkspaceError),
    #[error("{0}")]
    Gamepad(#[from] padbind_gamepad::Error),
    #[error("{0}")]
    Joystick(#[from] padbind_joystick::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to set Ctrl+C handler: {0}")]
    Signal(#[from] ctrlc::Error),
    #[error("mapping for {0} was rejected")]
    MappingRejected(String),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::setup(cli.verbose, cli.no_color);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), DaemonError> {
    let workspace = Workspace::new(cli.workspace.as_deref())?;
    debug!("workspace: {}", workspace.path().display());

    match cli.command {
        Command::Run => run_daemon(&workspace),
        Command::List => {
            let manager = start_manager(&workspace)?;
            let joysticks = manager.joysticks();
            if joysticks.is_empty() {
                info!("no joysticks connected");
            }
            for info in joysticks {
                info!("{}", describe(&info));
            }
            Ok(())
        }
        Command::Map {
            guid,
            input,
            target,
        } => {
            let joystick: JoystickInput = input.parse()?;
            let gamepad: GamepadInput = target.parse()?;
            let manager = start_manager(&workspace)?;
            if !manager.set_gamepad_mapping(&guid, gamepad, joystick)? {
                return Err(DaemonError::MappingRejected(guid));
            }
            info!("{}", manager.gamepad_mapping_string(&guid)?);
            persist(&workspace, &manager)
        }
        Command::Show { guid } => {
            let manager = start_manager(&workspace)?;
            let mapping = manager.gamepad_mapping_string(&guid)?;
            if mapping.is_empty() {
                warn!("no mapping for {guid}");
            } else {
                info!("{mapping}");
            }
            Ok(())
        }
        Command::Export => {
            let manager = start_manager(&workspace)?;
            print!("{}", manager.save_gamepad_mappings()?);
            Ok(())
        }
        Command::Import { file } => {
            let content = fs::read_to_string(&file)?;
            let manager = start_manager(&workspace)?;
            let count = manager.load_gamepad_mappings(&content)?;
            info!("imported {count} mappings from {}", file.display());
            persist(&workspace, &manager)
        }
    }
}

fn start_manager(workspace: &Workspace) -> Result<JoystickManager, DaemonError> {
    let mappings = workspace.read_mappings()?;
    Ok(JoystickManager::new(mappings)?)
}

/// Stores the mappings of every gamepad seen into the workspace database.
fn persist(workspace: &Workspace, manager: &JoystickManager) -> Result<(), DaemonError> {
    let saved = manager.save_gamepad_mappings()?;
    let existing = workspace.read_mappings()?.unwrap_or_default();
    workspace.write_mappings(&merge_mappings(&existing, &saved))?;
    debug!("saved mappings to {}", workspace.mappings_path().display());
    Ok(())
}

fn describe(info: &JoystickInfo) -> String {
    let kind = if info.gamepad { "gamepad" } else { "joystick" };
    format!(
        "#{} (id {}) {} {} [{kind}]",
        info.index,
        info.id.index(),
        info.guid,
        info.name
    )
}

fn run_daemon(workspace: &Workspace) -> Result<(), DaemonError> {
    // Handle Ctrl+C to exit cleanly
    let (stop_tx, stop_rx) = unbounded::<()>();
    ctrlc::set_handler(move || {
        let _ = stop_tx.send(());
    })?;

    let manager = start_manager(workspace)?;
    let events = manager.subscribe();
    for info in manager.joysticks() {
        info!("connected {}", describe(&info));
    }

    // The watcher reports over std::mpsc, bridge it to crossbeam for select!.
    let settings = workspace.settings().clone();
    let (_watcher, mappings_rx): (_, Receiver<MappingsEvent>) = if settings.watch {
        let (watcher, std_rx) = workspace.start_mappings_watcher()?;
        let (tx, rx) = unbounded();
        std::thread::spawn(move || {
            while let Ok(event) = std_rx.recv() {
                if tx.send(event).is_err() {
                    break;
                }
            }
        });
        (Some(watcher), rx)
    } else {
        (None, never())
    };

    info!("padbindd started. Listening for joystick events.");
    loop {
        select! {
            recv(stop_rx) -> _ => {
                break;
            }
            recv(events) -> msg => {
                match msg {
                    Ok(JoystickEvent::Connected(info)) => {
                        info!("connected {}", describe(&info));
                    }
                    Ok(JoystickEvent::Disconnected(info)) => {
                        info!("disconnected {}", describe(&info));
                    }
                    Ok(JoystickEvent::MappingsChanged) => {
                        debug!("mappings changed");
                    }
                    Err(err) => {
                        error!("event channel closed: {err}");
                        break;
                    }
                }
            }
            recv(mappings_rx) -> msg => {
                match msg {
                    Ok(MappingsEvent::Changed(content)) => {
                        match manager.load_gamepad_mappings(&content) {
                            Ok(count) => {
                                info!("reloaded {count} mappings");
                            }
                            Err(e) => {
                                error!("failed to reload mappings: {e}");
                            }
                        }
                    }
                    Ok(MappingsEvent::Removed) => {
                        warn!("mappings file removed, keeping loaded mappings");
                    }
                    Ok(MappingsEvent::Error(e)) => {
                        error!("mappings watcher: {e}");
                    }
                    Err(_) => {
                        error!("mappings watcher stopped");
                        break;
                    }
                }
            }
        }
    }

    if settings.save_on_exit {
        persist(workspace, &manager)?;
    }
    info!("padbindd stopped");
    Ok(())
}
