mod backend;
mod command;
mod events;
mod manager;
mod runtime;
mod types;

use thiserror::Error;

pub use crate::backend::{SdlBackend, SdlJoystick};
pub use crate::events::{EventReceiver, JoystickEvent};
pub use crate::manager::JoystickManager;
pub use crate::types::JoystickInfo;

pub use padbind_joystick::{
    GamepadAxis, GamepadButton, GamepadInput, Guid, HatDirection, JoystickId,
    JoystickInput,
};

/// Error type for the SDL-backed joystick runtime.
#[derive(Debug, Error)]
pub enum Error {
    /// Failed to initialize SDL2 or one of its subsystems.
    #[error("Backend init failed: {0}")]
    BackendInit(String),
    /// The runtime thread is gone and cannot serve requests.
    #[error("Joystick runtime stopped")]
    RuntimeStopped,
    /// The joystick core refused the request.
    #[error(transparent)]
    Joystick(#[from] padbind_joystick::Error),
}

/// Convenient result alias for runtime operations.
pub type Result<T> = std::result::Result<T, Error>;
