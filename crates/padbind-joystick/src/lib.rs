mod backend;
mod guid;
mod input;
pub mod mapping;
mod module;
mod registry;
mod store;

#[cfg(test)]
mod mock;

use thiserror::Error;

pub use crate::backend::{
    DeviceBackend, DeviceHandle, DeviceId, InstanceId, MappingBackend,
    MappingStatus,
};
pub use crate::guid::{Guid, GUID_TEXT_LEN};
pub use crate::input::{
    GamepadAxis, GamepadButton, GamepadInput, HatDirection, JoystickInput,
};
pub use crate::module::JoystickModule;
pub use crate::registry::{JoystickId, LogicalJoystick};
pub use crate::store::MappingStore;

/// Error type for joystick and mapping operations.
#[derive(Debug, Error)]
pub enum Error {
    /// GUID is not 32 hex characters.
    #[error("Invalid joystick GUID: {0}")]
    InvalidGuid(String),
    /// Physical input cannot be written into a mapping string.
    #[error("Invalid joystick input value")]
    InvalidInput,
    /// Unknown logical gamepad axis or button name.
    #[error("Invalid gamepad axis/button: {0}")]
    InvalidGamepadInput(String),
    /// Not a single line of a bulk load was usable.
    #[error("Invalid gamepad mappings")]
    InvalidMappings,
    /// The backend could not open a device.
    #[error("Failed to open device {0}: {1}")]
    Open(DeviceId, String),
}

/// Convenient result alias for joystick operations.
pub type Result<T> = std::result::Result<T, Error>;
