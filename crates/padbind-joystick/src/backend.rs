//! Capabilities the joystick core consumes from a device layer.
//!
//! The core never talks to hardware. A backend (SDL2 in `padbind-gamepad`,
//! a fake in tests) implements [`DeviceBackend`] for enumeration and opening
//! and [`MappingBackend`] for the gamepad mapping database.

use crate::guid::Guid;
use crate::Result;

/// Backend-specific id of a device that is available to be opened.
/// For SDL2 this is the device index.
pub type DeviceId = u32;

/// Backend-specific id of an opened device, unique while it stays connected.
pub type InstanceId = u32;

/// An opened device. Dropping the handle closes it.
pub trait DeviceHandle {
    /// Id of the underlying physical device. Two handles with the same
    /// instance id refer to the same device.
    fn instance_id(&self) -> InstanceId;

    /// Human-readable device name.
    fn name(&self) -> &str;
}

pub trait DeviceBackend {
    type Handle: DeviceHandle;

    /// Ids of every currently connected device.
    fn enumerate_devices(&self) -> Vec<DeviceId>;

    /// Whether `device` is inside the range the backend currently reports.
    fn is_valid_device(&self, device: DeviceId) -> bool;

    /// Class GUID of a connecting device. `None` for invalid ids.
    fn device_guid(&self, device: DeviceId) -> Option<Guid>;

    fn open(&mut self, device: DeviceId) -> Result<Self::Handle>;

    /// Whether the device can also be driven as a gamepad.
    fn is_gamepad(&self, device: DeviceId) -> bool;

    /// Instance id the device would have once opened.
    fn device_instance_id(&mut self, device: DeviceId) -> Option<InstanceId>;
}

/// Outcome of installing a mapping line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingStatus {
    Added,
    Updated,
    Rejected,
}

impl MappingStatus {
    pub fn is_success(self) -> bool {
        matches!(self, MappingStatus::Added | MappingStatus::Updated)
    }
}

pub trait MappingBackend {
    fn add_mapping(&mut self, mapping: &str) -> MappingStatus;

    /// Current mapping text for `guid`, in whatever form the backend keeps it.
    fn mapping_for_guid(&self, guid: &Guid) -> Option<String>;

    /// Platform name as it appears in `platform:` clauses.
    fn platform(&self) -> &str;
}
