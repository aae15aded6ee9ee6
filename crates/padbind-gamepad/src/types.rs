use padbind_joystick::{DeviceHandle, Guid, InstanceId, JoystickId, LogicalJoystick};

/// Snapshot of a connected joystick, safe to hand to other threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoystickInfo {
    /// Position in connection order at the time of the snapshot.
    pub index: usize,
    pub id: JoystickId,
    pub instance_id: Option<InstanceId>,
    pub guid: Guid,
    pub name: String,
    pub gamepad: bool,
}

impl JoystickInfo {
    pub(crate) fn new<H: DeviceHandle>(index: usize, stick: &LogicalJoystick<H>) -> Self {
        Self {
            index,
            id: stick.id(),
            instance_id: stick.instance_id(),
            guid: stick.guid(),
            name: stick.name().to_string(),
            gamepad: stick.is_gamepad(),
        }
    }
}
