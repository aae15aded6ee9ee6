use crossbeam_channel::Receiver;

use crate::types::JoystickInfo;

/// Events emitted by the runtime about joystick lifecycle and mappings.
#[derive(Debug, Clone)]
pub enum JoystickEvent {
    /// A joystick has been opened and added to the active set.
    Connected(JoystickInfo),
    /// A joystick left the active set. Carries its last snapshot.
    Disconnected(JoystickInfo),
    /// The mapping database changed and gamepad flags may have moved.
    MappingsChanged,
}

/// Receiving end for joystick events subscription.
pub type EventReceiver = Receiver<JoystickEvent>;
