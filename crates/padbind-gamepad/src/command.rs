use crossbeam_channel::Sender;

use padbind_joystick::{GamepadInput, JoystickInput, Result};

/// Internal commands sent to the runtime thread. Each request carries the
/// sender its reply goes to.
pub(crate) enum Command {
    SetMapping {
        guid: String,
        gamepad: GamepadInput,
        joystick: JoystickInput,
        reply: Sender<Result<bool>>,
    },
    GetMapping {
        guid: String,
        reply: Sender<String>,
    },
    LoadMappings {
        mappings: String,
        reply: Sender<Result<usize>>,
    },
    SaveMappings {
        reply: Sender<String>,
    },
    Shutdown,
}
