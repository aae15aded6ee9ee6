use std::str::FromStr;

use crate::{Error, Result};

/// Position of a joystick hat, with SDL's bit layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HatDirection {
    Centered,
    Up,
    Right,
    Down,
    Left,
    RightUp,
    RightDown,
    LeftUp,
    LeftDown,
}

/// (direction, short name, SDL bitmask)
const HAT_TABLE: [(HatDirection, &str, u8); 9] = [
    (HatDirection::Centered, "c", 0x00),
    (HatDirection::Up, "u", 0x01),
    (HatDirection::Right, "r", 0x02),
    (HatDirection::Down, "d", 0x04),
    (HatDirection::Left, "l", 0x08),
    (HatDirection::RightUp, "ru", 0x03),
    (HatDirection::RightDown, "rd", 0x06),
    (HatDirection::LeftUp, "lu", 0x09),
    (HatDirection::LeftDown, "ld", 0x0c),
];

impl HatDirection {
    pub fn bits(self) -> u8 {
        HAT_TABLE
            .iter()
            .find(|(dir, _, _)| *dir == self)
            .map(|(_, _, bits)| *bits)
            .unwrap_or(0)
    }

    /// Returns `None` for masks SDL never reports, e.g. up and down at once.
    pub fn from_bits(bits: u8) -> Option<Self> {
        HAT_TABLE
            .iter()
            .find(|(_, _, b)| *b == bits)
            .map(|(dir, _, _)| *dir)
    }
}

impl FromStr for HatDirection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        HAT_TABLE
            .iter()
            .find(|(_, name, _)| *name == s)
            .map(|(dir, _, _)| *dir)
            .ok_or(Error::InvalidInput)
    }
}

/// A physical input on a raw joystick.
///
/// Indices are signed because callers use negative values to mean
/// "nothing selected". Such inputs can never be encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JoystickInput {
    Axis(i32),
    Button(i32),
    Hat { index: i32, direction: HatDirection },
}

impl JoystickInput {
    /// Encodes the input as a mapping token: `a2`, `b10`, `h0.4`.
    pub fn token(&self) -> Result<String> {
        match *self {
            JoystickInput::Axis(axis) if axis >= 0 => Ok(format!("a{axis}")),
            JoystickInput::Button(button) if button >= 0 => {
                Ok(format!("b{button}"))
            }
            JoystickInput::Hat { index, direction } if index >= 0 => {
                Ok(format!("h{index}.{}", direction.bits()))
            }
            _ => Err(Error::InvalidInput),
        }
    }
}

impl FromStr for JoystickInput {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let parse_index =
            |raw: &str| raw.parse::<i32>().map_err(|_| Error::InvalidInput);

        if let Some(rest) = s.strip_prefix('a') {
            return Ok(JoystickInput::Axis(parse_index(rest)?));
        }
        if let Some(rest) = s.strip_prefix('b') {
            return Ok(JoystickInput::Button(parse_index(rest)?));
        }
        if let Some(rest) = s.strip_prefix('h') {
            let (index, mask) = rest.split_once('.').ok_or(Error::InvalidInput)?;
            let mask = mask.parse::<u8>().map_err(|_| Error::InvalidInput)?;
            let direction = HatDirection::from_bits(mask).ok_or(Error::InvalidInput)?;
            return Ok(JoystickInput::Hat {
                index: parse_index(index)?,
                direction,
            });
        }
        Err(Error::InvalidInput)
    }
}

/// Logical gamepad axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GamepadAxis {
    LeftX,
    LeftY,
    RightX,
    RightY,
    LeftTrigger,
    RightTrigger,
}

const AXIS_TABLE: [(GamepadAxis, &str); 6] = [
    (GamepadAxis::LeftX, "leftx"),
    (GamepadAxis::LeftY, "lefty"),
    (GamepadAxis::RightX, "rightx"),
    (GamepadAxis::RightY, "righty"),
    (GamepadAxis::LeftTrigger, "lefttrigger"),
    (GamepadAxis::RightTrigger, "righttrigger"),
];

/// Logical gamepad buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GamepadButton {
    A,
    B,
    X,
    Y,
    Back,
    Guide,
    Start,
    LeftStick,
    RightStick,
    LeftShoulder,
    RightShoulder,
    DPadUp,
    DPadDown,
    DPadLeft,
    DPadRight,
    Misc1,
    Paddle1,
    Paddle2,
    Paddle3,
    Paddle4,
    Touchpad,
}

const BUTTON_TABLE: [(GamepadButton, &str); 21] = [
    (GamepadButton::A, "a"),
    (GamepadButton::B, "b"),
    (GamepadButton::X, "x"),
    (GamepadButton::Y, "y"),
    (GamepadButton::Back, "back"),
    (GamepadButton::Guide, "guide"),
    (GamepadButton::Start, "start"),
    (GamepadButton::LeftStick, "leftstick"),
    (GamepadButton::RightStick, "rightstick"),
    (GamepadButton::LeftShoulder, "leftshoulder"),
    (GamepadButton::RightShoulder, "rightshoulder"),
    (GamepadButton::DPadUp, "dpup"),
    (GamepadButton::DPadDown, "dpdown"),
    (GamepadButton::DPadLeft, "dpleft"),
    (GamepadButton::DPadRight, "dpright"),
    (GamepadButton::Misc1, "misc1"),
    (GamepadButton::Paddle1, "paddle1"),
    (GamepadButton::Paddle2, "paddle2"),
    (GamepadButton::Paddle3, "paddle3"),
    (GamepadButton::Paddle4, "paddle4"),
    (GamepadButton::Touchpad, "touchpad"),
];

impl GamepadAxis {
    /// Name used inside mapping strings.
    pub fn as_str(self) -> &'static str {
        AXIS_TABLE
            .iter()
            .find(|(axis, _)| *axis == self)
            .map(|(_, name)| *name)
            .unwrap_or("")
    }
}

impl GamepadButton {
    /// Name used inside mapping strings.
    pub fn as_str(self) -> &'static str {
        BUTTON_TABLE
            .iter()
            .find(|(button, _)| *button == self)
            .map(|(_, name)| *name)
            .unwrap_or("")
    }
}

/// A logical gamepad input, the left side of a `name:token` clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GamepadInput {
    Axis(GamepadAxis),
    Button(GamepadButton),
}

impl GamepadInput {
    pub fn as_str(self) -> &'static str {
        match self {
            GamepadInput::Axis(axis) => axis.as_str(),
            GamepadInput::Button(button) => button.as_str(),
        }
    }
}

impl From<GamepadAxis> for GamepadInput {
    fn from(axis: GamepadAxis) -> Self {
        GamepadInput::Axis(axis)
    }
}

impl From<GamepadButton> for GamepadInput {
    fn from(button: GamepadButton) -> Self {
        GamepadInput::Button(button)
    }
}

impl FromStr for GamepadInput {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim().to_lowercase();
        let canonical = match name.as_str() {
            "triggerleft" | "lt" | "left_trigger" => "lefttrigger",
            "triggerright" | "rt" | "right_trigger" => "righttrigger",
            "lb" | "left_shoulder" => "leftshoulder",
            "rb" | "right_shoulder" => "rightshoulder",
            "ls" | "left_stick" => "leftstick",
            "rs" | "right_stick" => "rightstick",
            "select" => "back",
            "home" => "guide",
            "dpad_up" => "dpup",
            "dpad_down" => "dpdown",
            "dpad_left" => "dpleft",
            "dpad_right" => "dpright",
            other => other,
        };

        if let Some((axis, _)) = AXIS_TABLE.iter().find(|(_, n)| *n == canonical) {
            return Ok(GamepadInput::Axis(*axis));
        }
        if let Some((button, _)) =
            BUTTON_TABLE.iter().find(|(_, n)| *n == canonical)
        {
            return Ok(GamepadInput::Button(*button));
        }
        Err(Error::InvalidGamepadInput(s.to_string()))
    }
}
