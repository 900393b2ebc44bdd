//! Buttons, devices and the semantic events synthesized each tick

use std::fmt;
use std::sync::Arc;

use enum_map::Enum;
use serde::{Deserialize, Serialize};

/// Physical input device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Device {
    #[default]
    None,
    Mouse,
    Keyboard,
    Controller,
}

/// Input method that produced a directional signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MoveSource {
    #[default]
    None,
    KeyboardWasd,
    KeyboardArrows,
    ControllerDPad,
    ControllerLeftThumbstick,
}

/// One of the four move directions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Enum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Right,
    Down,
    Left,
    Up,
}

impl Direction {
    /// All directions in the order move events are emitted
    pub const ALL: [Direction; 4] = [Self::Right, Self::Down, Self::Left, Self::Up];
}

/// Device-agnostic menu roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Enum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Confirm,
    Cancel,
    Alt,
    Menu,
}

impl Role {
    pub const ALL: [Role; 4] = [Self::Confirm, Self::Cancel, Self::Alt, Self::Menu];
}

/// Transition phase of a semantic event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Fired once on the tick the input went down
    Pressed,
    /// Fired every following tick while the input stays down
    Held,
    /// Fired once on the tick the input went up
    Released,
}

/// Button identifier covering keyboard, mouse and controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Button {
    // Common keys
    Space,
    Enter,
    Escape,
    Backspace,
    Tab,

    // Modifiers
    LeftShift,
    RightShift,
    LeftControl,
    RightControl,
    LeftAlt,
    RightAlt,

    // Letters
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
    L,
    M,
    N,
    O,
    P,
    Q,
    R,
    S,
    T,
    U,
    V,
    W,
    X,
    Y,
    Z,

    // Numbers
    Num0,
    Num1,
    Num2,
    Num3,
    Num4,
    Num5,
    Num6,
    Num7,
    Num8,
    Num9,

    // Function keys
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,

    // Arrows
    Left,
    Right,
    Up,
    Down,

    // Mouse
    MouseLeft,
    MouseRight,
    MouseMiddle,
    MouseX1,
    MouseX2,

    // Controller face and shoulder buttons
    ControllerA,
    ControllerB,
    ControllerX,
    ControllerY,
    ControllerBack,
    ControllerStart,
    LeftShoulder,
    RightShoulder,
    LeftTrigger,
    RightTrigger,
    LeftStick,
    RightStick,

    // Controller directions
    DPadUp,
    DPadDown,
    DPadLeft,
    DPadRight,
    LeftThumbstickUp,
    LeftThumbstickDown,
    LeftThumbstickLeft,
    LeftThumbstickRight,
    RightThumbstickUp,
    RightThumbstickDown,
    RightThumbstickLeft,
    RightThumbstickRight,
}

impl Button {
    /// Device this button belongs to
    pub fn device(self) -> Device {
        use Button::*;
        match self {
            MouseLeft | MouseRight | MouseMiddle | MouseX1 | MouseX2 => Device::Mouse,
            ControllerA | ControllerB | ControllerX | ControllerY | ControllerBack
            | ControllerStart | LeftShoulder | RightShoulder | LeftTrigger | RightTrigger
            | LeftStick | RightStick | DPadUp | DPadDown | DPadLeft | DPadRight
            | LeftThumbstickUp | LeftThumbstickDown | LeftThumbstickLeft
            | LeftThumbstickRight | RightThumbstickUp | RightThumbstickDown
            | RightThumbstickLeft | RightThumbstickRight => Device::Controller,
            _ => Device::Keyboard,
        }
    }

    /// Whether this is a right thumbstick direction (used for cursor attribution)
    pub fn is_right_thumbstick(self) -> bool {
        matches!(
            self,
            Self::RightThumbstickUp
                | Self::RightThumbstickDown
                | Self::RightThumbstickLeft
                | Self::RightThumbstickRight
        )
    }

    /// Convert from a winit key code, `None` for keys outside the vocabulary
    pub fn from_key_code(key: winit::keyboard::KeyCode) -> Option<Self> {
        use winit::keyboard::KeyCode as WK;
        let button = match key {
            WK::Space => Self::Space,
            WK::Enter | WK::NumpadEnter => Self::Enter,
            WK::Escape => Self::Escape,
            WK::Backspace => Self::Backspace,
            WK::Tab => Self::Tab,

            WK::ShiftLeft => Self::LeftShift,
            WK::ShiftRight => Self::RightShift,
            WK::ControlLeft => Self::LeftControl,
            WK::ControlRight => Self::RightControl,
            WK::AltLeft => Self::LeftAlt,
            WK::AltRight => Self::RightAlt,

            WK::KeyA => Self::A,
            WK::KeyB => Self::B,
            WK::KeyC => Self::C,
            WK::KeyD => Self::D,
            WK::KeyE => Self::E,
            WK::KeyF => Self::F,
            WK::KeyG => Self::G,
            WK::KeyH => Self::H,
            WK::KeyI => Self::I,
            WK::KeyJ => Self::J,
            WK::KeyK => Self::K,
            WK::KeyL => Self::L,
            WK::KeyM => Self::M,
            WK::KeyN => Self::N,
            WK::KeyO => Self::O,
            WK::KeyP => Self::P,
            WK::KeyQ => Self::Q,
            WK::KeyR => Self::R,
            WK::KeyS => Self::S,
            WK::KeyT => Self::T,
            WK::KeyU => Self::U,
            WK::KeyV => Self::V,
            WK::KeyW => Self::W,
            WK::KeyX => Self::X,
            WK::KeyY => Self::Y,
            WK::KeyZ => Self::Z,

            WK::Digit0 => Self::Num0,
            WK::Digit1 => Self::Num1,
            WK::Digit2 => Self::Num2,
            WK::Digit3 => Self::Num3,
            WK::Digit4 => Self::Num4,
            WK::Digit5 => Self::Num5,
            WK::Digit6 => Self::Num6,
            WK::Digit7 => Self::Num7,
            WK::Digit8 => Self::Num8,
            WK::Digit9 => Self::Num9,

            WK::F1 => Self::F1,
            WK::F2 => Self::F2,
            WK::F3 => Self::F3,
            WK::F4 => Self::F4,
            WK::F5 => Self::F5,
            WK::F6 => Self::F6,
            WK::F7 => Self::F7,
            WK::F8 => Self::F8,
            WK::F9 => Self::F9,
            WK::F10 => Self::F10,
            WK::F11 => Self::F11,
            WK::F12 => Self::F12,

            WK::ArrowLeft => Self::Left,
            WK::ArrowRight => Self::Right,
            WK::ArrowUp => Self::Up,
            WK::ArrowDown => Self::Down,

            _ => return None,
        };
        Some(button)
    }

    /// Convert from a winit mouse button, `None` for unnamed extra buttons
    pub fn from_mouse_button(button: winit::event::MouseButton) -> Option<Self> {
        use winit::event::MouseButton as WM;
        match button {
            WM::Left => Some(Self::MouseLeft),
            WM::Right => Some(Self::MouseRight),
            WM::Middle => Some(Self::MouseMiddle),
            WM::Back => Some(Self::MouseX1),
            WM::Forward => Some(Self::MouseX2),
            WM::Other(_) => None,
        }
    }
}

impl fmt::Display for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Ordered button pair: `held` was already down when `pressed` went down
///
/// `(LeftShift, Space)` and `(Space, LeftShift)` are different chords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Chord {
    pub held: Button,
    pub pressed: Button,
}

impl Chord {
    pub fn new(held: Button, pressed: Button) -> Self {
        Self { held, pressed }
    }

    /// True if `button` is either member of the pair
    pub fn contains(&self, button: Button) -> bool {
        self.held == button || self.pressed == button
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}+{}", self.held, self.pressed)
    }
}

/// Something that can trigger an action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Trigger {
    Button(Button),
    Chord(Chord),
}

impl From<Button> for Trigger {
    fn from(button: Button) -> Self {
        Self::Button(button)
    }
}

impl From<Chord> for Trigger {
    fn from(chord: Chord) -> Self {
        Self::Chord(chord)
    }
}

impl From<(Button, Button)> for Trigger {
    fn from((held, pressed): (Button, Button)) -> Self {
        Self::Chord(Chord::new(held, pressed))
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Button(button) => button.fmt(f),
            Self::Chord(chord) => chord.fmt(f),
        }
    }
}

/// Caller-defined action identifier (e.g. "Jump")
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionId(Arc<str>);

impl ActionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ActionId {
    fn from(id: &str) -> Self {
        Self(Arc::from(id))
    }
}

impl From<String> for ActionId {
    fn from(id: String) -> Self {
        Self(Arc::from(id))
    }
}

impl From<&ActionId> for ActionId {
    fn from(id: &ActionId) -> Self {
        id.clone()
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Combined move direction, each component in `{-1, 0, 1}`
///
/// `x` grows to the right, `y` grows downward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MoveAxis {
    pub x: i8,
    pub y: i8,
}

impl MoveAxis {
    pub const ZERO: MoveAxis = MoveAxis { x: 0, y: 0 };

    pub fn new(x: i8, y: i8) -> Self {
        Self {
            x: x.signum(),
            y: y.signum(),
        }
    }

    pub fn is_zero(self) -> bool {
        self == Self::ZERO
    }
}

/// Event categories scopes can subscribe to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Button,
    Chord,
    Action,
    Role(Role),
    Move(Direction),
    MoveAxis,
    DeviceChanged,
    CursorMoved,
    WheelMoved,
    Ticked,
}

/// Semantic input events synthesized from raw button states
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Single button transition
    Button { phase: Phase, button: Button },

    /// Ordered button pair transition
    Chord { phase: Phase, chord: Chord },

    /// Registered action fired by one of its triggers
    Action {
        phase: Phase,
        action: ActionId,
        trigger: Trigger,
    },

    /// Confirm / cancel / alt / menu
    Role {
        phase: Phase,
        role: Role,
        button: Button,
        device: Device,
    },

    /// One of the four directional move signals
    Move {
        phase: Phase,
        direction: Direction,
        source: MoveSource,
        button: Button,
    },

    /// Combined 2D move axis
    MoveAxis { phase: Phase, axis: MoveAxis },

    /// The device in use changed
    DeviceChanged { device: Device },

    /// The cursor moved, attributed to mouse or controller
    CursorMoved { device: Device },

    /// Scroll wheel moved by `delta` (horizontal, vertical)
    WheelMoved { delta: [f32; 2] },

    /// Generic per-tick notice, always last in a tick
    Ticked { tick: u64 },
}

impl InputEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Button { .. } => EventKind::Button,
            Self::Chord { .. } => EventKind::Chord,
            Self::Action { .. } => EventKind::Action,
            Self::Role { role, .. } => EventKind::Role(*role),
            Self::Move { direction, .. } => EventKind::Move(*direction),
            Self::MoveAxis { .. } => EventKind::MoveAxis,
            Self::DeviceChanged { .. } => EventKind::DeviceChanged,
            Self::CursorMoved { .. } => EventKind::CursorMoved,
            Self::WheelMoved { .. } => EventKind::WheelMoved,
            Self::Ticked { .. } => EventKind::Ticked,
        }
    }

    /// Transition phase, `None` for one-shot notices
    pub fn phase(&self) -> Option<Phase> {
        match self {
            Self::Button { phase, .. }
            | Self::Chord { phase, .. }
            | Self::Action { phase, .. }
            | Self::Role { phase, .. }
            | Self::Move { phase, .. }
            | Self::MoveAxis { phase, .. } => Some(*phase),
            _ => None,
        }
    }
}
