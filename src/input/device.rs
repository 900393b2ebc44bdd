//! Device arbitration and button role mapping

use enum_map::EnumMap;
use indexmap::IndexMap;
use tracing::debug;

use super::events::{Button, Device, Direction, MoveSource, Role};
use super::state::RawSample;
use crate::config::BindingConfig;

/// Tracks which physical device most recently produced activity
///
/// Priority per tick: controller, then keyboard, then mouse, else the
/// previous device is kept.
#[derive(Debug, Clone, Default)]
pub struct DeviceArbiter {
    current: Device,
    /// Whether a baseline cursor/scroll reading exists
    primed: bool,
    last_cursor: Option<[f32; 2]>,
    last_scroll: [f32; 2],
    cursor_moved: bool,
    wheel_delta: [f32; 2],
}

impl DeviceArbiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify `sample`, returning the new device if it changed this tick
    pub fn update(&mut self, sample: &RawSample) -> Option<Device> {
        if self.primed {
            self.cursor_moved =
                sample.cursor_screen_pos.is_some() && sample.cursor_screen_pos != self.last_cursor;
            self.wheel_delta = [
                sample.scroll[0] - self.last_scroll[0],
                sample.scroll[1] - self.last_scroll[1],
            ];
        } else {
            self.primed = true;
            self.cursor_moved = false;
            self.wheel_delta = [0.0, 0.0];
        }
        self.last_cursor = sample.cursor_screen_pos;
        self.last_scroll = sample.scroll;

        let any_down = |device: Device| sample.buttons_down.iter().any(|b| b.device() == device);

        let classified = if sample.gamepad_activity || any_down(Device::Controller) {
            Device::Controller
        } else if any_down(Device::Keyboard) {
            Device::Keyboard
        } else if any_down(Device::Mouse)
            || (self.cursor_moved && sample.cursor_motion_from_mouse)
            || self.wheel_moved()
        {
            Device::Mouse
        } else {
            self.current
        };

        if classified == self.current {
            return None;
        }
        debug!(from = ?self.current, to = ?classified, "Device changed");
        self.current = classified;
        Some(classified)
    }

    /// Device that most recently produced activity
    pub fn current(&self) -> Device {
        self.current
    }

    /// Cursor position changed since the previous tick
    pub fn cursor_moved(&self) -> bool {
        self.cursor_moved
    }

    /// Device the current cursor motion is attributed to, if it moved
    ///
    /// Motion while a right thumbstick direction is down belongs to the controller.
    pub fn cursor_motion_device(&self, sample: &RawSample) -> Option<Device> {
        if !self.cursor_moved {
            return None;
        }
        if sample.buttons_down.iter().any(|b| b.is_right_thumbstick()) {
            Some(Device::Controller)
        } else {
            Some(Device::Mouse)
        }
    }

    /// Either scroll axis changed since the previous tick
    pub fn wheel_moved(&self) -> bool {
        self.wheel_delta != [0.0, 0.0]
    }

    /// Scroll change since the previous tick (horizontal, vertical)
    pub fn wheel_delta(&self) -> [f32; 2] {
        self.wheel_delta
    }
}

/// Static mapping of buttons to roles and move directions
#[derive(Debug, Clone)]
pub struct ButtonMap {
    roles: EnumMap<Role, Vec<Button>>,
    /// Per direction, bound buttons in move precedence order
    moves: EnumMap<Direction, Vec<(MoveSource, Button)>>,
}

impl ButtonMap {
    pub fn from_bindings(bindings: &BindingConfig) -> Self {
        Self {
            roles: EnumMap::from_fn(|role| bindings.roles.buttons(role).to_vec()),
            moves: EnumMap::from_fn(|direction| {
                bindings.moves.direction(direction).by_precedence().collect()
            }),
        }
    }

    /// Device convention `button` follows for `role`, or `Device::None` if unbound
    pub fn classify_role(&self, role: Role, button: Button) -> Device {
        if self.roles[role].contains(&button) {
            button.device()
        } else {
            Device::None
        }
    }

    pub fn role_buttons(&self, role: Role) -> &[Button] {
        &self.roles[role]
    }

    /// Roles `button` is bound to
    pub fn roles_for(&self, button: Button) -> impl Iterator<Item = Role> + '_ {
        Role::ALL
            .into_iter()
            .filter(move |role| self.roles[*role].contains(&button))
    }

    /// Bound buttons for `direction`, in move precedence order
    pub fn move_buttons(&self, direction: Direction) -> &[(MoveSource, Button)] {
        &self.moves[direction]
    }

    /// Move source of `button` for `direction`, if bound
    pub fn move_source(&self, direction: Direction, button: Button) -> Option<MoveSource> {
        self.moves[direction]
            .iter()
            .find(|(_, bound)| *bound == button)
            .map(|(source, _)| *source)
    }

    /// Buttons assigned to more than one role or move direction
    pub fn conflicts(&self) -> Vec<(Button, Vec<String>)> {
        let mut uses: IndexMap<Button, Vec<String>> = IndexMap::new();
        for role in Role::ALL {
            for button in &self.roles[role] {
                uses.entry(*button).or_default().push(format!("{role:?}").to_lowercase());
            }
        }
        for direction in Direction::ALL {
            for (_, button) in &self.moves[direction] {
                uses.entry(*button)
                    .or_default()
                    .push(format!("move {direction:?}").to_lowercase());
            }
        }
        uses.into_iter().filter(|(_, uses)| uses.len() > 1).collect()
    }
}

impl Default for ButtonMap {
    fn default() -> Self {
        Self::from_bindings(&BindingConfig::default())
    }
}
