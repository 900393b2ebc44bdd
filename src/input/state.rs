//! Raw input state

use indexmap::{IndexMap, IndexSet};

use super::events::Button;

/// Raw input snapshot supplied by the host once per tick
#[derive(Debug, Clone, Default)]
pub struct RawSample {
    /// Buttons currently down, in the order they went down
    pub buttons_down: IndexSet<Button>,
    /// Cursor position in screen pixels
    pub cursor_screen_pos: Option<[f32; 2]>,
    /// Cursor position in world tiles
    pub cursor_tile: Option<[i32; 2]>,
    /// Cumulative scroll wheel position (horizontal, vertical)
    pub scroll: [f32; 2],
    /// Any gamepad button down or thumbstick in motion
    pub gamepad_activity: bool,
    /// Last cursor motion came from the mouse rather than a controller
    pub cursor_motion_from_mouse: bool,
}

impl RawSample {
    /// Creates an empty sample
    pub fn new() -> Self {
        Self::default()
    }

    /// Sample with the given buttons down, in order
    pub fn with_buttons(buttons: impl IntoIterator<Item = Button>) -> Self {
        Self {
            buttons_down: buttons.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Builder method to set the cursor position
    pub fn with_cursor(mut self, pos: [f32; 2], from_mouse: bool) -> Self {
        self.cursor_screen_pos = Some(pos);
        self.cursor_motion_from_mouse = from_mouse;
        self
    }

    /// Builder method to set the cumulative scroll position
    pub fn with_scroll(mut self, scroll: [f32; 2]) -> Self {
        self.scroll = scroll;
        self
    }

    /// Builder method to flag gamepad activity
    pub fn with_gamepad_activity(mut self) -> Self {
        self.gamepad_activity = true;
        self
    }

    pub fn is_down(&self, button: Button) -> bool {
        self.buttons_down.contains(&button)
    }
}

/// Button press state with edge detection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ButtonState {
    #[default]
    Released,
    /// Pressed this frame (edge)
    JustPressed,
    /// Held down (multiple frames)
    Pressed,
    /// Released this frame (edge)
    JustReleased,
}

impl ButtonState {
    /// Advance state for next frame (transitions edges to steady states)
    pub fn advance(self) -> Self {
        match self {
            Self::JustPressed => Self::Pressed,
            Self::JustReleased => Self::Released,
            state => state,
        }
    }

    /// Returns true if button is currently down (just pressed or held)
    pub fn is_down(self) -> bool {
        matches!(self, Self::JustPressed | Self::Pressed)
    }

    /// Returns true if button was just pressed this frame
    pub fn is_just_pressed(self) -> bool {
        matches!(self, Self::JustPressed)
    }

    /// Returns true if button is down and was not pressed this frame
    pub fn is_held(self) -> bool {
        matches!(self, Self::Pressed)
    }

    /// Returns true if button was just released this frame
    pub fn is_just_released(self) -> bool {
        matches!(self, Self::JustReleased)
    }
}

/// Button edges produced by one tick, each list in press order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transitions {
    pub released: Vec<Button>,
    pub pressed: Vec<Button>,
}

/// Per-tick input state threaded through the dispatcher
#[derive(Debug, Clone, Default)]
pub struct FrameState {
    tick: u64,
    buttons: IndexMap<Button, ButtonState>,
    sample: RawSample,
}

impl FrameState {
    /// Creates a state at tick 0 with nothing down
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance to the next tick and diff `sample` against the previous one
    pub fn begin_tick(&mut self, sample: RawSample) -> Transitions {
        self.tick += 1;

        for state in self.buttons.values_mut() {
            *state = state.advance();
        }
        self.buttons.retain(|_, state| *state != ButtonState::Released);

        let mut transitions = Transitions::default();

        for (button, state) in self.buttons.iter_mut() {
            if state.is_down() && !sample.is_down(*button) {
                *state = ButtonState::JustReleased;
                transitions.released.push(*button);
            }
        }

        for button in &sample.buttons_down {
            if !self.state(*button).is_down() {
                self.buttons.insert(*button, ButtonState::JustPressed);
                transitions.pressed.push(*button);
            }
        }

        self.sample = sample;
        transitions
    }

    /// Ticks processed so far
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn state(&self, button: Button) -> ButtonState {
        self.buttons.get(&button).copied().unwrap_or_default()
    }

    /// Latest raw sample
    pub fn sample(&self) -> &RawSample {
        &self.sample
    }

    /// Buttons held since before this tick, in press order
    pub fn held_buttons(&self) -> impl Iterator<Item = Button> + '_ {
        self.buttons
            .iter()
            .filter(|(_, state)| state.is_held())
            .map(|(button, _)| *button)
    }
}
