//! Raw input collection from winit events

use indexmap::IndexSet;
use winit::event::{ElementState, MouseScrollDelta, WindowEvent};
use winit::keyboard::PhysicalKey;

use super::events::{Button, Device};
use super::state::RawSample;

/// Collects raw input from winit events and produces one [`RawSample`] per tick
pub struct InputCollector {
    buttons_down: IndexSet<Button>,
    cursor_screen_pos: Option<[f32; 2]>,
    /// Cumulative scroll in pixels
    scroll: [f32; 2],
    /// Size of one world tile in logical pixels, for cursor tile lookups
    tile_size: Option<f32>,
    scale_factor: f32,
}

impl InputCollector {
    /// Creates a new input collector
    pub fn new() -> Self {
        Self {
            buttons_down: IndexSet::new(),
            cursor_screen_pos: None,
            scroll: [0.0, 0.0],
            tile_size: None,
            scale_factor: 1.0,
        }
    }

    /// Update scale factor (DPI scaling)
    pub fn set_scale_factor(&mut self, scale_factor: f32) {
        self.scale_factor = scale_factor;
    }

    /// Report the cursor tile using square tiles of `size` logical pixels
    pub fn set_tile_size(&mut self, size: Option<f32>) {
        self.tile_size = size.filter(|size| *size > 0.0);
    }

    /// Handle a winit window event
    pub fn handle_window_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor_screen_pos = Some([
                    position.x as f32 / self.scale_factor,
                    position.y as f32 / self.scale_factor,
                ]);
            }

            WindowEvent::CursorLeft { .. } => {
                self.cursor_screen_pos = None;
            }

            WindowEvent::MouseInput { state, button, .. } => {
                if let Some(button) = Button::from_mouse_button(*button) {
                    self.set_button(button, *state);
                }
            }

            WindowEvent::MouseWheel { delta, .. } => {
                // Convert MouseScrollDelta to consistent pixel units
                let pixel_delta = match delta {
                    MouseScrollDelta::LineDelta(x, y) => [*x * 20.0, *y * 20.0],
                    MouseScrollDelta::PixelDelta(pos) => [pos.x as f32, pos.y as f32],
                };
                self.scroll[0] += pixel_delta[0];
                self.scroll[1] += pixel_delta[1];
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if event.repeat {
                    return;
                }
                if let PhysicalKey::Code(code) = event.physical_key
                    && let Some(button) = Button::from_key_code(code)
                {
                    self.set_button(button, event.state);
                }
            }

            WindowEvent::Focused(false) => {
                // Releases are not delivered to unfocused windows
                self.buttons_down.clear();
            }

            _ => {}
        }
    }

    /// Record a press or release reported by any source, e.g. a gamepad backend
    pub fn set_button(&mut self, button: Button, state: ElementState) {
        match state {
            ElementState::Pressed => {
                self.buttons_down.insert(button);
            }
            ElementState::Released => {
                self.buttons_down.shift_remove(&button);
            }
        }
    }

    /// Snapshot the current state for one tick
    pub fn sample(&self) -> RawSample {
        let gamepad_activity = self
            .buttons_down
            .iter()
            .any(|button| button.device() == Device::Controller);
        let cursor_tile = match (self.cursor_screen_pos, self.tile_size) {
            (Some([x, y]), Some(size)) => Some([(x / size).floor() as i32, (y / size).floor() as i32]),
            _ => None,
        };

        RawSample {
            buttons_down: self.buttons_down.clone(),
            cursor_screen_pos: self.cursor_screen_pos,
            cursor_tile,
            scroll: self.scroll,
            gamepad_activity,
            cursor_motion_from_mouse: !self.buttons_down.iter().any(|b| b.is_right_thumbstick()),
        }
    }
}

impl Default for InputCollector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buttons_keep_press_order() {
        let mut collector = InputCollector::new();
        collector.set_button(Button::LeftShift, ElementState::Pressed);
        collector.set_button(Button::Space, ElementState::Pressed);
        collector.set_button(Button::Space, ElementState::Pressed);

        let sample = collector.sample();
        assert_eq!(
            sample.buttons_down.iter().copied().collect::<Vec<_>>(),
            vec![Button::LeftShift, Button::Space]
        );
        assert!(!sample.gamepad_activity);

        collector.set_button(Button::LeftShift, ElementState::Released);
        assert!(!collector.sample().is_down(Button::LeftShift));
    }

    #[test]
    fn test_controller_buttons_flag_gamepad_activity() {
        let mut collector = InputCollector::new();
        collector.set_button(Button::RightThumbstickUp, ElementState::Pressed);
        let sample = collector.sample();
        assert!(sample.gamepad_activity);
        assert!(!sample.cursor_motion_from_mouse);
    }

    #[test]
    fn test_cursor_tile_requires_tile_size() {
        let mut collector = InputCollector::new();
        collector.cursor_screen_pos = Some([70.0, 10.0]);
        assert_eq!(collector.sample().cursor_tile, None);

        collector.set_tile_size(Some(64.0));
        assert_eq!(collector.sample().cursor_tile, Some([1, 0]));
    }
}
