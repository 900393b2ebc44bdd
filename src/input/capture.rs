//! Interactive keybinding capture
//!
//! Listens for exactly one of: a completed chord, a single button pressed
//! and released on its own, or a cancel button.

use std::fmt;

use tracing::debug;

use super::events::{Button, Chord, InputEvent, Phase, Trigger};
use super::scope::BlockBehavior;

/// A binding chosen by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keybinding {
    Single(Button),
    Chord(Chord),
}

impl From<Keybinding> for Trigger {
    fn from(binding: Keybinding) -> Self {
        match binding {
            Keybinding::Single(button) => Trigger::Button(button),
            Keybinding::Chord(chord) => Trigger::Chord(chord),
        }
    }
}

impl fmt::Display for Keybinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(button) => button.fmt(f),
            Self::Chord(chord) => chord.fmt(f),
        }
    }
}

/// Called exactly once with the captured binding, or `None` when cancelled
pub type KeybindingCallback = Box<dyn FnOnce(Option<Keybinding>)>;

/// Capture state machine fed with the events reaching the capture scope
#[derive(Debug, Clone, Default)]
pub struct KeybindingCapture {
    candidate: Option<Button>,
    outcome: Option<Option<Keybinding>>,
}

impl KeybindingCapture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one event, returning true once the capture has resolved
    pub fn feed(&mut self, event: &InputEvent, cancel_buttons: &[Button]) -> bool {
        if self.outcome.is_some() {
            return true;
        }
        match *event {
            InputEvent::Button {
                phase: Phase::Pressed,
                button,
            } if cancel_buttons.contains(&button) => {
                debug!(%button, "Keybinding capture cancelled");
                self.outcome = Some(None);
            }
            InputEvent::Chord {
                phase: Phase::Pressed,
                chord,
            } => {
                debug!(%chord, "Captured chord");
                self.outcome = Some(Some(Keybinding::Chord(chord)));
            }
            InputEvent::Button {
                phase: Phase::Pressed,
                button,
            } => {
                self.candidate = Some(button);
            }
            InputEvent::Button {
                phase: Phase::Released,
                button,
            } if self.candidate == Some(button) => {
                debug!(%button, "Captured button");
                self.outcome = Some(Some(Keybinding::Single(button)));
            }
            _ => {}
        }
        self.outcome.is_some()
    }

    pub fn is_resolved(&self) -> bool {
        self.outcome.is_some()
    }

    /// Resolved binding; `Some(None)` means cancelled
    pub fn outcome(&self) -> Option<Option<Keybinding>> {
        self.outcome
    }
}

/// A running capture with everything needed to tear it down
pub(crate) struct CaptureSession {
    pub(crate) capture: KeybindingCapture,
    pub(crate) callback: KeybindingCallback,
    /// Global scope settings to restore on teardown
    pub(crate) saved_global: (bool, BlockBehavior),
}

#[cfg(test)]
mod tests {
    use super::*;

    const CANCEL: &[Button] = &[Button::Escape, Button::ControllerB];

    fn button(phase: Phase, button: Button) -> InputEvent {
        InputEvent::Button { phase, button }
    }

    #[test]
    fn test_single_press_and_release() {
        let mut capture = KeybindingCapture::new();
        assert!(!capture.feed(&button(Phase::Pressed, Button::K), CANCEL));
        assert!(!capture.feed(&button(Phase::Held, Button::K), CANCEL));
        assert!(capture.feed(&button(Phase::Released, Button::K), CANCEL));
        assert_eq!(capture.outcome(), Some(Some(Keybinding::Single(Button::K))));
    }

    #[test]
    fn test_chord_resolves_immediately() {
        let mut capture = KeybindingCapture::new();
        let chord = Chord::new(Button::LeftShift, Button::K);
        capture.feed(&button(Phase::Pressed, Button::LeftShift), CANCEL);
        assert!(capture.feed(
            &InputEvent::Chord {
                phase: Phase::Pressed,
                chord
            },
            CANCEL
        ));
        assert_eq!(capture.outcome(), Some(Some(Keybinding::Chord(chord))));

        capture.feed(&button(Phase::Released, Button::LeftShift), CANCEL);
        assert_eq!(
            capture.outcome(),
            Some(Some(Keybinding::Chord(chord))),
            "outcome is fixed once resolved"
        );
    }

    #[test]
    fn test_cancel_button() {
        let mut capture = KeybindingCapture::new();
        assert!(capture.feed(&button(Phase::Pressed, Button::Escape), CANCEL));
        assert_eq!(capture.outcome(), Some(None));
    }

    #[test]
    fn test_release_of_button_held_before_capture_is_ignored() {
        let mut capture = KeybindingCapture::new();
        assert!(!capture.feed(&button(Phase::Released, Button::Enter), CANCEL));
        assert!(!capture.is_resolved());
    }
}
