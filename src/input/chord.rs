//! Button-pair (chord) tracking
//!
//! Every press forms a chord with each button already held. A chord lives in
//! the pressing set until either member goes up, then stays observable as
//! "released" for the tick it was released on.

use indexmap::IndexSet;

use super::events::{Button, Chord};
use super::state::FrameState;

/// State machine over held buttons and held/released chords
#[derive(Debug, Clone, Default)]
pub struct ChordTracker {
    held: IndexSet<Button>,
    pressing: IndexSet<Chord>,
    released: IndexSet<Chord>,
    released_at_tick: u64,
    pressed_at_tick: u64,
    pressed_this_tick: IndexSet<Chord>,
}

impl ChordTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a press of `button` at `tick`, returning the chords it completes
    pub fn press(&mut self, button: Button, tick: u64) -> Vec<Chord> {
        if self.pressed_at_tick != tick {
            self.pressed_this_tick.clear();
            self.pressed_at_tick = tick;
        }

        let mut formed = Vec::new();
        for held in &self.held {
            if *held == button {
                continue;
            }
            let chord = Chord::new(*held, button);
            if self.pressing.insert(chord) {
                self.pressed_this_tick.insert(chord);
                formed.push(chord);
            }
        }
        self.held.insert(button);
        formed
    }

    /// Record a release of `button` at `tick`, returning the chords it ends
    pub fn release(&mut self, button: Button, tick: u64) -> Vec<Chord> {
        // Both members going up in one tick must not wipe the first release
        if self.released_at_tick != tick {
            self.released.clear();
            self.released_at_tick = tick;
        }

        let ended: Vec<Chord> = self
            .pressing
            .iter()
            .filter(|chord| chord.contains(button))
            .copied()
            .collect();
        for chord in &ended {
            self.pressing.shift_remove(chord);
            self.released.insert(*chord);
        }
        self.held.shift_remove(&button);
        ended
    }

    /// Chords held since before `tick`
    pub fn held_chords(&self, tick: u64) -> impl Iterator<Item = Chord> + '_ {
        let fresh = if self.pressed_at_tick == tick {
            Some(&self.pressed_this_tick)
        } else {
            None
        };
        self.pressing
            .iter()
            .filter(move |chord| !fresh.is_some_and(|set| set.contains(*chord)))
            .copied()
    }

    /// Chords whose both members are down
    pub fn pressing(&self) -> impl Iterator<Item = Chord> + '_ {
        self.pressing.iter().copied()
    }

    pub fn is_button_held(&self, button: Button) -> bool {
        self.held.contains(&button)
    }

    /// `held` is down and `pressed` went down this tick, completing the pair
    pub fn is_pair_pressed(&self, chord: Chord, frame: &FrameState) -> bool {
        self.pressing.contains(&chord)
            && frame.state(chord.held).is_down()
            && frame.state(chord.pressed).is_just_pressed()
    }

    /// The pair is tracked and both members are still down
    pub fn is_pair_held(&self, chord: Chord, frame: &FrameState) -> bool {
        self.pressing.contains(&chord)
            && frame.state(chord.held).is_down()
            && frame.state(chord.pressed).is_down()
    }

    /// The pair ended within the last tick and one member just went up
    pub fn is_pair_released(&self, chord: Chord, frame: &FrameState) -> bool {
        frame.tick().saturating_sub(self.released_at_tick) <= 1
            && self.released.contains(&chord)
            && (frame.state(chord.held).is_just_released()
                || frame.state(chord.pressed).is_just_released())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::state::RawSample;

    #[derive(Debug, Default)]
    struct ChordEdges {
        pressed: Vec<Chord>,
        released: Vec<Chord>,
    }

    const SHIFT: Button = Button::LeftShift;
    const SPACE: Button = Button::Space;

    /// Drives a frame and tracker the way the dispatcher does
    fn step(frame: &mut FrameState, tracker: &mut ChordTracker, down: &[Button]) -> ChordEdges {
        let transitions = frame.begin_tick(RawSample::with_buttons(down.iter().copied()));
        let mut edges = ChordEdges::default();
        for button in transitions.released {
            edges.released.extend(tracker.release(button, frame.tick()));
        }
        for button in transitions.pressed {
            edges.pressed.extend(tracker.press(button, frame.tick()));
        }
        edges
    }

    #[test]
    fn test_press_forms_ordered_chord() {
        let mut frame = FrameState::new();
        let mut tracker = ChordTracker::new();

        assert!(step(&mut frame, &mut tracker, &[SHIFT]).pressed.is_empty());
        let edges = step(&mut frame, &mut tracker, &[SHIFT, SPACE]);
        assert_eq!(edges.pressed, vec![Chord::new(SHIFT, SPACE)]);

        assert!(tracker.is_pair_pressed(Chord::new(SHIFT, SPACE), &frame));
        assert!(!tracker.is_pair_pressed(Chord::new(SPACE, SHIFT), &frame));
        assert!(tracker.is_pair_held(Chord::new(SHIFT, SPACE), &frame));
    }

    #[test]
    fn test_same_tick_presses_form_chord_in_sample_order() {
        let mut frame = FrameState::new();
        let mut tracker = ChordTracker::new();

        let edges = step(&mut frame, &mut tracker, &[SHIFT, SPACE]);
        assert_eq!(edges.pressed, vec![Chord::new(SHIFT, SPACE)]);
        assert!(tracker.is_pair_pressed(Chord::new(SHIFT, SPACE), &frame));
    }

    #[test]
    fn test_three_buttons_form_chords_with_each_held() {
        let mut frame = FrameState::new();
        let mut tracker = ChordTracker::new();

        step(&mut frame, &mut tracker, &[Button::A, Button::B]);
        let edges = step(&mut frame, &mut tracker, &[Button::A, Button::B, Button::C]);
        assert_eq!(
            edges.pressed,
            vec![Chord::new(Button::A, Button::C), Chord::new(Button::B, Button::C)]
        );
    }

    #[test]
    fn test_held_chords_skip_press_tick() {
        let mut frame = FrameState::new();
        let mut tracker = ChordTracker::new();

        step(&mut frame, &mut tracker, &[SHIFT, SPACE]);
        assert_eq!(tracker.held_chords(frame.tick()).count(), 0);

        step(&mut frame, &mut tracker, &[SHIFT, SPACE]);
        assert_eq!(
            tracker.held_chords(frame.tick()).collect::<Vec<_>>(),
            vec![Chord::new(SHIFT, SPACE)]
        );
    }

    #[test]
    fn test_release_is_observable_for_one_tick() {
        let mut frame = FrameState::new();
        let mut tracker = ChordTracker::new();
        let chord = Chord::new(SHIFT, SPACE);

        step(&mut frame, &mut tracker, &[SHIFT, SPACE]);
        let edges = step(&mut frame, &mut tracker, &[SHIFT]);
        assert_eq!(edges.released, vec![chord]);
        assert!(tracker.is_pair_released(chord, &frame));
        assert!(!tracker.is_pair_held(chord, &frame));

        step(&mut frame, &mut tracker, &[SHIFT]);
        assert!(!tracker.is_pair_released(chord, &frame));
    }

    #[test]
    fn test_releasing_both_members_yields_one_event() {
        let mut frame = FrameState::new();
        let mut tracker = ChordTracker::new();
        let chord = Chord::new(SHIFT, SPACE);

        step(&mut frame, &mut tracker, &[SHIFT, SPACE]);
        let edges = step(&mut frame, &mut tracker, &[]);
        assert_eq!(edges.released, vec![chord]);
        assert!(tracker.is_pair_released(chord, &frame));
        assert!(!tracker.is_button_held(SHIFT));
        assert!(!tracker.is_button_held(SPACE));
    }
}
