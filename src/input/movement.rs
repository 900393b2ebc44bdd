//! Directional movement from multiple move sources
//!
//! Each direction is resolved independently with fixed precedence
//! D-Pad > left thumbstick > WASD > arrow keys, then the four directions are
//! combined into a [`MoveAxis`].

use bitflags::bitflags;
use enum_map::EnumMap;

use super::device::ButtonMap;
use super::events::{Button, Direction, InputEvent, MoveAxis, MoveSource, Phase};
use super::state::{ButtonState, FrameState};

bitflags! {
    /// Set of enabled move sources
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MoveSources: u8 {
        const WASD = 1 << 0;
        const ARROWS = 1 << 1;
        const DPAD = 1 << 2;
        const LEFT_THUMBSTICK = 1 << 3;
    }
}

impl MoveSources {
    /// Whether `source` is enabled in this set
    pub fn includes(self, source: MoveSource) -> bool {
        let flag = match source {
            MoveSource::None => return false,
            MoveSource::KeyboardWasd => Self::WASD,
            MoveSource::KeyboardArrows => Self::ARROWS,
            MoveSource::ControllerDPad => Self::DPAD,
            MoveSource::ControllerLeftThumbstick => Self::LEFT_THUMBSTICK,
        };
        self.contains(flag)
    }
}

impl Default for MoveSources {
    fn default() -> Self {
        Self::all()
    }
}

/// First enabled binding for `direction` whose button state satisfies `test`
pub fn resolve(
    map: &ButtonMap,
    frame: &FrameState,
    direction: Direction,
    sources: MoveSources,
    test: impl Fn(ButtonState) -> bool,
) -> Option<(MoveSource, Button)> {
    map.move_buttons(direction)
        .iter()
        .find(|(source, button)| sources.includes(*source) && test(frame.state(*button)))
        .copied()
}

/// Combine direction activity into an axis; opposite directions favour right and down
pub fn combine(active: impl Fn(Direction) -> bool) -> MoveAxis {
    let x = if active(Direction::Right) {
        1
    } else if active(Direction::Left) {
        -1
    } else {
        0
    };
    let y = if active(Direction::Down) {
        1
    } else if active(Direction::Up) {
        -1
    } else {
        0
    };
    MoveAxis::new(x, y)
}

/// Per-direction move state carried across ticks
#[derive(Debug, Clone, Default)]
pub struct MoveTracker {
    directions: EnumMap<Direction, Option<(MoveSource, Button)>>,
    axis: MoveAxis,
}

impl MoveTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve this tick's directions and return the move and axis events
    pub fn update(
        &mut self,
        map: &ButtonMap,
        frame: &FrameState,
        sources: MoveSources,
    ) -> Vec<InputEvent> {
        let mut events = Vec::new();

        for direction in Direction::ALL {
            let now = resolve(map, frame, direction, sources, ButtonState::is_down);
            let phase_and_binding = match (self.directions[direction], now) {
                (None, Some(binding)) => Some((Phase::Pressed, binding)),
                (Some(_), Some(binding)) => Some((Phase::Held, binding)),
                (Some(binding), None) => Some((Phase::Released, binding)),
                (None, None) => None,
            };
            if let Some((phase, (source, button))) = phase_and_binding {
                events.push(InputEvent::Move {
                    phase,
                    direction,
                    source,
                    button,
                });
            }
            self.directions[direction] = now;
        }

        let axis = combine(|direction| self.directions[direction].is_some());
        let phase = match (self.axis.is_zero(), axis.is_zero()) {
            (true, false) => Some((Phase::Pressed, axis)),
            (false, false) => Some((Phase::Held, axis)),
            (false, true) => Some((Phase::Released, self.axis)),
            (true, true) => None,
        };
        if let Some((phase, axis)) = phase {
            events.push(InputEvent::MoveAxis { phase, axis });
        }
        self.axis = axis;

        events
    }

    /// Current winning binding for `direction`
    pub fn direction(&self, direction: Direction) -> Option<(MoveSource, Button)> {
        self.directions[direction]
    }

    pub fn axis(&self) -> MoveAxis {
        self.axis
    }
}
