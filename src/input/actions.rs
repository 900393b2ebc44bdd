//! Action registry
//!
//! Maps caller-defined action ids to the buttons and chords that trigger them,
//! with reverse indices kept in lock-step so per-tick resolution is a lookup.

use std::collections::HashMap;

use indexmap::{IndexMap, IndexSet};
use tracing::{debug, warn};

use super::events::{ActionId, Button, Chord, Trigger};
use crate::error::{InputError, Result};

/// Bidirectional action ↔ trigger mapping
#[derive(Debug, Clone, Default)]
pub struct ActionRegistry {
    /// Triggers per action, in registration order
    triggers: IndexMap<ActionId, IndexSet<Trigger>>,
    by_button: HashMap<Button, IndexSet<ActionId>>,
    by_chord: HashMap<Chord, IndexSet<ActionId>>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `action` with `triggers`, appending to any existing triggers
    ///
    /// Registering a trigger the action already has is a no-op for that trigger.
    pub fn register<T>(
        &mut self,
        action: impl Into<ActionId>,
        triggers: impl IntoIterator<Item = T>,
    ) -> Result<()>
    where
        T: Into<Trigger>,
    {
        let action = action.into();
        if action.as_str().trim().is_empty() {
            warn!("Action id required to register an action");
            return Err(InputError::InvalidAction);
        }

        let set = self.triggers.entry(action.clone()).or_default();
        for trigger in triggers {
            let trigger = trigger.into();
            if !set.insert(trigger) {
                continue;
            }
            match trigger {
                Trigger::Button(button) => {
                    self.by_button.entry(button).or_default().insert(action.clone());
                }
                Trigger::Chord(chord) => {
                    self.by_chord.entry(chord).or_default().insert(action.clone());
                }
            }
        }
        debug!(action = %action, triggers = set.len(), "Registered action");
        Ok(())
    }

    /// Remove `action` from forward and reverse indices, returning whether it existed
    pub fn unregister(&mut self, action: &ActionId) -> bool {
        let Some(triggers) = self.triggers.shift_remove(action) else {
            return false;
        };
        for trigger in triggers {
            match trigger {
                Trigger::Button(button) => {
                    if let Some(actions) = self.by_button.get_mut(&button) {
                        actions.shift_remove(action);
                        if actions.is_empty() {
                            self.by_button.remove(&button);
                        }
                    }
                }
                Trigger::Chord(chord) => {
                    if let Some(actions) = self.by_chord.get_mut(&chord) {
                        actions.shift_remove(action);
                        if actions.is_empty() {
                            self.by_chord.remove(&chord);
                        }
                    }
                }
            }
        }
        debug!(action = %action, "Unregistered action");
        true
    }

    /// Actions a single button triggers, in registration order
    pub fn actions_for_button(&self, button: Button) -> impl Iterator<Item = &ActionId> {
        self.by_button.get(&button).into_iter().flatten()
    }

    /// Actions a chord triggers, in registration order
    pub fn actions_for_chord(&self, chord: Chord) -> impl Iterator<Item = &ActionId> {
        self.by_chord.get(&chord).into_iter().flatten()
    }

    /// Actions a trigger fires
    pub fn actions_for_trigger(&self, trigger: Trigger) -> impl Iterator<Item = &ActionId> {
        let set = match trigger {
            Trigger::Button(button) => self.by_button.get(&button),
            Trigger::Chord(chord) => self.by_chord.get(&chord),
        };
        set.into_iter().flatten()
    }

    /// Every trigger of `action`, in registration order
    pub fn triggers_for_action(&self, action: &ActionId) -> impl Iterator<Item = Trigger> + '_ {
        self.triggers.get(action).into_iter().flatten().copied()
    }

    /// Chord triggers of `action`, in registration order
    pub fn chords_for_action(&self, action: &ActionId) -> impl Iterator<Item = Chord> + '_ {
        self.triggers_for_action(action).filter_map(|trigger| match trigger {
            Trigger::Chord(chord) => Some(chord),
            Trigger::Button(_) => None,
        })
    }

    pub fn contains(&self, action: &ActionId) -> bool {
        self.triggers.contains_key(action)
    }

    /// Registered actions with their triggers, in registration order
    pub fn iter(&self) -> impl Iterator<Item = (&ActionId, impl Iterator<Item = Trigger> + '_)> {
        self.triggers
            .iter()
            .map(|(action, triggers)| (action, triggers.iter().copied()))
    }

    pub fn len(&self) -> usize {
        self.triggers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triggers.is_empty()
    }

    /// Triggers bound to more than one action
    ///
    /// Conflicts are reported only; every bound action still fires.
    pub fn conflicts(&self) -> Vec<(Trigger, Vec<ActionId>)> {
        let buttons = self
            .by_button
            .iter()
            .filter(|(_, actions)| actions.len() > 1)
            .map(|(button, actions)| (Trigger::Button(*button), actions.iter().cloned().collect()));
        let chords = self
            .by_chord
            .iter()
            .filter(|(_, actions)| actions.len() > 1)
            .map(|(chord, actions)| (Trigger::Chord(*chord), actions.iter().cloned().collect()));

        let mut conflicts: Vec<(Trigger, Vec<ActionId>)> = buttons.chain(chords).collect();
        conflicts.sort_by_key(|(trigger, _)| trigger.to_string());
        conflicts
    }
}
