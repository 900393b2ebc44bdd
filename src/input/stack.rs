//! Ordered scope registry with a fixed topmost global scope
//!
//! `order` runs bottom to top: the last entry is checked first, right after
//! the global scope. While a keybinding capture runs, its scope stays the last
//! entry and every created or raised scope lands directly below it.

use std::collections::HashMap;

use tracing::{debug, warn};

use super::scope::{BlockBehavior, Scope, ScopeId, ScopeKey};
use crate::error::{InputError, Result};

pub struct ScopeStack {
    global: Scope,
    order: Vec<ScopeId>,
    by_id: HashMap<ScopeId, Scope>,
}

impl ScopeStack {
    /// Creates a stack holding only the global scope
    pub fn new() -> Self {
        Self {
            global: Scope::global(),
            order: Vec::new(),
            by_id: HashMap::new(),
        }
    }

    /// Create a scope on top of the stack
    ///
    /// Re-creating an existing key replaces it and orphans its subscriptions.
    pub fn create(
        &mut self,
        key: impl Into<ScopeKey>,
        active: bool,
        block: BlockBehavior,
    ) -> Result<&mut Scope> {
        let key = key.into();
        if !key.is_valid() {
            warn!(scope = %key, "Scope key must not be blank");
            return Err(InputError::InvalidKey(key.to_string()));
        }
        Ok(self.insert(ScopeId::Key(key), active, block))
    }

    /// Insert or replace `id` on top of the stack
    pub(crate) fn insert(&mut self, id: ScopeId, active: bool, block: BlockBehavior) -> &mut Scope {
        if self.by_id.contains_key(&id) {
            let err = InputError::DuplicateKey(id.to_string());
            warn!(scope = %id, error = %err, "Replacing existing scope, its subscriptions are orphaned");
            self.order.retain(|existing| *existing != id);
        }
        debug!(scope = %id, active, ?block, "Created scope");
        let top = self.top_index(&id);
        self.order.insert(top, id.clone());
        self.by_id
            .entry(id.clone())
            .insert_entry(Scope::new(id, active, block))
            .into_mut()
    }

    /// Remove a scope and all of its subscriptions
    ///
    /// The global and capture scopes belong to the engine and cannot be removed.
    pub fn remove(&mut self, id: &ScopeId) -> Result<Scope> {
        if !matches!(id, ScopeId::Key(_)) {
            warn!(scope = %id, "Engine-owned scopes cannot be removed");
            return Err(InputError::InvalidKey(id.to_string()));
        }
        self.detach(id).ok_or_else(|| {
            warn!(scope = %id, "Cannot remove unknown scope");
            InputError::UnknownKey(id.to_string())
        })
    }

    /// Unlink any non-global scope, `None` if it is not registered
    pub(crate) fn detach(&mut self, id: &ScopeId) -> Option<Scope> {
        let scope = self.by_id.remove(id)?;
        self.order.retain(|existing| existing != id);
        debug!(scope = %id, "Removed scope");
        Some(scope)
    }

    /// Index at which `id` enters as the topmost caller scope
    fn top_index(&self, id: &ScopeId) -> usize {
        match self.order.last() {
            Some(ScopeId::Capture) if *id != ScopeId::Capture => self.order.len() - 1,
            _ => self.order.len(),
        }
    }

    /// Re-splice `id` directly below the global scope, or below a running capture
    ///
    /// The global scope is already on top, so moving it is a no-op.
    pub fn move_to_top(&mut self, id: &ScopeId) -> Result<()> {
        if *id == ScopeId::Global {
            return Ok(());
        }
        let Some(index) = self.order.iter().position(|existing| existing == id) else {
            warn!(scope = %id, "Cannot move unknown scope to top");
            return Err(InputError::UnknownKey(id.to_string()));
        };
        let id = self.order.remove(index);
        let top = self.top_index(&id);
        self.order.insert(top, id);
        Ok(())
    }

    pub fn get(&self, id: &ScopeId) -> Option<&Scope> {
        match id {
            ScopeId::Global => Some(&self.global),
            _ => self.by_id.get(id),
        }
    }

    pub fn get_mut(&mut self, id: &ScopeId) -> Option<&mut Scope> {
        match id {
            ScopeId::Global => Some(&mut self.global),
            _ => self.by_id.get_mut(id),
        }
    }

    pub fn contains(&self, id: &ScopeId) -> bool {
        self.get(id).is_some()
    }

    pub fn global(&self) -> &Scope {
        &self.global
    }

    pub fn global_mut(&mut self) -> &mut Scope {
        &mut self.global
    }

    /// Whether `id` may observe input this tick
    ///
    /// A scope is reachable iff it is active and no active `Block` scope sits
    /// above it. Unknown scopes are never reachable.
    pub fn is_reachable(&self, id: &ScopeId) -> bool {
        if *id == ScopeId::Global {
            return self.global.is_active();
        }
        if !self.contains(id) || self.global.blocks_below() {
            return false;
        }
        for above in self.order.iter().rev() {
            let Some(scope) = self.by_id.get(above) else {
                continue;
            };
            if above == id {
                return scope.is_active();
            }
            if scope.blocks_below() {
                return false;
            }
        }
        false
    }

    /// Cascade order: global first, then from the top of the stack down
    pub fn walk_order(&self) -> Vec<ScopeId> {
        std::iter::once(ScopeId::Global)
            .chain(self.order.iter().rev().cloned())
            .collect()
    }

    /// Caller-created scopes, topmost first
    pub fn keys(&self) -> impl Iterator<Item = &ScopeKey> {
        self.order.iter().rev().filter_map(|id| match id {
            ScopeId::Key(key) => Some(key),
            _ => None,
        })
    }

    /// Number of scopes below the global scope
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Structural problems; empty when the stack is consistent
    pub fn check_invariants(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.global.id() != &ScopeId::Global {
            problems.push("global slot holds a non-global scope".to_string());
        }
        if self.order.contains(&ScopeId::Global) || self.by_id.contains_key(&ScopeId::Global) {
            problems.push("global scope appears inside the ordered stack".to_string());
        }
        for (index, id) in self.order.iter().enumerate() {
            if self.order[..index].contains(id) {
                problems.push(format!("scope {id} appears more than once in the order"));
            }
            if !self.by_id.contains_key(id) {
                problems.push(format!("scope {id} is ordered but not registered"));
            }
        }
        for id in self.by_id.keys() {
            if !self.order.contains(id) {
                problems.push(format!("scope {id} is registered but not ordered"));
            }
        }
        problems
    }
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ScopeStack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopeStack")
            .field("global", &self.global)
            .field("order", &self.order)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(key: &str) -> ScopeId {
        ScopeId::from(key)
    }

    #[test]
    fn test_block_hides_scopes_below() {
        let mut stack = ScopeStack::new();
        stack.create("hud", true, BlockBehavior::PassBelow).expect("create");
        stack.create("menu", true, BlockBehavior::Block).expect("create");

        assert!(stack.is_reachable(&id("menu")));
        assert!(!stack.is_reachable(&id("hud")), "menu blocks hud");

        stack.get_mut(&id("menu")).expect("menu").set_active(false);
        assert!(stack.is_reachable(&id("hud")));
        assert!(!stack.is_reachable(&id("menu")), "inactive scopes are unreachable");
    }

    #[test]
    fn test_inactive_block_does_not_block() {
        let mut stack = ScopeStack::new();
        stack.create("b", true, BlockBehavior::Block).expect("create");
        stack.create("a", false, BlockBehavior::Block).expect("create");
        assert!(stack.is_reachable(&id("b")));
    }

    #[test]
    fn test_pass_below_and_none_do_not_block() {
        let mut stack = ScopeStack::new();
        stack.create("bottom", true, BlockBehavior::Block).expect("create");
        stack.create("middle", true, BlockBehavior::None).expect("create");
        stack.create("top", true, BlockBehavior::PassBelow).expect("create");
        assert!(stack.is_reachable(&id("bottom")));
        assert!(stack.is_reachable(&id("middle")));
        assert!(stack.is_reachable(&id("top")));
    }

    #[test]
    fn test_move_to_top_reorders() {
        let mut stack = ScopeStack::new();
        stack.create("hud", true, BlockBehavior::Block).expect("create");
        stack.create("world", true, BlockBehavior::Block).expect("create");
        stack.create("menu", true, BlockBehavior::Block).expect("create");
        assert!(!stack.is_reachable(&id("hud")));

        stack.move_to_top(&id("hud")).expect("move");
        assert_eq!(
            stack.walk_order(),
            vec![ScopeId::Global, id("hud"), id("menu"), id("world")]
        );
        assert!(stack.is_reachable(&id("hud")));
        assert!(!stack.is_reachable(&id("menu")));

        assert!(stack.move_to_top(&ScopeId::Global).is_ok());
        assert!(matches!(
            stack.move_to_top(&id("missing")),
            Err(InputError::UnknownKey(_))
        ));
    }

    #[test]
    fn test_key_errors() {
        let mut stack = ScopeStack::new();
        assert!(matches!(
            stack.create("", true, BlockBehavior::Block),
            Err(InputError::InvalidKey(_))
        ));
        assert!(matches!(stack.remove(&id("ghost")), Err(InputError::UnknownKey(_))));
        assert!(matches!(stack.remove(&ScopeId::Global), Err(InputError::InvalidKey(_))));
        assert!(!stack.is_reachable(&id("ghost")));
        assert!(stack.is_empty());
    }

    #[test]
    fn test_duplicate_create_replaces_and_moves_to_top() {
        let mut stack = ScopeStack::new();
        stack
            .create("hud", true, BlockBehavior::Block)
            .expect("create")
            .subscribe(crate::input::EventFilter::all(), |_, _| {});
        stack.create("menu", true, BlockBehavior::Block).expect("create");

        let replaced = stack.create("hud", true, BlockBehavior::PassBelow).expect("create");
        assert_eq!(replaced.subscription_count(), 0);
        assert_eq!(stack.len(), 2);
        assert_eq!(stack.keys().next().map(ScopeKey::as_str), Some("hud"));
        assert!(stack.check_invariants().is_empty());
    }

    #[test]
    fn test_remove_detaches_scope() {
        let mut stack = ScopeStack::new();
        stack.create("hud", true, BlockBehavior::PassBelow).expect("create");
        stack.create("menu", true, BlockBehavior::Block).expect("create");
        stack.remove(&id("menu")).expect("remove");
        assert!(stack.is_reachable(&id("hud")));
        assert!(stack.get(&id("menu")).is_none());
        assert!(stack.check_invariants().is_empty());
    }

    #[test]
    fn test_capture_scope_stays_on_top() {
        let mut stack = ScopeStack::new();
        stack.create("hud", true, BlockBehavior::PassBelow).expect("create");
        stack.insert(ScopeId::Capture, true, BlockBehavior::Block);

        stack.create("menu", true, BlockBehavior::Block).expect("create");
        stack.move_to_top(&id("hud")).expect("move");
        assert_eq!(
            stack.walk_order(),
            vec![ScopeId::Global, ScopeId::Capture, id("hud"), id("menu")]
        );
        assert!(stack.is_reachable(&ScopeId::Capture));
        assert!(!stack.is_reachable(&id("hud")));

        let capture = stack.get_mut(&ScopeId::Capture).expect("capture");
        capture.set_active(false);
        assert!(capture.is_active(), "capture scope is pinned");
        assert!(matches!(stack.remove(&ScopeId::Capture), Err(InputError::InvalidKey(_))));

        assert!(stack.detach(&ScopeId::Capture).is_some());
        stack.create("popup", true, BlockBehavior::Block).expect("create");
        assert_eq!(stack.keys().next().map(ScopeKey::as_str), Some("popup"));
        assert!(stack.check_invariants().is_empty());
    }
}
