//! Stack of isolated handler registration sets.
//!
//! Only the top scope receives registrations and dispatch. A modal dialog
//! pushes a scope, registers into it, and must unregister before popping, so
//! nothing registered underneath can see input while the modal is open.

use crate::error::{InputError, Result};
use crate::event::EventCategory;
use crate::handler::{same_handler, HandlerRef};
use std::fmt;

/// Identifies a pushed scope by its depth (the base scope is depth 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScopeId(pub usize);

/// One ordered handler list per event category.
#[derive(Default)]
pub struct HandlerLists {
    lists: [Vec<HandlerRef>; EventCategory::COUNT],
}

impl HandlerLists {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Handlers registered for a category, first-asked first.
    #[must_use]
    pub fn list(&self, category: EventCategory) -> &[HandlerRef] {
        &self.lists[category.index()]
    }

    /// Check if a handler is registered for a category.
    #[must_use]
    pub fn contains(&self, category: EventCategory, handler: &HandlerRef) -> bool {
        self.list(category).iter().any(|h| same_handler(h, handler))
    }

    /// Check if a handler is registered for any category.
    #[must_use]
    pub fn contains_any(&self, handler: &HandlerRef) -> bool {
        self.lists
            .iter()
            .any(|list| list.iter().any(|h| same_handler(h, handler)))
    }

    /// Insert at the front unless already present. Returns true if inserted.
    pub fn insert_front(&mut self, category: EventCategory, handler: &HandlerRef) -> bool {
        if self.contains(category, handler) {
            return false;
        }
        self.lists[category.index()].insert(0, HandlerRef::clone(handler));
        true
    }

    /// Remove a handler from one category. Returns true if it was present.
    pub fn remove(&mut self, category: EventCategory, handler: &HandlerRef) -> bool {
        let list = &mut self.lists[category.index()];
        let before = list.len();
        list.retain(|h| !same_handler(h, handler));
        list.len() != before
    }

    /// Remove a handler from every category. Returns how many lists held it.
    pub fn remove_all(&mut self, handler: &HandlerRef) -> usize {
        EventCategory::ALL
            .iter()
            .filter(|&&category| self.remove(category, handler))
            .count()
    }

    /// Total registrations across all categories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lists.iter().map(Vec::len).sum()
    }

    /// Check if every list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lists.iter().all(Vec::is_empty)
    }

    /// Non-empty lists and their lengths.
    #[must_use]
    pub fn occupied(&self) -> Vec<(EventCategory, usize)> {
        EventCategory::ALL
            .iter()
            .map(|&category| (category, self.list(category).len()))
            .filter(|&(_, len)| len > 0)
            .collect()
    }

    /// Drop every registration.
    pub fn clear(&mut self) {
        for list in &mut self.lists {
            list.clear();
        }
    }
}

impl fmt::Debug for HandlerLists {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerLists")
            .field("occupied", &self.occupied())
            .finish()
    }
}

/// Stack of handler list sets. Never empty: the base scope lives forever.
#[derive(Debug)]
pub struct ScopeStack {
    scopes: Vec<HandlerLists>,
    max_depth: usize,
}

impl ScopeStack {
    /// Create a stack holding only the base scope.
    #[must_use]
    pub fn new(max_depth: usize) -> Self {
        Self {
            scopes: vec![HandlerLists::new()],
            max_depth: max_depth.max(1),
        }
    }

    /// Number of scopes, including the base scope.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Identifier of the top scope.
    #[must_use]
    pub fn active_id(&self) -> ScopeId {
        ScopeId(self.depth())
    }

    /// The scope receiving registrations and dispatch.
    #[must_use]
    pub fn active(&self) -> &HandlerLists {
        let top = self.scopes.len() - 1;
        &self.scopes[top]
    }

    /// Mutable access to the top scope.
    pub fn active_mut(&mut self) -> &mut HandlerLists {
        let top = self.scopes.len() - 1;
        &mut self.scopes[top]
    }

    /// Push an empty scope and make it active.
    pub fn push(&mut self) -> Result<ScopeId> {
        if self.scopes.len() >= self.max_depth {
            tracing::warn!(max = self.max_depth, "input scope stack overflow");
            return Err(InputError::ScopeOverflow {
                max: self.max_depth,
            });
        }
        self.scopes.push(HandlerLists::new());
        let id = self.active_id();
        tracing::debug!(depth = id.0, "pushed input scope");
        Ok(id)
    }

    /// Pop the top scope.
    ///
    /// The scope is always removed. If handlers were still registered in it,
    /// they are dropped from the lists and the leak is returned as
    /// [`InputError::ScopeLeak`].
    pub fn pop(&mut self) -> Result<()> {
        if self.scopes.len() <= 1 {
            tracing::warn!("attempted to pop the base input scope");
            return Err(InputError::BaseScope);
        }
        let depth = self.scopes.len();
        let popped = self.scopes.pop().unwrap_or_default();
        tracing::debug!(depth, "popped input scope");
        check_leak(&popped, depth)
    }

    /// Scene-switch validation: every list of every scope must be empty.
    pub fn verify_empty(&self) -> Result<()> {
        self.scopes
            .iter()
            .enumerate()
            .try_for_each(|(i, scope)| check_leak(scope, i + 1))
    }

    /// Iterate scopes from base to top.
    pub fn iter(&self) -> impl Iterator<Item = &HandlerLists> {
        self.scopes.iter()
    }

    /// Remove a handler from one category in every scope.
    pub fn remove_everywhere(&mut self, category: EventCategory, handler: &HandlerRef) -> bool {
        let mut removed = false;
        for scope in &mut self.scopes {
            removed |= scope.remove(category, handler);
        }
        removed
    }

    /// Remove a handler from every category in every scope.
    pub fn remove_all_everywhere(&mut self, handler: &HandlerRef) -> usize {
        self.scopes
            .iter_mut()
            .map(|scope| scope.remove_all(handler))
            .sum()
    }
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new(crate::config::DispatchConfig::default().max_scope_depth)
    }
}

fn check_leak(scope: &HandlerLists, depth: usize) -> Result<()> {
    if scope.is_empty() {
        return Ok(());
    }
    let leaked = scope.occupied();
    let registrations = scope.len();
    tracing::warn!(
        depth,
        registrations,
        ?leaked,
        "input scope torn down with handlers still registered"
    );
    Err(InputError::ScopeLeak {
        depth,
        registrations,
        leaked,
    })
}
