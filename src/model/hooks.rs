//! Lifecycle hooks
//!
//! Hooks are registered with a model's schema and run by the CRUD engine
//! right before the matching statement is planned. An event with no hooks is
//! a no-op.

use std::fmt;
use std::sync::Arc;

/// Point in the CRUD cycle a hook runs at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookEvent {
    /// Before `find` / `first` builds its query
    BeforeFind,
    /// Before `save` builds its update
    BeforeSave,
    /// Before `create` builds its insert
    BeforeCreate,
    /// Before `delete` builds its delete
    BeforeDelete,
}

/// Lifecycle callback
pub type Hook<M> = Arc<dyn Fn(&mut M) + Send + Sync>;

/// Ordered set of lifecycle callbacks for one model type
pub struct Hooks<M> {
    entries: Vec<(HookEvent, Hook<M>)>,
}

impl<M: 'static> Hooks<M> {
    /// Create an empty hook set
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Register a callback for an event
    pub fn register(&mut self, event: HookEvent, hook: impl Fn(&mut M) + Send + Sync + 'static) {
        self.entries.push((event, Arc::new(hook)));
    }

    /// Run every callback registered for `event`, in registration order
    pub fn run(&self, event: HookEvent, model: &mut M) {
        for (_, hook) in self.entries.iter().filter(|(e, _)| *e == event) {
            hook(model);
        }
    }

    /// Number of callbacks registered for `event`
    pub fn count(&self, event: HookEvent) -> usize {
        self.entries.iter().filter(|(e, _)| *e == event).count()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append another hook set after this one
    pub fn extend(&mut self, other: Hooks<M>) {
        self.entries.extend(other.entries);
    }

    /// Re-root these callbacks onto a structure that embeds `M`
    pub fn lift<P: 'static>(self, get_mut: fn(&mut P) -> &mut M) -> Hooks<P> {
        Hooks {
            entries: self
                .entries
                .into_iter()
                .map(|(event, hook)| -> (HookEvent, Hook<P>) {
                    (event, Arc::new(move |parent: &mut P| hook(get_mut(parent))))
                })
                .collect(),
        }
    }
}

impl<M: 'static> Default for Hooks<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> Clone for Hooks<M> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

impl<M> fmt::Debug for Hooks<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|(event, _)| event))
            .finish()
    }
}
