//! ECS System Abstractions
//!
//! This module defines the *system execution model* of the runtime.
//!
//! A **system** is a unit of logic run once per world update. Systems:
//! - declare a priority that fixes their position in the update order,
//! - receive exclusive access to the world for their whole run,
//! - are executed strictly serially, in priority order.
//!
//! ## Ordering Model
//!
//! The system list is kept sorted by priority, higher priorities first.
//! Insertion is stable: systems of equal priority run in registration
//! order. There is no parallelism and no access-conflict analysis — the
//! runtime is single-threaded, and a serial list is the whole scheduling
//! story.
//!
//! ## Function-backed Systems
//!
//! [`FnSystem`] wraps a closure or function as a system, which is the
//! preferred mechanism for most simulation logic: no boilerplate type per
//! system, full access to captured state.

use crate::engine::world::World;

/// A unit of executable logic run once per world update.
pub trait System<W: World> {
    /// Update-order priority; higher priorities run first. Defaults to 0.
    fn priority(&self) -> i32 {
        0
    }

    /// Executes the system logic against the world.
    fn update(&mut self, world: &mut W);
}

/// A concrete [`System`] backed by a function or closure.
///
/// It stores a priority and the executable function itself; the function
/// receives `&mut W` and typically drives one or more selects.
pub struct FnSystem<F> {
    priority: i32,
    f: F,
}

impl<F> FnSystem<F> {
    /// Creates a function-backed system with the given priority.
    pub fn new(priority: i32, f: F) -> Self {
        Self { priority, f }
    }
}

impl<W, F> System<W> for FnSystem<F>
where
    W: World,
    F: FnMut(&mut W),
{
    fn priority(&self) -> i32 {
        self.priority
    }

    fn update(&mut self, world: &mut W) {
        (self.f)(world)
    }
}

/// Priority-ordered list of boxed systems.
///
/// ## Invariants
/// - Entries are sorted by descending priority.
/// - Entries of equal priority keep registration order.
pub struct SystemList<W> {
    entries: Vec<Box<dyn System<W>>>,
}

impl<W> Default for SystemList<W> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<W: World> SystemList<W> {
    /// Inserts a boxed system at its priority position.
    pub fn insert(&mut self, system: Box<dyn System<W>>) {
        let priority = system.priority();
        let at = self
            .entries
            .iter()
            .position(|existing| priority > existing.priority())
            .unwrap_or(self.entries.len());
        self.entries.insert(at, system);
    }

    /// Number of registered systems.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no systems are registered.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes all systems.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Mutable iteration in update order.
    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Box<dyn System<W>>> + '_ {
        self.entries.iter_mut()
    }

    /// Drains all entries, preserving order.
    pub(crate) fn drain(&mut self) -> impl Iterator<Item = Box<dyn System<W>>> + '_ {
        self.entries.drain(..)
    }
}
