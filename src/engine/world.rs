//! # World Trait
//!
//! A *world* is an isolated store: entity table, one dense column per data
//! component, one adjacency table per relationship, and the system list.
//! Concrete world types are generated by the [`world!`](crate::world) macro;
//! this trait is the seam between those generated types and the generic
//! runtime.
//!
//! ## Split of responsibilities
//!
//! The macro implements the **required** methods — field plumbing plus the
//! two generated cleanup routines (`clear_storage`, `purge_raw`) that must
//! visit every column and relationship table. Everything user-facing is a
//! **provided** method written once here: allocation, lookup, kill, reset,
//! reads, the select family, and system management.
//!
//! ## Worlds are values
//!
//! Every operation takes the world explicitly, so hosts and tests can hold
//! any number of isolated worlds. Single-threaded by design: operations are
//! synchronous, run to completion, and observe program order. A host that
//! wants to share a world across threads gates the whole value behind one
//! lock; individual operations are never interleaved.

use std::cmp::Ordering;

use crate::engine::component::{Component, ComponentStore};
use crate::engine::entity::{Entity, EntityRef, EntityTable};
use crate::engine::error::{CapacityError, StaleEntityError};
use crate::engine::query::{self, SelectFn};
use crate::engine::systems::{System, SystemList};
use crate::engine::types::EntityIndex;

/// Storage contract implemented by `world!`-generated types, carrying the
/// full run-time API as provided methods.
pub trait World: Sized {
    /// Shared access to the entity table.
    fn table(&self) -> &EntityTable;

    /// Exclusive access to the entity table.
    fn table_mut(&mut self) -> &mut EntityTable;

    /// Raw access to the entity table, without forming a world reference.
    ///
    /// ## Safety
    /// `world` must point to a live world that is not accessed from another
    /// thread; references derived from the result must not overlap other
    /// live references to the table.
    unsafe fn table_raw(world: *mut Self) -> *mut EntityTable;

    /// Shared access to the system list.
    fn systems(&self) -> &SystemList<Self>;

    /// Exclusive access to the system list.
    fn systems_mut(&mut self) -> &mut SystemList<Self>;

    /// Re-allocates every column and clears every relationship table.
    /// Generated by the macro; called from [`World::reset`].
    fn clear_storage(&mut self);

    /// Cleanup pass for the entity at `index`: clears its mask and removes
    /// every relationship edge touching it in either direction, fixing up
    /// the mask bits of sources that lose their last edge. Generated by the
    /// macro.
    ///
    /// ## Safety
    /// Same contract as [`World::table_raw`]; `index` must be in bounds.
    unsafe fn purge_raw(world: *mut Self, index: EntityIndex);

    // ── Provided operations ──────────────────────────────────────────────

    /// Cleanup pass for the entity at `index` (see [`World::purge_raw`]).
    fn purge(&mut self, index: EntityIndex) {
        unsafe { Self::purge_raw(self, index) }
    }

    /// Fixed entity capacity of this world.
    fn capacity(&self) -> usize {
        self.table().capacity()
    }

    /// Number of currently live entities.
    fn live_count(&self) -> u32 {
        self.table().live_count()
    }

    /// Allocates a new entity and returns its live handle.
    ///
    /// Reuses the most recently freed slot when one exists; otherwise takes
    /// the next fresh index, wrapping to zero at capacity. A wrapped-onto
    /// live slot is purged and its generation still increments, so handles
    /// to the overwritten entity are stale from this point on.
    fn spawn(&mut self) -> Entity<'_, Self> {
        let reference = unsafe { spawn_raw(self as *mut Self) };
        Entity::attach(self, reference)
    }

    /// Non-wrapping allocation: fails instead of overwriting when every
    /// slot is live and nothing is on the free-list.
    fn try_spawn(&mut self) -> Result<Entity<'_, Self>, CapacityError> {
        if self.table().is_exhausted() {
            return Err(CapacityError {
                capacity: self.capacity(),
            });
        }
        Ok(self.spawn())
    }

    /// Looks up `reference`, returning its handle. A stale reference yields
    /// the dead sentinel, whose accessors are total no-ops.
    fn entity(&mut self, reference: EntityRef) -> Entity<'_, Self> {
        Entity::attach(self, reference)
    }

    /// Looks up `reference`, failing explicitly on stale references.
    fn try_entity(&mut self, reference: EntityRef) -> Result<Entity<'_, Self>, StaleEntityError> {
        if !self.table().is_valid(reference) {
            return Err(StaleEntityError { reference });
        }
        Ok(Entity::attach(self, reference))
    }

    /// Returns `true` if `reference` names a live entity.
    fn alive(&self, reference: EntityRef) -> bool {
        self.table().is_valid(reference)
    }

    /// Kills the referenced entity; no-op on stale references.
    fn kill(&mut self, reference: EntityRef) {
        self.entity(reference).kill();
    }

    /// By-value read of component `C`, yielding the zero value for stale
    /// references. Intended for sort comparators and other read-only paths.
    fn read<C: Component>(&self, reference: EntityRef) -> C
    where
        Self: ComponentStore<C>,
    {
        if self.table().is_valid(reference) {
            *<Self as ComponentStore<C>>::column(self).cell(reference.index)
        } else {
            C::default()
        }
    }

    /// Reinitialises the world to empty: fresh entity table, re-allocated
    /// columns, emptied range windows, cleared relationship tables and
    /// system list. The only way to shrink memory.
    fn reset(&mut self) {
        let capacity = self.capacity();
        *self.table_mut() = EntityTable::new(capacity);
        self.systems_mut().clear();
        self.clear_storage();
        log::debug!("world reset to empty at capacity {capacity}");
    }

    /// Iterates every live entity whose mask contains the callback's
    /// component tuple, ascending by index. The callback receives the
    /// entity handle plus one `&mut` per component; returning `bool` gives
    /// early-stop semantics (continue while `true`).
    fn select<Marker, F>(&mut self, callback: F)
    where
        F: SelectFn<Self, Marker>,
    {
        query::run_select(self, callback);
    }

    /// Sorted select: materialises the matching set, stably sorts it with
    /// `order`, then dispatches the callback in sorted order. Mutation
    /// during the pass affects future passes only.
    fn select_sorted<Marker, F, O>(&mut self, order: O, callback: F)
    where
        F: SelectFn<Self, Marker>,
        O: FnMut(&Self, EntityRef, EntityRef) -> Ordering,
    {
        query::run_select_sorted(self, order, callback);
    }

    /// Registers a system at its priority position (higher priorities run
    /// first; ties keep registration order).
    fn add_system<S: System<Self> + 'static>(&mut self, system: S) {
        self.systems_mut().insert(Box::new(system));
    }

    /// Runs every registered system once, in priority order. Systems
    /// registered during the pass are queued and merged in afterwards.
    fn update(&mut self) {
        let mut list = std::mem::take(self.systems_mut());
        for system in list.iter_mut() {
            system.update(self);
        }
        let mut added = std::mem::replace(self.systems_mut(), list);
        for system in added.drain() {
            self.systems_mut().insert(system);
        }
    }
}

/// Allocation path shared by [`World::spawn`] and in-callback spawning.
///
/// ## Safety
/// `world` must point to a live world not accessed from another thread; no
/// reference to the entity table may be live across this call.
pub(crate) unsafe fn spawn_raw<W: World>(world: *mut W) -> EntityRef {
    let index = unsafe { (*W::table_raw(world)).next_index() };
    let occupied = unsafe { (*W::table_raw(world)).slot(index).alive };
    if occupied {
        log::trace!("allocation wrapped onto live slot {index}; purging old occupant");
        unsafe {
            W::purge_raw(world, index);
            (*W::table_raw(world)).evict(index);
        }
    }
    let generation = unsafe { (*W::table_raw(world)).activate(index) };
    EntityRef { index, generation }
}
