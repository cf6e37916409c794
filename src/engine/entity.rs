//! # Entity Management
//!
//! This module defines entity identity, the slot table, and the borrowed
//! entity handle through which all per-entity operations run.
//!
//! ## Entity Model
//! An entity is a slot in a fixed-capacity dense array. A slot stores:
//!
//! - A **generation**, incremented every time the slot is (re)allocated
//! - An **alive** flag
//! - A **component mask** recording current membership
//!
//! [`EntityRef`] is the value form of an entity: `(index, generation)`. A
//! reference is valid while the slot is alive and the generations match;
//! anything else degrades to the dead sentinel rather than failing.
//!
//! ## Allocation
//! Allocation prefers the free-list; otherwise it takes the next index from
//! the allocation cursor. When the cursor reaches capacity it wraps to zero
//! and the oldest slots are overwritten — the capacity is a deliberate cap
//! that callers size for their worst case. An overwritten slot still gets a
//! fresh generation, so every previously issued reference to it is stale.
//!
//! ## Invariants
//! - An entity is alive iff its slot's `alive` flag is set, and a reference
//!   to it is valid iff additionally the generations match.
//! - Free-list entries always name dead slots.
//! - No two live entities ever share `(index, generation)`.
//!
//! ## The handle
//! [`Entity`] borrows the world and routes every operation through a raw
//! world pointer. That indirection is what lets a query callback kill
//! entities, attach components, or spawn new entities while component
//! references for the current entity are live: the engine never holds a
//! whole-world borrow across a callback. The handle re-validates liveness on
//! every operation, so a handle to a killed entity simply becomes the dead
//! sentinel.

use std::fmt;
use std::marker::PhantomData;

use crate::engine::component::{Component, ComponentStore, Relation, RelationStore};
use crate::engine::types::{ComponentId, ComponentMask, EntityIndex, Generation};
use crate::engine::world::World;

/// Value reference to an entity: `(index, generation)`.
///
/// Cheap to copy, hash, and store. The default value is never valid — slot
/// generations start at 1 on first allocation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct EntityRef {
    /// Slot index within the world.
    pub index: EntityIndex,
    /// Generation the slot had when this reference was taken.
    pub generation: Generation,
}

/// One slot of the entity table.
#[derive(Clone, Copy, Debug, Default)]
pub struct EntitySlot {
    /// Generation of the current (or most recent) occupant.
    pub generation: Generation,
    /// Whether the slot currently holds a live entity.
    pub alive: bool,
    /// Component membership of the current occupant.
    pub mask: ComponentMask,
}

/// Fixed-capacity entity slot table with free-list reuse.
///
/// ## Design
/// - Slots are allocated once at capacity and never grow; `reset` swaps in
///   a fresh table.
/// - Freed indices are recycled last-in-first-out.
/// - The allocation cursor is the high-water mark of fresh allocation; it
///   wraps to zero at capacity.
pub struct EntityTable {
    slots: Box<[EntitySlot]>,
    free: Vec<EntityIndex>,
    cursor: EntityIndex,
    live: u32,
}

impl EntityTable {
    /// Creates a table of `capacity` dead slots.
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![EntitySlot::default(); capacity].into_boxed_slice(),
            free: Vec::new(),
            cursor: 0,
            live: 0,
        }
    }

    /// Fixed number of slots.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of currently live entities.
    #[inline]
    pub fn live_count(&self) -> u32 {
        self.live
    }

    /// Shared access to a slot. Panics if `index` is out of bounds.
    #[inline]
    pub fn slot(&self, index: EntityIndex) -> &EntitySlot {
        &self.slots[index as usize]
    }

    /// Exclusive access to a slot. Panics if `index` is out of bounds.
    #[inline]
    pub fn slot_mut(&mut self, index: EntityIndex) -> &mut EntitySlot {
        &mut self.slots[index as usize]
    }

    /// Returns `true` if `reference` names a live entity of matching
    /// generation. Out-of-bounds indices are simply invalid, never an error.
    #[inline]
    pub fn is_valid(&self, reference: EntityRef) -> bool {
        match self.slots.get(reference.index as usize) {
            Some(slot) => slot.alive && slot.generation == reference.generation,
            None => false,
        }
    }

    /// Returns `true` if the next allocation would have to overwrite a live
    /// slot: every slot is occupied and nothing is on the free-list.
    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.free.is_empty() && (self.live as usize) >= self.capacity()
    }

    /// Picks the index for the next allocation: free-list first, then the
    /// cursor, wrapping to zero at capacity.
    ///
    /// The returned slot may still be alive (wrap-around overwrite); the
    /// caller purges it before [`EntityTable::activate`].
    pub fn next_index(&mut self) -> EntityIndex {
        if let Some(index) = self.free.pop() {
            return index;
        }
        if (self.cursor as usize) >= self.capacity() {
            self.cursor = 0;
        }
        let index = self.cursor;
        self.cursor += 1;
        index
    }

    /// Brings a slot to life: bumps the generation, clears the mask, marks
    /// it alive. Returns the new generation.
    pub fn activate(&mut self, index: EntityIndex) -> Generation {
        let slot = &mut self.slots[index as usize];
        slot.generation = slot.generation.wrapping_add(1);
        slot.alive = true;
        slot.mask = ComponentMask::EMPTY;
        self.live += 1;
        slot.generation
    }

    /// Kills a live slot: marks it dead and recycles the index.
    pub fn deactivate(&mut self, index: EntityIndex) {
        let slot = &mut self.slots[index as usize];
        debug_assert!(slot.alive, "deactivate on a dead slot");
        slot.alive = false;
        self.free.push(index);
        self.live -= 1;
    }

    /// Marks a live slot dead *without* recycling it — used when the
    /// allocation cursor wraps onto a live slot that is about to be reused.
    pub fn evict(&mut self, index: EntityIndex) {
        let slot = &mut self.slots[index as usize];
        debug_assert!(slot.alive, "evict on a dead slot");
        slot.alive = false;
        self.live -= 1;
    }
}

/// Borrowed handle to one entity of a world.
///
/// ## Purpose
/// `Entity` is the call-site surface for everything per-entity: component
/// attach/detach/access, relationship edges, and the kill switch. A handle
/// is obtained from [`World::spawn`], [`World::entity`], or inside query
/// callbacks.
///
/// ## Sentinel semantics
/// A handle whose reference has gone stale behaves as the dead sentinel:
/// `alive()` is `false`, `has` is `false`, `get` yields a zeroed placeholder
/// cell, and every mutating operation is a no-op. Nothing here panics on
/// misuse.
///
/// ## Re-entrancy
/// The handle operates through a raw world pointer and never materialises a
/// whole-world borrow, so query callbacks may freely kill entities, spawn
/// new ones, or flip components mid-iteration. The one discipline the
/// caller must keep: do not use the handle to reach a component cell that
/// the callback already holds as a `&mut` parameter.
pub struct Entity<'w, W: World> {
    world: *mut W,
    index: EntityIndex,
    generation: Generation,
    _marker: PhantomData<&'w mut W>,
}

impl<'w, W: World> fmt::Debug for Entity<'w, W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("world", &self.world)
            .field("index", &self.index)
            .field("generation", &self.generation)
            .finish()
    }
}

impl<'w, W: World> Entity<'w, W> {
    /// Attaches a handle to `reference`, valid or not.
    pub(crate) fn attach(world: &'w mut W, reference: EntityRef) -> Self {
        Self {
            world,
            index: reference.index,
            generation: reference.generation,
            _marker: PhantomData,
        }
    }

    /// Builds a handle for the live slot at `index` from a raw world.
    ///
    /// ## Safety
    /// `world` must point to a live world, `index` must be in bounds, and
    /// the world must not be reachable mutably from anywhere else except
    /// through cell-disjoint query references.
    pub(crate) unsafe fn from_raw(world: *mut W, index: EntityIndex) -> Self {
        let generation = unsafe { (*W::table_raw(world)).slot(index).generation };
        Self {
            world,
            index,
            generation,
            _marker: PhantomData,
        }
    }

    /// Slot index of this entity.
    #[inline]
    pub fn index(&self) -> EntityIndex {
        self.index
    }

    /// Generation this handle was taken at.
    #[inline]
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Value reference to this entity.
    #[inline]
    pub fn entity_ref(&self) -> EntityRef {
        EntityRef {
            index: self.index,
            generation: self.generation,
        }
    }

    /// Returns `true` if this handle still names a live entity.
    #[inline]
    pub fn alive(&self) -> bool {
        unsafe { (*W::table_raw(self.world)).is_valid(self.entity_ref()) }
    }

    /// Identity test: same slot, same generation.
    #[inline]
    pub fn is(&self, other: EntityRef) -> bool {
        self.index == other.index && self.generation == other.generation
    }

    /// Attaches component `C`, overwriting any existing value: sets the mask
    /// bit, widens the column range, writes the cell. No-op on the dead
    /// sentinel.
    pub fn set<C: Component>(&self, value: C)
    where
        W: ComponentStore<C>,
    {
        if !self.alive() {
            return;
        }
        unsafe {
            (*W::table_raw(self.world)).slot_mut(self.index).mask.set(C::ID);
            (*<W as ComponentStore<C>>::column_raw(self.world)).put(self.index, value);
        }
    }

    /// Mutable access to component `C`'s cell.
    ///
    /// No membership check is performed — callers arrive here from a query
    /// or after [`Entity::has`], and a cell without its mask bit holds an
    /// unspecified value. The dead sentinel yields a zeroed placeholder.
    pub fn get<C: Component>(&mut self) -> &mut C
    where
        W: ComponentStore<C>,
    {
        unsafe {
            let column = &mut *<W as ComponentStore<C>>::column_raw(self.world);
            if self.alive() {
                column.cell_mut(self.index)
            } else {
                column.scratch_cell()
            }
        }
    }

    /// Returns `true` if this entity currently carries component `C`.
    pub fn has<C: Component>(&self) -> bool
    where
        W: ComponentStore<C>,
    {
        self.alive()
            && unsafe { (*W::table_raw(self.world)).slot(self.index).mask.has(C::ID) }
    }

    /// Detaches component `C` by clearing its mask bit. The column range is
    /// intentionally left untouched. No-op when absent or dead.
    pub fn remove<C: Component>(&self)
    where
        W: ComponentStore<C>,
    {
        if !self.alive() {
            return;
        }
        unsafe {
            (*W::table_raw(self.world))
                .slot_mut(self.index)
                .mask
                .clear(C::ID);
        }
    }

    /// Returns component `C`, attaching `fallback` first if absent.
    pub fn get_or_insert<C: Component>(&mut self, fallback: C) -> &mut C
    where
        W: ComponentStore<C>,
    {
        if !self.has::<C>() {
            self.set(fallback);
        }
        self.get::<C>()
    }

    /// Iterates the IDs of every component kind this entity carries.
    pub fn components(&self) -> impl Iterator<Item = ComponentId> {
        let mask = if self.alive() {
            unsafe { (*W::table_raw(self.world)).slot(self.index).mask }
        } else {
            ComponentMask::EMPTY
        };
        mask.iter()
    }

    /// Kills this entity: marks the slot dead, recycles the index, clears
    /// the mask, and scrubs every relationship edge touching it in either
    /// direction. No-op on the dead sentinel.
    pub fn kill(&self) {
        if !self.alive() {
            return;
        }
        unsafe {
            (*W::table_raw(self.world)).deactivate(self.index);
            W::purge_raw(self.world, self.index);
        }
    }

    /// Adds the edge `self → target` with the given payload and raises the
    /// source mask bit for `R`. No-op when either endpoint is dead.
    pub fn relate<R: Relation>(&self, target: EntityRef, edge: R)
    where
        W: RelationStore<R>,
    {
        if !self.alive() {
            return;
        }
        unsafe {
            if !(*W::table_raw(self.world)).is_valid(target) {
                return;
            }
            (*<W as RelationStore<R>>::relation_raw(self.world)).link(
                self.index,
                target.index,
                target.generation,
                edge,
            );
            (*W::table_raw(self.world)).slot_mut(self.index).mask.set(R::ID);
        }
    }

    /// Removes the edge `self → target`; clears the source mask bit when
    /// the last edge of kind `R` goes. No-op when the edge is absent.
    pub fn unrelate<R: Relation>(&self, target: EntityRef)
    where
        W: RelationStore<R>,
    {
        if !self.alive() {
            return;
        }
        unsafe {
            let relation = &mut *<W as RelationStore<R>>::relation_raw(self.world);
            if relation.unlink(self.index, target.index) {
                (*W::table_raw(self.world))
                    .slot_mut(self.index)
                    .mask
                    .clear(R::ID);
            }
        }
    }

    /// Returns `true` if the edge `self → target` exists and `target` is
    /// still the same live entity it was at link time.
    pub fn relates_to<R: Relation>(&self, target: EntityRef) -> bool
    where
        W: RelationStore<R>,
    {
        if !self.alive() {
            return false;
        }
        unsafe {
            let recorded = (*<W as RelationStore<R>>::relation_raw(self.world))
                .edge_generation(self.index, target.index);
            match recorded {
                Some(generation) => {
                    generation == target.generation
                        && (*W::table_raw(self.world)).is_valid(target)
                }
                None => false,
            }
        }
    }

    /// Returns `true` if this entity has at least one live `R` target.
    pub fn relates_any<R: Relation>(&self) -> bool
    where
        W: RelationStore<R>,
    {
        if !self.alive() {
            return false;
        }
        unsafe {
            let table = &*W::table_raw(self.world);
            (*<W as RelationStore<R>>::relation_raw(self.world)).any_live(
                self.index,
                |index, generation| table.is_valid(EntityRef { index, generation }),
            )
        }
    }

    /// Iterates the live `R` targets of this entity, passing the target's
    /// handle and the mutable edge payload. Dead targets are skipped; edges
    /// added or removed by the callback affect later iterations of the
    /// snapshot only. The callback must not remove the edge it is currently
    /// visiting while holding the payload reference.
    pub fn relations<R: Relation>(&self, mut callback: impl FnMut(Entity<'_, W>, &mut R))
    where
        W: RelationStore<R>,
    {
        if !self.alive() {
            return;
        }
        let snapshot = unsafe { (*<W as RelationStore<R>>::relation_raw(self.world)).targets(self.index) };
        for (target_index, target_generation) in snapshot {
            let target = EntityRef {
                index: target_index,
                generation: target_generation,
            };
            let target_live = unsafe { (*W::table_raw(self.world)).is_valid(target) };
            if !target_live {
                continue;
            }
            let payload = unsafe {
                (*<W as RelationStore<R>>::relation_raw(self.world))
                    .payload_mut(self.index, target_index)
            };
            let Some(payload) = payload else {
                continue;
            };
            let handle = Entity {
                world: self.world,
                index: target_index,
                generation: target_generation,
                _marker: PhantomData,
            };
            callback(handle, payload);
        }
    }

    /// Spawns a fresh entity in the same world and returns its reference.
    /// Usable from inside query callbacks; if the new entity's index lies
    /// above the current scan position and it satisfies the signature, the
    /// running pass will visit it.
    pub fn spawn(&self) -> EntityRef {
        unsafe { crate::engine::world::spawn_raw(self.world) }
    }

    /// Re-targets to another entity of the same world, yielding its handle
    /// (possibly the dead sentinel).
    pub fn other(&self, reference: EntityRef) -> Entity<'w, W> {
        Entity {
            world: self.world,
            index: reference.index,
            generation: reference.generation,
            _marker: PhantomData,
        }
    }
}
