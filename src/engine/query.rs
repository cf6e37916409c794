//! Typed query execution for the ECS.
//!
//! This module implements the `Select` family: iteration over every live
//! entity whose mask contains a component tuple, with one specialised inner
//! loop per signature.
//!
//! ## Design goals
//! * **Static intent:** The user callback's signature *is* the query
//!   signature — `(Entity, &mut C1, …, &mut Cn)`, optionally returning
//!   `bool` for early-stop. No builder, no runtime dispatch.
//! * **Runtime efficiency:** Monomorphisation produces a dedicated loop per
//!   tuple whose body reduces to an aliveness flag test, a word-wise mask
//!   subset test, and direct column indexing.
//! * **Safety by discipline:** Component references handed to the callback
//!   are cell-disjoint; structural mutation runs through the entity handle's
//!   raw-pointer path rather than a second world borrow.
//!
//! ## Execution model
//! 1. Compute the signature mask and the intersection of the tuple's column
//!    range windows; an empty intersection returns immediately.
//! 2. Scan the candidate window in ascending index order.
//! 3. For each live, mask-satisfying slot, invoke the callback with the
//!    entity handle and one `&mut` per requested component.
//!
//! The candidate window is snapshotted before the scan: widenings performed
//! by the callback never extend the running pass. Entities killed mid-pass
//! fail the aliveness test and are skipped; entities spawned at indices
//! above the scan position are visited if they satisfy the mask.
//!
//! ## Signature dispatch
//! [`SelectFn`] is implemented for every callable arity via the local
//! `impl_select_fn!` expansion, using a marker type parameter to keep the
//! per-arity impls coherent. Equal signatures collapse to one instantiation
//! during monomorphisation, which is the deduplication the original
//! source-level specialiser had to do by hand.

use std::cmp::Ordering;

use crate::engine::component::{Component, ComponentStore};
use crate::engine::entity::{Entity, EntityRef};
use crate::engine::types::{ComponentMask, ComponentRange, EntityIndex};
use crate::engine::world::World;

/// Unifies the two callback shapes: `()` iterates the whole candidate
/// window, `bool` continues while `true`.
pub trait SelectControl {
    /// Whether iteration should continue after this callback return.
    fn proceed(self) -> bool;
}

impl SelectControl for () {
    #[inline]
    fn proceed(self) -> bool {
        true
    }
}

impl SelectControl for bool {
    #[inline]
    fn proceed(self) -> bool {
        self
    }
}

/// A callable usable as a `Select` callback for world `W`.
///
/// Implemented for closures and functions of shape
/// `FnMut(Entity<W>, &mut C1, …, &mut Cn) -> impl SelectControl`. The
/// `Marker` parameter carries the component tuple and return type so the
/// per-arity impls do not overlap.
pub trait SelectFn<W: World, Marker> {
    /// Combined membership mask of the signature's component tuple.
    fn mask() -> ComponentMask;

    /// Intersection of the tuple's column range windows.
    fn bounds(world: &W) -> ComponentRange;

    /// Invokes the callback for the entity at `index`. Returns `false` to
    /// halt iteration.
    ///
    /// ## Safety
    /// `world` must point to a live world, `index` must be in bounds, and
    /// the slot at `index` must be alive and satisfy [`SelectFn::mask`].
    unsafe fn invoke(&mut self, world: *mut W, index: EntityIndex) -> bool;
}

macro_rules! impl_select_fn {
    ($($C:ident),+) => {
        #[allow(non_snake_case)]
        impl<W, Func, Ret, $($C,)+> SelectFn<W, ($($C,)+ Ret)> for Func
        where
            W: World $(+ ComponentStore<$C>)+,
            $($C: Component,)+
            Ret: SelectControl,
            Func: FnMut(Entity<'_, W>, $(&mut $C,)+) -> Ret,
        {
            fn mask() -> ComponentMask {
                let mut mask = ComponentMask::EMPTY;
                $(mask.set($C::ID);)+
                mask
            }

            fn bounds(world: &W) -> ComponentRange {
                ComponentRange::ALL
                    $(.intersect(<W as ComponentStore<$C>>::column(world).range()))+
            }

            unsafe fn invoke(&mut self, world: *mut W, index: EntityIndex) -> bool {
                // Cell pointers are derived before any reference exists, so
                // the tuple's borrows are disjoint by construction.
                $(
                    let $C = unsafe {
                        (*<W as ComponentStore<$C>>::column_raw(world))
                            .as_mut_ptr()
                            .add(index as usize)
                    };
                )+
                let entity = unsafe { Entity::from_raw(world, index) };
                self(entity, $(unsafe { &mut *$C },)+).proceed()
            }
        }
    };
}

impl_select_fn!(A);
impl_select_fn!(A, B);
impl_select_fn!(A, B, C);
impl_select_fn!(A, B, C, D);
impl_select_fn!(A, B, C, D, E);
impl_select_fn!(A, B, C, D, E, G);
impl_select_fn!(A, B, C, D, E, G, H);
impl_select_fn!(A, B, C, D, E, G, H, I);

/// Runs a non-sorted select pass over `world`.
pub(crate) fn run_select<W, Marker, F>(world: &mut W, mut callback: F)
where
    W: World,
    F: SelectFn<W, Marker>,
{
    let signature = F::mask();
    let bounds = F::bounds(world);
    if bounds.is_empty() {
        return;
    }
    let last = (world.capacity() as EntityIndex).saturating_sub(1);
    let high = bounds.high.min(last);

    let world: *mut W = world;
    let mut index = bounds.low;
    while index <= high {
        let hit = unsafe {
            let slot = (*W::table_raw(world)).slot(index);
            slot.alive && slot.mask.contains_all(&signature)
        };
        if hit && !unsafe { callback.invoke(world, index) } {
            return;
        }
        index += 1;
    }
}

/// Runs a sorted select pass: matching entities are materialised, stably
/// sorted by `order`, then dispatched in that order. Each entity is
/// re-validated immediately before its callback, so entities killed earlier
/// in the pass are skipped; other mutation affects future passes only.
pub(crate) fn run_select_sorted<W, Marker, F, O>(world: &mut W, mut order: O, mut callback: F)
where
    W: World,
    F: SelectFn<W, Marker>,
    O: FnMut(&W, EntityRef, EntityRef) -> Ordering,
{
    let signature = F::mask();
    let bounds = F::bounds(world);
    if bounds.is_empty() {
        return;
    }
    let last = (world.capacity() as EntityIndex).saturating_sub(1);
    let high = bounds.high.min(last);

    let mut matches: Vec<EntityRef> = Vec::new();
    for index in bounds.low..=high {
        let slot = world.table().slot(index);
        if slot.alive && slot.mask.contains_all(&signature) {
            matches.push(EntityRef {
                index,
                generation: slot.generation,
            });
        }
    }

    {
        let snapshot: &W = world;
        matches.sort_by(|a, b| order(snapshot, *a, *b));
    }

    let world: *mut W = world;
    for reference in matches {
        let hit = unsafe {
            let slot = (*W::table_raw(world)).slot(reference.index);
            slot.alive
                && slot.generation == reference.generation
                && slot.mask.contains_all(&signature)
        };
        if hit && !unsafe { callback.invoke(world, reference.index) } {
            return;
        }
    }
}
