//! # Component Registry
//!
//! This module defines the compile-time contract between a generated world
//! and the generic runtime: which record types are component kinds, what
//! their stable IDs are, and how the query engine reaches their storage.
//!
//! ## Purpose
//! Component identity is resolved entirely at build time. The `world!` macro
//! assigns every declared record a [`ComponentId`] by declaration order and
//! implements the storage-access traits below for the generated world type.
//! There is no run-time registration step and no type-erased storage: each
//! column is a concrete `Column<C>` field of the world struct.
//!
//! ## Classification
//! A record whose **first field is `relationship: Relationship`** is a
//! relationship kind (a directed entity-to-entity edge, optionally carrying
//! the record's remaining fields as edge data). All other records are data
//! kinds. Data and relationship kinds share one ID space, so a single mask
//! describes an entity's full membership.
//!
//! ## Invariants
//! - IDs are unique, dense, and stable for the lifetime of the program.
//! - Every data kind of a world has exactly one `Column` reachable through
//!   [`ComponentStore`]; every relationship kind has exactly one
//!   `RelationTable` reachable through [`RelationStore`].

use crate::engine::relation::RelationTable;
use crate::engine::storage::Column;
use crate::engine::types::ComponentId;
use crate::engine::world::World;

/// Marker record classifying a component as a relationship.
///
/// Declaring `relationship: Relationship` as the first field of a record in
/// a `world!` invocation turns that record into a relationship kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Relationship;

/// A plain data component: a copyable value record stored in a dense column.
///
/// Implemented by the `world!` macro for every declared data kind; not meant
/// to be implemented by hand.
pub trait Component: Copy + Default + 'static {
    /// Stable identifier of this kind, assigned by declaration order.
    const ID: ComponentId;
}

/// A relationship component: a directed edge to another entity, with the
/// record's non-marker fields as edge data.
///
/// Implemented by the `world!` macro for every declared relationship kind.
pub trait Relation: Copy + Default + 'static {
    /// Stable identifier of this kind, assigned by declaration order.
    const ID: ComponentId;
}

/// World access to the dense column of data component `C`.
///
/// Implemented by the `world!` macro; the generic query engine and the
/// entity handle are written against this trait.
pub trait ComponentStore<C: Component>: World {
    /// Shared access to the column.
    fn column(&self) -> &Column<C>;

    /// Exclusive access to the column.
    fn column_mut(&mut self) -> &mut Column<C>;

    /// Raw access to the column, without forming a reference to the world.
    ///
    /// ## Safety
    /// `world` must point to a live world that is not concurrently accessed
    /// from another thread. The caller must not let references derived from
    /// the returned pointer overlap other live references into the same
    /// column.
    unsafe fn column_raw(world: *mut Self) -> *mut Column<C>;
}

/// World access to the adjacency table of relationship `R`.
///
/// Implemented by the `world!` macro.
pub trait RelationStore<R: Relation>: World {
    /// Shared access to the adjacency table.
    fn relation(&self) -> &RelationTable<R>;

    /// Exclusive access to the adjacency table.
    fn relation_mut(&mut self) -> &mut RelationTable<R>;

    /// Raw access to the adjacency table, without forming a reference to the
    /// world.
    ///
    /// ## Safety
    /// Same contract as [`ComponentStore::column_raw`].
    unsafe fn relation_raw(world: *mut Self) -> *mut RelationTable<R>;
}
