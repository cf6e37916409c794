//! # Colony ECS
//!
//! Statically-specialised Entity-Component-System (ECS) runtime for
//! high-throughput simulation workloads: games, agent-based models, and
//! other systems with a component set that is fixed at build time.
//!
//! ## Design Goals
//! - Dense columnar component storage at fixed capacity
//! - Bitset membership with per-component range acceleration
//! - Generational entity references that degrade to a dead sentinel
//! - One specialised iteration loop per query signature, via
//!   monomorphisation rather than generated source
//! - Deterministic, single-threaded execution
//!
//! A world is declared once with the [`world!`] macro, which turns the
//! component record definitions into a concrete world type; everything else
//! — allocation, lookup, the `select` family, relationships, systems — is
//! generic code in this crate.

#![forbid(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs)]

pub mod engine;

// ─────────────────────────────────────────────────────────────────────────────
// Re-exports (Public API)
// ─────────────────────────────────────────────────────────────────────────────

// Core identifier and layout types

pub use engine::types::{
    ComponentId,
    ComponentMask,
    ComponentRange,
    EntityIndex,
    Generation,
    COMPONENT_CAP,
    MASK_WORDS,
};

// Entities

pub use engine::entity::{
    Entity,
    EntityRef,
    EntitySlot,
    EntityTable,
};

// Component contract and storage

pub use engine::component::{
    Component,
    ComponentStore,
    Relation,
    RelationStore,
    Relationship,
};

pub use engine::storage::Column;
pub use engine::relation::{Edge, RelationTable};

// World and queries

pub use engine::world::World;
pub use engine::query::{SelectControl, SelectFn};

// Systems

pub use engine::systems::{FnSystem, System, SystemList};

// Errors

pub use engine::error::{CapacityError, StaleEntityError};

// ─────────────────────────────────────────────────────────────────────────────
// Prelude (Optional but recommended)
// ─────────────────────────────────────────────────────────────────────────────

/// Commonly used types.
///
/// Import with:
/// ```rust
/// use colony_ecs::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        world,
        Component,
        ComponentId,
        Entity,
        EntityRef,
        FnSystem,
        Relation,
        Relationship,
        System,
        World,
    };
}
