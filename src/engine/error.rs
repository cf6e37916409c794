//! Error types for the fallible entity operations.
//!
//! The hot path of this runtime is total: stale references degrade to the
//! dead sentinel, kills and removals are idempotent no-ops, and allocation
//! wraps at capacity. The error types here back the explicit `try_` variants
//! offered to hosts that prefer a failure over the defensive default.
//!
//! ## Goals
//! * **Specificity:** Each error type models a single failure mode.
//! * **Ergonomics:** All errors implement [`std::error::Error`] and
//!   [`fmt::Display`].
//! * **Actionability:** Structured fields (offending reference, limiting
//!   capacity) make logs useful without reproducing the issue.
//!
//! ## Display vs. Debug
//! * [`fmt::Display`] is optimized for operator logs (short, imperative
//!   phrasing).
//! * [`fmt::Debug`] (derived) retains full structure for diagnostics.

use std::fmt;

use crate::engine::entity::EntityRef;

/// Returned when a world cannot allocate another entity without overwriting
/// a live slot.
///
/// Only produced by the non-wrapping allocation path; the default `spawn`
/// wraps instead, by design.
///
/// ### Fields
/// * `capacity` — The fixed entity capacity of the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityError {
    /// Fixed entity capacity that prevented the allocation.
    pub capacity: usize,
}

impl fmt::Display for CapacityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entity capacity exhausted (capacity {})", self.capacity)
    }
}

impl std::error::Error for CapacityError {}

/// Returned when an [`EntityRef`] no longer names a live entity — typically
/// because it was killed, or its slot was reused and the generation no
/// longer matches.
///
/// Use this to surface use-after-free style logic errors at the API
/// boundary instead of silently operating on the dead sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaleEntityError {
    /// The stale reference that was presented.
    pub reference: EntityRef,
}

impl fmt::Display for StaleEntityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "stale or dead entity reference (index {}, generation {})",
            self.reference.index, self.reference.generation
        )
    }
}

impl std::error::Error for StaleEntityError {}
