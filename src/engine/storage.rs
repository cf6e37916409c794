//! Dense per-component column storage.

use crate::engine::component::Component;
use crate::engine::types::{ComponentRange, EntityIndex};

/// Invariant:
/// - `cells.len()` equals the world capacity and never changes between
///   resets.
/// - Cells for entities without the matching mask bit hold unspecified
///   (possibly stale) values; queries never read them because membership is
///   checked against the mask first.
/// - `range` covers the index of every entity currently carrying the
///   component; it may conservatively cover more.
pub struct Column<C: Component> {
    cells: Box<[C]>,
    range: ComponentRange,
    scratch: C,
}

impl<C: Component> Column<C> {
    /// Allocates a zero-initialised column of `capacity` cells.
    pub fn new(capacity: usize) -> Self {
        Self {
            cells: vec![C::default(); capacity].into_boxed_slice(),
            range: ComponentRange::empty(capacity),
            scratch: C::default(),
        }
    }

    /// Returns the conservative index window of this column.
    #[inline]
    pub fn range(&self) -> ComponentRange {
        self.range
    }

    /// Writes `value` at `index` and widens the range window to include it.
    #[inline]
    pub fn put(&mut self, index: EntityIndex, value: C) {
        self.range.add(index);
        self.cells[index as usize] = value;
    }

    /// Shared access to the cell at `index`.
    #[inline]
    pub fn cell(&self, index: EntityIndex) -> &C {
        &self.cells[index as usize]
    }

    /// Exclusive access to the cell at `index`.
    #[inline]
    pub fn cell_mut(&mut self, index: EntityIndex) -> &mut C {
        &mut self.cells[index as usize]
    }

    /// Zeroed placeholder cell handed out for dead-entity accesses.
    #[inline]
    pub fn scratch_cell(&mut self) -> &mut C {
        self.scratch = C::default();
        &mut self.scratch
    }

    /// Base pointer of the cell array; used by the query inner loop.
    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut C {
        self.cells.as_mut_ptr()
    }

    /// Re-allocates the column and empties the range window.
    pub fn reset(&mut self) {
        let capacity = self.cells.len();
        self.cells = vec![C::default(); capacity].into_boxed_slice();
        self.range = ComponentRange::empty(capacity);
    }
}
