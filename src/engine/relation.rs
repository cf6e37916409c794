//! Relationship adjacency storage.
//!
//! A relationship kind models directed, typed edges between entities. Each
//! kind owns one [`RelationTable`]: a forward map from source index to its
//! outgoing edges, and a reverse map from target index to the set of
//! sources pointing at it. The two maps are maintained together, so an edge
//! `a → b` exists in the forward direction iff `b ← a` exists in reverse.
//!
//! Edges record the target's generation at link time. The read path filters
//! on that generation, so an edge whose target slot has been killed or
//! reused is never observable — even if cleanup had not yet scrubbed it.
//!
//! Graphs are keyed by plain entity indices, not owning pointers, which
//! trivially admits cycles; generational checks are the cleanup discipline.

use ahash::{AHashMap, AHashSet};

use crate::engine::component::Relation;
use crate::engine::types::{EntityIndex, Generation};

/// A single directed edge: the target's generation at link time plus the
/// edge payload.
#[derive(Clone, Copy, Debug)]
pub struct Edge<R> {
    /// Generation the target slot had when the edge was created.
    pub target_generation: Generation,
    /// Edge data; the unit of the relationship record for pure edges.
    pub payload: R,
}

/// Forward/reverse adjacency for one relationship kind.
///
/// ## Invariants
/// - `fwd[a]` contains `b` iff `rev[b]` contains `a`.
/// - Neither map holds an entry with an empty edge set.
pub struct RelationTable<R: Relation> {
    fwd: AHashMap<EntityIndex, AHashMap<EntityIndex, Edge<R>>>,
    rev: AHashMap<EntityIndex, AHashSet<EntityIndex>>,
}

impl<R: Relation> Default for RelationTable<R> {
    fn default() -> Self {
        Self {
            fwd: AHashMap::new(),
            rev: AHashMap::new(),
        }
    }
}

impl<R: Relation> RelationTable<R> {
    /// Adds (or overwrites) the edge `source → target`.
    pub fn link(
        &mut self,
        source: EntityIndex,
        target: EntityIndex,
        target_generation: Generation,
        payload: R,
    ) {
        self.fwd.entry(source).or_default().insert(
            target,
            Edge {
                target_generation,
                payload,
            },
        );
        self.rev.entry(target).or_default().insert(source);
    }

    /// Removes the edge `source → target` from both directions.
    ///
    /// Returns `true` iff the removal left `source` with no outgoing edges,
    /// which is the caller's cue to clear the source's mask bit.
    pub fn unlink(&mut self, source: EntityIndex, target: EntityIndex) -> bool {
        let Some(edges) = self.fwd.get_mut(&source) else {
            return false;
        };
        if edges.remove(&target).is_none() {
            return false;
        }
        let source_emptied = edges.is_empty();
        if source_emptied {
            self.fwd.remove(&source);
        }

        if let Some(sources) = self.rev.get_mut(&target) {
            sources.remove(&source);
            if sources.is_empty() {
                self.rev.remove(&target);
            }
        }

        source_emptied
    }

    /// Returns the recorded target generation of the edge `source → target`,
    /// if present.
    #[inline]
    pub fn edge_generation(
        &self,
        source: EntityIndex,
        target: EntityIndex,
    ) -> Option<Generation> {
        self.fwd
            .get(&source)?
            .get(&target)
            .map(|edge| edge.target_generation)
    }

    /// Mutable access to the payload of the edge `source → target`.
    #[inline]
    pub fn payload_mut(&mut self, source: EntityIndex, target: EntityIndex) -> Option<&mut R> {
        self.fwd
            .get_mut(&source)?
            .get_mut(&target)
            .map(|edge| &mut edge.payload)
    }

    /// Snapshot of `source`'s outgoing edges as `(target, generation)`
    /// pairs. Taken before dispatching edge callbacks so the maps can be
    /// mutated underneath the iteration.
    pub fn targets(&self, source: EntityIndex) -> Vec<(EntityIndex, Generation)> {
        match self.fwd.get(&source) {
            Some(edges) => edges
                .iter()
                .map(|(&target, edge)| (target, edge.target_generation))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Returns `true` if `source` has at least one edge whose target passes
    /// the supplied liveness test.
    pub fn any_live(
        &self,
        source: EntityIndex,
        mut is_live: impl FnMut(EntityIndex, Generation) -> bool,
    ) -> bool {
        match self.fwd.get(&source) {
            Some(edges) => edges
                .iter()
                .any(|(&target, edge)| is_live(target, edge.target_generation)),
            None => false,
        }
    }

    /// Removes every edge touching `index`, in both directions.
    ///
    /// Returns the sources that lost their last outgoing edge; the caller
    /// clears their mask bits for this kind.
    pub fn purge(&mut self, index: EntityIndex) -> Vec<EntityIndex> {
        let mut emptied = Vec::new();

        if let Some(sources) = self.rev.remove(&index) {
            for source in sources {
                if let Some(edges) = self.fwd.get_mut(&source) {
                    edges.remove(&index);
                    if edges.is_empty() {
                        self.fwd.remove(&source);
                        emptied.push(source);
                    }
                }
            }
        }

        if let Some(edges) = self.fwd.remove(&index) {
            for target in edges.keys() {
                let now_empty = match self.rev.get_mut(target) {
                    Some(sources) => {
                        sources.remove(&index);
                        sources.is_empty()
                    }
                    None => false,
                };
                if now_empty {
                    self.rev.remove(target);
                }
            }
        }

        emptied
    }

    /// Drops every edge of this kind.
    pub fn clear(&mut self) {
        self.fwd.clear();
        self.rev.clear();
    }
}
