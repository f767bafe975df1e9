// model = "claude-opus-4-5"
// created = "2026-10-16"
// modified = "2026-10-16"
// driver = "Isaac Clayton"

//! Vector clocks over actor ids.
//!
//! A `Clock` maps each actor to the highest sequence number observed from
//! it. The same type serves three roles:
//!
//! - a change's `deps`: what its author had seen when making it
//! - the backend's applied clock: what this replica has applied so far
//! - a change's causal past: the transitive closure of its deps, used to
//!   decide which register entries a write supersedes
//!
//! Complexity:
//! - get/observe: O(log n) where n is number of actors
//! - merge: O(n)

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use crate::id::ActorId;

/// A vector clock keyed by actor.
///
/// Absent actors read as 0. Entries are kept in a `BTreeMap` so that the
/// serialized form is deterministic.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Clock {
    entries: BTreeMap<ActorId, u64>,
}

impl Clock {
    /// Create an empty clock.
    pub fn new() -> Clock {
        return Clock {
            entries: BTreeMap::new(),
        };
    }

    /// Get the sequence number observed for an actor.
    pub fn get(&self, actor: &ActorId) -> u64 {
        return *self.entries.get(actor).unwrap_or(&0);
    }

    /// Raise the entry for `actor` to at least `seq`.
    pub fn observe(&mut self, actor: &ActorId, seq: u64) {
        if seq == 0 {
            return;
        }
        let entry = self.entries.entry(actor.clone()).or_insert(0);
        *entry = (*entry).max(seq);
    }

    /// Builder form of `observe`.
    pub fn with(mut self, actor: impl Into<ActorId>, seq: u64) -> Clock {
        self.observe(&actor.into(), seq);
        return self;
    }

    /// Merge with another clock, taking the pointwise maximum.
    pub fn merge(&mut self, other: &Clock) {
        for (actor, seq) in &other.entries {
            self.observe(actor, *seq);
        }
    }

    /// True if every entry of `self` is covered by `other`.
    pub fn is_covered_by(&self, other: &Clock) -> bool {
        return self.entries.iter().all(|(actor, seq)| other.get(actor) >= *seq);
    }

    /// Iterate over `(actor, seq)` pairs in actor order.
    pub fn iter(&self) -> impl Iterator<Item = (&ActorId, u64)> {
        return self.entries.iter().map(|(actor, seq)| (actor, *seq));
    }

    pub fn len(&self) -> usize {
        return self.entries.len();
    }

    pub fn is_empty(&self) -> bool {
        return self.entries.is_empty();
    }
}

impl FromIterator<(ActorId, u64)> for Clock {
    fn from_iter<I: IntoIterator<Item = (ActorId, u64)>>(iter: I) -> Clock {
        let mut clock = Clock::new();
        for (actor, seq) in iter {
            clock.observe(&actor, seq);
        }
        return clock;
    }
}
