// model = "claude-opus-4-5"
// created = "2026-10-16"
// modified = "2026-10-16"
// driver = "Isaac Clayton"

//! Conflict-value register.
//!
//! Every map key and every list element owns one register: a small set of
//! `(actor, value)` entries, at most one per actor. Concurrent writers each
//! keep their entry; a writer that had causally seen an entry replaces it.
//!
//! Resolution is deterministic on every replica:
//! - the entry with the greatest actor id wins
//! - every other entry is a conflict, reported actor-ascending
//!
//! Entries are stored sorted by actor so that both fall out of a slice split.

use smallvec::SmallVec;

use crate::clock::Clock;
use crate::id::ActorId;
use crate::id::ObjectId;
use crate::value::Payload;

/// One actor's contribution to a register.
#[derive(Clone, Debug, PartialEq)]
pub struct Entry {
    /// The actor that wrote the value.
    pub actor: ActorId,
    /// Seq of the change that wrote it.
    pub seq: u64,
    pub payload: Payload,
}

/// The change performing a write, as seen by a register.
#[derive(Clone, Copy, Debug)]
pub struct Writer<'a> {
    pub actor: &'a ActorId,
    pub seq: u64,
    /// Transitive causal past of the change, excluding the change itself.
    pub past: &'a Clock,
}

impl<'a> Writer<'a> {
    pub fn new(actor: &'a ActorId, seq: u64, past: &'a Clock) -> Writer<'a> {
        return Writer { actor, seq, past };
    }

    /// True if this write replaces `entry`: the writer's own entries always,
    /// other actors' entries only if the writer had seen them.
    pub fn supersedes(&self, entry: &Entry) -> bool {
        return entry.actor == *self.actor || self.past.get(&entry.actor) >= entry.seq;
    }
}

/// The resolved view of a non-empty register.
#[derive(Clone, Copy, Debug)]
pub struct Resolved<'a> {
    pub winner: &'a Entry,
    /// Losing entries, actor-ascending.
    pub conflicts: &'a [Entry],
}

impl<'a> Resolved<'a> {
    /// Objects linked from any entry, conflicts first, winner last.
    pub fn links(&self) -> impl Iterator<Item = &'a ObjectId> + use<'a> {
        return self
            .conflicts
            .iter()
            .chain(std::iter::once(self.winner))
            .filter_map(|entry| entry.payload.link());
    }
}

/// A per-key (or per-element) multi-value register.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Register {
    /// Sorted ascending by actor, unique per actor.
    entries: SmallVec<[Entry; 2]>,
}

impl Register {
    pub fn new() -> Register {
        return Register {
            entries: SmallVec::new(),
        };
    }

    /// True if the register holds no value (never set, or deleted).
    pub fn is_empty(&self) -> bool {
        return self.entries.is_empty();
    }

    pub fn len(&self) -> usize {
        return self.entries.len();
    }

    pub fn entries(&self) -> &[Entry] {
        return &self.entries;
    }

    /// Record `payload` as the writer's value, dropping every entry the
    /// writer supersedes.
    pub fn assign(&mut self, writer: Writer<'_>, payload: Payload) {
        self.entries.retain(|entry| !writer.supersedes(entry));
        let pos = self
            .entries
            .partition_point(|entry| entry.actor < *writer.actor);
        self.entries.insert(
            pos,
            Entry {
                actor: writer.actor.clone(),
                seq: writer.seq,
                payload,
            },
        );
    }

    /// Drop every entry the writer supersedes.
    ///
    /// Entries written concurrently with the deletion survive it.
    pub fn clear(&mut self, writer: Writer<'_>) {
        self.entries.retain(|entry| !writer.supersedes(entry));
    }

    /// Winner and conflicts, or `None` if the register is empty.
    pub fn resolve(&self) -> Option<Resolved<'_>> {
        let (winner, conflicts) = self.entries.split_last()?;
        return Some(Resolved { winner, conflicts });
    }

    /// Every object linked from this register, winner and conflicts alike.
    pub fn links(&self) -> impl Iterator<Item = &ObjectId> {
        return self.entries.iter().filter_map(|entry| entry.payload.link());
    }

    /// True if the resolved value is a link to `obj`.
    pub fn winner_links_to(&self, obj: &ObjectId) -> bool {
        return self
            .entries
            .last()
            .and_then(|entry| entry.payload.link())
            .is_some_and(|linked| linked == obj);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    fn scalar(s: &str) -> Payload {
        return Payload::Scalar(Value::from(s));
    }

    fn actors(register: &Register) -> Vec<&str> {
        return register.entries().iter().map(|e| e.actor.as_str()).collect();
    }

    #[test]
    fn empty_register_resolves_to_nothing() {
        let register = Register::new();
        assert!(register.is_empty());
        assert!(register.resolve().is_none());
    }

    #[test]
    fn same_actor_overwrites() {
        let alice = ActorId::new("alice");
        let past = Clock::new();
        let mut register = Register::new();

        register.assign(Writer::new(&alice, 1, &past), scalar("magpie"));
        let past = Clock::new().with("alice", 1);
        register.assign(Writer::new(&alice, 2, &past), scalar("blackbird"));

        assert_eq!(register.len(), 1);
        let resolved = register.resolve().unwrap();
        assert_eq!(resolved.winner.payload, scalar("blackbird"));
        assert!(resolved.conflicts.is_empty());
    }

    #[test]
    fn concurrent_writes_conflict_greatest_actor_wins() {
        let a1 = ActorId::new("actor1");
        let a2 = ActorId::new("actor2");
        let past = Clock::new();
        let mut register = Register::new();

        register.assign(Writer::new(&a2, 1, &past), scalar("blackbird"));
        register.assign(Writer::new(&a1, 1, &past), scalar("magpie"));

        let resolved = register.resolve().unwrap();
        assert_eq!(resolved.winner.actor, a2);
        assert_eq!(resolved.winner.payload, scalar("blackbird"));
        assert_eq!(resolved.conflicts.len(), 1);
        assert_eq!(resolved.conflicts[0].actor, a1);
        assert_eq!(resolved.conflicts[0].payload, scalar("magpie"));
    }

    #[test]
    fn causally_later_write_replaces_other_actor() {
        let a1 = ActorId::new("actor1");
        let a2 = ActorId::new("actor2");
        let mut register = Register::new();

        register.assign(Writer::new(&a2, 1, &Clock::new()), scalar("blackbird"));
        let seen = Clock::new().with("actor2", 1);
        register.assign(Writer::new(&a1, 1, &seen), scalar("magpie"));

        assert_eq!(actors(&register), vec!["actor1"]);
    }

    #[test]
    fn conflicts_are_actor_ascending() {
        let past = Clock::new();
        let mut register = Register::new();
        for name in ["delta", "alpha", "charlie", "bravo"] {
            let actor = ActorId::new(name);
            register.assign(Writer::new(&actor, 1, &past), scalar(name));
        }

        let resolved = register.resolve().unwrap();
        assert_eq!(resolved.winner.actor.as_str(), "delta");
        let conflicts: Vec<_> = resolved.conflicts.iter().map(|e| e.actor.as_str()).collect();
        assert_eq!(conflicts, vec!["alpha", "bravo", "charlie"]);
    }

    #[test]
    fn clear_keeps_concurrent_entries() {
        let a1 = ActorId::new("actor1");
        let a2 = ActorId::new("actor2");
        let mut register = Register::new();

        register.assign(Writer::new(&a1, 1, &Clock::new()), scalar("magpie"));
        register.assign(Writer::new(&a2, 1, &Clock::new()), scalar("blackbird"));

        // actor1 deletes without having seen actor2's write.
        let past = Clock::new().with("actor1", 1);
        register.clear(Writer::new(&a1, 2, &past));
        assert_eq!(actors(&register), vec!["actor2"]);

        // actor1 deletes again after seeing it.
        let past = Clock::new().with("actor1", 2).with("actor2", 1);
        register.clear(Writer::new(&a1, 3, &past));
        assert!(register.is_empty());
    }

    #[test]
    fn links_and_winner() {
        let a1 = ActorId::new("actor1");
        let a2 = ActorId::new("actor2");
        let past = Clock::new();
        let mut register = Register::new();

        register.assign(Writer::new(&a1, 1, &past), Payload::Link(ObjectId::new("nest")));
        register.assign(Writer::new(&a2, 1, &past), scalar("empty"));

        let links: Vec<_> = register.links().collect();
        assert_eq!(links, vec![&ObjectId::new("nest")]);
        assert!(!register.winner_links_to(&ObjectId::new("nest")));
    }
}
