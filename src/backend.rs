// model = "claude-opus-4-5"
// created = "2026-10-16"
// modified = "2026-10-16"
// driver = "Isaac Clayton"

//! The change processor.
//!
//! A `Backend` owns one document: its object store, the clock of changes
//! applied so far, and the log of those changes. Batches of changes go in,
//! a patch comes out, in one of two modes:
//!
//! - `PatchMode::Incremental`: one diff per observable effect, in operation
//!   order, each tagged with the path of its object as of right after the
//!   operation. Meant for a consumer that mirrors the previous state.
//! - `PatchMode::Materialize`: the diffs that rebuild the whole current
//!   document from nothing, history collapsed, no paths.
//!
//! Changes must be causally ready when presented: an actor's changes arrive
//! in `seq` order and after every change named in `deps`. The backend checks
//! this and fails the batch otherwise, rather than buffering. A failed batch
//! leaves the backend untouched.
//!
//! # Example
//!
//! ```
//! use accord::{Backend, Change, Op, PatchMode, ROOT_ID};
//!
//! let mut backend = Backend::new();
//! let change = Change::new("actor1", 1, vec![Op::set(ROOT_ID, "bird", "magpie")]);
//! let patch = backend.apply_changes(&[change], PatchMode::Incremental).unwrap();
//! assert_eq!(patch.diffs.len(), 1);
//! ```

use rustc_hash::FxHashMap;
use rustc_hash::FxHashSet;
use tracing::debug;
use tracing::warn;

use crate::apply::apply_op;
use crate::change::Change;
use crate::clock::Clock;
use crate::config::Config;
use crate::config::DuplicatePolicy;
use crate::error::Error;
use crate::error::Result;
use crate::id::ActorId;
use crate::id::ObjectId;
use crate::patch::Diff;
use crate::patch::DiffAction;
use crate::patch::Patch;
use crate::register::Resolved;
use crate::register::Writer;
use crate::store::Object;
use crate::store::ObjectStore;

/// Which kind of patch `apply_changes` reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PatchMode {
    Incremental,
    Materialize,
}

impl PatchMode {
    pub fn from_incremental(incremental: bool) -> PatchMode {
        if incremental {
            return PatchMode::Incremental;
        }
        return PatchMode::Materialize;
    }
}

/// Document state threaded between `apply_changes` calls.
#[derive(Clone, Debug, Default)]
pub struct Backend {
    config: Config,
    store: ObjectStore,
    /// Highest seq applied per actor.
    clock: Clock,
    /// Causal past of every applied change, indexed by `seq - 1`.
    pasts: FxHashMap<ActorId, Vec<Clock>>,
    /// Applied changes in application order.
    history: Vec<Change>,
}

/// A fresh, empty document.
pub fn init() -> Backend {
    return Backend::new();
}

/// Apply `changes` to `state`, returning the new state and its patch.
///
/// `incremental` selects between `PatchMode::Incremental` and
/// `PatchMode::Materialize`.
pub fn apply_changes(mut state: Backend, changes: &[Change], incremental: bool) -> Result<(Backend, Patch)> {
    let patch = state.apply_changes(changes, PatchMode::from_incremental(incremental))?;
    return Ok((state, patch));
}

impl Backend {
    pub fn new() -> Backend {
        return Backend::with_config(Config::default());
    }

    pub fn with_config(config: Config) -> Backend {
        return Backend {
            config,
            store: ObjectStore::new(),
            clock: Clock::new(),
            pasts: FxHashMap::default(),
            history: Vec::new(),
        };
    }

    pub fn config(&self) -> &Config {
        return &self.config;
    }

    pub fn store(&self) -> &ObjectStore {
        return &self.store;
    }

    /// Highest seq applied from each actor.
    pub fn clock(&self) -> &Clock {
        return &self.clock;
    }

    /// Applied changes, in the order they were applied.
    pub fn history(&self) -> &[Change] {
        return &self.history;
    }

    /// Apply a batch of changes in order and report the result.
    ///
    /// All-or-nothing: if any change or operation fails, the backend is
    /// left as it was and the error is returned. Only what the batch
    /// touched is recorded for the rollback.
    pub fn apply_changes(&mut self, changes: &[Change], mode: PatchMode) -> Result<Patch> {
        let clock = self.clock.clone();
        let history_len = self.history.len();
        self.store.begin();

        let mut diffs = Vec::new();
        for change in changes {
            if let Err(err) = self.apply_change(change, mode, &mut diffs) {
                warn!(actor = %change.actor, seq = change.seq, error = %err, "rejecting batch");
                self.rollback(clock, history_len);
                return Err(err);
            }
        }
        self.store.commit();

        match mode {
            PatchMode::Incremental => return Ok(Patch::new(diffs)),
            PatchMode::Materialize => return Ok(self.get_patch()),
        }
    }

    /// The materialized patch of the current document.
    pub fn get_patch(&self) -> Patch {
        return Patch::new(materialize(&self.store));
    }

    /// Deps of `change` (including its own predecessor) not yet applied.
    pub fn missing_deps(&self, change: &Change) -> Clock {
        let mut missing = Clock::new();
        if change.seq > 1 && self.clock.get(&change.actor) < change.seq - 1 {
            missing.observe(&change.actor, change.seq - 1);
        }
        for (actor, seq) in change.deps.iter() {
            if self.clock.get(actor) < seq {
                missing.observe(actor, seq);
            }
        }
        return missing;
    }

    /// Applied changes not covered by `clock`, in application order.
    pub fn changes_since(&self, clock: &Clock) -> Vec<&Change> {
        return self
            .history
            .iter()
            .filter(|change| change.seq > clock.get(&change.actor))
            .collect();
    }

    /// Applied changes authored by `actor`, in seq order.
    pub fn changes_for_actor(&self, actor: &ActorId) -> Vec<&Change> {
        return self
            .history
            .iter()
            .filter(|change| change.actor == *actor)
            .collect();
    }

    /// Apply every change `other` has that this backend lacks.
    pub fn merge(&mut self, other: &Backend, mode: PatchMode) -> Result<Patch> {
        let changes: Vec<Change> = other.changes_since(&self.clock).into_iter().cloned().collect();
        return self.apply_changes(&changes, mode);
    }

    /// Forget the changes of a failed batch.
    fn rollback(&mut self, clock: Clock, history_len: usize) {
        self.store.rollback();
        for change in self.history.drain(history_len..) {
            if let Some(pasts) = self.pasts.get_mut(&change.actor) {
                pasts.pop();
                if pasts.is_empty() {
                    self.pasts.remove(&change.actor);
                }
            }
        }
        self.clock = clock;
    }

    fn apply_change(&mut self, change: &Change, mode: PatchMode, diffs: &mut Vec<Diff>) -> Result<()> {
        if change.seq == 0 {
            return Err(Error::ZeroSeq {
                actor: change.actor.clone(),
            });
        }
        let applied = self.clock.get(&change.actor);
        if change.seq <= applied {
            match self.config.duplicates {
                DuplicatePolicy::Skip => {
                    debug!(actor = %change.actor, seq = change.seq, "skipping duplicate change");
                    return Ok(());
                }
                DuplicatePolicy::Reject => {
                    return Err(Error::DuplicateChange {
                        actor: change.actor.clone(),
                        seq: change.seq,
                    });
                }
            }
        }
        if change.seq != applied + 1 {
            return Err(Error::CausalityViolation {
                actor: change.actor.clone(),
                seq: change.seq,
                expected: applied + 1,
            });
        }

        let past = self.causal_past(change)?;
        let writer = Writer::new(&change.actor, change.seq, &past);
        for op in &change.ops {
            let Some(diff) = apply_op(&mut self.store, writer, op)? else {
                continue;
            };
            if mode == PatchMode::Incremental {
                if diff.action == DiffAction::Create {
                    diffs.push(diff);
                } else {
                    let path = self.store.path_of(&diff.obj);
                    diffs.push(diff.with_path(path));
                }
            }
        }

        debug!(actor = %change.actor, seq = change.seq, ops = change.ops.len(), "applied change");
        self.clock.observe(&change.actor, change.seq);
        self.pasts.entry(change.actor.clone()).or_default().push(past);
        self.history.push(change.clone());
        return Ok(());
    }

    /// Everything `change` causally follows: its own predecessor, its deps,
    /// and transitively their pasts.
    fn causal_past(&self, change: &Change) -> Result<Clock> {
        let mut past = Clock::new();
        if change.seq > 1 {
            self.extend_past(&mut past, &change.actor, change.seq - 1);
        }
        for (actor, seq) in change.deps.iter() {
            if self.clock.get(actor) < seq {
                return Err(Error::MissingDependency {
                    actor: change.actor.clone(),
                    seq: change.seq,
                    dep_actor: actor.clone(),
                    dep_seq: seq,
                });
            }
            self.extend_past(&mut past, actor, seq);
        }
        return Ok(past);
    }

    fn extend_past(&self, past: &mut Clock, actor: &ActorId, seq: u64) {
        if past.get(actor) >= seq {
            return;
        }
        let index = (seq - 1) as usize;
        if let Some(dep_past) = self.pasts.get(actor).and_then(|pasts| pasts.get(index)) {
            past.merge(dep_past);
        }
        past.observe(actor, seq);
    }
}

/// Diffs rebuilding every object reachable from the root.
///
/// Depth-first from the root: a linked child's `create` and contents come
/// right before the diff that links it, so a consumer replaying the list in
/// order never sees a link to an object it has not built yet. Each object
/// is emitted once even if linked from several places.
fn materialize(store: &ObjectStore) -> Vec<Diff> {
    let mut diffs = Vec::new();
    let mut emitted = FxHashSet::default();
    let root = ObjectId::root();
    emitted.insert(root.clone());
    emit_object(store, &root, &mut emitted, &mut diffs);
    return diffs;
}

fn emit_object(store: &ObjectStore, obj: &ObjectId, emitted: &mut FxHashSet<ObjectId>, diffs: &mut Vec<Diff>) {
    let Ok(object) = store.get(obj) else {
        return;
    };
    match object {
        Object::Map(map) => {
            for (key, register) in map.live() {
                let Some(resolved) = register.resolve() else {
                    continue;
                };
                emit_children(store, resolved, emitted, diffs);
                diffs.push(Diff::set_key(obj, key, resolved));
            }
        }
        Object::List(list) => {
            for (index, (elem, resolved)) in list.live().enumerate() {
                emit_children(store, resolved, emitted, diffs);
                diffs.push(Diff::insert(obj, index, elem, resolved));
            }
        }
    }
}

fn emit_children(store: &ObjectStore, resolved: Resolved<'_>, emitted: &mut FxHashSet<ObjectId>, diffs: &mut Vec<Diff>) {
    for child in resolved.links() {
        if !emitted.insert(child.clone()) {
            continue;
        }
        let Ok(obj_type) = store.obj_type(child) else {
            continue;
        };
        diffs.push(Diff::create(child, obj_type));
        emit_object(store, child, emitted, diffs);
    }
}
