// model = "claude-opus-4-5"
// created = "2026-10-16"
// modified = "2026-10-16"
// driver = "Isaac Clayton"

//! Error type for change application.
//!
//! Every error here is fatal for the batch that raised it: the engine
//! performs no I/O, so nothing is retryable. A failed batch leaves the
//! backend exactly as it was before the call.

use thiserror::Error;

use crate::id::ActorId;
use crate::id::ObjectId;
use crate::store::ObjType;

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while applying changes.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    /// An operation referenced an object that was never created.
    #[error("object not found: {obj}")]
    ObjectNotFound { obj: ObjectId },

    /// `makeMap`/`makeList` for an id that already exists.
    #[error("object already exists: {obj}")]
    DuplicateObject { obj: ObjectId },

    /// The operation does not apply to this kind of object.
    #[error("operation `{action}` on {obj}: expected {expected}, found {actual}")]
    TypeMismatch {
        action: &'static str,
        obj: ObjectId,
        expected: ObjType,
        actual: ObjType,
    },

    /// A list key did not parse as `<actor>:<counter>`.
    #[error("invalid element id: {key:?}")]
    InvalidElemId { key: String },

    /// A list operation referenced an element that is not in the list.
    #[error("element {elem} not found in list {obj}")]
    ElementNotFound { obj: ObjectId, elem: String },

    /// An `ins` reused an element id already present in the list.
    #[error("element {elem} already exists in list {obj}")]
    DuplicateElement { obj: ObjectId, elem: String },

    /// A change numbered 0. Seqs start at 1.
    #[error("change from {actor} has seq 0; seqs start at 1")]
    ZeroSeq { actor: ActorId },

    /// A change arrived out of sequence for its own actor.
    #[error("change {actor}:{seq} is not causally ready: expected seq {expected}")]
    CausalityViolation { actor: ActorId, seq: u64, expected: u64 },

    /// A change depends on a change that has not been applied.
    #[error("change {actor}:{seq} depends on {dep_actor}:{dep_seq}, which has not been applied")]
    MissingDependency {
        actor: ActorId,
        seq: u64,
        dep_actor: ActorId,
        dep_seq: u64,
    },

    /// A change that was already applied, rejected by configuration.
    #[error("change {actor}:{seq} has already been applied")]
    DuplicateChange { actor: ActorId, seq: u64 },

    /// Configuration could not be loaded.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

impl Error {
    /// True for errors caused by an operation naming something that does not exist.
    pub fn is_not_found(&self) -> bool {
        return matches!(self, Error::ObjectNotFound { .. } | Error::ElementNotFound { .. });
    }

    /// True for errors caused by the delivery layer handing over a change too early
    /// or more than once.
    pub fn is_causality_error(&self) -> bool {
        return matches!(
            self,
            Error::CausalityViolation { .. }
                | Error::MissingDependency { .. }
                | Error::DuplicateChange { .. }
        );
    }

    /// The object the failing operation targeted, if any.
    pub fn object(&self) -> Option<&ObjectId> {
        match self {
            Error::ObjectNotFound { obj }
            | Error::DuplicateObject { obj }
            | Error::TypeMismatch { obj, .. }
            | Error::ElementNotFound { obj, .. }
            | Error::DuplicateElement { obj, .. } => return Some(obj),
            _ => return None,
        }
    }
}
