// model = "claude-opus-4-5"
// created = "2026-10-16"
// modified = "2026-10-16"
// driver = "Isaac Clayton"

//! Identifier types for actors, objects and list elements.
//!
//! # Identifier Hierarchy
//!
//! - `ActorId`: names a replica; ordered lexicographically for tie-breaks
//! - `ObjectId`: names a map or list; the root has a fixed all-zero id
//! - `ElemId`: names a list element as `(actor, counter)`, written `actor:counter`
//!
//! Ids are minted outside this crate. All that is required of them is
//! global uniqueness and a deterministic total order, which string
//! comparison provides.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;

/// Fixed identity of the root map.
pub const ROOT_ID: &str = "00000000-0000-0000-0000-000000000000";

/// Key naming the virtual start-of-list sentinel in `ins` operations.
pub const HEAD: &str = "_head";

/// A replica identity.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(String);

impl ActorId {
    pub fn new(id: impl Into<String>) -> ActorId {
        return ActorId(id.into());
    }

    pub fn as_str(&self) -> &str {
        return &self.0;
    }
}

impl fmt::Debug for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return write!(f, "ActorId({})", self.0);
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return f.write_str(&self.0);
    }
}

impl From<&str> for ActorId {
    fn from(id: &str) -> ActorId {
        return ActorId::new(id);
    }
}

impl From<String> for ActorId {
    fn from(id: String) -> ActorId {
        return ActorId(id);
    }
}

impl From<&ActorId> for ActorId {
    fn from(id: &ActorId) -> ActorId {
        return id.clone();
    }
}

/// The identity of a map or list object.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(String);

impl ObjectId {
    pub fn new(id: impl Into<String>) -> ObjectId {
        return ObjectId(id.into());
    }

    /// The root map, which exists for the lifetime of every document.
    pub fn root() -> ObjectId {
        return ObjectId(ROOT_ID.to_string());
    }

    pub fn is_root(&self) -> bool {
        return self.0 == ROOT_ID;
    }

    pub fn as_str(&self) -> &str {
        return &self.0;
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return write!(f, "ObjectId({})", self.0);
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return f.write_str(&self.0);
    }
}

impl From<&str> for ObjectId {
    fn from(id: &str) -> ObjectId {
        return ObjectId::new(id);
    }
}

impl From<String> for ObjectId {
    fn from(id: String) -> ObjectId {
        return ObjectId(id);
    }
}

impl From<&ObjectId> for ObjectId {
    fn from(id: &ObjectId) -> ObjectId {
        return id.clone();
    }
}

/// A list element identifier.
///
/// Unique by construction: each actor hands out its own counters, so the
/// `(actor, counter)` pair never repeats across replicas.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ElemId {
    /// The actor whose `ins` created the element.
    pub actor: ActorId,
    /// The per-actor counter supplied with the `ins`.
    pub counter: u64,
}

impl ElemId {
    pub fn new(actor: ActorId, counter: u64) -> ElemId {
        return ElemId { actor, counter };
    }
}

impl PartialOrd for ElemId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        return Some(self.cmp(other));
    }
}

impl Ord for ElemId {
    /// Counter first, then actor. Used to order concurrent siblings.
    fn cmp(&self, other: &Self) -> Ordering {
        match self.counter.cmp(&other.counter) {
            Ordering::Equal => return self.actor.cmp(&other.actor),
            other => return other,
        }
    }
}

impl fmt::Debug for ElemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return write!(f, "ElemId({}:{})", self.actor, self.counter);
    }
}

impl fmt::Display for ElemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return write!(f, "{}:{}", self.actor, self.counter);
    }
}

/// Error returned when a string is not of the form `actor:counter`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseElemIdError;

impl FromStr for ElemId {
    type Err = ParseElemIdError;

    fn from_str(s: &str) -> Result<ElemId, ParseElemIdError> {
        // Split at the last colon so actor ids may themselves contain colons.
        let (actor, counter) = s.rsplit_once(':').ok_or(ParseElemIdError)?;
        if actor.is_empty() {
            return Err(ParseElemIdError);
        }
        let counter = counter.parse::<u64>().map_err(|_| ParseElemIdError)?;
        return Ok(ElemId::new(ActorId::new(actor), counter));
    }
}

impl Serialize for ElemId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        return serializer.collect_str(self);
    }
}

impl<'de> Deserialize<'de> for ElemId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<ElemId, D::Error> {
        let s = String::deserialize(deserializer)?;
        return s
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid element id: {s:?}")));
    }
}

/// The predecessor named by an `ins` operation.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ListKey {
    /// The virtual start-of-list sentinel.
    Head,
    /// An existing element, tombstoned or not.
    Elem(ElemId),
}

impl FromStr for ListKey {
    type Err = ParseElemIdError;

    fn from_str(s: &str) -> Result<ListKey, ParseElemIdError> {
        if s == HEAD {
            return Ok(ListKey::Head);
        }
        return Ok(ListKey::Elem(s.parse()?));
    }
}
