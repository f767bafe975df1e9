// model = "claude-opus-4-5"
// created = "2026-10-16"
// modified = "2026-10-16"
// driver = "Isaac Clayton"

//! Values held by map keys and list elements.

use serde::Deserialize;
use serde::Serialize;

use crate::id::ObjectId;

/// A scalar value, as carried by `set` operations.
///
/// Integers that fit `i64` are `Int`; larger non-negative ones are `UInt`,
/// so no JSON integer degrades to a float.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(String),
}

impl From<&str> for Value {
    fn from(s: &str) -> Value {
        return Value::Str(s.to_string());
    }
}

impl From<String> for Value {
    fn from(s: String) -> Value {
        return Value::Str(s);
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Value {
        return Value::Int(n);
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Value {
        return Value::Int(n as i64);
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Value {
        return Value::UInt(n);
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Value {
        return Value::Float(n);
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Value {
        return Value::Bool(b);
    }
}

/// What one actor contributes to a register: a scalar, or a link to a
/// child object.
///
/// Serializes as the bare scalar or the bare object id; the `link` flag on
/// diffs tells the two apart.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    Scalar(Value),
    Link(ObjectId),
}

impl Payload {
    pub fn is_link(&self) -> bool {
        return matches!(self, Payload::Link(_));
    }

    /// The linked object, if this payload is a link.
    pub fn link(&self) -> Option<&ObjectId> {
        match self {
            Payload::Link(obj) => return Some(obj),
            Payload::Scalar(_) => return None,
        }
    }
}
