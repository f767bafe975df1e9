// model = "claude-opus-4-5"
// created = "2026-10-16"
// modified = "2026-10-16"
// driver = "Isaac Clayton"

//! Changes and the operations they carry.
//!
//! A change is an atomic batch of operations authored by one actor. Each
//! actor numbers its changes 1, 2, 3, ... and records in `deps` the highest
//! change it had seen from every other actor. Operations are
//! *intention-preserving*: list positions are named by element id, never by
//! index, so they survive concurrent edits.
//!
//! The wire form is JSON with an `action` tag per operation:
//!
//! ```text
//! {"actor": "a1", "seq": 1, "deps": {}, "ops": [
//!   {"action": "makeList", "obj": "birds"},
//!   {"action": "ins", "obj": "birds", "key": "_head", "elem": 1},
//!   {"action": "set", "obj": "birds", "key": "a1:1", "value": "chaffinch"},
//!   {"action": "link", "obj": "00000000-...", "key": "birds", "value": "birds"}
//! ]}
//! ```

use serde::Deserialize;
use serde::Serialize;

use crate::clock::Clock;
use crate::id::ActorId;
use crate::id::ObjectId;
use crate::value::Value;

/// A single primitive edit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Op {
    /// Create an empty map.
    MakeMap { obj: ObjectId },
    /// Create an empty list.
    MakeList { obj: ObjectId },
    /// Assign a scalar to a map key or list element.
    Set { obj: ObjectId, key: String, value: Value },
    /// Remove the value(s) at a map key or list element.
    Del { obj: ObjectId, key: String },
    /// Assign a child object to a map key or list element.
    Link { obj: ObjectId, key: String, value: ObjectId },
    /// Insert a new list element after `key` (an element id or `_head`).
    Ins { obj: ObjectId, key: String, elem: u64 },
}

impl Op {
    /// The object this operation targets.
    pub fn obj(&self) -> &ObjectId {
        match self {
            Op::MakeMap { obj }
            | Op::MakeList { obj }
            | Op::Set { obj, .. }
            | Op::Del { obj, .. }
            | Op::Link { obj, .. }
            | Op::Ins { obj, .. } => return obj,
        }
    }

    /// The `action` tag, for logs and errors.
    pub fn action(&self) -> &'static str {
        match self {
            Op::MakeMap { .. } => return "makeMap",
            Op::MakeList { .. } => return "makeList",
            Op::Set { .. } => return "set",
            Op::Del { .. } => return "del",
            Op::Link { .. } => return "link",
            Op::Ins { .. } => return "ins",
        }
    }

    pub fn make_map(obj: impl Into<ObjectId>) -> Op {
        return Op::MakeMap { obj: obj.into() };
    }

    pub fn make_list(obj: impl Into<ObjectId>) -> Op {
        return Op::MakeList { obj: obj.into() };
    }

    pub fn set(obj: impl Into<ObjectId>, key: impl Into<String>, value: impl Into<Value>) -> Op {
        return Op::Set {
            obj: obj.into(),
            key: key.into(),
            value: value.into(),
        };
    }

    pub fn del(obj: impl Into<ObjectId>, key: impl Into<String>) -> Op {
        return Op::Del {
            obj: obj.into(),
            key: key.into(),
        };
    }

    pub fn link(obj: impl Into<ObjectId>, key: impl Into<String>, child: impl Into<ObjectId>) -> Op {
        return Op::Link {
            obj: obj.into(),
            key: key.into(),
            value: child.into(),
        };
    }

    pub fn ins(obj: impl Into<ObjectId>, key: impl Into<String>, elem: u64) -> Op {
        return Op::Ins {
            obj: obj.into(),
            key: key.into(),
            elem,
        };
    }
}

/// An atomic, ordered batch of operations from one actor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Change {
    /// The authoring replica.
    pub actor: ActorId,
    /// 1-based, strictly increasing per actor.
    pub seq: u64,
    /// Highest seq observed from each other actor when this change was made.
    #[serde(default)]
    pub deps: Clock,
    /// Operations, applied strictly in order.
    pub ops: Vec<Op>,
}

impl Change {
    /// Create a change with no dependencies.
    pub fn new(actor: impl Into<ActorId>, seq: u64, ops: Vec<Op>) -> Change {
        return Change {
            actor: actor.into(),
            seq,
            deps: Clock::new(),
            ops,
        };
    }

    /// Replace the dependencies of this change.
    pub fn with_deps(mut self, deps: Clock) -> Change {
        self.deps = deps;
        return self;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::ROOT_ID;
    use serde_json::json;

    #[test]
    fn deserializes_wire_form() {
        let change: Change = serde_json::from_value(json!({
            "actor": "actor1",
            "seq": 1,
            "deps": {},
            "ops": [
                {"action": "makeList", "obj": "birds"},
                {"action": "ins", "obj": "birds", "key": "_head", "elem": 1},
                {"action": "set", "obj": "birds", "key": "actor1:1", "value": "chaffinch"},
                {"action": "del", "obj": "birds", "key": "actor1:1"},
                {"action": "link", "obj": ROOT_ID, "key": "birds", "value": "birds"},
                {"action": "makeMap", "obj": "nest"}
            ]
        }))
        .unwrap();

        assert_eq!(change.actor, ActorId::new("actor1"));
        assert_eq!(change.seq, 1);
        assert!(change.deps.is_empty());
        assert_eq!(
            change.ops,
            vec![
                Op::make_list("birds"),
                Op::ins("birds", "_head", 1),
                Op::set("birds", "actor1:1", "chaffinch"),
                Op::del("birds", "actor1:1"),
                Op::link(ROOT_ID, "birds", "birds"),
                Op::make_map("nest"),
            ]
        );
    }

    #[test]
    fn deps_default_to_empty() {
        let change: Change = serde_json::from_value(json!({
            "actor": "a", "seq": 2, "ops": []
        }))
        .unwrap();
        assert!(change.deps.is_empty());
    }

    #[test]
    fn rejects_unknown_action() {
        let result = serde_json::from_value::<Op>(json!({"action": "move", "obj": "x"}));
        assert!(result.is_err());
    }

    #[test]
    fn op_accessors() {
        let op = Op::set("birds", "wrens", 3i64);
        assert_eq!(op.obj(), &ObjectId::new("birds"));
        assert_eq!(op.action(), "set");
        assert_eq!(Op::ins("l", "_head", 1).action(), "ins");
    }

    #[test]
    fn serializes_with_action_tag() {
        let op = Op::del(ROOT_ID, "bird");
        assert_eq!(
            serde_json::to_value(&op).unwrap(),
            json!({"action": "del", "obj": ROOT_ID, "key": "bird"})
        );
    }
}
