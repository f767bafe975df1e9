// model = "claude-opus-4-5"
// created = "2026-10-16"
// modified = "2026-10-16"
// driver = "Isaac Clayton"

//! Patches: the engine's description of what observably changed.
//!
//! A patch is a flat list of diffs. Each diff names the object it touches
//! by id, and (in incremental mode) by its path from the root. Serialized,
//! a diff omits every field that does not apply to it:
//!
//! ```text
//! {"action": "create", "obj": "birds", "type": "list"}
//! {"action": "insert", "obj": "birds", "type": "list", "path": null, "index": 0,
//!  "value": "chaffinch", "elemId": "a1:1"}
//! {"action": "set", "obj": "0000...", "type": "map", "path": [], "key": "birds",
//!  "value": "birds", "link": true}
//! ```

use serde::Serialize;

use crate::id::ActorId;
use crate::id::ElemId;
use crate::id::ObjectId;
use crate::register::Entry;
use crate::register::Resolved;
use crate::store::ObjType;
use crate::value::Payload;

/// One step of a path from the root: a map key or a list index.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PathElem {
    Key(String),
    Index(usize),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffAction {
    Create,
    Set,
    Insert,
    Remove,
}

/// A losing value in a conflict set.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Conflict {
    pub actor: ActorId,
    pub value: Payload,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub link: bool,
}

impl From<&Entry> for Conflict {
    fn from(entry: &Entry) -> Conflict {
        return Conflict {
            actor: entry.actor.clone(),
            value: entry.payload.clone(),
            link: entry.payload.is_link(),
        };
    }
}

/// One observable change.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diff {
    pub action: DiffAction,
    pub obj: ObjectId,
    #[serde(rename = "type")]
    pub obj_type: ObjType,
    /// Outer `None`: no path reported. `Some(None)`: the object is not
    /// reachable from the root.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<Option<Vec<PathElem>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Payload>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub link: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elem_id: Option<ElemId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflicts: Option<Vec<Conflict>>,
}

impl Diff {
    fn bare(action: DiffAction, obj: &ObjectId, obj_type: ObjType) -> Diff {
        return Diff {
            action,
            obj: obj.clone(),
            obj_type,
            path: None,
            key: None,
            index: None,
            value: None,
            link: false,
            elem_id: None,
            conflicts: None,
        };
    }

    pub fn create(obj: &ObjectId, obj_type: ObjType) -> Diff {
        return Diff::bare(DiffAction::Create, obj, obj_type);
    }

    /// A map key now resolving to `resolved`.
    pub fn set_key(obj: &ObjectId, key: &str, resolved: Resolved<'_>) -> Diff {
        let mut diff = Diff::bare(DiffAction::Set, obj, ObjType::Map);
        diff.key = Some(key.to_string());
        diff.with_resolved(resolved);
        return diff;
    }

    pub fn remove_key(obj: &ObjectId, key: &str) -> Diff {
        let mut diff = Diff::bare(DiffAction::Remove, obj, ObjType::Map);
        diff.key = Some(key.to_string());
        return diff;
    }

    /// A list element, already visible, now resolving to `resolved`.
    pub fn set_index(obj: &ObjectId, index: usize, resolved: Resolved<'_>) -> Diff {
        let mut diff = Diff::bare(DiffAction::Set, obj, ObjType::List);
        diff.index = Some(index);
        diff.with_resolved(resolved);
        return diff;
    }

    /// A list element becoming visible at `index`.
    pub fn insert(obj: &ObjectId, index: usize, elem: &ElemId, resolved: Resolved<'_>) -> Diff {
        let mut diff = Diff::bare(DiffAction::Insert, obj, ObjType::List);
        diff.index = Some(index);
        diff.with_resolved(resolved);
        diff.elem_id = Some(elem.clone());
        return diff;
    }

    pub fn remove_index(obj: &ObjectId, index: usize) -> Diff {
        let mut diff = Diff::bare(DiffAction::Remove, obj, ObjType::List);
        diff.index = Some(index);
        return diff;
    }

    /// Attach a path (incremental mode only).
    pub fn with_path(mut self, path: Option<Vec<PathElem>>) -> Diff {
        self.path = Some(path);
        return self;
    }

    fn with_resolved(&mut self, resolved: Resolved<'_>) {
        self.value = Some(resolved.winner.payload.clone());
        self.link = resolved.winner.payload.is_link();
        if !resolved.conflicts.is_empty() {
            self.conflicts = Some(resolved.conflicts.iter().map(Conflict::from).collect());
        }
    }
}

/// The output of one `apply_changes` call.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Patch {
    pub diffs: Vec<Diff>,
}

impl Patch {
    pub fn new(diffs: Vec<Diff>) -> Patch {
        return Patch { diffs };
    }

    pub fn is_empty(&self) -> bool {
        return self.diffs.is_empty();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::Clock;
    use crate::register::Register;
    use crate::register::Writer;
    use crate::value::Value;
    use serde_json::json;

    #[test]
    fn create_has_no_optional_fields() {
        let diff = Diff::create(&ObjectId::new("birds"), ObjType::List);
        assert_eq!(
            serde_json::to_value(&diff).unwrap(),
            json!({"action": "create", "obj": "birds", "type": "list"})
        );
    }

    #[test]
    fn unreachable_path_serializes_as_null() {
        let diff = Diff::remove_key(&ObjectId::new("birds"), "wrens").with_path(None);
        assert_eq!(
            serde_json::to_value(&diff).unwrap(),
            json!({"action": "remove", "obj": "birds", "type": "map", "path": null, "key": "wrens"})
        );
    }

    #[test]
    fn set_reports_conflicts_and_links() {
        let a1 = ActorId::new("actor1");
        let a2 = ActorId::new("actor2");
        let past = Clock::new();
        let mut register = Register::new();
        register.assign(Writer::new(&a1, 1, &past), Payload::Link(ObjectId::new("nest")));
        register.assign(Writer::new(&a2, 1, &past), Payload::Scalar(Value::from("twig")));

        let diff = Diff::set_key(&ObjectId::root(), "home", register.resolve().unwrap())
            .with_path(Some(vec![]));
        assert_eq!(
            serde_json::to_value(&diff).unwrap(),
            json!({
                "action": "set", "obj": ObjectId::root(), "type": "map", "path": [],
                "key": "home", "value": "twig",
                "conflicts": [{"actor": "actor1", "value": "nest", "link": true}]
            })
        );
    }

    #[test]
    fn path_mixes_keys_and_indices() {
        let path = vec![PathElem::Key("flock".to_string()), PathElem::Index(2)];
        assert_eq!(serde_json::to_value(&path).unwrap(), json!(["flock", 2]));
    }
}
