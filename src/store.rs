// model = "claude-opus-4-5"
// created = "2026-10-16"
// modified = "2026-10-16"
// driver = "Isaac Clayton"

//! Object store.
//!
//! Holds every map and list by id, plus an index of inbound links so that
//! an object's path from the root can be found without walking the whole
//! document. The root map is created with the store and can never be
//! recreated.

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::collections::VecDeque;
use std::fmt;

use rustc_hash::FxHashMap;
use rustc_hash::FxHashSet;
use serde::Serialize;

use crate::error::Error;
use crate::error::Result;
use crate::id::ElemId;
use crate::id::ListKey;
use crate::id::ObjectId;
use crate::list::List;
use crate::list::ListError;
use crate::patch::PathElem;
use crate::register::Register;
use crate::register::Writer;

/// The two kinds of object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjType {
    Map,
    List,
}

impl fmt::Display for ObjType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjType::Map => return f.write_str("map"),
            ObjType::List => return f.write_str("list"),
        }
    }
}

/// A map object: one register per key, iterated in key order.
#[derive(Clone, Debug, Default)]
pub struct MapObject {
    keys: BTreeMap<String, Register>,
}

impl MapObject {
    pub fn get(&self, key: &str) -> Option<&Register> {
        return self.keys.get(key);
    }

    /// Keys holding a value, in key order.
    pub fn live(&self) -> impl Iterator<Item = (&String, &Register)> {
        return self.keys.iter().filter(|(_, register)| !register.is_empty());
    }
}

#[derive(Clone, Debug)]
pub enum Object {
    Map(MapObject),
    List(List),
}

impl Object {
    pub fn obj_type(&self) -> ObjType {
        match self {
            Object::Map(_) => return ObjType::Map,
            Object::List(_) => return ObjType::List,
        }
    }
}

/// A register's location: a map key or a list element.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Slot {
    Key(String),
    Elem(ElemId),
}

/// One step of a batch, recorded so the batch can be taken back.
#[derive(Clone, Debug)]
enum Undo {
    /// The newest entry of `created` was made by this batch.
    Created,
    /// A register's contents before it was first touched.
    Register {
        obj: ObjectId,
        slot: Slot,
        before: Option<Register>,
    },
    Inserted { obj: ObjectId, elem: ElemId },
    Linked { child: ObjectId, parent: (ObjectId, Slot) },
    Unlinked { child: ObjectId, parent: (ObjectId, Slot) },
}

/// All objects of one document.
#[derive(Clone, Debug)]
pub struct ObjectStore {
    objects: FxHashMap<ObjectId, Object>,
    /// Non-root objects in creation order.
    created: Vec<ObjectId>,
    /// For each object, the register slots currently linking to it.
    inbound: FxHashMap<ObjectId, BTreeSet<(ObjectId, Slot)>>,
    /// Mutations since `begin`, while a batch is open.
    journal: Option<Vec<Undo>>,
}

impl Default for ObjectStore {
    fn default() -> Self {
        return Self::new();
    }
}

impl ObjectStore {
    /// A store holding only the empty root map.
    pub fn new() -> ObjectStore {
        let mut objects = FxHashMap::default();
        objects.insert(ObjectId::root(), Object::Map(MapObject::default()));
        return ObjectStore {
            objects,
            created: Vec::new(),
            inbound: FxHashMap::default(),
            journal: None,
        };
    }

    pub fn contains(&self, obj: &ObjectId) -> bool {
        return self.objects.contains_key(obj);
    }

    /// Number of objects, root included.
    pub fn len(&self) -> usize {
        return self.objects.len();
    }

    pub fn is_empty(&self) -> bool {
        return self.objects.is_empty();
    }

    /// Non-root object ids in creation order.
    pub fn created(&self) -> &[ObjectId] {
        return &self.created;
    }

    // =========================================================================
    // Batches
    // =========================================================================

    /// Start recording mutations so they can be rolled back.
    ///
    /// The cost of a rollback is proportional to what the batch touched,
    /// not to the size of the document.
    pub fn begin(&mut self) {
        self.journal = Some(Vec::new());
    }

    /// Keep everything since `begin` and stop recording.
    pub fn commit(&mut self) {
        self.journal = None;
    }

    /// Undo everything since `begin`, newest first, and stop recording.
    pub fn rollback(&mut self) {
        let Some(journal) = self.journal.take() else {
            return;
        };
        for undo in journal.into_iter().rev() {
            self.undo(undo);
        }
    }

    fn record(&mut self, undo: Undo) {
        if let Some(journal) = &mut self.journal {
            journal.push(undo);
        }
    }

    fn undo(&mut self, undo: Undo) {
        match undo {
            Undo::Created => {
                if let Some(obj) = self.created.pop() {
                    self.objects.remove(&obj);
                }
            }
            Undo::Register { obj, slot, before } => match (self.objects.get_mut(&obj), slot) {
                (Some(Object::Map(map)), Slot::Key(key)) => match before {
                    Some(register) => {
                        map.keys.insert(key, register);
                    }
                    None => {
                        map.keys.remove(&key);
                    }
                },
                (Some(Object::List(list)), Slot::Elem(elem)) => {
                    if let Some(node) = list.get_mut(&elem) {
                        node.register = before.unwrap_or_default();
                    }
                }
                _ => {}
            },
            Undo::Inserted { obj, elem } => {
                if let Some(Object::List(list)) = self.objects.get_mut(&obj) {
                    list.undo_insert(&elem);
                }
            }
            Undo::Linked { child, parent } => self.unlink(&child, &parent),
            Undo::Unlinked { child, parent } => self.link(child, parent),
        }
    }

    fn link(&mut self, child: ObjectId, parent: (ObjectId, Slot)) {
        self.inbound.entry(child).or_default().insert(parent);
    }

    fn unlink(&mut self, child: &ObjectId, parent: &(ObjectId, Slot)) {
        if let Some(refs) = self.inbound.get_mut(child) {
            refs.remove(parent);
            if refs.is_empty() {
                self.inbound.remove(child);
            }
        }
    }

    // =========================================================================
    // Objects
    // =========================================================================

    pub fn create(&mut self, obj: ObjectId, obj_type: ObjType) -> Result<()> {
        if self.objects.contains_key(&obj) {
            return Err(Error::DuplicateObject { obj });
        }
        let object = match obj_type {
            ObjType::Map => Object::Map(MapObject::default()),
            ObjType::List => Object::List(List::new()),
        };
        self.objects.insert(obj.clone(), object);
        self.created.push(obj);
        self.record(Undo::Created);
        return Ok(());
    }

    pub fn get(&self, obj: &ObjectId) -> Result<&Object> {
        return self
            .objects
            .get(obj)
            .ok_or_else(|| Error::ObjectNotFound { obj: obj.clone() });
    }

    fn get_mut(&mut self, obj: &ObjectId) -> Result<&mut Object> {
        return self
            .objects
            .get_mut(obj)
            .ok_or_else(|| Error::ObjectNotFound { obj: obj.clone() });
    }

    pub fn obj_type(&self, obj: &ObjectId) -> Result<ObjType> {
        return Ok(self.get(obj)?.obj_type());
    }

    /// The list with id `obj`, or a type error naming `action`.
    pub fn list(&self, obj: &ObjectId, action: &'static str) -> Result<&List> {
        match self.get(obj)? {
            Object::List(list) => return Ok(list),
            Object::Map(_) => {
                return Err(Error::TypeMismatch {
                    action,
                    obj: obj.clone(),
                    expected: ObjType::List,
                    actual: ObjType::Map,
                });
            }
        }
    }

    /// Splice a new, empty element into list `obj` after `origin`.
    pub fn insert_element(&mut self, obj: &ObjectId, origin: &ListKey, elem: ElemId) -> Result<()> {
        let list = match self.get_mut(obj)? {
            Object::List(list) => list,
            Object::Map(_) => {
                return Err(Error::TypeMismatch {
                    action: "ins",
                    obj: obj.clone(),
                    expected: ObjType::List,
                    actual: ObjType::Map,
                });
            }
        };
        list.insert_after(origin, elem.clone()).map_err(|err| match err {
            ListError::MissingOrigin(origin) => Error::ElementNotFound {
                obj: obj.clone(),
                elem: origin.to_string(),
            },
            ListError::Duplicate(elem) => Error::DuplicateElement {
                obj: obj.clone(),
                elem: elem.to_string(),
            },
        })?;
        self.record(Undo::Inserted { obj: obj.clone(), elem });
        return Ok(());
    }

    /// Tombstone list element `elem`: drop every value `writer` supersedes.
    ///
    /// The node stays in place as an anchor for later inserts. Values
    /// written concurrently with the deletion survive it.
    pub fn tombstone(&mut self, obj: &ObjectId, elem: &ElemId, writer: Writer<'_>) -> Result<()> {
        let slot = Slot::Elem(elem.clone());
        return self.update_register(obj, &slot, |register| register.clear(writer));
    }

    // =========================================================================
    // Registers
    // =========================================================================

    /// The register at `slot`, if it has been touched.
    pub fn register(&self, obj: &ObjectId, slot: &Slot) -> Option<&Register> {
        match (self.objects.get(obj)?, slot) {
            (Object::Map(map), Slot::Key(key)) => return map.keys.get(key),
            (Object::List(list), Slot::Elem(elem)) => return list.get(elem).map(|n| &n.register),
            _ => return None,
        }
    }

    /// Mutate the register at `slot`, keeping the inbound-link index current.
    ///
    /// Map registers are created empty on first touch. List elements must
    /// already exist.
    pub fn update_register<F>(&mut self, obj: &ObjectId, slot: &Slot, f: F) -> Result<()>
    where
        F: FnOnce(&mut Register),
    {
        let before = self.register(obj, slot).cloned();
        let register = match (self.get_mut(obj)?, slot) {
            (Object::Map(map), Slot::Key(key)) => map.keys.entry(key.clone()).or_default(),
            (Object::List(list), Slot::Elem(elem)) => {
                let node = list.get_mut(elem).ok_or_else(|| Error::ElementNotFound {
                    obj: obj.clone(),
                    elem: elem.to_string(),
                })?;
                &mut node.register
            }
            (object, _) => {
                let actual = object.obj_type();
                let expected = match actual {
                    ObjType::Map => ObjType::List,
                    ObjType::List => ObjType::Map,
                };
                return Err(Error::TypeMismatch {
                    action: "update",
                    obj: obj.clone(),
                    expected,
                    actual,
                });
            }
        };

        f(register);
        let after: Vec<ObjectId> = register.links().cloned().collect();
        let before_links: Vec<ObjectId> = before
            .iter()
            .flat_map(|register| register.links().cloned())
            .collect();
        self.record(Undo::Register {
            obj: obj.clone(),
            slot: slot.clone(),
            before,
        });

        let parent = (obj.clone(), slot.clone());
        for child in before_links.iter().filter(|child| !after.contains(child)) {
            self.unlink(child, &parent);
            self.record(Undo::Unlinked {
                child: child.clone(),
                parent: parent.clone(),
            });
        }
        for child in after.into_iter().filter(|child| !before_links.contains(child)) {
            self.link(child.clone(), parent.clone());
            self.record(Undo::Linked {
                child,
                parent: parent.clone(),
            });
        }
        return Ok(());
    }

    /// Slots currently linking to `obj`.
    pub fn inbound(&self, obj: &ObjectId) -> impl Iterator<Item = &(ObjectId, Slot)> {
        return self.inbound.get(obj).into_iter().flatten();
    }

    // =========================================================================
    // Paths
    // =========================================================================

    /// Path of keys and list indices from the root to `obj`, or `None` if
    /// the object is not reachable from the root.
    ///
    /// Searches breadth-first from `obj` up through its inbound links,
    /// visiting each ancestor once, so the shortest path wins. Among
    /// parents at the same depth, links where the object is the resolved
    /// value are tried before links held only as conflicts.
    pub fn path_of(&self, obj: &ObjectId) -> Option<Vec<PathElem>> {
        // For each ancestor found, the child it was reached from and the
        // step leading back down to that child.
        let mut toward: FxHashMap<ObjectId, (ObjectId, PathElem)> = FxHashMap::default();
        let mut seen = FxHashSet::default();
        let mut queue = VecDeque::new();
        seen.insert(obj.clone());
        queue.push_back(obj.clone());

        while let Some(current) = queue.pop_front() {
            if current.is_root() {
                return Some(unwind(&current, obj, &toward));
            }
            for (parent, step) in self.parents(&current) {
                if seen.insert(parent.clone()) {
                    toward.insert(parent.clone(), (current.clone(), step));
                    queue.push_back(parent.clone());
                }
            }
        }
        return None;
    }

    /// Parents of `obj` that can appear on a path, winner links first.
    fn parents(&self, obj: &ObjectId) -> Vec<(&ObjectId, PathElem)> {
        let mut candidates: Vec<&(ObjectId, Slot)> = self.inbound(obj).collect();
        candidates.sort_by_key(|(parent, slot)| {
            return !self
                .register(parent, slot)
                .is_some_and(|register| register.winner_links_to(obj));
        });

        let mut parents = Vec::with_capacity(candidates.len());
        for (parent, slot) in candidates {
            let step = match (self.objects.get(parent), slot) {
                (Some(Object::Map(_)), Slot::Key(key)) => PathElem::Key(key.clone()),
                (Some(Object::List(list)), Slot::Elem(elem)) => match list.visible_index(elem) {
                    Some(index) => PathElem::Index(index),
                    None => continue,
                },
                _ => continue,
            };
            parents.push((parent, step));
        }
        return parents;
    }
}

/// Steps from `root` down to `obj` along the links the search recorded.
fn unwind(root: &ObjectId, obj: &ObjectId, toward: &FxHashMap<ObjectId, (ObjectId, PathElem)>) -> Vec<PathElem> {
    let mut path = Vec::new();
    let mut current = root;
    while current != obj {
        let Some((child, step)) = toward.get(current) else {
            break;
        };
        path.push(step.clone());
        current = child;
    }
    return path;
}
