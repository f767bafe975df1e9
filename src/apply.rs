// model = "claude-opus-4-5"
// created = "2026-10-16"
// modified = "2026-10-16"
// driver = "Isaac Clayton"

//! Operation applier.
//!
//! Interprets one operation against the object store on behalf of the
//! change that carries it, and reports the observable effect as at most
//! one diff. Diffs come back without paths; the caller decides whether to
//! attach them.
//!
//! List elements become visible when they first hold a value, so `ins`
//! itself reports nothing: the `insert` diff is emitted by the first
//! assignment to the new element, and a `del` of an element that holds no
//! value reports nothing either.

use tracing::trace;

use crate::change::Op;
use crate::error::Error;
use crate::error::Result;
use crate::id::ElemId;
use crate::id::ListKey;
use crate::id::ObjectId;
use crate::patch::Diff;
use crate::register::Register;
use crate::register::Writer;
use crate::store::ObjType;
use crate::store::ObjectStore;
use crate::store::Slot;
use crate::value::Payload;

/// Apply one operation, returning the diff it produced, if any.
pub fn apply_op(store: &mut ObjectStore, writer: Writer<'_>, op: &Op) -> Result<Option<Diff>> {
    trace!(actor = %writer.actor, seq = writer.seq, action = op.action(), obj = %op.obj(), "applying op");

    match op {
        Op::MakeMap { obj } => {
            store.create(obj.clone(), ObjType::Map)?;
            return Ok(Some(Diff::create(obj, ObjType::Map)));
        }
        Op::MakeList { obj } => {
            store.create(obj.clone(), ObjType::List)?;
            return Ok(Some(Diff::create(obj, ObjType::List)));
        }
        Op::Set { obj, key, value } => {
            return assign(store, writer, obj, key, Payload::Scalar(value.clone()));
        }
        Op::Link { obj, key, value } => {
            if !store.contains(value) {
                return Err(Error::ObjectNotFound { obj: value.clone() });
            }
            return assign(store, writer, obj, key, Payload::Link(value.clone()));
        }
        Op::Del { obj, key } => {
            return delete(store, writer, obj, key);
        }
        Op::Ins { obj, key, elem } => {
            insert(store, writer, obj, key, *elem)?;
            return Ok(None);
        }
    }
}

fn parse_elem(key: &str) -> Result<ElemId> {
    return key.parse().map_err(|_| Error::InvalidElemId { key: key.to_string() });
}

fn element_not_found(obj: &ObjectId, elem: &ElemId) -> Error {
    return Error::ElementNotFound {
        obj: obj.clone(),
        elem: elem.to_string(),
    };
}

/// Shared by `set` and `link`.
fn assign(
    store: &mut ObjectStore,
    writer: Writer<'_>,
    obj: &ObjectId,
    key: &str,
    payload: Payload,
) -> Result<Option<Diff>> {
    match store.obj_type(obj)? {
        ObjType::Map => {
            let slot = Slot::Key(key.to_string());
            store.update_register(obj, &slot, |register| register.assign(writer, payload))?;
            let diff = store
                .register(obj, &slot)
                .and_then(Register::resolve)
                .map(|resolved| Diff::set_key(obj, key, resolved));
            return Ok(diff);
        }
        ObjType::List => {
            let elem = parse_elem(key)?;
            let was_visible = store
                .list(obj, "set")?
                .get(&elem)
                .ok_or_else(|| element_not_found(obj, &elem))?
                .is_visible();

            let slot = Slot::Elem(elem.clone());
            store.update_register(obj, &slot, |register| register.assign(writer, payload))?;

            let list = store.list(obj, "set")?;
            let index = list
                .visible_index(&elem)
                .ok_or_else(|| element_not_found(obj, &elem))?;
            let resolved = list.get(&elem).and_then(|node| node.register.resolve());
            let diff = resolved.map(|resolved| {
                if was_visible {
                    return Diff::set_index(obj, index, resolved);
                }
                return Diff::insert(obj, index, &elem, resolved);
            });
            return Ok(diff);
        }
    }
}

fn delete(store: &mut ObjectStore, writer: Writer<'_>, obj: &ObjectId, key: &str) -> Result<Option<Diff>> {
    match store.obj_type(obj)? {
        ObjType::Map => {
            let slot = Slot::Key(key.to_string());
            store.update_register(obj, &slot, |register| register.clear(writer))?;
            // Values written concurrently with the deletion survive it.
            let diff = match store.register(obj, &slot).and_then(Register::resolve) {
                Some(resolved) => Diff::set_key(obj, key, resolved),
                None => Diff::remove_key(obj, key),
            };
            return Ok(Some(diff));
        }
        ObjType::List => {
            let elem = parse_elem(key)?;
            let list = store.list(obj, "del")?;
            let node = list.get(&elem).ok_or_else(|| element_not_found(obj, &elem))?;
            if !node.is_visible() {
                return Ok(None);
            }
            // Index is taken before the element disappears.
            let index = list
                .visible_index(&elem)
                .ok_or_else(|| element_not_found(obj, &elem))?;

            store.tombstone(obj, &elem, writer)?;

            let slot = Slot::Elem(elem);
            let diff = match store.register(obj, &slot).and_then(Register::resolve) {
                Some(resolved) => Diff::set_index(obj, index, resolved),
                None => Diff::remove_index(obj, index),
            };
            return Ok(Some(diff));
        }
    }
}

fn insert(store: &mut ObjectStore, writer: Writer<'_>, obj: &ObjectId, key: &str, counter: u64) -> Result<()> {
    let origin: ListKey = key.parse().map_err(|_| Error::InvalidElemId { key: key.to_string() })?;
    let elem = ElemId::new(writer.actor.clone(), counter);
    return store.insert_element(obj, &origin, elem);
}
