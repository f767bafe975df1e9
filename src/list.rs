// model = "claude-opus-4-5"
// created = "2026-10-16"
// modified = "2026-10-16"
// driver = "Isaac Clayton"

//! Replicated list structure.
//!
//! Elements form an insertion tree: each element hangs off the predecessor
//! named by its `ins` (or the head sentinel). Document order is the
//! pre-order walk of that tree, with siblings ordered by `ElemId`
//! descending, so the most recent insert after an element sits right next
//! to it. Because an element's parent and its rank among siblings are both
//! fixed at insertion, every replica builds the same order no matter how
//! concurrent inserts are interleaved.
//!
//! Nodes live in an arena and are never removed. Deleting an element only
//! empties its register (a tombstone); the node stays put so later inserts
//! can still anchor on it.
//!
//! Complexity:
//! - insert_after: O(n) scan from the predecessor
//! - visible_index: O(n) scan, recomputed on demand
//! - lookup by id: O(1)

use rustc_hash::FxHashMap;

use crate::id::ElemId;
use crate::id::ListKey;
use crate::register::Register;
use crate::register::Resolved;

/// One list element.
#[derive(Clone, Debug)]
pub struct Node {
    pub id: ElemId,
    /// The element this one was inserted after (`None` = head).
    pub origin: Option<ElemId>,
    /// Distance from the head sentinel in the insertion tree (head = 0).
    depth: u32,
    pub register: Register,
}

impl Node {
    /// True if the element currently holds a value.
    pub fn is_visible(&self) -> bool {
        return !self.register.is_empty();
    }
}

/// Error returned by list structure operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListError {
    /// The named predecessor is not in the list.
    MissingOrigin(ElemId),
    /// An element with this id was already inserted.
    Duplicate(ElemId),
}

/// A list object: an arena of nodes plus their document order.
#[derive(Clone, Debug, Default)]
pub struct List {
    /// Arena, in insertion order.
    nodes: Vec<Node>,
    /// Arena indices in document order.
    order: Vec<usize>,
    /// Element id to arena index.
    index: FxHashMap<ElemId, usize>,
}

impl List {
    pub fn new() -> List {
        return List {
            nodes: Vec::new(),
            order: Vec::new(),
            index: FxHashMap::default(),
        };
    }

    /// Total number of nodes, tombstones included.
    pub fn len(&self) -> usize {
        return self.nodes.len();
    }

    pub fn is_empty(&self) -> bool {
        return self.nodes.is_empty();
    }

    /// Number of visible elements.
    pub fn visible_len(&self) -> usize {
        return self.nodes.iter().filter(|node| node.is_visible()).count();
    }

    pub fn contains(&self, id: &ElemId) -> bool {
        return self.index.contains_key(id);
    }

    pub fn get(&self, id: &ElemId) -> Option<&Node> {
        return self.index.get(id).map(|&idx| &self.nodes[idx]);
    }

    pub fn get_mut(&mut self, id: &ElemId) -> Option<&mut Node> {
        return self.index.get(id).map(|&idx| &mut self.nodes[idx]);
    }

    /// Splice a new, empty element into document order after `origin`.
    pub fn insert_after(&mut self, origin: &ListKey, id: ElemId) -> Result<(), ListError> {
        if self.index.contains_key(&id) {
            return Err(ListError::Duplicate(id));
        }

        let (start, parent_depth, origin_id) = match origin {
            ListKey::Head => (0, 0, None),
            ListKey::Elem(origin_id) => {
                let origin_idx = *self
                    .index
                    .get(origin_id)
                    .ok_or_else(|| ListError::MissingOrigin(origin_id.clone()))?;
                let pos = self.position(origin_idx);
                (pos + 1, self.nodes[origin_idx].depth, Some(origin_id.clone()))
            }
        };

        // Walk the origin's subtree. Skip siblings that outrank the new
        // element along with everything beneath them; stop at the first
        // lower-ranked sibling or when the subtree ends.
        let mut pos = start;
        while pos < self.order.len() {
            let node = &self.nodes[self.order[pos]];
            if node.depth <= parent_depth {
                break;
            }
            if node.depth == parent_depth + 1 && node.id < id {
                break;
            }
            pos += 1;
        }

        let idx = self.nodes.len();
        self.nodes.push(Node {
            id: id.clone(),
            origin: origin_id,
            depth: parent_depth + 1,
            register: Register::new(),
        });
        self.index.insert(id, idx);
        self.order.insert(pos, idx);
        return Ok(());
    }

    /// Take back the most recent `insert_after`.
    ///
    /// Inserts must be undone newest first; anything else is ignored.
    pub fn undo_insert(&mut self, id: &ElemId) {
        let Some(&idx) = self.index.get(id) else {
            return;
        };
        if idx + 1 != self.nodes.len() {
            return;
        }
        let pos = self.position(idx);
        if pos < self.order.len() {
            self.order.remove(pos);
        }
        self.index.remove(id);
        self.nodes.pop();
    }

    /// Number of visible elements strictly before `id` in document order.
    pub fn visible_index(&self, id: &ElemId) -> Option<usize> {
        let target = *self.index.get(id)?;
        let mut count = 0;
        for &idx in &self.order {
            if idx == target {
                return Some(count);
            }
            if self.nodes[idx].is_visible() {
                count += 1;
            }
        }
        return None;
    }

    /// All nodes in document order, tombstones included.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        return self.order.iter().map(|&idx| &self.nodes[idx]);
    }

    /// Visible elements in document order with their resolved values.
    ///
    /// Lazy; call again to restart.
    pub fn live(&self) -> impl Iterator<Item = (&ElemId, Resolved<'_>)> {
        return self
            .nodes()
            .filter_map(|node| Some((&node.id, node.register.resolve()?)));
    }

    /// Position of an arena index in document order.
    fn position(&self, idx: usize) -> usize {
        // Every arena index is in `order`, so the scan always succeeds.
        return self
            .order
            .iter()
            .position(|&i| i == idx)
            .unwrap_or(self.order.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::Clock;
    use crate::id::ActorId;
    use crate::register::Writer;
    use crate::value::Payload;
    use crate::value::Value;

    fn elem(actor: &str, counter: u64) -> ElemId {
        return ElemId::new(ActorId::new(actor), counter);
    }

    fn after(actor: &str, counter: u64) -> ListKey {
        return ListKey::Elem(elem(actor, counter));
    }

    fn ids(list: &List) -> Vec<String> {
        return list.nodes().map(|n| n.id.to_string()).collect();
    }

    fn fill(list: &mut List, id: &ElemId, value: &str) {
        let actor = id.actor.clone();
        let past = Clock::new();
        list.get_mut(id)
            .unwrap()
            .register
            .assign(Writer::new(&actor, 1, &past), Payload::Scalar(Value::from(value)));
    }

    #[test]
    fn sequential_typing_appends() {
        let mut list = List::new();
        list.insert_after(&ListKey::Head, elem("a", 1)).unwrap();
        list.insert_after(&after("a", 1), elem("a", 2)).unwrap();
        list.insert_after(&after("a", 2), elem("a", 3)).unwrap();

        assert_eq!(ids(&list), vec!["a:1", "a:2", "a:3"]);
    }

    #[test]
    fn newer_insert_goes_next_to_origin() {
        let mut list = List::new();
        list.insert_after(&ListKey::Head, elem("a", 1)).unwrap();
        list.insert_after(&after("a", 1), elem("a", 2)).unwrap();
        list.insert_after(&after("a", 1), elem("a", 3)).unwrap();

        assert_eq!(ids(&list), vec!["a:1", "a:3", "a:2"]);
    }

    #[test]
    fn insert_skips_subtree_of_higher_sibling() {
        let mut list = List::new();
        list.insert_after(&ListKey::Head, elem("a", 1)).unwrap();
        list.insert_after(&after("a", 1), elem("a", 5)).unwrap();
        list.insert_after(&after("a", 5), elem("a", 6)).unwrap();
        // Ranks below a:5, so it lands after a:5's whole subtree.
        list.insert_after(&after("a", 1), elem("b", 2)).unwrap();

        assert_eq!(ids(&list), vec!["a:1", "a:5", "a:6", "b:2"]);
    }

    #[test]
    fn concurrent_inserts_converge() {
        let mut left = List::new();
        left.insert_after(&ListKey::Head, elem("alice", 1)).unwrap();
        left.insert_after(&ListKey::Head, elem("bob", 1)).unwrap();
        left.insert_after(&after("bob", 1), elem("bob", 2)).unwrap();

        let mut right = List::new();
        right.insert_after(&ListKey::Head, elem("bob", 1)).unwrap();
        right.insert_after(&after("bob", 1), elem("bob", 2)).unwrap();
        right.insert_after(&ListKey::Head, elem("alice", 1)).unwrap();

        assert_eq!(ids(&left), ids(&right));
        assert_eq!(ids(&left), vec!["bob:1", "bob:2", "alice:1"]);
    }

    #[test]
    fn missing_origin_is_an_error() {
        let mut list = List::new();
        let err = list.insert_after(&after("ghost", 9), elem("a", 1)).unwrap_err();
        assert_eq!(err, ListError::MissingOrigin(elem("ghost", 9)));
        assert!(list.is_empty());
    }

    #[test]
    fn duplicate_element_is_an_error() {
        let mut list = List::new();
        list.insert_after(&ListKey::Head, elem("a", 1)).unwrap();
        let err = list.insert_after(&ListKey::Head, elem("a", 1)).unwrap_err();
        assert_eq!(err, ListError::Duplicate(elem("a", 1)));
    }

    #[test]
    fn visible_index_skips_tombstones() {
        let mut list = List::new();
        list.insert_after(&ListKey::Head, elem("a", 1)).unwrap();
        list.insert_after(&after("a", 1), elem("a", 2)).unwrap();
        list.insert_after(&after("a", 2), elem("a", 3)).unwrap();
        fill(&mut list, &elem("a", 1), "chaffinch");
        fill(&mut list, &elem("a", 3), "greenfinch");

        // a:2 was never assigned, so it does not count.
        assert_eq!(list.visible_index(&elem("a", 1)), Some(0));
        assert_eq!(list.visible_index(&elem("a", 2)), Some(1));
        assert_eq!(list.visible_index(&elem("a", 3)), Some(1));
        assert_eq!(list.visible_index(&elem("z", 1)), None);
        assert_eq!(list.visible_len(), 2);
    }

    #[test]
    fn undo_insert_restores_order() {
        let mut list = List::new();
        list.insert_after(&ListKey::Head, elem("a", 1)).unwrap();
        list.insert_after(&after("a", 1), elem("a", 2)).unwrap();
        list.insert_after(&after("a", 1), elem("b", 3)).unwrap();
        assert_eq!(ids(&list), vec!["a:1", "b:3", "a:2"]);

        // Only the newest insert can be taken back.
        list.undo_insert(&elem("a", 2));
        assert_eq!(list.len(), 3);

        list.undo_insert(&elem("b", 3));
        assert_eq!(ids(&list), vec!["a:1", "a:2"]);
        assert!(!list.contains(&elem("b", 3)));

        // The id is free again.
        list.insert_after(&ListKey::Head, elem("b", 3)).unwrap();
        assert_eq!(ids(&list), vec!["b:3", "a:1", "a:2"]);
    }

    #[test]
    fn tombstoned_node_still_anchors_inserts() {
        let mut list = List::new();
        list.insert_after(&ListKey::Head, elem("a", 1)).unwrap();
        list.insert_after(&after("a", 1), elem("a", 2)).unwrap();
        // a:1 holds no value, but remains a valid origin.
        list.insert_after(&after("a", 1), elem("a", 3)).unwrap();
        fill(&mut list, &elem("a", 3), "greenfinch");
        fill(&mut list, &elem("a", 2), "goldfinch");

        let live: Vec<_> = list
            .live()
            .map(|(id, resolved)| (id.to_string(), resolved.winner.payload.clone()))
            .collect();
        assert_eq!(
            live,
            vec![
                ("a:3".to_string(), Payload::Scalar(Value::from("greenfinch"))),
                ("a:2".to_string(), Payload::Scalar(Value::from("goldfinch"))),
            ]
        );
        assert!(list.get(&elem("a", 1)).is_some_and(|node| !node.is_visible()));
        assert_eq!(list.get(&elem("a", 3)).unwrap().origin, Some(elem("a", 1)));
    }
}
