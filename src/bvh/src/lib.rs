//! Spatial index over axis-aligned view boxes.
//!
//! Backed by [`rstar::RTree`], which already gives expected O(log n)
//! insert/remove and sub-linear range queries over AABBs. This module
//! adds the `insert`/`delete`/`find` vocabulary and stable [`Handle`]s a
//! plain `RTree` does not provide on its own.

mod aabb;
mod handle;

pub use aabb::Aabb;
pub use handle::Handle;

use rstar::{RTree, RTreeObject, AABB as RStarAabb};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Predicate {
    TouchPoint([f64; 3]),
    TouchBox(Aabb),
}

impl Predicate {
    fn matches(&self, aabb: &Aabb) -> bool {
        match self {
            Predicate::TouchPoint(p) => aabb.contains_point(*p),
            Predicate::TouchBox(b) => aabb.intersects(b),
        }
    }

    fn envelope(&self) -> RStarAabb<[f64; 3]> {
        match self {
            Predicate::TouchPoint(p) => RStarAabb::from_point(*p),
            Predicate::TouchBox(b) => b.envelope(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Node {
    handle: Handle,
    aabb: Aabb,
}

impl RTreeObject for Node {
    type Envelope = RStarAabb<[f64; 3]>;

    fn envelope(&self) -> Self::Envelope {
        self.aabb.envelope()
    }
}

struct Slot<V> {
    generation: u32,
    payload: Option<(V, Aabb)>,
}

/// A spatial index keyed by stable handles, so a caller can re-insert a
/// moved box under a new handle before deleting the old one without
/// risking the tree going briefly empty (the re-positioning idiom this
/// tree is built to support).
pub struct Tree<V> {
    slots: Vec<Slot<V>>,
    free: Vec<u32>,
    rtree: RTree<Node>,
}

impl<V> Default for Tree<V> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            rtree: RTree::new(),
        }
    }
}

impl<V> Tree<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rtree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.rtree.size() == 0
    }

    pub fn insert(&mut self, aabb: Aabb, value: V) -> Handle {
        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    payload: None,
                });
                (self.slots.len() - 1) as u32
            }
        };

        let slot = &mut self.slots[index as usize];
        slot.payload = Some((value, aabb.clone()));
        let handle = Handle::new(index, slot.generation);

        self.rtree.insert(Node { handle, aabb });

        handle
    }

    /// Removes `handle`. Panics if the handle is stale or already
    /// removed — that indicates a broken invariant in the caller, not a
    /// recoverable condition.
    pub fn delete(&mut self, handle: Handle) {
        let slot = self
            .slots
            .get_mut(handle.index() as usize)
            .expect("delete of a handle from an unrelated tree");

        if slot.generation != handle.generation() {
            panic!("delete of a stale BVH handle");
        }

        let (_, aabb) = slot.payload.take().expect("double delete of a BVH handle");
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index());

        let removed = self.rtree.remove(&Node { handle, aabb });
        assert!(removed.is_some(), "handle present in slab but not in tree");
    }

    pub fn get(&self, handle: Handle) -> Option<&V> {
        self.slots
            .get(handle.index() as usize)
            .filter(|slot| slot.generation == handle.generation())
            .and_then(|slot| slot.payload.as_ref())
            .map(|(value, _)| value)
    }

    /// Visits every stored value whose box matches `predicate`, in
    /// unspecified order, until `visit` returns `false`.
    pub fn find(&self, predicate: Predicate, mut visit: impl FnMut(&V) -> bool) {
        let envelope = predicate.envelope();

        for node in self.rtree.locate_in_envelope_intersecting(&envelope) {
            if !predicate.matches(&node.aabb) {
                continue;
            }

            let value = self
                .get(node.handle)
                .expect("tree node referencing a removed slot");

            if !visit(value) {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    fn unit_box(center: [f64; 3]) -> Aabb {
        Aabb::new(
            [center[0] - 0.5, center[1] - 0.5, center[2] - 0.5],
            [center[0] + 0.5, center[1] + 0.5, center[2] + 0.5],
        )
    }

    #[test]
    fn insert_then_find_touch_point() {
        let mut tree = Tree::new();
        let h = tree.insert(unit_box([0.0, 0.0, 0.0]), "a");

        let mut hits = Vec::new();
        tree.find(Predicate::TouchPoint([0.1, 0.0, -0.2]), |v| {
            hits.push(*v);
            true
        });
        assert_eq!(hits, vec!["a"]);

        tree.delete(h);
        let mut hits = Vec::new();
        tree.find(Predicate::TouchPoint([0.1, 0.0, -0.2]), |v| {
            hits.push(*v);
            true
        });
        assert!(hits.is_empty());
    }

    #[test]
    fn reposition_insert_before_delete_keeps_tree_populated() {
        let mut tree = Tree::new();
        let old = tree.insert(unit_box([0.0, 0.0, 0.0]), 1);

        let new = tree.insert(unit_box([10.0, 0.0, 0.0]), 1);
        assert_eq!(tree.len(), 2);
        tree.delete(old);
        assert_eq!(tree.len(), 1);

        let mut hits = Vec::new();
        tree.find(Predicate::TouchPoint([10.0, 0.0, 0.0]), |v| {
            hits.push(*v);
            true
        });
        assert_eq!(hits, vec![1]);
        let _ = new;
    }

    #[test]
    #[should_panic(expected = "stale")]
    fn delete_with_stale_handle_panics() {
        let mut tree: Tree<i32> = Tree::new();
        let h = tree.insert(unit_box([0.0, 0.0, 0.0]), 1);
        tree.delete(h);
        tree.delete(h);
    }

    #[test]
    fn matches_linear_scan_over_random_boxes() {
        let mut rng = rand::thread_rng();
        let mut tree = Tree::new();
        let mut boxes = Vec::new();

        for i in 0..200 {
            let center = [
                rng.gen_range(-50.0..50.0),
                rng.gen_range(-50.0..50.0),
                rng.gen_range(-50.0..50.0),
            ];
            let aabb = unit_box(center);
            tree.insert(aabb.clone(), i);
            boxes.push((i, aabb));
        }

        for _ in 0..20 {
            let p = [
                rng.gen_range(-50.0..50.0),
                rng.gen_range(-50.0..50.0),
                rng.gen_range(-50.0..50.0),
            ];

            let mut expected: Vec<i32> = boxes
                .iter()
                .filter(|(_, b)| b.contains_point(p))
                .map(|(i, _)| *i)
                .collect();
            expected.sort_unstable();

            let mut actual = Vec::new();
            tree.find(Predicate::TouchPoint(p), |v| {
                actual.push(*v);
                true
            });
            actual.sort_unstable();

            assert_eq!(actual, expected);
        }
    }
}
