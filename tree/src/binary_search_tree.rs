//! A plain (unbalanced) binary search tree map.
//!
//! Offers the same conceptual interface as [`crate::llrb::Llrb`] (insert,
//! get, min, delete_min, len) but does no rebalancing, so sorted insertion
//! degenerates it into a linked list. It exists as the simple reference
//! implementation the balanced tree is measured against.

use core::fmt;
use std::borrow::Borrow;
use std::cmp::Ordering;

type Link<K, V> = Option<Box<Node<K, V>>>;

#[derive(Debug)]
struct Node<K, V> {
    key: K,
    value: V,
    // size = 1 + size(left) + size(right)
    size: usize,
    left: Link<K, V>,
    right: Link<K, V>,
}

impl<K, V> Node<K, V> {
    fn new(key: K, value: V) -> Self {
        Self {
            key,
            value,
            size: 1,
            left: None,
            right: None,
        }
    }

    fn update_size(&mut self) {
        self.size = 1 + size(self.left.as_deref()) + size(self.right.as_deref());
    }
}

#[inline]
fn size<K, V>(node: Option<&Node<K, V>>) -> usize {
    node.map_or(0, |node| node.size)
}

fn do_insert<K, V>(link: Link<K, V>, key: K, value: V) -> Box<Node<K, V>>
where
    K: Ord,
{
    let mut node = match link {
        Some(node) => node,
        None => return Box::new(Node::new(key, value)),
    };

    match key.cmp(&node.key) {
        Ordering::Greater => node.right = Some(do_insert(node.right.take(), key, value)),
        Ordering::Less => node.left = Some(do_insert(node.left.take(), key, value)),
        Ordering::Equal => node.value = value,
    }

    node.update_size();
    node
}

/// Splices out the leftmost node, promoting its right child into the empty
/// slot. Returns the new subtree root and the removed node.
fn do_delete_min<K, V>(mut node: Box<Node<K, V>>) -> (Link<K, V>, Box<Node<K, V>>) {
    match node.left.take() {
        Some(left) => {
            let (new_left, removed) = do_delete_min(left);
            node.left = new_left;
            node.update_size();
            (Some(node), removed)
        }
        None => {
            let right = node.right.take();
            (right, node)
        }
    }
}

/// An unbalanced binary search tree map.
pub struct BinarySearchTree<K, V> {
    root: Link<K, V>,
}

impl<K, V> BinarySearchTree<K, V> {
    pub fn new() -> Self {
        Self { root: None }
    }

    #[inline]
    pub fn len(&self) -> usize {
        size(self.root.as_deref())
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Inserts `key`/`value`; an already present key has its value replaced.
    pub fn insert(&mut self, key: K, value: V)
    where
        K: Ord,
    {
        self.root = Some(do_insert(self.root.take(), key, value));
    }

    pub fn get<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut node = self.root.as_deref();
        while let Some(n) = node {
            match key.cmp(n.key.borrow()) {
                Ordering::Less => node = n.left.as_deref(),
                Ordering::Equal => return Some((&n.key, &n.value)),
                Ordering::Greater => node = n.right.as_deref(),
            }
        }

        None
    }

    /// The smallest key and its value.
    pub fn min(&self) -> Option<(&K, &V)> {
        let mut node = self.root.as_deref()?;
        while let Some(left) = node.left.as_deref() {
            node = left;
        }

        Some((&node.key, &node.value))
    }

    /// Removes the entry with the smallest key and returns it, or `None` on
    /// an empty map.
    pub fn delete_min(&mut self) -> Option<(K, V)> {
        let root = self.root.take()?;
        let (new_root, removed) = do_delete_min(root);
        self.root = new_root;

        let removed = *removed;
        Some((removed.key, removed.value))
    }
}

impl<K, V> Default for BinarySearchTree<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> fmt::Debug for BinarySearchTree<K, V>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BinarySearchTree")
            .field("len", &self.len())
            .field("root", &self.root)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_get() {
        let mut tree = BinarySearchTree::new();
        assert_eq!(tree.get(&4), None);

        for it in [12, 5, 9, 2, 18, 15, 13, 17, 19] {
            tree.insert(it, it);
        }
        assert_eq!(tree.len(), 9);

        for it in [2, 5, 9, 18, 12, 15, 13, 17, 19] {
            assert_eq!(tree.get(&it), Some((&it, &it)));
        }
    }

    #[test]
    fn insert_same_key_replaces_value() {
        let mut tree = BinarySearchTree::new();
        tree.insert(5, "a");
        tree.insert(5, "b");

        assert_eq!(tree.len(), 1);
        assert_eq!(tree.get(&5), Some((&5, &"b")));
    }

    #[test]
    fn min_is_leftmost() {
        let mut tree = BinarySearchTree::new();
        for it in [12, 5, 9, 2, 18] {
            tree.insert(it, it);
        }
        assert_eq!(tree.min(), Some((&2, &2)));
    }

    #[test]
    fn delete_min_drains_in_order() {
        let mut tree = BinarySearchTree::new();
        for it in [5, 3, 8, 1, 4, 7, 9] {
            tree.insert(it, it);
        }

        let mut drained = Vec::new();
        let mut expected_len = tree.len();
        while let Some((k, _)) = tree.delete_min() {
            drained.push(k);
            expected_len -= 1;
            assert_eq!(tree.len(), expected_len);
        }

        assert_eq!(&drained, &[1, 3, 4, 5, 7, 8, 9]);
        assert!(tree.is_empty());
        assert_eq!(tree.delete_min(), None);
    }

    mod proptests {
        use std::collections::hash_map::RandomState;

        use proptest::prelude::*;
        use rand::seq::SliceRandom;
        use rand::thread_rng;

        use super::*;

        #[cfg(not(miri))]
        const MAP_SIZE: usize = 1000;
        #[cfg(miri)]
        const MAP_SIZE: usize = 50;

        #[cfg(not(miri))]
        const PROPTEST_CASES: u32 = 1000;
        #[cfg(miri)]
        const PROPTEST_CASES: u32 = 10;

        proptest!(
            #![proptest_config(ProptestConfig::with_cases(PROPTEST_CASES))]

            #[test]
            fn insert_get(
                mut inserts in proptest::collection::vec(0..10000i32, 0..MAP_SIZE),
                access in proptest::collection::vec(0..10000i32, 0..10)
            ) {
                let ref_hmap = std::collections::HashMap::<i32, i32, RandomState>::from_iter(inserts.iter().map(|v| (*v, *v)));
                let mut bst = BinarySearchTree::new();
                for v in &inserts {
                    bst.insert(*v, *v);
                }

                inserts.shuffle(&mut thread_rng());
                for key in inserts.iter().chain(access.iter()) {
                    prop_assert_eq!(ref_hmap.get_key_value(key), bst.get(key));
                }
            }

            #[test]
            fn delete_min_drains_ascending(
                inserts in proptest::collection::hash_set(0..10000i32, 0..MAP_SIZE),
            ) {
                let mut bst = BinarySearchTree::new();
                for v in &inserts {
                    bst.insert(*v, *v);
                }

                let mut expected: Vec<_> = inserts.into_iter().collect();
                expected.sort();

                let mut drained = Vec::with_capacity(bst.len());
                while let Some((k, _)) = bst.delete_min() {
                    drained.push(k);
                }

                prop_assert_eq!(&drained, &expected);
            }
        );
    }
}
