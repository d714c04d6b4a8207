//! An ordered map on a left-leaning red-black tree.
//!
//! A left-leaning red-black tree is a binary encoding of a 2-3-4 tree: a RED
//! edge marks two binary nodes that belong to the same multiway node, and RED
//! edges are only ever allowed to lean left. This cuts the insertion fix-up
//! down to three local cases and lets deletion reason about 2-nodes, 3-nodes
//! and 4-nodes directly.

use core::fmt;
use std::borrow::Borrow;
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    Red,
    Black,
}

impl Color {
    /// Returns `true` if the color is [`Red`].
    ///
    /// [`Red`]: Color::Red
    #[must_use]
    fn is_red(&self) -> bool {
        matches!(self, Self::Red)
    }

    /// Returns `true` if the color is [`Black`].
    ///
    /// [`Black`]: Color::Black
    #[must_use]
    fn is_black(&self) -> bool {
        matches!(self, Self::Black)
    }
}

type Link<K, V> = Option<Box<Node<K, V>>>;

#[derive(Debug)]
struct Node<K, V> {
    key: K,
    value: V,
    // Color of the edge connecting this node to its parent.
    color: Color,
    // Number of nodes in the subtree rooted here,
    // size = 1 + size(left) + size(right)
    size: usize,
    left: Link<K, V>,
    right: Link<K, V>,
}

impl<K, V> Node<K, V> {
    fn new(key: K, value: V) -> Self {
        // New nodes always join an existing 2-node or 3-node, so the fresh
        // edge is red; the caller's fix-up decides what to do with it.
        Self {
            key,
            value,
            color: Color::Red,
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

/// Is the edge leading to `node` red? An empty link is never red.
#[inline]
fn is_red<K, V>(node: Option<&Node<K, V>>) -> bool {
    node.map_or(false, |node| node.color.is_red())
}

/// Is the edge leading to `node` black? An empty link counts as black.
#[inline]
fn is_black<K, V>(node: Option<&Node<K, V>>) -> bool {
    !is_red(node)
}

// 2-3-4 classification. Read through the red edges, a binary node is one key
// of a multiway node:
//  * 2-node: one key, both child edges black
//  * 3-node: two keys, the red-linked left child holds the smaller one
//  * 4-node: three keys, both child edges red; only exists transiently and is
//    resolved by a color flip right after it forms
// An empty link is none of the three.

fn is_two_node<K, V>(node: Option<&Node<K, V>>) -> bool {
    node.map_or(false, |node| {
        !is_red(node.left.as_deref()) && !is_red(node.right.as_deref())
    })
}

fn is_three_node<K, V>(node: Option<&Node<K, V>>) -> bool {
    node.map_or(false, |node| {
        is_red(node.left.as_deref()) && !is_red(node.right.as_deref())
    })
}

fn is_four_node<K, V>(node: Option<&Node<K, V>>) -> bool {
    node.map_or(false, |node| {
        is_red(node.left.as_deref()) && is_red(node.right.as_deref())
    })
}

fn rotate_left<K, V>(mut node: Box<Node<K, V>>) -> Box<Node<K, V>> {
    //   node                 right
    //   /  \                 /   \
    //  a   right   -->    node    c
    //      /  \           /  \
    //     b    c         a    b
    // right inherits node's old color, node's edge turns red
    let mut right = node
        .right
        .take()
        .expect("rotate_left requires a right child");
    node.right = right.left.take();
    right.color = node.color;
    node.color = Color::Red;
    right.size = node.size;
    node.update_size();
    right.left = Some(node);
    right
}

fn rotate_right<K, V>(mut node: Box<Node<K, V>>) -> Box<Node<K, V>> {
    //      node            left
    //      /  \            /   \
    //   left   c   -->    a    node
    //   /  \                   /  \
    //  a    b                 b    c
    // left inherits node's old color, node's edge turns red
    let mut left = node.left.take().expect("rotate_right requires a left child");
    node.left = left.right.take();
    left.color = node.color;
    node.color = Color::Red;
    left.size = node.size;
    node.update_size();
    left.right = Some(node);
    left
}

/// Resolve a transient 4-node: the node moves up into its parent's multiway
/// node (edge turns red) and its two children become separate 2-nodes.
fn flip_color<K, V>(node: &mut Node<K, V>) {
    node.color = Color::Red;
    if let Some(left) = node.left.as_mut() {
        left.color = Color::Black;
    }
    if let Some(right) = node.right.as_mut() {
        right.color = Color::Black;
    }
}

/// Merge a 2-node with its two 2-node children into one 4-node by reddening
/// both child edges. Pure recoloring, no rotation.
fn merge_two_nodes<K, V>(node: &mut Node<K, V>) {
    if is_black(node.left.as_deref()) && is_black(node.right.as_deref()) {
        if let Some(left) = node.left.as_mut() {
            left.color = Color::Red;
        }
        if let Some(right) = node.right.as_mut() {
            right.color = Color::Red;
        }
    }
}

/// Lend the smallest key of the right 3-node sibling to the left side:
/// b(a, cd) => c(ab, d). Keeps the black height of every path unchanged.
///
/// Panics when the right child is not a 3-node; a caller that gets here has
/// already corrupted the tree.
fn move_sibling_from_right<K, V>(mut node: Box<Node<K, V>>) -> Box<Node<K, V>> {
    let lendable = node.left.is_some()
        && node
            .right
            .as_deref()
            .map_or(false, |right| is_red(right.left.as_deref()));
    assert!(
        lendable,
        "move_sibling_from_right: right child has no key to lend"
    );

    node.left
        .as_mut()
        .expect("checked above")
        .color = Color::Red;
    let right = node.right.take().expect("checked above");
    node.right = Some(rotate_right(right));

    let original_color = node.color;
    let mut new_root = rotate_left(node);
    new_root
        .left
        .as_mut()
        .expect("rotate_left keeps the old root as left child")
        .color = Color::Black;
    new_root
        .right
        .as_mut()
        .expect("the lending sibling keeps its larger key")
        .color = Color::Black;
    new_root.color = original_color;
    new_root
}

/// Mirror of [`move_sibling_from_right`]: lend the largest key of the left
/// 3-node sibling to the right side, c(ab, d) => b(a, cd).
fn move_sibling_from_left<K, V>(node: Box<Node<K, V>>) -> Box<Node<K, V>> {
    let lendable = node.right.is_some()
        && node
            .left
            .as_deref()
            .map_or(false, |left| is_red(left.left.as_deref()));
    assert!(
        lendable,
        "move_sibling_from_left: left child has no key to lend"
    );

    // rotate_right hands node's color to the promoted left child
    let mut new_root = rotate_right(node);
    new_root
        .left
        .as_mut()
        .expect("the lending sibling keeps its smaller key")
        .color = Color::Black;
    new_root
        .right
        .as_mut()
        .expect("rotate_right keeps the old root as right child")
        .color = Color::Black;
    let right = new_root.right.take().expect("set above");
    new_root.right = Some(rotate_left(right));
    new_root
}

/// The three fix-up checks shared by insertion and the delete-min unwind,
/// in fixed order:
///  (a) red left child with a red left grandchild => rotate right
///  (b) black left child with a red right child   => rotate left
///  (c) both children red                         => flip colors
fn fix_up<K, V>(mut node: Box<Node<K, V>>) -> Box<Node<K, V>> {
    let left_left_red = node
        .left
        .as_deref()
        .map_or(false, |left| is_red(left.left.as_deref()));
    if is_red(node.left.as_deref()) && left_left_red {
        node = rotate_right(node);
    }

    if !is_red(node.left.as_deref()) && is_red(node.right.as_deref()) {
        node = rotate_left(node);
    }

    if is_red(node.left.as_deref()) && is_red(node.right.as_deref()) {
        flip_color(&mut node);
    }

    node.update_size();
    node
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
        // Same key: replace the value in place, the shape doesn't change
        Ordering::Equal => node.value = value,
    }

    fix_up(node)
}

/// Root phase of delete-min.
///
/// Splicing a node out at the bottom removes a black edge from one path
/// unless the spliced node sits inside a 3-node or 4-node. So on the way
/// down every 2-node about to be entered is first widened by merging it with
/// its sibling or borrowing a key from a 3-node sibling. The root has no
/// sibling to borrow from, hence this separate preprocessing step.
fn do_delete_min<K, V>(mut root: Box<Node<K, V>>) -> (Link<K, V>, Box<Node<K, V>>) {
    if is_two_node(Some(&root)) {
        if is_two_node(root.left.as_deref()) {
            if is_two_node(root.right.as_deref()) {
                // three adjacent 2-nodes collapse into one 4-node
                merge_two_nodes(&mut root);
                let (root, removed) = do_delete_min_recursive(root);
                (Some(root), removed)
            } else if is_three_node(root.right.as_deref()) {
                let mut root = move_sibling_from_right(root);
                let left = root.left.take().expect("borrow leaves a left 3-node");
                let (new_left, removed) = do_delete_min_recursive(left);
                root.left = Some(new_left);
                root.update_size();
                (Some(root), removed)
            } else {
                // a stable tree holds no 4-nodes; right can only be 2 or 3
                unreachable!("delete_min: right child of the root is neither a 2-node nor a 3-node")
            }
        } else if is_three_node(root.left.as_deref()) {
            let left = root.left.take().expect("classified as a 3-node");
            let (new_left, removed) = do_delete_min_recursive(left);
            root.left = Some(new_left);
            root.update_size();
            (Some(root), removed)
        } else {
            // No left child. By black-balance there is no right child either:
            // the root is the whole tree and also the minimum.
            (None, root)
        }
    } else if is_three_node(Some(&root)) {
        let (root, removed) = do_delete_min_recursive(root);
        (Some(root), removed)
    } else {
        unreachable!("delete_min: root is neither a 2-node nor a 3-node")
    }
}

/// Recursive phase of delete-min. `root` is always a 3-node or 4-node, so its
/// left child exists and the minimum can be spliced out of it without
/// breaking black-balance.
fn do_delete_min_recursive<K, V>(mut root: Box<Node<K, V>>) -> (Box<Node<K, V>>, Box<Node<K, V>>) {
    let root_is_three = is_three_node(Some(&root));
    let root_is_four = is_four_node(Some(&root));
    assert!(
        root_is_three || root_is_four,
        "delete_min descended into a lone 2-node"
    );

    let (ll_is_two, ll_is_wide, lr_is_two, lr_is_three) = {
        let left = root
            .left
            .as_deref()
            .expect("a 3-node or 4-node has a left child");
        (
            is_two_node(left.left.as_deref()),
            is_three_node(left.left.as_deref()) || is_four_node(left.left.as_deref()),
            is_two_node(left.right.as_deref()),
            is_three_node(left.right.as_deref()),
        )
    };

    let removed;
    if ll_is_two {
        if lr_is_two {
            {
                let left = root.left.as_mut().expect("checked above");
                merge_two_nodes(left);
                // The parent lends a key down: blackening the merged child
                // pays for the two grandchild edges that just turned red, so
                // every path keeps its black count.
                left.color = Color::Black;
            }
            let left = root.left.take().expect("checked above");
            let (new_left, min) = do_delete_min_recursive(left);
            root.left = Some(new_left);
            removed = min;
        } else if lr_is_three {
            let left = root.left.take().expect("checked above");
            let mut new_left = move_sibling_from_right(left);
            let left_left = new_left.left.take().expect("borrow leaves a left 3-node");
            let (new_ll, min) = do_delete_min_recursive(left_left);
            new_left.left = Some(new_ll);
            new_left.update_size();
            root.left = Some(new_left);
            removed = min;
        } else {
            unreachable!("delete_min: left grandchild pair is neither 2-2 nor 2-3")
        }
    } else if ll_is_wide {
        // the next level is already a 3-node or 4-node, descend directly
        let left = root.left.as_mut().expect("checked above");
        let left_left = left.left.take().expect("classified as non-empty");
        let (new_ll, min) = do_delete_min_recursive(left_left);
        left.left = Some(new_ll);
        left.update_size();
        removed = min;
    } else {
        // Bottom of the tree: the red left child is the minimum.
        let min = root.left.take().expect("a 3-node or 4-node has a left child");
        debug_assert!(min.left.is_none() && min.right.is_none());
        if root_is_three {
            root.update_size();
            return (root, min);
        }
        // A 4-node still carries its red right child; rotating left restores
        // the left-leaning shape.
        let mut new_root = rotate_left(root);
        new_root.update_size();
        return (new_root, min);
    }

    (fix_up(root), removed)
}

/// An ordered map backed by a left-leaning red-black tree.
///
/// The tree owns its nodes outright, every parent slot exclusively owns its
/// child subtree. Rotations move subtrees between slots behind `&mut self`,
/// so no caller can ever observe (or hold on to) a pre-rotation root.
pub struct Llrb<K, V> {
    root: Link<K, V>,
}

impl<K, V> Llrb<K, V> {
    pub fn new() -> Self {
        Self { root: None }
    }

    /// Number of distinct keys in the map. Reads the root's cached subtree
    /// size, O(1).
    #[inline]
    pub fn len(&self) -> usize {
        size(self.root.as_deref())
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Inserts `key`/`value`; an already present key has its value replaced
    /// in place without changing the tree shape.
    pub fn insert(&mut self, key: K, value: V)
    where
        K: Ord,
    {
        let mut root = do_insert(self.root.take(), key, value);
        // the root's incoming edge is black by convention
        root.color = Color::Black;
        self.root = Some(root);
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

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<(&K, &mut V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut node = self.root.as_deref_mut();
        while let Some(n) = node {
            match key.cmp(n.key.borrow()) {
                Ordering::Less => node = n.left.as_deref_mut(),
                Ordering::Equal => return Some((&n.key, &mut n.value)),
                Ordering::Greater => node = n.right.as_deref_mut(),
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
    ///
    /// The pass down the tree proactively widens every 2-node it is about to
    /// enter (merge with a 2-node sibling, or borrow from a 3-node sibling),
    /// so the node spliced out at the bottom never carries a black-balance
    /// obligation on its own.
    pub fn delete_min(&mut self) -> Option<(K, V)> {
        let root = self.root.take()?;
        let (new_root, removed) = do_delete_min(root);
        self.root = new_root;
        if let Some(root) = self.root.as_mut() {
            // keep the black-root convention symmetric with insert
            root.color = Color::Black;
        }

        let removed = *removed;
        Some((removed.key, removed.value))
    }

    /// Checks the red-black tree definition:
    ///
    ///  (1) red edges always lean left;
    ///  (2) no node carries two red edges;
    ///  (3) every path from the root to an empty link crosses the same
    ///      number of black edges.
    ///
    /// Read-only diagnostic for tests, O(n).
    pub fn check_invariants(&self) -> bool {
        Self::check_left_leaning(self.root.as_deref())
            && Self::check_no_double_red(self.root.as_deref())
            && Self::check_black_balance(self.root.as_deref())
    }

    fn check_left_leaning(node: Option<&Node<K, V>>) -> bool {
        match node {
            Some(node) => {
                !is_red(node.right.as_deref())
                    && Self::check_left_leaning(node.left.as_deref())
                    && Self::check_left_leaning(node.right.as_deref())
            }
            None => true,
        }
    }

    fn check_no_double_red(node: Option<&Node<K, V>>) -> bool {
        match node {
            Some(node) => {
                !(is_red(node.left.as_deref()) && is_red(node.right.as_deref()))
                    && Self::check_no_double_red(node.left.as_deref())
                    && Self::check_no_double_red(node.right.as_deref())
            }
            None => true,
        }
    }

    fn check_black_balance(root: Option<&Node<K, V>>) -> bool {
        let mut black_counts = Vec::new();
        Self::collect_path_black_counts(root, 0, &mut black_counts);
        black_counts.iter().min() == black_counts.iter().max()
    }

    /// Walks every root-to-nil path and records how many black edges it
    /// crossed. An edge to an empty link counts as black.
    fn collect_path_black_counts(
        node: Option<&Node<K, V>>,
        black_edges: usize,
        black_counts: &mut Vec<usize>,
    ) {
        match node {
            Some(node) => {
                let left_count = if is_red(node.left.as_deref()) {
                    black_edges
                } else {
                    black_edges + 1
                };
                Self::collect_path_black_counts(node.left.as_deref(), left_count, black_counts);

                let right_count = if is_red(node.right.as_deref()) {
                    black_edges
                } else {
                    black_edges + 1
                };
                Self::collect_path_black_counts(node.right.as_deref(), right_count, black_counts);
            }
            None => black_counts.push(black_edges),
        }
    }
}

impl<K, V> Default for Llrb<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> fmt::Debug for Llrb<K, V>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Llrb")
            .field("len", &self.len())
            .field("root", &self.root)
            .finish()
    }
}
