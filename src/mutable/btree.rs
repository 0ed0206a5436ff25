//! Mutable in-memory B-tree for ordered key storage.
//!
//! This module provides [`BTree`], a balanced ordered set of keys with a
//! pluggable [`Comparator`] and a configurable branching factor `M`
//! (8 by default).
//!
//! # Overview
//!
//! Each node stores up to `M - 1` keys and `M` children inline, in
//! fixed-capacity arrays, so visiting a node costs no extra indirection.
//! Both insertion and deletion work top-down in a single pass:
//!
//! - Insertion splits every full node on the way down (starting with a full
//!   root), so the final leaf always has room for the new key.
//! - Deletion tops up every minimal node on the way down by borrowing from a
//!   sibling or merging with it, so the final removal never underflows.
//!
//! | Operation            | Complexity |
//! |----------------------|------------|
//! | `contains` / `get`   | O(log N)   |
//! | `insert`             | O(log N)   |
//! | `remove`             | O(log N)   |
//! | `first` / `last`     | O(log N)   |
//! | `pop_first` / `pop_last` | O(log N) |
//! | `len`                | O(1)       |
//! | `iter`               | O(1) to create, O(N) to iterate |
//!
//! # Concurrency
//!
//! A `BTree` is a single-owner structure and performs no synchronization.
//! Share it between threads behind a lock.
//!
//! # Examples
//!
//! ```rust
//! use canopy::mutable::BTree;
//!
//! let mut tree = BTree::new();
//! for key in [5, 3, 8, 1, 9, 2, 7, 4, 6, 0] {
//!     assert!(tree.insert(key));
//! }
//!
//! // Duplicates are rejected
//! assert!(!tree.insert(5));
//! assert_eq!(tree.len(), 10);
//!
//! // In-order walk yields sorted keys
//! let keys: Vec<i32> = tree.iter().copied().collect();
//! assert_eq!(keys, (0..10).collect::<Vec<_>>());
//!
//! assert_eq!(tree.remove(&3), Some(3));
//! assert!(!tree.contains(&3));
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::iter::FusedIterator;

use arrayvec::ArrayVec;
use smallvec::SmallVec;

use super::comparator::{Comparator, NaturalOrder};

// =============================================================================
// Constants
// =============================================================================

/// Default branching factor: every node holds at most 8 children.
pub const DEFAULT_ORDER: usize = 8;

/// Iterator stack entries kept inline; a tree this tall holds billions of keys.
const INLINE_STACK_DEPTH: usize = 16;

// =============================================================================
// Node Definition
// =============================================================================

/// Outcome of a binary search within one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SearchResult {
    /// The key is stored at this index.
    Found(usize),
    /// The key is absent; this is the index it would be inserted at, which
    /// is also the child to descend into.
    NotFound(usize),
}

/// A B-tree node.
///
/// `keys` never holds more than `M - 1` entries. A leaf has no children; an
/// internal node has exactly `keys.len() + 1`.
#[derive(Clone)]
struct Node<K, const M: usize> {
    keys: ArrayVec<K, M>,
    children: ArrayVec<Box<Self>, M>,
}

impl<K, const M: usize> Node<K, M> {
    /// Minimum degree.
    const T: usize = M / 2;
    const MAX_KEY_NUMBER: usize = M - 1;
    const MIN_KEY_NUMBER: usize = M / 2 - 1;

    const fn new() -> Self {
        Self {
            keys: ArrayVec::new_const(),
            children: ArrayVec::new_const(),
        }
    }

    #[inline]
    fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    #[inline]
    fn is_full(&self) -> bool {
        self.keys.len() == Self::MAX_KEY_NUMBER
    }

    /// Returns `true` if the node can give up a key and stay valid.
    #[inline]
    fn can_lend(&self) -> bool {
        self.keys.len() > Self::MIN_KEY_NUMBER
    }

    fn binary_search<C: Comparator<K>>(&self, key: &K, comparator: &C) -> SearchResult {
        let mut low = 0;
        let mut high = self.keys.len();

        while low < high {
            let middle = low + (high - low) / 2;
            match comparator.compare(&self.keys[middle], key) {
                Ordering::Less => low = middle + 1,
                Ordering::Greater => high = middle,
                Ordering::Equal => return SearchResult::Found(middle),
            }
        }

        SearchResult::NotFound(low)
    }

    fn for_each_key<F: FnMut(&K)>(&self, action: &mut F) {
        if self.is_leaf() {
            for key in &self.keys {
                action(key);
            }
            return;
        }

        self.children[0].for_each_key(action);
        for (key, child) in self.keys.iter().zip(self.children.iter().skip(1)) {
            action(key);
            child.for_each_key(action);
        }
    }

    /// Moves every key of this subtree into `output`, in order.
    fn drain_into(self, output: &mut Vec<K>) {
        let mut children = self.children.into_iter();
        for key in self.keys {
            if let Some(child) = children.next() {
                (*child).drain_into(output);
            }
            output.push(key);
        }
        if let Some(child) = children.next() {
            (*child).drain_into(output);
        }
    }

    // -------------------------------------------------------------------------
    // Insertion
    // -------------------------------------------------------------------------

    /// Splits the full child at `index`.
    ///
    /// The upper `MIN_KEY_NUMBER` keys and upper `T` children move into a new
    /// right sibling, and the median key moves up into this node.
    fn split_child(&mut self, index: usize) {
        let (median, sibling) = {
            let child = &mut self.children[index];
            debug_assert!(child.is_full());

            let mut sibling = Self::new();
            sibling.keys.extend(child.keys.drain(Self::T..));
            if !child.is_leaf() {
                sibling.children.extend(child.children.drain(Self::T..));
            }
            let Some(median) = child.keys.pop() else {
                return;
            };
            (median, sibling)
        };

        self.keys.insert(index, median);
        self.children.insert(index + 1, Box::new(sibling));
    }

    /// Inserts `key` into the subtree rooted at this non-full node.
    ///
    /// Returns `false` if an equal key is already present.
    fn insert_non_full<C: Comparator<K>>(&mut self, key: K, comparator: &C) -> bool {
        let mut index = match self.binary_search(&key, comparator) {
            SearchResult::Found(_) => return false,
            SearchResult::NotFound(index) => index,
        };

        if self.is_leaf() {
            self.keys.insert(index, key);
            return true;
        }

        if self.children[index].is_full() {
            self.split_child(index);
            match comparator.compare(&key, &self.keys[index]) {
                Ordering::Less => {}
                Ordering::Equal => return false,
                Ordering::Greater => index += 1,
            }
        }

        self.children[index].insert_non_full(key, comparator)
    }

    // -------------------------------------------------------------------------
    // Deletion
    // -------------------------------------------------------------------------

    /// Removes `key` from the subtree rooted at this node.
    ///
    /// The node must be the root or hold more than `MIN_KEY_NUMBER` keys.
    fn remove<C: Comparator<K>>(&mut self, key: &K, comparator: &C) -> Option<K> {
        match self.binary_search(key, comparator) {
            SearchResult::Found(index) if self.is_leaf() => Some(self.keys.remove(index)),
            SearchResult::Found(index) => {
                if self.children[index].can_lend() {
                    let predecessor = self.children[index].delete_predecessor()?;
                    return Some(std::mem::replace(&mut self.keys[index], predecessor));
                }
                if self.children[index + 1].can_lend() {
                    let successor = self.children[index + 1].delete_successor()?;
                    return Some(std::mem::replace(&mut self.keys[index], successor));
                }
                self.merge_children(index);
                self.children[index].remove(key, comparator)
            }
            SearchResult::NotFound(_) if self.is_leaf() => None,
            SearchResult::NotFound(index) => {
                let index = self.fill_child(index);
                self.children[index].remove(key, comparator)
            }
        }
    }

    /// Removes and returns the greatest key of this subtree.
    fn delete_predecessor(&mut self) -> Option<K> {
        if self.is_leaf() {
            return self.keys.pop();
        }
        let index = self.fill_child(self.children.len() - 1);
        self.children[index].delete_predecessor()
    }

    /// Removes and returns the least key of this subtree.
    fn delete_successor(&mut self) -> Option<K> {
        if self.is_leaf() {
            return self.keys.pop_at(0);
        }
        let index = self.fill_child(0);
        self.children[index].delete_successor()
    }

    /// Makes sure the child at `index` can lend a key before descending.
    ///
    /// Returns the index of the child to descend into, which moves one to
    /// the left when the child is merged into its left sibling.
    fn fill_child(&mut self, index: usize) -> usize {
        if self.children[index].can_lend() {
            return index;
        }
        if index > 0 && self.children[index - 1].can_lend() {
            self.borrow_from_left(index);
            return index;
        }
        let has_right = index + 1 < self.children.len();
        if has_right && self.children[index + 1].can_lend() {
            self.borrow_from_right(index);
            return index;
        }
        if has_right {
            self.merge_children(index);
            index
        } else {
            self.merge_children(index - 1);
            index - 1
        }
    }

    /// Rotates the last key of the left sibling through the separator into
    /// the front of the child at `index`.
    fn borrow_from_left(&mut self, index: usize) {
        let (left_part, right_part) = self.children.split_at_mut(index);
        let left = &mut left_part[index - 1];
        let child = &mut right_part[0];

        let Some(borrowed) = left.keys.pop() else {
            return;
        };
        let separator = std::mem::replace(&mut self.keys[index - 1], borrowed);
        child.keys.insert(0, separator);
        if let Some(grandchild) = left.children.pop() {
            child.children.insert(0, grandchild);
        }
    }

    /// Rotates the first key of the right sibling through the separator onto
    /// the end of the child at `index`.
    fn borrow_from_right(&mut self, index: usize) {
        let (left_part, right_part) = self.children.split_at_mut(index + 1);
        let child = &mut left_part[index];
        let right = &mut right_part[0];

        let Some(borrowed) = right.keys.pop_at(0) else {
            return;
        };
        let separator = std::mem::replace(&mut self.keys[index], borrowed);
        child.keys.push(separator);
        if let Some(grandchild) = right.children.pop_at(0) {
            child.children.push(grandchild);
        }
    }

    /// Merges the child at `index + 1` and the separator between them into
    /// the child at `index`.
    fn merge_children(&mut self, index: usize) {
        let separator = self.keys.remove(index);
        let right = *self.children.remove(index + 1);
        let left = &mut self.children[index];

        debug_assert!(left.keys.len() + right.keys.len() < Self::MAX_KEY_NUMBER);
        left.keys.push(separator);
        left.keys.extend(right.keys);
        left.children.extend(right.children);
    }

    // -------------------------------------------------------------------------
    // Validation
    // -------------------------------------------------------------------------

    /// Checks the subtree against the B-tree invariants.
    ///
    /// Returns the subtree height and key count, or `None` on a violation.
    fn validate<C: Comparator<K>>(
        &self,
        comparator: &C,
        is_root: bool,
        lower: Option<&K>,
        upper: Option<&K>,
    ) -> Option<(usize, usize)> {
        let count = self.keys.len();
        let minimum = if is_root { 1 } else { Self::MIN_KEY_NUMBER };
        if count < minimum || count > Self::MAX_KEY_NUMBER {
            return None;
        }
        let sorted = self
            .keys
            .windows(2)
            .all(|pair| comparator.compare(&pair[0], &pair[1]) == Ordering::Less);
        if !sorted {
            return None;
        }
        if let (Some(lower), Some(first)) = (lower, self.keys.first())
            && comparator.compare(lower, first) != Ordering::Less
        {
            return None;
        }
        if let (Some(upper), Some(last)) = (upper, self.keys.last())
            && comparator.compare(last, upper) != Ordering::Less
        {
            return None;
        }

        if self.is_leaf() {
            return Some((1, count));
        }
        if self.children.len() != count + 1 {
            return None;
        }

        let mut height = None;
        let mut total = count;
        for (index, child) in self.children.iter().enumerate() {
            let child_lower = if index == 0 { lower } else { self.keys.get(index - 1) };
            let child_upper = if index == count { upper } else { self.keys.get(index) };
            let (child_height, child_count) =
                child.validate(comparator, false, child_lower, child_upper)?;
            match height {
                None => height = Some(child_height),
                Some(expected) if expected != child_height => return None,
                Some(_) => {}
            }
            total += child_count;
        }

        height.map(|height| (height + 1, total))
    }
}

// =============================================================================
// BTree Definition
// =============================================================================

/// A mutable ordered set stored in a B-tree.
///
/// Keys are ordered by the comparator `C` ([`NaturalOrder`] by default).
/// `M` is the branching factor: nodes hold between `M / 2 - 1` and `M - 1`
/// keys, except the root which holds at least one. `M` must be even and at
/// least 4; other values are rejected at compile time.
///
/// Inserting a key equal to a stored one is rejected and leaves the tree
/// unchanged.
///
/// # Examples
///
/// ```rust
/// use canopy::mutable::{BTree, NaturalOrder};
///
/// let mut wide: BTree<u32, NaturalOrder, 16> = BTree::default();
/// wide.extend(0..1000);
/// assert_eq!(wide.len(), 1000);
/// assert_eq!(wide.first(), Some(&0));
/// assert_eq!(wide.last(), Some(&999));
/// assert!(wide.check_invariants());
/// ```
#[derive(Clone)]
pub struct BTree<K, C = NaturalOrder, const M: usize = DEFAULT_ORDER> {
    /// Root node; `None` for the empty tree
    root: Option<Box<Node<K, M>>>,
    /// Number of keys stored
    length: usize,
    /// The total order over keys
    comparator: C,
}

impl<K> BTree<K> {
    /// Creates an empty tree ordered by [`Ord`] with the default order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use canopy::mutable::BTree;
    ///
    /// let tree: BTree<i32> = BTree::new();
    /// assert!(tree.is_empty());
    /// ```
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self::from_comparator(NaturalOrder)
    }
}

impl<K, C: Comparator<K>> BTree<K, C> {
    /// Creates an empty tree with the default order and a custom comparator.
    #[inline]
    #[must_use]
    pub const fn with_comparator(comparator: C) -> Self {
        Self::from_comparator(comparator)
    }
}

impl<K, C, const M: usize> BTree<K, C, M> {
    /// Maximum number of keys in one node.
    pub const MAX_KEY_NUMBER: usize = Node::<K, M>::MAX_KEY_NUMBER;

    /// Minimum number of keys in a non-root node.
    pub const MIN_KEY_NUMBER: usize = Node::<K, M>::MIN_KEY_NUMBER;

    const ORDER_CHECK: () = assert!(
        M >= 4 && M % 2 == 0,
        "B-tree order must be an even number of at least 4"
    );

    /// Creates an empty tree with any order and comparator.
    #[inline]
    #[must_use]
    pub const fn from_comparator(comparator: C) -> Self {
        let () = Self::ORDER_CHECK;
        Self {
            root: None,
            length: 0,
            comparator,
        }
    }

    /// Returns the number of keys in the tree.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.length
    }

    /// Returns `true` if the tree holds no keys.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Returns the number of node levels (0 for the empty tree).
    #[must_use]
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut node = self.root.as_deref();
        while let Some(current) = node {
            height += 1;
            node = current.children.first().map(|child| &**child);
        }
        height
    }

    /// Removes every key.
    pub fn clear(&mut self) {
        self.root = None;
        self.length = 0;
    }

    /// Returns a reference to the comparator.
    #[inline]
    #[must_use]
    pub const fn comparator(&self) -> &C {
        &self.comparator
    }

    /// Returns the least key, or `None` if empty.
    #[must_use]
    pub fn first(&self) -> Option<&K> {
        let mut node = self.root.as_deref()?;
        while let Some(child) = node.children.first() {
            node = &**child;
        }
        node.keys.first()
    }

    /// Returns the greatest key, or `None` if empty.
    #[must_use]
    pub fn last(&self) -> Option<&K> {
        let mut node = self.root.as_deref()?;
        while let Some(child) = node.children.last() {
            node = &**child;
        }
        node.keys.last()
    }

    /// Returns an iterator over the keys in ascending order.
    ///
    /// Each call returns a fresh iterator.
    #[must_use]
    pub fn iter(&self) -> BTreeIterator<'_, K, M> {
        BTreeIterator::new(self.root.as_deref(), self.length)
    }

    /// Calls `action` on every key in ascending order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use canopy::mutable::BTree;
    ///
    /// let tree: BTree<i32> = [3, 1, 2].into_iter().collect();
    /// let mut visited = Vec::new();
    /// tree.for_each_key(|key| visited.push(*key));
    /// assert_eq!(visited, vec![1, 2, 3]);
    /// ```
    pub fn for_each_key<F: FnMut(&K)>(&self, mut action: F) {
        if let Some(root) = &self.root {
            root.for_each_key(&mut action);
        }
    }

    /// Replaces an emptied root by its only child.
    fn collapse_root(&mut self) {
        if self.root.as_ref().is_some_and(|root| root.keys.is_empty()) {
            self.root = self.root.take().and_then(|mut root| root.children.pop());
            tracing::trace!(height = self.height(), "b-tree root collapsed");
        }
    }
}

impl<K, C: Comparator<K>, const M: usize> BTree<K, C, M> {
    /// Finds the node and index holding a key equal to `key`.
    fn search(&self, key: &K) -> Option<(&Node<K, M>, usize)> {
        let mut node = self.root.as_deref()?;
        loop {
            match node.binary_search(key, &self.comparator) {
                SearchResult::Found(index) => return Some((node, index)),
                SearchResult::NotFound(_) if node.is_leaf() => return None,
                SearchResult::NotFound(index) => node = &*node.children[index],
            }
        }
    }

    /// Returns `true` if a key equal to `key` is stored.
    #[must_use]
    pub fn contains(&self, key: &K) -> bool {
        self.search(key).is_some()
    }

    /// Returns the stored key equal to `key`.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<&K> {
        self.search(key).map(|(node, index)| &node.keys[index])
    }

    /// Inserts `key`.
    ///
    /// Returns `false`, leaving the stored key in place, if an equal key is
    /// already present.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use canopy::mutable::BTree;
    ///
    /// let mut tree = BTree::new();
    /// assert!(tree.insert("b"));
    /// assert!(tree.insert("a"));
    /// assert!(!tree.insert("a"));
    /// assert_eq!(tree.len(), 2);
    /// ```
    pub fn insert(&mut self, key: K) -> bool {
        let Some(mut root) = self.root.take() else {
            let mut node = Node::new();
            node.keys.push(key);
            self.root = Some(Box::new(node));
            self.length = 1;
            return true;
        };

        if root.is_full() {
            let mut parent = Box::new(Node::new());
            parent.children.push(root);
            parent.split_child(0);
            root = parent;
            tracing::trace!(length = self.length, "b-tree root split");
        }

        let inserted = root.insert_non_full(key, &self.comparator);
        self.root = Some(root);
        if inserted {
            self.length += 1;
        }
        inserted
    }

    /// Removes and returns the stored key equal to `key`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use canopy::mutable::BTree;
    ///
    /// let mut tree: BTree<i32> = (0..100).collect();
    /// assert_eq!(tree.remove(&42), Some(42));
    /// assert_eq!(tree.remove(&42), None);
    /// assert_eq!(tree.len(), 99);
    /// ```
    pub fn remove(&mut self, key: &K) -> Option<K> {
        let removed = self.root.as_mut()?.remove(key, &self.comparator);
        if removed.is_some() {
            self.length -= 1;
        }
        self.collapse_root();
        removed
    }

    /// Removes and returns the least key.
    pub fn pop_first(&mut self) -> Option<K> {
        let first = self.root.as_mut()?.delete_successor();
        if first.is_some() {
            self.length -= 1;
        }
        self.collapse_root();
        first
    }

    /// Removes and returns the greatest key.
    pub fn pop_last(&mut self) -> Option<K> {
        let last = self.root.as_mut()?.delete_predecessor();
        if last.is_some() {
            self.length -= 1;
        }
        self.collapse_root();
        last
    }

    /// Verifies key order, node occupancy, uniform leaf depth and the key
    /// count.
    ///
    /// Intended for tests and debugging; it visits every node.
    #[must_use]
    pub fn check_invariants(&self) -> bool {
        match &self.root {
            None => self.length == 0,
            Some(root) => root
                .validate(&self.comparator, true, None, None)
                .is_some_and(|(_, count)| count == self.length),
        }
    }
}

// =============================================================================
// Iterator Implementation
// =============================================================================

/// An in-order iterator over references to the keys of a [`BTree`].
///
/// Uses an explicit stack of `(node, next key index)` entries, one per level.
pub struct BTreeIterator<'a, K, const M: usize = DEFAULT_ORDER> {
    stack: SmallVec<[(&'a Node<K, M>, usize); INLINE_STACK_DEPTH]>,
    remaining: usize,
}

impl<'a, K, const M: usize> BTreeIterator<'a, K, M> {
    fn new(root: Option<&'a Node<K, M>>, length: usize) -> Self {
        let mut iterator = Self {
            stack: SmallVec::new(),
            remaining: length,
        };
        if let Some(root) = root {
            iterator.push_leftmost(root);
        }
        iterator
    }

    fn push_leftmost(&mut self, node: &'a Node<K, M>) {
        let mut node = node;
        loop {
            self.stack.push((node, 0));
            match node.children.first() {
                Some(child) => node = &**child,
                None => break,
            }
        }
    }
}

impl<'a, K, const M: usize> Iterator for BTreeIterator<'a, K, M> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (node, index) = {
                let entry = self.stack.last_mut()?;
                let current = *entry;
                entry.1 += 1;
                current
            };

            if index < node.keys.len() {
                if let Some(child) = node.children.get(index + 1) {
                    self.push_leftmost(child);
                }
                self.remaining -= 1;
                return Some(&node.keys[index]);
            }

            self.stack.pop();
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, const M: usize> ExactSizeIterator for BTreeIterator<'_, K, M> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<K, const M: usize> FusedIterator for BTreeIterator<'_, K, M> {}

/// An owning iterator over the keys of a [`BTree`] in ascending order.
pub struct BTreeIntoIterator<K> {
    keys: std::vec::IntoIter<K>,
}

impl<K> Iterator for BTreeIntoIterator<K> {
    type Item = K;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.keys.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.keys.size_hint()
    }
}

impl<K> DoubleEndedIterator for BTreeIntoIterator<K> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.keys.next_back()
    }
}

impl<K> ExactSizeIterator for BTreeIntoIterator<K> {
    fn len(&self) -> usize {
        self.keys.len()
    }
}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<K, C: Default, const M: usize> Default for BTree<K, C, M> {
    #[inline]
    fn default() -> Self {
        Self::from_comparator(C::default())
    }
}

impl<K, C: Comparator<K>, const M: usize> Extend<K> for BTree<K, C, M> {
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        for key in iter {
            self.insert(key);
        }
    }
}

impl<K, C: Comparator<K> + Default, const M: usize> FromIterator<K> for BTree<K, C, M> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut tree = Self::default();
        tree.extend(iter);
        tree
    }
}

impl<K, C, const M: usize> IntoIterator for BTree<K, C, M> {
    type Item = K;
    type IntoIter = BTreeIntoIterator<K>;

    fn into_iter(self) -> Self::IntoIter {
        let mut keys = Vec::with_capacity(self.length);
        if let Some(root) = self.root {
            (*root).drain_into(&mut keys);
        }
        BTreeIntoIterator {
            keys: keys.into_iter(),
        }
    }
}

impl<'a, K, C, const M: usize> IntoIterator for &'a BTree<K, C, M> {
    type Item = &'a K;
    type IntoIter = BTreeIterator<'a, K, M>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: PartialEq, C, const M: usize> PartialEq for BTree<K, C, M> {
    fn eq(&self, other: &Self) -> bool {
        self.length == other.length && self.iter().eq(other.iter())
    }
}

impl<K: Eq, C, const M: usize> Eq for BTree<K, C, M> {}

impl<K: fmt::Debug, C, const M: usize> fmt::Debug for BTree<K, C, M> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_set().entries(self.iter()).finish()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn leaf<const M: usize>(keys: &[i32]) -> Node<i32, M> {
        let mut node = Node::new();
        node.keys.extend(keys.iter().copied());
        node
    }

    #[rstest]
    fn test_order_constants() {
        assert_eq!(BTree::<i32>::MAX_KEY_NUMBER, 7);
        assert_eq!(BTree::<i32>::MIN_KEY_NUMBER, 3);
        assert_eq!(Node::<i32, 8>::T, 4);
    }

    #[rstest]
    #[case(0, SearchResult::NotFound(0))]
    #[case(10, SearchResult::Found(0))]
    #[case(25, SearchResult::NotFound(2))]
    #[case(30, SearchResult::Found(2))]
    #[case(99, SearchResult::NotFound(5))]
    fn test_binary_search_reports_insertion_point(
        #[case] key: i32,
        #[case] expected: SearchResult,
    ) {
        let node = leaf::<8>(&[10, 20, 30, 40, 50]);
        assert_eq!(node.binary_search(&key, &NaturalOrder), expected);
    }

    #[rstest]
    fn test_split_child_promotes_median() {
        let mut parent: Node<i32, 8> = Node::new();
        parent.children.push(Box::new(leaf(&[1, 2, 3, 4, 5, 6, 7])));
        parent.split_child(0);

        assert_eq!(parent.keys.as_slice(), &[4]);
        assert_eq!(parent.children[0].keys.as_slice(), &[1, 2, 3]);
        assert_eq!(parent.children[1].keys.as_slice(), &[5, 6, 7]);
    }

    #[rstest]
    fn test_root_split_happens_on_eighth_key() {
        let mut tree = BTree::new();
        for key in 0..7 {
            tree.insert(key);
        }
        assert_eq!(tree.height(), 1);
        tree.insert(7);
        assert_eq!(tree.height(), 2);
        assert!(tree.check_invariants());
    }

    #[rstest]
    fn test_merge_children_joins_around_separator() {
        let mut parent: Node<i32, 8> = leaf(&[10]);
        parent.children.push(Box::new(leaf(&[1, 2, 3])));
        parent.children.push(Box::new(leaf(&[11, 12, 13])));
        parent.merge_children(0);

        assert!(parent.keys.is_empty());
        assert_eq!(parent.children.len(), 1);
        assert_eq!(parent.children[0].keys.as_slice(), &[1, 2, 3, 10, 11, 12, 13]);
    }

    #[rstest]
    fn test_fill_child_borrows_from_left_sibling() {
        let mut parent: Node<i32, 8> = leaf(&[10]);
        parent.children.push(Box::new(leaf(&[1, 2, 3, 4])));
        parent.children.push(Box::new(leaf(&[11, 12, 13])));

        assert_eq!(parent.fill_child(1), 1);
        assert_eq!(parent.keys.as_slice(), &[4]);
        assert_eq!(parent.children[0].keys.as_slice(), &[1, 2, 3]);
        assert_eq!(parent.children[1].keys.as_slice(), &[10, 11, 12, 13]);
    }

    #[rstest]
    fn test_fill_child_borrows_from_right_sibling() {
        let mut parent: Node<i32, 8> = leaf(&[10]);
        parent.children.push(Box::new(leaf(&[1, 2, 3])));
        parent.children.push(Box::new(leaf(&[11, 12, 13, 14])));

        assert_eq!(parent.fill_child(0), 0);
        assert_eq!(parent.keys.as_slice(), &[11]);
        assert_eq!(parent.children[0].keys.as_slice(), &[1, 2, 3, 10]);
        assert_eq!(parent.children[1].keys.as_slice(), &[12, 13, 14]);
    }

    #[rstest]
    fn test_fill_last_child_merges_to_the_left() {
        let mut parent: Node<i32, 8> = leaf(&[10, 20]);
        parent.children.push(Box::new(leaf(&[1, 2, 3])));
        parent.children.push(Box::new(leaf(&[11, 12, 13])));
        parent.children.push(Box::new(leaf(&[21, 22, 23])));

        assert_eq!(parent.fill_child(2), 1);
        assert_eq!(parent.keys.as_slice(), &[10]);
        assert_eq!(parent.children[1].keys.as_slice(), &[11, 12, 13, 20, 21, 22, 23]);
    }

    #[rstest]
    fn test_remove_internal_key_uses_predecessor() {
        let mut tree: BTree<i32> = (0..50).collect();
        let root_key = tree.root.as_ref().map(|root| root.keys[0]).unwrap();
        assert_eq!(tree.remove(&root_key), Some(root_key));
        assert!(!tree.contains(&root_key));
        assert!(tree.check_invariants());
    }

    #[rstest]
    fn test_removing_everything_empties_root() {
        let mut tree: BTree<i32> = (0..200).collect();
        for key in 0..200 {
            assert_eq!(tree.remove(&key), Some(key));
            assert!(tree.check_invariants(), "broken after removing {key}");
        }
        assert!(tree.root.is_none());
        assert_eq!(tree.height(), 0);
    }

    #[rstest]
    fn test_validate_rejects_unsorted_node() {
        let mut tree: BTree<i32> = (0..3).collect();
        if let Some(root) = tree.root.as_mut() {
            root.keys.swap(0, 2);
        }
        assert!(!tree.check_invariants());
    }

    #[rstest]
    fn test_validate_rejects_wrong_length() {
        let mut tree: BTree<i32> = (0..30).collect();
        tree.length = 29;
        assert!(!tree.check_invariants());
    }

    #[rstest]
    fn test_smallest_order_stays_balanced() {
        let mut tree: BTree<i32, NaturalOrder, 4> = BTree::default();
        for key in (0..300).rev() {
            tree.insert(key);
        }
        assert!(tree.check_invariants());
        for key in (0..300).step_by(3) {
            tree.remove(&key);
        }
        assert!(tree.check_invariants());
        assert_eq!(tree.len(), 200);
    }
}
