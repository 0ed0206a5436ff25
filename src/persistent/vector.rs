//! Persistent (immutable) vector based on a radix trie.
//!
//! This module provides [`PersistentVector`], an immutable indexed sequence
//! that uses structural sharing for efficient operations, and
//! [`VectorBuilder`], its bulk construction entry point.
//!
//! # Overview
//!
//! `PersistentVector` is a shallow, wide tree of fixed-size arrays: every
//! node holds up to [`WIDTH`] (32) slots. Leaves hold elements, branches hold
//! child nodes. It provides:
//!
//! - O(log32 N) random access (effectively O(1) for practical sizes)
//! - O(log32 N) `push_back` and `update` by path copying
//! - O(log32 N) `slice`, `take`, `drop_first` by re-rooting
//! - O(N) `push_front` (requires rebuilding)
//! - O(1) len and `is_empty`
//!
//! All operations return new vectors without modifying the original. Only
//! the nodes on the path from the root to the touched leaf are copied; every
//! other subtree is shared by reference with the original vector.
//!
//! # Internal Structure
//!
//! The vector consists of:
//! - An optional root node (`None` for the empty vector, which never allocates)
//! - A shift (`depth * BITS_PER_LEVEL`) locating the leaf level
//! - An offset and a length selecting the visible window of the trie
//!
//! A vector of at most [`WIDTH`] elements is always a single leaf at depth 0,
//! so small vectors are read without any descent.
//!
//! # Examples
//!
//! ```rust
//! use canopy::persistent::PersistentVector;
//!
//! let vector = PersistentVector::new()
//!     .push_back(1)
//!     .push_back(2)
//!     .push_back(3);
//!
//! assert_eq!(vector.get(0), Ok(&1));
//! assert_eq!(vector.get(2), Ok(&3));
//!
//! // Structural sharing: the original vector is preserved
//! let extended = vector.push_back(4);
//! assert_eq!(vector.len(), 3);     // Original unchanged
//! assert_eq!(extended.len(), 4);   // New vector
//! ```

use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::{FromIterator, FusedIterator};
use std::ops::Index;

use super::ReferenceCounter;
use crate::error::CollectionError;

// =============================================================================
// Constants
// =============================================================================

/// Number of slots per trie node (2^5 = 32).
pub const WIDTH: usize = 32;

/// Bits of an index consumed by each trie level.
pub const BITS_PER_LEVEL: usize = 5;

/// Bit mask for extracting the slot within a node.
const MASK: usize = WIDTH - 1;

/// Number of elements appended one by one before `push_back_many` switches
/// to a builder.
const SMALL_APPEND_THRESHOLD: usize = 4;

static_assertions::const_assert_eq!(WIDTH, 1 << BITS_PER_LEVEL);

// =============================================================================
// Node Definition
// =============================================================================

/// Internal node structure for the radix trie.
///
/// Slices are dense: a branch holds exactly as many children as it has
/// populated slots, a leaf exactly as many elements.
enum Node<T> {
    /// Branch node containing child nodes
    Branch(ReferenceCounter<[Node<T>]>),
    /// Leaf node containing actual elements
    Leaf(ReferenceCounter<[T]>),
}

impl<T> Clone for Node<T> {
    #[inline]
    fn clone(&self) -> Self {
        match self {
            Self::Branch(children) => Self::Branch(children.clone()),
            Self::Leaf(elements) => Self::Leaf(elements.clone()),
        }
    }
}

impl<T> Node<T> {
    #[inline]
    fn leaf(elements: Vec<T>) -> Self {
        Self::Leaf(ReferenceCounter::from(elements))
    }

    #[inline]
    fn branch(children: Vec<Self>) -> Self {
        Self::Branch(ReferenceCounter::from(children))
    }

    /// Builds a single-element path from a branch at `level` down to a leaf.
    fn new_path(level: usize, element: T) -> Self {
        let mut node = Self::leaf(vec![element]);
        let mut current = 0;
        while current < level {
            node = Self::branch(vec![node]);
            current += BITS_PER_LEVEL;
        }
        node
    }

    /// Returns the leaf holding `position`, descending from a node at `level`.
    fn leaf_for(&self, level: usize, position: usize) -> &ReferenceCounter<[T]> {
        let mut node = self;
        let mut level = level;
        loop {
            match node {
                Self::Leaf(elements) => return elements,
                Self::Branch(children) => {
                    node = &children[(position >> level) & MASK];
                    level -= BITS_PER_LEVEL;
                }
            }
        }
    }

    /// Collects leaves in index order until `output` holds `limit` of them.
    fn collect_leaves(&self, limit: usize, output: &mut Vec<Self>) {
        match self {
            Self::Leaf(_) => {
                if output.len() < limit {
                    output.push(self.clone());
                }
            }
            Self::Branch(children) => {
                for child in children.iter() {
                    if output.len() >= limit {
                        break;
                    }
                    child.collect_leaves(limit, output);
                }
            }
        }
    }

    /// Returns `true` if both nodes share the same backing storage.
    #[cfg(test)]
    fn ptr_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Branch(left), Self::Branch(right)) => ReferenceCounter::ptr_eq(left, right),
            (Self::Leaf(left), Self::Leaf(right)) => ReferenceCounter::ptr_eq(left, right),
            _ => false,
        }
    }
}

impl<T: Clone> Node<T> {
    /// Copies the rightmost path so that `position` holds `element`.
    ///
    /// Slots to the right of `position` are dropped from the copies; they
    /// can only hold elements outside the visible window.
    fn with_pushed(&self, level: usize, position: usize, element: T) -> Self {
        let slot = (position >> level) & MASK;
        match self {
            Self::Leaf(elements) => {
                let mut copied = Vec::with_capacity(slot + 1);
                copied.extend_from_slice(&elements[..slot]);
                copied.push(element);
                Self::leaf(copied)
            }
            Self::Branch(children) => {
                let mut copied = Vec::with_capacity(slot + 1);
                copied.extend_from_slice(&children[..slot]);
                let child = match children.get(slot) {
                    Some(child) => child.with_pushed(level - BITS_PER_LEVEL, position, element),
                    None => Self::new_path(level - BITS_PER_LEVEL, element),
                };
                copied.push(child);
                Self::branch(copied)
            }
        }
    }

    /// Copies the root-to-leaf spine for `position`, replacing one element.
    fn with_replaced(&self, level: usize, position: usize, element: T) -> Self {
        match self {
            Self::Leaf(elements) => {
                let mut copied = elements.to_vec();
                copied[position & MASK] = element;
                Self::leaf(copied)
            }
            Self::Branch(children) => {
                let slot = (position >> level) & MASK;
                let mut copied = children.to_vec();
                copied[slot] = children[slot].with_replaced(level - BITS_PER_LEVEL, position, element);
                Self::branch(copied)
            }
        }
    }
}

// =============================================================================
// PersistentVector Definition
// =============================================================================

/// A persistent (immutable) vector based on a radix trie.
///
/// `PersistentVector` is an immutable data structure that uses structural
/// sharing to efficiently support functional programming patterns.
///
/// # Time Complexity
///
/// | Operation    | Complexity                      |
/// |--------------|---------------------------------|
/// | `new`        | O(1), no allocation             |
/// | `get`        | O(log32 N), O(1) when N <= 32   |
/// | `push_back`  | O(log32 N)                      |
/// | `update`     | O(log32 N)                      |
/// | `slice`      | O(log32 N), O(32) when small    |
/// | `pop_back`   | O(log32 N)                      |
/// | `push_front` | O(N)                            |
/// | `len`        | O(1)                            |
/// | `iter`       | O(1) to create, O(N) to iterate |
///
/// # Examples
///
/// ```rust
/// use canopy::persistent::PersistentVector;
///
/// let vector: PersistentVector<i32> = (0..100).collect();
/// assert_eq!(vector.len(), 100);
/// assert_eq!(vector.get(50), Ok(&50));
/// assert!(vector.get(100).is_err());
/// ```
pub struct PersistentVector<T> {
    /// Root node of the trie; `None` only for the empty vector
    root: Option<Node<T>>,
    /// Position of logical index 0 within the trie
    offset: usize,
    /// Total number of visible elements
    length: usize,
    /// Shift amount of the root level: `depth * BITS_PER_LEVEL`
    shift: usize,
}

impl<T> Clone for PersistentVector<T> {
    #[inline]
    fn clone(&self) -> Self {
        Self {
            root: self.root.clone(),
            offset: self.offset,
            length: self.length,
            shift: self.shift,
        }
    }
}

impl<T> PersistentVector<T> {
    /// Creates a new empty vector.
    ///
    /// The empty vector holds no node at all, so this never allocates.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use canopy::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = PersistentVector::new();
    /// assert!(vector.is_empty());
    /// ```
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            root: None,
            offset: 0,
            length: 0,
            shift: 0,
        }
    }

    /// Creates a vector containing a single element.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use canopy::persistent::PersistentVector;
    ///
    /// let vector = PersistentVector::singleton(42);
    /// assert_eq!(vector.len(), 1);
    /// assert_eq!(vector.get(0), Ok(&42));
    /// ```
    #[inline]
    #[must_use]
    pub fn singleton(element: T) -> Self {
        Self::from_leaf(vec![element])
    }

    /// Wraps at most `WIDTH` elements as a depth-0 vector.
    fn from_leaf(elements: Vec<T>) -> Self {
        debug_assert!(elements.len() <= WIDTH);
        if elements.is_empty() {
            return Self::new();
        }
        Self {
            length: elements.len(),
            root: Some(Node::leaf(elements)),
            offset: 0,
            shift: 0,
        }
    }

    /// Returns the number of elements in the vector.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use canopy::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = (1..=5).collect();
    /// assert_eq!(vector.len(), 5);
    /// ```
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.length
    }

    /// Returns `true` if the vector contains no elements.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Returns the number of branch levels above the leaves.
    ///
    /// A vector of at most [`WIDTH`] elements always has depth 0.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use canopy::persistent::PersistentVector;
    ///
    /// let small: PersistentVector<i32> = (0..32).collect();
    /// assert_eq!(small.depth(), 0);
    ///
    /// let grown = small.push_back(32);
    /// assert_eq!(grown.depth(), 1);
    /// ```
    #[inline]
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.shift / BITS_PER_LEVEL
    }

    /// Returns a reference to the element at the given index.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::IndexOutOfBounds`] if `index >= len()`.
    /// Indices are never clamped.
    ///
    /// # Complexity
    ///
    /// O(log32 N); a single array read when the vector fits in one leaf.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use canopy::CollectionError;
    /// use canopy::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = (1..=5).collect();
    /// assert_eq!(vector.get(0), Ok(&1));
    /// assert_eq!(vector.get(4), Ok(&5));
    /// assert_eq!(
    ///     vector.get(10),
    ///     Err(CollectionError::IndexOutOfBounds { index: 10, length: 5 })
    /// );
    /// ```
    pub fn get(&self, index: usize) -> Result<&T, CollectionError> {
        if index >= self.length {
            return Err(CollectionError::index_out_of_bounds(index, self.length));
        }
        let position = self.offset + index;
        match &self.root {
            Some(Node::Leaf(elements)) => Ok(&elements[position]),
            Some(root) => Ok(&root.leaf_for(self.shift, position)[position & MASK]),
            None => Err(CollectionError::index_out_of_bounds(index, self.length)),
        }
    }

    /// Returns a reference to the first element, or `None` if empty.
    #[inline]
    #[must_use]
    pub fn first(&self) -> Option<&T> {
        self.get(0).ok()
    }

    /// Returns a reference to the last element, or `None` if empty.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use canopy::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = (1..=5).collect();
    /// assert_eq!(vector.last(), Some(&5));
    ///
    /// let empty: PersistentVector<i32> = PersistentVector::new();
    /// assert_eq!(empty.last(), None);
    /// ```
    #[inline]
    #[must_use]
    pub fn last(&self) -> Option<&T> {
        self.length
            .checked_sub(1)
            .and_then(|index| self.get(index).ok())
    }

    /// Returns an iterator over references to the elements in index order.
    ///
    /// Each call returns a fresh iterator. Elements are read one leaf at a
    /// time, so iteration is O(N) overall.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use canopy::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = (1..=5).collect();
    /// let collected: Vec<&i32> = vector.iter().collect();
    /// assert_eq!(collected, vec![&1, &2, &3, &4, &5]);
    ///
    /// let reversed: Vec<&i32> = vector.iter().rev().collect();
    /// assert_eq!(reversed, vec![&5, &4, &3, &2, &1]);
    /// ```
    #[must_use]
    pub fn iter(&self) -> PersistentVectorIterator<'_, T> {
        PersistentVectorIterator::new(self, 0, self.length)
    }

    /// Returns the leaf holding logical `index`, which must be in bounds.
    fn leaf_containing(&self, index: usize) -> Option<&ReferenceCounter<[T]>> {
        let root = self.root.as_ref()?;
        Some(root.leaf_for(self.shift, self.offset + index))
    }

    /// Returns the elements of the leaf holding `index`, from `index` to the
    /// end of that leaf.
    fn chunk_from(&self, index: usize) -> &[T] {
        let slot = (self.offset + index) & MASK;
        match self.leaf_containing(index) {
            Some(leaf) => &leaf[slot..],
            None => &[],
        }
    }

    /// Returns the elements of the leaf holding `index`, from the start of
    /// that leaf up to and including `index`.
    fn chunk_until(&self, index: usize) -> &[T] {
        let slot = (self.offset + index) & MASK;
        match self.leaf_containing(index) {
            Some(leaf) => &leaf[..=slot],
            None => &[],
        }
    }
}

impl<T: Clone> PersistentVector<T> {
    /// Creates a vector holding `count` clones of `element`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use canopy::persistent::PersistentVector;
    ///
    /// let vector = PersistentVector::fill(40, "x");
    /// assert_eq!(vector.len(), 40);
    /// assert!(vector.iter().all(|element| *element == "x"));
    /// ```
    #[must_use]
    pub fn fill(count: usize, element: T) -> Self {
        let mut builder = VectorBuilder::with_capacity(count);
        for _ in 0..count {
            builder.push(element.clone());
        }
        builder.build()
    }

    /// Creates a `PersistentVector` from a slice.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use canopy::persistent::PersistentVector;
    ///
    /// let vector = PersistentVector::from_slice(&[1, 2, 3, 4, 5]);
    /// assert_eq!(vector.len(), 5);
    /// assert_eq!(vector.get(0), Ok(&1));
    /// ```
    #[must_use]
    pub fn from_slice(slice: &[T]) -> Self {
        if slice.len() <= WIDTH {
            return Self::from_leaf(slice.to_vec());
        }
        slice.iter().cloned().collect()
    }

    /// Appends an element to the back of the vector.
    ///
    /// Only the rightmost root-to-leaf path is copied. When the trie is full
    /// a new root level is added above the old root.
    ///
    /// # Complexity
    ///
    /// O(log32 N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use canopy::persistent::PersistentVector;
    ///
    /// let vector = PersistentVector::new()
    ///     .push_back(1)
    ///     .push_back(2)
    ///     .push_back(3);
    ///
    /// assert_eq!(vector.len(), 3);
    /// assert_eq!(vector.get(2), Ok(&3));
    /// ```
    #[must_use]
    pub fn push_back(&self, element: T) -> Self {
        let Some(root) = &self.root else {
            return Self::singleton(element);
        };
        let position = self.offset + self.length;

        if position < WIDTH << self.shift {
            Self {
                root: Some(root.with_pushed(self.shift, position, element)),
                offset: self.offset,
                length: self.length + 1,
                shift: self.shift,
            }
        } else {
            tracing::trace!(
                length = self.length + 1,
                depth = self.depth() + 1,
                "persistent vector root overflow, adding a level"
            );
            let new_root = Node::branch(vec![root.clone(), Node::new_path(self.shift, element)]);
            Self {
                root: Some(new_root),
                offset: self.offset,
                length: self.length + 1,
                shift: self.shift + BITS_PER_LEVEL,
            }
        }
    }

    /// Appends multiple elements to the back of the vector.
    ///
    /// Small additions use `push_back`; larger ones seed a [`VectorBuilder`]
    /// with the full leaves of this vector (shared, not copied) and build the
    /// result in one pass.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use canopy::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = (1..=3).collect();
    /// let extended = vector.push_back_many(4..=6);
    ///
    /// let collected: Vec<i32> = extended.iter().copied().collect();
    /// assert_eq!(collected, vec![1, 2, 3, 4, 5, 6]);
    /// ```
    #[must_use]
    pub fn push_back_many<I>(&self, iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        let new_elements: Vec<T> = iter.into_iter().collect();

        if new_elements.len() <= SMALL_APPEND_THRESHOLD {
            return new_elements
                .into_iter()
                .fold(self.clone(), |vector, element| vector.push_back(element));
        }

        let mut builder = VectorBuilder::from_vector(self);
        builder.extend(new_elements);
        builder.build()
    }

    /// Returns a vector holding the elements of `self` followed by `other`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use canopy::persistent::PersistentVector;
    ///
    /// let left: PersistentVector<i32> = (1..=3).collect();
    /// let right: PersistentVector<i32> = (4..=6).collect();
    /// assert_eq!(left.concat(&right).len(), 6);
    /// ```
    #[must_use]
    pub fn concat(&self, other: &Self) -> Self {
        if self.is_empty() {
            return other.clone();
        }
        if other.is_empty() {
            return self.clone();
        }
        let mut builder = VectorBuilder::from_vector(self);
        builder.extend(other.iter().cloned());
        builder.build()
    }

    /// Prepends an element to the front of the vector.
    ///
    /// # Complexity
    ///
    /// O(N): every element shifts to a new position, so the trie is rebuilt.
    #[must_use]
    pub fn push_front(&self, element: T) -> Self {
        let mut builder = VectorBuilder::with_capacity(self.length + 1);
        builder.push(element);
        builder.extend(self.iter().cloned());
        builder.build()
    }

    /// Removes the last element from the vector.
    ///
    /// Returns `None` if the vector is empty, otherwise the new vector and
    /// the removed element.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use canopy::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = (1..=5).collect();
    /// let (remaining, element) = vector.pop_back().unwrap();
    ///
    /// assert_eq!(element, 5);
    /// assert_eq!(remaining.len(), 4);
    /// ```
    #[must_use]
    pub fn pop_back(&self) -> Option<(Self, T)> {
        let last = self.last()?.clone();
        Some((self.slice_unchecked(0, self.length - 1), last))
    }

    /// Returns a new vector with the element at `index` replaced.
    ///
    /// Only the nodes on the root-to-leaf path of `index` are copied; every
    /// other subtree is shared with `self`.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::IndexOutOfBounds`] if `index >= len()`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use canopy::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = (1..=5).collect();
    /// let updated = vector.update(2, 100).unwrap();
    ///
    /// assert_eq!(updated.get(2), Ok(&100));
    /// assert_eq!(vector.get(2), Ok(&3)); // Original unchanged
    /// assert!(vector.update(5, 0).is_err());
    /// ```
    pub fn update(&self, index: usize, element: T) -> Result<Self, CollectionError> {
        if index >= self.length {
            return Err(CollectionError::index_out_of_bounds(index, self.length));
        }
        let Some(root) = &self.root else {
            return Err(CollectionError::index_out_of_bounds(index, self.length));
        };
        Ok(Self {
            root: Some(root.with_replaced(self.shift, self.offset + index, element)),
            offset: self.offset,
            length: self.length,
            shift: self.shift,
        })
    }

    /// Returns the elements in `begin..end` as a new vector.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::InvalidRange`] if `begin > end` or
    /// `end > len()`; nothing is computed in that case.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use canopy::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = (0..100).collect();
    /// let middle = vector.slice(40, 45).unwrap();
    ///
    /// let collected: Vec<i32> = middle.iter().copied().collect();
    /// assert_eq!(collected, vec![40, 41, 42, 43, 44]);
    /// assert!(vector.slice(50, 40).is_err());
    /// ```
    pub fn slice(&self, begin: usize, end: usize) -> Result<Self, CollectionError> {
        if begin > end || end > self.length {
            return Err(CollectionError::invalid_range(begin, end, self.length));
        }
        Ok(self.slice_unchecked(begin, end))
    }

    /// Returns the first `count` elements (all of them if `count >= len()`).
    #[must_use]
    pub fn take(&self, count: usize) -> Self {
        self.slice_unchecked(0, count.min(self.length))
    }

    /// Returns the vector without its first `count` elements.
    #[must_use]
    pub fn drop_first(&self, count: usize) -> Self {
        self.slice_unchecked(count.min(self.length), self.length)
    }

    /// Splits the vector into `take(index)` and `drop_first(index)`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use canopy::persistent::PersistentVector;
    ///
    /// let vector: PersistentVector<i32> = (1..=5).collect();
    /// let (left, right) = vector.split_at(2);
    /// assert_eq!(left.len(), 2);
    /// assert_eq!(right.len(), 3);
    /// ```
    #[must_use]
    pub fn split_at(&self, index: usize) -> (Self, Self) {
        (self.take(index), self.drop_first(index))
    }

    /// Re-roots the vector on `begin..end`, which must be a valid range.
    fn slice_unchecked(&self, begin: usize, end: usize) -> Self {
        let length = end - begin;
        if length == 0 {
            return Self::new();
        }
        if length == self.length {
            return self.clone();
        }
        if length <= WIDTH {
            return Self::from_leaf(
                PersistentVectorIterator::new(self, begin, end)
                    .cloned()
                    .collect(),
            );
        }
        let Some(root) = &self.root else {
            return Self::new();
        };

        let mut node = root.clone();
        let mut offset = self.offset + begin;
        let mut shift = self.shift;

        // Descend while the whole window sits below a single child.
        while shift > 0 {
            let first_slot = offset >> shift;
            let last_slot = (offset + length - 1) >> shift;
            if first_slot != last_slot {
                break;
            }
            let child = match &node {
                Node::Branch(children) => children[first_slot].clone(),
                Node::Leaf(_) => break,
            };
            offset -= first_slot << shift;
            shift -= BITS_PER_LEVEL;
            node = child;
        }

        Self {
            root: Some(node),
            offset,
            length,
            shift,
        }
    }
}

// =============================================================================
// VectorBuilder
// =============================================================================

/// A builder that constructs a [`PersistentVector`] in one pass.
///
/// Elements are packed into `WIDTH`-sized leaves as they arrive; branch
/// levels are built bottom-up only in [`VectorBuilder::build`]. No
/// intermediate vector is ever published, which avoids the copy
/// amplification of repeated `push_back`.
///
/// # Examples
///
/// ```rust
/// use canopy::persistent::VectorBuilder;
///
/// let mut builder = VectorBuilder::with_capacity(100);
/// for index in 0..100 {
///     builder.push(index);
/// }
/// let vector = builder.build();
///
/// assert_eq!(vector.len(), 100);
/// assert_eq!(vector.depth(), 1);
/// ```
pub struct VectorBuilder<T> {
    /// Completed leaves, each holding exactly `WIDTH` elements
    leaves: Vec<Node<T>>,
    /// The leaf currently being filled
    current: Vec<T>,
    /// Total number of elements pushed so far
    length: usize,
}

impl<T> VectorBuilder<T> {
    /// Creates an empty builder.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            leaves: Vec::new(),
            current: Vec::new(),
            length: 0,
        }
    }

    /// Creates an empty builder sized for about `size_hint` elements.
    #[must_use]
    pub fn with_capacity(size_hint: usize) -> Self {
        Self {
            leaves: Vec::with_capacity(size_hint / WIDTH),
            current: Vec::with_capacity(size_hint.min(WIDTH)),
            length: 0,
        }
    }

    /// Returns the number of elements pushed so far.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.length
    }

    /// Returns `true` if nothing has been pushed yet.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Appends an element.
    pub fn push(&mut self, element: T) {
        self.current.push(element);
        self.length += 1;
        if self.current.len() == WIDTH {
            let full = std::mem::replace(&mut self.current, Vec::with_capacity(WIDTH));
            self.leaves.push(Node::leaf(full));
        }
    }

    /// Finishes the builder and returns the vector.
    ///
    /// At most `WIDTH` elements produce a single depth-0 leaf.
    #[must_use]
    pub fn build(self) -> PersistentVector<T> {
        let length = self.length;
        let mut level = self.leaves;
        if !self.current.is_empty() {
            level.push(Node::leaf(self.current));
        }

        let mut shift = 0;
        while level.len() > 1 {
            let mut parents = Vec::with_capacity(level.len().div_ceil(WIDTH));
            let mut nodes = level.into_iter();
            loop {
                let chunk: Vec<Node<T>> = nodes.by_ref().take(WIDTH).collect();
                if chunk.is_empty() {
                    break;
                }
                parents.push(Node::branch(chunk));
            }
            level = parents;
            shift += BITS_PER_LEVEL;
        }

        match level.pop() {
            Some(root) => PersistentVector {
                root: Some(root),
                offset: 0,
                length,
                shift,
            },
            None => PersistentVector::new(),
        }
    }
}

impl<T: Clone> VectorBuilder<T> {
    /// Creates a builder holding the elements of `vector`.
    ///
    /// When the vector starts at a leaf boundary its full leaves are shared
    /// with the builder instead of copied; only the trailing partial leaf is
    /// cloned element by element.
    #[must_use]
    pub fn from_vector(vector: &PersistentVector<T>) -> Self {
        let mut builder = Self::with_capacity(vector.len());
        match &vector.root {
            Some(root) if vector.offset == 0 => {
                let full_leaves = vector.length / WIDTH;
                root.collect_leaves(full_leaves, &mut builder.leaves);
                builder.length = full_leaves * WIDTH;
                builder.extend(
                    PersistentVectorIterator::new(vector, builder.length, vector.length).cloned(),
                );
            }
            _ => builder.extend(vector.iter().cloned()),
        }
        builder
    }
}

impl<T> Default for VectorBuilder<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Extend<T> for VectorBuilder<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for element in iter {
            self.push(element);
        }
    }
}

impl<T> PersistentVector<T> {
    /// Creates a vector of `count` elements produced by calling `supplier`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use canopy::persistent::PersistentVector;
    ///
    /// let mut next = 0;
    /// let vector = PersistentVector::fill_with(3, || {
    ///     next += 10;
    ///     next
    /// });
    /// assert_eq!(vector.iter().copied().collect::<Vec<_>>(), vec![10, 20, 30]);
    /// ```
    #[must_use]
    pub fn fill_with<F>(count: usize, mut supplier: F) -> Self
    where
        F: FnMut() -> T,
    {
        let mut builder = VectorBuilder::with_capacity(count);
        for _ in 0..count {
            builder.push(supplier());
        }
        builder.build()
    }

    /// Creates a vector whose element at each index is `initializer(index)`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use canopy::persistent::PersistentVector;
    ///
    /// let squares = PersistentVector::from_fn(50, |index| index * index);
    /// assert_eq!(squares.get(7), Ok(&49));
    /// ```
    #[must_use]
    pub fn from_fn<F>(count: usize, initializer: F) -> Self
    where
        F: FnMut(usize) -> T,
    {
        (0..count).map(initializer).collect()
    }
}

// =============================================================================
// Iterator Implementation
// =============================================================================

/// An iterator over references to elements of a [`PersistentVector`].
///
/// The iterator caches the remaining part of the current leaf at each end,
/// so it descends the trie once per leaf rather than once per element.
pub struct PersistentVectorIterator<'a, T> {
    /// The vector being iterated
    vector: &'a PersistentVector<T>,
    /// Logical index of the next element from the front
    front: usize,
    /// Logical index one past the next element from the back
    back: usize,
    /// Cached elements starting at `front`
    front_chunk: &'a [T],
    /// Cached elements ending at `back - 1`
    back_chunk: &'a [T],
}

impl<'a, T> PersistentVectorIterator<'a, T> {
    const fn new(vector: &'a PersistentVector<T>, front: usize, back: usize) -> Self {
        Self {
            vector,
            front,
            back,
            front_chunk: &[],
            back_chunk: &[],
        }
    }
}

impl<'a, T> Iterator for PersistentVectorIterator<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        if self.front_chunk.is_empty() {
            self.front_chunk = self.vector.chunk_from(self.front);
        }
        let (element, rest) = self.front_chunk.split_first()?;
        self.front_chunk = rest;
        self.front += 1;
        Some(element)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back.saturating_sub(self.front);
        (remaining, Some(remaining))
    }
}

impl<T> DoubleEndedIterator for PersistentVectorIterator<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        if self.back_chunk.is_empty() {
            self.back_chunk = self.vector.chunk_until(self.back - 1);
        }
        let (element, rest) = self.back_chunk.split_last()?;
        self.back_chunk = rest;
        self.back -= 1;
        Some(element)
    }
}

impl<T> ExactSizeIterator for PersistentVectorIterator<'_, T> {
    fn len(&self) -> usize {
        self.back.saturating_sub(self.front)
    }
}

impl<T> FusedIterator for PersistentVectorIterator<'_, T> {}

/// An owning iterator over the elements of a [`PersistentVector`].
///
/// Leaves may be shared with other vectors, so elements are cloned out of
/// them rather than moved.
pub struct PersistentVectorIntoIterator<T> {
    /// The vector being iterated
    vector: PersistentVector<T>,
    /// Logical index of the next element
    index: usize,
    /// The leaf holding `index`, once loaded
    leaf: Option<ReferenceCounter<[T]>>,
}

impl<T: Clone> Iterator for PersistentVectorIntoIterator<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.vector.length {
            return None;
        }
        let slot = (self.vector.offset + self.index) & MASK;
        if slot == 0 || self.leaf.is_none() {
            self.leaf = self.vector.leaf_containing(self.index).cloned();
        }
        let element = self.leaf.as_ref()?.get(slot)?.clone();
        self.index += 1;
        Some(element)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.vector.length.saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

impl<T: Clone> ExactSizeIterator for PersistentVectorIntoIterator<T> {
    fn len(&self) -> usize {
        self.vector.length.saturating_sub(self.index)
    }
}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<T> Default for PersistentVector<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FromIterator<T> for PersistentVector<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let iterator = iter.into_iter();
        let mut builder = VectorBuilder::with_capacity(iterator.size_hint().0);
        builder.extend(iterator);
        builder.build()
    }
}

impl<T: Clone> IntoIterator for PersistentVector<T> {
    type Item = T;
    type IntoIter = PersistentVectorIntoIterator<T>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        PersistentVectorIntoIterator {
            vector: self,
            index: 0,
            leaf: None,
        }
    }
}

impl<'a, T> IntoIterator for &'a PersistentVector<T> {
    type Item = &'a T;
    type IntoIter = PersistentVectorIterator<'a, T>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T> Index<usize> for PersistentVector<T> {
    type Output = T;

    /// # Panics
    ///
    /// Panics if `index >= len()`, like indexing a slice.
    fn index(&self, index: usize) -> &Self::Output {
        match self.get(index) {
            Ok(element) => element,
            Err(error) => panic!("{error}"),
        }
    }
}

impl<T: PartialEq> PartialEq for PersistentVector<T> {
    fn eq(&self, other: &Self) -> bool {
        self.length == other.length && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for PersistentVector<T> {}

/// Hashes the length, then each element in order, so equal vectors hash
/// equally regardless of their internal layout.
impl<T: Hash> Hash for PersistentVector<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.length.hash(state);
        for element in self {
            element.hash(state);
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for PersistentVector<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_list().entries(self.iter()).finish()
    }
}

impl<T: fmt::Display> fmt::Display for PersistentVector<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "[")?;
        let mut first = true;
        for element in self {
            if first {
                first = false;
            } else {
                write!(formatter, ", ")?;
            }
            write!(formatter, "{element}")?;
        }
        write!(formatter, "]")
    }
}

#[cfg(feature = "arc")]
static_assertions::assert_impl_all!(PersistentVector<i32>: Send, Sync);

#[cfg(not(feature = "arc"))]
static_assertions::assert_not_impl_any!(PersistentVector<i32>: Send, Sync);

// =============================================================================
// Tests
// =============================================================================
