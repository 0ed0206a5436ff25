//! Mutable, single-owner ordered collections.
//!
//! - [`BTree`]: Ordered set of keys stored in a B-tree of configurable order
//! - [`Comparator`]: Pluggable total order used by [`BTree`]
//!
//! Unlike the structures in `persistent`, these are updated in place and are
//! not safe to share between threads without external synchronization.
//!
//! # Examples
//!
//! ```rust
//! use canopy::mutable::BTree;
//!
//! let mut tree: BTree<i32> = (0..1000).rev().collect();
//! assert_eq!(tree.len(), 1000);
//! assert_eq!(tree.pop_first(), Some(0));
//! assert_eq!(tree.pop_last(), Some(999));
//! assert!(tree.check_invariants());
//! ```

mod btree;
mod comparator;

pub use btree::BTree;
pub use btree::BTreeIntoIterator;
pub use btree::BTreeIterator;
pub use btree::DEFAULT_ORDER;
pub use comparator::Comparator;
pub use comparator::NaturalOrder;
pub use comparator::ReverseOrder;
