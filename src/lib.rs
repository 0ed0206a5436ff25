//! # canopy
//!
//! Tree-shaped collections for Rust: a persistent vector with structural
//! sharing and a mutable B-tree with a pluggable ordering.
//!
//! ## Overview
//!
//! - **Persistent Vector**: Immutable indexed sequence backed by a 32-way
//!   radix trie. Appends, updates and slices return new versions that share
//!   all untouched nodes with the original.
//! - **B-tree**: Mutable ordered set of unique keys with top-down insertion
//!   and deletion, a configurable branching factor and custom comparators.
//!
//! ## Feature Flags
//!
//! - `persistent`: Persistent data structures
//! - `mutable`: Mutable ordered collections
//! - `arc`: Use `Arc` instead of `Rc` in persistent structures so they are
//!   `Send + Sync`
//! - `full`: Enable all features
//!
//! ## Example
//!
//! ```rust
//! use canopy::prelude::*;
//!
//! let vector: PersistentVector<char> = ('a'..='z').collect();
//! let middle = vector.slice(10, 16).unwrap();
//! assert_eq!(middle.iter().collect::<String>(), "klmnop");
//!
//! let mut tree: BTree<char> = middle.iter().rev().copied().collect();
//! assert_eq!(tree.pop_first(), Some('k'));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Prelude module for convenient imports.
///
/// Re-exports commonly used types and traits.
///
/// # Usage
///
/// ```rust
/// use canopy::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::CollectionError;

    #[cfg(feature = "persistent")]
    pub use crate::persistent::*;

    #[cfg(feature = "mutable")]
    pub use crate::mutable::*;
}

pub mod error;

pub use error::CollectionError;

#[cfg(feature = "persistent")]
pub mod persistent;

#[cfg(feature = "mutable")]
pub mod mutable;
