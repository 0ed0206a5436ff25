//! Persistent (immutable) data structures.
//!
//! - [`PersistentVector`]: Persistent indexed sequence (32-way radix trie)
//! - [`VectorBuilder`]: One-pass bulk construction of a `PersistentVector`
//!
//! # Structural Sharing
//!
//! Every operation that "modifies" a vector returns a new vector. Only the
//! nodes on the path to the touched element are copied; all other subtrees
//! are shared by reference with the original. A published vector is never
//! mutated, so any number of readers may hold it while new versions are
//! derived from it.
//!
//! # Examples
//!
//! ```rust
//! use canopy::persistent::PersistentVector;
//!
//! let vector: PersistentVector<i32> = (0..100).collect();
//! assert_eq!(vector.get(50), Ok(&50));
//!
//! // Structural sharing: the original vector is preserved
//! let updated = vector.update(50, 999).unwrap();
//! assert_eq!(vector.get(50), Ok(&50));     // Original unchanged
//! assert_eq!(updated.get(50), Ok(&999));   // New version
//! ```

// =============================================================================
// Reference Counter Type Alias
// =============================================================================

/// Reference-counted smart pointer type.
///
/// When the `arc` feature is enabled, this is `std::sync::Arc`,
/// which is thread-safe but has slightly higher overhead.
///
/// When the `arc` feature is disabled (default), this is `std::rc::Rc`,
/// which is faster but not thread-safe.
#[cfg(feature = "arc")]
pub(crate) type ReferenceCounter<T> = std::sync::Arc<T>;

#[cfg(not(feature = "arc"))]
pub(crate) type ReferenceCounter<T> = std::rc::Rc<T>;

mod vector;

pub use vector::BITS_PER_LEVEL;
pub use vector::PersistentVector;
pub use vector::PersistentVectorIntoIterator;
pub use vector::PersistentVectorIterator;
pub use vector::VectorBuilder;
pub use vector::WIDTH;

// =============================================================================
// Tests
// =============================================================================
