//! Pluggable total orders for ordered collections.
//!
//! A [`Comparator`] decides the order of keys in a [`BTree`](super::BTree).
//! [`NaturalOrder`] defers to [`Ord`], any `Fn(&T, &T) -> Ordering` closure
//! is a comparator, and [`ReverseOrder`] flips another comparator.
//!
//! # Examples
//!
//! ```rust
//! use canopy::mutable::{BTree, ReverseOrder, NaturalOrder};
//!
//! let mut descending = BTree::with_comparator(ReverseOrder(NaturalOrder));
//! descending.extend([1, 3, 2]);
//! assert_eq!(descending.iter().copied().collect::<Vec<_>>(), vec![3, 2, 1]);
//!
//! let mut by_length = BTree::with_comparator(|left: &&str, right: &&str| {
//!     left.len().cmp(&right.len())
//! });
//! by_length.extend(["ccc", "a", "bb"]);
//! assert_eq!(by_length.first(), Some(&"a"));
//! ```

use std::cmp::Ordering;

/// A total order over `T`.
///
/// Implementations must be consistent: antisymmetric, transitive, and
/// stable for the lifetime of the collection using them.
pub trait Comparator<T: ?Sized> {
    /// Compares two values.
    fn compare(&self, left: &T, right: &T) -> Ordering;
}

/// The order given by [`Ord`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct NaturalOrder;

impl<T: Ord + ?Sized> Comparator<T> for NaturalOrder {
    #[inline]
    fn compare(&self, left: &T, right: &T) -> Ordering {
        left.cmp(right)
    }
}

/// The reverse of the wrapped comparator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ReverseOrder<C>(pub C);

impl<T: ?Sized, C: Comparator<T>> Comparator<T> for ReverseOrder<C> {
    #[inline]
    fn compare(&self, left: &T, right: &T) -> Ordering {
        self.0.compare(right, left)
    }
}

impl<T: ?Sized, F> Comparator<T> for F
where
    F: Fn(&T, &T) -> Ordering,
{
    #[inline]
    fn compare(&self, left: &T, right: &T) -> Ordering {
        self(left, right)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(1, 2, Ordering::Less)]
    #[case(2, 2, Ordering::Equal)]
    #[case(3, 2, Ordering::Greater)]
    fn test_natural_order(#[case] left: i32, #[case] right: i32, #[case] expected: Ordering) {
        assert_eq!(NaturalOrder.compare(&left, &right), expected);
    }

    #[rstest]
    fn test_reverse_order_flips() {
        let comparator = ReverseOrder(NaturalOrder);
        assert_eq!(comparator.compare(&1, &2), Ordering::Greater);
        assert_eq!(comparator.compare(&"b", &"a"), Ordering::Less);
    }

    #[rstest]
    fn test_closure_is_a_comparator() {
        let by_absolute = |left: &i32, right: &i32| left.abs().cmp(&right.abs());
        assert_eq!(by_absolute.compare(&-5, &3), Ordering::Greater);
        assert_eq!(ReverseOrder(by_absolute).compare(&-5, &3), Ordering::Less);
    }
}
