//! Error types for collection operations.
//!
//! Every fallible operation in this crate reports its failure immediately
//! and leaves the receiver untouched. Persistent collections never mutate a
//! published value, so a failed call cannot corrupt anything that was
//! observable before it.

use std::fmt;

/// Represents a rejected index or range argument.
///
/// # Examples
///
/// ```rust
/// use canopy::CollectionError;
/// use canopy::persistent::PersistentVector;
///
/// let vector: PersistentVector<i32> = (0..3).collect();
/// assert_eq!(
///     vector.get(3),
///     Err(CollectionError::IndexOutOfBounds { index: 3, length: 3 })
/// );
/// assert_eq!(
///     format!("{}", vector.get(3).unwrap_err()),
///     "index 3 out of bounds for length 3"
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionError {
    /// The index does not address an element (`index >= length`).
    IndexOutOfBounds {
        /// The rejected index.
        index: usize,
        /// The length of the collection at the time of the call.
        length: usize,
    },
    /// The range `begin..end` is reversed or extends past `length`.
    InvalidRange {
        /// The requested start of the range (inclusive).
        begin: usize,
        /// The requested end of the range (exclusive).
        end: usize,
        /// The length of the collection at the time of the call.
        length: usize,
    },
}

impl CollectionError {
    #[inline]
    pub(crate) const fn index_out_of_bounds(index: usize, length: usize) -> Self {
        Self::IndexOutOfBounds { index, length }
    }

    #[inline]
    pub(crate) const fn invalid_range(begin: usize, end: usize, length: usize) -> Self {
        Self::InvalidRange { begin, end, length }
    }
}

impl fmt::Display for CollectionError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IndexOutOfBounds { index, length } => {
                write!(formatter, "index {index} out of bounds for length {length}")
            }
            Self::InvalidRange { begin, end, length } if begin > end => write!(
                formatter,
                "range start {begin} is greater than range end {end} (length {length})"
            ),
            Self::InvalidRange { begin, end, length } => write!(
                formatter,
                "range {begin}..{end} out of bounds for length {length}"
            ),
        }
    }
}

impl std::error::Error for CollectionError {}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_index_out_of_bounds_display() {
        let error = CollectionError::index_out_of_bounds(7, 4);
        assert_eq!(format!("{error}"), "index 7 out of bounds for length 4");
    }

    #[rstest]
    #[case(5, 2, 10, "range start 5 is greater than range end 2 (length 10)")]
    #[case(2, 11, 10, "range 2..11 out of bounds for length 10")]
    fn test_invalid_range_display(
        #[case] begin: usize,
        #[case] end: usize,
        #[case] length: usize,
        #[case] expected: &str,
    ) {
        let error = CollectionError::invalid_range(begin, end, length);
        assert_eq!(format!("{error}"), expected);
    }

    #[rstest]
    fn test_is_std_error() {
        fn assert_error<E: std::error::Error + Send + Sync + 'static>(_: &E) {}
        assert_error(&CollectionError::index_out_of_bounds(0, 0));
    }
}
