#![cfg(feature = "mutable")]
//! Property-based tests for BTree.
//!
//! Random operation sequences are replayed against `std::collections::BTreeSet`
//! and the structural invariants are checked after each one.

use std::collections::BTreeSet;

use canopy::mutable::{BTree, NaturalOrder};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Operation {
    Insert(i16),
    Remove(i16),
    PopFirst,
    PopLast,
}

fn operation_strategy() -> impl Strategy<Value = Operation> {
    prop_oneof![
        4 => any::<i16>().prop_map(|key| Operation::Insert(key % 512)),
        3 => any::<i16>().prop_map(|key| Operation::Remove(key % 512)),
        1 => Just(Operation::PopFirst),
        1 => Just(Operation::PopLast),
    ]
}

fn replay<const M: usize>(operations: &[Operation]) -> Result<(), TestCaseError> {
    let mut tree: BTree<i16, NaturalOrder, M> = BTree::default();
    let mut model = BTreeSet::new();

    for operation in operations {
        match operation {
            Operation::Insert(key) => {
                prop_assert_eq!(tree.insert(*key), model.insert(*key));
            }
            Operation::Remove(key) => {
                prop_assert_eq!(tree.remove(key), model.take(key));
            }
            Operation::PopFirst => {
                prop_assert_eq!(tree.pop_first(), model.pop_first());
            }
            Operation::PopLast => {
                prop_assert_eq!(tree.pop_last(), model.pop_last());
            }
        }
        prop_assert!(tree.check_invariants(), "invariants broken after {:?}", operation);
        prop_assert_eq!(tree.len(), model.len());
    }

    prop_assert!(tree.iter().eq(model.iter()));
    prop_assert_eq!(tree.first(), model.first());
    prop_assert_eq!(tree.last(), model.last());
    Ok(())
}

// =============================================================================
// Model Laws
// =============================================================================

proptest! {
    /// The default order behaves like an ordered set
    #[test]
    fn prop_default_order_matches_model(
        operations in prop::collection::vec(operation_strategy(), 0..600)
    ) {
        replay::<8>(&operations)?;
    }

    /// The smallest order exercises every borrow and merge path
    #[test]
    fn prop_smallest_order_matches_model(
        operations in prop::collection::vec(operation_strategy(), 0..600)
    ) {
        replay::<4>(&operations)?;
    }

    /// Membership law: every inserted key is found, no other key is
    #[test]
    fn prop_contains_matches_model(
        keys in prop::collection::vec(any::<u16>(), 0..800),
        probes in prop::collection::vec(any::<u16>(), 0..100)
    ) {
        let tree: BTree<u16> = keys.iter().copied().collect();
        let model: BTreeSet<u16> = keys.iter().copied().collect();

        for probe in probes.iter().chain(keys.iter()) {
            prop_assert_eq!(tree.contains(probe), model.contains(probe));
        }
    }

    /// Iteration law: in-order traversal is sorted and duplicate free
    #[test]
    fn prop_iteration_is_strictly_increasing(
        keys in prop::collection::vec(any::<i32>(), 0..1000)
    ) {
        let tree: BTree<i32> = keys.into_iter().collect();
        let walked: Vec<i32> = tree.iter().copied().collect();

        prop_assert!(walked.windows(2).all(|pair| pair[0] < pair[1]));
        prop_assert_eq!(walked.len(), tree.len());
        prop_assert_eq!(tree.into_iter().collect::<Vec<_>>(), walked);
    }
}
