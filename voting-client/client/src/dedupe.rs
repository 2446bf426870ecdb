//! Removal of duplicate prerequisite instructions and signers

use std::{collections::HashSet, hash::Hash};

/// Returns `items` with later duplicates removed, first-seen order preserved
pub fn dedupe<T: PartialEq + Clone>(items: &[T]) -> Vec<T> {
    let mut result: Vec<T> = Vec::with_capacity(items.len());
    for item in items {
        if !result.contains(item) {
            result.push(item.clone());
        }
    }
    result
}

/// Returns `items` with later items of an already seen identity removed
pub fn dedupe_by_key<T, K, F>(items: &[T], key: F) -> Vec<T>
where
    T: Clone,
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    let mut seen = HashSet::new();
    items
        .iter()
        .filter(|item| seen.insert(key(*item)))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        proptest::prelude::*,
        solana_sdk::{instruction::Instruction, pubkey::Pubkey},
    };

    #[test]
    fn test_dedupe_instructions() {
        let program_id = Pubkey::new_unique();
        let first = Instruction::new_with_bytes(program_id, &[1], vec![]);
        let second = Instruction::new_with_bytes(program_id, &[2], vec![]);

        let result = dedupe(&[first.clone(), second.clone(), first.clone()]);

        assert_eq!(result, vec![first, second]);
    }

    #[test]
    fn test_dedupe_signers_by_address() {
        let payer = Pubkey::new_unique();
        let other = Pubkey::new_unique();

        let result = dedupe_by_key(&[payer, other, payer, payer], |key| *key);

        assert_eq!(result, vec![payer, other]);
    }

    proptest! {
        #[test]
        fn test_dedupe_is_idempotent(items in prop::collection::vec(0u8..16, 0..100)) {
            let once = dedupe(&items);

            assert_eq!(dedupe(&once), once.clone());
            assert_eq!(dedupe_by_key(&items, |item| *item), once);
        }
    }

    proptest! {
        #[test]
        fn test_dedupe_keeps_first_occurrence_order(items in prop::collection::vec(0u8..16, 0..100)) {
            let result = dedupe(&items);

            let mut expected = vec![];
            for item in &items {
                if !expected.contains(item) {
                    expected.push(*item);
                }
            }
            assert_eq!(result, expected);
        }
    }
}
