//! Splitting of account lists and instructions into protocol legal batches

use serde_derive::Serialize;

/// Max number of assets a single voter weight update can account for
pub const MAX_NFTS_PER_WEIGHT_UPDATE: usize = 10;

/// Max remaining accounts of a create_nft_action_ticket instruction
pub const MAX_TICKET_ACCOUNTS_PER_INSTRUCTION: usize = 15;

/// Max remaining accounts of a cast_nft_vote instruction
pub const MAX_CAST_VOTE_ACCOUNTS: usize = 12;

/// Max remaining accounts of the first relinquish_nft_vote instruction
pub const MAX_NFT_RELINQUISH_FIRST_BATCH: usize = 5;

/// Max remaining accounts of any later relinquish instruction
pub const MAX_RELINQUISH_ACCOUNTS: usize = 12;

/// Max remaining accounts of a stake registry cast_vote_v0 instruction
pub const MAX_POSITION_CAST_ACCOUNTS: usize = 9;

/// Max remaining accounts of a stake registry update_voter_weight_record_v0 instruction
pub const MAX_POSITION_WEIGHT_ACCOUNTS: usize = 10;

/// Max remaining accounts of the first stake registry relinquish_vote_v0 instruction
pub const MAX_POSITION_RELINQUISH_FIRST_BATCH: usize = 10;

/// Concurrency class of a batch
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum SequenceType {
    /// Must run in order relative to the other Sequential batches
    Sequential,
    /// Independent of every other batch, may be submitted concurrently
    /// before the Sequential batches
    Parallel,
}

/// Splits `items` into contiguous chunks of `size`, the last one may be shorter
pub fn chunks<T: Clone>(items: &[T], size: usize) -> Vec<Vec<T>> {
    assert!(size >= 1, "chunk size must be at least 1");
    items.chunks(size).map(|chunk| chunk.to_vec()).collect()
}

/// Splits a flat account list made of `accounts_per_item` accounts per item
///
/// Items are never split across two chunks.
pub fn item_chunks<T: Clone>(items: &[T], size: usize, accounts_per_item: usize) -> Vec<Vec<T>> {
    assert!(
        accounts_per_item >= 1 && size % accounts_per_item == 0,
        "chunk size {} is not a multiple of {} accounts per item",
        size,
        accounts_per_item
    );
    assert!(
        items.len() % accounts_per_item == 0,
        "{} accounts do not make whole items of {}",
        items.len(),
        accounts_per_item
    );
    chunks(items, size)
}

/// Splits `items` with a first chunk of `first_size` and the rest in chunks of `size`
///
/// Always yields the first chunk, even when empty.
pub fn first_then_chunks<T: Clone>(items: &[T], first_size: usize, size: usize) -> Vec<Vec<T>> {
    let split = first_size.min(items.len());
    let mut result = vec![items[..split].to_vec()];
    result.extend(chunks(&items[split..], size));
    result
}

/// [`first_then_chunks`] over a flat account list of `accounts_per_item` accounts per item
pub fn item_first_then_chunks<T: Clone>(
    items: &[T],
    first_size: usize,
    size: usize,
    accounts_per_item: usize,
) -> Vec<Vec<T>> {
    assert!(
        accounts_per_item >= 1
            && first_size % accounts_per_item == 0
            && size % accounts_per_item == 0,
        "chunk sizes {} and {} are not multiples of {} accounts per item",
        first_size,
        size,
        accounts_per_item
    );
    first_then_chunks(items, first_size, size)
}

/// Panics when `len` exceeds the protocol ceiling `max`
pub fn assert_within_limit(len: usize, max: usize, what: &str) {
    assert!(
        len <= max,
        "{} holds {} accounts, protocol ceiling is {}",
        what,
        len,
        max
    );
}
