//! Voting power of NFT holders

use {crate::state::VotingNft, solana_sdk::pubkey::Pubkey};

/// Weight the NFT plugin registrar assigns to a collection
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CollectionConfig {
    pub collection: Pubkey,
    pub size: u32,
    pub weight: u64,
}

/// Returns the nfts of a configured collection whose collection grouping is verified
///
/// Assets which don't report verification are kept.
pub fn verified_collection_nfts(nfts: &[VotingNft], collections: &[Pubkey]) -> Vec<VotingNft> {
    nfts.iter()
        .filter(|nft| {
            nft.collection().map_or(false, |grouping| {
                collections.contains(&grouping.group_value) && grouping.verified.unwrap_or(true)
            })
        })
        .cloned()
        .collect()
}

/// Returns the weight of the voter's nfts, unknown collections weigh nothing
pub fn nft_voting_power(nfts: &[VotingNft], configs: &[CollectionConfig]) -> u64 {
    nfts.iter()
        .filter_map(|nft| {
            configs.iter().find(|config| {
                nft.grouping
                    .iter()
                    .any(|g| g.group_key == "collection" && g.group_value == config.collection)
            })
        })
        .fold(0u64, |power, config| power.saturating_add(config.weight))
}
