use solana_sdk::pubkey::Pubkey;
use spl_governance_voting_client::state::{
    ProposalInfo, RealmInfo, TokenOwnerRecordInfo, VotingNft,
};

#[derive(Debug, Clone)]
pub struct RealmCookie {
    pub address: Pubkey,

    pub info: RealmInfo,
}

#[derive(Debug, Clone)]
pub struct TokenOwnerRecordCookie {
    pub address: Pubkey,

    pub info: TokenOwnerRecordInfo,

    pub token_owner: Pubkey,
}

#[derive(Debug, Clone)]
pub struct ProposalCookie {
    pub address: Pubkey,

    pub info: ProposalInfo,

    /// Governance VoteRecord of the voter
    pub vote_record: Pubkey,
}

#[derive(Debug, Clone)]
pub struct NftCookie {
    pub nft: VotingNft,

    pub metadata: Pubkey,
}
