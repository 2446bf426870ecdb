//! Inputs supplied by the realm, asset and identity collaborators

use {
    borsh::{BorshDeserialize, BorshSerialize},
    serde_derive::{Deserialize, Serialize},
    serde_with::{serde_as, DisplayFromStr},
    solana_sdk::pubkey::Pubkey,
    std::{fmt, str::FromStr},
};

/// The governance action a voter weight is evaluated for
///
/// The variant order matches the plugin programs' `VoterWeightAction`, the
/// enum is serialized by its index.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, BorshSerialize, BorshDeserialize, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum WeightAction {
    /// Cast vote for a proposal. Target: Proposal
    CastVote,

    /// Comment a proposal. Target: Proposal
    CommentProposal,

    /// Create Governance within a realm. Target: Realm
    CreateGovernance,

    /// Create a proposal for a governance. Target: Governance
    CreateProposal,

    /// Signs off a proposal for a governance. Target: Proposal
    SignOffProposal,
}

impl WeightAction {
    /// Name used by the plugin programs in seeds, e.g. `castVote`
    pub fn name(&self) -> &'static str {
        match self {
            Self::CastVote => "castVote",
            Self::CommentProposal => "commentProposal",
            Self::CreateGovernance => "createGovernance",
            Self::CreateProposal => "createProposal",
            Self::SignOffProposal => "signOffProposal",
        }
    }
}

impl fmt::Display for WeightAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for WeightAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cast-vote" | "castVote" => Ok(Self::CastVote),
            "comment-proposal" | "commentProposal" => Ok(Self::CommentProposal),
            "create-governance" | "createGovernance" => Ok(Self::CreateGovernance),
            "create-proposal" | "createProposal" => Ok(Self::CreateProposal),
            "sign-off-proposal" | "signOffProposal" => Ok(Self::SignOffProposal),
            _ => Err(format!("unknown voter weight action: {}", s)),
        }
    }
}

/// Realm the voting session runs against
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RealmInfo {
    pub address: Pubkey,
    pub community_mint: Pubkey,
    pub council_mint: Option<Pubkey>,
    /// Owner of the realm account
    pub governance_program_id: Pubkey,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenOwnerRecordInfo {
    pub address: Pubkey,
    pub governing_token_mint: Pubkey,
    pub governing_token_owner: Pubkey,
    pub governing_token_deposit_amount: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProposalInfo {
    pub address: Pubkey,
    pub governance: Pubkey,
    pub governing_token_mint: Pubkey,
    /// Token owner record of the proposal owner
    pub token_owner_record: Pubkey,
}

/// Grouping entry of a digital asset, e.g. its verified collection
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NftGrouping {
    pub group_key: String,
    #[serde_as(as = "DisplayFromStr")]
    pub group_value: Pubkey,
    #[serde(default)]
    pub verified: Option<bool>,
}

/// Leaf of a compressed asset in its concurrent merkle tree
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompressionInfo {
    #[serde_as(as = "DisplayFromStr")]
    pub tree: Pubkey,
    pub leaf_id: u64,
    pub data_hash: [u8; 32],
    pub creator_hash: [u8; 32],
}

/// Asset held by the voter
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VotingNft {
    /// Mint for plain NFTs, asset id for compressed ones
    #[serde_as(as = "DisplayFromStr")]
    pub mint: Pubkey,
    #[serde(default)]
    pub grouping: Vec<NftGrouping>,
    #[serde(default)]
    pub compression: Option<CompressionInfo>,
}

impl VotingNft {
    pub fn is_compressed(&self) -> bool {
        self.compression.is_some()
    }

    /// Collection the asset is grouped under, if any
    pub fn collection(&self) -> Option<&NftGrouping> {
        self.grouping.iter().find(|g| g.group_key == "collection")
    }
}

/// Stake registry position held by the voter
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakePosition {
    #[serde_as(as = "DisplayFromStr")]
    pub address: Pubkey,
    #[serde_as(as = "DisplayFromStr")]
    pub mint: Pubkey,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weight_action_serializes_as_variant_index() {
        assert_eq!(WeightAction::CastVote.try_to_vec().unwrap(), vec![0]);
        assert_eq!(WeightAction::SignOffProposal.try_to_vec().unwrap(), vec![4]);
    }

    #[test]
    fn test_weight_action_from_str() {
        assert_eq!(
            "create-proposal".parse::<WeightAction>().unwrap(),
            WeightAction::CreateProposal
        );
        assert_eq!(
            "signOffProposal".parse::<WeightAction>().unwrap(),
            WeightAction::SignOffProposal
        );
        assert!("vote".parse::<WeightAction>().is_err());
    }
}
