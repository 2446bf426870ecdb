//! Voter weight plugin adapters
//!
//! The set of supported plugins is closed, each variant of [`WeightPlugin`]
//! carries the configuration its adapter needs.

pub mod gateway_identity;
pub mod nft_collection;
pub mod oracle_stake;
pub mod queue_oracle;
pub mod stake_registry;

use {
    crate::{
        client::ProgramClient,
        error::VotingClientResult,
        plan::OperationPlan,
        state::{ProposalInfo, RealmInfo, TokenOwnerRecordInfo, WeightAction},
        voting_client::VoterState,
    },
    serde_derive::{Deserialize, Serialize},
    solana_sdk::pubkey::Pubkey,
    std::fmt,
};

pub use {
    gateway_identity::GatewayIdentityPlugin,
    nft_collection::NftCollectionPlugin,
    oracle_stake::{OracleStakePlugin, StakeConnection, StakeVoterWeightUpdate},
    queue_oracle::QueueOraclePlugin,
    stake_registry::StakeRegistryPlugin,
};

/// Which plugin supplies the voting power of a realm
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WeightPluginKind {
    None,
    TokenDeposit,
    NftCollection,
    StakeRegistry,
    GatewayIdentity,
    OracleStake,
    QueueOracle,
}

impl fmt::Display for WeightPluginKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "none",
            Self::TokenDeposit => "token-deposit",
            Self::NftCollection => "nft-collection",
            Self::StakeRegistry => "stake-registry",
            Self::GatewayIdentity => "gateway-identity",
            Self::OracleStake => "oracle-stake",
            Self::QueueOracle => "queue-oracle",
        };
        f.write_str(name)
    }
}

/// Configured adapter of the realm's voter weight plugin
#[derive(Clone, Debug)]
pub enum WeightPlugin {
    /// Voting power comes from governance deposits only
    None,
    /// Deposited tokens are read by the governance program directly
    TokenDeposit,
    NftCollection(NftCollectionPlugin),
    StakeRegistry(StakeRegistryPlugin),
    GatewayIdentity(GatewayIdentityPlugin),
    OracleStake(OracleStakePlugin),
    QueueOracle(QueueOraclePlugin),
}

/// Everything an adapter reads while building a plan
pub struct PluginContext<'a> {
    pub client: &'a dyn ProgramClient,
    pub realm: &'a RealmInfo,
    pub voter: &'a Pubkey,
    pub token_owner_record: &'a TokenOwnerRecordInfo,
    pub state: &'a VoterState,
}

impl WeightPlugin {
    pub fn kind(&self) -> WeightPluginKind {
        match self {
            Self::None => WeightPluginKind::None,
            Self::TokenDeposit => WeightPluginKind::TokenDeposit,
            Self::NftCollection(_) => WeightPluginKind::NftCollection,
            Self::StakeRegistry(_) => WeightPluginKind::StakeRegistry,
            Self::GatewayIdentity(_) => WeightPluginKind::GatewayIdentity,
            Self::OracleStake(_) => WeightPluginKind::OracleStake,
            Self::QueueOracle(_) => WeightPluginKind::QueueOracle,
        }
    }

    /// Program id of the plugin, None when the realm uses no plugin program
    pub fn program_id(&self) -> Option<Pubkey> {
        match self {
            Self::None | Self::TokenDeposit => None,
            Self::NftCollection(plugin) => Some(plugin.program_id),
            Self::StakeRegistry(plugin) => Some(plugin.program_id),
            Self::GatewayIdentity(plugin) => Some(plugin.program_id),
            Self::OracleStake(plugin) => Some(plugin.program_id),
            Self::QueueOracle(plugin) => Some(plugin.program_id),
        }
    }

    pub(crate) async fn refresh_voter_weight(
        &self,
        ctx: &PluginContext<'_>,
        action: WeightAction,
        target: Option<Pubkey>,
    ) -> VotingClientResult<OperationPlan> {
        match self {
            Self::None | Self::TokenDeposit => Ok(OperationPlan::default()),
            Self::NftCollection(plugin) => plugin.refresh_voter_weight(ctx, action).await,
            Self::StakeRegistry(plugin) => plugin.refresh_voter_weight(ctx, action),
            Self::GatewayIdentity(plugin) => plugin.refresh_voter_weight(ctx),
            Self::OracleStake(plugin) => plugin.refresh_voter_weight(ctx, action, target).await,
            Self::QueueOracle(plugin) => plugin.refresh_voter_weight(ctx),
        }
    }

    pub(crate) async fn cast_vote(
        &self,
        ctx: &PluginContext<'_>,
        proposal: &ProposalInfo,
    ) -> VotingClientResult<OperationPlan> {
        match self {
            Self::None | Self::TokenDeposit => Ok(OperationPlan::default()),
            Self::NftCollection(plugin) => plugin.cast_vote(ctx, proposal).await,
            Self::StakeRegistry(plugin) => plugin.cast_vote(ctx, proposal).await,
            Self::GatewayIdentity(plugin) => plugin.refresh_voter_weight(ctx),
            Self::OracleStake(plugin) => {
                plugin
                    .refresh_voter_weight(ctx, WeightAction::CastVote, Some(proposal.address))
                    .await
            }
            Self::QueueOracle(plugin) => plugin.refresh_voter_weight(ctx),
        }
    }

    pub(crate) async fn relinquish_vote(
        &self,
        ctx: &PluginContext<'_>,
        proposal: &ProposalInfo,
        vote_record: &Pubkey,
    ) -> VotingClientResult<OperationPlan> {
        match self {
            Self::NftCollection(plugin) => plugin.relinquish_vote(ctx, proposal, vote_record).await,
            Self::StakeRegistry(plugin) => plugin.relinquish_vote(ctx, proposal, vote_record).await,
            // Weight records of the other plugins hold no per proposal state
            Self::None
            | Self::TokenDeposit
            | Self::GatewayIdentity(_)
            | Self::OracleStake(_)
            | Self::QueueOracle(_) => Ok(OperationPlan::default()),
        }
    }
}
