//! Oracle staking plugin
//!
//! The weight update is built by the staking program's own client, reached
//! through [`StakeConnection`].

use {
    super::PluginContext,
    crate::{
        client::ProgramClientResult,
        error::{CredentialKind, VotingClientError, VotingClientResult},
        plan::{OperationPlan, OracleStakeAccounts, PluginAccounts, PluginAddresses},
        state::WeightAction,
    },
    async_trait::async_trait,
    log::debug,
    solana_sdk::{instruction::Instruction, pubkey::Pubkey},
    std::{fmt, sync::Arc},
};

/// Weight update produced by the staking program client
#[derive(Clone, Debug, PartialEq)]
pub struct StakeVoterWeightUpdate {
    pub instructions: Vec<Instruction>,
    pub voter_weight_account: Pubkey,
    pub max_voter_weight_record: Option<Pubkey>,
}

/// Client of the oracle staking program
#[async_trait]
pub trait StakeConnection: Send + Sync {
    /// Main stake account of `owner`, None when the owner never staked
    async fn get_main_account(&self, owner: Pubkey) -> ProgramClientResult<Option<Pubkey>>;

    /// Builds the voter weight update of `stake_account`, scoped to `target` when given
    async fn update_voter_weight(
        &self,
        stake_account: Pubkey,
        action: WeightAction,
        target: Option<Pubkey>,
    ) -> ProgramClientResult<StakeVoterWeightUpdate>;
}

#[derive(Clone)]
pub struct OracleStakePlugin {
    pub program_id: Pubkey,
    pub stake_connection: Arc<dyn StakeConnection>,
}

impl fmt::Debug for OracleStakePlugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OracleStakePlugin")
            .field("program_id", &self.program_id)
            .finish()
    }
}

impl OracleStakePlugin {
    pub(crate) async fn refresh_voter_weight(
        &self,
        ctx: &PluginContext<'_>,
        action: WeightAction,
        target: Option<Pubkey>,
    ) -> VotingClientResult<OperationPlan> {
        let stake_account = self
            .stake_connection
            .get_main_account(*ctx.voter)
            .await
            .map_err(VotingClientError::Client)?
            .ok_or(VotingClientError::MissingCredential(CredentialKind::StakeAccount))?;

        let update = self
            .stake_connection
            .update_voter_weight(stake_account, action, target)
            .await
            .map_err(VotingClientError::Client)?;

        debug!(
            "Stake account {} voter weight update with {} instructions",
            stake_account,
            update.instructions.len()
        );

        Ok(OperationPlan::new(
            vec![],
            update.instructions,
            *ctx.voter,
            PluginAddresses {
                voter_weight: update.voter_weight_account,
                max_voter_weight: update.max_voter_weight_record,
                accounts: PluginAccounts::OracleStake(OracleStakeAccounts { stake_account }),
            },
        ))
    }
}
