//! Queue oracle addin, the weight instruction is pre-built by the oracle

use {
    super::PluginContext,
    crate::{
        addresses::get_queue_voter_weight_record_address,
        error::{CredentialKind, VotingClientError, VotingClientResult},
        plan::{OperationPlan, PluginAccounts, PluginAddresses, QueueOracleAccounts},
    },
    solana_sdk::pubkey::Pubkey,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueueOraclePlugin {
    pub program_id: Pubkey,
}

impl QueueOraclePlugin {
    pub(crate) fn refresh_voter_weight(
        &self,
        ctx: &PluginContext<'_>,
    ) -> VotingClientResult<OperationPlan> {
        let oracle = *ctx
            .state
            .oracles
            .first()
            .ok_or(VotingClientError::MissingCredential(CredentialKind::QueueOracle))?;

        let instruction = ctx
            .state
            .weight_instructions
            .first()
            .cloned()
            .ok_or(VotingClientError::MissingCredential(
                CredentialKind::OracleWeightInstruction,
            ))?;

        Ok(OperationPlan::new(
            vec![],
            vec![instruction],
            *ctx.voter,
            PluginAddresses {
                voter_weight: get_queue_voter_weight_record_address(&self.program_id, &oracle),
                max_voter_weight: None,
                accounts: PluginAccounts::QueueOracle(QueueOracleAccounts { oracle }),
            },
        ))
    }
}
