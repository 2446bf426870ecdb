//! Gateway identity plugin, voting power is gated by a gateway token

use {
    super::PluginContext,
    crate::{
        addresses::{find_voter_weight_record_address, get_registrar_address},
        error::{CredentialKind, VotingClientError, VotingClientResult},
        instruction::update_gateway_voter_weight_record,
        plan::{GatewayIdentityAccounts, OperationPlan, PluginAccounts, PluginAddresses},
    },
    solana_sdk::pubkey::Pubkey,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GatewayIdentityPlugin {
    pub program_id: Pubkey,
    /// Plugin whose voter weight record feeds this one, when chained
    pub previous_voter_weight_program_id: Option<Pubkey>,
}

impl GatewayIdentityPlugin {
    pub(crate) fn refresh_voter_weight(
        &self,
        ctx: &PluginContext<'_>,
    ) -> VotingClientResult<OperationPlan> {
        let gateway_token = ctx
            .state
            .gateway_token
            .ok_or(VotingClientError::MissingCredential(CredentialKind::GatewayToken))?;

        let realm = &ctx.realm.address;
        let mint = &ctx.realm.community_mint;

        let registrar = get_registrar_address(&self.program_id, realm, mint);
        let (voter_weight_record, _) =
            find_voter_weight_record_address(&self.program_id, realm, mint, ctx.voter);

        let input_voter_weight = match self.previous_voter_weight_program_id {
            Some(previous_program_id) => {
                find_voter_weight_record_address(&previous_program_id, realm, mint, ctx.voter).0
            }
            None => ctx.token_owner_record.address,
        };

        let update = update_gateway_voter_weight_record(
            &self.program_id,
            &registrar,
            &input_voter_weight,
            &gateway_token,
            &voter_weight_record,
        );

        Ok(OperationPlan::new(
            vec![],
            vec![update],
            *ctx.voter,
            PluginAddresses {
                voter_weight: voter_weight_record,
                max_voter_weight: None,
                accounts: PluginAccounts::GatewayIdentity(GatewayIdentityAccounts {
                    registrar,
                    gateway_token,
                    input_voter_weight,
                }),
            },
        ))
    }
}
