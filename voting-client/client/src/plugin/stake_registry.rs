//! Stake registry voter weight plugin, voting power comes from locked positions

use {
    super::PluginContext,
    crate::{
        addresses::{
            find_max_voter_weight_record_address, get_nft_vote_record_address,
            get_stake_registrar_address, get_stake_voter_weight_record_address,
        },
        chunk::{
            item_chunks, item_first_then_chunks, MAX_POSITION_CAST_ACCOUNTS,
            MAX_POSITION_RELINQUISH_FIRST_BATCH, MAX_POSITION_WEIGHT_ACCOUNTS,
            MAX_RELINQUISH_ACCOUNTS,
        },
        error::VotingClientResult,
        instruction::{cast_vote_v0, relinquish_vote_v0, update_voter_weight_record_v0},
        plan::{OperationPlan, PluginAccounts, PluginAddresses, StakeRegistryAccounts},
        records::{get_unused_positions_for_proposal, get_used_positions_for_proposal},
        state::{ProposalInfo, StakePosition, WeightAction},
    },
    log::debug,
    solana_sdk::{instruction::AccountMeta, pubkey::Pubkey},
    spl_associated_token_account::get_associated_token_address,
};

const WEIGHT_ACCOUNTS_PER_POSITION: usize = 2;
const CAST_ACCOUNTS_PER_POSITION: usize = 3;
const RELINQUISH_ACCOUNTS_PER_POSITION: usize = 2;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StakeRegistryPlugin {
    pub program_id: Pubkey,
}

impl StakeRegistryPlugin {
    fn registrar(&self, ctx: &PluginContext<'_>) -> Pubkey {
        get_stake_registrar_address(
            &self.program_id,
            &ctx.realm.address,
            &ctx.realm.community_mint,
        )
    }

    fn addresses(
        &self,
        ctx: &PluginContext<'_>,
        registrar: Pubkey,
        positions: &[StakePosition],
    ) -> PluginAddresses {
        PluginAddresses {
            voter_weight: get_stake_voter_weight_record_address(
                &self.program_id,
                &registrar,
                ctx.voter,
            ),
            max_voter_weight: Some(
                find_max_voter_weight_record_address(
                    &self.program_id,
                    &ctx.realm.address,
                    &ctx.realm.community_mint,
                )
                .0,
            ),
            accounts: PluginAccounts::StakeRegistry(StakeRegistryAccounts {
                registrar,
                positions: positions.iter().map(|p| p.address).collect(),
            }),
        }
    }

    pub(crate) fn refresh_voter_weight(
        &self,
        ctx: &PluginContext<'_>,
        action: WeightAction,
    ) -> VotingClientResult<OperationPlan> {
        let registrar = self.registrar(ctx);

        let positions = &ctx.state.stake_positions;
        let positions = &positions
            [..positions.len().min(MAX_POSITION_WEIGHT_ACCOUNTS / WEIGHT_ACCOUNTS_PER_POSITION)];

        let remaining_accounts = positions
            .iter()
            .flat_map(|position| {
                vec![
                    AccountMeta::new_readonly(
                        get_associated_token_address(ctx.voter, &position.mint),
                        false,
                    ),
                    AccountMeta::new_readonly(position.address, false),
                ]
            })
            .collect();

        let addresses = self.addresses(ctx, registrar, positions);

        let update = update_voter_weight_record_v0(
            &self.program_id,
            &registrar,
            &addresses.voter_weight,
            &ctx.token_owner_record.address,
            remaining_accounts,
            ctx.voter,
            action,
        );

        Ok(OperationPlan::new(vec![], vec![update], *ctx.voter, addresses))
    }

    pub(crate) async fn cast_vote(
        &self,
        ctx: &PluginContext<'_>,
        proposal: &ProposalInfo,
    ) -> VotingClientResult<OperationPlan> {
        let registrar = self.registrar(ctx);

        let unused = get_unused_positions_for_proposal(
            ctx.client,
            &self.program_id,
            &proposal.address,
            &ctx.state.stake_positions,
        )
        .await?;

        let addresses = self.addresses(ctx, registrar, &unused);
        if unused.is_empty() {
            debug!(
                "Every position of {} already voted on proposal {}",
                ctx.voter, proposal.address
            );
            return Ok(OperationPlan::empty(Some(addresses)));
        }

        let cast_accounts: Vec<AccountMeta> = unused
            .iter()
            .flat_map(|position| {
                vec![
                    AccountMeta::new_readonly(
                        get_associated_token_address(ctx.voter, &position.mint),
                        false,
                    ),
                    AccountMeta::new(position.address, false),
                    AccountMeta::new(
                        get_nft_vote_record_address(
                            &self.program_id,
                            &proposal.address,
                            &position.mint,
                        ),
                        false,
                    ),
                ]
            })
            .collect();

        let max_voter_weight = find_max_voter_weight_record_address(
            &self.program_id,
            &ctx.realm.address,
            &ctx.realm.community_mint,
        )
        .0;
        let instructions = item_chunks(
            &cast_accounts,
            MAX_POSITION_CAST_ACCOUNTS,
            CAST_ACCOUNTS_PER_POSITION,
        )
        .into_iter()
        .map(|accounts| {
            cast_vote_v0(
                &self.program_id,
                &registrar,
                &ctx.token_owner_record.address,
                ctx.voter,
                &addresses.voter_weight,
                &max_voter_weight,
                accounts,
                &proposal.address,
            )
        })
        .collect();

        Ok(OperationPlan::new(
            vec![],
            instructions,
            *ctx.voter,
            addresses,
        ))
    }

    pub(crate) async fn relinquish_vote(
        &self,
        ctx: &PluginContext<'_>,
        proposal: &ProposalInfo,
        vote_record: &Pubkey,
    ) -> VotingClientResult<OperationPlan> {
        let registrar = self.registrar(ctx);

        let used = get_used_positions_for_proposal(
            ctx.client,
            &self.program_id,
            &proposal.address,
            &ctx.state.stake_positions,
        )
        .await?;

        let addresses = self.addresses(ctx, registrar, &used);
        if used.is_empty() {
            return Ok(OperationPlan::empty(Some(addresses)));
        }

        let relinquish_accounts: Vec<AccountMeta> = used
            .iter()
            .flat_map(|position| {
                vec![
                    AccountMeta::new(
                        get_nft_vote_record_address(
                            &self.program_id,
                            &proposal.address,
                            &position.mint,
                        ),
                        false,
                    ),
                    AccountMeta::new(position.address, false),
                ]
            })
            .collect();

        let instructions = item_first_then_chunks(
            &relinquish_accounts,
            MAX_POSITION_RELINQUISH_FIRST_BATCH,
            MAX_RELINQUISH_ACCOUNTS,
            RELINQUISH_ACCOUNTS_PER_POSITION,
        )
        .into_iter()
        .map(|accounts| {
            relinquish_vote_v0(
                &self.program_id,
                &registrar,
                &ctx.token_owner_record.address,
                &proposal.address,
                &proposal.governance,
                &addresses.voter_weight,
                vote_record,
                ctx.voter,
                ctx.voter,
                accounts,
            )
        })
        .collect();

        Ok(OperationPlan::new(
            vec![],
            instructions,
            *ctx.voter,
            addresses,
        ))
    }
}
