//! NFT collection voter weight plugin
//!
//! Every held asset first gets an action ticket, tickets are then consumed by
//! the weight update or the cast instruction.

use {
    super::PluginContext,
    crate::{
        addresses::{
            find_max_voter_weight_record_address, find_voter_weight_record_address,
            get_metadata_address, get_nft_action_ticket_address, get_nft_vote_record_address,
            get_registrar_address,
        },
        chunk::{
            assert_within_limit, first_then_chunks, item_chunks, MAX_CAST_VOTE_ACCOUNTS,
            MAX_NFTS_PER_WEIGHT_UPDATE, MAX_NFT_RELINQUISH_FIRST_BATCH, MAX_RELINQUISH_ACCOUNTS,
            MAX_TICKET_ACCOUNTS_PER_INSTRUCTION,
        },
        error::{VotingClientError, VotingClientResult},
        instruction::{
            cast_nft_vote, create_cnft_action_ticket, create_nft_action_ticket,
            relinquish_nft_vote, update_voter_weight_record, CompressedNftAssetParam,
        },
        plan::{NftCollectionAccounts, OperationPlan, PluginAccounts, PluginAddresses},
        records::{
            get_existing_records, list_vote_records_for_proposal, voter_weight_record_exists,
        },
        state::{ProposalInfo, VotingNft, WeightAction},
    },
    futures::future::try_join_all,
    log::{debug, warn},
    solana_sdk::{instruction::AccountMeta, instruction::Instruction, pubkey::Pubkey},
    spl_associated_token_account::get_associated_token_address,
    std::collections::HashSet,
};

/// Accounts per plain asset in create_nft_action_ticket
const TICKET_ACCOUNTS_PER_NFT: usize = 3;

/// Accounts per asset in cast_nft_vote
const CAST_ACCOUNTS_PER_NFT: usize = 2;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NftCollectionPlugin {
    pub program_id: Pubkey,
}

/// Ticket instructions and the tickets they create
struct ActionTickets {
    instructions: Vec<Instruction>,
    /// (asset mint, ticket) with plain assets first
    tickets: Vec<(Pubkey, Pubkey)>,
}

struct NftRecords {
    registrar: Pubkey,
    voter_weight_record: Pubkey,
    voter_weight_record_bump: u8,
    max_voter_weight_record: Pubkey,
    max_voter_weight_record_bump: u8,
}

impl NftRecords {
    fn addresses(&self, action_tickets: Vec<Pubkey>) -> PluginAddresses {
        PluginAddresses {
            voter_weight: self.voter_weight_record,
            max_voter_weight: Some(self.max_voter_weight_record),
            accounts: PluginAccounts::NftCollection(NftCollectionAccounts {
                registrar: self.registrar,
                voter_weight_record_bump: self.voter_weight_record_bump,
                max_voter_weight_record_bump: self.max_voter_weight_record_bump,
                action_tickets,
            }),
        }
    }
}

impl NftCollectionPlugin {
    fn records(&self, ctx: &PluginContext<'_>) -> NftRecords {
        let realm = &ctx.realm.address;
        let mint = &ctx.realm.community_mint;

        let (voter_weight_record, voter_weight_record_bump) =
            find_voter_weight_record_address(&self.program_id, realm, mint, ctx.voter);
        let (max_voter_weight_record, max_voter_weight_record_bump) =
            find_max_voter_weight_record_address(&self.program_id, realm, mint);

        NftRecords {
            registrar: get_registrar_address(&self.program_id, realm, mint),
            voter_weight_record,
            voter_weight_record_bump,
            max_voter_weight_record,
            max_voter_weight_record_bump,
        }
    }

    pub(crate) async fn refresh_voter_weight(
        &self,
        ctx: &PluginContext<'_>,
        action: WeightAction,
    ) -> VotingClientResult<OperationPlan> {
        let records = self.records(ctx);

        let nfts = &ctx.state.voting_nfts;
        let nfts = &nfts[..nfts.len().min(MAX_NFTS_PER_WEIGHT_UPDATE)];

        let tickets = self
            .create_action_tickets(ctx, &records, action, nfts)
            .await?;
        let ticket_addresses: Vec<Pubkey> = tickets.tickets.iter().map(|(_, t)| *t).collect();
        assert_within_limit(
            ticket_addresses.len(),
            MAX_NFTS_PER_WEIGHT_UPDATE,
            "update_voter_weight_record",
        );

        let update = update_voter_weight_record(
            &self.program_id,
            &records.registrar,
            &records.voter_weight_record,
            ctx.voter,
            &ticket_addresses,
            action,
        );

        Ok(OperationPlan::new(
            tickets.instructions,
            vec![update],
            *ctx.voter,
            records.addresses(ticket_addresses),
        ))
    }

    pub(crate) async fn cast_vote(
        &self,
        ctx: &PluginContext<'_>,
        proposal: &ProposalInfo,
    ) -> VotingClientResult<OperationPlan> {
        let records = self.records(ctx);

        let used: HashSet<Pubkey> =
            list_vote_records_for_proposal(ctx.client, &self.program_id, &proposal.address)
                .await?
                .into_iter()
                .map(|record| record.address)
                .collect();

        let unused: Vec<VotingNft> = ctx
            .state
            .voting_nfts
            .iter()
            .filter(|nft| {
                !used.contains(&get_nft_vote_record_address(
                    &self.program_id,
                    &proposal.address,
                    &nft.mint,
                ))
            })
            .cloned()
            .collect();

        if unused.is_empty() {
            debug!(
                "Every nft of {} already voted on proposal {}",
                ctx.voter, proposal.address
            );
            return Ok(OperationPlan::empty(Some(records.addresses(vec![]))));
        }

        let tickets = self
            .create_action_tickets(ctx, &records, WeightAction::CastVote, &unused)
            .await?;

        let cast_accounts: Vec<AccountMeta> = tickets
            .tickets
            .iter()
            .flat_map(|(mint, ticket)| {
                let vote_record =
                    get_nft_vote_record_address(&self.program_id, &proposal.address, mint);
                vec![
                    AccountMeta::new(*ticket, false),
                    AccountMeta::new(vote_record, false),
                ]
            })
            .collect();

        let cast_instructions = item_chunks(
            &cast_accounts,
            MAX_CAST_VOTE_ACCOUNTS,
            CAST_ACCOUNTS_PER_NFT,
        )
        .into_iter()
        .map(|accounts| {
            cast_nft_vote(
                &self.program_id,
                &records.registrar,
                &records.voter_weight_record,
                &ctx.token_owner_record.address,
                ctx.voter,
                ctx.voter,
                accounts,
                &proposal.address,
            )
        })
        .collect();

        let ticket_addresses = tickets.tickets.iter().map(|(_, t)| *t).collect();

        Ok(OperationPlan::new(
            tickets.instructions,
            cast_instructions,
            *ctx.voter,
            records.addresses(ticket_addresses),
        ))
    }

    /// Releases the voter's vote records of `proposal`
    ///
    /// Nothing is emitted when the voter holds no records, so the voter weight
    /// record is not reset by an instruction without remaining accounts.
    pub(crate) async fn relinquish_vote(
        &self,
        ctx: &PluginContext<'_>,
        proposal: &ProposalInfo,
        vote_record: &Pubkey,
    ) -> VotingClientResult<OperationPlan> {
        let records = self.records(ctx);

        let nft_vote_records: Vec<Pubkey> =
            list_vote_records_for_proposal(ctx.client, &self.program_id, &proposal.address)
                .await?
                .into_iter()
                .filter(|record| record.governing_token_owner == *ctx.voter)
                .map(|record| record.address)
                .collect();

        if !voter_weight_record_exists(ctx.client, &self.program_id, &records.voter_weight_record)
            .await?
        {
            warn!(
                "Voter weight record {} not found, nothing to relinquish",
                records.voter_weight_record
            );
            return Ok(OperationPlan::empty(Some(records.addresses(vec![]))));
        }

        if nft_vote_records.is_empty() {
            return Ok(OperationPlan::empty(Some(records.addresses(vec![]))));
        }

        let instructions = first_then_chunks(
            &nft_vote_records,
            MAX_NFT_RELINQUISH_FIRST_BATCH,
            MAX_RELINQUISH_ACCOUNTS,
        )
        .iter()
        .map(|chunk| {
            relinquish_nft_vote(
                &self.program_id,
                &records.registrar,
                &records.voter_weight_record,
                &proposal.governance,
                &proposal.address,
                &ctx.token_owner_record.address,
                ctx.voter,
                vote_record,
                ctx.voter,
                chunk,
            )
        })
        .collect();

        Ok(OperationPlan::new(
            vec![],
            instructions,
            *ctx.voter,
            records.addresses(vec![]),
        ))
    }

    async fn create_action_tickets(
        &self,
        ctx: &PluginContext<'_>,
        records: &NftRecords,
        action: WeightAction,
        nfts: &[VotingNft],
    ) -> VotingClientResult<ActionTickets> {
        let (compressed, plain): (Vec<&VotingNft>, Vec<&VotingNft>) =
            nfts.iter().partition(|nft| nft.is_compressed());

        let ticket_of = |mint: &Pubkey| {
            get_nft_action_ticket_address(
                &self.program_id,
                action,
                &records.registrar,
                ctx.voter,
                mint,
            )
        };

        // Plain assets first, matching the order of the ticket instructions
        let tickets: Vec<(Pubkey, Pubkey)> = plain
            .iter()
            .chain(compressed.iter())
            .map(|nft| (nft.mint, ticket_of(&nft.mint)))
            .collect();

        // Tickets created by an earlier attempt of the same plan are reused
        let ticket_addresses: Vec<Pubkey> = tickets.iter().map(|(_, ticket)| *ticket).collect();
        let existing =
            get_existing_records(ctx.client, &self.program_id, &ticket_addresses).await?;
        let (plain, compressed): (Vec<&VotingNft>, Vec<&VotingNft>) = (
            plain
                .into_iter()
                .filter(|nft| !existing.contains(&ticket_of(&nft.mint)))
                .collect(),
            compressed
                .into_iter()
                .filter(|nft| !existing.contains(&ticket_of(&nft.mint)))
                .collect(),
        );

        let mut instructions = vec![];

        let metadata = self.get_metadata_addresses(ctx, &plain).await?;
        let mut ticket_accounts = vec![];
        for (nft, metadata) in plain.iter().zip(metadata) {
            let ticket = ticket_of(&nft.mint);
            ticket_accounts.extend([
                AccountMeta::new_readonly(
                    get_associated_token_address(ctx.voter, &nft.mint),
                    false,
                ),
                AccountMeta::new_readonly(metadata, false),
                AccountMeta::new(ticket, false),
            ]);
        }

        for accounts in item_chunks(
            &ticket_accounts,
            MAX_TICKET_ACCOUNTS_PER_INSTRUCTION,
            TICKET_ACCOUNTS_PER_NFT,
        ) {
            instructions.push(create_nft_action_ticket(
                &self.program_id,
                &records.registrar,
                &records.voter_weight_record,
                ctx.voter,
                ctx.voter,
                accounts,
                action,
            ));
        }

        let proofs = try_join_all(
            compressed
                .iter()
                .map(|nft| ctx.client.get_asset_proof(nft.mint)),
        )
        .await
        .map_err(VotingClientError::Client)?;

        for (nft, proof) in compressed.iter().zip(proofs) {
            let compression = nft
                .compression
                .as_ref()
                .ok_or(VotingClientError::InvalidAccountData(nft.mint))?;
            let ticket = ticket_of(&nft.mint);

            let param = CompressedNftAssetParam {
                root: proof.root,
                data_hash: compression.data_hash,
                creator_hash: compression.creator_hash,
                nonce: compression.leaf_id,
                index: u32::try_from(compression.leaf_id)
                    .map_err(|_| VotingClientError::InvalidAccountData(nft.mint))?,
                proof_len: u8::try_from(proof.proof.len())
                    .map_err(|_| VotingClientError::InvalidAccountData(nft.mint))?,
            };

            let mut accounts = vec![AccountMeta::new_readonly(proof.tree_id, false)];
            accounts.extend(
                proof
                    .proof
                    .iter()
                    .map(|node| AccountMeta::new_readonly(*node, false)),
            );
            accounts.push(AccountMeta::new(ticket, false));

            instructions.push(create_cnft_action_ticket(
                &self.program_id,
                &records.registrar,
                &records.voter_weight_record,
                ctx.voter,
                accounts,
                action,
                vec![param],
            ));
        }

        debug!(
            "{} action tickets for {} of {}, {} already created",
            tickets.len(),
            action,
            ctx.voter,
            existing.len()
        );

        Ok(ActionTickets {
            instructions,
            tickets,
        })
    }

    async fn get_metadata_addresses(
        &self,
        ctx: &PluginContext<'_>,
        nfts: &[&VotingNft],
    ) -> VotingClientResult<Vec<Pubkey>> {
        if nfts.is_empty() {
            return Ok(vec![]);
        }

        let addresses: Vec<Pubkey> = nfts
            .iter()
            .map(|nft| get_metadata_address(&nft.mint))
            .collect();

        let accounts = ctx
            .client
            .get_multiple_accounts(&addresses)
            .await
            .map_err(VotingClientError::Client)?;

        addresses
            .into_iter()
            .zip(accounts)
            .map(|(address, account)| {
                account
                    .map(|_| address)
                    .ok_or(VotingClientError::AccountNotFound(address))
            })
            .collect()
    }
}
