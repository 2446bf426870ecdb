//! Dispatcher of the uniform voting operations to the realm's plugin

use {
    crate::{
        addresses::get_registrar_address,
        client::ProgramClient,
        dedupe::dedupe_by_key,
        error::VotingClientResult,
        plan::OperationPlan,
        plugin::{PluginContext, WeightPlugin, WeightPluginKind},
        power::{nft_voting_power, verified_collection_nfts},
        records::{self, get_nft_registrar, NftVoteRecord},
        state::{
            ProposalInfo, RealmInfo, StakePosition, TokenOwnerRecordInfo, VotingNft,
            WeightAction,
        },
    },
    log::debug,
    solana_sdk::{instruction::Instruction, pubkey::Pubkey},
    std::sync::Arc,
};

/// Voter credentials, set by the caller as they become known
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VoterState {
    pub voting_nfts: Vec<VotingNft>,
    pub stake_positions: Vec<StakePosition>,
    pub gateway_token: Option<Pubkey>,
    pub oracles: Vec<Pubkey>,
    pub weight_instructions: Vec<Instruction>,
}

/// Builds voting plans of one voter in one realm
pub struct VotingClient {
    client: Arc<dyn ProgramClient>,
    plugin: WeightPlugin,
    realm: RealmInfo,
    voter: Pubkey,
    state: VoterState,
}

impl VotingClient {
    pub fn new(
        client: Arc<dyn ProgramClient>,
        plugin: WeightPlugin,
        realm: RealmInfo,
        voter: Pubkey,
    ) -> Self {
        Self {
            client,
            plugin,
            realm,
            voter,
            state: VoterState::default(),
        }
    }

    pub fn plugin(&self) -> &WeightPlugin {
        &self.plugin
    }

    pub fn realm(&self) -> &RealmInfo {
        &self.realm
    }

    pub fn voter(&self) -> &Pubkey {
        &self.voter
    }

    pub fn state(&self) -> &VoterState {
        &self.state
    }

    /// Sets the held assets, repeated mints are dropped
    pub fn set_voting_nfts(&mut self, nfts: Vec<VotingNft>) {
        self.state.voting_nfts = dedupe_by_key(&nfts, |nft| nft.mint);
    }

    pub fn set_stake_positions(&mut self, positions: Vec<StakePosition>) {
        self.state.stake_positions = dedupe_by_key(&positions, |position| position.address);
    }

    pub fn set_gateway_token(&mut self, gateway_token: Option<Pubkey>) {
        self.state.gateway_token = gateway_token;
    }

    pub fn set_oracles(&mut self, oracles: Vec<Pubkey>) {
        self.state.oracles = oracles;
    }

    pub fn set_weight_instructions(&mut self, instructions: Vec<Instruction>) {
        self.state.weight_instructions = instructions;
    }

    fn context<'a>(&'a self, token_owner_record: &'a TokenOwnerRecordInfo) -> PluginContext<'a> {
        PluginContext {
            client: self.client.as_ref(),
            realm: &self.realm,
            voter: &self.voter,
            token_owner_record,
            state: &self.state,
        }
    }

    /// The plugin is only configured for the community mint, other mints vote by deposit
    fn uses_plugin(&self, governing_token_mint: &Pubkey) -> bool {
        if self.plugin.kind() == WeightPluginKind::None {
            return false;
        }
        if *governing_token_mint != self.realm.community_mint {
            debug!(
                "Mint {} is not governed by the {} plugin of realm {}",
                governing_token_mint,
                self.plugin.kind(),
                self.realm.address
            );
            return false;
        }
        true
    }

    /// Plan refreshing the voter weight record ahead of `action`
    pub async fn refresh_voter_weight(
        &self,
        token_owner_record: &TokenOwnerRecordInfo,
        action: WeightAction,
        target: Option<Pubkey>,
    ) -> VotingClientResult<OperationPlan> {
        if !self.uses_plugin(&token_owner_record.governing_token_mint) {
            return Ok(OperationPlan::default());
        }

        self.plugin
            .refresh_voter_weight(&self.context(token_owner_record), action, target)
            .await
    }

    /// Plan casting the plugin side of a vote, assets which already voted are skipped
    pub async fn cast_vote(
        &self,
        proposal: &ProposalInfo,
        token_owner_record: &TokenOwnerRecordInfo,
    ) -> VotingClientResult<OperationPlan> {
        if !self.uses_plugin(&token_owner_record.governing_token_mint)
            || !self.uses_plugin(&proposal.governing_token_mint)
        {
            return Ok(OperationPlan::default());
        }

        self.plugin
            .cast_vote(&self.context(token_owner_record), proposal)
            .await
    }

    /// Plan releasing the voter's vote records of `proposal`
    pub async fn relinquish_vote(
        &self,
        proposal: &ProposalInfo,
        vote_record: &Pubkey,
        token_owner_record: &TokenOwnerRecordInfo,
    ) -> VotingClientResult<OperationPlan> {
        if !self.uses_plugin(&token_owner_record.governing_token_mint)
            || !self.uses_plugin(&proposal.governing_token_mint)
        {
            return Ok(OperationPlan::default());
        }

        self.plugin
            .relinquish_vote(&self.context(token_owner_record), proposal, vote_record)
            .await
    }

    /// Vote records of `proposal`, only the NFT plugin keeps them as accounts
    pub async fn list_vote_records_for_proposal(
        &self,
        proposal: &Pubkey,
    ) -> VotingClientResult<Vec<NftVoteRecord>> {
        match &self.plugin {
            WeightPlugin::NftCollection(plugin) => {
                records::list_vote_records_for_proposal(
                    self.client.as_ref(),
                    &plugin.program_id,
                    proposal,
                )
                .await
            }
            _ => Ok(vec![]),
        }
    }

    /// Voting power of the held assets, None when the plugin computes it on chain only
    pub async fn voting_power(&self) -> VotingClientResult<Option<u64>> {
        match &self.plugin {
            WeightPlugin::NftCollection(plugin) => {
                let registrar = get_registrar_address(
                    &plugin.program_id,
                    &self.realm.address,
                    &self.realm.community_mint,
                );
                let registrar = get_nft_registrar(self.client.as_ref(), &registrar).await?;

                let collections: Vec<Pubkey> = registrar
                    .collection_configs
                    .iter()
                    .map(|config| config.collection)
                    .collect();
                let nfts = verified_collection_nfts(&self.state.voting_nfts, &collections);

                Ok(Some(nft_voting_power(&nfts, &registrar.collection_configs)))
            }
            _ => Ok(None),
        }
    }
}
