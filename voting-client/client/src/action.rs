//! Composition of a plugin plan with the governance instructions of an action

use {
    crate::{
        chunk::chunks,
        dedupe::dedupe,
        plan::{OperationBatch, OperationPlan},
        state::{ProposalInfo, RealmInfo, TokenOwnerRecordInfo},
    },
    solana_sdk::{instruction::Instruction, pubkey::Pubkey},
    spl_governance::{
        instruction::{cast_vote, relinquish_vote},
        state::vote_record::Vote,
    },
};

/// Instructions per prerequisite and follow up batch unless requested lower
pub const DEFAULT_CHUNK_BY: usize = 2;

/// Builds the plan of a governance action (create proposal, create governance, vote...)
///
/// Batches are laid out as:
///   1. the plugin's Parallel ticket batches
///   2. prerequisite instructions, deduplicated, `chunk_by` per Sequential batch
///   3. one Sequential batch: leading instructions, plugin weight instructions,
///      governance instructions
///   4. follow up instructions, `chunk_by` per Sequential batch
#[derive(Clone, Debug, Default)]
pub struct GovernanceActionBuilder {
    plugin_plan: OperationPlan,
    prerequisites: Vec<Instruction>,
    leading: Vec<Instruction>,
    instructions: Vec<Instruction>,
    follow_ups: Vec<Instruction>,
    signers: Vec<Pubkey>,
    chunk_by: Option<usize>,
}

impl GovernanceActionBuilder {
    pub fn new(plugin_plan: OperationPlan) -> Self {
        Self {
            plugin_plan,
            ..Self::default()
        }
    }

    /// Adds instructions which must land before the action, with their signers
    pub fn with_prerequisites(mut self, instructions: Vec<Instruction>, signers: &[Pubkey]) -> Self {
        self.prerequisites.extend(instructions);
        self.signers.extend_from_slice(signers);
        self
    }

    /// Adds an instruction placed ahead of the plugin weight instructions
    pub fn with_leading_instruction(mut self, instruction: Instruction) -> Self {
        self.leading.push(instruction);
        self
    }

    pub fn with_instruction(mut self, instruction: Instruction) -> Self {
        self.instructions.push(instruction);
        self
    }

    /// Adds instructions submitted after the action, e.g. inserted transactions or sign off
    pub fn with_follow_ups(mut self, instructions: Vec<Instruction>) -> Self {
        self.follow_ups.extend(instructions);
        self
    }

    pub fn with_signer(mut self, signer: &Pubkey) -> Self {
        self.signers.push(*signer);
        self
    }

    /// Requests `chunk_by` instructions per batch, the lowest request wins
    pub fn chunk_by(mut self, chunk_by: usize) -> Self {
        self.chunk_by = Some(self.chunk_by.map_or(chunk_by, |current| current.min(chunk_by)));
        self
    }

    pub fn build(self) -> OperationPlan {
        let chunk_by = self.chunk_by.unwrap_or(DEFAULT_CHUNK_BY);

        let mut batches: Vec<OperationBatch> =
            self.plugin_plan.parallel_batches().cloned().collect();

        batches.extend(
            chunks(&dedupe(&self.prerequisites), chunk_by)
                .into_iter()
                .map(OperationBatch::sequential),
        );

        let mut main = self.leading;
        main.extend(
            self.plugin_plan
                .sequential_batches()
                .flat_map(|batch| batch.instructions.iter().cloned()),
        );
        main.extend(self.instructions);
        if !main.is_empty() {
            batches.push(OperationBatch::sequential(main));
        }

        batches.extend(
            chunks(&self.follow_ups, chunk_by)
                .into_iter()
                .map(OperationBatch::sequential),
        );

        let mut signers = self.plugin_plan.signers;
        signers.extend(self.signers);

        OperationPlan {
            batches,
            signers: dedupe(&signers),
            addresses: self.plugin_plan.addresses,
        }
    }
}

/// Plan casting `vote` on `proposal` with the records of `plugin_plan`
pub fn cast_vote_plan(
    realm: &RealmInfo,
    proposal: &ProposalInfo,
    voter_token_owner_record: &TokenOwnerRecordInfo,
    voter: &Pubkey,
    vote: Vote,
    plugin_plan: OperationPlan,
) -> OperationPlan {
    let instruction = cast_vote(
        &realm.governance_program_id,
        &realm.address,
        &proposal.governance,
        &proposal.address,
        &proposal.token_owner_record,
        &voter_token_owner_record.address,
        voter,
        &proposal.governing_token_mint,
        voter,
        plugin_plan.voter_weight(),
        plugin_plan.max_voter_weight(),
        vote,
    );

    GovernanceActionBuilder::new(plugin_plan)
        .with_instruction(instruction)
        .with_signer(voter)
        .build()
}

/// Plan relinquishing the vote of `voter_token_owner_record` on `proposal`
///
/// The governance vote is released first, the plugin records after it.
pub fn relinquish_vote_plan(
    realm: &RealmInfo,
    proposal: &ProposalInfo,
    voter_token_owner_record: &TokenOwnerRecordInfo,
    voter: &Pubkey,
    plugin_plan: OperationPlan,
) -> OperationPlan {
    let instruction = relinquish_vote(
        &realm.governance_program_id,
        &realm.address,
        &proposal.governance,
        &proposal.address,
        &voter_token_owner_record.address,
        &proposal.governing_token_mint,
        Some(*voter),
        Some(*voter),
    );

    GovernanceActionBuilder::new(plugin_plan)
        .with_leading_instruction(instruction)
        .with_signer(voter)
        .build()
}
