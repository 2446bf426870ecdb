//! Operation plans handed to the submitter

use {
    crate::chunk::SequenceType,
    solana_sdk::{instruction::Instruction, pubkey::Pubkey},
};

/// Instructions submitted together
#[derive(Clone, Debug, PartialEq)]
pub struct OperationBatch {
    pub instructions: Vec<Instruction>,
    pub sequence_type: SequenceType,
}

impl OperationBatch {
    pub fn sequential(instructions: Vec<Instruction>) -> Self {
        Self {
            instructions,
            sequence_type: SequenceType::Sequential,
        }
    }

    pub fn parallel(instructions: Vec<Instruction>) -> Self {
        Self {
            instructions,
            sequence_type: SequenceType::Parallel,
        }
    }
}

/// Accounts of the NFT plugin used by an action
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NftCollectionAccounts {
    pub registrar: Pubkey,
    pub voter_weight_record_bump: u8,
    pub max_voter_weight_record_bump: u8,
    /// Tickets created by the plan, in instruction order
    pub action_tickets: Vec<Pubkey>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StakeRegistryAccounts {
    pub registrar: Pubkey,
    /// Positions referenced by the plan
    pub positions: Vec<Pubkey>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GatewayIdentityAccounts {
    pub registrar: Pubkey,
    pub gateway_token: Pubkey,
    pub input_voter_weight: Pubkey,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OracleStakeAccounts {
    pub stake_account: Pubkey,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueueOracleAccounts {
    pub oracle: Pubkey,
}

/// Plugin specific accounts, one variant per adapter
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PluginAccounts {
    NftCollection(NftCollectionAccounts),
    StakeRegistry(StakeRegistryAccounts),
    GatewayIdentity(GatewayIdentityAccounts),
    OracleStake(OracleStakeAccounts),
    QueueOracle(QueueOracleAccounts),
}

/// Records the governance instruction must reference
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PluginAddresses {
    pub voter_weight: Pubkey,
    pub max_voter_weight: Option<Pubkey>,
    pub accounts: PluginAccounts,
}

/// Ordered batches building up a governance action
///
/// Parallel batches come first and may be submitted in any order, the
/// Sequential batches follow and must be submitted in the order given.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OperationPlan {
    pub batches: Vec<OperationBatch>,
    pub signers: Vec<Pubkey>,
    pub addresses: Option<PluginAddresses>,
}

impl OperationPlan {
    /// Plan with no batches, the plugin has nothing to contribute
    pub fn empty(addresses: Option<PluginAddresses>) -> Self {
        Self {
            batches: vec![],
            signers: vec![],
            addresses,
        }
    }

    pub fn new(
        parallel: Vec<Instruction>,
        sequential: Vec<Instruction>,
        signer: Pubkey,
        addresses: PluginAddresses,
    ) -> Self {
        let mut batches: Vec<OperationBatch> = parallel
            .into_iter()
            .map(|instruction| OperationBatch::parallel(vec![instruction]))
            .collect();

        if !sequential.is_empty() {
            batches.push(OperationBatch::sequential(sequential));
        }

        let signers = if batches.is_empty() {
            vec![]
        } else {
            vec![signer]
        };

        Self {
            batches,
            signers,
            addresses: Some(addresses),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    pub fn voter_weight(&self) -> Option<Pubkey> {
        self.addresses.as_ref().map(|a| a.voter_weight)
    }

    pub fn max_voter_weight(&self) -> Option<Pubkey> {
        self.addresses.as_ref().and_then(|a| a.max_voter_weight)
    }

    pub fn parallel_batches(&self) -> impl Iterator<Item = &OperationBatch> {
        self.batches
            .iter()
            .filter(|batch| batch.sequence_type == SequenceType::Parallel)
    }

    pub fn sequential_batches(&self) -> impl Iterator<Item = &OperationBatch> {
        self.batches
            .iter()
            .filter(|batch| batch.sequence_type == SequenceType::Sequential)
    }

    /// All instructions in submission order
    pub fn instructions(&self) -> impl Iterator<Item = &Instruction> {
        self.batches.iter().flat_map(|batch| batch.instructions.iter())
    }
}
