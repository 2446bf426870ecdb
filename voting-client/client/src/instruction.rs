//! Instructions of the voter weight plugin programs
//!
//! The plugins are Anchor programs: instruction data starts with
//! sha256("global:<instruction name>")[..8] followed by the borsh encoded args.

use {
    crate::{addresses::spl_account_compression, state::WeightAction},
    borsh::BorshSerialize,
    solana_sdk::{
        hash::hash,
        instruction::{AccountMeta, Instruction},
        pubkey::Pubkey,
        system_program,
    },
};

/// Leaf of a compressed asset as checked by create_cnft_action_ticket
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize)]
pub struct CompressedNftAssetParam {
    pub root: [u8; 32],
    pub data_hash: [u8; 32],
    pub creator_hash: [u8; 32],
    pub nonce: u64,
    pub index: u32,
    pub proof_len: u8,
}

fn instruction_data(name: &str) -> Vec<u8> {
    hash(format!("global:{}", name).as_bytes()).to_bytes()[..8].to_vec()
}

fn with_args<T: BorshSerialize>(mut data: Vec<u8>, args: &T) -> Vec<u8> {
    args.serialize(&mut data).unwrap();
    data
}

/// Creates CreateNftActionTicket instruction
///
///   0. `[]` Registrar
///   1. `[]` VoterWeightRecord
///   2. `[signer]` Voter authority
///   3. `[signer, writable]` Payer
///   4. `[]` System program
///   5. .. Per asset: `[]` token account, `[]` metadata, `[writable]` ticket
pub fn create_nft_action_ticket(
    program_id: &Pubkey,
    // Accounts
    registrar: &Pubkey,
    voter_weight_record: &Pubkey,
    voter_authority: &Pubkey,
    payer: &Pubkey,
    remaining_accounts: Vec<AccountMeta>,
    // Args
    action: WeightAction,
) -> Instruction {
    let mut accounts = vec![
        AccountMeta::new_readonly(*registrar, false),
        AccountMeta::new_readonly(*voter_weight_record, false),
        AccountMeta::new_readonly(*voter_authority, true),
        AccountMeta::new(*payer, true),
        AccountMeta::new_readonly(system_program::id(), false),
    ];
    accounts.extend(remaining_accounts);

    Instruction {
        program_id: *program_id,
        accounts,
        data: with_args(instruction_data("create_nft_action_ticket"), &action),
    }
}

/// Creates CreateCnftActionTicket instruction
///
///   0. `[]` Registrar
///   1. `[]` VoterWeightRecord
///   2. `[signer, writable]` Payer
///   3. `[]` Account compression program
///   4. `[]` System program
///   5. .. Merkle tree, proof nodes, `[writable]` ticket
pub fn create_cnft_action_ticket(
    program_id: &Pubkey,
    // Accounts
    registrar: &Pubkey,
    voter_weight_record: &Pubkey,
    payer: &Pubkey,
    remaining_accounts: Vec<AccountMeta>,
    // Args
    action: WeightAction,
    params: Vec<CompressedNftAssetParam>,
) -> Instruction {
    let mut accounts = vec![
        AccountMeta::new_readonly(*registrar, false),
        AccountMeta::new_readonly(*voter_weight_record, false),
        AccountMeta::new(*payer, true),
        AccountMeta::new_readonly(spl_account_compression::id(), false),
        AccountMeta::new_readonly(system_program::id(), false),
    ];
    accounts.extend(remaining_accounts);

    let data = with_args(instruction_data("create_cnft_action_ticket"), &action);

    Instruction {
        program_id: *program_id,
        accounts,
        data: with_args(data, &params),
    }
}

/// Creates UpdateVoterWeightRecord instruction of the NFT plugin
///
///   0. `[]` Registrar
///   1. `[writable]` VoterWeightRecord
///   2. `[signer, writable]` Payer
///   3. .. `[writable]` action tickets
pub fn update_voter_weight_record(
    program_id: &Pubkey,
    // Accounts
    registrar: &Pubkey,
    voter_weight_record: &Pubkey,
    payer: &Pubkey,
    action_tickets: &[Pubkey],
    // Args
    action: WeightAction,
) -> Instruction {
    let mut accounts = vec![
        AccountMeta::new_readonly(*registrar, false),
        AccountMeta::new(*voter_weight_record, false),
        AccountMeta::new(*payer, true),
    ];
    accounts.extend(
        action_tickets
            .iter()
            .map(|ticket| AccountMeta::new(*ticket, false)),
    );

    Instruction {
        program_id: *program_id,
        accounts,
        data: with_args(instruction_data("update_voter_weight_record"), &action),
    }
}

/// Creates CastNftVote instruction
///
///   0. `[]` Registrar
///   1. `[writable]` VoterWeightRecord
///   2. `[]` Voter TokenOwnerRecord
///   3. `[signer]` Voter authority
///   4. `[signer, writable]` Payer
///   5. `[]` System program
///   6. .. Per asset: `[writable]` ticket, `[writable]` vote record
#[allow(clippy::too_many_arguments)]
pub fn cast_nft_vote(
    program_id: &Pubkey,
    // Accounts
    registrar: &Pubkey,
    voter_weight_record: &Pubkey,
    voter_token_owner_record: &Pubkey,
    voter_authority: &Pubkey,
    payer: &Pubkey,
    remaining_accounts: Vec<AccountMeta>,
    // Args
    proposal: &Pubkey,
) -> Instruction {
    let mut accounts = vec![
        AccountMeta::new_readonly(*registrar, false),
        AccountMeta::new(*voter_weight_record, false),
        AccountMeta::new_readonly(*voter_token_owner_record, false),
        AccountMeta::new_readonly(*voter_authority, true),
        AccountMeta::new(*payer, true),
        AccountMeta::new_readonly(system_program::id(), false),
    ];
    accounts.extend(remaining_accounts);

    Instruction {
        program_id: *program_id,
        accounts,
        data: with_args(instruction_data("cast_nft_vote"), proposal),
    }
}

/// Creates RelinquishNftVote instruction
///
///   0. `[]` Registrar
///   1. `[writable]` VoterWeightRecord
///   2. `[]` Governance
///   3. `[]` Proposal
///   4. `[]` Voter TokenOwnerRecord
///   5. `[signer]` Voter authority
///   6. `[]` Governance VoteRecord
///   7. `[writable]` Beneficiary
///   8. .. `[writable]` nft vote records
#[allow(clippy::too_many_arguments)]
pub fn relinquish_nft_vote(
    program_id: &Pubkey,
    // Accounts
    registrar: &Pubkey,
    voter_weight_record: &Pubkey,
    governance: &Pubkey,
    proposal: &Pubkey,
    voter_token_owner_record: &Pubkey,
    voter_authority: &Pubkey,
    vote_record: &Pubkey,
    beneficiary: &Pubkey,
    nft_vote_records: &[Pubkey],
) -> Instruction {
    let mut accounts = vec![
        AccountMeta::new_readonly(*registrar, false),
        AccountMeta::new(*voter_weight_record, false),
        AccountMeta::new_readonly(*governance, false),
        AccountMeta::new_readonly(*proposal, false),
        AccountMeta::new_readonly(*voter_token_owner_record, false),
        AccountMeta::new_readonly(*voter_authority, true),
        AccountMeta::new_readonly(*vote_record, false),
        AccountMeta::new(*beneficiary, false),
    ];
    accounts.extend(
        nft_vote_records
            .iter()
            .map(|record| AccountMeta::new(*record, false)),
    );

    Instruction {
        program_id: *program_id,
        accounts,
        data: instruction_data("relinquish_nft_vote"),
    }
}

#[derive(BorshSerialize)]
struct UpdateVoterWeightRecordArgsV0 {
    owner: Pubkey,
    voter_weight_action: WeightAction,
}

#[derive(BorshSerialize)]
struct CastVoteArgsV0 {
    proposal: Pubkey,
    owner: Pubkey,
}

/// Creates UpdateVoterWeightRecordV0 instruction of the stake registry
///
///   0. `[]` Registrar
///   1. `[writable]` VoterWeightRecord
///   2. `[]` Voter TokenOwnerRecord
///   3. .. Per position: `[]` token account, `[]` position
pub fn update_voter_weight_record_v0(
    program_id: &Pubkey,
    // Accounts
    registrar: &Pubkey,
    voter_weight_record: &Pubkey,
    voter_token_owner_record: &Pubkey,
    remaining_accounts: Vec<AccountMeta>,
    // Args
    owner: &Pubkey,
    action: WeightAction,
) -> Instruction {
    let mut accounts = vec![
        AccountMeta::new_readonly(*registrar, false),
        AccountMeta::new(*voter_weight_record, false),
        AccountMeta::new_readonly(*voter_token_owner_record, false),
    ];
    accounts.extend(remaining_accounts);

    let args = UpdateVoterWeightRecordArgsV0 {
        owner: *owner,
        voter_weight_action: action,
    };

    Instruction {
        program_id: *program_id,
        accounts,
        data: with_args(instruction_data("update_voter_weight_record_v0"), &args),
    }
}

/// Creates CastVoteV0 instruction of the stake registry
///
///   0. `[]` Registrar
///   1. `[]` Voter TokenOwnerRecord
///   2. `[signer, writable]` Voter authority and payer
///   3. `[writable]` VoterWeightRecord
///   4. `[writable]` MaxVoterWeightRecord
///   5. `[]` Proposal
///   6. `[]` System program
///   7. .. Per position: `[]` token account, `[writable]` position, `[writable]` vote record
#[allow(clippy::too_many_arguments)]
pub fn cast_vote_v0(
    program_id: &Pubkey,
    // Accounts
    registrar: &Pubkey,
    voter_token_owner_record: &Pubkey,
    voter_authority: &Pubkey,
    voter_weight_record: &Pubkey,
    max_voter_weight_record: &Pubkey,
    remaining_accounts: Vec<AccountMeta>,
    // Args
    proposal: &Pubkey,
) -> Instruction {
    let mut accounts = vec![
        AccountMeta::new_readonly(*registrar, false),
        AccountMeta::new_readonly(*voter_token_owner_record, false),
        AccountMeta::new(*voter_authority, true),
        AccountMeta::new(*voter_weight_record, false),
        AccountMeta::new(*max_voter_weight_record, false),
        AccountMeta::new_readonly(*proposal, false),
        AccountMeta::new_readonly(system_program::id(), false),
    ];
    accounts.extend(remaining_accounts);

    let args = CastVoteArgsV0 {
        proposal: *proposal,
        owner: *voter_authority,
    };

    Instruction {
        program_id: *program_id,
        accounts,
        data: with_args(instruction_data("cast_vote_v0"), &args),
    }
}

/// Creates RelinquishVoteV0 instruction of the stake registry
///
///   0. `[]` Registrar
///   1. `[]` Voter TokenOwnerRecord
///   2. `[]` Proposal
///   3. `[]` Governance
///   4. `[writable]` VoterWeightRecord
///   5. `[]` Governance VoteRecord
///   6. `[signer]` Voter authority
///   7. `[writable]` Beneficiary
///   8. .. Per position: `[writable]` vote record, `[writable]` position
#[allow(clippy::too_many_arguments)]
pub fn relinquish_vote_v0(
    program_id: &Pubkey,
    // Accounts
    registrar: &Pubkey,
    voter_token_owner_record: &Pubkey,
    proposal: &Pubkey,
    governance: &Pubkey,
    voter_weight_record: &Pubkey,
    vote_record: &Pubkey,
    voter_authority: &Pubkey,
    beneficiary: &Pubkey,
    remaining_accounts: Vec<AccountMeta>,
) -> Instruction {
    let mut accounts = vec![
        AccountMeta::new_readonly(*registrar, false),
        AccountMeta::new_readonly(*voter_token_owner_record, false),
        AccountMeta::new_readonly(*proposal, false),
        AccountMeta::new_readonly(*governance, false),
        AccountMeta::new(*voter_weight_record, false),
        AccountMeta::new_readonly(*vote_record, false),
        AccountMeta::new_readonly(*voter_authority, true),
        AccountMeta::new(*beneficiary, false),
    ];
    accounts.extend(remaining_accounts);

    Instruction {
        program_id: *program_id,
        accounts,
        data: instruction_data("relinquish_vote_v0"),
    }
}

/// Creates UpdateVoterWeightRecord instruction of the gateway plugin
///
///   0. `[]` Registrar
///   1. `[]` Input voter weight: the predecessor plugin's VoterWeightRecord or the TokenOwnerRecord
///   2. `[]` Gateway token
///   3. `[writable]` VoterWeightRecord
pub fn update_gateway_voter_weight_record(
    program_id: &Pubkey,
    registrar: &Pubkey,
    input_voter_weight: &Pubkey,
    gateway_token: &Pubkey,
    voter_weight_record: &Pubkey,
) -> Instruction {
    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new_readonly(*registrar, false),
            AccountMeta::new_readonly(*input_voter_weight, false),
            AccountMeta::new_readonly(*gateway_token, false),
            AccountMeta::new(*voter_weight_record, false),
        ],
        data: instruction_data("update_voter_weight_record"),
    }
}
