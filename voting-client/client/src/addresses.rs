//! Program derived addresses of the voter weight plugin accounts

use {crate::state::WeightAction, solana_sdk::pubkey::Pubkey};

/// Seed prefix for registrar accounts
pub const REGISTRAR_SEED: &[u8] = b"registrar";

/// Seed prefix for VoterWeightRecord accounts
pub const VOTER_WEIGHT_RECORD_SEED: &[u8] = b"voter-weight-record";

/// Seed prefix for MaxVoterWeightRecord accounts
pub const MAX_VOTER_WEIGHT_RECORD_SEED: &[u8] = b"max-voter-weight-record";

/// Seed prefix for per asset vote records
pub const NFT_VOTE_RECORD_SEED: &[u8] = b"nft-vote-record";

/// Seed prefix of the queue oracle addin VoterWeightRecord
pub const QUEUE_VOTER_WEIGHT_RECORD_SEED: &[u8] = b"VoterWeightRecord";

/// Seed prefix of Metaplex token metadata accounts
pub const METADATA_SEED: &[u8] = b"metadata";

/// Metaplex token metadata program
pub mod mpl_token_metadata {
    solana_sdk::declare_id!("metaqbxxUerdq28cj1RbAWkYQm3ybzjb6a8bt518x1s");
}

/// SPL account compression program
pub mod spl_account_compression {
    solana_sdk::declare_id!("cmtDvXumGCrqC1Age74AVPhSRVXJMd8PJS91L8KbNCK");
}

/// Returns plugin Registrar PDA seeds
pub fn get_registrar_address_seeds<'a>(
    realm: &'a Pubkey,
    governing_token_mint: &'a Pubkey,
) -> [&'a [u8]; 3] {
    [
        REGISTRAR_SEED,
        realm.as_ref(),
        governing_token_mint.as_ref(),
    ]
}

/// Returns plugin Registrar PDA address and bump
pub fn find_registrar_address(
    program_id: &Pubkey,
    realm: &Pubkey,
    governing_token_mint: &Pubkey,
) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &get_registrar_address_seeds(realm, governing_token_mint),
        program_id,
    )
}

/// Returns plugin Registrar PDA address
pub fn get_registrar_address(
    program_id: &Pubkey,
    realm: &Pubkey,
    governing_token_mint: &Pubkey,
) -> Pubkey {
    find_registrar_address(program_id, realm, governing_token_mint).0
}

/// Returns realm scoped VoterWeightRecord PDA seeds
pub fn get_voter_weight_record_address_seeds<'a>(
    realm: &'a Pubkey,
    governing_token_mint: &'a Pubkey,
    governing_token_owner: &'a Pubkey,
) -> [&'a [u8]; 4] {
    [
        VOTER_WEIGHT_RECORD_SEED,
        realm.as_ref(),
        governing_token_mint.as_ref(),
        governing_token_owner.as_ref(),
    ]
}

/// Returns realm scoped VoterWeightRecord PDA address and bump
pub fn find_voter_weight_record_address(
    program_id: &Pubkey,
    realm: &Pubkey,
    governing_token_mint: &Pubkey,
    governing_token_owner: &Pubkey,
) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &get_voter_weight_record_address_seeds(realm, governing_token_mint, governing_token_owner),
        program_id,
    )
}

/// Returns MaxVoterWeightRecord PDA seeds
pub fn get_max_voter_weight_record_address_seeds<'a>(
    realm: &'a Pubkey,
    governing_token_mint: &'a Pubkey,
) -> [&'a [u8]; 3] {
    [
        MAX_VOTER_WEIGHT_RECORD_SEED,
        realm.as_ref(),
        governing_token_mint.as_ref(),
    ]
}

/// Returns MaxVoterWeightRecord PDA address and bump
pub fn find_max_voter_weight_record_address(
    program_id: &Pubkey,
    realm: &Pubkey,
    governing_token_mint: &Pubkey,
) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &get_max_voter_weight_record_address_seeds(realm, governing_token_mint),
        program_id,
    )
}

/// Returns the vote record PDA marking `nft_mint` as used on `proposal`
pub fn get_nft_vote_record_address(
    program_id: &Pubkey,
    proposal: &Pubkey,
    nft_mint: &Pubkey,
) -> Pubkey {
    Pubkey::find_program_address(
        &[NFT_VOTE_RECORD_SEED, proposal.as_ref(), nft_mint.as_ref()],
        program_id,
    )
    .0
}

/// Returns the seed prefix of action tickets for the given action, e.g. `nft-castVote-ticket`
pub fn get_nft_action_ticket_seed(action: WeightAction) -> String {
    format!("nft-{}-ticket", action.name())
}

/// Returns NftActionTicket PDA address and bump
pub fn find_nft_action_ticket_address(
    program_id: &Pubkey,
    action: WeightAction,
    registrar: &Pubkey,
    voter: &Pubkey,
    nft_mint: &Pubkey,
) -> (Pubkey, u8) {
    let ticket_seed = get_nft_action_ticket_seed(action);
    Pubkey::find_program_address(
        &[
            ticket_seed.as_bytes(),
            registrar.as_ref(),
            voter.as_ref(),
            nft_mint.as_ref(),
        ],
        program_id,
    )
}

/// Returns NftActionTicket PDA address
pub fn get_nft_action_ticket_address(
    program_id: &Pubkey,
    action: WeightAction,
    registrar: &Pubkey,
    voter: &Pubkey,
    nft_mint: &Pubkey,
) -> Pubkey {
    find_nft_action_ticket_address(program_id, action, registrar, voter, nft_mint).0
}

/// Returns the stake registry Registrar PDA address
pub fn get_stake_registrar_address(
    program_id: &Pubkey,
    realm: &Pubkey,
    governing_token_mint: &Pubkey,
) -> Pubkey {
    Pubkey::find_program_address(
        &[
            realm.as_ref(),
            REGISTRAR_SEED,
            governing_token_mint.as_ref(),
        ],
        program_id,
    )
    .0
}

/// Returns the registrar scoped VoterWeightRecord PDA address of the stake registry
pub fn get_stake_voter_weight_record_address(
    program_id: &Pubkey,
    registrar: &Pubkey,
    voter: &Pubkey,
) -> Pubkey {
    Pubkey::find_program_address(
        &[VOTER_WEIGHT_RECORD_SEED, registrar.as_ref(), voter.as_ref()],
        program_id,
    )
    .0
}

/// Returns the queue oracle addin VoterWeightRecord PDA address
pub fn get_queue_voter_weight_record_address(program_id: &Pubkey, oracle: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(
        &[QUEUE_VOTER_WEIGHT_RECORD_SEED, oracle.as_ref()],
        program_id,
    )
    .0
}

/// Returns the Metaplex metadata PDA address of `mint`
pub fn get_metadata_address(mint: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(
        &[
            METADATA_SEED,
            mpl_token_metadata::id().as_ref(),
            mint.as_ref(),
        ],
        &mpl_token_metadata::id(),
    )
    .0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derivation_is_deterministic() {
        let program_id = Pubkey::new_unique();
        let realm = Pubkey::new_unique();
        let mint = Pubkey::new_unique();
        let voter = Pubkey::new_unique();

        assert_eq!(
            find_registrar_address(&program_id, &realm, &mint),
            find_registrar_address(&program_id, &realm, &mint)
        );
        assert_eq!(
            find_voter_weight_record_address(&program_id, &realm, &mint, &voter),
            find_voter_weight_record_address(&program_id, &realm, &mint, &voter)
        );
        assert_eq!(
            get_metadata_address(&mint),
            get_metadata_address(&mint)
        );
    }

    #[test]
    fn test_ticket_address_depends_on_action() {
        let program_id = Pubkey::new_unique();
        let registrar = Pubkey::new_unique();
        let voter = Pubkey::new_unique();
        let mint = Pubkey::new_unique();

        let cast_vote_ticket = get_nft_action_ticket_address(
            &program_id,
            WeightAction::CastVote,
            &registrar,
            &voter,
            &mint,
        );
        let create_proposal_ticket = get_nft_action_ticket_address(
            &program_id,
            WeightAction::CreateProposal,
            &registrar,
            &voter,
            &mint,
        );

        assert_ne!(cast_vote_ticket, create_proposal_ticket);
        assert_eq!(
            get_nft_action_ticket_seed(WeightAction::CastVote),
            "nft-castVote-ticket"
        );
    }

    #[test]
    fn test_registrar_formulas_differ_between_plugins() {
        let program_id = Pubkey::new_unique();
        let realm = Pubkey::new_unique();
        let mint = Pubkey::new_unique();

        assert_ne!(
            get_registrar_address(&program_id, &realm, &mint),
            get_stake_registrar_address(&program_id, &realm, &mint)
        );
    }
}
