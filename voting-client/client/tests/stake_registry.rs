mod program_test;

use program_test::*;

use assert_matches::assert_matches;
use spl_governance_voting_client::{
    addresses::{get_nft_vote_record_address, get_stake_registrar_address},
    chunk::{MAX_POSITION_CAST_ACCOUNTS, MAX_POSITION_WEIGHT_ACCOUNTS},
    plan::PluginAccounts,
    state::WeightAction,
};

const UPDATE_FIXED_ACCOUNTS: usize = 3;
const CAST_FIXED_ACCOUNTS: usize = 7;
const RELINQUISH_FIXED_ACCOUNTS: usize = 8;

#[tokio::test]
async fn test_refresh_voter_weight() {
    // Arrange
    let voting_test = VotingClientTest::start_new();
    let realm_cookie = voting_test.with_realm();
    let token_owner_record_cookie = voting_test.with_token_owner_record(&realm_cookie);

    let mut voting_client = voting_test.voting_client(
        voting_test.stake_registry_plugin(),
        &realm_cookie,
        &token_owner_record_cookie,
    );
    voting_client.set_stake_positions(voting_test.with_stake_positions(7));

    // Act
    let plan = voting_client
        .refresh_voter_weight(
            &token_owner_record_cookie.info,
            WeightAction::CreateProposal,
            None,
        )
        .await
        .unwrap();

    // Assert
    assert_eq!(plan.parallel_batches().count(), 0);

    let instructions: Vec<_> = plan.instructions().collect();
    assert_eq!(instructions.len(), 1);
    assert_eq!(instructions[0].data[..8], sighash("update_voter_weight_record_v0"));
    assert_eq!(
        instructions[0].accounts.len() - UPDATE_FIXED_ACCOUNTS,
        MAX_POSITION_WEIGHT_ACCOUNTS
    );

    let registrar = get_stake_registrar_address(
        &voting_test.stake_registry_program_id,
        &realm_cookie.address,
        &realm_cookie.info.community_mint,
    );
    assert_eq!(instructions[0].accounts[0].pubkey, registrar);
    assert_matches!(
        plan.addresses.unwrap().accounts,
        PluginAccounts::StakeRegistry(accounts) if accounts.registrar == registrar && accounts.positions.len() == 5
    );
}

#[tokio::test]
async fn test_cast_vote_with_unused_positions() {
    // Arrange
    let voting_test = VotingClientTest::start_new();
    let realm_cookie = voting_test.with_realm();
    let token_owner_record_cookie = voting_test.with_token_owner_record(&realm_cookie);
    let proposal_cookie = voting_test.with_proposal(&token_owner_record_cookie);

    let positions = voting_test.with_stake_positions(5);
    voting_test.with_position_vote_record(&proposal_cookie, &positions[0]);

    let mut voting_client = voting_test.voting_client(
        voting_test.stake_registry_plugin(),
        &realm_cookie,
        &token_owner_record_cookie,
    );
    voting_client.set_stake_positions(positions.clone());

    // Act
    let plan = voting_client
        .cast_vote(&proposal_cookie.info, &token_owner_record_cookie.info)
        .await
        .unwrap();

    // Assert
    let instructions: Vec<_> = plan.instructions().collect();
    let remaining: Vec<usize> = instructions
        .iter()
        .map(|instruction| instruction.accounts.len() - CAST_FIXED_ACCOUNTS)
        .collect();
    // 4 unused positions of 3 accounts each, 3 positions per instruction
    assert_eq!(remaining, vec![MAX_POSITION_CAST_ACCOUNTS, 3]);

    let first_position = &instructions[0].accounts[CAST_FIXED_ACCOUNTS..CAST_FIXED_ACCOUNTS + 3];
    assert_eq!(first_position[1].pubkey, positions[1].address);
    assert_eq!(
        first_position[2].pubkey,
        get_nft_vote_record_address(
            &voting_test.stake_registry_program_id,
            &proposal_cookie.address,
            &positions[1].mint
        )
    );
    assert!(plan.addresses.unwrap().max_voter_weight.is_some());
}

#[tokio::test]
async fn test_cast_vote_with_all_positions_used_is_empty() {
    // Arrange
    let voting_test = VotingClientTest::start_new();
    let realm_cookie = voting_test.with_realm();
    let token_owner_record_cookie = voting_test.with_token_owner_record(&realm_cookie);
    let proposal_cookie = voting_test.with_proposal(&token_owner_record_cookie);

    let positions = voting_test.with_stake_positions(2);
    for position in &positions {
        voting_test.with_position_vote_record(&proposal_cookie, position);
    }

    let mut voting_client = voting_test.voting_client(
        voting_test.stake_registry_plugin(),
        &realm_cookie,
        &token_owner_record_cookie,
    );
    voting_client.set_stake_positions(positions);

    // Act
    let plan = voting_client
        .cast_vote(&proposal_cookie.info, &token_owner_record_cookie.info)
        .await
        .unwrap();

    // Assert
    assert!(plan.is_empty());
}

#[tokio::test]
async fn test_relinquish_vote_with_used_positions() {
    // Arrange
    let voting_test = VotingClientTest::start_new();
    let realm_cookie = voting_test.with_realm();
    let token_owner_record_cookie = voting_test.with_token_owner_record(&realm_cookie);
    let proposal_cookie = voting_test.with_proposal(&token_owner_record_cookie);

    let positions = voting_test.with_stake_positions(9);
    for position in &positions[..7] {
        voting_test.with_position_vote_record(&proposal_cookie, position);
    }

    let mut voting_client = voting_test.voting_client(
        voting_test.stake_registry_plugin(),
        &realm_cookie,
        &token_owner_record_cookie,
    );
    voting_client.set_stake_positions(positions);

    // Act
    let plan = voting_client
        .relinquish_vote(
            &proposal_cookie.info,
            &proposal_cookie.vote_record,
            &token_owner_record_cookie.info,
        )
        .await
        .unwrap();

    // Assert
    let remaining: Vec<usize> = plan
        .instructions()
        .map(|instruction| instruction.accounts.len() - RELINQUISH_FIXED_ACCOUNTS)
        .collect();
    // 7 used positions of 2 accounts each, first 10 accounts then 12
    assert_eq!(remaining, vec![10, 4]);
    assert!(plan
        .instructions()
        .all(|instruction| instruction.data[..8] == sighash("relinquish_vote_v0")));
}

#[tokio::test]
async fn test_relinquish_vote_without_used_positions_is_empty() {
    // Arrange
    let voting_test = VotingClientTest::start_new();
    let realm_cookie = voting_test.with_realm();
    let token_owner_record_cookie = voting_test.with_token_owner_record(&realm_cookie);
    let proposal_cookie = voting_test.with_proposal(&token_owner_record_cookie);

    let mut voting_client = voting_test.voting_client(
        voting_test.stake_registry_plugin(),
        &realm_cookie,
        &token_owner_record_cookie,
    );
    voting_client.set_stake_positions(voting_test.with_stake_positions(3));

    // Act
    let plan = voting_client
        .relinquish_vote(
            &proposal_cookie.info,
            &proposal_cookie.vote_record,
            &token_owner_record_cookie.info,
        )
        .await
        .unwrap();

    // Assert
    assert!(plan.is_empty());
}
