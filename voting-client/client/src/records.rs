//! Lookup of plugin records already present on chain
//!
//! Results are never cached: other voters mutate the record set between
//! actions, every cast and relinquish decision queries afresh.

use {
    crate::{
        addresses::get_nft_vote_record_address,
        client::{AccountFilter, ProgramClient},
        error::{VotingClientError, VotingClientResult},
        power::CollectionConfig,
        state::StakePosition,
    },
    borsh::{BorshDeserialize, BorshSerialize},
    solana_sdk::{account::Account, hash::hash, pubkey::Pubkey},
    std::collections::HashSet,
};

/// Size of the Anchor account discriminator
pub const ACCOUNT_DISCRIMINATOR_SIZE: usize = 8;

/// Returns the Anchor discriminator of the account type `name`
pub fn account_discriminator(name: &str) -> [u8; 8] {
    let mut discriminator = [0u8; 8];
    discriminator.copy_from_slice(&hash(format!("account:{}", name).as_bytes()).to_bytes()[..8]);
    discriminator
}

/// Account data of a per asset vote record
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct NftVoteRecordData {
    pub proposal: Pubkey,
    pub nft_mint: Pubkey,
    pub governing_token_owner: Pubkey,
}

impl NftVoteRecordData {
    /// sha256("account:NftVoteRecord")[..8]
    pub fn discriminator() -> [u8; 8] {
        account_discriminator("NftVoteRecord")
    }
}

/// Vote record marking an asset as used on a proposal
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NftVoteRecord {
    pub address: Pubkey,
    pub proposal: Pubkey,
    pub nft_mint: Pubkey,
    pub governing_token_owner: Pubkey,
}

/// Decodes Anchor account data of type `T` after checking its discriminator
pub fn get_anchor_account_data<T: BorshDeserialize>(
    address: &Pubkey,
    account: &Account,
    discriminator: &[u8; 8],
) -> VotingClientResult<T> {
    if account.data.len() < ACCOUNT_DISCRIMINATOR_SIZE
        || &account.data[..ACCOUNT_DISCRIMINATOR_SIZE] != discriminator
    {
        return Err(VotingClientError::InvalidAccountData(*address));
    }

    let mut data = &account.data[ACCOUNT_DISCRIMINATOR_SIZE..];
    T::deserialize(&mut data).map_err(|_| VotingClientError::InvalidAccountData(*address))
}

/// Returns every vote record of `proposal` owned by the plugin program
pub async fn list_vote_records_for_proposal(
    client: &dyn ProgramClient,
    program_id: &Pubkey,
    proposal: &Pubkey,
) -> VotingClientResult<Vec<NftVoteRecord>> {
    let discriminator = NftVoteRecordData::discriminator();
    let accounts = client
        .get_program_accounts(
            *program_id,
            vec![
                AccountFilter::Memcmp {
                    offset: 0,
                    bytes: discriminator.to_vec(),
                },
                AccountFilter::Memcmp {
                    offset: ACCOUNT_DISCRIMINATOR_SIZE,
                    bytes: proposal.to_bytes().to_vec(),
                },
            ],
        )
        .await
        .map_err(VotingClientError::Client)?;

    let records = accounts
        .iter()
        .map(|(address, account)| {
            let data: NftVoteRecordData =
                get_anchor_account_data(address, account, &discriminator)?;
            Ok(NftVoteRecord {
                address: *address,
                proposal: data.proposal,
                nft_mint: data.nft_mint,
                governing_token_owner: data.governing_token_owner,
            })
        })
        .collect::<VotingClientResult<Vec<_>>>()?;

    log::debug!(
        "{} vote records found for proposal {}",
        records.len(),
        proposal
    );

    Ok(records)
}

/// Returns true when the account exists and is owned by `program_id`
pub async fn voter_weight_record_exists(
    client: &dyn ProgramClient,
    program_id: &Pubkey,
    voter_weight_record: &Pubkey,
) -> VotingClientResult<bool> {
    let account = client
        .get_account(*voter_weight_record)
        .await
        .map_err(VotingClientError::Client)?;

    Ok(account.map_or(false, |account| account.owner == *program_id))
}

/// Returns the subset of `addresses` already created by the plugin program
pub async fn get_existing_records(
    client: &dyn ProgramClient,
    program_id: &Pubkey,
    addresses: &[Pubkey],
) -> VotingClientResult<HashSet<Pubkey>> {
    if addresses.is_empty() {
        return Ok(HashSet::new());
    }

    let accounts = client
        .get_multiple_accounts(addresses)
        .await
        .map_err(VotingClientError::Client)?;

    Ok(addresses
        .iter()
        .zip(accounts)
        .filter(|(_, account)| {
            account
                .as_ref()
                .map_or(false, |account| account.owner == *program_id)
        })
        .map(|(address, _)| *address)
        .collect())
}

async fn get_position_vote_records(
    client: &dyn ProgramClient,
    program_id: &Pubkey,
    proposal: &Pubkey,
    positions: &[StakePosition],
) -> VotingClientResult<Vec<bool>> {
    let vote_records: Vec<Pubkey> = positions
        .iter()
        .map(|position| get_nft_vote_record_address(program_id, proposal, &position.mint))
        .collect();

    let accounts = client
        .get_multiple_accounts(&vote_records)
        .await
        .map_err(VotingClientError::Client)?;

    Ok(accounts
        .iter()
        .map(|account| {
            account
                .as_ref()
                .map_or(false, |account| account.owner == *program_id)
        })
        .collect())
}

/// Returns the positions which haven't voted on `proposal` yet
pub async fn get_unused_positions_for_proposal(
    client: &dyn ProgramClient,
    program_id: &Pubkey,
    proposal: &Pubkey,
    positions: &[StakePosition],
) -> VotingClientResult<Vec<StakePosition>> {
    let used = get_position_vote_records(client, program_id, proposal, positions).await?;

    Ok(positions
        .iter()
        .zip(used)
        .filter(|(_, used)| !used)
        .map(|(position, _)| position.clone())
        .collect())
}

/// Returns the positions with a vote record on `proposal`
pub async fn get_used_positions_for_proposal(
    client: &dyn ProgramClient,
    program_id: &Pubkey,
    proposal: &Pubkey,
    positions: &[StakePosition],
) -> VotingClientResult<Vec<StakePosition>> {
    let used = get_position_vote_records(client, program_id, proposal, positions).await?;

    Ok(positions
        .iter()
        .zip(used)
        .filter(|(_, used)| *used)
        .map(|(position, _)| position.clone())
        .collect())
}

#[derive(BorshDeserialize)]
struct CollectionConfigData {
    collection: Pubkey,
    size: u32,
    weight: u64,
    _reserved: [u8; 8],
}

#[derive(BorshDeserialize)]
struct RegistrarData {
    governance_program_id: Pubkey,
    realm: Pubkey,
    governing_token_mint: Pubkey,
    collection_configs: Vec<CollectionConfigData>,
}

/// Registrar of the NFT plugin
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NftRegistrar {
    pub governance_program_id: Pubkey,
    pub realm: Pubkey,
    pub governing_token_mint: Pubkey,
    pub collection_configs: Vec<CollectionConfig>,
}

/// Fetches and decodes the NFT plugin registrar
pub async fn get_nft_registrar(
    client: &dyn ProgramClient,
    registrar: &Pubkey,
) -> VotingClientResult<NftRegistrar> {
    let account = client
        .get_account(*registrar)
        .await
        .map_err(VotingClientError::Client)?
        .ok_or(VotingClientError::AccountNotFound(*registrar))?;

    let data: RegistrarData =
        get_anchor_account_data(registrar, &account, &account_discriminator("Registrar"))?;

    Ok(NftRegistrar {
        governance_program_id: data.governance_program_id,
        realm: data.realm,
        governing_token_mint: data.governing_token_mint,
        collection_configs: data
            .collection_configs
            .into_iter()
            .map(|config| CollectionConfig {
                collection: config.collection,
                size: config.size,
                weight: config.weight,
            })
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_nft_vote_record() {
        let record = NftVoteRecordData {
            proposal: Pubkey::new_unique(),
            nft_mint: Pubkey::new_unique(),
            governing_token_owner: Pubkey::new_unique(),
        };
        let mut data = NftVoteRecordData::discriminator().to_vec();
        data.extend(record.try_to_vec().unwrap());
        let account = Account {
            data,
            ..Account::default()
        };

        let decoded: NftVoteRecordData = get_anchor_account_data(
            &Pubkey::new_unique(),
            &account,
            &NftVoteRecordData::discriminator(),
        )
        .unwrap();

        assert_eq!(decoded, record);
    }

    #[test]
    fn test_decode_with_wrong_discriminator_error() {
        let address = Pubkey::new_unique();
        let account = Account {
            data: vec![0; 104],
            ..Account::default()
        };

        let err = get_anchor_account_data::<NftVoteRecordData>(
            &address,
            &account,
            &NftVoteRecordData::discriminator(),
        )
        .err()
        .unwrap();

        assert_eq!(err, VotingClientError::InvalidAccountData(address));
    }
}
