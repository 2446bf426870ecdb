use std::collections::HashMap;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use borsh::BorshSerialize;
use solana_sdk::{account::Account, instruction::Instruction, pubkey::Pubkey};
use spl_governance_voting_client::{
    addresses::{
        find_voter_weight_record_address, get_metadata_address, get_nft_action_ticket_address,
        get_nft_vote_record_address, get_registrar_address, mpl_token_metadata,
    },
    client::{AccountFilter, AssetProof, ProgramClient, ProgramClientResult},
    plan::OperationPlan,
    plugin::{NftCollectionPlugin, StakeRegistryPlugin, WeightPlugin},
    records::{account_discriminator, NftVoteRecordData},
    state::{
        CompressionInfo, NftGrouping, ProposalInfo, RealmInfo, StakePosition,
        TokenOwnerRecordInfo, VotingNft, WeightAction,
    },
    voting_client::VotingClient,
};

pub mod cookies;
use self::cookies::{NftCookie, ProposalCookie, RealmCookie, TokenOwnerRecordCookie};

/// Governance program deployed on mainnet
pub const GOVERNANCE_PROGRAM_ID: &str = "GovER5Lthms3bLBqWub97yVrMmEogzX7xNjdXpPPCVZw";

/// Chain state held in memory, answering lookups the way an RPC node would
#[derive(Default)]
pub struct InMemoryProgramClient {
    accounts: RwLock<HashMap<Pubkey, Account>>,
    asset_proofs: RwLock<HashMap<Pubkey, AssetProof>>,
    fail_requests: AtomicBool,
}

impl InMemoryProgramClient {
    pub fn set_account(&self, address: Pubkey, owner: Pubkey, data: Vec<u8>) {
        let account = Account {
            lamports: 1_000_000,
            data,
            owner,
            executable: false,
            rent_epoch: 0,
        };
        self.accounts.write().unwrap().insert(address, account);
    }

    #[allow(dead_code)]
    pub fn remove_account(&self, address: &Pubkey) {
        self.accounts.write().unwrap().remove(address);
    }

    pub fn set_asset_proof(&self, asset_id: Pubkey, proof: AssetProof) {
        self.asset_proofs.write().unwrap().insert(asset_id, proof);
    }

    /// Every later request fails as if the node was unreachable
    #[allow(dead_code)]
    pub fn fail_requests(&self) {
        self.fail_requests.store(true, Ordering::SeqCst);
    }

    fn check_available(&self) -> ProgramClientResult<()> {
        if self.fail_requests.load(Ordering::SeqCst) {
            return Err("connection refused".into());
        }
        Ok(())
    }
}

#[async_trait]
impl ProgramClient for InMemoryProgramClient {
    async fn get_account(&self, address: Pubkey) -> ProgramClientResult<Option<Account>> {
        self.check_available()?;
        Ok(self.accounts.read().unwrap().get(&address).cloned())
    }

    async fn get_multiple_accounts(
        &self,
        addresses: &[Pubkey],
    ) -> ProgramClientResult<Vec<Option<Account>>> {
        self.check_available()?;
        let accounts = self.accounts.read().unwrap();
        Ok(addresses
            .iter()
            .map(|address| accounts.get(address).cloned())
            .collect())
    }

    async fn get_program_accounts(
        &self,
        program_id: Pubkey,
        filters: Vec<AccountFilter>,
    ) -> ProgramClientResult<Vec<(Pubkey, Account)>> {
        self.check_available()?;
        let accounts = self.accounts.read().unwrap();
        Ok(accounts
            .iter()
            .filter(|(_, account)| account.owner == program_id)
            .filter(|(_, account)| filters.iter().all(|filter| filter.matches(&account.data)))
            .map(|(address, account)| (*address, account.clone()))
            .collect())
    }

    async fn get_asset_proof(&self, asset_id: Pubkey) -> ProgramClientResult<AssetProof> {
        self.check_available()?;
        self.asset_proofs
            .read()
            .unwrap()
            .get(&asset_id)
            .cloned()
            .ok_or_else(|| format!("asset {} not found", asset_id).into())
    }
}

#[derive(BorshSerialize)]
struct CollectionConfigData {
    collection: Pubkey,
    size: u32,
    weight: u64,
    reserved: [u8; 8],
}

#[derive(BorshSerialize)]
struct RegistrarData {
    governance_program_id: Pubkey,
    realm: Pubkey,
    governing_token_mint: Pubkey,
    collection_configs: Vec<CollectionConfigData>,
}

pub struct VotingClientTest {
    pub client: Arc<InMemoryProgramClient>,
    pub governance_program_id: Pubkey,
    pub nft_program_id: Pubkey,
    pub stake_registry_program_id: Pubkey,
    pub collection: Pubkey,
}

impl VotingClientTest {
    pub fn start_new() -> Self {
        Self {
            client: Arc::new(InMemoryProgramClient::default()),
            governance_program_id: Pubkey::from_str(GOVERNANCE_PROGRAM_ID).unwrap(),
            nft_program_id: Pubkey::new_unique(),
            stake_registry_program_id: Pubkey::new_unique(),
            collection: Pubkey::new_unique(),
        }
    }

    #[allow(dead_code)]
    pub fn nft_plugin(&self) -> WeightPlugin {
        WeightPlugin::NftCollection(NftCollectionPlugin {
            program_id: self.nft_program_id,
        })
    }

    #[allow(dead_code)]
    pub fn stake_registry_plugin(&self) -> WeightPlugin {
        WeightPlugin::StakeRegistry(StakeRegistryPlugin {
            program_id: self.stake_registry_program_id,
        })
    }

    pub fn voting_client(
        &self,
        plugin: WeightPlugin,
        realm_cookie: &RealmCookie,
        token_owner_record_cookie: &TokenOwnerRecordCookie,
    ) -> VotingClient {
        VotingClient::new(
            self.client.clone(),
            plugin,
            realm_cookie.info.clone(),
            token_owner_record_cookie.token_owner,
        )
    }

    pub fn with_realm(&self) -> RealmCookie {
        let address = Pubkey::new_unique();

        RealmCookie {
            address,
            info: RealmInfo {
                address,
                community_mint: Pubkey::new_unique(),
                council_mint: Some(Pubkey::new_unique()),
                governance_program_id: self.governance_program_id,
            },
        }
    }

    pub fn with_token_owner_record(&self, realm_cookie: &RealmCookie) -> TokenOwnerRecordCookie {
        self.with_token_owner_record_for_mint(realm_cookie.info.community_mint)
    }

    #[allow(dead_code)]
    pub fn with_council_token_owner_record(
        &self,
        realm_cookie: &RealmCookie,
    ) -> TokenOwnerRecordCookie {
        self.with_token_owner_record_for_mint(realm_cookie.info.council_mint.unwrap())
    }

    fn with_token_owner_record_for_mint(&self, governing_token_mint: Pubkey) -> TokenOwnerRecordCookie {
        let address = Pubkey::new_unique();
        let token_owner = Pubkey::new_unique();

        TokenOwnerRecordCookie {
            address,
            info: TokenOwnerRecordInfo {
                address,
                governing_token_mint,
                governing_token_owner: token_owner,
                governing_token_deposit_amount: 100,
            },
            token_owner,
        }
    }

    pub fn with_proposal(
        &self,
        token_owner_record_cookie: &TokenOwnerRecordCookie,
    ) -> ProposalCookie {
        let address = Pubkey::new_unique();

        ProposalCookie {
            address,
            info: ProposalInfo {
                address,
                governance: Pubkey::new_unique(),
                governing_token_mint: token_owner_record_cookie.info.governing_token_mint,
                token_owner_record: Pubkey::new_unique(),
            },
            vote_record: Pubkey::new_unique(),
        }
    }

    /// Creates `count` verified collection nfts together with their metadata accounts
    #[allow(dead_code)]
    pub fn with_nfts(&self, count: usize) -> Vec<NftCookie> {
        (0..count)
            .map(|_| {
                let mint = Pubkey::new_unique();
                let metadata = get_metadata_address(&mint);
                self.client
                    .set_account(metadata, mpl_token_metadata::id(), vec![4; 8]);

                NftCookie {
                    nft: VotingNft {
                        mint,
                        grouping: vec![self.collection_grouping()],
                        compression: None,
                    },
                    metadata,
                }
            })
            .collect()
    }

    /// Creates a compressed nft with its inclusion proof of `proof_len` nodes
    #[allow(dead_code)]
    pub fn with_compressed_nft(&self, proof_len: usize, leaf_id: u64) -> VotingNft {
        let mint = Pubkey::new_unique();
        let tree = Pubkey::new_unique();

        self.client.set_asset_proof(
            mint,
            AssetProof {
                root: [7; 32],
                tree_id: tree,
                proof: (0..proof_len).map(|_| Pubkey::new_unique()).collect(),
            },
        );

        VotingNft {
            mint,
            grouping: vec![self.collection_grouping()],
            compression: Some(CompressionInfo {
                tree,
                leaf_id,
                data_hash: [1; 32],
                creator_hash: [2; 32],
            }),
        }
    }

    fn collection_grouping(&self) -> NftGrouping {
        NftGrouping {
            group_key: "collection".to_string(),
            group_value: self.collection,
            verified: Some(true),
        }
    }

    #[allow(dead_code)]
    pub fn with_nft_registrar(&self, realm_cookie: &RealmCookie, weight: u64) -> Pubkey {
        let registrar = get_registrar_address(
            &self.nft_program_id,
            &realm_cookie.address,
            &realm_cookie.info.community_mint,
        );

        let registrar_data = RegistrarData {
            governance_program_id: self.governance_program_id,
            realm: realm_cookie.address,
            governing_token_mint: realm_cookie.info.community_mint,
            collection_configs: vec![CollectionConfigData {
                collection: self.collection,
                size: 100,
                weight,
                reserved: [0; 8],
            }],
        };

        let mut data = account_discriminator("Registrar").to_vec();
        data.extend(registrar_data.try_to_vec().unwrap());
        self.client.set_account(registrar, self.nft_program_id, data);

        registrar
    }

    #[allow(dead_code)]
    pub fn with_nft_voter_weight_record(
        &self,
        realm_cookie: &RealmCookie,
        token_owner_record_cookie: &TokenOwnerRecordCookie,
    ) -> Pubkey {
        let (voter_weight_record, _) = find_voter_weight_record_address(
            &self.nft_program_id,
            &realm_cookie.address,
            &realm_cookie.info.community_mint,
            &token_owner_record_cookie.token_owner,
        );
        self.client
            .set_account(voter_weight_record, self.nft_program_id, vec![0; 8]);

        voter_weight_record
    }

    /// Creates the `action` tickets of `nfts` as a landed ticket batch would have
    #[allow(dead_code)]
    pub fn with_nft_action_tickets(
        &self,
        realm_cookie: &RealmCookie,
        token_owner_record_cookie: &TokenOwnerRecordCookie,
        action: WeightAction,
        nfts: &[VotingNft],
    ) -> Vec<Pubkey> {
        let registrar = get_registrar_address(
            &self.nft_program_id,
            &realm_cookie.address,
            &realm_cookie.info.community_mint,
        );

        nfts.iter()
            .map(|nft| {
                let ticket = get_nft_action_ticket_address(
                    &self.nft_program_id,
                    action,
                    &registrar,
                    &token_owner_record_cookie.token_owner,
                    &nft.mint,
                );
                self.client.set_account(ticket, self.nft_program_id, vec![0; 8]);
                ticket
            })
            .collect()
    }

    /// Marks `nft_mint` as used on the proposal by `governing_token_owner`
    #[allow(dead_code)]
    pub fn with_nft_vote_record(
        &self,
        proposal_cookie: &ProposalCookie,
        nft_mint: &Pubkey,
        governing_token_owner: &Pubkey,
    ) -> Pubkey {
        let address =
            get_nft_vote_record_address(&self.nft_program_id, &proposal_cookie.address, nft_mint);

        let record = NftVoteRecordData {
            proposal: proposal_cookie.address,
            nft_mint: *nft_mint,
            governing_token_owner: *governing_token_owner,
        };
        let mut data = NftVoteRecordData::discriminator().to_vec();
        data.extend(record.try_to_vec().unwrap());
        self.client.set_account(address, self.nft_program_id, data);

        address
    }

    /// Writes the vote records a submitted cast plan would have created
    #[allow(dead_code)]
    pub fn apply_nft_cast_plan(
        &self,
        plan: &OperationPlan,
        proposal_cookie: &ProposalCookie,
        nfts: &[VotingNft],
        governing_token_owner: &Pubkey,
    ) {
        let written: Vec<Pubkey> = plan
            .instructions()
            .flat_map(|instruction| instruction.accounts.iter())
            .filter(|account| account.is_writable)
            .map(|account| account.pubkey)
            .collect();

        for nft in nfts {
            let vote_record = get_nft_vote_record_address(
                &self.nft_program_id,
                &proposal_cookie.address,
                &nft.mint,
            );
            if written.contains(&vote_record) {
                self.with_nft_vote_record(proposal_cookie, &nft.mint, governing_token_owner);
            }
        }
    }

    #[allow(dead_code)]
    pub fn with_stake_positions(&self, count: usize) -> Vec<StakePosition> {
        (0..count)
            .map(|_| StakePosition {
                address: Pubkey::new_unique(),
                mint: Pubkey::new_unique(),
            })
            .collect()
    }

    /// Marks the position as used on the proposal
    #[allow(dead_code)]
    pub fn with_position_vote_record(
        &self,
        proposal_cookie: &ProposalCookie,
        position: &StakePosition,
    ) -> Pubkey {
        let address = get_nft_vote_record_address(
            &self.stake_registry_program_id,
            &proposal_cookie.address,
            &position.mint,
        );
        self.client
            .set_account(address, self.stake_registry_program_id, vec![0; 8]);

        address
    }
}

/// Instructions of `plan` addressed to `program_id`
#[allow(dead_code)]
pub fn instructions_of<'a>(plan: &'a OperationPlan, program_id: &Pubkey) -> Vec<&'a Instruction> {
    plan.instructions()
        .filter(|instruction| instruction.program_id == *program_id)
        .collect()
}

/// Anchor instruction discriminator of `name`
#[allow(dead_code)]
pub fn sighash(name: &str) -> [u8; 8] {
    let mut sighash = [0u8; 8];
    sighash.copy_from_slice(
        &solana_sdk::hash::hash(format!("global:{}", name).as_bytes()).to_bytes()[..8],
    );
    sighash
}
