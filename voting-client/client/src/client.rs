//! Read only chain access used while building plans

use {
    async_trait::async_trait,
    serde_derive::Deserialize,
    serde_json::json,
    solana_account_decoder::UiAccountEncoding,
    solana_client::{
        nonblocking::rpc_client::RpcClient,
        rpc_config::{RpcAccountInfoConfig, RpcProgramAccountsConfig},
        rpc_filter::{Memcmp, RpcFilterType},
        rpc_request::RpcRequest,
    },
    solana_sdk::{account::Account, pubkey::Pubkey},
    std::{fmt, str::FromStr, sync::Arc},
};

pub type ProgramClientError = Box<dyn std::error::Error + Send + Sync>;
pub type ProgramClientResult<T> = Result<T, ProgramClientError>;

/// Max number of keys a single getMultipleAccounts request accepts
pub const MAX_MULTIPLE_ACCOUNTS: usize = 100;

/// Filter applied to a program accounts query
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AccountFilter {
    /// Account data at `offset` equals `bytes`
    Memcmp { offset: usize, bytes: Vec<u8> },
    /// Account data is exactly this long
    DataSize(u64),
}

impl AccountFilter {
    pub fn matches(&self, data: &[u8]) -> bool {
        match self {
            Self::Memcmp { offset, bytes } => data
                .get(*offset..offset + bytes.len())
                .map_or(false, |slice| slice == bytes.as_slice()),
            Self::DataSize(size) => data.len() as u64 == *size,
        }
    }
}

/// Merkle inclusion proof of a compressed asset
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssetProof {
    pub root: [u8; 32],
    pub tree_id: Pubkey,
    pub proof: Vec<Pubkey>,
}

/// Chain state lookups the adapters suspend on
#[async_trait]
pub trait ProgramClient: Send + Sync {
    async fn get_account(&self, address: Pubkey) -> ProgramClientResult<Option<Account>>;

    async fn get_multiple_accounts(
        &self,
        addresses: &[Pubkey],
    ) -> ProgramClientResult<Vec<Option<Account>>>;

    async fn get_program_accounts(
        &self,
        program_id: Pubkey,
        filters: Vec<AccountFilter>,
    ) -> ProgramClientResult<Vec<(Pubkey, Account)>>;

    async fn get_asset_proof(&self, asset_id: Pubkey) -> ProgramClientResult<AssetProof>;
}

/// Program client backed by a JSON RPC node
pub struct ProgramRpcClient {
    client: Arc<RpcClient>,
}

impl fmt::Debug for ProgramRpcClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgramRpcClient")
            .field("url", &self.client.url())
            .finish()
    }
}

impl ProgramRpcClient {
    pub fn new(client: Arc<RpcClient>) -> Self {
        Self { client }
    }
}

#[derive(Deserialize)]
struct RpcAssetProof {
    root: String,
    proof: Vec<String>,
    tree_id: String,
}

#[async_trait]
impl ProgramClient for ProgramRpcClient {
    async fn get_account(&self, address: Pubkey) -> ProgramClientResult<Option<Account>> {
        self.client
            .get_account_with_commitment(&address, self.client.commitment())
            .await
            .map(|response| response.value)
            .map_err(Into::into)
    }

    async fn get_multiple_accounts(
        &self,
        addresses: &[Pubkey],
    ) -> ProgramClientResult<Vec<Option<Account>>> {
        let mut accounts = Vec::with_capacity(addresses.len());
        for chunk in addresses.chunks(MAX_MULTIPLE_ACCOUNTS) {
            accounts.extend(self.client.get_multiple_accounts(chunk).await?);
        }
        Ok(accounts)
    }

    async fn get_program_accounts(
        &self,
        program_id: Pubkey,
        filters: Vec<AccountFilter>,
    ) -> ProgramClientResult<Vec<(Pubkey, Account)>> {
        let filters = filters
            .into_iter()
            .map(|filter| match filter {
                AccountFilter::Memcmp { offset, bytes } => {
                    RpcFilterType::Memcmp(Memcmp::new_base58_encoded(offset, &bytes))
                }
                AccountFilter::DataSize(size) => RpcFilterType::DataSize(size),
            })
            .collect();

        let config = RpcProgramAccountsConfig {
            filters: Some(filters),
            account_config: RpcAccountInfoConfig {
                encoding: Some(UiAccountEncoding::Base64),
                commitment: Some(self.client.commitment()),
                ..RpcAccountInfoConfig::default()
            },
            ..RpcProgramAccountsConfig::default()
        };

        self.client
            .get_program_accounts_with_config(&program_id, config)
            .await
            .map_err(Into::into)
    }

    async fn get_asset_proof(&self, asset_id: Pubkey) -> ProgramClientResult<AssetProof> {
        let response: RpcAssetProof = self
            .client
            .send(
                RpcRequest::Custom {
                    method: "getAssetProof",
                },
                json!({ "id": asset_id.to_string() }),
            )
            .await?;

        let proof = response
            .proof
            .iter()
            .map(|node| Pubkey::from_str(node))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(AssetProof {
            root: Pubkey::from_str(&response.root)?.to_bytes(),
            tree_id: Pubkey::from_str(&response.tree_id)?,
            proof,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memcmp_filter_matches() {
        let filter = AccountFilter::Memcmp {
            offset: 2,
            bytes: vec![7, 8],
        };

        assert!(filter.matches(&[0, 0, 7, 8, 9]));
        assert!(!filter.matches(&[0, 0, 7, 9]));
        assert!(!filter.matches(&[0, 0, 7]));
    }

    #[test]
    fn test_data_size_filter_matches() {
        assert!(AccountFilter::DataSize(3).matches(&[1, 2, 3]));
        assert!(!AccountFilter::DataSize(3).matches(&[1, 2]));
    }
}
