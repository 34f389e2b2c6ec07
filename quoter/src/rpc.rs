//! RPC-backed account fetcher

use async_trait::async_trait;
use rayswap_amm::AccountFetcher;
use rayswap_common::{Result, SwapError};
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::{account::Account, commitment_config::CommitmentConfig, pubkey::Pubkey};

/// `getMultipleAccounts` accepts at most this many keys per request
pub const MAX_ACCOUNTS_PER_REQUEST: usize = 100;

pub struct RpcAccountFetcher {
    client: RpcClient,
}

impl RpcAccountFetcher {
    pub fn new(rpc_url: String) -> Self {
        Self {
            client: RpcClient::new_with_commitment(rpc_url, CommitmentConfig::confirmed()),
        }
    }

    pub fn url(&self) -> String {
        self.client.url()
    }
}

#[async_trait]
impl AccountFetcher for RpcAccountFetcher {
    async fn fetch_accounts(&self, addresses: &[Pubkey]) -> Result<Vec<Option<Account>>> {
        let mut accounts = Vec::with_capacity(addresses.len());
        for chunk in addresses.chunks(MAX_ACCOUNTS_PER_REQUEST) {
            let batch = self
                .client
                .get_multiple_accounts(chunk)
                .await
                .map_err(|e| SwapError::Fetch(e.to_string()))?;
            log::debug!("Fetched {} accounts from {}", batch.len(), self.client.url());
            accounts.extend(batch);
        }
        Ok(accounts)
    }
}
