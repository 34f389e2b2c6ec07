//! Pool-state resolver
//!
//! Reads pool accounts, their vaults and (for CPMM) fee configs in three
//! ordered batches and derives live reserves. Failures are reported per pool;
//! one missing account never poisons the rest of the batch.

use crate::math::FeeRate;
use crate::pda;
use crate::state::{AmmConfig, LayoutKind, PoolState, TokenAccount};
use async_trait::async_trait;
use log::{debug, warn};
use rayswap_common::{Layout, Result, SwapError};
use solana_sdk::{account::Account, pubkey::Pubkey};
use std::collections::HashMap;

/// Order-preserving batched account reader
#[async_trait]
pub trait AccountFetcher: Send + Sync {
    /// One entry per address, `None` for accounts that do not exist
    async fn fetch_accounts(&self, addresses: &[Pubkey]) -> Result<Vec<Option<Account>>>;
}

/// Tradeable balances net of unswept fee accruals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiveReserves {
    pub base: u64,
    pub quote: u64,
}

impl LiveReserves {
    /// `(reserve_in, reserve_out)` for a trade that sells the base side when
    /// `base_in` is true
    pub fn oriented(&self, base_in: bool) -> (u64, u64) {
        if base_in {
            (self.base, self.quote)
        } else {
            (self.quote, self.base)
        }
    }
}

/// Derive live reserves from vault balances.
///
/// CPMM vaults also hold protocol and fund fees that are not yet collected;
/// those are excluded. Legacy pools trade against the full vault balance.
pub fn resolve_reserves(
    state: &PoolState,
    base_vault_amount: u64,
    quote_vault_amount: u64,
) -> Result<LiveReserves> {
    match state {
        PoolState::Legacy(_) => Ok(LiveReserves {
            base: base_vault_amount,
            quote: quote_vault_amount,
        }),
        PoolState::Cpmm(pool) => Ok(LiveReserves {
            base: net_of_fees(
                base_vault_amount,
                pool.protocol_fees_token_0,
                pool.fund_fees_token_0,
            )?,
            quote: net_of_fees(
                quote_vault_amount,
                pool.protocol_fees_token_1,
                pool.fund_fees_token_1,
            )?,
        }),
    }
}

fn net_of_fees(balance: u64, protocol_fees: u64, fund_fees: u64) -> Result<u64> {
    let accrued = protocol_fees
        .checked_add(fund_fees)
        .ok_or(SwapError::Overflow)?;
    balance
        .checked_sub(accrued)
        .ok_or(SwapError::ReserveUnderflow { balance, accrued })
}

/// A pool with everything needed to quote and build swaps against it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPool {
    pub pool_id: Pubkey,
    /// Owner of the pool account
    pub program_id: Pubkey,
    pub state: PoolState,
    /// CPMM fee config, when it was requested
    pub config: Option<AmmConfig>,
    pub base_vault_amount: u64,
    pub quote_vault_amount: u64,
    pub reserves: LiveReserves,
}

impl ResolvedPool {
    pub fn fee_rate(&self) -> Result<FeeRate> {
        match &self.state {
            PoolState::Legacy(info) => FeeRate::new(
                info.fees.swap_fee_numerator,
                info.fees.swap_fee_denominator,
            ),
            PoolState::Cpmm(pool) => match &self.config {
                Some(config) => FeeRate::from_ppm(config.trade_fee_rate),
                None => Err(SwapError::MissingConfig(pool.amm_config)),
            },
        }
    }

    /// Pool authority derived from the owning program
    pub fn authority(&self) -> Pubkey {
        match self.state {
            PoolState::Legacy(_) => pda::legacy_authority(&self.program_id).0,
            PoolState::Cpmm(_) => pda::cpmm_authority(&self.program_id).0,
        }
    }
}

/// Pool data gathered so far for one requested id
struct Partial {
    program_id: Pubkey,
    state: PoolState,
    vault_amounts: Option<(u64, u64)>,
    config: Option<AmmConfig>,
}

/// Resolves pools through an injected [`AccountFetcher`]
pub struct PoolResolver<'a, F: AccountFetcher + ?Sized> {
    fetcher: &'a F,
}

impl<'a, F: AccountFetcher + ?Sized> PoolResolver<'a, F> {
    pub fn new(fetcher: &'a F) -> Self {
        Self { fetcher }
    }

    /// Resolve a single pool
    pub async fn resolve_pool(
        &self,
        pool_id: Pubkey,
        layout: LayoutKind,
        fetch_config: bool,
    ) -> Result<ResolvedPool> {
        self.resolve_pools(&[pool_id], layout, fetch_config)
            .await
            .into_iter()
            .next()
            .map(|(_, result)| result)
            .unwrap_or_else(|| Err(SwapError::Fetch("empty resolver output".to_string())))
    }

    /// Resolve `pool_ids`, all of layout `layout`.
    ///
    /// Output has one entry per input id, in input order. `fetch_config` only
    /// affects CPMM pools.
    pub async fn resolve_pools(
        &self,
        pool_ids: &[Pubkey],
        layout: LayoutKind,
        fetch_config: bool,
    ) -> Vec<(Pubkey, Result<ResolvedPool>)> {
        let mut slots = self.load_pools(pool_ids, layout).await;
        self.load_vaults(&mut slots).await;
        if fetch_config && layout == LayoutKind::Cpmm {
            self.load_configs(&mut slots).await;
        }

        pool_ids
            .iter()
            .zip(slots)
            .map(|(pool_id, slot)| {
                let resolved = slot.and_then(|partial| finish(*pool_id, partial));
                if let Err(e) = &resolved {
                    warn!("Pool {} not resolved: {}", pool_id, e);
                }
                (*pool_id, resolved)
            })
            .collect()
    }

    async fn load_pools(&self, pool_ids: &[Pubkey], layout: LayoutKind) -> Vec<Result<Partial>> {
        debug!("Fetching {} {} pool accounts", pool_ids.len(), layout);
        let accounts = match self.fetch(pool_ids).await {
            Ok(accounts) => accounts,
            Err(e) => return pool_ids.iter().map(|_| Err(e.clone())).collect(),
        };

        pool_ids
            .iter()
            .zip(accounts)
            .map(|(pool_id, account)| {
                let account = account.ok_or(SwapError::AccountNotFound(*pool_id))?;
                Ok(Partial {
                    program_id: account.owner,
                    state: PoolState::decode(&account.data, layout)?,
                    vault_amounts: None,
                    config: None,
                })
            })
            .collect()
    }

    async fn load_vaults(&self, slots: &mut [Result<Partial>]) {
        let mut owners = Vec::new();
        let mut vaults = Vec::new();
        for (index, slot) in slots.iter().enumerate() {
            if let Ok(partial) = slot {
                owners.push(index);
                vaults.push(partial.state.base_vault());
                vaults.push(partial.state.quote_vault());
            }
        }
        if vaults.is_empty() {
            return;
        }

        debug!("Fetching {} vault accounts", vaults.len());
        let accounts = match self.fetch(&vaults).await {
            Ok(accounts) => accounts,
            Err(e) => {
                for index in owners {
                    slots[index] = Err(e.clone());
                }
                return;
            }
        };

        for ((index, accounts), addresses) in owners
            .into_iter()
            .zip(accounts.chunks(2))
            .zip(vaults.chunks(2))
        {
            match vault_pair(accounts, addresses) {
                Ok(amounts) => {
                    if let Ok(partial) = &mut slots[index] {
                        partial.vault_amounts = Some(amounts);
                    }
                }
                Err(e) => slots[index] = Err(e),
            }
        }
    }

    async fn load_configs(&self, slots: &mut [Result<Partial>]) {
        let mut config_ids: Vec<Pubkey> = Vec::new();
        for partial in slots.iter().flatten() {
            if let Some(config_id) = partial.state.config_id() {
                if !config_ids.contains(&config_id) {
                    config_ids.push(config_id);
                }
            }
        }
        if config_ids.is_empty() {
            return;
        }

        debug!("Fetching {} config accounts", config_ids.len());
        let configs: HashMap<Pubkey, Result<AmmConfig>> = match self.fetch(&config_ids).await {
            Ok(accounts) => config_ids
                .iter()
                .zip(accounts)
                .map(|(config_id, account)| {
                    let config = account
                        .ok_or(SwapError::AccountNotFound(*config_id))
                        .and_then(|account| AmmConfig::decode(&account.data));
                    (*config_id, config)
                })
                .collect(),
            Err(e) => config_ids.iter().map(|id| (*id, Err(e.clone()))).collect(),
        };

        for slot in slots.iter_mut() {
            let config_id = match slot {
                Ok(partial) => partial.state.config_id(),
                Err(_) => None,
            };
            let Some(config_id) = config_id else {
                continue;
            };
            match configs.get(&config_id) {
                Some(Ok(config)) => {
                    if let Ok(partial) = slot {
                        partial.config = Some(*config);
                    }
                }
                Some(Err(e)) => *slot = Err(e.clone()),
                None => {}
            }
        }
    }

    /// Batched read with the response length checked against the request
    async fn fetch(&self, addresses: &[Pubkey]) -> Result<Vec<Option<Account>>> {
        let accounts = self
            .fetcher
            .fetch_accounts(addresses)
            .await
            .map_err(|e| match e {
                SwapError::Fetch(_) => e,
                other => SwapError::Fetch(other.to_string()),
            })?;
        if accounts.len() != addresses.len() {
            return Err(SwapError::Fetch(format!(
                "requested {} accounts, received {}",
                addresses.len(),
                accounts.len()
            )));
        }
        Ok(accounts)
    }
}

fn vault_amount(account: &Option<Account>, address: &Pubkey) -> Result<u64> {
    let account = account.as_ref().ok_or(SwapError::AccountNotFound(*address))?;
    Ok(TokenAccount::decode(&account.data)?.amount)
}

/// Base and quote vault balances from a `[base, quote]` pair
fn vault_pair(accounts: &[Option<Account>], addresses: &[Pubkey]) -> Result<(u64, u64)> {
    Ok((
        vault_amount(&accounts[0], &addresses[0])?,
        vault_amount(&accounts[1], &addresses[1])?,
    ))
}

fn finish(pool_id: Pubkey, partial: Partial) -> Result<ResolvedPool> {
    let (base_vault_amount, quote_vault_amount) = partial
        .vault_amounts
        .ok_or_else(|| SwapError::Fetch(format!("vaults of {} not loaded", pool_id)))?;
    let reserves = resolve_reserves(&partial.state, base_vault_amount, quote_vault_amount)?;
    Ok(ResolvedPool {
        pool_id,
        program_id: partial.program_id,
        state: partial.state,
        config: partial.config,
        base_vault_amount,
        quote_vault_amount,
        reserves,
    })
}
