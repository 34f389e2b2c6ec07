//! Rayswap pool quoter
//!
//! Polls configured Raydium pools and logs their live reserves, spot price
//! and a sample quote.

mod config;
mod rpc;

use anyhow::Result;
use config::QuoterConfig;
use rayswap_amm::{
    format_decimal, quote_exact_in, spot_price, Cluster, LayoutKind, PoolResolver, ResolvedPool,
};
use rpc::RpcAccountFetcher;
use solana_sdk::pubkey::Pubkey;
use std::time::Duration;
use tokio::time;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if std::env::args().nth(1).as_deref() == Some("init") {
        return QuoterConfig::write_default("quoter-config.toml");
    }

    log::info!("Starting rayswap quoter");

    let config = QuoterConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({:#}), using default devnet config", e);
        QuoterConfig::default_devnet()
    });
    let cluster = config.cluster()?;
    let targets = config.pool_targets()?;

    let fetcher = RpcAccountFetcher::new(config.rpc_url.clone());
    log::info!("Connected to RPC: {} ({:?})", fetcher.url(), cluster);

    if targets.is_empty() {
        log::warn!("No pools configured");
    }
    log::info!("Watching {} pools", targets.len());

    let mut interval = time::interval(Duration::from_secs(config.poll_interval_secs.max(1)));

    loop {
        interval.tick().await;
        poll_pools(&fetcher, &config, cluster, &targets).await;
    }
}

/// Resolve every target, one batched pass per layout
async fn poll_pools(
    fetcher: &RpcAccountFetcher,
    config: &QuoterConfig,
    cluster: Cluster,
    targets: &[(Pubkey, LayoutKind)],
) {
    let resolver = PoolResolver::new(fetcher);

    for layout in [LayoutKind::LegacyAmm, LayoutKind::Cpmm] {
        let ids: Vec<Pubkey> = targets
            .iter()
            .filter(|(_, kind)| *kind == layout)
            .map(|(id, _)| *id)
            .collect();
        if ids.is_empty() {
            continue;
        }

        for (pool_id, result) in resolver.resolve_pools(&ids, layout, config.fetch_config).await {
            match result {
                Ok(pool) => report_pool(&pool, config, cluster),
                Err(e) if e.is_retryable() => {
                    log::warn!("Pool {} fetch failed, retrying next tick: {}", pool_id, e)
                }
                Err(e) => log::error!("Pool {} skipped: {}", pool_id, e),
            }
        }
    }
}

fn report_pool(pool: &ResolvedPool, config: &QuoterConfig, cluster: Cluster) {
    let expected_program = match pool.state.layout_kind() {
        LayoutKind::LegacyAmm => cluster.legacy_amm_program(),
        LayoutKind::Cpmm => cluster.cpmm_program(),
    };
    if pool.program_id != expected_program {
        log::warn!(
            "Pool {} is owned by {}, expected {}",
            pool.pool_id,
            pool.program_id,
            expected_program
        );
    }

    let spot = spot_price(pool)
        .map(|price| format_decimal(&price, pool.state.quote_decimals() as u32))
        .unwrap_or_else(|| "n/a".to_string());
    log::info!(
        "Pool {} ({}): reserves {} / {}, spot {}",
        pool.pool_id,
        pool.state.layout_kind(),
        pool.reserves.base,
        pool.reserves.quote,
        spot
    );

    let base_mint = pool.state.base_mint();
    match quote_exact_in(pool, &base_mint, config.sample_amount, config.slippage_bps) {
        Ok(quote) => log::info!(
            "  {} base -> {} quote (min {}, fee {}, impact {})",
            quote.source_amount_in,
            quote.amount_out_before_slippage,
            quote.amount_out_after_slippage,
            quote.trade_fee,
            format_decimal(&quote.price_impact, 6)
        ),
        Err(e) => log::warn!("  Sample quote unavailable: {}", e),
    }
}
