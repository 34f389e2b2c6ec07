//! Raydium AMM core: account layouts, swap curve, instruction encoding and
//! pool-state resolution for the legacy v4 and CPMM programs

pub mod constants;
pub mod instructions;
pub mod math;
pub mod pda;
pub mod quote;
pub mod resolver;
pub mod state;

pub use constants::Cluster;
pub use instructions::{build_swap_instruction, SwapUserAccounts};
pub use math::{compute_swap, compute_swap_exact_out, ExactOutResult, FeeRate, SwapResult};
pub use quote::{format_decimal, quote_exact_in, quote_exact_out, spot_price, ExactOutQuote, SwapQuote};
pub use resolver::{resolve_reserves, AccountFetcher, LiveReserves, PoolResolver, ResolvedPool};
pub use state::{decode_pool, LayoutKind, PoolState};
