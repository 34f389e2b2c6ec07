//! Swap quotes against a resolved pool

use crate::constants::BPS_SCALE;
use crate::math::{self, compute_swap, compute_swap_exact_out};
use crate::resolver::ResolvedPool;
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{Signed, Zero};
use rayswap_common::{Result, SwapError};
use solana_sdk::pubkey::Pubkey;

/// Exact-input quote
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapQuote {
    pub input_mint: Pubkey,
    pub output_mint: Pubkey,
    pub source_amount_in: u64,
    pub trade_fee: u64,
    pub amount_out_before_slippage: u64,
    /// Minimum output to put in the instruction
    pub amount_out_after_slippage: u64,
    /// Output per input, decimal adjusted
    pub execution_price: BigRational,
    pub price_impact: BigRational,
}

/// Exact-output quote
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExactOutQuote {
    pub input_mint: Pubkey,
    pub output_mint: Pubkey,
    /// Output after clamping to what the pool can pay
    pub amount_out: u64,
    pub amount_in: u64,
    pub amount_in_without_fee: u64,
    pub trade_fee: u64,
    /// Maximum input to put in the instruction
    pub max_amount_in: u64,
    pub price_impact: BigRational,
}

/// Quote tokens per base token, decimal adjusted. `None` for an empty pool.
pub fn spot_price(pool: &ResolvedPool) -> Option<BigRational> {
    math::decimal_price(
        pool.reserves.quote,
        pool.state.quote_decimals(),
        pool.reserves.base,
        pool.state.base_decimals(),
    )
}

/// Sides of a trade: (reserve_in, reserve_out, decimals_in, decimals_out, other mint)
fn orient(pool: &ResolvedPool, input_is_base: bool) -> (u64, u64, u8, u8, Pubkey) {
    let (reserve_in, reserve_out) = pool.reserves.oriented(input_is_base);
    let state = &pool.state;
    if input_is_base {
        (
            reserve_in,
            reserve_out,
            state.base_decimals(),
            state.quote_decimals(),
            state.quote_mint(),
        )
    } else {
        (
            reserve_in,
            reserve_out,
            state.quote_decimals(),
            state.base_decimals(),
            state.base_mint(),
        )
    }
}

fn check_slippage(slippage_bps: u64) -> Result<()> {
    if slippage_bps > BPS_SCALE {
        return Err(SwapError::InvalidSlippage(slippage_bps));
    }
    Ok(())
}

/// Quote selling exactly `amount_in` of `input_mint`
pub fn quote_exact_in(
    pool: &ResolvedPool,
    input_mint: &Pubkey,
    amount_in: u64,
    slippage_bps: u64,
) -> Result<SwapQuote> {
    check_slippage(slippage_bps)?;
    let input_is_base = pool.state.is_base_mint(input_mint)?;
    let (reserve_in, reserve_out, decimals_in, decimals_out, output_mint) =
        orient(pool, input_is_base);

    let swap = compute_swap(amount_in, reserve_in, reserve_out, pool.fee_rate()?)?;

    let amount_out_after_slippage = (swap.amount_out as u128 * (BPS_SCALE - slippage_bps) as u128
        / BPS_SCALE as u128) as u64;

    let spot = math::decimal_price(reserve_out, decimals_out, reserve_in, decimals_in);
    let execution_price = math::decimal_price(swap.amount_out, decimals_out, amount_in, decimals_in)
        .unwrap_or_else(BigRational::zero);
    let price_impact = spot
        .map(|spot| math::price_impact(&spot, &execution_price))
        .unwrap_or_else(BigRational::zero);

    Ok(SwapQuote {
        input_mint: *input_mint,
        output_mint,
        source_amount_in: amount_in,
        trade_fee: swap.trade_fee,
        amount_out_before_slippage: swap.amount_out,
        amount_out_after_slippage,
        execution_price,
        price_impact,
    })
}

/// Quote buying exactly `amount_out` of `output_mint`
pub fn quote_exact_out(
    pool: &ResolvedPool,
    output_mint: &Pubkey,
    amount_out: u64,
    slippage_bps: u64,
) -> Result<ExactOutQuote> {
    check_slippage(slippage_bps)?;
    let input_is_base = !pool.state.is_base_mint(output_mint)?;
    let (reserve_in, reserve_out, decimals_in, decimals_out, _) = orient(pool, input_is_base);
    let input_mint = if input_is_base {
        pool.state.base_mint()
    } else {
        pool.state.quote_mint()
    };

    let result = compute_swap_exact_out(
        reserve_in,
        reserve_out,
        decimals_in,
        decimals_out,
        pool.fee_rate()?,
        amount_out,
    )?;

    let scale = BPS_SCALE as u128;
    let max_amount_in = (result.amount_in as u128 * (scale + slippage_bps as u128)).div_ceil(scale);
    let max_amount_in = u64::try_from(max_amount_in).map_err(|_| SwapError::Overflow)?;

    Ok(ExactOutQuote {
        input_mint,
        output_mint: *output_mint,
        amount_out: result.amount_out,
        amount_in: result.amount_in,
        amount_in_without_fee: result.amount_in_without_fee,
        trade_fee: result.trade_fee,
        max_amount_in,
        price_impact: result.price_impact,
    })
}

/// Render `value` with exactly `places` fractional digits, rounding half away
/// from zero
pub fn format_decimal(value: &BigRational, places: u32) -> String {
    let scale = num_traits::pow(BigInt::from(10u8), places as usize);
    let units = (value * BigRational::from_integer(scale)).round().to_integer();

    let sign = if units.is_negative() { "-" } else { "" };
    let digits = units.abs().to_string();
    if places == 0 {
        return format!("{}{}", sign, digits);
    }

    let places = places as usize;
    let digits = format!("{:0>width$}", digits, width = places + 1);
    let (whole, fraction) = digits.split_at(digits.len() - places);
    format!("{}{}.{}", sign, whole, fraction)
}
