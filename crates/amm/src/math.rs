//! Constant product swap curve (x·y=k) with input-side trade fees
//!
//! Integer arithmetic matches the on-chain program exactly: reserves are
//! widened to 256 bits, the fee is rounded up, and the new output reserve is
//! rounded up so the pool never pays out more than the curve allows.
//! Prices and impacts are exact rationals.

use crate::constants::FEE_RATE_DENOMINATOR;
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{Signed, Zero};
use primitive_types::U256;
use rayswap_common::{Result, SwapError};

/// Trade fee as a fraction of the input amount
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeRate {
    numerator: u64,
    denominator: u64,
}

impl FeeRate {
    /// Fee of `numerator / denominator`; must be strictly below 100%
    pub fn new(numerator: u64, denominator: u64) -> Result<Self> {
        if denominator == 0 {
            return Err(SwapError::ZeroDivisor);
        }
        if numerator >= denominator {
            return Err(SwapError::InvalidFeeRate {
                numerator,
                denominator,
            });
        }
        Ok(Self {
            numerator,
            denominator,
        })
    }

    /// CPMM fee rate in parts per million
    pub fn from_ppm(rate: u64) -> Result<Self> {
        Self::new(rate, FEE_RATE_DENOMINATOR)
    }

    pub fn numerator(&self) -> u64 {
        self.numerator
    }

    pub fn denominator(&self) -> u64 {
        self.denominator
    }

    pub fn zero() -> Self {
        Self {
            numerator: 0,
            denominator: FEE_RATE_DENOMINATOR,
        }
    }

    /// Fee charged on `amount`, rounded up
    pub fn trading_fee(&self, amount: u64) -> Result<u64> {
        let fee = ceil_div(
            U256::from(amount) * U256::from(self.numerator),
            U256::from(self.denominator),
        )?;
        to_u64(fee)
    }
}

/// Outcome of an exact-input swap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapResult {
    pub amount_out: u64,
    pub trade_fee: u64,
    /// Full input including the fee
    pub source_amount_swapped: u64,
    pub new_reserve_in: u64,
    pub new_reserve_out: u64,
}

/// Outcome of an exact-output swap
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExactOutResult {
    /// Requested output after clamping to what the pool can pay
    pub amount_out: u64,
    pub amount_in: u64,
    pub amount_in_without_fee: u64,
    pub trade_fee: u64,
    pub price_impact: BigRational,
}

/// `ceil(dividend / divisor)`
pub fn ceil_div(dividend: U256, divisor: U256) -> Result<U256> {
    if divisor.is_zero() {
        return Err(SwapError::ZeroDivisor);
    }
    let (quotient, remainder) = dividend.div_mod(divisor);
    if remainder.is_zero() {
        Ok(quotient)
    } else {
        Ok(quotient + U256::one())
    }
}

/// Ceiling division that also re-derives the divisor so that
/// `quotient * divisor >= dividend` holds with the rounded quotient.
///
/// Returns `(quotient, divisor)`.
pub fn checked_ceil_div(dividend: U256, divisor: U256) -> Result<(U256, U256)> {
    if divisor.is_zero() {
        return Err(SwapError::ZeroDivisor);
    }
    let (mut quotient, remainder) = dividend.div_mod(divisor);
    if quotient.is_zero() {
        return Err(SwapError::ZeroQuotient);
    }

    let mut divisor = divisor;
    if !remainder.is_zero() {
        quotient += U256::one();
        let (rederived, remainder) = dividend.div_mod(quotient);
        divisor = rederived;
        if !remainder.is_zero() {
            divisor += U256::one();
        }
    }
    Ok((quotient, divisor))
}

/// Output for `source_amount` already net of fees
pub fn swap_without_fees(source_amount: u64, reserve_in: u64, reserve_out: u64) -> Result<u64> {
    let invariant = U256::from(reserve_in) * U256::from(reserve_out);
    let new_reserve_in = U256::from(reserve_in) + U256::from(source_amount);
    let (new_reserve_out, _) = checked_ceil_div(invariant, new_reserve_in)?;

    let amount_out = U256::from(reserve_out)
        .checked_sub(new_reserve_out)
        .ok_or(SwapError::Overflow)?;
    if amount_out.is_zero() {
        return Err(SwapError::ZeroOutput);
    }
    to_u64(amount_out)
}

/// Swap `source_amount_in` of the input token against the pool
pub fn compute_swap(
    source_amount_in: u64,
    reserve_in: u64,
    reserve_out: u64,
    fee_rate: FeeRate,
) -> Result<SwapResult> {
    let trade_fee = fee_rate.trading_fee(source_amount_in)?;
    let amount_in_less_fee = source_amount_in
        .checked_sub(trade_fee)
        .ok_or(SwapError::Overflow)?;

    let amount_out = swap_without_fees(amount_in_less_fee, reserve_in, reserve_out)?;

    let new_reserve_in = reserve_in
        .checked_add(amount_in_less_fee)
        .ok_or(SwapError::Overflow)?;
    // amount_out <= reserve_out by construction
    let new_reserve_out = reserve_out - amount_out;

    Ok(SwapResult {
        amount_out,
        trade_fee,
        source_amount_swapped: source_amount_in,
        new_reserve_in,
        new_reserve_out,
    })
}

/// Input needed to receive `desired_amount_out` of the output token.
///
/// Requests at or above the output reserve are clamped to `reserve_out - 1`.
pub fn compute_swap_exact_out(
    reserve_in: u64,
    reserve_out: u64,
    decimals_in: u8,
    decimals_out: u8,
    fee_rate: FeeRate,
    desired_amount_out: u64,
) -> Result<ExactOutResult> {
    if desired_amount_out == 0 {
        return Err(SwapError::ZeroOutput);
    }
    if reserve_out <= 1 {
        return Err(SwapError::FullReserveDrain {
            reserve: reserve_out,
        });
    }
    let amount_out = desired_amount_out.min(reserve_out - 1);

    let amount_in_without_fee = ceil_div(
        U256::from(reserve_in) * U256::from(amount_out),
        U256::from(reserve_out - amount_out),
    )?;
    // An empty input reserve would hand out tokens for nothing
    if amount_in_without_fee.is_zero() {
        return Err(SwapError::ZeroQuotient);
    }
    let amount_in = ceil_div(
        amount_in_without_fee * U256::from(fee_rate.denominator),
        U256::from(fee_rate.denominator.checked_sub(fee_rate.numerator).ok_or(
            SwapError::InvalidFeeRate {
                numerator: fee_rate.numerator,
                denominator: fee_rate.denominator,
            },
        )?),
    )?;

    let amount_in = to_u64(amount_in)?;
    let amount_in_without_fee = to_u64(amount_in_without_fee)?;

    let spot = decimal_price(reserve_out, decimals_out, reserve_in, decimals_in);
    let execution = decimal_price(amount_out, decimals_out, amount_in, decimals_in);
    let price_impact = match (spot, execution) {
        (Some(spot), Some(execution)) => price_impact(&spot, &execution),
        _ => BigRational::zero(),
    };

    Ok(ExactOutResult {
        amount_out,
        amount_in,
        amount_in_without_fee,
        trade_fee: amount_in - amount_in_without_fee,
        price_impact,
    })
}

/// `(numer / 10^numer_decimals) / (denom / 10^denom_decimals)`, or `None`
/// when the denominator amount is zero
pub fn decimal_price(
    numer: u64,
    numer_decimals: u8,
    denom: u64,
    denom_decimals: u8,
) -> Option<BigRational> {
    if denom == 0 {
        return None;
    }
    let numer = BigRational::new(BigInt::from(numer), pow10(numer_decimals));
    let denom = BigRational::new(BigInt::from(denom), pow10(denom_decimals));
    Some(numer / denom)
}

/// `|execution - spot| / spot`, zero when spot is zero
pub fn price_impact(spot: &BigRational, execution: &BigRational) -> BigRational {
    if spot.is_zero() {
        return BigRational::zero();
    }
    ((execution - spot) / spot).abs()
}

fn pow10(decimals: u8) -> BigInt {
    num_traits::pow(BigInt::from(10u8), decimals as usize)
}

fn to_u64(value: U256) -> Result<u64> {
    if value > U256::from(u64::MAX) {
        return Err(SwapError::Overflow);
    }
    Ok(value.low_u64())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn legacy_fee() -> FeeRate {
        FeeRate::new(25, 10_000).unwrap()
    }

    #[test]
    fn test_fee_rate_validation() {
        assert_eq!(FeeRate::new(1, 0), Err(SwapError::ZeroDivisor));
        assert_eq!(
            FeeRate::new(10_000, 10_000),
            Err(SwapError::InvalidFeeRate {
                numerator: 10_000,
                denominator: 10_000
            })
        );
        assert_eq!(FeeRate::from_ppm(2_500).unwrap().denominator(), 1_000_000);
        assert!(FeeRate::from_ppm(1_000_000).is_err());

        let fee = FeeRate::new(25, 10_000).unwrap();
        assert_eq!((fee.numerator(), fee.denominator()), (25, 10_000));
    }

    #[test]
    fn test_exact_out_rejects_fee_above_one() {
        let fee = FeeRate {
            numerator: 20,
            denominator: 10,
        };
        assert_eq!(
            compute_swap_exact_out(1_000_000, 2_000_000, 6, 6, fee, 10_000),
            Err(SwapError::InvalidFeeRate {
                numerator: 20,
                denominator: 10
            })
        );
    }

    #[test]
    fn test_trading_fee_rounds_up() {
        let fee = FeeRate::from_ppm(2_500).unwrap();
        assert_eq!(fee.trading_fee(10_000).unwrap(), 25);
        assert_eq!(fee.trading_fee(10_001).unwrap(), 26);
        assert_eq!(fee.trading_fee(1).unwrap(), 1);
        assert_eq!(fee.trading_fee(0).unwrap(), 0);
        assert_eq!(FeeRate::zero().trading_fee(u64::MAX).unwrap(), 0);
    }

    #[test]
    fn test_ceil_div() {
        assert_eq!(ceil_div(U256::from(10), U256::from(5)).unwrap(), U256::from(2));
        assert_eq!(ceil_div(U256::from(11), U256::from(5)).unwrap(), U256::from(3));
        assert_eq!(ceil_div(U256::zero(), U256::from(5)).unwrap(), U256::zero());
        assert_eq!(ceil_div(U256::from(1), U256::zero()), Err(SwapError::ZeroDivisor));
    }

    #[test]
    fn test_checked_ceil_div() {
        // Exact division leaves the divisor untouched
        assert_eq!(
            checked_ceil_div(U256::from(100), U256::from(10)).unwrap(),
            (U256::from(10), U256::from(10))
        );

        // 100 / 7 = 14 r 2 -> quotient 15, divisor re-derived as ceil(100 / 15) = 7
        assert_eq!(
            checked_ceil_div(U256::from(100), U256::from(7)).unwrap(),
            (U256::from(15), U256::from(7))
        );

        assert_eq!(
            checked_ceil_div(U256::from(3), U256::from(7)),
            Err(SwapError::ZeroQuotient)
        );
        assert_eq!(
            checked_ceil_div(U256::from(3), U256::zero()),
            Err(SwapError::ZeroDivisor)
        );
    }

    #[test]
    fn test_compute_swap_reference() {
        let result = compute_swap(10_000, 1_000_000, 2_000_000, legacy_fee()).unwrap();

        assert_eq!(result.trade_fee, 25);
        assert_eq!(result.source_amount_swapped, 10_000);
        assert_eq!(result.new_reserve_in, 1_009_975);
        assert_eq!(result.amount_out, 19_752);
        assert_eq!(result.new_reserve_out, 1_980_248);
    }

    #[test]
    fn test_compute_swap_without_fee() {
        let result = compute_swap(10_000, 1_000_000, 2_000_000, FeeRate::zero()).unwrap();
        assert_eq!(result.trade_fee, 0);
        assert_eq!(result.amount_out, 19_801);
    }

    #[test]
    fn test_compute_swap_errors() {
        // Rounds to nothing
        assert_eq!(
            compute_swap(1, 1_000_000, 1_000_000, legacy_fee()),
            Err(SwapError::ZeroOutput)
        );
        // Empty pool
        assert_eq!(
            compute_swap(1_000, 0, 1_000_000, legacy_fee()),
            Err(SwapError::ZeroQuotient)
        );
        assert_eq!(
            compute_swap(0, 0, 1_000_000, FeeRate::zero()),
            Err(SwapError::ZeroDivisor)
        );
    }

    #[test]
    fn test_compute_swap_large_reserves() {
        // k exceeds u128
        let reserve = u64::MAX / 2;
        let result = compute_swap(1_000_000_000, reserve, reserve, legacy_fee()).unwrap();
        assert!(result.amount_out > 0);
        assert!(result.amount_out < 1_000_000_000);
    }

    #[test]
    fn test_round_trip_loses_to_fees() {
        let forward = compute_swap(50_000, 1_000_000, 2_000_000, legacy_fee()).unwrap();
        let back = compute_swap(
            forward.amount_out,
            forward.new_reserve_out,
            forward.new_reserve_in,
            legacy_fee(),
        )
        .unwrap();
        assert!(back.amount_out < 50_000);
    }

    #[test]
    fn test_exact_out_reference() {
        let fee = FeeRate::from_ppm(2_500).unwrap();

        let result = compute_swap_exact_out(1_000_000, 2_000_000, 9, 6, fee, 19_751).unwrap();
        assert_eq!(result.amount_out, 19_751);
        assert_eq!(result.amount_in_without_fee, 9_974);
        assert_eq!(result.amount_in, 9_999);
        assert_eq!(result.trade_fee, 25);

        let result = compute_swap_exact_out(1_000_000, 2_000_000, 6, 6, fee, 10_000).unwrap();
        assert_eq!(result.amount_in_without_fee, 5_026);
        assert_eq!(result.amount_in, 5_039);
        assert_eq!(result.trade_fee, 13);
    }

    #[test]
    fn test_exact_out_clamps_to_reserve() {
        let fee = FeeRate::from_ppm(2_500).unwrap();
        let result = compute_swap_exact_out(1_000_000, 2_000_000, 6, 6, fee, 5_000_000).unwrap();

        assert_eq!(result.amount_out, 1_999_999);
        assert_eq!(result.amount_in_without_fee, 1_999_999_000_000);
        assert_eq!(result.amount_in, 2_005_011_528_823);

        let exact = compute_swap_exact_out(1_000_000, 2_000_000, 6, 6, fee, 2_000_000).unwrap();
        assert_eq!(exact.amount_out, 1_999_999);
    }

    #[test]
    fn test_exact_out_errors() {
        let fee = FeeRate::from_ppm(2_500).unwrap();
        assert_eq!(
            compute_swap_exact_out(1_000_000, 1, 6, 6, fee, 1),
            Err(SwapError::FullReserveDrain { reserve: 1 })
        );
        assert_eq!(
            compute_swap_exact_out(1_000_000, 2_000_000, 6, 6, fee, 0),
            Err(SwapError::ZeroOutput)
        );
        // Empty input side fails like the exact-in path
        assert_eq!(
            compute_swap_exact_out(0, 2_000_000, 6, 6, fee, 10_000),
            Err(SwapError::ZeroQuotient)
        );
        assert_eq!(
            compute_swap(10_000, 0, 2_000_000, fee),
            Err(SwapError::ZeroQuotient)
        );
        // Input requirement does not fit in u64
        assert_eq!(
            compute_swap_exact_out(u64::MAX, u64::MAX, 6, 6, fee, u64::MAX - 2),
            Err(SwapError::Overflow)
        );
    }

    #[test]
    fn test_exact_out_price_impact() {
        let fee = FeeRate::zero();
        // Spot 2 out per in; 10_000 out costs 5_026 in
        let result = compute_swap_exact_out(1_000_000, 2_000_000, 6, 6, fee, 10_000).unwrap();
        let expected = BigRational::new(BigInt::from(52), BigInt::from(10_052));
        assert_eq!(result.price_impact, expected);

        // Decimals scale both prices alike
        let scaled = compute_swap_exact_out(1_000_000, 2_000_000, 9, 3, fee, 10_000).unwrap();
        assert_eq!(scaled.price_impact, expected);
    }

    #[test]
    fn test_decimal_price() {
        let price = decimal_price(2_000_000, 6, 1_000_000_000, 9).unwrap();
        assert_eq!(price, BigRational::from_integer(BigInt::from(2)));
        assert!(decimal_price(1, 6, 0, 9).is_none());
    }

    #[test]
    fn test_price_impact_zero_spot() {
        let exec = BigRational::from_integer(BigInt::from(3));
        assert!(price_impact(&BigRational::zero(), &exec).is_zero());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(500))]

        #[test]
        fn prop_invariant_never_decreases(
            reserve_in in 1_000u64..1_000_000_000_000,
            reserve_out in 1_000u64..1_000_000_000_000,
            amount in 1u64..1_000_000_000,
            fee_ppm in 0u64..100_000,
        ) {
            let fee = FeeRate::from_ppm(fee_ppm).unwrap();
            if let Ok(result) = compute_swap(amount, reserve_in, reserve_out, fee) {
                let before = U256::from(reserve_in) * U256::from(reserve_out);
                let after = U256::from(result.new_reserve_in) * U256::from(result.new_reserve_out);
                prop_assert!(after >= before);
                prop_assert!(result.amount_out < reserve_out);
            }
        }

        #[test]
        fn prop_fee_monotonic(
            reserve_in in 1_000u64..1_000_000_000_000,
            reserve_out in 1_000u64..1_000_000_000_000,
            amount in 1u64..1_000_000_000,
            low in 0u64..50_000,
            bump in 1u64..50_000,
        ) {
            let low_fee = FeeRate::from_ppm(low).unwrap();
            let high_fee = FeeRate::from_ppm(low + bump).unwrap();
            if let (Ok(cheap), Ok(dear)) = (
                compute_swap(amount, reserve_in, reserve_out, low_fee),
                compute_swap(amount, reserve_in, reserve_out, high_fee),
            ) {
                prop_assert!(dear.amount_out <= cheap.amount_out);
                prop_assert!(dear.trade_fee >= cheap.trade_fee);
            }
        }

        #[test]
        fn prop_positive_fee_never_raises_output(
            reserve in 1_000_000u64..1_000_000_000_000,
            amount in 10_000u64..1_000_000_000,
            fee_ppm in 1u64..100_000,
        ) {
            let free = compute_swap(amount, reserve, reserve, FeeRate::zero()).unwrap();
            let paid = compute_swap(amount, reserve, reserve, FeeRate::from_ppm(fee_ppm).unwrap()).unwrap();
            prop_assert!(paid.trade_fee >= 1);
            prop_assert!(paid.amount_out <= free.amount_out);
        }

        #[test]
        fn prop_exact_out_buys_at_least_requested(
            reserve_in in 1_000u64..1_000_000_000,
            reserve_out in 1_000u64..1_000_000_000,
            desired in 1u64..1_000_000,
            fee_ppm in 0u64..100_000,
        ) {
            let fee = FeeRate::from_ppm(fee_ppm).unwrap();
            let quote = compute_swap_exact_out(reserve_in, reserve_out, 6, 6, fee, desired).unwrap();
            prop_assert!(quote.amount_out < reserve_out);
            if let Ok(swap) = compute_swap(quote.amount_in, reserve_in, reserve_out, fee) {
                prop_assert!(swap.amount_out >= quote.amount_out);
            }
        }
    }
}
