//! Error types shared by the codec, curve, encoder and resolver

use solana_sdk::pubkey::Pubkey;
use thiserror::Error;

/// Every failure the core can report.
///
/// Decode and curve errors describe malformed input or an unsatisfiable trade
/// and are not worth retrying. `Fetch` is the only transient failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SwapError {
    /// Buffer ended before a fixed-width field could be read
    #[error("buffer truncated: need {needed} bytes at offset {offset}, buffer has {len}")]
    TruncatedBuffer {
        offset: usize,
        needed: usize,
        len: usize,
    },

    /// Layout tag, name, owner program or account discriminator not recognized
    #[error("unknown layout: {0}")]
    UnknownLayout(String),

    #[error("division by zero")]
    ZeroDivisor,

    /// Ceiling division whose floor quotient is zero
    #[error("ceiling division produced a zero quotient")]
    ZeroQuotient,

    #[error("swap would produce zero output")]
    ZeroOutput,

    /// Output reserve too small to serve any exact-out request
    #[error("output reserve {reserve} cannot be drained")]
    FullReserveDrain { reserve: u64 },

    #[error("fee rate {numerator}/{denominator} is not below 100%")]
    InvalidFeeRate { numerator: u64, denominator: u64 },

    #[error("slippage {0} bps exceeds 10000")]
    InvalidSlippage(u64),

    #[error("arithmetic overflow")]
    Overflow,

    #[error("mint {0} is not traded by this pool")]
    MintNotInPool(Pubkey),

    /// CPMM fee rate requested but the config account was not fetched
    #[error("fee config {0} was not resolved")]
    MissingConfig(Pubkey),

    /// Unswept fee accruals exceed the vault balance
    #[error("vault balance {balance} is below accrued fees {accrued}")]
    ReserveUnderflow { balance: u64, accrued: u64 },

    #[error("account not found: {0}")]
    AccountNotFound(Pubkey),

    #[error("account fetch failed: {0}")]
    Fetch(String),
}

impl SwapError {
    /// Whether re-issuing the same request may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, SwapError::Fetch(_))
    }
}

pub type Result<T> = core::result::Result<T, SwapError>;
