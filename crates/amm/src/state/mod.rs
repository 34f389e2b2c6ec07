//! Pool account layouts

pub mod cpmm;
pub mod legacy;
pub mod token;

pub use cpmm::*;
pub use legacy::*;
pub use token::*;

use crate::constants::{
    CPMM_DEVNET_PROGRAM, CPMM_MAINNET_PROGRAM, LEGACY_AMM_DEVNET_PROGRAM,
    LEGACY_AMM_MAINNET_PROGRAM,
};
use rayswap_common::{Layout, Result, SwapError};
use solana_sdk::pubkey::Pubkey;
use std::fmt;
use std::str::FromStr;

/// Which pool layout a buffer holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayoutKind {
    /// Raydium liquidity pool v4 (`AmmInfo`)
    LegacyAmm,
    /// Raydium constant-product v2 (`PoolState`)
    Cpmm,
}

impl LayoutKind {
    /// Numeric tag: 0 = legacy, 1 = CPMM
    pub fn from_tag(tag: u8) -> Result<Self> {
        match tag {
            0 => Ok(LayoutKind::LegacyAmm),
            1 => Ok(LayoutKind::Cpmm),
            _ => Err(SwapError::UnknownLayout(format!("layout tag {}", tag))),
        }
    }

    pub fn tag(&self) -> u8 {
        match self {
            LayoutKind::LegacyAmm => 0,
            LayoutKind::Cpmm => 1,
        }
    }

    /// Layout of accounts owned by `program_id`, on either cluster
    pub fn from_program_id(program_id: &Pubkey) -> Result<Self> {
        if *program_id == LEGACY_AMM_MAINNET_PROGRAM || *program_id == LEGACY_AMM_DEVNET_PROGRAM {
            Ok(LayoutKind::LegacyAmm)
        } else if *program_id == CPMM_MAINNET_PROGRAM || *program_id == CPMM_DEVNET_PROGRAM {
            Ok(LayoutKind::Cpmm)
        } else {
            Err(SwapError::UnknownLayout(format!("owner program {}", program_id)))
        }
    }

    /// Bytes a pool account of this kind occupies
    pub fn span(&self) -> usize {
        match self {
            LayoutKind::LegacyAmm => AmmInfo::LEN,
            LayoutKind::Cpmm => CpmmPoolState::LEN,
        }
    }
}

impl FromStr for LayoutKind {
    type Err = SwapError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "legacy" | "legacy_amm" | "amm_v4" | "v4" => Ok(LayoutKind::LegacyAmm),
            "cpmm" => Ok(LayoutKind::Cpmm),
            other => Err(SwapError::UnknownLayout(other.to_string())),
        }
    }
}

impl fmt::Display for LayoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutKind::LegacyAmm => write!(f, "legacy"),
            LayoutKind::Cpmm => write!(f, "cpmm"),
        }
    }
}

/// Decoded pool account. Both variants expose the same capability set; base is
/// coin / token 0, quote is pc / token 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolState {
    Legacy(AmmInfo),
    Cpmm(CpmmPoolState),
}

impl PoolState {
    /// Decode a pool account buffer. Fails without partial results.
    pub fn decode(data: &[u8], kind: LayoutKind) -> Result<Self> {
        match kind {
            LayoutKind::LegacyAmm => AmmInfo::decode(data).map(PoolState::Legacy),
            LayoutKind::Cpmm => CpmmPoolState::decode(data).map(PoolState::Cpmm),
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        match self {
            PoolState::Legacy(info) => info.encode(),
            PoolState::Cpmm(pool) => pool.encode(),
        }
    }

    pub fn layout_kind(&self) -> LayoutKind {
        match self {
            PoolState::Legacy(_) => LayoutKind::LegacyAmm,
            PoolState::Cpmm(_) => LayoutKind::Cpmm,
        }
    }

    pub fn base_mint(&self) -> Pubkey {
        match self {
            PoolState::Legacy(info) => info.coin_mint,
            PoolState::Cpmm(pool) => pool.token_0_mint,
        }
    }

    pub fn quote_mint(&self) -> Pubkey {
        match self {
            PoolState::Legacy(info) => info.pc_mint,
            PoolState::Cpmm(pool) => pool.token_1_mint,
        }
    }

    pub fn base_vault(&self) -> Pubkey {
        match self {
            PoolState::Legacy(info) => info.coin_vault,
            PoolState::Cpmm(pool) => pool.token_0_vault,
        }
    }

    pub fn quote_vault(&self) -> Pubkey {
        match self {
            PoolState::Legacy(info) => info.pc_vault,
            PoolState::Cpmm(pool) => pool.token_1_vault,
        }
    }

    pub fn lp_mint(&self) -> Pubkey {
        match self {
            PoolState::Legacy(info) => info.lp_mint,
            PoolState::Cpmm(pool) => pool.lp_mint,
        }
    }

    pub fn base_decimals(&self) -> u8 {
        match self {
            PoolState::Legacy(info) => narrow_decimals(info.coin_decimals),
            PoolState::Cpmm(pool) => pool.mint_0_decimals,
        }
    }

    pub fn quote_decimals(&self) -> u8 {
        match self {
            PoolState::Legacy(info) => narrow_decimals(info.pc_decimals),
            PoolState::Cpmm(pool) => pool.mint_1_decimals,
        }
    }

    /// Fee configuration account; legacy pools carry their fees inline
    pub fn config_id(&self) -> Option<Pubkey> {
        match self {
            PoolState::Legacy(_) => None,
            PoolState::Cpmm(pool) => Some(pool.amm_config),
        }
    }

    /// True when `mint` is the base side, false for the quote side
    pub fn is_base_mint(&self, mint: &Pubkey) -> Result<bool> {
        if *mint == self.base_mint() {
            Ok(true)
        } else if *mint == self.quote_mint() {
            Ok(false)
        } else {
            Err(SwapError::MintNotInPool(*mint))
        }
    }
}

/// Legacy decimals are stored as u64; no real mint exceeds u8.
fn narrow_decimals(decimals: u64) -> u8 {
    u8::try_from(decimals).unwrap_or(u8::MAX)
}

/// Decode a pool account using the layout of its owning program
pub fn decode_pool(data: &[u8], owner: &Pubkey) -> Result<PoolState> {
    PoolState::decode(data, LayoutKind::from_program_id(owner)?)
}
