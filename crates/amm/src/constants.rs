//! Program ids, derivation seeds and protocol constants

use solana_sdk::{pubkey, pubkey::Pubkey};
use std::str::FromStr;

/// Raydium liquidity pool v4
pub const LEGACY_AMM_MAINNET_PROGRAM: Pubkey = pubkey!("675kPX9MHTjS2zt1qfr1NYHuzeLXfQM9H24wFSUt1Mp8");
pub const LEGACY_AMM_DEVNET_PROGRAM: Pubkey = pubkey!("HWy1jotHpo6UqeQxx49dpYYdQB8wj9Qk9MdxwjLvDHB8");

/// Raydium constant-product AMM (CPMM)
pub const CPMM_MAINNET_PROGRAM: Pubkey = pubkey!("CPMMoo8L3F4NbTegBCKVNunggL7H1ZpdTHKxQB5qKP1C");
pub const CPMM_DEVNET_PROGRAM: Pubkey = pubkey!("CPMDWBwJDtYax9qW7AyRuVC19Cc4L4Vcy4n2BHAbHkCW");

/// Receives the CPMM pool creation fee
pub const CPMM_CREATE_POOL_FEE_MAINNET: Pubkey = pubkey!("DNXgeM9EiiaAbaWvwjHj9fQQLAX5ZsfHyvmYUNRAdNC8");
pub const CPMM_CREATE_POOL_FEE_DEVNET: Pubkey = pubkey!("G11FKBRaAkHAKuLCgLM6K6NUc9rTjPAznRCjZifrTQe2");

pub const TOKEN_PROGRAM_ID: Pubkey = pubkey!("TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA");
pub const TOKEN_2022_PROGRAM_ID: Pubkey = pubkey!("TokenzQdBNbLqP5VEhdkAS6EPFLC1PHnBqCXEpPxuEb");
pub const ASSOCIATED_TOKEN_PROGRAM_ID: Pubkey = pubkey!("ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL");
pub const SYSTEM_PROGRAM_ID: Pubkey = pubkey!("11111111111111111111111111111111");
pub const RENT_SYSVAR_ID: Pubkey = pubkey!("SysvarRent111111111111111111111111111111111");
pub const MEMO_PROGRAM_ID: Pubkey = pubkey!("MemoSq4gqABAXKb96qnH8TysNcWxMyWCqXgDLGmfcHr");

/// Wrapped SOL
pub const NATIVE_MINT: Pubkey = pubkey!("So11111111111111111111111111111111111111112");

pub const LEGACY_AUTHORITY_SEED: &[u8] = b"amm authority";

pub const CPMM_AUTHORITY_SEED: &[u8] = b"vault_and_lp_mint_auth_seed";
pub const CPMM_POOL_SEED: &[u8] = b"pool";
pub const CPMM_LP_MINT_SEED: &[u8] = b"pool_lp_mint";
pub const CPMM_VAULT_SEED: &[u8] = b"pool_vault";
pub const CPMM_OBSERVATION_SEED: &[u8] = b"observation";

/// CPMM fee rates are parts per million
pub const FEE_RATE_DENOMINATOR: u64 = 1_000_000;

/// Basis points scale (10,000 bps = 100%)
pub const BPS_SCALE: u64 = 10_000;

/// Solana cluster the program ids are taken from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cluster {
    #[default]
    Mainnet,
    Devnet,
}

impl Cluster {
    pub fn legacy_amm_program(&self) -> Pubkey {
        match self {
            Cluster::Mainnet => LEGACY_AMM_MAINNET_PROGRAM,
            Cluster::Devnet => LEGACY_AMM_DEVNET_PROGRAM,
        }
    }

    pub fn cpmm_program(&self) -> Pubkey {
        match self {
            Cluster::Mainnet => CPMM_MAINNET_PROGRAM,
            Cluster::Devnet => CPMM_DEVNET_PROGRAM,
        }
    }

    pub fn cpmm_create_pool_fee_receiver(&self) -> Pubkey {
        match self {
            Cluster::Mainnet => CPMM_CREATE_POOL_FEE_MAINNET,
            Cluster::Devnet => CPMM_CREATE_POOL_FEE_DEVNET,
        }
    }
}

impl FromStr for Cluster {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mainnet" | "mainnet-beta" => Ok(Cluster::Mainnet),
            "devnet" => Ok(Cluster::Devnet),
            other => Err(format!("unknown cluster: {}", other)),
        }
    }
}
