//! Raydium CPMM accounts: `PoolState` and its fee `AmmConfig`
//!
//! Both are Anchor accounts and start with an 8-byte account discriminator.
//! A mismatching discriminator means the buffer holds a different account
//! type and is reported as an unknown layout.

use rayswap_common::{Layout, LayoutReader, LayoutWriter, Result, SwapError};
use solana_sdk::pubkey::Pubkey;

fn expect_discriminator(r: &mut LayoutReader<'_>, expected: [u8; 8], name: &str) -> Result<()> {
    let found: [u8; 8] = r.read_bytes()?;
    if found != expected {
        return Err(SwapError::UnknownLayout(format!(
            "account discriminator {:?} is not {}",
            found, name
        )));
    }
    Ok(())
}

/// CPMM pool account
///
/// Token 0 is the base side, token 1 the quote side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CpmmPoolState {
    pub amm_config: Pubkey,
    pub pool_creator: Pubkey,
    pub token_0_vault: Pubkey,
    pub token_1_vault: Pubkey,
    pub lp_mint: Pubkey,
    pub token_0_mint: Pubkey,
    pub token_1_mint: Pubkey,
    pub token_0_program: Pubkey,
    pub token_1_program: Pubkey,
    pub observation_key: Pubkey,
    pub auth_bump: u8,
    pub status: u8,
    pub lp_mint_decimals: u8,
    pub mint_0_decimals: u8,
    pub mint_1_decimals: u8,
    pub lp_supply: u64,
    /// Protocol fees accrued in token 0 and not yet collected
    pub protocol_fees_token_0: u64,
    pub protocol_fees_token_1: u64,
    /// Fund fees accrued in token 0 and not yet collected
    pub fund_fees_token_0: u64,
    pub fund_fees_token_1: u64,
    pub open_time: u64,
    pub recent_epoch: u64,
    pub padding: [u64; 31],
}

impl CpmmPoolState {
    pub const DISCRIMINATOR: [u8; 8] = [247, 237, 227, 245, 215, 195, 222, 70];
}

impl Layout for CpmmPoolState {
    const LEN: usize = 637;

    fn unpack(r: &mut LayoutReader<'_>) -> Result<Self> {
        expect_discriminator(r, Self::DISCRIMINATOR, "PoolState")?;
        Ok(Self {
            amm_config: r.read_pubkey()?,
            pool_creator: r.read_pubkey()?,
            token_0_vault: r.read_pubkey()?,
            token_1_vault: r.read_pubkey()?,
            lp_mint: r.read_pubkey()?,
            token_0_mint: r.read_pubkey()?,
            token_1_mint: r.read_pubkey()?,
            token_0_program: r.read_pubkey()?,
            token_1_program: r.read_pubkey()?,
            observation_key: r.read_pubkey()?,
            auth_bump: r.read_u8()?,
            status: r.read_u8()?,
            lp_mint_decimals: r.read_u8()?,
            mint_0_decimals: r.read_u8()?,
            mint_1_decimals: r.read_u8()?,
            lp_supply: r.read_u64()?,
            protocol_fees_token_0: r.read_u64()?,
            protocol_fees_token_1: r.read_u64()?,
            fund_fees_token_0: r.read_u64()?,
            fund_fees_token_1: r.read_u64()?,
            open_time: r.read_u64()?,
            recent_epoch: r.read_u64()?,
            padding: r.read_u64_array()?,
        })
    }

    fn pack(&self, w: &mut LayoutWriter) {
        w.write_bytes(&Self::DISCRIMINATOR);
        w.write_pubkey(&self.amm_config);
        w.write_pubkey(&self.pool_creator);
        w.write_pubkey(&self.token_0_vault);
        w.write_pubkey(&self.token_1_vault);
        w.write_pubkey(&self.lp_mint);
        w.write_pubkey(&self.token_0_mint);
        w.write_pubkey(&self.token_1_mint);
        w.write_pubkey(&self.token_0_program);
        w.write_pubkey(&self.token_1_program);
        w.write_pubkey(&self.observation_key);
        w.write_u8(self.auth_bump);
        w.write_u8(self.status);
        w.write_u8(self.lp_mint_decimals);
        w.write_u8(self.mint_0_decimals);
        w.write_u8(self.mint_1_decimals);
        w.write_u64(self.lp_supply);
        w.write_u64(self.protocol_fees_token_0);
        w.write_u64(self.protocol_fees_token_1);
        w.write_u64(self.fund_fees_token_0);
        w.write_u64(self.fund_fees_token_1);
        w.write_u64(self.open_time);
        w.write_u64(self.recent_epoch);
        w.write_u64_array(&self.padding);
    }
}

/// CPMM fee configuration shared by every pool created under it
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AmmConfig {
    pub bump: u8,
    pub disable_create_pool: bool,
    pub index: u16,
    /// Parts per million of the input amount
    pub trade_fee_rate: u64,
    /// Share of the trade fee, parts per million
    pub protocol_fee_rate: u64,
    pub fund_fee_rate: u64,
    pub create_pool_fee: u64,
    pub protocol_owner: Pubkey,
    pub fund_owner: Pubkey,
    pub padding: [u64; 16],
}

impl AmmConfig {
    pub const DISCRIMINATOR: [u8; 8] = [218, 244, 33, 104, 203, 203, 43, 111];
}

impl Layout for AmmConfig {
    const LEN: usize = 236;

    fn unpack(r: &mut LayoutReader<'_>) -> Result<Self> {
        expect_discriminator(r, Self::DISCRIMINATOR, "AmmConfig")?;
        Ok(Self {
            bump: r.read_u8()?,
            disable_create_pool: r.read_bool()?,
            index: r.read_u16()?,
            trade_fee_rate: r.read_u64()?,
            protocol_fee_rate: r.read_u64()?,
            fund_fee_rate: r.read_u64()?,
            create_pool_fee: r.read_u64()?,
            protocol_owner: r.read_pubkey()?,
            fund_owner: r.read_pubkey()?,
            padding: r.read_u64_array()?,
        })
    }

    fn pack(&self, w: &mut LayoutWriter) {
        w.write_bytes(&Self::DISCRIMINATOR);
        w.write_u8(self.bump);
        w.write_bool(self.disable_create_pool);
        w.write_u16(self.index);
        w.write_u64(self.trade_fee_rate);
        w.write_u64(self.protocol_fee_rate);
        w.write_u64(self.fund_fee_rate);
        w.write_u64(self.create_pool_fee);
        w.write_pubkey(&self.protocol_owner);
        w.write_pubkey(&self.fund_owner);
        w.write_u64_array(&self.padding);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::constants::TOKEN_PROGRAM_ID;

    pub(crate) fn sample_pool_state() -> CpmmPoolState {
        CpmmPoolState {
            amm_config: Pubkey::new_unique(),
            pool_creator: Pubkey::new_unique(),
            token_0_vault: Pubkey::new_unique(),
            token_1_vault: Pubkey::new_unique(),
            lp_mint: Pubkey::new_unique(),
            token_0_mint: Pubkey::new_unique(),
            token_1_mint: Pubkey::new_unique(),
            token_0_program: TOKEN_PROGRAM_ID,
            token_1_program: TOKEN_PROGRAM_ID,
            observation_key: Pubkey::new_unique(),
            auth_bump: 253,
            status: 0,
            lp_mint_decimals: 9,
            mint_0_decimals: 9,
            mint_1_decimals: 6,
            lp_supply: 5_000_000_000,
            protocol_fees_token_0: 1_200,
            protocol_fees_token_1: 340,
            fund_fees_token_0: 300,
            fund_fees_token_1: 85,
            open_time: 1_717_000_000,
            recent_epoch: 640,
            padding: [0; 31],
        }
    }

    pub(crate) fn sample_config() -> AmmConfig {
        AmmConfig {
            bump: 250,
            disable_create_pool: false,
            index: 0,
            trade_fee_rate: 2_500,
            protocol_fee_rate: 120_000,
            fund_fee_rate: 40_000,
            create_pool_fee: 150_000_000,
            protocol_owner: Pubkey::new_unique(),
            fund_owner: Pubkey::new_unique(),
            padding: [0; 16],
        }
    }

    #[test]
    fn test_sizes() {
        assert_eq!(CpmmPoolState::LEN, 8 + 10 * 32 + 5 + 7 * 8 + 31 * 8);
        assert_eq!(AmmConfig::LEN, 8 + 1 + 1 + 2 + 4 * 8 + 2 * 32 + 16 * 8);
        assert_eq!(sample_pool_state().encode().len(), CpmmPoolState::LEN);
        assert_eq!(sample_config().encode().len(), AmmConfig::LEN);
    }

    #[test]
    fn test_pool_round_trip() {
        let pool = sample_pool_state();
        assert_eq!(CpmmPoolState::decode(&pool.encode()).unwrap(), pool);
    }

    #[test]
    fn test_config_round_trip() {
        let config = sample_config();
        assert_eq!(AmmConfig::decode(&config.encode()).unwrap(), config);
    }

    #[test]
    fn test_pool_field_offsets() {
        let pool = sample_pool_state();
        let bytes = pool.encode();

        assert_eq!(&bytes[..8], &CpmmPoolState::DISCRIMINATOR);
        assert_eq!(&bytes[72..104], pool.token_0_vault.as_ref());
        assert_eq!(&bytes[168..200], pool.token_0_mint.as_ref());
        assert_eq!(bytes[331], 9); // mint_0_decimals
        assert_eq!(bytes[332], 6); // mint_1_decimals
        assert_eq!(&bytes[341..349], &1_200u64.to_le_bytes()); // protocol_fees_token_0
    }

    #[test]
    fn test_config_fee_offset() {
        let bytes = sample_config().encode();
        assert_eq!(&bytes[12..20], &2_500u64.to_le_bytes());
    }

    #[test]
    fn test_wrong_discriminator() {
        let mut bytes = sample_pool_state().encode();
        bytes[0] ^= 0xFF;
        assert!(matches!(
            CpmmPoolState::decode(&bytes),
            Err(SwapError::UnknownLayout(_))
        ));

        // A config buffer is not a pool
        let mut padded = sample_config().encode();
        padded.resize(CpmmPoolState::LEN, 0);
        assert!(matches!(
            CpmmPoolState::decode(&padded),
            Err(SwapError::UnknownLayout(_))
        ));
    }

    #[test]
    fn test_truncated() {
        let pool = sample_pool_state().encode();
        assert!(matches!(
            CpmmPoolState::decode(&pool[..CpmmPoolState::LEN - 1]),
            Err(SwapError::TruncatedBuffer { .. })
        ));

        let config = sample_config().encode();
        assert!(matches!(
            AmmConfig::decode(&config[..AmmConfig::LEN - 1]),
            Err(SwapError::TruncatedBuffer { .. })
        ));
    }
}
