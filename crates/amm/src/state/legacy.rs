//! Raydium liquidity pool v4 account (`AmmInfo`)
//!
//! Layout: 16 × u64 header (128B) + LegacyFees (64B) + LegacyStateData (144B)
//!         + 12 addresses (384B) + lp_amount, client_order_id, padding (32B)
//!
//! The account has no discriminator. The swap statistics in the state data are
//! 16-byte fields of which only the low 64 bits are kept.

use rayswap_common::{Layout, LayoutReader, LayoutWriter, Result};
use solana_sdk::pubkey::Pubkey;

/// Fee schedule stored in the pool
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LegacyFees {
    pub min_separate_numerator: u64,
    pub min_separate_denominator: u64,
    pub trade_fee_numerator: u64,
    pub trade_fee_denominator: u64,
    pub pnl_numerator: u64,
    pub pnl_denominator: u64,
    /// Fee charged on swaps (25/10000 on mainnet pools)
    pub swap_fee_numerator: u64,
    pub swap_fee_denominator: u64,
}

impl Layout for LegacyFees {
    const LEN: usize = 64;

    fn unpack(r: &mut LayoutReader<'_>) -> Result<Self> {
        Ok(Self {
            min_separate_numerator: r.read_u64()?,
            min_separate_denominator: r.read_u64()?,
            trade_fee_numerator: r.read_u64()?,
            trade_fee_denominator: r.read_u64()?,
            pnl_numerator: r.read_u64()?,
            pnl_denominator: r.read_u64()?,
            swap_fee_numerator: r.read_u64()?,
            swap_fee_denominator: r.read_u64()?,
        })
    }

    fn pack(&self, w: &mut LayoutWriter) {
        w.write_u64(self.min_separate_numerator);
        w.write_u64(self.min_separate_denominator);
        w.write_u64(self.trade_fee_numerator);
        w.write_u64(self.trade_fee_denominator);
        w.write_u64(self.pnl_numerator);
        w.write_u64(self.pnl_denominator);
        w.write_u64(self.swap_fee_numerator);
        w.write_u64(self.swap_fee_denominator);
    }
}

/// Accrual and volume counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LegacyStateData {
    pub need_take_pnl_coin: u64,
    pub need_take_pnl_pc: u64,
    pub total_pnl_pc: u64,
    pub total_pnl_coin: u64,
    pub pool_open_time: u64,
    pub punish_pc_amount: u64,
    pub punish_coin_amount: u64,
    pub orderbook_to_init_time: u64,
    /// Low 64 bits of a u128 counter
    pub swap_coin_in_amount: u64,
    /// Low 64 bits of a u128 counter
    pub swap_pc_out_amount: u64,
    pub swap_acc_pc_fee: u64,
    /// Low 64 bits of a u128 counter
    pub swap_pc_in_amount: u64,
    /// Low 64 bits of a u128 counter
    pub swap_coin_out_amount: u64,
    pub swap_acc_coin_fee: u64,
}

impl Layout for LegacyStateData {
    const LEN: usize = 144;

    fn unpack(r: &mut LayoutReader<'_>) -> Result<Self> {
        Ok(Self {
            need_take_pnl_coin: r.read_u64()?,
            need_take_pnl_pc: r.read_u64()?,
            total_pnl_pc: r.read_u64()?,
            total_pnl_coin: r.read_u64()?,
            pool_open_time: r.read_u64()?,
            punish_pc_amount: r.read_u64()?,
            punish_coin_amount: r.read_u64()?,
            orderbook_to_init_time: r.read_u64()?,
            swap_coin_in_amount: r.read_u128_low()?,
            swap_pc_out_amount: r.read_u128_low()?,
            swap_acc_pc_fee: r.read_u64()?,
            swap_pc_in_amount: r.read_u128_low()?,
            swap_coin_out_amount: r.read_u128_low()?,
            swap_acc_coin_fee: r.read_u64()?,
        })
    }

    fn pack(&self, w: &mut LayoutWriter) {
        w.write_u64(self.need_take_pnl_coin);
        w.write_u64(self.need_take_pnl_pc);
        w.write_u64(self.total_pnl_pc);
        w.write_u64(self.total_pnl_coin);
        w.write_u64(self.pool_open_time);
        w.write_u64(self.punish_pc_amount);
        w.write_u64(self.punish_coin_amount);
        w.write_u64(self.orderbook_to_init_time);
        w.write_u128_low(self.swap_coin_in_amount);
        w.write_u128_low(self.swap_pc_out_amount);
        w.write_u64(self.swap_acc_pc_fee);
        w.write_u128_low(self.swap_pc_in_amount);
        w.write_u128_low(self.swap_coin_out_amount);
        w.write_u64(self.swap_acc_coin_fee);
    }
}

/// Raydium v4 pool account. "Coin" is the base side, "pc" the quote side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AmmInfo {
    pub status: u64,
    pub nonce: u64,
    pub order_num: u64,
    pub depth: u64,
    pub coin_decimals: u64,
    pub pc_decimals: u64,
    pub state: u64,
    pub reset_flag: u64,
    pub min_size: u64,
    pub vol_max_cut_ratio: u64,
    pub amount_wave: u64,
    pub coin_lot_size: u64,
    pub pc_lot_size: u64,
    pub min_price_multiplier: u64,
    pub max_price_multiplier: u64,
    pub sys_decimal_value: u64,
    pub fees: LegacyFees,
    pub state_data: LegacyStateData,
    pub coin_vault: Pubkey,
    pub pc_vault: Pubkey,
    pub coin_mint: Pubkey,
    pub pc_mint: Pubkey,
    pub lp_mint: Pubkey,
    pub open_orders: Pubkey,
    pub market: Pubkey,
    pub market_program: Pubkey,
    pub target_orders: Pubkey,
    pub withdraw_queue: Pubkey,
    pub lp_vault: Pubkey,
    pub owner: Pubkey,
    pub lp_amount: u64,
    pub client_order_id: u64,
    pub padding: [u64; 2],
}

impl AmmInfo {
    /// Offset of `coin_vault`, the first address field
    pub const VAULTS_OFFSET: usize = 336;
}

impl Layout for AmmInfo {
    const LEN: usize = 752;

    fn unpack(r: &mut LayoutReader<'_>) -> Result<Self> {
        Ok(Self {
            status: r.read_u64()?,
            nonce: r.read_u64()?,
            order_num: r.read_u64()?,
            depth: r.read_u64()?,
            coin_decimals: r.read_u64()?,
            pc_decimals: r.read_u64()?,
            state: r.read_u64()?,
            reset_flag: r.read_u64()?,
            min_size: r.read_u64()?,
            vol_max_cut_ratio: r.read_u64()?,
            amount_wave: r.read_u64()?,
            coin_lot_size: r.read_u64()?,
            pc_lot_size: r.read_u64()?,
            min_price_multiplier: r.read_u64()?,
            max_price_multiplier: r.read_u64()?,
            sys_decimal_value: r.read_u64()?,
            fees: LegacyFees::unpack(r)?,
            state_data: LegacyStateData::unpack(r)?,
            coin_vault: r.read_pubkey()?,
            pc_vault: r.read_pubkey()?,
            coin_mint: r.read_pubkey()?,
            pc_mint: r.read_pubkey()?,
            lp_mint: r.read_pubkey()?,
            open_orders: r.read_pubkey()?,
            market: r.read_pubkey()?,
            market_program: r.read_pubkey()?,
            target_orders: r.read_pubkey()?,
            withdraw_queue: r.read_pubkey()?,
            lp_vault: r.read_pubkey()?,
            owner: r.read_pubkey()?,
            lp_amount: r.read_u64()?,
            client_order_id: r.read_u64()?,
            padding: r.read_u64_array()?,
        })
    }

    fn pack(&self, w: &mut LayoutWriter) {
        w.write_u64(self.status);
        w.write_u64(self.nonce);
        w.write_u64(self.order_num);
        w.write_u64(self.depth);
        w.write_u64(self.coin_decimals);
        w.write_u64(self.pc_decimals);
        w.write_u64(self.state);
        w.write_u64(self.reset_flag);
        w.write_u64(self.min_size);
        w.write_u64(self.vol_max_cut_ratio);
        w.write_u64(self.amount_wave);
        w.write_u64(self.coin_lot_size);
        w.write_u64(self.pc_lot_size);
        w.write_u64(self.min_price_multiplier);
        w.write_u64(self.max_price_multiplier);
        w.write_u64(self.sys_decimal_value);
        self.fees.pack(w);
        self.state_data.pack(w);
        w.write_pubkey(&self.coin_vault);
        w.write_pubkey(&self.pc_vault);
        w.write_pubkey(&self.coin_mint);
        w.write_pubkey(&self.pc_mint);
        w.write_pubkey(&self.lp_mint);
        w.write_pubkey(&self.open_orders);
        w.write_pubkey(&self.market);
        w.write_pubkey(&self.market_program);
        w.write_pubkey(&self.target_orders);
        w.write_pubkey(&self.withdraw_queue);
        w.write_pubkey(&self.lp_vault);
        w.write_pubkey(&self.owner);
        w.write_u64(self.lp_amount);
        w.write_u64(self.client_order_id);
        w.write_u64_array(&self.padding);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use rayswap_common::SwapError;

    pub(crate) fn sample_amm_info() -> AmmInfo {
        AmmInfo {
            status: 6,
            nonce: 254,
            coin_decimals: 9,
            pc_decimals: 6,
            sys_decimal_value: 1_000_000_000,
            fees: LegacyFees {
                min_separate_numerator: 5,
                min_separate_denominator: 10_000,
                trade_fee_numerator: 25,
                trade_fee_denominator: 10_000,
                pnl_numerator: 12,
                pnl_denominator: 100,
                swap_fee_numerator: 25,
                swap_fee_denominator: 10_000,
            },
            state_data: LegacyStateData {
                need_take_pnl_coin: 11,
                need_take_pnl_pc: 22,
                swap_coin_in_amount: 123_456_789,
                swap_pc_out_amount: 987_654_321,
                swap_acc_pc_fee: 42,
                ..LegacyStateData::default()
            },
            coin_vault: Pubkey::new_unique(),
            pc_vault: Pubkey::new_unique(),
            coin_mint: Pubkey::new_unique(),
            pc_mint: Pubkey::new_unique(),
            lp_mint: Pubkey::new_unique(),
            open_orders: Pubkey::new_unique(),
            market: Pubkey::new_unique(),
            market_program: Pubkey::new_unique(),
            target_orders: Pubkey::new_unique(),
            owner: Pubkey::new_unique(),
            lp_amount: 1_000_000,
            padding: [1, 2],
            ..AmmInfo::default()
        }
    }

    #[test]
    fn test_sizes() {
        assert_eq!(LegacyFees::LEN, 8 * 8);
        assert_eq!(LegacyStateData::LEN, 8 * 8 + 4 * 16 + 2 * 8);
        assert_eq!(AmmInfo::LEN, 16 * 8 + LegacyFees::LEN + LegacyStateData::LEN + 12 * 32 + 4 * 8);
        assert_eq!(sample_amm_info().encode().len(), AmmInfo::LEN);
    }

    #[test]
    fn test_round_trip() {
        let info = sample_amm_info();
        let decoded = AmmInfo::decode(&info.encode()).unwrap();
        assert_eq!(decoded, info);
    }

    #[test]
    fn test_field_offsets() {
        let info = sample_amm_info();
        let bytes = info.encode();

        assert_eq!(&bytes[32..40], &9u64.to_le_bytes()); // coin_decimals
        assert_eq!(&bytes[176..184], &25u64.to_le_bytes()); // swap_fee_numerator
        assert_eq!(&bytes[256..264], &123_456_789u64.to_le_bytes());
        assert_eq!(&bytes[264..272], &[0u8; 8]); // high half of swap_coin_in_amount
        assert_eq!(&bytes[288..296], &42u64.to_le_bytes()); // swap_acc_pc_fee
        assert_eq!(
            &bytes[AmmInfo::VAULTS_OFFSET..AmmInfo::VAULTS_OFFSET + 32],
            info.coin_vault.as_ref()
        );
        assert_eq!(&bytes[400..432], info.coin_mint.as_ref());
    }

    #[test]
    fn test_high_bits_of_wide_counters_dropped() {
        let info = sample_amm_info();
        let mut bytes = info.encode();
        bytes[264..272].copy_from_slice(&u64::MAX.to_le_bytes());

        let decoded = AmmInfo::decode(&bytes).unwrap();
        assert_eq!(decoded.state_data.swap_coin_in_amount, 123_456_789);
        assert_eq!(decoded.coin_vault, info.coin_vault);
    }

    #[test]
    fn test_truncated() {
        let bytes = sample_amm_info().encode();
        let result = AmmInfo::decode(&bytes[..AmmInfo::LEN - 1]);
        assert!(matches!(result, Err(SwapError::TruncatedBuffer { .. })));
    }

    #[test]
    fn test_trailing_bytes_ignored() {
        let info = sample_amm_info();
        let mut bytes = info.encode();
        bytes.extend_from_slice(&[0xFF; 16]);
        assert_eq!(AmmInfo::decode(&bytes).unwrap(), info);
    }
}
