//! SPL token account (vault balances)

use rayswap_common::{Layout, LayoutReader, LayoutWriter, Result};
use solana_sdk::pubkey::Pubkey;

/// Base SPL token account. Token-2022 accounts append extensions after these
/// 165 bytes; they are not read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenAccount {
    pub mint: Pubkey,
    pub owner: Pubkey,
    pub amount: u64,
    pub delegate: Option<Pubkey>,
    /// 0 = uninitialized, 1 = initialized, 2 = frozen
    pub state: u8,
    /// Rent-exempt reserve when the account wraps SOL
    pub is_native: Option<u64>,
    pub delegated_amount: u64,
    pub close_authority: Option<Pubkey>,
}

impl TokenAccount {
    /// Offset of `amount`
    pub const AMOUNT_OFFSET: usize = 64;
}

impl Layout for TokenAccount {
    const LEN: usize = 165;

    fn unpack(r: &mut LayoutReader<'_>) -> Result<Self> {
        Ok(Self {
            mint: r.read_pubkey()?,
            owner: r.read_pubkey()?,
            amount: r.read_u64()?,
            delegate: r.read_option_pubkey()?,
            state: r.read_u8()?,
            is_native: r.read_option_u64()?,
            delegated_amount: r.read_u64()?,
            close_authority: r.read_option_pubkey()?,
        })
    }

    fn pack(&self, w: &mut LayoutWriter) {
        w.write_pubkey(&self.mint);
        w.write_pubkey(&self.owner);
        w.write_u64(self.amount);
        w.write_option_pubkey(self.delegate.as_ref());
        w.write_u8(self.state);
        w.write_option_u64(self.is_native);
        w.write_u64(self.delegated_amount);
        w.write_option_pubkey(self.close_authority.as_ref());
    }
}
