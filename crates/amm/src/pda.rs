//! Program-derived addresses
//!
//! Every address is derived from the program id passed in, so the same code
//! serves mainnet and devnet deployments.

use crate::constants::{
    ASSOCIATED_TOKEN_PROGRAM_ID, CPMM_AUTHORITY_SEED, CPMM_LP_MINT_SEED, CPMM_OBSERVATION_SEED,
    CPMM_POOL_SEED, CPMM_VAULT_SEED, LEGACY_AUTHORITY_SEED,
};
use solana_sdk::pubkey::Pubkey;

/// Legacy AMM authority; signs for every pool of the program
pub fn legacy_authority(program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[LEGACY_AUTHORITY_SEED], program_id)
}

/// CPMM vault and LP mint authority
pub fn cpmm_authority(program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[CPMM_AUTHORITY_SEED], program_id)
}

/// Canonical CPMM pool address. `mint_0` must sort below `mint_1`.
pub fn cpmm_pool(
    program_id: &Pubkey,
    amm_config: &Pubkey,
    mint_0: &Pubkey,
    mint_1: &Pubkey,
) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[
            CPMM_POOL_SEED,
            amm_config.as_ref(),
            mint_0.as_ref(),
            mint_1.as_ref(),
        ],
        program_id,
    )
}

pub fn cpmm_lp_mint(program_id: &Pubkey, pool: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[CPMM_LP_MINT_SEED, pool.as_ref()], program_id)
}

pub fn cpmm_vault(program_id: &Pubkey, pool: &Pubkey, mint: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[CPMM_VAULT_SEED, pool.as_ref(), mint.as_ref()], program_id)
}

pub fn cpmm_observation(program_id: &Pubkey, pool: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[CPMM_OBSERVATION_SEED, pool.as_ref()], program_id)
}

/// Associated token account of `wallet` for `mint` under `token_program`
pub fn associated_token_address(wallet: &Pubkey, mint: &Pubkey, token_program: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(
        &[wallet.as_ref(), token_program.as_ref(), mint.as_ref()],
        &ASSOCIATED_TOKEN_PROGRAM_ID,
    )
    .0
}

/// Order two mints the way CPMM pools store them (token 0 < token 1)
pub fn sort_mints(a: Pubkey, b: Pubkey) -> (Pubkey, Pubkey) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{
        CPMM_DEVNET_PROGRAM, CPMM_MAINNET_PROGRAM, LEGACY_AMM_MAINNET_PROGRAM, TOKEN_2022_PROGRAM_ID,
        TOKEN_PROGRAM_ID,
    };

    #[test]
    fn test_bumps_recreate_address() {
        let (authority, bump) = legacy_authority(&LEGACY_AMM_MAINNET_PROGRAM);
        let recreated =
            Pubkey::create_program_address(&[LEGACY_AUTHORITY_SEED, &[bump]], &LEGACY_AMM_MAINNET_PROGRAM)
                .unwrap();
        assert_eq!(authority, recreated);

        let pool = Pubkey::new_unique();
        let (vault, bump) = cpmm_vault(&CPMM_MAINNET_PROGRAM, &pool, &TOKEN_PROGRAM_ID);
        let recreated = Pubkey::create_program_address(
            &[CPMM_VAULT_SEED, pool.as_ref(), TOKEN_PROGRAM_ID.as_ref(), &[bump]],
            &CPMM_MAINNET_PROGRAM,
        )
        .unwrap();
        assert_eq!(vault, recreated);
    }

    #[test]
    fn test_derivation_depends_on_program() {
        assert_ne!(
            cpmm_authority(&CPMM_MAINNET_PROGRAM).0,
            cpmm_authority(&CPMM_DEVNET_PROGRAM).0
        );
    }

    #[test]
    fn test_pool_addresses_distinct() {
        let config = Pubkey::new_unique();
        let (mint_0, mint_1) = sort_mints(Pubkey::new_unique(), Pubkey::new_unique());
        let (pool, _) = cpmm_pool(&CPMM_MAINNET_PROGRAM, &config, &mint_0, &mint_1);
        let (swapped, _) = cpmm_pool(&CPMM_MAINNET_PROGRAM, &config, &mint_1, &mint_0);
        assert_ne!(pool, swapped);

        let addresses = [
            pool,
            cpmm_lp_mint(&CPMM_MAINNET_PROGRAM, &pool).0,
            cpmm_vault(&CPMM_MAINNET_PROGRAM, &pool, &mint_0).0,
            cpmm_vault(&CPMM_MAINNET_PROGRAM, &pool, &mint_1).0,
            cpmm_observation(&CPMM_MAINNET_PROGRAM, &pool).0,
        ];
        for (i, a) in addresses.iter().enumerate() {
            for b in &addresses[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_associated_token_address_per_program() {
        let wallet = Pubkey::new_unique();
        let mint = Pubkey::new_unique();
        let classic = associated_token_address(&wallet, &mint, &TOKEN_PROGRAM_ID);
        assert_eq!(classic, associated_token_address(&wallet, &mint, &TOKEN_PROGRAM_ID));
        assert_ne!(classic, associated_token_address(&wallet, &mint, &TOKEN_2022_PROGRAM_ID));
    }

    #[test]
    fn test_sort_mints() {
        let a = Pubkey::new_from_array([1; 32]);
        let b = Pubkey::new_from_array([2; 32]);
        assert_eq!(sort_mints(a, b), (a, b));
        assert_eq!(sort_mints(b, a), (a, b));
    }
}
