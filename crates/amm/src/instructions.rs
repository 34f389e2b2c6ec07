//! Instruction encoders
//!
//! Account order is positional: both programs index accounts by position, so
//! every list below is fixed per instruction kind.

use crate::constants::{
    ASSOCIATED_TOKEN_PROGRAM_ID, MEMO_PROGRAM_ID, RENT_SYSVAR_ID, SYSTEM_PROGRAM_ID,
    TOKEN_2022_PROGRAM_ID, TOKEN_PROGRAM_ID,
};
use crate::pda;
use crate::state::{AmmInfo, CpmmPoolState, PoolState};
use rayswap_common::{Layout, LayoutReader, LayoutWriter, Result, SwapError};
use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
};

/// Legacy AMM instruction tags
pub const LEGACY_SWAP_BASE_IN: u8 = 9;
pub const LEGACY_SWAP_BASE_OUT: u8 = 11;

/// CPMM Anchor instruction discriminators
pub const CPMM_INITIALIZE: [u8; 8] = [175, 175, 109, 31, 13, 152, 155, 237];
pub const CPMM_DEPOSIT: [u8; 8] = [242, 35, 198, 137, 82, 225, 242, 182];
pub const CPMM_WITHDRAW: [u8; 8] = [183, 18, 70, 156, 148, 109, 161, 34];
pub const CPMM_SWAP_BASE_INPUT: [u8; 8] = [143, 190, 90, 218, 196, 30, 51, 222];
pub const CPMM_SWAP_BASE_OUTPUT: [u8; 8] = [55, 217, 98, 86, 163, 74, 180, 173];

macro_rules! count_fields {
    () => { 0usize };
    ($head:ident $(, $tail:ident)*) => { 1usize + count_fields!($($tail),*) };
}

/// Implements `Layout` for an argument struct of consecutive u64 fields
macro_rules! u64_args {
    ($name:ident { $($field:ident),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub struct $name {
            $(pub $field: u64,)+
        }

        impl Layout for $name {
            const LEN: usize = 8 * count_fields!($($field),+);

            fn unpack(r: &mut LayoutReader<'_>) -> Result<Self> {
                Ok(Self {
                    $($field: r.read_u64()?,)+
                })
            }

            fn pack(&self, w: &mut LayoutWriter) {
                $(w.write_u64(self.$field);)+
            }
        }
    };
}

u64_args!(SwapBaseInArgs {
    amount_in,
    minimum_amount_out
});
u64_args!(SwapBaseOutArgs {
    max_amount_in,
    amount_out
});
u64_args!(InitializeArgs {
    init_amount_0,
    init_amount_1,
    open_time
});
u64_args!(DepositArgs {
    lp_token_amount,
    maximum_token_0_amount,
    maximum_token_1_amount
});
u64_args!(WithdrawArgs {
    lp_token_amount,
    minimum_token_0_amount,
    minimum_token_1_amount
});

fn instruction_data<A: Layout>(discriminator: &[u8], args: &A) -> Vec<u8> {
    let mut w = LayoutWriter::with_capacity(discriminator.len() + A::LEN);
    w.write_bytes(discriminator);
    args.pack(&mut w);
    w.into_inner()
}

/// Trader accounts for a swap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapUserAccounts {
    /// Signs the swap and owns both token accounts
    pub owner: Pubkey,
    pub input_token_account: Pubkey,
    pub output_token_account: Pubkey,
}

impl SwapUserAccounts {
    /// Associated token accounts of `owner` for a swap selling `input_mint`
    pub fn associated(owner: Pubkey, pool: &PoolState, input_mint: &Pubkey) -> Result<Self> {
        let base_in = pool.is_base_mint(input_mint)?;
        let (base_program, quote_program) = match pool {
            PoolState::Legacy(_) => (TOKEN_PROGRAM_ID, TOKEN_PROGRAM_ID),
            PoolState::Cpmm(state) => (state.token_0_program, state.token_1_program),
        };
        let base = pda::associated_token_address(&owner, &pool.base_mint(), &base_program);
        let quote = pda::associated_token_address(&owner, &pool.quote_mint(), &quote_program);
        let (input_token_account, output_token_account) =
            if base_in { (base, quote) } else { (quote, base) };
        Ok(Self {
            owner,
            input_token_account,
            output_token_account,
        })
    }
}

/// Legacy swap accounts. Pools without an active order book accept the pool
/// id in place of every market account.
fn legacy_swap_accounts(
    program_id: &Pubkey,
    pool_id: &Pubkey,
    info: &AmmInfo,
    user: &SwapUserAccounts,
) -> Vec<AccountMeta> {
    let (authority, _) = pda::legacy_authority(program_id);
    vec![
        AccountMeta::new_readonly(TOKEN_PROGRAM_ID, false),
        AccountMeta::new(*pool_id, false),
        AccountMeta::new_readonly(authority, false),
        AccountMeta::new(info.open_orders, false),
        AccountMeta::new(info.target_orders, false),
        AccountMeta::new(info.coin_vault, false),
        AccountMeta::new(info.pc_vault, false),
        // Market program, market, bids, asks, event queue, coin vault, pc vault, vault signer
        AccountMeta::new_readonly(*pool_id, false),
        AccountMeta::new(*pool_id, false),
        AccountMeta::new(*pool_id, false),
        AccountMeta::new(*pool_id, false),
        AccountMeta::new(*pool_id, false),
        AccountMeta::new(*pool_id, false),
        AccountMeta::new(*pool_id, false),
        AccountMeta::new_readonly(*pool_id, false),
        AccountMeta::new(user.input_token_account, false),
        AccountMeta::new(user.output_token_account, false),
        AccountMeta::new_readonly(user.owner, true),
    ]
}

/// Legacy swap selling exactly `amount_in`
pub fn legacy_swap_base_in(
    program_id: &Pubkey,
    pool_id: &Pubkey,
    info: &AmmInfo,
    user: &SwapUserAccounts,
    amount_in: u64,
    minimum_amount_out: u64,
) -> Instruction {
    let args = SwapBaseInArgs {
        amount_in,
        minimum_amount_out,
    };
    Instruction {
        program_id: *program_id,
        accounts: legacy_swap_accounts(program_id, pool_id, info, user),
        data: instruction_data(&[LEGACY_SWAP_BASE_IN], &args),
    }
}

/// Legacy swap buying exactly `amount_out`
pub fn legacy_swap_base_out(
    program_id: &Pubkey,
    pool_id: &Pubkey,
    info: &AmmInfo,
    user: &SwapUserAccounts,
    max_amount_in: u64,
    amount_out: u64,
) -> Instruction {
    let args = SwapBaseOutArgs {
        max_amount_in,
        amount_out,
    };
    Instruction {
        program_id: *program_id,
        accounts: legacy_swap_accounts(program_id, pool_id, info, user),
        data: instruction_data(&[LEGACY_SWAP_BASE_OUT], &args),
    }
}

fn cpmm_swap_accounts(
    program_id: &Pubkey,
    pool_id: &Pubkey,
    pool: &CpmmPoolState,
    user: &SwapUserAccounts,
    input_mint: &Pubkey,
) -> Result<Vec<AccountMeta>> {
    let base_in = if *input_mint == pool.token_0_mint {
        true
    } else if *input_mint == pool.token_1_mint {
        false
    } else {
        return Err(SwapError::MintNotInPool(*input_mint));
    };

    let token_0 = (pool.token_0_vault, pool.token_0_program, pool.token_0_mint);
    let token_1 = (pool.token_1_vault, pool.token_1_program, pool.token_1_mint);
    let ((input_vault, input_program, input_mint), (output_vault, output_program, output_mint)) =
        if base_in {
            (token_0, token_1)
        } else {
            (token_1, token_0)
        };
    let (authority, _) = pda::cpmm_authority(program_id);

    Ok(vec![
        AccountMeta::new_readonly(user.owner, true),
        AccountMeta::new_readonly(authority, false),
        AccountMeta::new_readonly(pool.amm_config, false),
        AccountMeta::new(*pool_id, false),
        AccountMeta::new(user.input_token_account, false),
        AccountMeta::new(user.output_token_account, false),
        AccountMeta::new(input_vault, false),
        AccountMeta::new(output_vault, false),
        AccountMeta::new_readonly(input_program, false),
        AccountMeta::new_readonly(output_program, false),
        AccountMeta::new_readonly(input_mint, false),
        AccountMeta::new_readonly(output_mint, false),
        AccountMeta::new(pool.observation_key, false),
    ])
}

/// CPMM swap selling exactly `amount_in` of `input_mint`
pub fn cpmm_swap_base_input(
    program_id: &Pubkey,
    pool_id: &Pubkey,
    pool: &CpmmPoolState,
    user: &SwapUserAccounts,
    input_mint: &Pubkey,
    amount_in: u64,
    minimum_amount_out: u64,
) -> Result<Instruction> {
    let args = SwapBaseInArgs {
        amount_in,
        minimum_amount_out,
    };
    Ok(Instruction {
        program_id: *program_id,
        accounts: cpmm_swap_accounts(program_id, pool_id, pool, user, input_mint)?,
        data: instruction_data(&CPMM_SWAP_BASE_INPUT, &args),
    })
}

/// CPMM swap buying exactly `amount_out`, paying with `input_mint`
pub fn cpmm_swap_base_output(
    program_id: &Pubkey,
    pool_id: &Pubkey,
    pool: &CpmmPoolState,
    user: &SwapUserAccounts,
    input_mint: &Pubkey,
    max_amount_in: u64,
    amount_out: u64,
) -> Result<Instruction> {
    let args = SwapBaseOutArgs {
        max_amount_in,
        amount_out,
    };
    Ok(Instruction {
        program_id: *program_id,
        accounts: cpmm_swap_accounts(program_id, pool_id, pool, user, input_mint)?,
        data: instruction_data(&CPMM_SWAP_BASE_OUTPUT, &args),
    })
}

/// Exact-input swap against either pool kind
pub fn build_swap_instruction(
    program_id: &Pubkey,
    pool_id: &Pubkey,
    pool: &PoolState,
    user: &SwapUserAccounts,
    input_mint: &Pubkey,
    amount_in: u64,
    minimum_amount_out: u64,
) -> Result<Instruction> {
    match pool {
        PoolState::Legacy(info) => {
            // Direction follows the user accounts; the mint only has to belong to the pool
            pool.is_base_mint(input_mint)?;
            Ok(legacy_swap_base_in(
                program_id,
                pool_id,
                info,
                user,
                amount_in,
                minimum_amount_out,
            ))
        }
        PoolState::Cpmm(state) => cpmm_swap_base_input(
            program_id,
            pool_id,
            state,
            user,
            input_mint,
            amount_in,
            minimum_amount_out,
        ),
    }
}

/// Accounts supplied by the creator of a CPMM pool; everything else is derived
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpmmInitializeAccounts {
    pub creator: Pubkey,
    pub amm_config: Pubkey,
    /// Must sort below `mint_1`
    pub mint_0: Pubkey,
    pub mint_1: Pubkey,
    pub token_0_program: Pubkey,
    pub token_1_program: Pubkey,
    pub creator_token_0: Pubkey,
    pub creator_token_1: Pubkey,
    pub create_pool_fee: Pubkey,
    /// Non-canonical pool address; the pool account must then sign
    pub pool_id: Option<Pubkey>,
}

/// Create a CPMM pool and seed it with `init_amount_0` / `init_amount_1`
pub fn cpmm_initialize(
    program_id: &Pubkey,
    accounts: &CpmmInitializeAccounts,
    args: InitializeArgs,
) -> Instruction {
    let (canonical_pool, _) = pda::cpmm_pool(
        program_id,
        &accounts.amm_config,
        &accounts.mint_0,
        &accounts.mint_1,
    );
    let pool_id = accounts.pool_id.unwrap_or(canonical_pool);
    let (authority, _) = pda::cpmm_authority(program_id);
    let (lp_mint, _) = pda::cpmm_lp_mint(program_id, &pool_id);
    let (vault_0, _) = pda::cpmm_vault(program_id, &pool_id, &accounts.mint_0);
    let (vault_1, _) = pda::cpmm_vault(program_id, &pool_id, &accounts.mint_1);
    let (observation, _) = pda::cpmm_observation(program_id, &pool_id);
    let creator_lp = pda::associated_token_address(&accounts.creator, &lp_mint, &TOKEN_PROGRAM_ID);

    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new_readonly(accounts.creator, true),
            AccountMeta::new_readonly(accounts.amm_config, false),
            AccountMeta::new_readonly(authority, false),
            AccountMeta::new(pool_id, pool_id != canonical_pool),
            AccountMeta::new_readonly(accounts.mint_0, false),
            AccountMeta::new_readonly(accounts.mint_1, false),
            AccountMeta::new(lp_mint, false),
            AccountMeta::new(accounts.creator_token_0, false),
            AccountMeta::new(accounts.creator_token_1, false),
            AccountMeta::new(creator_lp, false),
            AccountMeta::new(vault_0, false),
            AccountMeta::new(vault_1, false),
            AccountMeta::new(accounts.create_pool_fee, false),
            AccountMeta::new(observation, false),
            AccountMeta::new_readonly(TOKEN_PROGRAM_ID, false),
            AccountMeta::new_readonly(accounts.token_0_program, false),
            AccountMeta::new_readonly(accounts.token_1_program, false),
            AccountMeta::new_readonly(ASSOCIATED_TOKEN_PROGRAM_ID, false),
            AccountMeta::new_readonly(SYSTEM_PROGRAM_ID, false),
            AccountMeta::new_readonly(RENT_SYSVAR_ID, false),
        ],
        data: instruction_data(&CPMM_INITIALIZE, &args),
    }
}

/// Liquidity provider accounts for deposit and withdraw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiquidityAccounts {
    pub owner: Pubkey,
    pub owner_lp_token: Pubkey,
    pub owner_token_0: Pubkey,
    pub owner_token_1: Pubkey,
}

impl LiquidityAccounts {
    /// Associated token accounts of `owner` for the pool's LP mint and both tokens
    pub fn associated(owner: Pubkey, pool: &CpmmPoolState) -> Self {
        Self {
            owner,
            owner_lp_token: pda::associated_token_address(&owner, &pool.lp_mint, &TOKEN_PROGRAM_ID),
            owner_token_0: pda::associated_token_address(
                &owner,
                &pool.token_0_mint,
                &pool.token_0_program,
            ),
            owner_token_1: pda::associated_token_address(
                &owner,
                &pool.token_1_mint,
                &pool.token_1_program,
            ),
        }
    }
}

fn cpmm_liquidity_accounts(
    program_id: &Pubkey,
    pool_id: &Pubkey,
    pool: &CpmmPoolState,
    owner: &LiquidityAccounts,
) -> Vec<AccountMeta> {
    let (authority, _) = pda::cpmm_authority(program_id);
    vec![
        AccountMeta::new_readonly(owner.owner, true),
        AccountMeta::new_readonly(authority, false),
        AccountMeta::new(*pool_id, false),
        AccountMeta::new(owner.owner_lp_token, false),
        AccountMeta::new(owner.owner_token_0, false),
        AccountMeta::new(owner.owner_token_1, false),
        AccountMeta::new(pool.token_0_vault, false),
        AccountMeta::new(pool.token_1_vault, false),
        AccountMeta::new_readonly(TOKEN_PROGRAM_ID, false),
        AccountMeta::new_readonly(TOKEN_2022_PROGRAM_ID, false),
        AccountMeta::new_readonly(pool.token_0_mint, false),
        AccountMeta::new_readonly(pool.token_1_mint, false),
        AccountMeta::new(pool.lp_mint, false),
    ]
}

/// Mint `lp_token_amount` LP tokens, paying at most the given token amounts
pub fn cpmm_deposit(
    program_id: &Pubkey,
    pool_id: &Pubkey,
    pool: &CpmmPoolState,
    owner: &LiquidityAccounts,
    args: DepositArgs,
) -> Instruction {
    Instruction {
        program_id: *program_id,
        accounts: cpmm_liquidity_accounts(program_id, pool_id, pool, owner),
        data: instruction_data(&CPMM_DEPOSIT, &args),
    }
}

/// Burn `lp_token_amount` LP tokens for at least the given token amounts
pub fn cpmm_withdraw(
    program_id: &Pubkey,
    pool_id: &Pubkey,
    pool: &CpmmPoolState,
    owner: &LiquidityAccounts,
    args: WithdrawArgs,
) -> Instruction {
    let mut accounts = cpmm_liquidity_accounts(program_id, pool_id, pool, owner);
    accounts.push(AccountMeta::new_readonly(MEMO_PROGRAM_ID, false));
    Instruction {
        program_id: *program_id,
        accounts,
        data: instruction_data(&CPMM_WITHDRAW, &args),
    }
}
