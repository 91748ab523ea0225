use anchor_lang::prelude::*;

use crate::{
    error::LotteryError,
    state::{Lottery, LotteryState, Vault, LOTTERY_ACCOUNT_SIZE, VAULT_ACCOUNT_SIZE},
};

/// Event emitted when the lottery is initialized
#[event]
pub struct LotteryInitialized {
    /// The pubkey of the lottery
    pub lottery: Pubkey,
    /// Entrance fee per entry in lamports
    pub entrance_fee: u64,
    /// Round length in seconds
    pub interval: i64,
    /// Timestamp the first round started at
    pub start_timestamp: i64,
}

/// Instruction to initialize the lottery and its vault
/// This should be called once during program deployment
///
/// # Arguments
/// * `ctx` - The context object containing all required accounts
/// * `entrance_fee` - Minimum payment per entry in lamports (must be > 0)
/// * `interval` - Round length in seconds (must be > 0)
///
/// # Security Considerations
/// The instruction performs several critical checks:
/// 1. Validates entrance_fee is greater than 0
/// 2. Validates interval is greater than 0
/// 3. Uses PDAs with fixed seeds so only one lottery instance can exist
///
/// # Implementation Notes
/// - Initializes the lottery in Open state with an empty player list
/// - Seeds the round clock from the current on-chain timestamp
/// - Creates the vault PDA that will hold the pot lamports
pub fn initialize_lottery(
    ctx: Context<InitializeLottery>,
    entrance_fee: u64,
    interval: i64,
) -> Result<()> {
    require!(entrance_fee > 0, LotteryError::InvalidFee);
    require!(interval > 0, LotteryError::InvalidInterval);

    let now = Clock::get()?.unix_timestamp;

    let lottery = &mut ctx.accounts.lottery;
    lottery.bump = ctx.bumps.lottery;
    lottery.entrance_fee = entrance_fee;
    lottery.interval = interval;
    lottery.last_timestamp = now;
    lottery.state = LotteryState::Open;
    lottery.pot = 0;
    lottery.recent_winner = None;
    lottery.randomness_account = Pubkey::default();
    lottery.players = Vec::new();

    ctx.accounts.vault.lottery = lottery.key();
    ctx.accounts.vault.bump = ctx.bumps.vault;

    emit!(LotteryInitialized {
        lottery: ctx.accounts.lottery.key(),
        entrance_fee,
        interval,
        start_timestamp: now,
    });

    Ok(())
}

#[derive(Accounts)]
pub struct InitializeLottery<'info> {
    #[account(
        init,
        payer = payer,
        space = LOTTERY_ACCOUNT_SIZE,
        seeds = [b"lottery"],
        bump
    )]
    pub lottery: Account<'info, Lottery>,

    /// Vault holding the pot lamports
    /// PDA with seeds ["vault", lottery_key]
    #[account(
        init,
        payer = payer,
        space = VAULT_ACCOUNT_SIZE,
        seeds = [
            b"vault",
            lottery.key().as_ref(),
        ],
        bump,
    )]
    pub vault: Account<'info, Vault>,

    #[account(mut)]
    pub payer: Signer<'info>,

    pub system_program: Program<'info, System>,
}
