use anchor_lang::prelude::*;

use crate::{
    error::LotteryError,
    state::{Lottery, Vault},
};

/// Event emitted when a player enters the lottery
#[event]
pub struct LotteryEnter {
    /// The pubkey of the lottery
    pub lottery: Pubkey,
    /// The entering player's address
    pub player: Pubkey,
    /// Amount paid in lamports
    pub amount: u64,
    /// Index of this entry in the player list
    pub player_index: u64,
}

/// Instruction to enter the current lottery round with a payment
///
/// # Arguments
/// * `ctx` - The context object containing all required accounts
/// * `amount` - The payment attached to the entry, in lamports
///
/// # Security Considerations
/// The instruction performs several critical checks:
/// 1. Rejects entry outright while a winner is being calculated
/// 2. Rejects payments below the entrance fee
/// 3. Validates the player has sufficient funds for the payment
/// 4. Verifies the vault actually received the payment
///
/// # Implementation Notes
/// - The same player may enter multiple times; every entry is appended
/// - The pot field tracks the sum of payments; the lamports sit in the vault
/// - Uses checked arithmetic to prevent overflow
pub fn enter_lottery(ctx: Context<EnterLottery>, amount: u64) -> Result<()> {
    require!(
        ctx.accounts.player.lamports() >= amount,
        LotteryError::InsufficientFunds
    );

    let player_index = ctx
        .accounts
        .lottery
        .record_entry(ctx.accounts.player.key(), amount)?;

    // Store pre-transfer balance for verification
    let pre_transfer_balance = ctx.accounts.vault.to_account_info().lamports();

    // Transfer lamports from the player to the vault
    anchor_lang::solana_program::program::invoke(
        &anchor_lang::solana_program::system_instruction::transfer(
            &ctx.accounts.player.key(),
            &ctx.accounts.vault.key(),
            amount,
        ),
        &[
            ctx.accounts.player.to_account_info(),
            ctx.accounts.system_program.to_account_info(),
            ctx.accounts.vault.to_account_info(),
        ],
    )?;

    // Verify the transfer was successful by checking the vault balance
    let post_transfer_balance = ctx.accounts.vault.to_account_info().lamports();
    require!(
        post_transfer_balance
            == pre_transfer_balance
                .checked_add(amount)
                .ok_or(LotteryError::Overflow)?,
        LotteryError::TransferFailed
    );

    emit!(LotteryEnter {
        lottery: ctx.accounts.lottery.key(),
        player: ctx.accounts.player.key(),
        amount,
        player_index,
    });

    Ok(())
}

#[derive(Accounts)]
pub struct EnterLottery<'info> {
    #[account(
        mut,
        seeds = [b"lottery"],
        bump = lottery.bump,
    )]
    pub lottery: Account<'info, Lottery>,

    /// Vault that receives the entry payment
    /// PDA with seeds ["vault", lottery_key]
    #[account(
        mut,
        seeds = [
            b"vault",
            lottery.key().as_ref(),
        ],
        bump = vault.bump,
    )]
    pub vault: Account<'info, Vault>,

    /// The player entering the round and paying the entrance fee
    #[account(mut)]
    pub player: Signer<'info>,

    /// Required for the payment transfer
    pub system_program: Program<'info, System>,
}
