use anchor_lang::prelude::*;
use arrayref::array_ref;
use switchboard_on_demand::accounts::RandomnessAccountData;

use crate::{
    error::LotteryError,
    state::{Lottery, LotteryState, Vault, VAULT_ACCOUNT_SIZE},
};

/// Event emitted when a winner is picked and paid
#[event]
pub struct WinnerPicked {
    /// The pubkey of the lottery
    pub lottery: Pubkey,
    /// The winner's address
    pub winner: Pubkey,
    /// Index of the winning entry in the player list
    pub winner_index: u64,
    /// Prize paid out in lamports
    pub prize: u64,
}

/// Instruction to consume the revealed randomness, pay the winner and reset
/// the round
///
/// # Security Considerations
/// The instruction performs several critical checks:
/// 1. Rejects any randomness account other than the one committed by
///    `perform_upkeep` - covering no request pending, a mismatched account,
///    and a request that was already consumed (no replay)
/// 2. Fails if the Switchboard oracle has not resolved the value yet
/// 3. Verifies the passed winner account is the drawn winner before paying
/// 4. Verifies the vault can cover the full prize while staying rent-exempt
///
/// # Implementation Notes
/// - The crank computes the winner off-chain from the revealed value and the
///   player list, and passes that account; the program re-derives the winner
///   and rejects a mismatch
/// - Failure anywhere (including the payout) reverts the whole transaction,
///   so the ledger, clock, winner record and state never change on error
/// - On success the machine returns to Open with an empty player list, a
///   zeroed pot and the round clock advanced to the settlement time
pub fn fulfill_random_words(ctx: Context<FulfillRandomWords>) -> Result<()> {
    let clock = Clock::get()?;
    let lottery_key = ctx.accounts.lottery.key();
    let lottery = &mut ctx.accounts.lottery;

    // Identify the request before touching the oracle data, so a bogus
    // account fails as an unknown request rather than a parse error.
    require!(
        lottery.state == LotteryState::Calculating
            && lottery.randomness_account != Pubkey::default()
            && ctx.accounts.randomness_account_data.key() == lottery.randomness_account,
        LotteryError::UnknownRequest
    );

    let randomness_data =
        RandomnessAccountData::parse(ctx.accounts.randomness_account_data.data.borrow())
            .map_err(|_| LotteryError::InvalidRandomnessAccount)?;
    let revealed_random_value = randomness_data
        .get_value(&clock)
        .map_err(|_| LotteryError::RandomnessNotResolved)?;
    let random_value = u64::from_le_bytes(*array_ref![revealed_random_value, 0, 8]);

    let settlement = lottery.settle(
        ctx.accounts.randomness_account_data.key(),
        random_value,
        clock.unix_timestamp,
    )?;

    require!(
        ctx.accounts.winner.key() == settlement.winner,
        LotteryError::WinnerMismatch
    );

    // Pay the full pot from the vault, keeping the vault rent-exempt.
    // This only works because the vault is a PDA owned by our program.
    let vault_info = ctx.accounts.vault.to_account_info();
    let rent_lamports = (Rent::get()?).minimum_balance(VAULT_ACCOUNT_SIZE);
    require!(
        vault_info.lamports().saturating_sub(rent_lamports) >= settlement.prize,
        LotteryError::TransferFailed
    );
    vault_info.sub_lamports(settlement.prize)?;
    ctx.accounts
        .winner
        .to_account_info()
        .add_lamports(settlement.prize)?;

    emit!(WinnerPicked {
        lottery: lottery_key,
        winner: settlement.winner,
        winner_index: settlement.winner_index,
        prize: settlement.prize,
    });

    Ok(())
}

#[derive(Accounts)]
pub struct FulfillRandomWords<'info> {
    #[account(
        mut,
        seeds = [b"lottery"],
        bump = lottery.bump,
    )]
    pub lottery: Account<'info, Lottery>,

    /// Vault the prize is paid from
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

    /// The committed Switchboard randomness account, now resolved.
    /// CHECK: The account's data is validated manually within the handler.
    pub randomness_account_data: UncheckedAccount<'info>,

    /// The winner receiving the pot; validated against the drawn winner
    #[account(mut)]
    pub winner: SystemAccount<'info>,

    /// The crank settling the round; pays the transaction fee
    #[account(mut)]
    pub payer: Signer<'info>,
}
