use anchor_lang::prelude::*;
use switchboard_on_demand::accounts::RandomnessAccountData;

use crate::{error::LotteryError, state::Lottery};

/// Event emitted when a round is closed and randomness is requested
#[event]
pub struct RequestedLotteryWinner {
    /// The pubkey of the lottery
    pub lottery: Pubkey,
    /// The committed randomness account; identifies the request until it is
    /// consumed by `fulfill_random_words`
    pub randomness_account: Pubkey,
}

/// Instruction to close entry for the round and request randomness
///
/// # Security Considerations
/// The instruction performs several critical checks:
/// 1. Re-validates the full upkeep predicate at execution time, so a stale
///    crank call cannot close a round that no longer qualifies
/// 2. Requires the Switchboard randomness account to be seeded in the
///    previous slot, rejecting accounts whose value is already revealed
/// 3. Only reachable from Open state and always leaves the machine in
///    Calculating, so at most one randomness request is ever live
///
/// # Implementation Notes
/// - Anyone may call this; correctness rests on the predicate, not the caller
/// - The committed randomness account pubkey is the request identifier
///   carried in the RequestedLotteryWinner event
pub fn perform_upkeep(ctx: Context<PerformUpkeep>) -> Result<()> {
    let clock = Clock::get()?;
    let lottery = &mut ctx.accounts.lottery;

    if !lottery.upkeep_needed(clock.unix_timestamp) {
        msg!(
            "Upkeep not needed: pot={} players={} state={:?}",
            lottery.pot,
            lottery.player_count(),
            lottery.state
        );
        return Err(LotteryError::UpkeepNotNeeded.into());
    }

    let randomness_data =
        RandomnessAccountData::parse(ctx.accounts.randomness_account_data.data.borrow())
            .map_err(|_| LotteryError::InvalidRandomnessAccount)?;

    // A randomness account seeded in an older slot has already revealed its
    // value; committing it would let the caller pick a known outcome.
    if randomness_data.seed_slot != clock.slot - 1 {
        return Err(LotteryError::RandomnessAlreadyRevealed.into());
    }

    lottery.begin_calculating(
        ctx.accounts.randomness_account_data.key(),
        clock.unix_timestamp,
    )?;

    emit!(RequestedLotteryWinner {
        lottery: ctx.accounts.lottery.key(),
        randomness_account: ctx.accounts.randomness_account_data.key(),
    });

    Ok(())
}

#[derive(Accounts)]
pub struct PerformUpkeep<'info> {
    #[account(
        mut,
        seeds = [b"lottery"],
        bump = lottery.bump,
    )]
    pub lottery: Account<'info, Lottery>,

    /// Randomness account from Switchboard committed for this round.
    /// CHECK: The account's data is validated manually within the handler.
    pub randomness_account_data: UncheckedAccount<'info>,

    /// The crank submitting the upkeep; pays the transaction fee
    #[account(mut)]
    pub payer: Signer<'info>,
}
