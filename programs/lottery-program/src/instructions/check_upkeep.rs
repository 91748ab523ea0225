use anchor_lang::prelude::*;

use crate::state::Lottery;

/// Instruction evaluating whether the current round can be closed
///
/// Returns true iff all of the following hold at the current timestamp:
/// 1. The round has run for at least the configured interval
/// 2. The lottery is in Open state
/// 3. The pot holds at least one lamport
/// 4. At least one player has entered
///
/// The automation crank polls this off-chain (or via simulation) and submits
/// `perform_upkeep` when it returns true. The lottery account is taken
/// read-only, so the check can be run at any frequency without touching
/// state; `perform_upkeep` re-validates the same predicate at execution time.
pub fn check_upkeep(ctx: Context<CheckUpkeep>) -> Result<bool> {
    let clock = Clock::get()?;
    Ok(ctx.accounts.lottery.upkeep_needed(clock.unix_timestamp))
}

#[derive(Accounts)]
pub struct CheckUpkeep<'info> {
    #[account(
        seeds = [b"lottery"],
        bump = lottery.bump,
    )]
    pub lottery: Account<'info, Lottery>,
}
