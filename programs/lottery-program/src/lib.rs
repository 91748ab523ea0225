use anchor_lang::prelude::*;
use instructions::*;

pub mod error;
pub mod instructions;
pub mod state;

declare_id!("Fg6PaFpoGXkYsidMpWTK6W2BeZ7FEfcYkg476zPFsLnS");

#[program]
pub mod lottery_program {
    use super::*;

    pub fn initialize_lottery(
        ctx: Context<InitializeLottery>,
        entrance_fee: u64,
        interval: i64,
    ) -> Result<()> {
        instructions::initialize_lottery::initialize_lottery(ctx, entrance_fee, interval)
    }

    pub fn enter_lottery(ctx: Context<EnterLottery>, amount: u64) -> Result<()> {
        instructions::enter_lottery::enter_lottery(ctx, amount)
    }

    pub fn check_upkeep(ctx: Context<CheckUpkeep>) -> Result<bool> {
        instructions::check_upkeep::check_upkeep(ctx)
    }

    pub fn perform_upkeep(ctx: Context<PerformUpkeep>) -> Result<()> {
        instructions::perform_upkeep::perform_upkeep(ctx)
    }

    pub fn fulfill_random_words(ctx: Context<FulfillRandomWords>) -> Result<()> {
        instructions::fulfill_random_words::fulfill_random_words(ctx)
    }
}
