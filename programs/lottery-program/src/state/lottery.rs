use anchor_lang::prelude::*;

use crate::error::LotteryError;

/// Maximum number of entries per round. The player list lives inside the
/// lottery account, whose space is fixed at initialization, and CPI-created
/// accounts are capped at 10240 bytes.
pub const MAX_PLAYERS: usize = 256;

// Space calculation:
// 8 (discriminator) +
// 1 (bump) +
// 8 (entrance_fee) +
// 8 (interval) +
// 8 (last_timestamp) +
// 1 (state) +
// 8 (pot) +
// 33 (recent_winner: Option<Pubkey>) +
// 32 (randomness_account) +
// 4 + 32 * MAX_PLAYERS (players) =
// 8303 total bytes
pub const LOTTERY_ACCOUNT_SIZE: usize = 8 + 1 + 8 + 8 + 8 + 1 + 8 + 33 + 32 + 4 + 32 * MAX_PLAYERS;

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug)]
pub enum LotteryState {
    Open = 0,
    Calculating = 1,
}

/// Outcome of a settled round.
#[derive(Clone, Copy, Debug)]
pub struct Settlement {
    pub winner: Pubkey,
    pub winner_index: u64,
    pub prize: u64,
}

/// The whole lottery round machine in one account: entries, pot, schedule,
/// the pending randomness request and the Open/Calculating state. Every
/// mutation funnels through the methods below; instruction handlers only add
/// the lamport movement around them.
#[account]
#[derive(Debug, PartialEq, Eq)]
pub struct Lottery {
    pub bump: u8,
    /// Minimum payment per entry, in lamports. Fixed at initialization.
    pub entrance_fee: u64,
    /// Round length in seconds. Fixed at initialization.
    pub interval: i64,
    /// Unix timestamp of the last round reset (or of initialization).
    pub last_timestamp: i64,
    pub state: LotteryState,
    /// Sum of all entry payments this round, in lamports. The lamports
    /// themselves sit in the vault PDA.
    pub pot: u64,
    /// Winner of the most recent completed round.
    pub recent_winner: Option<Pubkey>,
    /// The committed Switchboard randomness account for the round being
    /// settled. This pubkey is the request identifier: `Pubkey::default()`
    /// means no request is live. Cleared on consumption, so a request can
    /// never be replayed.
    pub randomness_account: Pubkey,
    /// Entries in insertion order. The same player may appear multiple times.
    pub players: Vec<Pubkey>,
}

impl Lottery {
    pub fn player_count(&self) -> u64 {
        self.players.len() as u64
    }

    pub fn player_at(&self, index: u64) -> Result<Pubkey> {
        self.players
            .get(index as usize)
            .copied()
            .ok_or_else(|| error!(LotteryError::IndexOutOfRange))
    }

    /// Whether the current round has run for at least `interval` seconds.
    pub fn time_passed(&self, now: i64) -> bool {
        now.saturating_sub(self.last_timestamp) >= self.interval
    }

    /// The close predicate the automation crank polls. Read-only by
    /// construction; safe to evaluate at any frequency.
    pub fn upkeep_needed(&self, now: i64) -> bool {
        self.time_passed(now)
            && self.state == LotteryState::Open
            && self.pot > 0
            && !self.players.is_empty()
    }

    /// Records one paid entry. The state check comes first: a closed lottery
    /// rejects any payment, sufficient or not.
    pub fn record_entry(&mut self, player: Pubkey, amount: u64) -> Result<u64> {
        require!(self.state == LotteryState::Open, LotteryError::NotOpen);
        require!(amount >= self.entrance_fee, LotteryError::InsufficientPayment);
        require!(self.players.len() < MAX_PLAYERS, LotteryError::LotteryFull);

        self.pot = self
            .pot
            .checked_add(amount)
            .ok_or(LotteryError::Overflow)?;
        self.players.push(player);

        Ok(self.players.len() as u64 - 1)
    }

    /// Closes entry for the round and records the randomness request.
    /// Re-validates the close predicate so a stale crank call cannot close a
    /// round that no longer qualifies. Only reachable from Open, and always
    /// leaves the machine Calculating, so at most one request is ever live.
    pub fn begin_calculating(&mut self, randomness_account: Pubkey, now: i64) -> Result<()> {
        require!(self.upkeep_needed(now), LotteryError::UpkeepNotNeeded);

        self.state = LotteryState::Calculating;
        self.randomness_account = randomness_account;

        Ok(())
    }

    /// Consumes the revealed randomness, picks the winner and resets the
    /// round. Anything other than the one live request is rejected: no
    /// request pending, a mismatched account, or a request that was already
    /// consumed all fail the same way.
    pub fn settle(
        &mut self,
        randomness_account: Pubkey,
        random_value: u64,
        now: i64,
    ) -> Result<Settlement> {
        require!(
            self.state == LotteryState::Calculating,
            LotteryError::UnknownRequest
        );
        require!(
            self.randomness_account != Pubkey::default()
                && randomness_account == self.randomness_account,
            LotteryError::UnknownRequest
        );

        // The close predicate required a non-empty player list and entry is
        // blocked while Calculating, so the modulus is never zero.
        let winner_index = random_value % self.player_count();
        let winner = self.player_at(winner_index)?;
        let prize = self.pot;

        self.recent_winner = Some(winner);
        self.players.clear();
        self.pot = 0;
        self.last_timestamp = now;
        self.randomness_account = Pubkey::default();
        self.state = LotteryState::Open;

        Ok(Settlement {
            winner,
            winner_index,
            prize,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anchor_lang::error::Error;

    const FEE: u64 = 1;
    const INTERVAL: i64 = 60;
    const START: i64 = 1_000;

    fn fresh_lottery() -> Lottery {
        Lottery {
            bump: 254,
            entrance_fee: FEE,
            interval: INTERVAL,
            last_timestamp: START,
            state: LotteryState::Open,
            pot: 0,
            recent_winner: None,
            randomness_account: Pubkey::default(),
            players: Vec::new(),
        }
    }

    fn assert_fails_with<T: std::fmt::Debug>(res: Result<T>, expected: LotteryError) {
        match res.unwrap_err() {
            Error::AnchorError(e) => assert_eq!(e.error_code_number, u32::from(expected)),
            Error::ProgramError(e) => panic!("unexpected program error: {:?}", e),
        }
    }

    #[test]
    fn entry_below_fee_is_rejected_without_side_effects() {
        let mut lottery = fresh_lottery();
        lottery.entrance_fee = 100;
        let before = lottery.clone();

        assert_fails_with(
            lottery.record_entry(Pubkey::new_unique(), 99),
            LotteryError::InsufficientPayment,
        );
        assert_eq!(lottery, before);
    }

    #[test]
    fn entry_at_or_above_fee_is_recorded_in_order() {
        let mut lottery = fresh_lottery();
        lottery.entrance_fee = 100;
        let (a, b) = (Pubkey::new_unique(), Pubkey::new_unique());

        assert_eq!(lottery.record_entry(a, 100).unwrap(), 0);
        assert_eq!(lottery.record_entry(b, 150).unwrap(), 1);
        // Re-entry of the same player is allowed and appended, not merged.
        assert_eq!(lottery.record_entry(a, 100).unwrap(), 2);

        assert_eq!(lottery.player_count(), 3);
        assert_eq!(lottery.pot, 350);
        assert_eq!(lottery.player_at(0).unwrap(), a);
        assert_eq!(lottery.player_at(1).unwrap(), b);
        assert_eq!(lottery.player_at(2).unwrap(), a);
    }

    #[test]
    fn entry_while_calculating_fails_not_open_regardless_of_amount() {
        let mut lottery = fresh_lottery();
        lottery.entrance_fee = 100;
        lottery.state = LotteryState::Calculating;

        for amount in [0, 99, 100, 1_000_000] {
            assert_fails_with(
                lottery.record_entry(Pubkey::new_unique(), amount),
                LotteryError::NotOpen,
            );
        }
        assert_eq!(lottery.player_count(), 0);
        assert_eq!(lottery.pot, 0);
    }

    #[test]
    fn entry_past_capacity_fails() {
        let mut lottery = fresh_lottery();
        lottery.players = vec![Pubkey::new_unique(); MAX_PLAYERS];
        assert_fails_with(
            lottery.record_entry(Pubkey::new_unique(), FEE),
            LotteryError::LotteryFull,
        );
    }

    #[test]
    fn pot_overflow_leaves_ledger_unchanged() {
        let mut lottery = fresh_lottery();
        lottery.pot = u64::MAX - 10;

        assert_fails_with(
            lottery.record_entry(Pubkey::new_unique(), 100),
            LotteryError::Overflow,
        );
        assert_eq!(lottery.pot, u64::MAX - 10);
        assert_eq!(lottery.player_count(), 0);
    }

    #[test]
    fn player_at_out_of_range() {
        let mut lottery = fresh_lottery();
        lottery.record_entry(Pubkey::new_unique(), FEE).unwrap();

        assert_fails_with(lottery.player_at(1), LotteryError::IndexOutOfRange);
        assert_fails_with(lottery.player_at(u64::MAX), LotteryError::IndexOutOfRange);
    }

    #[test]
    fn upkeep_truth_table() {
        // upkeep_needed holds iff all four conditions hold; exhaust all 16
        // combinations.
        for time_due in [false, true] {
            for open in [false, true] {
                for funded in [false, true] {
                    for has_players in [false, true] {
                        let mut lottery = fresh_lottery();
                        if !open {
                            lottery.state = LotteryState::Calculating;
                        }
                        if funded {
                            lottery.pot = 4;
                        }
                        if has_players {
                            lottery.players = vec![Pubkey::new_unique(); 4];
                        }
                        let now = if time_due {
                            START + INTERVAL
                        } else {
                            START + INTERVAL - 1
                        };

                        assert_eq!(
                            lottery.upkeep_needed(now),
                            time_due && open && funded && has_players,
                            "time_due={} open={} funded={} has_players={}",
                            time_due,
                            open,
                            funded,
                            has_players
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn upkeep_check_never_mutates() {
        let mut lottery = fresh_lottery();
        lottery.record_entry(Pubkey::new_unique(), FEE).unwrap();
        let before = lottery.clone();

        for now in [START - 1, START, START + INTERVAL, i64::MAX] {
            lottery.upkeep_needed(now);
        }
        assert_eq!(lottery, before);
    }

    #[test]
    fn begin_calculating_fails_exactly_when_predicate_is_false() {
        let now = START + INTERVAL;
        let request = Pubkey::new_unique();

        // Qualifying round closes.
        let mut lottery = fresh_lottery();
        lottery.record_entry(Pubkey::new_unique(), FEE).unwrap();
        lottery.begin_calculating(request, now).unwrap();
        assert_eq!(lottery.state, LotteryState::Calculating);
        assert_eq!(lottery.randomness_account, request);

        // Not yet due.
        let mut lottery = fresh_lottery();
        lottery.record_entry(Pubkey::new_unique(), FEE).unwrap();
        let before = lottery.clone();
        assert_fails_with(
            lottery.begin_calculating(request, now - 1),
            LotteryError::UpkeepNotNeeded,
        );
        assert_eq!(lottery, before);

        // No entries.
        let mut lottery = fresh_lottery();
        assert_fails_with(
            lottery.begin_calculating(request, now),
            LotteryError::UpkeepNotNeeded,
        );

        // Already calculating; a second close is unreachable until the live
        // request resolves.
        let mut lottery = fresh_lottery();
        lottery.record_entry(Pubkey::new_unique(), FEE).unwrap();
        lottery.begin_calculating(request, now).unwrap();
        assert_fails_with(
            lottery.begin_calculating(Pubkey::new_unique(), now),
            LotteryError::UpkeepNotNeeded,
        );
    }

    #[test]
    fn settle_rejects_anything_but_the_live_request() {
        let now = START + INTERVAL;

        // No request pending at all.
        let mut lottery = fresh_lottery();
        lottery.record_entry(Pubkey::new_unique(), FEE).unwrap();
        assert_fails_with(
            lottery.settle(Pubkey::new_unique(), 7, now),
            LotteryError::UnknownRequest,
        );
        // The default pubkey is never a valid request identifier.
        assert_fails_with(
            lottery.settle(Pubkey::default(), 7, now),
            LotteryError::UnknownRequest,
        );

        // Mismatched identifier while a request is live.
        let request = Pubkey::new_unique();
        lottery.begin_calculating(request, now).unwrap();
        let before = lottery.clone();
        assert_fails_with(
            lottery.settle(Pubkey::new_unique(), 7, now),
            LotteryError::UnknownRequest,
        );
        assert_fails_with(
            lottery.settle(Pubkey::default(), 7, now),
            LotteryError::UnknownRequest,
        );
        assert_eq!(lottery, before);
    }

    #[test]
    fn full_round_picks_winner_pays_pot_and_resets() {
        let mut lottery = fresh_lottery();
        let players: Vec<Pubkey> = (0..4).map(|_| Pubkey::new_unique()).collect();
        for player in &players {
            lottery.record_entry(*player, FEE).unwrap();
        }
        assert_eq!(lottery.pot, 4);

        let close_time = START + INTERVAL;
        let request = Pubkey::new_unique();
        lottery.begin_calculating(request, close_time).unwrap();

        let settle_time = close_time + 5;
        let settlement = lottery.settle(request, 17, settle_time).unwrap();

        // 17 mod 4 = 1
        assert_eq!(settlement.winner_index, 1);
        assert_eq!(settlement.winner, players[1]);
        assert_eq!(settlement.prize, 4);

        assert_eq!(lottery.recent_winner, Some(players[1]));
        assert_eq!(lottery.player_count(), 0);
        assert_eq!(lottery.pot, 0);
        assert_eq!(lottery.state, LotteryState::Open);
        assert_eq!(lottery.last_timestamp, settle_time);
        assert_eq!(lottery.randomness_account, Pubkey::default());
    }

    #[test]
    fn settled_request_cannot_be_replayed() {
        let mut lottery = fresh_lottery();
        lottery.record_entry(Pubkey::new_unique(), FEE).unwrap();
        let request = Pubkey::new_unique();
        lottery.begin_calculating(request, START + INTERVAL).unwrap();
        lottery.settle(request, 17, START + INTERVAL + 5).unwrap();

        let before = lottery.clone();
        for value in [0, 17, u64::MAX] {
            assert_fails_with(
                lottery.settle(request, value, START + 2 * INTERVAL),
                LotteryError::UnknownRequest,
            );
        }
        assert_eq!(lottery, before);
    }

    #[test]
    fn next_round_runs_on_the_advanced_clock() {
        let mut lottery = fresh_lottery();
        lottery.record_entry(Pubkey::new_unique(), FEE).unwrap();
        let request = Pubkey::new_unique();
        lottery.begin_calculating(request, START + INTERVAL).unwrap();
        let settle_time = START + INTERVAL + 30;
        lottery.settle(request, 3, settle_time).unwrap();

        lottery.record_entry(Pubkey::new_unique(), FEE).unwrap();
        assert!(!lottery.upkeep_needed(settle_time + INTERVAL - 1));
        assert!(lottery.upkeep_needed(settle_time + INTERVAL));
    }
}
