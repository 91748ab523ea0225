use anchor_lang::error_code;

#[error_code]
pub enum LotteryError {
    #[msg("Payment is below the entrance fee")]
    InsufficientPayment,
    #[msg("Lottery is not open for entry")]
    NotOpen,
    #[msg("Upkeep is not needed")]
    UpkeepNotNeeded,
    #[msg("Unknown, mismatched or already consumed randomness request")]
    UnknownRequest,
    #[msg("Prize transfer failed")]
    TransferFailed,
    #[msg("Player index out of range")]
    IndexOutOfRange,
    #[msg("Player list is full for this round")]
    LotteryFull,
    Overflow,
    #[msg("Signer has insufficient funds for the entry payment")]
    InsufficientFunds,
    #[msg("Randomness account data could not be parsed")]
    InvalidRandomnessAccount,
    #[msg("Randomness was already revealed for this slot")]
    RandomnessAlreadyRevealed,
    #[msg("Randomness has not been resolved yet")]
    RandomnessNotResolved,
    #[msg("Winner account does not match the drawn winner")]
    WinnerMismatch,
    #[msg("Entrance fee must be greater than zero")]
    InvalidFee,
    #[msg("Interval must be greater than zero")]
    InvalidInterval,
}
