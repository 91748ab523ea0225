pub use check_upkeep::*;
pub use enter_lottery::*;
pub use fulfill_random_words::*;
pub use initialize_lottery::*;
pub use perform_upkeep::*;

pub mod check_upkeep;
pub mod enter_lottery;
pub mod fulfill_random_words;
pub mod initialize_lottery;
pub mod perform_upkeep;
