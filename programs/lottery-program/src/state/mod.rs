pub use lottery::*;
pub use vault::*;

pub mod lottery;
pub mod vault;
