//! Local candle cache port trait.

use crate::domain::candle::Candle;
use crate::domain::error::MoexError;

/// Per-security store for previously fetched tables.
pub trait CachePort {
    /// Load the cached table verbatim, in stored order.
    fn load(&self, sec_id: &str) -> Result<Vec<Candle>, MoexError>;

    /// Replace the cached table for `sec_id`.
    fn save(&self, sec_id: &str, candles: &[Candle]) -> Result<(), MoexError>;

    fn contains(&self, sec_id: &str) -> bool;
}
