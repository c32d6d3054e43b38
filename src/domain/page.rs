//! One page of a paged history response.

use crate::domain::candle::Candle;

/// Pagination record that accompanies every page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    /// Offset the service says this page starts at.
    pub index: u64,
    /// Rows in the whole result set.
    pub total: u64,
    /// Rows the service delivers per page.
    pub page_size: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub candles: Vec<Candle>,
    pub cursor: Cursor,
}
