//! Paginated table fetcher.
//!
//! Walks a paged history resource from offset 0, advancing by the page size
//! each cursor reports, until the offset reaches the reported total. Pages are
//! requested strictly one at a time and concatenated in request order.

use crate::domain::candle::Candle;
use crate::domain::error::MoexError;
use crate::domain::query::Query;
use crate::ports::page_port::PagePort;
use tracing::{debug, info, warn};

pub const DEFAULT_MAX_PAGES: usize = 10_000;

/// Upper bound on requests issued for one query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationLimits {
    pub max_pages: usize,
}

impl Default for PaginationLimits {
    fn default() -> Self {
        Self {
            max_pages: DEFAULT_MAX_PAGES,
        }
    }
}

/// Fetch every row for `query`. All-or-nothing: the first failing page aborts
/// the whole fetch and no partial table is returned.
pub fn fetch_all(
    port: &dyn PagePort,
    query: &Query,
    limits: &PaginationLimits,
) -> Result<Vec<Candle>, MoexError> {
    let mut offset: u64 = 0;
    let mut pages: Vec<Vec<Candle>> = Vec::new();

    loop {
        if pages.len() >= limits.max_pages {
            return Err(MoexError::PageLimitExceeded {
                max_pages: limits.max_pages,
            });
        }

        let page = port.fetch_page(query, offset)?;
        let cursor = page.cursor;
        if cursor.index != offset {
            warn!(
                sec_id = query.sec_id(),
                offset,
                index = cursor.index,
                "cursor index differs from requested offset"
            );
        }
        debug!(
            sec_id = query.sec_id(),
            offset,
            rows = page.candles.len(),
            page_size = cursor.page_size,
            total = cursor.total,
            "fetched page"
        );
        pages.push(page.candles);

        if offset >= cursor.total {
            break;
        }
        if cursor.page_size == 0 {
            return Err(MoexError::NonProgressingPagination {
                offset,
                total: cursor.total,
            });
        }

        // Saturates on absurd page sizes; a saturated offset is past any total.
        offset = offset.saturating_add(cursor.page_size);
        if offset >= cursor.total {
            break;
        }
    }

    let page_count = pages.len();
    let candles: Vec<Candle> = pages.into_iter().flatten().collect();
    let idle_days = candles.iter().filter(|c| !c.has_trades()).count();
    info!(
        sec_id = query.sec_id(),
        rows = candles.len(),
        idle_days,
        pages = page_count,
        "pagination complete"
    );
    Ok(candles)
}
