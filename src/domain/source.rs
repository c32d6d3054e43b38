//! Source selection: local cache file or remote paginated fetch.

use crate::domain::candle::Candle;
use crate::domain::error::MoexError;
use crate::domain::pagination::{fetch_all, PaginationLimits};
use crate::domain::query::Query;
use crate::ports::cache_port::CachePort;
use crate::ports::page_port::PagePort;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    /// Read the cached table; the remote service is never contacted.
    LocalFile,
    /// Page through the remote service, optionally saving the result.
    RemoteFetch { persist: bool },
}

impl DataSource {
    /// `save` is ignored when `local` is set.
    pub fn from_flags(local: bool, save: bool) -> Self {
        if local {
            DataSource::LocalFile
        } else {
            DataSource::RemoteFetch { persist: save }
        }
    }
}

pub fn load_candles(
    source: DataSource,
    query: &Query,
    remote: &dyn PagePort,
    cache: &dyn CachePort,
    limits: &PaginationLimits,
) -> Result<Vec<Candle>, MoexError> {
    match source {
        DataSource::LocalFile => {
            let candles = cache.load(query.sec_id())?;
            info!(sec_id = query.sec_id(), rows = candles.len(), "loaded from cache");
            Ok(candles)
        }
        DataSource::RemoteFetch { persist } => {
            let candles = fetch_all(remote, query, limits)?;
            if candles.is_empty() {
                return Err(MoexError::NoData {
                    sec_id: query.sec_id().to_string(),
                    start: query.start_date(),
                    end: query.end_date(),
                });
            }
            if persist {
                if cache.contains(query.sec_id()) {
                    debug!(sec_id = query.sec_id(), "replacing cached table");
                }
                cache.save(query.sec_id(), &candles)?;
                info!(sec_id = query.sec_id(), rows = candles.len(), "saved to cache");
            }
            Ok(candles)
        }
    }
}
