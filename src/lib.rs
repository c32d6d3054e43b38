//! moexhist: historical candle retrieval from the Moscow Exchange ISS.
//!
//! Hexagonal architecture: domain logic in [`domain`], port traits in [`ports`],
//! concrete implementations in [`adapters`].

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod logging;
pub mod ports;

use adapters::csv_adapter::CsvAdapter;
use adapters::iss_adapter::IssAdapter;
use chrono::NaiveDate;
use domain::candle::Candle;
use domain::error::MoexError;
use domain::query::Query;
use domain::settings::Settings;
use domain::source::{load_candles, DataSource};

/// Fetch the daily candles of `sec_id` between `start` and `end`.
///
/// With `local` set the table is read from the cache directory and the network
/// is not touched. Otherwise ISS is paged through and, with `save` set, the
/// result replaces the cache file. Missing dates fall back to `settings`.
/// The cache is keyed by security only, so `start` and `end` are not
/// validated when `local` is set.
pub fn get_candles(
    settings: &Settings,
    sec_id: &str,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    local: bool,
    save: bool,
) -> Result<Vec<Candle>, MoexError> {
    let query = if local {
        Query::new(sec_id, settings.start_date, settings.end_date)?
    } else {
        Query::new(
            sec_id,
            start.unwrap_or(settings.start_date),
            end.unwrap_or(settings.end_date),
        )?
    };
    let remote = IssAdapter::new(&settings.iss)?;
    let cache = CsvAdapter::new(settings.data_dir.clone());

    load_candles(
        DataSource::from_flags(local, save),
        &query,
        &remote,
        &cache,
        &settings.limits,
    )
}
