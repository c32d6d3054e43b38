//! Validated runtime settings built from a [`ConfigPort`].
//!
//! Every key is optional. Missing keys take the documented defaults; present
//! keys that fail validation are reported as `ConfigInvalid`.

use crate::domain::error::MoexError;
use crate::domain::pagination::{PaginationLimits, DEFAULT_MAX_PAGES};
use crate::domain::query::{default_end_date, default_start_date, DATE_FORMAT};
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://iss.moex.com/iss";
pub const DEFAULT_ENGINE: &str = "stock";
pub const DEFAULT_MARKET: &str = "shares";
pub const DEFAULT_BOARD: &str = "tqbr";
pub const DEFAULT_TIMEOUT_SECS: i64 = 30;
pub const DEFAULT_DATA_DIR: &str = "data";

/// Where the history resource lives on ISS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssSettings {
    pub base_url: String,
    pub engine: String,
    pub market: String,
    pub board: String,
    pub timeout: Duration,
}

impl Default for IssSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            engine: DEFAULT_ENGINE.to_string(),
            market: DEFAULT_MARKET.to_string(),
            board: DEFAULT_BOARD.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS as u64),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub iss: IssSettings,
    pub limits: PaginationLimits,
    pub data_dir: PathBuf,
    pub persist: bool,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            iss: IssSettings::default(),
            limits: PaginationLimits::default(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            persist: false,
            start_date: default_start_date(),
            end_date: default_end_date(),
        }
    }
}

pub fn build_settings(config: &dyn ConfigPort) -> Result<Settings, MoexError> {
    let base_url = string_or(config, "iss", "base_url", DEFAULT_BASE_URL);
    let base_url = base_url.trim().trim_end_matches('/').to_string();
    if base_url.is_empty() {
        return Err(invalid("iss", "base_url", "base_url must not be empty"));
    }

    let timeout_secs = positive_int(config, "iss", "timeout_secs", DEFAULT_TIMEOUT_SECS)?;
    let max_pages = positive_int(config, "iss", "max_pages", DEFAULT_MAX_PAGES as i64)?;

    let start_date = date_or(config, "start_date", default_start_date())?;
    let end_date = date_or(config, "end_date", default_end_date())?;
    if start_date > end_date {
        return Err(invalid(
            "query",
            "start_date",
            "start_date must not be after end_date",
        ));
    }

    Ok(Settings {
        iss: IssSettings {
            base_url,
            engine: string_or(config, "iss", "engine", DEFAULT_ENGINE),
            market: string_or(config, "iss", "market", DEFAULT_MARKET),
            board: string_or(config, "iss", "board", DEFAULT_BOARD),
            timeout: Duration::from_secs(timeout_secs as u64),
        },
        limits: PaginationLimits {
            max_pages: max_pages as usize,
        },
        data_dir: PathBuf::from(string_or(config, "cache", "data_dir", DEFAULT_DATA_DIR)),
        persist: config.get_bool("cache", "persist", false),
        start_date,
        end_date,
    })
}

fn invalid(section: &str, key: &str, reason: &str) -> MoexError {
    MoexError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn string_or(config: &dyn ConfigPort, section: &str, key: &str, default: &str) -> String {
    config
        .get_string(section, key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn positive_int(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: i64,
) -> Result<i64, MoexError> {
    match config.get_int(section, key) {
        None => Ok(default),
        Some(Ok(v)) if v > 0 => Ok(v),
        Some(Ok(_)) => Err(invalid(section, key, &format!("{key} must be positive"))),
        Some(Err(raw)) => Err(invalid(
            section,
            key,
            &format!("expected an integer, got {raw:?}"),
        )),
    }
}

fn date_or(config: &dyn ConfigPort, key: &str, default: NaiveDate) -> Result<NaiveDate, MoexError> {
    match config.get_string("query", key) {
        None => Ok(default),
        Some(raw) => NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).map_err(|_| {
            invalid("query", key, "invalid date format (expected YYYY-MM-DD)")
        }),
    }
}
