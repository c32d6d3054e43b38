//! Domain error types.

use chrono::NaiveDate;

/// Top-level error type for moexhist.
#[derive(Debug, thiserror::Error)]
pub enum MoexError {
    #[error("invalid security id {sec_id:?}")]
    InvalidSecurity { sec_id: String },

    #[error("invalid date range: start {start} is after end {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("page fetch failed at offset {offset}: {reason}")]
    PageFetch { offset: u64, reason: String },

    #[error("schema mismatch in column {column}: {reason}")]
    SchemaMismatch { column: String, reason: String },

    #[error("pagination made no progress at offset {offset} of {total}")]
    NonProgressingPagination { offset: u64, total: u64 },

    #[error("pagination exceeded {max_pages} pages")]
    PageLimitExceeded { max_pages: usize },

    #[error("no data for {sec_id} between {start} and {end}")]
    NoData {
        sec_id: String,
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("cache file not found: {path}")]
    CacheNotFound { path: String },

    #[error("malformed cache file {path}: {reason}")]
    CacheMalformed { path: String, reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&MoexError> for std::process::ExitCode {
    fn from(err: &MoexError) -> Self {
        let code: u8 = match err {
            MoexError::Io(_) => 1,
            MoexError::ConfigParse { .. }
            | MoexError::ConfigInvalid { .. }
            | MoexError::InvalidSecurity { .. }
            | MoexError::InvalidDateRange { .. } => 2,
            MoexError::PageFetch { .. }
            | MoexError::NonProgressingPagination { .. }
            | MoexError::PageLimitExceeded { .. } => 3,
            MoexError::SchemaMismatch { .. } | MoexError::CacheMalformed { .. } => 4,
            MoexError::NoData { .. } | MoexError::CacheNotFound { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
