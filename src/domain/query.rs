//! History query for one security over a date range.

use crate::domain::error::MoexError;
use chrono::NaiveDate;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// First day requested when the caller gives no start date.
pub fn default_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// Last day requested when the caller gives no end date.
pub fn default_end_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 10, 31).unwrap_or(NaiveDate::MAX)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    sec_id: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
}

impl Query {
    /// Security ids are trimmed and upper-cased; ISS treats them case-insensitively.
    pub fn new(sec_id: &str, start_date: NaiveDate, end_date: NaiveDate) -> Result<Self, MoexError> {
        let sec_id = sec_id.trim();
        if sec_id.is_empty() || sec_id.contains(['/', '\\', '?', '&', '#']) {
            return Err(MoexError::InvalidSecurity {
                sec_id: sec_id.to_string(),
            });
        }
        if start_date > end_date {
            return Err(MoexError::InvalidDateRange {
                start: start_date,
                end: end_date,
            });
        }
        Ok(Self {
            sec_id: sec_id.to_uppercase(),
            start_date,
            end_date,
        })
    }

    pub fn sec_id(&self) -> &str {
        &self.sec_id
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn end_date(&self) -> NaiveDate {
        self.end_date
    }
}
