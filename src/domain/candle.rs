//! Daily trading candle as reported by the ISS history resource.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Column names in table order. Shared by the ISS mapping and the CSV cache.
pub const COLUMNS: [&str; 11] = [
    "TRADEDATE",
    "BOARDID",
    "SECID",
    "NUMTRADES",
    "VALUE",
    "OPEN",
    "LOW",
    "HIGH",
    "CLOSE",
    "WAPRICE",
    "VOLUME",
];

/// One trading day for one security on one board.
///
/// Prices are optional: ISS reports null prices for days on which the
/// security was listed but did not trade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    #[serde(rename = "TRADEDATE")]
    pub trade_date: NaiveDate,
    #[serde(rename = "BOARDID")]
    pub board_id: String,
    #[serde(rename = "SECID")]
    pub sec_id: String,
    #[serde(rename = "NUMTRADES")]
    pub num_trades: i64,
    #[serde(rename = "VALUE")]
    pub value: f64,
    #[serde(rename = "OPEN")]
    pub open: Option<f64>,
    #[serde(rename = "LOW")]
    pub low: Option<f64>,
    #[serde(rename = "HIGH")]
    pub high: Option<f64>,
    #[serde(rename = "CLOSE")]
    pub close: Option<f64>,
    #[serde(rename = "WAPRICE")]
    pub wa_price: Option<f64>,
    #[serde(rename = "VOLUME")]
    pub volume: i64,
}

impl Candle {
    /// True when the security traded on this day.
    pub fn has_trades(&self) -> bool {
        self.num_trades > 0 && self.close.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_candle() -> Candle {
        Candle {
            trade_date: NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
            board_id: "TQBR".into(),
            sec_id: "SBER".into(),
            num_trades: 81_234,
            value: 9_876_543_210.5,
            open: Some(271.9),
            low: Some(270.1),
            high: Some(275.0),
            close: Some(274.5),
            wa_price: Some(273.2),
            volume: 36_152_110,
        }
    }

    #[test]
    fn has_trades_for_regular_session() {
        assert!(sample_candle().has_trades());
    }

    #[test]
    fn has_trades_false_for_null_prices() {
        let candle = Candle {
            num_trades: 0,
            open: None,
            low: None,
            high: None,
            close: None,
            wa_price: None,
            ..sample_candle()
        };
        assert!(!candle.has_trades());
    }

    #[test]
    fn columns_have_no_duplicates() {
        let mut sorted = COLUMNS.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), COLUMNS.len());
    }
}
