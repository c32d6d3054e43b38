//! Moscow Exchange ISS history adapter.
//!
//! Requests the JSON representation of the securities history resource. Each
//! response carries two blocks, `history` (the rows) and `history.cursor`
//! (`INDEX`, `TOTAL`, `PAGESIZE`), both in the compact `{columns, data}` shape.

use crate::domain::candle::Candle;
use crate::domain::error::MoexError;
use crate::domain::page::{Cursor, Page};
use crate::domain::query::{Query, DATE_FORMAT};
use crate::domain::settings::IssSettings;
use crate::ports::page_port::PagePort;
use chrono::NaiveDate;
use reqwest::blocking::Client;
use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

pub const HISTORY_BLOCK: &str = "history";
pub const CURSOR_BLOCK: &str = "history.cursor";

pub struct IssAdapter {
    client: Client,
    settings: IssSettings,
}

impl IssAdapter {
    pub fn new(settings: &IssSettings) -> Result<Self, MoexError> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .user_agent(concat!("moexhist/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(std::io::Error::other)?;
        Ok(Self {
            client,
            settings: settings.clone(),
        })
    }

    pub fn page_url(&self, query: &Query, offset: u64) -> Result<Url, MoexError> {
        let s = &self.settings;
        let base = format!(
            "{}/history/engines/{}/markets/{}/boards/{}/securities/{}.json",
            s.base_url, s.engine, s.market, s.board, query.sec_id()
        );
        Url::parse_with_params(
            &base,
            &[
                ("from", query.start_date().format(DATE_FORMAT).to_string()),
                ("till", query.end_date().format(DATE_FORMAT).to_string()),
                ("start", offset.to_string()),
                ("iss.meta", "off".to_string()),
            ],
        )
        .map_err(|e| MoexError::PageFetch {
            offset,
            reason: format!("invalid URL {base}: {e}"),
        })
    }
}

impl PagePort for IssAdapter {
    fn fetch_page(&self, query: &Query, offset: u64) -> Result<Page, MoexError> {
        let url = self.page_url(query, offset)?;
        debug!(%url, "requesting page");

        let fetch_err = |reason: String| MoexError::PageFetch { offset, reason };
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| fetch_err(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(fetch_err(format!("HTTP {status}")));
        }
        let body = response.text().map_err(|e| fetch_err(e.to_string()))?;

        parse_page(&body, offset)
    }
}

#[derive(Debug, Deserialize)]
struct Block {
    columns: Vec<String>,
    data: Vec<Vec<Value>>,
}

/// Column name to position, built once per block.
struct ColumnIndex<'a> {
    block: &'static str,
    positions: HashMap<&'a str, usize>,
}

impl<'a> ColumnIndex<'a> {
    fn new(block: &'static str, columns: &'a [String]) -> Self {
        let positions = columns
            .iter()
            .enumerate()
            .map(|(i, name)| (name.as_str(), i))
            .collect();
        Self { block, positions }
    }

    fn require(&self, column: &str) -> Result<usize, MoexError> {
        self.positions
            .get(column)
            .copied()
            .ok_or_else(|| MoexError::SchemaMismatch {
                column: column.to_string(),
                reason: format!("missing from {} block", self.block),
            })
    }
}

/// Parse one ISS response body into a typed page.
pub fn parse_page(body: &str, offset: u64) -> Result<Page, MoexError> {
    let mut blocks: HashMap<String, Value> =
        serde_json::from_str(body).map_err(|e| MoexError::PageFetch {
            offset,
            reason: format!("invalid JSON: {e}"),
        })?;

    let mut take_block = |name: &str| -> Result<Block, MoexError> {
        let value = blocks.remove(name).ok_or_else(|| MoexError::PageFetch {
            offset,
            reason: format!("response has no {name} block"),
        })?;
        serde_json::from_value(value).map_err(|e| MoexError::PageFetch {
            offset,
            reason: format!("malformed {name} block: {e}"),
        })
    };
    let history = take_block(HISTORY_BLOCK)?;
    let cursor = take_block(CURSOR_BLOCK)?;

    Ok(Page {
        candles: parse_candles(&history)?,
        cursor: parse_cursor(&cursor)?,
    })
}

struct CandleColumns {
    trade_date: usize,
    board_id: usize,
    sec_id: usize,
    num_trades: usize,
    value: usize,
    open: usize,
    low: usize,
    high: usize,
    close: usize,
    wa_price: usize,
    volume: usize,
}

fn parse_candles(block: &Block) -> Result<Vec<Candle>, MoexError> {
    let index = ColumnIndex::new(HISTORY_BLOCK, &block.columns);
    let cols = CandleColumns {
        trade_date: index.require("TRADEDATE")?,
        board_id: index.require("BOARDID")?,
        sec_id: index.require("SECID")?,
        num_trades: index.require("NUMTRADES")?,
        value: index.require("VALUE")?,
        open: index.require("OPEN")?,
        low: index.require("LOW")?,
        high: index.require("HIGH")?,
        close: index.require("CLOSE")?,
        wa_price: index.require("WAPRICE")?,
        volume: index.require("VOLUME")?,
    };

    block
        .data
        .iter()
        .map(|row| -> Result<Candle, MoexError> {
            let cell = Cell { row, width: block.columns.len() };
            Ok(Candle {
                trade_date: cell.date(cols.trade_date, "TRADEDATE")?,
                board_id: cell.string(cols.board_id, "BOARDID")?,
                sec_id: cell.string(cols.sec_id, "SECID")?,
                num_trades: cell.int(cols.num_trades, "NUMTRADES")?,
                value: cell.opt_float(cols.value, "VALUE")?.unwrap_or(0.0),
                open: cell.opt_float(cols.open, "OPEN")?,
                low: cell.opt_float(cols.low, "LOW")?,
                high: cell.opt_float(cols.high, "HIGH")?,
                close: cell.opt_float(cols.close, "CLOSE")?,
                wa_price: cell.opt_float(cols.wa_price, "WAPRICE")?,
                volume: cell.int(cols.volume, "VOLUME")?,
            })
        })
        .collect()
}

fn parse_cursor(block: &Block) -> Result<Cursor, MoexError> {
    let index = ColumnIndex::new(CURSOR_BLOCK, &block.columns);
    let (i_index, i_total, i_page_size) = (
        index.require("INDEX")?,
        index.require("TOTAL")?,
        index.require("PAGESIZE")?,
    );

    let row = match block.data.as_slice() {
        [row] => row,
        rows => {
            return Err(MoexError::SchemaMismatch {
                column: "INDEX".to_string(),
                reason: format!("{CURSOR_BLOCK} block has {} rows, expected 1", rows.len()),
            });
        }
    };
    let cell = Cell { row, width: block.columns.len() };

    Ok(Cursor {
        index: cell.count(i_index, "INDEX")?,
        total: cell.count(i_total, "TOTAL")?,
        page_size: cell.count(i_page_size, "PAGESIZE")?,
    })
}

/// Typed access to one data row.
struct Cell<'a> {
    row: &'a [Value],
    width: usize,
}

impl Cell<'_> {
    fn get(&self, i: usize, column: &str) -> Result<&Value, MoexError> {
        if self.row.len() != self.width {
            return Err(mismatch(
                column,
                format!("row has {} values for {} columns", self.row.len(), self.width),
            ));
        }
        Ok(&self.row[i])
    }

    fn string(&self, i: usize, column: &str) -> Result<String, MoexError> {
        match self.get(i, column)? {
            Value::String(s) => Ok(s.clone()),
            other => Err(unexpected(column, "string", other)),
        }
    }

    fn date(&self, i: usize, column: &str) -> Result<NaiveDate, MoexError> {
        let raw = self.string(i, column)?;
        NaiveDate::parse_from_str(&raw, DATE_FORMAT)
            .map_err(|_| mismatch(column, format!("invalid date {raw:?}")))
    }

    fn int(&self, i: usize, column: &str) -> Result<i64, MoexError> {
        match self.get(i, column)? {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| {
                    n.as_f64()
                        .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64)
                        .map(|f| f as i64)
                })
                .ok_or_else(|| mismatch(column, format!("expected integer, got {n}"))),
            other => Err(unexpected(column, "integer", other)),
        }
    }

    fn count(&self, i: usize, column: &str) -> Result<u64, MoexError> {
        match self.get(i, column)? {
            Value::Number(n) => n
                .as_u64()
                .ok_or_else(|| mismatch(column, format!("expected non-negative integer, got {n}"))),
            other => Err(unexpected(column, "non-negative integer", other)),
        }
    }

    fn opt_float(&self, i: usize, column: &str) -> Result<Option<f64>, MoexError> {
        match self.get(i, column)? {
            Value::Number(n) => Ok(n.as_f64()),
            Value::Null => Ok(None),
            other => Err(unexpected(column, "number", other)),
        }
    }
}

fn mismatch(column: &str, reason: String) -> MoexError {
    MoexError::SchemaMismatch {
        column: column.to_string(),
        reason,
    }
}

fn unexpected(column: &str, expected: &str, got: &Value) -> MoexError {
    mismatch(column, format!("expected {expected}, got {got}"))
}
