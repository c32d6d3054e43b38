#![allow(dead_code)]

use chrono::NaiveDate;
use moexhist::domain::candle::Candle;
use moexhist::domain::error::MoexError;
use moexhist::domain::page::{Cursor, Page};
use moexhist::domain::query::Query;
use moexhist::ports::page_port::PagePort;
use std::cell::RefCell;

/// Serves scripted pages in call order and records each requested offset.
pub struct MockPagePort {
    pub pages: Vec<Result<Page, String>>,
    pub offsets: RefCell<Vec<u64>>,
}

impl MockPagePort {
    pub fn new() -> Self {
        Self {
            pages: Vec::new(),
            offsets: RefCell::new(Vec::new()),
        }
    }

    /// Pages of the given sizes, all reporting `total`, numbered rows from 1.
    pub fn with_sizes(sizes: &[u64], total: u64) -> Self {
        let mut port = Self::new();
        let mut index = 0;
        for &size in sizes {
            let candles = (index..index + size).map(|n| make_candle(n as i64 + 1)).collect();
            port = port.with_page(Page {
                candles,
                cursor: Cursor {
                    index,
                    total,
                    page_size: size,
                },
            });
            index += size;
        }
        port
    }

    pub fn with_page(mut self, page: Page) -> Self {
        self.pages.push(Ok(page));
        self
    }

    pub fn with_error(mut self, reason: &str) -> Self {
        self.pages.push(Err(reason.to_string()));
        self
    }

    pub fn calls(&self) -> usize {
        self.offsets.borrow().len()
    }
}

impl PagePort for MockPagePort {
    fn fetch_page(&self, _query: &Query, offset: u64) -> Result<Page, MoexError> {
        let call = self.offsets.borrow().len();
        self.offsets.borrow_mut().push(offset);
        match self.pages.get(call) {
            Some(Ok(page)) => Ok(page.clone()),
            Some(Err(reason)) => Err(MoexError::PageFetch {
                offset,
                reason: reason.clone(),
            }),
            None => Err(MoexError::PageFetch {
                offset,
                reason: "unexpected request".into(),
            }),
        }
    }
}

/// Candle whose volume and trade count carry `n`, for order checks.
pub fn make_candle(n: i64) -> Candle {
    Candle {
        trade_date: date(2023, 1, 1) + chrono::Duration::days(n),
        board_id: "TQBR".into(),
        sec_id: "SBER".into(),
        num_trades: n,
        value: n as f64 * 1000.5,
        open: Some(250.0 + n as f64),
        low: Some(249.0 + n as f64),
        high: Some(252.5 + n as f64),
        close: if n % 7 == 0 { None } else { Some(251.25 + n as f64) },
        wa_price: Some(250.75 + n as f64),
        volume: n * 100,
    }
}

pub fn sample_query() -> Query {
    Query::new("SBER", date(2023, 1, 1), date(2023, 12, 31)).unwrap()
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn volumes(candles: &[Candle]) -> Vec<i64> {
    candles.iter().map(|c| c.volume).collect()
}
