//! Paged remote history port trait.

use crate::domain::error::MoexError;
use crate::domain::page::Page;
use crate::domain::query::Query;

/// Port for retrieving one page of history rows starting at `offset`.
pub trait PagePort {
    fn fetch_page(&self, query: &Query, offset: u64) -> Result<Page, MoexError>;
}
