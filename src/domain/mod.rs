//! Core domain types and logic.

pub mod candle;
pub mod error;
pub mod page;
pub mod pagination;
pub mod query;
pub mod settings;
pub mod source;
