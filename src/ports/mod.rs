//! Port traits at the domain boundary.

pub mod cache_port;
pub mod config_port;
pub mod page_port;
