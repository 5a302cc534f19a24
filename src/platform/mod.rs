//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - The remote key-value service (fetch on web)
//! - The JS-facing game handle
//! - Logging setup

pub mod keyvalue;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use keyvalue::{DEFAULT_BASE_URL, parse_value, value_url};
