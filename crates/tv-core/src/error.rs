//! Shared error type.
//!
//! Sub-crates define their own error enums and wrap `TvError` as one variant
//! via `From`, so configuration failures surface unchanged at the top.

use thiserror::Error;

/// The top-level error type for `tv-core` and a common base for sub-crates.
#[derive(Debug, Error)]
pub enum TvError {
    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for all `tv-*` crates.
pub type TvResult<T> = Result<T, TvError>;
