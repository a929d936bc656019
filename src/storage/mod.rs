//! Exchange history persistence.
//!
//! Provides JSON-based storage of past `send` exchanges.

mod history;

pub use history::{ExchangeOutcome, ExchangeRecord, HistoryStore};
