//! Stockboard Core — the data-shaping pipeline behind the stock dashboard.
//!
//! This crate contains:
//! - CSV parser adapter (file, HTTP, inline) with generic and typed modes
//! - Record normalizer (camel-cased keys, numeric coercion)
//! - Locale-aware date/number formatter and the display mappers
//! - Store: per-source data slices, loading flags, sort/filter/page ordering
//! - CSV export and TOML configuration

pub mod case;
pub mod config;
pub mod domain;
pub mod export;
pub mod format;
pub mod mapper;
pub mod normalize;
pub mod source;
pub mod store;

pub use config::{ConfigError, DashboardConfig};
pub use domain::{AggregatedRecord, Column, DataRecord, DisplayStockRecord, StockField, StockRecord};
pub use format::{Formatter, Locale};
pub use normalize::{coerce_cell, normalize_rows, FieldValue, NormalizedRecord};
pub use source::{CsvProvider, CsvSource, SourceError, StockTable};
pub use store::{DataSource, FetchTicket, SortOrder, Sorting, SourceOrdering, Store, StoreError};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    /// Fetches may be parsed on a worker thread and committed later.
    #[test]
    fn fetch_types_are_send_sync() {
        assert_send::<Store>();
        assert_sync::<Store>();
        assert_send::<FetchTicket>();
        assert_send::<StockRecord>();
        assert_send::<StockTable>();
        assert_send::<NormalizedRecord>();
        assert_send::<StoreError>();
        assert_sync::<StoreError>();
    }

    #[test]
    fn sources_are_send_sync() {
        assert_send::<CsvSource>();
        assert_sync::<CsvSource>();
    }
}
