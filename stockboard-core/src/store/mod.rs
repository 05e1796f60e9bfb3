//! Dashboard store: data slices, loading flags, and ordering per data source.
//!
//! The store is a plain value owned by the caller. Every action takes
//! `&mut self` and runs to completion, so commits never interleave.
//!
//! Fetching is split in two so the parser adapter can run elsewhere:
//! 1. [`Store::begin_fetch`] marks the source loading and hands out a ticket
//! 2. [`Store::complete_stock_fetch`] / [`Store::complete_aggregated_fetch`]
//!    commit the parsed rows, or [`Store::fail_fetch`] abandons them
//!
//! At most one fetch per source is in flight; a second `begin_fetch` is
//! rejected until the first is completed or failed.
//!
//! Completed fetches append to the data slice. Paging through the stock
//! source therefore accumulates rows until [`Store::reset_data_source`].
//!
//! Only the stock source has an ordering. Sort, filter and page actions
//! on the aggregated source are rejected with [`StoreError::NoOrdering`].

pub mod ordering;
pub mod pipeline;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{DashboardConfig, DEFAULT_PAGE_SIZE};
use crate::domain::{AggregatedRecord, Column, DataRecord, DisplayStockRecord, StockField, StockRecord};
use crate::format::Formatter;
use crate::mapper::{map_aggregated_data, map_stock_data};
use crate::normalize::{normalize_rows, NormalizedRecord};
use crate::source::{read_rows, read_stock_table, CsvProvider, SourceError, StockTable};

pub use ordering::{page_window, SortOrder, Sorting, SourceOrdering};

/// One of the independently loaded datasets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DataSource {
    StockData,
    AggregatedStockExchange,
}

impl DataSource {
    pub const ALL: [DataSource; 2] = [DataSource::StockData, DataSource::AggregatedStockExchange];

    pub fn as_str(self) -> &'static str {
        match self {
            DataSource::StockData => "stockData",
            DataSource::AggregatedStockExchange => "aggregatedStockExchange",
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DataSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match crate::case::camel_case(s).as_str() {
            "stockData" | "stock" => Ok(DataSource::StockData),
            "aggregatedStockExchange" | "aggregated" => Ok(DataSource::AggregatedStockExchange),
            _ => Err(format!(
                "unknown data source '{s}' (expected stockData or aggregatedStockExchange)"
            )),
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("a fetch for {0} is already in flight")]
    FetchInFlight(DataSource),

    #[error("page numbers start at 1, got {0}")]
    InvalidPage(u32),

    #[error("{0} has no sort, filter or page settings")]
    NoOrdering(DataSource),

    #[error("ticket for {data_source} is not the fetch currently in flight")]
    StaleTicket { data_source: DataSource },

    #[error("ticket for {got} cannot complete a {expected} fetch")]
    SourceMismatch { expected: DataSource, got: DataSource },

    #[error(transparent)]
    Source(#[from] SourceError),
}

/// Proof of a started fetch; consumed when the fetch completes or fails.
#[derive(Debug, PartialEq, Eq)]
pub struct FetchTicket {
    source: DataSource,
    id: u64,
}

impl FetchTicket {
    pub fn source(&self) -> DataSource {
        self.source
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadingFlags {
    pub stock_data: bool,
    pub aggregated_stock_exchange: bool,
    /// True until the first stock fetch completes.
    pub is_initial_stock_data_load: bool,
}

impl Default for LoadingFlags {
    fn default() -> Self {
        Self {
            stock_data: false,
            aggregated_stock_exchange: false,
            is_initial_stock_data_load: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Store {
    page_size: usize,
    stock_data: Vec<StockRecord>,
    /// Known columns in the header of the first loaded stock page.
    stock_fields: Vec<StockField>,
    aggregated_stock_exchange: Vec<NormalizedRecord>,
    loading: LoadingFlags,
    stock_ordering: SourceOrdering,
    in_flight: HashMap<DataSource, u64>,
    next_ticket: u64,
}

impl Default for Store {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl Store {
    /// Empty store. A `page_size` of 0 is treated as 1.
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            stock_data: Vec::new(),
            stock_fields: Vec::new(),
            aggregated_stock_exchange: Vec::new(),
            loading: LoadingFlags::default(),
            stock_ordering: SourceOrdering::default(),
            in_flight: HashMap::new(),
            next_ticket: 0,
        }
    }

    pub fn from_config(config: &DashboardConfig) -> Self {
        Self::new(config.paging.page_size)
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    // ─── Fetch ──────────────────────────────────────────────────────

    pub fn begin_fetch(&mut self, source: DataSource) -> Result<FetchTicket, StoreError> {
        if self.in_flight.contains_key(&source) {
            warn!(%source, "rejected overlapping fetch");
            return Err(StoreError::FetchInFlight(source));
        }
        self.next_ticket += 1;
        let id = self.next_ticket;
        self.in_flight.insert(source, id);
        self.set_loading(source, true);
        debug!(%source, ticket = id, "fetch started");
        Ok(FetchTicket { source, id })
    }

    fn finish_ticket(&mut self, ticket: &FetchTicket, expected: DataSource) -> Result<(), StoreError> {
        if ticket.source != expected {
            return Err(StoreError::SourceMismatch {
                expected,
                got: ticket.source,
            });
        }
        if self.in_flight.get(&ticket.source) != Some(&ticket.id) {
            return Err(StoreError::StaleTicket {
                data_source: ticket.source,
            });
        }
        self.in_flight.remove(&ticket.source);
        self.set_loading(ticket.source, false);
        Ok(())
    }

    /// Commit a stock fetch: filter, sort and window the table's records
    /// using the ordering in effect now, then append the window to the stock
    /// slice. Returns the number of rows appended.
    pub fn complete_stock_fetch(
        &mut self,
        ticket: FetchTicket,
        table: StockTable,
    ) -> Result<usize, StoreError> {
        self.finish_ticket(&ticket, DataSource::StockData)?;

        let page = pipeline::select_stock_page(table.records, &self.stock_ordering, self.page_size);
        let appended = page.len();
        if self.stock_data.is_empty() && !page.is_empty() {
            self.stock_fields = table.fields;
        }
        self.stock_data.extend(page);
        self.loading.is_initial_stock_data_load = false;

        info!(
            appended,
            total = self.stock_data.len(),
            page = self.stock_ordering.page,
            "stock data fetch complete"
        );
        Ok(appended)
    }

    /// Commit an aggregated fetch by appending the normalized rows.
    pub fn complete_aggregated_fetch(
        &mut self,
        ticket: FetchTicket,
        records: Vec<NormalizedRecord>,
    ) -> Result<usize, StoreError> {
        self.finish_ticket(&ticket, DataSource::AggregatedStockExchange)?;

        let appended = records.len();
        self.aggregated_stock_exchange.extend(records);
        info!(
            appended,
            total = self.aggregated_stock_exchange.len(),
            "aggregated stock exchange fetch complete"
        );
        Ok(appended)
    }

    /// Abandon a fetch: clears loading and the in-flight mark, keeps data.
    pub fn fail_fetch(&mut self, ticket: FetchTicket) {
        let expected = ticket.source;
        if let Err(e) = self.finish_ticket(&ticket, expected) {
            warn!(error = %e, "ignored failure for a fetch that is not in flight");
        }
    }

    /// Load the stock resource and commit it.
    pub fn fetch_stock_data(&mut self, provider: &dyn CsvProvider) -> Result<usize, StoreError> {
        let ticket = self.begin_fetch(DataSource::StockData)?;
        match read_stock_table(provider) {
            Ok(table) => self.complete_stock_fetch(ticket, table),
            Err(e) => {
                warn!(source = %provider.describe(), error = %e, "stock data fetch failed");
                self.fail_fetch(ticket);
                Err(e.into())
            }
        }
    }

    /// Load the aggregated resource through the generic normalizer and commit it.
    pub fn fetch_aggregated_stock_exchange(
        &mut self,
        provider: &dyn CsvProvider,
    ) -> Result<usize, StoreError> {
        let ticket = self.begin_fetch(DataSource::AggregatedStockExchange)?;
        let parsed = read_rows(provider)
            .and_then(|rows| normalize_rows(&rows).ok_or(SourceError::MissingHeader));
        match parsed {
            Ok(records) => self.complete_aggregated_fetch(ticket, records),
            Err(e) => {
                warn!(source = %provider.describe(), error = %e, "aggregated fetch failed");
                self.fail_fetch(ticket);
                Err(e.into())
            }
        }
    }

    // ─── Ordering actions ───────────────────────────────────────────

    pub fn stock_ordering(&self) -> &SourceOrdering {
        &self.stock_ordering
    }

    fn ordering_mut(&mut self, source: DataSource) -> Result<&mut SourceOrdering, StoreError> {
        match source {
            DataSource::StockData => Ok(&mut self.stock_ordering),
            DataSource::AggregatedStockExchange => {
                warn!(%source, "rejected ordering action");
                Err(StoreError::NoOrdering(source))
            }
        }
    }

    pub fn set_column_sort(&mut self, source: DataSource, key: &str) -> Result<(), StoreError> {
        let ordering = self.ordering_mut(source)?;
        ordering.toggle_sort(key);
        debug!(%source, key = %ordering.key, order = ordering.order.as_str(), "sort changed");
        Ok(())
    }

    /// Set or clear the exact-match name filter. `None` and `""` clear it;
    /// any other value is stored as given.
    pub fn set_filter_value(
        &mut self,
        source: DataSource,
        value: Option<&str>,
    ) -> Result<(), StoreError> {
        let value = value.filter(|v| !v.is_empty()).map(str::to_string);
        debug!(%source, filter = ?value, "filter changed");
        self.ordering_mut(source)?.filter_name = value;
        Ok(())
    }

    pub fn set_data_page(&mut self, source: DataSource, page: u32) -> Result<(), StoreError> {
        if page == 0 {
            return Err(StoreError::InvalidPage(page));
        }
        self.ordering_mut(source)?.page = page;
        debug!(%source, page, "page changed");
        Ok(())
    }

    /// Empty the data slice. Ordering is left as is.
    pub fn reset_data_source(&mut self, source: DataSource) {
        match source {
            DataSource::StockData => {
                self.stock_data.clear();
                self.stock_fields.clear();
            }
            DataSource::AggregatedStockExchange => self.aggregated_stock_exchange.clear(),
        }
        debug!(%source, "data reset");
    }

    pub fn reset_ordering(&mut self, source: DataSource) -> Result<(), StoreError> {
        *self.ordering_mut(source)? = SourceOrdering::default();
        Ok(())
    }

    pub fn set_loading(&mut self, source: DataSource, loading: bool) {
        match source {
            DataSource::StockData => self.loading.stock_data = loading,
            DataSource::AggregatedStockExchange => {
                self.loading.aggregated_stock_exchange = loading
            }
        }
    }

    // ─── Accessors ──────────────────────────────────────────────────

    pub fn is_loading(&self, source: DataSource) -> bool {
        match source {
            DataSource::StockData => self.loading.stock_data,
            DataSource::AggregatedStockExchange => self.loading.aggregated_stock_exchange,
        }
    }

    pub fn is_initial_stock_data_load(&self) -> bool {
        self.loading.is_initial_stock_data_load
    }

    pub fn loading(&self) -> &LoadingFlags {
        &self.loading
    }

    pub fn stock_data(&self) -> &[StockRecord] {
        &self.stock_data
    }

    pub fn aggregated_stock_exchange(&self) -> &[NormalizedRecord] {
        &self.aggregated_stock_exchange
    }

    /// Table columns for a source, derived from its first loaded record.
    pub fn columns(&self, source: DataSource) -> Vec<Column> {
        match source {
            DataSource::StockData => self.stock_data_columns(),
            DataSource::AggregatedStockExchange => self
                .aggregated_stock_exchange
                .first()
                .map(|r| r.keys().map(Column::from_key).collect())
                .unwrap_or_default(),
        }
    }

    /// Columns of the first loaded stock page's header, in header order.
    /// Empty until stock rows are loaded.
    pub fn stock_data_columns(&self) -> Vec<Column> {
        if self.stock_data.is_empty() {
            return Vec::new();
        }
        self.stock_fields.iter().map(|f| f.column()).collect()
    }

    pub fn stock_data_sort(&self) -> Sorting {
        self.stock_ordering.sorting()
    }

    pub fn stock_data_formatted(&self, fmt: &Formatter) -> Vec<DisplayStockRecord> {
        map_stock_data(&self.stock_data, fmt)
    }

    pub fn aggregated_data_formatted(&self, fmt: &Formatter) -> Vec<AggregatedRecord> {
        map_aggregated_data(&self.aggregated_stock_exchange, fmt)
    }

    /// Tagged view of a source's rows, as handed to the CSV serializer.
    pub fn data_records(&self, source: DataSource, fmt: &Formatter) -> Vec<DataRecord> {
        match source {
            DataSource::StockData => self
                .stock_data
                .iter()
                .cloned()
                .map(DataRecord::Stock)
                .collect(),
            DataSource::AggregatedStockExchange => self
                .aggregated_data_formatted(fmt)
                .into_iter()
                .map(DataRecord::Aggregated)
                .collect(),
        }
    }
}
