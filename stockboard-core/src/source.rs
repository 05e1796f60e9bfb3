//! CSV parser adapter.
//!
//! A [`CsvProvider`] yields raw CSV text; the functions here turn that text
//! into either plain string rows (generic mode, header row included) or
//! typed [`StockRecord`]s (typed mode, schema known in advance).
//!
//! Providers are the swap point for tests: the store only ever sees
//! `&dyn CsvProvider`.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::case::snake_case;
use crate::domain::{StockField, StockRecord};
use crate::format::parse_date;
use crate::normalize::parse_number;

/// Errors from reading or parsing a CSV resource.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("network error fetching {url}: {reason}")]
    Network { url: String, reason: String },

    #[error("HTTP {status} fetching {url}")]
    Http { url: String, status: u16 },

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV resource has no header row")]
    MissingHeader,
}

/// Anything that can hand back the text of a CSV resource.
pub trait CsvProvider: Send + Sync {
    /// Human-readable location, used in logs.
    fn describe(&self) -> String;

    fn read_text(&self) -> Result<String, SourceError>;
}

/// Where a CSV resource lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CsvSource {
    File(PathBuf),
    Url(String),
    /// CSV text held in memory.
    Inline(String),
}

impl CsvSource {
    /// `http://` and `https://` locations are URLs; anything else is a path.
    pub fn parse(location: &str) -> Self {
        let lower = location.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            CsvSource::Url(location.to_string())
        } else {
            CsvSource::File(PathBuf::from(location))
        }
    }
}

impl fmt::Display for CsvSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CsvSource::File(path) => write!(f, "{}", path.display()),
            CsvSource::Url(url) => f.write_str(url),
            CsvSource::Inline(text) => write!(f, "<inline, {} bytes>", text.len()),
        }
    }
}

impl CsvProvider for CsvSource {
    fn describe(&self) -> String {
        self.to_string()
    }

    fn read_text(&self) -> Result<String, SourceError> {
        match self {
            CsvSource::File(path) => std::fs::read_to_string(path).map_err(|source| {
                SourceError::Io {
                    path: path.clone(),
                    source,
                }
            }),
            CsvSource::Url(url) => fetch_url(url),
            CsvSource::Inline(text) => Ok(text.clone()),
        }
    }
}

fn fetch_url(url: &str) -> Result<String, SourceError> {
    let network = |e: reqwest::Error| SourceError::Network {
        url: url.to_string(),
        reason: e.to_string(),
    };

    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .map_err(network)?;

    let resp = client.get(url).send().map_err(network)?;
    let status = resp.status();
    if !status.is_success() {
        return Err(SourceError::Http {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    resp.text().map_err(network)
}

// ─── Generic mode ───────────────────────────────────────────────────

/// Parse CSV text into string rows. The header row, if any, is row 0.
/// Blank lines are skipped; rows may differ in length.
pub fn parse_rows(text: &str) -> Result<Vec<Vec<String>>, SourceError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    debug!(rows = rows.len(), "parsed generic CSV rows");
    Ok(rows)
}

pub fn read_rows(provider: &dyn CsvProvider) -> Result<Vec<Vec<String>>, SourceError> {
    parse_rows(&provider.read_text()?)
}

// ─── Typed mode ─────────────────────────────────────────────────────

/// Stock row as it appears on the wire; typing happens in `into_record`.
#[derive(Debug, Deserialize)]
struct RawStockRow {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    market: Option<String>,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    open_price: Option<String>,
    #[serde(default)]
    close_price: Option<String>,
    #[serde(default)]
    high_price: Option<String>,
    #[serde(default)]
    low_price: Option<String>,
    #[serde(default)]
    volume: Option<String>,
}

impl RawStockRow {
    fn into_record(self) -> StockRecord {
        let number = |cell: Option<String>| cell.as_deref().and_then(parse_number);
        StockRecord {
            name: self.name.filter(|s| !s.is_empty()),
            market: self.market.filter(|s| !s.is_empty()),
            date: self.date.as_deref().and_then(parse_date),
            open_price: number(self.open_price),
            close_price: number(self.close_price),
            high_price: number(self.high_price),
            low_price: number(self.low_price),
            volume: number(self.volume),
        }
    }
}

/// Typed stock rows plus the known columns their header carried, in
/// header order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StockTable {
    pub fields: Vec<StockField>,
    pub records: Vec<StockRecord>,
}

/// Parse stock CSV text into typed records.
///
/// Header names are matched in any casing (`Open Price`, `openPrice`,
/// `open_price`). Unknown columns are ignored, missing ones stay `None`,
/// and cells that fail to type as a number or date become `None`.
pub fn parse_stock_table(text: &str) -> Result<StockTable, SourceError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = rdr.headers()?.clone();
    if headers.is_empty() {
        return Err(SourceError::MissingHeader);
    }
    let normalized: csv::StringRecord = headers.iter().map(snake_case).collect();

    let mut fields = Vec::new();
    for field in normalized.iter().filter_map(StockField::from_key) {
        if !fields.contains(&field) {
            fields.push(field);
        }
    }
    rdr.set_headers(normalized);

    let mut records = Vec::new();
    for row in rdr.deserialize::<RawStockRow>() {
        records.push(row?.into_record());
    }
    debug!(rows = records.len(), columns = fields.len(), "parsed typed stock rows");
    Ok(StockTable { fields, records })
}

pub fn parse_stock_records(text: &str) -> Result<Vec<StockRecord>, SourceError> {
    parse_stock_table(text).map(|table| table.records)
}

pub fn read_stock_table(provider: &dyn CsvProvider) -> Result<StockTable, SourceError> {
    parse_stock_table(&provider.read_text()?)
}

pub fn read_stock_records(provider: &dyn CsvProvider) -> Result<Vec<StockRecord>, SourceError> {
    read_stock_table(provider).map(|table| table.records)
}
