//! Dashboard configuration, stored as TOML.
//!
//! ```toml
//! [sources]
//! stock_data = "data/stock_data.csv"
//! aggregated = "https://example.com/aggregated_stock_exchange.csv"
//!
//! [display]
//! locale = "en-US"
//! currency = "USD"
//!
//! [paging]
//! page_size = 100
//! ```
//!
//! Every section and key is optional; omitted values take the defaults below.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::format::{Formatter, Locale};
use crate::source::CsvSource;

pub const DEFAULT_PAGE_SIZE: usize = 100;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    /// Path or URL of the stock data CSV.
    pub stock_data: String,
    /// Path or URL of the aggregated stock exchange CSV.
    pub aggregated: String,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            stock_data: "stock_data.csv".into(),
            aggregated: "aggregated_stock_exchange.csv".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub locale: Locale,
    /// ISO 4217 code used for price columns.
    pub currency: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            locale: Locale::EnUs,
            currency: "USD".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PagingConfig {
    pub page_size: usize,
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub sources: SourcesConfig,
    pub display: DisplayConfig,
    pub paging: PagingConfig,
}

impl DashboardConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.paging.page_size == 0 {
            return Err(ConfigError::Invalid("paging.page_size must be at least 1".into()));
        }
        let code = &self.display.currency;
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ConfigError::Invalid(format!(
                "display.currency must be a three-letter code, got '{code}'"
            )));
        }
        Ok(())
    }

    pub fn formatter(&self) -> Formatter {
        Formatter::new(self.display.locale, self.display.currency.clone())
    }

    pub fn stock_source(&self) -> CsvSource {
        CsvSource::parse(&self.sources.stock_data)
    }

    pub fn aggregated_source(&self) -> CsvSource {
        CsvSource::parse(&self.sources.aggregated)
    }
}
