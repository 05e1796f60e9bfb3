//! Domain records: typed stock rows, display rows, aggregated exchange rows.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::case::{camel_case, snake_case, start_case};

/// One (name, date) observation from the stock data resource.
///
/// Every field is optional: the typed parse keeps rows with blank or
/// malformed cells and leaves the gap for the mapper to render as `""`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StockRecord {
    pub name: Option<String>,
    pub market: Option<String>,
    pub date: Option<NaiveDate>,
    pub open_price: Option<f64>,
    pub close_price: Option<f64>,
    pub high_price: Option<f64>,
    pub low_price: Option<f64>,
    pub volume: Option<f64>,
}

/// Columns of the stock resource, in header order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockField {
    Name,
    Market,
    Date,
    OpenPrice,
    ClosePrice,
    HighPrice,
    LowPrice,
    Volume,
}

impl StockField {
    pub const ALL: [StockField; 8] = [
        StockField::Name,
        StockField::Market,
        StockField::Date,
        StockField::OpenPrice,
        StockField::ClosePrice,
        StockField::HighPrice,
        StockField::LowPrice,
        StockField::Volume,
    ];

    /// Header spelling in the CSV resource.
    pub fn as_str(self) -> &'static str {
        match self {
            StockField::Name => "name",
            StockField::Market => "market",
            StockField::Date => "date",
            StockField::OpenPrice => "open_price",
            StockField::ClosePrice => "close_price",
            StockField::HighPrice => "high_price",
            StockField::LowPrice => "low_price",
            StockField::Volume => "volume",
        }
    }

    /// Resolve a field from any casing: `closePrice`, `close_price`, `Close Price`.
    pub fn from_key(key: &str) -> Option<Self> {
        let snake = snake_case(key);
        Self::ALL.into_iter().find(|f| f.as_str() == snake)
    }

    /// Compare two records on this field. Absent values sort after present ones.
    pub fn compare(self, a: &StockRecord, b: &StockRecord) -> Ordering {
        match self {
            StockField::Name => cmp_option(&a.name, &b.name, |x, y| x.cmp(y)),
            StockField::Market => cmp_option(&a.market, &b.market, |x, y| x.cmp(y)),
            StockField::Date => cmp_option(&a.date, &b.date, |x, y| x.cmp(y)),
            StockField::OpenPrice => cmp_option(&a.open_price, &b.open_price, f64::total_cmp),
            StockField::ClosePrice => cmp_option(&a.close_price, &b.close_price, f64::total_cmp),
            StockField::HighPrice => cmp_option(&a.high_price, &b.high_price, f64::total_cmp),
            StockField::LowPrice => cmp_option(&a.low_price, &b.low_price, f64::total_cmp),
            StockField::Volume => cmp_option(&a.volume, &b.volume, f64::total_cmp),
        }
    }

    pub fn column(self) -> Column {
        Column::from_key(self.as_str())
    }
}

fn cmp_option<T>(a: &Option<T>, b: &Option<T>, cmp: impl Fn(&T, &T) -> Ordering) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => cmp(x, y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Stock row with every value rendered for display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayStockRecord {
    pub name: String,
    pub market: String,
    pub date: String,
    pub open_price: String,
    pub close_price: String,
    pub high_price: String,
    pub low_price: String,
    pub volume: String,
}

impl DisplayStockRecord {
    pub fn get(&self, field: StockField) -> &str {
        match field {
            StockField::Name => &self.name,
            StockField::Market => &self.market,
            StockField::Date => &self.date,
            StockField::OpenPrice => &self.open_price,
            StockField::ClosePrice => &self.close_price,
            StockField::HighPrice => &self.high_price,
            StockField::LowPrice => &self.low_price,
            StockField::Volume => &self.volume,
        }
    }
}

/// Daily exchange totals with a display date.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedRecord {
    pub date: String,
    pub total_rev: f64,
    pub total_vol: f64,
}

/// A record from either data source.
#[derive(Debug, Clone, PartialEq)]
pub enum DataRecord {
    Stock(StockRecord),
    Aggregated(AggregatedRecord),
}

/// Table column derived from a record key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub key: String,
    pub label: String,
}

impl Column {
    pub fn from_key(key: &str) -> Self {
        Self {
            key: camel_case(key),
            label: start_case(key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_fields_from_any_casing() {
        assert_eq!(StockField::from_key("closePrice"), Some(StockField::ClosePrice));
        assert_eq!(StockField::from_key("close_price"), Some(StockField::ClosePrice));
        assert_eq!(StockField::from_key("Close Price"), Some(StockField::ClosePrice));
        assert_eq!(StockField::from_key("volume"), Some(StockField::Volume));
        assert_eq!(StockField::from_key("dividend"), None);
    }

    #[test]
    fn absent_values_sort_last() {
        let present = StockRecord {
            volume: Some(1.0),
            ..Default::default()
        };
        let absent = StockRecord::default();
        assert_eq!(StockField::Volume.compare(&present, &absent), Ordering::Less);
        assert_eq!(StockField::Volume.compare(&absent, &absent), Ordering::Equal);
    }

    #[test]
    fn column_from_key() {
        assert_eq!(
            StockField::OpenPrice.column(),
            Column {
                key: "openPrice".into(),
                label: "Open Price".into()
            }
        );
    }
}
