//! Mappers from stored rows to display-ready records.
//!
//! Both mappers are total and one-to-one: output order and length always
//! match the input, and a missing or invalid value becomes a default
//! (`""` for display strings, `0` for aggregated totals).

use crate::domain::{AggregatedRecord, DisplayStockRecord, StockRecord};
use crate::format::Formatter;
use crate::normalize::{FieldValue, NormalizedRecord};

pub fn map_stock_record(record: &StockRecord, fmt: &Formatter) -> DisplayStockRecord {
    DisplayStockRecord {
        name: record.name.clone().unwrap_or_default(),
        market: record.market.clone().unwrap_or_default(),
        date: record
            .date
            .map(|d| fmt.format_naive_date(d))
            .unwrap_or_default(),
        open_price: fmt.format_optional_number(record.open_price, true),
        close_price: fmt.format_optional_number(record.close_price, true),
        high_price: fmt.format_optional_number(record.high_price, true),
        low_price: fmt.format_optional_number(record.low_price, true),
        volume: fmt.format_optional_number(record.volume, false),
    }
}

pub fn map_stock_data(records: &[StockRecord], fmt: &Formatter) -> Vec<DisplayStockRecord> {
    records.iter().map(|r| map_stock_record(r, fmt)).collect()
}

/// Numeric total from a normalized cell; absent, empty or non-numeric is 0.
pub fn total_or_zero(value: Option<&FieldValue>) -> f64 {
    match value {
        Some(FieldValue::Number(n)) => *n,
        Some(FieldValue::Text(s)) => crate::normalize::parse_number(s).unwrap_or(0.0),
        None => 0.0,
    }
}

pub fn map_aggregated_record(record: &NormalizedRecord, fmt: &Formatter) -> AggregatedRecord {
    let date = match record.get("date") {
        Some(FieldValue::Text(s)) => fmt.format_date(s),
        // A bare number in the date column (e.g. 20210104) is not a date.
        Some(FieldValue::Number(_)) | None => String::new(),
    };
    AggregatedRecord {
        date,
        total_rev: total_or_zero(record.get("totalRev")),
        total_vol: total_or_zero(record.get("totalVol")),
    }
}

pub fn map_aggregated_data(records: &[NormalizedRecord], fmt: &Formatter) -> Vec<AggregatedRecord> {
    records.iter().map(|r| map_aggregated_record(r, fmt)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn maps_full_stock_record() {
        let record = StockRecord {
            name: Some("AAA".into()),
            market: Some("NYSE".into()),
            date: NaiveDate::from_ymd_opt(2021, 1, 5),
            open_price: Some(10.0),
            close_price: Some(12.0),
            high_price: Some(12.5),
            low_price: Some(9.75),
            volume: Some(1_250_000.0),
        };

        let display = map_stock_record(&record, &Formatter::default());

        assert_eq!(
            display,
            DisplayStockRecord {
                name: "AAA".into(),
                market: "NYSE".into(),
                date: "1/5/2021".into(),
                open_price: "$10.00".into(),
                close_price: "$12.00".into(),
                high_price: "$12.50".into(),
                low_price: "$9.75".into(),
                volume: "1,250,000".into(),
            }
        );
    }

    #[test]
    fn absent_fields_become_empty_strings() {
        let display = map_stock_record(&StockRecord::default(), &Formatter::default());
        assert_eq!(display, DisplayStockRecord::default());
    }

    #[test]
    fn stock_mapping_preserves_order_and_length() {
        let records: Vec<StockRecord> = ["C", "A", "B"]
            .iter()
            .map(|n| StockRecord {
                name: Some(n.to_string()),
                ..Default::default()
            })
            .collect();
        let names: Vec<String> = map_stock_data(&records, &Formatter::default())
            .into_iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(names, vec!["C", "A", "B"]);
    }

    #[test]
    fn maps_aggregated_rows_with_defaults() {
        let full = NormalizedRecord::from_fields(vec![
            ("date".into(), FieldValue::Text("2021-01-04".into())),
            ("totalRev".into(), FieldValue::Number(1500.5)),
            ("totalVol".into(), FieldValue::Number(300.0)),
        ]);
        let sparse = NormalizedRecord::from_fields(vec![
            ("date".into(), FieldValue::Text("garbage".into())),
            ("totalRev".into(), FieldValue::Text(String::new())),
        ]);

        let mapped = map_aggregated_data(&[full, sparse], &Formatter::default());

        assert_eq!(
            mapped[0],
            AggregatedRecord {
                date: "1/4/2021".into(),
                total_rev: 1500.5,
                total_vol: 300.0,
            }
        );
        assert_eq!(
            mapped[1],
            AggregatedRecord {
                date: String::new(),
                total_rev: 0.0,
                total_vol: 0.0,
            }
        );
    }
}
