//! CSV serialization of stored records.
//!
//! Stock rows are written back in the resource's own column layout, so an
//! exported file can be fed straight into the stock parser again.
//! Aggregated rows use `date,total_rev,total_vol`.

use std::path::Path;

use anyhow::{bail, Context, Result};
use tracing::info;

use crate::domain::{AggregatedRecord, DataRecord, StockField, StockRecord};

const AGGREGATED_HEADER: [&str; 3] = ["date", "total_rev", "total_vol"];

fn opt_number(v: Option<f64>) -> String {
    v.map(|n| n.to_string()).unwrap_or_default()
}

fn stock_row(r: &StockRecord) -> [String; 8] {
    [
        r.name.clone().unwrap_or_default(),
        r.market.clone().unwrap_or_default(),
        r.date.map(|d| d.to_string()).unwrap_or_default(),
        opt_number(r.open_price),
        opt_number(r.close_price),
        opt_number(r.high_price),
        opt_number(r.low_price),
        opt_number(r.volume),
    ]
}

fn aggregated_row(r: &AggregatedRecord) -> [String; 3] {
    [r.date.clone(), r.total_rev.to_string(), r.total_vol.to_string()]
}

/// Serialize records to CSV text. All records must come from the same
/// source; an empty slice yields an empty string.
pub fn to_csv(records: &[DataRecord]) -> Result<String> {
    let Some(first) = records.first() else {
        return Ok(String::new());
    };

    let mut wtr = csv::Writer::from_writer(vec![]);
    match first {
        DataRecord::Stock(_) => {
            wtr.write_record(StockField::ALL.iter().map(|f| f.as_str()))?;
        }
        DataRecord::Aggregated(_) => {
            wtr.write_record(AGGREGATED_HEADER)?;
        }
    }

    for (i, record) in records.iter().enumerate() {
        match (first, record) {
            (DataRecord::Stock(_), DataRecord::Stock(r)) => wtr.write_record(stock_row(r))?,
            (DataRecord::Aggregated(_), DataRecord::Aggregated(r)) => {
                wtr.write_record(aggregated_row(r))?
            }
            _ => bail!("record {i} does not match the first record's source"),
        }
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Write records as CSV to `path`, creating parent directories.
pub fn download_csv(records: &[DataRecord], path: &Path) -> Result<()> {
    let csv = to_csv(records)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(path, csv).with_context(|| format!("failed to write {}", path.display()))?;
    info!(path = %path.display(), rows = records.len(), "exported CSV");
    Ok(())
}
