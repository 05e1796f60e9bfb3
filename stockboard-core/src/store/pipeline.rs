//! The stock fetch pipeline: filter → sort → page window.

use tracing::debug;

use super::ordering::{clamp_window, page_window, SortOrder, SourceOrdering};
use crate::domain::{StockField, StockRecord};

/// Keep rows matching the name filter. Without a filter, rows with no name
/// are dropped (blank trailing lines, partial rows).
pub fn filter_by_name(records: Vec<StockRecord>, filter_name: Option<&str>) -> Vec<StockRecord> {
    records
        .into_iter()
        .filter(|r| match filter_name {
            Some(wanted) => r.name.as_deref() == Some(wanted),
            None => r.name.as_deref().is_some_and(|n| !n.is_empty()),
        })
        .collect()
}

/// Stable sort on `key`. Unknown keys leave the order untouched.
pub fn sort_records(records: &mut [StockRecord], key: &str, order: SortOrder) {
    let Some(field) = StockField::from_key(key) else {
        debug!(key, "unknown sort key, keeping input order");
        return;
    };
    match order {
        SortOrder::Asc => records.sort_by(|a, b| field.compare(a, b)),
        SortOrder::Desc => records.sort_by(|a, b| field.compare(b, a)),
    }
}

/// Run the full pipeline and return the rows for the current page.
pub fn select_stock_page(
    records: Vec<StockRecord>,
    ordering: &SourceOrdering,
    page_size: usize,
) -> Vec<StockRecord> {
    let total = records.len();
    let mut rows = filter_by_name(records, ordering.filter_name.as_deref());
    let matched = rows.len();

    sort_records(&mut rows, &ordering.key, ordering.order);

    let window = clamp_window(page_window(ordering.page, page_size), rows.len());
    debug!(
        total,
        matched,
        page = ordering.page,
        start = window.start,
        end = window.end,
        "selected stock page"
    );
    rows.drain(window).collect()
}
