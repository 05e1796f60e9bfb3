//! Per-source ordering: sort key and direction, name filter, page.

use serde::{Deserialize, Serialize};
use std::ops::Range;

use crate::case::{camel_case, snake_case};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn flipped(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// Sort/filter/page settings for one data source.
///
/// `key` is stored snake_cased, matching the resource's header spelling.
/// `page` is 1-indexed and never 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceOrdering {
    pub key: String,
    pub order: SortOrder,
    pub filter_name: Option<String>,
    pub page: u32,
}

impl Default for SourceOrdering {
    fn default() -> Self {
        Self {
            key: "date".into(),
            order: SortOrder::Asc,
            filter_name: None,
            page: 1,
        }
    }
}

impl SourceOrdering {
    /// Column-header click: a new key sorts ascending, the current key
    /// flips direction.
    pub fn toggle_sort(&mut self, key: &str) {
        let key = snake_case(key);
        self.order = if self.key != key || self.order == SortOrder::Desc {
            SortOrder::Asc
        } else {
            SortOrder::Desc
        };
        self.key = key;
    }

    pub fn sorting(&self) -> Sorting {
        Sorting {
            key: camel_case(&self.key),
            order: self.order,
        }
    }
}

/// Sort state as exposed to the presentation layer (camelCase key).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sorting {
    pub key: String,
    pub order: SortOrder,
}

/// Row window for a 1-indexed page.
///
/// Page 1 covers `[0, page_size)`. Later pages start one row past the
/// previous page's end: page `p` covers `[(p-1)*page_size + 1, p*page_size)`,
/// so row `(p-1)*page_size` is never shown. Pinned by tests.
///
/// Bounds saturate at `usize::MAX`; [`clamp_window`] brings them back
/// within the loaded rows.
pub fn page_window(page: u32, page_size: usize) -> Range<usize> {
    let page = page as usize;
    let start = if page > 1 {
        (page - 1).saturating_mul(page_size).saturating_add(1)
    } else {
        0
    };
    let end = page.saturating_mul(page_size);
    start..end.max(start)
}

/// Clamp a window to `len` rows.
pub fn clamp_window(window: Range<usize>, len: usize) -> Range<usize> {
    let start = window.start.min(len);
    let end = window.end.min(len);
    start..end
}
