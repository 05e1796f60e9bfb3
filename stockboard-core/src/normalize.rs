//! Record normalization: header/row pairs into keyed records.
//!
//! Headers are camel-cased and each cell is run through [`coerce_cell`], so
//! numeric columns sort numerically while free text stays untouched.

use std::fmt;

use crate::case::camel_case;

/// A single normalized cell.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl FieldValue {
    /// Re-apply the coercion policy. Numbers stay numbers; text is coerced
    /// again, which makes `coerce` idempotent.
    pub fn coerce(self) -> Self {
        match self {
            FieldValue::Number(n) => FieldValue::Number(n),
            FieldValue::Text(s) => coerce_cell(&s),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            FieldValue::Number(_) => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Number(n) => write!(f, "{n}"),
            FieldValue::Text(s) => f.write_str(s),
        }
    }
}

/// Parse a cell as a number when its whole trimmed content is one.
///
/// `"12.5"` and `" 7 "` become numbers. `"12abc"`, `""`, `"NaN"` and
/// `"inf"` are returned unchanged as text.
pub fn coerce_cell(cell: &str) -> FieldValue {
    parse_number(cell)
        .map(FieldValue::Number)
        .unwrap_or_else(|| FieldValue::Text(cell.to_string()))
}

/// Finite-number parse shared by the normalizer and the typed stock parse.
pub fn parse_number(cell: &str) -> Option<f64> {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return None;
    }
    // f64::from_str accepts "inf"/"nan" spellings; only plain numerals count.
    if !trimmed
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'))
    {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// One CSV row keyed by camel-cased header, header order preserved.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NormalizedRecord {
    fields: Vec<(String, FieldValue)>,
}

impl NormalizedRecord {
    pub fn from_fields(fields: Vec<(String, FieldValue)>) -> Self {
        Self { fields }
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn fields(&self) -> &[(String, FieldValue)] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Convert string rows (row 0 = header) into normalized records.
///
/// Returns `None` when there is no header row. Short rows are padded with
/// empty text; cells past the last header are dropped.
pub fn normalize_rows(rows: &[Vec<String>]) -> Option<Vec<NormalizedRecord>> {
    let (header, body) = rows.split_first()?;
    let keys: Vec<String> = header.iter().map(|h| camel_case(h)).collect();

    let records = body
        .iter()
        .map(|row| {
            let fields = keys
                .iter()
                .enumerate()
                .map(|(i, key)| {
                    let value = row
                        .get(i)
                        .map(|cell| coerce_cell(cell))
                        .unwrap_or_else(|| FieldValue::Text(String::new()));
                    (key.clone(), value)
                })
                .collect();
            NormalizedRecord { fields }
        })
        .collect();

    Some(records)
}
