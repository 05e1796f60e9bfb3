//! Display formatting for dates and numbers.
//!
//! Formatting never fails. Invalid numbers still render to a string
//! ("NaN", "∞"), and callers that want an empty cell instead go through
//! [`Formatter::format_optional_number`], which is the one place that
//! fallback lives.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Locale used for short dates and digit grouping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Locale {
    #[default]
    #[serde(rename = "en-US")]
    EnUs,
    #[serde(rename = "en-GB")]
    EnGb,
    #[serde(rename = "de-DE")]
    DeDe,
    #[serde(rename = "iso")]
    Iso,
}

impl Locale {
    fn short_date_pattern(self) -> &'static str {
        match self {
            Locale::EnUs => "%-m/%-d/%Y",
            Locale::EnGb => "%d/%m/%Y",
            Locale::DeDe => "%-d.%-m.%Y",
            Locale::Iso => "%Y-%m-%d",
        }
    }

    /// (group separator, decimal separator)
    fn separators(self) -> (char, char) {
        match self {
            Locale::DeDe => ('.', ','),
            _ => (',', '.'),
        }
    }

    fn currency_after_amount(self) -> bool {
        matches!(self, Locale::DeDe)
    }
}

impl std::str::FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "en-us" | "en" => Ok(Locale::EnUs),
            "en-gb" => Ok(Locale::EnGb),
            "de-de" | "de" => Ok(Locale::DeDe),
            "iso" => Ok(Locale::Iso),
            other => Err(format!("unsupported locale '{other}'")),
        }
    }
}

/// Parse the date spellings found in stock CSV exports.
///
/// Accepts `YYYY-MM-DD`, `YYYY/MM/DD`, US `M/D/YYYY`, RFC 3339 timestamps
/// and naive `YYYY-MM-DD[T ]HH:MM:SS` timestamps.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    for pattern in ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(value, pattern) {
            return Some(date);
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.date_naive());
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, pattern) {
            return Some(dt.date());
        }
    }
    None
}

/// Locale + currency bundle applied by the mappers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Formatter {
    locale: Locale,
    currency: String,
}

impl Default for Formatter {
    fn default() -> Self {
        Self::new(Locale::EnUs, "USD")
    }
}

impl Formatter {
    pub fn new(locale: Locale, currency: impl Into<String>) -> Self {
        Self {
            locale,
            currency: currency.into().to_ascii_uppercase(),
        }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Render a date-like string as the locale's short date.
    /// Unparsable input yields an empty string.
    pub fn format_date(&self, value: &str) -> String {
        parse_date(value)
            .map(|d| self.format_naive_date(d))
            .unwrap_or_default()
    }

    pub fn format_naive_date(&self, date: NaiveDate) -> String {
        date.format(self.locale.short_date_pattern()).to_string()
    }

    /// Render a number as a currency amount (`currency = true`) or as a plain
    /// grouped number with at most three fraction digits.
    pub fn format_number(&self, value: f64, currency: bool) -> String {
        if value.is_nan() {
            return "NaN".to_string();
        }
        if value.is_infinite() {
            return if value < 0.0 { "-∞".into() } else { "∞".into() };
        }

        if currency {
            let decimals = currency_minor_units(&self.currency);
            let amount = self.group_fixed(value.abs(), decimals, false);
            let symbol = currency_symbol(&self.currency);
            let sign = if value < 0.0 { "-" } else { "" };
            if self.locale.currency_after_amount() {
                format!("{sign}{amount}\u{a0}{symbol}")
            } else if symbol.len() == 3 && symbol.chars().all(|c| c.is_ascii_alphabetic()) {
                format!("{sign}{symbol}\u{a0}{amount}")
            } else {
                format!("{sign}{symbol}{amount}")
            }
        } else {
            let sign = if value < 0.0 { "-" } else { "" };
            format!("{sign}{}", self.group_fixed(value.abs(), 3, true))
        }
    }

    /// Number formatting with the empty-string fallback: `None` and NaN
    /// render as `""`.
    pub fn format_optional_number(&self, value: Option<f64>, currency: bool) -> String {
        match value {
            Some(v) if !v.is_nan() => self.format_number(v, currency),
            _ => String::new(),
        }
    }

    fn group_fixed(&self, value: f64, decimals: usize, trim_zeros: bool) -> String {
        let (group_sep, decimal_sep) = self.locale.separators();
        let fixed = format!("{value:.decimals$}");
        let (int_part, frac_part) = match fixed.split_once('.') {
            Some((i, f)) => (i, f),
            None => (fixed.as_str(), ""),
        };

        let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
        for (i, c) in int_part.chars().enumerate() {
            if i > 0 && (int_part.len() - i) % 3 == 0 {
                grouped.push(group_sep);
            }
            grouped.push(c);
        }

        let frac = if trim_zeros {
            frac_part.trim_end_matches('0')
        } else {
            frac_part
        };
        if !frac.is_empty() {
            grouped.push(decimal_sep);
            grouped.push_str(frac);
        }
        grouped
    }
}

fn currency_symbol(code: &str) -> &str {
    match code {
        "USD" => "$",
        "EUR" => "€",
        "GBP" => "£",
        "JPY" => "¥",
        "INR" => "₹",
        other => other,
    }
}

fn currency_minor_units(code: &str) -> usize {
    match code {
        "JPY" | "KRW" => 0,
        _ => 2,
    }
}
