//! Lenient number and memory-unit extraction shared by the format parsers
//!
//! None of these helpers fail: a missing or unreadable value is reported as
//! `None` and the caller decides on the default.

use regex::Regex;
use std::sync::LazyLock;

static LEADING_NUMBER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?(\d+(?:\.\d*)?|\.\d+)").expect("valid regex"));

static NUMBER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)?").expect("valid regex"));

static MEMORY_QUANTITY_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*(kb|mb|gb|k|m|g)?\b").expect("valid regex")
});

/// Unit suffix attached to a memory quantity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryUnit {
    Kilobytes,
    Megabytes,
    Gigabytes,
}

impl MemoryUnit {
    /// Parses a unit suffix such as "KB", "mb" or "G"
    pub fn parse(suffix: &str) -> Option<Self> {
        match suffix.to_ascii_uppercase().as_str() {
            "KB" | "K" => Some(Self::Kilobytes),
            "MB" | "M" => Some(Self::Megabytes),
            "GB" | "G" => Some(Self::Gigabytes),
            _ => None,
        }
    }

    /// Converts an amount in this unit to megabytes
    pub fn to_mb(self, amount: f64) -> f64 {
        match self {
            Self::Kilobytes => amount / 1024.0,
            Self::Megabytes => amount,
            Self::Gigabytes => amount * 1024.0,
        }
    }
}

/// Returns the first capture group of `pattern` in `text` as a number
///
/// When the captured text is a range such as `0.05..12.5`, the upper bound
/// is returned.
pub fn capture_number(text: &str, pattern: &Regex) -> Option<f64> {
    let captured = pattern.captures(text)?.get(1)?.as_str();
    match captured.split_once("..") {
        Some((_, upper)) if !upper.is_empty() => parse_leading_number(upper),
        _ => parse_leading_number(captured),
    }
}

/// Reads the number at the start of `text`, ignoring whatever follows
///
/// `"12.5ms"` yields `12.5`; `"abc"` yields `None`.
pub fn parse_leading_number(text: &str) -> Option<f64> {
    let m = LEADING_NUMBER_REGEX.find(text.trim())?;
    m.as_str().parse().ok()
}

/// Reads a row count, truncating fractional values
pub fn parse_count(text: &str) -> Option<u64> {
    parse_leading_number(text).and_then(as_count)
}

/// Converts a parsed number into a row count; negative or non-finite values are rejected
pub fn as_count(value: f64) -> Option<u64> {
    (value.is_finite() && value >= 0.0).then(|| value as u64)
}

/// Reads a timing cell, taking the maximum of a bracketed per-executor range
///
/// `"[0.12,8.40]"` yields `8.4`; `"3.5"` yields `3.5`.
pub fn parse_time_cell(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.starts_with('[') {
        return NUMBER_REGEX
            .find_iter(trimmed)
            .filter_map(|m| m.as_str().parse::<f64>().ok())
            .reduce(f64::max);
    }
    parse_leading_number(trimmed)
}

/// Parses a memory quantity and normalizes it to megabytes
///
/// GB are multiplied by 1024, KB divided by 1024, and a bare number is taken
/// to already be in MB.
pub fn parse_memory_mb(text: &str) -> Option<f64> {
    let caps = MEMORY_QUANTITY_REGEX.captures(text)?;
    let amount: f64 = caps.get(1)?.as_str().parse().ok()?;
    let unit = caps
        .get(2)
        .and_then(|m| MemoryUnit::parse(m.as_str()))
        .unwrap_or(MemoryUnit::Megabytes);
    Some(unit.to_mb(amount))
}

#[cfg(test)]
mod tests;
