// Utility helpers for parsing and basic statistics.
//
// This module centralizes the "dirty" CSV text handling so the rest of the
// code can assume clean, typed values.
use crate::types::Sex;
use chrono::{NaiveDate, NaiveDateTime};
use num_format::{Locale, ToFormattedString};

pub fn parse_i32_safe(s: Option<&str>) -> Option<i32> {
    // `?` propagates `None` early if the option is missing.
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<i32>().ok()
}

/// Parse a date cell, returning `None` for anything unrecognised.
///
/// Accepted shapes: `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS` and `DD/MM/YYYY`.
pub fn parse_date_safe(s: Option<&str>) -> Option<NaiveDate> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|dt| dt.date()))
        .or_else(|_| NaiveDate::parse_from_str(s, "%d/%m/%Y"))
        .ok()
}

/// Map a sex label onto [`Sex`]. A missing or empty cell is unassigned;
/// an unrecognised label is `None` so the caller can reject the row.
pub fn parse_sex(s: Option<&str>) -> Option<Sex> {
    let s = match s {
        Some(s) => s.trim().to_uppercase(),
        None => return Some(Sex::Unassigned),
    };
    match s.as_str() {
        "HOMBRE" | "MALE" => Some(Sex::Male),
        "MUJER" | "FEMALE" => Some(Sex::Female),
        "" | "NO ASIGNADO" | "UNASSIGNED" | "DESCONOCIDO" => Some(Sex::Unassigned),
        _ => None,
    }
}

/// Trimmed owned copy of an optional text cell; absent cells become empty.
pub fn clean_text(s: Option<String>) -> String {
    s.map(|v| v.trim().to_string()).unwrap_or_default()
}

pub fn average(v: &[f64]) -> f64 {
    // Standard arithmetic mean; returns 0 for an empty slice to avoid NaNs.
    if v.is_empty() {
        return 0.0;
    }
    let sum: f64 = v.iter().copied().sum();
    sum / v.len() as f64
}

/// Sample standard deviation (n - 1 denominator). `None` below two values.
pub fn sample_std(v: &[f64]) -> Option<f64> {
    if v.len() < 2 {
        return None;
    }
    let mean = average(v);
    let ss: f64 = v.iter().map(|x| (x - mean).powi(2)).sum();
    Some((ss / (v.len() - 1) as f64).sqrt())
}

/// Quantile of an already sorted slice, interpolating linearly between
/// the two closest ranks at position `(n - 1) * q`.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let pos = (sorted.len() - 1) as f64 * q.clamp(0.0, 1.0);
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimal places with locale-aware thousands separators
    // (e.g., `1,234,567.89`).
    if !n.is_finite() {
        return "NaN".to_string();
    }
    let neg = n.is_sign_negative() && n != 0.0;
    let s = format!("{:.*}", decimals, n.abs());
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        res.push('.');
        res.push_str(frac);
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    // Thin wrapper around `num-format` for counts in console output
    // (e.g., `9,855 rows loaded`).
    n.to_formatted_string(&Locale::en)
}
