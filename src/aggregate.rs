//! Grouped counts, cross tabulations and descriptive statistics.
//!
//! Results are plain ordered tables so a presentation layer can consume them
//! directly. Key order is deterministic:
//! - columns with a fixed domain (age bracket, weekday) list every domain
//!   label in domain order, zero counts included, followed by any
//!   out-of-domain values alphabetically;
//! - year keys sort numerically;
//! - every other column sorts lexically. Use [`GroupedCount::ranked`] for
//!   count-descending order.

use crate::types::{Column, CountRow, Record, StatsRow};
use crate::util::{average, format_int, format_number, quantile_sorted, sample_std};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupCount {
    pub key: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupedCount {
    pub column: Column,
    pub groups: Vec<GroupCount>,
}

impl GroupedCount {
    pub fn get(&self, key: &str) -> Option<usize> {
        self.groups.iter().find(|g| g.key == key).map(|g| g.count)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|g| g.key.as_str())
    }

    /// Sum of all group counts; equals the number of rows grouped.
    pub fn total(&self) -> usize {
        self.groups.iter().map(|g| g.count).sum()
    }

    /// Same groups ordered by count, largest first. Ties keep key order.
    pub fn ranked(&self) -> GroupedCount {
        let mut groups = self.groups.clone();
        groups.sort_by(|a, b| b.count.cmp(&a.count));
        GroupedCount {
            column: self.column,
            groups,
        }
    }

    /// Statistics over the group counts treated as one numeric series.
    pub fn describe(&self) -> Option<DescriptiveStats> {
        let values: Vec<f64> = self.groups.iter().map(|g| g.count as f64).collect();
        describe(&values)
    }

    pub fn rows(&self) -> Vec<CountRow> {
        self.groups
            .iter()
            .map(|g| CountRow {
                key: g.key.clone(),
                count: format_int(g.count),
            })
            .collect()
    }
}

/// Count rows per distinct value of `column`.
pub fn count_by<'a, I>(records: I, column: Column) -> GroupedCount
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut counts: HashMap<String, usize> = HashMap::new();
    if let Some(domain) = column.domain() {
        for label in domain {
            counts.insert((*label).to_string(), 0);
        }
    }
    for r in records {
        *counts.entry(r.field(column).into_owned()).or_default() += 1;
    }

    let mut groups: Vec<GroupCount> = counts
        .into_iter()
        .map(|(key, count)| GroupCount { key, count })
        .collect();
    groups.sort_by(|a, b| compare_keys(column, &a.key, &b.key));
    GroupedCount { column, groups }
}

fn compare_keys(column: Column, a: &str, b: &str) -> Ordering {
    match (column.domain_position(a), column.domain_position(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) if column == Column::Year => {
            match (a.parse::<i64>(), b.parse::<i64>()) {
                (Ok(x), Ok(y)) => x.cmp(&y),
                _ => a.cmp(b),
            }
        }
        (None, None) => a.cmp(b),
    }
}

fn sorted_keys(column: Column, keys: impl Iterator<Item = String>) -> Vec<String> {
    let mut keys: Vec<String> = keys.collect();
    keys.sort_by(|a, b| compare_keys(column, a, b));
    keys.dedup();
    keys
}

/// Count matrix of `row_column` x `col_column`. Every observed row key
/// appears against every observed column key; missing combinations are 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrossTab {
    pub row_column: Column,
    pub col_column: Column,
    pub row_keys: Vec<String>,
    pub col_keys: Vec<String>,
    /// `counts[row][col]`
    pub counts: Vec<Vec<usize>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyedStats {
    pub key: String,
    pub stats: DescriptiveStats,
}

impl CrossTab {
    pub fn get(&self, row: &str, col: &str) -> usize {
        let r = self.row_keys.iter().position(|k| k == row);
        let c = self.col_keys.iter().position(|k| k == col);
        match (r, c) {
            (Some(r), Some(c)) => self.counts[r][c],
            _ => 0,
        }
    }

    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    pub fn column_values(&self, col: usize) -> Vec<f64> {
        self.counts.iter().map(|row| row[col] as f64).collect()
    }

    /// Per-row sums as a grouped count keyed by the row column.
    pub fn row_totals(&self) -> GroupedCount {
        GroupedCount {
            column: self.row_column,
            groups: self
                .row_keys
                .iter()
                .zip(&self.counts)
                .map(|(key, row)| GroupCount {
                    key: key.clone(),
                    count: row.iter().sum(),
                })
                .collect(),
        }
    }

    /// Descriptive statistics of each matrix column, zero cells included.
    pub fn describe_columns(&self) -> Vec<KeyedStats> {
        self.col_keys
            .iter()
            .enumerate()
            .filter_map(|(i, key)| {
                describe(&self.column_values(i)).map(|stats| KeyedStats {
                    key: key.clone(),
                    stats,
                })
            })
            .collect()
    }
}

pub fn cross_tab<'a, I>(records: I, row_column: Column, col_column: Column) -> CrossTab
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut cells: HashMap<(String, String), usize> = HashMap::new();
    for r in records {
        let key = (
            r.field(row_column).into_owned(),
            r.field(col_column).into_owned(),
        );
        *cells.entry(key).or_default() += 1;
    }

    let row_keys = sorted_keys(row_column, cells.keys().map(|(r, _)| r.clone()));
    let col_keys = sorted_keys(col_column, cells.keys().map(|(_, c)| c.clone()));
    let row_index: HashMap<&str, usize> =
        row_keys.iter().enumerate().map(|(i, k)| (k.as_str(), i)).collect();
    let col_index: HashMap<&str, usize> =
        col_keys.iter().enumerate().map(|(i, k)| (k.as_str(), i)).collect();

    let mut counts = vec![vec![0usize; col_keys.len()]; row_keys.len()];
    for ((r, c), n) in &cells {
        counts[row_index[r.as_str()]][col_index[c.as_str()]] = *n;
    }

    CrossTab {
        row_column,
        col_column,
        row_keys,
        col_keys,
        counts,
    }
}

/// count / mean / std / min / 25% / 50% / 75% / max of a numeric series.
///
/// `std` is the sample standard deviation (n - 1) and is `None` below two
/// values. Quantiles interpolate linearly at position `(n - 1) * q`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DescriptiveStats {
    pub count: usize,
    pub mean: f64,
    pub std: Option<f64>,
    pub min: f64,
    #[serde(rename = "25%")]
    pub q25: f64,
    #[serde(rename = "50%")]
    pub q50: f64,
    #[serde(rename = "75%")]
    pub q75: f64,
    pub max: f64,
}

impl DescriptiveStats {
    pub fn to_row(&self, series: &str) -> StatsRow {
        StatsRow {
            series: series.to_string(),
            count: format_int(self.count),
            mean: format_number(self.mean, 2),
            std: self
                .std
                .map(|s| format_number(s, 2))
                .unwrap_or_else(|| "NaN".to_string()),
            min: format_number(self.min, 2),
            q25: format_number(self.q25, 2),
            q50: format_number(self.q50, 2),
            q75: format_number(self.q75, 2),
            max: format_number(self.max, 2),
        }
    }
}

/// Returns `None` for an empty series.
pub fn describe(values: &[f64]) -> Option<DescriptiveStats> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    Some(DescriptiveStats {
        count: sorted.len(),
        mean: average(&sorted),
        std: sample_std(&sorted),
        min: sorted[0],
        q25: quantile_sorted(&sorted, 0.25),
        q50: quantile_sorted(&sorted, 0.5),
        q75: quantile_sorted(&sorted, 0.75),
        max: sorted[sorted.len() - 1],
    })
}
