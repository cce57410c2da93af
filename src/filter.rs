//! Multi-sentinel row rejection.
//!
//! A row survives when at most `max_sentinels` of its categorical fields
//! contain the missing-value marker. Both the marker and each field's text
//! form are normalized before a substring check: letters are upper-cased
//! and every run of non-alphanumeric characters becomes one space. So
//! `no asignado`, `NO_ASIGNADO`, `NO  ASIGNADO` and `x NO ASIGNADO x` all
//! count as the marker.

use crate::types::{Column, Dataset, Record, SENTINEL};
use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowFilter {
    marker: String,
    max_sentinels: usize,
}

impl Default for RowFilter {
    fn default() -> Self {
        Self::new(SENTINEL, 1)
    }
}

impl RowFilter {
    pub fn new(marker: &str, max_sentinels: usize) -> Self {
        Self {
            marker: normalize(marker),
            max_sentinels,
        }
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    pub fn max_sentinels(&self) -> usize {
        self.max_sentinels
    }

    /// Number of the given columns whose value carries the marker.
    pub fn sentinel_count<I>(&self, record: &Record, columns: I) -> usize
    where
        I: IntoIterator<Item = Column>,
    {
        columns
            .into_iter()
            .filter(|c| normalize(&record.field(*c)).contains(&self.marker))
            .count()
    }

    /// Split `original` into kept and rejected rows. Only categorical columns
    /// the input actually carried are inspected.
    pub fn apply(&self, original: Dataset) -> FilterOutcome {
        let columns: Vec<Column> = original.categorical_columns().collect();
        let (kept, rejected): (Vec<Record>, Vec<Record>) = original
            .records
            .iter()
            .cloned()
            .partition(|r| self.sentinel_count(r, columns.iter().copied()) <= self.max_sentinels);

        let outcome = FilterOutcome {
            kept: original.with_records(kept),
            rejected: original.with_records(rejected),
            original,
        };
        info!(
            "Row filter: {} original, {} kept, {} rejected (more than {} '{}' fields)",
            outcome.original.len(),
            outcome.kept.len(),
            outcome.rejected.len(),
            self.max_sentinels,
            self.marker
        );
        outcome
    }
}

fn normalize(text: &str) -> String {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(|word| word.to_uppercase())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Result of one filter pass. `kept` and `rejected` partition `original`.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterOutcome {
    pub original: Dataset,
    pub kept: Dataset,
    pub rejected: Dataset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FilterCounts {
    pub original: usize,
    pub kept: usize,
    pub rejected: usize,
}

impl FilterOutcome {
    pub fn counts(&self) -> FilterCounts {
        FilterCounts {
            original: self.original.len(),
            kept: self.kept.len(),
            rejected: self.rejected.len(),
        }
    }
}
