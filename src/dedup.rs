//! Accident-level view over person-level rows.
//!
//! The source data has one row per person involved, so several rows can
//! describe the same accident. Rows sharing `(date, time_range, district)`
//! collapse onto the first one encountered.

use crate::types::{AccidentKey, Record};
use std::collections::HashSet;
use tracing::info;

/// One borrowed representative row per distinct accident key, in first-seen order.
#[derive(Debug, Clone)]
pub struct AccidentView<'a> {
    accidents: Vec<&'a Record>,
    input_rows: usize,
}

impl<'a> AccidentView<'a> {
    pub fn accidents(&self) -> &[&'a Record] {
        &self.accidents
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Record> + '_ {
        self.accidents.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.accidents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accidents.is_empty()
    }

    pub fn input_rows(&self) -> usize {
        self.input_rows
    }

    /// Rows dropped because an earlier row had the same key.
    pub fn duplicates_removed(&self) -> usize {
        self.input_rows - self.accidents.len()
    }
}

pub fn unique_accidents(records: &[Record]) -> AccidentView<'_> {
    let mut seen: HashSet<AccidentKey<'_>> = HashSet::with_capacity(records.len());
    let mut accidents: Vec<&Record> = Vec::new();
    for r in records {
        if seen.insert(r.accident_key()) {
            accidents.push(r);
        }
    }

    let view = AccidentView {
        accidents,
        input_rows: records.len(),
    };
    info!(
        "Deduplicated {} person rows into {} accidents",
        view.input_rows,
        view.len()
    );
    view
}
