//! Cleaning and aggregation for a per-person city traffic accident dataset.
//!
//! The source table has one row per person involved in an accident. The
//! pipeline here:
//!
//! - **loads** the CSV into typed [`Record`]s ([`loader`]),
//! - **imputes** unassigned sex values from a population share ([`imputer`]),
//! - **filters** rows carrying more than one missing-value marker ([`filter`]),
//! - **deduplicates** person rows into one row per accident ([`dedup`]),
//! - **aggregates** grouped counts, a district x year matrix and
//!   descriptive statistics ([`aggregate`], [`reports`]).
//!
//! ```rust,ignore
//! use accident_report::{build_report, clean, load_dataset, PipelineConfig};
//!
//! let (dataset, _) = load_dataset("accidents.csv", b',')?;
//! let config = PipelineConfig::builder().seed(7).build()?;
//! let outcome = clean(dataset, &config, &mut config.rng())?;
//! let report = build_report(outcome.cleaned());
//! ```

pub mod aggregate;
pub mod config;
pub mod dedup;
pub mod error;
pub mod filter;
pub mod imputer;
pub mod loader;
pub mod output;
pub mod pipeline;
pub mod reports;
pub mod types;
pub mod util;

pub use aggregate::{count_by, cross_tab, describe, CrossTab, DescriptiveStats, GroupedCount};
pub use config::PipelineConfig;
pub use dedup::{unique_accidents, AccidentView};
pub use error::{ReportError, Result};
pub use filter::{FilterOutcome, RowFilter};
pub use imputer::{SexDistribution, SexImputer};
pub use loader::{load_dataset, load_from_reader, LoadReport};
pub use pipeline::{clean, CleaningOutcome, StageCounts};
pub use reports::{build_report, build_run_report, AccidentReport, RunReport};
pub use types::{Column, Dataset, Record, Sex, AGE_BRACKETS, SENTINEL, WEEKDAYS};
