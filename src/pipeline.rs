//! Imputation followed by row filtering, with the counts of each stage.

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::filter::{FilterCounts, FilterOutcome};
use crate::imputer::ImputeReport;
use crate::types::Dataset;
use rand::Rng;
use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, PartialEq)]
pub struct CleaningOutcome {
    pub impute: ImputeReport,
    pub filter: FilterOutcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StageCounts {
    pub imputed: usize,
    #[serde(flatten)]
    pub filter: FilterCounts,
}

impl CleaningOutcome {
    /// Rows that passed the filter; the table written back to disk.
    pub fn cleaned(&self) -> &Dataset {
        &self.filter.kept
    }

    pub fn counts(&self) -> StageCounts {
        StageCounts {
            imputed: self.impute.imputed,
            filter: self.filter.counts(),
        }
    }
}

/// Impute unassigned sex values, then drop rows with too many sentinels.
///
/// Imputation runs first so a row whose only gap was its sex is never
/// rejected for it.
pub fn clean<R: Rng + ?Sized>(
    mut dataset: Dataset,
    config: &PipelineConfig,
    rng: &mut R,
) -> Result<CleaningOutcome> {
    config.validate()?;
    let impute = config.imputer().impute(&mut dataset, rng)?;
    let filter = config.row_filter().apply(dataset);

    let outcome = CleaningOutcome { impute, filter };
    let counts = outcome.counts();
    info!(
        "Cleaning done: {} imputed, {} kept, {} rejected of {}",
        counts.imputed, counts.filter.kept, counts.filter.rejected, counts.filter.original
    );
    Ok(outcome)
}
