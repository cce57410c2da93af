//! Configuration for the cleaning pipeline.
//!
//! Use [`PipelineConfig::builder()`] to override individual settings;
//! anything left unset takes the default.

use crate::error::{ReportError, Result};
use crate::filter::RowFilter;
use crate::imputer::{SexDistribution, SexImputer};
use crate::types::SENTINEL;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Marker text that flags a missing categorical value.
    pub sentinel: String,
    /// Rows with more sentinel-bearing fields than this are rejected.
    pub max_sentinels: usize,
    pub sex_distribution: SexDistribution,
    /// Seed for imputation draws. `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            sentinel: SENTINEL.to_string(),
            max_sentinels: 1,
            sex_distribution: SexDistribution::default(),
            seed: None,
        }
    }
}

impl PipelineConfig {
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    pub fn validate(&self) -> Result<()> {
        if self.row_filter().marker().is_empty() {
            return Err(ReportError::InvalidConfig(
                "sentinel marker must contain letters or digits".to_string(),
            ));
        }
        self.sex_distribution.validate()
    }

    pub fn row_filter(&self) -> RowFilter {
        RowFilter::new(&self.sentinel, self.max_sentinels)
    }

    pub fn imputer(&self) -> SexImputer {
        SexImputer::new(self.sex_distribution)
    }

    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    sentinel: Option<String>,
    max_sentinels: Option<usize>,
    sex_distribution: Option<SexDistribution>,
    seed: Option<u64>,
}

impl PipelineConfigBuilder {
    pub fn sentinel(mut self, sentinel: impl Into<String>) -> Self {
        self.sentinel = Some(sentinel.into());
        self
    }

    pub fn max_sentinels(mut self, max: usize) -> Self {
        self.max_sentinels = Some(max);
        self
    }

    pub fn sex_distribution(mut self, distribution: SexDistribution) -> Self {
        self.sex_distribution = Some(distribution);
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn build(self) -> Result<PipelineConfig> {
        let defaults = PipelineConfig::default();
        let config = PipelineConfig {
            sentinel: self.sentinel.unwrap_or(defaults.sentinel),
            max_sentinels: self.max_sentinels.unwrap_or(defaults.max_sentinels),
            sex_distribution: self.sex_distribution.unwrap_or(defaults.sex_distribution),
            seed: self.seed,
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn defaults() {
        let config = PipelineConfig::builder().build().unwrap();
        assert_eq!(config, PipelineConfig::default());
        assert_eq!(config.sentinel, "NO ASIGNADO");
        assert_eq!(config.max_sentinels, 1);
        assert_eq!(config.sex_distribution.male, 0.468);
        assert_eq!(config.row_filter(), RowFilter::default());
    }

    #[test]
    fn rejects_empty_sentinel() {
        let err = PipelineConfig::builder().sentinel("  ").build().unwrap_err();
        assert!(matches!(err, ReportError::InvalidConfig(_)));
        // Separators alone normalize to nothing and would match every field.
        let err = PipelineConfig::builder().sentinel(" _-_ ").build().unwrap_err();
        assert!(matches!(err, ReportError::InvalidConfig(_)));
    }

    #[test]
    fn rejects_broken_distribution() {
        let config = PipelineConfig {
            sex_distribution: SexDistribution { male: 0.9, female: 0.9 },
            ..PipelineConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ReportError::InvalidDistribution(_))
        ));
    }

    #[test]
    fn seeded_rng_is_reproducible() {
        let config = PipelineConfig::builder().seed(42).build().unwrap();
        let a: u64 = config.rng().gen();
        let b: u64 = config.rng().gen();
        assert_eq!(a, b);
    }
}
