//! Proportional imputation of unassigned sex values.
//!
//! Every unassigned row draws independently from a fixed population share,
//! so the random source is passed in by the caller and can be seeded.

use crate::error::{ReportError, Result};
use crate::types::{Column, Dataset, Sex};
use rand::distributions::{Bernoulli, Distribution};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Population shares used to resolve unassigned sex values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SexDistribution {
    pub male: f64,
    pub female: f64,
}

impl Default for SexDistribution {
    /// City census shares: 46.8% male, 53.2% female.
    fn default() -> Self {
        Self {
            male: 0.468,
            female: 0.532,
        }
    }
}

impl SexDistribution {
    pub fn new(male: f64, female: f64) -> Result<Self> {
        let dist = Self { male, female };
        dist.validate()?;
        Ok(dist)
    }

    /// Build from the male share alone; the female share is the complement.
    pub fn from_male_share(male: f64) -> Result<Self> {
        Self::new(male, 1.0 - male)
    }

    pub fn validate(&self) -> Result<()> {
        for (label, p) in [("male", self.male), ("female", self.female)] {
            if !p.is_finite() || !(0.0..=1.0).contains(&p) {
                return Err(ReportError::InvalidDistribution(format!(
                    "{label} share {p} is outside [0, 1]"
                )));
            }
        }
        let total = self.male + self.female;
        if (total - 1.0).abs() > 1e-9 {
            return Err(ReportError::InvalidDistribution(format!(
                "shares sum to {total}, expected 1"
            )));
        }
        Ok(())
    }

    fn sampler(&self) -> Result<Bernoulli> {
        self.validate()?;
        Bernoulli::new(self.male).map_err(|e| ReportError::InvalidDistribution(e.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImputeReport {
    /// False when the input had no sex column at all.
    pub attempted: bool,
    pub imputed: usize,
}

#[derive(Debug, Clone, Default)]
pub struct SexImputer {
    distribution: SexDistribution,
}

impl SexImputer {
    pub fn new(distribution: SexDistribution) -> Self {
        Self { distribution }
    }

    pub fn distribution(&self) -> &SexDistribution {
        &self.distribution
    }

    /// Resolve every unassigned sex value in place. Only the sex field of
    /// affected rows changes; row order and all other fields are untouched.
    pub fn impute<R: Rng + ?Sized>(
        &self,
        dataset: &mut Dataset,
        rng: &mut R,
    ) -> Result<ImputeReport> {
        if !dataset.has_column(Column::Sex) {
            debug!("No {} column; skipping sex imputation", Column::Sex);
            return Ok(ImputeReport {
                attempted: false,
                imputed: 0,
            });
        }

        let sampler = self.distribution.sampler()?;
        let mut imputed = 0usize;
        for record in dataset.records.iter_mut().filter(|r| r.sex == Sex::Unassigned) {
            record.sex = if sampler.sample(rng) {
                Sex::Male
            } else {
                Sex::Female
            };
            imputed += 1;
        }

        info!("Imputed {} unassigned {} values", imputed, Column::Sex);
        Ok(ImputeReport {
            attempted: true,
            imputed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Record;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn record(sex: Sex) -> Record {
        Record {
            date: None,
            year: 2024,
            time_range: "06-07".into(),
            age_bracket: "26-30".into(),
            sex,
            person_type: "Conductor".into(),
            district: "CENTRO".into(),
            accident_type: "Colisión".into(),
            severity: "Leve".into(),
            vehicle_type: "Turismo".into(),
            month: "ENERO".into(),
            weekday: "Monday".into(),
        }
    }

    fn dataset_of(n: usize) -> Dataset {
        Dataset::new(
            Column::ALL.to_vec(),
            (0..n).map(|_| record(Sex::Unassigned)).collect(),
        )
    }

    #[test]
    fn male_share_converges_to_distribution() {
        let imputer = SexImputer::default();
        for n in [2_000usize, 50_000] {
            let mut dataset = dataset_of(n);
            let mut rng = StdRng::seed_from_u64(2024);
            let report = imputer.impute(&mut dataset, &mut rng).unwrap();
            assert_eq!(report.imputed, n);

            let males = dataset.records.iter().filter(|r| r.sex == Sex::Male).count();
            let share = males as f64 / n as f64;
            let tolerance = 5.0 * (0.468 * 0.532 / n as f64).sqrt();
            assert!(
                (share - 0.468).abs() < tolerance,
                "share {share} outside 0.468 ± {tolerance} for n = {n}"
            );
            assert!(dataset.records.iter().all(|r| r.sex != Sex::Unassigned));
        }
    }

    #[test]
    fn same_seed_same_draws() {
        let imputer = SexImputer::default();
        let mut a = dataset_of(200);
        let mut b = dataset_of(200);
        imputer.impute(&mut a, &mut StdRng::seed_from_u64(9)).unwrap();
        imputer.impute(&mut b, &mut StdRng::seed_from_u64(9)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn only_unassigned_rows_change() {
        let mut dataset = Dataset::new(
            Column::ALL.to_vec(),
            vec![record(Sex::Male), record(Sex::Unassigned), record(Sex::Female)],
        );
        let before = dataset.clone();
        let imputer = SexImputer::new(SexDistribution::new(0.0, 1.0).unwrap());
        let report = imputer.impute(&mut dataset, &mut StdRng::seed_from_u64(1)).unwrap();

        assert_eq!(report.imputed, 1);
        assert_eq!(dataset.records[0], before.records[0]);
        assert_eq!(dataset.records[2], before.records[2]);
        assert_eq!(dataset.records[1].sex, Sex::Female);
        assert_eq!(
            Record { sex: Sex::Unassigned, ..dataset.records[1].clone() },
            before.records[1]
        );
    }

    #[test]
    fn absent_column_is_a_no_op() {
        let mut dataset = dataset_of(3);
        dataset.columns.retain(|c| *c != Column::Sex);
        let report = SexImputer::default()
            .impute(&mut dataset, &mut StdRng::seed_from_u64(0))
            .unwrap();
        assert!(!report.attempted);
        assert_eq!(report.imputed, 0);
        assert!(dataset.records.iter().all(|r| r.sex == Sex::Unassigned));
    }

    #[test]
    fn rejects_shares_that_are_not_a_distribution() {
        assert!(SexDistribution::new(0.6, 0.6).is_err());
        assert!(SexDistribution::new(-0.1, 1.1).is_err());
        assert!(SexDistribution::from_male_share(f64::NAN).is_err());
        assert!(SexDistribution::from_male_share(0.3).is_ok());
    }
}
