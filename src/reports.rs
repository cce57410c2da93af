use crate::aggregate::{count_by, cross_tab, CrossTab, DescriptiveStats, GroupedCount, KeyedStats};
use crate::config::PipelineConfig;
use crate::dedup::unique_accidents;
use crate::pipeline::{CleaningOutcome, StageCounts};
use crate::types::{Column, Dataset, SummaryStats};
use serde::Serialize;
use tracing::{debug, info};

/// Every table the charting layer draws from, computed over cleaned rows.
///
/// "persons" tables count person rows; "accidents" tables count the
/// deduplicated accident view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccidentReport {
    pub summary: SummaryStats,
    pub accidents_by_year: GroupedCount,
    pub persons_by_year: GroupedCount,
    pub persons_by_accident_type: GroupedCount,
    pub persons_by_weekday: GroupedCount,
    pub persons_by_age_bracket: GroupedCount,
    pub accidents_by_district: GroupedCount,
    pub district_stats: Option<DescriptiveStats>,
    pub accidents_by_district_year: CrossTab,
    pub yearly_district_stats: Vec<KeyedStats>,
}

pub fn build_report(data: &Dataset) -> AccidentReport {
    let accidents = unique_accidents(&data.records);
    debug!(
        "{} duplicate person rows folded into existing accidents",
        accidents.duplicates_removed()
    );

    let accidents_by_year = count_by(accidents.iter(), Column::Year);
    let persons_by_year = count_by(&data.records, Column::Year);
    let persons_by_accident_type = count_by(&data.records, Column::AccidentType).ranked();
    let persons_by_weekday = count_by(&data.records, Column::Weekday);
    let persons_by_age_bracket = count_by(&data.records, Column::AgeBracket);

    let accidents_by_district_year = cross_tab(accidents.iter(), Column::District, Column::Year);
    let accidents_by_district = accidents_by_district_year.row_totals().ranked();
    let district_stats = accidents_by_district.describe();
    let yearly_district_stats = accidents_by_district_year.describe_columns();

    let summary = SummaryStats {
        person_rows: data.len(),
        unique_accidents: accidents.len(),
        duplicate_rows: accidents.duplicates_removed(),
        districts: accidents_by_district_year.row_keys.len(),
        years: accidents_by_district_year.col_keys.len(),
    };
    info!(
        "Report built: {} person rows, {} accidents across {} districts and {} years",
        summary.person_rows, summary.unique_accidents, summary.districts, summary.years
    );

    AccidentReport {
        summary,
        accidents_by_year,
        persons_by_year,
        persons_by_accident_type,
        persons_by_weekday,
        persons_by_age_bracket,
        accidents_by_district,
        district_stats,
        accidents_by_district_year,
        yearly_district_stats,
    }
}

/// What gets persisted for one run: the settings used, the row counts of
/// each cleaning stage and the tables built from the cleaned rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub config: PipelineConfig,
    pub stages: StageCounts,
    pub report: AccidentReport,
}

pub fn build_run_report(config: &PipelineConfig, outcome: &CleaningOutcome) -> RunReport {
    RunReport {
        config: config.clone(),
        stages: outcome.counts(),
        report: build_report(outcome.cleaned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Record, Sex};
    use chrono::NaiveDate;

    fn record(day: u32, time_range: &str, district: &str, year: i32, kind: &str) -> Record {
        Record {
            date: NaiveDate::from_ymd_opt(year, 1, day),
            year,
            time_range: time_range.into(),
            age_bracket: "36-40".into(),
            sex: Sex::Female,
            person_type: "Conductor".into(),
            district: district.into(),
            accident_type: kind.into(),
            severity: "Leve".into(),
            vehicle_type: "Turismo".into(),
            month: "ENERO".into(),
            weekday: "Tuesday".into(),
        }
    }

    #[test]
    fn accident_tables_use_deduplicated_rows() {
        let data = Dataset::new(
            Column::ALL.to_vec(),
            vec![
                record(1, "06-07", "CENTRO", 2023, "Alcance"),
                record(1, "06-07", "CENTRO", 2023, "Alcance"),
                record(1, "06-07", "CENTRO", 2023, "Alcance"),
                record(2, "09-10", "RETIRO", 2023, "Atropello"),
                record(3, "09-10", "RETIRO", 2024, "Alcance"),
            ],
        );
        let report = build_report(&data);

        assert_eq!(report.summary.person_rows, 5);
        assert_eq!(report.summary.unique_accidents, 3);
        assert_eq!(report.summary.duplicate_rows, 2);
        assert_eq!(report.summary.districts, 2);
        assert_eq!(report.summary.years, 2);

        assert_eq!(report.persons_by_year.total(), 5);
        assert_eq!(report.accidents_by_year.total(), 3);
        assert_eq!(report.accidents_by_year.get("2023"), Some(2));
        assert_eq!(report.persons_by_year.get("2023"), Some(4));

        assert_eq!(report.persons_by_accident_type.groups[0].key, "Alcance");
        assert_eq!(report.persons_by_accident_type.groups[0].count, 4);

        let districts: Vec<&str> = report.accidents_by_district.keys().collect();
        assert_eq!(districts, vec!["RETIRO", "CENTRO"]);
        assert_eq!(report.accidents_by_district_year.get("CENTRO", "2024"), 0);
        assert_eq!(report.yearly_district_stats.len(), 2);
        assert_eq!(report.district_stats.as_ref().map(|s| s.count), Some(2));
    }

    #[test]
    fn empty_dataset_yields_empty_tables() {
        let report = build_report(&Dataset::new(Column::ALL.to_vec(), Vec::new()));
        assert_eq!(report.summary.unique_accidents, 0);
        assert_eq!(report.summary.duplicate_rows, 0);
        assert!(report.district_stats.is_none());
        assert!(report.yearly_district_stats.is_empty());
        assert_eq!(report.persons_by_age_bracket.total(), 0);
        assert_eq!(report.persons_by_age_bracket.groups.len(), 16);
    }
}
