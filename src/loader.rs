use crate::error::{ReportError, Result};
use crate::types::{Column, Dataset, RawRow, Record};
use crate::util::{clean_text, parse_date_safe, parse_i32_safe, parse_sex};
use csv::{ReaderBuilder, Trim};
use std::io;
use std::path::Path;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub loaded_rows: usize,
    /// Rows skipped because the year or the sex label could not be read.
    pub parse_errors: usize,
    /// Rows kept with a null date.
    pub invalid_dates: usize,
}

pub fn load_dataset(path: impl AsRef<Path>, delimiter: u8) -> Result<(Dataset, LoadReport)> {
    let path = path.as_ref();
    info!("Loading accident records from {}", path.display());
    let file = std::fs::File::open(path)?;
    load_from_reader(file, delimiter)
}

/// Read and normalize CSV rows into typed records.
///
/// Only the required accident-key and year headers must exist; other known
/// headers are optional and unknown headers are ignored.
pub fn load_from_reader<R: io::Read>(reader: R, delimiter: u8) -> Result<(Dataset, LoadReport)> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(Trim::Headers)
        .from_reader(reader);

    let mut columns: Vec<Column> = Vec::new();
    for name in rdr.headers()?.iter() {
        if let Some(col) = Column::from_header(name) {
            if !columns.contains(&col) {
                columns.push(col);
            }
        }
    }
    for required in Column::REQUIRED {
        if !columns.contains(&required) {
            return Err(ReportError::MissingColumn(required.header().to_string()));
        }
    }
    debug!("Recognised columns: {:?}", columns);

    let mut total_rows = 0usize;
    let mut parse_errors = 0usize;
    let mut invalid_dates = 0usize;
    let mut records: Vec<Record> = Vec::new();

    for result in rdr.deserialize::<RawRow>() {
        total_rows += 1;
        let row = match result {
            Ok(r) => r,
            Err(e) => {
                warn!("Skipping row {}: {}", total_rows, e);
                parse_errors += 1;
                continue;
            }
        };

        let Some(year) = parse_i32_safe(row.year.as_deref()) else {
            warn!("Skipping row {}: unreadable year {:?}", total_rows, row.year);
            parse_errors += 1;
            continue;
        };
        let Some(sex) = parse_sex(row.sex.as_deref()) else {
            warn!("Skipping row {}: unknown sex label {:?}", total_rows, row.sex);
            parse_errors += 1;
            continue;
        };

        let date = parse_date_safe(row.date.as_deref());
        if date.is_none() {
            invalid_dates += 1;
        }

        records.push(Record {
            date,
            year,
            time_range: clean_text(row.time_range),
            age_bracket: clean_text(row.age_bracket),
            sex,
            person_type: clean_text(row.person_type),
            district: clean_text(row.district),
            accident_type: clean_text(row.accident_type),
            severity: clean_text(row.severity),
            vehicle_type: clean_text(row.vehicle_type),
            month: clean_text(row.month),
            weekday: clean_text(row.weekday),
        });
    }

    let report = LoadReport {
        total_rows,
        loaded_rows: records.len(),
        parse_errors,
        invalid_dates,
    };
    info!(
        "Loaded {} of {} rows ({} skipped, {} null dates)",
        report.loaded_rows, report.total_rows, report.parse_errors, report.invalid_dates
    );
    Ok((Dataset::new(columns, records), report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Sex;
    use chrono::NaiveDate;

    const HEADER: &str = "FECHA,AÑO,RANGO_HORARIO,TRAMO_EDAD,SEXO,TIPO_PERSONA,DISTRITO,TIPO_ACCIDENTE,LESIVIDAD,TIPO_VEHICULO,MES,DIA_SEMANA,NUM_EXPEDIENTE";

    fn load(body: &str) -> Result<(Dataset, LoadReport)> {
        load_from_reader(body.as_bytes(), b',')
    }

    #[test]
    fn normalizes_rows_and_keeps_bad_dates_as_null() {
        let csv = format!(
            "{HEADER}\n\
             2024-01-01,2024,06-07, 26-30 ,HOMBRE,Conductor,CENTRO,Colisión,Leve,Turismo,ENERO,Monday,X1\n\
             garbage,2024,06-07,31-35,NO ASIGNADO,Peatón,RETIRO,Atropello,Grave,Turismo,ENERO,Monday,X2\n"
        );
        let (dataset, report) = load(&csv).unwrap();

        assert_eq!(dataset.columns.len(), 12);
        assert_eq!(report.total_rows, 2);
        assert_eq!(report.loaded_rows, 2);
        assert_eq!(report.invalid_dates, 1);

        let first = &dataset.records[0];
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(first.age_bracket, "26-30");
        assert_eq!(first.sex, Sex::Male);
        assert_eq!(dataset.records[1].date, None);
        assert_eq!(dataset.records[1].sex, Sex::Unassigned);
    }

    #[test]
    fn unreadable_year_or_sex_is_counted_not_fatal() {
        let csv = format!(
            "{HEADER}\n\
             2024-01-01,abc,06-07,26-30,HOMBRE,Conductor,CENTRO,Colisión,Leve,Turismo,ENERO,Monday,X1\n\
             2024-01-01,2024,06-07,26-30,OTRO,Conductor,CENTRO,Colisión,Leve,Turismo,ENERO,Monday,X2\n\
             2024-01-01,2024,06-07,26-30,MUJER,Conductor,CENTRO,Colisión,Leve,Turismo,ENERO,Monday,X3\n"
        );
        let (dataset, report) = load(&csv).unwrap();
        assert_eq!(report.parse_errors, 2);
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.records[0].sex, Sex::Female);
    }

    #[test]
    fn optional_sex_column_may_be_absent() {
        let csv = "FECHA,AÑO,RANGO_HORARIO,DISTRITO\n2024-01-01,2024,06-07,CENTRO\n";
        let (dataset, _) = load(csv).unwrap();
        assert!(!dataset.has_column(Column::Sex));
        assert_eq!(dataset.records[0].sex, Sex::Unassigned);
    }

    #[test]
    fn missing_key_column_is_an_error() {
        let csv = "FECHA,AÑO,RANGO_HORARIO\n2024-01-01,2024,06-07\n";
        let err = load(csv).unwrap_err();
        assert!(matches!(err, ReportError::MissingColumn(ref c) if c == "DISTRITO"));
    }

    #[test]
    fn padded_header_names_still_load_rows() {
        let csv = "FECHA, AÑO , RANGO_HORARIO, DISTRITO\n\
                   2024-01-01,2024,06-07,CENTRO\n\
                   2024-01-02,2023,07-08,RETIRO\n";
        let (dataset, report) = load(csv).unwrap();
        assert_eq!(
            dataset.columns,
            vec![Column::Date, Column::Year, Column::TimeRange, Column::District]
        );
        assert_eq!(report.loaded_rows, 2);
        assert_eq!(report.parse_errors, 0);
        assert_eq!(dataset.records[1].year, 2023);
        assert_eq!(dataset.records[1].district, "RETIRO");
    }

    #[test]
    fn honours_custom_delimiter() {
        let csv = "FECHA;AÑO;RANGO_HORARIO;DISTRITO\n2024-01-01;2023;06-07;CENTRO\n";
        let (dataset, _) = load_from_reader(csv.as_bytes(), b';').unwrap();
        assert_eq!(dataset.records[0].year, 2023);
        assert_eq!(dataset.records[0].district, "CENTRO");
    }
}
