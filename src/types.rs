use chrono::NaiveDate;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use tabled::Tabled;

/// Placeholder the source dataset uses for a missing categorical value.
pub const SENTINEL: &str = "NO ASIGNADO";

/// Age brackets in their semantic order. The last label is kept verbatim
/// because grouping matches the input text exactly.
pub const AGE_BRACKETS: [&str; 16] = [
    "0-5", "6-10", "11-15", "16-20", "21-25", "26-30", "31-35", "36-40", "41-45", "46-50",
    "51-55", "56-60", "61-65", "66-70", "71-75", "74+",
];

pub const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

static AGE_POSITION: Lazy<HashMap<&'static str, usize>> =
    Lazy::new(|| AGE_BRACKETS.iter().enumerate().map(|(i, l)| (*l, i)).collect());

static WEEKDAY_POSITION: Lazy<HashMap<&'static str, usize>> =
    Lazy::new(|| WEEKDAYS.iter().enumerate().map(|(i, l)| (*l, i)).collect());

/// Known columns of the accident dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Column {
    Date,
    Year,
    TimeRange,
    AgeBracket,
    Sex,
    PersonType,
    District,
    AccidentType,
    Severity,
    VehicleType,
    Month,
    Weekday,
}

impl Column {
    pub const ALL: [Column; 12] = [
        Column::Date,
        Column::Year,
        Column::TimeRange,
        Column::AgeBracket,
        Column::Sex,
        Column::PersonType,
        Column::District,
        Column::AccidentType,
        Column::Severity,
        Column::VehicleType,
        Column::Month,
        Column::Weekday,
    ];

    /// Columns that must be present for the accident key and yearly grouping.
    pub const REQUIRED: [Column; 4] = [
        Column::Date,
        Column::Year,
        Column::TimeRange,
        Column::District,
    ];

    pub fn header(self) -> &'static str {
        match self {
            Column::Date => "FECHA",
            Column::Year => "AÑO",
            Column::TimeRange => "RANGO_HORARIO",
            Column::AgeBracket => "TRAMO_EDAD",
            Column::Sex => "SEXO",
            Column::PersonType => "TIPO_PERSONA",
            Column::District => "DISTRITO",
            Column::AccidentType => "TIPO_ACCIDENTE",
            Column::Severity => "LESIVIDAD",
            Column::VehicleType => "TIPO_VEHICULO",
            Column::Month => "MES",
            Column::Weekday => "DIA_SEMANA",
        }
    }

    pub fn from_header(name: &str) -> Option<Column> {
        let name = name.trim().trim_start_matches('\u{feff}');
        Column::ALL.into_iter().find(|c| c.header() == name)
    }

    pub fn is_categorical(self) -> bool {
        !matches!(self, Column::Date | Column::Year)
    }

    /// Fixed ordering for columns whose labels carry a semantic order.
    pub fn domain(self) -> Option<&'static [&'static str]> {
        match self {
            Column::AgeBracket => Some(&AGE_BRACKETS),
            Column::Weekday => Some(&WEEKDAYS),
            _ => None,
        }
    }

    /// Position of `value` inside this column's fixed domain, if it has one.
    pub fn domain_position(self, value: &str) -> Option<usize> {
        match self {
            Column::AgeBracket => AGE_POSITION.get(value).copied(),
            Column::Weekday => WEEKDAY_POSITION.get(value).copied(),
            _ => None,
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sex {
    Male,
    Female,
    Unassigned,
}

impl Sex {
    /// Label as it appears in the dataset.
    pub fn as_str(self) -> &'static str {
        match self {
            Sex::Male => "HOMBRE",
            Sex::Female => "MUJER",
            Sex::Unassigned => SENTINEL,
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw CSV row. Every field is optional so a missing column deserializes to `None`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawRow {
    #[serde(rename = "FECHA")]
    pub date: Option<String>,
    #[serde(rename = "AÑO")]
    pub year: Option<String>,
    #[serde(rename = "RANGO_HORARIO")]
    pub time_range: Option<String>,
    #[serde(rename = "TRAMO_EDAD")]
    pub age_bracket: Option<String>,
    #[serde(rename = "SEXO")]
    pub sex: Option<String>,
    #[serde(rename = "TIPO_PERSONA")]
    pub person_type: Option<String>,
    #[serde(rename = "DISTRITO")]
    pub district: Option<String>,
    #[serde(rename = "TIPO_ACCIDENTE")]
    pub accident_type: Option<String>,
    #[serde(rename = "LESIVIDAD")]
    pub severity: Option<String>,
    #[serde(rename = "TIPO_VEHICULO")]
    pub vehicle_type: Option<String>,
    #[serde(rename = "MES")]
    pub month: Option<String>,
    #[serde(rename = "DIA_SEMANA")]
    pub weekday: Option<String>,
}

/// One person involved in one accident.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub date: Option<NaiveDate>,
    pub year: i32,
    pub time_range: String,
    pub age_bracket: String,
    pub sex: Sex,
    pub person_type: String,
    pub district: String,
    pub accident_type: String,
    pub severity: String,
    pub vehicle_type: String,
    pub month: String,
    pub weekday: String,
}

impl Record {
    /// String form of a column, the same text written back to CSV.
    pub fn field(&self, column: Column) -> Cow<'_, str> {
        match column {
            Column::Date => match self.date {
                Some(d) => Cow::Owned(d.format("%Y-%m-%d").to_string()),
                None => Cow::Borrowed(""),
            },
            Column::Year => Cow::Owned(self.year.to_string()),
            Column::TimeRange => Cow::Borrowed(&self.time_range),
            Column::AgeBracket => Cow::Borrowed(&self.age_bracket),
            Column::Sex => Cow::Borrowed(self.sex.as_str()),
            Column::PersonType => Cow::Borrowed(&self.person_type),
            Column::District => Cow::Borrowed(&self.district),
            Column::AccidentType => Cow::Borrowed(&self.accident_type),
            Column::Severity => Cow::Borrowed(&self.severity),
            Column::VehicleType => Cow::Borrowed(&self.vehicle_type),
            Column::Month => Cow::Borrowed(&self.month),
            Column::Weekday => Cow::Borrowed(&self.weekday),
        }
    }

    pub fn accident_key(&self) -> AccidentKey<'_> {
        AccidentKey {
            date: self.date,
            time_range: &self.time_range,
            district: &self.district,
        }
    }
}

/// Identifies one physical accident across the person rows that share it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AccidentKey<'a> {
    pub date: Option<NaiveDate>,
    pub time_range: &'a str,
    pub district: &'a str,
}

/// Records together with the known columns the input actually carried,
/// in input header order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    pub columns: Vec<Column>,
    pub records: Vec<Record>,
}

impl Dataset {
    pub fn new(columns: Vec<Column>, records: Vec<Record>) -> Self {
        Self { columns, records }
    }

    /// Same schema, different rows.
    pub fn with_records(&self, records: Vec<Record>) -> Self {
        Self {
            columns: self.columns.clone(),
            records,
        }
    }

    pub fn has_column(&self, column: Column) -> bool {
        self.columns.contains(&column)
    }

    pub fn categorical_columns(&self) -> impl Iterator<Item = Column> + '_ {
        self.columns.iter().copied().filter(|c| c.is_categorical())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct CountRow {
    #[serde(rename = "Key")]
    #[tabled(rename = "Key")]
    pub key: String,
    #[serde(rename = "Count")]
    #[tabled(rename = "Count")]
    pub count: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct StatsRow {
    #[tabled(rename = "Series")]
    pub series: String,
    #[tabled(rename = "count")]
    pub count: String,
    #[tabled(rename = "mean")]
    pub mean: String,
    #[tabled(rename = "std")]
    pub std: String,
    #[tabled(rename = "min")]
    pub min: String,
    #[tabled(rename = "25%")]
    pub q25: String,
    #[tabled(rename = "50%")]
    pub q50: String,
    #[tabled(rename = "75%")]
    pub q75: String,
    #[tabled(rename = "max")]
    pub max: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryStats {
    pub person_rows: usize,
    pub unique_accidents: usize,
    /// Person rows folded into an accident already counted.
    pub duplicate_rows: usize,
    pub districts: usize,
    pub years: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headers_round_trip_through_column() {
        for column in Column::ALL {
            assert_eq!(Column::from_header(column.header()), Some(column));
        }
        assert_eq!(Column::from_header("\u{feff}FECHA"), Some(Column::Date));
        assert_eq!(Column::from_header("NUM_EXPEDIENTE"), None);
    }

    #[test]
    fn age_domain_keeps_literal_last_label() {
        assert_eq!(AGE_BRACKETS.len(), 16);
        assert_eq!(Column::AgeBracket.domain_position("74+"), Some(15));
        assert_eq!(Column::AgeBracket.domain_position("71-75"), Some(14));
        assert_eq!(Column::AgeBracket.domain_position("76+"), None);
        assert_eq!(Column::Weekday.domain_position("Sunday"), Some(6));
        assert_eq!(Column::District.domain_position("CENTRO"), None);
    }

    #[test]
    fn only_date_and_year_are_not_categorical() {
        let categorical: Vec<Column> =
            Column::ALL.into_iter().filter(|c| c.is_categorical()).collect();
        assert_eq!(categorical.len(), 10);
        assert!(!categorical.contains(&Column::Date));
        assert!(!categorical.contains(&Column::Year));
    }
}
