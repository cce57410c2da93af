use crate::error::Result;
use crate::types::Dataset;
use serde::Serialize;
use std::io;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

/// Write cleaned rows with the input's known columns, in input header order.
pub fn write_dataset_csv(path: impl AsRef<Path>, data: &Dataset, delimiter: u8) -> Result<()> {
    let file = std::fs::File::create(path)?;
    write_dataset(file, data, delimiter)
}

pub fn write_dataset<W: io::Write>(writer: W, data: &Dataset, delimiter: u8) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(writer);
    wtr.write_record(data.columns.iter().map(|c| c.header()))?;
    for r in &data.records {
        let fields: Vec<_> = data.columns.iter().map(|c| r.field(*c)).collect();
        wtr.write_record(fields.iter().map(|f| f.as_bytes()))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: impl AsRef<Path>, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

pub fn preview_table<T>(title: &str, note: Option<&str>, rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    println!("\n{}", title);
    if let Some(n) = note {
        println!("({})", n);
    }
    println!();
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}
