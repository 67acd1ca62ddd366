use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use csv::ReaderBuilder;

use crate::record::{SourceRecord, TargetRecord};

/// Reads source records from headered CSV, taking identifiers from
/// `id_column` and keeping every other column as payload.
pub fn source_records_from_reader<R: Read>(reader: R, id_column: &str) -> Result<Vec<SourceRecord>> {
    let mut rdr = ReaderBuilder::new().from_reader(reader);
    let headers = rdr.headers()?.clone();
    let id_pos = column_position(&headers, id_column)?;
    let mut records = vec![];
    for (index, row) in rdr.records().enumerate() {
        let row = row.with_context(|| format!("bad CSV row {index}"))?;
        let mut record = SourceRecord::new(index, row.get(id_pos).unwrap_or(""));
        for (pos, value) in row.iter().enumerate() {
            if pos != id_pos {
                if let Some(name) = headers.get(pos) {
                    record.payload.insert(name.to_string(), value.to_string());
                }
            }
        }
        records.push(record);
    }
    Ok(records)
}

/// Reads target records from headered CSV; `id_column` holds the primary
/// identifier, `xref_column` the packed cross-reference text.
pub fn target_records_from_reader<R: Read>(
    reader: R,
    id_column: &str,
    xref_column: &str,
) -> Result<Vec<TargetRecord>> {
    let mut rdr = ReaderBuilder::new().from_reader(reader);
    let headers = rdr.headers()?.clone();
    let id_pos = column_position(&headers, id_column)?;
    let xref_pos = column_position(&headers, xref_column)?;
    let mut records = vec![];
    for (index, row) in rdr.records().enumerate() {
        let row = row.with_context(|| format!("bad CSV row {index}"))?;
        let mut record = TargetRecord::new(
            index,
            row.get(id_pos).unwrap_or(""),
            row.get(xref_pos).unwrap_or(""),
        );
        for (pos, value) in row.iter().enumerate() {
            if pos != id_pos && pos != xref_pos {
                if let Some(name) = headers.get(pos) {
                    record.payload.insert(name.to_string(), value.to_string());
                }
            }
        }
        records.push(record);
    }
    Ok(records)
}

pub fn source_records_from_path<P: AsRef<Path>>(path: P, id_column: &str) -> Result<Vec<SourceRecord>> {
    let file = File::open(path.as_ref())
        .with_context(|| format!("can not open {}", path.as_ref().display()))?;
    source_records_from_reader(file, id_column)
}

pub fn target_records_from_path<P: AsRef<Path>>(
    path: P,
    id_column: &str,
    xref_column: &str,
) -> Result<Vec<TargetRecord>> {
    let file = File::open(path.as_ref())
        .with_context(|| format!("can not open {}", path.as_ref().display()))?;
    target_records_from_reader(file, id_column, xref_column)
}

fn column_position(headers: &csv::StringRecord, name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h == name)
        .ok_or_else(|| anyhow!("column '{name}' not found in header"))
}
