//! CSV output writer.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::Serialize;
use serde_json::Value;

use crate::error::Result;

/// Writes records to a comma-delimited CSV file with a header row.
///
/// # Format
/// - Delimiter: `,`
/// - Columns: every field of the records, in the order they first appear
/// - Cells: strings as-is, `null` as empty, anything else as JSON text
///
/// Returns the number of rows written.
pub fn write_csv<T: Serialize>(records: &[T], path: impl AsRef<Path>) -> Result<usize> {
    let file = File::create(path.as_ref())?;
    write_records(records, file)
}

/// Converts records to a CSV string.
pub fn to_csv<T: Serialize>(records: &[T]) -> Result<String> {
    let mut buffer = Vec::new();
    write_records(records, &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

fn write_records<T: Serialize, W: Write>(records: &[T], out: W) -> Result<usize> {
    let rows = records
        .iter()
        .map(serde_json::to_value)
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let header = build_header(&rows);
    let mut writer = csv::WriterBuilder::new().from_writer(out);
    if !header.is_empty() {
        writer.write_record(&header)?;
    }

    for row in &rows {
        writer.write_record(build_record(row, &header))?;
    }

    writer.flush()?;
    Ok(rows.len())
}

/// Union of all field names, first-seen order. Non-object records get a
/// single `value` column.
fn build_header(rows: &[Value]) -> Vec<String> {
    let mut header: Vec<String> = Vec::new();
    for row in rows {
        match row {
            Value::Object(map) => {
                for key in map.keys() {
                    if !header.iter().any(|h| h == key) {
                        header.push(key.clone());
                    }
                }
            }
            _ => {
                if !header.iter().any(|h| h == "value") {
                    header.push("value".to_string());
                }
            }
        }
    }
    header
}

fn build_record(row: &Value, header: &[String]) -> Vec<String> {
    match row {
        Value::Object(map) => header
            .iter()
            .map(|key| map.get(key).map(cell).unwrap_or_default())
            .collect(),
        other => header
            .iter()
            .map(|key| if key == "value" { cell(other) } else { String::new() })
            .collect(),
    }
}

fn cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
