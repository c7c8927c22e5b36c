//! CSV reading and writing for data frames.

use crate::data::frame::{Cell, Column, DataFrame};
use crate::error::{ShellError, StorageError};
use std::path::{Path, PathBuf};

/// Find `<name>.csv` in `dir`, matching the file name case-insensitively.
pub fn find_dataset(dir: &Path, name: &str) -> Option<PathBuf> {
    let wanted = format!("{}.csv", name).to_lowercase();
    let exact = dir.join(format!("{}.csv", name));
    if exact.is_file() {
        return Some(exact);
    }
    let entries = std::fs::read_dir(dir).ok()?;
    entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .find(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.to_lowercase() == wanted)
        })
}

/// Read a CSV with a header row. Headers are trimmed and lowercased.
pub fn read_csv(path: &Path, delimiter: u8) -> Result<DataFrame, ShellError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(false)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(StorageError::from)?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(StorageError::from)?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();
    if headers.is_empty() || headers.iter().all(String::is_empty) {
        return Err(ShellError::Data(format!(
            "{} has no header row",
            path.display()
        )));
    }
    check_unique(&headers)?;

    let mut cells: Vec<Vec<Cell>> = vec![Vec::new(); headers.len()];
    for record in reader.records() {
        let record = record.map_err(StorageError::from)?;
        for (column, raw) in cells.iter_mut().zip(record.iter()) {
            column.push(Cell::parse(raw));
        }
    }

    let columns = headers
        .into_iter()
        .zip(cells)
        .map(|(name, cells)| Column::new(name, cells))
        .collect();
    let frame = DataFrame::from_columns(columns)?;
    tracing::debug!(
        path = %path.display(),
        rows = frame.n_rows(),
        cols = frame.n_cols(),
        "Read CSV"
    );
    Ok(frame)
}

fn check_unique(headers: &[String]) -> Result<(), ShellError> {
    for (i, header) in headers.iter().enumerate() {
        if headers[..i].contains(header) {
            return Err(ShellError::Data(format!(
                "Duplicate column {} after lowercasing headers",
                header
            )));
        }
    }
    Ok(())
}

pub fn write_csv(frame: &DataFrame, path: &Path) -> Result<(), StorageError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(frame.column_names())?;
    for row in 0..frame.n_rows() {
        writer.write_record(frame.row(row).iter().map(|cell| cell.to_string()))?;
    }
    writer.flush()?;
    Ok(())
}
