//! CSV / TSV loading into [`Table`]s.
//!
//! Each file becomes one table named after its file stem. Column types are
//! inferred per column from the non-null cells: all integers → `Int`, all
//! numbers → `Float`, all boolean literals → `Bool`, anything else → `Text`.
//! The usual spreadsheet NA markers (`NA`, `NULL`, `nan`, empty...) are
//! nulls. Datetimes stay text.

use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use csv::ReaderBuilder;
use tracing::debug;

use crate::table::{Column, Table, Value};

const NA_TOKENS: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Errors raised while loading tables.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed CSV in table '{table}': {source}")]
    Csv {
        table: String,
        #[source]
        source: csv::Error,
    },

    #[error("Duplicate table name: {0}")]
    DuplicateTable(String),

    #[error("Cannot derive a table name from {0}")]
    InvalidName(PathBuf),
}

pub type LoadResult<T> = Result<T, LoadError>;

fn is_na(cell: &str) -> bool {
    NA_TOKENS.contains(&cell)
}

fn parse_bool(cell: &str) -> Option<bool> {
    match cell {
        "True" | "TRUE" | "true" => Some(true),
        "False" | "FALSE" | "false" => Some(false),
        _ => None,
    }
}

/// Infer the narrowest type that fits every non-null cell.
fn infer_column(name: String, cells: Vec<String>) -> Column {
    let present = || cells.iter().filter(|c| !is_na(c));

    let convert = |parse: &dyn Fn(&str) -> Option<Value>| -> Option<Vec<Value>> {
        cells
            .iter()
            .map(|c| if is_na(c) { Some(Value::Null) } else { parse(c.as_str()) })
            .collect()
    };

    let values = if present().all(|c| c.parse::<i64>().is_ok()) {
        convert(&|c| c.parse::<i64>().ok().map(Value::Int))
    } else if present().all(|c| c.parse::<f64>().is_ok()) {
        convert(&|c| c.parse::<f64>().ok().map(Value::Float))
    } else if present().all(|c| parse_bool(c).is_some()) {
        convert(&|c| parse_bool(c).map(Value::Bool))
    } else {
        None
    };

    let values = values.unwrap_or_else(|| {
        cells
            .into_iter()
            .map(|c| if is_na(&c) { Value::Null } else { Value::Text(c) })
            .collect()
    });

    Column { name, values }
}

/// Read one delimited table from `reader`.
///
/// Short rows are padded with nulls; extra trailing cells are ignored.
pub fn read_delimited<R: Read>(name: &str, reader: R, delimiter: u8) -> LoadResult<Table> {
    let csv_err = |source| LoadError::Csv {
        table: name.to_string(),
        source,
    };

    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(reader);

    let headers: Vec<String> = rdr
        .headers()
        .map_err(csv_err)?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut cells: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
    for record in rdr.records() {
        let record = record.map_err(csv_err)?;
        for (idx, column) in cells.iter_mut().enumerate() {
            column.push(record.get(idx).unwrap_or("").trim().to_string());
        }
    }

    let mut table = Table::new(name);
    for (header, column) in headers.into_iter().zip(cells) {
        table.push_column(infer_column(header, column));
    }
    debug!(
        table = name,
        rows = table.row_count(),
        columns = table.column_count(),
        "loaded table"
    );
    Ok(table)
}

/// Read one comma-separated table from `reader`.
pub fn read_csv<R: Read>(name: &str, reader: R) -> LoadResult<Table> {
    read_delimited(name, reader, b',')
}

/// Load a `.csv` or `.tsv` file; the delimiter follows the extension.
pub fn load_csv<P: AsRef<Path>>(path: P) -> LoadResult<Table> {
    let path = path.as_ref();
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| LoadError::InvalidName(path.to_path_buf()))?;

    let is_tsv = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("tsv"));
    let delimiter = if is_tsv { b'\t' } else { b',' };

    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_delimited(name, file, delimiter)
}

/// Load several files, keeping their order. Two files with the same stem are
/// rejected.
pub fn load_csv_files<P: AsRef<Path>>(paths: &[P]) -> LoadResult<Vec<Table>> {
    let mut names = HashSet::new();
    let mut tables = Vec::with_capacity(paths.len());
    for path in paths {
        let table = load_csv(path)?;
        if !names.insert(table.name.clone()) {
            return Err(LoadError::DuplicateTable(table.name));
        }
        tables.push(table);
    }
    Ok(tables)
}
