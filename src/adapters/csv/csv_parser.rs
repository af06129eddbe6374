use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use csv::{ErrorKind, ReaderBuilder, StringRecord};
use error_stack::{report, Report, ResultExt};
use serde_json::Number;
use thiserror::Error;
use tracing::instrument;

use crate::domain::tabular::{CellValue, TabularDataset};

/// Field contents read as a missing value (pandas' default NA markers).
pub const NA_MARKERS: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

const TRUE_LITERALS: [&str; 3] = ["True", "TRUE", "true"];
const FALSE_LITERALS: [&str; 3] = ["False", "FALSE", "false"];
const UTF8_BOM: char = '\u{feff}';

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CsvParseError {
    #[error("Failed to open CSV file")]
    FailedToOpen,
    #[error("Failed to read CSV data")]
    FailedToRead,
    #[error("CSV data is not valid UTF-8")]
    InvalidUtf8,
    #[error("CSV file has no header row")]
    Empty,
    #[error("Line {line}: found {found} fields, expected {expected}")]
    RaggedRow {
        line: u64,
        expected: u64,
        found: u64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Boolean,
    Number,
    Text,
}

#[instrument]
pub fn parse_csv_file(path: &Path) -> error_stack::Result<TabularDataset, CsvParseError> {
    let file = File::open(path)
        .change_context(CsvParseError::FailedToOpen)
        .attach_printable_lazy(|| format!("Path: {}", path.display()))?;

    parse_csv_reader(BufReader::new(file))
        .attach_printable_lazy(|| format!("Path: {}", path.display()))
}

/// Reads comma-separated, double-quoted UTF-8 data. The first record is the
/// header; every other record must have the same number of fields.
pub fn parse_csv_reader<R: Read>(reader: R) -> error_stack::Result<TabularDataset, CsvParseError> {
    let mut reader = ReaderBuilder::new()
        .delimiter(b',')
        .quote(b'"')
        .quoting(true)
        .double_quote(true)
        .has_headers(true)
        .flexible(false)
        .from_reader(reader);

    let headers = reader.headers().map_err(map_csv_error)?.clone();
    if headers.is_empty() {
        return Err(report!(CsvParseError::Empty));
    }
    let columns = column_names(&headers);

    let mut raw_rows: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        let record = record.map_err(map_csv_error)?;
        raw_rows.push(record.iter().map(str::to_owned).collect());
    }

    let kinds = (0..columns.len())
        .map(|index| infer_column_kind(raw_rows.iter().map(|row| row[index].as_str())))
        .collect::<Vec<_>>();

    let rows = raw_rows
        .into_iter()
        .map(|row| {
            row.into_iter()
                .zip(kinds.iter())
                .map(|(field, kind)| to_cell(field, *kind))
                .collect()
        })
        .collect();

    // Field counts were already checked by the reader.
    TabularDataset::new(columns, rows).map_err(|error| {
        report!(CsvParseError::FailedToRead).attach_printable(error.to_string())
    })
}

fn map_csv_error(error: csv::Error) -> Report<CsvParseError> {
    let context = match error.kind() {
        ErrorKind::UnequalLengths {
            pos,
            expected_len,
            len,
        } => CsvParseError::RaggedRow {
            line: pos.as_ref().map_or(0, |pos| pos.line()),
            expected: *expected_len,
            found: *len,
        },
        ErrorKind::Utf8 { .. } => CsvParseError::InvalidUtf8,
        _ => CsvParseError::FailedToRead,
    };

    report!(context).attach_printable(error.to_string())
}

/// Header names, with blank names replaced by `Unnamed: <index>` and repeated
/// names suffixed `.1`, `.2`, ... (`a,a,a` reads as `a,a.1,a.2`).
fn column_names(headers: &StringRecord) -> Vec<String> {
    let names = headers.iter().enumerate().map(|(index, name)| {
        let name = if index == 0 {
            name.trim_start_matches(UTF8_BOM)
        } else {
            name
        };
        if name.is_empty() {
            format!("Unnamed: {}", index)
        } else {
            name.to_string()
        }
    });

    let mut seen: HashMap<String, usize> = HashMap::new();
    names
        .map(|mut name| {
            let mut count = seen.get(&name).copied().unwrap_or(0);
            while count > 0 {
                seen.insert(name.clone(), count + 1);
                name = format!("{}.{}", name, count);
                count = seen.get(&name).copied().unwrap_or(0);
            }
            seen.insert(name.clone(), count + 1);
            name
        })
        .collect()
}

fn is_missing(field: &str) -> bool {
    NA_MARKERS.contains(&field)
}

fn parse_bool(field: &str) -> Option<bool> {
    if TRUE_LITERALS.contains(&field) {
        Some(true)
    } else if FALSE_LITERALS.contains(&field) {
        Some(false)
    } else {
        None
    }
}

fn parse_number(field: &str) -> Option<Number> {
    if let Ok(integer) = field.parse::<i64>() {
        return Some(Number::from(integer));
    }
    if let Ok(integer) = field.parse::<u64>() {
        return Some(Number::from(integer));
    }
    field.parse::<f64>().ok().and_then(Number::from_f64)
}

/// A column is Boolean or Number only if every present value parses as such.
/// Anything mixed stays text, values untouched.
fn infer_column_kind<'a>(fields: impl Iterator<Item = &'a str>) -> ColumnKind {
    let mut all_bool = true;
    let mut all_number = true;

    for field in fields.filter(|field| !is_missing(field)) {
        all_bool &= parse_bool(field).is_some();
        all_number &= parse_number(field).is_some();
        if !all_bool && !all_number {
            return ColumnKind::Text;
        }
    }

    if all_bool {
        ColumnKind::Boolean
    } else if all_number {
        ColumnKind::Number
    } else {
        ColumnKind::Text
    }
}

fn to_cell(field: String, kind: ColumnKind) -> CellValue {
    if is_missing(&field) {
        return CellValue::Empty;
    }

    match kind {
        ColumnKind::Boolean => parse_bool(&field).map(CellValue::Boolean),
        ColumnKind::Number => parse_number(&field).map(CellValue::Number),
        ColumnKind::Text => None,
    }
    .unwrap_or(CellValue::String(field))
}
