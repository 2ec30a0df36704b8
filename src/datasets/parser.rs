use super::schema::ColumnSpec;
use super::table::{Column, ColumnKind, Table, Value};
use super::{DatasetError, DatasetKind};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::io::Read;
use tracing::debug;

/// Parse one delimited-text dataset into a canonical-schema table.
///
/// Headers are matched against the dataset's canonical columns and their
/// aliases; unrecognized columns are ignored. Cell parsing is best-effort:
/// blanks and values that do not parse under the declared column kind load
/// as missing, with drop counts logged.
pub(crate) fn parse_table<R: Read>(reader: R, kind: DatasetKind) -> Result<Table, DatasetError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let mut layout: Vec<Option<&'static ColumnSpec>> = Vec::with_capacity(headers.len());
    for header in headers.iter() {
        layout.push(kind.spec_for_header(header));
    }

    for spec in kind.columns() {
        if spec.required && !layout.iter().flatten().any(|s| s.canonical == spec.canonical) {
            return Err(DatasetError::SchemaMismatch {
                dataset: kind,
                column: spec.canonical,
            });
        }
    }

    let mut columns: Vec<(usize, &'static ColumnSpec, Vec<Option<Value>>)> = layout
        .iter()
        .enumerate()
        .filter_map(|(index, spec)| spec.map(|spec| (index, spec, Vec::new())))
        .collect();

    let mut rows = 0usize;
    let mut dropped_cells = 0usize;
    for record in csv_reader.records() {
        let record = record?;
        rows += 1;
        for (index, spec, cells) in &mut columns {
            let raw = record.get(*index).unwrap_or("");
            let cell = parse_cell(raw, spec.kind);
            if cell.is_none() && !raw.trim().is_empty() {
                dropped_cells += 1;
            }
            cells.push(cell);
        }
    }

    if dropped_cells > 0 {
        debug!(
            dataset = kind.label(),
            rows, dropped_cells, "loaded dataset with unparseable cells treated as missing"
        );
    }

    let columns = columns
        .into_iter()
        .map(|(_, spec, cells)| Column::new(spec.canonical, spec.kind, cells))
        .collect();
    Ok(Table::new(columns))
}

fn parse_cell(raw: &str, kind: ColumnKind) -> Option<Value> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    match kind {
        ColumnKind::Text => Some(Value::Text(trimmed.to_string())),
        ColumnKind::Number => trimmed.parse::<f64>().ok().map(Value::Number),
        ColumnKind::Timestamp => parse_datetime(trimmed).map(Value::Timestamp),
    }
}

pub(crate) fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc());
    }

    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S") {
        return Some(dt);
    }

    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt);
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }

    None
}
