//! Pure filter and aggregation functions over [`Table`] values.
//!
//! Every dashboard widget is backed by one of these calls. None of them
//! mutate their input; filters return derived tables and aggregates return
//! scalars or ordered count sequences.

use crate::datasets::table::{Table, Value};
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};
use tracing::debug;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("column '{column}' is not present in the table")]
    ColumnNotFound { column: String },
    #[error("no qualifying rows to aggregate")]
    EmptyInput,
}

/// A value together with how many rows carry it.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ValueCount {
    pub value: String,
    pub count: usize,
}

/// Row count for one calendar date.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct DateCount {
    pub date: NaiveDate,
    pub count: usize,
}

fn column<'a>(table: &'a Table, name: &str) -> Result<&'a crate::datasets::table::Column, QueryError> {
    table.column(name).ok_or_else(|| QueryError::ColumnNotFound {
        column: name.to_string(),
    })
}

/// Keep rows whose column value is one of `allowed`.
///
/// An empty `allowed` set is the identity filter: the table comes back
/// unchanged. Every optional multi-select in the dashboard depends on that.
pub fn filter_by_values(
    table: &Table,
    column_name: &str,
    allowed: &[String],
) -> Result<Table, QueryError> {
    let target = column(table, column_name)?;
    if allowed.is_empty() {
        return Ok(table.clone());
    }

    let allowed: HashSet<&str> = allowed.iter().map(String::as_str).collect();
    let indices: Vec<usize> = target
        .cells()
        .iter()
        .enumerate()
        .filter_map(|(row, cell)| {
            cell.as_ref()
                .filter(|value| allowed.contains(value.render().as_str()))
                .map(|_| row)
        })
        .collect();
    Ok(table.select_rows(&indices))
}

/// Keep rows whose column value equals `value` exactly.
///
/// Comparison is on the stored representation, so identifier lookups are
/// string-equality even when the data looks numeric.
pub fn filter_by_equality(
    table: &Table,
    column_name: &str,
    value: &str,
) -> Result<Table, QueryError> {
    let target = column(table, column_name)?;
    let indices: Vec<usize> = target
        .cells()
        .iter()
        .enumerate()
        .filter_map(|(row, cell)| {
            cell.as_ref()
                .filter(|stored| stored.render() == value)
                .map(|_| row)
        })
        .collect();
    Ok(table.select_rows(&indices))
}

/// Number of unique non-null values in the column.
pub fn distinct_count(table: &Table, column_name: &str) -> Result<usize, QueryError> {
    let target = column(table, column_name)?;
    let mut seen = HashSet::new();
    for cell in target.cells().iter().flatten() {
        seen.insert(cell.render());
    }
    Ok(seen.len())
}

/// Sorted unique non-null values, for multi-select option lists.
pub fn distinct_values(table: &Table, column_name: &str) -> Result<Vec<String>, QueryError> {
    let target = column(table, column_name)?;
    let mut values: Vec<String> = target
        .cells()
        .iter()
        .flatten()
        .map(Value::render)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    values.sort();
    Ok(values)
}

/// Value counts sorted descending, ties broken by first-encountered row
/// order in the source table.
pub fn value_counts(table: &Table, column_name: &str) -> Result<Vec<ValueCount>, QueryError> {
    let target = column(table, column_name)?;
    let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
    for (row, cell) in target.cells().iter().enumerate() {
        if let Some(value) = cell {
            let entry = counts.entry(value.render()).or_insert((row, 0));
            entry.1 += 1;
        }
    }

    let mut ordered: Vec<(String, usize, usize)> = counts
        .into_iter()
        .map(|(value, (first_row, count))| (value, first_row, count))
        .collect();
    ordered.sort_by(|a, b| b.2.cmp(&a.2).then(a.1.cmp(&b.1)));
    Ok(ordered
        .into_iter()
        .map(|(value, _, count)| ValueCount { value, count })
        .collect())
}

/// The `n` most frequent values of the column.
pub fn top_n(table: &Table, column_name: &str, n: usize) -> Result<Vec<ValueCount>, QueryError> {
    let mut counts = value_counts(table, column_name)?;
    counts.truncate(n);
    Ok(counts)
}

/// Sum of `value_column` per distinct `group_column` value. Rows with a
/// missing group are skipped; missing values contribute nothing but still
/// register their group.
pub fn group_sum(
    table: &Table,
    group_column: &str,
    value_column: &str,
) -> Result<HashMap<String, f64>, QueryError> {
    let groups = column(table, group_column)?;
    let values = column(table, value_column)?;

    let mut sums: HashMap<String, f64> = HashMap::new();
    for (group, value) in groups.cells().iter().zip(values.cells()) {
        let Some(group) = group else { continue };
        let entry = sums.entry(group.render()).or_insert(0.0);
        if let Some(amount) = value.as_ref().and_then(Value::as_number) {
            *entry += amount;
        }
    }
    Ok(sums)
}

/// Key with the maximum value. Ties resolve toward the lexically larger key
/// so the result is deterministic.
pub fn argmax_group(groups: &HashMap<String, f64>) -> Result<String, QueryError> {
    groups
        .iter()
        .max_by(|a, b| a.1.total_cmp(b.1).then_with(|| a.0.cmp(b.0)))
        .map(|(key, _)| key.clone())
        .ok_or(QueryError::EmptyInput)
}

/// Sum of the column's non-null numeric values.
pub fn sum(table: &Table, column_name: &str) -> Result<f64, QueryError> {
    let target = column(table, column_name)?;
    Ok(target
        .cells()
        .iter()
        .flatten()
        .filter_map(Value::as_number)
        .sum())
}

/// Arithmetic mean of the column's non-null numeric values.
pub fn mean(table: &Table, column_name: &str) -> Result<f64, QueryError> {
    let target = column(table, column_name)?;
    let mut total = 0.0;
    let mut count = 0usize;
    for value in target.cells().iter().flatten().filter_map(Value::as_number) {
        total += value;
        count += 1;
    }

    if count == 0 {
        return Err(QueryError::EmptyInput);
    }
    Ok(total / count as f64)
}

/// Paired numeric values at matching row indices; rows missing either side
/// are dropped.
pub fn scatter_pairs(
    table: &Table,
    x_column: &str,
    y_column: &str,
) -> Result<Vec<(f64, f64)>, QueryError> {
    let xs = column(table, x_column)?;
    let ys = column(table, y_column)?;

    Ok(xs
        .cells()
        .iter()
        .zip(ys.cells())
        .filter_map(|(x, y)| {
            let x = x.as_ref().and_then(Value::as_number)?;
            let y = y.as_ref().and_then(Value::as_number)?;
            Some((x, y))
        })
        .collect())
}

/// Rows per calendar date, chronologically ordered. Cells that are not
/// timestamps are dropped; the drop count is logged rather than failing the
/// whole call.
pub fn time_series_counts(
    table: &Table,
    timestamp_column: &str,
) -> Result<Vec<DateCount>, QueryError> {
    let target = column(table, timestamp_column)?;

    let mut counts: HashMap<NaiveDate, usize> = HashMap::new();
    let mut dropped = 0usize;
    for cell in target.cells() {
        match cell.as_ref().and_then(Value::as_timestamp) {
            Some(timestamp) => *counts.entry(timestamp.date()).or_insert(0) += 1,
            None => dropped += 1,
        }
    }

    if dropped > 0 {
        debug!(
            column = timestamp_column,
            dropped, "rows without a usable timestamp excluded from time series"
        );
    }

    let mut ordered: Vec<DateCount> = counts
        .into_iter()
        .map(|(date, count)| DateCount { date, count })
        .collect();
    ordered.sort_by_key(|entry| entry.date);
    Ok(ordered)
}
