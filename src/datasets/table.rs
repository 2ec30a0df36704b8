use chrono::NaiveDateTime;
use serde::Serialize;

/// Declared type of a column. Identifier-like columns stay `Text` even when
/// every value happens to look numeric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Text,
    Number,
    Timestamp,
}

impl ColumnKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Timestamp => "timestamp",
        }
    }
}

/// A single non-missing cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Number(f64),
    Timestamp(NaiveDateTime),
}

impl Value {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        match self {
            Self::Timestamp(value) => Some(*value),
            _ => None,
        }
    }

    /// Stored representation used for equality filters and group keys.
    pub fn render(&self) -> String {
        match self {
            Self::Text(value) => value.clone(),
            Self::Number(value) => {
                if value.fract() == 0.0 && value.is_finite() {
                    format!("{}", *value as i64)
                } else {
                    format!("{value}")
                }
            }
            Self::Timestamp(value) => value.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

/// Named, typed, ordered cells. Missing values are `None`.
#[derive(Debug, Clone)]
pub struct Column {
    name: String,
    kind: ColumnKind,
    cells: Vec<Option<Value>>,
}

impl Column {
    pub fn new(name: impl Into<String>, kind: ColumnKind, cells: Vec<Option<Value>>) -> Self {
        Self {
            name: name.into(),
            kind,
            cells,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ColumnKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[Option<Value>] {
        &self.cells
    }

    pub fn cell(&self, row: usize) -> Option<&Value> {
        self.cells.get(row).and_then(|cell| cell.as_ref())
    }
}

/// Immutable ordered collection of same-length columns. Filters produce new
/// derived tables; the source table is never touched.
#[derive(Debug, Clone, Default)]
pub struct Table {
    columns: Vec<Column>,
    rows: usize,
}

impl Table {
    pub fn new(columns: Vec<Column>) -> Self {
        let rows = columns.first().map(Column::len).unwrap_or(0);
        debug_assert!(columns.iter().all(|column| column.len() == rows));
        Self { columns, rows }
    }

    pub fn len(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name() == name)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }

    /// New table keeping only the rows at `indices`, in the given order.
    pub fn select_rows(&self, indices: &[usize]) -> Table {
        let columns = self
            .columns
            .iter()
            .map(|column| {
                let cells = indices
                    .iter()
                    .map(|&row| column.cells().get(row).cloned().flatten())
                    .collect();
                Column::new(column.name(), column.kind(), cells)
            })
            .collect();
        Table {
            columns,
            rows: indices.len(),
        }
    }

    /// First `n` rows, for preview widgets.
    pub fn head(&self, n: usize) -> Table {
        let take = n.min(self.rows);
        let indices: Vec<usize> = (0..take).collect();
        self.select_rows(&indices)
    }

    /// Rendered cells of one row, column order preserved.
    pub fn row_display(&self, row: usize) -> Vec<Option<String>> {
        self.columns
            .iter()
            .map(|column| column.cell(row).map(Value::render))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_table() -> Table {
        Table::new(vec![
            Column::new(
                "city",
                ColumnKind::Text,
                vec![
                    Some(Value::Text("Delhi".to_string())),
                    None,
                    Some(Value::Text("Goa".to_string())),
                ],
            ),
            Column::new(
                "amount",
                ColumnKind::Number,
                vec![
                    Some(Value::Number(100.0)),
                    Some(Value::Number(250.5)),
                    None,
                ],
            ),
        ])
    }

    #[test]
    fn select_rows_produces_independent_table() {
        let table = sample_table();
        let derived = table.select_rows(&[2, 0]);

        assert_eq!(derived.len(), 2);
        assert_eq!(
            derived.column("city").expect("city present").cell(0),
            Some(&Value::Text("Goa".to_string()))
        );
        // source unchanged
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn head_clamps_to_row_count() {
        let table = sample_table();
        assert_eq!(table.head(10).len(), 3);
        assert_eq!(table.head(1).len(), 1);
    }

    #[test]
    fn render_keeps_identifier_like_numbers_integral() {
        assert_eq!(Value::Number(1024.0).render(), "1024");
        assert_eq!(Value::Number(12.5).render(), "12.5");
        let ts = NaiveDate::from_ymd_opt(2024, 7, 1)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        assert_eq!(Value::Timestamp(ts).render(), "2024-07-01 09:30:00");
    }

    #[test]
    fn row_display_marks_missing_cells() {
        let table = sample_table();
        let row = table.row_display(1);
        assert_eq!(row, vec![None, Some("250.5".to_string())]);
    }
}
