//! Tabular market data and its normalization into JSON records.
//!
//! Two table shapes come back from the provider:
//!
//! - [`TimeSeriesTable`]: metrics as rows, reporting dates as columns
//!   (financial statements). Normalized column-major: one record per column.
//! - [`RowTable`]: one observation per row (prices, corporate actions,
//!   holders, analyst grades). Normalized row-major: one record per row.
//!
//! Missing and not-a-number cells always become an explicit JSON `null`.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde_json::{Map, Number, Value};
use std::fmt;

/// A single JSON-ready record. Insertion order is preserved.
pub type Record = Map<String, Value>;

/// A scalar table cell as delivered by the provider.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Float(f64),
    Int(i64),
    Text(String),
    Time(DateTime<Utc>),
    Missing,
}

impl Cell {
    /// Convert the cell to JSON. NaN, infinities and missing cells become `null`;
    /// timestamps become ISO-8601 strings in UTC with millisecond precision.
    pub fn to_json(&self) -> Value {
        match self {
            Cell::Float(v) => Number::from_f64(*v).map(Value::Number).unwrap_or(Value::Null),
            Cell::Int(v) => Value::from(*v),
            Cell::Text(s) => Value::String(s.clone()),
            Cell::Time(t) => Value::String(t.to_rfc3339_opts(SecondsFormat::Millis, true)),
            Cell::Missing => Value::Null,
        }
    }

    /// Whether the cell carries no usable value.
    pub fn is_missing(&self) -> bool {
        match self {
            Cell::Missing => true,
            Cell::Float(v) => v.is_nan(),
            _ => false,
        }
    }

    /// The timestamp held by this cell, if any.
    pub fn as_time(&self) -> Option<DateTime<Utc>> {
        match self {
            Cell::Time(t) => Some(*t),
            _ => None,
        }
    }

    /// The text held by this cell, if any.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<f64> for Cell {
    fn from(v: f64) -> Self {
        Cell::Float(v)
    }
}

impl From<Option<f64>> for Cell {
    fn from(v: Option<f64>) -> Self {
        v.map(Cell::Float).unwrap_or(Cell::Missing)
    }
}

impl From<i64> for Cell {
    fn from(v: i64) -> Self {
        Cell::Int(v)
    }
}

impl From<Option<i64>> for Cell {
    fn from(v: Option<i64>) -> Self {
        v.map(Cell::Int).unwrap_or(Cell::Missing)
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<Option<String>> for Cell {
    fn from(v: Option<String>) -> Self {
        v.map(Cell::Text).unwrap_or(Cell::Missing)
    }
}

impl From<DateTime<Utc>> for Cell {
    fn from(t: DateTime<Utc>) -> Self {
        Cell::Time(t)
    }
}

impl From<Option<DateTime<Utc>>> for Cell {
    fn from(v: Option<DateTime<Utc>>) -> Self {
        v.map(Cell::Time).unwrap_or(Cell::Missing)
    }
}

// ============================================================================
// Column-major: financial statements
// ============================================================================

/// A column header of a [`TimeSeriesTable`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum ColumnKey {
    Date(NaiveDate),
    Label(String),
}

impl fmt::Display for ColumnKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnKey::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            ColumnKey::Label(s) => f.write_str(s),
        }
    }
}

/// Table keyed by (metric, column) where columns are usually reporting dates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeSeriesTable {
    columns: Vec<ColumnKey>,
    metrics: Vec<String>,
    /// `values[metric][column]`
    values: Vec<Vec<Cell>>,
}

impl TimeSeriesTable {
    pub fn new(columns: Vec<ColumnKey>) -> Self {
        Self {
            columns,
            metrics: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Append a metric row. Short rows are padded with missing cells, long rows truncated.
    pub fn push_metric(&mut self, name: impl Into<String>, mut cells: Vec<Cell>) {
        cells.resize(self.columns.len(), Cell::Missing);
        self.metrics.push(name.into());
        self.values.push(cells);
    }

    pub fn columns(&self) -> &[ColumnKey] {
        &self.columns
    }

    pub fn metrics(&self) -> &[String] {
        &self.metrics
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() || self.metrics.is_empty()
    }

    /// One record per column, in native column order: `date` first, then every
    /// metric in native row order.
    pub fn to_records(&self) -> Vec<Record> {
        if self.metrics.is_empty() {
            return Vec::new();
        }

        self.columns
            .iter()
            .enumerate()
            .map(|(col, key)| {
                let mut record = Record::new();
                record.insert("date".to_string(), Value::String(key.to_string()));
                for (metric, row) in self.metrics.iter().zip(&self.values) {
                    record.insert(metric.clone(), row[col].to_json());
                }
                record
            })
            .collect()
    }
}

// ============================================================================
// Row-major: prices, actions, holders, grades
// ============================================================================

/// One observation of a [`RowTable`].
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    /// Index value; ignored when the table has no index.
    pub index: Cell,
    pub cells: Vec<Cell>,
}

/// Table where every row becomes one output record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowTable {
    index_name: Option<String>,
    columns: Vec<String>,
    rows: Vec<TableRow>,
}

impl RowTable {
    /// Create a table without an index; records hold the columns only.
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            index_name: None,
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Create a table whose index is emitted under `index_name` as the first key.
    pub fn with_index<I, S>(index_name: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            index_name: Some(index_name.into()),
            ..Self::new(columns)
        }
    }

    /// Append a row. Short rows are padded with missing cells, long rows truncated.
    pub fn push_row(&mut self, index: impl Into<Cell>, mut cells: Vec<Cell>) {
        cells.resize(self.columns.len(), Cell::Missing);
        self.rows.push(TableRow {
            index: index.into(),
            cells,
        });
    }

    pub fn index_name(&self) -> Option<&str> {
        self.index_name.as_deref()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by name.
    pub fn column_position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Keep only rows matching the predicate.
    pub fn retain<F>(&mut self, f: F)
    where
        F: FnMut(&TableRow) -> bool,
    {
        self.rows.retain(f);
    }

    /// Sort rows with a comparator (stable).
    pub fn sort_by<F>(&mut self, compare: F)
    where
        F: FnMut(&TableRow, &TableRow) -> std::cmp::Ordering,
    {
        self.rows.sort_by(compare);
    }

    /// One record per row: the index (if any) first, then every column in order.
    pub fn to_records(&self) -> Vec<Record> {
        self.rows
            .iter()
            .map(|row| {
                let mut record = Record::new();
                if let Some(name) = &self.index_name {
                    record.insert(name.clone(), row.index.to_json());
                }
                for (column, cell) in self.columns.iter().zip(&row.cells) {
                    record.insert(column.clone(), cell.to_json());
                }
                record
            })
            .collect()
    }
}
