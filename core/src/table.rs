//! The raw-sample table handed over by the file parsers.
//!
//! Columns are whatever the parser produced; nothing here assumes a schema.
//! The normalizer introspects the table and resolves the column aliases.

use std::collections::HashMap;
use std::io::Read;

use serde_json::{Map as JsonMap, Value};

use crate::error::AnalysisError;

/// A single table cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Number(f64),
    Text(String),
}

impl Cell {
    /// Numeric view of the cell; text is parsed, non-finite values are gaps.
    pub fn as_f64(&self) -> Option<f64> {
        let v = match self {
            Cell::Null => return None,
            Cell::Number(v) => *v,
            Cell::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        v.is_finite().then_some(v)
    }

    pub fn is_null(&self) -> bool {
        match self {
            Cell::Null => true,
            Cell::Text(s) => s.trim().is_empty(),
            Cell::Number(_) => false,
        }
    }

    fn from_json(v: &Value) -> Cell {
        match v {
            Value::Null => Cell::Null,
            Value::Number(n) => n.as_f64().map(Cell::Number).unwrap_or(Cell::Null),
            Value::String(s) => Cell::Text(s.clone()),
            Value::Bool(b) => Cell::Number(if *b { 1.0 } else { 0.0 }),
            other => Cell::Text(other.to_string()),
        }
    }

    fn from_csv(field: &str) -> Cell {
        let trimmed = field.trim();
        if trimmed.is_empty() {
            return Cell::Null;
        }
        match trimmed.parse::<f64>() {
            Ok(v) => Cell::Number(v),
            Err(_) => Cell::Text(trimmed.to_string()),
        }
    }

    /// Display form, used in error messages.
    pub fn render(&self) -> String {
        match self {
            Cell::Null => "null".to_string(),
            Cell::Number(v) => v.to_string(),
            Cell::Text(s) => s.clone(),
        }
    }
}

/// Column-named rows, in input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    columns: Vec<String>,
    index: HashMap<String, usize>,
    rows: Vec<Vec<Cell>>,
}

impl RawTable {
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        let mut table = RawTable::default();
        for c in columns {
            table.add_column(c.into());
        }
        table
    }

    fn add_column(&mut self, name: String) -> usize {
        if let Some(&i) = self.index.get(&name) {
            return i;
        }
        let i = self.columns.len();
        self.index.insert(name.clone(), i);
        self.columns.push(name);
        for row in &mut self.rows {
            row.push(Cell::Null);
        }
        i
    }

    /// Appends a row; short rows are padded with nulls, extra cells dropped.
    pub fn push_row(&mut self, mut cells: Vec<Cell>) {
        cells.resize(self.columns.len(), Cell::Null);
        self.rows.push(cells);
    }

    /// Array of record objects (`[{"time": ..., "heart_rate": ...}, ...]`).
    /// Column order follows first appearance.
    pub fn from_json_records(json: &str) -> Result<Self, AnalysisError> {
        let de = &mut serde_json::Deserializer::from_str(json);
        let records: Vec<JsonMap<String, Value>> = serde_path_to_error::deserialize(de)?;
        Ok(Self::from_records(&records))
    }

    pub fn from_json_value(value: &Value) -> Result<Self, AnalysisError> {
        let records: Vec<JsonMap<String, Value>> = serde_path_to_error::deserialize(value.clone())?;
        Ok(Self::from_records(&records))
    }

    pub fn from_records(records: &[JsonMap<String, Value>]) -> Self {
        let mut table = RawTable::default();
        for record in records {
            let mut row = vec![Cell::Null; table.columns.len()];
            for (key, value) in record {
                let i = table.add_column(key.clone());
                if i >= row.len() {
                    row.resize(i + 1, Cell::Null);
                }
                row[i] = Cell::from_json(value);
            }
            table.push_row(row);
        }
        table
    }

    /// CSV with a header row.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, AnalysisError> {
        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);
        let headers = rdr.headers()?.clone();
        let mut table = RawTable::new(headers.iter());
        for record in rdr.records() {
            let record = record?;
            table.push_row(record.iter().map(Cell::from_csv).collect());
        }
        Ok(table)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Index of the first alias that exists as a column.
    pub fn resolve(&self, aliases: &[&str]) -> Option<usize> {
        aliases.iter().find_map(|a| self.index.get(*a).copied())
    }

    /// Indices of every alias that exists, in alias priority order.
    pub fn resolve_all(&self, aliases: &[&str]) -> Vec<usize> {
        aliases.iter().filter_map(|a| self.index.get(*a).copied()).collect()
    }

    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&Cell::Null)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> + '_ {
        self.rows.iter().map(|r| r.as_slice())
    }
}
