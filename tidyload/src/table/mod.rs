//! Tidy table: ordered rows over a fixed, uniquely-named column set.
//!
//! Every derivation (`select`, `rename`, `with_constant`, `filter_rows`,
//! `concat`) returns a new table; a built table is never mutated by the
//! operations in this crate.

pub mod value;

pub use value::{infer_column, Value};

use serde_json::{Map, Value as JsonValue};
use std::collections::{HashMap, HashSet};
use std::io::Write;

use crate::error::{SchemaError, SchemaResult};

/// A table of rows sharing one column set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TidyTable {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl TidyTable {
    /// Create an empty table with the given columns.
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> SchemaResult<Self> {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.as_str()) {
                return Err(SchemaError::DuplicateColumn(column.clone()));
            }
        }
        Ok(Self {
            columns,
            rows: Vec::new(),
        })
    }

    /// Create a table from columns and rows, checking every row's arity.
    pub fn from_rows<S: Into<String>>(
        columns: impl IntoIterator<Item = S>,
        rows: Vec<Vec<Value>>,
    ) -> SchemaResult<Self> {
        let mut table = Self::new(columns)?;
        for row in rows {
            table.push_row(row)?;
        }
        Ok(table)
    }

    /// Append a row. Only used while a table is being built.
    pub fn push_row(&mut self, row: Vec<Value>) -> SchemaResult<()> {
        if row.len() != self.columns.len() {
            return Err(SchemaError::ArityMismatch {
                expected: self.columns.len(),
                found: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Index of `name`, or `SchemaError::UnknownColumn`.
    pub fn require_column(&self, name: &str) -> SchemaResult<usize> {
        self.column_index(name)
            .ok_or_else(|| SchemaError::UnknownColumn(name.to_string()))
    }

    /// All cells of one column, in row order.
    pub fn column_values(&self, name: &str) -> SchemaResult<Vec<&Value>> {
        let idx = self.require_column(name)?;
        Ok(self.rows.iter().map(|row| &row[idx]).collect())
    }

    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row).map(|r| &r[idx])
    }

    // -------------------------------------------------------------------------
    // Derivations
    // -------------------------------------------------------------------------

    /// Keep only `columns`, in the order given.
    pub fn select<S: AsRef<str>>(&self, columns: &[S]) -> SchemaResult<TidyTable> {
        let indices = columns
            .iter()
            .map(|c| self.require_column(c.as_ref()))
            .collect::<SchemaResult<Vec<_>>>()?;

        let mut out = TidyTable::new(columns.iter().map(|c| c.as_ref().to_string()))?;
        out.rows = self
            .rows
            .iter()
            .map(|row| indices.iter().map(|&i| row[i].clone()).collect())
            .collect();
        Ok(out)
    }

    /// Rename columns. Every key must exist; the result must stay unique.
    pub fn rename(&self, mapping: &HashMap<String, String>) -> SchemaResult<TidyTable> {
        for from in mapping.keys() {
            self.require_column(from)?;
        }
        let columns = self
            .columns
            .iter()
            .map(|c| mapping.get(c).cloned().unwrap_or_else(|| c.clone()));

        let mut out = TidyTable::new(columns)?;
        out.rows = self.rows.clone();
        Ok(out)
    }

    /// Set `column` to `value` on every row, appending the column if absent.
    pub fn with_constant(&self, column: &str, value: Value) -> TidyTable {
        let mut out = self.clone();
        match out.column_index(column) {
            Some(idx) => {
                for row in &mut out.rows {
                    row[idx] = value.clone();
                }
            }
            None => {
                out.columns.push(column.to_string());
                for row in &mut out.rows {
                    row.push(value.clone());
                }
            }
        }
        out
    }

    /// Replace every cell of `column` with `f(cell)`.
    pub fn map_column(&self, column: &str, f: impl Fn(&Value) -> Value) -> SchemaResult<TidyTable> {
        let idx = self.require_column(column)?;
        let mut out = self.clone();
        for row in &mut out.rows {
            row[idx] = f(&row[idx]);
        }
        Ok(out)
    }

    /// Keep rows for which `keep` returns true.
    pub fn filter_rows(&self, mut keep: impl FnMut(&[Value]) -> bool) -> TidyTable {
        TidyTable {
            columns: self.columns.clone(),
            rows: self.rows.iter().filter(|row| keep(row)).cloned().collect(),
        }
    }

    /// Concatenate tables vertically.
    ///
    /// The column set is the union of all columns in first-seen order; cells
    /// a table does not have are `Null`.
    pub fn concat<'a>(tables: impl IntoIterator<Item = &'a TidyTable>) -> TidyTable {
        let tables: Vec<&TidyTable> = tables.into_iter().collect();

        let mut columns: Vec<String> = Vec::new();
        for table in &tables {
            for column in &table.columns {
                if !columns.contains(column) {
                    columns.push(column.clone());
                }
            }
        }

        let mut rows = Vec::with_capacity(tables.iter().map(|t| t.len()).sum());
        for table in &tables {
            let mapping: Vec<Option<usize>> =
                columns.iter().map(|c| table.column_index(c)).collect();
            for row in &table.rows {
                rows.push(
                    mapping
                        .iter()
                        .map(|idx| idx.map(|i| row[i].clone()).unwrap_or(Value::Null))
                        .collect(),
                );
            }
        }

        TidyTable { columns, rows }
    }

    // -------------------------------------------------------------------------
    // Export
    // -------------------------------------------------------------------------

    /// Rows as JSON objects, keys in column order.
    pub fn to_records(&self) -> Vec<JsonValue> {
        self.rows
            .iter()
            .map(|row| {
                let obj: Map<String, JsonValue> = self
                    .columns
                    .iter()
                    .zip(row)
                    .map(|(c, v)| (c.clone(), v.to_json()))
                    .collect();
                JsonValue::Object(obj)
            })
            .collect()
    }

    /// Write the table as CSV with a header row. Nulls are empty fields.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(&self.columns)?;
        for row in &self.rows {
            wtr.write_record(row.iter().map(|v| v.to_string()))?;
        }
        wtr.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TidyTable {
        TidyTable::from_rows(
            ["Country", "2016", "2017"],
            vec![
                vec!["A".into(), Value::Int(1), Value::Int(3)],
                vec!["B".into(), Value::Int(2), Value::Int(4)],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_duplicate_columns_rejected() {
        let err = TidyTable::new(["a", "b", "a"]).unwrap_err();
        assert_eq!(err, SchemaError::DuplicateColumn("a".into()));
    }

    #[test]
    fn test_push_row_checks_arity() {
        let mut table = TidyTable::new(["a", "b"]).unwrap();
        let err = table.push_row(vec![Value::Int(1)]).unwrap_err();
        assert_eq!(err, SchemaError::ArityMismatch { expected: 2, found: 1 });
    }

    #[test]
    fn test_select_reorders() {
        let table = sample().select(&["2017", "Country"]).unwrap();
        assert_eq!(table.columns(), &["2017", "Country"]);
        assert_eq!(table.rows()[1], vec![Value::Int(4), Value::text("B")]);
    }

    #[test]
    fn test_select_unknown_column() {
        let err = sample().select(&["2018"]).unwrap_err();
        assert_eq!(err, SchemaError::UnknownColumn("2018".into()));
    }

    #[test]
    fn test_rename() {
        let mut mapping = HashMap::new();
        mapping.insert("Country".to_string(), "Country Type".to_string());
        let table = sample().rename(&mapping).unwrap();
        assert_eq!(table.columns(), &["Country Type", "2016", "2017"]);

        mapping.insert("2016".to_string(), "2017".to_string());
        assert!(matches!(sample().rename(&mapping), Err(SchemaError::DuplicateColumn(_))));
    }

    #[test]
    fn test_with_constant_leaves_source_untouched() {
        let source = sample();
        let tagged = source.with_constant("Type", "Inward".into());
        assert_eq!(source.columns().len(), 3);
        assert_eq!(tagged.get(0, "Type"), Some(&Value::text("Inward")));

        let overwritten = tagged.with_constant("Type", "Outward".into());
        assert_eq!(overwritten.columns().len(), 4);
        assert_eq!(overwritten.get(1, "Type"), Some(&Value::text("Outward")));
    }

    #[test]
    fn test_map_column() {
        let table = sample().map_column("2016", Value::to_numeric).unwrap();
        assert_eq!(table.get(0, "2016"), Some(&Value::Float(1.0)));
        assert_eq!(table.get(0, "2017"), Some(&Value::Int(3)));
        assert!(sample().map_column("2018", Value::to_numeric).is_err());
    }

    #[test]
    fn test_concat_unions_columns() {
        let a = TidyTable::from_rows(["x", "y"], vec![vec![Value::Int(1), Value::Int(2)]]).unwrap();
        let b = TidyTable::from_rows(["y", "z"], vec![vec![Value::Int(3), Value::Int(4)]]).unwrap();
        let all = TidyTable::concat([&a, &b]);

        assert_eq!(all.columns(), &["x", "y", "z"]);
        assert_eq!(all.rows()[0], vec![Value::Int(1), Value::Int(2), Value::Null]);
        assert_eq!(all.rows()[1], vec![Value::Null, Value::Int(3), Value::Int(4)]);
    }

    #[test]
    fn test_to_records_keeps_column_order() {
        let records = sample().to_records();
        let keys: Vec<&String> = records[0].as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["Country", "2016", "2017"]);
        assert_eq!(records[1]["2017"], 4);
    }

    #[test]
    fn test_write_csv() {
        let mut out = Vec::new();
        sample().write_csv(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "Country,2016,2017\nA,1,3\nB,2,4\n");
    }
}
