//! Wide-to-long reshaping.
//!
//! ```text
//! Country 2016 2017          Country Year Value
//! A       1    3        →    A       2016 1
//! B       2    4             A       2017 3
//!                            B       2016 2
//!                            B       2017 4
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{SchemaError, SchemaResult};
use crate::table::{TidyTable, Value};

/// Default name of the column holding former column names.
pub const DEFAULT_AXIS_NAME: &str = "Year";

/// Default name of the column holding the melted values.
pub const DEFAULT_VALUE_NAME: &str = "Value";

/// Full description of a melt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeltSpec {
    /// Columns copied verbatim onto every output row.
    pub id_columns: Vec<String>,

    /// Columns to melt, in output order. All non-identifier columns if unset.
    #[serde(default)]
    pub value_columns: Option<Vec<String>>,

    #[serde(default = "default_axis_name")]
    pub axis_name: String,

    #[serde(default = "default_value_name")]
    pub value_name: String,
}

fn default_axis_name() -> String {
    DEFAULT_AXIS_NAME.to_string()
}

fn default_value_name() -> String {
    DEFAULT_VALUE_NAME.to_string()
}

impl MeltSpec {
    pub fn new<S: Into<String>>(id_columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            id_columns: id_columns.into_iter().map(Into::into).collect(),
            value_columns: None,
            axis_name: default_axis_name(),
            value_name: default_value_name(),
        }
    }

    pub fn with_value_columns<S: Into<String>>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
        self.value_columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_axis_name(mut self, name: impl Into<String>) -> Self {
        self.axis_name = name.into();
        self
    }

    pub fn with_value_name(mut self, name: impl Into<String>) -> Self {
        self.value_name = name.into();
        self
    }
}

/// Melt every non-identifier column of `table`.
///
/// Each source row yields one output row per value column: the identifier
/// cells, then `axis_name` holding the value column's name and `value_name`
/// holding the cell coerced to a float (`Null` when not numeric).
pub fn melt<S: AsRef<str>>(
    table: &TidyTable,
    id_columns: &[S],
    axis_name: &str,
    value_name: &str,
) -> SchemaResult<TidyTable> {
    let spec = MeltSpec::new(id_columns.iter().map(|c| c.as_ref().to_string()))
        .with_axis_name(axis_name)
        .with_value_name(value_name);
    melt_with(table, &spec)
}

/// Melt according to a [`MeltSpec`].
pub fn melt_with(table: &TidyTable, spec: &MeltSpec) -> SchemaResult<TidyTable> {
    let id_indices = spec
        .id_columns
        .iter()
        .map(|c| table.require_column(c))
        .collect::<SchemaResult<Vec<usize>>>()?;

    // Value columns keep table order unless listed explicitly
    let value_columns: Vec<(usize, &str)> = match &spec.value_columns {
        Some(columns) => {
            let mut listed: Vec<(usize, &str)> = Vec::with_capacity(columns.len());
            for c in columns {
                let idx = table.require_column(c)?;
                // Repeats or identifier columns would duplicate (id, axis) pairs
                if id_indices.contains(&idx) || listed.iter().any(|&(i, _)| i == idx) {
                    return Err(SchemaError::DuplicateColumn(c.clone()));
                }
                listed.push((idx, c.as_str()));
            }
            listed
        }
        None => table
            .columns()
            .iter()
            .enumerate()
            .filter(|(i, _)| !id_indices.contains(i))
            .map(|(i, c)| (i, c.as_str()))
            .collect(),
    };

    let mut out_columns: Vec<String> = spec.id_columns.clone();
    out_columns.push(spec.axis_name.clone());
    out_columns.push(spec.value_name.clone());
    let mut out = TidyTable::new(out_columns)?;

    for row in table.rows() {
        for &(idx, name) in &value_columns {
            let mut long_row: Vec<Value> = id_indices.iter().map(|&i| row[i].clone()).collect();
            long_row.push(Value::text(name));
            long_row.push(row[idx].to_numeric());
            out.push_row(long_row)?;
        }
    }

    Ok(out)
}
