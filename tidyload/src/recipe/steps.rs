//! Recipe steps
//!
//! Each step maps one tidy table to a new one.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::SchemaResult;
use crate::reshape::{exclude_contains, filter_contains, filter_equals, group_sum, melt_with, MeltSpec};
use crate::table::{TidyTable, Value};

/// All available recipe steps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Step {
    /// Keep only the listed columns, in that order
    Select { columns: Vec<String> },

    /// Rename columns (old name -> new name)
    Rename { mapping: HashMap<String, String> },

    /// Set a column to a constant on every row
    Constant {
        column: String,
        value: serde_json::Value,
    },

    /// Coerce a column to floats, non-numeric cells become null
    ToNumeric { column: String },

    /// Keep rows whose cell equals a value
    FilterEquals { column: String, value: String },

    /// Keep rows whose cell contains a literal substring
    FilterContains { column: String, substring: String },

    /// Drop rows whose cell contains a literal substring
    ExcludeContains { column: String, substring: String },

    /// Wide-to-long reshape
    Melt(MeltSpec),

    /// Sum a value column per group
    GroupSum { by: String, value: String },
}

impl Step {
    /// Apply this step to a table
    pub fn apply(&self, table: &TidyTable) -> SchemaResult<TidyTable> {
        match self {
            Step::Select { columns } => table.select(columns.as_slice()),
            Step::Rename { mapping } => table.rename(mapping),
            Step::Constant { column, value } => {
                Ok(table.with_constant(column, Value::from_json(value)))
            }
            Step::ToNumeric { column } => table.map_column(column, Value::to_numeric),
            Step::FilterEquals { column, value } => filter_equals(table, column, value),
            Step::FilterContains { column, substring } => filter_contains(table, column, substring),
            Step::ExcludeContains { column, substring } => exclude_contains(table, column, substring),
            Step::Melt(spec) => melt_with(table, spec),
            Step::GroupSum { by, value } => group_sum(table, by, value),
        }
    }

    /// Short name used in logs and errors
    pub fn name(&self) -> &'static str {
        match self {
            Step::Select { .. } => "select",
            Step::Rename { .. } => "rename",
            Step::Constant { .. } => "constant",
            Step::ToNumeric { .. } => "to_numeric",
            Step::FilterEquals { .. } => "filter_equals",
            Step::FilterContains { .. } => "filter_contains",
            Step::ExcludeContains { .. } => "exclude_contains",
            Step::Melt(_) => "melt",
            Step::GroupSum { .. } => "group_sum",
        }
    }
}

/// Human-readable list of steps (CLI `steps` command)
pub fn steps_description() -> String {
    r#"Available recipe steps:

SELECTION:
  - select: Keep only the listed columns, in that order
    { "type": "select", "columns": ["2016", "2017", "Type"] }
  - rename: Rename columns
    { "type": "rename", "mapping": { "YEAR": "Country Type" } }

VALUES:
  - constant: Set a column to a constant on every row
    { "type": "constant", "column": "Type", "value": "Import" }
  - to_numeric: Coerce a column to floats (non-numeric -> null)
    { "type": "to_numeric", "column": "2017" }

ROW SUBSETS (literal, case-sensitive):
  - filter_equals: { "type": "filter_equals", "column": "YEAR", "value": "World" }
  - filter_contains: { "type": "filter_contains", "column": "YEAR", "substring": "Developed economies:" }
  - exclude_contains: { "type": "exclude_contains", "column": "YEAR", "substring": "Asia and Oceania" }

RESHAPE:
  - melt: Wide-to-long, value columns default to every non-identifier column
    { "type": "melt", "id_columns": ["Type"], "axis_name": "Year", "value_name": "Volume" }
  - group_sum: Sum per group, missing/non-numeric cells count as 0
    { "type": "group_sum", "by": "Year", "value": "Volume" }

SOURCES:
  - tagged: { "type": "tagged", "pattern": "data/chinese-import-", "tag_start": 2 }
  - file:   { "type": "file", "path": "data/fdi-inward-flow.csv", "header_skip": 4 }
  - concat: Stack several series, each shaped by its own steps
    { "type": "concat", "parts": [{ "source": {...}, "steps": [...] }, ...] }
"#
    .to_string()
}
