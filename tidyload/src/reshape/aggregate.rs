//! Aggregation and row-subset helpers.

use std::collections::BTreeMap;

use crate::error::SchemaResult;
use crate::table::{TidyTable, Value};

/// Sum `value_column` per distinct value of `group_column`.
///
/// Missing or non-numeric cells count as 0. Rows with a null group key are
/// dropped. Output has the columns `(group_column, value_column)`, one row per
/// group in ascending key order, sums as floats.
pub fn group_sum(table: &TidyTable, group_column: &str, value_column: &str) -> SchemaResult<TidyTable> {
    let group_idx = table.require_column(group_column)?;
    let value_idx = table.require_column(value_column)?;

    let mut sums: BTreeMap<&Value, f64> = BTreeMap::new();
    for row in table.rows() {
        let key = &row[group_idx];
        if key.is_null() {
            continue;
        }
        let value = row[value_idx].as_f64().unwrap_or(0.0);
        *sums.entry(key).or_insert(0.0) += value;
    }

    let rows = sums
        .into_iter()
        .map(|(key, sum)| vec![key.clone(), Value::Float(sum)])
        .collect();

    // group_column == value_column is rejected here as a duplicate
    TidyTable::from_rows([group_column, value_column], rows)
}

/// Rows whose `column` cell contains `needle` (literal, case-sensitive).
///
/// Null cells never match.
pub fn filter_contains(table: &TidyTable, column: &str, needle: &str) -> SchemaResult<TidyTable> {
    let idx = table.require_column(column)?;
    Ok(table.filter_rows(|row| cell_contains(&row[idx], needle)))
}

/// Rows whose `column` cell does not contain `needle`.
///
/// Complement of [`filter_contains`]: null cells are kept.
pub fn exclude_contains(table: &TidyTable, column: &str, needle: &str) -> SchemaResult<TidyTable> {
    let idx = table.require_column(column)?;
    Ok(table.filter_rows(|row| !cell_contains(&row[idx], needle)))
}

/// Rows whose `column` cell, rendered as text, equals `expected`.
pub fn filter_equals(table: &TidyTable, column: &str, expected: &str) -> SchemaResult<TidyTable> {
    let idx = table.require_column(column)?;
    Ok(table.filter_rows(|row| !row[idx].is_null() && row[idx].to_string() == expected))
}

fn cell_contains(cell: &Value, needle: &str) -> bool {
    match cell {
        Value::Null => false,
        Value::Text(s) => s.contains(needle),
        other => other.to_string().contains(needle),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SchemaError;
    use crate::parser::{parse_str, ParseOptions};

    fn typed() -> TidyTable {
        TidyTable::from_rows(
            ["Type", "Val"],
            vec![
                vec!["X".into(), Value::Int(10)],
                vec!["X".into(), Value::Int(5)],
                vec!["Y".into(), Value::Int(3)],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_group_sum() {
        let summed = group_sum(&typed(), "Type", "Val").unwrap();

        assert_eq!(summed.columns(), &["Type", "Val"]);
        assert_eq!(summed.len(), 2);
        assert_eq!(summed.get(0, "Type"), Some(&Value::text("X")));
        assert_eq!(summed.get(0, "Val"), Some(&Value::Float(15.0)));
        assert_eq!(summed.get(1, "Type"), Some(&Value::text("Y")));
        assert_eq!(summed.get(1, "Val"), Some(&Value::Float(3.0)));
    }

    #[test]
    fn test_group_sum_coalesces_to_zero() {
        let table = TidyTable::from_rows(
            ["Type", "2017"],
            vec![
                vec!["Asia".into(), Value::text("..")],
                vec!["Asia".into(), Value::Null],
                vec!["Asia".into(), Value::Float(2.5)],
                vec!["Europe".into(), Value::Null],
                vec![Value::Null, Value::Int(100)],
            ],
        )
        .unwrap();

        let summed = group_sum(&table, "Type", "2017").unwrap();
        assert_eq!(summed.len(), 2);
        assert_eq!(summed.get(0, "2017"), Some(&Value::Float(2.5)));
        assert_eq!(summed.get(1, "2017"), Some(&Value::Float(0.0)));
    }

    #[test]
    fn test_group_sum_skips_nan_cells() {
        let csv = "Type,2017\nA,10\nA,NaN\nB,3\n";
        let table = parse_str(csv, &ParseOptions::default()).unwrap().table;

        let summed = group_sum(&table, "Type", "2017").unwrap();
        assert_eq!(summed.get(0, "2017"), Some(&Value::Float(10.0)));
        assert_eq!(summed.get(1, "2017"), Some(&Value::Float(3.0)));

        let table = TidyTable::from_rows(
            ["Type", "2017"],
            vec![
                vec!["A".into(), Value::Float(4.0)],
                vec!["A".into(), Value::Float(f64::NAN)],
            ],
        )
        .unwrap();
        let summed = group_sum(&table, "Type", "2017").unwrap();
        assert_eq!(summed.get(0, "2017"), Some(&Value::Float(4.0)));
    }

    #[test]
    fn test_group_sum_sorts_keys() {
        let table = TidyTable::from_rows(
            ["Year", "Volume"],
            vec![
                vec!["2017".into(), Value::Int(1)],
                vec!["2013".into(), Value::Int(2)],
                vec!["2017".into(), Value::Int(3)],
            ],
        )
        .unwrap();

        let summed = group_sum(&table, "Year", "Volume").unwrap();
        assert_eq!(summed.get(0, "Year"), Some(&Value::text("2013")));
        assert_eq!(summed.get(1, "Volume"), Some(&Value::Float(4.0)));
    }

    #[test]
    fn test_group_sum_unknown_column() {
        let err = group_sum(&typed(), "Region", "Val").unwrap_err();
        assert_eq!(err, SchemaError::UnknownColumn("Region".into()));
    }

    fn regions() -> TidyTable {
        TidyTable::from_rows(
            ["YEAR"],
            vec![
                vec!["Developed economies: Asia".into()],
                vec!["Developed economies: Asia and Oceania".into()],
                vec!["ASIA".into()],
                vec![Value::Null],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_filter_contains_is_case_sensitive() {
        let subset = filter_contains(&regions(), "YEAR", "Asia").unwrap();
        assert_eq!(subset.len(), 2);
        assert!(subset.rows().iter().all(|r| r[0] != Value::text("ASIA")));
    }

    #[test]
    fn test_filter_contains_is_literal() {
        let subset = filter_contains(&regions(), "YEAR", "A.*").unwrap();
        assert!(subset.is_empty());
    }

    #[test]
    fn test_exclude_contains() {
        let kept = exclude_contains(&regions(), "YEAR", "Asia and Oceania").unwrap();
        assert_eq!(kept.len(), 3);
        assert_eq!(kept.get(0, "YEAR"), Some(&Value::text("Developed economies: Asia")));
    }

    #[test]
    fn test_filter_equals() {
        let table = TidyTable::from_rows(
            ["YEAR", "2017"],
            vec![
                vec!["World".into(), Value::Int(1)],
                vec!["World total".into(), Value::Int(2)],
            ],
        )
        .unwrap();

        let world = filter_equals(&table, "YEAR", "World").unwrap();
        assert_eq!(world.len(), 1);

        let by_number = filter_equals(&table, "2017", "2").unwrap();
        assert_eq!(by_number.get(0, "YEAR"), Some(&Value::text("World total")));
    }

    #[test]
    fn test_filters_unknown_column() {
        assert!(filter_contains(&regions(), "Country", "A").is_err());
        assert!(exclude_contains(&regions(), "Country", "A").is_err());
        assert!(filter_equals(&regions(), "Country", "A").is_err());
    }
}
