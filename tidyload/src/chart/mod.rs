//! Chart-ready export of tidy tables.
//!
//! Rendering is left to an external plotting tool; this module only checks
//! that a table has the x / y / hue shape a bar or point plot needs and
//! serializes the points.

use serde::{Deserialize, Serialize};

use crate::error::SchemaResult;
use crate::table::{TidyTable, Value};

/// Kind of plot the data is meant for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Point,
}

/// Which columns feed which axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    /// Categorical x column
    pub x: String,
    /// Numeric y column
    pub y: String,
    /// Optional grouping column
    #[serde(default)]
    pub hue: Option<String>,
}

/// One plotted point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub x: Value,
    /// `None` when the cell is not numeric
    pub y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hue: Option<Value>,
}

/// Data handed to a renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub kind: ChartKind,
    pub x: String,
    pub y: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hue: Option<String>,
    pub points: Vec<ChartPoint>,
}

impl ChartData {
    /// Extract points from `table` according to `spec`.
    pub fn from_table(table: &TidyTable, spec: &ChartSpec) -> SchemaResult<Self> {
        let x_idx = table.require_column(&spec.x)?;
        let y_idx = table.require_column(&spec.y)?;
        let hue_idx = spec
            .hue
            .as_deref()
            .map(|h| table.require_column(h))
            .transpose()?;

        let points = table
            .rows()
            .iter()
            .map(|row| ChartPoint {
                x: row[x_idx].clone(),
                y: row[y_idx].as_f64(),
                hue: hue_idx.map(|i| row[i].clone()),
            })
            .collect();

        Ok(Self {
            kind: spec.kind,
            x: spec.x.clone(),
            y: spec.y.clone(),
            hue: spec.hue.clone(),
            points,
        })
    }

    /// Distinct x categories in first-seen order.
    pub fn categories(&self) -> Vec<&Value> {
        let mut seen: Vec<&Value> = Vec::new();
        for point in &self.points {
            if !seen.contains(&&point.x) {
                seen.push(&point.x);
            }
        }
        seen
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SchemaError;

    fn dynamics() -> TidyTable {
        TidyTable::from_rows(
            ["Year", "Volume", "Type"],
            vec![
                vec!["2016".into(), Value::Float(10.0), "Import".into()],
                vec!["2017".into(), Value::Float(12.0), "Import".into()],
                vec!["2016".into(), Value::text("n/a"), "Export".into()],
            ],
        )
        .unwrap()
    }

    fn spec(hue: Option<&str>) -> ChartSpec {
        ChartSpec {
            kind: ChartKind::Point,
            x: "Year".into(),
            y: "Volume".into(),
            hue: hue.map(String::from),
        }
    }

    #[test]
    fn test_points_with_hue() {
        let chart = ChartData::from_table(&dynamics(), &spec(Some("Type"))).unwrap();

        assert_eq!(chart.points.len(), 3);
        assert_eq!(chart.points[1].y, Some(12.0));
        assert_eq!(chart.points[2].y, None);
        assert_eq!(chart.points[2].hue, Some(Value::text("Export")));
        assert_eq!(chart.categories(), vec![&Value::text("2016"), &Value::text("2017")]);
    }

    #[test]
    fn test_unknown_hue_column() {
        let err = ChartData::from_table(&dynamics(), &spec(Some("Region"))).unwrap_err();
        assert_eq!(err, SchemaError::UnknownColumn("Region".into()));
    }

    #[test]
    fn test_json_shape() {
        let chart = ChartData::from_table(&dynamics(), &spec(None)).unwrap();
        let json: serde_json::Value = serde_json::from_str(&chart.to_json().unwrap()).unwrap();

        assert_eq!(json["kind"], "point");
        assert!(json.get("hue").is_none());
        assert_eq!(json["points"][0]["x"], "2016");
        assert_eq!(json["points"][0]["y"], 10.0);
        assert!(json["points"][2]["y"].is_null());
    }
}
