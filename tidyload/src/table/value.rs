use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;

// ---------------------------------------------------------------------------
// Value – a single cell in a tidy table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value.
///
/// Cells loaded from CSV are typed per column (see [`infer_column`]); derived
/// tables may mix kinds freely. `Null` marks a missing cell.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Int(i64),
    Float(f64),
    Text(String),
}

impl Value {
    pub fn text(s: impl Into<String>) -> Self {
        Value::Text(s.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Permissive numeric coercion.
    ///
    /// Integers and floats convert directly, text is parsed after trimming.
    /// Anything else (null, non-numeric text, NaN or infinities) is `None`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Null => None,
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f).filter(|f| f.is_finite()),
            Value::Text(s) => parse_finite(s),
        }
    }

    /// Coerce to a float cell, `Null` when coercion fails.
    pub fn to_numeric(&self) -> Value {
        match self.as_f64() {
            Some(f) => Value::Float(f),
            None => Value::Null,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Convert from a JSON scalar (recipe constants). Arrays and objects are
    /// kept as their JSON text.
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Text(b.to_string()),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => n.as_f64().map(Value::Float).unwrap_or(Value::Null),
            },
            serde_json::Value::String(s) => Value::Text(s.clone()),
            other => Value::Text(other.to_string()),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Int(i) => serde_json::Value::from(*i),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Text(s) => serde_json::Value::String(s.clone()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Float(f) if f.is_finite() => serializer.serialize_f64(*f),
            Value::Float(_) => serializer.serialize_unit(),
            Value::Text(s) => serializer.serialize_str(s),
        }
    }
}

// -- Manual Eq/Ord so values can key a BTreeMap when grouping --

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        fn discriminant(v: &Value) -> u8 {
            match v {
                Value::Null => 0,
                Value::Int(_) => 1,
                Value::Float(_) => 2,
                Value::Text(_) => 3,
            }
        }
        match (self, other) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::Float(a), Value::Float(b)) => a.total_cmp(b),
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            _ => discriminant(self).cmp(&discriminant(other)),
        }
    }
}

// ---------------------------------------------------------------------------
// Column type inference
// ---------------------------------------------------------------------------

/// Finite float parse of a trimmed cell. `NaN` and infinities are rejected.
fn parse_finite(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok().filter(|f| f.is_finite())
}

/// Empty cells and NaN/infinity markers count as missing.
fn is_missing(cell: &str) -> bool {
    cell.is_empty() || cell.parse::<f64>().is_ok_and(|f| !f.is_finite())
}

/// Type a column of raw CSV cells.
///
/// Empty cells and `NaN`/`inf` markers become `Null`. If every other cell
/// parses as an integer the column is `Int`, else if every cell is numeric it
/// is `Float`, otherwise the remaining cells stay `Text`.
pub fn infer_column(raw: &[&str]) -> Vec<Value> {
    let present = raw.iter().map(|s| s.trim()).filter(|s| !is_missing(s));

    let all_int = present.clone().all(|s| s.parse::<i64>().is_ok());
    let all_float = all_int || present.clone().all(|s| parse_finite(s).is_some());

    raw.iter()
        .map(|cell| {
            let cell = cell.trim();
            if is_missing(cell) {
                return Value::Null;
            }
            if all_int {
                cell.parse::<i64>().map(Value::Int).unwrap_or(Value::Null)
            } else if all_float {
                parse_finite(cell).map(Value::Float).unwrap_or(Value::Null)
            } else {
                Value::Text(cell.to_string())
            }
        })
        .collect()
}
