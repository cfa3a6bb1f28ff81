use std::fmt;

use serde_json::Value as JsonValue;

// ---------------------------------------------------------------------------
// Field values
// ---------------------------------------------------------------------------

/// One entity attribute value.
///
/// Attributes are dynamically named and carry one of a small set of shapes.
/// This is exactly the set of shapes the backing file can round-trip.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Int(i64),
    Float(f64),
    List(Vec<FieldValue>),
}

impl FieldValue {
    /// Encode for the backing file.
    pub fn to_json(&self) -> JsonValue {
        match self {
            FieldValue::Text(s) => JsonValue::String(s.clone()),
            FieldValue::Int(n) => JsonValue::from(*n),
            FieldValue::Float(x) => JsonValue::from(*x),
            FieldValue::List(items) => {
                JsonValue::Array(items.iter().map(FieldValue::to_json).collect())
            }
        }
    }

    /// Decode from the backing file. Returns `None` for JSON shapes no
    /// attribute can hold (booleans, nulls, nested objects).
    pub fn from_json(value: &JsonValue) -> Option<FieldValue> {
        match value {
            JsonValue::String(s) => Some(FieldValue::Text(s.clone())),
            JsonValue::Number(n) => match n.as_i64() {
                Some(i) => Some(FieldValue::Int(i)),
                None => n.as_f64().map(FieldValue::Float),
            },
            JsonValue::Array(items) => {
                let decoded: Option<Vec<FieldValue>> =
                    items.iter().map(FieldValue::from_json).collect();
                decoded.map(FieldValue::List)
            }
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => write!(f, "{:?}", s),
            FieldValue::Int(n) => write!(f, "{}", n),
            // A whole float still renders with a decimal point.
            FieldValue::Float(x) if x.fract() == 0.0 && x.is_finite() => write!(f, "{:.1}", x),
            FieldValue::Float(x) => write!(f, "{}", x),
            FieldValue::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}
