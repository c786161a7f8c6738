// cdeq-core/src/domain/dataset/value.rs

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single cell of a system dataset.
///
/// Variant order matters for `untagged` deserialization: JSON integers must be
/// tried before floats so that `42` stays an `Int`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Native numeric view. `None` for null and for non-numeric cells.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) if !f.is_nan() => Some(*f),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Int(_) => "integer",
            Self::Float(_) => "float",
            Self::Text(_) => "string",
        }
    }

    /// Infers a typed value from a raw text cell (CSV ingestion).
    ///
    /// Only the empty cell is null. A cell becomes a number only when the
    /// number prints back as the same text, so `007`, `1.50` or `+5` stay
    /// text and identifiers and codes are never rewritten.
    pub fn infer(raw: &str) -> Self {
        if raw.is_empty() {
            return Self::Null;
        }
        if let Ok(i) = raw.parse::<i64>()
            && i.to_string() == raw
        {
            return Self::Int(i);
        }
        if let Ok(f) = raw.parse::<f64>()
            && f.is_finite()
            && f.to_string() == raw
        {
            return Self::Float(f);
        }
        Self::Text(raw.to_string())
    }

    /// Numeric reading of a text cell whose form did not survive inference
    /// (`1.50`, `+5`, ` 5`). `None` when the text is not a finite number.
    pub fn parse_number(&self) -> Option<f64> {
        self.as_text()
            .and_then(|s| s.trim().parse::<f64>().ok())
            .filter(|f| f.is_finite())
    }

    /// Equality key used by the uniqueness check. Integral floats collapse
    /// onto their integer form so `5` and `5.0` count as the same value.
    pub(crate) fn unique_key(&self) -> Option<ValueKey<'_>> {
        match self {
            Self::Null => None,
            Self::Bool(b) => Some(ValueKey::Bool(*b)),
            Self::Int(i) => Some(ValueKey::Int(*i)),
            Self::Float(f) if f.is_nan() => None,
            Self::Float(f) => {
                if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
                    Some(ValueKey::Int(*f as i64))
                } else {
                    Some(ValueKey::Float(f.to_bits()))
                }
            }
            Self::Text(s) => Some(ValueKey::Text(s.as_str())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum ValueKey<'a> {
    Bool(bool),
    Int(i64),
    Float(u64),
    Text(&'a str),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Int(i) => write!(f, "{}", i),
            Self::Float(x) => write!(f, "{}", x),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}
