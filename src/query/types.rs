//! Core types for the query system

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::error::{DslError, Result};

/// Logical role of a clause inside a bool query
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoolRole {
    /// All clauses must match (AND). Contributes to score.
    Must,
    /// All clauses must match (AND). Does not contribute to score.
    Filter,
    /// At least one clause should match (OR).
    Should,
    /// No clause may match (NOT).
    MustNot,
}

impl BoolRole {
    pub const ALL: [BoolRole; 4] = [
        BoolRole::Must,
        BoolRole::Filter,
        BoolRole::Should,
        BoolRole::MustNot,
    ];

    /// DSL key for this role
    pub fn as_str(&self) -> &'static str {
        match self {
            BoolRole::Must => "must",
            BoolRole::Filter => "filter",
            BoolRole::Should => "should",
            BoolRole::MustNot => "must_not",
        }
    }
}

impl fmt::Display for BoolRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value type for range bounds
#[derive(Clone, Debug, PartialEq)]
pub enum RangeValue {
    /// 64-bit integer
    Long(i64),
    /// 64-bit floating point
    Double(f64),
    /// String (for dates, keywords)
    String(String),
}

impl RangeValue {
    pub fn to_value(&self) -> Value {
        match self {
            RangeValue::Long(v) => Value::from(*v),
            RangeValue::Double(v) => Value::from(*v),
            RangeValue::String(s) => Value::from(s.as_str()),
        }
    }

    /// Convert a dynamically typed JSON value into a range bound
    pub fn from_json(value: &Value) -> Result<Self> {
        match value {
            Value::Number(n) => {
                if let Some(v) = n.as_i64() {
                    Ok(RangeValue::Long(v))
                } else if let Some(v) = n.as_f64() {
                    Ok(RangeValue::Double(v))
                } else {
                    Err(DslError::invalid_argument(format!(
                        "range bound {} is out of range",
                        n
                    )))
                }
            }
            Value::String(s) => Ok(RangeValue::String(s.clone())),
            other => Err(DslError::invalid_argument(format!(
                "range bound must be a number or string, got {}",
                other
            ))),
        }
    }
}

impl From<i64> for RangeValue {
    fn from(v: i64) -> Self {
        RangeValue::Long(v)
    }
}

impl From<i32> for RangeValue {
    fn from(v: i32) -> Self {
        RangeValue::Long(v as i64)
    }
}

impl From<u32> for RangeValue {
    fn from(v: u32) -> Self {
        RangeValue::Long(v as i64)
    }
}

impl From<f64> for RangeValue {
    fn from(v: f64) -> Self {
        RangeValue::Double(v)
    }
}

impl From<&str> for RangeValue {
    fn from(v: &str) -> Self {
        RangeValue::String(v.to_string())
    }
}

impl From<String> for RangeValue {
    fn from(v: String) -> Self {
        RangeValue::String(v)
    }
}

/// Range bounds for range queries
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RangeBounds {
    /// Greater than
    pub gt: Option<RangeValue>,
    /// Greater than or equal to
    pub gte: Option<RangeValue>,
    /// Less than
    pub lt: Option<RangeValue>,
    /// Less than or equal to
    pub lte: Option<RangeValue>,
}

impl RangeBounds {
    pub const KEYS: [&'static str; 4] = ["gt", "gte", "lt", "lte"];

    pub fn new() -> Self {
        Self::default()
    }

    /// Set the greater-than bound
    pub fn gt(mut self, value: impl Into<RangeValue>) -> Self {
        self.gt = Some(value.into());
        self
    }

    /// Set the greater-than-or-equal bound
    pub fn gte(mut self, value: impl Into<RangeValue>) -> Self {
        self.gte = Some(value.into());
        self
    }

    /// Set the less-than bound
    pub fn lt(mut self, value: impl Into<RangeValue>) -> Self {
        self.lt = Some(value.into());
        self
    }

    /// Set the less-than-or-equal bound
    pub fn lte(mut self, value: impl Into<RangeValue>) -> Self {
        self.lte = Some(value.into());
        self
    }

    /// Build bounds from `(key, value)` pairs, rejecting keys other than
    /// gt, gte, lt and lte
    pub fn from_pairs<K, V, I>(pairs: I) -> Result<Self>
    where
        K: AsRef<str>,
        V: Into<RangeValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut bounds = RangeBounds::default();
        for (key, value) in pairs {
            let slot = match key.as_ref() {
                "gt" => &mut bounds.gt,
                "gte" => &mut bounds.gte,
                "lt" => &mut bounds.lt,
                "lte" => &mut bounds.lte,
                other => {
                    return Err(DslError::invalid_argument(format!(
                        "Unknown range bound `{}`, expected one of gt, gte, lt, lte",
                        other
                    )))
                }
            };
            *slot = Some(value.into());
        }
        Ok(bounds)
    }

    /// Check if no bound is set
    pub fn is_empty(&self) -> bool {
        self.gt.is_none() && self.gte.is_none() && self.lt.is_none() && self.lte.is_none()
    }

    /// Render the set bounds in gt, gte, lt, lte order
    pub fn to_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        let slots = [&self.gt, &self.gte, &self.lt, &self.lte];
        for (key, slot) in Self::KEYS.iter().zip(slots) {
            if let Some(value) = slot {
                map.insert((*key).to_string(), value.to_value());
            }
        }
        map
    }
}

/// Require a non-empty field name
pub(crate) fn require_field(kind: &str, field: String) -> Result<String> {
    if field.trim().is_empty() {
        return Err(DslError::invalid_argument(format!(
            "{} requires a non-empty field name",
            kind
        )));
    }
    Ok(field)
}
