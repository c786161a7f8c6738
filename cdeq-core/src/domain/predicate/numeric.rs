// cdeq-core/src/domain/predicate/numeric.rs

use crate::domain::catalog::RuleParams;
use crate::domain::dataset::Value;
use crate::domain::error::EvaluationError;
use crate::domain::predicate::Finding;
use crate::domain::violation::{EXPECTED_POSITIVE, Expectation};

/// Numeric view of a cell for comparison predicates.
///
/// `Ok(None)` is a null (or NaN) cell, which fails every comparison.
/// Text that reads as a number (`1.50`) is compared by value. Other text
/// and booleans are a type mismatch for the whole column.
fn numeric(record_id: &str, value: &Value) -> Result<Option<f64>, EvaluationError> {
    match value {
        Value::Null => Ok(None),
        Value::Int(_) | Value::Float(_) => Ok(value.as_f64()),
        Value::Text(_) if value.parse_number().is_some() => Ok(value.parse_number()),
        other => Err(EvaluationError::TypeMismatch {
            record_id: record_id.to_string(),
            expected: "number",
            found: other.type_name(),
        }),
    }
}

/// POSITIVE_VALUE: null, zero and negative cells.
pub fn positive_value<'a>(
    ids: &'a [String],
    values: &[&'a Value],
) -> Result<Vec<Finding<'a>>, EvaluationError> {
    let mut findings = Vec::new();
    for (id, value) in ids.iter().zip(values) {
        let passes = numeric(id, value)?.is_some_and(|n| n > 0.0);
        if !passes {
            findings.push(Finding::new(
                id,
                *value,
                Expectation::PositiveValue {
                    expected: EXPECTED_POSITIVE.to_string(),
                },
            ));
        }
    }
    Ok(findings)
}

/// Optional lower/upper bounds, each inclusive unless its flag is set.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeBounds {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub exclude_min: bool,
    pub exclude_max: bool,
}

impl RangeBounds {
    pub fn from_params(params: &RuleParams) -> Result<Self, EvaluationError> {
        let bounds = Self {
            min: params.number("min")?,
            max: params.number("max")?,
            exclude_min: params.flag("exclude_min")?,
            exclude_max: params.flag("exclude_max")?,
        };
        if bounds.min.is_none() && bounds.max.is_none() {
            return Err(EvaluationError::MissingParameter("min|max".to_string()));
        }
        Ok(bounds)
    }

    /// A value passes only if every configured bound passes.
    pub fn contains(&self, n: f64) -> bool {
        let above_min = match self.min {
            Some(min) if self.exclude_min => n > min,
            Some(min) => n >= min,
            None => true,
        };
        let below_max = match self.max {
            Some(max) if self.exclude_max => n < max,
            Some(max) => n <= max,
            None => true,
        };
        above_min && below_max
    }

    fn expectation(&self) -> Expectation {
        Expectation::Range {
            min: self.min,
            max: self.max,
            exclude_min: self.exclude_min,
            exclude_max: self.exclude_max,
        }
    }

    /// RANGE: null cells and cells outside the bounds.
    pub fn evaluate<'a>(
        &self,
        ids: &'a [String],
        values: &[&'a Value],
    ) -> Result<Vec<Finding<'a>>, EvaluationError> {
        let mut findings = Vec::new();
        for (id, value) in ids.iter().zip(values) {
            let passes = numeric(id, value)?.is_some_and(|n| self.contains(n));
            if !passes {
                findings.push(Finding::new(id, *value, self.expectation()));
            }
        }
        Ok(findings)
    }
}
