// cdeq-core/src/domain/predicate/mod.rs

//! Predicate evaluators.
//!
//! Each evaluator is a pure function over `(record ids, column values,
//! parameters)` returning the offending records with their kind-specific
//! expectation. Dispatch happens once, in [`Predicate::build`], through an
//! exhaustive match on [`RuleKind`].

pub mod enumeration;
pub mod format;
pub mod numeric;
pub mod presence;
pub mod unique;

pub use enumeration::{EnumSet, EnumSets};
pub use format::{Anchor, FormatMatcher};
pub use numeric::RangeBounds;

use crate::domain::catalog::{RuleKind, RuleParams};
use crate::domain::dataset::Value;
use crate::domain::error::EvaluationError;
use crate::domain::violation::Expectation;

/// One offending record.
#[derive(Debug, Clone, PartialEq)]
pub struct Finding<'a> {
    pub record_id: &'a str,
    pub value: &'a Value,
    pub expectation: Expectation,
}

impl<'a> Finding<'a> {
    pub fn new(record_id: &'a str, value: &'a Value, expectation: Expectation) -> Self {
        Self {
            record_id,
            value,
            expectation,
        }
    }
}

/// A rule kind with its parameters validated and compiled.
#[derive(Debug, Clone)]
pub enum Predicate {
    NotNull,
    NotEmpty,
    PositiveValue,
    EnumValue(EnumSet),
    Range(RangeBounds),
    Format(FormatMatcher),
    Unique,
}

impl Predicate {
    /// Validates the parameter bag for `kind` against `column`.
    pub fn build(
        kind: &RuleKind,
        params: &RuleParams,
        column: &str,
        enum_sets: &EnumSets,
    ) -> Result<Self, EvaluationError> {
        Ok(match kind {
            RuleKind::NotNull => Self::NotNull,
            RuleKind::NotEmpty => Self::NotEmpty,
            RuleKind::PositiveValue => Self::PositiveValue,
            RuleKind::EnumValue => Self::EnumValue(EnumSet::resolve(params, column, enum_sets)?),
            RuleKind::Range => Self::Range(RangeBounds::from_params(params)?),
            RuleKind::Format => Self::Format(FormatMatcher::from_params(params)?),
            RuleKind::Unique => Self::Unique,
            RuleKind::Unsupported(tag) => {
                return Err(EvaluationError::UnsupportedKind(tag.clone()));
            }
        })
    }

    /// `ids` and `values` are parallel columns in dataset row order.
    pub fn evaluate<'a>(
        &self,
        ids: &'a [String],
        values: &[&'a Value],
    ) -> Result<Vec<Finding<'a>>, EvaluationError> {
        match self {
            Self::NotNull => Ok(presence::not_null(ids, values)),
            Self::NotEmpty => Ok(presence::not_empty(ids, values)),
            Self::PositiveValue => numeric::positive_value(ids, values),
            Self::EnumValue(set) => Ok(set.evaluate(ids, values)),
            Self::Range(bounds) => bounds.evaluate(ids, values),
            Self::Format(matcher) => Ok(matcher.evaluate(ids, values)),
            Self::Unique => Ok(unique::unique(ids, values)),
        }
    }
}
