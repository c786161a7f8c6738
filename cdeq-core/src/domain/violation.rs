// cdeq-core/src/domain/violation.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::catalog::Severity;
use crate::domain::dataset::Value;

pub const EXPECTED_NOT_NULL: &str = "NOT NULL";
pub const EXPECTED_NOT_EMPTY: &str = "NOT EMPTY";
pub const EXPECTED_POSITIVE: &str = "> 0";

/// Kind-specific part of a violation's detail payload.
///
/// Serialized with a `rule_type` tag so the flattened detail reads
/// `{ "rule_type": "range", "column": ..., "min": 0.0, ... }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule_type", rename_all = "snake_case")]
pub enum Expectation {
    NotNull {
        expected: String,
    },
    NotEmpty {
        expected: String,
    },
    PositiveValue {
        expected: String,
    },
    EnumValue {
        valid_values: Vec<String>,
    },
    Range {
        min: Option<f64>,
        max: Option<f64>,
        exclude_min: bool,
        exclude_max: bool,
    },
    Format {
        pattern: String,
    },
    Unique {
        duplicate_count: usize,
    },
}

impl Expectation {
    pub fn rule_type(&self) -> &'static str {
        match self {
            Self::NotNull { .. } => "not_null",
            Self::NotEmpty { .. } => "not_empty",
            Self::PositiveValue { .. } => "positive_value",
            Self::EnumValue { .. } => "enum_value",
            Self::Range { .. } => "range",
            Self::Format { .. } => "format",
            Self::Unique { .. } => "unique",
        }
    }

    /// Short human description of the condition that was expected.
    pub fn summary(&self) -> String {
        match self {
            Self::NotNull { expected }
            | Self::NotEmpty { expected }
            | Self::PositiveValue { expected } => expected.clone(),
            Self::EnumValue { valid_values } => format!("one of [{}]", valid_values.join(", ")),
            Self::Range {
                min,
                max,
                exclude_min,
                exclude_max,
            } => {
                let (open, low) = match min {
                    Some(m) if *exclude_min => ("(", m.to_string()),
                    Some(m) => ("[", m.to_string()),
                    None => ("(", "-inf".to_string()),
                };
                let (high, close) = match max {
                    Some(m) if *exclude_max => (m.to_string(), ")"),
                    Some(m) => (m.to_string(), "]"),
                    None => ("+inf".to_string(), ")"),
                };
                format!("within {}{}, {}{}", open, low, high, close)
            }
            Self::Format { pattern } => format!("matching /{}/", pattern),
            Self::Unique { duplicate_count } => {
                format!("unique value (found {} occurrences)", duplicate_count)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViolationDetail {
    pub column: String,
    pub value: Value,
    #[serde(flatten)]
    pub expectation: Expectation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_name: Option<String>,
}

impl ViolationDetail {
    pub fn message(&self) -> String {
        let shown = if self.value.is_null() {
            "null".to_string()
        } else {
            format!("'{}'", self.value)
        };
        format!(
            "{} check failed on column '{}': value {} (expected {})",
            self.expectation.rule_type(),
            self.column,
            shown,
            self.expectation.summary()
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum ViolationStatus {
    #[default]
    Open,
    Resolved,
    Ignored,
}

/// One record of one system failing one rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    pub violation_id: Uuid,
    pub rule_id: String,
    pub cde_name: String,
    pub system: String,
    pub uitid: String,
    #[serde(alias = "violation_details")]
    pub detail: ViolationDetail,
    pub detected_at: DateTime<Utc>,
    pub status: ViolationStatus,
}

impl Violation {
    /// Stamps a fresh id and detection time. Status always starts OPEN.
    pub fn open(
        rule_id: impl Into<String>,
        cde_name: impl Into<String>,
        system: impl Into<String>,
        uitid: impl Into<String>,
        detail: ViolationDetail,
    ) -> Self {
        Self {
            violation_id: Uuid::new_v4(),
            rule_id: rule_id.into(),
            cde_name: cde_name.into(),
            system: system.into(),
            uitid: uitid.into(),
            detail,
            detected_at: Utc::now(),
            status: ViolationStatus::Open,
        }
    }

    /// Equality ignoring the generated id and timestamp.
    pub fn same_finding(&self, other: &Self) -> bool {
        self.rule_id == other.rule_id
            && self.cde_name == other.cde_name
            && self.system == other.system
            && self.uitid == other.uitid
            && self.detail == other.detail
            && self.status == other.status
    }
}
