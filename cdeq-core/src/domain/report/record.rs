// cdeq-core/src/domain/report/record.rs

use serde::{Deserialize, Serialize};

use crate::domain::violation::Violation;

/// Flat row for downstream exports (CSV, spreadsheets).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViolationRecord {
    pub rule_name: String,
    pub rule_type: String,
    pub severity: String,
    pub system: String,
    pub table: String,
    pub column: String,
    pub uitid: String,
    pub value: String,
    pub message: String,
    pub timestamp: String,
}

impl From<&Violation> for ViolationRecord {
    fn from(v: &Violation) -> Self {
        Self {
            rule_name: v
                .detail
                .rule_name
                .clone()
                .unwrap_or_else(|| "Unknown".to_string()),
            rule_type: v.detail.expectation.rule_type().to_string(),
            severity: v
                .detail
                .severity
                .as_ref()
                .map_or_else(|| "MEDIUM".to_string(), ToString::to_string),
            system: v.system.clone(),
            // One dataset per system: the system name doubles as the table.
            table: v.system.clone(),
            column: v.detail.column.clone(),
            uitid: v.uitid.clone(),
            value: v.detail.value.to_string(),
            message: v.detail.message(),
            timestamp: v.detected_at.to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dataset::Value;
    use crate::domain::violation::{Expectation, ViolationDetail};

    #[test]
    fn test_flattening_defaults() {
        let v = Violation::open(
            "R7",
            "Symbol",
            "reporting",
            "T010",
            ViolationDetail {
                column: "symbol".into(),
                value: Value::from("aapl"),
                expectation: Expectation::Format {
                    pattern: "^[A-Z]{3,5}$".into(),
                },
                severity: None,
                rule_name: None,
            },
        );
        let record = ViolationRecord::from(&v);
        assert_eq!(record.rule_name, "Unknown");
        assert_eq!(record.severity, "MEDIUM");
        assert_eq!(record.rule_type, "format");
        assert_eq!(record.table, "reporting");
        assert_eq!(record.value, "aapl");
        assert_eq!(
            record.message,
            "format check failed on column 'symbol': value 'aapl' (expected matching /^[A-Z]{3,5}$/)"
        );
    }
}
