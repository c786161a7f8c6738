// cdeq-core/src/domain/report/summary.rs

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::violation::Violation;

pub const UNKNOWN_BUCKET: &str = "UNKNOWN";

/// Violation counts for dashboards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViolationSummary {
    pub total_violations: usize,
    pub by_severity: BTreeMap<String, usize>,
    pub by_rule_type: BTreeMap<String, usize>,
    pub by_system: BTreeMap<String, usize>,
    pub by_rule: BTreeMap<String, usize>,
}

impl ViolationSummary {
    /// Each violation lands exactly once in each of the four groupings.
    pub fn summarize(violations: &[Violation]) -> Self {
        let mut summary = Self {
            total_violations: violations.len(),
            ..Self::default()
        };

        for v in violations {
            let severity = v
                .detail
                .severity
                .as_ref()
                .map_or_else(|| UNKNOWN_BUCKET.to_string(), ToString::to_string);
            let system = if v.system.is_empty() {
                UNKNOWN_BUCKET.to_string()
            } else {
                v.system.clone()
            };
            let rule_name = v
                .detail
                .rule_name
                .clone()
                .unwrap_or_else(|| UNKNOWN_BUCKET.to_string());

            bump(&mut summary.by_severity, severity);
            bump(
                &mut summary.by_rule_type,
                v.detail.expectation.rule_type().to_string(),
            );
            bump(&mut summary.by_system, system);
            bump(&mut summary.by_rule, rule_name);
        }

        summary
    }
}

fn bump(counts: &mut BTreeMap<String, usize>, key: String) {
    *counts.entry(key).or_insert(0) += 1;
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::catalog::Severity;
    use crate::domain::dataset::Value;
    use crate::domain::violation::{EXPECTED_POSITIVE, Expectation, ViolationDetail};

    fn violation(system: &str, severity: Option<Severity>, rule_name: Option<&str>) -> Violation {
        Violation::open(
            "R1",
            "Quantity",
            system,
            "T001",
            ViolationDetail {
                column: "quantity".into(),
                value: Value::Int(0),
                expectation: Expectation::PositiveValue {
                    expected: EXPECTED_POSITIVE.into(),
                },
                severity,
                rule_name: rule_name.map(str::to_string),
            },
        )
    }

    #[test]
    fn test_empty_summary() {
        let summary = ViolationSummary::summarize(&[]);
        assert_eq!(summary, ViolationSummary::default());
        assert_eq!(summary.total_violations, 0);
    }

    #[test]
    fn test_each_violation_counted_once_per_grouping() {
        let violations = vec![
            violation("trade", Some(Severity::Error), Some("Quantity > 0")),
            violation("settlement", None, None),
            violation("trade", Some(Severity::Error), Some("Quantity > 0")),
        ];
        let summary = ViolationSummary::summarize(&violations);

        assert_eq!(summary.total_violations, 3);
        assert_eq!(summary.by_severity["ERROR"], 2);
        assert_eq!(summary.by_severity[UNKNOWN_BUCKET], 1);
        assert_eq!(summary.by_rule_type["positive_value"], 3);
        assert_eq!(summary.by_system["trade"], 2);
        assert_eq!(summary.by_system["settlement"], 1);
        assert_eq!(summary.by_rule["Quantity > 0"], 2);
        assert_eq!(summary.by_rule[UNKNOWN_BUCKET], 1);

        for grouping in [
            &summary.by_severity,
            &summary.by_rule_type,
            &summary.by_system,
            &summary.by_rule,
        ] {
            assert_eq!(grouping.values().sum::<usize>(), 3);
        }
    }
}
