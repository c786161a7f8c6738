// cdeq-core/src/domain/report/reconciliation.rs

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::warn;

use crate::domain::catalog::Catalog;
use crate::domain::system::{SystemInfo, SystemRegistry};
use crate::domain::violation::Violation;

pub const UNKNOWN_RULE: &str = "Unknown Rule";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Presence {
    Yes,
    #[default]
    No,
}

impl Presence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Yes => "Yes",
            Self::No => "No",
        }
    }
}

impl fmt::Display for Presence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemFlag {
    pub system: String,
    pub violated: Presence,
}

/// One (CDE, rule, record id) group with a Yes/No flag per known system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationRow {
    pub cde: String,
    pub rule_id: String,
    pub rule_description: String,
    pub uitid: String,
    pub flags: Vec<SystemFlag>,
}

impl ReconciliationRow {
    pub fn flag(&self, system: &str) -> Option<Presence> {
        self.flags
            .iter()
            .find(|f| f.system == system)
            .map(|f| f.violated)
    }
}

/// The cross-system presence matrix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationTable {
    pub systems: Vec<SystemInfo>,
    pub rows: Vec<ReconciliationRow>,
}

impl ReconciliationTable {
    /// Groups violations by (CDE, rule id, record id).
    ///
    /// Rows come out in first-seen order. Every known system starts at "No"
    /// and flips to "Yes" as soon as one violation of the group was recorded
    /// there.
    pub fn compact(violations: &[Violation], known: &SystemRegistry, catalog: &Catalog) -> Self {
        let mut rows: Vec<ReconciliationRow> = Vec::new();
        let mut index: HashMap<(&str, &str, &str), usize> = HashMap::new();

        for v in violations {
            let key = (v.cde_name.as_str(), v.rule_id.as_str(), v.uitid.as_str());
            let row_idx = *index.entry(key).or_insert_with(|| {
                rows.push(ReconciliationRow {
                    cde: v.cde_name.clone(),
                    rule_id: v.rule_id.clone(),
                    rule_description: describe_rule(catalog, &v.rule_id),
                    uitid: v.uitid.clone(),
                    flags: known
                        .iter()
                        .map(|s| SystemFlag {
                            system: s.name.clone(),
                            violated: Presence::No,
                        })
                        .collect(),
                });
                rows.len() - 1
            });

            match rows[row_idx].flags.iter_mut().find(|f| f.system == v.system) {
                Some(flag) => flag.violated = Presence::Yes,
                None => warn!(system = %v.system, rule_id = %v.rule_id, "Violation for a system outside the report columns"),
            }
        }

        Self {
            systems: known.iter().cloned().collect(),
            rows,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Column headers: CDE, rule description, record id, then one column per
    /// system (display name).
    pub fn headers(&self) -> Vec<String> {
        let mut headers = vec![
            "CDE".to_string(),
            "DQ_Rule_Desc".to_string(),
            "uitid".to_string(),
        ];
        headers.extend(self.systems.iter().map(|s| s.label().to_string()));
        headers
    }

    pub fn cells(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| {
                let mut cells = vec![
                    row.cde.clone(),
                    row.rule_description.clone(),
                    row.uitid.clone(),
                ];
                cells.extend(row.flags.iter().map(|f| f.violated.to_string()));
                cells
            })
            .collect()
    }

    /// CSV rendering, header first. Cells holding the delimiter or quotes
    /// are quoted.
    pub fn render_plain(&self) -> Result<String, csv::Error> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(self.headers())?;
        for row in self.cells() {
            writer.write_record(&row)?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| csv::Error::from(e.into_error()))?;
        Ok(String::from_utf8_lossy(&bytes).trim_end().to_string())
    }
}

fn describe_rule(catalog: &Catalog, rule_id: &str) -> String {
    match catalog.rule(rule_id) {
        Some(rule) => rule
            .description
            .clone()
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| rule.display_name()),
        None => UNKNOWN_RULE.to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::catalog::{Rule, RuleKind};
    use crate::domain::dataset::Value;
    use crate::domain::violation::{EXPECTED_NOT_NULL, Expectation, ViolationDetail};

    fn violation(cde: &str, rule: &str, system: &str, uitid: &str) -> Violation {
        Violation::open(
            rule,
            cde,
            system,
            uitid,
            ViolationDetail {
                column: cde.to_lowercase(),
                value: Value::Null,
                expectation: Expectation::NotNull {
                    expected: EXPECTED_NOT_NULL.into(),
                },
                severity: None,
                rule_name: None,
            },
        )
    }

    fn catalog() -> Catalog {
        Catalog {
            cdes: vec![],
            rules: vec![
                Rule::new("R1", RuleKind::NotNull, "Symbol").with_description("Symbol is mandatory"),
                Rule::new("R2", RuleKind::NotNull, "Price"),
            ],
        }
    }

    #[test]
    fn test_empty_input_gives_empty_table() {
        let table = ReconciliationTable::compact(&[], &SystemRegistry::default(), &catalog());
        assert!(table.is_empty());
        assert_eq!(table.systems.len(), 3);
    }

    #[test]
    fn test_groups_and_flags() {
        let violations = vec![
            violation("Symbol", "R1", "trade", "T001"),
            violation("Price", "R2", "settlement", "T002"),
            violation("Symbol", "R1", "reporting", "T001"),
            violation("Symbol", "R1", "trade", "T001"),
        ];
        let table =
            ReconciliationTable::compact(&violations, &SystemRegistry::default(), &catalog());

        assert_eq!(table.len(), 2);
        let first = &table.rows[0];
        assert_eq!((first.cde.as_str(), first.uitid.as_str()), ("Symbol", "T001"));
        assert_eq!(first.rule_description, "Symbol is mandatory");
        assert_eq!(first.flag("trade"), Some(Presence::Yes));
        assert_eq!(first.flag("settlement"), Some(Presence::No));
        assert_eq!(first.flag("reporting"), Some(Presence::Yes));

        let second = &table.rows[1];
        assert_eq!(second.rule_description, "Not Null - Price");
        assert_eq!(second.flag("settlement"), Some(Presence::Yes));
        assert_eq!(second.flag("trade"), Some(Presence::No));
    }

    #[test]
    fn test_unknown_rule_description() {
        let violations = vec![violation("Side", "R404", "trade", "T009")];
        let table =
            ReconciliationTable::compact(&violations, &SystemRegistry::default(), &catalog());
        assert_eq!(table.rows[0].rule_description, UNKNOWN_RULE);
    }

    #[test]
    fn test_render_plain_snapshot() {
        let violations = vec![
            violation("Symbol", "R1", "trade", "T001"),
            violation("Symbol", "R1", "settlement", "T001"),
            violation("Price", "R2", "reporting", "T004"),
        ];
        let table =
            ReconciliationTable::compact(&violations, &SystemRegistry::default(), &catalog());
        insta::assert_snapshot!(table.render_plain().unwrap(), @r"
        CDE,DQ_Rule_Desc,uitid,Trade System,Settlement System,Reporting System
        Symbol,Symbol is mandatory,T001,Yes,Yes,No
        Price,Not Null - Price,T004,No,No,Yes
        ");
    }

    #[test]
    fn test_render_plain_quotes_delimiters() -> anyhow::Result<()> {
        let catalog = Catalog {
            cdes: vec![],
            rules: vec![
                Rule::new("R1", RuleKind::Range, "Price")
                    .with_description("Price must be within [0, 1000], in \"USD\""),
            ],
        };
        let violations = vec![violation("Price", "R1", "trade", "T001")];
        let table = ReconciliationTable::compact(&violations, &SystemRegistry::default(), &catalog);

        let rendered = table.render_plain()?;
        let mut reader = csv::Reader::from_reader(rendered.as_bytes());
        let rows: Vec<csv::StringRecord> = reader.records().collect::<Result<_, _>>()?;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].len(), 6);
        assert_eq!(&rows[0][1], "Price must be within [0, 1000], in \"USD\"");
        assert_eq!(&rows[0][3], "Yes");
        Ok(())
    }
}
