// cdeq-core/src/domain/resolver.rs

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What to do with a CDE name that has no registered column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FallbackStrategy {
    /// Use the lowercased CDE name as the column (ad-hoc CDEs).
    #[default]
    Lowercase,
    /// Unregistered CDEs resolve to nothing.
    None,
}

/// Versioned logical-name -> physical-column table.
///
/// Lookups are case-sensitive exact matches on the CDE name. Per-system
/// overrides win over the shared entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default)]
    pub entries: BTreeMap<String, String>,

    #[serde(default)]
    pub overrides: BTreeMap<String, BTreeMap<String, String>>,

    #[serde(default)]
    pub fallback: FallbackStrategy,
}

fn default_version() -> u32 {
    1
}

impl Default for ColumnMapping {
    fn default() -> Self {
        let entries = [
            ("Trade Date", "trade_date"),
            ("Quantity", "quantity"),
            ("Symbol", "symbol"),
            ("Price", "price"),
            ("Side", "side"),
            ("uitid", "uitid"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Self {
            version: 1,
            entries,
            overrides: BTreeMap::new(),
            fallback: FallbackStrategy::Lowercase,
        }
    }
}

impl ColumnMapping {
    /// Maps a CDE to the column holding it in `system`.
    ///
    /// `None` means "skip this rule for this system"; the caller logs it.
    pub fn resolve(&self, cde_name: Option<&str>, system: &str) -> Option<String> {
        let cde = cde_name.filter(|n| !n.is_empty())?;

        if let Some(column) = self.overrides.get(system).and_then(|m| m.get(cde)) {
            return Some(column.clone());
        }
        if let Some(column) = self.entries.get(cde) {
            return Some(column.clone());
        }
        match self.fallback {
            FallbackStrategy::Lowercase => Some(cde.to_lowercase()),
            FallbackStrategy::None => None,
        }
    }
}
