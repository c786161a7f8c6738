// cdeq-core/src/domain/system.rs

use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemInfo {
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

impl SystemInfo {
    pub fn new(name: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            display_name: Some(display_name.into()),
        }
    }

    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }
}

/// The known system enumeration, in report column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SystemRegistry {
    systems: Vec<SystemInfo>,
}

impl Default for SystemRegistry {
    fn default() -> Self {
        Self::new(vec![
            SystemInfo::new("trade", "Trade System"),
            SystemInfo::new("settlement", "Settlement System"),
            SystemInfo::new("reporting", "Reporting System"),
        ])
    }
}

impl SystemRegistry {
    pub fn new(systems: Vec<SystemInfo>) -> Self {
        Self { systems }
    }

    pub fn names(&self) -> Vec<&str> {
        self.systems.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SystemInfo> {
        self.systems.iter()
    }

    pub fn get(&self, name: &str) -> Option<&SystemInfo> {
        self.systems.iter().find(|s| s.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.systems.iter().position(|s| s.name == name)
    }

    /// Hard check used when stamping a violation with its system.
    pub fn ensure_known(&self, name: &str) -> Result<(), DomainError> {
        if self.contains(name) {
            Ok(())
        } else {
            Err(DomainError::UnknownSystem {
                system: name.to_string(),
                known: self.names().join(", "),
            })
        }
    }

    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }
}
