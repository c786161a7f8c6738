// cdeq-core/src/domain/catalog/rule.rs

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

use crate::domain::catalog::severity::Severity;
use crate::domain::error::EvaluationError;

/// Predicate kind of a rule.
///
/// The seven evaluated kinds plus an explicit catch-all. Catalog entries with
/// any other tag (REFERENTIAL, CUSTOM, typos...) deserialize into
/// `Unsupported` and are skipped by the dispatcher instead of failing the load.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RuleKind {
    NotNull,
    NotEmpty,
    PositiveValue,
    EnumValue,
    Range,
    Format,
    Unique,
    Unsupported(String),
}

impl RuleKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::NotNull => "NOT_NULL",
            Self::NotEmpty => "NOT_EMPTY",
            Self::PositiveValue => "POSITIVE_VALUE",
            Self::EnumValue => "ENUM_VALUE",
            Self::Range => "RANGE",
            Self::Format => "FORMAT",
            Self::Unique => "UNIQUE",
            Self::Unsupported(tag) => tag.as_str(),
        }
    }

    pub fn parse(tag: &str) -> Self {
        match tag.trim().to_uppercase().as_str() {
            "NOT_NULL" => Self::NotNull,
            "NOT_EMPTY" => Self::NotEmpty,
            "POSITIVE_VALUE" => Self::PositiveValue,
            "ENUM_VALUE" => Self::EnumValue,
            "RANGE" => Self::Range,
            "FORMAT" => Self::Format,
            "UNIQUE" => Self::Unique,
            _ => Self::Unsupported(tag.to_string()),
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unsupported(_))
    }

    /// "POSITIVE_VALUE" -> "Positive Value"
    pub fn title(&self) -> String {
        self.as_str()
            .split('_')
            .filter(|w| !w.is_empty())
            .map(|w| {
                let mut chars = w.chars();
                match chars.next() {
                    Some(first) => {
                        first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                    }
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RuleKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::parse(&s))
    }
}

impl Serialize for RuleKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

/// Kind-specific parameter bag (`{min, max, exclude_min, exclude_max}`,
/// `{pattern, anchor}`, `{values}`...). Typed access happens when the
/// predicate is built, so malformed parameters surface as rule errors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleParams(BTreeMap<String, serde_json::Value>);

impl RuleParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn present(&self, key: &str) -> Option<&serde_json::Value> {
        self.0.get(key).filter(|v| !v.is_null())
    }

    pub fn number(&self, key: &str) -> Result<Option<f64>, EvaluationError> {
        match self.present(key) {
            None => Ok(None),
            Some(v) => v
                .as_f64()
                .map(Some)
                .ok_or_else(|| EvaluationError::InvalidParameter {
                    name: key.to_string(),
                    reason: format!("expected a number, got {}", v),
                }),
        }
    }

    pub fn flag(&self, key: &str) -> Result<bool, EvaluationError> {
        match self.present(key) {
            None => Ok(false),
            Some(v) => v.as_bool().ok_or_else(|| EvaluationError::InvalidParameter {
                name: key.to_string(),
                reason: format!("expected a boolean, got {}", v),
            }),
        }
    }

    pub fn text(&self, key: &str) -> Result<Option<&str>, EvaluationError> {
        match self.present(key) {
            None => Ok(None),
            Some(v) => v
                .as_str()
                .map(Some)
                .ok_or_else(|| EvaluationError::InvalidParameter {
                    name: key.to_string(),
                    reason: format!("expected a string, got {}", v),
                }),
        }
    }

    pub fn text_list(&self, key: &str) -> Result<Option<Vec<String>>, EvaluationError> {
        let Some(v) = self.present(key) else {
            return Ok(None);
        };
        let invalid = || EvaluationError::InvalidParameter {
            name: key.to_string(),
            reason: format!("expected a list of strings, got {}", v),
        };
        let items = v.as_array().ok_or_else(invalid)?;
        items
            .iter()
            .map(|item| item.as_str().map(str::to_string).ok_or_else(invalid))
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }
}

/// A declarative check of one predicate kind against one CDE.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RuleEntry")]
pub struct Rule {
    pub id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub kind: Option<RuleKind>,

    pub cde_name: Option<String>,

    /// Empty means "every system with data".
    pub systems: Vec<String>,

    pub definition: RuleParams,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
}

/// Catalog entry as written by hand or exported from a rule store.
///
/// Exports carry both the store key (`id`) and the rule key (`rule_id`),
/// and spell the kind `rule_type` or `ruleType`. When both forms are
/// present the rule-level one wins.
#[derive(Debug, Deserialize)]
struct RuleEntry {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    rule_id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    kind: Option<RuleKind>,
    #[serde(default)]
    rule_type: Option<RuleKind>,
    #[serde(default, rename = "ruleType")]
    rule_type_camel: Option<RuleKind>,
    #[serde(default)]
    cde_name: Option<String>,
    #[serde(default)]
    cde: Option<String>,
    #[serde(default)]
    systems: Option<Vec<String>>,
    #[serde(default)]
    definition: Option<RuleParams>,
    #[serde(default)]
    rule_definition: Option<RuleParams>,
    #[serde(default)]
    params: Option<RuleParams>,
    #[serde(default)]
    severity: Option<Severity>,
}

impl TryFrom<RuleEntry> for Rule {
    type Error = String;

    fn try_from(entry: RuleEntry) -> Result<Self, Self::Error> {
        let id = entry
            .rule_id
            .or(entry.id)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| "rule is missing 'id' (or 'rule_id')".to_string())?;
        Ok(Self {
            id,
            name: entry.name,
            description: entry.description,
            kind: entry.kind.or(entry.rule_type).or(entry.rule_type_camel),
            cde_name: entry.cde_name.or(entry.cde),
            systems: entry.systems.unwrap_or_default(),
            definition: entry
                .definition
                .or(entry.rule_definition)
                .or(entry.params)
                .unwrap_or_default(),
            severity: entry.severity,
        })
    }
}

impl Rule {
    pub fn new(id: impl Into<String>, kind: RuleKind, cde_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            description: None,
            kind: Some(kind),
            cde_name: Some(cde_name.into()),
            systems: Vec::new(),
            definition: RuleParams::default(),
            severity: None,
        }
    }

    pub fn with_systems<I, S>(mut self, systems: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.systems = systems.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_definition(mut self, definition: RuleParams) -> Self {
        self.definition = definition;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    /// Human label: explicit name, then description, then
    /// "<Kind Title> - <CDE>", then "Rule <id>".
    pub fn display_name(&self) -> String {
        if let Some(name) = self.name.as_deref().filter(|n| !n.is_empty()) {
            return name.to_string();
        }
        if let Some(desc) = self.description.as_deref().filter(|d| !d.is_empty()) {
            return desc.to_string();
        }
        match (&self.kind, self.cde_name.as_deref()) {
            (Some(kind), Some(cde)) if !cde.is_empty() => format!("{} - {}", kind.title(), cde),
            _ => format!("Rule {}", self.id),
        }
    }

    /// Systems this rule fans out to, given the systems that supplied data.
    pub fn target_systems<'a>(&'a self, available: &[&'a str]) -> Vec<&'a str> {
        if self.systems.is_empty() {
            available.to_vec()
        } else {
            self.systems.iter().map(String::as_str).collect()
        }
    }
}
