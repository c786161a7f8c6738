// cdeq-core/src/domain/predicate/format.rs

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::catalog::RuleParams;
use crate::domain::dataset::Value;
use crate::domain::error::EvaluationError;
use crate::domain::predicate::Finding;
use crate::domain::violation::Expectation;

/// Where a FORMAT pattern must match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Anchor {
    /// Match must start at the first character; trailing text is allowed
    /// unless the pattern itself ends with `$`.
    #[default]
    Start,
    /// The whole value must match.
    Full,
}

impl std::str::FromStr for Anchor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "start" | "prefix" => Ok(Self::Start),
            "full" => Ok(Self::Full),
            _ => Err(format!("Unknown anchor: {}", s)),
        }
    }
}

/// Compiled FORMAT predicate. The regex is built once per evaluation.
#[derive(Debug, Clone)]
pub struct FormatMatcher {
    pattern: String,
    anchor: Anchor,
    regex: Regex,
}

impl FormatMatcher {
    pub fn new(pattern: &str, anchor: Anchor) -> Result<Self, EvaluationError> {
        let anchored = match anchor {
            Anchor::Start => format!("^(?:{})", pattern),
            Anchor::Full => format!("^(?:{})$", pattern),
        };
        // Validate the user pattern on its own so a dangling ')' cannot be
        // absorbed by the wrapping group.
        Regex::new(pattern)
            .and_then(|_| Regex::new(&anchored))
            .map(|regex| Self {
                pattern: pattern.to_string(),
                anchor,
                regex,
            })
            .map_err(|e| EvaluationError::InvalidPattern {
                pattern: pattern.to_string(),
                reason: e.to_string(),
            })
    }

    pub fn from_params(params: &RuleParams) -> Result<Self, EvaluationError> {
        let pattern = params
            .text("pattern")?
            .filter(|p| !p.is_empty())
            .ok_or_else(|| EvaluationError::MissingParameter("pattern".to_string()))?;
        let anchor = match params.text("anchor")? {
            None => Anchor::default(),
            Some(raw) => raw
                .parse::<Anchor>()
                .map_err(|reason| EvaluationError::InvalidParameter {
                    name: "anchor".to_string(),
                    reason,
                })?,
        };
        Self::new(pattern, anchor)
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn anchor(&self) -> Anchor {
        self.anchor
    }

    /// Non-null cells are compared through their text form. Null never
    /// matches.
    pub fn matches(&self, value: &Value) -> bool {
        match value {
            Value::Null => false,
            Value::Text(s) => self.regex.is_match(s),
            other => self.regex.is_match(&other.to_string()),
        }
    }

    /// FORMAT: every cell that does not match.
    pub fn evaluate<'a>(&self, ids: &'a [String], values: &[&'a Value]) -> Vec<Finding<'a>> {
        ids.iter()
            .zip(values)
            .filter(|(_, v)| !self.matches(v))
            .map(|(id, v)| {
                Finding::new(
                    id,
                    *v,
                    Expectation::Format {
                        pattern: self.pattern.clone(),
                    },
                )
            })
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_format_law() -> anyhow::Result<()> {
        let m = FormatMatcher::new("^[A-Z]{3,5}$", Anchor::Start)?;
        assert!(m.matches(&Value::from("AAPL")));
        assert!(!m.matches(&Value::from("aapl")));
        assert!(!m.matches(&Value::Null));
        Ok(())
    }

    #[test]
    fn test_start_anchor_allows_trailing_text() -> anyhow::Result<()> {
        let m = FormatMatcher::new("[A-Z]{3}", Anchor::Start)?;
        assert!(m.matches(&Value::from("ABCdef")));
        assert!(!m.matches(&Value::from("xABC")));
        Ok(())
    }

    #[test]
    fn test_full_anchor_requires_whole_value() -> anyhow::Result<()> {
        let m = FormatMatcher::new("[A-Z]{3}", Anchor::Full)?;
        assert!(m.matches(&Value::from("ABC")));
        assert!(!m.matches(&Value::from("ABCdef")));
        Ok(())
    }

    #[test]
    fn test_numbers_match_through_text_form() -> anyhow::Result<()> {
        let m = FormatMatcher::new(r"\d{4}", Anchor::Full)?;
        assert!(m.matches(&Value::Int(2024)));
        assert!(!m.matches(&Value::Float(20.24)));
        Ok(())
    }

    #[test]
    fn test_invalid_pattern() {
        let res = FormatMatcher::new("[unclosed", Anchor::Start);
        assert!(matches!(res, Err(EvaluationError::InvalidPattern { pattern, .. }) if pattern == "[unclosed"));
        let res = FormatMatcher::new("a)|(b", Anchor::Start);
        assert!(res.is_err());
    }

    #[test]
    fn test_from_params() -> anyhow::Result<()> {
        let missing = FormatMatcher::from_params(&RuleParams::new());
        assert!(matches!(missing, Err(EvaluationError::MissingParameter(p)) if p == "pattern"));

        let params = RuleParams::new()
            .with("pattern", r"\d{4}-\d{2}-\d{2}")
            .with("anchor", "full");
        let m = FormatMatcher::from_params(&params)?;
        assert_eq!(m.anchor(), Anchor::Full);
        assert_eq!(m.pattern(), r"\d{4}-\d{2}-\d{2}");

        let bad = RuleParams::new().with("pattern", "x").with("anchor", "middle");
        assert!(matches!(
            FormatMatcher::from_params(&bad),
            Err(EvaluationError::InvalidParameter { .. })
        ));
        Ok(())
    }
}
