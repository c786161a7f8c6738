// cdeq-core/src/domain/error.rs

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum DomainError {
    #[error("Unknown system '{system}' (known systems: {known})")]
    #[diagnostic(
        code(cdeq::domain::unknown_system),
        help("The engine produced a violation for a system outside the registry. This is a bug in the dispatcher, not bad input data.")
    )]
    UnknownSystem { system: String, known: String },

    #[error("Catalog Error: {0}")]
    #[diagnostic(code(cdeq::domain::catalog))]
    CatalogError(String),

    #[error("Duplicate rule id '{0}' in catalog")]
    #[diagnostic(
        code(cdeq::domain::duplicate_rule),
        help("Rule ids key the reconciliation report and must be unique.")
    )]
    DuplicateRuleId(String),
}

/// Failure of a single (rule, system) evaluation.
///
/// These never abort a run: the dispatcher logs them and contributes zero
/// violations for the pair.
#[derive(Error, Debug, Diagnostic, PartialEq)]
pub enum EvaluationError {
    #[error("Unsupported rule kind '{0}'")]
    #[diagnostic(code(cdeq::rule::unsupported_kind))]
    UnsupportedKind(String),

    #[error("Missing required parameter '{0}'")]
    #[diagnostic(code(cdeq::rule::missing_parameter))]
    MissingParameter(String),

    #[error("Invalid parameter '{name}': {reason}")]
    #[diagnostic(code(cdeq::rule::invalid_parameter))]
    InvalidParameter { name: String, reason: String },

    #[error("Invalid regex pattern '{pattern}': {reason}")]
    #[diagnostic(code(cdeq::rule::invalid_pattern))]
    InvalidPattern { pattern: String, reason: String },

    #[error("No valid enum values defined for column '{0}'")]
    #[diagnostic(
        code(cdeq::rule::no_enum_set),
        help("Add a 'values' list to the rule definition or an entry under 'enum-sets' in the project file.")
    )]
    NoEnumSet(String),

    #[error("Type mismatch on record '{record_id}': expected {expected}, found {found}")]
    #[diagnostic(code(cdeq::rule::type_mismatch))]
    TypeMismatch {
        record_id: String,
        expected: &'static str,
        found: &'static str,
    },
}

impl EvaluationError {
    /// Definition gaps are logged as warnings. Invalid patterns and type
    /// mismatches are logged as errors.
    pub fn is_definition_gap(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedKind(_)
                | Self::MissingParameter(_)
                | Self::InvalidParameter { .. }
                | Self::NoEnumSet(_)
        )
    }
}
