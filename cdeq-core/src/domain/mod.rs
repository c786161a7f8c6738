pub mod catalog;
pub mod dataset;
pub mod error;
pub mod predicate;
pub mod report;
pub mod resolver;
pub mod system;
pub mod violation;

// Re-exports pratiques pour simplifier les imports ailleurs
pub use error::{DomainError, EvaluationError};
