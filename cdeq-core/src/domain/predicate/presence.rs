// cdeq-core/src/domain/predicate/presence.rs

use crate::domain::dataset::Value;
use crate::domain::predicate::Finding;
use crate::domain::violation::{EXPECTED_NOT_EMPTY, EXPECTED_NOT_NULL, Expectation};

/// NOT_NULL: every null (or absent) cell.
pub fn not_null<'a>(ids: &'a [String], values: &[&'a Value]) -> Vec<Finding<'a>> {
    ids.iter()
        .zip(values)
        .filter(|(_, v)| v.is_null())
        .map(|(id, v)| {
            Finding::new(
                id,
                *v,
                Expectation::NotNull {
                    expected: EXPECTED_NOT_NULL.to_string(),
                },
            )
        })
        .collect()
}

/// NOT_EMPTY: null cells and cells equal to the empty string.
/// Whitespace-only strings are not empty.
pub fn not_empty<'a>(ids: &'a [String], values: &[&'a Value]) -> Vec<Finding<'a>> {
    ids.iter()
        .zip(values)
        .filter(|(_, v)| v.is_null() || v.as_text().is_some_and(str::is_empty))
        .map(|(id, v)| {
            Finding::new(
                id,
                *v,
                Expectation::NotEmpty {
                    expected: EXPECTED_NOT_EMPTY.to_string(),
                },
            )
        })
        .collect()
}
