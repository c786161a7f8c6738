// cdeq-core/src/domain/predicate/unique.rs

use std::collections::HashMap;

use crate::domain::dataset::Value;
use crate::domain::predicate::Finding;
use crate::domain::violation::Expectation;

/// UNIQUE: every record whose value occurs more than once in the column,
/// first occurrence included.
///
/// Nulls do not take part (NOT_NULL covers them): two missing values are
/// never reported as duplicates of each other, unlike a dataframe-style
/// `duplicated(keep=False)` check over a column with missing values.
pub fn unique<'a>(ids: &'a [String], values: &[&'a Value]) -> Vec<Finding<'a>> {
    let mut counts = HashMap::with_capacity(values.len());
    for key in values.iter().filter_map(|v| v.unique_key()) {
        *counts.entry(key).or_insert(0usize) += 1;
    }

    ids.iter()
        .zip(values)
        .filter_map(|(id, v)| {
            let count = v.unique_key().and_then(|k| counts.get(&k).copied())?;
            (count > 1).then(|| {
                Finding::new(
                    id,
                    *v,
                    Expectation::Unique {
                        duplicate_count: count,
                    },
                )
            })
        })
        .collect()
}
