// cdeq-core/src/domain/report/mod.rs

pub mod reconciliation;
pub mod record;
pub mod summary;

pub use reconciliation::{Presence, ReconciliationRow, ReconciliationTable, SystemFlag};
pub use record::ViolationRecord;
pub use summary::ViolationSummary;
