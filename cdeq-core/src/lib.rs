// cdeq-core/src/lib.rs

#![allow(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::perf)]

// --- MODULES HEXAGONAUX ---

// 1. Ports (Interfaces / Traits)
// Catalog and dataset suppliers.
pub mod ports;

// 2. Domain (Cœur du métier)
// Catalog, datasets, predicates, violations, reports.
// Ne dépend de RIEN d'autre (ni infra, ni app).
pub mod domain;

// 3. Infrastructure (Adapters)
// Project config, YAML catalog, CSV/JSON datasets, atomic writes.
pub mod infrastructure;

// 4. Application (Use Cases)
// Dispatcher, evaluation driver, analysis run, clean.
pub mod application;

// --- GESTION DES ERREURS GLOBALE ---
pub mod error;

// --- RE-EXPORTS (FACADE) ---
pub use error::CdeqError;
