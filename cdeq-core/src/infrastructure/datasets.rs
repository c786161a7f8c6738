// cdeq-core/src/infrastructure/datasets.rs

use std::fs;
use std::path::Path;
use tracing::{debug, info, instrument, warn};
use walkdir::WalkDir;

use crate::domain::dataset::{Dataset, DatasetMap, Record, Value};
use crate::domain::system::SystemRegistry;
use crate::infrastructure::error::InfrastructureError;

/// Discovers `<system>.csv` / `<system>.json` files under `data_dir`.
///
/// Datasets come back in registry order so rules without explicit systems
/// fan out in report column order. Files for unknown systems are ignored.
/// The `id_field` column is always read as text.
#[instrument(skip(systems))]
pub fn load_datasets(
    data_dir: &Path,
    systems: &SystemRegistry,
    id_field: &str,
) -> Result<DatasetMap, InfrastructureError> {
    if !data_dir.exists() {
        return Err(InfrastructureError::ConfigNotFound(
            data_dir.display().to_string(),
        ));
    }

    let mut found: Vec<(usize, String, Dataset)> = Vec::new();

    for entry in WalkDir::new(data_dir)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let (Some(stem), Some(ext)) = (
            path.file_stem().and_then(|s| s.to_str()),
            path.extension().and_then(|s| s.to_str()),
        ) else {
            continue;
        };

        let ext = ext.to_ascii_lowercase();
        if ext != "csv" && ext != "json" {
            debug!(path = ?path, "Ignoring non-dataset file");
            continue;
        }
        let Some(position) = systems.position(stem) else {
            warn!(path = ?path, system = stem, "File does not match a configured system, skipping");
            continue;
        };
        if found.iter().any(|(_, name, _)| name == stem) {
            warn!(path = ?path, system = stem, "Dataset already loaded for system, skipping");
            continue;
        }

        let dataset = if ext == "csv" {
            read_csv(path, id_field)?
        } else {
            read_json(path, id_field)?
        };

        info!(system = stem, records = dataset.len(), "Dataset loaded");
        found.push((position, stem.to_string(), dataset));
    }

    found.sort_by_key(|(position, _, _)| *position);
    Ok(found
        .into_iter()
        .map(|(_, system, dataset)| (system, dataset))
        .collect())
}

/// Header row required. Cells are typed on read (see [`Value::infer`]),
/// except the identifier column which keeps its text verbatim.
pub fn read_csv(path: &Path, id_field: &str) -> Result<Dataset, InfrastructureError> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let record: Record = headers
            .iter()
            .zip(row.iter())
            .map(|(h, cell)| {
                let value = if h == id_field {
                    Value::from(cell)
                } else {
                    Value::infer(cell)
                };
                (h.clone(), value)
            })
            .collect();
        records.push(record);
    }
    Ok(Dataset::new(headers, records))
}

/// Array of flat objects. Nested values are kept as their JSON text, and
/// numeric identifiers are turned into text.
pub fn read_json(path: &Path, id_field: &str) -> Result<Dataset, InfrastructureError> {
    let content = fs::read_to_string(path)?;
    let rows: Vec<serde_json::Map<String, serde_json::Value>> = serde_json::from_str(&content)?;

    let records = rows
        .into_iter()
        .map(|row| {
            row.into_iter()
                .map(|(k, v)| {
                    let value = match v {
                        serde_json::Value::Number(n) if k == id_field => Value::Text(n.to_string()),
                        other => from_json(other),
                    };
                    (k, value)
                })
                .collect::<Record>()
        })
        .collect();
    Ok(Dataset::from_records(records))
}

fn from_json(value: serde_json::Value) -> Value {
    match value {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Int(i),
            None => n.as_f64().map_or(Value::Null, Value::Float),
        },
        serde_json::Value::String(s) => Value::Text(s),
        other => Value::Text(other.to_string()),
    }
}
