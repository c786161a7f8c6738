// cdeq-core/src/infrastructure/fs.rs

use crate::infrastructure::error::InfrastructureError;
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::Path;

/// Write content to a file atomically using a temporary file.
///
/// The temporary file lives in the target's directory so the final rename
/// stays on one filesystem. Readers see either the old report or the new
/// one, never a truncated file.
pub fn atomic_write<P: AsRef<Path>, C: AsRef<[u8]>>(
    path: P,
    content: C,
) -> Result<(), InfrastructureError> {
    let path = path.as_ref();
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    if !parent.as_os_str().is_empty() {
        fs::create_dir_all(parent)?;
    }

    let mut temp_file = tempfile::NamedTempFile::new_in(parent)?;
    temp_file.write_all(content.as_ref())?;
    temp_file
        .persist(path)
        .map_err(|e| InfrastructureError::Io(e.error))?;

    Ok(())
}

/// Pretty-printed JSON artifact, written atomically.
pub fn write_json<P: AsRef<Path>, T: Serialize + ?Sized>(
    path: P,
    value: &T,
) -> Result<(), InfrastructureError> {
    let body = serde_json::to_vec_pretty(value)?;
    atomic_write(path, body)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use anyhow::Result;
    use tempfile::tempdir;

    #[test]
    fn test_atomic_write_overwrites_existing() -> Result<()> {
        let dir = tempdir()?;
        let file_path = dir.path().join("reconciliation.json");

        atomic_write(&file_path, "[]")?;
        atomic_write(&file_path, "[{}]")?;

        assert_eq!(fs::read_to_string(file_path)?, "[{}]");
        Ok(())
    }

    #[test]
    fn test_write_json_creates_target_dir() -> Result<()> {
        let dir = tempdir()?;
        let file_path = dir.path().join("target").join("analysis.json");

        write_json(&file_path, &serde_json::json!({ "total_violations": 0 }))?;

        let parsed: serde_json::Value = serde_json::from_str(&fs::read_to_string(file_path)?)?;
        assert_eq!(parsed["total_violations"], 0);
        Ok(())
    }
}
