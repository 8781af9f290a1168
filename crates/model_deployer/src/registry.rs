//! Service registry persistence
//!
//! Reads and writes `ServiceRecord` JSON files.

use std::path::{Path, PathBuf};

use contracts::{ContractError, ServiceRecord};
use tracing::{debug, warn};

/// Path of the record file for `uuid`
pub fn record_path(dir: &Path, uuid: &str) -> PathBuf {
    dir.join(format!("{uuid}.json"))
}

/// Load every record in `dir`, sorted by file name
///
/// Files that are not valid records are skipped with a warning.
pub async fn list_records(dir: &Path) -> Result<Vec<(PathBuf, ServiceRecord)>, ContractError> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(dir = %dir.display(), "service registry does not exist yet");
            return Ok(Vec::new());
        }
        Err(e) => return Err(registry_read(dir, e)),
    };

    let mut paths = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(|e| registry_read(dir, e))? {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) == Some("json") {
            paths.push(path);
        }
    }
    paths.sort();

    let mut records = Vec::with_capacity(paths.len());
    for path in paths {
        match read_record(&path).await {
            Ok(record) => records.push((path, record)),
            Err(e) => warn!(error = %e, "skipping unreadable service record"),
        }
    }

    Ok(records)
}

/// Read one record file
pub async fn read_record(path: &Path) -> Result<ServiceRecord, ContractError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| record_parse(path, e.to_string()))?;
    serde_json::from_str(&content).map_err(|e| record_parse(path, e.to_string()))
}

/// Write a record, replacing the file atomically
pub async fn write_record(path: &Path, record: &ServiceRecord) -> Result<(), ContractError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let json = serde_json::to_string_pretty(record)
        .map_err(|e| ContractError::Other(format!("service record serialize error: {e}")))?;

    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, json).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

fn registry_read(dir: &Path, e: std::io::Error) -> ContractError {
    ContractError::RegistryRead {
        path: dir.display().to_string(),
        message: e.to_string(),
    }
}

fn record_parse(path: &Path, message: String) -> ContractError {
    ContractError::RecordParse {
        path: path.display().to_string(),
        message,
    }
}
