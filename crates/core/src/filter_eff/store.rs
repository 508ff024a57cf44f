//! JSON result files under `FilterEff/`.

use std::collections::BTreeMap;
use std::path::Path;

use super::error::FilterEffError;
use super::types::EfficiencyRecord;

pub type ResultMap = BTreeMap<String, EfficiencyRecord>;

fn write_failed(path: &Path, reason: impl ToString) -> FilterEffError {
    FilterEffError::ResultsWriteFailed {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

/// Overwrites `path` with `results` as pretty JSON, creating the parent
/// directory if needed.
pub async fn save_results(path: &Path, results: &ResultMap) -> Result<(), FilterEffError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| write_failed(path, e))?;
    }

    let json = serde_json::to_string_pretty(results).map_err(|e| write_failed(path, e))?;
    tokio::fs::write(path, json)
        .await
        .map_err(|e| write_failed(path, e))
}

/// Merges `results` into whatever `path` already holds. Entries already in
/// the file but absent from `results` are kept untouched.
pub async fn merge_results(path: &Path, results: &ResultMap) -> Result<(), FilterEffError> {
    let mut merged: BTreeMap<String, serde_json::Value> = match tokio::fs::read_to_string(path).await
    {
        Ok(content) => serde_json::from_str(&content).map_err(|e| write_failed(path, e))?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
        Err(e) => return Err(write_failed(path, e)),
    };

    for (process, record) in results {
        let value = serde_json::to_value(record).map_err(|e| write_failed(path, e))?;
        merged.insert(process.clone(), value);
    }

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| write_failed(path, e))?;
    }
    let json = serde_json::to_string_pretty(&merged).map_err(|e| write_failed(path, e))?;
    tokio::fs::write(path, json)
        .await
        .map_err(|e| write_failed(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(eff: f64) -> EfficiencyRecord {
        EfficiencyRecord {
            filter_efficiency: eff,
            filter_efficiency_error: Some(0.001),
            cross_section: None,
            cross_section_error: None,
            total_files: 1,
            total_events: None,
        }
    }

    #[tokio::test]
    async fn test_save_creates_directory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("FilterEff/results_2017.json");

        let mut results = ResultMap::new();
        results.insert("B".to_string(), record(0.2));
        results.insert("A".to_string(), record(0.1));
        save_results(&path, &results).await.unwrap();

        let loaded: ResultMap =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded, results);
        assert_eq!(loaded.keys().next().unwrap(), "A");
    }

    #[tokio::test]
    async fn test_merge_keeps_existing_entries() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sample_X.json");
        std::fs::write(&path, r#"{"Old": {"note": "hand edited"}, "X": {"filter_efficiency": 9.0}}"#)
            .unwrap();

        let mut results = ResultMap::new();
        results.insert("X".to_string(), record(0.3));
        merge_results(&path, &results).await.unwrap();

        let merged: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(merged["Old"]["note"], "hand edited");
        assert_eq!(merged["X"]["filter_efficiency"], 0.3);
    }

    #[tokio::test]
    async fn test_merge_rejects_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sample_X.json");
        std::fs::write(&path, "not json").unwrap();

        let err = merge_results(&path, &ResultMap::new()).await.unwrap_err();
        assert!(matches!(err, FilterEffError::ResultsWriteFailed { .. }));
    }
}
