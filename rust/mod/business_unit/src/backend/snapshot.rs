use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::backend::{BackendError, InMemoryBackend};
use crate::model::{BusinessUnit, Store};

/// Point-in-time export of the backend's business units and stores.
///
/// ```json
/// {
///   "businessUnits": [{"key": "acme", "name": "ACME", "topLevelUnit": {...}, ...}],
///   "stores": [{"id": "...", "key": "eu", "name": "Europe"}]
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub business_units: Vec<BusinessUnit>,
    #[serde(default)]
    pub stores: Vec<Store>,
}

/// Loads a snapshot file into an [`InMemoryBackend`].
pub struct SnapshotLoader;

impl SnapshotLoader {
    /// Read and parse the snapshot at `path`.
    pub fn load(path: &Path) -> Result<InMemoryBackend, BackendError> {
        if !path.is_file() {
            return Err(BackendError::NotFound(format!(
                "snapshot file {} does not exist",
                path.display()
            )));
        }

        let data = fs::read(path).map_err(|e| BackendError::Storage(e.to_string()))?;
        let snapshot = Self::parse(&data)?;
        info!(
            "loaded snapshot {}: {} business units, {} stores",
            path.display(),
            snapshot.business_units.len(),
            snapshot.stores.len()
        );
        Ok(Self::into_backend(snapshot))
    }

    /// Parse snapshot JSON, reporting (but keeping) suspicious records.
    pub fn parse(data: &[u8]) -> Result<Snapshot, BackendError> {
        let snapshot: Snapshot = serde_json::from_slice(data)
            .map_err(|e| BackendError::Validation(format!("invalid snapshot: {}", e)))?;
        Self::audit(&snapshot);
        Ok(snapshot)
    }

    pub fn into_backend(snapshot: Snapshot) -> InMemoryBackend {
        InMemoryBackend::with_data(snapshot.business_units, snapshot.stores)
    }

    fn audit(snapshot: &Snapshot) {
        let mut keys = HashSet::new();
        for unit in &snapshot.business_units {
            if !keys.insert(unit.key.as_str()) {
                warn!("snapshot: duplicate business unit key {}", unit.key);
            }
        }

        let store_keys: HashSet<&str> = snapshot.stores.iter().map(|s| s.key.as_str()).collect();
        for unit in &snapshot.business_units {
            if let Some(parent) = unit.parent_key() {
                if !keys.contains(parent) {
                    warn!("snapshot: business unit {} has unknown parent {}", unit.key, parent);
                }
            } else if unit.top_level_key() != unit.key {
                warn!(
                    "snapshot: root business unit {} names {} as its top-level unit",
                    unit.key,
                    unit.top_level_key()
                );
            }
            for store in &unit.stores {
                if !store_keys.contains(store.key.as_str()) {
                    debug!("snapshot: business unit {} references unknown store {}", unit.key, store.key);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::BusinessUnitBackend;

    const SNAPSHOT: &str = r#"{
        "businessUnits": [
            {
                "key": "acme",
                "name": "ACME",
                "storeMode": "Explicit",
                "topLevelUnit": {"key": "acme", "typeId": "business-unit"},
                "stores": [{"key": "eu", "typeId": "store"}],
                "version": 4
            },
            {
                "key": "acme-east",
                "name": "ACME East",
                "storeMode": "FromParent",
                "unitType": "Division",
                "parentUnit": {"key": "acme", "typeId": "business-unit"},
                "topLevelUnit": {"key": "acme", "typeId": "business-unit"}
            }
        ],
        "stores": [{"id": "s-eu", "key": "eu", "name": "Europe"}]
    }"#;

    #[test]
    fn test_load_snapshot_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.json");
        std::fs::write(&path, SNAPSHOT).unwrap();

        let backend = SnapshotLoader::load(&path).unwrap();
        assert_eq!(backend.unit_count().unwrap(), 2);
        let east = backend.get_by_key("acme-east").unwrap().unwrap();
        assert_eq!(east.parent_key(), Some("acme"));
        let stores = backend.get_stores(&["eu".to_string()]).unwrap();
        assert_eq!(stores[0].name.as_deref(), Some("Europe"));
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let result = SnapshotLoader::load(&dir.path().join("nope.json"));
        assert!(matches!(result, Err(BackendError::NotFound(_))));
    }

    #[test]
    fn test_invalid_json_is_rejected() {
        let result = SnapshotLoader::parse(b"{\"businessUnits\": [{\"key\": 1}]}");
        assert!(matches!(result, Err(BackendError::Validation(_))));
    }

    #[test]
    fn test_empty_snapshot() {
        let snapshot = SnapshotLoader::parse(b"{}").unwrap();
        assert!(snapshot.business_units.is_empty());
        assert!(snapshot.stores.is_empty());
    }
}
