pub mod authorization;
pub mod entry_point;
pub mod organization;
pub mod projection;
pub mod stores;
pub mod tree;

use std::collections::HashMap;
use std::sync::Arc;

use bizorg_core::{ListParams, ListResult, ServiceError};
use thiserror::Error;
use tracing::debug;

use crate::backend::{BackendError, BusinessUnitBackend};
use crate::model::{BusinessUnit, Store, StoreRef};

/// Business-unit service error type.
#[derive(Debug, Error)]
pub enum OrgError {
    #[error("configuration: {0}")]
    Configuration(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// Parent chain longer than the depth bound. Always a data problem,
    /// never an "unresolved" result.
    #[error("cycle detected: parent chain of '{key}' exceeds {depth} levels")]
    CycleDetected { key: String, depth: usize },

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("validation: {0}")]
    Validation(String),

    #[error("backend: {0}")]
    Backend(String),
}

impl From<BackendError> for OrgError {
    fn from(e: BackendError) -> Self {
        match e {
            BackendError::NotFound(m) => OrgError::NotFound(m),
            BackendError::Conflict(m) => OrgError::Conflict(m),
            BackendError::Validation(m) => OrgError::Validation(m),
            BackendError::Storage(m) => OrgError::Backend(m),
        }
    }
}

impl From<OrgError> for ServiceError {
    fn from(e: OrgError) -> Self {
        match e {
            OrgError::Configuration(m) => ServiceError::Configuration(m),
            OrgError::NotFound(m) => ServiceError::NotFound(m),
            e @ OrgError::CycleDetected { .. } => ServiceError::DataIntegrity(e.to_string()),
            OrgError::Conflict(m) => ServiceError::Conflict(m),
            OrgError::Validation(m) => ServiceError::Validation(m),
            OrgError::Backend(m) => ServiceError::Backend(m),
        }
    }
}

/// Configuration for the organization service.
#[derive(Debug, Clone)]
pub struct OrganizationConfig {
    /// Role key that marks an associate as administrator. Required.
    pub admin_role_key: Option<String>,
    /// Longest parent chain followed during store resolution (default: 64).
    pub max_depth: usize,
    /// Page size for backend queries (default: 500).
    pub page_size: usize,
}

impl Default for OrganizationConfig {
    fn default() -> Self {
        Self {
            admin_role_key: None,
            max_depth: stores::DEFAULT_MAX_DEPTH,
            page_size: 500,
        }
    }
}

impl OrganizationConfig {
    pub fn with_admin_role(key: impl Into<String>) -> Self {
        Self {
            admin_role_key: Some(key.into()),
            ..Default::default()
        }
    }

    /// Check required settings. Returns the admin role key.
    pub fn validate(&self) -> Result<&str, OrgError> {
        let key = match self.admin_role_key.as_deref() {
            Some(k) if !k.trim().is_empty() => k,
            _ => {
                return Err(OrgError::Configuration(
                    "admin role key is not set".to_string(),
                ))
            }
        };
        if self.max_depth == 0 {
            return Err(OrgError::Configuration("max_depth must be at least 1".to_string()));
        }
        if self.page_size == 0 {
            return Err(OrgError::Configuration("page_size must be at least 1".to_string()));
        }
        Ok(key)
    }
}

/// Resolves organizations for accounts against a backend.
///
/// Holds no mutable state; every call re-derives its result from what the
/// backend returns.
pub struct OrganizationService {
    pub(crate) backend: Arc<dyn BusinessUnitBackend>,
    pub(crate) config: OrganizationConfig,
    admin_role_key: String,
}

impl OrganizationService {
    /// Create a new OrganizationService, validating the configuration.
    pub fn new(
        backend: Arc<dyn BusinessUnitBackend>,
        config: OrganizationConfig,
    ) -> Result<Arc<Self>, OrgError> {
        let admin_role_key = config.validate()?.to_string();
        Ok(Arc::new(Self {
            backend,
            config,
            admin_role_key,
        }))
    }

    pub fn admin_role_key(&self) -> &str {
        &self.admin_role_key
    }

    pub fn config(&self) -> &OrganizationConfig {
        &self.config
    }

    // ── Backend helpers ──

    /// Drain a paged backend query.
    pub(crate) fn fetch_all<F>(&self, mut query: F) -> Result<Vec<BusinessUnit>, OrgError>
    where
        F: FnMut(&ListParams) -> Result<ListResult<BusinessUnit>, BackendError>,
    {
        let mut params = ListParams::new(self.config.page_size, 0);
        let mut all = Vec::new();
        loop {
            let page = query(&params)?;
            let returned = page.items.len();
            all.extend(page.items);
            if returned == 0 || all.len() >= page.total {
                break;
            }
            params = params.next_page(returned);
        }
        Ok(all)
    }

    /// Get a unit by key, mapping absence to NotFound.
    pub(crate) fn get_unit(&self, key: &str) -> Result<BusinessUnit, OrgError> {
        self.backend
            .get_by_key(key)?
            .ok_or_else(|| OrgError::NotFound(format!("business unit '{}'", key)))
    }

    /// Fetch store records for every key referenced by `refs`.
    pub(crate) fn store_catalog<'a, I>(&self, refs: I) -> Result<HashMap<String, Store>, OrgError>
    where
        I: IntoIterator<Item = &'a StoreRef>,
    {
        let mut keys: Vec<String> = Vec::new();
        for r in refs {
            if !keys.contains(&r.key) {
                keys.push(r.key.clone());
            }
        }
        if keys.is_empty() {
            return Ok(HashMap::new());
        }

        let stores = self.backend.get_stores(&keys)?;
        debug!("fetched {} of {} referenced stores", stores.len(), keys.len());
        Ok(stores.into_iter().map(|s| (s.key.clone(), s)).collect())
    }
}

/// Replace key-only store references with full ones from `catalog`.
/// A key missing from the catalog is NotFound.
pub(crate) fn enrich_stores(
    refs: &[StoreRef],
    catalog: &HashMap<String, Store>,
) -> Result<Vec<StoreRef>, OrgError> {
    refs.iter()
        .map(|r| {
            catalog
                .get(&r.key)
                .map(Store::to_ref)
                .ok_or_else(|| OrgError::NotFound(format!("store '{}'", r.key)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::InMemoryBackend;

    #[test]
    fn test_config_requires_admin_role() {
        let err = OrganizationConfig::default().validate().unwrap_err();
        assert!(matches!(err, OrgError::Configuration(_)));

        let blank = OrganizationConfig::with_admin_role("  ");
        assert!(matches!(blank.validate(), Err(OrgError::Configuration(_))));

        let ok = OrganizationConfig::with_admin_role("admin");
        assert_eq!(ok.validate().unwrap(), "admin");
    }

    #[test]
    fn test_config_rejects_zero_bounds() {
        let config = OrganizationConfig {
            max_depth: 0,
            ..OrganizationConfig::with_admin_role("admin")
        };
        assert!(matches!(config.validate(), Err(OrgError::Configuration(_))));
    }

    #[test]
    fn test_service_new_fails_without_admin_role() {
        let backend = Arc::new(InMemoryBackend::new());
        let result = OrganizationService::new(backend, OrganizationConfig::default());
        assert!(matches!(result, Err(OrgError::Configuration(_))));
    }

    #[test]
    fn test_error_mapping() {
        let cycle: ServiceError = OrgError::CycleDetected {
            key: "a".into(),
            depth: 64,
        }
        .into();
        assert_eq!(cycle.error_code(), "DATA_INTEGRITY");
        assert!(cycle.to_string().contains("cycle"));

        let conflict: ServiceError = OrgError::from(BackendError::Conflict("v2".into())).into();
        assert_eq!(conflict.error_code(), "CONFLICT");
        assert!(conflict.is_retryable());

        let missing: ServiceError = OrgError::from(BackendError::NotFound("x".into())).into();
        assert_eq!(missing.status_code(), 404);
    }

    #[test]
    fn test_enrich_stores_missing_key() {
        let mut catalog = HashMap::new();
        catalog.insert(
            "eu".to_string(),
            Store {
                id: "s-eu".into(),
                key: "eu".into(),
                name: Some("Europe".into()),
                version: 1,
            },
        );
        let enriched = enrich_stores(&[StoreRef::from_key("eu")], &catalog).unwrap();
        assert_eq!(enriched[0].id.as_deref(), Some("s-eu"));

        let err = enrich_stores(&[StoreRef::from_key("us")], &catalog).unwrap_err();
        assert!(matches!(err, OrgError::NotFound(_)));
    }
}
