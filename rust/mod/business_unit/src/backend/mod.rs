pub mod memory;
pub mod snapshot;

use bizorg_core::{ListParams, ListResult};
use thiserror::Error;

use crate::model::{BusinessUnit, Store, UpdateRequest};

pub use memory::InMemoryBackend;
pub use snapshot::{Snapshot, SnapshotLoader};

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("version conflict: {0}")]
    Conflict(String),

    #[error("invalid request: {0}")]
    Validation(String),

    #[error("storage error: {0}")]
    Storage(String),
}

/// The commerce backend that owns business units and stores.
///
/// The resolver only consumes this interface. Inheritance of associates is
/// resolved by the backend before results are returned.
pub trait BusinessUnitBackend: Send + Sync {
    /// Units where the account is a direct or inherited associate.
    fn query_for_account(
        &self,
        account_id: &str,
        params: &ListParams,
    ) -> Result<ListResult<BusinessUnit>, BackendError>;

    /// All units whose top-level unit is `top_level_key`.
    fn query_by_top_level(
        &self,
        top_level_key: &str,
        params: &ListParams,
    ) -> Result<ListResult<BusinessUnit>, BackendError>;

    /// Get one unit by key. Returns None if the key does not exist.
    fn get_by_key(&self, key: &str) -> Result<Option<BusinessUnit>, BackendError>;

    /// Store records for the given keys. Unknown keys are omitted.
    fn get_stores(&self, keys: &[String]) -> Result<Vec<Store>, BackendError>;

    /// Apply an update. Returns BackendError::Conflict if `request.version`
    /// is not the unit's current version.
    fn update(&self, request: UpdateRequest) -> Result<BusinessUnit, BackendError>;
}
