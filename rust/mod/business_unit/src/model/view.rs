use serde::{Deserialize, Serialize};

use crate::model::{KeyReference, StoreMode, StoreRef};

/// Customer reference with every profile field stripped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerId {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrimmedAssociate {
    pub customer: CustomerId,
    pub role_keys: Vec<String>,
}

/// The public subset of a business unit.
///
/// Nothing beyond these fields crosses the projection boundary; in particular
/// associate profile data never does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrimmedBusinessUnit {
    pub top_level_unit: KeyReference,
    pub key: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_unit: Option<KeyReference>,
    pub store_mode: StoreMode,
    /// Effective stores, not necessarily the unit's own list. Every ref is
    /// enriched from the store catalog, so `id` is always present.
    pub stores: Vec<StoreRef>,
    pub is_admin: bool,
    pub is_root_admin: bool,
    pub associates: Vec<TrimmedAssociate>,
}

/// A business unit as seen by one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationView {
    pub business_unit: TrimmedBusinessUnit,
    /// Effective stores with `id` and `name` filled in from the catalog.
    pub resolved_stores: Vec<StoreRef>,
    pub is_admin: bool,
    pub is_root_admin: bool,
}

impl OrganizationView {
    pub fn key(&self) -> &str {
        &self.business_unit.key
    }
}
