use serde::{Deserialize, Serialize};

pub const STORE_TYPE_ID: &str = "store";

/// A store record as the backend returns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    pub id: String,
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub version: u64,
}

impl Store {
    pub fn to_ref(&self) -> StoreRef {
        StoreRef {
            key: self.key.clone(),
            id: Some(self.id.clone()),
            name: self.name.clone(),
            type_id: store_type_id(),
        }
    }
}

/// Reference to a store.
///
/// Units reference stores by key only; `id` and `name` are filled in once
/// the reference has been matched against the backend's store records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreRef {
    pub key: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default = "store_type_id")]
    pub type_id: String,
}

fn store_type_id() -> String {
    STORE_TYPE_ID.to_string()
}

impl StoreRef {
    pub fn from_key(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            id: None,
            name: None,
            type_id: store_type_id(),
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.id.is_some()
    }
}
