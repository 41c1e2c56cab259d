use serde::{Deserialize, Serialize};

/// An update forwarded to the backend.
///
/// `actions` are opaque here: the resolver neither builds nor inspects them,
/// it only carries them alongside the expected version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateRequest {
    pub key: String,
    /// Version the caller last saw. A mismatch is a conflict.
    pub version: u64,
    pub actions: Vec<serde_json::Value>,
}

impl UpdateRequest {
    pub fn new(key: impl Into<String>, version: u64, actions: Vec<serde_json::Value>) -> Self {
        Self {
            key: key.into(),
            version,
            actions,
        }
    }
}
