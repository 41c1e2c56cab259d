//! CLI configuration.
//!
//! Reads `~/.bizorg/config.toml`:
//!
//! ```toml
//! [organization]
//! admin_role_key = "admin"
//! max_depth = 64
//! page_size = 500
//!
//! [storage]
//! data_dir = "/var/lib/bizorg"
//! snapshot = "snapshot.json"
//! ```

use std::path::{Path, PathBuf};

use bizorg_business_unit::service::stores::DEFAULT_MAX_DEPTH;
use bizorg_business_unit::OrganizationConfig;
use bizorg_core::ServiceConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizationSection {
    /// Role key that marks administrators. No default: must be configured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_role_key: Option<String>,

    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

fn default_page_size() -> usize {
    500
}

impl Default for OrganizationSection {
    fn default() -> Self {
        Self {
            admin_role_key: None,
            max_depth: default_max_depth(),
            page_size: default_page_size(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<String>,

    /// Snapshot file, relative to `data_dir` unless absolute.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<String>,
}

/// Client configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BizorgConfig {
    #[serde(default)]
    pub organization: OrganizationSection,

    #[serde(default)]
    pub storage: StorageSection,
}

impl BizorgConfig {
    /// Default config file path: ~/.bizorg/config.toml.
    pub fn default_path() -> PathBuf {
        dirs_path().join("config.toml")
    }

    /// Load config from disk, or return default if file doesn't exist.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: BizorgConfig = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn organization_config(&self) -> OrganizationConfig {
        OrganizationConfig {
            admin_role_key: self.organization.admin_role_key.clone(),
            max_depth: self.organization.max_depth,
            page_size: self.organization.page_size,
        }
    }

    /// Storage locations, with `snapshot` taking precedence over the file.
    pub fn service_config(&self, snapshot: Option<&str>) -> ServiceConfig {
        ServiceConfig {
            data_dir: self.storage.data_dir.as_ref().map(PathBuf::from),
            snapshot_path: snapshot
                .or(self.storage.snapshot.as_deref())
                .map(PathBuf::from),
        }
    }
}

/// Return the bizorg config directory (~/.bizorg).
fn dirs_path() -> PathBuf {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".bizorg")
}
