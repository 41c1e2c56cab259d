use std::path::PathBuf;

/// Storage locations shared by every binary.
///
/// Each binary fills these in from its config file and flags, then hands
/// them to backend initialization.
#[derive(Debug, Clone, Default)]
pub struct ServiceConfig {
    /// Directory holding snapshot data.
    pub data_dir: Option<PathBuf>,

    /// Path to the business-unit snapshot file.
    /// Defaults to `{data_dir}/snapshot.json` if not specified.
    /// A relative path is resolved against `data_dir`.
    pub snapshot_path: Option<PathBuf>,
}

impl ServiceConfig {
    /// Resolve the snapshot path, falling back to `{data_dir}/snapshot.json`.
    pub fn resolve_snapshot_path(&self) -> PathBuf {
        match &self.snapshot_path {
            Some(p) if p.is_absolute() => p.clone(),
            Some(p) => self.resolve_data_subpath(p),
            None => self.resolve_data_subpath("snapshot.json"),
        }
    }

    fn resolve_data_subpath(&self, name: impl Into<PathBuf>) -> PathBuf {
        let name = name.into();
        self.data_dir
            .as_ref()
            .map(|d| d.join(&name))
            .unwrap_or(name)
    }
}
