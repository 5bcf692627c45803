//! Host-emulator configuration: file resolution, open policy, record handling.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// How hard EXECIO tries to open a file it has not seen before.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpenPolicy {
    /// DISKR: read-write, then read-only, then create empty.
    /// DISKW: create or truncate for read-write.
    #[default]
    Permissive,
    /// DISKR: read-write only. DISKW: create or truncate for read-write.
    Strict,
}

/// Top-level host-emulator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostEmuConfig {
    /// Directory that relative file names resolve against.
    #[serde(default)]
    pub base_dir: Option<PathBuf>,
    /// Open policy for files not yet in the registry.
    #[serde(default)]
    pub open_policy: OpenPolicy,
    /// Strip a trailing carriage return from records read with DISKR.
    #[serde(default = "default_strip_carriage_return")]
    pub strip_carriage_return: bool,
}

impl Default for HostEmuConfig {
    fn default() -> Self {
        Self {
            base_dir: None,
            open_policy: OpenPolicy::default(),
            strip_carriage_return: default_strip_carriage_return(),
        }
    }
}

impl HostEmuConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> std::result::Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Resolve an EXECIO file name to a path.
    pub fn resolve(&self, file_name: &str) -> PathBuf {
        let path = Path::new(file_name);
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

fn default_strip_carriage_return() -> bool {
    true
}
