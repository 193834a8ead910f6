//! Counterpart presence and version lookup

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::CounterpartConfig;

/// Answers whether the counterpart application is installed, and which version
pub trait PresenceQuery: Send + Sync {
    /// Installed version code, or `None` when the counterpart is absent
    fn installed_version(&self) -> Option<u64>;

    fn is_installed(&self) -> bool {
        self.installed_version().is_some()
    }

    /// Installed version code; an absent counterpart reports 0
    fn version_code(&self) -> u64 {
        self.installed_version().unwrap_or(0)
    }
}

/// Presence query with a fixed answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedPresence(Option<u64>);

impl FixedPresence {
    pub fn installed(version_code: u64) -> Self {
        Self(Some(version_code))
    }

    pub fn absent() -> Self {
        Self(None)
    }
}

impl PresenceQuery for FixedPresence {
    fn installed_version(&self) -> Option<u64> {
        self.0
    }
}

/// On-disk package manifest
#[derive(Debug, Deserialize)]
struct PackageManifest {
    version_code: u64,
}

/// Looks the counterpart up in a directory of package manifests
///
/// The counterpart is installed when `<manifest_dir>/<package_name>.toml`
/// exists and carries a `version_code`. The file is read on every query so
/// upgrades are picked up without restarting the host.
#[derive(Debug, Clone)]
pub struct ManifestPresence {
    manifest_dir: PathBuf,
    package_name: String,
}

impl ManifestPresence {
    pub fn new(manifest_dir: impl Into<PathBuf>, package_name: impl Into<String>) -> Self {
        Self {
            manifest_dir: manifest_dir.into(),
            package_name: package_name.into(),
        }
    }

    pub fn from_config(config: &CounterpartConfig) -> Self {
        Self::new(&config.manifest_dir, &config.package_name)
    }

    /// Path of the manifest this query reads
    pub fn manifest_path(&self) -> PathBuf {
        self.manifest_dir.join(format!("{}.toml", self.package_name))
    }

    fn read_manifest(path: &Path) -> anyhow::Result<PackageManifest> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }
}

impl PresenceQuery for ManifestPresence {
    fn installed_version(&self) -> Option<u64> {
        let path = self.manifest_path();
        match Self::read_manifest(&path) {
            Ok(manifest) => Some(manifest.version_code),
            Err(e) => {
                // Any lookup failure counts as "not installed"
                debug!(path = ?path, error = %e, "Counterpart manifest unavailable");
                None
            }
        }
    }
}
