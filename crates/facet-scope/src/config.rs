use std::path::{Path, PathBuf};

use facet_store::DEFAULT_COMPRESSION_LEVEL;
use serde::{Deserialize, Serialize};

use crate::error::{ScopeError, ScopeResult};

/// Top-level repository configuration, read from TOML.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScopeConfig {
    pub snapshot: SnapshotConfig,
    pub store: StoreConfig,
    pub telemetry: TelemetryConfig,
}

impl ScopeConfig {
    pub fn from_toml_str(s: &str) -> ScopeResult<Self> {
        toml::from_str(s).map_err(|e| ScopeError::Config(e.to_string()))
    }

    /// Read a config file. A missing file yields the defaults.
    pub fn load(path: &Path) -> ScopeResult<Self> {
        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_toml_str(&contents),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn to_toml_string(&self) -> ScopeResult<String> {
        toml::to_string_pretty(self).map_err(|e| ScopeError::Config(e.to_string()))
    }
}

/// Switches applied while turning a working-tree component into a version.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotConfig {
    /// Convert CRLF to LF in text files before hashing.
    pub normalize_line_endings: bool,
    /// Look dependencies up in the workspace map without their version.
    /// The version being persisted is newer than the one the map records.
    pub dependency_lookup_ignores_version: bool,
    /// Revert source paths of dependencies resolved through custom module
    /// resolution. Those paths were never stripped when checked out.
    pub revert_custom_resolved_paths: bool,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            normalize_line_endings: true,
            dependency_lookup_ignores_version: true,
            revert_custom_resolved_paths: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Root of the filesystem store; `None` keeps everything in memory.
    pub path: Option<PathBuf>,
    pub compression_level: i32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: None,
            compression_level: DEFAULT_COMPRESSION_LEVEL,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,
    pub ansi: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            ansi: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = ScopeConfig::default();
        assert!(c.snapshot.normalize_line_endings);
        assert!(c.snapshot.dependency_lookup_ignores_version);
        assert!(!c.snapshot.revert_custom_resolved_paths);
        assert!(c.store.path.is_none());
        assert_eq!(c.store.compression_level, DEFAULT_COMPRESSION_LEVEL);
        assert_eq!(c.telemetry.filter, "info");
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let c = ScopeConfig::from_toml_str(
            r#"
            [snapshot]
            normalize_line_endings = false

            [store]
            path = "/var/lib/facet"
            "#,
        )
        .unwrap();
        assert!(!c.snapshot.normalize_line_endings);
        assert!(c.snapshot.dependency_lookup_ignores_version);
        assert_eq!(c.store.path, Some(PathBuf::from("/var/lib/facet")));
        assert_eq!(c.store.compression_level, DEFAULT_COMPRESSION_LEVEL);
        assert!(c.telemetry.ansi);
    }

    #[test]
    fn toml_round_trip() {
        let mut c = ScopeConfig::default();
        c.telemetry.filter = "facet_scope=debug".into();
        let parsed = ScopeConfig::from_toml_str(&c.to_toml_string().unwrap()).unwrap();
        assert_eq!(parsed, c);
    }

    #[test]
    fn invalid_toml_is_config_error() {
        let err = ScopeConfig::from_toml_str("[snapshot]\nnormalize_line_endings = 3").unwrap_err();
        assert!(matches!(err, ScopeError::Config(_)));
    }

    #[test]
    fn missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let c = ScopeConfig::load(&dir.path().join("facet.toml")).unwrap();
        assert_eq!(c, ScopeConfig::default());
    }
}
