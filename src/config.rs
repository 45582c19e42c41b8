// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Scene configuration system

use crate::error::{Error, Result};
use crate::io::{InexactPolicy, MeshFormat, WriteOptions};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File read by [`SceneConfig::load`] when present in the working directory
pub const CONFIG_FILE: &str = "polyset.toml";

/// Scene configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Format for output paths without a recognised extension
    pub default_format: Option<MeshFormat>,
    /// How non-terminating coordinates are written
    pub inexact_policy: InexactPolicy,
    /// tracing-subscriber filter used when RUST_LOG is unset
    pub log_filter: String,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            default_format: None,
            inexact_policy: InexactPolicy::default(),
            log_filter: "info".to_string(),
        }
    }
}

impl SceneConfig {
    /// Load configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        toml::from_str(&content).map_err(|e| Error::Config(format!("{}: {e}", path.display())))
    }

    /// Load `polyset.toml` if present, then apply environment overrides
    pub fn load() -> Result<Self> {
        let mut config = if PathBuf::from(CONFIG_FILE).exists() {
            Self::from_file(CONFIG_FILE)?
        } else {
            Self::default()
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply `POLYSET_DEFAULT_FORMAT`, `POLYSET_INEXACT` and `POLYSET_LOG`
    /// from `lookup`.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(format) = lookup("POLYSET_DEFAULT_FORMAT") {
            self.default_format = Some(format.parse().map_err(|e: Error| Error::Config(e.to_string()))?);
        }

        if let Some(policy) = lookup("POLYSET_INEXACT") {
            self.inexact_policy = policy.parse()?;
        }

        if let Some(filter) = lookup("POLYSET_LOG") {
            self.log_filter = filter;
        }

        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| Error::io(path, e))
    }

    /// Mesh writing options derived from this configuration
    pub fn write_options(&self) -> WriteOptions {
        WriteOptions {
            inexact: self.inexact_policy,
            default_format: self.default_format,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = SceneConfig::default();
        assert_eq!(config.default_format, None);
        assert_eq!(config.inexact_policy, InexactPolicy::Approximate);
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("polyset.toml");
        let config = SceneConfig {
            default_format: Some(MeshFormat::Obj),
            inexact_policy: InexactPolicy::Fraction,
            log_filter: "polyset=debug".to_string(),
        };
        config.save(&path).unwrap();
        assert_eq!(SceneConfig::from_file(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("polyset.toml");
        std::fs::write(&path, "inexact_policy = \"fraction\"\n").unwrap();
        let config = SceneConfig::from_file(&path).unwrap();
        assert_eq!(config.inexact_policy, InexactPolicy::Fraction);
        assert_eq!(config.log_filter, "info");

        std::fs::write(&path, "default_format = \"ply\"\n").unwrap();
        assert!(matches!(SceneConfig::from_file(&path), Err(Error::Config(_))));
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("POLYSET_DEFAULT_FORMAT", "STL"),
            ("POLYSET_INEXACT", "fraction"),
            ("POLYSET_LOG", "warn"),
        ]
        .into_iter()
        .collect();
        let mut config = SceneConfig::default();
        config
            .apply_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.default_format, Some(MeshFormat::Stl));
        assert_eq!(config.write_options().inexact, InexactPolicy::Fraction);
        assert_eq!(config.log_filter, "warn");

        let mut config = SceneConfig::default();
        let bad = config.apply_overrides(|key| (key == "POLYSET_DEFAULT_FORMAT").then(|| "ply".to_string()));
        assert!(matches!(bad, Err(Error::Config(_))));
    }
}
