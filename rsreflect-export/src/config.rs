// Configuration of an export pass

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// File name searched by [`ExportConfig::from_dir`]
pub const CONFIG_FILE_NAME: &str = "rsreflect.json";

/// Export configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Accept variables whose name starts with `rs`
    #[serde(default)]
    pub allow_rs_prefix: bool,

    /// Reject `const` variables without an initializer
    #[serde(default = "default_true")]
    pub require_const_initializer: bool,

    /// How element table mismatches are reported
    #[serde(default)]
    pub consistency: ConsistencyMode,

    /// Package name of the generated bindings; overrides `#pragma java_package_name`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_name: Option<String>,
}

/// Reporting policy for element table mismatches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsistencyMode {
    /// Strict in debug builds, warn in release builds
    #[default]
    Auto,
    /// Fail the declaration
    Strict,
    /// Log a warning and keep the derived type
    Warn,
}

impl ConsistencyMode {
    pub fn is_strict(self) -> bool {
        match self {
            ConsistencyMode::Auto => cfg!(debug_assertions),
            ConsistencyMode::Strict => true,
            ConsistencyMode::Warn => false,
        }
    }
}

fn default_true() -> bool {
    true
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            allow_rs_prefix: false,
            require_const_initializer: true,
            consistency: ConsistencyMode::Auto,
            package_name: None,
        }
    }
}

impl ExportConfig {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: ExportConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from directory (searches for rsreflect.json upward)
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let mut current = Some(dir.as_ref());
        while let Some(dir) = current {
            let config_path = dir.join(CONFIG_FILE_NAME);
            if config_path.exists() {
                log::debug!("loading export config from {}", config_path.display());
                return Self::from_file(config_path);
            }
            current = dir.parent();
        }

        Ok(Self::default())
    }

    /// Save configuration to file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Example configuration file contents
    pub fn example() -> Result<String> {
        Ok(serde_json::to_string_pretty(&Self::default())?)
    }
}
