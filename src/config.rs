//! @ai:module:intent Runtime configuration for a lint run, loadable from TOML
//! @ai:module:layer infrastructure
//! @ai:module:public_api Config
//! @ai:module:depends_on parser, diagnostics, error
//! @ai:module:stateless true

use crate::diagnostics::Severity;
use crate::error::{Error, Result};
use crate::parser::WalkOptions;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// @ai:intent Settings shared by the CLI and library callers
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// Minimum severity shown (Debug=1, Info=2, Warning=3, Error=4, Fatal=5).
    #[serde(default = "default_log_level")]
    pub log_level: u8,
    #[serde(default)]
    pub only_parse: bool,
    #[serde(default)]
    pub print_tree: bool,
    #[serde(default)]
    pub walk: WalkOptions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            only_parse: false,
            print_tree: false,
            walk: WalkOptions::default(),
        }
    }
}

fn default_log_level() -> u8 {
    Severity::Info.level()
}

impl Config {
    /// @ai:intent Load configuration from a TOML file
    /// @ai:pre path exists and is readable
    /// @ai:effects fs:read
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// @ai:intent Severity threshold for surfaced diagnostics
    /// @ai:post levels above 5 clamp to Fatal, 0 to Debug
    pub fn threshold(&self) -> Severity {
        Severity::from_level(self.log_level.clamp(1, 5)).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_partial_config() {
        let mut file = NamedTempFile::with_suffix(".toml").unwrap();
        writeln!(
            file,
            r#"log_level = 4

[walk]
resync = true"#
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.log_level, 4);
        assert!(!config.only_parse);
        assert!(config.walk.resync);
        assert_eq!(config.threshold(), Severity::Error);
    }

    #[test]
    fn test_load_invalid_config() {
        let mut file = NamedTempFile::with_suffix(".toml").unwrap();
        writeln!(file, "log_level = \"loud\"").unwrap();

        assert!(matches!(Config::load(file.path()), Err(Error::Config { .. })));
    }

    #[test]
    fn test_threshold_clamps() {
        let config = Config {
            log_level: 9,
            ..Default::default()
        };
        assert_eq!(config.threshold(), Severity::Fatal);
        assert_eq!(Config::default().threshold(), Severity::Info);
    }
}
