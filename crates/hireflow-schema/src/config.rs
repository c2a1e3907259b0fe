use crate::SchemaError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_PAGE_SIZE: usize = 20;
pub const MAX_PAGE_SIZE: usize = 200;

/// Settings read from `~/.config/hireflow/config.toml`.
///
/// Every field is optional in the file; command-line flags take precedence
/// over file values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HireflowConfig {
    /// Root directory of the record store.
    #[serde(default)]
    pub store_path: Option<PathBuf>,
    #[serde(default = "default_page_size")]
    pub default_page_size: usize,
    /// Append completed state changes to the audit journal.
    #[serde(default)]
    pub journal: bool,
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

impl Default for HireflowConfig {
    fn default() -> Self {
        Self {
            store_path: None,
            default_page_size: DEFAULT_PAGE_SIZE,
            journal: false,
        }
    }
}

impl HireflowConfig {
    pub fn parse_str(input: &str) -> Result<Self, SchemaError> {
        let config: Self = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, SchemaError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse_str(&content)
    }

    /// Load the default config file, falling back to defaults when it does
    /// not exist.
    pub fn load_default() -> Result<Self, SchemaError> {
        match default_config_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    fn validate(&self) -> Result<(), SchemaError> {
        if self.default_page_size == 0 || self.default_page_size > MAX_PAGE_SIZE {
            return Err(SchemaError::Config(format!(
                "default_page_size must be between 1 and {MAX_PAGE_SIZE}, got {}",
                self.default_page_size
            )));
        }
        Ok(())
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    let home = std::env::var("HOME").ok()?;
    Some(PathBuf::from(home).join(".config/hireflow/config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config = HireflowConfig::parse_str("").unwrap();
        assert_eq!(config, HireflowConfig::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = HireflowConfig::parse_str("journal = true\n").unwrap();
        assert!(config.journal);
        assert_eq!(config.default_page_size, DEFAULT_PAGE_SIZE);
        assert!(config.store_path.is_none());
    }

    #[test]
    fn store_path_is_read() {
        let config = HireflowConfig::parse_str("store_path = \"/srv/hireflow\"\n").unwrap();
        assert_eq!(config.store_path, Some(PathBuf::from("/srv/hireflow")));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(HireflowConfig::parse_str("colour = \"blue\"\n").is_err());
    }

    #[test]
    fn page_size_out_of_range_is_rejected() {
        assert!(HireflowConfig::parse_str("default_page_size = 0\n").is_err());
        assert!(HireflowConfig::parse_str("default_page_size = 1000\n").is_err());
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "default_page_size = 5\n").unwrap();
        let config = HireflowConfig::load(&path).unwrap();
        assert_eq!(config.default_page_size, 5);
    }

    #[test]
    fn load_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(HireflowConfig::load(&dir.path().join("absent.toml")).is_err());
    }
}
