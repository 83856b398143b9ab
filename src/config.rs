use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt, EnvFilter};

use crate::persist::JsonFileStore;
use crate::profile::TreeProfile;
use crate::store::TreeStore;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TreeConfig {
    /// Directory holding one JSON file per feature storage key
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Logging configuration
    #[serde(default)]
    pub log: LogConfig,
    /// Storage-key overrides, default key -> replacement
    /// (e.g. `tree_department = "dept_v2"` for a staged migration)
    #[serde(default)]
    pub keys: HashMap<String, String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LogConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data/trees")
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log: LogConfig::default(),
            keys: HashMap::new(),
        }
    }
}

impl TreeConfig {
    /// Load configuration from TOML file
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: TreeConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Apply any configured storage-key override to a profile
    pub fn apply_key(&self, profile: TreeProfile) -> TreeProfile {
        match self.keys.get(&profile.key) {
            Some(key) => profile.with_key(key.clone()),
            None => profile,
        }
    }

    /// Open a file-backed, loaded store for one feature
    pub fn open_store(&self, profile: TreeProfile) -> TreeStore {
        let profile = self.apply_key(profile);
        TreeStore::open(profile, Box::new(JsonFileStore::new(&self.data_dir)))
    }
}

/// Initialize logging.
/// Priority: RUST_LOG env var > configured level. Safe to call twice;
/// the second call is a no-op.
pub fn init_tracing(log: &LogConfig) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.level));

    let _ = fmt::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TreeConfig::default();
        assert_eq!(config.data_dir, PathBuf::from("./data/trees"));
        assert_eq!(config.log.level, "info");
        assert!(config.keys.is_empty());
    }

    #[test]
    fn test_toml_parse() {
        let toml_str = r#"
            data_dir = "/var/lib/admin/trees"

            [log]
            level = "debug"

            [keys]
            tree_department = "dept_v2"
        "#;
        let config: TreeConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/admin/trees"));
        assert_eq!(config.log.level, "debug");

        let profile = config.apply_key(TreeProfile::departments());
        assert_eq!(profile.key, "dept_v2");
        // profiles without an override keep their default key
        let other = config.apply_key(TreeProfile::dictionary_categories());
        assert_eq!(other.key, "tree_dictionary");
    }

    #[test]
    fn test_open_store_seeds_under_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = TreeConfig {
            data_dir: dir.path().to_path_buf(),
            ..Default::default()
        };
        let store = config.open_store(TreeProfile::departments());
        assert!(!store.is_empty());
        assert!(dir.path().join("tree_department.json").exists());
    }
}
