//! Analyzer configuration.
//!
//! Optional `.repograph/config.toml` in the analyzed root. Every field has a
//! default, so an empty or missing file yields [`AnalyzerConfig::default`].

use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;

/// Files larger than this are not scanned (8 MiB).
pub const DEFAULT_MAX_FILE_BYTES: usize = 8 * 1024 * 1024;

pub const CONFIG_DIR: &str = ".repograph";
pub const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Worker threads for per-file extraction. 0 picks the available parallelism.
    pub max_workers: usize,
    /// Larger payloads are recorded as unparsed instead of scanned.
    pub max_file_bytes: usize,
    /// Extra module names treated as builtin for every language.
    /// Example: `["electron", "vscode"]`
    pub extra_builtins: Vec<String>,
    /// Declared dependency names never reported as unused.
    /// Example: `["typescript", "eslint"]`
    pub ignore_unused: Vec<String>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            max_workers: 0,
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
            extra_builtins: Vec::new(),
            ignore_unused: Vec::new(),
        }
    }
}

impl AnalyzerConfig {
    /// Load config from `.repograph/config.toml` in the given root directory.
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        Self::load_from_path(&root.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Load config from a specific path. A missing file yields the defaults.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Number of worker threads to use for `file_count` files.
    pub fn workers_for(&self, file_count: usize) -> usize {
        let wanted = if self.max_workers == 0 {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        } else {
            self.max_workers
        };
        wanted.clamp(1, file_count.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = AnalyzerConfig::load(dir.path()).unwrap();
        assert_eq!(config.max_workers, 0);
        assert_eq!(config.max_file_bytes, DEFAULT_MAX_FILE_BYTES);
        assert!(config.extra_builtins.is_empty());
    }

    #[test]
    fn loads_partial_config() {
        let dir = TempDir::new().unwrap();
        let config_dir = dir.path().join(CONFIG_DIR);
        std::fs::create_dir_all(&config_dir).unwrap();
        let mut file = std::fs::File::create(config_dir.join(CONFIG_FILE)).unwrap();
        writeln!(file, "max_workers = 3").unwrap();
        writeln!(file, r#"extra_builtins = ["electron"]"#).unwrap();

        let config = AnalyzerConfig::load(dir.path()).unwrap();
        assert_eq!(config.max_workers, 3);
        assert_eq!(config.extra_builtins, vec!["electron".to_string()]);
        assert_eq!(config.max_file_bytes, DEFAULT_MAX_FILE_BYTES);
    }

    #[test]
    fn malformed_config_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "max_workers = \"many\"").unwrap();
        let err = AnalyzerConfig::load_from_path(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn workers_are_bounded_by_file_count() {
        let config = AnalyzerConfig {
            max_workers: 16,
            ..Default::default()
        };
        assert_eq!(config.workers_for(3), 3);
        assert_eq!(config.workers_for(0), 1);
    }
}
