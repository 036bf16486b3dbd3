//! Application configuration.
//!
//! Configuration is loaded from a TOML file at:
//! 1. `$MBOXSPLIT_CONFIG` (environment variable)
//! 2. `~/.config/mboxsplit/config.toml` (Linux/macOS)
//!    `%APPDATA%\mboxsplit\config.toml` (Windows)
//! 3. Built-in defaults
//!
//! Command-line flags override anything set here.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SplitError};
use crate::parser::mbox::DEFAULT_READ_BUFFER_SIZE;
use crate::sanitize::DEFAULT_MAX_NAME_LEN;
use crate::split::sink::DEFAULT_WRITE_BUFFER_SIZE;
use crate::split::DEFAULT_PROGRESS_INTERVAL;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General behavior settings.
    pub general: GeneralConfig,
    /// Split defaults.
    pub split: SplitConfig,
    /// Performance tuning.
    pub performance: PerformanceConfig,
}

/// General behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub log_level: String,
    /// Override the directory for the log file.
    pub log_dir: Option<PathBuf>,
}

/// Defaults for a split run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    /// Source MBOX.
    pub input: PathBuf,
    /// Prefix for every output filename.
    pub prefix: String,
    /// Directory outputs are written to.
    pub output_dir: PathBuf,
    /// Maximum length of a sanitized label in a filename.
    pub max_name_length: usize,
    /// Print progress every this many routed messages.
    pub progress_interval: u64,
}

/// Performance tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceConfig {
    /// Read buffer size in bytes (default: 1048576 = 1 MB).
    pub read_buffer_size: usize,
    /// Write buffer size per output archive (default: 65536 = 64 KB).
    pub write_buffer_size: usize,
}

// ── Default implementations ─────────────────────────────────────

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            log_dir: None,
        }
    }
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("inbox.mbox"),
            prefix: "split_".to_string(),
            output_dir: PathBuf::from("."),
            max_name_length: DEFAULT_MAX_NAME_LEN,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
            write_buffer_size: DEFAULT_WRITE_BUFFER_SIZE,
        }
    }
}

impl Config {
    /// Reject values no run can work with.
    pub fn validate(&self) -> Result<()> {
        if self.split.max_name_length == 0 {
            return Err(SplitError::InvalidConfig(
                "split.max_name_length must be at least 1".into(),
            ));
        }
        if self.split.progress_interval == 0 {
            return Err(SplitError::InvalidConfig(
                "split.progress_interval must be at least 1".into(),
            ));
        }
        if self.performance.read_buffer_size == 0 || self.performance.write_buffer_size == 0 {
            return Err(SplitError::InvalidConfig(
                "performance buffer sizes must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

// ── Load ────────────────────────────────────────────────────────

/// Load configuration, searching standard locations.
///
/// Returns the defaults when no file exists. A file that exists but cannot
/// be read or parsed is an error. Values are checked by [`Config::validate`]
/// once command-line overrides have been applied.
pub fn load_config() -> Result<Config> {
    match config_file_path() {
        Some(path) if path.exists() => load_config_from(&path),
        _ => Ok(Config::default()),
    }
}

/// Load the configuration stored at `path`.
pub fn load_config_from(path: &Path) -> Result<Config> {
    let contents = std::fs::read_to_string(path).map_err(|e| SplitError::io(path, e))?;
    toml::from_str::<Config>(&contents)
        .map_err(|e| SplitError::InvalidConfig(format!("{}: {e}", path.display())))
}

/// Determine the config file path (checking env var first, then standard dirs).
pub fn config_file_path() -> Option<PathBuf> {
    if let Ok(env_path) = std::env::var("MBOXSPLIT_CONFIG") {
        return Some(PathBuf::from(env_path));
    }
    dirs::config_dir().map(|d| d.join("mboxsplit").join("config.toml"))
}

/// Return the directory the log file is written to.
pub fn log_dir(config: &Config) -> PathBuf {
    if let Some(ref dir) = config.general.log_dir {
        return dir.clone();
    }
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("mboxsplit")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = Config::default();
        assert_eq!(cfg.split.input, PathBuf::from("inbox.mbox"));
        assert_eq!(cfg.split.prefix, "split_");
        assert_eq!(cfg.split.max_name_length, 120);
        assert_eq!(cfg.split.progress_interval, 2000);
        assert_eq!(cfg.general.log_level, "warn");
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let partial = r#"
[split]
prefix = "takeout_"

[general]
log_level = "debug"
"#;
        let cfg: Config = toml::from_str(partial).expect("parse partial");
        assert_eq!(cfg.split.prefix, "takeout_");
        assert_eq!(cfg.general.log_level, "debug");
        assert_eq!(cfg.split.input, PathBuf::from("inbox.mbox"));
        assert_eq!(cfg.performance.write_buffer_size, 64 * 1024);
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[split]\noutput_dir = \"out\"\nmax_name_length = 40\n").unwrap();
        let cfg = load_config_from(&path).unwrap();
        assert_eq!(cfg.split.output_dir, PathBuf::from("out"));
        assert_eq!(cfg.split.max_name_length, 40);
    }

    #[test]
    fn test_invalid_toml_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[split\nprefix = ").unwrap();
        assert!(matches!(
            load_config_from(&path),
            Err(SplitError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_zero_values_rejected() {
        let mut cfg = Config::default();
        cfg.split.progress_interval = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = Config::default();
        cfg.split.max_name_length = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_invalid_file_value_can_be_overridden() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[split]\nmax_name_length = 0\n").unwrap();
        let mut cfg = load_config_from(&path).unwrap();
        assert!(cfg.validate().is_err());

        cfg.split.max_name_length = 40;
        assert!(cfg.validate().is_ok());
    }
}
