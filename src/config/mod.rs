//! Configuration management for the stamprally CLI.
//!
//! TOML configuration with typed sections, sensible defaults, and a
//! `create_default` helper used by `stamprally init`:
//!
//! ```toml
//! [hunt]
//! name = "Campus Stamp Rally"
//! quests_file = "./data/quests.json"
//!
//! [storage]
//! data_dir = "./data"
//!
//! [scanner]
//! frame_interval_ms = 33
//! ready_timeout_secs = 10
//!
//! [logging]
//! level = "info"
//! ```

use std::time::Duration;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::scanner::ScanOptions;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub hunt: HuntConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub scanner: ScannerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HuntConfig {
    /// Display name shown in the status banner.
    pub name: String,
    /// Path to the JSON quest list.
    pub quests_file: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the progress database.
    pub data_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: "./data".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// Pause between detection passes, in milliseconds.
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,
    /// Seconds to wait for the video sink to become ready. 0 waits
    /// indefinitely (some platforms block in the permission prompt).
    #[serde(default = "default_ready_timeout_secs")]
    pub ready_timeout_secs: u64,
}

fn default_frame_interval_ms() -> u64 {
    33
}

fn default_ready_timeout_secs() -> u64 {
    10
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: default_frame_interval_ms(),
            ready_timeout_secs: default_ready_timeout_secs(),
        }
    }
}

impl ScannerConfig {
    /// Convert to scan loop options. A zero ready timeout means the
    /// priming wait is unbounded.
    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            frame_interval: Duration::from_millis(self.frame_interval_ms.max(1)),
            ready_timeout: (self.ready_timeout_secs > 0)
                .then(|| Duration::from_secs(self.ready_timeout_secs)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub async fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path, e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file {}: {}", path, e))?;

        Ok(config)
    }

    /// Create a default configuration file
    pub async fn create_default(path: &str) -> Result<()> {
        let config = Config::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| anyhow!("Failed to serialize default config: {}", e))?;

        fs::write(path, content)
            .await
            .map_err(|e| anyhow!("Failed to write config file {}: {}", path, e))?;

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            hunt: HuntConfig {
                name: "Stamp Rally".to_string(),
                quests_file: "./data/quests.json".to_string(),
            },
            storage: StorageConfig::default(),
            scanner: ScannerConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let config = Config::default();
        assert_eq!(config.storage.data_dir, "./data");
        assert_eq!(config.scanner.frame_interval_ms, 33);
        assert_eq!(config.scanner.ready_timeout_secs, 10);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn scan_options_map_the_scanner_section() {
        let scanner = ScannerConfig {
            frame_interval_ms: 50,
            ready_timeout_secs: 3,
        };
        let options = scanner.scan_options();
        assert_eq!(options.frame_interval, Duration::from_millis(50));
        assert_eq!(options.ready_timeout, Some(Duration::from_secs(3)));
    }

    #[test]
    fn zero_ready_timeout_means_wait_forever() {
        let scanner = ScannerConfig {
            frame_interval_ms: 0,
            ready_timeout_secs: 0,
        };
        let options = scanner.scan_options();
        assert!(options.ready_timeout.is_none());
        // Zero frame interval is clamped to keep the loop cooperative.
        assert_eq!(options.frame_interval, Duration::from_millis(1));
    }

    #[test]
    fn minimal_config_parses_with_defaults() {
        let config: Config = toml::from_str(
            r#"
            [hunt]
            name = "Test Hunt"
            quests_file = "quests.json"
            "#,
        )
        .expect("parse");
        assert_eq!(config.hunt.name, "Test Hunt");
        assert_eq!(config.scanner.frame_interval_ms, 33);
        assert!(config.logging.file.is_none());
    }

    #[test]
    fn partial_scanner_section_keeps_field_defaults() {
        let config: Config = toml::from_str(
            r#"
            [hunt]
            name = "Test Hunt"
            quests_file = "quests.json"

            [scanner]
            frame_interval_ms = 16
            "#,
        )
        .expect("parse");
        assert_eq!(config.scanner.ready_timeout_secs, 10);
        assert_eq!(config.scanner.frame_interval_ms, 16);
    }

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = Config::default();
        let text = toml::to_string_pretty(&config).expect("serialize");
        let parsed: Config = toml::from_str(&text).expect("parse");
        assert_eq!(parsed.hunt.name, config.hunt.name);
        assert_eq!(parsed.scanner.ready_timeout_secs, config.scanner.ready_timeout_secs);
    }
}
