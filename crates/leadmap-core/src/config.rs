//! Configuration management for leadmap.
//!
//! Provides TOML-based configuration with XDG-compliant paths and
//! environment variable overrides.

use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Main application configuration.
///
/// This is loaded from `~/.config/leadmap/config.toml` (or platform
/// equivalent). If the file doesn't exist, default values are used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Scraping behavior settings
    pub scraper: ScraperConfig,
    /// Browser automation settings
    pub browser: BrowserConfig,
    /// Output settings
    pub output: OutputConfig,
}

impl AppConfig {
    /// Load configuration from disk, falling back to defaults if not found.
    ///
    /// # Errors
    /// Returns error if:
    /// - Config directory cannot be determined
    /// - File exists but cannot be read
    /// - File contents are not valid TOML
    pub fn load() -> ConfigResult<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            tracing::debug!("Loading config from {}", config_path.display());
            let contents = fs::read_to_string(&config_path)?;
            let config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            tracing::debug!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration with environment variable overrides.
    ///
    /// Supports the following environment variables:
    /// - `LEADMAP_LEADS`: Override the target lead count
    /// - `LEADMAP_MAX_TABS`: Override the maximum concurrent tabs
    /// - `LEADMAP_HEADLESS`: Override browser headless mode (true/false)
    pub fn load_with_env() -> ConfigResult<Self> {
        let mut config = Self::load()?;
        config.apply_env();
        Ok(config)
    }

    /// Apply environment variable overrides to an already-loaded config.
    pub fn apply_env(&mut self) {
        if let Ok(val) = std::env::var("LEADMAP_LEADS") {
            if let Ok(leads) = val.parse() {
                self.scraper.target_leads = leads;
                tracing::debug!("Override scraper.target_leads from env: {}", leads);
            }
        }

        if let Ok(val) = std::env::var("LEADMAP_MAX_TABS") {
            if let Ok(tabs) = val.parse() {
                self.scraper.max_tabs = tabs;
                tracing::debug!("Override scraper.max_tabs from env: {}", tabs);
            }
        }

        if let Ok(val) = std::env::var("LEADMAP_HEADLESS") {
            if let Ok(headless) = val.parse() {
                self.browser.headless = headless;
                tracing::debug!("Override browser.headless from env: {}", headless);
            }
        }
    }

    /// Save configuration to disk.
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> ConfigResult<()> {
        let config_path = Self::config_path()?;
        let config_dir = config_path
            .parent()
            .ok_or_else(|| ConfigError::InvalidValue {
                field: "config_path".to_string(),
                reason: "no parent directory".to_string(),
            })?;

        fs::create_dir_all(config_dir)?;
        tracing::debug!("Saving config to {}", config_path.display());

        let contents = toml::to_string_pretty(self)?;
        fs::write(config_path, contents)?;
        Ok(())
    }

    /// Get the path to the configuration file.
    ///
    /// Uses XDG base directories: `~/.config/leadmap/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        let dirs = ProjectDirs::from("io", "leadmap", "leadmap").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }
}

/// Scraping behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// Number of leads to collect per query
    pub target_leads: usize,
    /// Maximum number of concurrent extraction tabs
    pub max_tabs: usize,
    /// Consecutive zero-growth discovery rounds before giving up
    pub max_stall_rounds: u32,
    /// Delay between discovery scroll rounds in milliseconds
    pub scroll_delay_ms: u64,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            target_leads: 25,
            max_tabs: 2,
            max_stall_rounds: 5,
            scroll_delay_ms: 800,
        }
    }
}

/// Browser automation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Run browser in headless mode
    pub headless: bool,
    /// Tab viewport width
    pub viewport_width: u32,
    /// Tab viewport height
    pub viewport_height: u32,
    /// Per-item navigation budget in seconds
    pub navigation_timeout_secs: u64,
    /// Per-item ready-wait budget in seconds
    pub ready_timeout_secs: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            // Minimal viewport keeps rendering cost down; extraction only
            // needs text content.
            viewport_width: 800,
            viewport_height: 600,
            navigation_timeout_secs: 45,
            ready_timeout_secs: 30,
        }
    }
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default CSV output path
    pub csv_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            csv_path: "leads.csv".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.scraper.target_leads, 25);
        assert_eq!(config.scraper.max_tabs, 2);
        assert_eq!(config.scraper.max_stall_rounds, 5);
        assert!(config.browser.headless);
        assert_eq!(config.browser.viewport_width, 800);
        assert_eq!(config.output.csv_path, "leads.csv");
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("[scraper]"));
        assert!(toml_str.contains("[browser]"));
        assert!(toml_str.contains("[output]"));

        let parsed: AppConfig = toml::from_str(&toml_str).expect("parse serialized config");
        assert_eq!(parsed.scraper.target_leads, config.scraper.target_leads);
    }

    #[test]
    fn test_config_save_load() {
        let tmp = tempfile::TempDir::new().expect("create temp dir");
        let config_path = tmp.path().join("config.toml");

        let mut config = AppConfig::default();
        config.scraper.target_leads = 50;
        config.browser.headless = false;

        let contents = toml::to_string_pretty(&config).expect("serialize config");
        fs::write(&config_path, contents).expect("write config file");

        let loaded_contents = fs::read_to_string(&config_path).expect("read config file");
        let loaded: AppConfig = toml::from_str(&loaded_contents).expect("parse loaded config");

        assert_eq!(loaded.scraper.target_leads, 50);
        assert!(!loaded.browser.headless);
    }

    #[test]
    fn test_env_overrides() {
        std::env::set_var("LEADMAP_LEADS", "40");
        std::env::set_var("LEADMAP_MAX_TABS", "6");
        std::env::set_var("LEADMAP_HEADLESS", "false");

        let mut config = AppConfig::default();
        config.apply_env();

        assert_eq!(config.scraper.target_leads, 40);
        assert_eq!(config.scraper.max_tabs, 6);
        assert!(!config.browser.headless);

        // Unparseable values leave the loaded value untouched
        std::env::set_var("LEADMAP_LEADS", "not-a-number");
        let mut config = AppConfig::default();
        config.apply_env();
        assert_eq!(config.scraper.target_leads, 25);

        std::env::remove_var("LEADMAP_LEADS");
        std::env::remove_var("LEADMAP_MAX_TABS");
        std::env::remove_var("LEADMAP_HEADLESS");
    }

    #[test]
    fn test_partial_config() {
        // Partial TOML configs fill in the rest with defaults
        let toml_str = r#"
[scraper]
target_leads = 10

[browser]
headless = false
"#;

        let config: AppConfig = toml::from_str(toml_str).expect("parse partial config");
        assert_eq!(config.scraper.target_leads, 10);
        assert!(!config.browser.headless);
        assert_eq!(config.scraper.max_tabs, 2);
        assert_eq!(config.browser.navigation_timeout_secs, 45);
    }
}
