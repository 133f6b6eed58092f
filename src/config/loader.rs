//! Configuration Loader (Figment-based)
//!
//! Loads and merges configuration from multiple sources using Figment:
//! 1. Built-in defaults (Serialized)
//! 2. Global config (~/.config/forecastai/config.toml)
//! 3. Project config (.forecastai/config.toml)
//! 4. Environment variables (FORECASTAI_ prefix, `__` nesting separator,
//!    e.g. FORECASTAI_SERVICE__BASE_URL)

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::types::Config;
use crate::types::{ForecastError, Result};

const DEFAULT_CONFIG_TEMPLATE: &str = r#"version = "1.0"

[service]
# Base URL of the analysis service
base_url = "http://localhost:8000"
# Request timeout in seconds
timeout_secs = 120

[retry]
max_attempts = 3
base_delay_ms = 500
backoff_factor = 2.0

[upload]
sample_rows = 20
preprocess_remote = true
"#;

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with full resolution chain using Figment:
    /// defaults → global → project → env vars
    pub fn load() -> Result<Config> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            debug!("Loading global config from: {}", global_path.display());
            figment = figment.merge(Toml::file(&global_path));
        }

        let project_path = Self::project_config_path();
        if project_path.exists() {
            debug!("Loading project config from: {}", project_path.display());
            figment = figment.merge(Toml::file(&project_path));
        }

        figment = figment.merge(Self::env_provider());

        let config: Config = figment
            .extract()
            .map_err(|e| ForecastError::Config(format!("Configuration error: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Environment overrides. Nesting uses a double underscore so field
    /// names containing `_` survive the split:
    /// FORECASTAI_SERVICE__BASE_URL -> service.base_url
    fn env_provider() -> Env {
        Env::prefixed("FORECASTAI_").split("__").lowercase(true)
    }

    /// Load configuration from a specific file only
    pub fn load_from_file(path: &Path) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .extract()
            .map_err(|e| ForecastError::Config(format!("Configuration error: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    // =========================================================================
    // Path Management
    // =========================================================================

    /// Get path to global config directory (~/.config/forecastai/)
    pub fn global_dir() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "forecastai")
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Get path to global config file
    pub fn global_config_path() -> Option<PathBuf> {
        Self::global_dir().map(|dir| dir.join("config.toml"))
    }

    /// Get path to project config file
    pub fn project_config_path() -> PathBuf {
        PathBuf::from(".forecastai/config.toml")
    }

    /// Get project data directory
    pub fn project_dir() -> PathBuf {
        PathBuf::from(".forecastai")
    }

    // =========================================================================
    // Config Commands
    // =========================================================================

    /// Show config file paths
    pub fn show_path() {
        println!("Configuration paths:");
        println!();

        if let Some(global) = Self::global_config_path() {
            let exists = if global.exists() { "✓" } else { "✗" };
            println!("  Global:  {} {}", exists, global.display());
        } else {
            println!("  Global:  (not available)");
        }

        let project = Self::project_config_path();
        let exists = if project.exists() { "✓" } else { "✗" };
        println!("  Project: {} {}", exists, project.display());
    }

    /// Show current effective configuration
    pub fn show_config(as_json: bool) -> Result<()> {
        let config = Self::load()?;

        if as_json {
            println!("{}", serde_json::to_string_pretty(&config)?);
        } else {
            println!("Effective configuration:");
            println!();
            println!("  service.base_url      = {}", config.service.base_url);
            println!("  service.timeout_secs  = {}", config.service.timeout_secs);
            println!(
                "  service.api_token     = {}",
                if config.service.api_token.is_some() {
                    "[set]"
                } else {
                    "(none)"
                }
            );
            println!("  retry.max_attempts    = {}", config.retry.max_attempts);
            println!("  retry.base_delay_ms   = {}", config.retry.base_delay_ms);
            println!("  retry.backoff_factor  = {}", config.retry.backoff_factor);
            println!(
                "  storage.data_dir      = {}",
                config.storage.resolve_data_dir().display()
            );
            println!("  upload.sample_rows    = {}", config.upload.sample_rows);
            println!(
                "  upload.preprocess_remote = {}",
                config.upload.preprocess_remote
            );
        }

        Ok(())
    }

    /// Write a default config file, refusing to overwrite unless forced
    pub fn init(global: bool, force: bool) -> Result<PathBuf> {
        let path = if global {
            Self::global_config_path().ok_or_else(|| {
                ForecastError::Config("cannot resolve global config directory".to_string())
            })?
        } else {
            Self::project_config_path()
        };

        if path.exists() && !force {
            return Err(ForecastError::Config(format!(
                "{} already exists (use --force to overwrite)",
                path.display()
            )));
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, DEFAULT_CONFIG_TEMPLATE)?;

        Ok(path)
    }
}
