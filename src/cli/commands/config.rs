//! Config Command
//!
//! Manage ForecastAI configuration.
//!
//! Usage:
//!   forecastai config show [-f json]
//!   forecastai config path
//!   forecastai config init [-g] [--force]

use crate::config::ConfigLoader;
use crate::types::Result;

/// Show the merged effective configuration
pub fn show(format: &str) -> Result<()> {
    ConfigLoader::show_config(format == "json")
}

/// Show config file paths and which ones exist
pub fn path() -> Result<()> {
    ConfigLoader::show_path();
    Ok(())
}

/// Write a config template to the global or project location
pub fn init(global: bool, force: bool) -> Result<()> {
    let written = ConfigLoader::init(global, force)?;
    println!("Created config at {}", written.display());
    println!("Edit it to point at your analysis service.");
    Ok(())
}
