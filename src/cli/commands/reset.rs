//! Reset Command
//!
//! Clears the stored flow from every session tier so the next run starts
//! from a clean upload stage.

use crate::cli::util::open_repository;
use crate::config::Config;
use crate::types::Result;

pub fn run(config: &Config) -> Result<()> {
    let repo = open_repository(config)?;

    if repo.load_flow().is_none() && repo.session_id().is_none() {
        println!("Nothing to reset.");
        return Ok(());
    }

    repo.clear()?;
    println!("Pipeline reset. All stored session state cleared.");
    Ok(())
}
