//! Report Command
//!
//! Renders stored training results. Each view is a pure function of the
//! result object, so any subset can be printed without touching the service.

use crate::cli::util::open_repository;
use crate::config::Config;
use crate::report::{self, ResultView};
use crate::types::Result;

pub fn run(config: &Config, view: Option<ResultView>) -> Result<()> {
    let repo = open_repository(config)?;

    let Some(result) = repo.load_flow().and_then(|flow| flow.results) else {
        println!("No completed training run found.");
        println!("Run 'forecastai run <file>' or 'forecastai resume' first.");
        return Ok(());
    };

    match view {
        Some(view) => println!("{}", report::render(view, &result)),
        None => {
            for view in ResultView::ALL {
                println!("{}", report::render(view, &result));
            }
        }
    }

    Ok(())
}
