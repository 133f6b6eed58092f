//! Resume Command
//!
//! Rehydrates the stored flow and continues the pipeline from wherever it
//! stopped, repairing the remote session first when needed.

use crate::cli::util::{build_controller, print_results};
use crate::config::Config;
use crate::pipeline::RepairOutcome;
use crate::types::{Result, Stage};

pub async fn run(config: &Config) -> Result<()> {
    let mut controller = build_controller(config)?;

    if !controller.hydrate() {
        println!("Nothing to resume. Run 'forecastai run <file>' to start a pipeline.");
        return Ok(());
    }

    let session = controller.session();
    println!(
        "Resuming '{}' at stage {}",
        session.file_name.as_deref().unwrap_or("(unnamed)"),
        session.stage
    );

    if session.stage == Stage::Results && session.training_result.is_some() {
        print_results(controller.session());
        return Ok(());
    }

    match controller.repair_session().await? {
        RepairOutcome::Repaired => println!("Remote session restored from stored rows."),
        RepairOutcome::AlreadyRunning => {
            println!("A session repair is already in progress.");
            return Ok(());
        }
        RepairOutcome::NotNeeded | RepairOutcome::Hydrated => {}
    }

    controller.run().await?;
    print_results(controller.session());
    Ok(())
}
