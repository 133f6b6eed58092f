//! Status Command
//!
//! Display the stored pipeline flow, if any.

use crate::cli::util::open_repository;
use crate::config::Config;
use crate::types::{ForecastError, Result};

pub fn run(config: &Config, format: &str) -> Result<()> {
    let repo = open_repository(config)?;
    let json_output = format == "json";

    let Some(flow) = repo.load_flow() else {
        if json_output {
            println!("{{\"status\": \"empty\"}}");
        } else {
            println!("ForecastAI Status");
            println!("══════════════════════════════════════");
            println!("No stored pipeline flow. Run 'forecastai run <file>' to start one.");
        }
        // Informational command, an empty store is not an error
        return Ok(());
    };

    let session = flow.clone().into_session(config.upload.sample_rows);

    if json_output {
        let status = serde_json::json!({
            "status": "active",
            "stage": session.stage.name(),
            "session_id": session.session_id,
            "file": session.file_name,
            "columns": session.headers,
            "stored_rows": flow.raw_rows.len(),
            "completed": session.training_result.is_some(),
            "updated_at": flow.updated_at.to_rfc3339(),
        });
        let json = serde_json::to_string_pretty(&status).map_err(ForecastError::Json)?;
        println!("{}", json);
    } else {
        println!("ForecastAI Status");
        println!("══════════════════════════════════════");
        if let Some(file) = &session.file_name {
            println!("File: {}", file);
        }
        println!("Stage: {}", session.stage);
        match &session.session_id {
            Some(id) => println!("Session: {}", id),
            None => println!("Session: (none - will be repaired on resume)"),
        }
        println!();
        println!("Dataset:");
        println!("  Columns: {}", session.headers.join(", "));
        println!("  Stored rows: {}", flow.raw_rows.len());
        println!();
        if session.training_result.is_some() {
            println!("Training complete. Run 'forecastai report' to view results.");
        } else {
            println!("In progress. Run 'forecastai resume' to continue.");
        }
        println!("Updated: {}", flow.updated_at.to_rfc3339());
    }

    Ok(())
}
