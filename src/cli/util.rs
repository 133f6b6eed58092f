//! Shared CLI Helpers

use std::path::PathBuf;
use std::sync::Arc;

use console::style;

use crate::api::{HttpAnalysisClient, SharedApi};
use crate::config::Config;
use crate::constants::storage::FLOW_DB_FILE;
use crate::pipeline::PipelineController;
use crate::report::{self, ResultView};
use crate::session::{FlowDatabase, SessionRepository};
use crate::types::{PipelineSession, Result};

/// Path of the durable flow database
pub fn flow_db_path(config: &Config) -> PathBuf {
    config.storage.resolve_data_dir().join(FLOW_DB_FILE)
}

/// Open the standard two-tier session repository
pub fn open_repository(config: &Config) -> Result<SessionRepository> {
    let db = Arc::new(FlowDatabase::open(flow_db_path(config))?);
    Ok(SessionRepository::standard(db))
}

/// Build a pipeline controller wired to the configured analysis service
pub fn build_controller(config: &Config) -> Result<PipelineController> {
    let api: SharedApi = Arc::new(HttpAnalysisClient::new(&config.service)?);
    Ok(PipelineController::new(api, open_repository(config)?, config))
}

/// Print all four result views for a completed session
pub fn print_results(session: &PipelineSession) {
    let Some(result) = &session.training_result else {
        println!("No training result available.");
        return;
    };

    println!("{}", style("════════ Results ════════").bold());
    for view in ResultView::ALL {
        println!("{}", report::render(view, result));
    }
}
