//! Pipeline Controller
//!
//! Drives one dataset through the five ordered stages (Upload, Profile,
//! Preprocess, Train, Results), mediating between local state and the
//! remote analysis service. Control flows strictly forward; the only
//! backward transition is an explicit full reset.
//!
//! ## Invariants
//!
//! - No stage's request is issued before the prior stage's success is
//!   recorded.
//! - Any stage beyond Upload never executes with a missing session
//!   identifier; the repair procedure runs first.
//! - Every remote call is tagged with the session identifier active at
//!   issue time; a response whose tag no longer matches the active session
//!   is discarded.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::api::{SharedApi, with_session_retry};
use crate::config::{Config, RetryConfig};
use crate::constants::guard;
use crate::ingest;
use crate::session::SessionRepository;
use crate::types::{
    ColumnMapping, FlowState, ForecastError, PipelineSession, PreprocessLog, PreprocessStep,
    Result, Stage, UploadResponse,
};

/// How a repair invocation resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepairOutcome {
    /// No restored rows; nothing to repair
    NotNeeded,
    /// Rows and a session identifier were both present; state was
    /// re-asserted into the persistence tiers without a network call
    Hydrated,
    /// A fresh session was minted by re-uploading the retained rows
    Repaired,
    /// The one-shot guard was already held by a previous invocation
    AlreadyRunning,
}

/// The workflow state machine for one pipeline session
pub struct PipelineController {
    session: PipelineSession,
    repo: SessionRepository,
    api: SharedApi,
    retry: RetryConfig,
    preprocess_remote: bool,
    sample_rows: usize,
    guard: super::OperationGuard,
    /// Original file contents, uploaded verbatim during ingestion
    pending_csv: Option<String>,
}

impl PipelineController {
    pub fn new(api: SharedApi, repo: SessionRepository, config: &Config) -> Self {
        Self {
            session: PipelineSession::new(),
            repo,
            api,
            retry: config.retry.clone(),
            preprocess_remote: config.upload.preprocess_remote,
            sample_rows: config.upload.sample_rows,
            guard: super::OperationGuard::new(),
            pending_csv: None,
        }
    }

    pub fn session(&self) -> &PipelineSession {
        &self.session
    }

    pub fn repository(&self) -> &SessionRepository {
        &self.repo
    }

    // =========================================================================
    // Upload Stage
    // =========================================================================

    /// Parse the header of a selected file and stage its rows locally.
    ///
    /// Purely local: malformed input is rejected here, before any network
    /// call. Returns the detected headers for the mapping prompt.
    pub fn begin_upload(&mut self, file_name: &str, csv_text: &str) -> Result<Vec<String>> {
        let headers = ingest::read_headers(csv_text)?;
        let rows = ingest::parse_rows(csv_text, &headers);
        if rows.is_empty() {
            return Err(ForecastError::input("file has a header but no data rows"));
        }

        self.session.file_name = Some(file_name.to_string());
        self.session.headers = headers.clone();
        self.session.raw_sample = ingest::typed_preview(&rows, self.sample_rows);
        self.session.raw_rows = rows;
        self.pending_csv = Some(csv_text.to_string());

        debug!(
            file = file_name,
            columns = headers.len(),
            rows = self.session.raw_rows.len(),
            "File staged for upload"
        );
        Ok(headers)
    }

    /// Record the user-confirmed column mapping. Set once during Upload,
    /// immutable afterward unless the user restarts.
    pub fn confirm_mapping(&mut self, target: &str, date: Option<&str>) -> Result<ColumnMapping> {
        let mapping = ColumnMapping::resolve(target, date, &self.session.headers)?;
        self.session.mapping = Some(mapping.clone());
        Ok(mapping)
    }

    /// Upload the staged file and mint a session.
    ///
    /// On success the identifier lands in all storage tiers and the stage
    /// advances to Profile, followed by an opportunistic (non-blocking)
    /// profiling call that pre-populates the next stage when it succeeds.
    pub async fn ingest(&mut self) -> Result<()> {
        self.expect_stage(Stage::Upload)?;
        let mapping = self.require_mapping()?;
        let csv = self.pending_csv.clone().ok_or_else(|| {
            ForecastError::input("no file staged; select a file before ingesting")
        })?;
        let file_name = self.file_name();

        let response = self.api.upload(&file_name, csv.into_bytes(), &mapping).await?;
        self.adopt_session(response);

        // Opportunistic prefill: a single attempt whose failure only costs
        // us the head start
        if let Some(id) = self.session.session_id.clone() {
            match self.api.profile(&id, &mapping).await {
                Ok(profile) if self.still_active(&id) => {
                    debug!("Opportunistic profile prefill succeeded");
                    self.session.profile = Some(profile);
                }
                Ok(_) => {}
                Err(e) => debug!("Opportunistic profile prefill failed: {}", e),
            }
        }

        Ok(())
    }

    // =========================================================================
    // Session Repair
    // =========================================================================

    /// Guarantee that stages beyond Upload never run with a missing session
    /// identifier.
    ///
    /// Restored rows without an identifier are re-uploaded to mint a fresh
    /// session; rows with an identifier are re-asserted into the tiers.
    /// The one-shot guard makes duplicate invocations free: at most one
    /// re-upload per missing-session condition. A failed re-upload releases
    /// the guard so a later attempt can run.
    pub async fn repair_session(&mut self) -> Result<RepairOutcome> {
        if self.session.raw_rows.is_empty() {
            return Ok(RepairOutcome::NotNeeded);
        }

        if let Some(id) = self
            .session
            .session_id
            .clone()
            .filter(|id| !id.is_empty())
        {
            if let Err(e) = self.repo.record(&id) {
                warn!("Failed to re-assert session id into storage: {}", e);
            }
            if self.session.stage == Stage::Upload {
                self.session.stage = Stage::Profile;
            }
            return Ok(RepairOutcome::Hydrated);
        }

        if !self.guard.try_acquire(guard::REPAIR_SESSION) {
            debug!("Repair already ran; skipping duplicate invocation");
            return Ok(RepairOutcome::AlreadyRunning);
        }

        match self.reupload().await {
            Ok(()) => Ok(RepairOutcome::Repaired),
            Err(e) => {
                // Recoverable: the user stays on the current stage and a
                // future repair attempt is permitted
                self.guard.release(guard::REPAIR_SESSION);
                Err(e)
            }
        }
    }

    async fn reupload(&mut self) -> Result<()> {
        let mapping = self.require_mapping()?;
        let file_name = self.file_name();
        let csv = ingest::rows_to_csv(&self.session.headers, &self.session.raw_rows);

        info!(
            rows = self.session.raw_rows.len(),
            "Session identifier lost; re-uploading to mint a fresh session"
        );
        let response = self.api.upload(&file_name, csv.into_bytes(), &mapping).await?;
        self.adopt_session(response);
        Ok(())
    }

    /// Record a freshly minted session across all storage tiers and advance
    /// to Profile.
    fn adopt_session(&mut self, response: UploadResponse) {
        info!(session_id = %response.session_id, "Session minted");

        if let Err(e) = self.repo.record(&response.session_id) {
            warn!("Failed to record session id in storage tiers: {}", e);
        }
        self.session.session_id = Some(response.session_id);

        if response.sample_data.is_empty() {
            self.session.raw_sample =
                ingest::typed_preview(&self.session.raw_rows, self.sample_rows);
        } else {
            self.session.raw_sample = response
                .sample_data
                .into_iter()
                .take(self.sample_rows)
                .collect();
        }

        self.session.stage = Stage::Profile;
        self.persist_flow();
    }

    // =========================================================================
    // Profile Stage
    // =========================================================================

    /// Fetch dataset statistics, retrying session-not-found failures per the
    /// configured policy. Advances to Preprocess on success.
    pub async fn run_profile(&mut self) -> Result<()> {
        self.expect_stage(Stage::Profile)?;

        if self.session.profile.is_some() {
            // Already satisfied by the opportunistic prefill during ingest
            self.session.stage = Stage::Preprocess;
            return Ok(());
        }

        let session_id = self.require_session()?;
        let mapping = self.require_mapping()?;
        let api = Arc::clone(&self.api);

        let profile = with_session_retry(&self.retry, "profile", || {
            let api = Arc::clone(&api);
            let id = session_id.clone();
            let mapping = mapping.clone();
            async move { api.profile(&id, &mapping).await }
        })
        .await?;

        if !self.still_active(&session_id) {
            warn!("Discarding profile response for a stale session");
            return Ok(());
        }

        info!(
            rows = profile.dimensions.rows,
            columns = profile.dimensions.columns,
            "Profile received"
        );
        self.session.profile = Some(profile);
        self.session.stage = Stage::Preprocess;
        Ok(())
    }

    // =========================================================================
    // Preprocess Stage
    // =========================================================================

    /// Record the transformation log, degrading to a locally synthesized
    /// summary when the remote stage is not wired. Always advances to Train:
    /// an unimplemented remote stage must never block the pipeline.
    pub async fn run_preprocess(&mut self) -> Result<()> {
        self.expect_stage(Stage::Preprocess)?;
        let row_hint = self.session.profile.as_ref().map(|p| p.dimensions.rows);

        let log = if self.preprocess_remote {
            let session_id = self.require_session()?;
            match self.api.preprocess(&session_id, row_hint).await {
                Ok(steps) if !steps.is_empty() => {
                    if !self.still_active(&session_id) {
                        warn!("Discarding preprocess response for a stale session");
                        return Ok(());
                    }
                    PreprocessLog {
                        steps,
                        synthesized: false,
                    }
                }
                Ok(_) => {
                    info!("Remote preprocess returned no log; synthesizing locally");
                    self.synthesize_log()
                }
                Err(e) => {
                    warn!("Remote preprocess unavailable ({}); synthesizing locally", e);
                    self.synthesize_log()
                }
            }
        } else {
            debug!("Remote preprocess disabled; synthesizing local log");
            self.synthesize_log()
        };

        self.session.preprocess_log = Some(log);
        self.session.stage = Stage::Train;
        Ok(())
    }

    /// Minimal local summary sourced from the profile (or the retained
    /// rows when no profile is available)
    fn synthesize_log(&self) -> PreprocessLog {
        let (rows, columns) = match &self.session.profile {
            Some(p) => (p.dimensions.rows, p.dimensions.columns),
            None => (
                self.session.raw_rows.len() as u64,
                self.session.headers.len() as u64,
            ),
        };
        let date_col = self
            .session
            .mapping
            .as_ref()
            .map(|m| m.date_col.clone())
            .unwrap_or_else(|| crate::constants::upload::DEFAULT_DATE_COLUMN.to_string());

        PreprocessLog {
            steps: vec![
                PreprocessStep::new(
                    "validated schema",
                    format!("{} rows × {} columns", rows, columns),
                ),
                PreprocessStep::new("checked missing values", "no imputation applied"),
                PreprocessStep::new("sorted chronologically", format!("by column '{}'", date_col)),
            ],
            synthesized: true,
        }
    }

    // =========================================================================
    // Train Stage
    // =========================================================================

    /// Delegate model fitting to the remote service and capture the final
    /// forecast + metrics. Durable persistence of the result is best-effort:
    /// a storage failure is logged, not fatal.
    pub async fn run_train(&mut self) -> Result<()> {
        self.expect_stage(Stage::Train)?;
        let session_id = self.require_session()?;
        let mapping = self.require_mapping()?;

        let result = self.api.train(&session_id, &mapping).await?;

        if !self.still_active(&session_id) {
            warn!("Discarding training result for a stale session");
            return Ok(());
        }

        info!(
            predictions = result.forecast.predictions.len(),
            "Training complete"
        );
        self.session.training_result = Some(result);
        self.persist_flow();
        self.session.stage = Stage::Results;
        Ok(())
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Drive the pipeline from its current stage to Results
    pub async fn run(&mut self) -> Result<()> {
        if self.session.requires_repair() {
            self.repair_session().await?;
        }

        loop {
            let before = self.session.stage;
            match before {
                Stage::Upload => {
                    return Err(ForecastError::pipeline(
                        "Upload",
                        "no dataset uploaded; stage a file and confirm its mapping first",
                    ));
                }
                Stage::Profile => self.run_profile().await?,
                Stage::Preprocess => self.run_preprocess().await?,
                Stage::Train => self.run_train().await?,
                Stage::Results => return Ok(()),
            }
            if self.session.stage == before {
                return Err(ForecastError::pipeline_recoverable(
                    before.name(),
                    "stage did not advance; the response no longer matched the active session",
                ));
            }
        }
    }

    /// Restore a persisted flow from the storage tiers. Returns whether
    /// anything was found.
    pub fn hydrate(&mut self) -> bool {
        match self.repo.load_flow() {
            Some(flow) => {
                let session = flow.into_session(self.sample_rows);
                info!(
                    stage = %session.stage,
                    has_session = session.has_session(),
                    "Restored persisted flow"
                );
                self.session = session;
                true
            }
            None => false,
        }
    }

    /// Full reset: clears every storage tier, drops all guard keys, and
    /// returns to Upload. Idempotent from any stage.
    pub fn reset(&mut self) {
        if let Err(e) = self.repo.clear() {
            warn!("Failed to clear a storage tier during reset: {}", e);
        }
        self.session.reset();
        self.pending_csv = None;
        self.guard.reset();
        info!("Pipeline reset to Upload");
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    /// A response only applies if the session it was issued under is still
    /// the active one; reset may have started a new flow in the meantime.
    fn still_active(&self, issued: &str) -> bool {
        self.session.session_id.as_deref() == Some(issued)
    }

    fn persist_flow(&self) {
        let flow = FlowState::from_session(&self.session);
        if let Err(e) = self.repo.save_flow(&flow) {
            warn!("Failed to persist flow state: {}", e);
        }
    }

    fn expect_stage(&self, expected: Stage) -> Result<()> {
        if self.session.stage != expected {
            return Err(ForecastError::pipeline(
                expected.name(),
                format!(
                    "pipeline is at {} but {} was requested",
                    self.session.stage, expected
                ),
            ));
        }
        if !self.session.ready_for(expected) {
            return Err(ForecastError::pipeline(
                expected.name(),
                "stage preconditions not satisfied; session state is incomplete",
            ));
        }
        Ok(())
    }

    fn require_session(&self) -> Result<String> {
        self.session
            .session_id
            .clone()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                ForecastError::Session(
                    "session identifier missing; the repair procedure must run first".to_string(),
                )
            })
    }

    fn require_mapping(&self) -> Result<ColumnMapping> {
        self.session.mapping.clone().ok_or_else(|| {
            ForecastError::Session("column mapping not confirmed".to_string())
        })
    }

    fn file_name(&self) -> String {
        self.session
            .file_name
            .clone()
            .unwrap_or_else(|| "dataset.csv".to_string())
    }
}
