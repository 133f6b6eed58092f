//! ForecastAI - CSV-to-Forecast Pipeline Client
//!
//! A command-line client that drives a remote time-series analysis service
//! through a five-stage pipeline: upload, profile, preprocess, train, results.
//!
//! ## Core Features
//!
//! - **Staged Pipeline**: Monotonic progression with per-stage guards
//! - **Session Persistence**: In-memory, process-lifetime and durable SQLite
//!   tiers holding the active session id and flow snapshot
//! - **Session Repair**: Re-uploads stored rows to mint a fresh remote session
//!   when the stored one is gone, protected by a one-shot guard
//! - **Bounded Retry**: Exponential backoff on session-not-found responses
//!   during profiling, everything else fails fast
//! - **Graceful Degradation**: Falls back to locally synthesized preprocessing
//!   notes when the remote step is unavailable
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use forecastai::api::HttpAnalysisClient;
//! use forecastai::config::ConfigLoader;
//! use forecastai::pipeline::PipelineController;
//! use forecastai::session::{FlowDatabase, SessionRepository};
//!
//! let config = ConfigLoader::load()?;
//! let api = Arc::new(HttpAnalysisClient::new(&config.service)?);
//! let db = Arc::new(FlowDatabase::open("flow.db")?);
//! let mut controller =
//!     PipelineController::new(api, SessionRepository::standard(db), &config);
//!
//! controller.begin_upload("sales.csv", &csv_text)?;
//! controller.confirm_mapping("sales", None)?;
//! controller.ingest().await?;
//! controller.run().await?;
//! ```
//!
//! ## Modules
//!
//! - [`api`]: HTTP client for the analysis service, session-aware retry
//! - [`pipeline`]: Stage controller, session repair, operation guard
//! - [`session`]: Tiered session-id and flow persistence
//! - [`report`]: Stateless result views (insights, charts, sanity, plan)
//! - [`ingest`]: Local CSV header and sample-row handling

pub mod api;
pub mod cli;
pub mod config;
pub mod constants;
pub mod ingest;
pub mod pipeline;
pub mod report;
pub mod session;
pub mod types;

pub use config::{Config, ConfigLoader};
pub use pipeline::{PipelineController, RepairOutcome};
pub use session::{FlowDatabase, SessionRepository};
pub use types::{ForecastError, PipelineSession, Result, Stage};
