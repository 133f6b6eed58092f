//! Core Types
//!
//! Error system, pipeline session model, and analysis-service wire shapes.

pub mod analysis;
pub mod error;
pub mod session;

pub use analysis::{
    DatasetProfile, Dimensions, Forecast, Metrics, PreprocessLog, PreprocessStep, TrainingResult,
    UploadResponse,
};
pub use error::{ApiError, ErrorCategory, ForecastError, Result, ResultExt};
pub use session::{ColumnMapping, FlowState, PipelineSession, Row, Stage};
