//! Pipeline Session Model
//!
//! The unit of work: one uploaded dataset moving through the five-stage
//! pipeline. The session identifier issued by the remote service is the only
//! cross-stage shared mutable state; everything else accumulates forward.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::upload::DEFAULT_DATE_COLUMN;
use crate::types::analysis::{DatasetProfile, PreprocessLog, TrainingResult};
use crate::types::{ForecastError, Result};

/// A single parsed data row, keyed by column name
pub type Row = serde_json::Map<String, serde_json::Value>;

// =============================================================================
// Stage
// =============================================================================

/// One discrete step of the fixed five-step pipeline.
///
/// Stages are numbered 1-5 in execution order and only ever advance,
/// except for an explicit full reset back to Upload:
/// - 1: Upload - local header parse and column mapping
/// - 2: Profile - remote dataset statistics
/// - 3: Preprocess - transformation log (remote or synthesized)
/// - 4: Train - remote model fitting
/// - 5: Results - read-only fan-out views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Upload = 1,
    Profile = 2,
    Preprocess = 3,
    Train = 4,
    Results = 5,
}

impl Stage {
    pub fn as_u8(&self) -> u8 {
        *self as u8
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Upload => "Upload",
            Self::Profile => "Profile",
            Self::Preprocess => "Preprocess",
            Self::Train => "Train",
            Self::Results => "Results",
        }
    }

    /// Total number of stages
    pub const COUNT: usize = 5;

    /// Create from u8 stage number
    pub fn from_u8(stage: u8) -> Option<Self> {
        match stage {
            1 => Some(Self::Upload),
            2 => Some(Self::Profile),
            3 => Some(Self::Preprocess),
            4 => Some(Self::Train),
            5 => Some(Self::Results),
            _ => None,
        }
    }

    /// The next stage in execution order, if any
    pub fn next(&self) -> Option<Self> {
        Self::from_u8(self.as_u8() + 1)
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

// =============================================================================
// Column Mapping
// =============================================================================

/// User-confirmed assignment of source columns to the logical roles the
/// forecasting service expects. Set once during Upload, immutable afterward
/// unless the user restarts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub date_col: String,
    pub target_col: String,
}

impl ColumnMapping {
    /// Resolve a mapping against the detected headers.
    ///
    /// The target column is mandatory and must exist in the file. A missing
    /// date column falls back to the literal default rather than blocking.
    pub fn resolve(target: &str, date: Option<&str>, headers: &[String]) -> Result<Self> {
        let target = target.trim();
        if target.is_empty() {
            return Err(ForecastError::input("target column must not be empty"));
        }
        if !headers.iter().any(|h| h == target) {
            return Err(ForecastError::input(format!(
                "target column '{}' not found in file (available: {})",
                target,
                headers.join(", ")
            )));
        }

        let date_col = match date.map(str::trim) {
            Some(d) if !d.is_empty() => {
                if !headers.iter().any(|h| h == d) {
                    return Err(ForecastError::input(format!(
                        "date column '{}' not found in file",
                        d
                    )));
                }
                d.to_string()
            }
            _ => DEFAULT_DATE_COLUMN.to_string(),
        };

        Ok(Self {
            date_col,
            target_col: target.to_string(),
        })
    }
}

// =============================================================================
// Pipeline Session
// =============================================================================

/// In-memory state of one dataset's trip through the pipeline.
///
/// Created implicitly on first file selection, persisted across restarts via
/// the durable store, destroyed only by explicit reset.
#[derive(Debug, Clone, Default)]
pub struct PipelineSession {
    /// Opaque identifier issued by the remote service; unset until the first
    /// successful upload
    pub session_id: Option<String>,
    /// Current stage; monotonically advances except on reset
    pub stage: Stage,
    /// Column-to-role mapping confirmed during Upload
    pub mapping: Option<ColumnMapping>,
    /// Original file name, kept for re-upload during session repair
    pub file_name: Option<String>,
    /// Bounded preview of uploaded rows, for local display only
    pub raw_sample: Vec<Row>,
    /// Uploaded rows retained in memory so a lost session can be re-minted
    pub raw_rows: Vec<Row>,
    /// Detected header row, in file order
    pub headers: Vec<String>,
    /// Dataset statistics from the remote service
    pub profile: Option<DatasetProfile>,
    /// Ordered transformation log (remote or locally synthesized)
    pub preprocess_log: Option<PreprocessLog>,
    /// Final forecast + metrics; presence signals pipeline completion
    pub training_result: Option<TrainingResult>,
}

impl Default for Stage {
    fn default() -> Self {
        Stage::Upload
    }
}

impl PipelineSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restored rows without a valid session identifier: the repair
    /// procedure must run before any further network call.
    pub fn requires_repair(&self) -> bool {
        !self.raw_rows.is_empty() && self.session_id.as_deref().is_none_or(str::is_empty)
    }

    /// Whether the invariants for issuing this stage's remote call hold
    pub fn ready_for(&self, stage: Stage) -> bool {
        match stage {
            Stage::Upload => true,
            Stage::Profile => self.has_session() && self.mapping.is_some(),
            Stage::Preprocess => self.has_session() && self.profile.is_some(),
            Stage::Train => self.has_session() && self.preprocess_log.is_some(),
            Stage::Results => self.training_result.is_some(),
        }
    }

    pub fn has_session(&self) -> bool {
        self.session_id.as_deref().is_some_and(|id| !id.is_empty())
    }

    /// Full reset back to Upload, discarding all accumulated state
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

// =============================================================================
// Flow State (persisted layout)
// =============================================================================

/// Serialized form of the session stored in the ephemeral and durable tiers.
///
/// Mirrors the in-memory session minus the preview sample, which is cheap to
/// rebuild from the retained rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowState {
    /// Local identifier for this flow record
    pub flow_id: Uuid,
    pub session_id: Option<String>,
    pub file_name: Option<String>,
    pub headers: Vec<String>,
    pub raw_rows: Vec<Row>,
    pub mapping: Option<ColumnMapping>,
    pub results: Option<TrainingResult>,
    pub updated_at: DateTime<Utc>,
}

impl FlowState {
    /// Snapshot the persistable parts of a session
    pub fn from_session(session: &PipelineSession) -> Self {
        Self {
            flow_id: Uuid::new_v4(),
            session_id: session.session_id.clone(),
            file_name: session.file_name.clone(),
            headers: session.headers.clone(),
            raw_rows: session.raw_rows.clone(),
            mapping: session.mapping.clone(),
            results: session.training_result.clone(),
            updated_at: Utc::now(),
        }
    }

    /// Rebuild an in-memory session from a persisted flow.
    ///
    /// The restored stage is derived from what survived: finished results put
    /// the session at Results, a bare session identifier puts it at Profile,
    /// and rows without an identifier stay at Upload for the repair procedure.
    pub fn into_session(self, sample_limit: usize) -> PipelineSession {
        let stage = if self.results.is_some() {
            Stage::Results
        } else if self.session_id.as_deref().is_some_and(|id| !id.is_empty()) {
            Stage::Profile
        } else {
            Stage::Upload
        };

        let raw_sample = self.raw_rows.iter().take(sample_limit).cloned().collect();

        PipelineSession {
            session_id: self.session_id.filter(|id| !id.is_empty()),
            stage,
            mapping: self.mapping,
            file_name: self.file_name,
            raw_sample,
            raw_rows: self.raw_rows,
            headers: self.headers,
            profile: None,
            preprocess_log: None,
            training_result: self.results,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn headers() -> Vec<String> {
        vec!["date".to_string(), "sales".to_string()]
    }

    fn row(date: &str, sales: i64) -> Row {
        let mut r = Row::new();
        r.insert("date".into(), date.into());
        r.insert("sales".into(), sales.into());
        r
    }

    #[test]
    fn test_stage_order() {
        assert_eq!(Stage::Upload.as_u8(), 1);
        assert_eq!(Stage::Results.as_u8(), 5);
        assert_eq!(Stage::Upload.next(), Some(Stage::Profile));
        assert_eq!(Stage::Results.next(), None);
        assert_eq!(Stage::from_u8(3), Some(Stage::Preprocess));
        assert_eq!(Stage::from_u8(0), None);
        assert_eq!(Stage::from_u8(6), None);
        assert_eq!(Stage::COUNT, 5);
    }

    #[test]
    fn test_mapping_requires_target() {
        assert!(ColumnMapping::resolve("", None, &headers()).is_err());
        assert!(ColumnMapping::resolve("  ", None, &headers()).is_err());
        assert!(ColumnMapping::resolve("revenue", None, &headers()).is_err());
    }

    #[test]
    fn test_mapping_date_fallback() {
        let mapping = ColumnMapping::resolve("sales", None, &headers()).unwrap();
        assert_eq!(mapping.target_col, "sales");
        assert_eq!(mapping.date_col, DEFAULT_DATE_COLUMN);

        let mapping = ColumnMapping::resolve("sales", Some(""), &headers()).unwrap();
        assert_eq!(mapping.date_col, DEFAULT_DATE_COLUMN);
    }

    #[test]
    fn test_mapping_unknown_date_rejected() {
        assert!(ColumnMapping::resolve("sales", Some("timestamp"), &headers()).is_err());
    }

    #[test]
    fn test_requires_repair() {
        let mut session = PipelineSession::new();
        assert!(!session.requires_repair());

        session.raw_rows = vec![row("2024-01-01", 10)];
        assert!(session.requires_repair());

        session.session_id = Some(String::new());
        assert!(session.requires_repair());

        session.session_id = Some("abc123".to_string());
        assert!(!session.requires_repair());
    }

    #[test]
    fn test_ready_for_preconditions() {
        let mut session = PipelineSession::new();
        assert!(session.ready_for(Stage::Upload));
        assert!(!session.ready_for(Stage::Profile));

        session.session_id = Some("abc123".to_string());
        // id alone is not enough; the mapping must be confirmed too
        assert!(!session.ready_for(Stage::Profile));

        session.mapping = Some(ColumnMapping {
            date_col: "date".into(),
            target_col: "sales".into(),
        });
        assert!(session.ready_for(Stage::Profile));
        assert!(!session.ready_for(Stage::Preprocess));

        session.profile = Some(DatasetProfile::default());
        assert!(session.ready_for(Stage::Preprocess));
        assert!(!session.ready_for(Stage::Train));
    }

    #[test]
    fn test_reset_returns_to_upload() {
        let mut session = PipelineSession::new();
        session.session_id = Some("abc123".to_string());
        session.stage = Stage::Train;
        session.raw_rows = vec![row("2024-01-01", 10)];
        session.reset();
        assert_eq!(session.stage, Stage::Upload);
        assert!(session.session_id.is_none());
        assert!(session.raw_rows.is_empty());
    }

    #[test]
    fn test_flow_state_round_trip_stage_derivation() {
        let mut session = PipelineSession::new();
        session.headers = headers();
        session.raw_rows = vec![row("2024-01-01", 10), row("2024-01-02", 12)];
        session.mapping = Some(ColumnMapping {
            date_col: "date".into(),
            target_col: "sales".into(),
        });

        // Rows without a session id: restored flow stays at Upload for repair
        let restored = FlowState::from_session(&session).into_session(20);
        assert_eq!(restored.stage, Stage::Upload);
        assert!(restored.requires_repair());

        // With a session id: restored flow resumes at Profile
        session.session_id = Some("abc123".to_string());
        let restored = FlowState::from_session(&session).into_session(20);
        assert_eq!(restored.stage, Stage::Profile);
        assert_eq!(restored.raw_sample.len(), 2);
    }
}
