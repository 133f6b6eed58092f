//! Session Repository
//!
//! The session identifier must survive restarts and duplicate
//! initialization, so it is duplicated across storage tiers: the in-memory
//! session itself (owned by the controller), a process-lifetime ephemeral
//! tier, and a durable sqlite tier. Callers depend only on the repository
//! interface; every successful mint fans out to all tiers, reads go through
//! them in order, and clears hit every tier even when one fails.

use dashmap::DashMap;
use tracing::warn;

use super::database::SharedDatabase;
use crate::constants::storage::{FLOW_KEY, SESSION_KEY};
use crate::types::{FlowState, ForecastError, Result};

/// One persistence tier for session state
pub trait SessionTier: Send + Sync {
    fn name(&self) -> &'static str;

    fn get(&self) -> Result<Option<String>>;
    fn set(&self, session_id: &str) -> Result<()>;

    fn load_flow(&self) -> Result<Option<FlowState>>;
    fn save_flow(&self, flow: &FlowState) -> Result<()>;

    /// Remove both the session identifier and any stored flow
    fn clear(&self) -> Result<()>;
}

// =============================================================================
// Ephemeral Tier
// =============================================================================

/// Process-lifetime store. Survives controller re-creation within one run,
/// which is the CLI analogue of a tab-scoped browser store surviving
/// component remounts.
#[derive(Default)]
pub struct EphemeralTier {
    entries: DashMap<&'static str, String>,
}

impl EphemeralTier {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionTier for EphemeralTier {
    fn name(&self) -> &'static str {
        "ephemeral"
    }

    fn get(&self) -> Result<Option<String>> {
        Ok(self
            .entries
            .get(SESSION_KEY)
            .map(|v| v.clone())
            .filter(|id| !id.is_empty()))
    }

    fn set(&self, session_id: &str) -> Result<()> {
        self.entries.insert(SESSION_KEY, session_id.to_string());
        Ok(())
    }

    fn load_flow(&self) -> Result<Option<FlowState>> {
        match self.entries.get(FLOW_KEY) {
            Some(payload) => Ok(Some(serde_json::from_str(&payload)?)),
            None => Ok(None),
        }
    }

    fn save_flow(&self, flow: &FlowState) -> Result<()> {
        self.entries.insert(FLOW_KEY, serde_json::to_string(flow)?);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.entries.remove(SESSION_KEY);
        self.entries.remove(FLOW_KEY);
        Ok(())
    }
}

// =============================================================================
// Durable Tier
// =============================================================================

/// Sqlite-backed store surviving process restarts
pub struct DurableTier {
    db: SharedDatabase,
}

impl DurableTier {
    pub fn new(db: SharedDatabase) -> Self {
        Self { db }
    }
}

impl SessionTier for DurableTier {
    fn name(&self) -> &'static str {
        "durable"
    }

    fn get(&self) -> Result<Option<String>> {
        self.db.load_session_id(FLOW_KEY)
    }

    fn set(&self, session_id: &str) -> Result<()> {
        // Keep any stored payload; only refresh the identifier column
        let payload = self.db.load_flow(FLOW_KEY)?.unwrap_or_else(|| "{}".into());
        self.db.save_flow(FLOW_KEY, &payload, Some(session_id))
    }

    fn load_flow(&self) -> Result<Option<FlowState>> {
        match self.db.load_flow(FLOW_KEY)? {
            Some(payload) if payload != "{}" => Ok(Some(serde_json::from_str(&payload)?)),
            _ => Ok(None),
        }
    }

    fn save_flow(&self, flow: &FlowState) -> Result<()> {
        let payload = serde_json::to_string(flow)?;
        self.db
            .save_flow(FLOW_KEY, &payload, flow.session_id.as_deref())
    }

    fn clear(&self) -> Result<()> {
        self.db.clear_flow(FLOW_KEY)
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Fans session writes out to every available tier
pub struct SessionRepository {
    tiers: Vec<Box<dyn SessionTier>>,
}

impl SessionRepository {
    pub fn new(tiers: Vec<Box<dyn SessionTier>>) -> Self {
        Self { tiers }
    }

    /// The standard two persistence tiers (ephemeral + durable); the third
    /// tier is the in-memory session held by the controller.
    pub fn standard(db: SharedDatabase) -> Self {
        Self::new(vec![
            Box::new(EphemeralTier::new()),
            Box::new(DurableTier::new(db)),
        ])
    }

    /// First session identifier found, in tier order
    pub fn session_id(&self) -> Option<String> {
        for tier in &self.tiers {
            match tier.get() {
                Ok(Some(id)) => return Some(id),
                Ok(None) => {}
                Err(e) => warn!(tier = tier.name(), "Failed to read session id: {}", e),
            }
        }
        None
    }

    /// Record a freshly minted session identifier in every tier.
    ///
    /// Individual tier failures are logged; the mint only fails if no tier
    /// accepted the write.
    pub fn record(&self, session_id: &str) -> Result<()> {
        self.fan_out(|tier| tier.set(session_id), "record session id")
    }

    /// First stored flow found, in tier order
    pub fn load_flow(&self) -> Option<FlowState> {
        for tier in &self.tiers {
            match tier.load_flow() {
                Ok(Some(flow)) => return Some(flow),
                Ok(None) => {}
                Err(e) => warn!(tier = tier.name(), "Failed to load flow state: {}", e),
            }
        }
        None
    }

    /// Persist the flow snapshot to every tier
    pub fn save_flow(&self, flow: &FlowState) -> Result<()> {
        self.fan_out(|tier| tier.save_flow(flow), "save flow state")
    }

    /// Clear every tier. A failing tier is logged and does not stop the
    /// others from being cleared.
    pub fn clear(&self) -> Result<()> {
        self.fan_out(|tier| tier.clear(), "clear")
    }

    fn fan_out<F>(&self, mut op: F, what: &str) -> Result<()>
    where
        F: FnMut(&dyn SessionTier) -> Result<()>,
    {
        let mut succeeded = 0usize;
        for tier in &self.tiers {
            match op(tier.as_ref()) {
                Ok(()) => succeeded += 1,
                Err(e) => warn!(tier = tier.name(), "Failed to {}: {}", what, e),
            }
        }
        if succeeded == 0 && !self.tiers.is_empty() {
            return Err(ForecastError::Storage(format!(
                "failed to {} in every tier",
                what
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::session::database::FlowDatabase;
    use crate::types::PipelineSession;

    fn repo() -> SessionRepository {
        SessionRepository::standard(Arc::new(FlowDatabase::open_in_memory().unwrap()))
    }

    fn flow_with_session(id: Option<&str>) -> FlowState {
        let mut session = PipelineSession::new();
        session.session_id = id.map(str::to_string);
        FlowState::from_session(&session)
    }

    #[test]
    fn test_record_fans_out_to_all_tiers() {
        let r = repo();
        r.record("abc123").unwrap();

        for tier in &r.tiers {
            assert_eq!(tier.get().unwrap().as_deref(), Some("abc123"));
        }
        assert_eq!(r.session_id().as_deref(), Some("abc123"));
    }

    #[test]
    fn test_clear_empties_every_tier() {
        let r = repo();
        r.record("abc123").unwrap();
        r.save_flow(&flow_with_session(Some("abc123"))).unwrap();

        r.clear().unwrap();

        assert!(r.session_id().is_none());
        assert!(r.load_flow().is_none());
        for tier in &r.tiers {
            assert!(tier.get().unwrap().is_none());
            assert!(tier.load_flow().unwrap().is_none());
        }
    }

    #[test]
    fn test_flow_survives_durable_tier_alone() {
        let db = Arc::new(FlowDatabase::open_in_memory().unwrap());
        {
            let first = SessionRepository::standard(db.clone());
            first.save_flow(&flow_with_session(Some("abc123"))).unwrap();
        }

        // Fresh repository, fresh ephemeral tier: only the durable tier has it
        let second = SessionRepository::standard(db);
        let flow = second.load_flow().unwrap();
        assert_eq!(flow.session_id.as_deref(), Some("abc123"));
        assert_eq!(second.session_id().as_deref(), Some("abc123"));
    }

    #[test]
    fn test_durable_set_preserves_payload() {
        let db = Arc::new(FlowDatabase::open_in_memory().unwrap());
        let tier = DurableTier::new(db);

        tier.save_flow(&flow_with_session(Some("old"))).unwrap();
        tier.set("new-id").unwrap();

        assert_eq!(tier.get().unwrap().as_deref(), Some("new-id"));
        // payload still loadable after the id refresh
        assert!(tier.load_flow().unwrap().is_some());
    }
}
