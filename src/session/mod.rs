//! Session Persistence
//!
//! Tiered storage keeping the remote session identifier (and the flow it
//! belongs to) alive across restarts and duplicate initialization.

pub mod database;
pub mod repository;

pub use database::{FlowDatabase, PoolConfig, SharedDatabase};
pub use repository::{DurableTier, EphemeralTier, SessionRepository, SessionTier};
