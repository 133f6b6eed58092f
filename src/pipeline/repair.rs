//! One-Shot Operation Guard
//!
//! Duplicate initialization (the hosting environment may drive the same
//! startup path twice) must not issue duplicate side effects. Each logical
//! operation acquires an idempotency key; the key is held after success and
//! released on failure so the operation stays retryable.

use dashmap::DashMap;

/// Idempotency keys for logical pipeline operations
#[derive(Default)]
pub struct OperationGuard {
    held: DashMap<&'static str, ()>,
}

impl OperationGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Try to acquire the key. Returns false when the operation already ran
    /// (or is in flight).
    pub fn try_acquire(&self, key: &'static str) -> bool {
        self.held.insert(key, ()).is_none()
    }

    /// Release the key after a failed attempt, permitting a future retry
    pub fn release(&self, key: &'static str) {
        self.held.remove(key);
    }

    pub fn is_held(&self, key: &'static str) -> bool {
        self.held.contains_key(key)
    }

    /// Drop every key; used on full pipeline reset
    pub fn reset(&self) {
        self.held.clear();
    }
}
