use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::{SessionRecord, SessionStore};
use crate::error::RecorderError;

/// In-process store. Can be switched offline to simulate an unreachable backend.
#[derive(Debug)]
pub struct MemorySessionStore {
    records: Mutex<Vec<SessionRecord>>,
    available: AtomicBool,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            available: AtomicBool::new(true),
        }
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Everything appended so far, oldest first.
    pub fn records(&self) -> Vec<SessionRecord> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn append(&self, record: &SessionRecord) -> Result<(), RecorderError> {
        if !self.available.load(Ordering::SeqCst) {
            return Err(RecorderError::store("memory store offline"));
        }
        self.records
            .lock()
            .map_err(|_| RecorderError::store("memory store poisoned"))?
            .push(record.clone());
        Ok(())
    }
}
