//! Durable history of completed work intervals.
//!
//! A [`SessionRecorder`] turns one `Work -> Break` transition into one
//! immutable [`SessionRecord`] and hands it to a [`SessionStore`]. Failures
//! are reported to the caller and never retried; the timer does not wait on
//! the outcome.

mod firestore;
mod memory;
mod sqlite;

pub use firestore::FirestoreSessionStore;
pub use memory::MemorySessionStore;
pub use sqlite::SqliteSessionStore;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, RecorderError};
use crate::identity::OwnerId;
use crate::storage::{Config, Database, StoreBackend};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionKind {
    /// Only work intervals are ever recorded.
    Work,
}

impl SessionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionKind::Work => "work",
        }
    }
}

/// One completed work interval. Append-only: there is no update or delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub owner_id: OwnerId,
    /// When the work interval ended, not when it started.
    pub occurred_at: DateTime<Utc>,
    #[serde(rename = "durationSeconds")]
    pub duration_secs: u64,
    pub kind: SessionKind,
}

impl SessionRecord {
    pub fn work(owner_id: OwnerId, occurred_at: DateTime<Utc>, duration_secs: u64) -> Self {
        Self {
            owner_id,
            occurred_at,
            duration_secs,
            kind: SessionKind::Work,
        }
    }
}

/// Append-only write target for session records.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Short identifier used in logs (e.g. "sqlite", "firestore").
    fn name(&self) -> &str;

    /// Persist one record.
    async fn append(&self, record: &SessionRecord) -> Result<(), RecorderError>;
}

/// Records completed work intervals into a store.
#[derive(Clone)]
pub struct SessionRecorder {
    store: Arc<dyn SessionStore>,
}

impl SessionRecorder {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    pub fn store_name(&self) -> &str {
        self.store.name()
    }

    /// Record one completed work interval for `owner`.
    ///
    /// # Errors
    /// `PersistenceUnavailable` when there is no owner or the store write fails.
    pub async fn record(
        &self,
        owner: Option<OwnerId>,
        occurred_at: DateTime<Utc>,
        duration_secs: u64,
    ) -> Result<SessionRecord, RecorderError> {
        let owner_id = owner.ok_or_else(RecorderError::no_owner)?;
        let record = SessionRecord::work(owner_id, occurred_at, duration_secs);
        self.store.append(&record).await?;
        tracing::info!(
            store = self.store.name(),
            owner = %record.owner_id,
            occurred_at = %record.occurred_at,
            "recorded work session"
        );
        Ok(record)
    }
}

/// Build the store selected by `[store]` in the config.
pub fn store_from_config(config: &Config) -> Result<Arc<dyn SessionStore>, CoreError> {
    match config.store.backend {
        StoreBackend::Local => {
            let db = Database::open()?;
            Ok(Arc::new(SqliteSessionStore::new(db)))
        }
        StoreBackend::Firestore => {
            let store = FirestoreSessionStore::new(&config.store.firestore)?;
            Ok(Arc::new(store))
        }
    }
}
