use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{SessionRecord, SessionStore};
use crate::error::RecorderError;
use crate::storage::Database;

/// Local SQLite store. Writes run on the blocking pool so the ticker never
/// waits on disk I/O.
#[derive(Clone)]
pub struct SqliteSessionStore {
    db: Arc<Mutex<Database>>,
}

impl SqliteSessionStore {
    pub fn new(db: Database) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
        }
    }

    /// Shared handle for read paths (statistics) in the same process.
    pub fn database(&self) -> Arc<Mutex<Database>> {
        self.db.clone()
    }
}

#[async_trait]
impl SessionStore for SqliteSessionStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn append(&self, record: &SessionRecord) -> Result<(), RecorderError> {
        let db = self.db.clone();
        let record = record.clone();
        tokio::task::spawn_blocking(move || -> Result<(), RecorderError> {
            let db = db
                .lock()
                .map_err(|_| RecorderError::store("database mutex poisoned"))?;
            db.append_session(&record)?;
            Ok(())
        })
        .await
        .map_err(|e| RecorderError::store(format!("write task failed: {e}")))?
    }
}
