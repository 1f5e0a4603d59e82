//! Firestore REST document store.
//!
//! Each record becomes one `createDocument` call on the configured
//! collection, using the field names the web dashboard already reads
//! (`userId`, `timestamp`, `duration`, `type`).

use std::time::Duration;

use async_trait::async_trait;
use chrono::SecondsFormat;
use reqwest::Client;
use serde_json::{json, Value};
use url::Url;

use super::{SessionRecord, SessionStore};
use crate::error::{ConfigError, RecorderError};
use crate::storage::FirestoreConfig;

pub struct FirestoreSessionStore {
    endpoint: Url,
    id_token: Option<String>,
    http_client: Client,
}

impl FirestoreSessionStore {
    /// # Errors
    /// Returns an error if the project is missing, the base URL is invalid,
    /// or the HTTP client cannot be built.
    pub fn new(config: &FirestoreConfig) -> Result<Self, ConfigError> {
        if config.project_id.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "store.firestore.project_id".into(),
                message: "required when store.backend = \"firestore\"".into(),
            });
        }

        let invalid_url = |message: String| ConfigError::InvalidValue {
            key: "store.firestore.base_url".into(),
            message,
        };
        let mut endpoint = Url::parse(&config.base_url).map_err(|e| invalid_url(e.to_string()))?;
        endpoint
            .path_segments_mut()
            .map_err(|_| invalid_url(format!("'{}' cannot be a base URL", config.base_url)))?
            .pop_if_empty()
            .extend([
                "v1",
                "projects",
                config.project_id.trim(),
                "databases",
                "(default)",
                "documents",
                config.collection.as_str(),
            ]);

        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()
            .map_err(|e| ConfigError::InvalidValue {
                key: "store.firestore".into(),
                message: e.to_string(),
            })?;

        Ok(Self {
            endpoint,
            id_token: config.id_token.clone().filter(|t| !t.is_empty()),
            http_client,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Firestore typed-value document for one record.
    pub fn document(record: &SessionRecord) -> Value {
        json!({
            "fields": {
                "userId": { "stringValue": record.owner_id.as_str() },
                "timestamp": {
                    "timestampValue": record.occurred_at.to_rfc3339_opts(SecondsFormat::Millis, true)
                },
                "duration": { "integerValue": record.duration_secs.to_string() },
                "type": { "stringValue": record.kind.as_str() },
            }
        })
    }
}

#[async_trait]
impl SessionStore for FirestoreSessionStore {
    fn name(&self) -> &str {
        "firestore"
    }

    async fn append(&self, record: &SessionRecord) -> Result<(), RecorderError> {
        let mut request = self
            .http_client
            .post(self.endpoint.clone())
            .json(&Self::document(record));
        if let Some(token) = &self.id_token {
            request = request.bearer_auth(token);
        }

        let resp = request.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(RecorderError::store(format!(
                "Firestore returned {status}: {}",
                body.trim()
            )));
        }
        Ok(())
    }
}
