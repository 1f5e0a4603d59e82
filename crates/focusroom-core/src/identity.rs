//! Identity provider seam.
//!
//! The timer never needs an identity to run. Only the recorder asks for the
//! current owner, and treats `None` as a reason to drop the record.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque identifier of the authenticated subject.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    /// Returns `None` for blank identifiers.
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Supplies the owner of newly created session records.
pub trait IdentityProvider: Send + Sync {
    fn current_owner(&self) -> Option<OwnerId>;
}

/// A fixed identity, typically read from `identity.user_id` in the config.
#[derive(Debug, Clone)]
pub struct StaticIdentity {
    owner: Option<OwnerId>,
}

impl StaticIdentity {
    pub fn new(owner: Option<OwnerId>) -> Self {
        Self { owner }
    }

    pub fn from_user_id(user_id: Option<&str>) -> Self {
        Self::new(user_id.and_then(OwnerId::new))
    }
}

impl IdentityProvider for StaticIdentity {
    fn current_owner(&self) -> Option<OwnerId> {
        self.owner.clone()
    }
}

/// No authenticated subject.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignedOut;

impl IdentityProvider for SignedOut {
    fn current_owner(&self) -> Option<OwnerId> {
        None
    }
}
