//! Point-in-time snapshot of a document's explicit grants.

use crate::error::{ReconError, ReconResult};
use crate::source::DocumentSource;
use gristmill_client::models::AccessUser;
use gristmill_core::{DocId, Email, Role};
use std::collections::BTreeMap;
use tracing::warn;

/// Read-only email→role map of a document's explicit grants, valid for
/// one reconciliation pass.
///
/// Entries whose role is null carry only inherited access and are
/// excluded: the engine reconciles direct document-level grants against
/// an explicit reference list, and inherited access is out of scope for
/// that classification.
#[derive(Debug, Clone, Default)]
pub struct AccessSnapshot {
    roles: BTreeMap<Email, Role>,
}

impl AccessSnapshot {
    /// Fetch and normalize the access list of a document.
    ///
    /// Any listing failure aborts with
    /// [`ReconError::SnapshotUnavailable`]; classifying against a
    /// partial snapshot would manufacture false orphans.
    pub async fn fetch(source: &dyn DocumentSource, doc: &DocId) -> ReconResult<Self> {
        let users = source
            .access_list(doc)
            .await
            .map_err(|e| ReconError::SnapshotUnavailable {
                doc: doc.clone(),
                message: e.to_string(),
            })?;
        Ok(Self::from_users(&users))
    }

    /// Build a snapshot from already-fetched access entries.
    #[must_use]
    pub fn from_users(users: &[AccessUser]) -> Self {
        let mut roles = BTreeMap::new();
        for user in users {
            let Some(email) = user.email.as_deref().and_then(Email::normalize) else {
                continue;
            };
            let Some(raw_role) = user.access.as_deref() else {
                // Inherited-only access; no explicit grant to reconcile.
                continue;
            };
            match raw_role.parse::<Role>() {
                Ok(role) => {
                    roles.insert(email, role);
                }
                Err(_) => {
                    // Documents only carry the three closed roles; any
                    // other string is not an explicit document grant.
                    warn!(email = %email, role = raw_role, "ignoring unknown access role");
                }
            }
        }
        Self { roles }
    }

    /// The explicit role of an email, if any.
    #[must_use]
    pub fn role(&self, email: &Email) -> Option<Role> {
        self.roles.get(email).copied()
    }

    /// Whether the email holds an explicit grant.
    #[must_use]
    pub fn contains(&self, email: &Email) -> bool {
        self.roles.contains_key(email)
    }

    /// All explicitly granted emails, in sorted order.
    pub fn emails(&self) -> impl Iterator<Item = &Email> {
        self.roles.keys()
    }

    /// Number of explicit grants.
    #[must_use]
    pub fn len(&self) -> usize {
        self.roles.len()
    }

    /// Whether the document has no explicit grants.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}
