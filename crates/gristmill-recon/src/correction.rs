//! Corrective mutations derived from a matrix selection.
//!
//! Grants and revokes run strictly sequentially and tolerate partial
//! failure: one rejected email never aborts the rest of the batch, and
//! the outcome reports exactly which emails were not fixed.

use crate::matrix::ClassifiedRow;
use crate::source::DocumentSource;
use gristmill_core::{DocId, Email, Role};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{info, warn};

/// Deduplicated correction candidates from a user-selected subset of
/// matrix rows.
///
/// Grants come from missing-lists, revokes from orphan rows; the two
/// sets are disjoint in practice because missing emails are, by
/// construction, absent from the snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectionBatch {
    pub grants: BTreeSet<Email>,
    pub revokes: BTreeSet<Email>,
}

impl CorrectionBatch {
    /// Gather correction candidates from selected rows.
    #[must_use]
    pub fn from_rows<'a>(selected: impl IntoIterator<Item = &'a ClassifiedRow>) -> Self {
        let mut batch = Self::default();
        for row in selected {
            batch.grants.extend(row.missing.iter().cloned());
            if let Some(orphan) = &row.orphan {
                batch.revokes.insert(orphan.clone());
            }
        }
        batch
    }

    /// Whether there is nothing to do.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.grants.is_empty() && self.revokes.is_empty()
    }
}

/// A single grant or revoke that the platform rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationFailure {
    pub email: Email,
    pub message: String,
}

/// Outcome of applying a correction batch: counts plus the explicit
/// list of failed emails per direction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CorrectionOutcome {
    pub granted: usize,
    pub grant_failures: Vec<MutationFailure>,
    pub revoked: usize,
    pub revoke_failures: Vec<MutationFailure>,
}

impl CorrectionOutcome {
    /// Whether every mutation in the batch succeeded.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.grant_failures.is_empty() && self.revoke_failures.is_empty()
    }
}

/// Applies correction batches through a [`DocumentSource`].
pub struct CorrectionExecutor<'a> {
    source: &'a dyn DocumentSource,
}

/// Grants never infer an intended privilege level: the reference table
/// encodes who should have access, not at what level, so every
/// corrective grant uses the lowest role. Deliberate policy.
const GRANT_ROLE: Role = Role::Viewer;

impl<'a> CorrectionExecutor<'a> {
    /// Create an executor over a document source.
    #[must_use]
    pub fn new(source: &'a dyn DocumentSource) -> Self {
        Self { source }
    }

    /// Apply a batch: grants first, then revokes, one email at a time in
    /// set order. Never aborts mid-batch; failures are recorded and the
    /// remaining corrections still execute.
    ///
    /// After this returns, any previously built snapshot or matrix for
    /// the document is stale and must be rebuilt.
    pub async fn apply(&self, doc: &DocId, batch: &CorrectionBatch) -> CorrectionOutcome {
        let mut outcome = CorrectionOutcome::default();

        for email in &batch.grants {
            match self.source.set_access(doc, email, Some(GRANT_ROLE)).await {
                Ok(()) => outcome.granted += 1,
                Err(e) => {
                    warn!(doc = %doc, email = %email, error = %e, "grant failed");
                    outcome.grant_failures.push(MutationFailure {
                        email: email.clone(),
                        message: e.to_string(),
                    });
                }
            }
        }

        for email in &batch.revokes {
            match self.source.set_access(doc, email, None).await {
                Ok(()) => outcome.revoked += 1,
                Err(e) => {
                    warn!(doc = %doc, email = %email, error = %e, "revoke failed");
                    outcome.revoke_failures.push(MutationFailure {
                        email: email.clone(),
                        message: e.to_string(),
                    });
                }
            }
        }

        info!(
            doc = %doc,
            granted = outcome.granted,
            revoked = outcome.revoked,
            failures = outcome.grant_failures.len() + outcome.revoke_failures.len(),
            "correction batch applied"
        );
        outcome
    }
}
