//! Bulk grant operations across documents.
//!
//! Copy, move, re-level and remove explicit grants for a selection of
//! (document, email) entries. Like the correction executor, every
//! operation runs sequentially with per-email failure tolerance.

use crate::correction::MutationFailure;
use crate::error::ReconResult;
use crate::snapshot::AccessSnapshot;
use crate::source::DocumentSource;
use gristmill_core::{DocId, Email, Role};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// One selected access entry: an email's explicit grant on a document.
///
/// `role` is `None` for entries that carry only inherited access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessEntry {
    pub doc: DocId,
    pub email: Email,
    pub role: Option<Role>,
}

/// Outcome of a bulk operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BulkOutcome {
    /// Entries mutated successfully.
    pub processed: usize,
    /// Entries deliberately left untouched (already explicit on the
    /// target, or no explicit role to carry over).
    pub skipped: usize,
    /// Entries the platform rejected.
    pub failures: Vec<MutationFailure>,
}

impl BulkOutcome {
    fn record_failure(&mut self, email: &Email, error: impl ToString) {
        self.failures.push(MutationFailure {
            email: email.clone(),
            message: error.to_string(),
        });
    }
}

/// Copy the selected grants onto a target document.
///
/// An email already holding an explicit grant on the target is skipped
/// (the original grant wins); an entry without an explicit role is also
/// skipped, since inventing a level for it would escalate privilege.
/// The target's current access list must be readable; copying blind
/// could overwrite explicit grants.
pub async fn copy_access(
    source: &dyn DocumentSource,
    entries: &[AccessEntry],
    target: &DocId,
) -> ReconResult<BulkOutcome> {
    let existing = AccessSnapshot::fetch(source, target).await?;
    let mut outcome = BulkOutcome::default();

    for entry in entries {
        let Some(role) = entry.role else {
            outcome.skipped += 1;
            continue;
        };
        if existing.contains(&entry.email) {
            outcome.skipped += 1;
            continue;
        }
        match source.set_access(target, &entry.email, Some(role)).await {
            Ok(()) => outcome.processed += 1,
            Err(e) => {
                warn!(doc = %target, email = %entry.email, error = %e, "copy failed");
                outcome.record_failure(&entry.email, e);
            }
        }
    }

    info!(
        target = %target,
        processed = outcome.processed,
        skipped = outcome.skipped,
        failures = outcome.failures.len(),
        "bulk copy complete"
    );
    Ok(outcome)
}

/// Move the selected grants onto a target document: copy (same rules as
/// [`copy_access`]) then revoke each entry from its origin document.
/// The origin revoke happens even for skipped copies, matching a move's
/// intent of clearing the origin.
pub async fn move_access(
    source: &dyn DocumentSource,
    entries: &[AccessEntry],
    target: &DocId,
) -> ReconResult<BulkOutcome> {
    let existing = AccessSnapshot::fetch(source, target).await?;
    let mut outcome = BulkOutcome::default();

    for entry in entries {
        if let Some(role) = entry.role {
            if !existing.contains(&entry.email) {
                if let Err(e) = source.set_access(target, &entry.email, Some(role)).await {
                    warn!(doc = %target, email = %entry.email, error = %e, "move: copy failed");
                    outcome.record_failure(&entry.email, e);
                    // Do not clear the origin when the copy failed; that
                    // would lose the grant entirely.
                    continue;
                }
            }
        }

        match source.set_access(&entry.doc, &entry.email, None).await {
            Ok(()) => outcome.processed += 1,
            Err(e) => {
                warn!(doc = %entry.doc, email = %entry.email, error = %e, "move: revoke failed");
                outcome.record_failure(&entry.email, e);
            }
        }
    }

    info!(
        target = %target,
        processed = outcome.processed,
        failures = outcome.failures.len(),
        "bulk move complete"
    );
    Ok(outcome)
}

/// Substitute one user for another: revoke each selected entry's grant
/// and grant `replacement` at the given role on the same document.
/// When a revoke fails the replacement is not granted for that entry;
/// the document keeps its old grant instead of ending up half swapped.
pub async fn replace_access(
    source: &dyn DocumentSource,
    entries: &[AccessEntry],
    replacement: &Email,
    role: Role,
) -> BulkOutcome {
    let mut outcome = BulkOutcome::default();
    for entry in entries {
        if let Err(e) = source.set_access(&entry.doc, &entry.email, None).await {
            warn!(doc = %entry.doc, email = %entry.email, error = %e, "replace: revoke failed");
            outcome.record_failure(&entry.email, e);
            continue;
        }
        match source.set_access(&entry.doc, replacement, Some(role)).await {
            Ok(()) => outcome.processed += 1,
            Err(e) => {
                warn!(doc = %entry.doc, email = %replacement, error = %e, "replace: grant failed");
                outcome.record_failure(replacement, e);
            }
        }
    }

    info!(
        replacement = %replacement,
        processed = outcome.processed,
        failures = outcome.failures.len(),
        "bulk replace complete"
    );
    outcome
}

/// Set every selected entry's explicit role on its own document.
pub async fn update_role(
    source: &dyn DocumentSource,
    entries: &[AccessEntry],
    role: Role,
) -> BulkOutcome {
    let mut outcome = BulkOutcome::default();
    for entry in entries {
        match source.set_access(&entry.doc, &entry.email, Some(role)).await {
            Ok(()) => outcome.processed += 1,
            Err(e) => {
                warn!(doc = %entry.doc, email = %entry.email, error = %e, "role update failed");
                outcome.record_failure(&entry.email, e);
            }
        }
    }
    outcome
}

/// Remove every selected entry's explicit grant from its own document.
pub async fn remove_access(source: &dyn DocumentSource, entries: &[AccessEntry]) -> BulkOutcome {
    let mut outcome = BulkOutcome::default();
    for entry in entries {
        match source.set_access(&entry.doc, &entry.email, None).await {
            Ok(()) => outcome.processed += 1,
            Err(e) => {
                warn!(doc = %entry.doc, email = %entry.email, error = %e, "removal failed");
                outcome.record_failure(&entry.email, e);
            }
        }
    }
    outcome
}
