//! Reconciliation error types.
//!
//! Only failures that would corrupt a classification are errors here:
//! a missing snapshot or an unreadable reference table aborts the run,
//! because a partial classification manufactures false orphans and
//! false missing entries. Per-email mutation failures are not errors;
//! they are collected in [`crate::CorrectionOutcome`].

use gristmill_core::{DocId, TableId};
use thiserror::Error;

/// Fatal error for a reconciliation run.
#[derive(Debug, Error)]
pub enum ReconError {
    /// The document's access listing could not be fetched. The run must
    /// not proceed with a partial snapshot.
    #[error("access snapshot unavailable for document {doc}: {message}")]
    SnapshotUnavailable { doc: DocId, message: String },

    /// A reference table or its rows/columns could not be read (for
    /// example permission denied on the bound target table). All cells
    /// depending on it would silently resolve to nothing, so the run
    /// aborts instead.
    #[error("failed to resolve references through table {table}: {message}")]
    Resolution { table: TableId, message: String },
}

/// Result type for reconciliation operations.
pub type ReconResult<T> = Result<T, ReconError>;
