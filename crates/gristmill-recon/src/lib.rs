//! # Access Reconciliation Engine
//!
//! Compares a Grist document's explicit share list with a reference table
//! that designates who *should* have access, and drives idempotent
//! corrective mutations.
//!
//! ## Overview
//!
//! - Reference cells resolve to normalized emails, following one level of
//!   indirection through a bound foreign table/column
//! - Every discovered email is classified against the access snapshot:
//!   matched, missing (expected but not granted) or orphan (granted but
//!   not expected)
//! - A selected subset of the classification drives grants and revokes,
//!   sequentially, with per-email failure tolerance
//! - Bulk copy/move/update/remove of grants across documents
//!
//! ## Data flow
//!
//! ```text
//! ReconcilePlan ──► bind columns ──► ReferenceLookup (one per binding)
//!                                          │
//! reference rows ──────────────────────────▼
//!                                   build_matrix ◄── AccessSnapshot
//!                                          │
//!                                 ReconciliationMatrix
//!                                          │ (user selects rows)
//!                                   CorrectionBatch
//!                                          │
//!                                 CorrectionExecutor ──► set_access
//! ```
//!
//! A run reads the reference table and the snapshot exactly once and
//! treats both as immutable point-in-time views. After corrections are
//! applied the snapshot is stale; callers must re-fetch before the next
//! run.

pub mod bulk;
pub mod correction;
pub mod error;
pub mod matrix;
pub mod resolver;
pub mod snapshot;
pub mod source;

pub use bulk::{AccessEntry, BulkOutcome};
pub use correction::{CorrectionBatch, CorrectionExecutor, CorrectionOutcome, MutationFailure};
pub use error::{ReconError, ReconResult};
pub use matrix::{
    build_matrix, reconcile, BoundColumn, ClassifiedRow, MatrixStats, ReconcilePlan,
    ReconciliationMatrix,
};
pub use resolver::{resolve_cell, EmailColumnConfig, ReferenceBinding, ReferenceLookup};
pub use snapshot::AccessSnapshot;
pub use source::DocumentSource;
