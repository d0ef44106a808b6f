//! Reconciliation matrix: the three-way classification of every email.
//!
//! Cross-products reference rows against the configured email columns,
//! classifies each resolved email against the access snapshot, and emits
//! a display-ready row set carrying hidden correction metadata. Orphan
//! grants become synthetic rows so that grants and orphans are
//! addressable through the same selection mechanism.

use crate::error::{ReconError, ReconResult};
use crate::resolver::{resolve_cell, EmailColumnConfig, ReferenceBinding, ReferenceLookup};
use crate::snapshot::AccessSnapshot;
use crate::source::DocumentSource;
use gristmill_core::{ColId, DocId, Email, RowId, TableId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::info;

/// Indicator appended to an email that holds the expected grant.
pub const PRESENT_MARK: char = '✓';
/// Indicator appended to an email that is expected but not granted.
pub const MISSING_MARK: char = '✗';
/// Indicator appended to an orphan grant in its synthetic row.
pub const ORPHAN_MARK: char = '⚠';

/// What to reconcile: the reference table, its title column, and the
/// email-bearing columns with their optional bindings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcilePlan {
    pub table: TableId,
    pub title_column: ColId,
    pub email_columns: Vec<EmailColumnConfig>,
    /// Column assumed to hold literal emails in auto-detected reference
    /// targets; a declared `Ref:<Table>` type names the table only.
    pub reference_email_column: ColId,
}

impl ReconcilePlan {
    /// A plan with the conventional `Email` target column for
    /// auto-detected bindings.
    #[must_use]
    pub fn new(table: impl Into<TableId>, title_column: impl Into<ColId>) -> Self {
        Self {
            table: table.into(),
            title_column: title_column.into(),
            email_columns: Vec::new(),
            reference_email_column: ColId::new("Email"),
        }
    }

    /// Add an email column.
    #[must_use]
    pub fn with_column(mut self, config: EmailColumnConfig) -> Self {
        self.email_columns.push(config);
        self
    }

    /// Override the target column used for auto-detected bindings.
    #[must_use]
    pub fn with_reference_email_column(mut self, column: impl Into<ColId>) -> Self {
        self.reference_email_column = column.into();
        self
    }
}

/// An email column readied for one run: display label resolved and,
/// for reference columns, the lookup table fetched.
#[derive(Debug, Clone)]
pub struct BoundColumn {
    pub column: ColId,
    pub label: String,
    pub lookup: Option<ReferenceLookup>,
}

/// One classified row of the matrix.
///
/// Reference rows keep their native order and verbatim title; orphan
/// rows are synthetic (blank title, `orphan` set, the email annotated in
/// the first configured column). `missing` and `orphan` are correction
/// metadata, not meant for direct display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifiedRow {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_id: Option<RowId>,
    pub title: String,
    /// Annotated display text, one entry per configured email column.
    pub cells: Vec<String>,
    /// Emails expected by this row but lacking an explicit grant.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing: Vec<Email>,
    /// The orphan grant this synthetic row represents.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orphan: Option<Email>,
}

impl ClassifiedRow {
    /// Whether this is a synthetic orphan row.
    #[must_use]
    pub fn is_orphan_row(&self) -> bool {
        self.orphan.is_some()
    }
}

/// Result of one reconciliation run: a display-ready, serializable
/// artifact that also drives selective correction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconciliationMatrix {
    /// Display labels of the configured email columns.
    pub columns: Vec<String>,
    /// Reference rows in native order, then orphan rows sorted by email.
    pub rows: Vec<ClassifiedRow>,
    /// Snapshot emails matched by at least one reference cell.
    pub matched: BTreeSet<Email>,
    /// Snapshot emails not accounted for by any reference cell.
    pub orphans: BTreeSet<Email>,
}

impl ReconciliationMatrix {
    /// Summary counts over the matrix.
    #[must_use]
    pub fn stats(&self) -> MatrixStats {
        MatrixStats {
            reference_rows: self.rows.iter().filter(|r| !r.is_orphan_row()).count(),
            matched: self.matched.len(),
            missing: self
                .rows
                .iter()
                .flat_map(|r| r.missing.iter())
                .collect::<BTreeSet<_>>()
                .len(),
            orphans: self.orphans.len(),
        }
    }
}

/// Summary counts of a reconciliation matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixStats {
    pub reference_rows: usize,
    pub matched: usize,
    /// Distinct emails expected somewhere but not granted.
    pub missing: usize,
    pub orphans: usize,
}

/// Ready the plan's email columns for a run: resolve display labels,
/// decide bindings (explicit binding > declared-type auto-detection) and
/// fetch one lookup per bound column.
pub async fn bind_columns(
    source: &dyn DocumentSource,
    doc: &DocId,
    plan: &ReconcilePlan,
) -> ReconResult<Vec<BoundColumn>> {
    let metadata = source
        .list_columns(doc, &plan.table)
        .await
        .map_err(|e| ReconError::Resolution {
            table: plan.table.clone(),
            message: format!("column listing failed: {e}"),
        })?;

    let mut bound = Vec::with_capacity(plan.email_columns.len());
    for config in &plan.email_columns {
        let meta = metadata.iter().find(|c| c.id == config.column);
        let label = meta
            .and_then(|c| c.fields.label.clone())
            .unwrap_or_else(|| config.column.to_string());

        let binding = config.binding.clone().or_else(|| {
            meta.and_then(|c| c.fields.col_type.as_deref()).and_then(|ty| {
                ReferenceBinding::from_declared_type(ty, &plan.reference_email_column)
            })
        });

        let lookup = match binding {
            Some(binding) => Some(ReferenceLookup::fetch(source, doc, binding).await?),
            None => None,
        };

        bound.push(BoundColumn {
            column: config.column.clone(),
            label,
            lookup,
        });
    }
    Ok(bound)
}

/// Build the classification matrix from already-fetched inputs.
///
/// Pure with respect to its arguments: row order follows the reference
/// table's native order, orphan rows are appended sorted by email, and
/// identical inputs produce an identical matrix.
#[must_use]
pub fn build_matrix(
    reference_rows: &[gristmill_client::models::Record],
    title_column: &ColId,
    columns: &[BoundColumn],
    snapshot: &AccessSnapshot,
) -> ReconciliationMatrix {
    let mut matched: BTreeSet<Email> = BTreeSet::new();
    let mut rows: Vec<ClassifiedRow> = Vec::with_capacity(reference_rows.len());

    for record in reference_rows {
        let title = match record.field(title_column) {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(other) if !other.is_null() => other.to_string(),
            _ => String::new(),
        };

        let mut cells = Vec::with_capacity(columns.len());
        let mut missing: Vec<Email> = Vec::new();

        for column in columns {
            let resolved = record
                .field(&column.column)
                .map(|value| resolve_cell(value, column.lookup.as_ref()))
                .unwrap_or_default();

            let mut annotated = Vec::with_capacity(resolved.len());
            for email in resolved {
                if snapshot.contains(&email) {
                    annotated.push(format!("{email} {PRESENT_MARK}"));
                    matched.insert(email);
                } else {
                    annotated.push(format!("{email} {MISSING_MARK}"));
                    if !missing.contains(&email) {
                        missing.push(email);
                    }
                }
            }
            cells.push(annotated.join(", "));
        }

        rows.push(ClassifiedRow {
            row_id: Some(record.id),
            title,
            cells,
            missing,
            orphan: None,
        });
    }

    let orphans: BTreeSet<Email> = snapshot
        .emails()
        .filter(|email| !matched.contains(*email))
        .cloned()
        .collect();

    for email in &orphans {
        let mut cells = vec![String::new(); columns.len()];
        if let Some(first) = cells.first_mut() {
            *first = format!("{email} {ORPHAN_MARK}");
        }
        rows.push(ClassifiedRow {
            row_id: None,
            title: String::new(),
            cells,
            missing: Vec::new(),
            orphan: Some(email.clone()),
        });
    }

    ReconciliationMatrix {
        columns: columns.iter().map(|c| c.label.clone()).collect(),
        rows,
        matched,
        orphans,
    }
}

/// Run a full reconciliation pass: fetch the snapshot, the reference
/// rows and the per-column lookups, then classify.
///
/// Everything is read exactly once at the start of the run and treated
/// as an immutable point-in-time view.
pub async fn reconcile(
    source: &dyn DocumentSource,
    doc: &DocId,
    plan: &ReconcilePlan,
) -> ReconResult<ReconciliationMatrix> {
    let snapshot = AccessSnapshot::fetch(source, doc).await?;

    let reference_rows = source
        .list_reference_rows(doc, &plan.table)
        .await
        .map_err(|e| ReconError::Resolution {
            table: plan.table.clone(),
            message: format!("record listing failed: {e}"),
        })?;

    let columns = bind_columns(source, doc, plan).await?;
    let matrix = build_matrix(&reference_rows, &plan.title_column, &columns, &snapshot);

    let stats = matrix.stats();
    info!(
        doc = %doc,
        table = %plan.table,
        rows = stats.reference_rows,
        matched = stats.matched,
        missing = stats.missing,
        orphans = stats.orphans,
        "reconciliation complete"
    );

    Ok(matrix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gristmill_client::models::{AccessUser, Record};
    use serde_json::json;

    fn email(raw: &str) -> Email {
        Email::normalize(raw).unwrap()
    }

    fn record(id: i64, fields: serde_json::Value) -> Record {
        serde_json::from_value(json!({"id": id, "fields": fields})).unwrap()
    }

    fn snapshot(entries: &[(&str, &str)]) -> AccessSnapshot {
        let users: Vec<AccessUser> = entries
            .iter()
            .map(|(e, r)| AccessUser {
                id: None,
                email: Some((*e).to_string()),
                name: None,
                access: Some((*r).to_string()),
                parent_access: None,
            })
            .collect();
        AccessSnapshot::from_users(&users)
    }

    fn literal_column(id: &str) -> BoundColumn {
        BoundColumn {
            column: ColId::new(id),
            label: id.to_string(),
            lookup: None,
        }
    }

    #[test]
    fn classifies_matched_and_missing() {
        let rows = vec![record(
            1,
            json!({"Name": "Acme Corp", "Reviewers": "alice@x.com, bob@x.com"}),
        )];
        let snap = snapshot(&[("alice@x.com", "editors")]);
        let matrix = build_matrix(
            &rows,
            &ColId::new("Name"),
            &[literal_column("Reviewers")],
            &snap,
        );

        assert_eq!(matrix.rows.len(), 1);
        let row = &matrix.rows[0];
        assert_eq!(row.title, "Acme Corp");
        assert_eq!(row.cells[0], "alice@x.com ✓, bob@x.com ✗");
        assert_eq!(row.missing, vec![email("bob@x.com")]);
        assert!(matrix.orphans.is_empty());
        assert!(matrix.matched.contains(&email("alice@x.com")));
    }

    #[test]
    fn unreferenced_grant_becomes_synthetic_orphan_row() {
        let rows = vec![record(1, json!({"Name": "Acme", "Reviewers": ""}))];
        let snap = snapshot(&[("carol@x.com", "viewers")]);
        let matrix = build_matrix(
            &rows,
            &ColId::new("Name"),
            &[literal_column("Reviewers")],
            &snap,
        );

        assert_eq!(matrix.rows.len(), 2);
        let orphan_row = &matrix.rows[1];
        assert!(orphan_row.is_orphan_row());
        assert!(orphan_row.title.is_empty());
        assert!(orphan_row.row_id.is_none());
        assert_eq!(orphan_row.cells[0], "carol@x.com ⚠");
        assert_eq!(orphan_row.orphan, Some(email("carol@x.com")));
        assert!(matrix.orphans.contains(&email("carol@x.com")));
    }

    #[test]
    fn every_snapshot_email_is_matched_xor_orphan() {
        let rows = vec![
            record(1, json!({"Name": "A", "Reviewers": "alice@x.com"})),
            record(2, json!({"Name": "B", "Reviewers": "alice@x.com, dave@x.com"})),
        ];
        let snap = snapshot(&[
            ("alice@x.com", "editors"),
            ("carol@x.com", "viewers"),
            ("erin@x.com", "owners"),
        ]);
        let matrix = build_matrix(
            &rows,
            &ColId::new("Name"),
            &[literal_column("Reviewers")],
            &snap,
        );

        for e in snap.emails() {
            let in_matched = matrix.matched.contains(e);
            let in_orphans = matrix.orphans.contains(e);
            assert!(in_matched ^ in_orphans, "{e} must be matched xor orphan");
        }
        // dave is missing, never an orphan candidate
        assert!(!matrix.matched.contains(&email("dave@x.com")));
        assert!(!matrix.orphans.contains(&email("dave@x.com")));
    }

    #[test]
    fn empty_row_still_appears_title_only() {
        let rows = vec![record(7, json!({"Name": "Hollow", "Reviewers": null}))];
        let snap = snapshot(&[]);
        let matrix = build_matrix(
            &rows,
            &ColId::new("Name"),
            &[literal_column("Reviewers")],
            &snap,
        );

        assert_eq!(matrix.rows.len(), 1);
        let row = &matrix.rows[0];
        assert_eq!(row.title, "Hollow");
        assert_eq!(row.cells[0], "");
        assert!(row.missing.is_empty());
        assert!(matrix.matched.is_empty());
    }

    #[test]
    fn orphan_rows_are_sorted_by_email() {
        let snap = snapshot(&[
            ("zoe@x.com", "viewers"),
            ("adam@x.com", "viewers"),
            ("mia@x.com", "viewers"),
        ]);
        let matrix = build_matrix(&[], &ColId::new("Name"), &[literal_column("Emails")], &snap);

        let orphan_order: Vec<&Email> =
            matrix.rows.iter().filter_map(|r| r.orphan.as_ref()).collect();
        assert_eq!(
            orphan_order,
            vec![&email("adam@x.com"), &email("mia@x.com"), &email("zoe@x.com")]
        );
    }

    #[test]
    fn matrix_round_trips_through_json() {
        let rows = vec![record(1, json!({"Name": "Acme", "Reviewers": "bob@x.com"}))];
        let snap = snapshot(&[("carol@x.com", "viewers")]);
        let matrix = build_matrix(
            &rows,
            &ColId::new("Name"),
            &[literal_column("Reviewers")],
            &snap,
        );

        let json = serde_json::to_string(&matrix).unwrap();
        let back: ReconciliationMatrix = serde_json::from_str(&json).unwrap();
        assert_eq!(back.rows.len(), matrix.rows.len());
        assert_eq!(back.orphans, matrix.orphans);
        assert_eq!(back.rows[0].missing, matrix.rows[0].missing);
    }
}
