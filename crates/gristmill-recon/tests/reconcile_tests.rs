//! End-to-end reconciliation runs against the in-memory source:
//! classification scenarios, reference bindings, and fatal-error paths.

mod helpers;

use gristmill_core::{Email, Role, TableId};
use gristmill_recon::{reconcile, EmailColumnConfig, ReconError, ReconcilePlan};
use helpers::mock_source::MockSource;
use serde_json::json;

fn email(raw: &str) -> Email {
    Email::normalize(raw).unwrap()
}

fn doc() -> gristmill_core::DocId {
    gristmill_core::DocId::new("doc-a")
}

fn plan_with_literal_reviewers() -> ReconcilePlan {
    ReconcilePlan::new("Companies", "Name")
        .with_column(EmailColumnConfig::literal("Reviewers"))
}

#[tokio::test]
async fn literal_column_classifies_matched_and_missing() {
    let source = MockSource::new()
        .with_records(
            "doc-a",
            "Companies",
            json!([{"id": 1, "fields": {"Name": "Acme Corp", "Reviewers": "alice@x.com, bob@x.com"}}]),
        )
        .with_grant("doc-a", "alice@x.com", Role::Editor);

    let matrix = reconcile(&source, &doc(), &plan_with_literal_reviewers())
        .await
        .unwrap();

    assert_eq!(matrix.rows.len(), 1);
    assert_eq!(matrix.rows[0].title, "Acme Corp");
    assert_eq!(matrix.rows[0].missing, vec![email("bob@x.com")]);
    assert!(matrix.matched.contains(&email("alice@x.com")));
    assert!(matrix.orphans.is_empty());
}

#[tokio::test]
async fn unreferenced_grant_yields_orphan_row() {
    let source = MockSource::new()
        .with_records("doc-a", "Companies", json!([]))
        .with_grant("doc-a", "carol@x.com", Role::Viewer);

    let matrix = reconcile(&source, &doc(), &plan_with_literal_reviewers())
        .await
        .unwrap();

    assert_eq!(matrix.rows.len(), 1);
    assert!(matrix.rows[0].is_orphan_row());
    assert_eq!(matrix.rows[0].orphan, Some(email("carol@x.com")));
    assert!(matrix.orphans.contains(&email("carol@x.com")));
    assert!(matrix.matched.is_empty());
}

#[tokio::test]
async fn reference_column_auto_detects_binding_from_declared_type() {
    let source = MockSource::new()
        .with_records(
            "doc-a",
            "Companies",
            json!([{"id": 1, "fields": {"Name": "Acme", "Reviewer": 3}}]),
        )
        .with_columns(
            "doc-a",
            "Companies",
            json!([
                {"id": "Name", "fields": {"label": "Name", "type": "Text"}},
                {"id": "Reviewer", "fields": {"label": "Reviewer", "type": "Ref:Users"}}
            ]),
        )
        .with_records(
            "doc-a",
            "Users",
            json!([{"id": 3, "fields": {"Email": "Alice@X.com"}}]),
        )
        .with_grant("doc-a", "alice@x.com", Role::Viewer);

    let plan = ReconcilePlan::new("Companies", "Name")
        .with_column(EmailColumnConfig::literal("Reviewer"));
    let matrix = reconcile(&source, &doc(), &plan).await.unwrap();

    assert!(matrix.matched.contains(&email("alice@x.com")));
    assert_eq!(matrix.columns, vec!["Reviewer".to_string()]);
    assert!(matrix.rows[0].missing.is_empty());
}

#[tokio::test]
async fn reference_list_cells_union_their_resolutions() {
    let source = MockSource::new()
        .with_records(
            "doc-a",
            "Companies",
            json!([{"id": 1, "fields": {"Name": "Acme", "Reviewers": ["L", 1, 2]}}]),
        )
        .with_columns(
            "doc-a",
            "Companies",
            json!([{"id": "Reviewers", "fields": {"label": "Reviewers", "type": "RefList:Users"}}]),
        )
        .with_records(
            "doc-a",
            "Users",
            json!([
                {"id": 1, "fields": {"Email": "alice@x.com"}},
                {"id": 2, "fields": {"Email": "bob@x.com"}}
            ]),
        )
        .with_grant("doc-a", "alice@x.com", Role::Editor);

    let plan = ReconcilePlan::new("Companies", "Name")
        .with_column(EmailColumnConfig::literal("Reviewers"));
    let matrix = reconcile(&source, &doc(), &plan).await.unwrap();

    assert!(matrix.matched.contains(&email("alice@x.com")));
    assert_eq!(matrix.rows[0].missing, vec![email("bob@x.com")]);
}

#[tokio::test]
async fn dangling_reference_resolves_to_nothing_not_an_error() {
    // Cell points at row 42; the Users table has no such row.
    let source = MockSource::new()
        .with_records(
            "doc-a",
            "Companies",
            json!([{"id": 1, "fields": {"Name": "Acme", "Reviewer": 42}}]),
        )
        .with_columns(
            "doc-a",
            "Companies",
            json!([{"id": "Reviewer", "fields": {"label": "Reviewer", "type": "Ref:Users"}}]),
        )
        .with_records("doc-a", "Users", json!([]));

    let plan = ReconcilePlan::new("Companies", "Name")
        .with_column(EmailColumnConfig::literal("Reviewer"));
    let matrix = reconcile(&source, &doc(), &plan).await.unwrap();

    assert_eq!(matrix.rows.len(), 1);
    assert!(matrix.rows[0].missing.is_empty());
    assert!(matrix.matched.is_empty());
}

#[tokio::test]
async fn explicit_binding_overrides_generic_declared_type() {
    // Declared type is a plain Int; only the manual binding makes the
    // cell resolve through Users.
    let source = MockSource::new()
        .with_records(
            "doc-a",
            "Companies",
            json!([{"id": 1, "fields": {"Name": "Acme", "Reviewer": 5}}]),
        )
        .with_columns(
            "doc-a",
            "Companies",
            json!([{"id": "Reviewer", "fields": {"label": "Reviewer", "type": "Int"}}]),
        )
        .with_records(
            "doc-a",
            "Users",
            json!([{"id": 5, "fields": {"Mail": "erin@x.com"}}]),
        )
        .with_grant("doc-a", "erin@x.com", Role::Viewer);

    let plan = ReconcilePlan::new("Companies", "Name")
        .with_column(EmailColumnConfig::bound("Reviewer", "Users", "Mail"));
    let matrix = reconcile(&source, &doc(), &plan).await.unwrap();

    assert!(matrix.matched.contains(&email("erin@x.com")));
}

#[tokio::test]
async fn failed_access_listing_aborts_with_snapshot_unavailable() {
    let source = MockSource::new()
        .with_records("doc-a", "Companies", json!([]))
        .fail_access("doc-a");

    let err = reconcile(&source, &doc(), &plan_with_literal_reviewers())
        .await
        .unwrap_err();

    match err {
        ReconError::SnapshotUnavailable { doc, .. } => assert_eq!(doc.as_str(), "doc-a"),
        other => panic!("expected SnapshotUnavailable, got {other}"),
    }
}

#[tokio::test]
async fn unreadable_bound_table_aborts_naming_the_table() {
    let source = MockSource::new()
        .with_records(
            "doc-a",
            "Companies",
            json!([{"id": 1, "fields": {"Name": "Acme", "Reviewer": 3}}]),
        )
        .with_columns(
            "doc-a",
            "Companies",
            json!([{"id": "Reviewer", "fields": {"label": "Reviewer", "type": "Ref:Users"}}]),
        )
        .fail_table("Users");

    let plan = ReconcilePlan::new("Companies", "Name")
        .with_column(EmailColumnConfig::literal("Reviewer"));
    let err = reconcile(&source, &doc(), &plan).await.unwrap_err();

    match err {
        ReconError::Resolution { table, .. } => assert_eq!(table, TableId::new("Users")),
        other => panic!("expected Resolution, got {other}"),
    }
}

#[tokio::test]
async fn snapshot_partition_holds_across_columns_and_rows() {
    let source = MockSource::new()
        .with_records(
            "doc-a",
            "Companies",
            json!([
                {"id": 1, "fields": {"Name": "A", "Reviewers": "alice@x.com", "Backup": "bob@x.com"}},
                {"id": 2, "fields": {"Name": "B", "Reviewers": "alice@x.com, frank@x.com", "Backup": null}}
            ]),
        )
        .with_grant("doc-a", "alice@x.com", Role::Owner)
        .with_grant("doc-a", "bob@x.com", Role::Editor)
        .with_grant("doc-a", "carol@x.com", Role::Viewer);

    let plan = ReconcilePlan::new("Companies", "Name")
        .with_column(EmailColumnConfig::literal("Reviewers"))
        .with_column(EmailColumnConfig::literal("Backup"));
    let matrix = reconcile(&source, &doc(), &plan).await.unwrap();

    // alice and bob matched, carol orphaned; frank missing only.
    for e in ["alice@x.com", "bob@x.com", "carol@x.com"] {
        let e = email(e);
        assert!(
            matrix.matched.contains(&e) ^ matrix.orphans.contains(&e),
            "{e} must be matched xor orphan"
        );
    }
    assert!(matrix.orphans.contains(&email("carol@x.com")));
    assert!(!matrix.matched.contains(&email("frank@x.com")));
    assert!(!matrix.orphans.contains(&email("frank@x.com")));

    let stats = matrix.stats();
    assert_eq!(stats.reference_rows, 2);
    assert_eq!(stats.matched, 2);
    assert_eq!(stats.missing, 1);
    assert_eq!(stats.orphans, 1);
}
