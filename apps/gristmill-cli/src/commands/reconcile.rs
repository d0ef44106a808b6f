//! Reconciliation command
//!
//! Runs a full classification of a document's reference table against
//! its access list and, optionally, applies corrections for the missing
//! and orphan grants it finds.

use crate::config::Settings;
use crate::error::{CliError, CliResult};
use crate::output::{print_key_value, print_success, print_warning, render_table, truncate};
use clap::Args;
use gristmill_core::DocId;
use gristmill_recon::{
    CorrectionBatch, CorrectionExecutor, EmailColumnConfig, ReconcilePlan, ReconciliationMatrix,
};

/// Arguments for the reconcile command
#[derive(Args, Debug)]
pub struct ReconcileArgs {
    /// Document id
    pub doc: String,

    /// Reference table name
    #[arg(long, default_value = "Companies")]
    pub table: String,

    /// Column holding each row's display title
    #[arg(long, default_value = "Name")]
    pub title_column: String,

    /// Email-bearing column, as COL or COL=Table.Column for an explicit
    /// reference binding. Repeatable.
    #[arg(long = "email-column", required = true)]
    pub email_columns: Vec<String>,

    /// Target column for auto-detected reference bindings
    #[arg(long, default_value = "Email")]
    pub reference_email_column: String,

    /// Grant viewer access to every missing email
    #[arg(long)]
    pub grant_missing: bool,

    /// Revoke every orphan grant
    #[arg(long)]
    pub revoke_orphans: bool,

    /// Output the matrix as JSON
    #[arg(long)]
    pub json: bool,
}

/// Run a reconciliation and optionally apply corrections
pub async fn execute(args: ReconcileArgs) -> CliResult<()> {
    let settings = Settings::from_env()?;
    let client = settings.client()?;
    let doc = DocId::new(args.doc.as_str());

    let mut plan = ReconcilePlan::new(args.table.as_str(), args.title_column.as_str())
        .with_reference_email_column(args.reference_email_column.as_str());
    for spec in &args.email_columns {
        plan = plan.with_column(parse_email_column(spec)?);
    }

    let matrix = gristmill_recon::reconcile(&client, &doc, &plan).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&matrix)?);
    } else {
        print_matrix(&matrix);
    }

    if !args.grant_missing && !args.revoke_orphans {
        return Ok(());
    }

    let full = CorrectionBatch::from_rows(matrix.rows.iter());
    let batch = CorrectionBatch {
        grants: if args.grant_missing {
            full.grants
        } else {
            Default::default()
        },
        revokes: if args.revoke_orphans {
            full.revokes
        } else {
            Default::default()
        },
    };
    if batch.is_empty() {
        print_success("Nothing to correct.");
        return Ok(());
    }

    let outcome = CorrectionExecutor::new(&client).apply(&doc, &batch).await;

    println!();
    print_key_value("Granted", &outcome.granted.to_string());
    print_key_value("Revoked", &outcome.revoked.to_string());
    for failure in outcome
        .grant_failures
        .iter()
        .chain(outcome.revoke_failures.iter())
    {
        print_warning(&format!("{}: {}", failure.email, failure.message));
    }

    if outcome.is_clean() {
        print_success("All corrections applied.");
        Ok(())
    } else {
        Err(CliError::PartialCorrection {
            failed: outcome.grant_failures.len() + outcome.revoke_failures.len(),
        })
    }
}

/// Parse an email-column spec: `COL` or `COL=Table.Column`.
fn parse_email_column(spec: &str) -> CliResult<EmailColumnConfig> {
    match spec.split_once('=') {
        None => {
            if spec.is_empty() {
                return Err(CliError::Validation("empty email column name".to_string()));
            }
            Ok(EmailColumnConfig::literal(spec))
        }
        Some((column, binding)) => {
            let (table, target) = binding.split_once('.').ok_or_else(|| {
                CliError::Validation(format!(
                    "binding must look like Table.Column, got {binding:?}"
                ))
            })?;
            if column.is_empty() || table.is_empty() || target.is_empty() {
                return Err(CliError::Validation(format!(
                    "invalid email column spec {spec:?}"
                )));
            }
            Ok(EmailColumnConfig::bound(column, table, target))
        }
    }
}

fn print_matrix(matrix: &ReconciliationMatrix) {
    let mut headers: Vec<&str> = vec!["TITLE"];
    headers.extend(matrix.columns.iter().map(String::as_str));

    let rows: Vec<Vec<String>> = matrix
        .rows
        .iter()
        .map(|row| {
            let mut cells = Vec::with_capacity(row.cells.len() + 1);
            cells.push(truncate(&row.title, 32));
            cells.extend(row.cells.iter().cloned());
            cells
        })
        .collect();
    print!("{}", render_table(&headers, &rows));

    let stats = matrix.stats();
    println!();
    print_key_value("Reference rows", &stats.reference_rows.to_string());
    print_key_value("Matched", &stats.matched.to_string());
    print_key_value("Missing", &stats.missing.to_string());
    print_key_value("Orphans", &stats.orphans.to_string());
}
