//! Org-wide access map command
//!
//! Walks every document of every workspace in an organization and lists
//! who can see what. One unreadable document does not abort the walk; it
//! is reported and skipped.

use crate::config::Settings;
use crate::error::CliResult;
use crate::output::{print_warning, render_table, truncate};
use clap::Args;
use gristmill_core::DocId;
use serde::Serialize;

/// Arguments for the map command
#[derive(Args, Debug)]
pub struct MapArgs {
    /// Organization id or subdomain
    pub org: String,

    /// Only show explicit document-level grants
    #[arg(long)]
    pub hide_inherited: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// One line of the access map.
#[derive(Debug, Serialize)]
struct MapEntry {
    workspace: String,
    document: String,
    doc_id: DocId,
    email: String,
    access: Option<String>,
    inherited: Option<String>,
}

/// Build and print the org-wide access map
pub async fn execute(args: MapArgs) -> CliResult<()> {
    let settings = Settings::from_env()?;
    let client = settings.client()?;

    let workspaces = client.list_workspaces(&args.org).await?;

    let mut entries: Vec<MapEntry> = Vec::new();
    for workspace in &workspaces {
        for doc in &workspace.docs {
            let access = match client.doc_access(&doc.id).await {
                Ok(list) => list,
                Err(e) => {
                    print_warning(&format!("skipping document {} ({}): {e}", doc.name, doc.id));
                    continue;
                }
            };
            for user in access.users {
                if args.hide_inherited && user.access.is_none() {
                    continue;
                }
                let Some(email) = user.email else { continue };
                entries.push(MapEntry {
                    workspace: workspace.name.clone(),
                    document: doc.name.clone(),
                    doc_id: doc.id.clone(),
                    email,
                    access: user.access,
                    inherited: user.parent_access,
                });
            }
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("No access entries found.");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = entries
        .iter()
        .map(|e| {
            vec![
                truncate(&e.workspace, 24),
                truncate(&e.document, 32),
                e.email.clone(),
                e.access.clone().unwrap_or_default(),
                e.inherited.clone().unwrap_or_default(),
            ]
        })
        .collect();
    print!(
        "{}",
        render_table(
            &["WORKSPACE", "DOCUMENT", "EMAIL", "ACCESS", "INHERITED"],
            &rows
        )
    );
    println!();
    println!("{} access entr(ies) across the organization", entries.len());
    Ok(())
}
