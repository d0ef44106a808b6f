//! Org-level user listing command
//!
//! Shows who has access to the team site itself (the top level), as
//! opposed to `map`, which walks individual documents.

use crate::config::Settings;
use crate::error::CliResult;
use crate::output::render_table;
use clap::Args;

/// Arguments for the users command
#[derive(Args, Debug)]
pub struct UsersArgs {
    /// Organization id or subdomain
    pub org: String,

    /// Only keep entries whose email or name contains this text
    #[arg(long)]
    pub filter: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// List the users with organization-level access
pub async fn execute(args: UsersArgs) -> CliResult<()> {
    let settings = Settings::from_env()?;
    let client = settings.client()?;

    let access = client.org_access(&args.org).await?;
    let users: Vec<_> = access
        .users
        .into_iter()
        .filter(|u| match &args.filter {
            None => true,
            Some(needle) => {
                let needle = needle.to_lowercase();
                u.email
                    .as_deref()
                    .is_some_and(|e| e.to_lowercase().contains(&needle))
                    || u.name
                        .as_deref()
                        .is_some_and(|n| n.to_lowercase().contains(&needle))
            }
        })
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&users)?);
        return Ok(());
    }

    if users.is_empty() {
        println!("No users found at the organization level.");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = users
        .iter()
        .map(|u| {
            vec![
                u.email.clone().unwrap_or_default(),
                u.name.clone().unwrap_or_default(),
                u.access.clone().unwrap_or_default(),
            ]
        })
        .collect();
    print!("{}", render_table(&["EMAIL", "NAME", "ACCESS"], &rows));
    println!();
    println!("{} user(s)", users.len());
    Ok(())
}
