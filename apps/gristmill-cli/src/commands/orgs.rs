//! Organization listing command

use crate::config::Settings;
use crate::error::CliResult;
use crate::output::render_table;
use clap::Args;

/// Arguments for the orgs command
#[derive(Args, Debug)]
pub struct OrgsArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// List the organizations visible to the configured API key
pub async fn execute(args: OrgsArgs) -> CliResult<()> {
    let settings = Settings::from_env()?;
    let client = settings.client()?;

    let orgs = client.list_orgs().await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&orgs)?);
        return Ok(());
    }

    if orgs.is_empty() {
        println!("No organizations visible to this API key.");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = orgs
        .iter()
        .map(|org| {
            vec![
                org.id.to_string(),
                org.name.clone(),
                org.domain.clone().unwrap_or_default(),
            ]
        })
        .collect();
    print!("{}", render_table(&["ID", "NAME", "DOMAIN"], &rows));
    Ok(())
}
