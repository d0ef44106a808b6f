//! gristmill CLI - Access reconciliation for Grist documents
//!
//! This CLI enables administrators to:
//! - List organizations visible to an API key
//! - Map who can see which document across an organization
//! - Reconcile a document's share list against a reference table
//! - Apply corrective grants and revokes

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod error;
mod output;

use error::CliResult;

/// gristmill - document access reconciliation
#[derive(Parser)]
#[command(name = "gristmill")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List organizations visible to the API key
    Orgs(commands::orgs::OrgsArgs),

    /// List users with organization-level access
    Users(commands::users::UsersArgs),

    /// Show the org-wide document/user access table
    Map(commands::map::MapArgs),

    /// Reconcile a document's access against its reference table
    Reconcile(commands::reconcile::ReconcileArgs),

    /// Grant an explicit role to one email on a document
    Grant(commands::access::GrantArgs),

    /// Remove one email's explicit grant from a document
    Revoke(commands::access::RevokeArgs),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            e.print();
            std::process::exit(e.exit_code());
        }
    }
}

async fn run(cli: Cli) -> CliResult<()> {
    match cli.command {
        Commands::Orgs(args) => commands::orgs::execute(args).await,
        Commands::Users(args) => commands::users::execute(args).await,
        Commands::Map(args) => commands::map::execute(args).await,
        Commands::Reconcile(args) => commands::reconcile::execute(args).await,
        Commands::Grant(args) => commands::access::execute_grant(args).await,
        Commands::Revoke(args) => commands::access::execute_revoke(args).await,
    }
}
