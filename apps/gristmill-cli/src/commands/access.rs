//! Quick grant/revoke actions for a single email

use crate::config::Settings;
use crate::error::{CliError, CliResult};
use crate::output::print_success;
use clap::Args;
use gristmill_core::{DocId, Email, Role};

/// Arguments for the grant command
#[derive(Args, Debug)]
pub struct GrantArgs {
    /// Document id
    pub doc: String,

    /// Email address to grant access to
    pub email: String,

    /// Role to grant: viewers, editors or owners
    #[arg(long, default_value = "viewers")]
    pub role: String,
}

/// Arguments for the revoke command
#[derive(Args, Debug)]
pub struct RevokeArgs {
    /// Document id
    pub doc: String,

    /// Email address to remove the explicit grant from
    pub email: String,
}

/// Grant an explicit role on a document
pub async fn execute_grant(args: GrantArgs) -> CliResult<()> {
    let role: Role = args
        .role
        .parse()
        .map_err(|e: gristmill_core::ParseRoleError| CliError::Validation(e.to_string()))?;
    let email = normalize_email(&args.email)?;

    let settings = Settings::from_env()?;
    let client = settings.client()?;
    let doc = DocId::new(args.doc.as_str());

    client.set_access(&doc, email.as_str(), Some(role)).await?;
    print_success(&format!("Granted {role} to {email} on {doc}"));
    Ok(())
}

/// Remove an explicit grant from a document
pub async fn execute_revoke(args: RevokeArgs) -> CliResult<()> {
    let email = normalize_email(&args.email)?;

    let settings = Settings::from_env()?;
    let client = settings.client()?;
    let doc = DocId::new(args.doc.as_str());

    client.set_access(&doc, email.as_str(), None).await?;
    print_success(&format!("Revoked explicit access for {email} on {doc}"));
    Ok(())
}

fn normalize_email(raw: &str) -> CliResult<Email> {
    Email::normalize(raw)
        .ok_or_else(|| CliError::Validation("email address must not be empty".to_string()))
}
