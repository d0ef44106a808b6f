//! CLI error types and exit codes

use gristmill_client::GristClientError;
use gristmill_recon::ReconError;
use thiserror::Error;

/// Exit codes for the CLI
/// - 0: Success
/// - 1: General error (including partial correction failures)
/// - 2: Authentication / permission error
/// - 3: Network error
/// - 4: Validation error
/// - 5: Server error
pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error(transparent)]
    Client(#[from] GristClientError),

    #[error(transparent)]
    Recon(#[from] ReconError),

    #[error("{failed} correction(s) failed; the rest were applied")]
    PartialCorrection { failed: usize },

    #[error("I/O error: {0}")]
    Io(String),
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config(_) | CliError::Io(_) | CliError::PartialCorrection { .. } => 1,
            CliError::Validation(_) => 4,
            CliError::Client(e) => client_exit_code(e),
            CliError::Recon(ReconError::SnapshotUnavailable { .. })
            | CliError::Recon(ReconError::Resolution { .. }) => 5,
        }
    }

    /// Print the error to stderr with appropriate formatting
    pub fn print(&self) {
        let use_color = std::env::var("NO_COLOR").is_err();

        if use_color {
            eprintln!("\x1b[31mError:\x1b[0m {}", self);
        } else {
            eprintln!("Error: {}", self);
        }

        if let Some(suggestion) = self.suggestion() {
            if use_color {
                eprintln!("\n\x1b[33mSuggestion:\x1b[0m {}", suggestion);
            } else {
                eprintln!("\nSuggestion: {}", suggestion);
            }
        }
    }

    /// Get a suggested action for this error
    fn suggestion(&self) -> Option<&'static str> {
        match self {
            CliError::Client(GristClientError::AuthFailed(_)) => {
                Some("Check that GRIST_API_KEY holds a valid API key.")
            }
            CliError::Client(GristClientError::NotFound(_)) => {
                Some("Check the document id and table name.")
            }
            CliError::Client(GristClientError::RateLimited { .. }) => {
                Some("Wait a moment and run the command again.")
            }
            CliError::Config(_) => {
                Some("Set GRIST_API_KEY (and optionally GRIST_BASE_URL) in the environment or a .env file.")
            }
            _ => None,
        }
    }
}

fn client_exit_code(e: &GristClientError) -> i32 {
    match e {
        GristClientError::AuthFailed(_) | GristClientError::PermissionDenied(_) => 2,
        GristClientError::Http(_) => 3,
        GristClientError::InvalidConfig(_)
        | GristClientError::NotFound(_)
        | GristClientError::Parse(_) => 4,
        GristClientError::RateLimited { .. } => 5,
        GristClientError::Api { status, .. } => {
            if *status >= 500 {
                5
            } else {
                4
            }
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Io(format!("JSON error: {}", e))
    }
}
