//! Environment-based configuration.
//!
//! Settings come from the process environment, with a `.env` file loaded
//! first when present. `GRIST_API_KEY` is required; everything else has
//! a default.

use crate::error::{CliError, CliResult};
use gristmill_client::GristClient;
use std::time::Duration;

/// Default API endpoint (the hosted Grist service).
const DEFAULT_BASE_URL: &str = "https://docs.getgrist.com/api";

/// Default per-request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Resolved CLI settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub base_url: String,
    pub api_key: String,
    pub timeout: Duration,
}

impl Settings {
    /// Load settings from the environment (and `.env`, if present).
    pub fn from_env() -> CliResult<Self> {
        dotenvy::dotenv().ok();

        let api_key = std::env::var("GRIST_API_KEY")
            .map_err(|_| CliError::Config("GRIST_API_KEY is not set".to_string()))?;
        let base_url =
            std::env::var("GRIST_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let timeout = parse_timeout(std::env::var("GRIST_TIMEOUT_SECS").ok())?;

        Ok(Self {
            base_url,
            api_key,
            timeout,
        })
    }

    /// Build a Grist client from these settings.
    pub fn client(&self) -> CliResult<GristClient> {
        Ok(GristClient::new(
            &self.base_url,
            &self.api_key,
            self.timeout,
        )?)
    }
}

fn parse_timeout(raw: Option<String>) -> CliResult<Duration> {
    match raw {
        None => Ok(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
        Some(s) => {
            let secs: u64 = s.parse().map_err(|_| {
                CliError::Config(format!("GRIST_TIMEOUT_SECS must be a positive integer, got {s:?}"))
            })?;
            if secs == 0 {
                return Err(CliError::Config(
                    "GRIST_TIMEOUT_SECS must be greater than zero".to_string(),
                ));
            }
            Ok(Duration::from_secs(secs))
        }
    }
}
