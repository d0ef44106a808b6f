//! Grist HTTP client (reqwest-based).

use crate::error::{GristClientError, GristClientResult};
use crate::models::{
    AccessDelta, AccessList, Column, ColumnsResponse, Organization, Record, RecordsResponse,
    Workspace,
};
use gristmill_core::{DocId, Role, TableId};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

/// Header Grist requires on write operations.
const REQUESTED_WITH: (&str, &str) = ("X-Requested-With", "XMLHttpRequest");

/// HTTP client for the Grist REST API.
///
/// Holds the base URL (e.g. `https://docs.getgrist.com/api` or a
/// team-site endpoint) and the API key; every method is a single
/// request/response with no internal retries.
#[derive(Debug, Clone)]
pub struct GristClient {
    base_url: String,
    api_key: String,
    http_client: Client,
}

impl GristClient {
    /// Create a new client.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> GristClientResult<Self> {
        let http_client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("gristmill/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                GristClientError::InvalidConfig(format!("failed to build HTTP client: {e}"))
            })?;

        Ok(Self::with_http_client(base_url, api_key, http_client))
    }

    /// Create a client with a pre-built `reqwest::Client` (for testing).
    #[must_use]
    pub fn with_http_client(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        http_client: Client,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            api_key: api_key.into(),
            http_client,
        }
    }

    /// The normalized base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ── Listing endpoints ─────────────────────────────────────────────

    /// List the organizations visible to the API key.
    pub async fn list_orgs(&self) -> GristClientResult<Vec<Organization>> {
        self.get(&format!("{}/orgs", self.base_url)).await
    }

    /// List a user's access entries at the organization level.
    ///
    /// `org` is either the numeric id or the subdomain.
    pub async fn org_access(&self, org: &str) -> GristClientResult<AccessList> {
        self.get(&format!("{}/orgs/{org}/access", self.base_url))
            .await
    }

    /// List workspaces (with their documents) of an organization.
    pub async fn list_workspaces(&self, org: &str) -> GristClientResult<Vec<Workspace>> {
        self.get(&format!("{}/orgs/{org}/workspaces", self.base_url))
            .await
    }

    /// List all records of a table.
    pub async fn list_records(
        &self,
        doc: &DocId,
        table: &TableId,
    ) -> GristClientResult<Vec<Record>> {
        let url = format!("{}/docs/{doc}/tables/{table}/records", self.base_url);
        let response: RecordsResponse = self.get(&url).await?;
        Ok(response.records)
    }

    /// List the columns of a table with their declared types.
    pub async fn list_columns(
        &self,
        doc: &DocId,
        table: &TableId,
    ) -> GristClientResult<Vec<Column>> {
        let url = format!("{}/docs/{doc}/tables/{table}/columns", self.base_url);
        let response: ColumnsResponse = self.get(&url).await?;
        Ok(response.columns)
    }

    /// Fetch the access list of a document.
    pub async fn doc_access(&self, doc: &DocId) -> GristClientResult<AccessList> {
        self.get(&format!("{}/docs/{doc}/access", self.base_url))
            .await
    }

    // ── Mutation endpoint ─────────────────────────────────────────────

    /// Set or remove a single user's explicit role on a document.
    ///
    /// `None` removes the explicit grant. The endpoint is idempotent:
    /// re-granting an identical role or removing an absent grant
    /// succeeds.
    pub async fn set_access(
        &self,
        doc: &DocId,
        email: &str,
        role: Option<Role>,
    ) -> GristClientResult<()> {
        let url = format!("{}/docs/{doc}/access", self.base_url);
        let payload = AccessDelta::single(email, role);
        self.patch_no_content(&url, &payload).await
    }

    // ── Internal HTTP methods ─────────────────────────────────────────

    async fn get<T: DeserializeOwned>(&self, url: &str) -> GristClientResult<T> {
        debug!("grist GET {}", url);
        let response = self
            .http_client
            .get(url)
            .bearer_auth(&self.api_key)
            .send()
            .await?;
        self.handle_response(response).await
    }

    async fn patch_no_content<B: Serialize>(&self, url: &str, body: &B) -> GristClientResult<()> {
        debug!("grist PATCH {}", url);
        let response = self
            .http_client
            .patch(url)
            .bearer_auth(&self.api_key)
            .header(REQUESTED_WITH.0, REQUESTED_WITH.1)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            self.handle_error_response(response).await
        }
    }

    // ── Response handling ─────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> GristClientResult<T> {
        let status = response.status();

        if status.is_success() {
            let body = response.text().await?;
            serde_json::from_str(&body).map_err(|e| GristClientError::Parse(e.to_string()))
        } else {
            self.handle_error_response(response).await
        }
    }

    async fn handle_error_response<T>(&self, response: reqwest::Response) -> GristClientResult<T> {
        let status = response.status();

        let retry_after = response
            .headers()
            .get("Retry-After")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<no body>".to_string());

        match status {
            StatusCode::UNAUTHORIZED => Err(GristClientError::AuthFailed(body)),
            StatusCode::FORBIDDEN => Err(GristClientError::PermissionDenied(body)),
            StatusCode::NOT_FOUND => Err(GristClientError::NotFound(body)),
            StatusCode::TOO_MANY_REQUESTS => Err(GristClientError::RateLimited {
                retry_after_secs: retry_after,
            }),
            _ => {
                let detail = if body.is_empty() {
                    format!("HTTP {status}")
                } else {
                    body
                };
                Err(GristClientError::Api {
                    status: status.as_u16(),
                    detail,
                })
            }
        }
    }
}
