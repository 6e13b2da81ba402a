use std::sync::Arc;

use reqwest::Client;
use tracing::debug;
use url::Url;

use super::credentials::{CredentialManager, TokenSource};
use super::types::GraphErrorBody;
use crate::config::GraphConfig;
use crate::error::{Error, ErrorCode, Result};

/// Client for the Microsoft Graph messaging resources
pub struct GraphClient {
    /// HTTP client for message page requests
    pub(crate) http_client: Client,
    /// Base URL of the Graph API, including the version segment
    base_url: Url,
    /// Bearer token source shared with every request
    tokens: Arc<dyn TokenSource>,
    pub(crate) page_size: u32,
    pub(crate) max_pages: u32,
}

impl GraphClient {
    /// Create a client with its own credential manager
    ///
    /// # Arguments
    /// * `config` - Tenant, application and endpoint configuration
    ///
    /// # Returns
    /// A Result containing the GraphClient or an Error
    pub fn new(config: &GraphConfig) -> Result<Self> {
        let manager = CredentialManager::new(config)?;
        Self::with_token_source(config, Arc::new(manager))
    }

    /// Create a client around an existing token source
    ///
    /// Lets one process-wide `CredentialManager` back several clients,
    /// and lets tests substitute a fixed token.
    pub fn with_token_source(config: &GraphConfig, tokens: Arc<dyn TokenSource>) -> Result<Self> {
        let base_url = Url::parse(&config.graph_base_url)
            .map_err(|e| Error::invalid_argument(format!("Invalid Graph base URL: {e}")))?;

        let http_client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| Error::internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(GraphClient {
            http_client,
            base_url,
            tokens,
            page_size: config.page_size,
            max_pages: config.max_pages,
        })
    }

    /// Build the full API URL for a given resource path
    pub(crate) fn api_url(&self, path: &str) -> String {
        let path = path.trim_start_matches('/');
        let base = self.base_url.as_str().trim_end_matches('/');
        format!("{base}/{path}")
    }

    /// Make an authenticated GET request against an absolute URL
    ///
    /// The URL is either a freshly built resource URL or a continuation
    /// link returned by Graph, which is followed verbatim.
    pub(crate) async fn get(&self, url: &str) -> Result<reqwest::Response> {
        let token = self.tokens.bearer_token().await?;

        debug!(%url, "requesting Graph resource");
        self.http_client
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(map_transport_error)
    }

    /// Check the response status and extract the JSON body
    ///
    /// Non-success statuses are translated into the library's error
    /// kinds; the Graph error envelope and `request-id` header are
    /// preserved on the error for diagnostics.
    pub(crate) async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();
        let request_id = response
            .headers()
            .get("request-id")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        if status.is_success() {
            return response.json::<T>().await.map_err(|e| {
                let error =
                    Error::new(ErrorCode::Upstream, format!("Failed to parse response: {e}"));
                match request_id {
                    Some(id) => error.with_request_id(id),
                    None => error,
                }
            });
        }

        let code = match status.as_u16() {
            401 => ErrorCode::AuthenticationFailed,
            403 => ErrorCode::PermissionDenied,
            404 => ErrorCode::NotFound,
            _ => ErrorCode::Upstream,
        };

        let body = response.text().await.unwrap_or_default();
        let detail: GraphErrorBody = serde_json::from_str(&body).unwrap_or_default();
        let message = if detail.error.code.is_empty() && detail.error.message.is_empty() {
            format!("Graph request failed with status {status}: {body}")
        } else {
            format!(
                "Graph request failed with status {status}: {}: {}",
                detail.error.code, detail.error.message
            )
        };

        let mut error = Error::new(code, message).with_http_status(status.as_u16());
        if !detail.error.code.is_empty() {
            error = error.with_graph_error_code(detail.error.code);
        }
        if let Some(id) = request_id {
            error = error.with_request_id(id);
        }

        Err(error)
    }
}

fn map_transport_error(e: reqwest::Error) -> Error {
    if e.is_timeout() || e.is_connect() {
        Error::new(
            ErrorCode::Timeout,
            format!("Graph request timed out or could not connect: {e}"),
        )
    } else {
        Error::new(ErrorCode::Upstream, format!("Graph request failed: {e}"))
    }
}
