//! Configuration for the Microsoft Graph adapter

use std::env;
use std::time::Duration;

use crate::error::{Error, Result};

/// Default Microsoft Graph API base URL
pub const DEFAULT_GRAPH_BASE_URL: &str = "https://graph.microsoft.com/v1.0";
/// Default Microsoft identity platform authority
pub const DEFAULT_AUTHORITY_BASE_URL: &str = "https://login.microsoftonline.com";
/// Default scope for app-only Graph access
pub const DEFAULT_SCOPE: &str = "https://graph.microsoft.com/.default";

const DEFAULT_TOKEN_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_PAGE_SIZE: u32 = 50;
const DEFAULT_MAX_PAGES: u32 = 500;

/// Configuration for connecting to Microsoft Graph with app-only credentials
#[derive(Debug, Clone)]
pub struct GraphConfig {
    /// Azure AD tenant (directory) ID
    pub tenant_id: String,
    /// Azure AD application (client) ID
    pub client_id: String,
    /// Azure AD client secret
    pub client_secret: String,
    /// Base URL of the identity platform, without the tenant segment
    pub authority_base_url: String,
    /// Base URL of the Graph API, including the version segment
    pub graph_base_url: String,
    /// OAuth scope requested during the client-credentials exchange
    pub scope: String,
    /// Timeout for the token exchange
    pub token_timeout: Duration,
    /// Timeout for each message page request
    pub request_timeout: Duration,
    /// Page size hint (`$top`) sent with the initial request
    pub page_size: u32,
    /// Upper bound on pages followed per fetch before giving up
    pub max_pages: u32,
}

impl GraphConfig {
    /// Create a configuration with default endpoints and timeouts
    pub fn new(
        tenant_id: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        GraphConfig {
            tenant_id: tenant_id.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            authority_base_url: DEFAULT_AUTHORITY_BASE_URL.to_string(),
            graph_base_url: DEFAULT_GRAPH_BASE_URL.to_string(),
            scope: DEFAULT_SCOPE.to_string(),
            token_timeout: DEFAULT_TOKEN_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            page_size: DEFAULT_PAGE_SIZE,
            max_pages: DEFAULT_MAX_PAGES,
        }
    }

    /// Load the configuration from environment variables
    ///
    /// `TENANT_ID`, `CLIENT_ID` and `CLIENT_SECRET` are required.
    /// `GRAPH_API_BASE_URL`, `AUTHORITY_BASE_URL` and `GRAPH_SCOPE`
    /// override the defaults when present.
    pub fn from_env() -> Result<Self> {
        let tenant_id = require_env("TENANT_ID")?;
        let client_id = require_env("CLIENT_ID")?;
        let client_secret = require_env("CLIENT_SECRET")?;

        let mut config = GraphConfig::new(tenant_id, client_id, client_secret);
        if let Ok(base) = env::var("GRAPH_API_BASE_URL") {
            config.graph_base_url = base;
        }
        if let Ok(authority) = env::var("AUTHORITY_BASE_URL") {
            config.authority_base_url = authority;
        }
        if let Ok(scope) = env::var("GRAPH_SCOPE") {
            config.scope = scope;
        }

        Ok(config)
    }

    /// Override the Graph API base URL
    pub fn with_graph_base_url(mut self, url: impl Into<String>) -> Self {
        self.graph_base_url = url.into();
        self
    }

    /// Override the identity platform base URL
    pub fn with_authority_base_url(mut self, url: impl Into<String>) -> Self {
        self.authority_base_url = url.into();
        self
    }

    /// Override the OAuth scope
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    /// Override the token exchange timeout
    pub fn with_token_timeout(mut self, timeout: Duration) -> Self {
        self.token_timeout = timeout;
        self
    }

    /// Override the per-page request timeout
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Override the page size hint
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Override the pagination cap
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Full token endpoint URL for this tenant
    pub fn token_url(&self) -> String {
        let base = self.authority_base_url.trim_end_matches('/');
        format!("{}/{}/oauth2/v2.0/token", base, self.tenant_id)
    }
}

fn require_env(name: &str) -> Result<String> {
    env::var(name)
        .map_err(|_| Error::invalid_argument(format!("Missing environment variable: {name}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GraphConfig::new("tenant-1", "client-1", "secret-1");
        assert_eq!(config.graph_base_url, DEFAULT_GRAPH_BASE_URL);
        assert_eq!(config.authority_base_url, DEFAULT_AUTHORITY_BASE_URL);
        assert_eq!(config.scope, DEFAULT_SCOPE);
        assert_eq!(config.page_size, 50);
        assert_eq!(config.max_pages, 500);
    }

    #[test]
    fn test_token_url() {
        let config = GraphConfig::new("tenant-1", "client-1", "secret-1");
        assert_eq!(
            config.token_url(),
            "https://login.microsoftonline.com/tenant-1/oauth2/v2.0/token"
        );

        let config = config.with_authority_base_url("http://127.0.0.1:9999/");
        assert_eq!(
            config.token_url(),
            "http://127.0.0.1:9999/tenant-1/oauth2/v2.0/token"
        );
    }

    #[test]
    fn test_builders() {
        let config = GraphConfig::new("tenant-1", "client-1", "secret-1")
            .with_graph_base_url("http://localhost:8080/v1.0")
            .with_scope("api://custom/.default")
            .with_page_size(10)
            .with_max_pages(3)
            .with_token_timeout(Duration::from_secs(2))
            .with_request_timeout(Duration::from_secs(5));

        assert_eq!(config.graph_base_url, "http://localhost:8080/v1.0");
        assert_eq!(config.scope, "api://custom/.default");
        assert_eq!(config.page_size, 10);
        assert_eq!(config.max_pages, 3);
        assert_eq!(config.token_timeout, Duration::from_secs(2));
        assert_eq!(config.request_timeout, Duration::from_secs(5));
    }
}
