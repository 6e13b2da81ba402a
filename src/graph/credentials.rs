//! App-only credential acquisition and caching
//!
//! One `CredentialManager` is shared per process. It keeps the most
//! recently issued bearer credential and only goes back to the identity
//! platform when the cached one is absent or inside the expiry buffer.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

use super::types::{TokenErrorResponse, TokenResponse};
use crate::config::GraphConfig;
use crate::error::{Error, ErrorCode, Result};

/// Seconds subtracted from the reported expiry before a cached credential is reused
const EXPIRY_BUFFER_SECS: i64 = 300;

/// A bearer credential with its absolute expiry
#[derive(Debug, Clone)]
pub struct Credential {
    /// Opaque bearer token
    pub token: String,
    /// Instant the identity platform reported the token expires at
    pub expires_at: DateTime<Utc>,
}

impl Credential {
    /// Whether this credential can still be presented at `now`
    ///
    /// A credential counts as usable only while `now` is more than the
    /// expiry buffer away from `expires_at`.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at - Duration::seconds(EXPIRY_BUFFER_SECS)
    }
}

/// Source of bearer tokens for Graph requests
///
/// The fetch engine only depends on this trait; `CredentialManager` is
/// the production implementation.
#[async_trait]
pub trait TokenSource: Send + Sync {
    /// Return a bearer token to attach to the next request
    async fn bearer_token(&self) -> Result<String>;
}

/// Caches and renews the app-only Graph credential
///
/// The cached slot is the only shared mutable state in the library.
/// Reads take a read lock only; a refresh serializes on a dedicated
/// mutex so exactly one token exchange is in flight at a time, and the
/// messaging API is never called while that mutex is held.
pub struct CredentialManager {
    /// HTTP client for the identity platform, with its own short timeout
    http_client: Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    scope: String,
    /// Cached credential slot; replaced whole, never mutated in place
    cached: RwLock<Option<Credential>>,
    /// Guards the refresh so concurrent cold callers share one exchange
    refresh: Mutex<()>,
}

impl CredentialManager {
    /// Create a manager for the tenant and application in `config`
    pub fn new(config: &GraphConfig) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(config.token_timeout)
            .build()
            .map_err(|e| Error::internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(CredentialManager {
            http_client,
            token_url: config.token_url(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            scope: config.scope.clone(),
            cached: RwLock::new(None),
            refresh: Mutex::new(()),
        })
    }

    /// Return a usable credential, renewing it if necessary
    ///
    /// The common case is a read-lock inspection of the cached slot with
    /// no I/O. Expired or absent credentials trigger a client-credentials
    /// exchange; callers that lose the race to refresh wait for the
    /// winner's result instead of issuing their own exchange.
    ///
    /// # Returns
    /// A Result containing a Credential or an Error; exchange failures
    /// are never cached, so the next caller retries from scratch.
    pub async fn credential(&self) -> Result<Credential> {
        if let Some(credential) = self.cached_valid(Utc::now()).await {
            return Ok(credential);
        }

        let _refresh = self.refresh.lock().await;

        // The refresh that held the mutex before us may have already
        // written a fresh credential.
        if let Some(credential) = self.cached_valid(Utc::now()).await {
            return Ok(credential);
        }

        let credential = self.exchange().await?;
        *self.cached.write().await = Some(credential.clone());
        info!(expires_at = %credential.expires_at, "refreshed Graph credential");

        Ok(credential)
    }

    /// Current cached credential, if any (diagnostics; may be expired)
    pub async fn cached_credential(&self) -> Option<Credential> {
        self.cached.read().await.clone()
    }

    async fn cached_valid(&self, now: DateTime<Utc>) -> Option<Credential> {
        let cached = self.cached.read().await;
        cached.as_ref().filter(|c| c.is_valid_at(now)).cloned()
    }

    /// Perform the client-credentials token exchange
    async fn exchange(&self) -> Result<Credential> {
        let requested_at = Utc::now();
        let params = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("scope", self.scope.as_str()),
            ("grant_type", "client_credentials"),
        ];

        let response = self
            .http_client
            .post(&self.token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| {
                Error::new(
                    ErrorCode::AuthenticationFailed,
                    format!("Token request failed: {e}"),
                )
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail: TokenErrorResponse = serde_json::from_str(&body).unwrap_or_default();
            let message = if detail.error.is_empty() {
                format!("Token exchange failed with status {status}: {body}")
            } else {
                format!(
                    "Token exchange failed with status {status}: {}: {}",
                    detail.error, detail.error_description
                )
            };
            return Err(Error::new(ErrorCode::AuthenticationFailed, message)
                .with_http_status(status.as_u16()));
        }

        let token: TokenResponse = response.json().await.map_err(|e| {
            Error::new(
                ErrorCode::AuthenticationFailed,
                format!("Failed to parse token response: {e}"),
            )
        })?;

        if token.expires_in <= 0 {
            return Err(Error::new(
                ErrorCode::Upstream,
                format!(
                    "Identity platform reported a non-positive token lifetime: {}",
                    token.expires_in
                ),
            ));
        }

        debug!(expires_in = token.expires_in, "token exchange succeeded");

        Ok(Credential {
            token: token.access_token,
            expires_at: requested_at + Duration::seconds(token.expires_in),
        })
    }
}

#[async_trait]
impl TokenSource for CredentialManager {
    async fn bearer_token(&self) -> Result<String> {
        Ok(self.credential().await?.token)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use futures::future::join_all;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn test_config(server: &MockServer) -> GraphConfig {
        GraphConfig::new("tenant-1", "client-1", "secret-1")
            .with_authority_base_url(server.uri())
    }

    fn token_body(token: &str, expires_in: i64) -> serde_json::Value {
        serde_json::json!({
            "token_type": "Bearer",
            "access_token": token,
            "expires_in": expires_in,
        })
    }

    #[test]
    fn test_credential_validity_window() {
        let now = Utc::now();
        let credential = Credential {
            token: "t".to_string(),
            expires_at: now + Duration::seconds(301),
        };
        assert!(credential.is_valid_at(now));

        let credential = Credential {
            token: "t".to_string(),
            expires_at: now + Duration::seconds(300),
        };
        assert!(!credential.is_valid_at(now));

        let credential = Credential {
            token: "t".to_string(),
            expires_at: now + Duration::seconds(120),
        };
        assert!(!credential.is_valid_at(now));
    }

    #[tokio::test]
    async fn test_credential_reused_within_validity() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/tenant-1/oauth2/v2.0/token"))
            .and(body_string_contains("grant_type=client_credentials"))
            .and(body_string_contains("client_id=client-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body("token-1", 3600)))
            .expect(1)
            .mount(&server)
            .await;

        let manager = CredentialManager::new(&test_config(&server)).unwrap();
        let first = manager.credential().await.unwrap();
        let second = manager.credential().await.unwrap();

        assert_eq!(first.token, "token-1");
        assert_eq!(second.token, "token-1");
        assert_eq!(first.expires_at, second.expires_at);
    }

    #[tokio::test]
    async fn test_expired_credential_is_renewed() {
        let server = MockServer::start().await;
        // First exchange: lifetime shorter than the expiry buffer, so the
        // next call has to renew.
        Mock::given(method("POST"))
            .and(path("/tenant-1/oauth2/v2.0/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body("token-1", 60)))
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/tenant-1/oauth2/v2.0/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body("token-2", 3600)))
            .expect(1)
            .mount(&server)
            .await;

        let manager = CredentialManager::new(&test_config(&server)).unwrap();
        let first = manager.credential().await.unwrap();
        assert_eq!(first.token, "token-1");

        let second = manager.credential().await.unwrap();
        assert_eq!(second.token, "token-2");

        let cached = manager.cached_credential().await.unwrap();
        assert_eq!(cached.token, "token-2");
        assert!(cached.expires_at > Utc::now() + Duration::seconds(3000));
    }

    #[tokio::test]
    async fn test_exchange_failure_is_not_cached() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/tenant-1/oauth2/v2.0/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": "invalid_client",
                "error_description": "AADSTS7000215: Invalid client secret provided."
            })))
            .mount(&server)
            .await;

        let manager = CredentialManager::new(&test_config(&server)).unwrap();
        let err = manager.credential().await.unwrap_err();

        assert_eq!(err.code, ErrorCode::AuthenticationFailed);
        assert!(err.message.contains("invalid_client"));
        assert_eq!(err.http_status(), Some(400));
        assert!(manager.cached_credential().await.is_none());
    }

    #[tokio::test]
    async fn test_non_positive_lifetime_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/tenant-1/oauth2/v2.0/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body("token-1", 0)))
            .mount(&server)
            .await;

        let manager = CredentialManager::new(&test_config(&server)).unwrap();
        let err = manager.credential().await.unwrap_err();

        assert_eq!(err.code, ErrorCode::Upstream);
        assert!(manager.cached_credential().await.is_none());
    }

    #[tokio::test]
    async fn test_concurrent_cold_callers_share_one_exchange() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/tenant-1/oauth2/v2.0/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body("token-1", 3600)))
            .expect(1)
            .mount(&server)
            .await;

        let manager = Arc::new(CredentialManager::new(&test_config(&server)).unwrap());
        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let manager = Arc::clone(&manager);
                tokio::spawn(async move { manager.credential().await })
            })
            .collect();

        for result in join_all(tasks).await {
            let credential = result.unwrap().unwrap();
            assert_eq!(credential.token, "token-1");
        }

        let cached = manager.cached_credential().await.unwrap();
        assert_eq!(cached.token, "token-1");
        assert!(cached.is_valid_at(Utc::now()));
    }
}
