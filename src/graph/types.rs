use serde::Deserialize;

use crate::types::ChatMessage;

/// Successful token response from the identity platform
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    /// Token lifetime in seconds
    #[serde(default = "default_expires_in")]
    pub expires_in: i64,
    #[serde(default)]
    pub token_type: String,
}

fn default_expires_in() -> i64 {
    3600
}

/// Error response from the identity platform token endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenErrorResponse {
    #[serde(default)]
    pub error: String,
    #[serde(default)]
    pub error_description: String,
}

/// One page of messages from a Graph messages resource
#[derive(Debug, Clone, Deserialize)]
pub struct MessagePage {
    #[serde(default)]
    pub value: Vec<ChatMessage>,
    /// Continuation link; absent on the last page
    #[serde(default, rename = "@odata.nextLink")]
    pub next_link: Option<String>,
}

/// Graph error envelope, e.g. `{"error": {"code": "NotFound", "message": "..."}}`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GraphErrorBody {
    #[serde(default)]
    pub error: GraphErrorDetail,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GraphErrorDetail {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}
