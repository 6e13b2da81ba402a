//! Message types returned by the fetch operations

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// A single Teams message as returned by Microsoft Graph
///
/// Only the fields the library itself needs are typed; everything else
/// in the record is preserved in `extra` and serialized back unchanged,
/// so callers see the message the way Graph sent it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    /// Unique identifier for this message
    pub id: String,
    /// When the message was created
    pub created_date_time: DateTime<Utc>,
    /// Sender of the message (user or application)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<MessageFrom>,
    /// Message content
    #[serde(default)]
    pub body: MessageBody,
    /// Remaining Graph fields, passed through unmodified
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Sender information attached to a message
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageFrom {
    /// Present when a user sent the message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<MessageSender>,
    /// Present when an application (bot) sent the message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application: Option<Value>,
}

/// Identity of a user sender
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageSender {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub display_name: String,
}

/// Message content with its MIME-ish content type ("text" or "html")
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageBody {
    #[serde(default)]
    pub content_type: String,
    #[serde(default)]
    pub content: String,
}

/// Aggregated, filtered output of a fetch operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchResult {
    /// Number of messages after filtering
    pub count: usize,
    /// Messages in page-arrival then within-page order
    pub messages: Vec<ChatMessage>,
}

impl FetchResult {
    /// Build a result from an already-filtered message list
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        FetchResult {
            count: messages.len(),
            messages,
        }
    }
}

/// Parse an ISO 8601 timestamp as supplied by the routing layer
///
/// Accepts both the `Z` designator and explicit offsets; everything is
/// normalized to UTC for comparison against message timestamps.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::invalid_argument(format!("Invalid ISO 8601 timestamp '{value}': {e}")))
}
