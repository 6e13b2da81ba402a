//! Message source selection for fetch requests

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Identifies the conversation whose messages should be fetched
///
/// Exactly one variant applies per request: a channel inside a team, or
/// a standalone chat. `from_parts` builds a source from the raw optional
/// parameters a routing layer receives and rejects every other
/// combination before any network activity happens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageSource {
    /// Messages of a channel within a team
    Channel { team_id: String, channel_id: String },
    /// Messages of a group or one-on-one chat
    Chat { chat_id: String },
}

impl MessageSource {
    /// Create a channel source
    pub fn channel(team_id: impl Into<String>, channel_id: impl Into<String>) -> Self {
        MessageSource::Channel {
            team_id: team_id.into(),
            channel_id: channel_id.into(),
        }
    }

    /// Create a chat source
    pub fn chat(chat_id: impl Into<String>) -> Self {
        MessageSource::Chat {
            chat_id: chat_id.into(),
        }
    }

    /// Build a source from raw request parameters
    ///
    /// Either `chat_id` alone or both `team_id` and `channel_id` must be
    /// present. Blank and whitespace-only values count as absent.
    ///
    /// # Arguments
    /// * `team_id` - Team ID (required for channel messages)
    /// * `channel_id` - Channel ID (required for channel messages)
    /// * `chat_id` - Chat ID (mutually exclusive with the other two)
    ///
    /// # Returns
    /// A Result containing the MessageSource or an InvalidArgument error
    pub fn from_parts(
        team_id: Option<&str>,
        channel_id: Option<&str>,
        chat_id: Option<&str>,
    ) -> Result<Self> {
        let team_id = normalize(team_id);
        let channel_id = normalize(channel_id);
        let chat_id = normalize(chat_id);

        match (team_id, channel_id, chat_id) {
            (None, None, Some(chat)) => Ok(MessageSource::chat(chat)),
            (Some(_), _, Some(_)) | (_, Some(_), Some(_)) => Err(Error::invalid_argument(
                "Cannot specify both chat_id and team_id/channel_id",
            )),
            (Some(team), Some(channel), None) => Ok(MessageSource::channel(team, channel)),
            (Some(_), None, None) | (None, Some(_), None) => Err(Error::invalid_argument(
                "Both team_id and channel_id are required for channel messages",
            )),
            (None, None, None) => Err(Error::invalid_argument(
                "Must provide either chat_id or both team_id and channel_id",
            )),
        }
    }

    /// Relative Graph resource path for this source's messages
    pub(crate) fn messages_path(&self) -> String {
        match self {
            MessageSource::Channel {
                team_id,
                channel_id,
            } => format!("/teams/{team_id}/channels/{channel_id}/messages"),
            MessageSource::Chat { chat_id } => format!("/chats/{chat_id}/messages"),
        }
    }
}

fn normalize(value: Option<&str>) -> Option<&str> {
    match value {
        Some(v) => {
            let trimmed = v.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed)
            }
        }
        None => None,
    }
}
