//! Message retrieval with cursor-linked pagination

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use tracing::debug;

use super::client::GraphClient;
use super::types::MessagePage;
use crate::error::{Error, ErrorCode, Result};
use crate::types::{ChatMessage, FetchResult, MessageSource};

impl GraphClient {
    /// Fetch all messages of a channel or chat
    ///
    /// Walks the continuation links until the last page, concatenates
    /// the pages in arrival order, and, when `since` is given, keeps
    /// only messages created strictly after it. An error on any page
    /// fails the whole call; no partial result is returned.
    ///
    /// # Arguments
    /// * `source` - The channel or chat whose messages to fetch
    /// * `since` - Optional creation-time cutoff (exclusive)
    ///
    /// # Returns
    /// A Result containing the aggregated FetchResult or an Error
    pub async fn fetch_messages(
        &self,
        source: &MessageSource,
        since: Option<DateTime<Utc>>,
    ) -> Result<FetchResult> {
        let first_url = format!(
            "{}?$top={}",
            self.api_url(&source.messages_path()),
            self.page_size
        );
        let mut messages = self.collect_pages(&first_url).await?;

        // Filtering happens once, after full aggregation, so the count
        // reflects the filtered set.
        if let Some(since) = since {
            messages.retain(|m| m.created_date_time > since);
        }

        debug!(count = messages.len(), "aggregated messages");
        Ok(FetchResult::new(messages))
    }

    /// Fetch all replies to a channel message
    ///
    /// # Arguments
    /// * `team_id` - The team the channel belongs to
    /// * `channel_id` - The channel containing the message
    /// * `message_id` - The root message whose replies to fetch
    ///
    /// # Returns
    /// A Result containing the aggregated FetchResult or an Error
    pub async fn fetch_message_replies(
        &self,
        team_id: &str,
        channel_id: &str,
        message_id: &str,
    ) -> Result<FetchResult> {
        if team_id.trim().is_empty() || channel_id.trim().is_empty() || message_id.trim().is_empty()
        {
            return Err(Error::invalid_argument(
                "team_id, channel_id and message_id are all required for replies",
            ));
        }

        let path = format!("/teams/{team_id}/channels/{channel_id}/messages/{message_id}/replies");
        let first_url = format!("{}?$top={}", self.api_url(&path), self.page_size);
        Ok(FetchResult::new(self.collect_pages(&first_url).await?))
    }

    /// Follow continuation links starting at `first_url` and concatenate
    /// every page's items
    ///
    /// Continuation links are followed verbatim. Two defenses against a
    /// misbehaving server: a link that was already followed fails the
    /// call, and so does exceeding the configured page cap.
    async fn collect_pages(&self, first_url: &str) -> Result<Vec<ChatMessage>> {
        let mut url = first_url.to_string();
        let mut followed = HashSet::new();
        let mut messages = Vec::new();
        let mut pages: u32 = 0;

        loop {
            if pages >= self.max_pages {
                return Err(Error::internal(format!(
                    "Pagination exceeded {} pages",
                    self.max_pages
                )));
            }
            if !followed.insert(url.clone()) {
                return Err(Error::new(
                    ErrorCode::Upstream,
                    format!("Continuation link already followed: {url}"),
                ));
            }

            let response = self.get(&url).await?;
            let page: MessagePage = self.handle_response(response).await?;
            pages += 1;
            debug!(page = pages, items = page.value.len(), "received message page");
            messages.extend(page.value);

            match page.next_link {
                Some(next) => url = next,
                None => break,
            }
        }

        Ok(messages)
    }
}
