//! Microsoft Teams message retrieval over Microsoft Graph
//!
//! The library exposes two cooperating pieces: a [`CredentialManager`]
//! that caches and renews the app-only bearer credential, and a
//! [`GraphClient`] that fetches channel or chat messages, following
//! continuation links until the result set is exhausted and applying an
//! optional creation-time cutoff.
//!
//! A routing layer drives it like this:
//!
//! ```no_run
//! use teamsgraph::{GraphClient, GraphConfig, MessageSource};
//!
//! # async fn example() -> teamsgraph::Result<()> {
//! let config = GraphConfig::from_env()?;
//! let client = GraphClient::new(&config)?;
//!
//! let source = MessageSource::from_parts(Some("team-id"), Some("channel-id"), None)?;
//! let since = Some(teamsgraph::parse_timestamp("2024-01-01T00:00:00Z")?);
//! let result = client.fetch_messages(&source, since).await?;
//! println!("{} messages", result.count);
//! # Ok(())
//! # }
//! ```

// Core modules
pub mod config;
pub mod error;
pub mod graph;
pub mod types;

// Re-exports for convenience
pub use config::GraphConfig;
pub use error::{Error, ErrorCode, Result};
pub use graph::{Credential, CredentialManager, GraphClient, TokenSource};
pub use types::{
    parse_timestamp, ChatMessage, FetchResult, MessageBody, MessageFrom, MessageSender,
    MessageSource,
};
