//! Caller-facing types for libteamsgraph
//!
//! These are the types a routing layer touches directly: the message
//! source locator, the message records, and the aggregated fetch result.

pub mod message;
pub mod source;

// Re-export for convenience
pub use message::{parse_timestamp, ChatMessage, FetchResult, MessageBody, MessageFrom, MessageSender};
pub use source::MessageSource;
