//! Microsoft Graph adapter
//!
//! This module implements the communication layer for Microsoft Graph:
//! app-only credential management and paginated message retrieval for
//! Teams channels and chats.

mod client;
mod credentials;
mod messages;
mod types;

pub use client::GraphClient;
pub use credentials::{Credential, CredentialManager, TokenSource};
pub use types::{GraphErrorBody, GraphErrorDetail, MessagePage, TokenErrorResponse, TokenResponse};
