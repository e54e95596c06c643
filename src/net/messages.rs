//! Message gateway: create, list, fetch by id, health.
//!
//! Content is validated before dispatch: empty, whitespace-only, and
//! over-length messages never reach the transport.

#[cfg(test)]
#[path = "messages_test.rs"]
mod messages_test;

use super::http::ApiClient;
use super::types::{Message, MessageRequest};
use crate::error::{ClientError, ValidationError};

/// Backend column limit for message content, in characters.
pub const MAX_MESSAGE_LEN: usize = 1000;

/// Trim `raw` and check it is sendable.
///
/// # Errors
///
/// Returns [`ValidationError::Empty`] or [`ValidationError::TooLong`].
pub fn validate_content(raw: &str) -> Result<&str, ValidationError> {
    let content = raw.trim();
    if content.is_empty() {
        return Err(ValidationError::Empty);
    }
    let len = content.chars().count();
    if len > MAX_MESSAGE_LEN {
        return Err(ValidationError::TooLong { len, max: MAX_MESSAGE_LEN });
    }
    Ok(content)
}

#[derive(Clone)]
pub struct MessageApi {
    client: ApiClient,
}

impl MessageApi {
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Create a message via `POST /messages`. The trimmed content is sent.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Validation`] without any request when the
    /// content fails [`validate_content`].
    pub async fn create(&self, content: &str) -> Result<Message, ClientError> {
        let content = validate_content(content)?;
        self.client.post_json("/messages", &MessageRequest { content }).await
    }

    /// List every message via `GET /messages`, in server order.
    ///
    /// # Errors
    ///
    /// Any transport, status, or decode error.
    pub async fn list(&self) -> Result<Vec<Message>, ClientError> {
        self.client.get_json("/messages").await
    }

    /// Fetch one message via `GET /messages/{id}`.
    ///
    /// # Errors
    ///
    /// [`ClientError::Server`] with status 404 when the id is unknown.
    pub async fn get(&self, id: i64) -> Result<Message, ClientError> {
        self.client.get_json(&format!("/messages/{id}")).await
    }

    /// Probe `GET /health`. Only success matters; the text is returned as-is.
    ///
    /// # Errors
    ///
    /// Any transport or status error.
    pub async fn health(&self) -> Result<String, ClientError> {
        self.client.get_text("/health").await
    }
}
