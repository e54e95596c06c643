//! In-memory message list.
//!
//! The list is replaced wholesale by `reload` and appended to by `send`.
//! There is no identity merge: when a reload and a send race, whichever
//! resolves last decides what subscribers see.

#[cfg(test)]
#[path = "feed_test.rs"]
mod feed_test;

use tokio::sync::watch;
use tracing::{debug, warn};

use super::health::{ServerStatus, StatusObserver};
use crate::error::ClientError;
use crate::net::MessageApi;
use crate::net::types::Message;

pub struct MessageFeed {
    api: MessageApi,
    messages: watch::Sender<Vec<Message>>,
}

impl MessageFeed {
    #[must_use]
    pub fn new(api: MessageApi) -> Self {
        let (messages, _) = watch::channel(Vec::new());
        Self { api, messages }
    }

    #[must_use]
    pub fn messages(&self) -> Vec<Message> {
        self.messages.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Vec<Message>> {
        self.messages.subscribe()
    }

    /// Replace the list with the server's. On failure the list is untouched.
    ///
    /// # Errors
    ///
    /// The gateway error from `list`.
    pub async fn reload(&self) -> Result<usize, ClientError> {
        let messages = self.api.list().await?;
        let count = messages.len();
        self.messages.send_replace(messages);
        debug!(count, "message list reloaded");
        Ok(count)
    }

    /// Validate, create, and append a message.
    ///
    /// # Errors
    ///
    /// [`ClientError::Validation`] before dispatch, or the gateway error.
    pub async fn send(&self, content: &str) -> Result<Message, ClientError> {
        let message = self.api.create(content).await?;
        self.messages.send_modify(|list| list.push(message.clone()));
        debug!(id = message.id, "message appended");
        Ok(message)
    }
}

#[async_trait::async_trait]
impl StatusObserver for MessageFeed {
    async fn on_status_change(&self, _from: ServerStatus, to: ServerStatus) {
        if to != ServerStatus::Online {
            return;
        }
        if let Err(e) = self.reload().await {
            warn!(error = %e, "reload after reconnect failed");
        }
    }
}
