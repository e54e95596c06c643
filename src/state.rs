//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` wires the component graph once: token store and navigator
//! feed the middleware, the middleware-equipped `ApiClient` feeds both
//! gateways, and the gateways feed the session manager and message feed.
//! The session's phase cell is shared with the `SessionReset` middleware so
//! a 401 anywhere ends the session.
//! Clone is cheap; every field is Arc-wrapped or Clone.

#[cfg(test)]
#[path = "state_test.rs"]
mod state_test;

use std::sync::Arc;

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::nav::{MemoryNavigator, Navigator, Route};
use crate::net::middleware::{BearerAuth, UnauthorizedRedirect};
use crate::net::{ApiClient, AuthApi, MessageApi, ReqwestTransport, Transport};
use crate::services::feed::MessageFeed;
use crate::services::health::StatusPoller;
use crate::services::session::{SessionManager, SessionReset};
use crate::storage::{FileStore, KeyValueStore, TokenStore};

#[derive(Clone)]
pub struct AppState {
    pub config: ClientConfig,
    pub tokens: TokenStore,
    pub navigator: Arc<dyn Navigator>,
    pub auth: AuthApi,
    pub messages: MessageApi,
    pub session: Arc<SessionManager>,
    pub feed: Arc<MessageFeed>,
}

impl AppState {
    #[must_use]
    pub fn new(
        config: ClientConfig,
        store: Arc<dyn KeyValueStore>,
        navigator: Arc<dyn Navigator>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        let tokens = TokenStore::new(store);
        let reset = Arc::new(SessionReset::new());
        let client = ApiClient::new(&config.base_url, transport)
            .with_request_middleware(Arc::new(BearerAuth::new(tokens.clone())))
            .with_response_middleware(Arc::new(UnauthorizedRedirect::new(tokens.clone(), navigator.clone())))
            .with_response_middleware(reset.clone());

        let auth = AuthApi::new(client.clone());
        let messages = MessageApi::new(client);
        let session = Arc::new(SessionManager::new(auth.clone(), tokens.clone(), navigator.clone(), &reset));
        let feed = Arc::new(MessageFeed::new(messages.clone()));

        Self { config, tokens, navigator, auth, messages, session, feed }
    }

    /// Production wiring: reqwest transport, file-backed token store.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::HttpClientBuild`] if the HTTP client cannot be built.
    pub fn from_config(config: ClientConfig) -> Result<Self, ClientError> {
        let transport = Arc::new(ReqwestTransport::new(config.timeouts)?);
        let store = Arc::new(FileStore::new(config.token_file.clone()));
        let navigator = Arc::new(MemoryNavigator::new(Route::Messages));
        Ok(Self::new(config, store, navigator, transport))
    }

    /// A poller on the message gateway that reloads the feed whenever the
    /// server comes (back) online.
    #[must_use]
    pub fn status_poller(&self) -> Arc<StatusPoller> {
        let poller = StatusPoller::new(Arc::new(self.messages.clone()), self.config.poll_interval)
            .with_observer(self.feed.clone());
        Arc::new(poller)
    }
}
