//! Auth gateway: login, logout, current user.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use super::http::ApiClient;
use super::types::{AuthResult, LoginRequest, User};
use crate::error::ClientError;

#[derive(Clone)]
pub struct AuthApi {
    client: ApiClient,
}

impl AuthApi {
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Exchange credentials for a bearer token via `POST /auth/login`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Auth`] for rejected credentials (400, 401, 403)
    /// and transport errors otherwise.
    pub async fn login(&self, username: &str, password: &str) -> Result<AuthResult, ClientError> {
        let body = LoginRequest { username, password };
        self.client
            .post_json("/auth/login", &body)
            .await
            .map_err(|e| match e {
                ClientError::Server { status: 400, body } => ClientError::Auth { status: 400, body },
                other => other,
            })
    }

    /// Notify the backend via `POST /auth/logout`. Callers treat this as best-effort.
    ///
    /// # Errors
    ///
    /// Any transport or status error.
    pub async fn logout(&self) -> Result<(), ClientError> {
        self.client.post_empty("/auth/logout").await
    }

    /// Fetch the user behind the stored token via `GET /auth/me`.
    ///
    /// This is the only way a stored token is validated.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Auth`] if the token is missing or rejected.
    pub async fn current_user(&self) -> Result<User, ClientError> {
        self.client.get_json("/auth/me").await
    }
}
