//! Wire DTOs for the REST boundary.
//!
//! DESIGN
//! ======
//! Field names follow the backend's camelCase JSON. Entities are immutable
//! snapshots: the client never edits a `User` or `Message` locally, it only
//! replaces them with fresh copies from the server.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::{Deserialize, Serialize};

/// The authenticated account, as returned by `GET /auth/me`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub username: String,
    pub role: String,
    /// Server-local creation time, passed through unparsed.
    pub created_at: String,
}

/// Credentials for `POST /auth/login`.
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Successful login payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResult {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    /// Token lifetime as reported by the server (milliseconds).
    pub expires_in: u64,
    pub username: String,
    pub role: String,
}

fn default_token_type() -> String {
    "Bearer".to_owned()
}

/// Public projection of a message author.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: i64,
    pub username: String,
    pub role: String,
}

/// A stored message. `id` and `timestamp` are assigned by the server.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub content: String,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<Author>,
}

/// Body for `POST /messages`.
#[derive(Debug, Serialize)]
pub struct MessageRequest<'a> {
    pub content: &'a str,
}
