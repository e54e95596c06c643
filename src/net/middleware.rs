//! Request/response middleware for `ApiClient`.
//!
//! DESIGN
//! ======
//! Each middleware is a plain function of its inputs plus the effects it is
//! explicitly handed: `BearerAuth` reads the token store, and
//! `UnauthorizedRedirect` clears it and drives the navigator. Both apply to
//! every request regardless of which gateway issued it.

#[cfg(test)]
#[path = "middleware_test.rs"]
mod middleware_test;

use std::sync::Arc;

use reqwest::header::{AUTHORIZATION, HeaderValue};
use tracing::warn;

use super::http::{ApiRequest, ApiResponse};
use crate::nav::{Navigator, Route};
use crate::storage::TokenStore;

pub trait RequestMiddleware: Send + Sync {
    fn on_request(&self, request: &mut ApiRequest);
}

pub trait ResponseMiddleware: Send + Sync {
    fn on_response(&self, request: &ApiRequest, response: &ApiResponse);
}

// =============================================================================
// BEARER AUTH
// =============================================================================

/// Attaches `Authorization: Bearer <token>` when a token is stored.
pub struct BearerAuth {
    tokens: TokenStore,
}

impl BearerAuth {
    #[must_use]
    pub fn new(tokens: TokenStore) -> Self {
        Self { tokens }
    }
}

impl RequestMiddleware for BearerAuth {
    fn on_request(&self, request: &mut ApiRequest) {
        let Some(token) = self.tokens.get() else {
            return;
        };
        match HeaderValue::from_str(&format!("Bearer {token}")) {
            Ok(mut value) => {
                value.set_sensitive(true);
                request.headers.insert(AUTHORIZATION, value);
            }
            Err(_) => warn!(path = %request.path, "stored token is not a valid header value; sending unauthenticated"),
        }
    }
}

// =============================================================================
// UNAUTHORIZED REDIRECT
// =============================================================================

/// On 401: clear the stored token and leave for the login view.
pub struct UnauthorizedRedirect {
    tokens: TokenStore,
    navigator: Arc<dyn Navigator>,
}

impl UnauthorizedRedirect {
    #[must_use]
    pub fn new(tokens: TokenStore, navigator: Arc<dyn Navigator>) -> Self {
        Self { tokens, navigator }
    }
}

impl ResponseMiddleware for UnauthorizedRedirect {
    fn on_response(&self, request: &ApiRequest, response: &ApiResponse) {
        if response.status != 401 {
            return;
        }
        self.tokens.clear();
        if self.navigator.navigate(Route::Login) {
            warn!(method = %request.method, path = %request.path, "unauthorized; token cleared, redirected to login");
        }
    }
}
