//! Session manager: who is logged in, and the transitions between states.
//!
//! STATE MACHINE
//! =============
//! `Uninitialized -> Loading -> {Authenticated(user) | Anonymous}` on init,
//! `Anonymous -> Authenticated(user)` on login,
//! `Authenticated(user) -> Anonymous` on logout.
//!
//! A 401 on any request also drops `Authenticated(user) -> Anonymous`
//! through `SessionReset`, the response middleware sharing the phase cell.
//!
//! Init is the only path that treats an invalid stored token like a missing
//! one. Login and logout are refused while init has not settled; callers
//! (UI, CLI) gate on `Session::loading`. Login is also refused while a user
//! is logged in. Subscribers see every transition through a `watch` channel.
//!
//! ORDERING
//! ========
//! Login is strictly login -> persist token -> fetch user. If any step
//! fails, the token state observed before the login call is restored so a
//! failed login leaves storage and session unchanged.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::ClientError;
use crate::nav::{Navigator, Route};
use crate::net::AuthApi;
use crate::net::http::{ApiRequest, ApiResponse};
use crate::net::middleware::ResponseMiddleware;
use crate::net::types::User;
use crate::storage::TokenStore;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    Uninitialized,
    Loading,
    Authenticated(User),
    Anonymous,
}

impl SessionPhase {
    #[must_use]
    pub fn user(&self) -> Option<&User> {
        match self {
            Self::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    /// `true` until init has settled.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Uninitialized | Self::Loading)
    }

    #[must_use]
    pub fn session(&self) -> Session {
        let user = self.user().cloned();
        Session { is_authenticated: user.is_some(), user, loading: self.is_loading() }
    }
}

/// Flat view of the session, as read by presentation code.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub user: Option<User>,
    pub loading: bool,
    pub is_authenticated: bool,
}

// =============================================================================
// 401 RESET
// =============================================================================

/// Response middleware owning the session phase cell. On 401 it drops a live
/// session to `Anonymous`; other phases are left to their own transitions.
pub struct SessionReset {
    phase: Arc<watch::Sender<SessionPhase>>,
}

impl SessionReset {
    #[must_use]
    pub fn new() -> Self {
        let (phase, _) = watch::channel(SessionPhase::Uninitialized);
        Self { phase: Arc::new(phase) }
    }
}

impl Default for SessionReset {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseMiddleware for SessionReset {
    fn on_response(&self, request: &ApiRequest, response: &ApiResponse) {
        if response.status != 401 {
            return;
        }
        let reset = self.phase.send_if_modified(|phase| {
            if matches!(phase, SessionPhase::Authenticated(_)) {
                *phase = SessionPhase::Anonymous;
                true
            } else {
                false
            }
        });
        if reset {
            info!(path = %request.path, "session ended by unauthorized response");
        }
    }
}

// =============================================================================
// MANAGER
// =============================================================================

pub struct SessionManager {
    auth: AuthApi,
    tokens: TokenStore,
    navigator: Arc<dyn Navigator>,
    phase: Arc<watch::Sender<SessionPhase>>,
    initialized: AtomicBool,
}

impl SessionManager {
    /// Manager sharing its phase cell with `reset`, which must be installed
    /// as response middleware on the client behind `auth`.
    #[must_use]
    pub fn new(auth: AuthApi, tokens: TokenStore, navigator: Arc<dyn Navigator>, reset: &SessionReset) -> Self {
        Self { auth, tokens, navigator, phase: Arc::clone(&reset.phase), initialized: AtomicBool::new(false) }
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase.borrow().clone()
    }

    #[must_use]
    pub fn session(&self) -> Session {
        self.phase.borrow().session()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionPhase> {
        self.phase.subscribe()
    }

    fn set_phase(&self, phase: SessionPhase) {
        debug!(?phase, "session phase");
        self.phase.send_replace(phase);
    }

    fn ensure_ready(&self) -> Result<(), ClientError> {
        if self.phase.borrow().is_loading() { Err(ClientError::SessionNotReady) } else { Ok(()) }
    }

    fn ensure_anonymous(&self) -> Result<(), ClientError> {
        self.ensure_ready()?;
        if self.phase.borrow().user().is_some() { Err(ClientError::AlreadyAuthenticated) } else { Ok(()) }
    }

    fn rollback_token(&self, previous: Option<&str>) {
        if self.tokens.get().as_deref() != previous {
            self.tokens.restore(previous);
        }
    }

    /// Restore the session from the stored token. Runs once; later calls
    /// return the current phase without side effects.
    pub async fn init(&self) -> SessionPhase {
        if self.initialized.swap(true, Ordering::SeqCst) {
            return self.phase();
        }
        self.set_phase(SessionPhase::Loading);

        if !self.tokens.has_token() {
            info!("no stored token; anonymous session");
            self.set_phase(SessionPhase::Anonymous);
            return self.phase();
        }

        match self.auth.current_user().await {
            Ok(user) => {
                info!(username = %user.username, "session restored from stored token");
                self.set_phase(SessionPhase::Authenticated(user));
            }
            Err(e) => {
                warn!(error = %e, "stored token rejected; clearing");
                self.tokens.clear();
                self.set_phase(SessionPhase::Anonymous);
            }
        }
        self.phase()
    }

    /// Log in and load the full user record.
    ///
    /// # Errors
    ///
    /// [`ClientError::SessionNotReady`] before init settles,
    /// [`ClientError::AlreadyAuthenticated`] while a user is logged in;
    /// otherwise the gateway error, with token and phase left as they were.
    pub async fn login(&self, username: &str, password: &str) -> Result<User, ClientError> {
        self.ensure_anonymous()?;
        let previous = self.tokens.get();

        let auth = match self.auth.login(username, password).await {
            Ok(auth) => auth,
            Err(e) => {
                self.rollback_token(previous.as_deref());
                return Err(e);
            }
        };
        self.tokens.set(&auth.access_token)?;

        let user = match self.auth.current_user().await {
            Ok(user) => user,
            Err(e) => {
                warn!(error = %e, "user fetch after login failed; restoring previous token");
                self.rollback_token(previous.as_deref());
                return Err(e);
            }
        };

        info!(username = %user.username, role = %user.role, "logged in");
        self.set_phase(SessionPhase::Authenticated(user.clone()));
        self.navigator.navigate(Route::Messages);
        Ok(user)
    }

    /// Log out. The backend call is best-effort; local cleanup always happens.
    ///
    /// # Errors
    ///
    /// [`ClientError::SessionNotReady`] before init settles.
    pub async fn logout(&self) -> Result<(), ClientError> {
        self.ensure_ready()?;

        if let Err(e) = self.auth.logout().await {
            debug!(error = %e, "backend logout failed; continuing local logout");
        }
        self.tokens.clear();
        self.set_phase(SessionPhase::Anonymous);
        self.navigator.navigate(Route::Login);
        info!("logged out");
        Ok(())
    }
}
