//! Navigation targets and the navigator seam.
//!
//! SYSTEM CONTEXT
//! ==============
//! The 401 response middleware, logout, and the auth guard all force the
//! user back to the login view. `Navigator::navigate` is a no-op when the
//! current route already matches, so concurrent triggers redirect once.

#[cfg(test)]
#[path = "nav_test.rs"]
mod nav_test;

use std::sync::{Mutex, PoisonError};

use crate::services::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Messages,
}

impl Route {
    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::Login => "/login",
            Self::Messages => "/",
        }
    }
}

pub trait Navigator: Send + Sync {
    fn current(&self) -> Route;

    /// Move to `route`. Returns `false` without side effects when already there.
    fn navigate(&self, route: Route) -> bool;
}

/// In-process navigator that records every route change.
#[derive(Debug)]
pub struct MemoryNavigator {
    inner: Mutex<NavState>,
}

#[derive(Debug)]
struct NavState {
    current: Route,
    history: Vec<Route>,
}

impl MemoryNavigator {
    #[must_use]
    pub fn new(start: Route) -> Self {
        Self { inner: Mutex::new(NavState { current: start, history: Vec::new() }) }
    }

    /// Routes navigated to, oldest first. The start route is not included.
    #[must_use]
    pub fn history(&self) -> Vec<Route> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).history.clone()
    }
}

impl Default for MemoryNavigator {
    fn default() -> Self {
        Self::new(Route::Messages)
    }
}

impl Navigator for MemoryNavigator {
    fn current(&self) -> Route {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).current
    }

    fn navigate(&self, route: Route) -> bool {
        let mut state = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if state.current == route {
            return false;
        }
        state.current = route;
        state.history.push(route);
        true
    }
}

/// Redirect to login once loading has finished and no user is present.
///
/// Returns `false` when the session is settled and anonymous.
pub fn enforce_auth(session: &Session, navigator: &dyn Navigator) -> bool {
    if !session.loading && session.user.is_none() {
        navigator.navigate(Route::Login);
        return false;
    }
    true
}
