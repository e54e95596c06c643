//! Session-aware client for the Cycle messaging API.
//!
//! ARCHITECTURE
//! ============
//! UI action -> gateway (`net::auth`, `net::messages`) -> `net::http::ApiClient`
//! (bearer attachment, transport, 401 handling) -> backend -> typed entity
//! -> service state (`services::session`, `services::feed`) -> subscribers.
//!
//! `services::health` polls backend reachability and drives the feed's
//! reload-on-reconnect. `state::AppState` wires the whole graph.

pub mod config;
pub mod error;
pub mod nav;
pub mod net;
pub mod services;
pub mod state;
pub mod storage;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use config::ClientConfig;
pub use error::{ClientError, ValidationError};
pub use state::AppState;
