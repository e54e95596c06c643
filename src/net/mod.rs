//! REST plumbing: wire types, the HTTP wrapper, and typed gateways.
//!
//! DESIGN
//! ======
//! Data flows gateway -> `ApiClient` (middleware, transport) -> backend.
//! Gateways only map operations to paths and payloads; all cross-cutting
//! policy lives in `middleware`.

pub mod auth;
pub mod http;
pub mod messages;
pub mod middleware;
pub mod types;

pub use auth::AuthApi;
pub use http::{ApiClient, ApiRequest, ApiResponse, ReqwestTransport, Transport};
pub use messages::MessageApi;
