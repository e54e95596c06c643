//! Stateful client services built on the gateways.
//!
//! DESIGN
//! ======
//! `session` owns authentication state, `feed` owns the message list, and
//! `health` polls reachability on a `scheduler`. Each publishes its state
//! through a `watch` channel so consumers subscribe instead of reaching into
//! shared globals.

pub mod feed;
pub mod health;
pub mod scheduler;
pub mod session;
