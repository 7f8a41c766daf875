//! HTTP control surface for booking sessions.
//!
//! Three endpoints: start a booking run, stop one, and list active ones.
//! Each run owns one headless-browser session tracked in a shared
//! registry keyed by caller-supplied session id.

pub mod routes;
pub mod server;

pub use server::{AppState, build_router, run};
