//! CDP-driven browser sessions with a persistent profile per session id.
//!
//! One [`BrowserSession`] owns one headed browser process; the
//! [`SessionRegistry`] maps caller-chosen session ids to live sessions and
//! enforces at-most-one session per id. Page interaction goes through
//! [`page::Target`] locators and the wait/click/type primitives in [`page`].

pub mod detect;
pub mod engine;
pub mod error;
pub mod page;
pub mod registry;
pub mod session;

pub use {
    engine::Engine,
    error::BrowserError,
    page::Target,
    registry::{RegistryError, SessionRegistry},
    session::{BrowserSession, LaunchOptions},
};
