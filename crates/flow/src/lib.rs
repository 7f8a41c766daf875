//! The booking flow: branch label correction, challenge handling, the LINE
//! login sub-flow, and the linear booking wizard.
//!
//! The whole flow is one happy path of selector-wait-act steps against the
//! booking site. Any step failure is fatal to the run; there is no retry
//! or resume. Verification challenges are never solved automatically: the
//! handler only waits for a human operator to clear them in the browser
//! window.

pub mod branch;
pub mod challenge;
pub mod error;
pub mod login;
pub mod wizard;

pub use {
    error::FlowError,
    login::LineCredentials,
    wizard::{BookingConfig, WizardOptions},
};
