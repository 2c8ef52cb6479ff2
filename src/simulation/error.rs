//! Error kinds for the simulation core
//!
//! Only two conditions are fatal errors: a malformed initial scenario and
//! numeric divergence detected after a step. Degraded adaptive steps are a
//! flag on the returned sample, and collisions are ordinary events.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    /// Malformed scenario: degenerate body count, non-positive mass, or
    /// coincident positions. `initialize` produces no partial state.
    #[error("invalid initial state: {0}")]
    InvalidInitialState(String),

    /// Energy became non-finite after a step; the run cannot continue and
    /// the host must reset.
    #[error("numeric divergence at t={t}: total energy is non-finite")]
    NumericDivergence { t: f64 },
}

pub type Result<T> = std::result::Result<T, SimError>;
