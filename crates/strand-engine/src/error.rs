//! Driver-level error type.

use strand_core::RegistryError;
use strand_polymer::PolymerError;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors surfaced by [`Simulation`](crate::Simulation).
///
/// Configuration errors abort setup. The others abort a run: they mean the
/// propensities and the state they were computed from disagree.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum SimError {
    /// Bad configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// A polymer operation failed.
    #[error(transparent)]
    Polymer(#[from] PolymerError),
    /// The species registry rejected an update.
    #[error(transparent)]
    Registry(#[from] RegistryError),
    /// Driver bookkeeping is inconsistent.
    #[error("invariant violation: {reason}")]
    InvariantViolation {
        /// What was inconsistent.
        reason: String,
    },
}
