//! Error types for registry operations.

use thiserror::Error;

/// Errors raised by the [`SpeciesRegistry`](crate::SpeciesRegistry).
///
/// Reads of unknown names are not errors (they resolve to zero or an empty
/// set); only mutations that would break an invariant and explicit
/// existence checks fail.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Applying `delta` to `species` would drive its copy number below zero.
    #[error("species '{species}' has count {count}; applying {delta} would make it negative")]
    NegativeCount {
        /// Name of the species.
        species: String,
        /// Copy number before the rejected update.
        count: u64,
        /// The rejected change.
        delta: i64,
    },
    /// An explicit existence check found no such species.
    #[error("unknown species '{species}'")]
    UnknownSpecies {
        /// Name that was looked up.
        species: String,
    },
}
