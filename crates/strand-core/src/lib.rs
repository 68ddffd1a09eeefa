//! Core types for the Strand gene-expression simulator.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! strongly-typed identifiers shared by every layer, the
//! [`SpeciesRegistry`] that tracks molecular copy numbers and the
//! reverse indices used for incremental propensity updates, and the
//! seedable [`SimRng`] random source.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod id;
pub mod registry;
pub mod rng;

pub use error::RegistryError;
pub use id::{ElementId, PolymerId, ReactionId, SiteId, SpeciesId};
pub use registry::SpeciesRegistry;
pub use rng::SimRng;

/// Avogadro's number, used to convert copy numbers to molar concentrations.
pub const AVOGADRO: f64 = 6.0221409e23;
