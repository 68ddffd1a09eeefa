//! Strand: stochastic simulation of gene expression.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all Strand sub-crates. For most users, adding `strand` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use strand::prelude::*;
//!
//! let config = SimulationConfig::new(10.0, 1.0, 8e-15).with_seed(7);
//! let mut sim = Simulation::from_config(config).unwrap();
//! sim.add_polymerase("rnapol", 10, 40.0, 10).unwrap();
//! sim.add_ribosome(10, 30.0, 100).unwrap();
//!
//! let mut phage = Genome::new("phage", 250);
//! phage
//!     .add_promoter("phi1", 1, 11, [("rnapol", 1e10)])
//!     .add_gene("proteinX", 60, 150, 40, 55, 1e10)
//!     .add_terminator("t1", 200, 205, [("rnapol", 1.0)]);
//! sim.register_genome(&phage).unwrap();
//!
//! let report = sim.run().unwrap();
//! assert_eq!(report.snapshots.len(), 11);
//! assert!(report.metrics.transcripts_created > 0);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `strand-core` | IDs, the species registry, the random source |
//! | [`polymer`] | `strand-polymer` | Sites, masks, elements, polymers and genomes |
//! | [`engine`] | `strand-engine` | Reactions and the SSA driver |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core IDs, registry and randomness (`strand-core`).
///
/// Contains the strongly-typed handles, the [`types::SpeciesRegistry`]
/// holding copy numbers, and the seedable [`types::SimRng`].
pub use strand_core as types;

/// Polymer state machine and genome builder (`strand-polymer`).
///
/// Build genomes with [`polymer::Genome`]; inspect bound elements and
/// site coverage through [`polymer::Polymer`].
pub use strand_polymer as polymer;

/// Reactions and the SSA driver (`strand-engine`).
///
/// [`engine::Simulation`] is the entry point. Implement
/// [`engine::Reaction`] to add custom events to the pool.
pub use strand_engine as engine;

/// Common imports for typical Strand usage.
///
/// ```rust
/// use strand::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use strand_core::{PolymerId, ReactionId, SimRng, SpeciesRegistry, AVOGADRO};

    // Polymers and genomes
    pub use strand_polymer::{Genome, Mask, Polymer, PolymeraseTemplate, Site, RIBOSOME};

    // Errors
    pub use strand_core::RegistryError;
    pub use strand_engine::{ConfigError, SimError};
    pub use strand_polymer::PolymerError;

    // Engine
    pub use strand_engine::{
        Reaction, RunMetrics, RunReport, Simulation, SimulationConfig, SpeciesSnapshot,
    };
}
