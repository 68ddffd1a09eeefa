//! Stochastic simulation driver for Strand.
//!
//! The [`Simulation`] runs a Gillespie SSA over a pool of [`Reaction`]s:
//! mass-action [`SpeciesReaction`]s between free species, [`Bind`]s of free
//! polymerases and ribosomes to exposed sites, one [`Bridge`] per polymer
//! standing in for the movement of everything bound to it, and [`Degrade`]s
//! of transcripts at RNase sites.
//!
//! Polymers live in a [`PolymerArena`] and are addressed by handle.
//! Reactions report cross-polymer follow-up work as [`SimEvent`]s, which
//! the driver applies before recomputing the affected propensities.
//!
//! # Quick start
//!
//! ```
//! use strand_engine::Simulation;
//! use strand_polymer::Genome;
//!
//! let mut sim = Simulation::new(5.0, 1.0, 8e-15).unwrap();
//! sim.seed(34);
//! sim.add_polymerase("rnapol", 10, 40.0, 5).unwrap();
//!
//! let mut phage = Genome::new("phage", 300);
//! phage
//!     .add_promoter("phi1", 10, 20, [("rnapol", 2e8)])
//!     .add_terminator("t1", 280, 282, [("rnapol", 1.0)]);
//! sim.register_genome(&phage).unwrap();
//!
//! let report = sim.run().unwrap();
//! assert_eq!(report.snapshots.len(), 6);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod arena;
pub mod bind;
pub mod bridge;
pub mod config;
pub mod degrade;
pub mod error;
pub mod metrics;
pub mod reaction;
pub mod simulation;
pub mod snapshot;
pub mod species_reaction;

pub use arena::PolymerArena;
pub use bind::Bind;
pub use bridge::Bridge;
pub use config::{ConfigError, SimulationConfig};
pub use degrade::Degrade;
pub use error::SimError;
pub use metrics::RunMetrics;
pub use reaction::{PropensityView, Reaction, ReactionContext, ReactionKind, SimEvent};
pub use simulation::Simulation;
pub use snapshot::{RunReport, SpeciesSnapshot};
pub use species_reaction::{SpeciesReaction, MAX_REACTANTS};
