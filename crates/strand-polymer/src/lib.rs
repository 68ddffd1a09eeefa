//! Polymer engine for Strand simulations.
//!
//! A [`Polymer`] is a one-dimensional coordinate range carrying named
//! [`Site`]s, a [`Mask`] over its not-yet-accessible region, and a
//! [`MobileElementTable`] of bound polymerases or ribosomes. The
//! [`Genome`] builder produces genome polymers whose promoter binds spawn
//! transcripts cut from a [`TranscriptTemplate`].
//!
//! Polymers never reach across to other polymers. Operations that affect
//! something outside the polymer report it through [`BindOutcome`] and
//! [`MoveOutcome`], and the caller applies the effect.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod feature;
pub mod genome;
pub mod outcome;
pub mod polymer;
pub mod site_index;
pub mod table;

pub use error::PolymerError;
pub use feature::{Mask, MobileElement, PolymeraseTemplate, Site, SiteKind};
pub use genome::{
    rnase_site_name, Genome, TranscriptTemplate, DEFAULT_RNASE_SPEED, RIBOSOME, RNASE, RNASE_FOOTPRINT,
    STOP_CODON,
};
pub use outcome::{BindOutcome, Blocker, MoveOutcome, Termination};
pub use polymer::{Polymer, SynthesisPolicy};
pub use site_index::SiteIndex;
pub use table::MobileElementTable;
