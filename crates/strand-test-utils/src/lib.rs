//! Test fixtures for Strand development.
//!
//! Genome and simulation builders shared by the integration tests and
//! benchmarks of every crate. See [`fixtures`] for the scenarios.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

pub use fixtures::*;

use strand_core::SpeciesRegistry;

/// Registry pre-populated with the given copy numbers.
pub fn registry_with(counts: &[(&str, u64)]) -> SpeciesRegistry {
    let mut registry = SpeciesRegistry::new();
    for &(name, count) in counts {
        registry
            .increment(name, count as i64)
            .expect("non-negative fixture count");
    }
    registry
}

/// Absolute-or-relative float comparison for propensity sums.
pub fn approx_eq(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() <= tolerance * a.abs().max(b.abs()).max(1.0)
}
