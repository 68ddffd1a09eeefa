//! Benchmark profiles for the Strand gene-expression simulator.
//!
//! Provides pre-built simulations for benchmarking:
//!
//! - [`reference_profile`]: one 5 kb genome with three genes and RNase sites
//! - [`stress_profile`]: ten copies of a 20 kb genome with ten genes each

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use strand_engine::{Simulation, SimulationConfig};
use strand_polymer::Genome;

/// Cell volume of an E. coli cell, in litres.
pub const CELL_VOLUME: f64 = 8e-15;

/// Genome of `length` positions with `genes` evenly spaced genes behind
/// one strong promoter, a terminator near the end and an RNase site at
/// the 5' end of every transcript.
pub fn tiled_genome(name: &str, length: u32, genes: u32) -> Genome {
    let mut genome = Genome::new(name, length).with_transcript_degradation_rate(1e-2);
    genome
        .add_promoter("promoter", 1, 41, [("rnapol", 1e8)])
        .add_rnase_site(41, 51)
        .add_terminator("terminator", length - 10, length - 5, [("rnapol", 1.0)]);
    // Binding sites are at least one footprint long so a bind never
    // collides with the mask or a neighbour.
    let span = (length - 100) / genes;
    for i in 0..genes {
        let start = 100 + i * span;
        let stop = start + span - 50;
        genome.add_gene(&format!("protein{i}"), start, stop, start - 40, start - 5, 1e7);
    }
    genome
}

/// Reference benchmark profile: one 5 kb genome with three genes.
///
/// 100 polymerases, 1000 ribosomes, run to `run_time` seconds.
pub fn reference_profile(seed: u64, run_time: f64) -> Simulation {
    build(seed, run_time, &[tiled_genome("reference", 5_000, 3)])
}

/// Stress benchmark profile: ten 20 kb genomes with ten genes each.
pub fn stress_profile(seed: u64, run_time: f64) -> Simulation {
    let genomes: Vec<_> = (0..10)
        .map(|i| tiled_genome(&format!("stress{i}"), 20_000, 10))
        .collect();
    build(seed, run_time, &genomes)
}

fn build(seed: u64, run_time: f64, genomes: &[Genome]) -> Simulation {
    let config = SimulationConfig::new(run_time, run_time / 10.0, CELL_VOLUME).with_seed(seed);
    let mut sim = Simulation::from_config(config).unwrap();
    sim.add_polymerase("rnapol", 35, 230.0, 100).unwrap();
    sim.add_ribosome(30, 30.0, 1000).unwrap();
    sim.add_reaction(1e6, ["protein0", "protein1"], ["complex"])
        .unwrap();
    for genome in genomes {
        sim.register_genome(genome).unwrap();
    }
    sim
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiled_genes_fit_inside_genome() {
        let genome = tiled_genome("g", 5_000, 3);
        assert!(genome.build().is_ok());
        let genome = tiled_genome("g", 20_000, 10);
        assert!(genome.build().is_ok());
    }

    #[test]
    fn reference_profile_runs() {
        let mut sim = reference_profile(1, 1.0);
        let report = sim.run().unwrap();
        assert_eq!(report.snapshots.len(), 11);
    }
}
