//! Reusable genomes and simulations.
//!
//! - [`single_promoter_genome`]: one promoter, one terminator and a mask
//!   at 50, read by `ecolipol`.
//! - [`single_promoter_simulation`]: that genome with two `ecolipol`.
//! - [`phage_genome`]: two genes, RNase sites and a strong promoter.
//! - [`phage_simulation`]: the phage with polymerases, ribosomes and a
//!   species reaction.

use strand_engine::{Simulation, SimulationConfig};
use strand_polymer::{Genome, Mask, Polymer, Site};

/// Cell volume used by every fixture, in litres.
pub const CELL_VOLUME: f64 = 8e-15;

/// Genome polymerase species in the fixtures.
pub const POLYMERASE: &str = "ecolipol";

/// A 150-position genome with promoter `p1` at [5, 15), terminator `t1`
/// at [100, 105) with efficiency 0.6, and a mask from 50 that `ecolipol`
/// can push.
pub fn single_promoter_genome() -> Genome {
    let mut genome = Genome::new("test_genome", 150);
    genome
        .add_mask(50, [POLYMERASE])
        .add_promoter("p1", 5, 15, [(POLYMERASE, 1.0)])
        .add_terminator("t1", 100, 105, [(POLYMERASE, 0.6)]);
    genome
}

/// [`single_promoter_genome`] registered with two `ecolipol` of
/// footprint 10 and speed 30.
pub fn single_promoter_simulation(seed: u64) -> Simulation {
    let config = SimulationConfig::new(60.0, 1.0, CELL_VOLUME).with_seed(seed);
    let mut sim = Simulation::from_config(config).expect("valid fixture config");
    sim.add_polymerase(POLYMERASE, 10, 30.0, 2)
        .expect("valid fixture polymerase");
    sim.register_genome(&single_promoter_genome())
        .expect("valid fixture genome");
    sim
}

/// A 300-position genome with a strong promoter, genes `proteinX` and
/// `proteinY`, a certain terminator at [270, 275), and RNase sites near the
/// 5' end of its transcripts.
pub fn phage_genome(degradation_rate: f64) -> Genome {
    let mut genome = Genome::new("phage", 300).with_transcript_degradation_rate(degradation_rate);
    genome
        .add_promoter("phi1", 1, 11, [("rnapol", 1e10)])
        .add_terminator("t1", 270, 275, [("rnapol", 1.0)])
        .add_gene("proteinX", 100, 160, 80, 95, 1e10)
        .add_gene("proteinY", 181, 250, 165, 178, 1e10)
        .add_rnase_site(11, 21);
    genome
}

/// [`phage_genome`] with 10 `rnapol`, 100 ribosomes and a dimerization
/// reaction of `proteinX`.
pub fn phage_simulation(seed: u64, run_time: f64, degradation_rate: f64) -> Simulation {
    let config = SimulationConfig::new(run_time, 1.0, CELL_VOLUME).with_seed(seed);
    let mut sim = Simulation::from_config(config).expect("valid fixture config");
    sim.add_polymerase("rnapol", 10, 40.0, 10)
        .expect("valid fixture polymerase");
    sim.add_ribosome(10, 30.0, 100).expect("valid fixture ribosome");
    sim.add_reaction(1e6, ["proteinX", "proteinX"], ["dimerX"])
        .expect("valid fixture reaction");
    sim.register_genome(&phage_genome(degradation_rate))
        .expect("valid fixture genome");
    sim
}

/// A bare 100-position polymer with binding site `p1` at [5, 15),
/// release site `t1` at [50, 55) and a mask over [50, 100) that
/// `ecolipol` can push.
pub fn bare_polymer() -> Polymer {
    let sites = vec![
        Site::binding("p1", 5, 15, [(POLYMERASE, 1.0)]),
        Site::release("t1", 50, 55, [(POLYMERASE, 0.6)]),
    ];
    Polymer::new("test_polymer", 0, 100, sites, Mask::new(50, 100, [POLYMERASE]))
        .expect("valid fixture polymer")
}
