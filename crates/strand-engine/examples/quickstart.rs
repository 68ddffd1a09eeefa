//! Strand quickstart: express two genes from a small phage genome.
//!
//! Demonstrates:
//!   1. Building a genome with a promoter, genes, a terminator and RNase sites
//!   2. Declaring polymerases, ribosomes and a species reaction
//!   3. Running the SSA and reading the periodic species counts
//!
//! Run with:
//!   RUST_LOG=strand_engine=debug cargo run --example quickstart

use strand_engine::{SimError, Simulation, SimulationConfig};
use strand_polymer::Genome;
use tracing_subscriber::EnvFilter;

// ─── Run parameters ─────────────────────────────────────────────

const RUN_TIME: f64 = 60.0;
const TIME_STEP: f64 = 5.0;
const CELL_VOLUME: f64 = 8e-15;
const SEED: u64 = 34;

fn main() -> Result<(), SimError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = SimulationConfig::new(RUN_TIME, TIME_STEP, CELL_VOLUME).with_seed(SEED);
    let mut sim = Simulation::from_config(config)?;
    sim.add_polymerase("rnapol", 10, 40.0, 10)?;
    sim.add_ribosome(10, 30.0, 100)?;
    sim.add_reaction(1e6, ["proteinX", "proteinY"], ["proteinXY"])?;

    let mut phage = Genome::new("phage", 450).with_transcript_degradation_rate(1e-2);
    phage
        .add_mask(20, ["rnapol"])
        .add_promoter("phi1", 1, 11, [("rnapol", 2e8)])
        .add_gene("proteinX", 100, 200, 80, 95, 1e7)
        .add_gene("proteinY", 226, 400, 210, 222, 1e7)
        .add_terminator("t1", 420, 425, [("rnapol", 1.0)])
        .add_rnase_site(11, 21);
    sim.register_genome(&phage)?;

    println!("{:>6} {:>8} {:>8} {:>9}", "time", "proteinX", "proteinY", "proteinXY");
    let metrics = sim.run_with(|snapshot| {
        println!(
            "{:>6.1} {:>8} {:>8} {:>9}",
            snapshot.time,
            snapshot.count("proteinX"),
            snapshot.count("proteinY"),
            snapshot.count("proteinXY"),
        );
    })?;

    println!();
    println!("steps:                {}", metrics.steps);
    println!("transcripts created:  {}", metrics.transcripts_created);
    println!("transcripts retired:  {}", metrics.transcripts_retired);
    println!("terminations:         {}", metrics.terminations);
    println!("blocked moves:        {}", metrics.blocked);
    Ok(())
}
