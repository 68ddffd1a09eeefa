//! Periodic species-count output.

use indexmap::IndexMap;

use crate::metrics::RunMetrics;

/// Copy number of every tracked species at one output time.
#[derive(Clone, Debug, PartialEq)]
pub struct SpeciesSnapshot {
    /// Output time, a multiple of the configured time step.
    pub time: f64,
    /// Species name to copy number, in registration order.
    pub counts: IndexMap<String, u64>,
}

impl SpeciesSnapshot {
    /// Copy number of `species`, zero if it was not tracked.
    pub fn count(&self, species: &str) -> u64 {
        self.counts.get(species).copied().unwrap_or(0)
    }
}

/// Everything [`Simulation::run`](crate::Simulation::run) produces.
#[derive(Clone, Debug, Default)]
pub struct RunReport {
    /// One snapshot per output interval, in time order.
    pub snapshots: Vec<SpeciesSnapshot>,
    /// Run counters.
    pub metrics: RunMetrics,
}
