//! The SSA driver.
//!
//! [`Simulation`] owns every piece of run state: the species registry, the
//! polymer arena, the reaction pool with its cached propensities, and the
//! random source. One step of the loop is
//!
//! 1. pick a reaction with probability proportional to its propensity,
//! 2. draw the waiting time from an exponential with rate `alpha_sum`,
//! 3. fire the reaction,
//! 4. drain the follow-up work it queued ([`SimEvent`]s), then recompute
//!    the reactions depending on each changed species and the bridges of
//!    each mutated polymer.
//!
//! Only step 4 touches the cached propensities, so `alpha_sum` stays equal
//! to the sum of all live propensities between steps without a full
//! recomputation.

use indexmap::{IndexMap, IndexSet};
use smallvec::SmallVec;
use strand_core::{PolymerId, ReactionId, SimRng, SpeciesId, SpeciesRegistry};
use strand_polymer::{Genome, MoveOutcome, Polymer, PolymeraseTemplate, RIBOSOME};
use tracing::{debug, info, trace};

use crate::arena::PolymerArena;
use crate::bind::Bind;
use crate::bridge::Bridge;
use crate::config::{ConfigError, SimulationConfig};
use crate::degrade::Degrade;
use crate::error::SimError;
use crate::metrics::RunMetrics;
use crate::reaction::{PropensityView, Reaction, ReactionContext, SimEvent};
use crate::snapshot::{RunReport, SpeciesSnapshot};
use crate::species_reaction::SpeciesReaction;

/// Species whose names start with this prefix are bookkeeping and left out
/// of snapshots.
const INTERNAL_PREFIX: &str = "__";

/// A configured stochastic gene-expression simulation.
///
/// Build one with [`new`](Self::new) or [`from_config`](Self::from_config),
/// add species, reactions, polymerases and genomes, then call
/// [`run`](Self::run) or step it with [`execute`](Self::execute).
///
/// Any configuration call made after the first step invalidates the cached
/// propensities; the next step recomputes them from scratch.
pub struct Simulation {
    config: SimulationConfig,
    registry: SpeciesRegistry,
    rng: SimRng,
    polymers: PolymerArena,
    reactions: Vec<Option<Box<dyn Reaction>>>,
    propensities: Vec<f64>,
    vacant: Vec<ReactionId>,
    bridges: IndexMap<PolymerId, ReactionId>,
    polymerases: IndexMap<String, PolymeraseTemplate>,
    bindings: IndexMap<String, IndexMap<String, f64>>,
    wired: IndexSet<(String, String)>,
    degrade_wired: IndexSet<String>,
    alpha_sum: f64,
    time: f64,
    initialized: bool,
    metrics: RunMetrics,
    events: Vec<SimEvent>,
}

impl Simulation {
    /// Simulation with the given run length, output interval and volume.
    pub fn new(run_time: f64, time_step: f64, cell_volume: f64) -> Result<Self, ConfigError> {
        Self::from_config(SimulationConfig::new(run_time, time_step, cell_volume))
    }

    /// Validate `config` and build an empty simulation from it.
    ///
    /// Without a seed the random source is seeded from OS entropy.
    pub fn from_config(config: SimulationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => SimRng::new(seed),
            None => SimRng::from_entropy(),
        };
        Ok(Self {
            config,
            registry: SpeciesRegistry::new(),
            rng,
            polymers: PolymerArena::new(),
            reactions: Vec::new(),
            propensities: Vec::new(),
            vacant: Vec::new(),
            bridges: IndexMap::new(),
            polymerases: IndexMap::new(),
            bindings: IndexMap::new(),
            wired: IndexSet::new(),
            degrade_wired: IndexSet::new(),
            alpha_sum: 0.0,
            time: 0.0,
            initialized: false,
            metrics: RunMetrics::default(),
            events: Vec::new(),
        })
    }

    /// Re-seed the random source. Call before the first step for a
    /// reproducible run.
    pub fn seed(&mut self, seed: u64) {
        self.rng.seed(seed);
        self.config.seed = Some(seed);
    }

    // ── Configuration ────────────────────────────────────────────

    /// Add a mass-action reaction `reactants → products` with rate
    /// constant `rate`.
    pub fn add_reaction<R, P, S>(
        &mut self,
        rate: f64,
        reactants: R,
        products: P,
    ) -> Result<ReactionId, ConfigError>
    where
        R: IntoIterator<Item = S>,
        P: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let reaction = SpeciesReaction::new(
            rate,
            self.config.cell_volume,
            reactants.into_iter().map(Into::into).collect(),
            products.into_iter().map(Into::into).collect(),
        )?;
        for species in reaction.reactants().iter().chain(reaction.products()) {
            self.registry.intern(species);
        }
        self.initialized = false;
        Ok(self.push_reaction(Box::new(reaction)))
    }

    /// Add `count` free copies of `name`.
    pub fn add_species(&mut self, name: &str, count: u32) -> Result<(), SimError> {
        self.registry.increment(name, i64::from(count))?;
        self.initialized = false;
        Ok(())
    }

    /// Declare a polymerase species with `copy_number` free copies.
    ///
    /// Declaring the same name again replaces the template and adds the
    /// copies to the pool.
    pub fn add_polymerase(
        &mut self,
        name: &str,
        footprint: u32,
        speed: f64,
        copy_number: u32,
    ) -> Result<(), SimError> {
        let template = PolymeraseTemplate::new(name, footprint, speed);
        template
            .validate()
            .map_err(|err| ConfigError::InvalidPolymerase {
                name: name.to_string(),
                reason: err.to_string(),
            })?;
        self.registry.increment(name, i64::from(copy_number))?;
        self.polymerases.insert(name.to_string(), template);
        self.initialized = false;
        Ok(())
    }

    /// Declare the ribosome species that translates transcripts.
    pub fn add_ribosome(&mut self, footprint: u32, speed: f64, copy_number: u32) -> Result<(), SimError> {
        self.add_polymerase(RIBOSOME, footprint, speed, copy_number)
    }

    /// Build `genome`, register it and its binding affinities, and add its
    /// movement bridge.
    ///
    /// A genome with a positive transcript degradation rate and at least
    /// one RNase site also adds one degradation reaction per RNase site
    /// name.
    pub fn register_genome(&mut self, genome: &Genome) -> Result<PolymerId, SimError> {
        let polymer = genome.build().map_err(ConfigError::InvalidGenome)?;
        for (site, interactions) in genome.bindings() {
            self.bindings
                .entry(site.clone())
                .or_default()
                .extend(interactions.iter().map(|(k, v)| (k.clone(), *v)));
        }
        let id = self.register_polymer(polymer)?;

        let rate = genome.transcript_degradation_rate();
        if rate > 0.0 && genome.has_rnase_sites() {
            let site = genome.rnase_site_name();
            if self.degrade_wired.insert(site.clone()) {
                self.push_reaction(Box::new(Degrade::new(rate, site, genome.rnase_template())));
            }
        }
        self.initialized = false;
        info!(genome = genome.name(), id = %id, length = genome.length(), "genome registered");
        Ok(id)
    }

    fn register_polymer(&mut self, polymer: Polymer) -> Result<PolymerId, SimError> {
        let id = self.polymers.register(polymer, &mut self.registry)?;
        let name = self.polymers.get(id).map_or("", |p| p.name()).to_string();
        let bridge = self.push_reaction(Box::new(Bridge::new(id, &name)));
        self.bridges.insert(id, bridge);
        Ok(id)
    }

    /// Add a Bind reaction for every (binding site, polymerase) pair the
    /// registered genomes declare an affinity for and that is not wired yet.
    fn wire_bindings(&mut self) {
        let mut pending = Vec::new();
        for (site, interactions) in &self.bindings {
            for (name, template) in &self.polymerases {
                let Some(&rate) = interactions.get(name) else {
                    continue;
                };
                if self.wired.insert((site.clone(), name.clone())) {
                    pending.push(Bind::new(rate, self.config.cell_volume, site.as_str(), template.clone()));
                }
            }
        }
        for bind in pending {
            debug!(reaction = bind.name(), "bind wired");
            self.push_reaction(Box::new(bind));
        }
    }

    fn push_reaction(&mut self, reaction: Box<dyn Reaction>) -> ReactionId {
        let id = self
            .vacant
            .pop()
            .unwrap_or(ReactionId(self.reactions.len() as u32));
        for species in reaction.dependencies() {
            self.registry.register_reaction(&species, id);
        }
        let propensity = reaction.propensity(&PropensityView::new(&self.registry, &self.polymers));
        let index = id.0 as usize;
        if index == self.reactions.len() {
            self.reactions.push(Some(reaction));
            self.propensities.push(propensity);
        } else {
            self.reactions[index] = Some(reaction);
            self.propensities[index] = propensity;
        }
        self.alpha_sum += propensity;
        id
    }

    fn remove_reaction(&mut self, id: ReactionId) {
        let index = id.0 as usize;
        if self.reactions.get_mut(index).and_then(Option::take).is_none() {
            return;
        }
        self.alpha_sum -= self.propensities[index];
        self.propensities[index] = 0.0;
        self.registry.unregister_reaction(id);
        self.vacant.push(id);
    }

    // ── Propensities ─────────────────────────────────────────────

    /// Wire pending binds and compute every propensity and `alpha_sum`
    /// from scratch.
    pub fn init_propensity(&mut self) {
        self.wire_bindings();
        self.registry.take_changes();
        self.polymers.take_dirty();
        self.alpha_sum = 0.0;
        for index in 0..self.reactions.len() {
            self.propensities[index] = 0.0;
            self.recompute(ReactionId(index as u32));
        }
        self.initialized = true;
        debug!(
            reactions = self.reaction_count(),
            alpha_sum = self.alpha_sum,
            "propensities initialized"
        );
    }

    /// Recompute every reaction whose propensity reads `species`.
    pub fn update_propensity(&mut self, species: SpeciesId) {
        let dependents: SmallVec<[ReactionId; 8]> = self
            .registry
            .find_reactions_by_id(species)
            .iter()
            .copied()
            .collect();
        for id in dependents {
            self.recompute(id);
        }
    }

    fn recompute(&mut self, id: ReactionId) {
        let index = id.0 as usize;
        let Some(Some(reaction)) = self.reactions.get(index) else {
            return;
        };
        let propensity = reaction.propensity(&PropensityView::new(&self.registry, &self.polymers));
        self.alpha_sum += propensity - self.propensities[index];
        self.propensities[index] = propensity;
    }

    /// Sum of every live propensity, recomputed from current state.
    pub fn exact_alpha_sum(&self) -> f64 {
        let view = PropensityView::new(&self.registry, &self.polymers);
        self.reactions
            .iter()
            .flatten()
            .map(|reaction| reaction.propensity(&view))
            .sum()
    }

    // ── Stepping ─────────────────────────────────────────────────

    /// Perform one SSA step.
    ///
    /// Returns the fired reaction, or `None` at a fixed point where no
    /// reaction can fire.
    pub fn execute(&mut self) -> Result<Option<ReactionId>, SimError> {
        match self.next_event() {
            Some((id, tau)) => {
                self.fire(id, tau)?;
                Ok(Some(id))
            }
            None => Ok(None),
        }
    }

    /// Select the next reaction and its waiting time without firing it.
    fn next_event(&mut self) -> Option<(ReactionId, f64)> {
        if !self.initialized {
            self.init_propensity();
        }
        if self.alpha_sum <= 0.0 {
            return None;
        }
        let target = self.rng.uniform() * self.alpha_sum;
        let mut cumulative = 0.0;
        let mut selected = None;
        for (index, &propensity) in self.propensities.iter().enumerate() {
            if propensity <= 0.0 {
                continue;
            }
            cumulative += propensity;
            selected = Some(ReactionId(index as u32));
            if cumulative > target {
                break;
            }
        }
        let Some(id) = selected else {
            // Only rounding residue was left in the cached sum.
            self.alpha_sum = 0.0;
            return None;
        };
        let tau = self.rng.exponential(self.alpha_sum)?;
        Some((id, tau))
    }

    fn fire(&mut self, id: ReactionId, tau: f64) -> Result<(), SimError> {
        let index = id.0 as usize;
        let Some(Some(reaction)) = self.reactions.get(index) else {
            return Err(SimError::InvariantViolation {
                reason: format!("selected reaction {id} is not live"),
            });
        };
        let kind = reaction.kind();
        trace!(reaction = reaction.name(), time = self.time + tau, "step");
        let mut ctx = ReactionContext::new(
            &mut self.registry,
            &mut self.polymers,
            &mut self.rng,
            &mut self.events,
        );
        reaction.execute(&mut ctx)?;
        self.time += tau;
        self.metrics.record(kind);
        self.flush()
    }

    /// Apply queued events, then refresh the propensities of changed
    /// species and of mutated polymers' bridges, in that order.
    fn flush(&mut self) -> Result<(), SimError> {
        for event in std::mem::take(&mut self.events) {
            self.apply(event)?;
        }
        for species in self.registry.take_changes() {
            self.update_propensity(species);
        }
        for polymer in self.polymers.take_dirty() {
            if let Some(&bridge) = self.bridges.get(&polymer) {
                self.recompute(bridge);
            }
        }
        Ok(())
    }

    fn apply(&mut self, event: SimEvent) -> Result<(), SimError> {
        match event {
            SimEvent::Bound {
                polymer,
                element,
                transcript: Some(transcript),
            } => {
                let transcript_id = self.register_polymer(*transcript)?;
                if let Some(genome) = self.polymers.get_mut(polymer) {
                    genome.set_attached(element, transcript_id);
                }
                self.metrics.transcripts_created += 1;
                debug!(genome = %polymer, transcript = %transcript_id, "transcript created");
            }
            SimEvent::Bound { transcript: None, .. } => {}
            SimEvent::Moved { polymer, outcome } => match outcome {
                MoveOutcome::Advanced { .. } => self.metrics.advanced += 1,
                MoveOutcome::Blocked { .. } => self.metrics.blocked += 1,
                MoveOutcome::Terminated(_) => {
                    self.metrics.terminations += 1;
                    self.check_retire(polymer)?;
                }
            },
        }
        Ok(())
    }

    /// Drop a fully sealed polymer once nothing is bound to it.
    fn check_retire(&mut self, id: PolymerId) -> Result<(), SimError> {
        let retirable = self
            .polymers
            .get(id)
            .is_some_and(|p| p.is_degraded() && p.table().is_empty());
        if !retirable {
            return Ok(());
        }
        if let Some(mut polymer) = self.polymers.remove(id) {
            polymer.retire(&mut self.registry)?;
        }
        if let Some(bridge) = self.bridges.shift_remove(&id) {
            self.remove_reaction(bridge);
        }
        self.metrics.transcripts_retired += 1;
        Ok(())
    }

    // ── Running ──────────────────────────────────────────────────

    /// Run to `run_time`, handing a snapshot to `observer` at every
    /// multiple of `time_step` from zero up to `run_time`.
    ///
    /// Each snapshot shows the state in force at its output time. A run
    /// that reaches a fixed point stops early but still emits the remaining
    /// snapshots; the clock stays at the last event.
    pub fn run_with<F>(&mut self, mut observer: F) -> Result<RunMetrics, SimError>
    where
        F: FnMut(&SpeciesSnapshot),
    {
        let SimulationConfig {
            run_time,
            time_step,
            ..
        } = self.config;
        let outputs = (run_time / time_step + 1e-9).floor() as u64;
        let mut next_output = (self.time / time_step).ceil() as u64;
        info!(
            run_time,
            time_step,
            seed = self.rng.current_seed(),
            reactions = self.reaction_count(),
            polymers = self.polymers.len(),
            "run started"
        );

        while next_output <= outputs {
            let Some((id, tau)) = self.next_event() else {
                debug!(time = self.time, "fixed point reached");
                while next_output <= outputs {
                    observer(&self.snapshot(next_output as f64 * time_step));
                    next_output += 1;
                }
                break;
            };
            let event_time = self.time + tau;
            while next_output <= outputs && (next_output as f64 * time_step) < event_time {
                observer(&self.snapshot(next_output as f64 * time_step));
                next_output += 1;
            }
            if next_output > outputs {
                break;
            }
            self.fire(id, tau)?;
        }

        self.metrics.final_time = self.time;
        info!(
            final_time = self.time,
            steps = self.metrics.steps,
            terminations = self.metrics.terminations,
            "run finished"
        );
        Ok(self.metrics.clone())
    }

    /// Run to `run_time` and collect every snapshot.
    pub fn run(&mut self) -> Result<RunReport, SimError> {
        let mut snapshots = Vec::new();
        let metrics = self.run_with(|snapshot| snapshots.push(snapshot.clone()))?;
        Ok(RunReport { snapshots, metrics })
    }

    /// Copy numbers of every tracked species, stamped with `time`.
    pub fn snapshot(&self, time: f64) -> SpeciesSnapshot {
        let counts = self
            .registry
            .species()
            .filter(|(name, _)| !name.starts_with(INTERNAL_PREFIX))
            .map(|(name, count)| (name.to_string(), count))
            .collect();
        SpeciesSnapshot { time, counts }
    }

    // ── Accessors ────────────────────────────────────────────────

    /// Cached sum of all propensities.
    pub fn alpha_sum(&self) -> f64 {
        self.alpha_sum
    }

    /// Simulated time of the last event.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Species counts and indices.
    pub fn registry(&self) -> &SpeciesRegistry {
        &self.registry
    }

    /// Live polymer with the given handle.
    pub fn polymer(&self, id: PolymerId) -> Option<&Polymer> {
        self.polymers.get(id)
    }

    /// All live polymers.
    pub fn polymers(&self) -> &PolymerArena {
        &self.polymers
    }

    /// Number of live reactions in the pool.
    pub fn reaction_count(&self) -> usize {
        self.reactions.iter().flatten().count()
    }

    /// Counters so far.
    pub fn metrics(&self) -> &RunMetrics {
        &self.metrics
    }

    /// The configuration the simulation was built with.
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sim() -> Simulation {
        Simulation::from_config(SimulationConfig::new(10.0, 1.0, 8e-15).with_seed(42)).unwrap()
    }

    #[test]
    fn invalid_config_is_rejected() {
        assert!(matches!(
            Simulation::new(0.0, 1.0, 8e-15),
            Err(ConfigError::InvalidRunTime { .. })
        ));
    }

    #[test]
    fn empty_simulation_is_a_fixed_point() {
        let mut sim = sim();
        assert_eq!(sim.execute().unwrap(), None);
        assert_eq!(sim.alpha_sum(), 0.0);
    }

    #[test]
    fn reaction_ids_are_reused_after_removal() {
        let mut sim = sim();
        let a = sim.add_reaction(1.0, ["x"], ["y"]).unwrap();
        sim.remove_reaction(a);
        assert_eq!(sim.reaction_count(), 0);
        let b = sim.add_reaction(2.0, ["x"], ["y"]).unwrap();
        assert_eq!(a, b);
        assert_eq!(sim.registry().find_reactions("x"), &[b]);
    }

    #[test]
    fn invalid_polymerase_is_a_config_error() {
        let mut sim = sim();
        assert!(matches!(
            sim.add_polymerase("rnap", 0, 10.0, 1),
            Err(SimError::Config(ConfigError::InvalidPolymerase { .. }))
        ));
        assert_eq!(sim.registry().count("rnap"), 0);
    }

    #[test]
    fn first_order_decay_runs_to_completion() {
        let mut sim = sim();
        sim.add_species("x", 5).unwrap();
        sim.add_reaction(100.0, ["x"], ["y"]).unwrap();
        let report = sim.run().unwrap();
        assert_eq!(report.snapshots.len(), 11);
        assert_eq!(report.snapshots[0].count("x") + report.snapshots[0].count("y"), 5);
        let last = report.snapshots.last().unwrap();
        assert_eq!(last.count("y"), 5);
        assert_eq!(report.metrics.species_reactions, 5);
        assert!(sim.time() < 10.0);
    }
}
