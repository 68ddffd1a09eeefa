//! The [`Reaction`] trait and the context reactions run in.
//!
//! Chemical reactions, promoter binding, polymer movement and transcript
//! degradation all compete in one propensity-weighted pool. Each is a
//! stateless [`Reaction`] that reads state through a [`PropensityView`]
//! and mutates it through a [`ReactionContext`].

use std::fmt;

use strand_core::{ElementId, PolymerId, SimRng, SpeciesRegistry};
use strand_polymer::{MoveOutcome, Polymer};

use crate::arena::PolymerArena;
use crate::error::SimError;

/// Broad category of a reaction, for metrics and logging.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReactionKind {
    /// Mass-action reaction between free species.
    Species,
    /// A free polymerase binding a site.
    Bind,
    /// One element on a polymer taking a step.
    Bridge,
    /// An RNase degrading a transcript.
    Degrade,
}

impl fmt::Display for ReactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Species => "species",
            Self::Bind => "bind",
            Self::Bridge => "bridge",
            Self::Degrade => "degrade",
        };
        f.write_str(name)
    }
}

/// Read-only state a propensity is computed from.
#[derive(Clone, Copy)]
pub struct PropensityView<'a> {
    registry: &'a SpeciesRegistry,
    polymers: &'a PolymerArena,
}

impl<'a> PropensityView<'a> {
    /// Construct a view.
    pub fn new(registry: &'a SpeciesRegistry, polymers: &'a PolymerArena) -> Self {
        Self { registry, polymers }
    }

    /// Copy number of `species`; unknown species count as zero.
    pub fn count(&self, species: &str) -> u64 {
        self.registry.count(species)
    }

    /// Live polymer with the given handle.
    pub fn polymer(&self, id: PolymerId) -> Option<&'a Polymer> {
        self.polymers.get(id)
    }
}

/// Something a reaction did that the driver has to follow up on.
///
/// Events are queued during [`Reaction::execute`] and drained by the
/// driver before the next step is selected.
#[derive(Debug)]
pub enum SimEvent {
    /// An element (polymerase, ribosome or RNase) bound a polymer,
    /// possibly starting a transcript.
    Bound {
        /// Polymer bound.
        polymer: PolymerId,
        /// The new element.
        element: ElementId,
        /// Transcript the element will synthesize.
        transcript: Option<Box<Polymer>>,
    },
    /// An element on a polymer was selected to move.
    Moved {
        /// Polymer the element is on.
        polymer: PolymerId,
        /// What happened.
        outcome: MoveOutcome,
    },
}

/// Mutable state lent to [`Reaction::execute`].
pub struct ReactionContext<'a> {
    /// Species copy numbers.
    pub registry: &'a mut SpeciesRegistry,
    /// Live polymers.
    pub polymers: &'a mut PolymerArena,
    /// The run's random source.
    pub rng: &'a mut SimRng,
    /// Follow-up work for the driver.
    pub events: &'a mut Vec<SimEvent>,
}

impl<'a> ReactionContext<'a> {
    /// Construct a context.
    pub fn new(
        registry: &'a mut SpeciesRegistry,
        polymers: &'a mut PolymerArena,
        rng: &'a mut SimRng,
        events: &'a mut Vec<SimEvent>,
    ) -> Self {
        Self {
            registry,
            polymers,
            rng,
            events,
        }
    }

    /// Pick one of the polymers indexed under binding site `site`, weighted
    /// by how many copies of the site each has uncovered.
    pub fn choose_polymer(&mut self, site: &str) -> Result<PolymerId, SimError> {
        let candidates = self.registry.find_polymers(site);
        let weights: Vec<f64> = candidates
            .iter()
            .map(|id| {
                self.polymers
                    .get(*id)
                    .map_or(0.0, |p| f64::from(p.uncovered(site)))
            })
            .collect();
        self.rng
            .weighted_index(&weights)
            .map(|i| candidates[i])
            .ok_or_else(|| SimError::InvariantViolation {
                reason: format!("no polymer exposes an uncovered '{site}'"),
            })
    }
}

/// A propensity-weighted event in the SSA pool.
///
/// # Contract
///
/// - `propensity()` is a pure function of the view.
/// - Whenever the count of a species in `dependencies()` changes, the
///   driver recomputes `propensity()`. Propensities that depend on polymer
///   state instead are refreshed when that polymer is mutated.
/// - `execute()` is only called while `propensity()` is positive.
///
/// # Object safety
///
/// The driver stores reactions as `Box<dyn Reaction>`.
pub trait Reaction: Send {
    /// Category of the reaction.
    fn kind(&self) -> ReactionKind;

    /// Human-readable label for logging and errors.
    fn name(&self) -> &str;

    /// Species whose counts the propensity reads.
    fn dependencies(&self) -> Vec<String>;

    /// Current propensity.
    fn propensity(&self, view: &PropensityView<'_>) -> f64;

    /// Fire the reaction once.
    fn execute(&self, ctx: &mut ReactionContext<'_>) -> Result<(), SimError>;
}
