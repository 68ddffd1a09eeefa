//! Adapter that puts one polymer's element movement into the reaction pool.

use strand_core::PolymerId;
use strand_polymer::{MoveOutcome, RNASE};

use crate::error::SimError;
use crate::reaction::{PropensityView, Reaction, ReactionContext, ReactionKind, SimEvent};

/// "Some element on this polymer takes its next step."
///
/// The propensity is the polymer's total movement propensity, so element
/// movement competes with chemistry on equal footing. A bridge reads
/// polymer state rather than species counts and has no dependencies; the
/// driver refreshes it whenever the polymer is mutated.
#[derive(Clone, Debug)]
pub struct Bridge {
    polymer: PolymerId,
    label: String,
}

impl Bridge {
    /// Bridge for the polymer with handle `polymer`.
    pub fn new(polymer: PolymerId, polymer_name: &str) -> Self {
        Self {
            polymer,
            label: format!("{polymer_name}#{polymer} movement"),
        }
    }

    /// Handle of the bridged polymer.
    pub fn polymer(&self) -> PolymerId {
        self.polymer
    }
}

impl Reaction for Bridge {
    fn kind(&self) -> ReactionKind {
        ReactionKind::Bridge
    }

    fn name(&self) -> &str {
        &self.label
    }

    fn dependencies(&self) -> Vec<String> {
        Vec::new()
    }

    fn propensity(&self, view: &PropensityView<'_>) -> f64 {
        view.polymer(self.polymer).map_or(0.0, |p| p.prop_sum())
    }

    fn execute(&self, ctx: &mut ReactionContext<'_>) -> Result<(), SimError> {
        let polymer = ctx
            .polymers
            .get_mut(self.polymer)
            .ok_or_else(|| SimError::InvariantViolation {
                reason: format!("bridge '{}' fired for a retired polymer", self.label),
            })?;
        let outcome = polymer.execute(ctx.registry, ctx.rng)?;

        // Handles of retired transcripts no longer resolve; their masks
        // need no further tracking.
        match &outcome {
            MoveOutcome::Advanced {
                attached: Some(transcript),
                trailing_edge,
                ..
            } => {
                if let Some(transcript) = ctx.polymers.get_mut(*transcript) {
                    transcript.advance_mask_to(*trailing_edge, ctx.registry)?;
                }
            }
            MoveOutcome::Terminated(termination) => {
                if termination.species != RNASE {
                    ctx.registry.increment(&termination.species, 1)?;
                }
                if let Some(gene) = &termination.gene {
                    ctx.registry.increment(gene, 1)?;
                }
                if let Some(transcript) = termination
                    .attached
                    .and_then(|id| ctx.polymers.get_mut(id))
                {
                    transcript.advance_mask_to(termination.position, ctx.registry)?;
                }
            }
            MoveOutcome::Advanced { attached: None, .. } | MoveOutcome::Blocked { .. } => {}
        }
        ctx.events.push(SimEvent::Moved {
            polymer: self.polymer,
            outcome,
        });
        Ok(())
    }
}
