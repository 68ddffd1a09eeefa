//! RNase degradation of transcripts.

use strand_polymer::PolymeraseTemplate;

use crate::error::SimError;
use crate::reaction::{PropensityView, Reaction, ReactionContext, ReactionKind, SimEvent};

/// An RNase landing on one of a transcript's exposed RNase sites.
///
/// The propensity is `rate × exposed sites`. Firing picks a transcript
/// weighted by its exposed sites and binds a fresh RNase element there.
/// The element then moves with the transcript's bridge, sealing every
/// site its leading edge reaches; the driver retires the transcript once
/// every site is sealed and its last element has left. RNases are not a
/// limited pool, so no species count is consumed.
#[derive(Clone, Debug)]
pub struct Degrade {
    label: String,
    rate: f64,
    site: String,
    rnase: PolymeraseTemplate,
}

impl Degrade {
    /// Degradation at sites named `site` by `rnase` elements.
    pub fn new(rate: f64, site: impl Into<String>, rnase: PolymeraseTemplate) -> Self {
        let site = site.into();
        Self {
            label: format!("degrade at {site}"),
            rate,
            site,
            rnase,
        }
    }
}

impl Reaction for Degrade {
    fn kind(&self) -> ReactionKind {
        ReactionKind::Degrade
    }

    fn name(&self) -> &str {
        &self.label
    }

    fn dependencies(&self) -> Vec<String> {
        vec![self.site.clone()]
    }

    fn propensity(&self, view: &PropensityView<'_>) -> f64 {
        self.rate * view.count(&self.site) as f64
    }

    fn execute(&self, ctx: &mut ReactionContext<'_>) -> Result<(), SimError> {
        let polymer_id = ctx.choose_polymer(&self.site)?;
        let element = self.rnase.instantiate(ctx.polymers.next_element_id());
        let polymer = ctx
            .polymers
            .get_mut(polymer_id)
            .ok_or_else(|| SimError::InvariantViolation {
                reason: format!("polymer {polymer_id} indexed under '{}' is gone", self.site),
            })?;
        let outcome = polymer.bind(element, &self.site, ctx.registry, ctx.rng)?;
        ctx.events.push(SimEvent::Bound {
            polymer: polymer_id,
            element: outcome.element,
            transcript: None,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::PolymerArena;
    use crate::bridge::Bridge;
    use strand_core::{PolymerId, SimRng, SpeciesRegistry};
    use strand_polymer::{Mask, MoveOutcome, Polymer, Site, RNASE};

    const SITE: &str = "__rnase_site_phage";

    fn transcript() -> Polymer {
        let sites = vec![
            Site::binding(SITE, 0, 10, [(RNASE, 1.0)]),
            Site::binding("geneA_rbs", 12, 22, [("ribosome", 1.0)]),
        ];
        Polymer::new("phage_transcript", 0, 60, sites, Mask::none(60)).unwrap()
    }

    fn degrade() -> Degrade {
        Degrade::new(0.5, SITE, PolymeraseTemplate::new(RNASE, 10, 20.0))
    }

    fn degraded(registry: &mut SpeciesRegistry, rng: &mut SimRng) -> (PolymerArena, PolymerId) {
        let mut arena = PolymerArena::new();
        let id = arena.register(transcript(), registry).unwrap();
        let mut events = Vec::new();
        let mut ctx = ReactionContext::new(registry, &mut arena, rng, &mut events);
        degrade().execute(&mut ctx).unwrap();
        assert!(matches!(
            events.as_slice(),
            [SimEvent::Bound { transcript: None, .. }]
        ));
        (arena, id)
    }

    #[test]
    fn propensity_counts_exposed_sites() {
        let mut registry = SpeciesRegistry::new();
        let mut arena = PolymerArena::new();
        arena.register(transcript(), &mut registry).unwrap();
        arena.register(transcript(), &mut registry).unwrap();
        let view = PropensityView::new(&registry, &arena);
        assert_eq!(degrade().propensity(&view), 1.0);
    }

    #[test]
    fn execution_binds_an_rnase() {
        let mut registry = SpeciesRegistry::new();
        let mut rng = SimRng::new(8);
        let (arena, id) = degraded(&mut registry, &mut rng);

        let polymer = arena.get(id).unwrap();
        let rnase = polymer.elements().next().unwrap();
        assert_eq!(rnase.name(), RNASE);
        assert_eq!((rnase.start(), rnase.stop()), (0, 10));
        assert_eq!(polymer.prop_sum(), 20.0);
        assert_eq!(registry.count(SITE), 0);
        // downstream sites wait for the RNase to reach them
        assert_eq!(registry.count("geneA_rbs"), 1);
        assert!(!polymer.is_degraded());
        assert_eq!(registry.count(RNASE), 0);
    }

    #[test]
    fn moving_rnase_seals_the_transcript_and_leaves() {
        let mut registry = SpeciesRegistry::new();
        let mut rng = SimRng::new(8);
        let (mut arena, id) = degraded(&mut registry, &mut rng);
        let bridge = Bridge::new(id, "phage_transcript");
        let mut events = Vec::new();
        for _ in 0..3 {
            let mut ctx = ReactionContext::new(&mut registry, &mut arena, &mut rng, &mut events);
            bridge.execute(&mut ctx).unwrap();
        }
        assert_eq!(registry.count("geneA_rbs"), 0);
        assert!(arena.get(id).unwrap().is_degraded());

        for _ in 0..48 {
            let mut ctx = ReactionContext::new(&mut registry, &mut arena, &mut rng, &mut events);
            bridge.execute(&mut ctx).unwrap();
        }
        match events.last() {
            Some(SimEvent::Moved {
                outcome: MoveOutcome::Terminated(t),
                ..
            }) => {
                assert_eq!(t.species, RNASE);
                assert_eq!(t.position, 60);
            }
            other => panic!("expected a termination, got {other:?}"),
        }
        assert!(arena.get(id).unwrap().table().is_empty());
        // the RNase does not return to a free pool
        assert_eq!(registry.count(RNASE), 0);
    }
}
