//! Binding of free polymerases and ribosomes to named sites.

use strand_core::AVOGADRO;
use strand_polymer::PolymeraseTemplate;

use crate::error::SimError;
use crate::reaction::{PropensityView, Reaction, ReactionContext, ReactionKind, SimEvent};

/// A free element of one species binding an uncovered site of one name.
///
/// Propensity is `rate × free elements × uncovered sites / (N_A × V)`,
/// where the site count spans every polymer carrying the site.
#[derive(Clone, Debug)]
pub struct Bind {
    label: String,
    rate: f64,
    volume: f64,
    site: String,
    template: PolymeraseTemplate,
}

impl Bind {
    /// Bind `template` elements to sites named `site`.
    pub fn new(rate: f64, volume: f64, site: impl Into<String>, template: PolymeraseTemplate) -> Self {
        let site = site.into();
        Self {
            label: format!("{} binds {site}", template.name),
            rate,
            volume,
            site,
            template,
        }
    }

    /// Site name this reaction binds.
    pub fn site(&self) -> &str {
        &self.site
    }

    /// Template of the binding species.
    pub fn template(&self) -> &PolymeraseTemplate {
        &self.template
    }
}

impl Reaction for Bind {
    fn kind(&self) -> ReactionKind {
        ReactionKind::Bind
    }

    fn name(&self) -> &str {
        &self.label
    }

    fn dependencies(&self) -> Vec<String> {
        vec![self.template.name.clone(), self.site.clone()]
    }

    fn propensity(&self, view: &PropensityView<'_>) -> f64 {
        let free = view.count(&self.template.name) as f64;
        let sites = view.count(&self.site) as f64;
        self.rate * free * sites / (AVOGADRO * self.volume)
    }

    fn execute(&self, ctx: &mut ReactionContext<'_>) -> Result<(), SimError> {
        let polymer_id = ctx.choose_polymer(&self.site)?;
        let element = self.template.instantiate(ctx.polymers.next_element_id());
        let polymer = ctx
            .polymers
            .get_mut(polymer_id)
            .ok_or_else(|| SimError::InvariantViolation {
                reason: format!("polymer {polymer_id} indexed under '{}' is gone", self.site),
            })?;
        let outcome = polymer.bind(element, &self.site, ctx.registry, ctx.rng)?;
        ctx.registry.increment(&self.template.name, -1)?;
        ctx.events.push(SimEvent::Bound {
            polymer: polymer_id,
            element: outcome.element,
            transcript: outcome.transcript.map(Box::new),
        });
        Ok(())
    }
}
