//! Mass-action reactions between free species.

use indexmap::IndexMap;
use strand_core::{RegistryError, AVOGADRO};

use crate::config::ConfigError;
use crate::error::SimError;
use crate::reaction::{PropensityView, Reaction, ReactionContext, ReactionKind};

/// Highest reaction order supported.
pub const MAX_REACTANTS: usize = 2;

/// `reactants → products` with mass-action kinetics.
///
/// The propensity is `rate × Π count / (N_A × V)^(n − 1)` for `n`
/// reactants. A species listed twice contributes `c × (c − 1)` rather
/// than `c²`.
#[derive(Clone, Debug)]
pub struct SpeciesReaction {
    label: String,
    rate: f64,
    volume: f64,
    reactants: Vec<String>,
    products: Vec<String>,
}

impl SpeciesReaction {
    /// Build a reaction, rejecting unsupported orders and bad constants.
    pub fn new(
        rate: f64,
        volume: f64,
        reactants: Vec<String>,
        products: Vec<String>,
    ) -> Result<Self, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidReaction {
            reactants: reactants.clone(),
            products: products.clone(),
            reason,
        };
        if reactants.len() > MAX_REACTANTS {
            return Err(invalid(format!(
                "{} reactants, at most {MAX_REACTANTS} supported",
                reactants.len()
            )));
        }
        if reactants.is_empty() && products.is_empty() {
            return Err(invalid("reaction has neither reactants nor products".into()));
        }
        if !rate.is_finite() || rate < 0.0 {
            return Err(invalid(format!("rate must be finite and >= 0, got {rate}")));
        }
        if !volume.is_finite() || volume <= 0.0 {
            return Err(invalid(format!(
                "volume must be finite and positive, got {volume}"
            )));
        }
        let label = format!("{} -> {}", reactants.join(" + "), products.join(" + "));
        Ok(Self {
            label,
            rate,
            volume,
            reactants,
            products,
        })
    }

    /// Reactant species, with repeats.
    pub fn reactants(&self) -> &[String] {
        &self.reactants
    }

    /// Product species, with repeats.
    pub fn products(&self) -> &[String] {
        &self.products
    }

    fn multiplicities(&self) -> IndexMap<&str, u64> {
        let mut counts = IndexMap::new();
        for reactant in &self.reactants {
            *counts.entry(reactant.as_str()).or_insert(0) += 1;
        }
        counts
    }
}

impl Reaction for SpeciesReaction {
    fn kind(&self) -> ReactionKind {
        ReactionKind::Species
    }

    fn name(&self) -> &str {
        &self.label
    }

    fn dependencies(&self) -> Vec<String> {
        self.multiplicities()
            .keys()
            .map(|s| s.to_string())
            .collect()
    }

    fn propensity(&self, view: &PropensityView<'_>) -> f64 {
        let mut propensity = self.rate;
        for (species, multiplicity) in self.multiplicities() {
            let count = view.count(species);
            // falling factorial c (c - 1) ... (c - m + 1)
            for k in 0..multiplicity {
                propensity *= count.saturating_sub(k) as f64;
            }
        }
        let order = self.reactants.len() as i32;
        propensity / (AVOGADRO * self.volume).powi(order - 1)
    }

    fn execute(&self, ctx: &mut ReactionContext<'_>) -> Result<(), SimError> {
        for (species, multiplicity) in self.multiplicities() {
            let count = ctx.registry.count(species);
            if count < multiplicity {
                return Err(RegistryError::NegativeCount {
                    species: species.to_string(),
                    count,
                    delta: -(multiplicity as i64),
                }
                .into());
            }
        }
        for reactant in &self.reactants {
            ctx.registry.increment(reactant, -1)?;
        }
        for product in &self.products {
            ctx.registry.increment(product, 1)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::PolymerArena;
    use strand_core::{SimRng, SpeciesRegistry};

    fn strings(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn reaction(reactants: &[&str], products: &[&str]) -> SpeciesReaction {
        SpeciesReaction::new(1000.0, 8e-15, strings(reactants), strings(products)).unwrap()
    }

    #[test]
    fn bimolecular_propensity() {
        let mut registry = SpeciesRegistry::new();
        registry.increment("reactant1", 2).unwrap();
        registry.increment("reactant2", 3).unwrap();
        let arena = PolymerArena::new();
        let r = reaction(&["reactant1", "reactant2"], &["product1"]);
        let expected = (1000.0 * 2.0 * 3.0) / (AVOGADRO * 8e-15);
        let got = r.propensity(&PropensityView::new(&registry, &arena));
        assert!((got - expected).abs() <= expected * 1e-12);
    }

    #[test]
    fn repeated_reactant_uses_falling_factorial() {
        let mut registry = SpeciesRegistry::new();
        registry.increment("a", 4).unwrap();
        let arena = PolymerArena::new();
        let r = reaction(&["a", "a"], &["b"]);
        let expected = (1000.0 * 4.0 * 3.0) / (AVOGADRO * 8e-15);
        let got = r.propensity(&PropensityView::new(&registry, &arena));
        assert!((got - expected).abs() <= expected * 1e-12);
        assert_eq!(r.dependencies(), vec!["a".to_string()]);

        registry.increment("a", -3).unwrap();
        assert_eq!(r.propensity(&PropensityView::new(&registry, &arena)), 0.0);
    }

    #[test]
    fn first_order_volume_term_cancels() {
        let mut registry = SpeciesRegistry::new();
        registry.increment("reactant1", 1).unwrap();
        let arena = PolymerArena::new();
        let r = SpeciesReaction::new(1.5, 8e-15, strings(&["reactant1"]), strings(&["product1"]))
            .unwrap();
        assert_eq!(r.propensity(&PropensityView::new(&registry, &arena)), 1.5);
    }

    #[test]
    fn execution_conserves_stoichiometry() {
        let mut registry = SpeciesRegistry::new();
        registry.increment("reactant1", 2).unwrap();
        registry.increment("reactant2", 3).unwrap();
        let mut arena = PolymerArena::new();
        let mut rng = SimRng::new(0);
        let mut events = Vec::new();
        let r = reaction(&["reactant1", "reactant2"], &["product1"]);
        let mut ctx = ReactionContext::new(&mut registry, &mut arena, &mut rng, &mut events);
        r.execute(&mut ctx).unwrap();
        assert_eq!(registry.count("reactant1"), 1);
        assert_eq!(registry.count("reactant2"), 2);
        assert_eq!(registry.count("product1"), 1);
        assert!(events.is_empty());
    }

    #[test]
    fn execution_never_drives_counts_negative() {
        let mut registry = SpeciesRegistry::new();
        registry.increment("a", 1).unwrap();
        let mut arena = PolymerArena::new();
        let mut rng = SimRng::new(0);
        let mut events = Vec::new();
        let r = reaction(&["a", "a"], &["b"]);
        let mut ctx = ReactionContext::new(&mut registry, &mut arena, &mut rng, &mut events);
        match r.execute(&mut ctx) {
            Err(SimError::Registry(RegistryError::NegativeCount { count: 1, delta: -2, .. })) => {}
            other => panic!("expected NegativeCount, got {other:?}"),
        }
        assert_eq!(registry.count("a"), 1);
        assert_eq!(registry.count("b"), 0);
    }

    #[test]
    fn construction_rejects_bad_shapes() {
        let err = SpeciesReaction::new(1.0, 8e-15, strings(&["a", "b", "c"]), strings(&["d"]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidReaction { .. }));
        assert!(SpeciesReaction::new(1.0, 8e-15, vec![], vec![]).is_err());
        assert!(SpeciesReaction::new(-1.0, 8e-15, strings(&["a"]), vec![]).is_err());
        assert!(SpeciesReaction::new(1.0, 0.0, strings(&["a"]), vec![]).is_err());
    }
}
