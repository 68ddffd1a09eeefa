//! Species copy numbers and the reverse indices that drive incremental
//! propensity maintenance.
//!
//! The [`SpeciesRegistry`] is the only shared mutable state in a run. It is
//! an explicit context object owned by the simulation driver and lent to
//! polymers and reactions; nothing reaches it through a global.
//!
//! # Change notification
//!
//! Every successful [`increment`](SpeciesRegistry::increment) records the
//! species in a pending-change list. The driver drains that list with
//! [`take_changes`](SpeciesRegistry::take_changes) once the current event
//! has finished mutating state, and recomputes only the reactions returned
//! by [`find_reactions_by_id`](SpeciesRegistry::find_reactions_by_id).

use indexmap::IndexMap;
use smallvec::SmallVec;

use crate::error::RegistryError;
use crate::id::{PolymerId, ReactionId, SpeciesId};

/// Copy-number table plus species→reaction and site→polymer indices.
#[derive(Clone, Debug, Default)]
pub struct SpeciesRegistry {
    /// Copy number per species; the map index is the [`SpeciesId`].
    counts: IndexMap<String, u64>,
    /// Reactions whose propensity depends on each species, parallel to `counts`.
    dependents: Vec<SmallVec<[ReactionId; 4]>>,
    /// Polymers carrying at least one binding site with the given name.
    site_polymers: IndexMap<String, Vec<PolymerId>>,
    /// Species touched since the last drain, in touch order.
    pending: Vec<SpeciesId>,
}

impl SpeciesRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every species, index entry and pending change.
    ///
    /// Successive runs sharing one registry must reset between runs so
    /// that counts and reverse indices from the previous run cannot leak.
    pub fn reset(&mut self) {
        self.counts.clear();
        self.dependents.clear();
        self.site_polymers.clear();
        self.pending.clear();
    }

    /// Return the id for `name`, creating the species at count 0 if absent.
    pub fn intern(&mut self, name: &str) -> SpeciesId {
        if let Some(index) = self.counts.get_index_of(name) {
            return SpeciesId(index as u32);
        }
        let (index, _) = self.counts.insert_full(name.to_string(), 0);
        self.dependents.push(SmallVec::new());
        SpeciesId(index as u32)
    }

    /// Id of `name`, if the species has been seen.
    pub fn id(&self, name: &str) -> Option<SpeciesId> {
        self.counts.get_index_of(name).map(|i| SpeciesId(i as u32))
    }

    /// Name of the species with the given id.
    pub fn name(&self, id: SpeciesId) -> Option<&str> {
        self.counts
            .get_index(id.0 as usize)
            .map(|(name, _)| name.as_str())
    }

    /// Copy number of `name`; unknown species count as zero.
    pub fn count(&self, name: &str) -> u64 {
        self.counts.get(name).copied().unwrap_or(0)
    }

    /// Copy number of the species with the given id; unknown ids count as zero.
    pub fn count_by_id(&self, id: SpeciesId) -> u64 {
        self.counts
            .get_index(id.0 as usize)
            .map_or(0, |(_, count)| *count)
    }

    /// Copy number of `name`, failing if the species was never registered.
    pub fn require(&self, name: &str) -> Result<u64, RegistryError> {
        self.counts
            .get(name)
            .copied()
            .ok_or_else(|| RegistryError::UnknownSpecies {
                species: name.to_string(),
            })
    }

    /// Add `delta` to the copy number of `name` and queue a change
    /// notification. Returns the new count.
    ///
    /// The species is created at 0 if absent. A delta that would make the
    /// count negative is rejected without mutating anything.
    pub fn increment(&mut self, name: &str, delta: i64) -> Result<u64, RegistryError> {
        let id = self.intern(name);
        self.increment_id(id, delta)
    }

    /// Id-based form of [`increment`](Self::increment).
    ///
    /// Fails with [`RegistryError::UnknownSpecies`] for an id this registry
    /// never issued.
    pub fn increment_id(&mut self, id: SpeciesId, delta: i64) -> Result<u64, RegistryError> {
        let (name, count) = self.counts.get_index_mut(id.0 as usize).ok_or_else(|| {
            RegistryError::UnknownSpecies {
                species: format!("#{id}"),
            }
        })?;
        let updated = i128::from(*count) + i128::from(delta);
        if updated < 0 {
            return Err(RegistryError::NegativeCount {
                species: name.clone(),
                count: *count,
                delta,
            });
        }
        *count = updated as u64;
        let updated = *count;
        self.pending.push(id);
        Ok(updated)
    }

    /// Record that `reaction`'s propensity depends on `species`.
    ///
    /// Registering the same pair twice is a no-op.
    pub fn register_reaction(&mut self, species: &str, reaction: ReactionId) {
        let id = self.intern(species);
        let list = &mut self.dependents[id.0 as usize];
        if !list.contains(&reaction) {
            list.push(reaction);
        }
    }

    /// Remove `reaction` from every species' dependent list.
    pub fn unregister_reaction(&mut self, reaction: ReactionId) {
        for list in &mut self.dependents {
            list.retain(|r| *r != reaction);
        }
    }

    /// Record that `polymer` carries a binding site named `site`.
    ///
    /// Registering the same pair twice is a no-op.
    pub fn register_polymer(&mut self, site: &str, polymer: PolymerId) {
        let list = self.site_polymers.entry(site.to_string()).or_default();
        if !list.contains(&polymer) {
            list.push(polymer);
        }
    }

    /// Remove `polymer` from every site's polymer list.
    pub fn unregister_polymer(&mut self, polymer: PolymerId) {
        for list in self.site_polymers.values_mut() {
            list.retain(|p| *p != polymer);
        }
    }

    /// Reactions whose propensity depends on `species` (empty if unknown).
    pub fn find_reactions(&self, species: &str) -> &[ReactionId] {
        self.id(species)
            .map(|id| self.find_reactions_by_id(id))
            .unwrap_or(&[])
    }

    /// Id-based form of [`find_reactions`](Self::find_reactions).
    pub fn find_reactions_by_id(&self, species: SpeciesId) -> &[ReactionId] {
        self.dependents
            .get(species.0 as usize)
            .map(|list| list.as_slice())
            .unwrap_or(&[])
    }

    /// Polymers carrying a binding site named `site` (empty if unknown).
    pub fn find_polymers(&self, site: &str) -> &[PolymerId] {
        self.site_polymers
            .get(site)
            .map(|list| list.as_slice())
            .unwrap_or(&[])
    }

    /// Drain the species changed since the previous drain, deduplicated,
    /// in first-touch order.
    pub fn take_changes(&mut self) -> Vec<SpeciesId> {
        let mut changes = std::mem::take(&mut self.pending);
        let mut seen = vec![false; self.counts.len()];
        changes.retain(|id| !std::mem::replace(&mut seen[id.0 as usize], true));
        changes
    }

    /// Whether any change is waiting to be drained.
    pub fn has_changes(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Iterate `(name, count)` pairs in registration order.
    pub fn species(&self) -> impl Iterator<Item = (&str, u64)> + '_ {
        self.counts.iter().map(|(name, count)| (name.as_str(), *count))
    }

    /// Number of species seen.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Whether no species has been seen.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn increment_creates_and_accumulates() {
        let mut reg = SpeciesRegistry::new();
        assert_eq!(reg.increment("reactant1", 1).unwrap(), 1);
        assert_eq!(reg.increment("reactant2", 1).unwrap(), 1);
        assert_eq!(reg.increment("reactant1", 2).unwrap(), 3);
        assert_eq!(reg.count("reactant1"), 3);
        assert_eq!(reg.count("reactant2"), 1);
    }

    #[test]
    fn unknown_species_reads_as_zero() {
        let reg = SpeciesRegistry::new();
        assert_eq!(reg.count("nothing"), 0);
        assert!(reg.find_reactions("nothing").is_empty());
        assert!(reg.find_polymers("nothing").is_empty());
        assert_eq!(
            reg.require("nothing"),
            Err(RegistryError::UnknownSpecies {
                species: "nothing".to_string()
            })
        );
    }

    #[test]
    fn negative_count_is_rejected_without_mutation() {
        let mut reg = SpeciesRegistry::new();
        reg.increment("a", 1).unwrap();
        reg.take_changes();
        let err = reg.increment("a", -2).unwrap_err();
        assert!(matches!(
            err,
            RegistryError::NegativeCount { count: 1, delta: -2, .. }
        ));
        assert_eq!(reg.count("a"), 1);
        assert!(!reg.has_changes());
    }

    #[test]
    fn reverse_indices_return_every_registration() {
        let mut reg = SpeciesRegistry::new();
        reg.register_reaction("reactant1", ReactionId(0));
        reg.register_reaction("reactant1", ReactionId(1));
        reg.register_reaction("reactant1", ReactionId(1));
        assert_eq!(reg.find_reactions("reactant1"), &[ReactionId(0), ReactionId(1)]);

        reg.register_polymer("promoter1", PolymerId(4));
        reg.register_polymer("promoter2", PolymerId(4));
        assert_eq!(reg.find_polymers("promoter1"), &[PolymerId(4)]);
        assert_eq!(reg.find_polymers("promoter2"), &[PolymerId(4)]);

        reg.unregister_polymer(PolymerId(4));
        assert!(reg.find_polymers("promoter1").is_empty());
        reg.unregister_reaction(ReactionId(0));
        assert_eq!(reg.find_reactions("reactant1"), &[ReactionId(1)]);
    }

    #[test]
    fn take_changes_dedups_in_touch_order() {
        let mut reg = SpeciesRegistry::new();
        reg.increment("b", 1).unwrap();
        reg.increment("a", 1).unwrap();
        reg.increment("b", 1).unwrap();
        let changes = reg.take_changes();
        let names: Vec<_> = changes.iter().map(|id| reg.name(*id).unwrap()).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert!(reg.take_changes().is_empty());
    }

    #[test]
    fn reset_clears_everything() {
        let mut reg = SpeciesRegistry::new();
        reg.increment("a", 5).unwrap();
        reg.register_reaction("a", ReactionId(0));
        reg.register_polymer("p", PolymerId(0));
        reg.reset();
        assert!(reg.is_empty());
        assert_eq!(reg.count("a"), 0);
        assert!(reg.find_reactions("a").is_empty());
        assert!(reg.find_polymers("p").is_empty());
        assert!(!reg.has_changes());
    }

    proptest! {
        #[test]
        fn counts_never_go_negative(deltas in proptest::collection::vec(-5i64..5, 0..64)) {
            let mut reg = SpeciesRegistry::new();
            let mut expected: i64 = 0;
            for delta in deltas {
                match reg.increment("x", delta) {
                    Ok(count) => {
                        expected += delta;
                        prop_assert_eq!(count as i64, expected);
                    }
                    Err(_) => prop_assert!(expected + delta < 0),
                }
                prop_assert!(expected >= 0);
            }
            prop_assert_eq!(reg.count("x") as i64, expected);
        }
    }
}
