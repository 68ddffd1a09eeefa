//! Handle-indexed storage for live polymers.
//!
//! Polymers are addressed by [`PolymerId`]. Handles are issued in
//! increasing order and never reused, so a handle kept by a retired
//! transcript's former polymerase simply stops resolving.
//!
//! Every mutable borrow marks the polymer dirty. The driver drains the
//! dirty set after each event and refreshes the matching bridge
//! propensities.

use std::collections::BTreeMap;

use indexmap::IndexSet;
use strand_core::{ElementId, PolymerId, SpeciesRegistry};
use strand_polymer::{Polymer, PolymerError};

/// Live polymers plus the element id counter.
#[derive(Debug, Default)]
pub struct PolymerArena {
    polymers: BTreeMap<PolymerId, Polymer>,
    next_polymer: u32,
    next_element: u64,
    dirty: IndexSet<PolymerId>,
}

impl PolymerArena {
    /// Empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a handle, initialize `polymer` against `registry` and store it.
    pub fn register(
        &mut self,
        mut polymer: Polymer,
        registry: &mut SpeciesRegistry,
    ) -> Result<PolymerId, PolymerError> {
        let id = PolymerId(self.next_polymer);
        polymer.initialize(id, registry)?;
        self.next_polymer += 1;
        self.polymers.insert(id, polymer);
        self.dirty.insert(id);
        Ok(id)
    }

    /// Remove a polymer, returning it.
    pub fn remove(&mut self, id: PolymerId) -> Option<Polymer> {
        self.dirty.shift_remove(&id);
        self.polymers.remove(&id)
    }

    /// Shared access.
    pub fn get(&self, id: PolymerId) -> Option<&Polymer> {
        self.polymers.get(&id)
    }

    /// Mutable access. Marks the polymer dirty.
    pub fn get_mut(&mut self, id: PolymerId) -> Option<&mut Polymer> {
        let polymer = self.polymers.get_mut(&id)?;
        self.dirty.insert(id);
        Some(polymer)
    }

    /// Fresh id for a new mobile element.
    pub fn next_element_id(&mut self) -> ElementId {
        let id = ElementId(self.next_element);
        self.next_element += 1;
        id
    }

    /// Drain the polymers mutably borrowed since the last drain.
    pub fn take_dirty(&mut self) -> Vec<PolymerId> {
        self.dirty.drain(..).collect()
    }

    /// Live polymers in handle order.
    pub fn iter(&self) -> impl Iterator<Item = (PolymerId, &Polymer)> + '_ {
        self.polymers.iter().map(|(id, p)| (*id, p))
    }

    /// Number of live polymers.
    pub fn len(&self) -> usize {
        self.polymers.len()
    }

    /// Whether no polymer is live.
    pub fn is_empty(&self) -> bool {
        self.polymers.is_empty()
    }
}
