//! Position-ordered table of the mobile elements bound to one polymer.

use std::sync::Arc;

use strand_core::{ElementId, PolymerId, SimRng};

use crate::feature::MobileElement;

/// Bound elements in position order, with per-element movement
/// propensities and their running sum.
///
/// Each slot pairs an element with the polymer it is synthesizing, if any
/// (a genome polymerase is paired with its transcript). `prop_sum` is
/// updated incrementally on every insert, delete and propensity update.
#[derive(Clone, Debug)]
pub struct MobileElementTable {
    elements: Vec<(MobileElement, Option<PolymerId>)>,
    props: Vec<f64>,
    prop_sum: f64,
    weights: Arc<[f64]>,
}

impl MobileElementTable {
    /// Empty table with per-position rate multipliers.
    ///
    /// `weights[p]` scales the speed of an element whose leading position is
    /// `p`. Positions past the end of `weights` use 1.0.
    pub fn new(weights: Arc<[f64]>) -> Self {
        Self {
            elements: Vec::new(),
            props: Vec::new(),
            prop_sum: 0.0,
            weights,
        }
    }

    /// Slot at which an element starting at `start` would be inserted.
    pub fn insertion_point(&self, start: u32) -> usize {
        self.elements.partition_point(|(el, _)| el.start() < start)
    }

    /// Insert `element` keeping position order and return its slot.
    pub fn insert(&mut self, element: MobileElement, attached: Option<PolymerId>) -> usize {
        let slot = self.insertion_point(element.start());
        let prop = self.propensity_of(&element);
        self.elements.insert(slot, (element, attached));
        self.props.insert(slot, prop);
        self.prop_sum += prop;
        slot
    }

    /// Remove the element at `index`, returning it and its attached polymer.
    pub fn delete(&mut self, index: usize) -> Option<(MobileElement, Option<PolymerId>)> {
        if !self.valid_index(index) {
            return None;
        }
        self.prop_sum -= self.props.remove(index);
        let entry = self.elements.remove(index);
        if self.elements.is_empty() {
            self.prop_sum = 0.0;
        }
        Some(entry)
    }

    /// Propensity-weighted draw of the next element to move.
    pub fn choose(&self, rng: &mut SimRng) -> Option<usize> {
        rng.weighted_index(&self.props)
    }

    /// Recompute the propensity of the element at `index` from its current
    /// position and fold the change into the running sum.
    pub fn update_propensity(&mut self, index: usize) {
        let Some((element, _)) = self.elements.get(index) else {
            return;
        };
        let prop = self.propensity_of(element);
        self.prop_sum += prop - self.props[index];
        self.props[index] = prop;
    }

    fn propensity_of(&self, element: &MobileElement) -> f64 {
        let weight = element
            .stop()
            .checked_sub(1)
            .and_then(|p| self.weights.get(p as usize))
            .copied()
            .unwrap_or(1.0);
        element.speed() * weight
    }

    /// Element at `index`.
    pub fn get(&self, index: usize) -> Option<&MobileElement> {
        self.elements.get(index).map(|(el, _)| el)
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut MobileElement> {
        self.elements.get_mut(index).map(|(el, _)| el)
    }

    /// Polymer synthesized by the element at `index`.
    pub fn attached(&self, index: usize) -> Option<PolymerId> {
        self.elements.get(index).and_then(|(_, p)| *p)
    }

    /// Pair the element at `index` with the polymer it synthesizes.
    pub fn set_attached(&mut self, index: usize, polymer: PolymerId) -> bool {
        match self.elements.get_mut(index) {
            Some((_, slot)) => {
                *slot = Some(polymer);
                true
            }
            None => false,
        }
    }

    /// Whether `index` addresses a slot.
    pub fn valid_index(&self, index: usize) -> bool {
        index < self.elements.len()
    }

    /// Current slot of the element with the given id.
    pub fn position_of(&self, id: ElementId) -> Option<usize> {
        self.elements.iter().position(|(el, _)| el.id() == id)
    }

    /// Per-slot propensities.
    pub fn props(&self) -> &[f64] {
        &self.props
    }

    /// Sum of all per-slot propensities.
    pub fn prop_sum(&self) -> f64 {
        self.prop_sum
    }

    /// Elements in position order.
    pub fn iter(&self) -> impl Iterator<Item = &MobileElement> + '_ {
        self.elements.iter().map(|(el, _)| el)
    }

    /// Number of bound elements.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether nothing is bound.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

impl Default for MobileElementTable {
    fn default() -> Self {
        Self::new(Arc::from(Vec::<f64>::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::PolymeraseTemplate;

    fn element(id: u64, start: u32, speed: f64) -> MobileElement {
        let mut el = PolymeraseTemplate::new("rnap", 10, speed).instantiate(ElementId(id));
        el.place(start, PolymerId(0), None);
        el
    }

    #[test]
    fn insert_keeps_position_order() {
        let mut table = MobileElementTable::default();
        table.insert(element(1, 40, 1.0), None);
        table.insert(element(2, 10, 1.0), None);
        let slot = table.insert(element(3, 25, 1.0), None);
        assert_eq!(slot, 1);
        let starts: Vec<_> = table.iter().map(|el| el.start()).collect();
        assert_eq!(starts, vec![10, 25, 40]);
        assert_eq!(table.position_of(ElementId(1)), Some(2));
    }

    #[test]
    fn prop_sum_tracks_inserts_and_deletes() {
        let mut table = MobileElementTable::default();
        table.insert(element(1, 0, 30.0), None);
        table.insert(element(2, 20, 10.0), None);
        assert_eq!(table.prop_sum(), 40.0);
        let (removed, _) = table.delete(0).unwrap();
        assert_eq!(removed.id(), ElementId(1));
        assert_eq!(table.prop_sum(), 10.0);
        table.delete(0).unwrap();
        assert_eq!(table.prop_sum(), 0.0);
        assert!(table.delete(0).is_none());
    }

    #[test]
    fn weights_scale_by_leading_position() {
        let mut weights = vec![1.0; 20];
        weights[10] = 0.5;
        let mut table = MobileElementTable::new(weights.into());
        table.insert(element(1, 0, 4.0), None);
        assert_eq!(table.prop_sum(), 4.0);
        table.get_mut(0).unwrap().advance();
        table.update_propensity(0);
        assert_eq!(table.prop_sum(), 2.0);
        assert_eq!(table.props(), &[2.0]);
    }

    #[test]
    fn choose_only_picks_moving_elements() {
        let mut table = MobileElementTable::default();
        table.insert(element(1, 0, 0.0), None);
        table.insert(element(2, 20, 5.0), None);
        let mut rng = SimRng::new(4);
        for _ in 0..50 {
            assert_eq!(table.choose(&mut rng), Some(1));
        }
    }

    #[test]
    fn attached_polymer_round_trips() {
        let mut table = MobileElementTable::default();
        table.insert(element(1, 0, 1.0), None);
        assert_eq!(table.attached(0), None);
        assert!(table.set_attached(0, PolymerId(7)));
        assert_eq!(table.attached(0), Some(PolymerId(7)));
        assert!(!table.set_attached(3, PolymerId(7)));
        assert!(!table.valid_index(1));
    }
}
