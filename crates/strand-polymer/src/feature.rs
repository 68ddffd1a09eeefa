//! Features laid out on a polymer: sites, masks and mobile elements.
//!
//! All intervals are half-open `[start, stop)` in the coordinate system of
//! the genome they came from. Transcripts keep genomic coordinates so that
//! positions carry over unchanged when a transcript is built.

use indexmap::{IndexMap, IndexSet};
use smallvec::SmallVec;
use strand_core::{ElementId, PolymerId, SiteId};

use crate::error::PolymerError;

/// What a site does when a mobile element meets it.
#[derive(Clone, Debug, PartialEq)]
pub enum SiteKind {
    /// Promoter, ribosome binding site or RNase site. Mobile elements bind
    /// here; `interactions` maps element species to binding affinity.
    Binding {
        /// Element species → relative binding affinity.
        interactions: IndexMap<String, f64>,
        /// Reading frame handed to elements that bind here.
        reading_frame: Option<u8>,
    },
    /// Terminator or stop codon. `efficiency` maps element species to the
    /// probability of terminating here.
    Release {
        /// Element species → termination probability in `[0, 1]`.
        efficiency: IndexMap<String, f64>,
        /// Only elements in this reading frame terminate here.
        reading_frame: Option<u8>,
        /// Gene whose product is released on termination.
        gene: Option<String>,
    },
}

/// A named interval on a polymer together with its coverage state.
///
/// A site is covered while the mask hides it, while any mobile element's
/// footprint overlaps it, or permanently once an RNase has passed over it.
#[derive(Clone, Debug, PartialEq)]
pub struct Site {
    name: String,
    start: u32,
    stop: u32,
    kind: SiteKind,
    hidden: bool,
    occupants: u16,
    sealed: bool,
}

impl Site {
    /// Build a binding site (promoter / RBS).
    pub fn binding<I, S>(name: impl Into<String>, start: u32, stop: u32, interactions: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        Self::new(
            name,
            start,
            stop,
            SiteKind::Binding {
                interactions: interactions.into_iter().map(|(k, v)| (k.into(), v)).collect(),
                reading_frame: None,
            },
        )
    }

    /// Build a release site (terminator / stop codon).
    pub fn release<I, S>(name: impl Into<String>, start: u32, stop: u32, efficiency: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        Self::new(
            name,
            start,
            stop,
            SiteKind::Release {
                efficiency: efficiency.into_iter().map(|(k, v)| (k.into(), v)).collect(),
                reading_frame: None,
                gene: None,
            },
        )
    }

    fn new(name: impl Into<String>, start: u32, stop: u32, kind: SiteKind) -> Self {
        Self {
            name: name.into(),
            start,
            stop,
            kind,
            hidden: false,
            occupants: 0,
            sealed: false,
        }
    }

    /// Tag the site with a reading frame.
    pub fn with_reading_frame(mut self, frame: u8) -> Self {
        match &mut self.kind {
            SiteKind::Binding { reading_frame, .. } | SiteKind::Release { reading_frame, .. } => {
                *reading_frame = Some(frame % 3);
            }
        }
        self
    }

    /// Tag a release site with the gene it terminates. No-op on binding sites.
    pub fn with_gene(mut self, name: impl Into<String>) -> Self {
        if let SiteKind::Release { gene, .. } = &mut self.kind {
            *gene = Some(name.into());
        }
        self
    }

    /// Site name (shared by every site of the same type).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// First position of the site.
    pub fn start(&self) -> u32 {
        self.start
    }

    /// One past the last position of the site.
    pub fn stop(&self) -> u32 {
        self.stop
    }

    /// Binding or release behaviour.
    pub fn kind(&self) -> &SiteKind {
        &self.kind
    }

    /// Whether elements can bind here.
    pub fn is_binding(&self) -> bool {
        matches!(self.kind, SiteKind::Binding { .. })
    }

    /// Reading frame tag, if any.
    pub fn reading_frame(&self) -> Option<u8> {
        match &self.kind {
            SiteKind::Binding { reading_frame, .. } | SiteKind::Release { reading_frame, .. } => {
                *reading_frame
            }
        }
    }

    /// Gene released at this site, if any.
    pub fn gene(&self) -> Option<&str> {
        match &self.kind {
            SiteKind::Release { gene, .. } => gene.as_deref(),
            SiteKind::Binding { .. } => None,
        }
    }

    /// Whether the site is currently unavailable.
    pub fn is_covered(&self) -> bool {
        self.hidden || self.occupants > 0 || self.sealed
    }

    /// Whether the polymer's mask hides this site.
    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Whether an RNase has permanently covered this site.
    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Whether `[start, stop)` overlaps this site.
    pub fn overlaps(&self, start: u32, stop: u32) -> bool {
        self.start < stop && start < self.stop
    }

    pub(crate) fn set_hidden(&mut self, hidden: bool) {
        self.hidden = hidden;
    }

    pub(crate) fn occupy(&mut self) {
        self.occupants += 1;
    }

    /// Drop one occupant. Returns `false` if the site had none.
    #[must_use]
    pub(crate) fn vacate(&mut self) -> bool {
        match self.occupants.checked_sub(1) {
            Some(occupants) => {
                self.occupants = occupants;
                true
            }
            None => false,
        }
    }

    pub(crate) fn seal(&mut self) {
        self.sealed = true;
    }

    pub(crate) fn validate(&self, polymer_start: u32, polymer_stop: u32) -> Result<(), PolymerError> {
        if self.start >= self.stop {
            return Err(PolymerError::InvalidFeature {
                reason: format!(
                    "site '{}' has empty interval [{}, {})",
                    self.name, self.start, self.stop
                ),
            });
        }
        if self.start < polymer_start || self.stop > polymer_stop {
            return Err(PolymerError::InvalidFeature {
                reason: format!(
                    "site '{}' [{}, {}) lies outside polymer [{}, {})",
                    self.name, self.start, self.stop, polymer_start, polymer_stop
                ),
            });
        }
        if let SiteKind::Release { efficiency, .. } = &self.kind {
            if let Some((species, value)) = efficiency
                .iter()
                .find(|(_, v)| !v.is_finite() || **v < 0.0 || **v > 1.0)
            {
                return Err(PolymerError::InvalidFeature {
                    reason: format!(
                        "site '{}' efficiency {value} for '{species}' is outside [0, 1]",
                        self.name
                    ),
                });
            }
        }
        Ok(())
    }
}

/// The not-yet-accessible region of a polymer, `[start, stop)`.
///
/// Species in `interactions` push the mask forward when they run into it;
/// everything else stalls at its edge.
#[derive(Clone, Debug, PartialEq)]
pub struct Mask {
    start: u32,
    stop: u32,
    interactions: IndexSet<String>,
}

impl Mask {
    /// Mask covering `[start, stop)`.
    pub fn new<I, S>(start: u32, stop: u32, interactions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            start: start.min(stop),
            stop,
            interactions: interactions.into_iter().map(Into::into).collect(),
        }
    }

    /// Empty mask sitting at `stop`.
    pub fn none(stop: u32) -> Self {
        Self::new(stop, stop, std::iter::empty::<String>())
    }

    /// Leading edge of the hidden region.
    pub fn start(&self) -> u32 {
        self.start
    }

    /// End of the hidden region.
    pub fn stop(&self) -> u32 {
        self.stop
    }

    /// Whether the mask has receded completely.
    pub fn is_empty(&self) -> bool {
        self.start >= self.stop
    }

    /// Whether `species` can push this mask.
    pub fn interacts(&self, species: &str) -> bool {
        self.interactions.contains(species)
    }

    /// Whether `[start, stop)` overlaps the hidden region.
    pub fn hides(&self, start: u32, stop: u32) -> bool {
        !self.is_empty() && self.start < stop && start < self.stop
    }

    pub(crate) fn recede(&mut self) {
        if self.start < self.stop {
            self.start += 1;
        }
    }
}

/// Static description of a polymerase or ribosome species.
#[derive(Clone, Debug, PartialEq)]
pub struct PolymeraseTemplate {
    /// Species name, also the name of its free-pool count.
    pub name: String,
    /// Footprint length in positions.
    pub footprint: u32,
    /// Base movement rate (steps per unit time).
    pub speed: f64,
}

impl PolymeraseTemplate {
    /// Describe a polymerase species.
    pub fn new(name: impl Into<String>, footprint: u32, speed: f64) -> Self {
        Self {
            name: name.into(),
            footprint,
            speed,
        }
    }

    /// Check footprint and speed.
    pub fn validate(&self) -> Result<(), PolymerError> {
        if self.footprint == 0 {
            return Err(PolymerError::InvalidFeature {
                reason: format!("polymerase '{}' has zero footprint", self.name),
            });
        }
        if !self.speed.is_finite() || self.speed < 0.0 {
            return Err(PolymerError::InvalidFeature {
                reason: format!(
                    "polymerase '{}' speed must be finite and >= 0, got {}",
                    self.name, self.speed
                ),
            });
        }
        Ok(())
    }

    /// Create an unbound element of this species.
    pub fn instantiate(&self, id: ElementId) -> MobileElement {
        MobileElement {
            id,
            name: self.name.clone(),
            start: 0,
            stop: self.footprint,
            footprint: self.footprint,
            speed: self.speed,
            reading_frame: None,
            polymer: None,
            covering: SmallVec::new(),
        }
    }
}

/// One bound polymerase or ribosome.
///
/// Its footprint `[start, stop)` only ever moves forward. `covering` lists
/// the sites its footprint overlaps.
#[derive(Clone, Debug, PartialEq)]
pub struct MobileElement {
    id: ElementId,
    name: String,
    start: u32,
    stop: u32,
    footprint: u32,
    speed: f64,
    reading_frame: Option<u8>,
    polymer: Option<PolymerId>,
    pub(crate) covering: SmallVec<[SiteId; 4]>,
}

impl MobileElement {
    /// Instance identity.
    pub fn id(&self) -> ElementId {
        self.id
    }

    /// Species name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Trailing edge.
    pub fn start(&self) -> u32 {
        self.start
    }

    /// One past the leading edge.
    pub fn stop(&self) -> u32 {
        self.stop
    }

    /// Footprint length.
    pub fn footprint(&self) -> u32 {
        self.footprint
    }

    /// Base movement rate.
    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Reading frame inherited from the binding site.
    pub fn reading_frame(&self) -> Option<u8> {
        self.reading_frame
    }

    /// Polymer this element is bound to.
    pub fn polymer(&self) -> Option<PolymerId> {
        self.polymer
    }

    /// Sites currently under the footprint.
    pub fn covering(&self) -> &[SiteId] {
        &self.covering
    }

    pub(crate) fn place(&mut self, start: u32, polymer: PolymerId, reading_frame: Option<u8>) {
        self.start = start;
        self.stop = start + self.footprint;
        self.polymer = Some(polymer);
        self.reading_frame = reading_frame;
    }

    pub(crate) fn advance(&mut self) {
        self.start += 1;
        self.stop += 1;
    }

    pub(crate) fn detach(&mut self) {
        self.polymer = None;
        self.covering.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn site_coverage_combines_mask_occupancy_and_seal() {
        let mut site = Site::binding("p1", 5, 15, [("ecolipol", 1.0)]);
        assert!(!site.is_covered());
        site.set_hidden(true);
        assert!(site.is_covered());
        site.set_hidden(false);
        site.occupy();
        site.occupy();
        assert!(site.vacate());
        assert!(site.is_covered());
        assert!(site.vacate());
        assert!(!site.is_covered());
        assert!(!site.vacate());
        site.seal();
        assert!(site.is_covered());
        assert!(site.is_sealed());
    }

    #[test]
    fn site_validation_rejects_bad_intervals_and_efficiencies() {
        assert!(Site::binding("p", 5, 5, [("x", 1.0)]).validate(0, 100).is_err());
        assert!(Site::binding("p", 90, 110, [("x", 1.0)]).validate(0, 100).is_err());
        assert!(Site::release("t", 10, 20, [("x", 1.5)]).validate(0, 100).is_err());
        assert!(Site::release("t", 10, 20, [("x", 0.6)]).validate(0, 100).is_ok());
    }

    #[test]
    fn mask_hides_half_open_overlap() {
        let mask = Mask::new(50, 100, ["ecolipol"]);
        assert!(mask.hides(45, 51));
        assert!(!mask.hides(40, 50));
        assert!(mask.interacts("ecolipol"));
        assert!(!mask.interacts("ribosome"));
        assert!(!Mask::none(100).hides(0, 100));
    }

    #[test]
    fn template_validation() {
        assert!(PolymeraseTemplate::new("rnap", 0, 10.0).validate().is_err());
        assert!(PolymeraseTemplate::new("rnap", 10, -1.0).validate().is_err());
        let t = PolymeraseTemplate::new("rnap", 10, 30.0);
        assert!(t.validate().is_ok());
        let el = t.instantiate(ElementId(1));
        assert_eq!(el.stop() - el.start(), 10);
        assert_eq!(el.polymer(), None);
    }
}
