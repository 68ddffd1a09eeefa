//! The polymer state machine.
//!
//! A [`Polymer`] owns its sites, its mask and the table of bound mobile
//! elements. Elements move one position per step. A move only ever touches
//! the element's own footprint boundary: sites the trailing edge has left
//! are vacated, sites under the new leading position are occupied, and the
//! release sites ending at the new leading edge are sampled for
//! termination.
//!
//! # Coverage bookkeeping
//!
//! Every site is covered while the mask hides it, while any element's
//! footprint overlaps it, or once it is sealed. The polymer keeps a
//! per-name count of uncovered sites, and mirrors the count for binding
//! sites into the [`SpeciesRegistry`] so that binding propensities can read
//! it without touching the polymer.
//!
//! # Degradation
//!
//! An [`RNASE`] element binds like any other but seals every site upstream
//! of its leading edge, and each site its leading edge reaches afterwards.
//! It cannot push a mask: on reaching one it seals whatever is left and
//! detaches. The polymer counts as degraded once every site is sealed.

use std::sync::Arc;

use indexmap::IndexMap;
use smallvec::SmallVec;
use strand_core::{ElementId, PolymerId, SimRng, SiteId, SpeciesRegistry};
use tracing::debug;

use crate::error::PolymerError;
use crate::feature::{Mask, MobileElement, Site, SiteKind};
use crate::genome::{TranscriptTemplate, RNASE};
use crate::outcome::{BindOutcome, Blocker, MoveOutcome, Termination};
use crate::site_index::SiteIndex;
use crate::table::MobileElementTable;

/// What a polymer synthesizes as its elements move.
#[derive(Clone, Debug)]
pub enum SynthesisPolicy {
    /// A bare polymer.
    Inert,
    /// A transcript. Its mask is pulled back by the polymerase
    /// synthesizing it on the genome.
    Transcript,
    /// A genome. Binding a promoter builds a transcript from the template.
    Genome(Box<TranscriptTemplate>),
}

/// A genome, transcript or bare polymer with its bound mobile elements.
#[derive(Clone, Debug)]
pub struct Polymer {
    id: Option<PolymerId>,
    name: String,
    start: u32,
    stop: u32,
    sites: Vec<Site>,
    index: SiteIndex,
    table: MobileElementTable,
    mask: Mask,
    uncovered: IndexMap<String, u32>,
    sealed: usize,
    degraded: bool,
    policy: SynthesisPolicy,
}

impl Polymer {
    /// Build a polymer spanning `[start, stop)`.
    ///
    /// Every site must lie inside the polymer and the mask may not extend
    /// past it.
    pub fn new(
        name: impl Into<String>,
        start: u32,
        stop: u32,
        sites: Vec<Site>,
        mask: Mask,
    ) -> Result<Self, PolymerError> {
        let name = name.into();
        if start >= stop {
            return Err(PolymerError::InvalidFeature {
                reason: format!("polymer '{name}' has empty interval [{start}, {stop})"),
            });
        }
        for site in &sites {
            site.validate(start, stop)?;
        }
        if mask.start() < start || mask.stop() > stop {
            return Err(PolymerError::InvalidFeature {
                reason: format!(
                    "mask [{}, {}) lies outside polymer '{name}' [{start}, {stop})",
                    mask.start(),
                    mask.stop()
                ),
            });
        }
        let index = SiteIndex::build(&sites);
        Ok(Self {
            id: None,
            name,
            start,
            stop,
            sites,
            index,
            table: MobileElementTable::default(),
            mask,
            uncovered: IndexMap::new(),
            sealed: 0,
            degraded: false,
            policy: SynthesisPolicy::Inert,
        })
    }

    /// Attach per-position speed multipliers. Must be set before binding.
    pub fn with_weights(mut self, weights: impl Into<Arc<[f64]>>) -> Self {
        self.table = MobileElementTable::new(weights.into());
        self
    }

    pub(crate) fn with_policy(mut self, policy: SynthesisPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Give the polymer its handle and publish its initial coverage.
    ///
    /// Sites the mask overlaps start hidden. Each uncovered binding site
    /// adds one to its registry count, and every binding site name is
    /// indexed to this polymer so binding reactions can find it. Call once.
    pub fn initialize(
        &mut self,
        id: PolymerId,
        registry: &mut SpeciesRegistry,
    ) -> Result<(), PolymerError> {
        self.id = Some(id);
        self.uncovered.clear();
        for site in &mut self.sites {
            site.set_hidden(self.mask.hides(site.start(), site.stop()));
            let count = self.uncovered.entry(site.name().to_string()).or_insert(0);
            if !site.is_covered() {
                *count += 1;
                if site.is_binding() {
                    registry.increment(site.name(), 1)?;
                }
            }
            if site.is_binding() {
                registry.register_polymer(site.name(), id);
            }
        }
        Ok(())
    }

    fn handle(&self) -> Result<PolymerId, PolymerError> {
        self.id.ok_or_else(|| PolymerError::Uninitialized {
            polymer: self.name.clone(),
        })
    }

    // ── Binding ──────────────────────────────────────────────────

    /// Bind `element` to a uniformly chosen uncovered site named `site_name`.
    ///
    /// The element is placed at the site's start, takes the site's reading
    /// frame, and covers every site under its footprint. An RNase also
    /// seals everything upstream of its leading edge. A genome also
    /// builds the transcript the element will synthesize; the caller
    /// registers it and pairs it with the element via
    /// [`set_attached`](Self::set_attached).
    pub fn bind(
        &mut self,
        mut element: MobileElement,
        site_name: &str,
        registry: &mut SpeciesRegistry,
        rng: &mut SimRng,
    ) -> Result<BindOutcome, PolymerError> {
        let id = self.handle()?;
        let candidates: SmallVec<[usize; 4]> = self
            .sites
            .iter()
            .enumerate()
            .filter(|(_, s)| s.name() == site_name && s.is_binding() && !s.is_covered())
            .map(|(i, _)| i)
            .collect();
        let pick = rng
            .below(candidates.len())
            .ok_or_else(|| PolymerError::NoAvailableSite {
                site: site_name.to_string(),
                polymer: self.name.clone(),
            })?;
        let site = &self.sites[candidates[pick]];
        let reading_frame = match site.kind() {
            SiteKind::Binding {
                interactions,
                reading_frame,
            } if interactions.contains_key(element.name()) => *reading_frame,
            _ => {
                return Err(PolymerError::NoInteraction {
                    element: element.name().to_string(),
                    site: site_name.to_string(),
                })
            }
        };

        let position = site.start();
        let stop = position.saturating_add(element.footprint());
        let slot = self.table.insertion_point(position);
        let blocked = stop > self.stop
            || self.mask.hides(position, stop)
            || slot
                .checked_sub(1)
                .and_then(|i| self.table.get(i))
                .is_some_and(|prev| prev.stop() > position)
            || self.table.get(slot).is_some_and(|next| next.start() < stop);
        if blocked {
            return Err(PolymerError::BindCollision {
                element: element.name().to_string(),
                position,
                polymer: self.name.clone(),
            });
        }

        element.place(position, id, reading_frame);
        let covering: SmallVec<[SiteId; 4]> = self.index.overlapping(position, stop).collect();
        for &site in &covering {
            self.cover_site(site, registry)?;
        }
        if element.name() == RNASE {
            let upstream: SmallVec<[SiteId; 8]> = (0..self.sites.len())
                .filter(|&i| self.sites[i].start() < stop)
                .map(|i| SiteId(i as u32))
                .collect();
            for site in upstream {
                self.seal_site(site, registry)?;
            }
        }
        element.covering = covering;
        let element_id = element.id();
        debug!(
            polymer = %self.name,
            species = element.name(),
            position,
            "element bound"
        );
        let slot = self.table.insert(element, None);

        let transcript = match &self.policy {
            SynthesisPolicy::Genome(template) => Some(template.build_transcript(position)?),
            SynthesisPolicy::Inert | SynthesisPolicy::Transcript => None,
        };
        Ok(BindOutcome {
            slot,
            element: element_id,
            transcript,
        })
    }

    /// Pair a bound element with the polymer it synthesizes.
    pub fn set_attached(&mut self, element: ElementId, polymer: PolymerId) -> bool {
        match self.table.position_of(element) {
            Some(slot) => self.table.set_attached(slot, polymer),
            None => false,
        }
    }

    // ── Movement ─────────────────────────────────────────────────

    /// Move one propensity-weighted element by one position.
    pub fn execute(
        &mut self,
        registry: &mut SpeciesRegistry,
        rng: &mut SimRng,
    ) -> Result<MoveOutcome, PolymerError> {
        let index = self
            .table
            .choose(rng)
            .ok_or_else(|| PolymerError::NoMobileElements {
                polymer: self.name.clone(),
            })?;
        self.move_element(index, registry, rng)
    }

    /// Try to move the element in slot `index` one position downstream.
    ///
    /// An element about to run off the end detaches at the polymer's stop.
    /// An element that would overlap the element ahead stays put. One that
    /// would enter the mask pushes it if its species interacts with the
    /// mask and stays put otherwise, except an RNase, which degrades the
    /// rest of the polymer and detaches at the mask edge.
    pub fn move_element(
        &mut self,
        index: usize,
        registry: &mut SpeciesRegistry,
        rng: &mut SimRng,
    ) -> Result<MoveOutcome, PolymerError> {
        let element = self
            .table
            .get(index)
            .ok_or_else(|| PolymerError::UnknownSlot {
                polymer: self.name.clone(),
                slot: index,
            })?;
        let element_id = element.id();
        let (new_start, new_stop) = (element.start() + 1, element.stop() + 1);
        let pushes_mask = self.mask.interacts(element.name());
        let rnase = element.name() == RNASE;

        if new_stop > self.stop {
            return self.terminate(index, self.stop, None, registry);
        }
        if let Some(ahead) = self.table.get(index + 1) {
            if ahead.start() < new_stop {
                return Ok(MoveOutcome::Blocked {
                    element: element_id,
                    by: Blocker::Element(ahead.id()),
                });
            }
        }
        if self.mask.hides(new_start, new_stop) {
            if rnase {
                self.mark_degraded(registry)?;
                return self.terminate(index, new_stop - 1, None, registry);
            }
            if !pushes_mask {
                return Ok(MoveOutcome::Blocked {
                    element: element_id,
                    by: Blocker::Mask,
                });
            }
            self.shift_mask(registry)?;
        }

        let mut covering = match self.table.get_mut(index) {
            Some(element) => {
                element.advance();
                std::mem::take(&mut element.covering)
            }
            None => SmallVec::new(),
        };
        self.check_behind(&mut covering, new_start, registry)?;
        self.check_ahead(&mut covering, new_stop, rnase, registry)?;
        if let Some(element) = self.table.get_mut(index) {
            element.covering = covering;
        }
        self.table.update_propensity(index);

        if let Some((position, gene)) = self.sample_termination(index, new_stop, rng) {
            return self.terminate(index, position, gene, registry);
        }
        Ok(MoveOutcome::Advanced {
            element: element_id,
            attached: self.table.attached(index),
            trailing_edge: new_start,
        })
    }

    /// Vacate the sites the trailing edge has left.
    fn check_behind(
        &mut self,
        covering: &mut SmallVec<[SiteId; 4]>,
        new_start: u32,
        registry: &mut SpeciesRegistry,
    ) -> Result<(), PolymerError> {
        let left: SmallVec<[SiteId; 4]> = covering
            .iter()
            .copied()
            .filter(|s| self.sites[s.0 as usize].stop() <= new_start)
            .collect();
        covering.retain(|s| !left.contains(s));
        for site in left {
            self.uncover_site(site, registry)?;
        }
        Ok(())
    }

    /// Occupy the sites under the new leading position, sealing them too
    /// when the element is an RNase.
    fn check_ahead(
        &mut self,
        covering: &mut SmallVec<[SiteId; 4]>,
        new_stop: u32,
        seal: bool,
        registry: &mut SpeciesRegistry,
    ) -> Result<(), PolymerError> {
        let entered: SmallVec<[SiteId; 4]> = self
            .index
            .overlapping(new_stop - 1, new_stop)
            .filter(|s| !covering.contains(s))
            .collect();
        for &site in &entered {
            self.cover_site(site, registry)?;
            if seal {
                self.seal_site(site, registry)?;
            }
        }
        covering.extend(entered);
        Ok(())
    }

    /// Sample the release sites whose end the element's leading edge has
    /// just reached. Each site is sampled once per element.
    fn sample_termination(
        &self,
        index: usize,
        new_stop: u32,
        rng: &mut SimRng,
    ) -> Option<(u32, Option<String>)> {
        let element = self.table.get(index)?;
        for site in self.index.ending_at(new_stop) {
            let site = &self.sites[site.0 as usize];
            let SiteKind::Release {
                efficiency,
                reading_frame,
                gene,
            } = site.kind()
            else {
                continue;
            };
            let Some(&probability) = efficiency.get(element.name()) else {
                continue;
            };
            if reading_frame.is_some() && *reading_frame != element.reading_frame() {
                continue;
            }
            if rng.uniform() < probability {
                return Some((site.stop(), gene.clone()));
            }
        }
        None
    }

    /// Detach the element in slot `index` at `position`.
    pub fn terminate(
        &mut self,
        index: usize,
        position: u32,
        gene: Option<String>,
        registry: &mut SpeciesRegistry,
    ) -> Result<MoveOutcome, PolymerError> {
        let polymer = self.handle()?;
        let (mut element, attached) =
            self.table
                .delete(index)
                .ok_or_else(|| PolymerError::UnknownSlot {
                    polymer: self.name.clone(),
                    slot: index,
                })?;
        for site in std::mem::take(&mut element.covering) {
            self.uncover_site(site, registry)?;
        }
        element.detach();
        debug!(
            polymer = %self.name,
            species = element.name(),
            position,
            gene = gene.as_deref().unwrap_or(""),
            "element terminated"
        );
        Ok(MoveOutcome::Terminated(Termination {
            polymer,
            element: element.id(),
            species: element.name().to_string(),
            position,
            gene,
            attached,
        }))
    }

    // ── Mask ─────────────────────────────────────────────────────

    /// Pull the mask back by one position and reveal the sites it no
    /// longer overlaps.
    ///
    /// Sites ending at the new mask start come out from under it. Once the
    /// mask is empty, so does every site that reached past its end.
    pub fn shift_mask(&mut self, registry: &mut SpeciesRegistry) -> Result<(), PolymerError> {
        if self.mask.is_empty() {
            return Ok(());
        }
        self.mask.recede();
        let revealed: SmallVec<[SiteId; 4]> = if self.mask.is_empty() {
            (0..self.sites.len())
                .filter(|&i| self.sites[i].is_hidden())
                .map(|i| SiteId(i as u32))
                .collect()
        } else {
            self.index.ending_at(self.mask.start()).collect()
        };
        for site in revealed {
            let site = &mut self.sites[site.0 as usize];
            if !site.is_hidden() || self.mask.hides(site.start(), site.stop()) {
                continue;
            }
            site.set_hidden(false);
            if !site.is_covered() {
                log_uncover(&mut self.uncovered, site, registry)?;
            }
        }
        Ok(())
    }

    /// Shift the mask until it starts at `position` or has receded fully.
    pub fn advance_mask_to(
        &mut self,
        position: u32,
        registry: &mut SpeciesRegistry,
    ) -> Result<(), PolymerError> {
        while !self.mask.is_empty() && self.mask.start() < position {
            self.shift_mask(registry)?;
        }
        Ok(())
    }

    // ── Lifetime ─────────────────────────────────────────────────

    /// Seal every site that is not sealed yet. Bound elements keep moving
    /// and can still terminate, but nothing new can bind.
    pub fn mark_degraded(&mut self, registry: &mut SpeciesRegistry) -> Result<(), PolymerError> {
        for site in 0..self.sites.len() {
            self.seal_site(SiteId(site as u32), registry)?;
        }
        self.degraded = true;
        Ok(())
    }

    fn seal_site(&mut self, site: SiteId, registry: &mut SpeciesRegistry) -> Result<(), PolymerError> {
        let site = &mut self.sites[site.0 as usize];
        if site.is_sealed() {
            return Ok(());
        }
        let was_covered = site.is_covered();
        site.seal();
        if !was_covered {
            log_cover(&mut self.uncovered, &self.name, site, registry)?;
        }
        self.sealed += 1;
        if self.sealed == self.sites.len() && !self.degraded {
            self.degraded = true;
            debug!(polymer = %self.name, "polymer degraded");
        }
        Ok(())
    }

    /// Withdraw the polymer from the registry before it is dropped.
    ///
    /// Fails with [`PolymerError::ElementsAttached`] while any element is
    /// still bound.
    pub fn retire(&mut self, registry: &mut SpeciesRegistry) -> Result<(), PolymerError> {
        if !self.table.is_empty() {
            return Err(PolymerError::ElementsAttached {
                polymer: self.name.clone(),
                count: self.table.len(),
            });
        }
        let id = self.handle()?;
        self.mark_degraded(registry)?;
        registry.unregister_polymer(id);
        debug!(polymer = %self.name, id = %id, "polymer retired");
        Ok(())
    }

    // ── Coverage ─────────────────────────────────────────────────

    fn cover_site(
        &mut self,
        site: SiteId,
        registry: &mut SpeciesRegistry,
    ) -> Result<(), PolymerError> {
        let site = &mut self.sites[site.0 as usize];
        let was_covered = site.is_covered();
        site.occupy();
        if was_covered {
            return Ok(());
        }
        log_cover(&mut self.uncovered, &self.name, site, registry)
    }

    fn uncover_site(
        &mut self,
        site: SiteId,
        registry: &mut SpeciesRegistry,
    ) -> Result<(), PolymerError> {
        let site = &mut self.sites[site.0 as usize];
        if !site.vacate() {
            return Err(PolymerError::CoverageUnderflow {
                site: site.name().to_string(),
                polymer: self.name.clone(),
            });
        }
        if site.is_covered() {
            return Ok(());
        }
        log_uncover(&mut self.uncovered, site, registry)
    }

    // ── Accessors ────────────────────────────────────────────────

    /// Handle assigned at initialization.
    pub fn id(&self) -> Option<PolymerId> {
        self.id
    }

    /// Polymer name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// First position.
    pub fn start(&self) -> u32 {
        self.start
    }

    /// One past the last position.
    pub fn stop(&self) -> u32 {
        self.stop
    }

    /// Number of uncovered sites named `name`.
    pub fn uncovered(&self, name: &str) -> u32 {
        self.uncovered.get(name).copied().unwrap_or(0)
    }

    /// Total movement propensity of the bound elements.
    pub fn prop_sum(&self) -> f64 {
        self.table.prop_sum()
    }

    /// All sites, indexed by [`SiteId`].
    pub fn sites(&self) -> &[Site] {
        &self.sites
    }

    /// Site with the given id.
    pub fn site(&self, id: SiteId) -> Option<&Site> {
        self.sites.get(id.0 as usize)
    }

    /// The bound-element table.
    pub fn table(&self) -> &MobileElementTable {
        &self.table
    }

    /// Bound elements in position order.
    pub fn elements(&self) -> impl Iterator<Item = &MobileElement> + '_ {
        self.table.iter()
    }

    /// Current mask.
    pub fn mask(&self) -> &Mask {
        &self.mask
    }

    /// Synthesis policy chosen at construction.
    pub fn policy(&self) -> &SynthesisPolicy {
        &self.policy
    }

    /// Whether this polymer is a transcript.
    pub fn is_transcript(&self) -> bool {
        matches!(self.policy, SynthesisPolicy::Transcript)
    }

    /// Number of sealed sites.
    pub fn sealed_sites(&self) -> usize {
        self.sealed
    }

    /// Whether every site has been sealed.
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }
}

fn log_cover(
    uncovered: &mut IndexMap<String, u32>,
    polymer: &str,
    site: &Site,
    registry: &mut SpeciesRegistry,
) -> Result<(), PolymerError> {
    let count = uncovered
        .get_mut(site.name())
        .filter(|count| **count > 0)
        .ok_or_else(|| PolymerError::CoverageUnderflow {
            site: site.name().to_string(),
            polymer: polymer.to_string(),
        })?;
    *count -= 1;
    if site.is_binding() {
        registry.increment(site.name(), -1)?;
    }
    Ok(())
}

fn log_uncover(
    uncovered: &mut IndexMap<String, u32>,
    site: &Site,
    registry: &mut SpeciesRegistry,
) -> Result<(), PolymerError> {
    *uncovered.entry(site.name().to_string()).or_insert(0) += 1;
    if site.is_binding() {
        registry.increment(site.name(), 1)?;
    }
    Ok(())
}
