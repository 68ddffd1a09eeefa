//! Genome construction and transcript synthesis.
//!
//! A [`Genome`] is assembled with the `add_*` builders and turned into a
//! [`Polymer`] by [`Genome::build`]. Gene, RBS and RNase features do not
//! live on the genome itself: they go into a [`TranscriptTemplate`] from
//! which every transcript is cut when a polymerase binds a promoter.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::PolymerError;
use crate::feature::{Mask, PolymeraseTemplate, Site, SiteKind};
use crate::polymer::{Polymer, SynthesisPolicy};

/// Species that binds ribosome binding sites and reads stop codons.
pub const RIBOSOME: &str = "ribosome";

/// Name shared by every stop-codon release site.
pub const STOP_CODON: &str = "stop_codon";

/// Species of the RNase elements that degrade transcripts.
pub const RNASE: &str = "__rnase";

/// Footprint of an RNase element. RNase sites must be at least this long.
pub const RNASE_FOOTPRINT: u32 = 10;

/// RNase speed used unless a genome sets its own.
pub const DEFAULT_RNASE_SPEED: f64 = 20.0;

/// Binding-site name of the RNase sites on transcripts of `genome`.
pub fn rnase_site_name(genome: &str) -> String {
    format!("__rnase_site_{genome}")
}

/// Transcript features cut from a genome when a polymerase binds.
#[derive(Clone, Debug)]
pub struct TranscriptTemplate {
    genome: String,
    stop: u32,
    sites: Vec<Site>,
    weights: Arc<[f64]>,
}

impl TranscriptTemplate {
    /// Build the transcript synthesized by a polymerase bound at `start`.
    ///
    /// The transcript spans `[start, genome stop)` in genomic coordinates
    /// and carries every template site at or after `start`. It is fully
    /// masked; the synthesizing polymerase pulls the mask back as it moves.
    pub fn build_transcript(&self, start: u32) -> Result<Polymer, PolymerError> {
        let sites = self
            .sites
            .iter()
            .filter(|site| site.start() >= start)
            .cloned()
            .collect();
        let mask = Mask::new(start, self.stop, std::iter::empty::<String>());
        Ok(
            Polymer::new(format!("{}_transcript", self.genome), start, self.stop, sites, mask)?
                .with_weights(Arc::clone(&self.weights))
                .with_policy(SynthesisPolicy::Transcript),
        )
    }

    /// Template sites in insertion order.
    pub fn sites(&self) -> &[Site] {
        &self.sites
    }
}

/// Builder for a genome polymer spanning `[0, length)`.
#[derive(Clone, Debug)]
pub struct Genome {
    name: String,
    length: u32,
    sites: Vec<Site>,
    transcript_sites: Vec<Site>,
    mask: Option<Mask>,
    weights: Vec<f64>,
    degradation_rate: f64,
    rnase_speed: f64,
    bindings: IndexMap<String, IndexMap<String, f64>>,
}

impl Genome {
    /// Empty genome of the given length.
    pub fn new(name: impl Into<String>, length: u32) -> Self {
        Self {
            name: name.into(),
            length,
            sites: Vec::new(),
            transcript_sites: Vec::new(),
            mask: None,
            weights: Vec::new(),
            degradation_rate: 0.0,
            rnase_speed: DEFAULT_RNASE_SPEED,
            bindings: IndexMap::new(),
        }
    }

    /// Set the rate constant of transcript degradation at RNase sites.
    pub fn with_transcript_degradation_rate(mut self, rate: f64) -> Self {
        self.degradation_rate = rate;
        self
    }

    /// Set how fast RNases move along this genome's transcripts.
    pub fn with_rnase_speed(mut self, speed: f64) -> Self {
        self.rnase_speed = speed;
        self
    }

    /// Hide `[start, length)` until an element in `interactions` pushes
    /// into it.
    pub fn add_mask<I, S>(&mut self, start: u32, interactions: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.mask = Some(Mask::new(start, self.length, interactions));
        self
    }

    /// Add a promoter binding the species in `interactions` with the given
    /// affinities.
    pub fn add_promoter<I, S>(&mut self, name: &str, start: u32, stop: u32, interactions: I) -> &mut Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let site = Site::binding(name, start, stop, interactions);
        if let SiteKind::Binding { interactions, .. } = site.kind() {
            self.bindings
                .entry(name.to_string())
                .or_default()
                .extend(interactions.iter().map(|(k, v)| (k.clone(), *v)));
        }
        self.sites.push(site);
        self
    }

    /// Add a terminator with per-species termination probabilities.
    pub fn add_terminator<I, S>(&mut self, name: &str, start: u32, stop: u32, efficiency: I) -> &mut Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        self.sites.push(Site::release(name, start, stop, efficiency));
        self
    }

    /// Add a gene `[start, stop)` with its ribosome binding site.
    ///
    /// Transcripts get an RBS named `<name>_rbs` and a stop codon over the
    /// gene's last position, both in reading frame `start % 3`.
    pub fn add_gene(
        &mut self,
        name: &str,
        start: u32,
        stop: u32,
        rbs_start: u32,
        rbs_stop: u32,
        rbs_strength: f64,
    ) -> &mut Self {
        let frame = (start % 3) as u8;
        let rbs = format!("{name}_rbs");
        self.transcript_sites.push(
            Site::binding(rbs.as_str(), rbs_start, rbs_stop, [(RIBOSOME, rbs_strength)])
                .with_reading_frame(frame),
        );
        self.transcript_sites.push(
            Site::release(STOP_CODON, stop.saturating_sub(1), stop, [(RIBOSOME, 1.0)])
                .with_reading_frame(frame)
                .with_gene(name),
        );
        self.bindings
            .entry(rbs)
            .or_default()
            .insert(RIBOSOME.to_string(), rbs_strength);
        self
    }

    /// Add an RNase site to every transcript covering `[start, stop)`.
    ///
    /// The site must be at least [`RNASE_FOOTPRINT`] long.
    pub fn add_rnase_site(&mut self, start: u32, stop: u32) -> &mut Self {
        let name = self.rnase_site_name();
        self.transcript_sites
            .push(Site::binding(name, start, stop, [(RNASE, 1.0)]));
        self
    }

    /// Per-position speed multipliers for ribosomes on transcripts.
    pub fn add_weights(&mut self, weights: Vec<f64>) -> &mut Self {
        self.weights = weights;
        self
    }

    /// Binding-site name → species → affinity, for promoters and RBSs.
    pub fn bindings(&self) -> &IndexMap<String, IndexMap<String, f64>> {
        &self.bindings
    }

    /// Genome name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Genome length.
    pub fn length(&self) -> u32 {
        self.length
    }

    /// Rate constant of transcript degradation.
    pub fn transcript_degradation_rate(&self) -> f64 {
        self.degradation_rate
    }

    /// The RNase species that binds this genome's transcripts.
    pub fn rnase_template(&self) -> PolymeraseTemplate {
        PolymeraseTemplate::new(RNASE, RNASE_FOOTPRINT, self.rnase_speed)
    }

    /// Name of the RNase sites on this genome's transcripts.
    pub fn rnase_site_name(&self) -> String {
        rnase_site_name(&self.name)
    }

    /// Whether any RNase site was added.
    pub fn has_rnase_sites(&self) -> bool {
        let name = self.rnase_site_name();
        self.transcript_sites.iter().any(|s| s.name() == name)
    }

    /// Validate every feature and build the genome polymer.
    pub fn build(&self) -> Result<Polymer, PolymerError> {
        if !self.degradation_rate.is_finite() || self.degradation_rate < 0.0 {
            return Err(PolymerError::InvalidFeature {
                reason: format!(
                    "genome '{}' degradation rate must be finite and >= 0, got {}",
                    self.name, self.degradation_rate
                ),
            });
        }
        if let Some(w) = self.weights.iter().find(|w| !w.is_finite() || **w < 0.0) {
            return Err(PolymerError::InvalidFeature {
                reason: format!("genome '{}' has invalid weight {w}", self.name),
            });
        }
        self.rnase_template().validate()?;
        let rnase = self.rnase_site_name();
        for site in &self.transcript_sites {
            site.validate(0, self.length)?;
            if site.name() == rnase && site.stop() - site.start() < RNASE_FOOTPRINT {
                return Err(PolymerError::InvalidFeature {
                    reason: format!(
                        "RNase site [{}, {}) on genome '{}' is shorter than the RNase footprint {RNASE_FOOTPRINT}",
                        site.start(),
                        site.stop(),
                        self.name
                    ),
                });
            }
        }
        let template = TranscriptTemplate {
            genome: self.name.clone(),
            stop: self.length,
            sites: self.transcript_sites.clone(),
            weights: Arc::from(self.weights.as_slice()),
        };
        let mask = self.mask.clone().unwrap_or_else(|| Mask::none(self.length));
        Ok(
            Polymer::new(self.name.as_str(), 0, self.length, self.sites.clone(), mask)?
                .with_policy(SynthesisPolicy::Genome(Box::new(template))),
        )
    }
}
