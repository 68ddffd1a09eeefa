//! Strongly-typed identifiers.
//!
//! Every cross-reference in the simulator is an integer handle rather than
//! a pointer: polymers live in an arena indexed by [`PolymerId`], reactions
//! in the driver's pool indexed by [`ReactionId`], and species in the
//! registry indexed by [`SpeciesId`].

use std::fmt;

/// Index of a species in the [`SpeciesRegistry`](crate::SpeciesRegistry).
///
/// Assigned in first-seen order and stable for the lifetime of the
/// registry (until [`reset`](crate::SpeciesRegistry::reset)).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpeciesId(pub u32);

impl fmt::Display for SpeciesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for SpeciesId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Handle of a polymer (genome or transcript) in the polymer arena.
///
/// Handles are never reused within a run, so a handle held by a retired
/// polymer's former partners resolves to nothing rather than to a
/// different polymer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PolymerId(pub u32);

impl fmt::Display for PolymerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for PolymerId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Index of a reaction in the simulation's reaction pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReactionId(pub u32);

impl fmt::Display for ReactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ReactionId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Index of a site (promoter, terminator, RBS, stop codon) within one
/// polymer's site list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SiteId(pub u32);

impl fmt::Display for SiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for SiteId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Unique identity of one mobile element instance (a single bound
/// polymerase or ribosome).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub u64);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ElementId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}
