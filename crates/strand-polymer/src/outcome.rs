//! Records returned by polymer operations for the driver to act on.
//!
//! A polymer never reaches into other polymers or the reaction pool. Anything
//! that crosses that boundary (a new transcript, a transcript mask to move,
//! a released element) comes back to the caller as one of these values.

use strand_core::{ElementId, PolymerId};

use crate::polymer::Polymer;

/// Result of a successful [`Polymer::bind`].
#[derive(Debug)]
pub struct BindOutcome {
    /// Table slot the element landed in.
    pub slot: usize,
    /// The bound element.
    pub element: ElementId,
    /// Transcript synthesized by the element, for genome polymers.
    pub transcript: Option<Polymer>,
}

/// What stopped an element from moving.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Blocker {
    /// The next element downstream.
    Element(ElementId),
    /// The polymer's mask.
    Mask,
}

/// An element leaving its polymer.
#[derive(Clone, Debug, PartialEq)]
pub struct Termination {
    /// Polymer the element left.
    pub polymer: PolymerId,
    /// The released element.
    pub element: ElementId,
    /// Species returned to the free pool.
    pub species: String,
    /// Genomic position at which it left.
    pub position: u32,
    /// Gene whose product is released, if any.
    pub gene: Option<String>,
    /// Polymer the element was synthesizing.
    pub attached: Option<PolymerId>,
}

/// Result of one [`Polymer::execute`] step.
#[derive(Clone, Debug, PartialEq)]
pub enum MoveOutcome {
    /// The element moved one position.
    Advanced {
        /// The element that moved.
        element: ElementId,
        /// Polymer it is synthesizing.
        attached: Option<PolymerId>,
        /// New trailing edge.
        trailing_edge: u32,
    },
    /// The element was selected but could not move.
    Blocked {
        /// The element that stalled.
        element: ElementId,
        /// What it ran into.
        by: Blocker,
    },
    /// The element detached.
    Terminated(Termination),
}

impl MoveOutcome {
    /// Id of the element the step acted on.
    pub fn element(&self) -> ElementId {
        match self {
            Self::Advanced { element, .. } | Self::Blocked { element, .. } => *element,
            Self::Terminated(t) => t.element,
        }
    }
}
