//! Polymer-level error types.

use strand_core::RegistryError;
use thiserror::Error;

/// Errors raised by polymer operations.
///
/// `NoAvailableSite`, `NoInteraction` and `BindCollision` are caller errors
/// (a bind the propensities said was impossible); `ElementsAttached` and
/// `CoverageUnderflow` indicate a bookkeeping bug.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum PolymerError {
    /// No uncovered site named `site` exists on the polymer.
    #[error("no uncovered site '{site}' on polymer '{polymer}'")]
    NoAvailableSite {
        /// Requested site name.
        site: String,
        /// Polymer name.
        polymer: String,
    },
    /// The chosen site has no interaction entry for the element species.
    #[error("'{element}' does not interact with site '{site}'")]
    NoInteraction {
        /// Element species.
        element: String,
        /// Site name.
        site: String,
    },
    /// The element's footprint would overlap the mask, a neighbour or the
    /// polymer end at the moment of binding.
    #[error("'{element}' bound at {position} would overlap an obstacle on polymer '{polymer}'")]
    BindCollision {
        /// Element species.
        element: String,
        /// Attempted binding position.
        position: u32,
        /// Polymer name.
        polymer: String,
    },
    /// The polymer has not been given a handle yet.
    #[error("polymer '{polymer}' used before initialization")]
    Uninitialized {
        /// Polymer name.
        polymer: String,
    },
    /// `execute()` was called on a polymer with nothing to move.
    #[error("polymer '{polymer}' has no movable elements")]
    NoMobileElements {
        /// Polymer name.
        polymer: String,
    },
    /// No element occupies the given table slot.
    #[error("polymer '{polymer}' has no element in slot {slot}")]
    UnknownSlot {
        /// Polymer name.
        polymer: String,
        /// Requested slot.
        slot: usize,
    },
    /// The polymer still carries mobile elements and cannot be retired.
    #[error("polymer '{polymer}' still has {count} attached elements")]
    ElementsAttached {
        /// Polymer name.
        polymer: String,
        /// Number of attached elements.
        count: usize,
    },
    /// The uncovered-count cache would go negative.
    #[error("uncovered count for '{site}' on polymer '{polymer}' underflowed")]
    CoverageUnderflow {
        /// Site name.
        site: String,
        /// Polymer name.
        polymer: String,
    },
    /// A feature failed structural validation.
    #[error("invalid feature: {reason}")]
    InvalidFeature {
        /// What was wrong.
        reason: String,
    },
    /// The species registry rejected an update.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}
