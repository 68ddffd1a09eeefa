//! Counters collected over a run.

use crate::reaction::ReactionKind;

/// What happened during a run.
///
/// Firings are counted per [`ReactionKind`]. Bridge firings are further
/// split by what the selected element did.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunMetrics {
    /// SSA steps executed.
    pub steps: u64,
    /// Species reaction firings.
    pub species_reactions: u64,
    /// Bind firings.
    pub binds: u64,
    /// Bridge firings.
    pub bridge_firings: u64,
    /// Bridge firings that moved an element.
    pub advanced: u64,
    /// Bridge firings whose element could not move.
    pub blocked: u64,
    /// Elements that detached.
    pub terminations: u64,
    /// RNases bound to transcripts.
    pub degradations: u64,
    /// Transcripts registered.
    pub transcripts_created: u64,
    /// Transcripts removed from the arena.
    pub transcripts_retired: u64,
    /// Simulated time of the last event.
    pub final_time: f64,
}

impl RunMetrics {
    /// Count one firing of a reaction of the given kind.
    pub fn record(&mut self, kind: ReactionKind) {
        self.steps += 1;
        match kind {
            ReactionKind::Species => self.species_reactions += 1,
            ReactionKind::Bind => self.binds += 1,
            ReactionKind::Bridge => self.bridge_firings += 1,
            ReactionKind::Degrade => self.degradations += 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_zeroed() {
        let m = RunMetrics::default();
        assert_eq!(m.steps, 0);
        assert_eq!(m.terminations, 0);
        assert_eq!(m.final_time, 0.0);
    }

    #[test]
    fn record_counts_steps_and_kind() {
        let mut m = RunMetrics::default();
        m.record(ReactionKind::Bind);
        m.record(ReactionKind::Bridge);
        m.record(ReactionKind::Bridge);
        assert_eq!(m.steps, 3);
        assert_eq!(m.binds, 1);
        assert_eq!(m.bridge_firings, 2);
        assert_eq!(m.species_reactions, 0);
    }
}
