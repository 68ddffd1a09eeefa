//! Interval index over a polymer's sites.
//!
//! Sites are kept sorted by start together with the longest site length,
//! so an overlap query binary-searches to `start - max_len` and scans
//! forward only while site starts remain below the query's stop.

use strand_core::SiteId;

use crate::feature::Site;

/// Sorted `(start, stop, id)` entries supporting overlap queries.
#[derive(Clone, Debug, Default)]
pub struct SiteIndex {
    entries: Vec<(u32, u32, SiteId)>,
    max_len: u32,
}

impl SiteIndex {
    /// Index the given sites; `SiteId(i)` refers to `sites[i]`.
    pub fn build(sites: &[Site]) -> Self {
        let mut entries: Vec<_> = sites
            .iter()
            .enumerate()
            .map(|(i, s)| (s.start(), s.stop(), SiteId(i as u32)))
            .collect();
        entries.sort_unstable();
        let max_len = entries
            .iter()
            .map(|&(start, stop, _)| stop.saturating_sub(start))
            .max()
            .unwrap_or(0);
        Self { entries, max_len }
    }

    fn overlapping_entries(
        &self,
        start: u32,
        stop: u32,
    ) -> impl Iterator<Item = &(u32, u32, SiteId)> + '_ {
        let lower = start.saturating_sub(self.max_len);
        let first = self.entries.partition_point(|&(s, _, _)| s < lower);
        self.entries[first..]
            .iter()
            .take_while(move |&&(s, _, _)| s < stop)
            .filter(move |&&(_, e, _)| e > start)
    }

    /// Ids of sites overlapping `[start, stop)`, in start order.
    pub fn overlapping(&self, start: u32, stop: u32) -> impl Iterator<Item = SiteId> + '_ {
        self.overlapping_entries(start, stop).map(|&(_, _, id)| id)
    }

    /// Ids of sites whose last position is `pos - 1`.
    pub fn ending_at(&self, pos: u32) -> impl Iterator<Item = SiteId> + '_ {
        self.overlapping_entries(pos.saturating_sub(1), pos)
            .filter(move |&&(_, e, _)| e == pos)
            .map(|&(_, _, id)| id)
    }

    /// Number of indexed sites.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index holds no sites.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
