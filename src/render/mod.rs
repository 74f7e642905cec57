//! Result rendering: per-label counts and, with `image-io`, annotated rasters.

#[cfg(feature = "image-io")]
mod annotate;
#[cfg(feature = "image-io")]
pub mod diagnostics;

#[cfg(feature = "image-io")]
pub use annotate::{annotate_detections, annotate_steps, draw_detections_mut, AnnotateStyle};

use crate::candidate::Detection;
use std::collections::BTreeMap;

/// Number of detections per label.
///
/// Always covers `1..=max_label`, zeros included, plus any label outside
/// that range that actually occurs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LabelCounts {
    counts: BTreeMap<u32, usize>,
}

impl LabelCounts {
    /// Tallies `detections` by label.
    pub fn from_detections(detections: &[Detection], max_label: u32) -> Self {
        let mut counts: BTreeMap<u32, usize> = (1..=max_label).map(|label| (label, 0)).collect();
        for det in detections {
            *counts.entry(det.label).or_insert(0) += 1;
        }
        Self { counts }
    }

    /// Returns the count for `label` (zero when it never occurs).
    pub fn get(&self, label: u32) -> usize {
        self.counts.get(&label).copied().unwrap_or(0)
    }

    /// Iterates over `(label, count)` in ascending label order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, usize)> + '_ {
        self.counts.iter().map(|(&label, &count)| (label, count))
    }

    /// Returns the number of reported labels.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Returns true when no label is reported.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Returns the total number of detections.
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// Returns the sum of pips over all detections.
    pub fn pip_sum(&self) -> u64 {
        self.counts
            .iter()
            .map(|(&label, &count)| u64::from(label) * count as u64)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::LabelCounts;
    use crate::candidate::Candidate;
    use crate::geometry::{Point2, Size2};

    fn det(label: u32) -> Candidate {
        Candidate {
            score: 0.9,
            center: Point2::new(10.0, 10.0),
            box_size: Size2::new(5.0, 5.0),
            angle_deg: 0.0,
            label,
        }
    }

    #[test]
    fn counts_cover_range_with_zeros() {
        let counts = LabelCounts::from_detections(&[det(3), det(3), det(5)], 6);
        let pairs: Vec<_> = counts.iter().collect();
        assert_eq!(pairs, vec![(1, 0), (2, 0), (3, 2), (4, 0), (5, 1), (6, 0)]);
        assert_eq!(counts.total(), 3);
        assert_eq!(counts.pip_sum(), 11);
    }

    #[test]
    fn labels_beyond_range_are_kept() {
        let counts = LabelCounts::from_detections(&[det(9)], 6);
        assert_eq!(counts.len(), 7);
        assert_eq!(counts.get(9), 1);
        assert_eq!(counts.get(8), 0);
    }

    #[test]
    fn empty_detections_give_all_zero_counts() {
        let counts = LabelCounts::from_detections(&[], 6);
        assert_eq!(counts.len(), 6);
        assert_eq!(counts.total(), 0);
    }
}
