//! Candidate detections and their global de-duplication.
//!
//! The scanner produces many overlapping `Candidate`s; the occupancy resolver
//! turns them into the final, non-overlapping `Detection` list.

mod occupancy;
pub(crate) mod peak;
mod resolve;

pub use occupancy::OccupancyMask;
pub use resolve::{resolve, ResolveConfig, ResolveDecision, ResolveStep, Resolution};

use crate::geometry::{OrientedRect, Point2, Size2};

/// One hypothesis that a template matches the scene at a pose and location.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Candidate {
    /// Raw ZNCC score at the placement that produced this candidate.
    pub score: f32,
    /// Footprint center in full-resolution scene coordinates.
    pub center: Point2,
    /// Footprint size in full-resolution pixels (template size times scale).
    pub box_size: Size2,
    /// Rotation in degrees, same convention as the originating pose.
    pub angle_deg: f32,
    /// Label (pip count) of the matching template.
    pub label: u32,
}

/// A candidate accepted by the resolver.
pub type Detection = Candidate;

impl Candidate {
    /// Returns the oriented footprint used for occupancy tests and drawing.
    pub fn footprint(&self) -> OrientedRect {
        OrientedRect::new(self.center, self.box_size, self.angle_deg)
    }
}
