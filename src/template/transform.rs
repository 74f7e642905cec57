//! Pose transforms applied to (already downsampled) templates.

use crate::bank::Pose;
use crate::image::resize::scale_bilinear;
use crate::image::{ImageView, OwnedImage};
use crate::template::rotate::rotate_u8_bilinear;
use crate::util::DiceMatchResult;

/// Applies `pose` to a template: isotropic scale first, then rotation about
/// the template center onto an enlarged canvas filled with `fill`.
///
/// A scale of exactly 1 and an angle of exactly 0 are passed through without
/// resampling.
pub fn transform_for_pose(
    base: ImageView<'_, u8>,
    pose: Pose,
    fill: u8,
) -> DiceMatchResult<OwnedImage> {
    let scaled = if pose.scale == 1.0 {
        OwnedImage::from_view(base)?
    } else {
        scale_bilinear(base, pose.scale)?
    };
    if pose.angle_deg == 0.0 {
        return Ok(scaled);
    }
    Ok(rotate_u8_bilinear(scaled.view(), pose.angle_deg, fill))
}
