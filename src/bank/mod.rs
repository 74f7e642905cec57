//! Template library and precomputed posed templates.
//!
//! Compiling a template downsamples it once to the scan resolution and
//! prepares one slot per pose of the grid. Posed variants (scaled, rotated and
//! planned for ZNCC) are built lazily and stored in a `OnceLock`, so a
//! `Detector` reused over many scenes pays for each transform only once and
//! parallel sweeps can share the cache.

#[cfg(feature = "image-io")]
mod load;
mod poses;

#[cfg(feature = "image-io")]
pub use load::{load_template_dir, template_paths};
pub use poses::{Pose, PoseGrid, PoseIter};

use crate::geometry::Size2;
use crate::image::resize::scale_area;
use crate::image::OwnedImage;
use crate::template::transform::transform_for_pose;
use crate::template::{Template, TemplatePlan};
use crate::trace::trace_debug;
use crate::util::{DiceMatchError, DiceMatchResult};
use std::sync::OnceLock;

/// Ordered collection of labeled templates.
///
/// Storage collaborators present templates in label order; the library keeps
/// whatever order it is given, which is also the scan order.
#[derive(Clone, Debug, Default)]
pub struct TemplateLibrary {
    templates: Vec<Template>,
}

impl TemplateLibrary {
    /// Creates a library from templates in scan order.
    pub fn new(templates: Vec<Template>) -> Self {
        Self { templates }
    }

    /// Appends a template.
    pub fn push(&mut self, template: Template) {
        self.templates.push(template);
    }

    /// Returns the templates in scan order.
    pub fn templates(&self) -> &[Template] {
        &self.templates
    }

    /// Returns the number of templates.
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Returns true if there is nothing to match against.
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Returns the largest label, if any.
    pub fn max_label(&self) -> Option<u32> {
        self.templates.iter().map(Template::label).max()
    }

    /// Iterates over the templates.
    pub fn iter(&self) -> std::slice::Iter<'_, Template> {
        self.templates.iter()
    }
}

/// A template transformed to one pose and planned for scoring.
#[derive(Debug)]
pub struct PosedTemplate {
    pose: Pose,
    img: OwnedImage,
    plan: TemplatePlan,
    box_size: Size2,
}

impl PosedTemplate {
    /// Returns the pose this variant was built for.
    pub fn pose(&self) -> Pose {
        self.pose
    }

    /// Returns the transformed template at scan resolution.
    pub fn image(&self) -> &OwnedImage {
        &self.img
    }

    /// Returns the ZNCC plan of the transformed template.
    pub fn plan(&self) -> &TemplatePlan {
        &self.plan
    }

    /// Returns the footprint at full resolution (template size times scale).
    pub fn box_size(&self) -> Size2 {
        self.box_size
    }
}

/// Template assets compiled for one scan resolution and pose grid.
#[derive(Debug)]
pub struct CompiledTemplate {
    label: u32,
    full_size: Size2,
    base: OwnedImage,
    fill_value: u8,
    grid: PoseGrid,
    slots: Vec<OnceLock<Option<PosedTemplate>>>,
}

impl CompiledTemplate {
    /// Downsamples `tpl` by `resize_factor` and prepares one slot per pose.
    pub fn compile(
        tpl: &Template,
        resize_factor: f32,
        grid: &PoseGrid,
        fill_value: u8,
    ) -> DiceMatchResult<Self> {
        let base = scale_area(tpl.view(), resize_factor)?;
        let slots = (0..grid.len()).map(|_| OnceLock::new()).collect();
        Ok(Self {
            label: tpl.label(),
            full_size: Size2::new(tpl.width() as f32, tpl.height() as f32),
            base,
            fill_value,
            grid: grid.clone(),
            slots,
        })
    }

    /// Returns the label of the source template.
    pub fn label(&self) -> u32 {
        self.label
    }

    /// Returns the pose grid the template was compiled for.
    pub fn grid(&self) -> &PoseGrid {
        &self.grid
    }

    /// Returns the posed variant for `pose_idx`, building it on first use.
    ///
    /// `Ok(None)` means the transformed template has no intensity variation
    /// and cannot be scored at this pose.
    pub fn posed(&self, pose_idx: usize) -> DiceMatchResult<Option<&PosedTemplate>> {
        let slot = self
            .slots
            .get(pose_idx)
            .ok_or(DiceMatchError::InvalidConfig {
                reason: "pose index outside the compiled grid",
            })?;
        if let Some(posed) = slot.get() {
            return Ok(posed.as_ref());
        }
        let pose = self
            .grid
            .pose_at(pose_idx)
            .ok_or(DiceMatchError::InvalidConfig {
                reason: "pose index outside the compiled grid",
            })?;
        let built = self.build(pose)?;
        // A concurrent caller may have filled the slot first; both values are identical.
        let _ = slot.set(built);
        Ok(slot.get().and_then(Option::as_ref))
    }

    fn build(&self, pose: Pose) -> DiceMatchResult<Option<PosedTemplate>> {
        let img = transform_for_pose(self.base.view(), pose, self.fill_value)?;
        let plan = match TemplatePlan::from_view(img.view()) {
            Ok(plan) => plan,
            Err(DiceMatchError::DegenerateTemplate { reason }) => {
                trace_debug!(
                    "degenerate_posed_template",
                    label = self.label,
                    scale = pose.scale,
                    angle_deg = pose.angle_deg,
                    reason = reason
                );
                return Ok(None);
            }
            Err(err) => return Err(err),
        };
        Ok(Some(PosedTemplate {
            pose,
            img,
            plan,
            box_size: Size2::new(
                self.full_size.width * pose.scale,
                self.full_size.height * pose.scale,
            ),
        }))
    }
}
