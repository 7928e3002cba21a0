//! The scene graph: a uniformly scaled composition group holding the
//! background, subject, and label surfaces as pure transform data.
//!
//! Nothing here touches the GPU; the renderer consumes these transforms
//! and the interaction/projection code reads them every frame.

pub mod geometry;

use glam::{EulerRot, Mat4, Quat, Vec3};

/// Local z of the background plane, behind the subject.
pub const BACKGROUND_Z: f32 = -0.1;
/// Local y of the label plane's center.
pub const LABEL_Y: f32 = 0.35;
/// Label width as a fraction of the composition aspect.
pub const LABEL_WIDTH_FRACTION: f32 = 0.82;
/// Label height in composition-local units.
pub const LABEL_HEIGHT: f32 = 0.22;
/// Alpha threshold below which subject fragments are discarded.
pub const SUBJECT_ALPHA_CUTOFF: f32 = 0.01;

/// Local transform of one surface. Rotation is an XYZ euler triple in
/// radians; only the subject's x/y components ever change (parallax).
#[derive(Debug, Clone, Copy)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }

    pub fn matrix(&self) -> Mat4 {
        let rotation = Quat::from_euler(
            EulerRot::XYZ,
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
        );
        Mat4::from_scale_rotation_translation(self.scale, rotation, self.translation)
    }
}

/// Material parameters consumed by the surface pipeline.
#[derive(Debug, Clone, Copy)]
pub struct Material {
    /// Vertex displacement in local units per unit of depth-map value.
    pub displacement_scale: f32,
    /// Fragments with alpha below this are discarded.
    pub alpha_cutoff: f32,
    /// Whether the ambient + directional shading term applies.
    pub lit: bool,
}

impl Material {
    pub fn unlit() -> Self {
        Self {
            displacement_scale: 0.0,
            alpha_cutoff: 0.0,
            lit: false,
        }
    }
}

/// A planar surface: width x height in composition-local units plus its
/// local transform and material. Surfaces never change their own scale
/// after construction.
#[derive(Debug, Clone)]
pub struct Surface {
    pub transform: Transform,
    pub width: f32,
    pub height: f32,
    pub material: Material,
}

/// The composition group. Only its uniform scale and x-translation change
/// at runtime, and only the viewport fitter drives them.
#[derive(Debug, Clone)]
pub struct Composition {
    /// Fixed aspect ratio, derived from the background image.
    pub aspect: f32,
    pub scale: f32,
    pub x_offset: f32,
    /// Residual group rotation; fitting resets it to zero.
    pub rotation: Vec3,

    pub background: Surface,
    pub subject: Surface,
    pub label: Option<Surface>,
}

impl Composition {
    /// Builds the object graph for one scene. `camera_z` feeds the
    /// background's one-time perspective compensation scale, so the
    /// background exactly fills the frustum despite sitting behind the
    /// subject plane.
    pub fn new(aspect: f32, camera_z: f32, displacement_scale: f32, with_label: bool) -> Self {
        let bg_scale = (camera_z - BACKGROUND_Z) / camera_z;
        let background = Surface {
            transform: Transform {
                translation: Vec3::new(0.0, 0.0, BACKGROUND_Z),
                rotation: Vec3::ZERO,
                scale: Vec3::new(bg_scale, bg_scale, 1.0),
            },
            width: aspect,
            height: 1.0,
            material: Material::unlit(),
        };

        let subject = Surface {
            transform: Transform::identity(),
            width: aspect,
            height: 1.0,
            material: Material {
                displacement_scale,
                alpha_cutoff: SUBJECT_ALPHA_CUTOFF,
                lit: true,
            },
        };

        let label = with_label.then(|| Surface {
            transform: Transform {
                translation: Vec3::new(0.0, LABEL_Y, 0.0),
                rotation: Vec3::ZERO,
                scale: Vec3::ONE,
            },
            width: aspect * LABEL_WIDTH_FRACTION,
            height: LABEL_HEIGHT,
            material: Material::unlit(),
        });

        Self {
            aspect,
            scale: 1.0,
            x_offset: 0.0,
            rotation: Vec3::ZERO,
            background,
            subject,
            label,
        }
    }

    /// Group matrix: uniform xy scale, x-translation, residual rotation.
    pub fn matrix(&self) -> Mat4 {
        let rotation = Quat::from_euler(
            EulerRot::XYZ,
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
        );
        Mat4::from_scale_rotation_translation(
            Vec3::new(self.scale, self.scale, 1.0),
            rotation,
            Vec3::new(self.x_offset, 0.0, 0.0),
        )
    }

    /// World matrix of a child surface under the current group transform.
    pub fn world_of(&self, surface: &Surface) -> Mat4 {
        self.matrix() * surface.transform.matrix()
    }

    /// Applies a fit result. Child surfaces are untouched; any residual
    /// group rotation is cleared so fitting never interacts with parallax.
    pub fn apply_fit(&mut self, fit: &crate::fit::Fit) {
        self.scale = fit.scale;
        self.x_offset = fit.x_offset;
        self.rotation = Vec3::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fit;

    #[test]
    fn fit_drives_only_the_group() {
        let mut comp = Composition::new(2.0, 2.0, 0.15, true);
        comp.rotation = Vec3::new(0.1, 0.2, 0.0);
        let subject_scale = comp.subject.transform.scale;

        let fit = fit::compute(500, 500, 80.0, 2.0, comp.aspect, 0.0, 1.0).unwrap();
        comp.apply_fit(&fit);

        assert_eq!(comp.scale, fit.scale);
        assert_eq!(comp.x_offset, fit.x_offset);
        assert_eq!(comp.rotation, Vec3::ZERO);
        assert_eq!(comp.subject.transform.scale, subject_scale);
    }

    #[test]
    fn group_matrix_scales_and_translates() {
        let mut comp = Composition::new(1.0, 2.0, 0.15, false);
        comp.scale = 3.0;
        comp.x_offset = 0.5;

        let p = comp.matrix().transform_point3(Vec3::new(1.0, 1.0, 0.0));
        assert!((p.x - 3.5).abs() < 1e-6);
        assert!((p.y - 3.0).abs() < 1e-6);
    }

    #[test]
    fn background_compensates_for_depth() {
        let comp = Composition::new(1.5, 2.0, 0.15, false);
        let expected = (2.0 - BACKGROUND_Z) / 2.0;
        assert!((comp.background.transform.scale.x - expected).abs() < 1e-6);
    }
}
