//! Screen-space annotation projection.
//!
//! Each annotation owns a fixed anchor on the subject surface; every frame
//! the anchor is pushed through the subject's live world transform and the
//! camera to produce marker and popup pixel positions. The projector never
//! mutates anchors.

use crate::camera::{self, Camera};
use glam::{Mat4, Vec2, Vec3};

/// Small positive local z so anchors sit above the displaced surface.
pub const ANCHOR_LIFT: f32 = 0.02;

/// Static definition of one annotation.
#[derive(Debug, Clone)]
pub struct AnnotationSpec {
    /// Anchor in subject-normalized coordinates, (0,0) top-left.
    pub anchor: Vec2,
    /// Fixed pixel offset from the marker to the popup.
    pub popup_offset: Vec2,
    /// Fact text shown in the popup.
    pub text: &'static str,
    /// Source URL shown under the fact.
    pub source: &'static str,
    /// Bubble tint, sRGB.
    pub color: [u8; 3],
    /// The designated annotation tied to the label highlight: it draws no
    /// bubble and its popup shows whenever the label hover test is active.
    pub linked_to_highlight: bool,
}

/// Live annotation state. Created once at startup, never destroyed;
/// position outputs are overwritten every frame.
#[derive(Debug, Clone)]
pub struct Annotation {
    pub spec: AnnotationSpec,
    /// Sticky visibility, toggled by clicking the bubble.
    pub pinned: bool,
    /// Transient visibility while the pointer is over the bubble.
    pub hovered: bool,
    /// Marker position in container pixels.
    pub marker_px: Vec2,
    /// Popup position in page pixels.
    pub popup_px: Vec2,
}

impl Annotation {
    pub fn new(spec: AnnotationSpec) -> Self {
        Self {
            spec,
            pinned: false,
            hovered: false,
            marker_px: Vec2::ZERO,
            popup_px: Vec2::ZERO,
        }
    }

    pub fn visible(&self, label_hovered: bool) -> bool {
        self.pinned || self.hovered || (self.spec.linked_to_highlight && label_hovered)
    }
}

/// Maps a normalized anchor to subject-local coordinates: x spans the
/// composition aspect, y flips from top-origin to the local y-up frame.
pub fn anchor_to_local(anchor: Vec2, comp_aspect: f32) -> Vec3 {
    Vec3::new(
        (anchor.x - 0.5) * comp_aspect,
        0.5 - anchor.y,
        ANCHOR_LIFT,
    )
}

/// Projects a subject-local point to container pixels through the current
/// subject world transform and camera.
pub fn project_marker(
    camera: &Camera,
    subject_world: &Mat4,
    local: Vec3,
    container_px: Vec2,
) -> Vec2 {
    let world = subject_world.transform_point3(local);
    let ndc = camera.project_ndc(world);
    camera::ndc_to_pixels(ndc, container_px.x, container_px.y)
}

/// Recomputes marker and popup positions for every annotation. A pure read
/// of the current transforms; anchors are untouched.
pub fn update_positions(
    annotations: &mut [Annotation],
    camera: &Camera,
    subject_world: &Mat4,
    comp_aspect: f32,
    container_px: Vec2,
    container_origin: Vec2,
) {
    for annotation in annotations.iter_mut() {
        let local = anchor_to_local(annotation.spec.anchor, comp_aspect);
        let marker = project_marker(camera, subject_world, local, container_px);
        annotation.marker_px = marker;
        annotation.popup_px = container_origin + marker + annotation.spec.popup_offset;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Composition;

    fn spec(anchor: Vec2) -> AnnotationSpec {
        AnnotationSpec {
            anchor,
            popup_offset: Vec2::new(-140.0, -160.0),
            text: "",
            source: "",
            color: [59, 130, 246],
            linked_to_highlight: false,
        }
    }

    #[test]
    fn center_anchor_projects_to_container_center() {
        let camera = Camera::new(80.0, 2.0);
        let comp = Composition::new(2.0, 2.0, 0.15, false);
        let world = comp.world_of(&comp.subject);

        for (w, h) in [(800.0, 600.0), (1024.0, 1024.0), (333.0, 777.0)] {
            let local = anchor_to_local(Vec2::new(0.5, 0.5), comp.aspect);
            let px = project_marker(&camera, &world, local, Vec2::new(w, h));
            assert!((px.x - w / 2.0).abs() < 1e-3, "{} != {}", px.x, w / 2.0);
            assert!((px.y - h / 2.0).abs() < 1e-3, "{} != {}", px.y, h / 2.0);
        }
    }

    #[test]
    fn center_anchor_stays_centered_after_fitting() {
        // Full chain: fit a wide composition into a square container with
        // a centered focus, then project the center anchor.
        let mut camera = Camera::new(80.0, 2.0);
        let mut comp = Composition::new(2.0, 2.0, 0.15, false);

        let fit = crate::fit::compute(900, 900, 80.0, 2.0, comp.aspect, 0.5, 1.0).unwrap();
        camera.set_aspect(1.0);
        comp.apply_fit(&fit);

        let world = comp.world_of(&comp.subject);
        let local = anchor_to_local(Vec2::new(0.5, 0.5), comp.aspect);
        let px = project_marker(&camera, &world, local, Vec2::new(900.0, 900.0));
        assert!((px.x - 450.0).abs() < 1e-2);
        assert!((px.y - 450.0).abs() < 1e-2);
    }

    #[test]
    fn projection_is_idempotent() {
        let camera = Camera::new(80.0, 2.0);
        let mut comp = Composition::new(1.5, 2.0, 0.15, false);
        comp.scale = 3.3;
        comp.x_offset = 0.4;
        comp.subject.transform.rotation = glam::Vec3::new(0.05, -0.08, 0.0);
        let world = comp.world_of(&comp.subject);

        let local = anchor_to_local(Vec2::new(0.2, 0.33), comp.aspect);
        let container = Vec2::new(1280.0, 720.0);
        let a = project_marker(&camera, &world, local, container);
        let b = project_marker(&camera, &world, local, container);
        assert_eq!(a, b);
    }

    #[test]
    fn update_never_mutates_anchors() {
        let camera = Camera::new(80.0, 2.0);
        let comp = Composition::new(2.0, 2.0, 0.15, false);
        let world = comp.world_of(&comp.subject);

        let mut annotations = vec![
            Annotation::new(spec(Vec2::new(0.2, 0.33))),
            Annotation::new(spec(Vec2::new(0.79, 0.28))),
        ];
        let anchors: Vec<Vec2> = annotations.iter().map(|a| a.spec.anchor).collect();

        update_positions(
            &mut annotations,
            &camera,
            &world,
            comp.aspect,
            Vec2::new(800.0, 600.0),
            Vec2::ZERO,
        );

        for (annotation, anchor) in annotations.iter().zip(anchors) {
            assert_eq!(annotation.spec.anchor, anchor);
        }
    }

    #[test]
    fn popup_adds_offset_and_origin() {
        let camera = Camera::new(80.0, 2.0);
        let comp = Composition::new(2.0, 2.0, 0.15, false);
        let world = comp.world_of(&comp.subject);

        let mut annotations = vec![Annotation::new(spec(Vec2::new(0.5, 0.5)))];
        update_positions(
            &mut annotations,
            &camera,
            &world,
            comp.aspect,
            Vec2::new(800.0, 600.0),
            Vec2::new(10.0, 20.0),
        );

        let a = &annotations[0];
        let expected = Vec2::new(10.0, 20.0) + a.marker_px + a.spec.popup_offset;
        assert_eq!(a.popup_px, expected);
    }

    #[test]
    fn linked_annotation_shows_while_label_is_hovered() {
        let mut a = Annotation::new(AnnotationSpec {
            linked_to_highlight: true,
            ..spec(Vec2::new(0.5, 0.5))
        });
        assert!(!a.visible(false));
        assert!(a.visible(true));
        a.pinned = true;
        assert!(a.visible(false));
    }
}
