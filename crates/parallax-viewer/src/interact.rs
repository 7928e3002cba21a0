//! Pointer tracking, parallax rotation, and the label hover hit-test.
//!
//! Everything here is recomputed every frame from the latest pointer
//! sample; there is no cached hover state to go stale.

use crate::assets::label::UvBounds;
use crate::camera::{Camera, Ray};
use glam::{Mat4, Vec2};

/// Sentinel pointer sample, far outside the valid [-1, 1] NDC range, so a
/// hit-test against it is guaranteed to miss.
pub const POINTER_ABSENT: Vec2 = Vec2::new(10.0, 10.0);

/// Raw and smoothed pointer offsets in normalized device coordinates.
#[derive(Debug, Clone)]
pub struct PointerState {
    /// Target offset the smoothed value converges toward.
    pub target: Vec2,
    /// Exponentially smoothed offset driving the parallax rotation.
    pub smoothed: Vec2,
    /// Last raw NDC sample used for hit-testing, or `POINTER_ABSENT`.
    pub sample: Vec2,
}

impl Default for PointerState {
    fn default() -> Self {
        Self::new()
    }
}

impl PointerState {
    pub fn new() -> Self {
        Self {
            target: Vec2::ZERO,
            smoothed: Vec2::ZERO,
            sample: POINTER_ABSENT,
        }
    }

    /// Records a pointer position in container pixels (y down) as NDC.
    pub fn pointer_moved(&mut self, pos_px: Vec2, container_px: Vec2) {
        let ndc = Vec2::new(
            (pos_px.x / container_px.x) * 2.0 - 1.0,
            -((pos_px.y / container_px.y) * 2.0 - 1.0),
        );
        self.target = ndc;
        self.sample = ndc;
    }

    /// Pointer left the viewport: recenter the target and park the sample
    /// on the sentinel so hover cannot trigger.
    pub fn pointer_left(&mut self) {
        self.target = Vec2::ZERO;
        self.sample = POINTER_ABSENT;
    }

    /// One smoothing step: `smoothed += (target - smoothed) * s`.
    /// Returns the updated offset.
    pub fn step(&mut self, smoothing: f32) -> Vec2 {
        self.smoothed += (self.target - self.smoothed) * smoothing;
        self.smoothed
    }
}

/// Parallax rotation angles in radians: (pitch about x, yaw about y).
pub fn parallax_angles(smoothed: Vec2, intensity_deg: f32) -> Vec2 {
    let intensity = intensity_deg.to_radians();
    Vec2::new(-smoothed.y * intensity, smoothed.x * intensity)
}

/// Intersects a world-space ray with a surface's z = 0 plane and returns
/// the UV of the hit (v up), or `None` when the ray misses the extents.
pub fn intersect_surface_uv(
    ray: &Ray,
    world_to_local: &Mat4,
    width: f32,
    height: f32,
) -> Option<Vec2> {
    let origin = world_to_local.transform_point3(ray.origin);
    let dir = world_to_local.transform_vector3(ray.dir);
    if dir.z.abs() < 1e-8 {
        return None;
    }
    let t = -origin.z / dir.z;
    if t <= 0.0 {
        return None;
    }
    let hit = origin + dir * t;
    if hit.x.abs() > width * 0.5 || hit.y.abs() > height * 0.5 {
        return None;
    }
    Some(Vec2::new(hit.x / width + 0.5, hit.y / height + 0.5))
}

/// Full hover test for the label surface: ray through the last raw pointer
/// sample, intersection UV, and containment in the highlight bounds
/// expanded by the tolerance margin.
pub fn label_hovered(
    camera: &Camera,
    sample: Vec2,
    label_world: &Mat4,
    label_width: f32,
    label_height: f32,
    bounds: &UvBounds,
    tolerance: f32,
) -> bool {
    let ray = camera.ray_from_ndc(sample);
    let world_to_local = label_world.inverse();
    match intersect_surface_uv(&ray, &world_to_local, label_width, label_height) {
        Some(uv) => bounds.contains(uv.x, uv.y, tolerance),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn smoothing_converges_without_overshoot() {
        for s in [0.025f32, 0.3, 0.9, 1.0] {
            let mut state = PointerState::new();
            state.target = Vec2::new(1.0, -1.0);
            let mut prev_dist = state.target.distance(state.smoothed);
            for _ in 0..500 {
                let smoothed = state.step(s);
                let dist = state.target.distance(smoothed);
                assert!(
                    dist <= prev_dist + 1e-6,
                    "distance grew at s={}: {} -> {}",
                    s,
                    prev_dist,
                    dist
                );
                // Never past the target on either axis.
                assert!(smoothed.x <= state.target.x + 1e-6);
                assert!(smoothed.y >= state.target.y - 1e-6);
                prev_dist = dist;
            }
            assert!(prev_dist < 1e-2);
        }
    }

    #[test]
    fn pointer_move_maps_to_ndc() {
        let mut state = PointerState::new();
        state.pointer_moved(Vec2::new(400.0, 300.0), Vec2::new(800.0, 600.0));
        assert_eq!(state.target, Vec2::ZERO);

        state.pointer_moved(Vec2::new(800.0, 0.0), Vec2::new(800.0, 600.0));
        assert_eq!(state.target, Vec2::new(1.0, 1.0));

        state.pointer_moved(Vec2::new(0.0, 600.0), Vec2::new(800.0, 600.0));
        assert_eq!(state.target, Vec2::new(-1.0, -1.0));
    }

    #[test]
    fn parallax_signs_follow_the_pointer() {
        let angles = parallax_angles(Vec2::new(0.5, 0.5), 8.0);
        // Pointer up-right: pitch negative (tilt away), yaw positive.
        assert!(angles.x < 0.0);
        assert!(angles.y > 0.0);
        assert!((angles.y - 0.5 * 8.0f32.to_radians()).abs() < 1e-6);
    }

    #[test]
    fn center_ray_hits_centered_plane_at_uv_center() {
        let camera = Camera::new(80.0, 2.0);
        let ray = camera.ray_from_ndc(Vec2::ZERO);
        let uv = intersect_surface_uv(&ray, &Mat4::IDENTITY, 2.0, 1.0).unwrap();
        assert!((uv.x - 0.5).abs() < 1e-5);
        assert!((uv.y - 0.5).abs() < 1e-5);
    }

    #[test]
    fn ray_behind_the_plane_misses() {
        let camera = Camera::new(80.0, 2.0);
        let ray = camera.ray_from_ndc(Vec2::ZERO);
        // Plane moved behind the camera: the intersection parameter is
        // negative and the hit is rejected.
        let world = Mat4::from_translation(Vec3::new(0.0, 0.0, 5.0));
        assert!(intersect_surface_uv(&ray, &world.inverse(), 2.0, 1.0).is_none());
    }

    #[test]
    fn pointer_leave_forces_a_miss() {
        let camera = Camera::new(80.0, 2.0);
        let bounds = UvBounds {
            u_min: 0.0,
            u_max: 1.0,
            v_min: 0.0,
            v_max: 1.0,
        };
        let mut state = PointerState::new();
        state.pointer_moved(Vec2::new(400.0, 300.0), Vec2::new(800.0, 600.0));
        assert!(label_hovered(
            &camera,
            state.sample,
            &Mat4::IDENTITY,
            2.0,
            1.0,
            &bounds,
            0.015
        ));

        state.pointer_left();
        assert_eq!(state.target, Vec2::ZERO);
        assert!(!label_hovered(
            &camera,
            state.sample,
            &Mat4::IDENTITY,
            2.0,
            1.0,
            &bounds,
            0.015
        ));
    }
}
