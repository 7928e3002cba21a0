use glam::{Mat4, Vec2, Vec3};

/// Perspective camera sitting on the +z axis, looking at the origin.
///
/// Field of view and distance are fixed configuration; only the aspect
/// ratio changes, recomputed from the container pixel size on resize.
#[derive(Debug, Clone)]
pub struct Camera {
    /// Vertical field of view in degrees.
    pub fov_y_deg: f32,
    /// Width / height of the container in pixels.
    pub aspect: f32,
    /// Distance from the camera to the composition plane (z = 0).
    pub z: f32,

    near: f32,
    far: f32,
}

/// A world-space ray, direction normalized.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}

impl Camera {
    pub fn new(fov_y_deg: f32, z: f32) -> Self {
        Self {
            fov_y_deg,
            aspect: 1.0,
            z,
            near: 0.1,
            far: 100.0,
        }
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    /// Camera position in world space.
    pub fn position(&self) -> Vec3 {
        Vec3::new(0.0, 0.0, self.z)
    }

    /// Projection matrix. glam's `perspective_rh` maps depth to [0, 1],
    /// which is what wgpu expects.
    pub fn proj(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y_deg.to_radians(), self.aspect, self.near, self.far)
    }

    /// View matrix. The camera never rotates, so this is a pure translation.
    pub fn view(&self) -> Mat4 {
        Mat4::from_translation(-self.position())
    }

    pub fn view_proj(&self) -> Mat4 {
        self.proj() * self.view()
    }

    /// Projects a world-space point to normalized device coordinates
    /// (x and y in [-1, 1] when on screen, y up), with perspective divide.
    pub fn project_ndc(&self, world: Vec3) -> Vec3 {
        self.view_proj().project_point3(world)
    }

    /// Casts a ray from the camera through the given NDC coordinate.
    pub fn ray_from_ndc(&self, ndc: Vec2) -> Ray {
        let origin = self.position();
        let inv = self.view_proj().inverse();
        // Unproject a point on the far plane (depth 1 in wgpu conventions)
        // and aim at it from the camera position.
        let far_point = inv.project_point3(Vec3::new(ndc.x, ndc.y, 1.0));
        Ray {
            origin,
            dir: (far_point - origin).normalize(),
        }
    }
}

/// Converts NDC (y up) to container pixel coordinates (y down).
pub fn ndc_to_pixels(ndc: Vec3, container_w: f32, container_h: f32) -> Vec2 {
    Vec2::new(
        (ndc.x * 0.5 + 0.5) * container_w,
        (-ndc.y * 0.5 + 0.5) * container_h,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_projects_to_ndc_center() {
        let camera = Camera::new(80.0, 2.0);
        let ndc = camera.project_ndc(Vec3::ZERO);
        assert!(ndc.x.abs() < 1e-6);
        assert!(ndc.y.abs() < 1e-6);
    }

    #[test]
    fn ndc_center_maps_to_pixel_center() {
        let px = ndc_to_pixels(Vec3::ZERO, 800.0, 600.0);
        assert_eq!(px, Vec2::new(400.0, 300.0));
    }

    #[test]
    fn ndc_top_left_maps_to_pixel_origin() {
        let px = ndc_to_pixels(Vec3::new(-1.0, 1.0, 0.0), 800.0, 600.0);
        assert_eq!(px, Vec2::new(0.0, 0.0));
    }

    #[test]
    fn center_ray_points_down_the_view_axis() {
        let camera = Camera::new(80.0, 2.0);
        let ray = camera.ray_from_ndc(Vec2::ZERO);
        assert_eq!(ray.origin, Vec3::new(0.0, 0.0, 2.0));
        assert!(ray.dir.x.abs() < 1e-6);
        assert!(ray.dir.y.abs() < 1e-6);
        assert!(ray.dir.z < 0.0);
    }
}
