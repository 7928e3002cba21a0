//! Viewport fitting: scales and offsets the composition so it always covers
//! the container, cropping the non-dominant axis.
//!
//! Runs once at startup and again on every resize event. All outputs are
//! recomputed together; a zero-sized container skips the computation.

/// Result of a fit computation, applied to the composition group.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fit {
    /// Uniform scale applied to the composition group.
    pub scale: f32,
    /// Local x-translation of the composition group.
    pub x_offset: f32,
    /// Visible width at the composition's depth plane.
    pub visible_width: f32,
    /// Visible height at the composition's depth plane.
    pub visible_height: f32,
}

/// Computes the cover-scale and horizontal offset for the composition.
///
/// `focus_x` in [0, 1] selects which part of an over-wide image stays
/// visible when the container is narrower than the composition; `overscan`
/// (>= 1) enlarges the composition beyond an exact cover fit.
///
/// Returns `None` when the container has zero width or height; the caller
/// skips that event and retries on the next resize.
pub fn compute(
    container_w_px: u32,
    container_h_px: u32,
    fov_y_deg: f32,
    camera_z: f32,
    comp_aspect: f32,
    focus_x: f32,
    overscan: f32,
) -> Option<Fit> {
    if container_w_px == 0 || container_h_px == 0 {
        return None;
    }

    let viewport_aspect = container_w_px as f32 / container_h_px as f32;
    let visible_height = 2.0 * (fov_y_deg.to_radians() * 0.5).tan() * camera_z;
    let visible_width = visible_height * viewport_aspect;

    // Cover, don't contain: when the composition is wider than the viewport
    // the height is matched and the sides crop, otherwise the width is
    // matched and the top/bottom crop.
    let mut scale = if comp_aspect > viewport_aspect {
        visible_height
    } else {
        visible_width / comp_aspect
    };
    scale *= overscan;

    let actual_width = scale * comp_aspect;
    let x_offset = (0.5 - focus_x) * (actual_width - visible_width);

    Some(Fit {
        scale,
        x_offset,
        visible_width,
        visible_height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const FOV: f32 = 80.0;
    const Z: f32 = 2.0;

    fn visible_height() -> f32 {
        2.0 * (FOV.to_radians() * 0.5).tan() * Z
    }

    #[test]
    fn wide_composition_in_square_viewport_is_width_constrained() {
        let fit = compute(500, 500, FOV, Z, 2.0, 0.5, 1.0).unwrap();
        // Width-constrained branch: scale matches the visible height, and
        // the scaled composition width covers the viewport.
        assert!((fit.scale - visible_height()).abs() < 1e-4);
        assert!(fit.scale * 2.0 >= fit.visible_width);
    }

    #[test]
    fn centered_focus_never_offsets() {
        for (w, h) in [(500, 500), (1920, 1080), (320, 700)] {
            for overscan in [1.0, 1.25] {
                let fit = compute(w, h, FOV, Z, 2.0, 0.5, overscan).unwrap();
                assert!(
                    fit.x_offset.abs() < 1e-4,
                    "offset {} for {}x{} overscan {}",
                    fit.x_offset,
                    w,
                    h,
                    overscan
                );
            }
        }
    }

    #[test]
    fn left_focus_shifts_composition_right() {
        // Composition wider than viewport: focusing the left edge must
        // produce a positive offset so that edge stays visible.
        let fit = compute(500, 500, FOV, Z, 2.0, 0.0, 1.0).unwrap();
        assert!(fit.x_offset > 0.0);
    }

    #[test]
    fn matched_aspect_without_overscan_is_exact() {
        let fit = compute(640, 640, FOV, Z, 1.0, 0.5, 1.0).unwrap();
        assert!((fit.scale - visible_height()).abs() < 1e-4);
        assert!(fit.x_offset.abs() < 1e-4);
    }

    #[test]
    fn zero_sized_container_skips() {
        assert!(compute(0, 480, FOV, Z, 1.5, 0.5, 1.0).is_none());
        assert!(compute(640, 0, FOV, Z, 1.5, 0.5, 1.0).is_none());
    }
}
