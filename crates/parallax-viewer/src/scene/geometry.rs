//! CPU-side plane mesh generation.

use rayon::prelude::*;

/// Vertex layout shared by every surface. Must match the vertex inputs in
/// `shaders/surface.wgsl`.
#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable, Debug)]
pub struct PlaneVertex {
    /// Position in surface-local units, z = 0 before displacement.
    pub position: [f32; 3],
    /// Texture coordinate, v = 0 at the top row of the image.
    pub uv: [f32; 2],
}

#[derive(Debug)]
pub struct PlaneMesh {
    pub vertices: Vec<PlaneVertex>,
    pub indices: Vec<u32>,
}

/// Builds a `width` x `height` plane centered on the origin in the xy plane,
/// subdivided into `segs_x` x `segs_y` quads. Row 0 is the top edge, so the
/// v coordinate increases downward to match image row order.
///
/// The subject surface uses a dense grid here (default 1024 segments per
/// axis, ~1M vertices), so vertex rows are generated in parallel.
pub fn plane(width: f32, height: f32, segs_x: u32, segs_y: u32) -> PlaneMesh {
    let cols = segs_x + 1;
    let rows = segs_y + 1;

    let vertices: Vec<PlaneVertex> = (0..rows)
        .into_par_iter()
        .flat_map_iter(|row| {
            let v = row as f32 / segs_y as f32;
            let y = height * (0.5 - v);
            (0..cols).map(move |col| {
                let u = col as f32 / segs_x as f32;
                let x = width * (u - 0.5);
                PlaneVertex {
                    position: [x, y, 0.0],
                    uv: [u, v],
                }
            })
        })
        .collect();

    let mut indices = Vec::with_capacity(segs_x as usize * segs_y as usize * 6);
    for row in 0..segs_y {
        for col in 0..segs_x {
            let a = row * cols + col;
            let b = a + 1;
            let c = (row + 1) * cols + col;
            let d = c + 1;
            // Two CCW triangles per quad, front face toward +z.
            indices.extend_from_slice(&[a, c, b, b, c, d]);
        }
    }

    PlaneMesh { vertices, indices }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_match_subdivision() {
        let mesh = plane(2.0, 1.0, 4, 3);
        assert_eq!(mesh.vertices.len(), 5 * 4);
        assert_eq!(mesh.indices.len(), 4 * 3 * 6);
    }

    #[test]
    fn corners_and_uvs() {
        let mesh = plane(2.0, 1.0, 1, 1);
        assert_eq!(mesh.vertices.len(), 4);

        // Row 0 is the top edge with v = 0.
        let top_left = &mesh.vertices[0];
        assert_eq!(top_left.position, [-1.0, 0.5, 0.0]);
        assert_eq!(top_left.uv, [0.0, 0.0]);

        let bottom_right = &mesh.vertices[3];
        assert_eq!(bottom_right.position, [1.0, -0.5, 0.0]);
        assert_eq!(bottom_right.uv, [1.0, 1.0]);
    }

    #[test]
    fn indices_stay_in_range() {
        let mesh = plane(1.0, 1.0, 8, 8);
        let max = *mesh.indices.iter().max().unwrap();
        assert!((max as usize) < mesh.vertices.len());
    }
}
