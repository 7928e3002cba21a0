//! Rasterizes the title label into two texture variants and measures the
//! normalized texture-space bounds of the highlighted word.
//!
//! Bounds are measured once here, at generation time, and never re-measured:
//! the hover hit-test compares intersection UVs against them every frame.

use cosmic_text::{
    Attrs, Buffer, Family, FontSystem, Metrics, Shaping, SwashCache, SwashContent, Weight,
};

pub const LABEL_TEXTURE_WIDTH: u32 = 2048;
pub const LABEL_TEXTURE_HEIGHT: u32 = 512;

const FONT_SIZE: f32 = 190.0;
const LINE_HEIGHT: f32 = 230.0;

/// Fill for the title text, slightly translucent off-white.
const TEXT_COLOR: [u8; 4] = [245, 248, 255, 242];
/// Fill for the highlighted word in the emphasized variant.
const HIGHLIGHT_COLOR: [u8; 4] = [226, 240, 255, 255];

#[derive(Debug, thiserror::Error)]
pub enum LabelError {
    #[error("text rasterization produced no glyphs (no usable fonts?)")]
    NoGlyphs,
}

/// Normalized texture-space bounds, v increasing upward (v = 1 at the top
/// edge of the texture, matching plane UV conventions).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UvBounds {
    pub u_min: f32,
    pub u_max: f32,
    pub v_min: f32,
    pub v_max: f32,
}

impl UvBounds {
    /// Containment test with the bounds expanded by `pad` on every side.
    /// Edges are inclusive.
    pub fn contains(&self, u: f32, v: f32, pad: f32) -> bool {
        u >= self.u_min - pad && u <= self.u_max + pad && v >= self.v_min - pad && v <= self.v_max + pad
    }
}

/// The generated label: two RGBA variants plus the highlight bounds.
/// `highlight` is `None` when the substring does not occur in the title.
pub struct LabelTextures {
    pub width: u32,
    pub height: u32,
    pub normal: Vec<u8>,
    pub emphasized: Vec<u8>,
    pub highlight: Option<UvBounds>,
}

/// Lays out `text` once, centered in the texture, then rasterizes both
/// variants from the same glyph layout so their geometry is identical.
pub fn generate(text: &str, highlight: &str) -> Result<LabelTextures, LabelError> {
    let mut font_system = FontSystem::new();
    let mut swash = SwashCache::new();

    let metrics = Metrics::new(FONT_SIZE, LINE_HEIGHT);
    let mut buffer = Buffer::new(&mut font_system, metrics);
    // Unconstrained width so the single line never wraps; centering is done
    // with an explicit pen offset below.
    buffer.set_size(&mut font_system, None, None);

    let attrs = Attrs::new().family(Family::Serif).weight(Weight::BOLD);
    buffer.set_text(&mut font_system, text, attrs, Shaping::Advanced);
    buffer.shape_until_scroll(&mut font_system, false);

    let line_width = buffer
        .layout_runs()
        .map(|run| run.line_w)
        .fold(0.0f32, f32::max);
    let offset_x = (LABEL_TEXTURE_WIDTH as f32 - line_width) / 2.0;
    let offset_y = (LABEL_TEXTURE_HEIGHT as f32 - LINE_HEIGHT) / 2.0;

    let highlight_range = (!highlight.is_empty())
        .then(|| text.find(highlight).map(|start| start..start + highlight.len()))
        .flatten();

    let mut normal = Canvas::new(LABEL_TEXTURE_WIDTH, LABEL_TEXTURE_HEIGHT);
    let mut emphasized = Canvas::new(LABEL_TEXTURE_WIDTH, LABEL_TEXTURE_HEIGHT);
    let mut glyph_count = 0usize;
    let mut bounds = PixelBounds::empty();

    for run in buffer.layout_runs() {
        for glyph in run.glyphs.iter() {
            let physical = glyph.physical((offset_x, offset_y), 1.0);
            let Some(image) = swash.get_image_uncached(&mut font_system, physical.cache_key)
            else {
                continue;
            };
            if image.placement.width == 0 || image.placement.height == 0 {
                continue;
            }
            glyph_count += 1;

            let x = physical.x + image.placement.left;
            let y = run.line_y as i32 + physical.y - image.placement.top;

            let in_highlight = highlight_range
                .as_ref()
                .is_some_and(|range| glyph.start >= range.start && glyph.end <= range.end);
            if in_highlight {
                bounds.include(
                    x,
                    y,
                    image.placement.width as i32,
                    image.placement.height as i32,
                );
            }

            normal.blit(&image, x, y, TEXT_COLOR);
            let color = if in_highlight { HIGHLIGHT_COLOR } else { TEXT_COLOR };
            emphasized.blit(&image, x, y, color);
        }
    }

    if glyph_count == 0 {
        return Err(LabelError::NoGlyphs);
    }

    Ok(LabelTextures {
        width: LABEL_TEXTURE_WIDTH,
        height: LABEL_TEXTURE_HEIGHT,
        normal: normal.pixels,
        emphasized: emphasized.pixels,
        highlight: bounds.to_uv(LABEL_TEXTURE_WIDTH, LABEL_TEXTURE_HEIGHT),
    })
}

/// Pixel-space bounding box accumulated over the highlight's glyph rasters,
/// converted to v-up UV space once at the end.
struct PixelBounds {
    min_x: i32,
    min_y: i32,
    max_x: i32,
    max_y: i32,
}

impl PixelBounds {
    fn empty() -> Self {
        Self {
            min_x: i32::MAX,
            min_y: i32::MAX,
            max_x: i32::MIN,
            max_y: i32::MIN,
        }
    }

    fn include(&mut self, x: i32, y: i32, w: i32, h: i32) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x + w);
        self.max_y = self.max_y.max(y + h);
    }

    fn to_uv(&self, tex_w: u32, tex_h: u32) -> Option<UvBounds> {
        if self.min_x > self.max_x {
            return None;
        }
        let w = tex_w as f32;
        let h = tex_h as f32;
        Some(UvBounds {
            u_min: self.min_x as f32 / w,
            u_max: self.max_x as f32 / w,
            // Pixel y grows downward, v grows upward.
            v_min: 1.0 - self.max_y as f32 / h,
            v_max: 1.0 - self.min_y as f32 / h,
        })
    }
}

/// A transparent RGBA canvas with "over" compositing.
struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Canvas {
    fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; (width * height * 4) as usize],
        }
    }

    fn blit(&mut self, image: &cosmic_text::SwashImage, x: i32, y: i32, color: [u8; 4]) {
        let w = image.placement.width as i32;
        let h = image.placement.height as i32;
        for row in 0..h {
            for col in 0..w {
                let px = x + col;
                let py = y + row;
                if px < 0 || py < 0 || px >= self.width as i32 || py >= self.height as i32 {
                    continue;
                }
                let src_idx = (row * w + col) as usize;
                let coverage = match image.content {
                    SwashContent::Mask => image.data[src_idx],
                    // Color glyphs carry RGBA; use their alpha as coverage.
                    SwashContent::Color => image.data[src_idx * 4 + 3],
                    SwashContent::SubpixelMask => image.data[src_idx * 4],
                };
                if coverage == 0 {
                    continue;
                }
                let alpha = (coverage as u32 * color[3] as u32) / 255;
                self.composite((py as u32 * self.width + px as u32) as usize, color, alpha as u8);
            }
        }
    }

    fn composite(&mut self, pixel: usize, color: [u8; 4], alpha: u8) {
        let idx = pixel * 4;
        let dst_a = self.pixels[idx + 3] as u32;
        let src_a = alpha as u32;
        let out_a = src_a + dst_a * (255 - src_a) / 255;
        if out_a == 0 {
            return;
        }
        for c in 0..3 {
            let dst = self.pixels[idx + c] as u32;
            let src = color[c] as u32;
            let blended = (src * src_a + dst * dst_a * (255 - src_a) / 255) / out_a;
            self.pixels[idx + c] = blended.min(255) as u8;
        }
        self.pixels[idx + 3] = out_a.min(255) as u8;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOUNDS: UvBounds = UvBounds {
        u_min: 0.25,
        u_max: 0.5,
        v_min: 0.4,
        v_max: 0.6,
    };

    #[test]
    fn corner_is_inside() {
        assert!(BOUNDS.contains(0.25, 0.4, 0.015));
    }

    #[test]
    fn just_past_the_tolerance_is_outside() {
        let pad = 0.015;
        assert!(BOUNDS.contains(BOUNDS.u_min - pad, BOUNDS.v_min, pad));
        assert!(!BOUNDS.contains(BOUNDS.u_min - pad - 1e-4, BOUNDS.v_min, pad));
    }

    #[test]
    fn pixel_bounds_flip_vertically() {
        let mut b = PixelBounds::empty();
        b.include(512, 128, 512, 256);
        let uv = b.to_uv(2048, 512).unwrap();
        assert!((uv.u_min - 0.25).abs() < 1e-6);
        assert!((uv.u_max - 0.5).abs() < 1e-6);
        assert!((uv.v_min - 0.25).abs() < 1e-6);
        assert!((uv.v_max - 0.75).abs() < 1e-6);
    }

    #[test]
    fn empty_bounds_yield_none() {
        assert!(PixelBounds::empty().to_uv(2048, 512).is_none());
    }

    #[test]
    fn canvas_composites_over_transparent() {
        let mut canvas = Canvas::new(2, 1);
        canvas.composite(0, [200, 100, 50, 255], 255);
        assert_eq!(&canvas.pixels[0..4], &[200, 100, 50, 255]);
        // Untouched pixel stays fully transparent.
        assert_eq!(&canvas.pixels[4..8], &[0, 0, 0, 0]);
    }
}
