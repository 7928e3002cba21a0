//! Decodes the scene's images from disk. Loading happens exactly once per
//! session, before the first frame; any failure is fatal to startup.

pub mod label;

use image::RgbaImage;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("failed to load image {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// The three decoded images the scene is built from.
pub struct SceneImages {
    pub background: RgbaImage,
    pub subject: RgbaImage,
    pub depth: RgbaImage,
}

impl SceneImages {
    /// Aspect ratio of the composition, fixed by the background image.
    pub fn aspect(&self) -> f32 {
        self.background.width() as f32 / self.background.height() as f32
    }
}

/// Loads and decodes all three images concurrently. The scene must not
/// initialize partially, so the first error wins and startup aborts.
pub fn load_scene_images(
    background: &Path,
    subject: &Path,
    depth: &Path,
) -> Result<SceneImages, AssetError> {
    let (background, (subject, depth)) = rayon::join(
        || load_rgba(background),
        || rayon::join(|| load_rgba(subject), || load_rgba(depth)),
    );

    Ok(SceneImages {
        background: background?,
        subject: subject?,
        depth: depth?,
    })
}

fn load_rgba(path: &Path) -> Result<RgbaImage, AssetError> {
    let img = image::open(path).map_err(|source| AssetError::Load {
        path: path.to_path_buf(),
        source,
    })?;
    log::debug!(
        "Decoded {} ({}x{})",
        path.display(),
        img.width(),
        img.height()
    );
    Ok(img.to_rgba8())
}
