use clap::Parser;
use std::path::PathBuf;

/// `parallax_viewer` - an interactive depth-parallax scene viewer.
///
/// Renders a still scene composed of a background plane, a subject plane
/// displaced by a depth map, and a generated title label, with pointer
/// parallax and screen-tracked annotation bubbles. All values are read
/// once at startup and never re-read at runtime.
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Path to the background image (defines the composition aspect).
    #[arg(long, env = "PARALLAX_BACKGROUND", default_value = "images/background.jpg")]
    pub background: PathBuf,

    /// Path to the subject color image (alpha-cut foreground).
    #[arg(long, env = "PARALLAX_SUBJECT", default_value = "images/subject.png")]
    pub subject: PathBuf,

    /// Path to the subject depth map (white = near).
    #[arg(long, env = "PARALLAX_DEPTH", default_value = "images/subject-depth.png")]
    pub depth_map: PathBuf,

    /// Horizontal focal bias in [0, 1]: which part of an over-wide
    /// composition stays visible in a narrow viewport (0.5 = centered).
    #[arg(long, default_value_t = 0.5)]
    pub focus_x: f32,

    /// Overscan multiplier (>= 1) applied on top of the exact cover fit.
    #[arg(long, default_value_t = 1.0)]
    pub overscan: f32,

    /// Peak vertex displacement of the subject, in composition units.
    #[arg(long, default_value_t = 0.15)]
    pub displacement_scale: f32,

    /// Subdivision count per axis of the subject plane.
    #[arg(long, default_value_t = 1024)]
    pub displacement_segments: u32,

    /// Maximum parallax rotation in degrees.
    #[arg(long, default_value_t = 8.0)]
    pub parallax_intensity: f32,

    /// Per-frame pointer smoothing constant, in (0, 1).
    #[arg(long, default_value_t = 0.025)]
    pub smoothing: f32,

    /// Camera vertical field of view in degrees.
    #[arg(long, default_value_t = 80.0)]
    pub fov: f32,

    /// Camera distance to the composition plane.
    #[arg(long, default_value_t = 2.0)]
    pub camera_z: f32,

    /// Title text rendered into the label texture.
    #[arg(long, default_value = "Zakim Bridge")]
    pub title: String,

    /// Substring of the title that highlights on hover.
    #[arg(long, default_value = "Zakim")]
    pub title_highlight: String,

    /// Tolerance margin for the hover-region test, in normalized texture
    /// units, applied on every side of the highlight bounds.
    #[arg(long, default_value_t = 0.015)]
    pub hover_tolerance: f32,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.smoothing > 0.0 && self.smoothing < 1.0,
            "smoothing must be in (0, 1), got {}",
            self.smoothing
        );
        anyhow::ensure!(
            (0.0..=1.0).contains(&self.focus_x),
            "focus-x must be in [0, 1], got {}",
            self.focus_x
        );
        anyhow::ensure!(
            self.overscan >= 1.0,
            "overscan must be >= 1, got {}",
            self.overscan
        );
        anyhow::ensure!(
            self.displacement_segments >= 1,
            "displacement-segments must be at least 1"
        );
        anyhow::ensure!(
            self.fov > 0.0 && self.fov < 180.0,
            "fov must be in (0, 180), got {}",
            self.fov
        );
        anyhow::ensure!(self.camera_z > 0.0, "camera-z must be positive");
        anyhow::ensure!(
            self.hover_tolerance >= 0.0,
            "hover-tolerance must be non-negative"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> Config {
        Config::parse_from(["parallax_viewer"])
    }

    #[test]
    fn default_config_is_valid() {
        assert!(defaults().validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range_smoothing() {
        let mut cfg = defaults();
        cfg.smoothing = 0.0;
        assert!(cfg.validate().is_err());
        cfg.smoothing = 1.0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_under_unity_overscan() {
        let mut cfg = defaults();
        cfg.overscan = 0.9;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_out_of_range_focus() {
        let mut cfg = defaults();
        cfg.focus_x = 1.2;
        assert!(cfg.validate().is_err());
    }
}
