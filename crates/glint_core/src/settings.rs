//! Renderer configuration.

use serde::Deserialize;

/// Which radiance estimator the pixel driver runs for each primary hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegratorMode {
    /// Point-light shading of the first hit only
    DirectLighting,
    /// Bounded random walk with next-event estimation
    #[default]
    PathTracing,
}

/// Render settings owned by the render context.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Maximum path vertices per sample
    pub max_bounces: u32,
    /// Stop accumulating after this many frames (0 = never stop)
    pub max_paths_per_pixel: u32,
    /// Display pixels per traced pixel along each axis
    pub subsampling: u32,
    pub integrator: IntegratorMode,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_bounces: 8,
            max_paths_per_pixel: 0,
            subsampling: 1,
            integrator: IntegratorMode::PathTracing,
        }
    }
}

impl Settings {
    /// Traced resolution for a display resolution.
    pub fn traced_resolution(&self, display_width: u32, display_height: u32) -> (u32, u32) {
        let s = self.subsampling.max(1);
        (display_width / s, display_height / s)
    }

    /// True once `samples` frames satisfy the configured cap.
    pub fn sample_cap_reached(&self, samples: u32) -> bool {
        self.max_paths_per_pixel != 0 && samples >= self.max_paths_per_pixel
    }
}
