//! Latitude-longitude radiance maps.
//!
//! Maps are stored as linear RGB floats. Row 0 is the top of the image
//! (the +Y pole); `u` runs around the horizon.

use std::path::{Path, PathBuf};

use glint_math::Vec3;
use image::DynamicImage;
use thiserror::Error;

/// Errors that can occur while building an environment map.
#[derive(Error, Debug)]
pub enum TextureError {
    #[error("environment map not found: {0}")]
    NotFound(PathBuf),

    #[error("Image decoding error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("expected {expected} pixels for {width}x{height}, got {actual}")]
    InvalidDimensions {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
}

pub type TextureResult<T> = Result<T, TextureError>;

/// Equirectangular radiance map.
#[derive(Clone, Debug)]
pub struct EnvironmentMap {
    width: u32,
    height: u32,
    pixels: Vec<Vec3>,
    /// Source file path (for debugging)
    pub path: String,
}

impl EnvironmentMap {
    /// Create a map from row-major linear pixels.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<Vec3>) -> TextureResult<Self> {
        let expected = width as usize * height as usize;
        if expected == 0 || pixels.len() != expected {
            return Err(TextureError::InvalidDimensions {
                width,
                height,
                expected,
                actual: pixels.len(),
            });
        }

        Ok(Self {
            width,
            height,
            pixels,
            path: "<memory>".to_string(),
        })
    }

    /// A 1x1 map returning the same radiance in every direction.
    pub fn constant(color: Vec3) -> Self {
        Self {
            width: 1,
            height: 1,
            pixels: vec![color],
            path: "<constant>".to_string(),
        }
    }

    /// Load a map from disk. Float formats (Radiance HDR, OpenEXR) are
    /// kept as is; 8/16-bit formats are converted from sRGB to linear.
    pub fn load(path: impl AsRef<Path>) -> TextureResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(TextureError::NotFound(path.to_path_buf()));
        }

        let img = image::open(path)?;
        let is_float = matches!(
            img,
            DynamicImage::ImageRgb32F(_) | DynamicImage::ImageRgba32F(_)
        );
        let rgb = img.into_rgb32f();
        let (width, height) = rgb.dimensions();

        let pixels: Vec<Vec3> = rgb
            .pixels()
            .map(|p| {
                let c = Vec3::new(p[0], p[1], p[2]);
                if is_float {
                    c
                } else {
                    Vec3::new(srgb_to_linear(c.x), srgb_to_linear(c.y), srgb_to_linear(c.z))
                }
            })
            .collect();

        log::debug!(
            "Loaded environment map: {} ({}x{}, {:.1} KB)",
            path.display(),
            width,
            height,
            (pixels.len() * std::mem::size_of::<Vec3>()) as f32 / 1024.0
        );

        let mut map = Self::from_pixels(width, height, pixels)?;
        map.path = path.to_string_lossy().to_string();
        Ok(map)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bilinear lookup; `u` wraps around, `v` is clamped to the poles.
    pub fn sample(&self, u: f32, v: f32) -> Vec3 {
        if self.pixels.len() == 1 {
            return self.pixels[0];
        }

        let x = u.rem_euclid(1.0) * self.width as f32 - 0.5;
        let y = (v.clamp(0.0, 1.0) * self.height as f32 - 0.5)
            .clamp(0.0, (self.height - 1) as f32);

        let fx = x - x.floor();
        let fy = y - y.floor();

        let w = self.width as i64;
        let x0 = (x.floor() as i64).rem_euclid(w) as u32;
        let x1 = ((x.floor() as i64) + 1).rem_euclid(w) as u32;
        let y0 = y.floor() as u32;
        let y1 = (y0 + 1).min(self.height - 1);

        let top = self.pixel(x0, y0).lerp(self.pixel(x1, y0), fx);
        let bottom = self.pixel(x0, y1).lerp(self.pixel(x1, y1), fx);
        top.lerp(bottom, fy)
    }

    fn pixel(&self, x: u32, y: u32) -> Vec3 {
        self.pixels[y as usize * self.width as usize + x as usize]
    }
}

/// Convert an sRGB-encoded channel in [0, 1] to linear.
fn srgb_to_linear(v: f32) -> f32 {
    if v <= 0.04045 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient() -> EnvironmentMap {
        // 4x2: top row red, bottom row blue, one green column
        let r = Vec3::X;
        let g = Vec3::Y;
        let b = Vec3::Z;
        EnvironmentMap::from_pixels(4, 2, vec![r, r, r, g, b, b, b, g]).unwrap()
    }

    #[test]
    fn test_constant_map() {
        let map = EnvironmentMap::constant(Vec3::new(1.0, 0.5, 0.0));
        for (u, v) in [(0.0, 0.0), (0.5, 0.5), (0.99, 1.0), (-3.2, 7.0)] {
            assert!((map.sample(u, v) - Vec3::new(1.0, 0.5, 0.0)).length() < 1e-6);
        }
    }

    #[test]
    fn test_single_texel_is_exact() {
        let c = Vec3::new(0.1, 0.2, 0.3);
        let map = EnvironmentMap::constant(c);
        assert_eq!(map.sample(0.37, 0.61), c);
        assert_eq!(map.sample(0.0, 1.0), c);
    }

    #[test]
    fn test_texel_centers() {
        let map = gradient();
        assert!((map.sample(0.125, 0.25) - Vec3::X).length() < 1e-6);
        assert!((map.sample(0.375, 0.75) - Vec3::Z).length() < 1e-6);
        assert!((map.sample(0.875, 0.25) - Vec3::Y).length() < 1e-6);
    }

    #[test]
    fn test_u_wraps() {
        let map = gradient();
        assert!((map.sample(1.125, 0.25) - map.sample(0.125, 0.25)).length() < 1e-6);
        assert!((map.sample(-0.875, 0.25) - map.sample(0.125, 0.25)).length() < 1e-6);

        // Left edge blends with the last column, not with black
        let edge = map.sample(0.0, 0.25);
        assert!((edge - Vec3::new(0.5, 0.5, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_v_clamps() {
        let map = gradient();
        assert!((map.sample(0.125, -1.0) - Vec3::X).length() < 1e-6);
        assert!((map.sample(0.125, 2.0) - Vec3::Z).length() < 1e-6);
    }

    #[test]
    fn test_from_pixels_rejects_wrong_size() {
        let err = EnvironmentMap::from_pixels(2, 2, vec![Vec3::ONE; 3]).unwrap_err();
        assert!(matches!(err, TextureError::InvalidDimensions { expected: 4, actual: 3, .. }));
    }

    #[test]
    fn test_load_missing_file() {
        let err = EnvironmentMap::load("does/not/exist.hdr").unwrap_err();
        assert!(matches!(err, TextureError::NotFound(_)));
    }

    #[test]
    fn test_srgb_to_linear() {
        assert!((srgb_to_linear(0.0) - 0.0).abs() < 0.001);
        assert!((srgb_to_linear(1.0) - 1.0).abs() < 0.001);

        // Mid-gray is darker in linear
        let mid = srgb_to_linear(0.5);
        assert!(mid < 0.5 && mid > 0.1);
    }
}
