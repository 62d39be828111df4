//! Environment radiance for rays that leave the scene.

use std::f32::consts::PI;
use std::sync::Arc;

use crate::Color;
use glint_core::EnvironmentMap;
use glint_math::{Vec2, Vec3};

/// Latitude-longitude coordinates of a direction.
///
/// `v` is the polar angle from +Y over π, `u` the azimuth around +Y
/// (measured from +X toward +Z) over 2π, wrapped into [0, 1).
pub fn direction_to_uv(d: Vec3) -> Vec2 {
    let theta = d.y.clamp(-1.0, 1.0).acos();
    let mut phi = d.z.atan2(d.x);
    if phi < 0.0 {
        phi += 2.0 * PI;
    }
    Vec2::new(phi / (2.0 * PI), theta / PI)
}

/// A shared radiance map and its intensity multiplier.
#[derive(Clone, Debug)]
pub struct Environment {
    map: Arc<EnvironmentMap>,
    multiplier: f32,
}

impl Environment {
    pub fn new(map: Arc<EnvironmentMap>, multiplier: f32) -> Self {
        Self { map, multiplier }
    }

    /// Uniform radiance in every direction.
    pub fn constant(color: Color) -> Self {
        Self::new(Arc::new(EnvironmentMap::constant(color)), 1.0)
    }

    pub fn multiplier(&self) -> f32 {
        self.multiplier
    }

    /// Radiance arriving from direction `wi`.
    pub fn radiance(&self, wi: Vec3) -> Color {
        let uv = direction_to_uv(wi);
        self.multiplier * self.map.sample(uv.x, uv.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poles() {
        assert!((direction_to_uv(Vec3::Y).y - 0.0).abs() < 1e-6);
        assert!((direction_to_uv(Vec3::NEG_Y).y - 1.0).abs() < 1e-6);
        assert!((direction_to_uv(Vec3::X).y - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_azimuth_wraps_into_unit_range() {
        assert!((direction_to_uv(Vec3::X).x - 0.0).abs() < 1e-6);
        assert!((direction_to_uv(Vec3::Z).x - 0.25).abs() < 1e-6);
        assert!((direction_to_uv(Vec3::NEG_X).x - 0.5).abs() < 1e-6);
        // atan2 is negative here, so it gets wrapped
        assert!((direction_to_uv(Vec3::NEG_Z).x - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_slightly_denormalized_direction() {
        // |y| > 1 from rounding must not produce NaN
        let uv = direction_to_uv(Vec3::new(0.0, 1.000_001, 0.0));
        assert!(uv.is_finite());
    }

    #[test]
    fn test_multiplier_scales_radiance() {
        let map = Arc::new(EnvironmentMap::constant(Color::new(0.5, 0.25, 1.0)));
        let env = Environment::new(map, 4.0);
        let l = env.radiance(Vec3::new(0.3, -0.2, 0.9).normalize());
        assert!((l - Color::new(2.0, 1.0, 4.0)).length() < 1e-5);
    }

    #[test]
    fn test_sky_and_ground_rows() {
        // Top row bright, bottom row dark
        let map = EnvironmentMap::from_pixels(2, 2, vec![Color::ONE, Color::ONE, Color::ZERO, Color::ZERO])
            .unwrap();
        let env = Environment::new(Arc::new(map), 1.0);
        assert!(env.radiance(Vec3::Y).x > 0.99);
        assert!(env.radiance(Vec3::NEG_Y).x < 0.01);
    }
}
