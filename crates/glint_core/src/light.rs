//! The single point light of a scene.

use glint_math::Vec3;
use serde::Deserialize;

/// Isotropic point light with inverse-square falloff.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct PointLight {
    pub position: Vec3,
    pub color: Vec3,
    pub intensity_multiplier: f32,
}

impl Default for PointLight {
    fn default() -> Self {
        Self {
            position: Vec3::new(10.0, 25.0, 20.0),
            color: Vec3::ONE,
            intensity_multiplier: 2500.0,
        }
    }
}

/// Light arriving at a shading point.
#[derive(Debug, Clone, Copy)]
pub struct LightSample {
    /// Unit direction from the point toward the light
    pub wi: Vec3,
    /// Distance to the light
    pub distance: f32,
    /// Incident radiance (already divided by distance squared)
    pub radiance: Vec3,
}

impl PointLight {
    pub fn new(position: Vec3, color: Vec3, intensity_multiplier: f32) -> Self {
        Self {
            position,
            color,
            intensity_multiplier,
        }
    }

    /// Direction, distance and falloff-scaled radiance seen from `p`.
    pub fn sample_at(&self, p: Vec3) -> LightSample {
        let to_light = self.position - p;
        let distance = to_light.length();
        let falloff = 1.0 / (distance * distance).max(1e-8);

        LightSample {
            wi: to_light.try_normalize().unwrap_or(Vec3::Y),
            distance,
            radiance: self.intensity_multiplier * self.color * falloff,
        }
    }
}
