//! Flat material parameters consumed by the reflectance tree.

use glint_math::Vec3;
use serde::Deserialize;
use thiserror::Error;

/// Errors reported by [`Material::validate`].
#[derive(Error, Debug, PartialEq)]
pub enum MaterialError {
    #[error("material '{material}': {field} = {value} is outside [0, 1]")]
    FractionOutOfRange {
        material: String,
        field: &'static str,
        value: f32,
    },

    #[error("material '{material}': {field} = {value} must be non-negative")]
    Negative {
        material: String,
        field: &'static str,
        value: f32,
    },
}

/// Surface description for one hit.
///
/// The fractions are expected in [0, 1]. The shading code does not clamp
/// them; call [`Material::validate`] before handing materials to a renderer.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Material {
    /// Lookup name used by the scene description
    pub name: String,

    /// Base color (albedo, metal tint, glass tint)
    pub color: Vec3,

    /// Blinn-Phong exponent of the microfacet lobe
    pub shininess: f32,

    /// Fresnel reflectance at normal incidence (R0)
    pub fresnel: f32,

    /// Refraction vs. diffuse under the dielectric coat
    pub transparency: f32,

    /// Metal vs. dielectric coat
    pub metalness: f32,

    /// Coated (metal/dielectric) vs. uncoated base
    pub reflectivity: f32,

    /// Emitted radiance as a multiple of `color`
    pub emission: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: String::new(),
            color: Vec3::new(0.5, 0.5, 0.5),
            shininess: 25.0,
            fresnel: 0.04,
            transparency: 0.0,
            metalness: 0.0,
            reflectivity: 0.0,
            emission: 0.0,
        }
    }
}

impl Material {
    /// Create a named material with just a base color.
    pub fn new(name: impl Into<String>, color: Vec3) -> Self {
        Self {
            name: name.into(),
            color,
            ..Default::default()
        }
    }

    /// Pure Lambertian surface.
    pub fn diffuse(color: Vec3) -> Self {
        Self {
            color,
            ..Default::default()
        }
    }

    /// Fully reflective metal with a tinted microfacet lobe.
    pub fn metal(color: Vec3, shininess: f32) -> Self {
        Self {
            color,
            shininess,
            fresnel: 0.9,
            metalness: 1.0,
            reflectivity: 1.0,
            ..Default::default()
        }
    }

    /// Glossy coated glass.
    pub fn glass(color: Vec3, shininess: f32) -> Self {
        Self {
            color,
            shininess,
            fresnel: 0.04,
            transparency: 1.0,
            reflectivity: 1.0,
            ..Default::default()
        }
    }

    /// Builder method to set the emission scale.
    pub fn with_emission(mut self, emission: f32) -> Self {
        self.emission = emission;
        self
    }

    /// Builder method to set the name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Check the parameter ranges the shading code assumes.
    pub fn validate(&self) -> Result<(), MaterialError> {
        let fractions = [
            ("fresnel", self.fresnel),
            ("transparency", self.transparency),
            ("metalness", self.metalness),
            ("reflectivity", self.reflectivity),
        ];
        for (field, value) in fractions {
            if !(0.0..=1.0).contains(&value) {
                return Err(MaterialError::FractionOutOfRange {
                    material: self.name.clone(),
                    field,
                    value,
                });
            }
        }

        let non_negative = [
            ("shininess", self.shininess),
            ("emission", self.emission),
            ("color.r", self.color.x),
            ("color.g", self.color.y),
            ("color.b", self.color.z),
        ];
        for (field, value) in non_negative {
            // NaN fails this comparison too
            if !(value >= 0.0) {
                return Err(MaterialError::Negative {
                    material: self.name.clone(),
                    field,
                    value,
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_validate() {
        assert!(Material::default().validate().is_ok());
        assert!(Material::diffuse(Vec3::ONE).validate().is_ok());
        assert!(Material::metal(Vec3::new(1.0, 0.8, 0.2), 500.0).validate().is_ok());
        assert!(Material::glass(Vec3::ONE, 1000.0).validate().is_ok());
    }

    #[test]
    fn test_fraction_out_of_range() {
        let mut mat = Material::new("bad", Vec3::ONE);
        mat.metalness = 1.5;

        let err = mat.validate().unwrap_err();
        assert_eq!(
            err,
            MaterialError::FractionOutOfRange {
                material: "bad".to_string(),
                field: "metalness",
                value: 1.5,
            }
        );
        assert!(err.to_string().contains("metalness"));
    }

    #[test]
    fn test_negative_shininess() {
        let mut mat = Material::default();
        mat.shininess = -1.0;
        assert!(matches!(
            mat.validate(),
            Err(MaterialError::Negative { field: "shininess", .. })
        ));
    }

    #[test]
    fn test_deserialize_partial() {
        let mat: Material =
            serde_json::from_str(r#"{ "name": "red", "color": [1.0, 0.0, 0.0], "metalness": 0.5 }"#)
                .unwrap();
        assert_eq!(mat.name, "red");
        assert_eq!(mat.color, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(mat.metalness, 0.5);
        // Missing fields fall back to defaults
        assert_eq!(mat.fresnel, 0.04);
    }
}
