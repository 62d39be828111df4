//! JSON scene descriptions.
//!
//! A description is plain data: camera, settings, point light,
//! environment, a material table and the primitives referencing it by
//! name. The tracer turns it into a queryable scene.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use glint_math::Vec3;
use serde::Deserialize;
use thiserror::Error;

use crate::{Camera, EnvironmentMap, Material, MaterialError, PointLight, Settings, TextureError};

/// Errors that can occur while loading a scene description.
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid scene description: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Material(#[from] MaterialError),

    #[error(transparent)]
    Texture(#[from] TextureError),

    #[error("material '{0}' is defined more than once")]
    DuplicateMaterial(String),

    #[error("{primitive} references unknown material '{material}'")]
    UnknownMaterial { primitive: String, material: String },

    #[error("sphere {index} has non-positive radius {radius}")]
    InvalidRadius { index: usize, radius: f32 },
}

/// Where environment radiance comes from.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct EnvironmentDescription {
    /// Equirectangular image; relative paths resolve against the scene file
    pub map: Option<PathBuf>,
    /// Constant radiance used when no map is given
    pub color: Vec3,
    pub multiplier: f32,
}

impl Default for EnvironmentDescription {
    fn default() -> Self {
        Self {
            map: None,
            color: Vec3::new(0.6, 0.7, 0.9),
            multiplier: 1.0,
        }
    }
}

impl EnvironmentDescription {
    /// Build the radiance map, loading it from disk if a path is set.
    pub fn build_map(&self, base_dir: Option<&Path>) -> Result<EnvironmentMap, TextureError> {
        match &self.map {
            Some(path) => {
                let full = match base_dir {
                    Some(base) if path.is_relative() => base.join(path),
                    _ => path.clone(),
                };
                EnvironmentMap::load(full)
            }
            None => Ok(EnvironmentMap::constant(self.color)),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct SphereDescription {
    pub center: Vec3,
    pub radius: f32,
    pub material: String,
}

/// Infinite horizontal plane at `height`, facing +Y.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct GroundDescription {
    pub height: f32,
    pub material: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct SceneDescription {
    pub settings: Settings,
    pub camera: Camera,
    pub light: PointLight,
    pub environment: EnvironmentDescription,
    pub materials: Vec<Material>,
    pub spheres: Vec<SphereDescription>,
    pub ground: Option<GroundDescription>,
    /// Directory of the file this was read from
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

impl SceneDescription {
    /// Parse and validate a description from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, SceneError> {
        let desc: SceneDescription = serde_json::from_str(json)?;
        desc.validate()?;
        Ok(desc)
    }

    /// Parse and validate a description file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, SceneError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let mut desc = Self::from_json_str(&json)?;
        desc.base_dir = path.parent().map(Path::to_path_buf);

        log::info!(
            "Loaded scene {}: {} materials, {} spheres{}",
            path.display(),
            desc.materials.len(),
            desc.spheres.len(),
            if desc.ground.is_some() { " + ground" } else { "" }
        );
        Ok(desc)
    }

    /// Look up a material by name.
    pub fn material(&self, name: &str) -> Option<&Material> {
        self.materials.iter().find(|m| m.name == name)
    }

    /// Check material ranges and primitive references.
    pub fn validate(&self) -> Result<(), SceneError> {
        let mut names = HashSet::new();
        for material in &self.materials {
            material.validate()?;
            if !names.insert(material.name.as_str()) {
                return Err(SceneError::DuplicateMaterial(material.name.clone()));
            }
        }

        for (index, sphere) in self.spheres.iter().enumerate() {
            if !(sphere.radius > 0.0) {
                return Err(SceneError::InvalidRadius {
                    index,
                    radius: sphere.radius,
                });
            }
            if !names.contains(sphere.material.as_str()) {
                return Err(SceneError::UnknownMaterial {
                    primitive: format!("sphere {index}"),
                    material: sphere.material.clone(),
                });
            }
        }

        if let Some(ground) = &self.ground {
            if !names.contains(ground.material.as_str()) {
                return Err(SceneError::UnknownMaterial {
                    primitive: "ground".to_string(),
                    material: ground.material.clone(),
                });
            }
        }

        if self.spheres.is_empty() && self.ground.is_none() {
            log::warn!("Scene has no geometry; only the environment will be visible");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::IntegratorMode;

    const SCENE: &str = r#"{
        "settings": { "max_bounces": 4, "integrator": "path_tracing" },
        "camera": { "position": [0.0, 1.0, 5.0], "target": [0.0, 1.0, 0.0] },
        "light": { "position": [0.0, 10.0, 0.0], "intensity_multiplier": 100.0 },
        "environment": { "color": [0.1, 0.1, 0.1], "multiplier": 2.0 },
        "materials": [
            { "name": "floor", "color": [0.8, 0.8, 0.8] },
            { "name": "gold", "color": [1.0, 0.8, 0.3], "metalness": 1.0, "reflectivity": 1.0 }
        ],
        "spheres": [ { "center": [0.0, 1.0, 0.0], "radius": 1.0, "material": "gold" } ],
        "ground": { "height": 0.0, "material": "floor" }
    }"#;

    #[test]
    fn test_parse_scene() {
        let desc = SceneDescription::from_json_str(SCENE).unwrap();

        assert_eq!(desc.settings.max_bounces, 4);
        assert_eq!(desc.settings.integrator, IntegratorMode::PathTracing);
        assert_eq!(desc.camera.position, Vec3::new(0.0, 1.0, 5.0));
        assert_eq!(desc.camera.fov_y, 45.0);
        assert_eq!(desc.light.intensity_multiplier, 100.0);
        assert_eq!(desc.light.color, Vec3::ONE);
        assert_eq!(desc.spheres.len(), 1);
        assert_eq!(desc.material("gold").unwrap().metalness, 1.0);
        assert!(desc.material("silver").is_none());
    }

    #[test]
    fn test_empty_object_is_default_scene() {
        let desc = SceneDescription::from_json_str("{}").unwrap();
        assert!(desc.spheres.is_empty());
        assert_eq!(desc.settings, Settings::default());
    }

    #[test]
    fn test_unknown_material() {
        let json = r#"{ "spheres": [ { "center": [0, 0, 0], "radius": 1.0, "material": "nope" } ] }"#;
        let err = SceneDescription::from_json_str(json).unwrap_err();
        assert!(matches!(err, SceneError::UnknownMaterial { .. }));
    }

    #[test]
    fn test_invalid_material_range() {
        let json = r#"{ "materials": [ { "name": "m", "transparency": 2.0 } ] }"#;
        let err = SceneDescription::from_json_str(json).unwrap_err();
        assert!(matches!(
            err,
            SceneError::Material(MaterialError::FractionOutOfRange { field: "transparency", .. })
        ));
    }

    #[test]
    fn test_duplicate_material() {
        let json = r#"{ "materials": [ { "name": "m" }, { "name": "m" } ] }"#;
        let err = SceneDescription::from_json_str(json).unwrap_err();
        assert!(matches!(err, SceneError::DuplicateMaterial(name) if name == "m"));
    }

    #[test]
    fn test_invalid_radius() {
        let json = r#"{
            "materials": [ { "name": "m" } ],
            "spheres": [ { "center": [0, 0, 0], "radius": 0.0, "material": "m" } ]
        }"#;
        let err = SceneDescription::from_json_str(json).unwrap_err();
        assert!(matches!(err, SceneError::InvalidRadius { index: 0, .. }));
    }

    #[test]
    fn test_malformed_json() {
        let err = SceneDescription::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, SceneError::Parse(_)));
    }

    #[test]
    fn test_constant_environment() {
        let desc = EnvironmentDescription::default();
        let map = desc.build_map(None).unwrap();
        assert_eq!(map.sample(0.3, 0.3), desc.color);
    }
}
