//! Glint Core - scene data for the Glint path tracer.
//!
//! This crate provides:
//!
//! - **Shading inputs**: `Material`, `PointLight`, `EnvironmentMap`
//! - **Configuration**: `Settings` and the JSON `SceneDescription`
//!
//! # Example
//!
//! ```ignore
//! use glint_core::SceneDescription;
//!
//! let desc = SceneDescription::from_json_file("scenes/spheres.json")?;
//! println!("{} materials, {} spheres", desc.materials.len(), desc.spheres.len());
//! ```

pub mod camera;
pub mod environment_map;
pub mod light;
pub mod material;
pub mod scene;
pub mod settings;

// Re-export commonly used types
pub use camera::Camera;
pub use environment_map::{EnvironmentMap, TextureError, TextureResult};
pub use light::PointLight;
pub use material::{Material, MaterialError};
pub use scene::{EnvironmentDescription, GroundDescription, SceneDescription, SceneError, SphereDescription};
pub use settings::{IntegratorMode, Settings};
