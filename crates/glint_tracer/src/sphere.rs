//! Reference scene: a flat list of spheres over an optional ground plane.
//!
//! Every query walks all primitives; there is no acceleration structure.

use std::collections::HashMap;

use crate::intersection::{Intersection, Scene};
use glint_core::{Material, SceneDescription, SceneError};
use glint_math::{Interval, Ray, Vec3};

/// A sphere primitive referencing a material by index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    center: Vec3,
    radius: f32,
    material: usize,
}

impl Sphere {
    /// Create a new sphere.
    pub fn new(center: Vec3, radius: f32, material: usize) -> Self {
        Self {
            center,
            radius: radius.max(0.0),
            material,
        }
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Nearest root inside `ray_t` and the outward normal there.
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<(f32, Vec3)> {
        let oc = self.center - ray.origin();
        let a = ray.direction().length_squared();
        let h = ray.direction().dot(oc);
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = h * h - a * c;
        if discriminant < 0.0 {
            return None;
        }

        let sqrtd = discriminant.sqrt();

        // Find the nearest root in the acceptable range
        let mut root = (h - sqrtd) / a;
        if !ray_t.surrounds(root) {
            root = (h + sqrtd) / a;
            if !ray_t.surrounds(root) {
                return None;
            }
        }

        let outward_normal = (ray.at(root) - self.center) / self.radius;
        Some((root, outward_normal))
    }
}

/// Infinite horizontal plane facing +Y.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    height: f32,
    material: usize,
}

impl Plane {
    pub fn new(height: f32, material: usize) -> Self {
        Self { height, material }
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<(f32, Vec3)> {
        let dy = ray.direction().y;
        if dy == 0.0 {
            return None;
        }

        let t = (self.height - ray.origin().y) / dy;
        ray_t.surrounds(t).then_some((t, Vec3::Y))
    }
}

/// Spheres and an optional ground plane with their material table.
#[derive(Debug, Clone, Default)]
pub struct SphereScene {
    materials: Vec<Material>,
    spheres: Vec<Sphere>,
    ground: Option<Plane>,
}

impl SphereScene {
    /// Create a new empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a material and return its index.
    pub fn add_material(&mut self, material: Material) -> usize {
        self.materials.push(material);
        self.materials.len() - 1
    }

    /// Add a sphere using a previously registered material.
    pub fn add_sphere(&mut self, center: Vec3, radius: f32, material: usize) {
        debug_assert!(material < self.materials.len());
        self.spheres.push(Sphere::new(center, radius, material));
    }

    /// Set (or replace) the ground plane.
    pub fn set_ground(&mut self, height: f32, material: usize) {
        debug_assert!(material < self.materials.len());
        self.ground = Some(Plane::new(height, material));
    }

    pub fn spheres(&self) -> &[Sphere] {
        &self.spheres
    }

    pub fn ground(&self) -> Option<&Plane> {
        self.ground.as_ref()
    }

    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    /// Build a scene from a validated description.
    pub fn from_description(desc: &SceneDescription) -> Result<Self, SceneError> {
        desc.validate()?;

        let mut scene = Self::new();
        let mut indices = HashMap::new();
        for material in &desc.materials {
            let index = scene.add_material(material.clone());
            indices.insert(material.name.as_str(), index);
        }

        let lookup = |primitive: String, name: &str| {
            indices
                .get(name)
                .copied()
                .ok_or_else(|| SceneError::UnknownMaterial {
                    primitive,
                    material: name.to_string(),
                })
        };

        for (index, sphere) in desc.spheres.iter().enumerate() {
            let material = lookup(format!("sphere {index}"), &sphere.material)?;
            scene.add_sphere(sphere.center, sphere.radius, material);
        }

        if let Some(ground) = &desc.ground {
            let material = lookup("ground".to_string(), &ground.material)?;
            scene.set_ground(ground.height, material);
        }

        log::debug!(
            "Built sphere scene: {} spheres, ground: {}",
            scene.spheres.len(),
            scene.ground.is_some()
        );
        Ok(scene)
    }

    /// Closest primitive hit: (t, outward normal, material index).
    fn closest_hit(&self, ray: &Ray) -> Option<(f32, Vec3, usize)> {
        let ray_t = ray.interval();
        let mut closest: Option<(f32, Vec3, usize)> = None;

        if let Some(ground) = &self.ground {
            if let Some((t, normal)) = ground.hit(ray, ray_t) {
                closest = Some((t, normal, ground.material));
            }
        }

        for sphere in &self.spheres {
            let interval = closest.map_or(ray_t, |(t, _, _)| ray_t.with_max(t));
            if let Some((t, normal)) = sphere.hit(ray, interval) {
                closest = Some((t, normal, sphere.material));
            }
        }

        closest
    }
}

impl Scene for SphereScene {
    fn intersect(&self, ray: &Ray) -> Option<Intersection<'_>> {
        let (t, normal, material) = self.closest_hit(ray)?;
        Some(Intersection {
            position: ray.at(t),
            geometry_normal: normal,
            shading_normal: normal,
            wo: -ray.direction(),
            material: &self.materials[material],
        })
    }

    fn occluded(&self, ray: &Ray) -> bool {
        let ray_t = ray.interval();
        self.ground.is_some_and(|g| g.hit(ray, ray_t).is_some())
            || self.spheres.iter().any(|s| s.hit(ray, ray_t).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_spheres() -> SphereScene {
        let mut scene = SphereScene::new();
        let red = scene.add_material(Material::diffuse(Vec3::X).with_name("red"));
        let blue = scene.add_material(Material::diffuse(Vec3::Z).with_name("blue"));
        scene.add_sphere(Vec3::new(0.0, 0.0, -3.0), 1.0, red);
        scene.add_sphere(Vec3::new(0.0, 0.0, -6.0), 1.0, blue);
        scene
    }

    #[test]
    fn test_sphere_hit() {
        let sphere = Sphere::new(Vec3::new(0.0, 0.0, -1.0), 0.5, 0);
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);

        let (t, normal) = sphere.hit(&ray, ray.interval()).unwrap();
        assert!((t - 0.5).abs() < 1e-5);
        assert!((normal - Vec3::Z).length() < 1e-5);
    }

    #[test]
    fn test_sphere_miss() {
        let sphere = Sphere::new(Vec3::new(0.0, 0.0, -1.0), 0.5, 0);
        let ray = Ray::new(Vec3::ZERO, Vec3::Y);
        assert!(sphere.hit(&ray, ray.interval()).is_none());
    }

    #[test]
    fn test_closest_hit_wins() {
        let scene = two_spheres();
        let hit = scene.intersect(&Ray::new(Vec3::ZERO, Vec3::NEG_Z)).unwrap();

        assert!((hit.position - Vec3::new(0.0, 0.0, -2.0)).length() < 1e-4);
        assert_eq!(hit.material.name, "red");
        assert!((hit.wo - Vec3::Z).length() < 1e-6);
    }

    #[test]
    fn test_normal_is_outward_from_inside() {
        let scene = two_spheres();
        let hit = scene
            .intersect(&Ray::new(Vec3::new(0.0, 0.0, -3.0), Vec3::NEG_Z))
            .unwrap();

        // Exiting the red sphere: the normal still points away from its center
        assert!((hit.geometry_normal - Vec3::NEG_Z).length() < 1e-5);
        assert!(hit.wo.dot(hit.geometry_normal) < 0.0);
    }

    #[test]
    fn test_bounded_ray_stops_short() {
        let scene = two_spheres();
        let short = Ray::bounded(Vec3::ZERO, Vec3::NEG_Z, 1.5);
        let long = Ray::bounded(Vec3::ZERO, Vec3::NEG_Z, 2.5);

        assert!(scene.intersect(&short).is_none());
        assert!(!scene.occluded(&short));
        assert!(scene.occluded(&long));
    }

    #[test]
    fn test_ground_plane() {
        let mut scene = SphereScene::new();
        let floor = scene.add_material(Material::diffuse(Vec3::ONE));
        scene.set_ground(-1.0, floor);

        let down = Ray::new(Vec3::new(2.0, 1.0, 0.0), Vec3::NEG_Y);
        let hit = scene.intersect(&down).unwrap();
        assert!((hit.position - Vec3::new(2.0, -1.0, 0.0)).length() < 1e-5);
        assert_eq!(hit.geometry_normal, Vec3::Y);

        assert!(scene.intersect(&Ray::new(Vec3::ZERO, Vec3::Y)).is_none());
        assert!(scene.intersect(&Ray::new(Vec3::ZERO, Vec3::X)).is_none());
    }

    #[test]
    fn test_sphere_in_front_of_ground() {
        let mut scene = SphereScene::new();
        let floor = scene.add_material(Material::diffuse(Vec3::ONE).with_name("floor"));
        let ball = scene.add_material(Material::diffuse(Vec3::X).with_name("ball"));
        scene.set_ground(0.0, floor);
        scene.add_sphere(Vec3::new(0.0, 1.0, 0.0), 1.0, ball);

        let hit = scene
            .intersect(&Ray::new(Vec3::new(0.0, 5.0, 0.0), Vec3::NEG_Y))
            .unwrap();
        assert_eq!(hit.material.name, "ball");
        assert!((hit.position.y - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_from_description() {
        let json = r#"{
            "materials": [
                { "name": "floor", "color": [0.8, 0.8, 0.8] },
                { "name": "glass", "transparency": 1.0, "reflectivity": 1.0 }
            ],
            "spheres": [
                { "center": [0.0, 1.0, 0.0], "radius": 1.0, "material": "glass" },
                { "center": [2.0, 1.0, 0.0], "radius": 0.5, "material": "floor" }
            ],
            "ground": { "height": 0.0, "material": "floor" }
        }"#;
        let desc = SceneDescription::from_json_str(json).unwrap();
        let scene = SphereScene::from_description(&desc).unwrap();

        assert_eq!(scene.materials().len(), 2);
        assert_eq!(scene.spheres().len(), 2);
        assert_eq!(scene.spheres()[0].radius(), 1.0);
        assert_eq!(scene.ground().map(Plane::height), Some(0.0));

        let hit = scene
            .intersect(&Ray::new(Vec3::new(0.0, 1.0, 5.0), Vec3::NEG_Z))
            .unwrap();
        assert_eq!(hit.material.name, "glass");
    }

    #[test]
    fn test_from_description_rejects_unknown_material() {
        let mut desc = SceneDescription::default();
        desc.materials.push(Material::diffuse(Vec3::ONE).with_name("floor"));
        desc.ground = Some(glint_core::GroundDescription {
            height: 0.0,
            material: "marble".to_string(),
        });

        let err = SphereScene::from_description(&desc).unwrap_err();
        assert!(matches!(err, SceneError::UnknownMaterial { .. }));
    }
}
