//! The ray-query collaborator the integrator traces against.

use glint_core::Material;
use glint_math::{Ray, Vec3};

/// Record of a ray-surface intersection.
///
/// Normals are outward-facing: they are not flipped toward the ray, so
/// the refraction node can tell entering from exiting hits.
#[derive(Debug, Clone, Copy)]
pub struct Intersection<'a> {
    /// Point of intersection
    pub position: Vec3,
    /// Normal of the primitive
    pub geometry_normal: Vec3,
    /// Normal used for shading (interpolated or perturbed)
    pub shading_normal: Vec3,
    /// Unit direction back toward the ray origin
    pub wo: Vec3,
    /// Material at the intersection point
    pub material: &'a Material,
}

/// Anything rays can be traced against.
///
/// Implementations are queried concurrently from the render workers.
pub trait Scene: Send + Sync {
    /// Nearest hit along the ray, within `ray.interval()`.
    fn intersect(&self, ray: &Ray) -> Option<Intersection<'_>>;

    /// True if anything blocks the ray within `ray.interval()`.
    fn occluded(&self, ray: &Ray) -> bool {
        self.intersect(ray).is_some()
    }
}
