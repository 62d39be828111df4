use crate::{Interval, Vec3};

/// A query ray: origin, unit direction and an optional far limit.
///
/// Rays are values. A new path segment is a new `Ray`; the `with_*`
/// methods return a modified copy and re-normalize the direction.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    origin: Vec3,
    direction: Vec3,
    max_distance: Option<f32>,
}

impl Ray {
    /// Create a new unbounded ray. The direction is normalized; a
    /// degenerate direction falls back to +Z.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.try_normalize().unwrap_or(Vec3::Z),
            max_distance: None,
        }
    }

    /// Create a ray that stops after `max_distance` units (shadow rays).
    pub fn bounded(origin: Vec3, direction: Vec3, max_distance: f32) -> Self {
        Self {
            max_distance: Some(max_distance),
            ..Self::new(origin, direction)
        }
    }

    /// Get the origin point of the ray.
    #[inline]
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Get the unit direction of the ray.
    #[inline]
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    #[inline]
    pub fn max_distance(&self) -> Option<f32> {
        self.max_distance
    }

    /// Parametric range a hit must fall into.
    #[inline]
    pub fn interval(&self) -> Interval {
        Interval::new(0.0, self.max_distance.unwrap_or(f32::INFINITY))
    }

    /// Copy of this ray starting somewhere else.
    pub fn with_origin(&self, origin: Vec3) -> Self {
        Self { origin, ..*self }
    }

    /// Copy of this ray pointing somewhere else.
    pub fn with_direction(&self, direction: Vec3) -> Self {
        Self {
            direction: direction.try_normalize().unwrap_or(Vec3::Z),
            ..*self
        }
    }

    /// Get the point along the ray at parameter t.
    ///
    /// Returns: origin + t * direction
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ray_normalizes_direction() {
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 3.0, 4.0));
        assert!((ray.direction().length() - 1.0).abs() < 1e-6);
        assert!((ray.direction() - Vec3::new(0.0, 0.6, 0.8)).length() < 1e-6);
    }

    #[test]
    fn test_ray_at() {
        let ray = Ray::new(Vec3::ZERO, Vec3::X);

        assert_eq!(ray.at(0.0), Vec3::ZERO);
        assert_eq!(ray.at(1.0), Vec3::X);
        assert_eq!(ray.at(2.0), Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(ray.at(-1.0), Vec3::new(-1.0, 0.0, 0.0));
    }

    #[test]
    fn test_ray_degenerate_direction() {
        let ray = Ray::new(Vec3::ONE, Vec3::ZERO);
        assert_eq!(ray.direction(), Vec3::Z);
    }

    #[test]
    fn test_ray_mutators_return_new_values() {
        let ray = Ray::bounded(Vec3::ZERO, Vec3::Y, 5.0);
        let moved = ray.with_origin(Vec3::X);
        let turned = ray.with_direction(Vec3::new(2.0, 0.0, 0.0));

        // Original is untouched
        assert_eq!(ray.origin(), Vec3::ZERO);
        assert_eq!(ray.direction(), Vec3::Y);

        assert_eq!(moved.origin(), Vec3::X);
        assert_eq!(moved.max_distance(), Some(5.0));
        assert_eq!(turned.direction(), Vec3::X);
    }

    #[test]
    fn test_ray_interval() {
        assert_eq!(Ray::new(Vec3::ZERO, Vec3::Y).interval().max, f32::INFINITY);
        assert_eq!(Ray::bounded(Vec3::ZERO, Vec3::Y, 2.5).interval().max, 2.5);
    }
}
