// Re-export glam for convenience
pub use glam::*;

// Glint math types
mod frame;
mod interval;
mod ray;

pub use frame::{cosine_sample_hemisphere, reflect, refract, same_hemisphere, Frame};
pub use interval::Interval;
pub use ray::Ray;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glam_reexport() {
        let v = Vec3::new(1.0, 2.0, 3.0) + Vec3::ONE;
        assert_eq!(v, Vec3::new(2.0, 3.0, 4.0));
    }
}
