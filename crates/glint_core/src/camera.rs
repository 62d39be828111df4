use glint_math::{Mat4, Vec3};
use serde::Deserialize;

/// Pinhole camera used to build the view and projection transforms the
/// pixel driver un-projects through.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view in degrees
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 2.0, 8.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov_y: 45.0,
            near: 0.1,
            far: 300.0,
        }
    }
}

impl Camera {
    pub fn new(position: Vec3, target: Vec3) -> Self {
        Self {
            position,
            target,
            ..Default::default()
        }
    }

    /// Get the view matrix (world → camera space)
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    /// Get the projection matrix (camera → clip space) for an aspect ratio
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov_y.to_radians(), aspect, self.near, self.far)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_matrix_moves_camera_to_origin() {
        let camera = Camera::new(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO);
        let eye = camera.view_matrix().transform_point3(camera.position);
        assert!(eye.length() < 1e-5);
    }

    #[test]
    fn test_target_is_in_front() {
        let camera = Camera::new(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO);
        let t = camera.view_matrix().transform_point3(Vec3::ZERO);
        // Right-handed view space looks down -Z
        assert!(t.z < 0.0);
    }
}
