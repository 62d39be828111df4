//! Shading-frame helpers shared by the reflectance nodes.

use crate::Vec3;
use std::f32::consts::PI;

/// Orthonormal tangent frame around a unit normal.
#[derive(Debug, Clone, Copy)]
pub struct Frame {
    pub tangent: Vec3,
    pub bitangent: Vec3,
    pub normal: Vec3,
}

impl Frame {
    /// Build a frame from a unit normal (Duff et al. branchless basis).
    pub fn from_normal(n: Vec3) -> Self {
        let sign = if n.z >= 0.0 { 1.0 } else { -1.0 };
        let a = -1.0 / (sign + n.z);
        let b = n.x * n.y * a;

        let tangent = Vec3::new(1.0 + sign * n.x * n.x * a, sign * b, -sign * n.x);
        let bitangent = Vec3::new(b, sign + n.y * n.y * a, -n.y);

        Self {
            tangent,
            bitangent,
            normal: n,
        }
    }

    /// Map a local direction (z = normal) to world space.
    #[inline]
    pub fn to_world(&self, local: Vec3) -> Vec3 {
        local.x * self.tangent + local.y * self.bitangent + local.z * self.normal
    }
}

/// Cosine-weighted direction in the local frame (z up) from two uniform numbers.
pub fn cosine_sample_hemisphere(u1: f32, u2: f32) -> Vec3 {
    let r = u1.sqrt();
    let phi = 2.0 * PI * u2;
    Vec3::new(r * phi.cos(), r * phi.sin(), (1.0 - u1).max(0.0).sqrt())
}

/// Reflect a vector about a normal.
#[inline]
pub fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

/// Refract incident direction `i` through normal `n` with ratio `eta`.
///
/// Returns `None` on total internal reflection.
#[inline]
pub fn refract(i: Vec3, n: Vec3, eta: f32) -> Option<Vec3> {
    let n_dot_i = n.dot(i);
    let k = 1.0 - eta * eta * (1.0 - n_dot_i * n_dot_i);
    if k < 0.0 {
        None
    } else {
        Some(eta * i - (eta * n_dot_i + k.sqrt()) * n)
    }
}

/// True if `wi` and `wo` lie on the same side of `n`.
#[inline]
pub fn same_hemisphere(wi: Vec3, wo: Vec3, n: Vec3) -> bool {
    wi.dot(n) * wo.dot(n) > 0.0
}
