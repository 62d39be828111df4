//! Glint tracer - progressive CPU path tracing.
//!
//! A unidirectional Monte Carlo path tracer with next-event estimation
//! toward a single point light, a per-hit reflectance tree built from
//! flat material parameters, and a running-mean image accumulator that
//! refines the picture one sample per pixel per frame.
//!
//! Ray queries go through the [`Scene`] trait; [`SphereScene`] is the
//! reference implementation used by the command line renderer.

mod accumulator;
mod brdf;
mod environment;
mod integrator;
mod intersection;
mod renderer;
mod sphere;

pub use accumulator::{color_to_rgba, running_mean, Image};
pub use brdf::{
    with_material_brdf, BlinnPhong, BlinnPhongMetal, Brdf, BrdfSample, Diffuse, LinearBlend,
    Refraction,
};
pub use environment::{direction_to_uv, Environment};
pub use integrator::{Integrator, EPSILON, PDF_THRESHOLD};
pub use intersection::{Intersection, Scene};
pub use renderer::{RenderContext, ScreenRays};
pub use sphere::{Plane, Sphere, SphereScene};

/// Re-export the scene data this crate consumes
pub use glint_core::{IntegratorMode, Material, PointLight, Settings};
pub use glint_math::{Ray, Vec3};

use rand::{Rng, RngCore};

/// Color type alias (linear RGB radiance)
pub type Color = Vec3;

/// Uniform random number in [0, 1).
#[inline]
pub fn gen_f32(rng: &mut dyn RngCore) -> f32 {
    rng.gen()
}
