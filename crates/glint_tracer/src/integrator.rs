//! Radiance estimation along light paths.
//!
//! Paths start at a primary hit and extend by importance sampling the
//! per-hit reflectance tree. Every vertex adds a shadow-tested
//! contribution from the point light and its own emission; a path that
//! escapes picks up the environment.

use crate::brdf::{with_material_brdf, Brdf};
use crate::environment::Environment;
use crate::intersection::{Intersection, Scene};
use crate::Color;
use glint_core::{IntegratorMode, PointLight, Settings};
use glint_math::Ray;
use rand::RngCore;

/// Offset applied along the geometry normal when spawning rays.
pub const EPSILON: f32 = 1e-4;

/// Samples with a smaller density end the path.
pub const PDF_THRESHOLD: f32 = 1e-5;

/// Read-only per-frame state shared by all render workers.
#[derive(Clone, Copy)]
pub struct Integrator<'a> {
    max_bounces: u32,
    mode: IntegratorMode,
    light: &'a PointLight,
    environment: &'a Environment,
}

impl<'a> Integrator<'a> {
    pub fn new(settings: &Settings, light: &'a PointLight, environment: &'a Environment) -> Self {
        Self {
            max_bounces: settings.max_bounces,
            mode: settings.integrator,
            light,
            environment,
        }
    }

    /// Outgoing radiance at `hit` toward `hit.wo`, using the configured mode.
    pub fn radiance(&self, scene: &dyn Scene, hit: &Intersection<'_>, rng: &mut dyn RngCore) -> Color {
        match self.mode {
            IntegratorMode::DirectLighting => self.direct_light(scene, hit),
            IntegratorMode::PathTracing => self.path_trace(scene, hit, rng),
        }
    }

    /// Radiance for a ray that hits nothing.
    pub fn background(&self, ray: &Ray) -> Color {
        self.environment.radiance(ray.direction())
    }

    /// Single-vertex estimate: point light plus emission, no bounces.
    pub fn direct_light(&self, scene: &dyn Scene, hit: &Intersection<'_>) -> Color {
        with_material_brdf(hit.material, |brdf| {
            self.light_contribution(scene, hit, brdf) + emitted(hit)
        })
    }

    /// Unidirectional path tracing with next-event estimation.
    pub fn path_trace<'s>(
        &self,
        scene: &'s dyn Scene,
        hit: &Intersection<'s>,
        rng: &mut dyn RngCore,
    ) -> Color {
        let mut radiance = Color::ZERO;
        let mut throughput = Color::ONE;
        let mut current = *hit;

        for _ in 0..self.max_bounces {
            let hit = current;
            let n = hit.shading_normal;

            let next = with_material_brdf(hit.material, |brdf| {
                radiance += throughput * self.light_contribution(scene, &hit, brdf);
                radiance += throughput * emitted(&hit);

                let sample = brdf.sample_wi(hit.wo, n, &mut *rng);
                if sample.pdf < PDF_THRESHOLD {
                    return None;
                }

                throughput *= sample.value * sample.wi.dot(n).abs() / sample.pdf;
                (throughput != Color::ZERO).then_some(sample.wi)
            });

            let Some(wi) = next else {
                return radiance;
            };

            // Transmitted rays leave from below the surface
            let offset = if wi.dot(hit.geometry_normal) < 0.0 {
                -EPSILON
            } else {
                EPSILON
            };
            let ray = Ray::new(hit.position + offset * hit.geometry_normal, wi);

            match scene.intersect(&ray) {
                Some(next_hit) => current = next_hit,
                None => {
                    radiance += throughput * self.environment.radiance(wi);
                    return radiance;
                }
            }
        }

        radiance
    }

    /// Shadow-tested light from the point light reflected toward `hit.wo`.
    fn light_contribution(&self, scene: &dyn Scene, hit: &Intersection<'_>, brdf: &dyn Brdf) -> Color {
        let n = hit.shading_normal;
        let light = self.light.sample_at(hit.position);

        let origin = hit.position + EPSILON * hit.geometry_normal;
        let shadow_ray = Ray::bounded(origin, light.wi, light.distance);
        if scene.occluded(&shadow_ray) {
            return Color::ZERO;
        }

        brdf.f(light.wi, hit.wo, n) * light.radiance * light.wi.dot(n).max(0.0)
    }
}

#[inline]
fn emitted(hit: &Intersection<'_>) -> Color {
    hit.material.emission * hit.material.color
}
