//! Composable reflectance nodes.
//!
//! Every node can evaluate its BRDF for a pair of directions and draw an
//! importance-sampled incoming direction. Layered materials are built by
//! borrowing sub-nodes, so a whole tree lives on the stack for the
//! duration of one shading evaluation (see [`with_material_brdf`]).
//!
//! Directions follow the usual convention: `wo` points from the surface
//! toward the viewer, `wi` from the surface toward the light.

use crate::{gen_f32, Color};
use glint_core::Material;
use glint_math::{cosine_sample_hemisphere, reflect, refract, same_hemisphere, Frame, Vec3};
use rand::RngCore;
use std::f32::consts::PI;

/// Index of refraction outside a transmissive surface (air).
const IOR_OUTSIDE: f32 = 1.00;

/// Index of refraction inside a transmissive surface (glass).
const IOR_INSIDE: f32 = 1.52;

/// Result of importance sampling a node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrdfSample {
    /// Sampled incoming direction
    pub wi: Vec3,
    /// BRDF value transported along `wi`
    pub value: Color,
    /// Density of `wi`; zero means the path should stop
    pub pdf: f32,
}

impl BrdfSample {
    /// A sample that carries nothing.
    pub fn absorbed(wi: Vec3) -> Self {
        Self {
            wi,
            value: Color::ZERO,
            pdf: 0.0,
        }
    }
}

/// A node of the reflectance tree.
pub trait Brdf {
    /// BRDF value for light arriving along `wi` and leaving along `wo`.
    fn f(&self, wi: Vec3, wo: Vec3, n: Vec3) -> Color;

    /// Draw an incoming direction for outgoing direction `wo`.
    fn sample_wi(&self, wo: Vec3, n: Vec3, rng: &mut dyn RngCore) -> BrdfSample;
}

/// Schlick's approximation, `one_minus_cos` already clamped by the caller.
#[inline]
fn schlick(r0: f32, one_minus_cos: f32) -> f32 {
    r0 + (1.0 - r0) * one_minus_cos.powi(5)
}

// =============================================================================
// Diffuse
// =============================================================================

/// Lambertian reflector.
#[derive(Debug, Clone, Copy)]
pub struct Diffuse {
    color: Color,
}

impl Diffuse {
    pub fn new(color: Color) -> Self {
        Self { color }
    }
}

impl Brdf for Diffuse {
    fn f(&self, wi: Vec3, wo: Vec3, n: Vec3) -> Color {
        if wi.dot(n) <= 0.0 || !same_hemisphere(wi, wo, n) {
            return Color::ZERO;
        }
        self.color / PI
    }

    fn sample_wi(&self, wo: Vec3, n: Vec3, rng: &mut dyn RngCore) -> BrdfSample {
        let frame = Frame::from_normal(n);
        let local = cosine_sample_hemisphere(gen_f32(rng), gen_f32(rng));
        let wi = frame.to_world(local).normalize();

        let cos_theta = wi.dot(n);
        let pdf = if cos_theta <= 0.0 { 0.0 } else { cos_theta / PI };

        BrdfSample {
            wi,
            value: self.f(wi, wo, n),
            pdf,
        }
    }
}

// =============================================================================
// Refraction
// =============================================================================

/// Perfectly smooth glass: refracts, or mirrors on total internal reflection.
#[derive(Debug, Clone, Copy)]
pub struct Refraction {
    color: Color,
}

impl Refraction {
    pub fn new(color: Color) -> Self {
        Self { color }
    }

    /// The single direction light can arrive from to leave along `wo`.
    pub fn transmitted_direction(wo: Vec3, n: Vec3) -> Vec3 {
        let incident = -wo;
        let cos_i = incident.dot(n).clamp(-1.0, 1.0);

        // Entering when the incident ray opposes the outward normal
        let (eta_i, eta_t, normal) = if cos_i < 0.0 {
            (IOR_OUTSIDE, IOR_INSIDE, n)
        } else {
            (IOR_INSIDE, IOR_OUTSIDE, -n)
        };

        // Snell's discriminant < 0 means total internal reflection
        match refract(incident, normal, eta_i / eta_t) {
            Some(transmitted) => transmitted,
            None => reflect(incident, normal),
        }
    }
}

impl Brdf for Refraction {
    fn f(&self, _wi: Vec3, _wo: Vec3, _n: Vec3) -> Color {
        // Delta distribution, nothing to evaluate
        Color::ZERO
    }

    fn sample_wi(&self, wo: Vec3, n: Vec3, _rng: &mut dyn RngCore) -> BrdfSample {
        let wi = Self::transmitted_direction(wo, n).normalize();
        BrdfSample {
            wi,
            value: self.color,
            pdf: wi.dot(n).abs(),
        }
    }
}

// =============================================================================
// Blinn-Phong microfacet coat
// =============================================================================

/// Dielectric Blinn-Phong microfacet coat over an optional transmission layer.
#[derive(Clone, Copy)]
pub struct BlinnPhong<'a> {
    shininess: f32,
    r0: f32,
    refraction_layer: Option<&'a dyn Brdf>,
}

impl<'a> BlinnPhong<'a> {
    pub fn new(shininess: f32, r0: f32, refraction_layer: Option<&'a dyn Brdf>) -> Self {
        Self {
            shininess,
            r0,
            refraction_layer,
        }
    }

    /// Specular lobe: `F * D * G / (4 |n.wo| |n.wi|)`.
    pub fn reflection_brdf(&self, wi: Vec3, wo: Vec3, n: Vec3) -> f32 {
        if n.dot(wi) <= 0.0 {
            return 0.0;
        }
        if (wi + wo).length() < 1e-5 {
            return 0.0;
        }
        let wh = (wi + wo).normalize();

        let s = self.shininess;
        let n_dot_wh = n.dot(wh);
        let wo_dot_wh = wo.dot(wh).max(1e-5);

        let d = (s + 2.0) / (2.0 * PI) * n_dot_wh.max(0.0).powf(s);
        let g = 1.0_f32
            .min(2.0 * (n_dot_wh * n.dot(wo)).max(1e-5) / wo_dot_wh)
            .min(2.0 * (n_dot_wh * n.dot(wi)).max(1e-5) / wo_dot_wh);
        let f = schlick(self.r0, (1.0 - wh.dot(wi)).max(0.0));

        f * d * g / (4.0 * (n.dot(wo) * n.dot(wi)).max(1e-4))
    }

    /// Transmitted lobe: the layer below, attenuated by `1 - F`.
    pub fn refraction_brdf(&self, wi: Vec3, wo: Vec3, n: Vec3) -> Color {
        let Some(layer) = self.refraction_layer else {
            return Color::ZERO;
        };
        if (wi + wo).length() < 1e-5 {
            return Color::ZERO;
        }

        let wh = (wi + wo).normalize();
        let f = schlick(self.r0, 1.0 - wh.dot(wi).max(0.0));
        (1.0 - f) * layer.f(wi, wo, n)
    }

    /// Half-vector drawn from the normalized Phong lobe around `n`.
    fn sample_half_vector(&self, n: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        let phi = 2.0 * PI * gen_f32(rng);
        let cos_theta = gen_f32(rng).powf(1.0 / (self.shininess + 1.0));
        let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();

        let local = Vec3::new(sin_theta * phi.cos(), sin_theta * phi.sin(), cos_theta);
        Frame::from_normal(n).to_world(local).normalize()
    }

    /// Shared sampler: half the samples mirror `wo` about a Phong
    /// half-vector and are weighted by `reflection`, the other half are
    /// handed to the transmission layer.
    fn sample_with(
        &self,
        wo: Vec3,
        n: Vec3,
        rng: &mut dyn RngCore,
        reflection: impl Fn(Vec3, Vec3, Vec3) -> Color,
    ) -> BrdfSample {
        let wh = self.sample_half_vector(n, rng);
        if wo.dot(n) <= 0.0 {
            return BrdfSample::absorbed(n);
        }

        if gen_f32(rng) < 0.5 {
            let wi = reflect(-wo, wh);
            let s = self.shininess;
            let pdf_wh = (s + 1.0) * n.dot(wh).max(0.0).powf(s) / (2.0 * PI);
            let pdf_wi = pdf_wh / (4.0 * wo.dot(wh).max(1e-4));

            BrdfSample {
                wi,
                value: reflection(wi, wo, n),
                pdf: 0.5 * pdf_wi,
            }
        } else {
            let Some(layer) = self.refraction_layer else {
                return BrdfSample::absorbed(n);
            };

            let below = layer.sample_wi(wo, n, rng);
            let f = schlick(self.r0, (1.0 - wh.dot(below.wi).abs()).max(0.0));

            BrdfSample {
                wi: below.wi,
                value: (1.0 - f) * below.value,
                pdf: 0.5 * below.pdf,
            }
        }
    }
}

impl Brdf for BlinnPhong<'_> {
    fn f(&self, wi: Vec3, wo: Vec3, n: Vec3) -> Color {
        if wi.dot(n) <= 0.0 {
            return Color::ZERO;
        }
        Color::splat(self.reflection_brdf(wi, wo, n)) + self.refraction_brdf(wi, wo, n)
    }

    fn sample_wi(&self, wo: Vec3, n: Vec3, rng: &mut dyn RngCore) -> BrdfSample {
        self.sample_with(wo, n, rng, |wi, wo, n| {
            Color::splat(self.reflection_brdf(wi, wo, n))
        })
    }
}

/// Conductor: the Blinn-Phong lobe tinted by the metal color, no transmission.
#[derive(Clone, Copy)]
pub struct BlinnPhongMetal {
    color: Color,
    coat: BlinnPhong<'static>,
}

impl BlinnPhongMetal {
    pub fn new(color: Color, shininess: f32, r0: f32) -> Self {
        Self {
            color,
            coat: BlinnPhong::new(shininess, r0, None),
        }
    }

    pub fn reflection_brdf(&self, wi: Vec3, wo: Vec3, n: Vec3) -> Color {
        self.coat.reflection_brdf(wi, wo, n) * self.color
    }
}

impl Brdf for BlinnPhongMetal {
    fn f(&self, wi: Vec3, wo: Vec3, n: Vec3) -> Color {
        self.reflection_brdf(wi, wo, n)
    }

    fn sample_wi(&self, wo: Vec3, n: Vec3, rng: &mut dyn RngCore) -> BrdfSample {
        self.coat
            .sample_with(wo, n, rng, |wi, wo, n| self.reflection_brdf(wi, wo, n))
    }
}

// =============================================================================
// Linear blend
// =============================================================================

/// Weighted mix of two nodes: `w * bsdf0 + (1 - w) * bsdf1`.
///
/// Sampling picks one branch stochastically and returns its sample as is;
/// the pdf is the chosen branch's, not the mixture density.
#[derive(Clone, Copy)]
pub struct LinearBlend<'a> {
    w: f32,
    bsdf0: &'a dyn Brdf,
    bsdf1: &'a dyn Brdf,
}

impl<'a> LinearBlend<'a> {
    pub fn new(w: f32, bsdf0: &'a dyn Brdf, bsdf1: &'a dyn Brdf) -> Self {
        Self { w, bsdf0, bsdf1 }
    }
}

impl Brdf for LinearBlend<'_> {
    fn f(&self, wi: Vec3, wo: Vec3, n: Vec3) -> Color {
        self.w * self.bsdf0.f(wi, wo, n) + (1.0 - self.w) * self.bsdf1.f(wi, wo, n)
    }

    fn sample_wi(&self, wo: Vec3, n: Vec3, rng: &mut dyn RngCore) -> BrdfSample {
        if gen_f32(rng) < self.w {
            self.bsdf0.sample_wi(wo, n, rng)
        } else {
            self.bsdf1.sample_wi(wo, n, rng)
        }
    }
}

// =============================================================================
// Per-hit composition
// =============================================================================

/// Build the reflectance tree for `material` and hand it to `shade`.
///
/// Layering, innermost first: diffuse vs. refraction by transparency,
/// a dielectric coat over that, metal vs. the coat by metalness, and
/// finally the coated result vs. the uncoated base by reflectivity.
pub fn with_material_brdf<R>(material: &Material, shade: impl FnOnce(&dyn Brdf) -> R) -> R {
    let diffuse = Diffuse::new(material.color);
    let refraction = Refraction::new(material.color);
    let refractive_blend = LinearBlend::new(material.transparency, &refraction, &diffuse);
    let dielectric = BlinnPhong::new(material.shininess, material.fresnel, Some(&refractive_blend));
    let metal = BlinnPhongMetal::new(material.color, material.shininess, material.fresnel);
    let metal_blend = LinearBlend::new(material.metalness, &metal, &dielectric);
    let reflectivity_blend = LinearBlend::new(material.reflectivity, &metal_blend, &refractive_blend);

    shade(&reflectivity_blend)
}
