//! Progressive frame driver.
//!
//! [`RenderContext`] owns the settings, the accumulation buffer and the
//! lighting. Each call to [`RenderContext::trace_paths`] traces one
//! jittered path per pixel and folds it into the running mean.

use std::time::Instant;

use crate::accumulator::Image;
use crate::environment::Environment;
use crate::integrator::Integrator;
use crate::intersection::Scene;
use crate::{gen_f32, Color};
use glint_core::{PointLight, Settings};
use glint_math::{Mat4, Ray, Vec3, Vec4};
use rand::RngCore;

/// Primary ray generation by un-projecting screen positions.
#[derive(Debug, Clone, Copy)]
pub struct ScreenRays {
    camera_position: Vec3,
    inverse_view_projection: Mat4,
    width: u32,
    height: u32,
}

impl ScreenRays {
    pub fn new(view: Mat4, projection: Mat4, width: u32, height: u32) -> Self {
        let camera_position = view.inverse() * Vec4::new(0.0, 0.0, 0.0, 1.0);
        Self {
            camera_position: camera_position.truncate() / camera_position.w,
            inverse_view_projection: (projection * view).inverse(),
            width,
            height,
        }
    }

    pub fn camera_position(&self) -> Vec3 {
        self.camera_position
    }

    /// Ray through screen position `(sx, sy)` in [0, 1]², y up.
    pub fn ray_through(&self, sx: f32, sy: f32) -> Ray {
        let ndc = Vec4::new(2.0 * sx - 1.0, 2.0 * sy - 1.0, 1.0, 1.0);
        let p = self.inverse_view_projection * ndc;
        let world = p.truncate() / p.w;
        Ray::new(self.camera_position, world - self.camera_position)
    }

    /// Jittered ray through pixel (x, y); row 0 is the bottom row.
    pub fn ray(&self, x: u32, y: u32, rng: &mut dyn RngCore) -> Ray {
        let w = self.width as f32;
        let h = self.height as f32;
        let sx = x as f32 / w + gen_f32(rng) / w;
        let sy = y as f32 / h + gen_f32(rng) / h;
        self.ray_through(sx, sy)
    }
}

/// Render state: settings, lighting and the accumulated image.
pub struct RenderContext {
    settings: Settings,
    image: Image,
    light: PointLight,
    environment: Environment,
    display_size: (u32, u32),
}

impl RenderContext {
    /// Create a context with an empty image; call [`resize`](Self::resize)
    /// before tracing.
    pub fn new(settings: Settings, light: PointLight, environment: Environment) -> Self {
        Self {
            settings,
            image: Image::default(),
            light,
            environment,
            display_size: (0, 0),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Replace the settings. Any change restarts accumulation; a new
    /// subsampling factor also resizes the image.
    pub fn set_settings(&mut self, settings: Settings) {
        if settings == self.settings {
            return;
        }

        let resample = settings.subsampling != self.settings.subsampling;
        self.settings = settings;
        if resample {
            let (w, h) = self.display_size;
            self.resize(w, h);
        } else {
            self.restart();
        }
    }

    /// Set the display resolution; the traced image is smaller by the
    /// subsampling factor.
    pub fn resize(&mut self, display_width: u32, display_height: u32) {
        self.display_size = (display_width, display_height);
        let (width, height) = self
            .settings
            .traced_resolution(display_width, display_height);

        if width != self.image.width() || height != self.image.height() {
            log::info!(
                "Resizing path tracer image to {}x{} (display {}x{})",
                width,
                height,
                display_width,
                display_height
            );
        }
        self.image.resize(width, height);
    }

    /// Start accumulating from scratch on the next frame.
    pub fn restart(&mut self) {
        self.image.restart();
    }

    pub fn image(&self) -> &Image {
        &self.image
    }

    pub fn light(&self) -> &PointLight {
        &self.light
    }

    pub fn set_light(&mut self, light: PointLight) {
        self.light = light;
        self.restart();
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn set_environment(&mut self, environment: Environment) {
        self.environment = environment;
        self.restart();
    }

    /// Trace one path per pixel and accumulate it.
    ///
    /// Returns `false` without tracing when the sample cap is reached or
    /// the image has no pixels.
    pub fn trace_paths(&mut self, scene: &dyn Scene, view: Mat4, projection: Mat4) -> bool {
        if self.settings.sample_cap_reached(self.image.number_of_samples()) {
            return false;
        }
        if self.image.is_empty() {
            log::warn!("trace_paths called before resize; nothing to trace");
            return false;
        }

        let rays = ScreenRays::new(view, projection, self.image.width(), self.image.height());
        let integrator = Integrator::new(&self.settings, &self.light, &self.environment);

        let start = Instant::now();
        self.image.accumulate_frame(|x, y, rng| -> Color {
            let ray = rays.ray(x, y, rng);
            match scene.intersect(&ray) {
                Some(hit) => integrator.radiance(scene, &hit, rng),
                None => integrator.background(&ray),
            }
        });

        let samples = self.image.number_of_samples();
        log::debug!(
            "Frame {} traced in {:.2}ms",
            samples,
            start.elapsed().as_secs_f64() * 1000.0
        );
        if self.settings.sample_cap_reached(samples) {
            log::info!("Reached {} paths per pixel", samples);
        }

        true
    }
}
