//! Progressive image accumulation.
//!
//! The image stores the running mean of all samples traced since the last
//! restart. Restarting only resets the sample counter: the next frame is
//! blended with weight 1/(0+1) and so replaces the stale contents.

use std::path::Path;

use crate::Color;
use glint_math::Vec4;
use rand::RngCore;
use rayon::prelude::*;

/// Blend `color` into `old`, which already averages `n` samples.
#[inline]
pub fn running_mean(old: Vec4, color: Color, n: f32) -> Vec4 {
    old * (n / (n + 1.0)) + color.extend(1.0) * (1.0 / (n + 1.0))
}

/// Apply gamma correction (gamma = 2.0).
#[inline]
fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Convert a color to 8-bit RGBA.
pub fn color_to_rgba(color: Color) -> [u8; 4] {
    let r = (255.0 * linear_to_gamma(color.x).clamp(0.0, 1.0)) as u8;
    let g = (255.0 * linear_to_gamma(color.y).clamp(0.0, 1.0)) as u8;
    let b = (255.0 * linear_to_gamma(color.z).clamp(0.0, 1.0)) as u8;
    [r, g, b, 255]
}

/// Number of pixels in a `width` x `height` buffer, without u32 overflow.
#[inline]
fn pixel_count(width: u32, height: u32) -> usize {
    width as usize * height as usize
}

/// Accumulated radiance buffer.
///
/// Row 0 is the bottom of the screen (y grows upward in screen space).
#[derive(Debug, Clone, Default)]
pub struct Image {
    width: u32,
    height: u32,
    data: Vec<Vec4>,
    number_of_samples: u32,
}

impl Image {
    /// Create a new black image with no samples.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![Vec4::ZERO; pixel_count(width, height)],
            number_of_samples: 0,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Frames accumulated since the last restart.
    pub fn number_of_samples(&self) -> u32 {
        self.number_of_samples
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Change resolution and restart. Surviving entries are kept; they are
    /// overwritten by the next frame like after any restart.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.data.resize(pixel_count(width, height), Vec4::ZERO);
        self.restart();
    }

    /// Soft reset: forget the sample count, keep the buffer.
    pub fn restart(&mut self) {
        self.number_of_samples = 0;
    }

    /// Get the accumulated value at (x, y).
    pub fn pixel(&self, x: u32, y: u32) -> Vec4 {
        self.data[y as usize * self.width as usize + x as usize]
    }

    /// Raw pixel data.
    pub fn data(&self) -> &[Vec4] {
        &self.data
    }

    /// Trace one sample for every pixel and fold it into the running mean.
    ///
    /// Rows are shaded in parallel; every worker owns its rows and its own
    /// random generator. The sample counter advances once, after all rows
    /// are done.
    pub fn accumulate_frame<F>(&mut self, shade: F)
    where
        F: Fn(u32, u32, &mut dyn RngCore) -> Color + Sync,
    {
        if self.data.is_empty() {
            return;
        }

        let n = self.number_of_samples as f32;
        let width = self.width as usize;

        self.data
            .par_chunks_mut(width)
            .enumerate()
            .for_each(|(y, row)| {
                let mut rng = rand::thread_rng();
                for (x, pixel) in row.iter_mut().enumerate() {
                    let color = shade(x as u32, y as u32, &mut rng);
                    *pixel = running_mean(*pixel, color, n);
                }
            });

        self.number_of_samples += 1;
    }

    /// Convert to RGBA bytes, top row first (for display or saving).
    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.data.len() * 4);
        for row in self.data.chunks(self.width.max(1) as usize).rev() {
            for pixel in row {
                bytes.extend_from_slice(&color_to_rgba(pixel.truncate()));
            }
        }
        bytes
    }

    /// Write the tonemapped image as PNG.
    pub fn save_png(&self, path: impl AsRef<Path>) -> image::ImageResult<()> {
        let buffer = image::RgbaImage::from_raw(self.width, self.height, self.to_rgba8())
            .ok_or_else(|| {
                image::ImageError::Parameter(image::error::ParameterError::from_kind(
                    image::error::ParameterErrorKind::DimensionMismatch,
                ))
            })?;
        buffer.save_with_format(path, image::ImageFormat::Png)
    }
}
