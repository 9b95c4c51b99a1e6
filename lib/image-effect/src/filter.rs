use crate::{
    Effect, EffectConfig, ImageEffectError, ImageEffectResult,
    raster::{check_range, clamp_u8, unsupported},
};
use derivative::Derivative;
use image::{DynamicImage, ImageBuffer, Pixel, RgbaImage};
use photon_rs::{PhotonImage, monochrome};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Sepia tone configuration
///
/// `intensity` blends between the original (0.0) and full sepia (1.0).
#[derive(Debug, Clone, PartialEq, Derivative, Serialize, Deserialize)]
#[derivative(Default)]
#[serde(default, deny_unknown_fields)]
#[non_exhaustive]
pub struct SepiaConfig {
    #[derivative(Default(value = "1.0"))]
    intensity: f64,
}

impl SepiaConfig {
    pub const RANGE: RangeInclusive<f64> = 0.0..=1.0;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn intensity(&self) -> f64 {
        self.intensity
    }

    pub fn set_intensity(&mut self, intensity: f64) -> ImageEffectResult<()> {
        check_range(Self::NAME, "intensity", intensity, Self::RANGE)?;
        self.intensity = intensity;
        Ok(())
    }
}

impl Effect for SepiaConfig {
    fn apply(&self, image: DynamicImage) -> ImageEffectResult<DynamicImage> {
        if self.intensity == 0.0 {
            return Ok(image);
        }

        let (rgba, was_rgb) = match image {
            DynamicImage::ImageRgba8(buffer) => (buffer, false),
            DynamicImage::ImageRgb8(buffer) => {
                (DynamicImage::ImageRgb8(buffer).into_rgba8(), true)
            }
            other => return Err(unsupported(Self::NAME, &other)),
        };

        let intensity = self.intensity as f32;
        let (width, height) = rgba.dimensions();
        let original = rgba.into_raw();
        let mut photon_img = PhotonImage::new(original.clone(), width, height);
        monochrome::sepia(&mut photon_img);
        let mut pixels = photon_img.get_raw_pixels();

        for (sepia, original) in pixels.chunks_exact_mut(4).zip(original.chunks_exact(4)) {
            for i in 0..3 {
                let blended =
                    original[i] as f32 * (1.0 - intensity) + sepia[i] as f32 * intensity;
                sepia[i] = clamp_u8(blended);
            }
            // Keep alpha
            sepia[3] = original[3];
        }

        let buffer = RgbaImage::from_raw(width, height, pixels).ok_or_else(|| {
            ImageEffectError::InvalidImage {
                effect: Self::NAME,
                width,
                height,
                reason: "sepia produced a truncated pixel buffer".to_string(),
            }
        })?;

        let image = DynamicImage::ImageRgba8(buffer);
        Ok(if was_rgb {
            DynamicImage::ImageRgb8(image.into_rgb8())
        } else {
            image
        })
    }
}

impl EffectConfig for SepiaConfig {
    const NAME: &'static str = "Sepia";

    fn validate(&self) -> ImageEffectResult<()> {
        check_range(Self::NAME, "intensity", self.intensity, Self::RANGE)
    }
}

/// Pixelate configuration
///
/// Each `block_size` x `block_size` square is replaced by its average colour.
#[derive(Debug, Clone, PartialEq, Derivative, Serialize, Deserialize)]
#[derivative(Default)]
#[serde(default, deny_unknown_fields)]
#[non_exhaustive]
pub struct PixelateConfig {
    #[derivative(Default(value = "1"))]
    block_size: u32,
}

impl PixelateConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn block_size(&self) -> u32 {
        self.block_size
    }

    pub fn set_block_size(&mut self, block_size: u32) -> ImageEffectResult<()> {
        check_block_size(block_size)?;
        self.block_size = block_size;
        Ok(())
    }
}

fn check_block_size(block_size: u32) -> ImageEffectResult<()> {
    if block_size == 0 {
        return Err(ImageEffectError::invalid_property(
            PixelateConfig::NAME,
            "block_size",
            "must be at least 1",
        ));
    }

    Ok(())
}

fn pixelate<P>(buffer: &mut ImageBuffer<P, Vec<u8>>, block: u32)
where
    P: Pixel<Subpixel = u8>,
{
    let (width, height) = buffer.dimensions();

    for top in (0..height).step_by(block as usize) {
        for left in (0..width).step_by(block as usize) {
            let right = (left + block).min(width);
            let bottom = (top + block).min(height);
            let count = ((right - left) * (bottom - top)) as u64;

            let mut sums = [0u64; 3];
            for y in top..bottom {
                for x in left..right {
                    let channels = buffer.get_pixel(x, y).channels();
                    for (sum, value) in sums.iter_mut().zip(channels) {
                        *sum += *value as u64;
                    }
                }
            }

            for y in top..bottom {
                for x in left..right {
                    let channels = buffer.get_pixel_mut(x, y).channels_mut();
                    for (value, sum) in channels.iter_mut().zip(sums) {
                        *value = (sum / count) as u8;
                    }
                }
            }
        }
    }
}

impl Effect for PixelateConfig {
    fn apply(&self, mut image: DynamicImage) -> ImageEffectResult<DynamicImage> {
        if self.block_size <= 1 {
            return Ok(image);
        }

        match &mut image {
            DynamicImage::ImageRgb8(buffer) => pixelate(buffer, self.block_size),
            DynamicImage::ImageRgba8(buffer) => pixelate(buffer, self.block_size),
            other => return Err(unsupported(Self::NAME, other)),
        }

        Ok(image)
    }
}

impl EffectConfig for PixelateConfig {
    const NAME: &'static str = "Pixelate";

    fn validate(&self) -> ImageEffectResult<()> {
        check_block_size(self.block_size)
    }
}

/// Gaussian blur configuration
#[derive(Debug, Clone, PartialEq, Derivative, Serialize, Deserialize)]
#[derivative(Default)]
#[serde(default, deny_unknown_fields)]
#[non_exhaustive]
pub struct GaussianBlurConfig {
    #[derivative(Default(value = "0.0"))]
    sigma: f64,
}

impl GaussianBlurConfig {
    pub const RANGE: RangeInclusive<f64> = 0.0..=100.0;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    pub fn set_sigma(&mut self, sigma: f64) -> ImageEffectResult<()> {
        check_range(Self::NAME, "sigma", sigma, Self::RANGE)?;
        self.sigma = sigma;
        Ok(())
    }
}

impl Effect for GaussianBlurConfig {
    fn apply(&self, image: DynamicImage) -> ImageEffectResult<DynamicImage> {
        if self.sigma <= 0.0 {
            return Ok(image);
        }

        let image: DynamicImage = match image {
            DynamicImage::ImageRgb8(buffer) => {
                imageproc::filter::gaussian_blur_f32(&buffer, self.sigma as f32).into()
            }
            DynamicImage::ImageRgba8(buffer) => {
                imageproc::filter::gaussian_blur_f32(&buffer, self.sigma as f32).into()
            }
            other => return Err(unsupported(Self::NAME, &other)),
        };

        Ok(image)
    }
}

impl EffectConfig for GaussianBlurConfig {
    const NAME: &'static str = "GaussianBlur";

    fn validate(&self) -> ImageEffectResult<()> {
        check_range(Self::NAME, "sigma", self.sigma, Self::RANGE)
    }
}
