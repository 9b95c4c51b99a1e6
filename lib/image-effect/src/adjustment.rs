//! Per-pixel colour adjustments.
//!
//! All of these work on 8-bit RGB and RGBA images and never touch alpha.

use crate::{
    Effect, EffectConfig, ImageEffectResult,
    raster::{check_range, clamp_u8, luminance, map_rgb},
};
use derivative::Derivative;
use derive_setters::Setters;
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Brightness adjustment configuration
#[derive(Debug, Clone, PartialEq, Derivative, Serialize, Deserialize)]
#[derivative(Default)]
#[serde(default, deny_unknown_fields)]
#[non_exhaustive]
pub struct BrightnessConfig {
    #[derivative(Default(value = "0"))]
    amount: i32,
}

impl BrightnessConfig {
    pub const RANGE: RangeInclusive<i32> = -255..=255;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn amount(&self) -> i32 {
        self.amount
    }

    pub fn set_amount(&mut self, amount: i32) -> ImageEffectResult<()> {
        check_range(Self::NAME, "amount", amount, Self::RANGE)?;
        self.amount = amount;
        Ok(())
    }
}

impl Effect for BrightnessConfig {
    fn apply(&self, mut image: DynamicImage) -> ImageEffectResult<DynamicImage> {
        if self.amount == 0 {
            return Ok(image);
        }

        map_rgb(&mut image, Self::NAME, |rgb| {
            for channel in rgb.iter_mut() {
                *channel = (*channel as i32 + self.amount).clamp(0, 255) as u8;
            }
        })?;

        Ok(image)
    }
}

impl EffectConfig for BrightnessConfig {
    const NAME: &'static str = "Brightness";

    fn validate(&self) -> ImageEffectResult<()> {
        check_range(Self::NAME, "amount", self.amount, Self::RANGE)
    }
}

/// Contrast adjustment configuration
///
/// new_color = (old_color - 128) * (1 + amount / 100) + 128
#[derive(Debug, Clone, PartialEq, Derivative, Serialize, Deserialize)]
#[derivative(Default)]
#[serde(default, deny_unknown_fields)]
#[non_exhaustive]
pub struct ContrastConfig {
    #[derivative(Default(value = "0.0"))]
    amount: f64,
}

impl ContrastConfig {
    pub const RANGE: RangeInclusive<f64> = -100.0..=100.0;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    pub fn set_amount(&mut self, amount: f64) -> ImageEffectResult<()> {
        check_range(Self::NAME, "amount", amount, Self::RANGE)?;
        self.amount = amount;
        Ok(())
    }
}

impl Effect for ContrastConfig {
    fn apply(&self, mut image: DynamicImage) -> ImageEffectResult<DynamicImage> {
        if self.amount == 0.0 {
            return Ok(image);
        }

        let factor = (1.0 + self.amount / 100.0) as f32;
        map_rgb(&mut image, Self::NAME, |rgb| {
            for channel in rgb.iter_mut() {
                *channel = clamp_u8((*channel as f32 - 128.0) * factor + 128.0);
            }
        })?;

        Ok(image)
    }
}

impl EffectConfig for ContrastConfig {
    const NAME: &'static str = "Contrast";

    fn validate(&self) -> ImageEffectResult<()> {
        check_range(Self::NAME, "amount", self.amount, Self::RANGE)
    }
}

/// Saturation adjustment configuration
///
/// Positive amounts push colours away from their luminance, negative amounts
/// pull them towards it. -1.0 is fully desaturated.
#[derive(Debug, Clone, PartialEq, Derivative, Serialize, Deserialize)]
#[derivative(Default)]
#[serde(default, deny_unknown_fields)]
#[non_exhaustive]
pub struct SaturationConfig {
    #[derivative(Default(value = "0.0"))]
    amount: f64,
}

impl SaturationConfig {
    pub const RANGE: RangeInclusive<f64> = -1.0..=1.0;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    pub fn set_amount(&mut self, amount: f64) -> ImageEffectResult<()> {
        check_range(Self::NAME, "amount", amount, Self::RANGE)?;
        self.amount = amount;
        Ok(())
    }
}

impl Effect for SaturationConfig {
    fn apply(&self, mut image: DynamicImage) -> ImageEffectResult<DynamicImage> {
        if self.amount == 0.0 {
            return Ok(image);
        }

        let adjustment = (1.0 + self.amount) as f32;
        map_rgb(&mut image, Self::NAME, |rgb| {
            let gray = luminance(rgb);
            for channel in rgb.iter_mut() {
                *channel = clamp_u8(gray + (*channel as f32 - gray) * adjustment);
            }
        })?;

        Ok(image)
    }
}

impl EffectConfig for SaturationConfig {
    const NAME: &'static str = "Saturation";

    fn validate(&self) -> ImageEffectResult<()> {
        check_range(Self::NAME, "amount", self.amount, Self::RANGE)
    }
}

/// Hue rotation configuration
#[derive(Debug, Clone, PartialEq, Derivative, Setters, Serialize, Deserialize)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[serde(default, deny_unknown_fields)]
#[non_exhaustive]
pub struct HueRotateConfig {
    #[derivative(Default(value = "0"))]
    degrees: i32,
}

impl HueRotateConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn degrees(&self) -> i32 {
        self.degrees
    }
}

impl Effect for HueRotateConfig {
    fn apply(&self, mut image: DynamicImage) -> ImageEffectResult<DynamicImage> {
        let degrees = self.degrees.rem_euclid(360);
        if degrees == 0 {
            return Ok(image);
        }

        map_rgb(&mut image, Self::NAME, |rgb| {
            let (hue, saturation, lightness) = rgb_to_hsl(rgb);
            let hue = (hue + degrees as f32) % 360.0;
            let (r, g, b) = hsl_to_rgb(hue, saturation, lightness);

            rgb[0] = clamp_u8(r * 255.0);
            rgb[1] = clamp_u8(g * 255.0);
            rgb[2] = clamp_u8(b * 255.0);
        })?;

        Ok(image)
    }
}

impl EffectConfig for HueRotateConfig {
    const NAME: &'static str = "HueRotate";
}

fn rgb_to_hsl(rgb: &[u8]) -> (f32, f32, f32) {
    let r = rgb[0] as f32 / 255.0;
    let g = rgb[1] as f32 / 255.0;
    let b = rgb[2] as f32 / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let lightness = (max + min) / 2.0;
    if delta == 0.0 {
        return (0.0, 0.0, lightness);
    }

    let saturation = delta / (1.0 - (2.0 * lightness - 1.0).abs());
    let hue = if max == r {
        60.0 * ((g - b) / delta).rem_euclid(6.0)
    } else if max == g {
        60.0 * ((b - r) / delta + 2.0)
    } else {
        60.0 * ((r - g) / delta + 4.0)
    };

    (hue, saturation, lightness)
}

fn hsl_to_rgb(hue: f32, saturation: f32, lightness: f32) -> (f32, f32, f32) {
    let c = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let x = c * (1.0 - ((hue / 60.0) % 2.0 - 1.0).abs());
    let m = lightness - c / 2.0;

    let (r, g, b) = if hue < 60.0 {
        (c, x, 0.0)
    } else if hue < 120.0 {
        (x, c, 0.0)
    } else if hue < 180.0 {
        (0.0, c, x)
    } else if hue < 240.0 {
        (0.0, x, c)
    } else if hue < 300.0 {
        (x, 0.0, c)
    } else {
        (c, 0.0, x)
    };

    (r + m, g + m, b + m)
}

/// Gamma correction configuration
#[derive(Debug, Clone, PartialEq, Derivative, Serialize, Deserialize)]
#[derivative(Default)]
#[serde(default, deny_unknown_fields)]
#[non_exhaustive]
pub struct GammaConfig {
    #[derivative(Default(value = "1.0"))]
    value: f64,
}

impl GammaConfig {
    pub const RANGE: RangeInclusive<f64> = 0.1..=5.0;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn set_value(&mut self, value: f64) -> ImageEffectResult<()> {
        check_range(Self::NAME, "value", value, Self::RANGE)?;
        self.value = value;
        Ok(())
    }
}

impl Effect for GammaConfig {
    fn apply(&self, mut image: DynamicImage) -> ImageEffectResult<DynamicImage> {
        if self.value == 1.0 {
            return Ok(image);
        }

        let exponent = (1.0 / self.value) as f32;
        let table: [u8; 256] =
            std::array::from_fn(|i| clamp_u8((i as f32 / 255.0).powf(exponent) * 255.0));

        map_rgb(&mut image, Self::NAME, |rgb| {
            for channel in rgb.iter_mut() {
                *channel = table[*channel as usize];
            }
        })?;

        Ok(image)
    }
}

impl EffectConfig for GammaConfig {
    const NAME: &'static str = "Gamma";

    fn validate(&self) -> ImageEffectResult<()> {
        check_range(Self::NAME, "value", self.value, Self::RANGE)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrayscaleMode {
    Average,
    Luminance,
    RedChannel,
    GreenChannel,
    BlueChannel,
}

/// Grayscale effect configuration
///
/// Unlike the other adjustments the default is not a no-op: it converts with
/// luminance weights.
#[derive(Debug, Clone, PartialEq, Derivative, Setters, Serialize, Deserialize)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[serde(default, deny_unknown_fields)]
#[non_exhaustive]
pub struct GrayscaleConfig {
    #[derivative(Default(value = "GrayscaleMode::Luminance"))]
    mode: GrayscaleMode,
}

impl GrayscaleConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> GrayscaleMode {
        self.mode
    }
}

impl Effect for GrayscaleConfig {
    fn apply(&self, mut image: DynamicImage) -> ImageEffectResult<DynamicImage> {
        map_rgb(&mut image, Self::NAME, |rgb| {
            let gray = match self.mode {
                GrayscaleMode::Average => {
                    ((rgb[0] as u32 + rgb[1] as u32 + rgb[2] as u32) / 3) as u8
                }
                GrayscaleMode::Luminance => clamp_u8(luminance(rgb)),
                GrayscaleMode::RedChannel => rgb[0],
                GrayscaleMode::GreenChannel => rgb[1],
                GrayscaleMode::BlueChannel => rgb[2],
            };

            rgb.fill(gray);
        })?;

        Ok(image)
    }
}

impl EffectConfig for GrayscaleConfig {
    const NAME: &'static str = "Grayscale";
}

/// Invert the colors of an image
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
#[non_exhaustive]
pub struct InvertConfig {}

impl InvertConfig {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Effect for InvertConfig {
    fn apply(&self, mut image: DynamicImage) -> ImageEffectResult<DynamicImage> {
        map_rgb(&mut image, Self::NAME, |rgb| {
            for channel in rgb.iter_mut() {
                *channel = 255 - *channel;
            }
        })?;

        Ok(image)
    }
}

impl EffectConfig for InvertConfig {
    const NAME: &'static str = "Invert";
}
