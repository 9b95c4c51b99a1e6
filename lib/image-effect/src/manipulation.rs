//! Geometric manipulations: flip, rotate, crop and resize.
//!
//! These effects only move pixels around, so they accept every colour type the
//! `image` crate can hold.

use crate::{Effect, EffectConfig, ImageEffectError, ImageEffectResult};
use derivative::Derivative;
use derive_setters::Setters;
use image::{DynamicImage, imageops::FilterType};
use serde::{Deserialize, Serialize};

/// Largest width or height a resize may target.
pub const MAX_DIMENSION: u32 = 1 << 16;

/// Flip configuration
///
/// Both axes off leaves the image untouched; both on is a 180° point reflection.
#[derive(Debug, Clone, PartialEq, Derivative, Setters, Serialize, Deserialize)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[serde(default, deny_unknown_fields)]
#[non_exhaustive]
pub struct FlipConfig {
    /// Mirror left to right
    #[derivative(Default(value = "false"))]
    horizontally: bool,

    /// Mirror top to bottom
    #[derivative(Default(value = "false"))]
    vertically: bool,
}

impl FlipConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn horizontally(&self) -> bool {
        self.horizontally
    }

    pub fn vertically(&self) -> bool {
        self.vertically
    }
}

impl Effect for FlipConfig {
    fn apply(&self, image: DynamicImage) -> ImageEffectResult<DynamicImage> {
        let image = match (self.horizontally, self.vertically) {
            (false, false) => image,
            (true, false) => image.fliph(),
            (false, true) => image.flipv(),
            (true, true) => image.rotate180(),
        };

        Ok(image)
    }
}

impl EffectConfig for FlipConfig {
    const NAME: &'static str = "Flip";
}

/// Clockwise rotation angle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub enum RotateAngle {
    None,
    Degrees90,
    Degrees180,
    Degrees270,
}

impl RotateAngle {
    pub fn degrees(&self) -> u16 {
        match self {
            RotateAngle::None => 0,
            RotateAngle::Degrees90 => 90,
            RotateAngle::Degrees180 => 180,
            RotateAngle::Degrees270 => 270,
        }
    }
}

impl TryFrom<u16> for RotateAngle {
    type Error = String;

    fn try_from(degrees: u16) -> Result<Self, Self::Error> {
        match degrees {
            0 => Ok(RotateAngle::None),
            90 => Ok(RotateAngle::Degrees90),
            180 => Ok(RotateAngle::Degrees180),
            270 => Ok(RotateAngle::Degrees270),
            _ => Err(format!("{degrees} is not one of 0, 90, 180, 270")),
        }
    }
}

impl From<RotateAngle> for u16 {
    fn from(angle: RotateAngle) -> Self {
        angle.degrees()
    }
}

/// Rotate configuration
#[derive(Debug, Clone, PartialEq, Derivative, Setters, Serialize, Deserialize)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[serde(default, deny_unknown_fields)]
#[non_exhaustive]
pub struct RotateConfig {
    #[derivative(Default(value = "RotateAngle::None"))]
    angle: RotateAngle,
}

impl RotateConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn angle(&self) -> RotateAngle {
        self.angle
    }

    pub fn set_degrees(&mut self, degrees: u16) -> ImageEffectResult<()> {
        self.angle = RotateAngle::try_from(degrees)
            .map_err(|reason| ImageEffectError::invalid_property(Self::NAME, "angle", reason))?;
        Ok(())
    }
}

impl Effect for RotateConfig {
    fn apply(&self, image: DynamicImage) -> ImageEffectResult<DynamicImage> {
        let image = match self.angle {
            RotateAngle::None => image,
            RotateAngle::Degrees90 => image.rotate90(),
            RotateAngle::Degrees180 => image.rotate180(),
            RotateAngle::Degrees270 => image.rotate270(),
        };

        Ok(image)
    }
}

impl EffectConfig for RotateConfig {
    const NAME: &'static str = "Rotate";
}

/// Crop configuration
///
/// Margins are cut from each edge. All-zero margins leave the image untouched.
#[derive(Debug, Clone, PartialEq, Derivative, Setters, Serialize, Deserialize)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[serde(default, deny_unknown_fields)]
#[non_exhaustive]
pub struct CropConfig {
    #[derivative(Default(value = "0"))]
    left: u32,

    #[derivative(Default(value = "0"))]
    top: u32,

    #[derivative(Default(value = "0"))]
    right: u32,

    #[derivative(Default(value = "0"))]
    bottom: u32,
}

impl CropConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn uniform(margin: u32) -> Self {
        Self {
            left: margin,
            top: margin,
            right: margin,
            bottom: margin,
        }
    }

    /// (left, top, right, bottom)
    pub fn margins(&self) -> (u32, u32, u32, u32) {
        (self.left, self.top, self.right, self.bottom)
    }

    fn is_empty(&self) -> bool {
        self.left == 0 && self.top == 0 && self.right == 0 && self.bottom == 0
    }
}

impl Effect for CropConfig {
    fn apply(&self, image: DynamicImage) -> ImageEffectResult<DynamicImage> {
        if self.is_empty() {
            return Ok(image);
        }

        let (width, height) = (image.width(), image.height());
        let horizontal = self.left.saturating_add(self.right);
        let vertical = self.top.saturating_add(self.bottom);

        if horizontal >= width || vertical >= height {
            return Err(ImageEffectError::InvalidImage {
                effect: Self::NAME,
                width,
                height,
                reason: format!(
                    "margins {horizontal}x{vertical} leave no pixels to keep"
                ),
            });
        }

        Ok(image.crop_imm(self.left, self.top, width - horizontal, height - vertical))
    }
}

impl EffectConfig for CropConfig {
    const NAME: &'static str = "Crop";
}

/// Resampling filter used by [`ResizeConfig`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeFilter {
    Nearest,
    Triangle,
    CatmullRom,
    Gaussian,
    Lanczos3,
}

impl From<ResizeFilter> for FilterType {
    fn from(filter: ResizeFilter) -> Self {
        match filter {
            ResizeFilter::Nearest => FilterType::Nearest,
            ResizeFilter::Triangle => FilterType::Triangle,
            ResizeFilter::CatmullRom => FilterType::CatmullRom,
            ResizeFilter::Gaussian => FilterType::Gaussian,
            ResizeFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// Resize configuration
///
/// A zero width or height is derived from the other one so the aspect ratio is
/// kept. Both zero leaves the image untouched.
#[derive(Debug, Clone, PartialEq, Derivative, Setters, Serialize, Deserialize)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[serde(default, deny_unknown_fields)]
#[non_exhaustive]
pub struct ResizeConfig {
    #[setters(skip)]
    #[derivative(Default(value = "0"))]
    width: u32,

    #[setters(skip)]
    #[derivative(Default(value = "0"))]
    height: u32,

    #[derivative(Default(value = "ResizeFilter::Lanczos3"))]
    filter: ResizeFilter,
}

impl ResizeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn filter(&self) -> ResizeFilter {
        self.filter
    }

    pub fn set_size(&mut self, width: u32, height: u32) -> ImageEffectResult<()> {
        check_dimension("width", width)?;
        check_dimension("height", height)?;
        self.width = width;
        self.height = height;
        Ok(())
    }

    fn target_size(&self, width: u32, height: u32) -> ImageEffectResult<(u32, u32)> {
        let invalid = |reason: String| ImageEffectError::InvalidImage {
            effect: Self::NAME,
            width,
            height,
            reason,
        };

        if (self.width, self.height) == (0, 0) {
            return Ok((width, height));
        }

        if width == 0 || height == 0 {
            return Err(invalid("cannot resize an empty image".to_string()));
        }

        // Both dimensions are non-zero here, so `den` is never zero
        let scaled = |value: u32, num: u32, den: u32| -> ImageEffectResult<u32> {
            let exact = (value as u64 * num as u64 + den as u64 / 2) / den as u64;
            u32::try_from(exact.max(1))
                .ok()
                .filter(|size| *size <= MAX_DIMENSION)
                .ok_or_else(|| invalid(format!("derived size {exact} exceeds {MAX_DIMENSION}")))
        };

        match (self.width, self.height) {
            (0, h) => Ok((scaled(width, h, height)?, h)),
            (w, 0) => Ok((w, scaled(height, w, width)?)),
            (w, h) => Ok((w, h)),
        }
    }
}

fn check_dimension(property: &'static str, value: u32) -> ImageEffectResult<()> {
    if value > MAX_DIMENSION {
        return Err(ImageEffectError::invalid_property(
            ResizeConfig::NAME,
            property,
            format!("{value} exceeds {MAX_DIMENSION}"),
        ));
    }

    Ok(())
}

impl Effect for ResizeConfig {
    fn apply(&self, image: DynamicImage) -> ImageEffectResult<DynamicImage> {
        let (width, height) = (image.width(), image.height());
        let (target_width, target_height) = self.target_size(width, height)?;

        if (target_width, target_height) == (width, height) {
            return Ok(image);
        }

        Ok(image.resize_exact(target_width, target_height, self.filter.into()))
    }
}

impl EffectConfig for ResizeConfig {
    const NAME: &'static str = "Resize";

    fn validate(&self) -> ImageEffectResult<()> {
        check_dimension("width", self.width)?;
        check_dimension("height", self.height)
    }
}
