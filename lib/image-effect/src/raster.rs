use crate::{ImageEffectError, ImageEffectResult};
use image::DynamicImage;
use std::{fmt, ops::RangeInclusive};

/// Run `f` over the RGB channels of every pixel. Alpha is left untouched.
pub(crate) fn map_rgb<F>(
    image: &mut DynamicImage,
    effect: &'static str,
    mut f: F,
) -> ImageEffectResult<()>
where
    F: FnMut(&mut [u8]),
{
    match image {
        DynamicImage::ImageRgb8(buffer) => {
            buffer.pixels_mut().for_each(|pixel| f(pixel.0.as_mut_slice()))
        }
        DynamicImage::ImageRgba8(buffer) => {
            buffer.pixels_mut().for_each(|pixel| f(&mut pixel.0[..3]))
        }
        other => return Err(unsupported(effect, other)),
    }

    Ok(())
}

pub(crate) fn check_range<T>(
    effect: &'static str,
    property: &'static str,
    value: T,
    range: RangeInclusive<T>,
) -> ImageEffectResult<()>
where
    T: PartialOrd + fmt::Display,
{
    if !range.contains(&value) {
        return Err(ImageEffectError::invalid_property(
            effect,
            property,
            format!(
                "{value} is outside {}..={}",
                range.start(),
                range.end()
            ),
        ));
    }

    Ok(())
}

pub(crate) fn unsupported(effect: &'static str, image: &DynamicImage) -> ImageEffectError {
    ImageEffectError::UnsupportedImageFormat {
        effect,
        color: image.color(),
    }
}

/// Human perception: 0.299*R + 0.587*G + 0.114*B
pub(crate) fn luminance(rgb: &[u8]) -> f32 {
    0.299 * rgb[0] as f32 + 0.587 * rgb[1] as f32 + 0.114 * rgb[2] as f32
}

pub(crate) fn clamp_u8(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}
