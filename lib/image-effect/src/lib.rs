pub mod adjustment;
pub mod chain;
pub mod filter;
pub mod manipulation;
pub mod registry;

mod raster;

pub use chain::{ChainEntry, ChainSettings, EffectChain, EffectSettings, execute};
pub use registry::{DynEffect, EffectRegistry};

use image::{ColorType, DynamicImage};
use serde::{Serialize, de::DeserializeOwned};
use std::fmt;

pub type ImageEffectResult<T> = Result<T, ImageEffectError>;

/// Property name to value map used when exporting and importing effect settings.
pub type Properties = serde_json::Map<String, serde_json::Value>;

#[derive(thiserror::Error, Debug)]
pub enum ImageEffectError {
    #[error("Invalid value for {effect}.{property}: {reason}")]
    InvalidPropertyValue {
        effect: &'static str,
        property: &'static str,
        reason: String,
    },

    #[error("{effect} does not support {color:?} images")]
    UnsupportedImageFormat {
        effect: &'static str,
        color: ColorType,
    },

    #[error("{effect} cannot be applied to a {width}x{height} image: {reason}")]
    InvalidImage {
        effect: &'static str,
        width: u32,
        height: u32,
        reason: String,
    },

    #[error("Effect #{index} ({name}) failed: {source}")]
    ChainExecutionFailure {
        index: usize,
        name: &'static str,
        source: Box<ImageEffectError>,
    },

    #[error("Chain index {index} is out of range for a chain of {len} effects")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Unknown effect type: {0}")]
    UnknownEffect(String),

    #[error("Invalid {effect} settings: {source}")]
    InvalidConfig {
        effect: &'static str,
        source: serde_json::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

impl ImageEffectError {
    pub(crate) fn invalid_property(
        effect: &'static str,
        property: &'static str,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidPropertyValue {
            effect,
            property,
            reason: reason.into(),
        }
    }
}

/// A single image transformation.
///
/// `apply` takes the image by value and hands back the result, which may be the
/// same buffer mutated in place or a freshly allocated one. The configuration is
/// borrowed immutably, so an effect never changes while it runs.
pub trait Effect {
    fn apply(&self, image: DynamicImage) -> ImageEffectResult<DynamicImage>;
}

/// A named, serializable effect configuration.
///
/// `Default` carries every property's documented default. Settings imported
/// through the registry fall back to those defaults for omitted keys and are
/// checked with [`EffectConfig::validate`] before use.
pub trait EffectConfig:
    Effect + fmt::Debug + Clone + Default + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Stable type identifier used in chain settings.
    const NAME: &'static str;

    fn validate(&self) -> ImageEffectResult<()> {
        Ok(())
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}
