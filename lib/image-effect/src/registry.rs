//! Effect registry
//!
//! Maps effect type names to constructors so a chain can be rebuilt from its
//! settings. Callers can register their own [`EffectConfig`] types next to the
//! built-in ones; the chain executor only ever sees [`DynEffect`].

use crate::{
    Effect, EffectConfig, ImageEffectError, ImageEffectResult, Properties,
    adjustment::{
        BrightnessConfig, ContrastConfig, GammaConfig, GrayscaleConfig, HueRotateConfig,
        InvertConfig, SaturationConfig,
    },
    filter::{GaussianBlurConfig, PixelateConfig, SepiaConfig},
    manipulation::{CropConfig, FlipConfig, ResizeConfig, RotateConfig},
};
use image::DynamicImage;
use indexmap::IndexMap;
use serde_json::Value;
use std::fmt;

/// Object-safe view of an effect.
///
/// Implemented for every [`EffectConfig`], so there is no need to implement it
/// by hand.
pub trait DynEffect: fmt::Debug + Send + Sync {
    fn name(&self) -> &'static str;

    fn run(&self, image: DynamicImage) -> ImageEffectResult<DynamicImage>;

    fn properties(&self) -> ImageEffectResult<Properties>;

    fn clone_boxed(&self) -> Box<dyn DynEffect>;
}

impl<T: EffectConfig> DynEffect for T {
    fn name(&self) -> &'static str {
        T::NAME
    }

    fn run(&self, image: DynamicImage) -> ImageEffectResult<DynamicImage> {
        Effect::apply(self, image)
    }

    fn properties(&self) -> ImageEffectResult<Properties> {
        match serde_json::to_value(self)? {
            Value::Object(properties) => Ok(properties),
            other => Err(ImageEffectError::InvalidConfig {
                effect: T::NAME,
                source: serde::ser::Error::custom(format!(
                    "settings must serialize to a map, got {other}"
                )),
            }),
        }
    }

    fn clone_boxed(&self) -> Box<dyn DynEffect> {
        Box::new(self.clone())
    }
}

impl Clone for Box<dyn DynEffect> {
    fn clone(&self) -> Self {
        self.clone_boxed()
    }
}

type Constructor = fn(Properties) -> ImageEffectResult<Box<dyn DynEffect>>;

fn construct<E: EffectConfig>(properties: Properties) -> ImageEffectResult<Box<dyn DynEffect>> {
    let effect: E = serde_json::from_value(Value::Object(properties))
        .map_err(|source| ImageEffectError::InvalidConfig {
            effect: E::NAME,
            source,
        })?;

    effect.validate()?;
    Ok(Box::new(effect))
}

#[derive(Clone)]
pub struct EffectRegistry {
    constructors: IndexMap<&'static str, Constructor>,
}

impl EffectRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            constructors: IndexMap::new(),
        }
    }

    /// A registry holding every effect shipped with this crate.
    pub fn builtin() -> Self {
        let mut registry = Self::new();

        // Manipulations
        registry.register::<FlipConfig>();
        registry.register::<RotateConfig>();
        registry.register::<CropConfig>();
        registry.register::<ResizeConfig>();

        // Adjustments
        registry.register::<BrightnessConfig>();
        registry.register::<ContrastConfig>();
        registry.register::<SaturationConfig>();
        registry.register::<HueRotateConfig>();
        registry.register::<GammaConfig>();
        registry.register::<GrayscaleConfig>();
        registry.register::<InvertConfig>();

        // Filters
        registry.register::<SepiaConfig>();
        registry.register::<PixelateConfig>();
        registry.register::<GaussianBlurConfig>();

        registry
    }

    /// Register `E` under [`EffectConfig::NAME`], replacing any earlier entry.
    pub fn register<E: EffectConfig>(&mut self) -> &mut Self {
        if self
            .constructors
            .insert(E::NAME, construct::<E> as Constructor)
            .is_some()
        {
            log::debug!("replaced registered effect {}", E::NAME);
        }

        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }

    /// Registered names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.constructors.keys().copied()
    }

    /// Build an effect from its settings. Omitted properties keep their defaults.
    pub fn create(
        &self,
        name: &str,
        properties: Properties,
    ) -> ImageEffectResult<Box<dyn DynEffect>> {
        let constructor = self
            .constructors
            .get(name)
            .ok_or_else(|| ImageEffectError::UnknownEffect(name.to_string()))?;

        constructor(properties)
    }

    /// Default properties of a registered effect.
    pub fn defaults(&self, name: &str) -> ImageEffectResult<Properties> {
        self.create(name, Properties::new())?.properties()
    }
}

impl Default for EffectRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl fmt::Debug for EffectRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.constructors.keys()).finish()
    }
}
