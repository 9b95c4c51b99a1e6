//! Ordered effect chains and their settings.

use crate::{DynEffect, EffectRegistry, ImageEffectError, ImageEffectResult, Properties};
use derivative::Derivative;
use image::DynamicImage;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone)]
pub struct ChainEntry {
    effect: Box<dyn DynEffect>,
    enabled: bool,
}

impl ChainEntry {
    pub fn effect(&self) -> &dyn DynEffect {
        self.effect.as_ref()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

/// An ordered list of effects, applied first to last.
///
/// Disabled entries keep their position but are skipped by [`EffectChain::execute`].
#[derive(Debug, Clone, Default)]
pub struct EffectChain {
    entries: Vec<ChainEntry>,
}

impl EffectChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_effect(mut self, effect: impl DynEffect + 'static) -> Self {
        self.push(effect);
        self
    }

    pub fn push(&mut self, effect: impl DynEffect + 'static) {
        self.push_boxed(Box::new(effect));
    }

    pub fn push_boxed(&mut self, effect: Box<dyn DynEffect>) {
        self.entries.push(ChainEntry {
            effect,
            enabled: true,
        });
    }

    pub fn push_disabled(&mut self, effect: Box<dyn DynEffect>) {
        self.entries.push(ChainEntry {
            effect,
            enabled: false,
        });
    }

    pub fn insert(&mut self, index: usize, effect: Box<dyn DynEffect>) -> ImageEffectResult<()> {
        if index > self.entries.len() {
            return Err(self.out_of_range(index));
        }

        self.entries.insert(
            index,
            ChainEntry {
                effect,
                enabled: true,
            },
        );
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> ImageEffectResult<Box<dyn DynEffect>> {
        if index >= self.entries.len() {
            return Err(self.out_of_range(index));
        }

        Ok(self.entries.remove(index).effect)
    }

    /// Move the effect at `from` so it ends up at `to`.
    pub fn move_effect(&mut self, from: usize, to: usize) -> ImageEffectResult<()> {
        if from >= self.entries.len() {
            return Err(self.out_of_range(from));
        }
        if to >= self.entries.len() {
            return Err(self.out_of_range(to));
        }

        let entry = self.entries.remove(from);
        self.entries.insert(to, entry);
        Ok(())
    }

    pub fn set_enabled(&mut self, index: usize, enabled: bool) -> ImageEffectResult<()> {
        let len = self.entries.len();
        let entry = self
            .entries
            .get_mut(index)
            .ok_or(ImageEffectError::IndexOutOfRange { index, len })?;

        entry.enabled = enabled;
        Ok(())
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ChainEntry> {
        self.entries.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChainEntry> {
        self.entries.iter()
    }

    fn out_of_range(&self, index: usize) -> ImageEffectError {
        ImageEffectError::IndexOutOfRange {
            index,
            len: self.entries.len(),
        }
    }

    /// Fold the image through every enabled effect.
    ///
    /// Stops at the first failure and reports which effect caused it; effects
    /// after it are not applied.
    pub fn execute(&self, image: DynamicImage) -> ImageEffectResult<DynamicImage> {
        log::debug!(
            "executing {} effects on a {}x{} {:?} image",
            self.entries.len(),
            image.width(),
            image.height(),
            image.color()
        );

        self.entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.enabled)
            .try_fold(image, |image, (index, entry)| {
                let name = entry.effect.name();
                log::trace!("applying effect #{index} ({name})");

                entry
                    .effect
                    .run(image)
                    .map_err(|e| ImageEffectError::ChainExecutionFailure {
                        index,
                        name,
                        source: Box::new(e),
                    })
            })
    }

    pub fn export(&self) -> ImageEffectResult<ChainSettings> {
        let effects = self
            .entries
            .iter()
            .map(|entry| {
                Ok(EffectSettings {
                    name: entry.effect.name().to_string(),
                    enabled: entry.enabled,
                    properties: entry.effect.properties()?,
                })
            })
            .collect::<ImageEffectResult<Vec<_>>>()?;

        Ok(ChainSettings { effects })
    }

    pub fn import(settings: &ChainSettings, registry: &EffectRegistry) -> ImageEffectResult<Self> {
        let mut chain = Self::new();

        for item in &settings.effects {
            let effect = registry.create(&item.name, item.properties.clone())?;
            chain.entries.push(ChainEntry {
                effect,
                enabled: item.enabled,
            });
        }

        log::debug!("imported {} effects", chain.len());
        Ok(chain)
    }
}

/// Execute `chain` against `image`. Same as [`EffectChain::execute`].
pub fn execute(image: DynamicImage, chain: &EffectChain) -> ImageEffectResult<DynamicImage> {
    chain.execute(image)
}

fn enabled_default() -> bool {
    true
}

/// Serialized form of a single chain entry.
#[derive(Debug, Clone, PartialEq, Derivative, Serialize, Deserialize)]
#[derivative(Default)]
pub struct EffectSettings {
    pub name: String,

    #[derivative(Default(value = "true"))]
    #[serde(default = "enabled_default")]
    pub enabled: bool,

    #[serde(default)]
    pub properties: Properties,
}

/// Serialized form of an [`EffectChain`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChainSettings {
    #[serde(default)]
    pub effects: Vec<EffectSettings>,
}

impl ChainSettings {
    pub fn from_json(text: &str) -> ImageEffectResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> ImageEffectResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_toml(text: &str) -> ImageEffectResult<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn to_toml(&self) -> ImageEffectResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        adjustment::{BrightnessConfig, ContrastConfig, InvertConfig},
        filter::SepiaConfig,
        manipulation::{CropConfig, FlipConfig},
        raster::testing::gradient_rgba,
    };

    fn flip_h() -> FlipConfig {
        FlipConfig::new().with_horizontally(true)
    }

    #[test]
    fn test_empty_chain_is_identity() -> anyhow::Result<()> {
        let image = gradient_rgba(4, 4);
        assert_eq!(EffectChain::new().execute(image.clone())?, image);
        assert_eq!(execute(image.clone(), &EffectChain::new())?, image);
        Ok(())
    }

    #[test]
    fn test_disabled_entries_are_skipped() -> anyhow::Result<()> {
        let image = gradient_rgba(4, 4);
        let mut chain = EffectChain::new().with_effect(InvertConfig::new());
        chain.push_disabled(Box::new(flip_h()));
        chain.set_enabled(0, false)?;

        assert_eq!(chain.execute(image.clone())?, image);
        assert!(!chain.get(1).map(ChainEntry::is_enabled).unwrap_or(true));
        Ok(())
    }

    #[test]
    fn test_editing() -> anyhow::Result<()> {
        let mut chain = EffectChain::new()
            .with_effect(flip_h())
            .with_effect(InvertConfig::new());
        chain.insert(1, Box::new(CropConfig::uniform(1)))?;

        let names: Vec<_> = chain.iter().map(|e| e.effect().name()).collect();
        assert_eq!(names, ["Flip", "Crop", "Invert"]);

        chain.move_effect(2, 0)?;
        let names: Vec<_> = chain.iter().map(|e| e.effect().name()).collect();
        assert_eq!(names, ["Invert", "Flip", "Crop"]);

        assert_eq!(chain.remove(1)?.name(), "Flip");
        assert_eq!(chain.len(), 2);

        assert!(matches!(
            chain.insert(5, Box::new(flip_h())),
            Err(ImageEffectError::IndexOutOfRange { index: 5, len: 2 })
        ));
        assert!(chain.move_effect(0, 2).is_err());
        assert!(chain.set_enabled(9, true).is_err());

        chain.clear();
        assert!(chain.is_empty());
        Ok(())
    }

    #[test]
    fn test_failure_reports_index_and_name() {
        let chain = EffectChain::new()
            .with_effect(flip_h())
            .with_effect(CropConfig::uniform(10));

        let err = chain.execute(gradient_rgba(4, 4)).unwrap_err();
        match err {
            ImageEffectError::ChainExecutionFailure {
                index,
                name,
                source,
            } => {
                assert_eq!((index, name), (1, "Crop"));
                assert!(matches!(*source, ImageEffectError::InvalidImage { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_export_import() -> anyhow::Result<()> {
        let mut brightness = BrightnessConfig::new();
        brightness.set_amount(-12)?;

        let mut chain = EffectChain::new()
            .with_effect(flip_h())
            .with_effect(brightness);
        chain.push_disabled(Box::new(InvertConfig::new()));

        let settings = chain.export()?;
        assert_eq!(settings.effects.len(), 3);
        assert_eq!(settings.effects[1].properties["amount"], -12);
        assert!(!settings.effects[2].enabled);

        let imported = EffectChain::import(&settings, &EffectRegistry::builtin())?;
        assert_eq!(imported.export()?, settings);
        Ok(())
    }

    #[test]
    fn test_exported_fractions_stay_readable() -> anyhow::Result<()> {
        let mut contrast = ContrastConfig::new();
        contrast.set_amount(0.1)?;

        let mut sepia = SepiaConfig::new();
        sepia.set_intensity(0.3)?;

        let json = EffectChain::new()
            .with_effect(contrast)
            .with_effect(sepia)
            .export()?
            .to_json()?;

        assert!(json.contains(r#""amount": 0.1"#), "{json}");
        assert!(json.contains(r#""intensity": 0.3"#), "{json}");
        assert!(!json.contains("0000"), "{json}");

        let settings = ChainSettings::from_json(&json)?;
        let toml = settings.to_toml()?;
        assert!(toml.contains("amount = 0.1"), "{toml}");
        Ok(())
    }

    #[test]
    fn test_settings_defaults_when_omitted() -> anyhow::Result<()> {
        let settings = ChainSettings::from_json(r#"{ "effects": [ { "name": "Flip" } ] }"#)?;
        assert!(settings.effects[0].enabled);
        assert!(settings.effects[0].properties.is_empty());

        let chain = EffectChain::import(&settings, &EffectRegistry::builtin())?;
        let image = gradient_rgba(3, 3);
        assert_eq!(chain.execute(image.clone())?, image);
        Ok(())
    }

    #[test]
    fn test_toml_settings() -> anyhow::Result<()> {
        let text = r#"
            [[effects]]
            name = "Flip"
            properties = { horizontally = true }

            [[effects]]
            name = "Pixelate"
            enabled = false
            properties = { block_size = 4 }
        "#;

        let settings = ChainSettings::from_toml(text)?;
        let chain = EffectChain::import(&settings, &EffectRegistry::builtin())?;
        assert_eq!(chain.len(), 2);
        assert!(!chain.get(1).map(ChainEntry::is_enabled).unwrap_or(true));

        let again = ChainSettings::from_toml(&settings.to_toml()?)?;
        assert_eq!(again, settings);
        Ok(())
    }

    #[test]
    fn test_import_unknown_effect() {
        let settings = ChainSettings {
            effects: vec![EffectSettings {
                name: "Swirl".to_string(),
                ..Default::default()
            }],
        };

        assert!(matches!(
            EffectChain::import(&settings, &EffectRegistry::builtin()),
            Err(ImageEffectError::UnknownEffect(_))
        ));
    }
}
