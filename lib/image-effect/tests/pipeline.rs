use image::{DynamicImage, ImageBuffer, Luma, Rgb, RgbImage, Rgba, RgbaImage};
use image_effect::{
    ChainSettings, DynEffect, Effect, EffectChain, EffectConfig, EffectRegistry, ImageEffectError,
    ImageEffectResult, Properties,
    adjustment::{BrightnessConfig, GrayscaleConfig, GrayscaleMode, HueRotateConfig},
    filter::PixelateConfig,
    manipulation::{CropConfig, FlipConfig, RotateAngle, RotateConfig},
};
use serde::{Deserialize, Serialize};
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

const NON_IDENTITY_DEFAULTS: [&str; 3] = ["Grayscale", "Invert", "Sepia"];

fn test_images() -> Vec<DynamicImage> {
    let rgba = RgbaImage::from_fn(7, 5, |x, y| {
        Rgba([(x * 31) as u8, (y * 47) as u8, (x * y * 11) as u8, (128 + x + y) as u8])
    });
    let rgb = RgbImage::from_fn(5, 7, |x, y| Rgb([(x * 50) as u8, (y * 33) as u8, 77]));

    vec![rgba.into(), rgb.into()]
}

fn flip(horizontally: bool, vertically: bool) -> FlipConfig {
    FlipConfig::new()
        .with_horizontally(horizontally)
        .with_vertically(vertically)
}

#[test]
fn default_effects_are_identity() -> anyhow::Result<()> {
    let registry = EffectRegistry::builtin();

    for name in registry.names() {
        if NON_IDENTITY_DEFAULTS.contains(&name) {
            continue;
        }

        let effect = registry.create(name, Properties::new())?;
        for image in test_images() {
            assert_eq!(effect.run(image.clone())?, image, "{name} default is not a no-op");
        }
    }

    Ok(())
}

#[test]
fn non_identity_defaults_still_run() -> anyhow::Result<()> {
    let registry = EffectRegistry::builtin();

    for name in NON_IDENTITY_DEFAULTS {
        let effect = registry.create(name, Properties::new())?;
        for image in test_images() {
            let output = effect.run(image.clone())?;
            assert_eq!(output.color(), image.color());
            assert_ne!(output, image, "{name} default should change the image");
        }
    }

    Ok(())
}

#[test]
fn flip_is_an_involution() -> anyhow::Result<()> {
    for (horizontally, vertically) in [(false, false), (true, false), (false, true), (true, true)] {
        let config = flip(horizontally, vertically);
        for image in test_images() {
            let twice = config.apply(config.apply(image.clone())?)?;
            assert_eq!(twice, image);
        }
    }

    Ok(())
}

#[test]
fn flip_axes_commute() -> anyhow::Result<()> {
    for image in test_images() {
        let both = flip(true, true).apply(image.clone())?;

        let h_then_v = EffectChain::new()
            .with_effect(flip(true, false))
            .with_effect(flip(false, true))
            .execute(image.clone())?;

        let v_then_h = EffectChain::new()
            .with_effect(flip(false, true))
            .with_effect(flip(true, false))
            .execute(image)?;

        assert_eq!(h_then_v, both);
        assert_eq!(v_then_h, both);
    }

    Ok(())
}

#[test]
fn chain_keeps_caller_order() -> anyhow::Result<()> {
    let image = test_images().remove(0);
    let crop = CropConfig::new().with_left(2);

    let crop_then_flip = EffectChain::new()
        .with_effect(crop.clone())
        .with_effect(flip(true, false))
        .execute(image.clone())?;

    let flip_then_crop = EffectChain::new()
        .with_effect(flip(true, false))
        .with_effect(crop)
        .execute(image)?;

    assert_eq!(crop_then_flip.width(), flip_then_crop.width());
    assert_ne!(crop_then_flip, flip_then_crop);
    Ok(())
}

#[test]
fn chain_matches_manual_fold() -> anyhow::Result<()> {
    let image = test_images().remove(1);
    let rotate = RotateConfig::new().with_angle(RotateAngle::Degrees90);
    let gray = GrayscaleConfig::new().with_mode(GrayscaleMode::Average);

    let manual = gray.apply(rotate.apply(image.clone())?)?;
    let chained = EffectChain::new()
        .with_effect(rotate)
        .with_effect(gray)
        .execute(image)?;

    assert_eq!(chained, manual);
    Ok(())
}

/// Counts how often it runs so tests can tell whether the chain reached it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Probe {
    #[serde(skip)]
    hits: Arc<AtomicUsize>,
}

impl Effect for Probe {
    fn apply(&self, image: DynamicImage) -> ImageEffectResult<DynamicImage> {
        self.hits.fetch_add(1, Ordering::SeqCst);
        Ok(image)
    }
}

impl EffectConfig for Probe {
    const NAME: &'static str = "Probe";
}

#[test]
fn failure_stops_the_chain() {
    let first = Probe::default();
    let third = Probe::default();

    let mut brightness = BrightnessConfig::new();
    brightness.set_amount(30).unwrap();

    let chain = EffectChain::new()
        .with_effect(first.clone())
        .with_effect(brightness)
        .with_effect(third.clone());

    let image: DynamicImage = ImageBuffer::<Luma<u16>, Vec<u16>>::new(4, 4).into();
    let err = chain.execute(image).unwrap_err();

    match err {
        ImageEffectError::ChainExecutionFailure {
            index,
            name,
            source,
        } => {
            assert_eq!(index, 1);
            assert_eq!(name, "Brightness");
            assert!(matches!(
                *source,
                ImageEffectError::UnsupportedImageFormat { effect: "Brightness", .. }
            ));
        }
        other => panic!("unexpected error: {other}"),
    }

    assert_eq!(first.hits.load(Ordering::SeqCst), 1);
    assert_eq!(third.hits.load(Ordering::SeqCst), 0);
}

#[test]
fn settings_round_trip_is_stable() -> anyhow::Result<()> {
    let mut pixelate = PixelateConfig::new();
    pixelate.set_block_size(6)?;

    let chain = EffectChain::new()
        .with_effect(flip(true, false))
        .with_effect(HueRotateConfig::new().with_degrees(45))
        .with_effect(pixelate);

    let first = chain.export()?.to_json()?;

    let registry = EffectRegistry::builtin();
    let restored = EffectChain::import(&ChainSettings::from_json(&first)?, &registry)?;
    let second = restored.export()?.to_json()?;

    assert_eq!(first, second);

    let image = test_images().remove(0);
    assert_eq!(chain.execute(image.clone())?, restored.execute(image)?);
    Ok(())
}

#[test]
fn custom_effects_round_trip_through_registry() -> anyhow::Result<()> {
    let mut registry = EffectRegistry::builtin();
    registry.register::<Probe>();

    let chain = EffectChain::new()
        .with_effect(Probe::default())
        .with_effect(flip(false, true));

    let settings = chain.export()?;
    assert_eq!(settings.effects[0].name, "Probe");

    let restored = EffectChain::import(&settings, &registry)?;
    assert_eq!(restored.export()?, settings);
    assert!(EffectChain::import(&settings, &EffectRegistry::builtin()).is_err());
    Ok(())
}
