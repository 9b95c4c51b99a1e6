/// Effect chain example
/// Builds a chain in code, saves its settings, then reloads and runs it

use image::ImageReader;
use image_effect::{
    ChainSettings, EffectChain, EffectRegistry,
    adjustment::{BrightnessConfig, GrayscaleConfig},
    filter::PixelateConfig,
    manipulation::{CropConfig, FlipConfig},
};
use std::path::Path;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let output_dir = Path::new("tmp");
    std::fs::create_dir_all(output_dir)?;

    let img = ImageReader::open("data/test.png")?.decode()?;

    let mut brightness = BrightnessConfig::new();
    brightness.set_amount(40)?;

    let mut pixelate = PixelateConfig::new();
    pixelate.set_block_size(8)?;

    let mut chain = EffectChain::new()
        .with_effect(CropConfig::uniform(50))
        .with_effect(FlipConfig::new().with_horizontally(true))
        .with_effect(brightness)
        .with_effect(pixelate);
    chain.push_disabled(Box::new(GrayscaleConfig::new()));

    let settings_path = output_dir.join("chain.toml");
    std::fs::write(&settings_path, chain.export()?.to_toml()?)?;

    let settings = ChainSettings::from_toml(&std::fs::read_to_string(&settings_path)?)?;
    let chain = EffectChain::import(&settings, &EffectRegistry::builtin())?;

    let img = chain.execute(img)?;
    img.save(output_dir.join("chain_effect.png"))?;

    println!("✓ {} effects applied successfully!", chain.len());
    println!("  Settings: {}", settings_path.display());
    println!("  Effect:   tmp/chain_effect.png");

    Ok(())
}
