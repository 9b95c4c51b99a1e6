/// Sepia tone effect example
/// Blends half of the sepia tone into the original image

use image::ImageReader;
use image_effect::{Effect, filter::SepiaConfig};
use std::path::Path;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let output_dir = Path::new("tmp");
    std::fs::create_dir_all(output_dir)?;

    // Run `create_test_image` first
    let img = ImageReader::open("data/test.png")?.decode()?;

    let mut effect = SepiaConfig::new();
    effect.set_intensity(0.5)?;

    let img = effect.apply(img)?;
    img.save(output_dir.join("sepia_effect.png"))?;

    println!("✓ Sepia effect applied successfully!");
    println!("  Effect:   tmp/sepia_effect.png");

    Ok(())
}
