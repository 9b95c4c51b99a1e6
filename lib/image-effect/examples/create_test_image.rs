use image::{Rgba, RgbaImage};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    std::fs::create_dir_all("data")?;

    // 800x600 gradient with a translucent right half
    let img = RgbaImage::from_fn(800, 600, |x, y| {
        let r = (x * 255 / 800) as u8;
        let g = (y * 255 / 600) as u8;
        let b = ((x + y) * 255 / 1400) as u8;
        let a = if x < 400 { 255 } else { 160 };
        Rgba([r, g, b, a])
    });

    img.save("data/test.png")?;
    println!("Created data/test.png");
    Ok(())
}
