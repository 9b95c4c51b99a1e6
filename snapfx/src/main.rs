use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use config::ChainFormat;
use image::{DynamicImage, ImageFormat};
use image_effect::{ChainSettings, EffectChain, EffectRegistry, EffectSettings};
use std::path::{Path, PathBuf};

mod config;

#[derive(Parser, Debug)]
#[command(version, about = "Apply image effect chains to screenshots")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a chain file against an image
    Apply {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long)]
        output: PathBuf,

        /// Chain settings, JSON or TOML (picked by extension)
        #[arg(short, long)]
        chain: PathBuf,
    },

    /// List the available effects
    Effects,

    /// Print the default settings of an effect as a one-entry chain
    Defaults {
        name: String,

        #[arg(short, long, value_enum, default_value_t = ChainFormat::Json)]
        format: ChainFormat,

        /// Write a chain file instead of printing; the extension picks the format
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let registry = EffectRegistry::builtin();

    match cli.command {
        Command::Apply {
            input,
            output,
            chain,
        } => apply(&registry, &input, &output, &chain),
        Command::Effects => {
            for name in registry.names() {
                println!("{name}");
            }
            Ok(())
        }
        Command::Defaults {
            name,
            format,
            output,
        } => match output {
            Some(path) => save_defaults(&registry, &name, &path),
            None => {
                println!("{}", format.render(&default_settings(&registry, &name)?)?);
                Ok(())
            }
        },
    }
}

fn apply(registry: &EffectRegistry, input: &Path, output: &Path, chain: &Path) -> Result<()> {
    let settings = config::load(chain)?;
    let chain = EffectChain::import(&settings, registry)
        .with_context(|| format!("build effect chain from {}", chain.display()))?;

    let image = image::open(input).with_context(|| format!("open image {}", input.display()))?;
    log::info!(
        "loaded {} ({}x{} {:?})",
        input.display(),
        image.width(),
        image.height(),
        image.color()
    );

    let image = chain.execute(image).context("run effect chain")?;
    let image = match ImageFormat::from_path(output) {
        // JPEG has no alpha channel
        Ok(ImageFormat::Jpeg) if image.color().has_alpha() => {
            DynamicImage::ImageRgb8(image.to_rgb8())
        }
        _ => image,
    };

    image
        .save(output)
        .with_context(|| format!("save image {}", output.display()))?;

    log::info!("saved {} ({}x{})", output.display(), image.width(), image.height());
    Ok(())
}

fn default_settings(registry: &EffectRegistry, name: &str) -> Result<ChainSettings> {
    Ok(ChainSettings {
        effects: vec![EffectSettings {
            name: name.to_string(),
            enabled: true,
            properties: registry.defaults(name)?,
        }],
    })
}

fn save_defaults(registry: &EffectRegistry, name: &str, output: &Path) -> Result<()> {
    config::save(output, &default_settings(registry, name)?)?;
    log::info!("wrote {name} defaults to {}", output.display());
    Ok(())
}
