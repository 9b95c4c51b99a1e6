use anyhow::{Context, Result};
use image_effect::ChainSettings;
use std::{fs, path::Path};

/// On-disk encoding of a chain file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ChainFormat {
    Json,
    Toml,
}

impl ChainFormat {
    /// `.toml` files are TOML, everything else is JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => ChainFormat::Toml,
            _ => ChainFormat::Json,
        }
    }

    pub fn parse(self, text: &str) -> Result<ChainSettings> {
        let settings = match self {
            ChainFormat::Json => ChainSettings::from_json(text)?,
            ChainFormat::Toml => ChainSettings::from_toml(text)?,
        };

        Ok(settings)
    }

    pub fn render(self, settings: &ChainSettings) -> Result<String> {
        let text = match self {
            ChainFormat::Json => settings.to_json()?,
            ChainFormat::Toml => settings.to_toml()?,
        };

        Ok(text)
    }
}

pub fn load(path: &Path) -> Result<ChainSettings> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("read chain file {}", path.display()))?;

    let settings = ChainFormat::from_path(path)
        .parse(&text)
        .with_context(|| format!("parse chain file {}", path.display()))?;

    log::debug!("loaded {} effects from {}", settings.effects.len(), path.display());
    Ok(settings)
}

pub fn save(path: &Path, settings: &ChainSettings) -> Result<()> {
    let text = ChainFormat::from_path(path).render(settings)?;
    fs::write(path, text).with_context(|| format!("write chain file {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image_effect::{EffectChain, EffectRegistry, manipulation::FlipConfig};

    #[test]
    fn test_format_from_path() {
        assert_eq!(ChainFormat::from_path(Path::new("a/b.toml")), ChainFormat::Toml);
        assert_eq!(ChainFormat::from_path(Path::new("a/b.TOML")), ChainFormat::Toml);
        assert_eq!(ChainFormat::from_path(Path::new("a/b.json")), ChainFormat::Json);
        assert_eq!(ChainFormat::from_path(Path::new("chain")), ChainFormat::Json);
    }

    #[test]
    fn test_save_and_load() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let settings = EffectChain::new()
            .with_effect(FlipConfig::new().with_vertically(true))
            .export()?;

        for file in ["chain.json", "chain.toml"] {
            let path = dir.path().join(file);
            save(&path, &settings)?;

            let loaded = load(&path)?;
            assert_eq!(loaded, settings);
            assert!(EffectChain::import(&loaded, &EffectRegistry::builtin()).is_ok());
        }
        Ok(())
    }

    #[test]
    fn test_load_reports_path() {
        let err = load(Path::new("/nonexistent/chain.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/chain.json"));
    }
}
