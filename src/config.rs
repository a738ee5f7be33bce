use anyhow::{ensure, Context, Result};
use log::info;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::{
    common::TILE_SIZE,
    output::{ByteFormat, OutputFormat, DEFAULT_BYTE_FORMAT},
    persist::load_json,
    scan::Layout,
};

/// Settings for one conversion run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub layout: Layout,
    // Slot 0 of each new palette is the tile's first color (transparency).
    pub sprite_mode: bool,
    pub format: String,
    pub raw: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            layout: Layout::default(),
            sprite_mode: false,
            format: DEFAULT_BYTE_FORMAT.to_string(),
            raw: false,
        }
    }
}

pub fn get_config_path() -> Result<PathBuf> {
    let project_dirs = directories::ProjectDirs::from("", "", "pictotile")
        .context("Unable to open global config directory.")?;
    Ok(project_dirs.config_dir().join("config.json"))
}

impl Config {
    /// Loads `path` if given, else the user's config file when there is one.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return load_json(path);
        }
        match get_config_path() {
            Ok(default_path) if default_path.exists() => load_json(&default_path),
            _ => {
                info!("No config file, using defaults");
                Ok(Config::default())
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.layout.sprite_width > 0 && self.layout.sprite_height > 0,
            "sprite size must be at least 1x1 tiles, got {}x{}",
            self.layout.sprite_width,
            self.layout.sprite_height
        );
        ensure!(
            TILE_SIZE.checked_mul(self.layout.sprite_width).is_some()
                && TILE_SIZE.checked_mul(self.layout.sprite_height).is_some(),
            "sprite size {}x{} tiles is too large",
            self.layout.sprite_width,
            self.layout.sprite_height
        );
        if !self.raw {
            ByteFormat::parse(&self.format)?;
        }
        Ok(())
    }

    pub fn output_format(&self) -> Result<OutputFormat> {
        if self.raw {
            Ok(OutputFormat::Raw)
        } else {
            Ok(OutputFormat::Listing(ByteFormat::parse(&self.format)?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"layout": {"sprite_width": 2}, "sprite_mode": true}"#)
                .unwrap();
        assert_eq!(config.layout.sprite_width, 2);
        assert_eq!(config.layout.sprite_height, 1);
        assert!(config.sprite_mode);
        assert_eq!(config.format, DEFAULT_BYTE_FORMAT);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_sprites_and_bad_formats() {
        let mut config = Config::default();
        config.layout.sprite_height = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.layout.sprite_width = u32::MAX / 4;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.format = "%s".to_string();
        assert!(config.validate().is_err());
        config.raw = true;
        assert!(config.validate().is_ok());
        assert_eq!(config.output_format().unwrap(), OutputFormat::Raw);
    }

    #[test]
    fn explicit_missing_file_fails() {
        let path = std::env::temp_dir().join("pictotile-no-such-config.json");
        assert!(Config::load(Some(&path)).is_err());
    }
}
