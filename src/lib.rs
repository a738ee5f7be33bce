pub mod cli;
pub mod common;
pub mod config;
pub mod encode;
pub mod image;
pub mod output;
pub mod persist;
pub mod registry;
pub mod scan;

use crate::{config::Config, encode::TileEncoder, image::PixelSource, registry::PaletteRegistry};

/// Encodes a whole image against a run's palette registry.
pub fn convert(
    image: &dyn PixelSource,
    config: &Config,
    registry: &mut PaletteRegistry,
) -> Vec<u8> {
    let mut encoder = TileEncoder::new(registry, config.sprite_mode);
    scan::encode_image(image, &config.layout, &mut encoder)
}
