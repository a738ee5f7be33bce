// Conversion of 8x8 tiles into 2bpp, two-bitplane tile data.
use log::{debug, warn};
use std::cmp::Ordering;

use crate::{
    common::{Color, ColorIdx, Palette, PALETTE_SIZE, TILE_BYTES, TILE_PIXELS, TILE_SIZE},
    image::TileView,
    registry::{PaletteId, PaletteRegistry},
};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct EncodedTile {
    pub data: [u8; TILE_BYTES],
    // None when the source image's own palette was used.
    pub palette_id: Option<PaletteId>,
}

impl EncodedTile {
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

pub struct TileEncoder<'a> {
    registry: &'a mut PaletteRegistry,
    sprite_mode: bool,
}

impl<'a> TileEncoder<'a> {
    pub fn new(registry: &'a mut PaletteRegistry, sprite_mode: bool) -> Self {
        TileEncoder {
            registry,
            sprite_mode,
        }
    }

    pub fn encode(&mut self, tile: &TileView) -> EncodedTile {
        let (palette, palette_id) = self.resolve_palette(tile);
        let indices = assign_indices(&palette, tile.pixels());
        EncodedTile {
            data: pack_bitplanes(&indices),
            palette_id,
        }
    }

    /// Picks the palette a tile is encoded against, registering a new one if needed.
    pub fn resolve_palette(&mut self, tile: &TileView) -> (Palette, Option<PaletteId>) {
        if let Some(source_palette) = tile.source_palette() {
            return (Palette::padded(source_palette), None);
        }

        let TileColors { colors, .. } = extract_colors(tile);
        let mut palette = Palette::padded(&colors);
        if let Some(id) = self.registry.find_matching(&palette.colors) {
            // Keep the existing slot order so shared colors get the same index.
            return (self.registry.get(id).copied().unwrap_or(palette), Some(id));
        }

        sort_palette(&mut palette, self.sprite_mode);
        let id = self.registry.register(palette);
        debug!("Registered palette {}: {}", id.0, palette);
        (palette, Some(id))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileColors {
    /// First-seen distinct colors, at most four.
    pub colors: Vec<Color>,
    /// Set when the tile held a fifth distinct color.
    pub overflow: bool,
}

pub fn extract_colors(tile: &TileView) -> TileColors {
    let mut colors: Vec<Color> = Vec::with_capacity(PALETTE_SIZE);
    let mut overflow = false;
    for c in tile.pixels() {
        if colors.contains(&c) {
            continue;
        }
        if colors.len() == PALETTE_SIZE {
            overflow = true;
            break;
        }
        colors.push(c);
    }
    if overflow {
        warn!(
            "Tile at ({}, {}) has more than {} colors; extra colors will use index {}",
            tile.x0,
            tile.y0,
            PALETTE_SIZE,
            PALETTE_SIZE - 1
        );
    }
    TileColors { colors, overflow }
}

/// Brighter colors first: by R+G+B, then G+B, then B. Equal keys compare equal.
pub fn brightness_order(a: &Color, b: &Color) -> Ordering {
    b.sum()
        .cmp(&a.sum())
        .then_with(|| b.green_blue_sum().cmp(&a.green_blue_sum()))
        .then_with(|| b.blue.cmp(&a.blue))
}

/// Stable bubble sort by `brightness_order`. In sprite mode slot 0 stays put.
pub fn sort_palette(palette: &mut Palette, sprite_mode: bool) {
    let first = if sprite_mode { 1 } else { 0 };
    let colors = &mut palette.colors;
    for pass in 0..colors.len() {
        for j in first..colors.len() - 1 - pass {
            if brightness_order(&colors[j], &colors[j + 1]) == Ordering::Greater {
                colors.swap(j, j + 1);
            }
        }
    }
}

pub fn assign_indices(
    palette: &Palette,
    pixels: impl Iterator<Item = Color>,
) -> [ColorIdx; TILE_PIXELS] {
    let mut indices = [0; TILE_PIXELS];
    for (idx, c) in indices.iter_mut().zip(pixels) {
        *idx = palette.index_of(c);
    }
    indices
}

/// Each row of 8 indices becomes a low-bit plane byte then a high-bit plane byte,
/// with the leftmost pixel in the most significant bit.
pub fn pack_bitplanes(indices: &[ColorIdx; TILE_PIXELS]) -> [u8; TILE_BYTES] {
    let mut data = [0; TILE_BYTES];
    for (y, row) in indices.chunks_exact(TILE_SIZE as usize).enumerate() {
        for (x, &c) in row.iter().enumerate() {
            data[y * 2] |= (c & 1) << (7 - x);
            data[y * 2 + 1] |= ((c >> 1) & 1) << (7 - x);
        }
    }
    data
}
