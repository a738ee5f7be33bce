// Order in which tiles are cut out of the source image.
use serde::{Deserialize, Serialize};

use crate::{
    common::TILE_SIZE,
    encode::TileEncoder,
    image::{PixelSource, TileView},
};

/// Sprite grouping and placement. Sizes are in tiles, offsets and spacing in pixels.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Layout {
    pub sprite_width: u32,
    pub sprite_height: u32,
    pub offset_x: u32,
    pub offset_y: u32,
    pub spacing_x: u32,
    pub spacing_y: u32,
}

impl Default for Layout {
    fn default() -> Self {
        Layout {
            sprite_width: 1,
            sprite_height: 1,
            offset_x: 0,
            offset_y: 0,
            spacing_x: 0,
            spacing_y: 0,
        }
    }
}

/// Top-left corners of every tile to encode. Sprites are visited left to right,
/// top to bottom, and only when fully inside the image; tiles within a sprite
/// follow the same order so each sprite's data stays together.
pub fn tile_origins((width, height): (u32, u32), layout: &Layout) -> Vec<(u32, u32)> {
    // u64 so that no combination of u32 settings can overflow.
    let tile = TILE_SIZE as u64;
    let (width, height) = (width as u64, height as u64);
    let sw = tile * layout.sprite_width as u64;
    let sh = tile * layout.sprite_height as u64;
    let mut origins = vec![];
    if sw == 0 || sh == 0 {
        return origins;
    }

    let mut sy = layout.offset_y as u64;
    while sy + sh <= height {
        let mut sx = layout.offset_x as u64;
        while sx + sw <= width {
            for y in (sy..sy + sh).step_by(TILE_SIZE as usize) {
                for x in (sx..sx + sw).step_by(TILE_SIZE as usize) {
                    // Both lie below the image bounds, which are u32.
                    origins.push((x as u32, y as u32));
                }
            }
            sx += sw + layout.spacing_x as u64;
        }
        sy += sh + layout.spacing_y as u64;
    }
    origins
}

/// Encodes every tile of the image in scan order and concatenates the results.
pub fn encode_image(
    source: &dyn PixelSource,
    layout: &Layout,
    encoder: &mut TileEncoder,
) -> Vec<u8> {
    let origins = tile_origins(source.bounds(), layout);
    let mut data = Vec::with_capacity(origins.len() * crate::common::TILE_BYTES);
    for (x, y) in origins {
        let tile = encoder.encode(&TileView::new(source, x, y));
        data.extend_from_slice(tile.as_bytes());
    }
    data
}
