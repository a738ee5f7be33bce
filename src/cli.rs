use clap::{ArgAction, Parser};
use std::path::PathBuf;

use crate::config::Config;

/// Convert a PNG into 2bpp Game Boy tile data.
///
/// Tiles are read left to right, then top to bottom. With a sprite size above
/// one tile, that order is followed inside each sprite so its data stays together.
/// Colors in new palettes are ordered brightest first.
#[derive(Parser, Debug, Default)]
#[command(name = "pictotile", disable_help_flag = true)]
pub struct Args {
    /// Input image, "-" or nothing for stdin
    pub input: Option<PathBuf>,

    /// Output file, "-" or nothing for stdout
    pub output: Option<PathBuf>,

    /// Square dimension in tiles of each sprite
    #[arg(short, long)]
    pub dim: Option<u32>,

    /// Width of each sprite in tiles
    #[arg(short, long)]
    pub width: Option<u32>,

    /// Height of each sprite in tiles
    #[arg(short = 'h', long)]
    pub height: Option<u32>,

    /// Offset of the first sprite from both the top and left edge
    #[arg(short, long)]
    pub offset: Option<u32>,

    /// Horizontal offset of the first sprite from the left
    #[arg(short = 'x', long)]
    pub xoffset: Option<u32>,

    /// Vertical offset of the first sprite from the top
    #[arg(short = 'y', long)]
    pub yoffset: Option<u32>,

    /// Distance between sprites
    #[arg(short, long)]
    pub spacing: Option<u32>,

    /// Horizontal distance between sprites
    #[arg(short = 'X', long)]
    pub xspacing: Option<u32>,

    /// Vertical distance between sprites
    #[arg(short = 'Y', long)]
    pub yspacing: Option<u32>,

    /// Treat the first color in each tile as transparency (color 0)
    #[arg(short = 't', long)]
    pub spritemode: bool,

    /// C style format applied to each output byte
    #[arg(short, long)]
    pub format: Option<String>,

    /// Write raw bytes instead of a text listing
    #[arg(short, long)]
    pub raw: bool,

    /// JSON config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Write the palettes found in the image to this JSON file
    #[arg(short, long)]
    pub palettes: Option<PathBuf>,

    /// Print help
    #[arg(long, action = ArgAction::Help)]
    pub help: Option<bool>,
}

fn stdio_if_dash(path: &Option<PathBuf>) -> Option<&PathBuf> {
    path.as_ref().filter(|p| p.as_os_str() != "-")
}

impl Args {
    pub fn input_path(&self) -> Option<&PathBuf> {
        stdio_if_dash(&self.input)
    }

    pub fn output_path(&self) -> Option<&PathBuf> {
        stdio_if_dash(&self.output)
    }

    /// Per-axis flags win over the combined ones; set flags win over the config.
    pub fn apply(&self, config: &mut Config) {
        let layout = &mut config.layout;
        if let Some(w) = self.width.or(self.dim) {
            layout.sprite_width = w;
        }
        if let Some(h) = self.height.or(self.dim) {
            layout.sprite_height = h;
        }
        if let Some(x) = self.xoffset.or(self.offset) {
            layout.offset_x = x;
        }
        if let Some(y) = self.yoffset.or(self.offset) {
            layout.offset_y = y;
        }
        if let Some(x) = self.xspacing.or(self.spacing) {
            layout.spacing_x = x;
        }
        if let Some(y) = self.yspacing.or(self.spacing) {
            layout.spacing_y = y;
        }
        if self.spritemode {
            config.sprite_mode = true;
        }
        if let Some(format) = &self.format {
            config.format = format.clone();
        }
        if self.raw {
            config.raw = true;
        }
    }
}
