use anyhow::{bail, ensure, Context, Result};
use itertools::Itertools;
use log::{debug, info};
use std::{fmt::Display, io::Read};

use crate::common::{Color, ColorValue, TILE_SIZE};

/// Anything tiles can be cut out of.
pub trait PixelSource {
    fn bounds(&self) -> (u32, u32);

    fn color_at(&self, x: u32, y: u32) -> Color;

    /// The palette of an already-indexed image, whose slot order must be kept as is.
    fn source_palette(&self) -> Option<&[Color]> {
        None
    }
}

pub struct RgbImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>, // row-major
}

impl RgbImage {
    pub fn new(width: u32, height: u32, pixels: Vec<Color>) -> Result<Self> {
        ensure!(
            pixels.len() == width as usize * height as usize,
            "expected {} pixels for a {}x{} image, got {}",
            width as usize * height as usize,
            width,
            height,
            pixels.len()
        );
        Ok(RgbImage {
            width,
            height,
            pixels,
        })
    }

    pub fn filled(width: u32, height: u32, color: Color) -> Self {
        RgbImage {
            width,
            height,
            pixels: vec![color; width as usize * height as usize],
        }
    }

    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        let idx = (y * self.width + x) as usize;
        self.pixels[idx] = color;
    }
}

impl PixelSource for RgbImage {
    fn bounds(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn color_at(&self, x: u32, y: u32) -> Color {
        self.pixels[(y * self.width + x) as usize]
    }
}

pub struct IndexedImage {
    pub width: u32,
    pub height: u32,
    pub indices: Vec<u8>, // row-major, one byte per pixel
    pub palette: Vec<Color>,
}

impl IndexedImage {
    pub fn new(width: u32, height: u32, indices: Vec<u8>, palette: Vec<Color>) -> Result<Self> {
        ensure!(
            indices.len() == width as usize * height as usize,
            "expected {} indices for a {}x{} image, got {}",
            width as usize * height as usize,
            width,
            height,
            indices.len()
        );
        Ok(IndexedImage {
            width,
            height,
            indices,
            palette,
        })
    }
}

impl PixelSource for IndexedImage {
    fn bounds(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn color_at(&self, x: u32, y: u32) -> Color {
        let idx = self.indices[(y * self.width + x) as usize];
        self.palette
            .get(idx as usize)
            .copied()
            .unwrap_or(Color::BLACK)
    }

    fn source_palette(&self) -> Option<&[Color]> {
        Some(&self.palette)
    }
}

pub enum DecodedImage {
    Rgb(RgbImage),
    Indexed(IndexedImage),
}

impl DecodedImage {
    pub fn kind(&self) -> &'static str {
        match self {
            DecodedImage::Rgb(_) => "direct color",
            DecodedImage::Indexed(_) => "indexed",
        }
    }

    fn inner(&self) -> &dyn PixelSource {
        match self {
            DecodedImage::Rgb(img) => img,
            DecodedImage::Indexed(img) => img,
        }
    }
}

impl PixelSource for DecodedImage {
    fn bounds(&self) -> (u32, u32) {
        self.inner().bounds()
    }

    fn color_at(&self, x: u32, y: u32) -> Color {
        self.inner().color_at(x, y)
    }

    fn source_palette(&self) -> Option<&[Color]> {
        self.inner().source_palette()
    }
}

/// An 8x8 window into a source image. The caller guarantees it lies in bounds.
#[derive(Copy, Clone)]
pub struct TileView<'a> {
    pub source: &'a dyn PixelSource,
    pub x0: u32,
    pub y0: u32,
}

impl<'a> TileView<'a> {
    pub fn new(source: &'a dyn PixelSource, x0: u32, y0: u32) -> Self {
        TileView { source, x0, y0 }
    }

    /// Pixels in row-major order: top row left to right, then the next row.
    pub fn pixels(&self) -> impl Iterator<Item = Color> + 'a {
        let (source, x0, y0) = (self.source, self.x0, self.y0);
        (0..TILE_SIZE)
            .cartesian_product(0..TILE_SIZE)
            .map(move |(y, x)| source.color_at(x0 + x, y0 + y))
    }

    pub fn source_palette(&self) -> Option<&'a [Color]> {
        self.source.source_palette()
    }
}

pub fn read_input<R: Read>(mut reader: R) -> Result<Vec<u8>> {
    let mut data = vec![];
    reader.read_to_end(&mut data)?;
    Ok(data)
}

pub fn decode_png(data: &[u8]) -> Result<DecodedImage> {
    let mut decoder = png::Decoder::new(data);
    decoder.set_transformations(png::Transformations::IDENTITY);
    let reader = decoder.read_info().context("unable to read PNG header")?;
    if reader.info().color_type == png::ColorType::Indexed {
        Ok(DecodedImage::Indexed(decode_indexed(reader)?))
    } else {
        let mut decoder = png::Decoder::new(data);
        decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
        let reader = decoder.read_info().context("unable to read PNG header")?;
        Ok(DecodedImage::Rgb(decode_direct(reader)?))
    }
}

fn decode_indexed(mut reader: png::Reader<&[u8]>) -> Result<IndexedImage> {
    let palette: Vec<Color> = match &reader.info().palette {
        Some(p) => p
            .chunks_exact(3)
            .map(|c| Color::new(c[0], c[1], c[2]))
            .collect(),
        None => bail!("indexed PNG without a palette"),
    };
    let mut buf = vec![0; reader.output_buffer_size()];
    let frame = reader.next_frame(&mut buf).context("unable to decode PNG data")?;
    let bits = frame.bit_depth as u8 as usize;
    let (width, height) = (frame.width, frame.height);
    debug!(
        "indexed PNG: {}x{}, {} bit, {} palette entries",
        width,
        height,
        bits,
        palette.len()
    );

    let mask = ((1u16 << bits) - 1) as u8;
    let mut indices = Vec::with_capacity(width as usize * height as usize);
    for row in buf.chunks_exact(frame.line_size).take(height as usize) {
        for x in 0..width as usize {
            let bit = x * bits;
            let shift = 8 - bits - bit % 8;
            indices.push((row[bit / 8] >> shift) & mask);
        }
    }
    IndexedImage::new(width, height, indices, palette)
}

fn decode_direct(mut reader: png::Reader<&[u8]>) -> Result<RgbImage> {
    let mut buf = vec![0; reader.output_buffer_size()];
    let frame = reader.next_frame(&mut buf).context("unable to decode PNG data")?;
    ensure!(
        frame.bit_depth == png::BitDepth::Eight,
        "unexpected PNG bit depth after expansion: {:?}",
        frame.bit_depth
    );
    let channels = frame.color_type.samples();
    let to_color: fn(&[ColorValue]) -> Color = match frame.color_type {
        png::ColorType::Grayscale | png::ColorType::GrayscaleAlpha => {
            |p: &[ColorValue]| Color::new(p[0], p[0], p[0])
        }
        png::ColorType::Rgb | png::ColorType::Rgba => |p: &[ColorValue]| Color::new(p[0], p[1], p[2]),
        png::ColorType::Indexed => bail!("indexed PNG was not expanded"),
    };

    let mut pixels = Vec::with_capacity(frame.width as usize * frame.height as usize);
    for row in buf.chunks_exact(frame.line_size).take(frame.height as usize) {
        pixels.extend(
            row[..frame.width as usize * channels]
                .chunks_exact(channels)
                .map(to_color),
        );
    }
    RgbImage::new(frame.width, frame.height, pixels)
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Gif,
    Jpeg,
}

impl ImageFormat {
    pub fn detect(data: &[u8]) -> Option<Self> {
        if data.starts_with(b"\x89PNG\r\n\x1a\n") {
            Some(ImageFormat::Png)
        } else if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
            Some(ImageFormat::Gif)
        } else if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(ImageFormat::Jpeg)
        } else {
            None
        }
    }
}

impl Display for ImageFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ImageFormat::Png => "png",
            ImageFormat::Gif => "gif",
            ImageFormat::Jpeg => "jpeg",
        };
        write!(f, "{}", name)?;
        Ok(())
    }
}

/// Only the first frame is used. Pixels the frame doesn't cover get index 0.
pub fn decode_gif(data: &[u8]) -> Result<IndexedImage> {
    let mut options = gif::DecodeOptions::new();
    options.set_color_output(gif::ColorOutput::Indexed);
    let mut decoder = options.read_info(data).context("unable to read GIF header")?;
    let (width, height) = (decoder.width() as usize, decoder.height() as usize);
    let global_palette = decoder.global_palette().map(|p| p.to_vec());
    let frame = decoder
        .read_next_frame()
        .context("unable to decode GIF data")?
        .context("GIF has no frames")?;
    let palette: Vec<Color> = frame
        .palette
        .as_ref()
        .or(global_palette.as_ref())
        .context("GIF without a palette")?
        .chunks_exact(3)
        .map(|c| Color::new(c[0], c[1], c[2]))
        .collect();
    debug!(
        "GIF: {}x{}, first frame {}x{} at ({}, {}), {} palette entries",
        width,
        height,
        frame.width,
        frame.height,
        frame.left,
        frame.top,
        palette.len()
    );

    let mut indices = vec![0; width * height];
    let (left, top) = (frame.left as usize, frame.top as usize);
    for (row, line) in frame.buffer.chunks_exact(frame.width as usize).enumerate() {
        let y = top + row;
        if y >= height {
            break;
        }
        for (col, &idx) in line.iter().enumerate() {
            let x = left + col;
            if x < width {
                indices[y * width + x] = idx;
            }
        }
    }
    IndexedImage::new(width as u32, height as u32, indices, palette)
}

fn cmyk_to_rgb(p: &[ColorValue]) -> Color {
    let channel = |c: u8| ((255 - c as u16) * (255 - p[3] as u16) / 255) as ColorValue;
    Color::new(channel(p[0]), channel(p[1]), channel(p[2]))
}

pub fn decode_jpeg(data: &[u8]) -> Result<RgbImage> {
    let mut decoder = jpeg_decoder::Decoder::new(data);
    let raw = decoder.decode().context("unable to decode JPEG data")?;
    let info = decoder.info().context("JPEG without a frame header")?;
    let pixels: Vec<Color> = match info.pixel_format {
        jpeg_decoder::PixelFormat::L8 => raw.iter().map(|&l| Color::new(l, l, l)).collect(),
        // Big-endian samples; the high byte is enough.
        jpeg_decoder::PixelFormat::L16 => raw
            .chunks_exact(2)
            .map(|p| Color::new(p[0], p[0], p[0]))
            .collect(),
        jpeg_decoder::PixelFormat::RGB24 => raw
            .chunks_exact(3)
            .map(|p| Color::new(p[0], p[1], p[2]))
            .collect(),
        jpeg_decoder::PixelFormat::CMYK32 => raw.chunks_exact(4).map(cmyk_to_rgb).collect(),
        #[allow(unreachable_patterns)]
        other => bail!("unsupported JPEG pixel format {:?}", other),
    };
    RgbImage::new(info.width as u32, info.height as u32, pixels)
}

pub fn decode_image(data: &[u8]) -> Result<DecodedImage> {
    match ImageFormat::detect(data) {
        Some(ImageFormat::Png) => decode_png(data),
        Some(ImageFormat::Gif) => Ok(DecodedImage::Indexed(decode_gif(data)?)),
        Some(ImageFormat::Jpeg) => Ok(DecodedImage::Rgb(decode_jpeg(data)?)),
        None => bail!("unrecognized image format (expected PNG, GIF or JPEG)"),
    }
}

pub fn load_image<R: Read>(reader: R, name: &str) -> Result<DecodedImage> {
    let data = read_input(reader).with_context(|| format!("unable to read {}", name))?;
    let image = decode_image(&data).with_context(|| format!("unable to decode {}", name))?;
    let (width, height) = image.bounds();
    if let Some(format) = ImageFormat::detect(&data) {
        info!(
            "{} decoded from format {} ({}, {}x{})",
            name,
            format,
            image.kind(),
            width,
            height
        );
    }
    Ok(image)
}
