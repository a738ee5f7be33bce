use pictotile::{
    common::{Color, TILE_BYTES},
    config::Config,
    convert,
    image::{decode_image, decode_png, PixelSource},
    output::{write_output, ByteFormat, OutputFormat},
    registry::PaletteRegistry,
    scan::Layout,
};

fn rgb_png(width: u32, height: u32, pixel: impl Fn(u32, u32) -> [u8; 3]) -> Vec<u8> {
    let mut data = vec![];
    for y in 0..height {
        for x in 0..width {
            data.extend(pixel(x, y));
        }
    }
    let mut out = vec![];
    {
        let mut encoder = png::Encoder::new(&mut out, width, height);
        encoder.set_color(png::ColorType::Rgb);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header().unwrap();
        writer.write_image_data(&data).unwrap();
    }
    out
}

// Index (high bit * 2 + low bit) of pixel (x, y) within one encoded tile.
fn index_at(tile: &[u8], x: usize, y: usize) -> u8 {
    let low = (tile[y * 2] >> (7 - x)) & 1;
    let high = (tile[y * 2 + 1] >> (7 - x)) & 1;
    high << 1 | low
}

#[test]
fn two_tiles_with_the_same_colors_share_one_palette() {
    // Left tile: checkerboard. Right tile: a white band at the bottom.
    let png = rgb_png(16, 8, |x, y| {
        let white = if x < 8 { (x + y) % 2 == 0 } else { y >= 5 };
        if white {
            [255, 255, 255]
        } else {
            [0, 0, 0]
        }
    });
    let image = decode_png(&png).unwrap();
    let mut registry = PaletteRegistry::new();
    let data = convert(&image, &Config::default(), &mut registry);

    assert_eq!(data.len(), 2 * TILE_BYTES);
    assert_eq!(registry.len(), 1);
    let (a, b) = data.split_at(TILE_BYTES);
    let white_in_a = index_at(a, 0, 0);
    let white_in_b = index_at(b, 0, 7);
    assert_eq!(white_in_a, white_in_b);
    assert_eq!(white_in_a, 0);
    assert_eq!(index_at(a, 1, 0), index_at(b, 0, 0));
}

#[test]
fn registry_carries_over_between_images_in_one_run() {
    let dark_first = rgb_png(8, 8, |x, _| if x == 0 { [0, 0, 90] } else { [90, 0, 0] });
    let red_first = rgb_png(8, 8, |x, _| if x == 7 { [0, 0, 90] } else { [90, 0, 0] });
    let mut registry = PaletteRegistry::new();
    let a = convert(&decode_png(&dark_first).unwrap(), &Config::default(), &mut registry);
    let b = convert(&decode_png(&red_first).unwrap(), &Config::default(), &mut registry);
    assert_eq!(registry.len(), 1);
    // Equal sums; blue wins on green+blue, so it is index 0 in both.
    assert_eq!(index_at(&a, 0, 0), 0);
    assert_eq!(index_at(&b, 7, 0), 0);
    assert_eq!(index_at(&b, 0, 0), 1);
}

#[test]
fn sprite_mode_reserves_slot_zero_for_first_color() {
    let png = rgb_png(8, 8, |x, y| match (x, y) {
        (0, 0) => [10, 10, 10],
        (1, 0) => [250, 250, 250],
        _ => [120, 120, 120],
    });
    let image = decode_png(&png).unwrap();
    let config = Config {
        sprite_mode: true,
        ..Config::default()
    };
    let mut registry = PaletteRegistry::new();
    let data = convert(&image, &config, &mut registry);

    let palette = registry.iter().next().map(|(_, p)| *p).unwrap();
    assert_eq!(palette.colors[0], Color::new(10, 10, 10));
    assert_eq!(palette.colors[1], Color::new(250, 250, 250));
    assert_eq!(index_at(&data, 0, 0), 0);
    assert_eq!(index_at(&data, 1, 0), 1);
    assert_eq!(index_at(&data, 2, 0), 2);
}

#[test]
fn indexed_png_keeps_its_own_index_order() {
    // Palette deliberately darkest first; sorting would reverse it.
    let palette = vec![0, 0, 0, 85, 85, 85, 170, 170, 170, 255, 255, 255];
    let row = [0b0001_1011u8, 0b0001_1011]; // 0 1 2 3 0 1 2 3
    let data: Vec<u8> = row.iter().copied().cycle().take(16).collect();
    let mut png_bytes = vec![];
    {
        let mut encoder = png::Encoder::new(&mut png_bytes, 8, 8);
        encoder.set_color(png::ColorType::Indexed);
        encoder.set_depth(png::BitDepth::Two);
        encoder.set_palette(palette);
        let mut writer = encoder.write_header().unwrap();
        writer.write_image_data(&data).unwrap();
    }
    let image = decode_png(&png_bytes).unwrap();
    assert!(image.source_palette().is_some());

    let mut registry = PaletteRegistry::new();
    let tile = convert(&image, &Config::default(), &mut registry);
    assert!(registry.is_empty());
    for y in 0..8 {
        for x in 0..8 {
            assert_eq!(index_at(&tile, x, y), (x % 4) as u8);
        }
    }
}

#[test]
fn gif_input_keeps_its_own_index_order() {
    let palette = [0, 0, 0, 85, 85, 85, 170, 170, 170, 255, 255, 255];
    let indices: Vec<u8> = (0..64).map(|i| (i % 4) as u8).collect();
    let mut gif_bytes = vec![];
    {
        let mut encoder = gif::Encoder::new(&mut gif_bytes, 8, 8, &palette).unwrap();
        let frame = gif::Frame {
            width: 8,
            height: 8,
            buffer: std::borrow::Cow::Borrowed(&indices),
            ..gif::Frame::default()
        };
        encoder.write_frame(&frame).unwrap();
    }
    let image = decode_image(&gif_bytes).unwrap();
    assert!(image.source_palette().is_some());

    let mut registry = PaletteRegistry::new();
    let tile = convert(&image, &Config::default(), &mut registry);
    assert!(registry.is_empty());
    for y in 0..8 {
        for x in 0..8 {
            assert_eq!(index_at(&tile, x, y), (x % 4) as u8);
        }
    }
}

#[test]
fn sprite_layout_and_listing_output() {
    // 16x16 image: only the top-left tile is white.
    let png = rgb_png(16, 16, |x, y| {
        if x < 8 && y < 8 {
            [255, 255, 255]
        } else {
            [0, 0, 0]
        }
    });
    let image = decode_png(&png).unwrap();
    let config = Config {
        layout: Layout {
            sprite_width: 2,
            sprite_height: 2,
            ..Layout::default()
        },
        ..Config::default()
    };
    let mut registry = PaletteRegistry::new();
    let data = convert(&image, &config, &mut registry);
    assert_eq!(data.len(), 4 * TILE_BYTES);
    assert_eq!(registry.len(), 2);

    let mut out = vec![];
    let format = OutputFormat::Listing(ByteFormat::parse("%02X").unwrap());
    write_output(&mut out, &data, &format).unwrap();
    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines.iter().all(|l| l.len() == 32));
    // White alone pads to [white, black, black, black]: all index 0.
    assert_eq!(lines[0], "0".repeat(32));
}
