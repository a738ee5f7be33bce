use std::fmt::Display;

pub type ColorValue = u8; // Color channel value (0-255)
pub type ColorIdx = u8; // Index into 2bpp palette (0-3)

pub const TILE_SIZE: u32 = 8;
pub const TILE_PIXELS: usize = (TILE_SIZE * TILE_SIZE) as usize;
pub const TILE_BYTES: usize = TILE_PIXELS / 4;
pub const PALETTE_SIZE: usize = 4;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Color {
    pub red: ColorValue,
    pub green: ColorValue,
    pub blue: ColorValue,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0);
    pub const WHITE: Color = Color::new(255, 255, 255);

    pub const fn new(red: ColorValue, green: ColorValue, blue: ColorValue) -> Self {
        Color { red, green, blue }
    }

    // Sort keys for palette ordering, each compared descending.
    pub fn sum(&self) -> u16 {
        self.red as u16 + self.green as u16 + self.blue as u16
    }

    pub fn green_blue_sum(&self) -> u16 {
        self.green as u16 + self.blue as u16
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.red, self.green, self.blue)?;
        Ok(())
    }
}

impl From<[ColorValue; 3]> for Color {
    fn from([red, green, blue]: [ColorValue; 3]) -> Self {
        Color { red, green, blue }
    }
}

impl From<Color> for [ColorValue; 3] {
    fn from(c: Color) -> Self {
        [c.red, c.green, c.blue]
    }
}

/// Four color slots; slot `i` is what index `i` means in the encoded tile data.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Palette {
    pub colors: [Color; PALETTE_SIZE],
}

impl Default for Palette {
    fn default() -> Self {
        Palette {
            colors: [Color::BLACK; PALETTE_SIZE],
        }
    }
}

impl Palette {
    /// Takes up to the first four colors; missing slots are black.
    pub fn padded(colors: &[Color]) -> Self {
        let mut palette = Palette::default();
        for (slot, &c) in palette.colors.iter_mut().zip(colors) {
            *slot = c;
        }
        palette
    }

    pub fn contains(&self, color: Color) -> bool {
        self.colors.contains(&color)
    }

    /// Compares the two palettes as sets, ignoring slot order and repeats.
    pub fn same_colors(&self, other: &[Color]) -> bool {
        other.iter().all(|&c| self.contains(c)) && self.colors.iter().all(|c| other.contains(c))
    }

    /// Slot of the first exactly matching color. Anything else lands on the last slot.
    pub fn index_of(&self, color: Color) -> ColorIdx {
        self.colors
            .iter()
            .position(|&c| c == color)
            .unwrap_or(PALETTE_SIZE - 1) as ColorIdx
    }
}

impl Display for Palette {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}, {}, {}, {}]",
            self.colors[0], self.colors[1], self.colors[2], self.colors[3]
        )?;
        Ok(())
    }
}
