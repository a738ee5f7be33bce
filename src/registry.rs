// Run-wide set of palettes, in the order they were first seen.
use crate::common::{Color, Palette};

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct PaletteId(pub usize);

#[derive(Default, Debug)]
pub struct PaletteRegistry {
    palettes: Vec<Palette>,
}

impl PaletteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Finds a registered palette holding exactly the given set of colors.
    pub fn find_matching(&self, colors: &[Color]) -> Option<PaletteId> {
        self.palettes
            .iter()
            .position(|p| p.same_colors(colors))
            .map(PaletteId)
    }

    /// Appends without checking for duplicates; call `find_matching` first.
    pub fn register(&mut self, palette: Palette) -> PaletteId {
        self.palettes.push(palette);
        PaletteId(self.palettes.len() - 1)
    }

    pub fn get(&self, id: PaletteId) -> Option<&Palette> {
        self.palettes.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.palettes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.palettes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PaletteId, &Palette)> {
        self.palettes
            .iter()
            .enumerate()
            .map(|(i, p)| (PaletteId(i), p))
    }
}
