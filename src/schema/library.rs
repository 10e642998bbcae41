//! The fixed table of recognizable patterns and their display colours.

use serde::{Deserialize, Serialize};

use super::{FormatError, Pattern};

/// Identifier written into the scan overlay. Library ids start at 1.
pub type PatternId = u16;

/// Overlay value for cells that belong to no recognized pattern.
pub const UNMARKED: PatternId = 0;

/// An RGB colour triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Fixed 8-entry colour table. Entry 0 is reserved for "no pattern".
pub const PALETTE: [Rgb; 8] = [
    Rgb::new(0, 0, 0),
    Rgb::new(255, 0, 0),
    Rgb::new(0, 255, 0),
    Rgb::new(0, 0, 255),
    Rgb::new(255, 255, 0),
    Rgb::new(255, 0, 255),
    Rgb::new(0, 255, 255),
    Rgb::new(255, 255, 255),
];

/// Colour of an unmarked live cell.
pub const FOREGROUND: Rgb = Rgb::new(255, 255, 255);

/// Colour of an unmarked dead cell.
pub const BACKGROUND: Rgb = Rgb::new(0, 0, 0);

/// RLE sources of the built-in library, in id order.
const BUILTIN_SOURCES: [&str; 6] = [
    include_str!("patterns/beehive.rle"),
    include_str!("patterns/glider.rle"),
    include_str!("patterns/block.rle"),
    include_str!("patterns/blinker.rle"),
    include_str!("patterns/r_pentomino.rle"),
    include_str!("patterns/glider_loop.rle"),
];

/// A pattern together with its overlay id and display colour.
#[derive(Debug, Clone)]
pub struct LibraryEntry {
    pub id: PatternId,
    pub pattern: Pattern,
    pub color: Rgb,
}

/// Ordered, read-only collection of patterns the scanner looks for.
///
/// Ids follow declaration order and never change, so an overlay produced
/// against a library can always be decoded with the same library.
#[derive(Debug, Clone, Default)]
pub struct PatternLibrary {
    entries: Vec<LibraryEntry>,
}

impl PatternLibrary {
    /// Decode the built-in patterns: Beehive, Glider, Block, Blinker,
    /// R-pentomino and Glider loop (ids 1 through 6).
    pub fn builtin() -> Result<Self, FormatError> {
        let patterns = BUILTIN_SOURCES
            .iter()
            .map(|source| Pattern::decode(source))
            .collect::<Result<Vec<_>, _>>()?;
        let library = Self::from_patterns(patterns);
        log::debug!("Built pattern library with {} entries", library.len());
        Ok(library)
    }

    /// Build a library from already decoded patterns, assigning ids in order.
    ///
    /// # Panics
    /// Panics if more than `PatternId::MAX` patterns are given.
    pub fn from_patterns(patterns: Vec<Pattern>) -> Self {
        assert!(
            patterns.len() <= PatternId::MAX as usize,
            "pattern library is limited to {} entries",
            PatternId::MAX
        );

        let entries = patterns
            .into_iter()
            .enumerate()
            .map(|(index, pattern)| {
                let id = (index + 1) as PatternId;
                LibraryEntry {
                    id,
                    pattern,
                    color: color_for(id),
                }
            })
            .collect();

        Self { entries }
    }

    pub fn entries(&self) -> &[LibraryEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LibraryEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up an entry by overlay id.
    pub fn get(&self, id: PatternId) -> Option<&LibraryEntry> {
        if id == UNMARKED {
            return None;
        }
        self.entries.get(id as usize - 1)
    }

    /// Look up an entry by pattern name (case-insensitive).
    pub fn find(&self, name: &str) -> Option<&LibraryEntry> {
        self.entries
            .iter()
            .find(|entry| entry.pattern.name().eq_ignore_ascii_case(name))
    }

    /// Display colour for a cell given its liveness and overlay mark.
    ///
    /// Marked cells take their pattern's colour; unmarked cells are drawn
    /// by liveness alone.
    pub fn cell_color(&self, alive: bool, mark: Option<PatternId>) -> Rgb {
        match mark.and_then(|id| self.get(id)) {
            Some(entry) => entry.color,
            None if alive => FOREGROUND,
            None => BACKGROUND,
        }
    }
}

impl<'a> IntoIterator for &'a PatternLibrary {
    type Item = &'a LibraryEntry;
    type IntoIter = std::slice::Iter<'a, LibraryEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Palette colour for a pattern id, cycling through entries 1..=7.
fn color_for(id: PatternId) -> Rgb {
    PALETTE[1 + (id as usize - 1) % (PALETTE.len() - 1)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_order_and_ids() {
        let library = PatternLibrary::builtin().unwrap();
        let names: Vec<_> = library.iter().map(|e| e.pattern.name()).collect();

        assert_eq!(
            names,
            [
                "Beehive",
                "Glider",
                "Block",
                "Blinker",
                "R-pentomino",
                "Glider loop"
            ]
        );
        for (index, entry) in library.iter().enumerate() {
            assert_eq!(entry.id as usize, index + 1);
            assert_eq!(entry.color, PALETTE[index + 1]);
        }
    }

    #[test]
    fn test_builtin_populations() {
        let library = PatternLibrary::builtin().unwrap();
        let populations: Vec<_> = library.iter().map(|e| e.pattern.population()).collect();

        assert_eq!(populations, [6, 5, 4, 3, 5, 456]);

        let glider_loop = library.find("glider loop").unwrap();
        assert_eq!(glider_loop.pattern.width(), 73);
        assert_eq!(glider_loop.pattern.height(), 150);
    }

    #[test]
    fn test_lookup_by_id() {
        let library = PatternLibrary::builtin().unwrap();

        assert!(library.get(UNMARKED).is_none());
        assert_eq!(library.get(3).unwrap().pattern.name(), "Block");
        assert!(library.get(7).is_none());
    }

    #[test]
    fn test_colors_cycle_past_palette() {
        let block = Pattern::decode("x = 2, y = 2\n2o$2o!").unwrap();
        let library = PatternLibrary::from_patterns(vec![block; 9]);

        assert_eq!(library.get(7).unwrap().color, PALETTE[7]);
        assert_eq!(library.get(8).unwrap().color, PALETTE[1]);
        assert!(library.iter().all(|e| e.color != PALETTE[0]));
    }

    #[test]
    fn test_cell_color() {
        let library = PatternLibrary::builtin().unwrap();

        assert_eq!(library.cell_color(true, None), FOREGROUND);
        assert_eq!(library.cell_color(false, None), BACKGROUND);
        assert_eq!(library.cell_color(true, Some(2)), PALETTE[2]);
        assert_eq!(library.cell_color(false, Some(1)), PALETTE[1]);
        assert_eq!(library.cell_color(true, Some(42)), FOREGROUND);
    }
}
