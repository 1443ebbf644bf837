use anyhow::Result;

use crate::color::{Color, WHITE};

/// One palette slot: a color plus its display label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorEntry {
    pub color: Color,
    pub name: String,
}

impl ColorEntry {
    pub fn new(color: Color, name: impl Into<String>) -> Self {
        Self {
            color,
            name: name.into(),
        }
    }

    /// Build an entry from a hex string, validating the color.
    pub fn from_hex(hex: &str, name: impl Into<String>) -> Result<Self> {
        Ok(Self::new(Color::from_hex(hex)?, name))
    }
}

/// An ordered color scheme. Insertion order is left-to-right rendering
/// order; duplicate colors and names are allowed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Palette {
    entries: Vec<ColorEntry>,
}

/// A palette with fewer entries than this cannot lose another one.
/// Matches the original UI, which disables removal at two colors.
pub const MIN_ENTRIES: usize = 2;

impl Palette {
    pub fn new(entries: Vec<ColorEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[ColorEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ColorEntry> {
        self.entries.get(index)
    }

    /// Append a plain white slot, the starting point for manual edits.
    pub fn add_default(&mut self) {
        self.entries.push(ColorEntry::new(WHITE, "white"));
    }

    /// Remove the entry at `index`. Refused when the palette is already at
    /// the minimum size or the index is out of range.
    pub fn remove(&mut self, index: usize) -> bool {
        if self.entries.len() <= MIN_ENTRIES || index >= self.entries.len() {
            return false;
        }
        self.entries.remove(index);
        true
    }

    pub fn set_color(&mut self, index: usize, color: Color) -> bool {
        match self.entries.get_mut(index) {
            Some(entry) => {
                entry.color = color;
                true
            }
            None => false,
        }
    }

    pub fn rename(&mut self, index: usize, name: impl Into<String>) -> bool {
        match self.entries.get_mut(index) {
            Some(entry) => {
                entry.name = name.into();
                true
            }
            None => false,
        }
    }

    /// Describe the palette as `#rrggbb (name)` pairs, comma separated.
    /// This is both the edit-prompt embedding and a form the parser can
    /// read back.
    pub fn describe(&self) -> String {
        self.entries
            .iter()
            .map(|e| format!("{} ({})", e.color.to_hex(), e.name))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Text overlay flags for the rendered image. Independent, not mutually
/// exclusive; with both off only the color bands are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayOptions {
    pub show_hex: bool,
    pub show_name: bool,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            show_hex: true,
            show_name: true,
        }
    }
}

impl DisplayOptions {
    pub fn any_text(self) -> bool {
        self.show_hex || self.show_name
    }
}
