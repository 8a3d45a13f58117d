use std::fmt;
use std::path::Path;

use fontdue::layout::{CoordinateSystem, Layout, LayoutSettings, TextStyle};

use crate::coords::Vec2;

/// Line height multiplier used when a font is unknown or reports no metrics.
const FALLBACK_LINE_FACTOR: f32 = 1.2;

/// Error returned by [`FontSystem::load_font`].
#[derive(Debug, Clone)]
pub struct FontLoadError(pub String);

impl fmt::Display for FontLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "font load error: {}", self.0)
    }
}

impl std::error::Error for FontLoadError {}

/// Opaque handle to a font loaded into a [`FontSystem`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct FontId(pub(crate) usize);

/// Owns a collection of loaded fonts.
///
/// Fonts are immutable after loading. The system is owned by the application
/// and lent to the text renderer at present time so new glyphs can be
/// rasterized on demand.
pub struct FontSystem {
    fonts: Vec<fontdue::Font>,
}

impl FontSystem {
    pub fn new() -> Self {
        Self { fonts: Vec::new() }
    }

    /// Parses and stores a TrueType or OpenType font from raw bytes.
    pub fn load_font(&mut self, bytes: &[u8]) -> Result<FontId, FontLoadError> {
        let font = fontdue::Font::from_bytes(bytes, fontdue::FontSettings::default())
            .map_err(|e| FontLoadError(e.to_string()))?;
        let id = FontId(self.fonts.len());
        self.fonts.push(font);
        Ok(id)
    }

    /// Loads the first readable, parseable font among `candidates`.
    ///
    /// Returns `None` when no candidate works; each failure is logged at debug.
    pub fn load_first<P: AsRef<Path>>(&mut self, candidates: &[P]) -> Option<FontId> {
        candidates.iter().find_map(|path| {
            let path = path.as_ref();
            let bytes = std::fs::read(path)
                .map_err(|e| log::debug!("font {}: {e}", path.display()))
                .ok()?;
            self.load_font(&bytes)
                .map_err(|e| log::debug!("font {}: {e}", path.display()))
                .ok()
        })
    }

    pub(crate) fn get(&self, id: FontId) -> Option<&fontdue::Font> {
        self.fonts.get(id.0)
    }

    /// Height of one line of text at `size`, in logical pixels.
    pub fn line_height(&self, id: FontId, size: f32) -> f32 {
        self.get(id)
            .and_then(|font| font.horizontal_line_metrics(size))
            .map(|m| m.new_line_size)
            .filter(|h| *h > 0.0)
            .unwrap_or(size * FALLBACK_LINE_FACTOR)
    }

    /// Computes the bounding box of a single laid-out line.
    ///
    /// Returns `(width, height)` in logical pixels. The height is at least the
    /// font's line height so stacked lines do not overlap.
    #[must_use]
    pub fn measure_text(&self, text: &str, id: FontId, size: f32) -> Vec2 {
        let line = self.line_height(id, size);
        let Some(font) = self.get(id) else {
            return Vec2::new(0.0, line);
        };

        let mut layout: Layout<()> = Layout::new(CoordinateSystem::PositiveYDown);
        layout.reset(&LayoutSettings::default());
        layout.append(&[font], &TextStyle::new(text, size, 0));

        let glyphs = layout.glyphs();
        let w = glyphs
            .iter()
            .map(|g| {
                let m = font.metrics_indexed(g.key.glyph_index, size);
                (g.x - m.xmin as f32 + m.advance_width).max(0.0)
            })
            .fold(0.0f32, f32::max);
        let h = glyphs
            .iter()
            .map(|g| g.y + g.height as f32)
            .fold(line, f32::max);
        Vec2::new(w, h)
    }
}

impl Default for FontSystem {
    fn default() -> Self {
        Self::new()
    }
}
