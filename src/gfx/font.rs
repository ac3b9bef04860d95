//! # Font System Interface
//!
//! Labels never rasterise text themselves. They acquire a [`FontHandle`]
//! from a [`FontSystem`], ask it to measure text and to generate one quad per
//! visible glyph into a [`GlyphGeometry`], then upload that geometry into the
//! shared render buffers.
//!
//! [`FixedWidthFont`] is a monospace implementation with no texture data
//! behind it, used by tests and by hosts that run without a GPU.

use std::collections::{BTreeSet, HashMap};

use log::{debug, warn};

use crate::gfx::renderer::TextureHandle;
use crate::gfx::vertex::Vertex2D;

/// Which family a font belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FontKind {
    /// Pre-baked atlas, fixed glyph set.
    #[default]
    Bitmap,
    /// Rasterised on demand at a given size; the atlas grows as text needs it.
    System,
}

/// Handle to an acquired font (or a sized variant of a system font).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FontHandle {
    pub kind: FontKind,
    pub id: u32,
}

/// Output of [`FontSystem::generate_geometry`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlyphGeometry {
    pub vertices: Vec<Vertex2D>,
    pub indices: Vec<u32>,
    pub quad_count: u32,
}

impl GlyphGeometry {
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
        self.quad_count = 0;
    }
}

/// Font operations consumed by labels and textboxes.
pub trait FontSystem {
    fn acquire_bitmap(&mut self, name: &str) -> Option<FontHandle>;
    fn acquire_system(&mut self, name: &str, size: u16) -> Option<FontHandle>;
    fn release(&mut self, font: FontHandle);
    /// Makes sure the atlas of a system font holds every glyph in `text`.
    fn verify_atlas(&mut self, font: FontHandle, text: &str) -> bool;
    /// Width and height of `text` in pixels.
    fn measure(&self, font: FontHandle, text: &str) -> (f32, f32);
    fn line_height(&self, font: FontHandle) -> f32;
    /// Fills `out` with one quad per visible glyph of `text`.
    fn generate_geometry(&mut self, font: FontHandle, text: &str, out: &mut GlyphGeometry) -> bool;
    fn atlas(&self, font: FontHandle) -> Option<TextureHandle>;
}

#[derive(Debug)]
struct LoadedFont {
    size: f32,
    references: u32,
    glyphs: BTreeSet<char>,
}

/// Monospace font with `advance = size * 0.5` and `line height = size`.
#[derive(Debug, Default)]
pub struct FixedWidthFont {
    fonts: HashMap<u32, LoadedFont>,
    ids: HashMap<(FontKind, String, u16), u32>,
    next_id: u32,
    /// Bitmap font size used when a name is acquired without one.
    bitmap_size: u16,
    refuse_atlas: bool,
}

impl FixedWidthFont {
    pub fn new(bitmap_size: u16) -> Self {
        Self {
            bitmap_size,
            ..Self::default()
        }
    }

    /// Makes every following `verify_atlas` call fail.
    pub fn set_refuse_atlas(&mut self, refuse: bool) {
        self.refuse_atlas = refuse;
    }

    /// Glyphs a system font has been asked to hold so far.
    pub fn atlas_glyphs(&self, font: FontHandle) -> Option<&BTreeSet<char>> {
        self.fonts.get(&font.id).map(|f| &f.glyphs)
    }

    pub fn reference_count(&self, font: FontHandle) -> u32 {
        self.fonts.get(&font.id).map_or(0, |f| f.references)
    }

    fn acquire(&mut self, kind: FontKind, name: &str, size: u16) -> Option<FontHandle> {
        if name.is_empty() || size == 0 {
            warn!("font acquisition failed for '{}' at size {}", name, size);
            return None;
        }
        let key = (kind, name.to_string(), size);
        let id = match self.ids.get(&key) {
            Some(id) => *id,
            None => {
                let id = self.next_id;
                self.next_id += 1;
                self.ids.insert(key, id);
                self.fonts.insert(
                    id,
                    LoadedFont {
                        size: f32::from(size),
                        references: 0,
                        glyphs: BTreeSet::new(),
                    },
                );
                debug!("font '{}' ({:?}, {}px) loaded as {}", name, kind, size, id);
                id
            }
        };
        if let Some(font) = self.fonts.get_mut(&id) {
            font.references += 1;
        }
        Some(FontHandle { kind, id })
    }

    fn size(&self, font: FontHandle) -> f32 {
        self.fonts.get(&font.id).map_or(0.0, |f| f.size)
    }
}

impl FontSystem for FixedWidthFont {
    fn acquire_bitmap(&mut self, name: &str) -> Option<FontHandle> {
        self.acquire(FontKind::Bitmap, name, self.bitmap_size)
    }

    fn acquire_system(&mut self, name: &str, size: u16) -> Option<FontHandle> {
        self.acquire(FontKind::System, name, size)
    }

    fn release(&mut self, font: FontHandle) {
        if let Some(loaded) = self.fonts.get_mut(&font.id) {
            loaded.references = loaded.references.saturating_sub(1);
        }
    }

    fn verify_atlas(&mut self, font: FontHandle, text: &str) -> bool {
        if self.refuse_atlas {
            return false;
        }
        let Some(loaded) = self.fonts.get_mut(&font.id) else {
            return false;
        };
        if font.kind == FontKind::System {
            loaded.glyphs.extend(text.chars().filter(|c| !c.is_whitespace()));
        }
        true
    }

    fn measure(&self, font: FontHandle, text: &str) -> (f32, f32) {
        let size = self.size(font);
        let mut widest = 0usize;
        let mut lines = 0usize;
        for line in text.split('\n') {
            widest = widest.max(line.chars().count());
            lines += 1;
        }
        (widest as f32 * size * 0.5, lines as f32 * size)
    }

    fn line_height(&self, font: FontHandle) -> f32 {
        self.size(font)
    }

    fn generate_geometry(&mut self, font: FontHandle, text: &str, out: &mut GlyphGeometry) -> bool {
        let size = self.size(font);
        if size <= 0.0 {
            return false;
        }
        out.clear();
        let advance = size * 0.5;
        let (mut x, mut y) = (0.0f32, 0.0f32);
        for c in text.chars() {
            if c == '\n' {
                x = 0.0;
                y += size;
                continue;
            }
            if !c.is_whitespace() {
                let base = out.vertices.len() as u32;
                out.vertices.extend_from_slice(&[
                    Vertex2D::new(x, y, 0.0, 0.0),
                    Vertex2D::new(x + advance, y, 1.0, 0.0),
                    Vertex2D::new(x + advance, y + size, 1.0, 1.0),
                    Vertex2D::new(x, y + size, 0.0, 1.0),
                ]);
                out.indices
                    .extend_from_slice(&[base, base + 2, base + 1, base, base + 3, base + 2]);
                out.quad_count += 1;
            }
            x += advance;
        }
        true
    }

    fn atlas(&self, font: FontHandle) -> Option<TextureHandle> {
        self.fonts.contains_key(&font.id).then_some(TextureHandle(font.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_font_shares_id() {
        let mut fonts = FixedWidthFont::new(16);
        let a = fonts.acquire_bitmap("mono").unwrap();
        let b = fonts.acquire_bitmap("mono").unwrap();
        assert_eq!(a, b);
        assert_eq!(fonts.reference_count(a), 2);
        fonts.release(a);
        assert_eq!(fonts.reference_count(a), 1);
        assert!(fonts.acquire_bitmap("").is_none());
    }

    #[test]
    fn test_measure_and_quads() {
        let mut fonts = FixedWidthFont::new(20);
        let font = fonts.acquire_bitmap("mono").unwrap();
        assert_eq!(fonts.measure(font, "abcd"), (40.0, 20.0));
        let mut geometry = GlyphGeometry::default();
        assert!(fonts.generate_geometry(font, "a b", &mut geometry));
        assert_eq!(geometry.quad_count, 2);
        assert_eq!(geometry.vertices.len(), 8);
        assert_eq!(geometry.indices.len(), 12);
        assert_eq!(geometry.vertices[4].position, [20.0, 0.0]);
    }

    #[test]
    fn test_system_atlas_records_glyphs() {
        let mut fonts = FixedWidthFont::new(16);
        let font = fonts.acquire_system("sans", 12).unwrap();
        assert!(fonts.verify_atlas(font, "hi yo"));
        assert_eq!(fonts.atlas_glyphs(font).unwrap().len(), 4);
        fonts.set_refuse_atlas(true);
        assert!(!fonts.verify_atlas(font, "z"));
    }
}
