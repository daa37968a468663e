use std::{collections::HashMap, sync::Arc};

use parking_lot::Mutex;

use crate::{glyph_id::GlyphId, text::FontFace};

struct CachedGlyph {
    metrics: fontdue::Metrics,
    coverage: Vec<u8>,
}

/// [`FontFace`] backed by a parsed `fontdue` font.
///
/// Glyph coverage is cached per `(glyph, size)` so the text layer of a long
/// card only rasterizes each distinct glyph once. The cache sits behind a
/// mutex; everything else is read-only, so a face can be shared by all
/// frame workers.
pub struct FontdueFace {
    font: Arc<fontdue::Font>,
    glyphs: Mutex<HashMap<GlyphId, Arc<CachedGlyph>, fxhash::FxBuildHasher>>,
}

impl FontdueFace {
    pub fn new(font: Arc<fontdue::Font>) -> Self {
        Self {
            font,
            glyphs: Mutex::new(HashMap::with_hasher(fxhash::FxBuildHasher::default())),
        }
    }

    /// Parses a face from raw font bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self, &'static str> {
        let font = fontdue::Font::from_bytes(data, fontdue::FontSettings::default())?;
        Ok(Self::new(Arc::new(font)))
    }

    /// Number of distinct glyph rasters currently cached.
    pub fn cached_glyphs(&self) -> usize {
        self.glyphs.lock().len()
    }

    fn glyph(&self, glyph_index: u16, px: f32) -> Arc<CachedGlyph> {
        let key = GlyphId::new(glyph_index, px);
        if let Some(cached) = self.glyphs.lock().get(&key) {
            return Arc::clone(cached);
        }

        // rasterize outside the lock; a racing worker at worst repeats the work
        let (metrics, coverage) = self.font.rasterize_indexed(glyph_index, key.font_size());
        let cached = Arc::new(CachedGlyph { metrics, coverage });
        self.glyphs.lock().insert(key, Arc::clone(&cached));
        cached
    }

    /// Top and bottom of the `"Ag"` box, in baseline-relative pixels (Y up).
    fn ag_extent(&self, px: f32) -> (f32, f32) {
        let (top, bottom) = ['A', 'g']
            .into_iter()
            .map(|ch| self.font.metrics(ch, px))
            .fold((0, 0), |(top, bottom), m| {
                (top.max(m.ymin + m.height as i32), bottom.min(m.ymin))
            });
        (top as f32, bottom as f32)
    }

    /// Walks `text` and yields `(glyph_index, pen_x)` with kerning applied.
    fn pen_positions(&self, text: &str, px: f32) -> (Vec<(u16, f32)>, f32) {
        let mut out = Vec::with_capacity(text.len());
        let mut pen = 0.0;
        let mut prev: Option<u16> = None;

        for ch in text.chars() {
            let idx = self.font.lookup_glyph_index(ch);
            if let Some(prev) = prev {
                pen += self
                    .font
                    .horizontal_kern_indexed(prev, idx, px)
                    .unwrap_or(0.0);
            }
            out.push((idx, pen));
            pen += self.font.metrics_indexed(idx, px).advance_width;
            prev = Some(idx);
        }

        (out, pen)
    }
}

impl FontFace for FontdueFace {
    fn measure_width(&self, text: &str, px: f32) -> f32 {
        self.pen_positions(text, px).1
    }

    fn line_height(&self, px: f32) -> f32 {
        let (top, bottom) = self.ag_extent(px);
        top - bottom
    }

    fn ascent(&self, px: f32) -> f32 {
        self.ag_extent(px).0
    }

    fn rasterize(&self, text: &str, px: f32, plot: &mut dyn FnMut(i32, i32, u8)) {
        let ascent = self.ascent(px);
        let (pens, _) = self.pen_positions(text, px);

        for (glyph_index, pen_x) in pens {
            let glyph = self.glyph(glyph_index, px);
            let metrics = &glyph.metrics;
            if metrics.width == 0 || metrics.height == 0 {
                continue;
            }

            // fontdue reports ymin relative to the baseline with Y up
            let origin_x = (pen_x + metrics.xmin as f32).round() as i32;
            let origin_y = (ascent - (metrics.ymin as f32 + metrics.height as f32)).round() as i32;

            for row in 0..metrics.height {
                for col in 0..metrics.width {
                    let coverage = glyph.coverage[row * metrics.width + col];
                    if coverage == 0 {
                        continue;
                    }
                    plot(origin_x + col as i32, origin_y + row as i32, coverage);
                }
            }
        }
    }
}

impl std::fmt::Debug for FontdueFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontdueFace")
            .field("glyphs", &self.font.glyph_count())
            .field("cached", &self.cached_glyphs())
            .finish()
    }
}
