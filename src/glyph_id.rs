pub const SUB_PIXEL_QUANTIZE: f32 = 256f32;

/// Key of a rasterized glyph inside a single face's coverage cache.
///
/// The pixel size is quantized so that sizes produced by repeated shrinking
/// (`60.0 * 0.94`, ...) hash to the same entry on every frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GlyphId {
    glyph_index: u16,
    font_size: u32, // font size * SUB_PIXEL_QUANTIZE as u32
}

impl GlyphId {
    pub fn new(glyph_index: u16, font_size: f32) -> Self {
        Self {
            glyph_index,
            font_size: (font_size.max(0.0) * SUB_PIXEL_QUANTIZE).round() as u32,
        }
    }

    pub fn glyph_index(&self) -> u16 {
        self.glyph_index
    }

    pub fn font_size(&self) -> f32 {
        self.font_size as f32 / SUB_PIXEL_QUANTIZE
    }
}
