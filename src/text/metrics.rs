/// Font capability consumed by the wrapper, the layout engine and the
/// renderer.
///
/// All queries take the pixel size explicitly so one loaded face can serve
/// every size candidate of a block. Implementations must be safe to share
/// between frame workers.
pub trait FontFace: Send + Sync + std::fmt::Debug {
    /// Advance width of `text` at `px`, kerning included.
    fn measure_width(&self, text: &str, px: f32) -> f32;

    /// Height of the glyph box of `"Ag"`: ascent plus the descender depth.
    fn line_height(&self, px: f32) -> f32;

    /// Distance from the top of the line box to the baseline.
    fn ascent(&self, px: f32) -> f32;

    /// Rasterizes `text` at `px`.
    ///
    /// `plot` receives `(x, y, coverage)` with coordinates relative to the
    /// top-left corner of the line box.
    fn rasterize(&self, text: &str, px: f32, plot: &mut dyn FnMut(i32, i32, u8));
}

/// Deterministic face used by unit tests: every char advances `px / 2`,
/// glyphs are solid boxes from the top of the line to `0.8 * px`.
#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;

    use super::FontFace;

    #[derive(Debug, Default)]
    pub struct BlockFace;

    impl BlockFace {
        pub fn shared() -> Arc<dyn FontFace> {
            Arc::new(BlockFace)
        }

        pub fn advance(px: f32) -> f32 {
            px / 2.0
        }
    }

    impl FontFace for BlockFace {
        fn measure_width(&self, text: &str, px: f32) -> f32 {
            text.chars().count() as f32 * Self::advance(px)
        }

        fn line_height(&self, px: f32) -> f32 {
            px
        }

        fn ascent(&self, px: f32) -> f32 {
            px * 0.8
        }

        fn rasterize(&self, text: &str, px: f32, plot: &mut dyn FnMut(i32, i32, u8)) {
            let advance = Self::advance(px);
            for (i, ch) in text.chars().enumerate() {
                if ch.is_whitespace() {
                    continue;
                }
                let x0 = (i as f32 * advance).floor() as i32;
                let x1 = ((i as f32 + 1.0) * advance).floor() as i32 - 1;
                for y in 0..(px * 0.8) as i32 {
                    for x in x0..x1 {
                        plot(x, y, 255);
                    }
                }
            }
        }
    }
}
