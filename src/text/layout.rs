use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{FontFace, TextSpan, WrapConfig, WrappedLine, wrap};
use crate::error::{NewsreelError, NewsreelResult};

/// Output canvas in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl CanvasSize {
    pub const PORTRAIT: Self = Self {
        width: 720,
        height: 1280,
    };
    pub const SQUARE: Self = Self {
        width: 1080,
        height: 1080,
    };

    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
/// What a block is for; only used for styling and diagnostics.
pub enum BlockRole {
    Label,
    Title,
    Subtitle,
    Body,
    Caption,
}

/// Input of one block: text, face and the point sizes it may use.
///
/// `size_candidates` is ordered largest first. Blocks that should never
/// shrink declare a single size.
#[derive(Clone, Debug)]
pub struct BlockSpec {
    pub role: BlockRole,
    pub spans: Vec<TextSpan>,
    pub face: Arc<dyn FontFace>,
    pub size_candidates: Vec<f32>,
    /// Extra gap between the lines of this block.
    pub line_spacing: f32,
    /// Gap above this block; `None` uses the layout's inter-block spacing.
    pub spacing_before: Option<f32>,
    /// Straight-alpha RGBA text colour.
    pub color: [u8; 4],
}

impl BlockSpec {
    pub fn new(
        role: BlockRole,
        spans: Vec<TextSpan>,
        face: Arc<dyn FontFace>,
        size_candidates: Vec<f32>,
    ) -> Self {
        Self {
            role,
            spans,
            face,
            size_candidates,
            line_spacing: 0.0,
            spacing_before: None,
            color: [255, 255, 255, 255],
        }
    }

    pub fn line_spacing(mut self, line_spacing: f32) -> Self {
        self.line_spacing = line_spacing;
        self
    }

    pub fn spacing_before(mut self, spacing: f32) -> Self {
        self.spacing_before = Some(spacing);
        self
    }

    pub fn color(mut self, color: [u8; 4]) -> Self {
        self.color = color;
        self
    }

    fn has_text(&self) -> bool {
        self.spans
            .iter()
            .any(|span| !span.content.trim().is_empty())
    }

    fn size_at(&self, step: usize) -> Option<f32> {
        let last = self.size_candidates.len().checked_sub(1)?;
        self.size_candidates.get(step.min(last)).copied()
    }
}

/// Placement parameters shared by every block of a layout.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutConfig {
    pub canvas: CanvasSize,
    pub start_y: f32,
    /// Band at the bottom of the canvas reserved for the overlay.
    pub footer_margin: f32,
    pub inter_block_spacing: f32,
    /// Cap of the upward correction applied after shrinking.
    pub max_upward_shift: f32,
    /// Added to the measured excess before the cap is applied.
    pub safety_pad: f32,
    pub wrap: WrapConfig,
}

impl LayoutConfig {
    pub fn footer_limit(&self) -> f32 {
        self.canvas.height as f32 - self.footer_margin
    }
}

/// A wrapped and positioned paragraph.
#[derive(Clone, Debug)]
pub struct TextBlock {
    pub role: BlockRole,
    pub lines: Vec<WrappedLine>,
    pub face: Arc<dyn FontFace>,
    pub point_size: f32,
    pub top_y: f32,
    pub left_x: f32,
    pub line_height: f32,
    pub line_spacing: f32,
    pub color: [u8; 4],
}

impl TextBlock {
    pub fn height(&self) -> f32 {
        let n = self.lines.len() as f32;
        if n == 0.0 {
            return 0.0;
        }
        n * self.line_height + (n - 1.0) * self.line_spacing
    }

    pub fn bottom_y(&self) -> f32 {
        self.top_y + self.height()
    }

    /// Top edge of the `index`-th line.
    pub fn line_top(&self, index: usize) -> f32 {
        self.top_y + index as f32 * (self.line_height + self.line_spacing)
    }
}

/// Fully resolved layout.
///
/// `overflow` is how far the content still reaches into the footer band
/// after the capped upward shift; zero when the layout fits.
#[derive(Clone, Debug)]
pub struct Layout {
    pub blocks: Vec<TextBlock>,
    pub canvas: CanvasSize,
    pub footer_limit: f32,
    pub bottom_y: f32,
    /// Upward shift applied to every block.
    pub shift: f32,
    pub overflow: f32,
    /// Index into the size candidates that produced this layout.
    pub size_step: usize,
}

impl Layout {
    pub fn fits(&self) -> bool {
        self.overflow <= 0.0
    }

    /// Number of characters inside emphasized words, in document order.
    pub fn emphasized_chars(&self) -> usize {
        self.blocks
            .iter()
            .flat_map(|block| &block.lines)
            .flat_map(|line| &line.words)
            .filter(|word| word.emphasized)
            .map(|word| word.text.chars().count())
            .sum()
    }

    pub fn has_emphasis(&self) -> bool {
        self.emphasized_chars() > 0
    }
}

/// Lays out `specs` top to bottom.
///
/// Every block is tried at its first size; while the stack reaches into the
/// footer band the whole stack is retried one candidate smaller (blocks with
/// a single candidate keep it). If the smallest sizes still overflow, all
/// blocks move up by `min(excess + safety_pad, max_upward_shift)` and any
/// remainder is reported in [`Layout::overflow`].
///
/// Blocks without text are skipped: no height, no spacing. Fails only when a
/// block with text has no size candidates.
pub fn layout(specs: &[BlockSpec], config: &LayoutConfig) -> NewsreelResult<Layout> {
    for (index, spec) in specs.iter().enumerate() {
        if spec.has_text() && spec.size_candidates.is_empty() {
            return Err(NewsreelError::invalid_argument(format!(
                "block {index} ({:?}) has text but no size candidates",
                spec.role
            )));
        }
    }

    let limit = config.footer_limit();
    let last_step = specs
        .iter()
        .filter(|spec| spec.has_text())
        .map(|spec| spec.size_candidates.len().saturating_sub(1))
        .max()
        .unwrap_or(0);

    let mut step = 0;
    let (mut blocks, bottom_y) = loop {
        let (blocks, bottom_y) = stack(specs, step, config);
        if bottom_y <= limit || step >= last_step {
            break (blocks, bottom_y);
        }
        log::debug!(
            "layout reaches {:.1}px past the footer at size step {}; shrinking",
            bottom_y - limit,
            step
        );
        step += 1;
    };

    let mut shift = 0.0;
    let mut overflow = 0.0;
    if bottom_y > limit {
        let excess = bottom_y - limit;
        shift = (excess + config.safety_pad).min(config.max_upward_shift).max(0.0);
        for block in &mut blocks {
            block.top_y -= shift;
        }
        overflow = (excess - shift).max(0.0);
        if overflow > 0.0 {
            log::warn!(
                "text still overlaps the footer by {:.1}px after the maximum shift of {:.1}px",
                overflow,
                config.max_upward_shift
            );
        }
    }

    Ok(Layout {
        blocks,
        canvas: config.canvas,
        footer_limit: limit,
        bottom_y: bottom_y - shift,
        shift,
        overflow,
        size_step: step,
    })
}

/// Wraps and stacks every block at size step `step`. Returns the blocks and
/// the bottom edge of the last one.
fn stack(specs: &[BlockSpec], step: usize, config: &LayoutConfig) -> (Vec<TextBlock>, f32) {
    let mut blocks: Vec<TextBlock> = Vec::with_capacity(specs.len());

    for spec in specs {
        if !spec.has_text() {
            continue;
        }
        let Some(px) = spec.size_at(step) else {
            continue;
        };
        let lines = wrap(&spec.spans, spec.face.as_ref(), px, &config.wrap);
        if lines.is_empty() {
            continue;
        }

        let top_y = match blocks.last() {
            None => config.start_y,
            Some(previous) => {
                previous.bottom_y() + spec.spacing_before.unwrap_or(config.inter_block_spacing)
            }
        };

        blocks.push(TextBlock {
            role: spec.role,
            lines,
            face: Arc::clone(&spec.face),
            point_size: px,
            top_y,
            left_x: config.wrap.margin_left,
            line_height: spec.face.line_height(px),
            line_spacing: spec.line_spacing,
            color: spec.color,
        });
    }

    let bottom_y = blocks
        .last()
        .map(TextBlock::bottom_y)
        .unwrap_or(config.start_y);
    (blocks, bottom_y)
}

/// Size list produced by repeatedly scaling `base` by `factor` and truncating
/// to whole points, never going below `floor`.
pub fn shrink_candidates(base: f32, factor: f32, steps: usize, floor: Option<f32>) -> Vec<f32> {
    let floor = floor.unwrap_or(1.0);
    let mut sizes = vec![base];
    let mut current = base;
    for _ in 0..steps {
        let next = (current * factor).floor().max(floor);
        if next >= current {
            break;
        }
        sizes.push(next);
        current = next;
    }
    sizes
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::{metrics::testing::BlockFace, parse_markup};

    fn portrait() -> LayoutConfig {
        LayoutConfig {
            canvas: CanvasSize::PORTRAIT,
            start_y: 768.0,
            footer_margin: 170.0,
            inter_block_spacing: 20.0,
            max_upward_shift: 220.0,
            safety_pad: 10.0,
            wrap: WrapConfig::new(720.0, 70.0, 90.0),
        }
    }

    /// 400x400 canvas, footer limit 300, no margins.
    fn small(start_y: f32, max_upward_shift: f32) -> LayoutConfig {
        LayoutConfig {
            canvas: CanvasSize::new(400, 400),
            start_y,
            footer_margin: 100.0,
            inter_block_spacing: 0.0,
            max_upward_shift,
            safety_pad: 10.0,
            wrap: WrapConfig::new(400.0, 0.0, 0.0),
        }
    }

    fn block(role: BlockRole, text: &str, sizes: &[f32]) -> BlockSpec {
        BlockSpec::new(role, parse_markup(text), BlockFace::shared(), sizes.to_vec())
    }

    const LONG_TITLE: &str = "aaaa bbbb cccc dddd eeee ffff gggg";

    #[test]
    fn blocks_stack_with_their_own_spacing() {
        let specs = [
            block(BlockRole::Label, "TERKINI", &[28.0]),
            block(BlockRole::Title, "Harga Emas Naik", &[60.0, 56.0]).spacing_before(12.0),
            block(BlockRole::Subtitle, "Analis", &[28.0]).spacing_before(16.0),
        ];
        let layout = layout(&specs, &portrait()).unwrap();

        let tops: Vec<f32> = layout.blocks.iter().map(|b| b.top_y).collect();
        assert_eq!(tops, vec![768.0, 808.0, 884.0]);
        assert_eq!(layout.bottom_y, 912.0);
        assert_eq!(layout.size_step, 0);
        assert_eq!(layout.shift, 0.0);
        assert!(layout.fits());
    }

    #[test]
    fn empty_block_is_skipped_entirely() {
        let specs = [
            block(BlockRole::Title, "Harga Emas", &[60.0]),
            block(BlockRole::Subtitle, "  ", &[]),
            block(BlockRole::Body, "isi", &[34.0]),
        ];
        let layout = layout(&specs, &portrait()).unwrap();
        assert_eq!(layout.blocks.len(), 2);
        assert_eq!(layout.blocks[1].role, BlockRole::Body);
        assert_eq!(layout.blocks[1].top_y, 768.0 + 60.0 + 20.0);
    }

    #[test]
    fn text_without_sizes_is_invalid() {
        let specs = [block(BlockRole::Title, "judul", &[])];
        let err = layout(&specs, &portrait()).unwrap_err();
        assert!(matches!(err, NewsreelError::InvalidArgument(_)));
    }

    #[test]
    fn empty_layout_is_valid() {
        let layout = layout(&[], &portrait()).unwrap();
        assert!(layout.blocks.is_empty());
        assert!(layout.fits());
        assert_eq!(layout.emphasized_chars(), 0);
    }

    #[test]
    fn overflow_shrinks_before_shifting() {
        // 4 lines at 80px reach 420 > 300; 2 lines at 40px reach 180
        let specs = [block(BlockRole::Title, LONG_TITLE, &[80.0, 40.0])];
        let layout = layout(&specs, &small(100.0, 220.0)).unwrap();
        assert_eq!(layout.size_step, 1);
        assert_eq!(layout.blocks[0].point_size, 40.0);
        assert_eq!(layout.blocks[0].lines.len(), 2);
        assert_eq!(layout.shift, 0.0);
        assert_eq!(layout.blocks[0].top_y, 100.0);
    }

    #[test]
    fn shift_includes_the_safety_pad() {
        let specs = [block(BlockRole::Body, LONG_TITLE, &[80.0])];
        let layout = layout(&specs, &small(100.0, 220.0)).unwrap();
        // excess 120, shift 120 + 10
        assert_eq!(layout.shift, 130.0);
        assert_eq!(layout.blocks[0].top_y, -30.0);
        assert_eq!(layout.bottom_y, 290.0);
        assert!(layout.fits());
    }

    #[test]
    fn residual_overflow_is_excess_minus_cap() {
        let specs = [block(BlockRole::Body, LONG_TITLE, &[80.0])];
        let layout = layout(&specs, &small(200.0, 50.0)).unwrap();
        let excess = 520.0 - 300.0;
        assert_eq!(layout.shift, 50.0);
        assert_eq!(layout.overflow, excess - 50.0);
        assert!(!layout.fits());
        assert_eq!(layout.bottom_y, 470.0);
    }

    #[test]
    fn layout_is_deterministic() {
        let specs = [
            block(BlockRole::Title, LONG_TITLE, &[80.0, 40.0]),
            block(BlockRole::Body, "[[satu]] dua tiga empat lima", &[40.0]),
        ];
        let config = small(150.0, 120.0);
        let a = layout(&specs, &config).unwrap();
        let b = layout(&specs, &config).unwrap();
        let bits = |l: &Layout| l.blocks.iter().map(|b| b.top_y.to_bits()).collect::<Vec<_>>();
        assert_eq!(bits(&a), bits(&b));
        assert_eq!(a.emphasized_chars(), 4);
    }

    #[test]
    fn larger_footer_never_moves_blocks_down() {
        let specs = [
            block(BlockRole::Title, LONG_TITLE, &[80.0, 40.0]),
            block(BlockRole::Body, "satu dua tiga", &[40.0]),
        ];
        let mut previous: Option<Vec<f32>> = None;
        for margin in [0.0, 50.0, 100.0, 150.0, 200.0, 250.0] {
            let mut config = small(100.0, 120.0);
            config.footer_margin = margin;
            let layout = layout(&specs, &config).unwrap();
            let tops: Vec<f32> = layout.blocks.iter().map(|b| b.top_y).collect();
            assert!(tops[0] <= 100.0);
            if let Some(previous) = &previous {
                for (now, before) in tops.iter().zip(previous) {
                    assert!(now <= before, "margin {margin}: {now} > {before}");
                }
            }
            previous = Some(tops);
        }
    }

    #[test]
    fn shrink_candidates_truncate_and_respect_floor() {
        assert_eq!(shrink_candidates(60.0, 0.94, 1, None), vec![60.0, 56.0]);
        assert_eq!(shrink_candidates(34.0, 0.94, 3, Some(30.0)), vec![34.0, 31.0, 30.0]);
        assert_eq!(shrink_candidates(30.0, 0.94, 3, Some(30.0)), vec![30.0]);
    }
}
