use crate::animation::AnimationSpec;
use crate::renderer::highlight::{HighlightSpec, highlight_boxes};
use crate::renderer::raster::{RasterFrame, TextLayer};
use crate::text::Layout;

/// Renders the frames of one card.
///
/// The text layer is rasterized once in [`RevealAnimator::new`]; every frame
/// is the background, optional highlight boxes and the revealed part of that
/// layer. Rendering a frame only reads `self`, so frames can be produced in
/// any order and from any thread.
#[derive(Debug)]
pub struct RevealAnimator {
    layout: Layout,
    spec: AnimationSpec,
    highlight: Option<HighlightSpec>,
    background: [u8; 3],
    text: TextLayer,
}

impl RevealAnimator {
    pub fn new(
        layout: Layout,
        spec: AnimationSpec,
        highlight: Option<HighlightSpec>,
        background: [u8; 3],
    ) -> Self {
        let text = TextLayer::from_layout(&layout);
        if text.is_blank() && !layout.blocks.is_empty() {
            log::warn!("card text rasterized to an empty layer");
        }
        Self {
            layout,
            spec,
            highlight,
            background,
            text,
        }
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn spec(&self) -> &AnimationSpec {
        &self.spec
    }

    pub fn total_frames(&self) -> u32 {
        self.spec.total_frames
    }

    /// Width of the wipe at `frame_index`.
    ///
    /// Highlight cards show their text from the first frame, so the whole
    /// canvas is revealed.
    pub fn revealed_width(&self, frame_index: u32) -> u32 {
        let width = self.layout.canvas.width;
        if self.highlight.is_some() {
            return width;
        }
        let fraction = self.spec.visible_fraction(frame_index);
        ((width as f64 * fraction).floor() as u32).min(width)
    }

    pub fn render_frame(&self, frame_index: u32) -> RasterFrame {
        let canvas = self.layout.canvas;
        let mut frame = RasterFrame::filled(canvas.width, canvas.height, self.background);

        if let Some(highlight) = &self.highlight {
            let progress = highlight.progress(frame_index, &self.spec);
            for highlight_box in highlight_boxes(&self.layout, highlight, progress) {
                frame.fill_box(&highlight_box.rect, highlight_box.color);
            }
        }

        frame.composite(&self.text, self.revealed_width(frame_index));
        frame
    }
}

/// Renders a single frame of `layout` without keeping the text layer around.
pub fn render_frame(
    layout: &Layout,
    frame_index: u32,
    spec: &AnimationSpec,
    highlight: Option<&HighlightSpec>,
    background: [u8; 3],
) -> RasterFrame {
    RevealAnimator::new(layout.clone(), *spec, highlight.cloned(), background)
        .render_frame(frame_index)
}
