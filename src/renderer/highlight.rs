use std::collections::BTreeMap;

use euclid::default::{Box2D, Point2D};
use serde::{Deserialize, Serialize};

use crate::animation::AnimationSpec;
use crate::text::Layout;

/// Highlight boxes drawn behind emphasized words.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightSpec {
    /// First frame of the highlight timeline; defaults to the frame the wipe
    /// settles on.
    pub start_frame: Option<u32>,
    /// Length of the highlight timeline; defaults to the reveal length.
    pub frames: Option<u32>,
    /// Padding around every word box, in pixels.
    pub padding: f32,
    pub default_color: [u8; 4],
    /// Named colours for `[[name:text]]` spans.
    pub styles: BTreeMap<String, [u8; 4]>,
}

impl Default for HighlightSpec {
    fn default() -> Self {
        Self {
            start_frame: None,
            frames: None,
            padding: 3.0,
            default_color: [40, 110, 255, 204],
            styles: BTreeMap::new(),
        }
    }
}

impl HighlightSpec {
    /// Resolves a style name; unknown names use the default colour.
    pub fn color_for(&self, style: Option<&str>) -> [u8; 4] {
        style
            .and_then(|name| self.styles.get(name))
            .copied()
            .unwrap_or(self.default_color)
    }

    /// Linear highlight progress in `[0, 1]` at `frame_index`.
    pub fn progress(&self, frame_index: u32, spec: &AnimationSpec) -> f64 {
        let start = self.start_frame.unwrap_or_else(|| spec.settled_at());
        let frames = self.frames.unwrap_or(spec.reveal_frames);
        if frame_index < start {
            return 0.0;
        }
        if frames == 0 {
            return 1.0;
        }
        ((frame_index - start) as f64 / frames as f64).min(1.0)
    }
}

/// Box behind (part of) one emphasized word.
#[derive(Clone, Debug, PartialEq)]
pub struct HighlightBox {
    pub rect: Box2D<f32>,
    pub color: [u8; 4],
    /// Characters of the word covered by this box.
    pub chars: usize,
}

/// Distributes `floor(total * progress)` characters over the emphasized
/// words of `layout` in reading order and returns one box per touched word.
pub fn highlight_boxes(layout: &Layout, highlight: &HighlightSpec, progress: f64) -> Vec<HighlightBox> {
    let total = layout.emphasized_chars();
    let mut budget = (total as f64 * progress.clamp(0.0, 1.0)).floor() as usize;
    let pad = highlight.padding;
    let mut boxes = Vec::new();

    for block in &layout.blocks {
        for (index, line) in block.lines.iter().enumerate() {
            if budget == 0 {
                return boxes;
            }
            if !line.words.iter().any(|word| word.emphasized) {
                continue;
            }

            let offsets = line.word_offsets(block.face.as_ref(), block.point_size);
            let top = block.line_top(index);
            for (word, offset) in line.words.iter().zip(offsets) {
                if !word.emphasized || budget == 0 {
                    continue;
                }
                let len = word.text.chars().count();
                let take = budget.min(len);
                budget -= take;

                let width = if take == len {
                    block.face.measure_width(&word.text, block.point_size)
                } else {
                    let prefix: String = word.text.chars().take(take).collect();
                    block.face.measure_width(&prefix, block.point_size)
                };
                let x = block.left_x + offset;
                boxes.push(HighlightBox {
                    rect: Box2D::new(
                        Point2D::new(x - pad, top - pad),
                        Point2D::new(x + width + pad, top + block.line_height + pad),
                    ),
                    color: highlight.color_for(word.style.as_deref()),
                    chars: take,
                });
            }
        }
    }

    boxes
}
