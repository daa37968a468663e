//! Frame rendering: text layer, wipe reveal and highlight boxes.

pub mod highlight;
pub mod raster;
pub mod reveal;

pub use highlight::{HighlightBox, HighlightSpec, highlight_boxes};
pub use raster::{RasterFrame, TextLayer};
pub use reveal::{RevealAnimator, render_frame};
