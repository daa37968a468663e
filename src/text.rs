/// Greedy placement of wrapped blocks with shrink and shift correction.
pub mod layout;
/// The font capability the text pipeline consumes.
pub mod metrics;
/// Inline `[[emphasis]]` markup.
pub mod span;
/// Line breaking.
pub mod wrap;

pub use layout::{BlockRole, BlockSpec, CanvasSize, Layout, LayoutConfig, TextBlock, layout};
pub use metrics::FontFace;
pub use span::{TextSpan, has_emphasis, parse_markup, plain_text};
pub use wrap::{WrapConfig, WrappedLine, Word, wrap};
