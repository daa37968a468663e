//! # newsreel
//!
//! Text layout and reveal-animation engine for short vertical news clips.
//!
//! ## Overview
//!
//! A clip is an opening card (label, title, subtitle), one card per body
//! paragraph and a closing card. Every card goes through the same pipeline:
//!
//! 1. [`text::parse_markup`] splits `[[emphasis]]` markup into spans.
//! 2. [`text::wrap()`] breaks the spans into lines that fit the canvas.
//! 3. [`text::layout()`] stacks the blocks, shrinking them and finally
//!    shifting them up when they would reach into the footer band.
//! 4. [`RevealAnimator`] renders any frame of the card: a left-to-right wipe,
//!    or growing highlight boxes when the card has emphasis.
//!
//! [`ClipRenderer`] renders the frames in parallel and hands them to a
//! [`FrameSink`] in timeline order.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use newsreel::{
//!     CancelToken, ClipRenderer, FontSystem, PngSequenceSink, RenderThreading,
//!     TemplateConfig, TemplateFaces, build_cards, parse_script,
//! };
//!
//! # fn main() -> newsreel::NewsreelResult<()> {
//! let config = TemplateConfig::default();
//!
//! // 1. Load the template fonts
//! let fonts = FontSystem::new();
//! fonts.load_fonts_dir(std::path::Path::new("fonts"));
//! let faces = TemplateFaces::resolve(&fonts, &config)?;
//!
//! // 2. Build the cards of an item
//! let items = parse_script("Judul: Harga Emas Naik Tajam Hari Ini\nHarga emas [[naik]].");
//! let cards = build_cards(&items[0], &config, &faces)?;
//!
//! // 3. Render to a PNG sequence
//! let renderer = ClipRenderer::new(RenderThreading::default(), CancelToken::new())?;
//! let mut sink = PngSequenceSink::new("out/video_01");
//! renderer.render_clip(&cards, config.canvas, config.fps, config.background, &mut sink)?;
//! # Ok(())
//! # }
//! ```

pub mod animation;
pub mod clip;
pub mod config;
pub mod error;
pub mod face;
pub mod font_storage;
pub mod font_system;
pub mod glyph_id;
pub mod news;
pub mod renderer;
pub mod script;
pub mod text;
pub mod timing;

// common re-exports
pub use animation::{AnimationSpec, Ease, LeadPhase, RevealPhase};
pub use clip::{
    CancelToken, ClipRenderer, ClipStats, FrameSink, InMemorySink, PngSequenceSink,
    RenderThreading, SinkConfig,
};
pub use config::{BlockStyle, BodyDuration, FontSpec, TemplateConfig, TimingConfig};
pub use error::{NewsreelError, NewsreelResult};
pub use face::FontdueFace;
pub use font_storage::FontStorage;
pub use font_system::FontSystem;
pub use glyph_id::GlyphId;
pub use news::{Card, CardKind, TemplateFaces, build_cards};
pub use renderer::{HighlightSpec, RasterFrame, RevealAnimator, render_frame};
pub use script::{NewsItem, parse_script, read_script};
pub use text::{FontFace, Layout, TextSpan, layout, parse_markup, wrap};

// re-export dependencies
pub use fontdb;
pub use fontdue;
pub use parking_lot;
