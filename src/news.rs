//! Turns a [`NewsItem`] into the cards of one clip.

use std::sync::Arc;

use crate::animation::AnimationSpec;
use crate::config::{BlockStyle, BodyDuration, TemplateConfig};
use crate::error::NewsreelResult;
use crate::font_system::FontSystem;
use crate::renderer::{HighlightSpec, RevealAnimator};
use crate::script::NewsItem;
use crate::text::{BlockRole, BlockSpec, FontFace, Layout, layout, parse_markup};
use crate::timing;

/// Faces used by the four block roles of the template.
#[derive(Clone, Debug)]
pub struct TemplateFaces {
    pub label: Arc<dyn FontFace>,
    pub title: Arc<dyn FontFace>,
    pub subtitle: Arc<dyn FontFace>,
    pub body: Arc<dyn FontFace>,
}

impl TemplateFaces {
    /// Resolves the font of every role through `system`.
    pub fn resolve(system: &FontSystem, config: &TemplateConfig) -> NewsreelResult<Self> {
        Ok(Self {
            label: system.resolve(&config.label.font)?,
            title: system.resolve(&config.title.font)?,
            subtitle: system.resolve(&config.subtitle.font)?,
            body: system.resolve(&config.body.font)?,
        })
    }

    /// Uses one face for every role.
    pub fn uniform(face: Arc<dyn FontFace>) -> Self {
        Self {
            label: Arc::clone(&face),
            title: Arc::clone(&face),
            subtitle: Arc::clone(&face),
            body: face,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CardKind {
    Opening,
    /// Index into [`NewsItem::body`].
    Body(usize),
    Closing,
}

/// A fully laid out card and its timeline.
#[derive(Clone, Debug)]
pub struct Card {
    pub kind: CardKind,
    pub layout: Layout,
    pub animation: AnimationSpec,
    /// Present when the card contains emphasis markup.
    pub highlight: Option<HighlightSpec>,
}

impl Card {
    pub fn total_frames(&self) -> u32 {
        self.animation.total_frames
    }

    pub fn animator(&self, background: [u8; 3]) -> RevealAnimator {
        RevealAnimator::new(
            self.layout.clone(),
            self.animation,
            self.highlight.clone(),
            background,
        )
    }

    fn new(kind: CardKind, layout: Layout, animation: AnimationSpec, config: &TemplateConfig) -> Self {
        let highlight = layout.has_emphasis().then(|| config.highlight.clone());
        if !layout.fits() {
            log::warn!("{kind:?} card overlaps the footer by {:.1}px", layout.overflow);
        }
        Self {
            kind,
            layout,
            animation,
            highlight,
        }
    }
}

fn block(role: BlockRole, text: &str, face: &Arc<dyn FontFace>, style: &BlockStyle) -> BlockSpec {
    let mut spec = BlockSpec::new(role, parse_markup(text), Arc::clone(face), style.sizes.clone())
        .line_spacing(style.line_spacing)
        .color(style.color);
    if let Some(spacing) = style.spacing_before {
        spec = spec.spacing_before(spacing);
    }
    spec
}

/// Label, title and subtitle stacked from the start position.
pub fn opening_card(
    item: &NewsItem,
    config: &TemplateConfig,
    faces: &TemplateFaces,
) -> NewsreelResult<Card> {
    let mut specs = Vec::with_capacity(3);
    if let Some(label) = &item.label {
        specs.push(block(BlockRole::Label, label, &faces.label, &config.label));
    }
    specs.push(block(BlockRole::Title, &item.title, &faces.title, &config.title));
    if let Some(subtitle) = &item.subtitle {
        specs.push(block(BlockRole::Subtitle, subtitle, &faces.subtitle, &config.subtitle));
    }
    let layout = layout(&specs, &config.layout_config())?;

    let timing = &config.timing;
    let seconds = timing::title_duration(
        &item.title,
        item.subtitle.as_deref(),
        item.label.as_deref(),
    );
    let animation = AnimationSpec::from_seconds(
        seconds,
        config.fps,
        timing.opening_lead_secs,
        timing.opening_reveal_secs,
    )
    .easing(timing.easing)
    .lead(timing.lead);

    Ok(Card::new(CardKind::Opening, layout, animation, config))
}

pub fn body_card(
    text: &str,
    index: usize,
    config: &TemplateConfig,
    faces: &TemplateFaces,
) -> NewsreelResult<Card> {
    let specs = [block(BlockRole::Body, text, &faces.body, &config.body)];
    let layout = layout(&specs, &config.layout_config())?;

    let timing = &config.timing;
    let seconds = match timing.body_duration {
        BodyDuration::Steps => timing::body_duration(text),
        BodyDuration::ReadingRate => timing::reading_rate_duration(text),
    };
    let total = (config.fps as f64 * seconds) as u32;
    let animation = AnimationSpec::with_frames(total, timing.body_lead_frames, timing.body_reveal_frames)
        .easing(timing.easing)
        .lead(timing.lead);

    Ok(Card::new(CardKind::Body(index), layout, animation, config))
}

/// Background-only card closing the clip; `None` when disabled.
pub fn closing_card(config: &TemplateConfig) -> NewsreelResult<Option<Card>> {
    let total = (config.fps as f64 * config.timing.closing_secs) as u32;
    if total == 0 {
        return Ok(None);
    }
    let layout = layout(&[], &config.layout_config())?;
    let animation = AnimationSpec::with_frames(total, 0, 0);
    Ok(Some(Card::new(CardKind::Closing, layout, animation, config)))
}

/// Opening card, one card per body paragraph, closing card.
pub fn build_cards(
    item: &NewsItem,
    config: &TemplateConfig,
    faces: &TemplateFaces,
) -> NewsreelResult<Vec<Card>> {
    let mut cards = Vec::with_capacity(item.body.len() + 2);
    cards.push(opening_card(item, config, faces)?);
    for (index, text) in item.body.iter().enumerate() {
        if text.trim().is_empty() {
            continue;
        }
        cards.push(body_card(text, index, config, faces)?);
    }
    cards.extend(closing_card(config)?);

    log::debug!(
        "{:?}: {} cards, {} frames",
        item.title,
        cards.len(),
        cards.iter().map(Card::total_frames).sum::<u32>()
    );
    Ok(cards)
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::Ease;
    use crate::text::metrics::testing::BlockFace;

    fn faces() -> TemplateFaces {
        TemplateFaces::uniform(BlockFace::shared())
    }

    fn item() -> NewsItem {
        NewsItem {
            title: "Harga Emas Naik Tajam Hari Ini".to_string(),
            subtitle: Some("Investor beralih".to_string()),
            label: Some("EKONOMI".to_string()),
            body: vec![
                "Harga emas naik [[Rp 15.000]] per gram.".to_string(),
                "Kenaikan dipicu pelemahan rupiah.".to_string(),
            ],
        }
    }

    #[test]
    fn opening_stacks_label_title_subtitle() {
        let config = TemplateConfig::default();
        let card = opening_card(&item(), &config, &faces()).unwrap();

        let roles: Vec<BlockRole> = card.layout.blocks.iter().map(|b| b.role).collect();
        assert_eq!(roles, vec![BlockRole::Label, BlockRole::Title, BlockRole::Subtitle]);
        let tops: Vec<f32> = card.layout.blocks.iter().map(|b| b.top_y).collect();
        assert_eq!(tops[0], 768.0);
        // label 28px tall, then the 12px gap
        assert_eq!(tops[1], 808.0);
        assert_eq!(card.animation.easing, Ease::OutCubic);
        assert!(card.highlight.is_none());
    }

    #[test]
    fn opening_timeline_matches_the_template() {
        let config = TemplateConfig::default();
        let mut news = item();
        news.subtitle = None;
        news.label = None;
        let card = opening_card(&news, &config, &faces()).unwrap();

        assert_eq!(card.total_frames(), 60);
        assert_eq!(card.animation.static_lead_frames, 4);
        assert_eq!(card.animation.reveal_frames, 19);
    }

    #[test]
    fn body_cards_follow_paragraphs_and_markup() {
        let config = TemplateConfig::default();
        let cards = build_cards(&item(), &config, &faces()).unwrap();

        let kinds: Vec<CardKind> = cards.iter().map(|c| c.kind).collect();
        assert_eq!(
            kinds,
            vec![CardKind::Opening, CardKind::Body(0), CardKind::Body(1), CardKind::Closing]
        );
        assert!(cards[1].highlight.is_some());
        assert!(cards[2].highlight.is_none());
        assert_eq!(cards[1].total_frames(), 96);
        assert_eq!(cards[1].animation.static_lead_frames, 0);
        assert_eq!(cards[1].animation.reveal_frames, 18);
        assert_eq!(cards[3].total_frames(), 36);
        assert!(cards[3].layout.blocks.is_empty());
    }

    #[test]
    fn reading_rate_mode_and_disabled_closing() {
        let mut config = TemplateConfig::default();
        config.timing.body_duration = BodyDuration::ReadingRate;
        config.timing.closing_secs = 0.0;

        let cards = build_cards(&item(), &config, &faces()).unwrap();
        assert_eq!(cards.len(), 3);
        assert_eq!(cards[1].total_frames(), 72);
    }

    #[test]
    fn blank_body_lines_produce_no_cards() {
        let mut news = item();
        news.body = vec!["   ".to_string()];
        let cards = build_cards(&news, &TemplateConfig::default(), &faces()).unwrap();
        assert_eq!(cards.len(), 2);
    }
}
