use std::sync::Arc;

use newsreel::{
    FontFace, LeadPhase, RevealPhase, TemplateConfig, TemplateFaces, build_cards, parse_script,
};

/// Monospaced face: every glyph is a solid box half as wide as the size.
#[derive(Debug)]
struct MonoFace;

impl FontFace for MonoFace {
    fn measure_width(&self, text: &str, px: f32) -> f32 {
        text.chars().count() as f32 * px * 0.5
    }

    fn line_height(&self, px: f32) -> f32 {
        px
    }

    fn ascent(&self, px: f32) -> f32 {
        px * 0.8
    }

    fn rasterize(&self, text: &str, px: f32, plot: &mut dyn FnMut(i32, i32, u8)) {
        let advance = px * 0.5;
        for (i, ch) in text.chars().enumerate() {
            if ch.is_whitespace() {
                continue;
            }
            let x0 = (i as f32 * advance) as i32;
            let x1 = ((i + 1) as f32 * advance) as i32 - 1;
            for y in 0..(px * 0.8) as i32 {
                for x in x0..x1 {
                    plot(x, y, 255);
                }
            }
        }
    }
}

fn faces() -> TemplateFaces {
    TemplateFaces::uniform(Arc::new(MonoFace))
}

#[test]
fn six_word_title_reveals_over_sixty_frames() {
    let items = parse_script("Judul: Harga Emas Naik Tajam Hari Ini\n");
    let config = TemplateConfig::default();
    let cards = build_cards(&items[0], &config, &faces()).expect("cards");

    let opening = &cards[0];
    assert_eq!(opening.total_frames(), 60);
    assert_eq!(opening.animation.lead, LeadPhase::Hidden);

    let animator = opening.animator(config.background);
    assert_eq!(animator.revealed_width(0), 0);
    assert_eq!(animator.revealed_width(59), 720);
    assert_eq!(opening.animation.phase(59), RevealPhase::Settled);

    let first = animator.render_frame(0);
    assert!(first.pixels.iter().all(|&c| c == 0));

    let last = animator.render_frame(59);
    let title = &opening.layout.blocks[0];
    assert_eq!(title.top_y, 768.0);
    assert_eq!(last.pixel(70, 768), Some([255, 255, 255]));
}

#[test]
fn emphasized_body_card_grows_highlight_boxes() {
    let items = parse_script("Judul: Emas\nHarga emas [[naik]] hari ini\n");
    let config = TemplateConfig::default();
    let cards = build_cards(&items[0], &config, &faces()).expect("cards");

    let body = &cards[1];
    assert!(body.highlight.is_some());
    assert_eq!(body.layout.emphasized_chars(), 4);

    let animator = body.animator(config.background);
    let start = animator.render_frame(0);
    // text is visible immediately, the box is not
    assert_eq!(start.pixel(70, 768), Some([255, 255, 255]));
    assert_eq!(start.pixel(255, 766), Some([0, 0, 0]));

    let end = animator.render_frame(body.total_frames() - 1);
    assert_eq!(end.pixel(255, 766), Some([32, 88, 204]));
    assert_eq!(end.pixel(340, 766), Some([0, 0, 0]));
}

#[test]
fn long_body_stays_above_the_footer() {
    let text = "kata ".repeat(120);
    let script = format!("Judul: Panjang\n{text}\n");
    let items = parse_script(&script);
    let config = TemplateConfig::default();
    let cards = build_cards(&items[0], &config, &faces()).expect("cards");

    let layout = &cards[1].layout;
    assert_eq!(layout.size_step, 1);
    assert!(layout.shift > 0.0 && layout.shift <= config.max_upward_shift);
    if layout.fits() {
        assert!(layout.bottom_y <= layout.footer_limit);
    } else {
        assert_eq!(layout.bottom_y - layout.footer_limit, layout.overflow);
    }
}
