//! Greedy word wrapping with a connector-token correction pass.

use super::{FontFace, TextSpan};

/// Pixel budget and token rules for [`wrap`].
#[derive(Clone, Debug, PartialEq)]
pub struct WrapConfig {
    pub max_width: f32,
    pub margin_left: f32,
    pub margin_right: f32,
    /// Tokens that must not end a line when another line follows.
    pub orphan_tokens: Vec<String>,
}

impl WrapConfig {
    pub fn new(max_width: f32, margin_left: f32, margin_right: f32) -> Self {
        Self {
            max_width,
            margin_left,
            margin_right,
            orphan_tokens: default_orphan_tokens(),
        }
    }

    fn is_orphan_token(&self, text: &str) -> bool {
        self.orphan_tokens
            .iter()
            .any(|token| token.eq_ignore_ascii_case(text))
    }
}

pub fn default_orphan_tokens() -> Vec<String> {
    ["ke", "di", "Rp"].into_iter().map(String::from).collect()
}

/// One whitespace-delimited token of a wrapped line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Word {
    pub text: String,
    pub emphasized: bool,
    pub style: Option<String>,
    /// Glued to the previous word without a space (a markup boundary inside
    /// a word). Lines never break before a joined word.
    pub joined: bool,
}

/// Words that share one visual line.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WrappedLine {
    pub words: Vec<Word>,
}

impl WrappedLine {
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// The line as it is drawn.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for (i, word) in self.words.iter().enumerate() {
            if i > 0 && !word.joined {
                out.push(' ');
            }
            out.push_str(&word.text);
        }
        out
    }

    /// Horizontal offset of every word from the start of the line.
    pub fn word_offsets(&self, face: &dyn FontFace, px: f32) -> Vec<f32> {
        let mut prefix = String::new();
        let mut offsets = Vec::with_capacity(self.words.len());
        for (i, word) in self.words.iter().enumerate() {
            if i > 0 && !word.joined {
                prefix.push(' ');
            }
            offsets.push(if prefix.is_empty() {
                0.0
            } else {
                face.measure_width(&prefix, px)
            });
            prefix.push_str(&word.text);
        }
        offsets
    }
}

/// Breakable unit: a word plus any words joined to it.
type Unit = Vec<Word>;

/// Wraps `spans` into lines that fit `config.max_width` at `px`.
///
/// Every `\n` starts a new paragraph and an empty paragraph produces an
/// explicit empty line. Empty or whitespace-only input yields no lines.
pub fn wrap(
    spans: &[TextSpan],
    face: &dyn FontFace,
    px: f32,
    config: &WrapConfig,
) -> Vec<WrappedLine> {
    let paragraphs = split_paragraphs(spans);
    if paragraphs.iter().all(|p| p.is_empty()) {
        return Vec::new();
    }

    let mut out = Vec::new();
    for paragraph in paragraphs {
        if paragraph.is_empty() {
            out.push(WrappedLine::default());
            continue;
        }

        let mut lines = fill(group_units(paragraph), face, px, config);
        move_orphans(&mut lines, face, px, config);
        out.extend(lines.into_iter().map(|units| WrappedLine {
            words: units.into_iter().flatten().collect(),
        }));
    }
    out
}

/// Tokenizes spans into paragraphs of words, keeping the emphasis of the
/// span each word came from.
fn split_paragraphs(spans: &[TextSpan]) -> Vec<Vec<Word>> {
    let mut paragraphs: Vec<Vec<Word>> = vec![Vec::new()];
    let mut gap_before = true;

    for span in spans {
        for (i, piece) in span.content.split('\n').enumerate() {
            if i > 0 {
                paragraphs.push(Vec::new());
                gap_before = true;
            }
            if piece.starts_with(char::is_whitespace) {
                gap_before = true;
            }

            let Some(paragraph) = paragraphs.last_mut() else {
                continue;
            };
            let mut tokens = piece.split_whitespace().peekable();
            if tokens.peek().is_none() {
                gap_before |= !piece.is_empty();
                continue;
            }
            for (n, token) in tokens.enumerate() {
                let joined = n == 0 && !gap_before && !paragraph.is_empty();
                paragraph.push(Word {
                    text: token.to_string(),
                    emphasized: span.emphasized,
                    style: span.style.clone(),
                    joined,
                });
            }
            gap_before = piece.ends_with(char::is_whitespace);
        }
    }

    paragraphs
}

fn group_units(words: Vec<Word>) -> Vec<Unit> {
    let mut units: Vec<Unit> = Vec::new();
    for word in words {
        match units.last_mut() {
            Some(unit) if word.joined => unit.push(word),
            _ => units.push(vec![word]),
        }
    }
    units
}

fn unit_text(unit: &Unit) -> String {
    unit.iter().map(|word| word.text.as_str()).collect()
}

fn line_text(units: &[Unit]) -> String {
    units.iter().map(unit_text).collect::<Vec<_>>().join(" ")
}

/// Measures a candidate line the way the fill loop does: with a trailing
/// space and both margins.
fn fits(text: &str, face: &dyn FontFace, px: f32, config: &WrapConfig) -> bool {
    let measured = face.measure_width(&format!("{text} "), px);
    measured + config.margin_left + config.margin_right <= config.max_width
}

fn fill(units: Vec<Unit>, face: &dyn FontFace, px: f32, config: &WrapConfig) -> Vec<Vec<Unit>> {
    let mut lines: Vec<Vec<Unit>> = Vec::new();
    let mut current: Vec<Unit> = Vec::new();
    let mut current_text = String::new();

    for unit in units {
        let text = unit_text(&unit);
        let candidate = if current_text.is_empty() {
            text.clone()
        } else {
            format!("{current_text} {text}")
        };

        if !current.is_empty() && !fits(&candidate, face, px, config) {
            lines.push(std::mem::take(&mut current));
            current_text = text;
        } else {
            current_text = candidate;
        }
        current.push(unit);
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn move_orphans(lines: &mut Vec<Vec<Unit>>, face: &dyn FontFace, px: f32, config: &WrapConfig) {
    let mut i = 0;
    while i + 1 < lines.len() {
        let dangling = lines[i].len() > 1
            && lines[i]
                .last()
                .is_some_and(|unit| config.is_orphan_token(&unit_text(unit)));

        // line `i` only shrinks, so re-checking it terminates
        if dangling && let Some(unit) = lines[i].pop() {
            log::trace!("moving connector {:?} to the next line", unit_text(&unit));
            lines[i + 1].insert(0, unit);
            if !fits(&line_text(&lines[i + 1]), face, px, config) {
                let rest: Vec<Unit> = lines.drain(i + 1..).flatten().collect();
                lines.extend(fill(rest, face, px, config));
            }
        } else {
            i += 1;
        }
    }
}
