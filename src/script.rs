//! Minimal news script reader.
//!
//! A script is a list of items separated by blank lines:
//!
//! ```text
//! Label: EKONOMI
//! Judul: Harga Emas Naik Tajam Hari Ini
//! Subjudul: Investor beralih ke logam mulia
//! Harga emas Antam naik [[Rp 15.000]] per gram.
//! Kenaikan dipicu pelemahan rupiah.\nAnalis memperkirakan tren berlanjut.
//! ```
//!
//! Every line that is not a key is one body card; a literal `\n` inside a
//! line becomes a manual line break. Items without a title are skipped.

use std::path::Path;

use crate::error::{NewsreelError, NewsreelResult};

/// One news item of a script.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NewsItem {
    pub title: String,
    pub subtitle: Option<String>,
    pub label: Option<String>,
    /// One entry per body card.
    pub body: Vec<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Key {
    Title,
    Subtitle,
    Label,
}

impl Key {
    const PREFIXES: [(&'static str, Key); 6] = [
        ("Judul:", Key::Title),
        ("Title:", Key::Title),
        ("Subjudul:", Key::Subtitle),
        ("Subtitle:", Key::Subtitle),
        ("Label:", Key::Label),
        ("Upper:", Key::Label),
    ];

    /// Splits `line` into a key and the text after its colon.
    fn parse(line: &str) -> Option<(Key, &str)> {
        Self::PREFIXES.iter().find_map(|(prefix, key)| {
            let head = line.get(..prefix.len())?;
            head.eq_ignore_ascii_case(prefix)
                .then(|| (*key, line[prefix.len()..].trim()))
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ParseState {
    /// Expecting a key or the first body line.
    SeekingKey,
    /// A key was given without a value; the next line is its value.
    InKeyBody(Key),
    /// Body lines have started.
    InBodyText,
}

#[derive(Debug, Default)]
struct ItemBuilder {
    item: NewsItem,
    first_line: usize,
}

impl ItemBuilder {
    fn set(&mut self, key: Key, value: &str, line_no: usize) {
        let slot = match key {
            Key::Title => {
                if !self.item.title.is_empty() {
                    log::warn!("line {line_no}: title given twice; keeping the last one");
                }
                self.item.title = value.to_string();
                return;
            }
            Key::Subtitle => &mut self.item.subtitle,
            Key::Label => &mut self.item.label,
        };
        if slot.is_some() {
            log::warn!("line {line_no}: {key:?} given twice; keeping the last one");
        }
        *slot = Some(value.to_string());
    }

    fn finish(self, items: &mut Vec<NewsItem>) {
        if self.item.title.is_empty() {
            log::warn!(
                "item starting at line {} has no title; skipped",
                self.first_line
            );
            return;
        }
        items.push(self.item);
    }
}

/// Parses a script. Never fails; questionable input is logged and skipped.
pub fn parse_script(text: &str) -> Vec<NewsItem> {
    let mut items = Vec::new();
    let mut state = ParseState::SeekingKey;
    let mut current: Option<ItemBuilder> = None;

    for (index, raw) in text.lines().enumerate() {
        let line_no = index + 1;
        let line = raw.trim();

        if line.is_empty() {
            if let ParseState::InKeyBody(key) = state {
                log::warn!("line {line_no}: {key:?} has no value");
            }
            if let Some(builder) = current.take() {
                builder.finish(&mut items);
            }
            state = ParseState::SeekingKey;
            continue;
        }

        let builder = current.get_or_insert_with(|| ItemBuilder {
            first_line: line_no,
            ..ItemBuilder::default()
        });

        state = match (state, Key::parse(line)) {
            (ParseState::InKeyBody(pending), Some((key, value))) => {
                log::warn!("line {line_no}: {pending:?} has no value");
                apply_key(builder, key, value, line_no)
            }
            (_, Some((key, value))) => apply_key(builder, key, value, line_no),
            (ParseState::InKeyBody(key), None) => {
                builder.set(key, line, line_no);
                ParseState::SeekingKey
            }
            (ParseState::SeekingKey | ParseState::InBodyText, None) => {
                builder.item.body.push(line.replace("\\n", "\n"));
                ParseState::InBodyText
            }
        };
    }

    if let ParseState::InKeyBody(key) = state {
        log::warn!("{key:?} at the end of the script has no value");
    }
    if let Some(builder) = current {
        builder.finish(&mut items);
    }

    log::debug!("parsed {} news items", items.len());
    items
}

fn apply_key(builder: &mut ItemBuilder, key: Key, value: &str, line_no: usize) -> ParseState {
    if value.is_empty() {
        ParseState::InKeyBody(key)
    } else {
        builder.set(key, value, line_no);
        ParseState::SeekingKey
    }
}

/// Reads and parses a script file. A script without a single titled item is
/// a [`NewsreelError::Script`] error.
pub fn read_script(path: &Path) -> NewsreelResult<Vec<NewsItem>> {
    let text = std::fs::read_to_string(path)?;
    let items = parse_script(&text);
    if items.is_empty() {
        return Err(NewsreelError::script(format!(
            "{} contains no item with a title",
            path.display()
        )));
    }
    Ok(items)
}
