//! Card durations derived from word counts.
//!
//! All durations are in seconds; [`crate::animation::AnimationSpec::from_seconds`]
//! turns them into frame budgets.

use crate::text::{parse_markup, plain_text};

/// Slowest reading-rate duration.
pub const MIN_READING_SECS: f64 = 3.0;
/// Fastest reading-rate duration.
pub const MAX_READING_SECS: f64 = 6.0;
/// Words read per second by [`reading_rate_duration`].
pub const WORDS_PER_SECOND: f64 = 3.5;

fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Words of `text` once `[[...]]` markup is removed.
pub fn visible_word_count(text: &str) -> usize {
    word_count(&plain_text(&parse_markup(text)))
}

/// Opening card duration over the combined words of title, subtitle and label.
pub fn title_duration(title: &str, subtitle: Option<&str>, label: Option<&str>) -> f64 {
    let words = visible_word_count(title)
        + subtitle.map_or(0, visible_word_count)
        + label.map_or(0, visible_word_count);

    match words {
        0..=8 => 2.5,
        9..=14 => 3.0,
        15..=22 => 3.5,
        _ => 4.0,
    }
}

/// Body card duration as a word-count step function.
pub fn body_duration(text: &str) -> f64 {
    match visible_word_count(text) {
        0..=15 => 4.0,
        16..=30 => 5.0,
        31..=50 => 6.5,
        _ => 7.5,
    }
}

/// `words / 3.5` seconds clamped to `[3, 6]` and rounded to a tenth.
pub fn reading_rate_duration(text: &str) -> f64 {
    let words = visible_word_count(text);
    if words == 0 {
        return MIN_READING_SECS;
    }
    let seconds = (words as f64 / WORDS_PER_SECOND).clamp(MIN_READING_SECS, MAX_READING_SECS);
    (seconds * 10.0).round() / 10.0
}
