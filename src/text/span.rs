const OPEN: &str = "[[";
const CLOSE: &str = "]]";

/// Run of text with an emphasis flag.
///
/// `style` is only a name taken from `[[name:text]]`; the renderer resolves it
/// to a colour, so spans never carry colours themselves.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextSpan {
    pub content: String,
    pub emphasized: bool,
    pub style: Option<String>,
}

impl TextSpan {
    pub fn plain(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            emphasized: false,
            style: None,
        }
    }

    pub fn emphasized(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            emphasized: true,
            style: None,
        }
    }

    pub fn styled(content: impl Into<String>, style: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            emphasized: true,
            style: Some(style.into()),
        }
    }
}

/// Splits `plain [[emphasized]] plain [[style:emphasized]]` into spans.
///
/// Malformed markup never fails: an unclosed `[[`, a stray `]]`, an empty
/// `[[]]` or a nested opener are kept as literal text.
pub fn parse_markup(input: &str) -> Vec<TextSpan> {
    let mut spans: Vec<TextSpan> = Vec::new();
    let mut rest = input;

    while !rest.is_empty() {
        let Some(open) = rest.find(OPEN) else {
            push_plain(&mut spans, rest);
            break;
        };
        let after_open = &rest[open + OPEN.len()..];
        let Some(close) = after_open.find(CLOSE) else {
            push_plain(&mut spans, rest);
            break;
        };
        let inner = &after_open[..close];

        if let Some(nested) = inner.find(OPEN) {
            // the outer opener is literal; rescan from the inner one
            let literal_len = open + OPEN.len() + nested;
            push_plain(&mut spans, &rest[..literal_len]);
            rest = &rest[literal_len..];
            continue;
        }
        if inner.trim().is_empty() {
            let literal_len = open + OPEN.len() + close + CLOSE.len();
            push_plain(&mut spans, &rest[..literal_len]);
            rest = &rest[literal_len..];
            continue;
        }

        push_plain(&mut spans, &rest[..open]);
        spans.push(emphasis_span(inner));
        rest = &after_open[close + CLOSE.len()..];
    }

    spans
}

/// Concatenated span text with markup removed.
pub fn plain_text(spans: &[TextSpan]) -> String {
    spans.iter().map(|span| span.content.as_str()).collect()
}

pub fn has_emphasis(spans: &[TextSpan]) -> bool {
    spans.iter().any(|span| span.emphasized)
}

fn emphasis_span(inner: &str) -> TextSpan {
    if let Some((name, text)) = inner.split_once(':') {
        // names start with a letter so times like `12:30` stay text
        let is_name = name.starts_with(|c: char| c.is_ascii_alphabetic())
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if is_name && !text.trim().is_empty() {
            return TextSpan::styled(text, name);
        }
    }
    TextSpan::emphasized(inner)
}

fn push_plain(spans: &mut Vec<TextSpan>, text: &str) {
    if text.is_empty() {
        return;
    }
    match spans.last_mut() {
        Some(last) if !last.emphasized => last.content.push_str(text),
        _ => spans.push(TextSpan::plain(text)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_plain_and_emphasized_runs() {
        let spans = parse_markup("Harga [[emas naik]] hari ini");
        assert_eq!(
            spans,
            vec![
                TextSpan::plain("Harga "),
                TextSpan::emphasized("emas naik"),
                TextSpan::plain(" hari ini"),
            ]
        );
        assert!(has_emphasis(&spans));
        assert_eq!(plain_text(&spans), "Harga emas naik hari ini");
    }

    #[test]
    fn style_prefix_is_a_name_not_text() {
        let spans = parse_markup("[[red:turun 5%]] dan [[12:30]]");
        assert_eq!(spans[0], TextSpan::styled("turun 5%", "red"));
        assert_eq!(spans[1], TextSpan::plain(" dan "));
        assert_eq!(spans[2], TextSpan::emphasized("12:30"));
        assert_eq!(plain_text(&parse_markup("Pukul [[12:30]] WIB")), "Pukul 12:30 WIB");

        let spans = parse_markup("[[pukul: ]]");
        assert_eq!(spans, vec![TextSpan::emphasized("pukul: ")]);
    }

    #[test]
    fn malformed_markup_stays_literal() {
        assert_eq!(
            parse_markup("naik [[tajam"),
            vec![TextSpan::plain("naik [[tajam")]
        );
        assert_eq!(parse_markup("a ]] b"), vec![TextSpan::plain("a ]] b")]);
        assert_eq!(parse_markup("[[]] x"), vec![TextSpan::plain("[[]] x")]);
        assert_eq!(
            parse_markup("a [[b [[c]] d"),
            vec![
                TextSpan::plain("a [[b "),
                TextSpan::emphasized("c"),
                TextSpan::plain(" d"),
            ]
        );
    }

    #[test]
    fn empty_input_has_no_spans() {
        assert!(parse_markup("").is_empty());
        assert!(!has_emphasis(&parse_markup("tanpa penanda")));
    }
}
