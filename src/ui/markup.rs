//! Minimal trusted markup for banners and dialogs.
//!
//! Shell-authored strings may contain `<b>`, `<code>` and the five HTML
//! entities. Anything that originates from the user or the backend goes
//! through [`escape`] first, so it can never produce styling and renders
//! exactly as typed.

/// Styling of one markup span
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanStyle {
    Plain,
    Strong,
    Code,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupSpan {
    pub text: String,
    pub style: SpanStyle,
}

/// Escape text so the markup parser treats it as literal.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

const TAGS: [(&str, SpanStyle, bool); 4] = [
    ("<b>", SpanStyle::Strong, true),
    ("</b>", SpanStyle::Strong, false),
    ("<code>", SpanStyle::Code, true),
    ("</code>", SpanStyle::Code, false),
];

const ENTITIES: [(&str, char); 5] = [
    ("&amp;", '&'),
    ("&lt;", '<'),
    ("&gt;", '>'),
    ("&quot;", '"'),
    ("&#39;", '\''),
];

/// Split markup into styled spans, decoding entities.
///
/// Unknown tags and stray ampersands are kept as literal text. Unclosed tags
/// style the remainder of the string.
pub fn parse(markup: &str) -> Vec<MarkupSpan> {
    let mut spans = Vec::new();
    let mut current = String::new();
    let mut strong = false;
    let mut code = false;
    let mut rest = markup;

    let style_of = |strong: bool, code: bool| {
        if code {
            SpanStyle::Code
        } else if strong {
            SpanStyle::Strong
        } else {
            SpanStyle::Plain
        }
    };

    'outer: while let Some(c) = rest.chars().next() {
        if c == '<' {
            for (tag, style, opening) in TAGS {
                if rest.starts_with(tag) {
                    if !current.is_empty() {
                        spans.push(MarkupSpan {
                            text: std::mem::take(&mut current),
                            style: style_of(strong, code),
                        });
                    }
                    match style {
                        SpanStyle::Strong => strong = opening,
                        SpanStyle::Code => code = opening,
                        SpanStyle::Plain => {}
                    }
                    rest = &rest[tag.len()..];
                    continue 'outer;
                }
            }
        } else if c == '&' {
            for (entity, decoded) in ENTITIES {
                if rest.starts_with(entity) {
                    current.push(decoded);
                    rest = &rest[entity.len()..];
                    continue 'outer;
                }
            }
        }
        current.push(c);
        rest = &rest[c.len_utf8()..];
    }

    if !current.is_empty() {
        spans.push(MarkupSpan { text: current, style: style_of(strong, code) });
    }
    spans
}

/// Concatenated text of a markup string with all styling removed.
pub fn plain_text(markup: &str) -> String {
    parse(markup).into_iter().map(|s| s.text).collect()
}
