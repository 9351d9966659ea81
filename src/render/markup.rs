//! Paragraph markup accepted by the renderers.
//!
//! Card texts may carry a small inline markup vocabulary taken over from the
//! backlog export: `<b>`, `<i>`, `<u>`, `<strong>`, `<em>`, `<br/>`,
//! `<font>`, `<super>`, `<sub>`, `<strike>`, `<span>`, `<para>` and `<a>`,
//! plus character entities. Anything else (image references in particular)
//! makes the text unrenderable; callers then fall back to [`escape`].

/// Tags a paragraph may contain.
const ALLOWED_TAGS: &[&str] = &[
    "a", "b", "br", "em", "font", "i", "para", "span", "strike", "strong", "sub", "super", "u",
];

/// Reasons a text is rejected as paragraph markup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MarkupError {
    #[error("unsupported tag <{0}>")]
    UnsupportedTag(String),

    #[error("unexpected closing tag </{0}>")]
    UnexpectedClose(String),

    #[error("unclosed tag <{0}>")]
    Unclosed(String),

    #[error("malformed tag at byte {0}")]
    MalformedTag(usize),
}

/// A piece of laid-out paragraph content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Span {
    /// Text drawn in one face
    Text { text: String, bold: bool, italic: bool },
    /// Forced line break (`<br/>`)
    Break,
}

/// Byte offset of the `>` that closes the tag starting `rest`.
///
/// A `>` inside a quoted attribute value does not end the tag.
fn tag_end(rest: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    let mut after_equals = false;
    for (i, c) in rest.char_indices().skip(1) {
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '>' => return Some(i),
            '"' | '\'' if after_equals => quote = Some(c),
            _ => {}
        }
        after_equals = c == '=' || (after_equals && c.is_whitespace());
    }
    None
}

/// Check that `text` is well-formed paragraph markup.
pub fn validate(text: &str) -> Result<(), MarkupError> {
    parse(text).map(|_| ())
}

/// Parse paragraph markup into styled spans.
///
/// Adjacent characters in the same face are merged into one span.
pub fn parse(text: &str) -> Result<Vec<Span>, MarkupError> {
    let mut spans = Vec::new();
    let mut stack: Vec<String> = Vec::new();
    let mut buf = String::new();
    let mut i = 0;

    while i < text.len() {
        let rest = &text[i..];
        let Some(c) = rest.chars().next() else {
            break;
        };

        match c {
            '<' => {
                let close = tag_end(rest).ok_or(MarkupError::MalformedTag(i))?;
                let inner = &rest[1..close];
                let (bold, italic) = face(&stack);

                if let Some(name) = inner.strip_prefix('/') {
                    let name = name.trim().to_ascii_lowercase();
                    match stack.pop() {
                        Some(open) if open == name => {}
                        _ => return Err(MarkupError::UnexpectedClose(name)),
                    }
                    flush(&mut spans, &mut buf, bold, italic);
                } else {
                    let self_closing = inner.ends_with('/');
                    let body = inner.trim_end_matches('/');
                    let name = tag_name(body).ok_or(MarkupError::MalformedTag(i))?;
                    if !ALLOWED_TAGS.contains(&name.as_str()) {
                        return Err(MarkupError::UnsupportedTag(name));
                    }
                    flush(&mut spans, &mut buf, bold, italic);
                    if name == "br" {
                        spans.push(Span::Break);
                    } else if !self_closing {
                        stack.push(name);
                    }
                }
                i += close + 1;
            }
            '&' => match decode_entity(rest) {
                Some((decoded, consumed)) => {
                    buf.push(decoded);
                    i += consumed;
                }
                None => {
                    buf.push('&');
                    i += 1;
                }
            },
            _ => {
                buf.push(c);
                i += c.len_utf8();
            }
        }
    }

    if let Some(open) = stack.pop() {
        return Err(MarkupError::Unclosed(open));
    }
    let (bold, italic) = face(&stack);
    flush(&mut spans, &mut buf, bold, italic);
    Ok(spans)
}

/// HTML-escape a string so it renders literally.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 16);
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn tag_name(body: &str) -> Option<String> {
    let name = body.split_whitespace().next()?;
    if body.starts_with(char::is_whitespace)
        || !name.chars().all(|c| c.is_ascii_alphanumeric())
        || !name.starts_with(|c: char| c.is_ascii_alphabetic())
    {
        return None;
    }
    Some(name.to_ascii_lowercase())
}

fn face(stack: &[String]) -> (bool, bool) {
    let bold = stack.iter().any(|t| t == "b" || t == "strong");
    let italic = stack.iter().any(|t| t == "i" || t == "em");
    (bold, italic)
}

fn flush(spans: &mut Vec<Span>, buf: &mut String, bold: bool, italic: bool) {
    if buf.is_empty() {
        return;
    }
    spans.push(Span::Text {
        text: std::mem::take(buf),
        bold,
        italic,
    });
}

/// Decode the entity at the start of `s`, returning the character and the
/// number of bytes consumed.
fn decode_entity(s: &str) -> Option<(char, usize)> {
    let end = s.get(..12).unwrap_or(s).find(';')?;
    let name = &s[1..end];
    let decoded = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        _ => {
            let hex = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X"));
            let code = if let Some(hex) = hex {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                name.strip_prefix('#')?.parse().ok()?
            };
            char::from_u32(code)?
        }
    };
    Some((decoded, end + 1))
}
