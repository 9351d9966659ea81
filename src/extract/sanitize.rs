//! Text cleanup applied to every extracted value.

use crate::render::TextValidator;
use crate::render::markup;
use tracing::warn;

/// Replacement for a removed hyperlink.
pub const LINK_PLACEHOLDER: &str = " <i>link</i> ";

/// Longest description kept before truncation.
pub const MAX_DESCRIPTION_CHARS: usize = 160;

/// A description is cut at the newline with this ordinal.
pub const MAX_DESCRIPTION_NEWLINES: usize = 4;

pub const TRUNCATION_MARKER: &str = "...";

const LINK_OPEN: &str = "<a href";
const LINK_CLOSE: &str = "</a>";

/// Replace every `<a href ...>...</a>` with [`LINK_PLACEHOLDER`].
///
/// Anchors without `href` are left alone. An unterminated link swallows
/// the rest of the string.
pub fn strip_links(text: &str) -> String {
    let mut out = text.to_string();
    while let Some(start) = out.find(LINK_OPEN) {
        let end = out[start..]
            .find(LINK_CLOSE)
            .map_or(out.len(), |i| start + i + LINK_CLOSE.len());
        out.replace_range(start..end, LINK_PLACEHOLDER);
    }
    out
}

/// Drop everything from the fourth newline on.
pub fn cap_newlines(text: &str) -> &str {
    match text.match_indices('\n').nth(MAX_DESCRIPTION_NEWLINES - 1) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}

/// Shorten overlong descriptions to [`MAX_DESCRIPTION_CHARS`] plus a marker.
pub fn trim_description(text: &str) -> String {
    match text.char_indices().nth(MAX_DESCRIPTION_CHARS) {
        Some((cut, _)) => format!("{}{TRUNCATION_MARKER}", &text[..cut]),
        None => text.to_string(),
    }
}

/// Strip links, then escape the value if the renderer would reject it.
pub fn sanitize(text: &str, validator: &dyn TextValidator) -> String {
    let stripped = strip_links(text);
    if validator.validate_text(&stripped) {
        stripped
    } else {
        warn!(text = %stripped, "text is not valid markup, escaping");
        markup::escape(&stripped)
    }
}

/// Full description pipeline: sanitize, cap newlines, trim length.
pub fn clean_description(text: &str, validator: &dyn TextValidator) -> String {
    let sanitized = sanitize(text, validator);
    trim_description(cap_newlines(&sanitized))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::RichTextValidator;

    #[test]
    fn test_link_removal() {
        assert_eq!(
            strip_links("Text<a href=bla></a>moreText"),
            "Text <i>link</i> moreText"
        );
        assert_eq!(
            strip_links("Text <a name=noHyperLink></a> moreText<a href=importantTag></a>"),
            "Text <a name=noHyperLink></a> moreText <i>link</i> "
        );
        assert_eq!(
            strip_links("<a href=\"x\">one</a> and <a href=\"y\">two</a>"),
            " <i>link</i>  and  <i>link</i> "
        );
    }

    #[test]
    fn test_link_removal_counts() {
        let text = "a<a href=1>x</a>b<a href=2>y</a>c<a href=3>z</a>d";
        let stripped = strip_links(text);
        assert_eq!(stripped.matches(LINK_PLACEHOLDER).count(), 3);
        assert!(!stripped.contains(LINK_OPEN));
    }

    #[test]
    fn test_unterminated_link_consumes_rest() {
        assert_eq!(
            strip_links("before <a href=oops> dangling"),
            "before  <i>link</i> "
        );
    }

    #[test]
    fn test_line_removal() {
        assert_eq!(
            cap_newlines("A text \n with \n too \n many \n new \n lines"),
            "A text \n with \n too \n many "
        );
        assert_eq!(cap_newlines("one\ntwo\nthree\nfour"), "one\ntwo\nthree\nfour");
        assert_eq!(cap_newlines("a\nb\nc\nd\n"), "a\nb\nc\nd");
        assert_eq!(cap_newlines(""), "");
    }

    #[test]
    fn test_description_trimming() {
        let long = "This description is way too long. It has more than 160 characters. \
                    This means it will not fit on the card and has to be shortened, \
                    otherwise it overflows into the processor row and nobody can read it.";
        assert!(long.chars().count() > MAX_DESCRIPTION_CHARS);
        let trimmed = trim_description(long);
        assert!(trimmed.chars().count() <= MAX_DESCRIPTION_CHARS + 4);
        assert!(trimmed.chars().count() < long.chars().count());
        assert!(trimmed.ends_with(TRUNCATION_MARKER));

        let short = "short";
        assert_eq!(trim_description(short), short);
        let exact = "x".repeat(MAX_DESCRIPTION_CHARS);
        assert_eq!(trim_description(&exact), exact);
    }

    #[test]
    fn test_trimming_respects_char_boundaries() {
        let umlauts = "ä".repeat(200);
        let trimmed = trim_description(&umlauts);
        assert_eq!(trimmed.chars().count(), MAX_DESCRIPTION_CHARS + 3);
    }

    #[test]
    fn test_sanitize_escapes_images() {
        let validator = RichTextValidator;
        assert_eq!(
            sanitize("see <img src=\"a.gif\"/>", &validator),
            "see &lt;img src=&quot;a.gif&quot;/&gt;"
        );
        assert_eq!(sanitize("<b>ok</b>", &validator), "<b>ok</b>");
        assert_eq!(
            sanitize("go <a href=\"u\">here</a>", &validator),
            "go  <i>link</i> "
        );
    }

    #[test]
    fn test_clean_description_order() {
        let validator = RichTextValidator;
        let text = format!("{}\nb\nc\nd\ne", "x".repeat(300));
        let cleaned = clean_description(&text, &validator);
        assert_eq!(cleaned, format!("{}...", "x".repeat(160)));
    }
}
