//! Text shaping shared by the static table and the interactive list.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub const ELLIPSIS: &str = "...";

/// Replaces every line break in `text` with a single space so the value
/// always renders as one terminal row.
pub fn collapse_newlines(text: &str) -> String {
    text.replace("\r\n", "\n")
        .chars()
        .map(|ch| if ch == '\n' || ch == '\r' { ' ' } else { ch })
        .collect()
}

/// Decodes the HTML character entities that show up in status bodies.
/// `&amp;` goes last so already-decoded sequences are not decoded twice.
pub fn decode_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .replace("&hellip;", "\u{2026}")
        .replace("&amp;", "&")
}

/// Truncates `text` to at most `max_width` display columns, counting wide
/// characters as two columns, and appends an ellipsis when shortened.
pub fn truncate_width(text: &str, max_width: usize) -> String {
    if UnicodeWidthStr::width(text) <= max_width {
        return text.to_string();
    }
    let budget = max_width.saturating_sub(UnicodeWidthStr::width(ELLIPSIS));
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let width = UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + width > budget {
            break;
        }
        out.push(ch);
        used += width;
    }
    out.push_str(ELLIPSIS);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_every_break_to_one_space() {
        assert_eq!(collapse_newlines("a\r\nb\nc\rd"), "a b c d");
        assert_eq!(collapse_newlines("no breaks"), "no breaks");
    }

    #[test]
    fn decodes_common_entities() {
        assert_eq!(decode_entities("fish &amp; chips"), "fish & chips");
        assert_eq!(decode_entities("&lt;b&gt;&quot;hi&quot;&#39;"), "<b>\"hi\"'");
        // A literal "&amp;lt;" decodes to "&lt;", not "<".
        assert_eq!(decode_entities("&amp;lt;"), "&lt;");
    }

    #[test]
    fn short_names_pass_through_untouched() {
        assert_eq!(truncate_width("amy", 30), "amy");
    }

    #[test]
    fn truncation_counts_display_columns() {
        let long = "a".repeat(40);
        let truncated = truncate_width(&long, 30);
        assert_eq!(UnicodeWidthStr::width(truncated.as_str()), 30);
        assert!(truncated.ends_with(ELLIPSIS));

        // CJK characters take two columns each.
        let wide = "字".repeat(20);
        let truncated = truncate_width(&wide, 10);
        assert!(UnicodeWidthStr::width(truncated.as_str()) <= 10);
        assert!(truncated.ends_with(ELLIPSIS));
    }
}
