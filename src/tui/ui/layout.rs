//! Text measurement helpers. Widths are display columns, not bytes.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Display width of a session name column
pub const NAME_WIDTH: usize = 18;

pub fn display_width(text: &str) -> usize {
    UnicodeWidthStr::width(text)
}

/// Truncate text to a maximum display width.
pub fn truncate_to_width(text: &str, max_width: usize) -> String {
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let ch_width = UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + ch_width > max_width {
            break;
        }
        out.push(ch);
        used += ch_width;
    }
    out
}

/// Truncate with a trailing ellipsis when `text` does not fit.
pub fn truncate_with_ellipsis(text: &str, max_width: usize) -> String {
    if display_width(text) <= max_width {
        return text.to_string();
    }
    match max_width {
        0 => String::new(),
        1 => "…".to_string(),
        _ => format!("{}…", truncate_to_width(text, max_width - 1)),
    }
}

/// Left-align `text` in exactly `width` columns, truncating if needed.
pub fn fit_left(text: &str, width: usize) -> String {
    let mut out = truncate_with_ellipsis(text, width);
    let pad = width.saturating_sub(display_width(&out));
    out.extend(std::iter::repeat(' ').take(pad));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wide_chars_count_double() {
        assert_eq!(display_width("日本"), 4);
        assert_eq!(truncate_to_width("日本語", 5), "日本");
    }

    #[test]
    fn ellipsis_only_when_needed() {
        assert_eq!(truncate_with_ellipsis("short", 18), "short");
        assert_eq!(truncate_with_ellipsis("abcdef", 4), "abc…");
        assert_eq!(truncate_with_ellipsis("abcdef", 1), "…");
        assert_eq!(truncate_with_ellipsis("abcdef", 0), "");
    }

    #[test]
    fn fit_left_pads_to_exact_width() {
        assert_eq!(fit_left("api", 6), "api   ");
        assert_eq!(display_width(&fit_left("a-very-long-project-name", NAME_WIDTH)), NAME_WIDTH);
        // wide chars next to the cut still give an exact fit
        assert_eq!(display_width(&fit_left("ab日本語", 5)), 5);
    }
}
