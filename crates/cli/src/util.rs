use unicode_width::UnicodeWidthStr;

/// Truncate a string to fit within `width` display columns, adding ".." if truncated.
/// Uses Unicode display width so wide glyphs stay aligned.
pub(crate) fn truncate_display(s: &str, width: usize) -> String {
    if UnicodeWidthStr::width(s) <= width {
        return s.to_string();
    }
    if width < 3 {
        return take_columns(s, width);
    }
    let mut out = take_columns(s, width - 2);
    out.push_str("..");
    out
}

/// Longest prefix of `s` that fits in `budget` display columns.
fn take_columns(s: &str, budget: usize) -> String {
    let mut used = 0;
    let mut out = String::new();
    for ch in s.chars() {
        let cw = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + cw > budget {
            break;
        }
        used += cw;
        out.push(ch);
    }
    out
}

/// Pad or truncate a string to exactly `width` display columns.
pub(crate) fn pad_right(s: &str, width: usize) -> String {
    let cell = truncate_display(s, width);
    let cw = UnicodeWidthStr::width(cell.as_str());
    format!("{}{}", cell, " ".repeat(width.saturating_sub(cw)))
}

/// Right-align a number-like cell within `width` columns.
pub(crate) fn pad_left(s: &str, width: usize) -> String {
    let sw = UnicodeWidthStr::width(s);
    if sw >= width {
        s.to_string()
    } else {
        format!("{}{}", " ".repeat(width - sw), s)
    }
}
