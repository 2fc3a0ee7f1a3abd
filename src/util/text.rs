//! Width and cursor math for terminal text. Server data and edit buffers
//! are treated as single-line strings; control characters are scrubbed
//! before any width calculation (see [`scrub`]).

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Display width in terminal cells.
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Replace control characters (tabs and newlines included) with single
/// spaces so one string is one screen line and width math stays honest.
pub fn scrub(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect()
}

/// Truncate to at most `max_cells` cells, appending `…` when something was
/// cut. Cuts on grapheme boundaries; a wide character that doesn't fit is
/// dropped whole.
pub fn truncate_to_width(s: &str, max_cells: usize) -> String {
    if max_cells == 0 {
        return String::new();
    }
    if display_width(s) <= max_cells {
        return s.to_string();
    }
    if max_cells == 1 {
        return "\u{2026}".to_string();
    }
    let budget = max_cells - 1;
    let mut used = 0;
    let mut out = String::new();
    for grapheme in s.graphemes(true) {
        let w = UnicodeWidthStr::width(grapheme);
        if used + w > budget {
            break;
        }
        used += w;
        out.push_str(grapheme);
    }
    out.push('\u{2026}');
    out
}

/// Truncate or pad with spaces to exactly `cells` cells. Card rows are
/// fixed-width; this keeps column borders aligned.
pub fn fit_to_width(s: &str, cells: usize) -> String {
    let mut out = truncate_to_width(s, cells);
    let mut width = display_width(&out);
    while width < cells {
        out.push(' ');
        width += 1;
    }
    out
}

/// Byte offset of the next grapheme boundary after `at`; None at the end.
pub fn next_boundary(s: &str, at: usize) -> Option<usize> {
    if at >= s.len() {
        return None;
    }
    match s[at..].grapheme_indices(true).nth(1) {
        Some((i, _)) => Some(at + i),
        None => Some(s.len()),
    }
}

/// Byte offset of the previous grapheme boundary before `at`; None at the
/// start.
pub fn prev_boundary(s: &str, at: usize) -> Option<usize> {
    if at == 0 {
        return None;
    }
    s[..at].grapheme_indices(true).last().map(|(i, _)| i)
}

/// Display column of a byte offset, for placing the terminal cursor.
pub fn col_at(s: &str, byte_offset: usize) -> usize {
    display_width(&s[..byte_offset.min(s.len())])
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── widths and scrubbing ───────────────────────────────────────

    #[test]
    fn width_counts_cells_not_bytes() {
        assert_eq!(display_width("hello"), 5);
        assert_eq!(display_width("você"), 4);
        assert_eq!(display_width("你好"), 4);
        assert_eq!(display_width("🎉"), 2);
        assert_eq!(display_width(""), 0);
    }

    #[test]
    fn scrub_flattens_control_characters() {
        assert_eq!(scrub("a\tb\nc"), "a b c");
        assert_eq!(scrub("plain"), "plain");
    }

    // ── truncate and fit ───────────────────────────────────────────

    #[test]
    fn truncate_leaves_short_strings_alone() {
        assert_eq!(truncate_to_width("hi", 10), "hi");
        assert_eq!(truncate_to_width("exact", 5), "exact");
    }

    #[test]
    fn truncate_reserves_a_cell_for_the_ellipsis() {
        assert_eq!(truncate_to_width("hello world", 8), "hello w\u{2026}");
        assert_eq!(truncate_to_width("hello", 1), "\u{2026}");
        assert_eq!(truncate_to_width("hello", 0), "");
    }

    #[test]
    fn truncate_never_splits_a_wide_character() {
        // Budget 4 → "你" (2) fits, "好" (2) would exceed 3, so it drops.
        let out = truncate_to_width("你好世界", 4);
        assert_eq!(out, "你\u{2026}");
        assert!(display_width(&out) <= 4);
    }

    #[test]
    fn fit_pads_to_exact_width() {
        assert_eq!(fit_to_width("ab", 4), "ab  ");
        assert_eq!(fit_to_width("abcdef", 4), "abc\u{2026}");
        assert_eq!(display_width(&fit_to_width("你好世界", 5)), 5);
    }

    // ── cursor boundaries ──────────────────────────────────────────

    #[test]
    fn boundaries_step_over_graphemes() {
        let s = "a🎉b";
        assert_eq!(next_boundary(s, 0), Some(1));
        assert_eq!(next_boundary(s, 1), Some(5));
        assert_eq!(next_boundary(s, 5), Some(6));
        assert_eq!(next_boundary(s, 6), None);

        assert_eq!(prev_boundary(s, 6), Some(5));
        assert_eq!(prev_boundary(s, 5), Some(1));
        assert_eq!(prev_boundary(s, 1), Some(0));
        assert_eq!(prev_boundary(s, 0), None);
    }

    #[test]
    fn combining_marks_stay_attached() {
        let s = "cafe\u{0301}!";
        // é spans bytes 3..6; the cursor never lands inside it.
        assert_eq!(next_boundary(s, 3), Some(6));
        assert_eq!(prev_boundary(s, 6), Some(3));
    }

    #[test]
    fn col_tracks_wide_characters() {
        assert_eq!(col_at("hello", 3), 3);
        assert_eq!(col_at("你好", 3), 2);
        assert_eq!(col_at("你好", 6), 4);
        assert_eq!(col_at("hi", 99), 2);
    }
}
