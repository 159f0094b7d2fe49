use std::path::{Path, PathBuf};

use ratatui::layout::Rect;
use unicode_width::UnicodeWidthChar;

pub(crate) const APP_NAME: &str = "AI Notepad";
pub(crate) const DEFAULT_EXTENSION: &str = "txt";
const TAB_WIDTH: usize = 4;

pub(crate) fn char_display_width(c: char) -> usize {
    if c == '\t' {
        TAB_WIDTH
    } else {
        c.width().unwrap_or(0)
    }
}

/// Splits `line` into char ranges no wider than `width` cells, breaking
/// after whitespace where possible. A space that would overflow stays on the
/// row it ends. Ranges are contiguous and cover the whole line.
pub(crate) fn wrap_segments_for_line(line: &str, width: usize) -> Vec<(usize, usize)> {
    let chars: Vec<char> = line.chars().collect();
    if width == 0 || chars.is_empty() {
        return vec![(0, chars.len())];
    }
    let mut segments = Vec::new();
    let mut start = 0;
    while start < chars.len() {
        let mut used = 0;
        let mut end = start;
        let mut last_break = None;
        while end < chars.len() {
            let c = chars[end];
            let w = char_display_width(c);
            if used + w > width && end > start {
                if c.is_whitespace() {
                    last_break = Some(end + 1);
                }
                break;
            }
            used += w;
            end += 1;
            if c.is_whitespace() {
                last_break = Some(end);
            }
        }
        if end < chars.len()
            && let Some(brk) = last_break
        {
            end = brk;
        }
        segments.push((start, end));
        start = end;
    }
    segments
}

pub(crate) fn text_to_lines(text: &str) -> Vec<String> {
    if text.is_empty() {
        return vec![String::new()];
    }
    let mut lines: Vec<String> = text.lines().map(ToString::to_string).collect();
    if text.ends_with('\n') {
        lines.push(String::new());
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

pub(crate) fn lines_to_text(lines: &[String]) -> String {
    lines.join("\n")
}

/// Appends `.txt` when the chosen name has no extension.
pub(crate) fn with_default_extension(path: PathBuf) -> PathBuf {
    if path.extension().is_some() || path.file_name().is_none() {
        path
    } else {
        path.with_extension(DEFAULT_EXTENSION)
    }
}

/// True when a typed path names a directory: it ends with a separator or
/// an existing directory is there.
pub(crate) fn names_directory(value: &str) -> bool {
    value.ends_with('/') || value.ends_with(std::path::MAIN_SEPARATOR) || Path::new(value).is_dir()
}

pub(crate) fn window_title(path: Option<&Path>) -> String {
    match path {
        Some(p) => format!("{} - {APP_NAME}", p.display()),
        None => format!("Untitled - {APP_NAME}"),
    }
}

/// `row` and `col` are the zero-based caret position.
pub(crate) fn caret_status(row: usize, col: usize) -> String {
    format!("Line: {} | Column: {}", row + 1, col)
}

pub(crate) fn inside(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x
        && x < rect.x.saturating_add(rect.width)
        && y >= rect.y
        && y < rect.y.saturating_add(rect.height)
}

pub(crate) fn to_u16_saturating(v: usize) -> u16 {
    u16::try_from(v).unwrap_or(u16::MAX)
}

#[cfg(test)]
mod utility_tests {
    use super::*;

    #[test]
    fn test_text_to_lines_empty() {
        assert_eq!(text_to_lines(""), vec![String::new()]);
    }

    #[test]
    fn test_text_to_lines_trailing_newline_keeps_empty_last_line() {
        assert_eq!(text_to_lines("a\nb\n"), vec!["a", "b", ""]);
    }

    #[test]
    fn test_lines_round_trip_text() {
        for text in ["", "one", "one\ntwo", "one\n", "\n\nx\n\n", "tab\tand  spaces "] {
            assert_eq!(lines_to_text(&text_to_lines(text)), text, "round trip of {text:?}");
        }
    }

    #[test]
    fn test_crlf_is_normalized() {
        assert_eq!(lines_to_text(&text_to_lines("a\r\nb\r\n")), "a\nb\n");
    }

    #[test]
    fn test_default_extension_only_when_missing() {
        assert_eq!(
            with_default_extension(PathBuf::from("/tmp/notes")),
            PathBuf::from("/tmp/notes.txt")
        );
        assert_eq!(
            with_default_extension(PathBuf::from("/tmp/notes.md")),
            PathBuf::from("/tmp/notes.md")
        );
        assert_eq!(with_default_extension(PathBuf::from("/")), PathBuf::from("/"));
    }

    #[test]
    fn test_title_uses_path_or_untitled() {
        assert_eq!(window_title(None), "Untitled - AI Notepad");
        assert_eq!(
            window_title(Some(Path::new("/tmp/a.txt"))),
            "/tmp/a.txt - AI Notepad"
        );
    }

    #[test]
    fn test_caret_status_is_one_based_line_zero_based_column() {
        assert_eq!(caret_status(0, 0), "Line: 1 | Column: 0");
        assert_eq!(caret_status(4, 7), "Line: 5 | Column: 7");
    }

    #[test]
    fn test_inside_excludes_far_edges() {
        let rect = Rect::new(2, 3, 4, 2);
        assert!(inside(2, 3, rect));
        assert!(inside(5, 4, rect));
        assert!(!inside(6, 4, rect));
        assert!(!inside(5, 5, rect));
    }

    #[test]
    fn test_wrap_breaks_after_whitespace() {
        assert_eq!(
            wrap_segments_for_line("aaaa bbbb cccc dddd", 10),
            vec![(0, 10), (10, 19)]
        );
        // The space that would overflow hangs on the row it ends.
        assert_eq!(wrap_segments_for_line("hello world", 5), vec![(0, 6), (6, 11)]);
    }

    #[test]
    fn test_wrap_splits_long_words_and_keeps_short_lines() {
        assert_eq!(
            wrap_segments_for_line("abcdefghij", 4),
            vec![(0, 4), (4, 8), (8, 10)]
        );
        assert_eq!(wrap_segments_for_line("short", 10), vec![(0, 5)]);
        assert_eq!(wrap_segments_for_line("", 10), vec![(0, 0)]);
        assert_eq!(wrap_segments_for_line("no width", 0), vec![(0, 8)]);
    }

    #[test]
    fn test_wrap_counts_tabs_and_wide_chars() {
        assert_eq!(wrap_segments_for_line("\tab", 5), vec![(0, 1), (1, 3)]);
        assert_eq!(wrap_segments_for_line("日本語", 4), vec![(0, 2), (2, 3)]);
    }

    #[test]
    fn test_trailing_separator_or_existing_dir_names_directory() {
        let tmp = tempfile::tempdir().expect("tempdir");
        assert!(names_directory(&tmp.path().display().to_string()));
        assert!(names_directory("not/there/"));
        assert!(!names_directory(&tmp.path().join("file").display().to_string()));
    }
}
