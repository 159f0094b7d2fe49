use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::Span;
use ratatui::widgets::{Block, Borders};

use crate::util::char_display_width;
use crate::theme::Theme;

pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

/// A `width` x `height` box centered in `area`, shrunk to fit.
pub(crate) fn centered_box(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

pub(crate) fn list_item_style(selected: bool, theme: &Theme) -> Style {
    if selected {
        Style::default()
            .fg(theme.bg)
            .bg(theme.accent)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.fg)
    }
}

pub(crate) fn themed_block(theme: &Theme) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .style(Style::default().bg(theme.bg_alt))
        .border_style(Style::default().fg(theme.accent))
}

type Selection = ((usize, usize), (usize, usize));

fn in_selection(selection: Option<Selection>, row: usize, col: usize) -> bool {
    selection.is_some_and(|(start, end)| (row, col) >= start && (row, col) < end)
}

/// Renders the part of `text` that falls in display columns
/// `scroll_col..scroll_col + width`. `text` starts at char `origin.1` of
/// line `origin.0`, which places it against the selection. Tabs expand to
/// spaces and wide characters cut by the left edge are padded.
pub(crate) fn visible_line_spans(
    text: &str,
    origin: (usize, usize),
    scroll_col: usize,
    width: usize,
    base: Style,
    selected: Style,
    selection: Option<Selection>,
) -> Vec<Span<'static>> {
    let end_col = scroll_col + width;
    let mut cells: Vec<(char, Style)> = Vec::new();
    let mut x = 0usize;
    let (row, first_col) = origin;
    for (idx, c) in text.chars().enumerate() {
        if x >= end_col {
            break;
        }
        let w = char_display_width(c);
        let style = if in_selection(selection, row, first_col + idx) {
            selected
        } else {
            base
        };
        let next = x + w;
        if next > scroll_col {
            let shown_from = x.max(scroll_col);
            let shown_to = next.min(end_col);
            if c == '\t' || shown_from != x || shown_to != next {
                cells.extend(std::iter::repeat_n((' ', style), shown_to - shown_from));
            } else {
                cells.push((c, style));
            }
        }
        x = next;
    }

    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut current = String::new();
    let mut current_style = base;
    for (c, style) in cells {
        if style != current_style && !current.is_empty() {
            spans.push(Span::styled(std::mem::take(&mut current), current_style));
        }
        current_style = style;
        current.push(c);
    }
    if !current.is_empty() {
        spans.push(Span::styled(current, current_style));
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::Color;

    fn text(spans: &[Span<'_>]) -> String {
        spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_centered_box_fits_inside_area() {
        let area = Rect::new(0, 0, 20, 10);
        assert_eq!(centered_box(10, 4, area), Rect::new(5, 3, 10, 4));
        assert_eq!(centered_box(40, 40, area), area);
    }

    #[test]
    fn test_tabs_expand_and_line_is_clipped() {
        let spans = visible_line_spans(
            "a\tbcdef",
            (0, 0),
            0,
            7,
            Style::default(),
            Style::default(),
            None,
        );
        assert_eq!(text(&spans), "a    bc");
    }

    #[test]
    fn test_horizontal_scroll_skips_leading_cells() {
        let spans = visible_line_spans(
            "hello world",
            (0, 0),
            6,
            10,
            Style::default(),
            Style::default(),
            None,
        );
        assert_eq!(text(&spans), "world");
    }

    #[test]
    fn test_wide_char_cut_by_scroll_is_padded() {
        let spans = visible_line_spans("日本", (0, 0), 1, 4, Style::default(), Style::default(), None);
        assert_eq!(text(&spans), " 本");
    }

    #[test]
    fn test_selection_splits_spans() {
        let base = Style::default().fg(Color::White);
        let selected = Style::default().bg(Color::Blue);
        let spans = visible_line_spans(
            "abcdef",
            (2, 0),
            0,
            10,
            base,
            selected,
            Some(((2, 1), (2, 3))),
        );
        assert_eq!(spans.len(), 3);
        assert_eq!(spans[1].content.as_ref(), "bc");
        assert_eq!(spans[1].style, selected);
        assert_eq!(spans[2].style, base);
    }

    #[test]
    fn test_multi_line_selection_covers_middle_rows() {
        let base = Style::default();
        let selected = Style::default().bg(Color::Blue);
        let spans = visible_line_spans("mid", (1, 0), 0, 10, base, selected, Some(((0, 2), (2, 1))));
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].style, selected);
    }
}
