mod helpers;
mod overlays;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use unicode_width::UnicodeWidthStr;

use crate::app::App;
use crate::types::MenuGroup;
use crate::util::to_u16_saturating;
use helpers::visible_line_spans;
use overlays::*;

pub(crate) fn draw(app: &mut App, frame: &mut Frame<'_>) {
    let theme = app.theme.clone();
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(frame.area());

    render_menu_bar(app, frame, vertical[0]);

    app.editor_rect = vertical[1];
    app.sync_editor_scroll();
    let text_style = app.text_style();
    let block = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(
            format!(" {} ", app.title),
            Style::default().fg(theme.accent),
        ))
        .border_style(Style::default().fg(theme.border))
        .style(text_style);
    let inner = block.inner(vertical[1]);
    frame.render_widget(block, vertical[1]);

    let width = inner.width as usize;
    let height = inner.height as usize;
    let selected_style = text_style.bg(theme.selection);
    let selection = app.editor.selection_range();
    let lines = app.editor.lines();
    let lines_out: Vec<Line> = (app.scroll_row..app.scroll_row + height)
        .filter_map(|idx| {
            let row = *app.visible_rows_map.get(idx)?;
            let start = app.visible_row_starts[idx];
            let end = app.visible_row_ends[idx];
            let segment: String = lines
                .get(row)?
                .chars()
                .skip(start)
                .take(end.saturating_sub(start))
                .collect();
            Some(Line::from(visible_line_spans(
                &segment,
                (row, start),
                app.scroll_col,
                width,
                text_style,
                selected_style,
                selection,
            )))
        })
        .collect();
    frame.render_widget(Paragraph::new(lines_out).style(text_style), inner);

    let overlay_open = app.dialog.is_some() || app.prompt.is_some() || app.color_picker.is_some();
    if !overlay_open {
        let (row, col) = app.editor.cursor();
        let visible = app.visible_index_of_position(row, col);
        let (_, start, _) = app.visible_row(visible);
        let x = app
            .display_width_between(row, start, col)
            .saturating_sub(app.scroll_col);
        // A trailing space that hangs past the wrap edge keeps the caret on the edge.
        let x = if app.word_wrap {
            x.min(width.saturating_sub(1))
        } else {
            x
        };
        let y = visible.saturating_sub(app.scroll_row);
        if x < width && visible >= app.scroll_row && y < height {
            frame.set_cursor_position((
                inner.x.saturating_add(to_u16_saturating(x)),
                inner.y.saturating_add(to_u16_saturating(y)),
            ));
        }
    }

    render_status_bar(app, frame, vertical[2]);

    if app.menu.open {
        render_menu_dropdown(app, frame);
    }
    if app.color_picker.is_some() {
        render_color_picker(app, frame);
    }
    if app.prompt.is_some() {
        render_prompt(app, frame);
    }
    if app.dialog.is_some() {
        render_dialog(app, frame);
    }
}

fn render_menu_bar(app: &mut App, frame: &mut Frame<'_>, area: Rect) {
    let theme = &app.theme;
    let mut spans = Vec::new();
    let mut rects = Vec::new();
    let mut x = area.x;
    for group in MenuGroup::all() {
        let label = format!(" {} ", group.label());
        let w = to_u16_saturating(label.width());
        let style = if app.menu.open && app.menu.group == group {
            Style::default()
                .fg(theme.bg)
                .bg(theme.accent)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.fg)
        };
        rects.push((group, Rect::new(x, area.y, w, 1)));
        spans.push(Span::styled(label, style));
        x = x.saturating_add(w);
    }
    frame.render_widget(
        Paragraph::new(Line::from(spans)).style(Style::default().bg(theme.bg_alt)),
        area,
    );
    app.menu.bar_rects = rects;
}

fn render_status_bar(app: &App, frame: &mut Frame<'_>, area: Rect) {
    let theme = &app.theme;
    let mut right = app.caret_status.clone();
    if let Some(job) = app.assist_job.as_ref() {
        right = format!(
            "{} {}s | {right}",
            job.task.progress_label(),
            job.started.elapsed().as_secs()
        );
    }
    let right_w = right.width();
    let left_w = (area.width as usize).saturating_sub(right_w + 1);
    let mut left: String = String::new();
    let mut used = 0;
    for c in app.status.chars() {
        let cw = unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
        if used + cw > left_w {
            break;
        }
        used += cw;
        left.push(c);
    }
    let pad = (area.width as usize).saturating_sub(used + right_w);
    let line = Line::from(vec![
        Span::styled(left, Style::default().fg(theme.fg)),
        Span::raw(" ".repeat(pad)),
        Span::styled(right, Style::default().fg(theme.accent)),
    ]);
    frame.render_widget(
        Paragraph::new(line).style(Style::default().bg(theme.bg_alt)),
        area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::test_support::{CountingBackend, new_app};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn render(app: &mut App, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).expect("terminal");
        terminal.draw(|frame| draw(app, frame)).expect("draw");
        let buffer = terminal.backend().buffer().clone();
        let mut out = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                out.push_str(buffer[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn test_draws_title_menu_and_status() {
        let mut app = new_app(CountingBackend::ok("unused"));
        let screen = render(&mut app, 60, 10);
        assert!(screen.contains("Untitled - AI Notepad"));
        assert!(screen.contains(" File  Edit  Format  AI  Help "));
        assert!(screen.contains("Line: 1 | Column: 0"));
        assert_eq!(app.menu.bar_rects.len(), 5);
        assert_eq!(app.editor_rect, Rect::new(0, 1, 60, 8));
    }

    #[test]
    fn test_draws_dropdown_and_records_its_rect() {
        let mut app = new_app(CountingBackend::ok("unused"));
        app.open_menu(MenuGroup::File);
        let screen = render(&mut app, 60, 12);
        assert!(screen.contains("Save As"));
        assert!(screen.contains("Ctrl+Shift+S"));
        assert_eq!(app.menu.dropdown_rect.y, 1);
    }

    #[test]
    fn test_draws_dialog_message() {
        let mut app = new_app(CountingBackend::ok("unused"));
        app.start_assist(crate::types::AssistTask::Summarize);
        let screen = render(&mut app, 60, 12);
        assert!(screen.contains("Text area is empty."));
        assert!(app.dialog_rect.width > 0);
    }

    fn row_of(screen: &str, needle: &str) -> Option<u16> {
        screen
            .lines()
            .position(|line| line.contains(needle))
            .map(|row| row as u16)
    }

    fn click(app: &mut App, column: u16, row: u16) {
        use ratatui::crossterm::event::{KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
        app.handle_mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
        .expect("mouse");
    }

    #[test]
    fn test_clicking_dialog_ok_line_closes_it() {
        let mut app = new_app(CountingBackend::ok("unused"));
        app.show_dialog(crate::types::DialogKind::Info, "About", "line one\nline two");
        let screen = render(&mut app, 60, 16);
        let ok_row = row_of(&screen, "[ OK ]").expect("ok line drawn");
        assert_eq!(app.dialog_ok_row, ok_row);
        // The blank row under the OK line does nothing.
        let x = app.dialog_rect.x + 3;
        click(&mut app, x, ok_row + 1);
        assert!(app.dialog.is_some());
        let x = app.dialog_rect.x + 3;
        click(&mut app, x, ok_row);
        assert!(app.dialog.is_none());
    }

    #[test]
    fn test_long_dialog_message_wraps_inside_the_box() {
        let mut app = new_app(CountingBackend::ok("unused"));
        let message = "word ".repeat(40);
        app.show_dialog(crate::types::DialogKind::Error, "Error", message.trim_end());
        let screen = render(&mut app, 40, 20);
        let ok_row = row_of(&screen, "[ OK ]").expect("ok line drawn");
        assert!(ok_row < app.dialog_rect.bottom() - 1);
        assert_eq!(app.dialog_ok_row, ok_row);
        let word_rows = screen.lines().filter(|l| l.contains("word")).count();
        assert!(word_rows > 1);
    }

    #[test]
    fn test_long_line_wraps_in_editor() {
        let mut app = new_app(CountingBackend::ok("unused"));
        app.replace_buffer(vec!["alpha beta gamma delta epsilon".to_string()]);
        let screen = render(&mut app, 20, 8);
        let first = row_of(&screen, "alpha beta gamma").expect("first row");
        let second = row_of(&screen, "delta epsilon").expect("second row");
        assert_eq!(second, first + 1);
    }
}
