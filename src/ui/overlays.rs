use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Clear, List, ListItem, Paragraph};
use unicode_width::UnicodeWidthStr;

use crate::app::App;
use crate::keybinds::KeyAction;
use crate::theme::color_label;
use crate::types::DialogKind;
use crate::util::{to_u16_saturating, wrap_segments_for_line};

use super::helpers::{centered_box, centered_rect, list_item_style, themed_block};

pub(crate) fn render_menu_dropdown(app: &mut App, frame: &mut Frame<'_>) {
    let theme = app.theme.clone();
    let group = app.menu.group;
    let anchor = app
        .menu
        .bar_rects
        .iter()
        .find(|(g, _)| *g == group)
        .map(|(_, r)| *r)
        .unwrap_or_default();
    let rows: Vec<(&str, String)> = group
        .commands()
        .iter()
        .map(|cmd| {
            let shortcut = app
                .keybinds
                .display_for(KeyAction::for_command(*cmd))
                .unwrap_or_default();
            (cmd.label(), shortcut)
        })
        .collect();
    let label_w = rows.iter().map(|(l, _)| l.width()).max().unwrap_or(0);
    let key_w = rows.iter().map(|(_, k)| k.width()).max().unwrap_or(0);
    let inner_w = label_w + key_w + 4;
    let screen = frame.area();
    let width = to_u16_saturating(inner_w + 2).min(screen.width);
    let height = to_u16_saturating(rows.len() + 2).min(screen.height.saturating_sub(anchor.y + 1));
    let x = anchor.x.min(screen.width.saturating_sub(width));
    let area = Rect::new(x, anchor.y.saturating_add(1), width, height);
    app.menu.dropdown_rect = area;
    frame.render_widget(Clear, area);

    let items: Vec<ListItem> = rows
        .into_iter()
        .enumerate()
        .map(|(idx, (label, key))| {
            let gap = inner_w.saturating_sub(label.width() + key.width() + 2);
            let style = list_item_style(idx == app.menu.index, &theme);
            ListItem::new(Line::from(vec![
                Span::styled(format!(" {label}{} ", " ".repeat(gap)), style),
                Span::styled(key, style.add_modifier(Modifier::DIM)),
            ]))
        })
        .collect();
    frame.render_widget(List::new(items).block(themed_block(&theme)), area);
}

pub(crate) fn render_color_picker(app: &mut App, frame: &mut Frame<'_>) {
    let theme = app.theme.clone();
    let area = centered_rect(50, 60, frame.area());
    let Some(picker) = app.color_picker.as_mut() else {
        return;
    };
    picker.rect = area;
    let visible = area.height.saturating_sub(3) as usize;
    if picker.index < picker.offset {
        picker.offset = picker.index;
    } else if visible > 0 && picker.index >= picker.offset + visible {
        picker.offset = picker.index + 1 - visible;
    }
    frame.render_widget(Clear, area);

    let mut items: Vec<ListItem> = vec![ListItem::new(Line::from(vec![
        Span::styled("Color: ", Style::default().fg(theme.fg_muted)),
        Span::styled(picker.query.clone(), Style::default().fg(theme.fg)),
    ]))];
    if picker.results.is_empty() {
        items.push(ListItem::new(Line::from(Span::styled(
            "No matching colors (type #rrggbb for a custom one)",
            Style::default().fg(theme.fg_muted),
        ))));
    }
    items.extend(
        picker
            .results
            .iter()
            .enumerate()
            .skip(picker.offset)
            .take(visible)
            .map(|(idx, swatch)| {
                ListItem::new(Line::from(vec![
                    Span::styled("  ██  ", Style::default().fg(swatch.color)),
                    Span::styled(
                        format!("{} {}", swatch.name, color_label(swatch.color)),
                        list_item_style(idx == picker.index, &theme),
                    ),
                ]))
            }),
    );
    let title = format!("{} (Enter apply, Esc cancel)", picker.target.title());
    frame.render_widget(
        List::new(items).block(themed_block(&theme).title(title)),
        area,
    );
}

pub(crate) fn render_prompt(app: &mut App, frame: &mut Frame<'_>) {
    let Some(prompt) = app.prompt.as_ref() else {
        return;
    };
    let theme = app.theme.clone();
    let screen = frame.area();
    let area = centered_box(screen.width.saturating_mul(3) / 5, 3, screen);
    let title = format!("{} (.txt is added when no extension, Esc cancels)", prompt.title);
    let before: String = prompt.value.chars().take(prompt.cursor).collect();
    let cursor_x = area.x + 1 + to_u16_saturating(before.width());
    let input = Paragraph::new(prompt.value.clone()).block(
        themed_block(&theme)
            .title(title)
            .style(Style::default().bg(theme.bg_alt).fg(theme.fg)),
    );
    app.prompt_rect = area;
    frame.render_widget(Clear, area);
    frame.render_widget(input, area);
    if cursor_x < area.right().saturating_sub(1) {
        frame.set_cursor_position((cursor_x, area.y + 1));
    }
}

pub(crate) fn render_dialog(app: &mut App, frame: &mut Frame<'_>) {
    let Some(dialog) = app.dialog.as_ref() else {
        return;
    };
    let theme = &app.theme;
    let accent = match dialog.kind {
        DialogKind::Info => theme.accent,
        DialogKind::Warning => theme.warning,
        DialogKind::Error => theme.error,
    };
    let screen = frame.area();
    let text_w = dialog
        .message
        .lines()
        .map(UnicodeWidthStr::width)
        .max()
        .unwrap_or(0)
        .max(dialog.title.width() + 4)
        .max(20);
    let width = to_u16_saturating(text_w + 4).min(screen.width.saturating_sub(4).max(20));
    let inner_w = width.saturating_sub(4) as usize;

    // Wrapped here so the OK row is known before drawing.
    let mut message_rows: Vec<String> = Vec::new();
    for line in dialog.message.lines() {
        let chars: Vec<char> = line.chars().collect();
        for (start, end) in wrap_segments_for_line(line, inner_w) {
            message_rows.push(chars[start..end].iter().collect());
        }
    }
    if message_rows.is_empty() {
        message_rows.push(String::new());
    }
    let height = to_u16_saturating(message_rows.len() + 2 + 2);
    let area = centered_box(width, height, screen);
    let shown = (area.height as usize).saturating_sub(4).min(message_rows.len());

    let mut lines: Vec<Line> = message_rows
        .into_iter()
        .take(shown)
        .map(|l| Line::from(Span::styled(l, Style::default().fg(theme.fg))))
        .collect();
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "[ OK ]  Enter",
        Style::default().fg(accent).add_modifier(Modifier::BOLD),
    )));
    let body = Paragraph::new(lines).block(
        themed_block(theme)
            .title(Span::styled(
                format!(" {} ", dialog.title),
                Style::default().fg(accent).add_modifier(Modifier::BOLD),
            ))
            .border_style(Style::default().fg(accent)),
    );
    frame.render_widget(Clear, area);
    frame.render_widget(body, area);
    app.dialog_rect = area;
    app.dialog_ok_row = area.y + 1 + to_u16_saturating(shown + 1);
}
