use super::{App, ColorPickerState};
use std::io;
use std::path::PathBuf;

use ratatui::crossterm::event::{
    KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::layout::Rect;
use ratatui::style::Color;

use crate::theme::{Swatch, color_label, parse_hex_color};
use crate::types::{ColorTarget, MenuGroup, PromptMode};
use crate::util::{inside, names_directory, with_default_extension};

fn byte_index(value: &str, char_idx: usize) -> usize {
    value
        .char_indices()
        .nth(char_idx)
        .map_or(value.len(), |(i, _)| i)
}

fn left_click_outside(mouse: MouseEvent, rect: Rect) -> bool {
    matches!(mouse.kind, MouseEventKind::Down(MouseButton::Left))
        && !inside(mouse.column, mouse.row, rect)
}

impl App {
    pub(crate) fn handle_dialog_key(&mut self, key: KeyEvent) -> io::Result<()> {
        if matches!(
            key.code,
            KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')
        ) {
            self.dialog = None;
        }
        Ok(())
    }

    pub(crate) fn handle_prompt_key(&mut self, key: KeyEvent) -> io::Result<()> {
        let Some(prompt) = self.prompt.as_mut() else {
            return Ok(());
        };
        let len = prompt.value.chars().count();
        match (key.modifiers, key.code) {
            (_, KeyCode::Esc) => {
                self.prompt = None;
                self.set_status("Canceled");
            }
            (_, KeyCode::Enter) => {
                let value = prompt.value.trim().to_string();
                if value.is_empty() {
                    self.set_status("File name cannot be empty");
                    return Ok(());
                }
                let mode = prompt.mode;
                self.prompt = None;
                self.apply_prompt(mode, value);
            }
            (_, KeyCode::Backspace) => {
                if prompt.cursor > 0 {
                    let at = byte_index(&prompt.value, prompt.cursor - 1);
                    prompt.value.remove(at);
                    prompt.cursor -= 1;
                }
            }
            (_, KeyCode::Delete) => {
                if prompt.cursor < len {
                    let at = byte_index(&prompt.value, prompt.cursor);
                    prompt.value.remove(at);
                }
            }
            (_, KeyCode::Left) => prompt.cursor = prompt.cursor.saturating_sub(1),
            (_, KeyCode::Right) => prompt.cursor = (prompt.cursor + 1).min(len),
            (_, KeyCode::Home) => prompt.cursor = 0,
            (_, KeyCode::End) => prompt.cursor = len,
            (_, KeyCode::Char(c)) => {
                if !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
                    let at = byte_index(&prompt.value, prompt.cursor);
                    prompt.value.insert(at, c);
                    prompt.cursor += 1;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn apply_prompt(&mut self, mode: PromptMode, value: String) {
        let is_dir = names_directory(&value);
        let entered = PathBuf::from(value);
        match mode {
            PromptMode::Open => {
                // A directory goes to the reader unchanged and fails there.
                let path = if entered.is_file() || is_dir {
                    entered
                } else {
                    with_default_extension(entered)
                };
                self.open_file(path);
            }
            PromptMode::SaveAs if is_dir => {
                let err = io::Error::new(io::ErrorKind::IsADirectory, "a file name is required");
                self.report_io_error("Save failed", &entered, &err);
            }
            PromptMode::SaveAs => self.save_as(with_default_extension(entered)),
        }
    }

    pub(crate) fn open_menu(&mut self, group: MenuGroup) {
        self.menu.open = true;
        self.menu.group = group;
        self.menu.index = 0;
    }

    fn shift_menu_group(&mut self, forward: bool) {
        let groups = MenuGroup::all();
        let current = groups
            .iter()
            .position(|g| *g == self.menu.group)
            .unwrap_or(0);
        let next = if forward {
            (current + 1) % groups.len()
        } else {
            (current + groups.len() - 1) % groups.len()
        };
        self.open_menu(groups[next]);
    }

    pub(crate) fn handle_menu_key(&mut self, key: KeyEvent) -> io::Result<()> {
        let count = self.menu.group.commands().len();
        match key.code {
            KeyCode::Esc | KeyCode::F(10) => self.menu.open = false,
            KeyCode::Left => self.shift_menu_group(false),
            KeyCode::Right => self.shift_menu_group(true),
            KeyCode::Up => {
                self.menu.index = (self.menu.index + count - 1) % count;
            }
            KeyCode::Down => {
                self.menu.index = (self.menu.index + 1) % count;
            }
            KeyCode::Enter => {
                if let Some(command) = self.menu.group.commands().get(self.menu.index).copied() {
                    return self.run_command(command);
                }
            }
            _ => {}
        }
        Ok(())
    }

    pub(crate) fn handle_menu_mouse(&mut self, mouse: MouseEvent) -> io::Result<()> {
        if !matches!(mouse.kind, MouseEventKind::Down(MouseButton::Left)) {
            return Ok(());
        }
        if left_click_outside(mouse, self.menu.dropdown_rect) {
            self.menu.open = false;
            return Ok(());
        }
        let row = mouse
            .row
            .saturating_sub(self.menu.dropdown_rect.y.saturating_add(1)) as usize;
        if let Some(command) = self.menu.group.commands().get(row).copied() {
            self.menu.index = row;
            return self.run_command(command);
        }
        Ok(())
    }

    pub(crate) fn open_color_picker(&mut self, target: ColorTarget) {
        let mut picker = ColorPickerState {
            target,
            query: String::new(),
            results: Vec::new(),
            index: 0,
            offset: 0,
            rect: Rect::default(),
        };
        picker.results = self.filter_swatches(&picker.query);
        self.color_picker = Some(picker);
    }

    /// Palette swatches whose name contains `query`, led by a custom entry
    /// when the query is a valid hex color.
    pub(crate) fn filter_swatches(&self, query: &str) -> Vec<Swatch> {
        let q = query.trim().to_ascii_lowercase();
        let mut results = Vec::new();
        if let Some(color) = parse_hex_color(&q) {
            results.push(Swatch {
                name: format!("Custom {}", color_label(color)),
                color,
            });
        }
        results.extend(
            self.palette
                .iter()
                .filter(|s| q.is_empty() || s.name.to_ascii_lowercase().contains(&q))
                .cloned(),
        );
        results
    }

    fn refresh_color_results(&mut self) {
        let Some(query) = self.color_picker.as_ref().map(|p| p.query.clone()) else {
            return;
        };
        let results = self.filter_swatches(&query);
        if let Some(picker) = self.color_picker.as_mut() {
            picker.results = results;
            picker.index = 0;
            picker.offset = 0;
        }
    }

    pub(crate) fn apply_color(&mut self, target: ColorTarget, color: Color) {
        match target {
            ColorTarget::Text => self.formatting.fg = Some(color),
            ColorTarget::Background => self.formatting.bg = Some(color),
        }
        self.apply_formatting();
        let what = match target {
            ColorTarget::Text => "Text",
            ColorTarget::Background => "Background",
        };
        tracing::debug!(?target, color = color_label(color).as_str(), "formatting changed");
        self.set_status(format!("{what} color set to {}", color_label(color)));
    }

    fn choose_picked_color(&mut self) {
        let Some(picker) = self.color_picker.take() else {
            return;
        };
        match picker.results.get(picker.index) {
            Some(swatch) => self.apply_color(picker.target, swatch.color),
            None => self.set_status("No matching color"),
        }
    }

    pub(crate) fn handle_color_picker_key(&mut self, key: KeyEvent) -> io::Result<()> {
        let Some(picker) = self.color_picker.as_mut() else {
            return Ok(());
        };
        match key.code {
            KeyCode::Esc => {
                self.color_picker = None;
                self.set_status("Canceled");
            }
            KeyCode::Enter => self.choose_picked_color(),
            KeyCode::Up => picker.index = picker.index.saturating_sub(1),
            KeyCode::Down => {
                if picker.index + 1 < picker.results.len() {
                    picker.index += 1;
                }
            }
            KeyCode::Backspace => {
                picker.query.pop();
                self.refresh_color_results();
            }
            KeyCode::Char(c)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                picker.query.push(c);
                self.refresh_color_results();
            }
            _ => {}
        }
        Ok(())
    }

    pub(crate) fn handle_color_picker_mouse(&mut self, mouse: MouseEvent) -> io::Result<()> {
        let Some(picker) = self.color_picker.as_mut() else {
            return Ok(());
        };
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if !inside(mouse.column, mouse.row, picker.rect) {
                    self.color_picker = None;
                    self.set_status("Canceled");
                    return Ok(());
                }
                // Border and query line sit above the list, a border below it.
                let list_top = picker.rect.y.saturating_add(2);
                let list_bottom = picker.rect.bottom().saturating_sub(1);
                if mouse.row >= list_top && mouse.row < list_bottom {
                    let idx = picker.offset + (mouse.row - list_top) as usize;
                    if idx < picker.results.len() {
                        picker.index = idx;
                        self.choose_picked_color();
                    }
                }
            }
            MouseEventKind::ScrollDown => {
                if picker.index + 1 < picker.results.len() {
                    picker.index += 1;
                }
            }
            MouseEventKind::ScrollUp => picker.index = picker.index.saturating_sub(1),
            _ => {}
        }
        Ok(())
    }
}
