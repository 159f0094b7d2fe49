use super::App;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use ratatui_textarea::CursorMove;

use crate::types::{DialogKind, PromptMode, PromptState};
use crate::util::{
    char_display_width, inside, lines_to_text, text_to_lines, to_u16_saturating,
    wrap_segments_for_line,
};

/// Buffer contents around the last whole-buffer replacement.
pub(crate) struct Replacement {
    before: Vec<String>,
    after: Vec<String>,
    /// History entries the replacement pushed (delete and/or insert).
    steps: usize,
}

fn is_blank(lines: &[String]) -> bool {
    lines.iter().all(String::is_empty) && lines.len() <= 1
}

impl App {
    pub(crate) fn buffer_text(&self) -> String {
        lines_to_text(self.editor.lines())
    }

    /// Replaces the whole buffer as an undoable edit, caret at the start.
    pub(crate) fn replace_buffer(&mut self, lines: Vec<String>) {
        let before = self.editor.lines().to_vec();
        let text = lines_to_text(&lines);
        self.editor.select_all();
        self.editor.insert_str(&text);
        self.editor.cancel_selection();
        let steps = usize::from(!is_blank(&before)) + usize::from(!text.is_empty());
        self.last_replacement = (steps > 0).then(|| Replacement {
            before,
            after: self.editor.lines().to_vec(),
            steps,
        });
        self.editor.move_cursor(CursorMove::Top);
        self.editor.move_cursor(CursorMove::Head);
        self.scroll_row = 0;
        self.scroll_col = 0;
        self.drag_anchor = None;
        self.rebuild_visible_rows();
        self.update_caret_status();
    }

    /// Undo. A whole-buffer replacement is a delete plus an insert in the
    /// widget history; both are stepped over together.
    pub(crate) fn undo_edit(&mut self) -> bool {
        let steps = match &self.last_replacement {
            Some(r) if self.editor.lines() == r.after.as_slice() => r.steps,
            _ => 1,
        };
        let mut changed = false;
        for _ in 0..steps {
            changed |= self.editor.undo();
        }
        changed
    }

    pub(crate) fn redo_edit(&mut self) -> bool {
        let steps = match &self.last_replacement {
            Some(r) if self.editor.lines() == r.before.as_slice() => r.steps,
            _ => 1,
        };
        let mut changed = false;
        for _ in 0..steps {
            changed |= self.editor.redo();
        }
        changed
    }

    pub(crate) fn new_document(&mut self) {
        self.replace_buffer(vec![String::new()]);
        self.file_path = None;
        self.refresh_title();
        self.set_status("New document");
    }

    pub(crate) fn open_file_prompt(&mut self) {
        let value = self
            .file_path
            .as_ref()
            .and_then(|p| p.parent())
            .map(|dir| format!("{}/", dir.display()))
            .unwrap_or_default();
        self.open_prompt("Open file", value, PromptMode::Open);
    }

    pub(crate) fn save_as_prompt(&mut self) {
        let value = self
            .file_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        self.open_prompt("Save as", value, PromptMode::SaveAs);
    }

    fn open_prompt(&mut self, title: &str, value: String, mode: PromptMode) {
        let cursor = value.chars().count();
        self.prompt = Some(PromptState {
            title: title.to_string(),
            value,
            cursor,
            mode,
        });
    }

    /// Replaces the buffer with the file's contents. On failure the buffer and
    /// association are left alone and an error dialog is shown.
    pub(crate) fn open_file(&mut self, path: PathBuf) {
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) => {
                self.report_io_error("Open failed", &path, &err);
                return;
            }
        };
        let text = String::from_utf8_lossy(&bytes);
        self.replace_buffer(text_to_lines(&text));
        tracing::info!(path = %path.display(), bytes = bytes.len(), "opened file");
        self.set_status(format!("Opened {}", path.display()));
        self.file_path = Some(path);
        self.refresh_title();
    }

    /// Save: writes to the associated file, or falls through to Save As.
    pub(crate) fn save(&mut self) {
        let Some(path) = self.file_path.clone() else {
            self.save_as_prompt();
            return;
        };
        self.write_buffer_to(&path);
    }

    /// Associates the buffer with `path` and writes it there.
    pub(crate) fn save_as(&mut self, path: PathBuf) {
        self.file_path = Some(path.clone());
        self.refresh_title();
        self.write_buffer_to(&path);
    }

    fn write_buffer_to(&mut self, path: &Path) {
        let content = self.buffer_text();
        match fs::write(path, &content) {
            Ok(()) => {
                tracing::info!(path = %path.display(), bytes = content.len(), "saved file");
                self.set_status(format!("Saved {}", path.display()));
            }
            Err(err) => self.report_io_error("Save failed", path, &err),
        }
    }

    pub(crate) fn report_io_error(&mut self, title: &str, path: &Path, err: &io::Error) {
        tracing::error!(path = %path.display(), %err, "{title}");
        self.show_dialog(
            DialogKind::Error,
            title,
            format!("{}\n\n{err}", path.display()),
        );
        self.set_status(title);
    }

    pub(crate) fn copy_selection_to_clipboard(&mut self) {
        if self.editor.selection_range().is_none() {
            self.set_status("No selection to copy");
            return;
        }
        self.editor.copy();
        let copied = self.editor.yank_text();
        if copied.is_empty() {
            self.set_status("No selection to copy");
        } else if let Some(clipboard) = self.clipboard.as_mut() {
            match clipboard.set_text(copied) {
                Ok(()) => self.set_status("Copied"),
                Err(_) => self.set_status("Copied (internal clipboard only)"),
            }
        } else {
            self.set_status("Copied (internal clipboard only)");
        }
    }

    pub(crate) fn cut_selection_to_clipboard(&mut self) {
        if self.editor.selection_range().is_none() {
            self.set_status("No selection to cut");
            return;
        }
        self.editor.cut();
        let cut = self.editor.yank_text();
        if cut.is_empty() {
            self.set_status("No selection to cut");
        } else if let Some(clipboard) = self.clipboard.as_mut() {
            match clipboard.set_text(cut) {
                Ok(()) => self.set_status("Cut"),
                Err(_) => self.set_status("Cut (internal clipboard only)"),
            }
        } else {
            self.set_status("Cut (internal clipboard only)");
        }
    }

    pub(crate) fn paste_from_clipboard(&mut self) {
        let mut from_system = false;
        if let Some(clipboard) = self.clipboard.as_mut()
            && let Ok(text) = clipboard.get_text()
            && !text.is_empty()
        {
            self.editor.set_yank_text(text);
            from_system = true;
        }
        if self.editor.paste() {
            if from_system {
                self.set_status("Pasted");
            } else {
                self.set_status("Pasted (internal clipboard)");
            }
        } else {
            self.set_status("Clipboard empty");
        }
    }

    /// Bracketed paste from the terminal.
    pub(crate) fn handle_paste(&mut self, text: String) {
        if text.is_empty() {
            return;
        }
        if self.assist_pending() {
            self.set_status("AI request in progress. Press Esc to cancel it first.");
            return;
        }
        let text = text.replace("\r\n", "\n").replace('\r', "\n");
        if self.editor.insert_str(&text) {
            self.set_status("Pasted");
        }
        self.update_caret_status();
    }

    fn inner_size(&self) -> (usize, usize) {
        (
            self.editor_rect.width.saturating_sub(2) as usize,
            self.editor_rect.height.saturating_sub(2) as usize,
        )
    }

    /// Recomputes the screen rows: one per line, or one per wrapped segment
    /// when word wrap is on.
    pub(crate) fn rebuild_visible_rows(&mut self) {
        let (width, _) = self.inner_size();
        self.visible_rows_map.clear();
        self.visible_row_starts.clear();
        self.visible_row_ends.clear();
        for (row, line) in self.editor.lines().iter().enumerate() {
            let segments = if self.word_wrap {
                wrap_segments_for_line(line, width)
            } else {
                vec![(0, line.chars().count())]
            };
            for (start, end) in segments {
                self.visible_rows_map.push(row);
                self.visible_row_starts.push(start);
                self.visible_row_ends.push(end);
            }
        }
        if self.visible_rows_map.is_empty() {
            self.visible_rows_map.push(0);
            self.visible_row_starts.push(0);
            self.visible_row_ends.push(0);
        }
        let max_scroll = self.visible_rows_map.len() - 1;
        self.scroll_row = self.scroll_row.min(max_scroll);
    }

    /// Screen row holding `(row, col)`. A column on a segment boundary
    /// belongs to the later segment; the end of the line to the last one.
    pub(crate) fn visible_index_of_position(&self, row: usize, col: usize) -> usize {
        let mut fallback = None;
        for (idx, &r) in self.visible_rows_map.iter().enumerate() {
            if r != row {
                if r > row {
                    break;
                }
                continue;
            }
            let start = self.visible_row_starts[idx];
            let end = self.visible_row_ends[idx];
            if col >= start && col < end {
                return idx;
            }
            if col >= end || fallback.is_none() {
                fallback = Some(idx);
            }
        }
        fallback.unwrap_or_else(|| self.visible_rows_map.len().saturating_sub(1))
    }

    /// Line, segment start and segment end of screen row `idx`.
    pub(crate) fn visible_row(&self, idx: usize) -> (usize, usize, usize) {
        let idx = idx.min(self.visible_rows_map.len().saturating_sub(1));
        (
            self.visible_rows_map.get(idx).copied().unwrap_or(0),
            self.visible_row_starts.get(idx).copied().unwrap_or(0),
            self.visible_row_ends.get(idx).copied().unwrap_or(0),
        )
    }

    /// Display column of `col` within `row` measured from char `from`,
    /// counting tabs as four cells.
    pub(crate) fn display_width_between(&self, row: usize, from: usize, col: usize) -> usize {
        self.editor
            .lines()
            .get(row)
            .map(|line| {
                line.chars()
                    .skip(from)
                    .take(col.saturating_sub(from))
                    .map(char_display_width)
                    .sum()
            })
            .unwrap_or(0)
    }

    /// Keeps the caret inside the visible window.
    pub(crate) fn sync_editor_scroll(&mut self) {
        self.rebuild_visible_rows();
        let (width, height) = self.inner_size();
        let (row, col) = self.editor.cursor();
        let visible = self.visible_index_of_position(row, col);
        if height == 0 {
            self.scroll_row = 0;
        } else if visible < self.scroll_row {
            self.scroll_row = visible;
        } else if visible >= self.scroll_row + height {
            self.scroll_row = visible + 1 - height;
        }
        if self.word_wrap {
            self.scroll_col = 0;
            return;
        }
        if width == 0 {
            return;
        }
        let display = self.display_width_between(row, 0, col);
        if display < self.scroll_col {
            self.scroll_col = display;
        } else if display >= self.scroll_col + width {
            self.scroll_col = display + 1 - width;
        }
    }

    /// Moves the caret to screen row `target`, keeping its offset within the
    /// segment where the target segment allows it.
    fn jump_to_visible_row(&mut self, target: usize) {
        let (row, col) = self.editor.cursor();
        let current = self.visible_index_of_position(row, col);
        let (_, cur_start, _) = self.visible_row(current);
        let (target_row, start, end) = self.visible_row(target);
        let target_col = if self.word_wrap {
            let offset = col.saturating_sub(cur_start);
            let last = self.visible_index_of_position(target_row, usize::MAX);
            // Only the last segment of a line may hold the caret at its end.
            let limit = if target == last {
                end
            } else {
                end.saturating_sub(1).max(start)
            };
            (start + offset).min(limit)
        } else {
            col
        };
        self.editor.move_cursor(CursorMove::Jump(
            to_u16_saturating(target_row),
            to_u16_saturating(target_col),
        ));
    }

    /// Up/Down by screen row while wrapping.
    pub(crate) fn move_cursor_visual(&mut self, down: bool) {
        let (row, col) = self.editor.cursor();
        let current = self.visible_index_of_position(row, col);
        let target = if down {
            (current + 1).min(self.visible_rows_map.len().saturating_sub(1))
        } else {
            current.saturating_sub(1)
        };
        if target != current {
            self.jump_to_visible_row(target);
        }
    }

    /// Scrolls the view by `delta` screen rows, dragging the caret along
    /// when it would leave the viewport.
    pub(crate) fn scroll_view(&mut self, delta: isize) {
        let (_, height) = self.inner_size();
        let max_scroll = self.visible_rows_map.len().saturating_sub(1);
        self.scroll_row = self
            .scroll_row
            .saturating_add_signed(delta)
            .min(max_scroll);
        if height == 0 {
            return;
        }
        let (row, col) = self.editor.cursor();
        let current = self.visible_index_of_position(row, col);
        let target = current.clamp(self.scroll_row, self.scroll_row + height - 1);
        if target != current {
            self.jump_to_visible_row(target.min(max_scroll));
        }
    }

    pub(crate) fn page_move(&mut self, down: bool) {
        let (_, height) = self.inner_size();
        let step = height.max(1);
        let (row, col) = self.editor.cursor();
        let current = self.visible_index_of_position(row, col);
        let last = self.visible_rows_map.len().saturating_sub(1);
        let target = if down {
            (current + step).min(last)
        } else {
            current.saturating_sub(step)
        };
        self.jump_to_visible_row(target);
    }

    pub(crate) fn editor_pos_from_mouse(&self, x: u16, y: u16) -> Option<(usize, usize)> {
        if !inside(x, y, self.editor_rect) {
            return None;
        }
        let lines = self.editor.lines();
        if lines.is_empty() {
            return Some((0, 0));
        }
        let inner_x = x.saturating_sub(self.editor_rect.x.saturating_add(1)) as usize;
        let inner_y = y.saturating_sub(self.editor_rect.y.saturating_add(1)) as usize;
        let idx = (self.scroll_row + inner_y).min(self.visible_rows_map.len().saturating_sub(1));
        let (row, start, end) = self.visible_row(idx);
        let row = row.min(lines.len() - 1);
        let target_x = if self.word_wrap {
            inner_x
        } else {
            inner_x + self.scroll_col
        };
        let mut col = start;
        let mut width_acc = 0;
        for c in lines[row].chars().skip(start).take(end.saturating_sub(start)) {
            let cw = char_display_width(c);
            if width_acc + cw > target_x {
                break;
            }
            width_acc += cw;
            col += 1;
        }
        // A click past the end of a wrapped segment lands on its last char.
        let is_last = self.visible_index_of_position(row, usize::MAX) == idx;
        if col == end && end > start && !is_last {
            col = end - 1;
        }
        Some((row, col))
    }

    pub(crate) fn place_cursor_from_mouse(&mut self, x: u16, y: u16) {
        let Some((row, col)) = self.editor_pos_from_mouse(x, y) else {
            return;
        };
        self.editor.cancel_selection();
        self.editor.move_cursor(CursorMove::Jump(
            to_u16_saturating(row),
            to_u16_saturating(col),
        ));
        self.drag_anchor = Some((row, col));
    }

    pub(crate) fn extend_mouse_selection(&mut self, x: u16, y: u16) {
        if let (Some((anchor_row, anchor_col)), Some((row, col))) =
            (self.drag_anchor, self.editor_pos_from_mouse(x, y))
        {
            self.editor.move_cursor(CursorMove::Jump(
                to_u16_saturating(anchor_row),
                to_u16_saturating(anchor_col),
            ));
            self.editor.start_selection();
            self.editor.move_cursor(CursorMove::Jump(
                to_u16_saturating(row),
                to_u16_saturating(col),
            ));
        }
    }
}
