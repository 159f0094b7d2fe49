use super::{App, MenuState};
use std::io;
use std::sync::Arc;

use arboard::Clipboard;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui_textarea::TextArea;

use crate::ai::CompletionBackend;
use crate::config::{AiConfig, config_dir};
use crate::keybinds::load_keybindings;
use crate::theme::{Theme, load_palettes};
use crate::types::{AssistState, ColorTarget, Dialog, DialogKind, MenuCommand, MenuGroup};
use crate::util::{caret_status, window_title};

pub(crate) const ABOUT_TEXT: &str = "AI Interactive Notepad\nDeveloped with OpenAI";

impl App {
    pub(crate) fn new(config: &AiConfig, backend: Arc<dyn CompletionBackend>) -> Self {
        let palette_dir = config_dir().map(|dir| dir.join("palettes"));
        let mut app = Self {
            editor: TextArea::default(),
            file_path: None,
            formatting: Default::default(),
            title: window_title(None),
            status: String::new(),
            caret_status: caret_status(0, 0),
            quit: false,
            theme: Theme::default(),
            keybinds: load_keybindings(),
            clipboard: Clipboard::new().ok(),
            menu: MenuState {
                open: false,
                group: MenuGroup::File,
                index: 0,
                bar_rects: Vec::new(),
                dropdown_rect: Rect::default(),
            },
            prompt: None,
            prompt_rect: Rect::default(),
            palette: load_palettes(palette_dir.as_deref()),
            color_picker: None,
            dialog: None,
            dialog_rect: Rect::default(),
            dialog_ok_row: 0,
            editor_rect: Rect::default(),
            word_wrap: true,
            visible_rows_map: vec![0],
            visible_row_starts: vec![0],
            visible_row_ends: vec![0],
            scroll_row: 0,
            scroll_col: 0,
            drag_anchor: None,
            last_replacement: None,
            backend,
            model: config.model.clone(),
            assist_state: AssistState::Idle,
            assist_job: None,
        };
        app.apply_formatting();
        app.status = if config.api_key.is_some() {
            "F10 opens the menu".to_string()
        } else {
            "F10 opens the menu | no API key set, AI commands will fail".to_string()
        };
        app
    }

    pub(crate) fn set_status(&mut self, msg: impl Into<String>) {
        self.status = msg.into();
    }

    pub(crate) fn show_dialog(
        &mut self,
        kind: DialogKind,
        title: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.dialog = Some(Dialog {
            kind,
            title: title.into(),
            message: message.into(),
        });
    }

    pub(crate) fn refresh_title(&mut self) {
        self.title = window_title(self.file_path.as_deref());
    }

    pub(crate) fn update_caret_status(&mut self) {
        let (row, col) = self.editor.cursor();
        self.caret_status = caret_status(row, col);
    }

    /// Applies the formatting colors to the whole editor uniformly.
    pub(crate) fn apply_formatting(&mut self) {
        let mut style = Style::default();
        if let Some(fg) = self.formatting.fg {
            style = style.fg(fg);
        }
        if let Some(bg) = self.formatting.bg {
            style = style.bg(bg);
        }
        self.editor.set_style(style);
        self.editor.set_cursor_line_style(Style::default());
        self.editor
            .set_selection_style(Style::default().bg(self.theme.selection));
    }

    pub(crate) fn toggle_word_wrap(&mut self) {
        self.word_wrap = !self.word_wrap;
        self.scroll_col = 0;
        self.rebuild_visible_rows();
        self.sync_editor_scroll();
        if self.word_wrap {
            self.set_status("Word wrap on");
        } else {
            self.set_status("Word wrap off");
        }
    }

    pub(crate) fn text_style(&self) -> Style {
        Style::default()
            .fg(self.formatting.fg.unwrap_or(self.theme.fg))
            .bg(self.formatting.bg.unwrap_or(self.theme.bg))
    }

    /// Runs one menu command. File-system failures are reported through a
    /// dialog by the handlers themselves; the returned error covers the rest.
    pub(crate) fn run_command(&mut self, command: MenuCommand) -> io::Result<()> {
        self.menu.open = false;
        if self.assist_pending() && command.replaces_buffer() {
            self.set_status("AI request in progress. Press Esc to cancel it first.");
            return Ok(());
        }
        tracing::debug!(?command, "run command");
        match command {
            MenuCommand::New => self.new_document(),
            MenuCommand::Open => self.open_file_prompt(),
            MenuCommand::Save => self.save(),
            MenuCommand::SaveAs => self.save_as_prompt(),
            MenuCommand::Exit => self.quit = true,
            MenuCommand::Cut => self.cut_selection_to_clipboard(),
            MenuCommand::Copy => self.copy_selection_to_clipboard(),
            MenuCommand::Paste => self.paste_from_clipboard(),
            MenuCommand::Undo => {
                if self.undo_edit() {
                    self.set_status("Undo");
                } else {
                    self.set_status("Nothing to undo");
                }
            }
            MenuCommand::Redo => {
                if self.redo_edit() {
                    self.set_status("Redo");
                } else {
                    self.set_status("Nothing to redo");
                }
            }
            MenuCommand::SelectAll => {
                self.editor.select_all();
                self.set_status("Selected all");
            }
            MenuCommand::TextColor => self.open_color_picker(ColorTarget::Text),
            MenuCommand::BackgroundColor => self.open_color_picker(ColorTarget::Background),
            MenuCommand::WordWrap => self.toggle_word_wrap(),
            MenuCommand::Summarize | MenuCommand::FixGrammar | MenuCommand::GenerateContent => {
                if let Some(task) = command.assist_task() {
                    self.start_assist(task);
                }
            }
            MenuCommand::About => self.show_dialog(DialogKind::Info, "About", ABOUT_TEXT),
        }
        Ok(())
    }
}
