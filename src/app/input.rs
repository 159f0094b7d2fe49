use super::App;
use std::io;

use ratatui::crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui_textarea::Input;

use crate::types::MenuGroup;
use crate::util::inside;

impl App {
    const SCROLL_LINES: isize = 3;

    pub(crate) fn handle_key(&mut self, key: KeyEvent) -> io::Result<()> {
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }
        let result = self.dispatch_key(key);
        self.sync_editor_scroll();
        self.update_caret_status();
        result
    }

    fn dispatch_key(&mut self, key: KeyEvent) -> io::Result<()> {
        if self.dialog.is_some() {
            return self.handle_dialog_key(key);
        }
        if self.prompt.is_some() {
            return self.handle_prompt_key(key);
        }
        if self.color_picker.is_some() {
            return self.handle_color_picker_key(key);
        }
        if self.menu.open {
            return self.handle_menu_key(key);
        }

        if let Some(action) = self.keybinds.lookup(&key) {
            return match action.command() {
                Some(command) => self.run_command(command),
                None => {
                    self.open_menu(MenuGroup::File);
                    Ok(())
                }
            };
        }

        // Menu mnemonics
        if key.modifiers == KeyModifiers::ALT
            && let KeyCode::Char(c) = key.code
            && let Some(group) = menu_group_for_mnemonic(c)
        {
            self.open_menu(group);
            return Ok(());
        }

        if key.code == KeyCode::Esc {
            if self.assist_pending() {
                self.cancel_assist();
            }
            return Ok(());
        }

        self.handle_editor_key(key)
    }

    fn handle_editor_key(&mut self, key: KeyEvent) -> io::Result<()> {
        if self.assist_pending() && !is_navigation(key.code) {
            self.set_status("AI request in progress. Press Esc to cancel it first.");
            return Ok(());
        }
        let plain = key.modifiers == KeyModifiers::NONE;
        match key.code {
            KeyCode::PageDown => self.page_move(true),
            KeyCode::PageUp => self.page_move(false),
            KeyCode::Down if plain && self.word_wrap => self.move_cursor_visual(true),
            KeyCode::Up if plain && self.word_wrap => self.move_cursor_visual(false),
            _ => {
                self.editor.input(Input::from(key));
            }
        }
        Ok(())
    }

    pub(crate) fn handle_mouse(&mut self, mouse: MouseEvent) -> io::Result<()> {
        let result = self.dispatch_mouse(mouse);
        if !matches!(
            mouse.kind,
            MouseEventKind::ScrollDown | MouseEventKind::ScrollUp
        ) {
            self.sync_editor_scroll();
        }
        self.update_caret_status();
        result
    }

    fn dispatch_mouse(&mut self, mouse: MouseEvent) -> io::Result<()> {
        let left_down = matches!(mouse.kind, MouseEventKind::Down(MouseButton::Left));

        if self.dialog.is_some() {
            // Dismissed by the OK row or a click outside the box.
            let outside = !inside(mouse.column, mouse.row, self.dialog_rect);
            if left_down && (outside || mouse.row == self.dialog_ok_row)
            {
                self.dialog = None;
            }
            return Ok(());
        }

        if self.prompt.is_some() {
            if left_down {
                if inside(mouse.column, mouse.row, self.prompt_rect) {
                    let inner_x = mouse.column.saturating_sub(self.prompt_rect.x + 1) as usize;
                    if let Some(prompt) = self.prompt.as_mut() {
                        prompt.cursor = inner_x.min(prompt.value.chars().count());
                    }
                } else {
                    self.prompt = None;
                    self.set_status("Canceled");
                }
            }
            return Ok(());
        }

        if self.color_picker.is_some() {
            return self.handle_color_picker_mouse(mouse);
        }

        if left_down
            && let Some(group) = self
                .menu
                .bar_rects
                .iter()
                .find(|(_, rect)| inside(mouse.column, mouse.row, *rect))
                .map(|(group, _)| *group)
        {
            if self.menu.open && self.menu.group == group {
                self.menu.open = false;
            } else {
                self.open_menu(group);
            }
            return Ok(());
        }

        if self.menu.open {
            return self.handle_menu_mouse(mouse);
        }

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.place_cursor_from_mouse(mouse.column, mouse.row);
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                self.extend_mouse_selection(mouse.column, mouse.row);
            }
            MouseEventKind::Up(MouseButton::Left) => {
                self.drag_anchor = None;
            }
            MouseEventKind::ScrollDown if inside(mouse.column, mouse.row, self.editor_rect) => {
                self.scroll_view(Self::SCROLL_LINES);
            }
            MouseEventKind::ScrollUp if inside(mouse.column, mouse.row, self.editor_rect) => {
                self.scroll_view(-Self::SCROLL_LINES);
            }
            _ => {}
        }
        Ok(())
    }
}

fn menu_group_for_mnemonic(c: char) -> Option<MenuGroup> {
    match c.to_ascii_lowercase() {
        'f' => Some(MenuGroup::File),
        'e' => Some(MenuGroup::Edit),
        'o' => Some(MenuGroup::Format),
        'a' => Some(MenuGroup::Ai),
        'h' => Some(MenuGroup::Help),
        _ => None,
    }
}

fn is_navigation(code: KeyCode) -> bool {
    matches!(
        code,
        KeyCode::Up
            | KeyCode::Down
            | KeyCode::Left
            | KeyCode::Right
            | KeyCode::Home
            | KeyCode::End
            | KeyCode::PageUp
            | KeyCode::PageDown
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::test_support::{CountingBackend, new_app, wait_for_assist};
    use crate::types::{AssistState, DialogKind, PromptMode};
    use ratatui::crossterm::event::KeyEventState;
    use ratatui::layout::Rect;
    use std::fs;
    use std::time::Duration;
    use tempfile::tempdir;

    fn press(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
        app.handle_key(KeyEvent::new(code, modifiers)).expect("key");
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            let code = if c == '\n' {
                KeyCode::Enter
            } else {
                KeyCode::Char(c)
            };
            press(app, code, KeyModifiers::NONE);
        }
    }

    fn click(app: &mut App, column: u16, row: u16) {
        app.handle_mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
        .expect("mouse");
    }

    #[test]
    fn test_caret_status_tracks_typing() {
        let mut app = new_app(CountingBackend::ok("unused"));
        assert_eq!(app.caret_status, "Line: 1 | Column: 0");
        type_text(&mut app, "ab\ncde");
        assert_eq!(app.caret_status, "Line: 2 | Column: 3");
        press(&mut app, KeyCode::Up, KeyModifiers::NONE);
        assert_eq!(app.caret_status, "Line: 1 | Column: 2");
    }

    #[test]
    fn test_release_events_are_ignored() {
        let mut app = new_app(CountingBackend::ok("unused"));
        let mut key = KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE);
        key.kind = KeyEventKind::Release;
        key.state = KeyEventState::NONE;
        app.handle_key(key).expect("key");
        assert_eq!(app.buffer_text(), "");
    }

    #[test]
    fn test_hello_world_save_new_open_end_to_end() {
        let tmp = tempdir().expect("tempdir");
        let path = tmp.path().join("a.txt");
        let mut app = new_app(CountingBackend::ok("unused"));

        press(&mut app, KeyCode::Char('n'), KeyModifiers::CONTROL);
        type_text(&mut app, "Hello world");
        press(&mut app, KeyCode::Char('s'), KeyModifiers::CONTROL | KeyModifiers::SHIFT);
        assert_eq!(app.prompt.as_ref().map(|p| p.mode), Some(PromptMode::SaveAs));
        type_text(&mut app, &tmp.path().join("a").display().to_string());
        press(&mut app, KeyCode::Enter, KeyModifiers::NONE);

        assert_eq!(fs::read_to_string(&path).expect("read"), "Hello world");
        assert_eq!(app.buffer_text(), "Hello world");
        assert_eq!(app.title, format!("{} - AI Notepad", path.display()));

        press(&mut app, KeyCode::Char('n'), KeyModifiers::CONTROL);
        assert_eq!(app.buffer_text(), "");
        assert_eq!(app.title, "Untitled - AI Notepad");

        press(&mut app, KeyCode::Char('o'), KeyModifiers::CONTROL);
        type_text(&mut app, &path.display().to_string());
        press(&mut app, KeyCode::Enter, KeyModifiers::NONE);
        assert_eq!(app.buffer_text(), "Hello world");
        assert_eq!(app.file_path.as_deref(), Some(path.as_path()));
    }

    #[test]
    fn test_menu_navigation_runs_about() {
        let mut app = new_app(CountingBackend::ok("unused"));
        press(&mut app, KeyCode::F(10), KeyModifiers::NONE);
        assert!(app.menu.open);
        assert_eq!(app.menu.group, MenuGroup::File);
        press(&mut app, KeyCode::Left, KeyModifiers::NONE);
        assert_eq!(app.menu.group, MenuGroup::Help);
        press(&mut app, KeyCode::Enter, KeyModifiers::NONE);
        assert!(!app.menu.open);
        let dialog = app.dialog.as_ref().expect("about dialog");
        assert_eq!(dialog.kind, DialogKind::Info);
        assert_eq!(dialog.message, "AI Interactive Notepad\nDeveloped with OpenAI");
        press(&mut app, KeyCode::Enter, KeyModifiers::NONE);
        assert!(app.dialog.is_none());
    }

    #[test]
    fn test_alt_mnemonic_opens_group() {
        let mut app = new_app(CountingBackend::ok("unused"));
        press(&mut app, KeyCode::Char('a'), KeyModifiers::ALT);
        assert!(app.menu.open);
        assert_eq!(app.menu.group, MenuGroup::Ai);
        press(&mut app, KeyCode::Esc, KeyModifiers::NONE);
        assert!(!app.menu.open);
    }

    #[test]
    fn test_ai_shortcut_on_empty_buffer_warns() {
        let backend = CountingBackend::ok("unused");
        let mut app = new_app(backend.clone());
        press(&mut app, KeyCode::Char('s'), KeyModifiers::ALT);
        assert_eq!(backend.calls(), 0);
        assert_eq!(app.dialog.as_ref().map(|d| d.kind), Some(DialogKind::Warning));
    }

    #[test]
    fn test_typing_is_refused_and_esc_cancels_while_pending() {
        let backend = CountingBackend::ok("reply").with_delay(Duration::from_millis(150));
        let mut app = new_app(backend);
        type_text(&mut app, "draft");
        press(&mut app, KeyCode::Char('g'), KeyModifiers::ALT);
        assert!(app.assist_pending());
        type_text(&mut app, "xyz");
        assert_eq!(app.buffer_text(), "draft");
        press(&mut app, KeyCode::Left, KeyModifiers::NONE);
        assert_eq!(app.caret_status, "Line: 1 | Column: 4");
        press(&mut app, KeyCode::Esc, KeyModifiers::NONE);
        assert_eq!(app.assist_state, AssistState::Idle);
        std::thread::sleep(Duration::from_millis(300));
        wait_for_assist(&mut app);
        assert_eq!(app.buffer_text(), "draft");
    }

    #[test]
    fn test_clicking_menu_bar_and_item() {
        let mut app = new_app(CountingBackend::ok("unused"));
        app.menu.bar_rects = vec![(MenuGroup::File, Rect::new(0, 0, 6, 1))];
        click(&mut app, 2, 0);
        assert!(app.menu.open);
        // The dropdown is drawn by the renderer; fake its placement.
        app.menu.dropdown_rect = Rect::new(0, 1, 20, 7);
        click(&mut app, 3, 2);
        assert!(!app.menu.open);
        assert!(app.buffer_text().is_empty());
        assert_eq!(app.status, "New document");
    }

    #[test]
    fn test_clicking_editor_moves_caret() {
        let mut app = new_app(CountingBackend::ok("unused"));
        app.editor_rect = Rect::new(0, 1, 40, 10);
        type_text(&mut app, "one\ntwo three");
        click(&mut app, 4, 3);
        assert_eq!(app.caret_status, "Line: 2 | Column: 3");
    }

    #[test]
    fn test_up_and_down_follow_wrapped_rows() {
        let mut app = new_app(CountingBackend::ok("unused"));
        app.editor_rect = Rect::new(0, 1, 12, 6);
        type_text(&mut app, "aaaa bbbb cccc dddd");
        assert_eq!(app.caret_status, "Line: 1 | Column: 19");
        press(&mut app, KeyCode::Up, KeyModifiers::NONE);
        assert_eq!(app.caret_status, "Line: 1 | Column: 9");
        press(&mut app, KeyCode::Down, KeyModifiers::NONE);
        assert_eq!(app.caret_status, "Line: 1 | Column: 19");
    }

    #[test]
    fn test_word_wrap_shortcut_toggles_mode() {
        let mut app = new_app(CountingBackend::ok("unused"));
        assert!(app.word_wrap);
        press(&mut app, KeyCode::Char('z'), KeyModifiers::ALT);
        assert!(!app.word_wrap);
        assert_eq!(app.status, "Word wrap off");
    }
}
