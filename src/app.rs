use std::path::PathBuf;
use std::sync::Arc;

use arboard::Clipboard;
use ratatui::layout::Rect;
use ratatui_textarea::TextArea;

use crate::ai::CompletionBackend;
use crate::keybinds::KeyBindings;
use crate::theme::{Swatch, Theme};
use crate::types::{AssistState, ColorTarget, Dialog, Formatting, MenuGroup, PromptState};

mod assist;
mod core;
mod editor;
mod input;
mod input_handlers;

pub(crate) use assist::AssistJob;
pub(crate) use editor::Replacement;

pub(crate) struct MenuState {
    pub(crate) open: bool,
    pub(crate) group: MenuGroup,
    pub(crate) index: usize,
    pub(crate) bar_rects: Vec<(MenuGroup, Rect)>,
    pub(crate) dropdown_rect: Rect,
}

pub(crate) struct ColorPickerState {
    pub(crate) target: ColorTarget,
    pub(crate) query: String,
    pub(crate) results: Vec<Swatch>,
    pub(crate) index: usize,
    pub(crate) offset: usize,
    pub(crate) rect: Rect,
}

pub(crate) struct App {
    pub(crate) editor: TextArea<'static>,
    pub(crate) file_path: Option<PathBuf>,
    pub(crate) formatting: Formatting,
    pub(crate) title: String,
    pub(crate) status: String,
    pub(crate) caret_status: String,
    pub(crate) quit: bool,
    pub(crate) theme: Theme,
    pub(crate) keybinds: KeyBindings,
    pub(crate) clipboard: Option<Clipboard>,
    pub(crate) menu: MenuState,
    pub(crate) prompt: Option<PromptState>,
    pub(crate) prompt_rect: Rect,
    pub(crate) palette: Vec<Swatch>,
    pub(crate) color_picker: Option<ColorPickerState>,
    pub(crate) dialog: Option<Dialog>,
    pub(crate) dialog_rect: Rect,
    pub(crate) dialog_ok_row: u16,
    pub(crate) editor_rect: Rect,
    pub(crate) word_wrap: bool,
    /// Source line shown on each screen row, with its char range.
    pub(crate) visible_rows_map: Vec<usize>,
    pub(crate) visible_row_starts: Vec<usize>,
    pub(crate) visible_row_ends: Vec<usize>,
    /// First visible screen row, an index into `visible_rows_map`.
    pub(crate) scroll_row: usize,
    pub(crate) scroll_col: usize,
    pub(crate) drag_anchor: Option<(usize, usize)>,
    pub(crate) last_replacement: Option<Replacement>,
    pub(crate) backend: Arc<dyn CompletionBackend>,
    pub(crate) model: String,
    pub(crate) assist_state: AssistState,
    pub(crate) assist_job: Option<AssistJob>,
}
