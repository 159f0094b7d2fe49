use ratatui::style::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MenuGroup {
    File,
    Edit,
    Format,
    Ai,
    Help,
}

impl MenuGroup {
    pub(crate) fn all() -> [MenuGroup; 5] {
        [
            MenuGroup::File,
            MenuGroup::Edit,
            MenuGroup::Format,
            MenuGroup::Ai,
            MenuGroup::Help,
        ]
    }

    pub(crate) fn label(self) -> &'static str {
        match self {
            MenuGroup::File => "File",
            MenuGroup::Edit => "Edit",
            MenuGroup::Format => "Format",
            MenuGroup::Ai => "AI",
            MenuGroup::Help => "Help",
        }
    }

    pub(crate) fn commands(self) -> &'static [MenuCommand] {
        match self {
            MenuGroup::File => &[
                MenuCommand::New,
                MenuCommand::Open,
                MenuCommand::Save,
                MenuCommand::SaveAs,
                MenuCommand::Exit,
            ],
            MenuGroup::Edit => &[
                MenuCommand::Cut,
                MenuCommand::Copy,
                MenuCommand::Paste,
                MenuCommand::Undo,
                MenuCommand::Redo,
            ],
            MenuGroup::Format => &[
                MenuCommand::TextColor,
                MenuCommand::BackgroundColor,
                MenuCommand::WordWrap,
            ],
            MenuGroup::Ai => &[
                MenuCommand::Summarize,
                MenuCommand::FixGrammar,
                MenuCommand::GenerateContent,
            ],
            MenuGroup::Help => &[MenuCommand::About],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MenuCommand {
    New,
    Open,
    Save,
    SaveAs,
    Exit,
    Cut,
    Copy,
    Paste,
    Undo,
    Redo,
    SelectAll,
    TextColor,
    BackgroundColor,
    WordWrap,
    Summarize,
    FixGrammar,
    GenerateContent,
    About,
}

impl MenuCommand {
    pub(crate) fn label(self) -> &'static str {
        match self {
            MenuCommand::New => "New",
            MenuCommand::Open => "Open",
            MenuCommand::Save => "Save",
            MenuCommand::SaveAs => "Save As",
            MenuCommand::Exit => "Exit",
            MenuCommand::Cut => "Cut",
            MenuCommand::Copy => "Copy",
            MenuCommand::Paste => "Paste",
            MenuCommand::Undo => "Undo",
            MenuCommand::Redo => "Redo",
            MenuCommand::SelectAll => "Select All",
            MenuCommand::TextColor => "Text Color",
            MenuCommand::BackgroundColor => "Background Color",
            MenuCommand::WordWrap => "Word Wrap",
            MenuCommand::Summarize => "Summarize Text",
            MenuCommand::FixGrammar => "Fix Grammar",
            MenuCommand::GenerateContent => "Generate Content",
            MenuCommand::About => "About",
        }
    }

    pub(crate) fn assist_task(self) -> Option<AssistTask> {
        match self {
            MenuCommand::Summarize => Some(AssistTask::Summarize),
            MenuCommand::FixGrammar => Some(AssistTask::FixGrammar),
            MenuCommand::GenerateContent => Some(AssistTask::Generate),
            _ => None,
        }
    }

    /// Commands that rewrite the buffer wholesale; refused while a request is in flight.
    pub(crate) fn replaces_buffer(self) -> bool {
        matches!(
            self,
            MenuCommand::New
                | MenuCommand::Open
                | MenuCommand::Cut
                | MenuCommand::Paste
                | MenuCommand::Undo
                | MenuCommand::Redo
                | MenuCommand::Summarize
                | MenuCommand::FixGrammar
                | MenuCommand::GenerateContent
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AssistTask {
    Summarize,
    FixGrammar,
    Generate,
}

impl AssistTask {
    pub(crate) fn instruction(self) -> &'static str {
        match self {
            AssistTask::Summarize => "summarize",
            AssistTask::FixGrammar => "correct grammar",
            AssistTask::Generate => "generate continuation",
        }
    }

    pub(crate) fn progress_label(self) -> &'static str {
        match self {
            AssistTask::Summarize => "Summarizing",
            AssistTask::FixGrammar => "Fixing grammar",
            AssistTask::Generate => "Generating",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AssistState {
    Idle,
    Pending(AssistTask),
    Done(AssistTask),
    Failed(AssistTask),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DialogKind {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub(crate) struct Dialog {
    pub(crate) kind: DialogKind,
    pub(crate) title: String,
    pub(crate) message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PromptMode {
    Open,
    SaveAs,
}

#[derive(Debug, Clone)]
pub(crate) struct PromptState {
    pub(crate) title: String,
    pub(crate) value: String,
    pub(crate) cursor: usize,
    pub(crate) mode: PromptMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ColorTarget {
    Text,
    Background,
}

impl ColorTarget {
    pub(crate) fn title(self) -> &'static str {
        match self {
            ColorTarget::Text => "Choose text color",
            ColorTarget::Background => "Choose background color",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct Formatting {
    pub(crate) fg: Option<Color>,
    pub(crate) bg: Option<Color>,
}
