use std::collections::HashMap;
use std::fs;

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::{Deserialize, Serialize};

use crate::config::config_dir;
use crate::types::MenuCommand;

const KEYBINDS_FILE: &str = "keybinds.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum KeyAction {
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
    Menu,
}

impl KeyAction {
    pub(crate) fn all() -> &'static [KeyAction] {
        &[
            KeyAction::New,
            KeyAction::Open,
            KeyAction::Save,
            KeyAction::SaveAs,
            KeyAction::Exit,
            KeyAction::Cut,
            KeyAction::Copy,
            KeyAction::Paste,
            KeyAction::Undo,
            KeyAction::Redo,
            KeyAction::SelectAll,
            KeyAction::TextColor,
            KeyAction::BackgroundColor,
            KeyAction::WordWrap,
            KeyAction::Summarize,
            KeyAction::FixGrammar,
            KeyAction::GenerateContent,
            KeyAction::About,
            KeyAction::Menu,
        ]
    }

    /// The menu command this action runs; `None` for actions that only open UI.
    pub(crate) fn command(self) -> Option<MenuCommand> {
        Some(match self {
            KeyAction::New => MenuCommand::New,
            KeyAction::Open => MenuCommand::Open,
            KeyAction::Save => MenuCommand::Save,
            KeyAction::SaveAs => MenuCommand::SaveAs,
            KeyAction::Exit => MenuCommand::Exit,
            KeyAction::Cut => MenuCommand::Cut,
            KeyAction::Copy => MenuCommand::Copy,
            KeyAction::Paste => MenuCommand::Paste,
            KeyAction::Undo => MenuCommand::Undo,
            KeyAction::Redo => MenuCommand::Redo,
            KeyAction::SelectAll => MenuCommand::SelectAll,
            KeyAction::TextColor => MenuCommand::TextColor,
            KeyAction::BackgroundColor => MenuCommand::BackgroundColor,
            KeyAction::WordWrap => MenuCommand::WordWrap,
            KeyAction::Summarize => MenuCommand::Summarize,
            KeyAction::FixGrammar => MenuCommand::FixGrammar,
            KeyAction::GenerateContent => MenuCommand::GenerateContent,
            KeyAction::About => MenuCommand::About,
            KeyAction::Menu => return None,
        })
    }

    pub(crate) fn for_command(command: MenuCommand) -> KeyAction {
        match command {
            MenuCommand::New => KeyAction::New,
            MenuCommand::Open => KeyAction::Open,
            MenuCommand::Save => KeyAction::Save,
            MenuCommand::SaveAs => KeyAction::SaveAs,
            MenuCommand::Exit => KeyAction::Exit,
            MenuCommand::Cut => KeyAction::Cut,
            MenuCommand::Copy => KeyAction::Copy,
            MenuCommand::Paste => KeyAction::Paste,
            MenuCommand::Undo => KeyAction::Undo,
            MenuCommand::Redo => KeyAction::Redo,
            MenuCommand::SelectAll => KeyAction::SelectAll,
            MenuCommand::TextColor => KeyAction::TextColor,
            MenuCommand::BackgroundColor => KeyAction::BackgroundColor,
            MenuCommand::WordWrap => KeyAction::WordWrap,
            MenuCommand::Summarize => KeyAction::Summarize,
            MenuCommand::FixGrammar => KeyAction::FixGrammar,
            MenuCommand::GenerateContent => KeyAction::GenerateContent,
            MenuCommand::About => KeyAction::About,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct KeyBind {
    pub(crate) modifiers: KeyModifiers,
    pub(crate) code: KeyCode,
}

impl KeyBind {
    /// Folds terminal quirks into one canonical form: control characters
    /// become their letter, and uppercase letters become lowercase + SHIFT.
    pub(crate) fn normalize(code: KeyCode, modifiers: KeyModifiers) -> (KeyCode, KeyModifiers) {
        match code {
            KeyCode::Char(c)
                if modifiers.contains(KeyModifiers::CONTROL) && (1..=26).contains(&(c as u32)) =>
            {
                let letter = (b'a' + (c as u8) - 1) as char;
                (KeyCode::Char(letter), modifiers)
            }
            KeyCode::Char(c) if c.is_ascii_uppercase() => {
                (KeyCode::Char(c.to_ascii_lowercase()), modifiers | KeyModifiers::SHIFT)
            }
            KeyCode::BackTab => (KeyCode::BackTab, modifiers | KeyModifiers::SHIFT),
            other => (other, modifiers),
        }
    }

    pub(crate) fn parse(s: &str) -> Option<KeyBind> {
        let parts: Vec<&str> = s.split('+').collect();
        let mut modifiers = KeyModifiers::NONE;
        for &part in &parts[..parts.len() - 1] {
            match part.to_ascii_lowercase().as_str() {
                "ctrl" => modifiers |= KeyModifiers::CONTROL,
                "shift" => modifiers |= KeyModifiers::SHIFT,
                "alt" => modifiers |= KeyModifiers::ALT,
                _ => return None,
            }
        }
        let lower = parts.last()?.to_ascii_lowercase();
        let code = match lower.as_str() {
            "space" => KeyCode::Char(' '),
            "esc" | "escape" => KeyCode::Esc,
            "enter" | "return" => KeyCode::Enter,
            "tab" => KeyCode::Tab,
            "backtab" => KeyCode::BackTab,
            "backspace" => KeyCode::Backspace,
            "delete" | "del" => KeyCode::Delete,
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            "home" => KeyCode::Home,
            "end" => KeyCode::End,
            "pageup" => KeyCode::PageUp,
            "pagedown" => KeyCode::PageDown,
            f if f.len() > 1 && f.starts_with('f') => {
                let n: u8 = f[1..].parse().ok()?;
                if !(1..=12).contains(&n) {
                    return None;
                }
                KeyCode::F(n)
            }
            _ => {
                let mut chars = lower.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => KeyCode::Char(c),
                    _ => return None,
                }
            }
        };
        Some(KeyBind { modifiers, code })
    }

    fn key_name(&self) -> String {
        match self.code {
            KeyCode::Char(' ') => "Space".to_string(),
            KeyCode::Char(c) => c.to_ascii_uppercase().to_string(),
            KeyCode::F(n) => format!("F{n}"),
            KeyCode::Esc => "Esc".to_string(),
            KeyCode::Enter => "Enter".to_string(),
            KeyCode::Tab => "Tab".to_string(),
            KeyCode::BackTab => "BackTab".to_string(),
            KeyCode::Backspace => "Backspace".to_string(),
            KeyCode::Delete => "Delete".to_string(),
            KeyCode::Up => "Up".to_string(),
            KeyCode::Down => "Down".to_string(),
            KeyCode::Left => "Left".to_string(),
            KeyCode::Right => "Right".to_string(),
            KeyCode::Home => "Home".to_string(),
            KeyCode::End => "End".to_string(),
            KeyCode::PageUp => "PageUp".to_string(),
            KeyCode::PageDown => "PageDown".to_string(),
            _ => "?".to_string(),
        }
    }

    pub(crate) fn display(&self) -> String {
        let mut parts = Vec::new();
        if self.modifiers.contains(KeyModifiers::CONTROL) {
            parts.push("Ctrl".to_string());
        }
        if self.modifiers.contains(KeyModifiers::SHIFT) {
            parts.push("Shift".to_string());
        }
        if self.modifiers.contains(KeyModifiers::ALT) {
            parts.push("Alt".to_string());
        }
        parts.push(self.key_name());
        parts.join("+")
    }

    pub(crate) fn matches_exact(&self, key: &KeyEvent) -> bool {
        Self::normalize(self.code, self.modifiers) == Self::normalize(key.code, key.modifiers)
    }

    /// Like `matches_exact`, but a binding without SHIFT also accepts a
    /// shifted letter (caps lock, or terminals that report SHIFT spuriously).
    pub(crate) fn matches(&self, key: &KeyEvent) -> bool {
        if self.matches_exact(key) {
            return true;
        }
        let (bind_code, bind_mods) = Self::normalize(self.code, self.modifiers);
        let (ev_code, ev_mods) = Self::normalize(key.code, key.modifiers);
        matches!(bind_code, KeyCode::Char(_))
            && !bind_mods.contains(KeyModifiers::SHIFT)
            && bind_code == ev_code
            && ev_mods - KeyModifiers::SHIFT == bind_mods
    }
}

#[derive(Debug, Clone)]
pub(crate) struct KeyBindings {
    pub(crate) map: HashMap<KeyAction, Vec<KeyBind>>,
}

impl KeyBindings {
    pub(crate) fn defaults() -> Self {
        let mut map: HashMap<KeyAction, Vec<KeyBind>> = HashMap::new();
        let mut bind = |action: KeyAction, s: &str| {
            map.entry(action)
                .or_default()
                .push(KeyBind::parse(s).expect("invalid default keybind"));
        };

        bind(KeyAction::New, "ctrl+n");
        bind(KeyAction::Open, "ctrl+o");
        bind(KeyAction::Save, "ctrl+s");
        bind(KeyAction::SaveAs, "ctrl+shift+s");
        bind(KeyAction::SaveAs, "f12");
        bind(KeyAction::Exit, "ctrl+q");
        bind(KeyAction::Cut, "ctrl+x");
        bind(KeyAction::Copy, "ctrl+c");
        bind(KeyAction::Paste, "ctrl+v");
        bind(KeyAction::Undo, "ctrl+z");
        bind(KeyAction::Redo, "ctrl+y");
        bind(KeyAction::Redo, "ctrl+shift+z");
        bind(KeyAction::SelectAll, "ctrl+a");
        bind(KeyAction::TextColor, "alt+t");
        bind(KeyAction::BackgroundColor, "alt+b");
        bind(KeyAction::WordWrap, "alt+z");
        bind(KeyAction::Summarize, "alt+s");
        bind(KeyAction::FixGrammar, "alt+g");
        bind(KeyAction::GenerateContent, "alt+c");
        bind(KeyAction::About, "f1");
        bind(KeyAction::Menu, "f10");

        KeyBindings { map }
    }

    /// Exact matches win over shift-relaxed ones, so `ctrl+shift+s` reaches
    /// Save As even though Save is bound to `ctrl+s`.
    pub(crate) fn lookup(&self, key: &KeyEvent) -> Option<KeyAction> {
        let find = |pred: &dyn Fn(&KeyBind) -> bool| {
            KeyAction::all().iter().copied().find(|action| {
                self.map
                    .get(action)
                    .is_some_and(|binds| binds.iter().any(|b| pred(b)))
            })
        };
        find(&|b: &KeyBind| b.matches_exact(key)).or_else(|| find(&|b: &KeyBind| b.matches(key)))
    }

    pub(crate) fn display_for(&self, action: KeyAction) -> Option<String> {
        self.map
            .get(&action)
            .and_then(|v| v.first())
            .map(|b| b.display())
    }

    #[cfg(test)]
    pub(crate) fn conflicts(&self) -> Vec<(KeyBind, KeyAction, KeyAction)> {
        let mut result = Vec::new();
        let actions = KeyAction::all();
        for (i, a1) in actions.iter().enumerate() {
            for a2 in actions.iter().skip(i + 1) {
                if let (Some(binds1), Some(binds2)) = (self.map.get(a1), self.map.get(a2)) {
                    for b1 in binds1 {
                        for b2 in binds2 {
                            let (code, modifiers) = KeyBind::normalize(b2.code, b2.modifiers);
                            if b1.matches_exact(&KeyEvent::new(code, modifiers)) {
                                result.push((b1.clone(), *a1, *a2));
                            }
                        }
                    }
                }
            }
        }
        result
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum SingleOrVec {
    Single(String),
    Multiple(Vec<String>),
}

pub(crate) fn parse_key_action_name(name: &str) -> Option<KeyAction> {
    serde_json::from_value::<KeyAction>(serde_json::Value::String(name.to_string())).ok()
}

pub(crate) fn apply_keybinding_overrides(
    kb: &mut KeyBindings,
    overrides: HashMap<String, SingleOrVec>,
    source: &str,
) {
    for (action_name, val) in overrides {
        let Some(action) = parse_key_action_name(&action_name) else {
            tracing::warn!(action = action_name.as_str(), source, "unknown key action");
            continue;
        };
        let strings = match val {
            SingleOrVec::Single(s) => vec![s],
            SingleOrVec::Multiple(v) => v,
        };
        if strings.is_empty() {
            kb.map.insert(action, Vec::new());
            continue;
        }
        let mut binds = Vec::new();
        let mut invalid = Vec::new();
        for s in strings {
            if let Some(parsed) = KeyBind::parse(&s) {
                binds.push(parsed);
            } else {
                invalid.push(s);
            }
        }
        if !invalid.is_empty() {
            tracing::warn!(
                action = action_name.as_str(),
                source,
                invalid = invalid.join(", ").as_str(),
                "invalid keybinds"
            );
        }
        if !binds.is_empty() {
            kb.map.insert(action, binds);
        }
    }
}

pub(crate) fn parse_overrides(raw: &str, source: &str) -> HashMap<String, SingleOrVec> {
    let mut overrides = HashMap::new();
    let Ok(root) = serde_json::from_str::<serde_json::Value>(raw) else {
        tracing::warn!(source, "invalid keybinds json");
        return overrides;
    };
    let Some(obj) = root.as_object() else {
        tracing::warn!(source, "invalid keybinds json: expected object");
        return overrides;
    };
    for (action_name, value) in obj {
        match serde_json::from_value::<SingleOrVec>(value.clone()) {
            Ok(parsed) => {
                overrides.insert(action_name.clone(), parsed);
            }
            Err(_) => tracing::warn!(
                action = action_name.as_str(),
                source,
                "expected string or array of strings"
            ),
        }
    }
    overrides
}

pub(crate) fn load_keybindings() -> KeyBindings {
    let mut kb = KeyBindings::defaults();
    let Some(path) = config_dir().map(|dir| dir.join(KEYBINDS_FILE)) else {
        return kb;
    };
    let Ok(raw) = fs::read_to_string(&path) else {
        return kb;
    };
    let source = path.display().to_string();
    let overrides = parse_overrides(&raw, &source);
    apply_keybinding_overrides(&mut kb, overrides, &source);
    kb
}
