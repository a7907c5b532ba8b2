use crossterm::event::KeyCode;
use crossterm::event::KeyModifiers;
use ratatui::style::Stylize;
use ratatui::text::Span;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct KeyBinding {
    key: KeyCode,
    modifiers: KeyModifiers,
}

impl KeyBinding {
    pub(crate) const fn new(key: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { key, modifiers }
    }
}

pub(crate) const fn plain(key: KeyCode) -> KeyBinding {
    KeyBinding::new(key, KeyModifiers::NONE)
}

pub(crate) const fn ctrl(key: KeyCode) -> KeyBinding {
    KeyBinding::new(key, KeyModifiers::CONTROL)
}

pub(crate) const fn shift(key: KeyCode) -> KeyBinding {
    KeyBinding::new(key, KeyModifiers::SHIFT)
}

fn modifiers_prefix(modifiers: KeyModifiers) -> String {
    let mut prefix = String::new();
    if modifiers.contains(KeyModifiers::CONTROL) {
        prefix.push_str("ctrl + ");
    }
    if modifiers.contains(KeyModifiers::SHIFT) {
        prefix.push_str("shift + ");
    }
    if modifiers.contains(KeyModifiers::ALT) {
        prefix.push_str("alt + ");
    }
    prefix
}

fn key_label(key: KeyCode) -> String {
    match key {
        KeyCode::Enter => "enter".to_string(),
        KeyCode::PageUp => "pgup".to_string(),
        KeyCode::PageDown => "pgdn".to_string(),
        KeyCode::Char(ch) => ch.to_ascii_lowercase().to_string(),
        other => other.to_string().to_ascii_lowercase(),
    }
}

impl From<KeyBinding> for Span<'static> {
    fn from(binding: KeyBinding) -> Self {
        format!("{}{}", modifiers_prefix(binding.modifiers), key_label(binding.key))
            .dim()
            .bold()
    }
}
