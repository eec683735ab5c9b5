use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// A keystroke the typing engine understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    Char(char),
    Backspace,
    /// Typed as a space
    Enter,
}

impl KeyInput {
    /// Maps a raw character; control characters other than line breaks are not input.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '\n' | '\r' => Some(KeyInput::Enter),
            '\u{8}' | '\u{7f}' => Some(KeyInput::Backspace),
            c if c.is_control() => None,
            c => Some(KeyInput::Char(c)),
        }
    }

    pub fn from_key_event(key: &KeyEvent) -> Option<Self> {
        if key.kind == KeyEventKind::Release {
            return None;
        }

        match key.code {
            KeyCode::Backspace => Some(KeyInput::Backspace),
            KeyCode::Enter => Some(KeyInput::Enter),
            KeyCode::Char(_)
                if key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                None
            }
            KeyCode::Char(c) => Self::from_char(c),
            _ => None,
        }
    }

    /// The character compared against the passage, if any
    pub fn as_char(self) -> Option<char> {
        match self {
            KeyInput::Char(c) => Some(c),
            KeyInput::Enter => Some(' '),
            KeyInput::Backspace => None,
        }
    }
}
