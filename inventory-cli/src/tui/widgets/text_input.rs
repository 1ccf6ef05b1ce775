use crossterm::event::KeyCode;

/// Cursor position within a single-line input, counted in characters
#[derive(Debug, Clone, Default)]
pub struct TextInputState {
    cursor: usize,
}

impl TextInputState {
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn set_cursor_to_end(&mut self, value: &str) {
        self.cursor = value.chars().count();
    }

    /// Apply an editing key to `value`.
    /// Returns the new value when it changed, None otherwise (cursor moves included).
    pub fn handle_key(&mut self, key: KeyCode, value: &str, max_length: Option<usize>) -> Option<String> {
        let mut chars: Vec<char> = value.chars().collect();
        self.cursor = self.cursor.min(chars.len());

        match key {
            KeyCode::Char(c) => {
                if max_length.is_some_and(|max| chars.len() >= max) {
                    return None;
                }
                chars.insert(self.cursor, c);
                self.cursor += 1;
            }
            KeyCode::Backspace => {
                if self.cursor == 0 {
                    return None;
                }
                self.cursor -= 1;
                chars.remove(self.cursor);
            }
            KeyCode::Delete => {
                if self.cursor >= chars.len() {
                    return None;
                }
                chars.remove(self.cursor);
            }
            KeyCode::Left => {
                self.cursor = self.cursor.saturating_sub(1);
                return None;
            }
            KeyCode::Right => {
                self.cursor = (self.cursor + 1).min(chars.len());
                return None;
            }
            KeyCode::Home => {
                self.cursor = 0;
                return None;
            }
            KeyCode::End => {
                self.cursor = chars.len();
                return None;
            }
            _ => return None,
        }

        Some(chars.into_iter().collect())
    }
}

/// Field that combines value + state for a text input
#[derive(Debug, Clone, Default)]
pub struct TextInputField {
    pub value: String,
    pub state: TextInputState,
}

impl TextInputField {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a key; returns true when the value changed
    pub fn handle_key(&mut self, key: KeyCode, max_length: Option<usize>) -> bool {
        match self.state.handle_key(key, &self.value, max_length) {
            Some(new_value) => {
                self.value = new_value;
                true
            }
            None => false,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Cursor is positioned at the end of the value
    pub fn set_value(&mut self, value: String) {
        self.value = value;
        self.state.set_cursor_to_end(&self.value);
    }

    pub fn clear(&mut self) {
        self.set_value(String::new());
    }
}
