//! Single-line text input used when editing a field's value.

/// Converts a character index to a byte position within a string.
///
/// Returns `s.len()` if `char_idx` is at or past the end of the string.
pub fn char_to_byte_pos(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(pos, _)| pos)
        .unwrap_or(s.len())
}

/// A text buffer with a cursor counted in characters.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextInput {
    buffer: String,
    cursor_pos: usize,
}

impl TextInput {
    /// Creates a new empty `TextInput`.
    ///
    /// ```
    /// # use mycnf::tui::text_input::TextInput;
    /// let input = TextInput::new();
    /// assert_eq!(input.get_text(), "");
    /// assert_eq!(input.cursor_pos(), 0);
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a character at the cursor and advances it.
    pub fn insert_char(&mut self, c: char) {
        let byte_pos = char_to_byte_pos(&self.buffer, self.cursor_pos);
        self.buffer.insert(byte_pos, c);
        self.cursor_pos += 1;
    }

    /// Deletes the character before the cursor (backspace).
    ///
    /// ```
    /// # use mycnf::tui::text_input::TextInput;
    /// let mut input = TextInput::new();
    /// input.set_text("256K");
    /// input.backspace();
    /// assert_eq!(input.get_text(), "256");
    /// ```
    pub fn backspace(&mut self) {
        if self.cursor_pos > 0 {
            self.cursor_pos -= 1;
            let byte_pos = char_to_byte_pos(&self.buffer, self.cursor_pos);
            self.buffer.remove(byte_pos);
        }
    }

    /// Deletes the character at the cursor (delete key).
    pub fn delete(&mut self) {
        if self.cursor_pos < self.buffer.chars().count() {
            let byte_pos = char_to_byte_pos(&self.buffer, self.cursor_pos);
            self.buffer.remove(byte_pos);
        }
    }

    /// Replaces the text and moves the cursor to the end.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.buffer = text.into();
        self.cursor_pos = self.buffer.chars().count();
    }

    /// The current text.
    pub fn get_text(&self) -> &str {
        &self.buffer
    }

    /// The cursor position, in characters.
    pub fn cursor_pos(&self) -> usize {
        self.cursor_pos
    }

    /// The text before and after the cursor.
    pub fn split_at_cursor(&self) -> (&str, &str) {
        self.buffer
            .split_at(char_to_byte_pos(&self.buffer, self.cursor_pos))
    }

    /// Moves the cursor one position to the left.
    pub fn move_cursor_left(&mut self) {
        if self.cursor_pos > 0 {
            self.cursor_pos -= 1;
        }
    }

    /// Moves the cursor one position to the right.
    pub fn move_cursor_right(&mut self) {
        if self.cursor_pos < self.buffer.chars().count() {
            self.cursor_pos += 1;
        }
    }

    /// Moves the cursor to the start of the input.
    pub fn move_cursor_home(&mut self) {
        self.cursor_pos = 0;
    }

    /// Moves the cursor to the end of the input.
    pub fn move_cursor_end(&mut self) {
        self.cursor_pos = self.buffer.chars().count();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_at_middle() {
        let mut input = TextInput::new();
        input.set_text("12M");
        input.move_cursor_left();
        input.insert_char('8');
        assert_eq!(input.get_text(), "128M");
        assert_eq!(input.cursor_pos(), 3);
    }

    #[test]
    fn test_insert_unicode() {
        let mut input = TextInput::new();
        input.set_text("/données");
        input.move_cursor_home();
        input.move_cursor_right();
        input.move_cursor_right();
        input.move_cursor_right();
        input.delete();
        assert_eq!(input.get_text(), "/donées");
        assert_eq!(input.split_at_cursor(), ("/do", "nées"));
    }

    #[test]
    fn test_backspace_at_start() {
        let mut input = TextInput::new();
        input.set_text("a");
        input.move_cursor_home();
        input.backspace();
        assert_eq!(input.get_text(), "a");
        assert_eq!(input.cursor_pos(), 0);
    }

    #[test]
    fn test_delete_at_end() {
        let mut input = TextInput::new();
        input.set_text("abc");
        input.delete();
        assert_eq!(input.get_text(), "abc");
        input.move_cursor_end();
        assert_eq!(input.cursor_pos(), 3);
    }

    #[test]
    fn test_char_to_byte_pos_past_end() {
        assert_eq!(char_to_byte_pos("é", 0), 0);
        assert_eq!(char_to_byte_pos("é", 1), 2);
        assert_eq!(char_to_byte_pos("é", 5), 2);
    }
}
