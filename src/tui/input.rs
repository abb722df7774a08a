//! Input field handling for the terminal user interface.

/// A text input field with cursor position and active state management.
///
/// `cursor` is a byte offset into `value`, kept on a `char` boundary so
/// titles with multi-byte characters edit safely.
#[derive(Clone)]
pub struct InputField {
    pub value: String,
    pub cursor: usize,
    pub active: bool,
}

impl InputField {
    /// Create a new empty input field.
    pub fn new() -> Self {
        Self {
            value: String::new(),
            cursor: 0,
            active: false,
        }
    }

    /// Insert a character at the current cursor position.
    pub fn handle_char(&mut self, c: char) {
        self.value.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    /// Delete the character before the cursor.
    pub fn handle_backspace(&mut self) {
        if let Some((idx, _)) = self.value[..self.cursor].char_indices().next_back() {
            self.value.remove(idx);
            self.cursor = idx;
        }
    }

    /// Move cursor one character to the left.
    pub fn move_cursor_left(&mut self) {
        if let Some((idx, _)) = self.value[..self.cursor].char_indices().next_back() {
            self.cursor = idx;
        }
    }

    /// Move cursor one character to the right.
    pub fn move_cursor_right(&mut self) {
        if let Some(c) = self.value[self.cursor..].chars().next() {
            self.cursor += c.len_utf8();
        }
    }

    /// Rendered cursor column: the number of characters before the cursor.
    pub fn cursor_column(&self) -> usize {
        self.value[..self.cursor].chars().count()
    }

    /// Clear the field and deactivate it.
    pub fn reset(&mut self) {
        self.value.clear();
        self.cursor = 0;
        self.active = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typing_after_multibyte_char() {
        let mut field = InputField::new();
        field.handle_char('é');
        field.handle_char('x');
        assert_eq!(field.value, "éx");
        assert_eq!(field.cursor, "éx".len());
    }

    #[test]
    fn test_backspace_removes_whole_char() {
        let mut field = InputField::new();
        field.handle_char('é');
        field.handle_char('x');
        field.handle_backspace();
        assert_eq!(field.value, "é");
        field.handle_backspace();
        assert_eq!(field.value, "");
        assert_eq!(field.cursor, 0);
        // Backspace on an empty field stays put.
        field.handle_backspace();
        assert_eq!(field.cursor, 0);
    }

    #[test]
    fn test_cursor_moves_over_char_boundaries() {
        let mut field = InputField::new();
        field.handle_char('a');
        field.handle_char('é');
        field.move_cursor_left();
        assert_eq!(field.cursor, 1);
        field.handle_char('b');
        assert_eq!(field.value, "abé");
        field.move_cursor_right();
        assert_eq!(field.cursor, "abé".len());
        field.move_cursor_right();
        assert_eq!(field.cursor, "abé".len());
    }

    #[test]
    fn test_cursor_column_counts_chars_not_bytes() {
        let mut field = InputField::new();
        field.handle_char('é');
        field.handle_char('é');
        assert_eq!(field.cursor, 4);
        assert_eq!(field.cursor_column(), 2);
        field.move_cursor_left();
        assert_eq!(field.cursor_column(), 1);
    }
}
