//! Editing state for the multi-line draft.

/// Draft text with a cursor.
///
/// The cursor is a byte offset that always sits on a character boundary.
#[derive(Debug, Clone, Default)]
pub struct TextInputState {
    content: String,
    cursor: usize,
}

impl TextInputState {
    /// Create a new empty text input state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the current content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Cursor position as a byte offset.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Check if the content is empty.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Replace the content and put the cursor at the end.
    pub fn set(&mut self, content: impl Into<String>) {
        self.content = content.into();
        self.cursor = self.content.len();
    }

    /// Clear the content.
    pub fn clear(&mut self) {
        self.content.clear();
        self.cursor = 0;
    }

    /// Insert a character at the cursor position.
    pub fn insert(&mut self, ch: char) {
        self.content.insert(self.cursor, ch);
        self.cursor += ch.len_utf8();
    }

    /// Insert a string at the cursor position.
    pub fn insert_str(&mut self, s: &str) {
        self.content.insert_str(self.cursor, s);
        self.cursor += s.len();
    }

    /// Delete the character before the cursor (backspace).
    pub fn backspace(&mut self) {
        if let Some(prev) = self.prev_boundary() {
            self.content.replace_range(prev..self.cursor, "");
            self.cursor = prev;
        }
    }

    /// Delete the character at the cursor (delete).
    pub fn delete(&mut self) {
        if let Some(next) = self.next_boundary() {
            self.content.replace_range(self.cursor..next, "");
        }
    }

    /// Move cursor left.
    pub fn move_left(&mut self) {
        if let Some(prev) = self.prev_boundary() {
            self.cursor = prev;
        }
    }

    /// Move cursor right.
    pub fn move_right(&mut self) {
        if let Some(next) = self.next_boundary() {
            self.cursor = next;
        }
    }

    /// Move cursor to the start of the current line.
    pub fn move_home(&mut self) {
        self.cursor = self.content[..self.cursor]
            .rfind('\n')
            .map_or(0, |i| i + 1);
    }

    /// Move cursor to the end of the current line.
    pub fn move_end(&mut self) {
        self.cursor = self.content[self.cursor..]
            .find('\n')
            .map_or(self.content.len(), |i| self.cursor + i);
    }

    /// Number of lines in the draft (at least one).
    pub fn line_count(&self) -> usize {
        self.content.split('\n').count()
    }

    /// Line index and character column of the cursor.
    pub fn cursor_line_col(&self) -> (usize, usize) {
        let before = &self.content[..self.cursor];
        let line = before.matches('\n').count();
        let col = before
            .rsplit('\n')
            .next()
            .map_or(0, |tail| tail.chars().count());
        (line, col)
    }

    fn prev_boundary(&self) -> Option<usize> {
        self.content[..self.cursor]
            .char_indices()
            .next_back()
            .map(|(i, _)| i)
    }

    fn next_boundary(&self) -> Option<usize> {
        self.content[self.cursor..]
            .chars()
            .next()
            .map(|ch| self.cursor + ch.len_utf8())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_input_state_basic() {
        let mut state = TextInputState::new();
        assert!(state.is_empty());

        state.insert('H');
        state.insert('i');
        assert_eq!(state.content(), "Hi");
        assert_eq!(state.cursor(), 2);

        state.backspace();
        assert_eq!(state.content(), "H");

        state.clear();
        assert!(state.is_empty());
    }

    #[test]
    fn test_text_input_state_cursor_movement() {
        let mut state = TextInputState::new();
        state.insert_str("Hello");

        state.move_left();
        state.move_left();
        assert_eq!(state.cursor(), 3);

        state.insert('X');
        assert_eq!(state.content(), "HelXlo");

        state.move_home();
        assert_eq!(state.cursor(), 0);

        state.move_end();
        assert_eq!(state.cursor(), 6);
    }

    #[test]
    fn test_multibyte_editing() {
        let mut state = TextInputState::new();
        state.set("🌵 hi");

        state.move_home();
        state.move_right();
        assert_eq!(state.cursor(), '🌵'.len_utf8());

        state.backspace();
        assert_eq!(state.content(), " hi");
        assert_eq!(state.cursor(), 0);

        state.insert('🐴');
        state.delete();
        assert_eq!(state.content(), "🐴hi");
    }

    #[test]
    fn test_home_end_stay_on_current_line() {
        let mut state = TextInputState::new();
        state.set("first\nsecond");

        state.move_home();
        assert_eq!(state.cursor_line_col(), (1, 0));

        state.move_left();
        assert_eq!(state.cursor_line_col(), (0, 5));
        state.move_home();
        assert_eq!(state.cursor(), 0);
        state.move_end();
        assert_eq!(state.cursor(), 5);
    }

    #[test]
    fn test_line_count() {
        let mut state = TextInputState::new();
        assert_eq!(state.line_count(), 1);
        state.set("a\nb\n");
        assert_eq!(state.line_count(), 3);
    }

    #[test]
    fn test_set_moves_cursor_to_end() {
        let mut state = TextInputState::new();
        state.set("howdy");
        assert_eq!(state.cursor(), 5);
        assert_eq!(state.cursor_line_col(), (0, 5));
    }
}
