//! # Text Editing State
//!
//! The editing model behind textboxes, kept free of rendering so it can be
//! driven and tested on its own. Positions are character indices.
//!
//! The selection is stored as an anchor (`offset`) plus a signed `size`:
//! the selected characters are `offset..offset + size` when `size > 0` and
//! `offset + size..offset` when it is negative. Extending with shift moves
//! the far end while the anchor stays put.

use crate::input::{KeyCode, Modifiers};

/// Characters a textbox admits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputKind {
    #[default]
    String,
    /// Digits with an optional leading sign.
    Int,
    /// Like `Int`, plus at most one decimal point.
    Float,
}

impl InputKind {
    /// Whether `text` is an acceptable (possibly partial) value for this kind.
    pub fn admits(self, text: &str) -> bool {
        match self {
            InputKind::String => text.chars().all(|c| !c.is_control()),
            InputKind::Int | InputKind::Float => {
                let body = text.strip_prefix(['-', '+']).unwrap_or(text);
                let mut dots = 0;
                for c in body.chars() {
                    match c {
                        '0'..='9' => {}
                        '.' if self == InputKind::Float && dots == 0 => dots += 1,
                        _ => return false,
                    }
                }
                true
            }
        }
    }

    /// Whether `text` is a complete value (used for pastes and programmatic sets).
    pub fn parses(self, text: &str) -> bool {
        match self {
            InputKind::String => true,
            InputKind::Int => text.parse::<i64>().is_ok(),
            InputKind::Float => text.parse::<f64>().is_ok() && self.admits(text),
        }
    }
}

/// Anchored selection; see the module docs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HighlightRange {
    pub offset: usize,
    pub size: isize,
}

impl HighlightRange {
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// `(start, end)` of the selected characters.
    pub fn span(&self) -> (usize, usize) {
        let far = (self.offset as isize + self.size).max(0) as usize;
        (self.offset.min(far), self.offset.max(far))
    }
}

/// What an edit did, so the caller can update visuals or the clipboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    Ignored,
    /// The text changed.
    Changed,
    /// Only the cursor or selection moved.
    Moved,
    /// The selection should be copied to the clipboard.
    Copy(String),
    /// The selection was removed and should be placed on the clipboard.
    Cut(String),
    /// Clipboard content should be requested for a later paste.
    PasteRequested,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextEditState {
    text: String,
    cursor: usize,
    highlight: HighlightRange,
    kind: InputKind,
}

impl TextEditState {
    pub fn new(kind: InputKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn kind(&self) -> InputKind {
        self.kind
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn highlight(&self) -> HighlightRange {
        self.highlight
    }

    /// Length in characters.
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// The first `chars` characters.
    pub fn prefix(&self, chars: usize) -> &str {
        &self.text[..self.byte_index(chars)]
    }

    pub fn selected_text(&self) -> &str {
        let (start, end) = self.highlight.span();
        &self.text[self.byte_index(start)..self.byte_index(end)]
    }

    fn byte_index(&self, chars: usize) -> usize {
        self.text
            .char_indices()
            .nth(chars)
            .map_or(self.text.len(), |(i, _)| i)
    }

    /// Replaces the text; int/float values that do not parse clear it.
    pub fn set_text(&mut self, text: &str) {
        self.text = if self.kind == InputKind::String || (self.kind.parses(text)) {
            text.to_string()
        } else {
            String::new()
        };
        self.cursor = self.len();
        self.select_none();
    }

    pub fn select_all(&mut self) {
        self.highlight = HighlightRange {
            offset: 0,
            size: self.len() as isize,
        };
        self.cursor = self.len();
    }

    pub fn select_none(&mut self) {
        self.highlight = HighlightRange {
            offset: self.cursor,
            size: 0,
        };
    }

    /// Text with the selection removed, and where the cursor lands.
    fn without_selection(&self) -> (String, usize) {
        if self.highlight.is_empty() {
            return (self.text.clone(), self.cursor);
        }
        let (start, end) = self.highlight.span();
        let mut text = String::with_capacity(self.text.len());
        text.push_str(&self.text[..self.byte_index(start)]);
        text.push_str(&self.text[self.byte_index(end)..]);
        (text, start)
    }

    fn commit(&mut self, text: String, cursor: usize) {
        self.text = text;
        self.cursor = cursor;
        self.select_none();
    }

    /// Inserts `insert` at the cursor, replacing any selection. Rejected
    /// (returning false, nothing changed) if the result is not admissible.
    fn insert_str(&mut self, insert: &str) -> bool {
        let (mut text, at) = self.without_selection();
        let byte = text.char_indices().nth(at).map_or(text.len(), |(i, _)| i);
        text.insert_str(byte, insert);
        if !self.kind.admits(&text) {
            return false;
        }
        self.commit(text, at + insert.chars().count());
        true
    }

    pub fn insert_char(&mut self, c: char) -> EditOutcome {
        let mut buf = [0u8; 4];
        if self.insert_str(c.encode_utf8(&mut buf)) {
            EditOutcome::Changed
        } else {
            EditOutcome::Ignored
        }
    }

    pub fn backspace(&mut self) -> EditOutcome {
        if !self.highlight.is_empty() {
            let (text, at) = self.without_selection();
            self.commit(text, at);
            return EditOutcome::Changed;
        }
        if self.cursor == 0 {
            return EditOutcome::Ignored;
        }
        let start = self.byte_index(self.cursor - 1);
        let end = self.byte_index(self.cursor);
        self.text.replace_range(start..end, "");
        self.cursor -= 1;
        self.select_none();
        EditOutcome::Changed
    }

    pub fn delete(&mut self) -> EditOutcome {
        if !self.highlight.is_empty() {
            let (text, at) = self.without_selection();
            self.commit(text, at);
            return EditOutcome::Changed;
        }
        if self.cursor >= self.len() {
            return EditOutcome::Ignored;
        }
        let start = self.byte_index(self.cursor);
        let end = self.byte_index(self.cursor + 1);
        self.text.replace_range(start..end, "");
        self.select_none();
        EditOutcome::Changed
    }

    /// Moves the cursor to `target`, extending the selection if `extend`.
    fn move_to(&mut self, target: usize, extend: bool) -> EditOutcome {
        let target = target.min(self.len());
        if extend {
            if self.highlight.is_empty() {
                self.highlight.offset = self.cursor;
            }
            self.cursor = target;
            self.highlight.size = self.cursor as isize - self.highlight.offset as isize;
        } else {
            self.cursor = target;
            self.select_none();
        }
        EditOutcome::Moved
    }

    pub fn move_left(&mut self, shift: bool) -> EditOutcome {
        if !shift && !self.highlight.is_empty() {
            let (start, _) = self.highlight.span();
            return self.move_to(start, false);
        }
        self.move_to(self.cursor.saturating_sub(1), shift)
    }

    pub fn move_right(&mut self, shift: bool) -> EditOutcome {
        if !shift && !self.highlight.is_empty() {
            let (_, end) = self.highlight.span();
            return self.move_to(end, false);
        }
        self.move_to(self.cursor + 1, shift)
    }

    pub fn home(&mut self, shift: bool) -> EditOutcome {
        self.move_to(0, shift)
    }

    pub fn end(&mut self, shift: bool) -> EditOutcome {
        self.move_to(self.len(), shift)
    }

    pub fn copy(&self) -> EditOutcome {
        if self.highlight.is_empty() {
            EditOutcome::Ignored
        } else {
            EditOutcome::Copy(self.selected_text().to_string())
        }
    }

    pub fn cut(&mut self) -> EditOutcome {
        if self.highlight.is_empty() {
            return EditOutcome::Ignored;
        }
        let copied = self.selected_text().to_string();
        let (text, at) = self.without_selection();
        self.commit(text, at);
        EditOutcome::Cut(copied)
    }

    /// Applies delivered clipboard content. Int/float pastes must parse on
    /// their own and leave an admissible value; otherwise nothing changes.
    pub fn paste(&mut self, content: &str) -> bool {
        if content.is_empty() || !self.kind.parses(content) {
            return false;
        }
        self.insert_str(content)
    }

    /// Applies one key press.
    pub fn handle_key(&mut self, key: KeyCode, modifiers: Modifiers, super_acts_as_control: bool) -> EditOutcome {
        if modifiers.command(super_acts_as_control) {
            return match key {
                KeyCode::A => {
                    self.select_all();
                    EditOutcome::Moved
                }
                KeyCode::C => self.copy(),
                KeyCode::X => self.cut(),
                KeyCode::V => EditOutcome::PasteRequested,
                _ => EditOutcome::Ignored,
            };
        }
        match key {
            KeyCode::Backspace => self.backspace(),
            KeyCode::Delete => self.delete(),
            KeyCode::Left => self.move_left(modifiers.shift),
            KeyCode::Right => self.move_right(modifiers.shift),
            KeyCode::Home => self.home(modifiers.shift),
            KeyCode::End => self.end(modifiers.shift),
            _ => match key.to_char(modifiers.shift) {
                Some(c) => self.insert_char(c),
                None => EditOutcome::Ignored,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(kind: InputKind, text: &str) -> TextEditState {
        let mut state = TextEditState::new(kind);
        for c in text.chars() {
            state.insert_char(c);
        }
        state
    }

    fn assert_invariants(state: &TextEditState) {
        let len = state.len() as isize;
        let h = state.highlight();
        assert!(state.cursor() <= state.len());
        assert!(h.offset as isize + h.size <= len);
        assert!(h.offset as isize + h.size >= 0);
    }

    #[test]
    fn test_insert_then_backspace_restores() {
        let mut state = typed(InputKind::String, "helo");
        state.move_left(false);
        let before = (state.text().to_string(), state.cursor());
        state.insert_char('l');
        assert_eq!(state.text(), "hello");
        state.backspace();
        assert_eq!((state.text().to_string(), state.cursor()), before);
    }

    #[test]
    fn test_select_all_then_backspace_empties() {
        let mut state = typed(InputKind::String, "abc");
        state.select_all();
        assert_eq!(state.cursor(), 3);
        state.backspace();
        assert_eq!(state.text(), "");
        assert_eq!(state.cursor(), 0);
        assert!(state.highlight().is_empty());
    }

    #[test]
    fn test_int_sign_rules() {
        let mut state = typed(InputKind::Int, "-12");
        assert_eq!(state.text(), "-12");
        state.home(false);
        assert_eq!(state.insert_char('5'), EditOutcome::Ignored);
        assert_eq!(state.insert_char('+'), EditOutcome::Ignored);
        state.end(false);
        assert_eq!(state.insert_char('-'), EditOutcome::Ignored);
        assert_eq!(state.insert_char('.'), EditOutcome::Ignored);
        assert_eq!(state.text(), "-12");
    }

    #[test]
    fn test_float_accepts_one_point() {
        let mut state = typed(InputKind::Float, "+3.1.4");
        assert_eq!(state.text(), "+3.14");
        assert_eq!(state.insert_char('x'), EditOutcome::Ignored);
    }

    #[test]
    fn test_shift_selection_flips_around_anchor() {
        let mut state = typed(InputKind::String, "abcd");
        state.move_left(false);
        state.move_left(false);
        state.move_right(true);
        assert_eq!(state.highlight().span(), (2, 3));
        state.move_left(true);
        state.move_left(true);
        assert_eq!(state.highlight().span(), (1, 2));
        assert_eq!(state.selected_text(), "b");
        assert_invariants(&state);
        state.move_right(false);
        assert_eq!(state.cursor(), 2);
        assert!(state.highlight().is_empty());
    }

    #[test]
    fn test_arrows_collapse_selection() {
        let mut state = typed(InputKind::String, "hello");
        state.select_all();
        state.move_left(false);
        assert_eq!(state.cursor(), 0);
        state.select_all();
        state.move_right(false);
        assert_eq!(state.cursor(), 5);
        assert_eq!(state.move_right(false), EditOutcome::Moved);
        assert_eq!(state.cursor(), 5);
    }

    #[test]
    fn test_home_end_with_shift() {
        let mut state = typed(InputKind::String, "hello");
        state.move_left(false);
        state.home(true);
        assert_eq!(state.selected_text(), "hell");
        state.end(true);
        assert_eq!(state.selected_text(), "o");
    }

    #[test]
    fn test_cut_and_copy() {
        let mut state = typed(InputKind::String, "hello world");
        state.home(false);
        for _ in 0..5 {
            state.move_right(true);
        }
        assert_eq!(state.copy(), EditOutcome::Copy("hello".to_string()));
        assert_eq!(state.cut(), EditOutcome::Cut("hello".to_string()));
        assert_eq!(state.text(), " world");
        assert_eq!(state.cursor(), 0);
    }

    #[test]
    fn test_paste_validation() {
        let mut state = TextEditState::new(InputKind::Int);
        assert!(!state.paste("12abc"));
        assert_eq!((state.text(), state.cursor()), ("", 0));
        assert!(state.paste("42"));
        assert_eq!((state.text(), state.cursor()), ("42", 2));
        state.home(false);
        assert!(state.paste("-1"));
        assert_eq!((state.text(), state.cursor()), ("-142", 2));
        for rejected in ["+", "1.5", "abc"] {
            assert!(!state.paste(rejected));
            assert_eq!((state.text(), state.cursor()), ("-142", 2));
        }
    }

    #[test]
    fn test_programmatic_set_clears_unparseable_numbers() {
        let mut state = TextEditState::new(InputKind::Float);
        state.set_text("2.5");
        assert_eq!(state.text(), "2.5");
        assert_eq!(state.cursor(), 3);
        state.set_text("two");
        assert_eq!(state.text(), "");
        assert_eq!(state.cursor(), 0);
    }

    #[test]
    fn test_shortcuts_respect_super_setting() {
        let mut state = typed(InputKind::String, "abc");
        assert_eq!(state.handle_key(KeyCode::A, Modifiers::SUPER, false), EditOutcome::Changed);
        assert_eq!(state.text(), "abca");
        assert_eq!(state.handle_key(KeyCode::A, Modifiers::SUPER, true), EditOutcome::Moved);
        assert_eq!(state.selected_text(), "abca");
        assert_eq!(state.handle_key(KeyCode::V, Modifiers::CONTROL, false), EditOutcome::PasteRequested);
    }

    #[test]
    fn test_multibyte_text() {
        let mut state = typed(InputKind::String, "héllo");
        assert_eq!(state.len(), 5);
        state.move_left(false);
        state.backspace();
        state.backspace();
        state.backspace();
        assert_eq!(state.text(), "ho");
        assert_eq!(state.prefix(1), "h");
        assert_invariants(&state);
    }
}
