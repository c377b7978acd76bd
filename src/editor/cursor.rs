/// Cursor position in the buffer, with a remembered column for vertical moves
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cursor {
    pub line: usize,
    pub col: usize,
    /// Column to return to when moving through shorter lines
    sticky_col: usize,
}

impl Cursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(line: usize, col: usize) -> Self {
        Self {
            line,
            col,
            sticky_col: col,
        }
    }

    /// Jump to a position, resetting the remembered column
    pub fn set(&mut self, line: usize, col: usize) {
        *self = Self::at(line, col);
    }

    pub fn move_left(&mut self) {
        self.col = self.col.saturating_sub(1);
        self.sticky_col = self.col;
    }

    pub fn move_right(&mut self, line_len: usize) {
        self.col = (self.col + 1).min(line_len);
        self.sticky_col = self.col;
    }

    /// Move up one line; `line_len` reports the length of any line
    pub fn move_up(&mut self, line_len: impl Fn(usize) -> usize) {
        if self.line > 0 {
            self.line -= 1;
            self.col = self.sticky_col.min(line_len(self.line));
        }
    }

    pub fn move_down(&mut self, line_count: usize, line_len: impl Fn(usize) -> usize) {
        if self.line + 1 < line_count {
            self.line += 1;
            self.col = self.sticky_col.min(line_len(self.line));
        }
    }
}
