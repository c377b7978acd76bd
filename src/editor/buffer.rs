use ropey::Rope;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::{fs::File, io};

/// The script source being edited
pub struct Buffer {
    text: Rope,
    filepath: Option<PathBuf>,
    dirty: bool,
}

impl Buffer {
    pub fn new() -> Self {
        Self {
            text: Rope::new(),
            filepath: None,
            dirty: false,
        }
    }

    pub fn from_file(path: PathBuf) -> io::Result<Self> {
        let text = Rope::from_reader(File::open(&path)?)?;
        Ok(Self {
            text,
            filepath: Some(path),
            dirty: false,
        })
    }

    /// An empty buffer that will be written to `path` on first save
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            text: Rope::new(),
            filepath: Some(path),
            dirty: false,
        }
    }

    /// Create a buffer from a string (useful for testing)
    #[cfg(test)]
    pub fn from_text(s: &str) -> Self {
        Self {
            text: Rope::from_str(s),
            filepath: None,
            dirty: false,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.filepath.as_deref()
    }

    pub fn set_path(&mut self, path: PathBuf) {
        self.filepath = Some(path);
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Write the whole buffer to its path, even when clean, so a run always
    /// sees the current content.
    pub fn save(&mut self) -> io::Result<()> {
        let Some(path) = &self.filepath else {
            return Err(io::Error::new(io::ErrorKind::Other, "No file path"));
        };
        let mut file = File::create(path)?;
        self.text.write_to(&mut file)?;
        self.dirty = false;
        tracing::info!(path = %path.display(), "buffer saved");
        Ok(())
    }

    pub fn save_as(&mut self, path: PathBuf) -> io::Result<()> {
        self.filepath = Some(path);
        self.save()
    }

    /// True when the buffer holds nothing but whitespace
    pub fn is_blank(&self) -> bool {
        self.text.chars().all(char::is_whitespace)
    }

    pub fn chars(&self) -> ropey::iter::Chars<'_> {
        self.text.chars()
    }

    pub fn line_count(&self) -> usize {
        self.text.len_lines()
    }

    pub fn line(&self, idx: usize) -> ropey::RopeSlice<'_> {
        self.text.line(idx)
    }

    pub fn line_len(&self, idx: usize) -> usize {
        // Length excluding newline character
        let line = self.text.line(idx);
        let len = line.len_chars();
        if len > 0 && line.char(len - 1) == '\n' {
            len - 1
        } else {
            len
        }
    }

    /// Convert (line, col) to a char index in the rope
    pub fn line_col_to_char(&self, line: usize, col: usize) -> usize {
        self.text.line_to_char(line) + col
    }

    /// Convert a char index back to (line, col)
    pub fn char_to_line_col(&self, idx: usize) -> (usize, usize) {
        let idx = idx.min(self.text.len_chars());
        let line = self.text.char_to_line(idx);
        (line, idx - self.text.line_to_char(line))
    }

    pub fn insert_char(&mut self, line: usize, col: usize, ch: char) {
        let idx = self.line_col_to_char(line, col);
        self.text.insert_char(idx, ch);
        self.dirty = true;
    }

    pub fn insert_str(&mut self, line: usize, col: usize, s: &str) {
        let idx = self.line_col_to_char(line, col);
        self.text.insert(idx, s);
        self.dirty = true;
    }

    /// Delete the character at the given position
    pub fn delete_char(&mut self, line: usize, col: usize) {
        let idx = self.line_col_to_char(line, col);
        if idx < self.text.len_chars() {
            self.text.remove(idx..idx + 1);
            self.dirty = true;
        }
    }

    /// Delete the character before the given position (backspace)
    pub fn delete_char_backward(&mut self, line: usize, col: usize) -> bool {
        let idx = self.line_col_to_char(line, col);
        if idx == 0 {
            return false;
        }
        self.text.remove(idx - 1..idx);
        self.dirty = true;
        true
    }

    pub fn insert_newline(&mut self, line: usize, col: usize) {
        self.insert_char(line, col, '\n');
    }

    /// Replace a char range with `with`
    pub fn replace_range(&mut self, range: Range<usize>, with: &str) {
        let end = range.end.min(self.text.len_chars());
        let start = range.start.min(end);
        self.text.remove(start..end);
        self.text.insert(start, with);
        self.dirty = true;
    }
}

impl Default for Buffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_buffer_is_empty() {
        let buf = Buffer::new();
        assert_eq!(buf.line_count(), 1); // empty rope has 1 line
        assert!(buf.is_blank());
    }

    #[test]
    fn whitespace_only_buffer_is_blank() {
        assert!(Buffer::from_text("  \n\t\n").is_blank());
        assert!(!Buffer::from_text("\necho hi\n").is_blank());
    }

    #[test]
    fn line_len_excludes_newline() {
        let buf = Buffer::from_text("hello\nworld");
        assert_eq!(buf.line_len(0), 5);
        assert_eq!(buf.line_len(1), 5);
    }

    #[test]
    fn char_index_round_trips_through_line_col() {
        let buf = Buffer::from_text("ab\ncde\nf");
        let idx = buf.line_col_to_char(1, 2);
        assert_eq!(idx, 5);
        assert_eq!(buf.char_to_line_col(idx), (1, 2));
    }

    #[test]
    fn backspace_at_line_start_joins_lines() {
        let mut buf = Buffer::from_text("ab\ncd");
        assert!(buf.delete_char_backward(1, 0));
        assert_eq!(buf.line(0).to_string(), "abcd");
        assert!(buf.is_dirty());
    }

    #[test]
    fn backspace_at_start_of_buffer_does_nothing() {
        let mut buf = Buffer::from_text("ab");
        assert!(!buf.delete_char_backward(0, 0));
        assert!(!buf.is_dirty());
    }

    #[test]
    fn replace_range_marks_dirty() {
        let mut buf = Buffer::from_text("echo foo");
        buf.replace_range(5..8, "bar");
        assert_eq!(buf.line(0).to_string(), "echo bar");
        assert!(buf.is_dirty());
    }

    #[test]
    fn save_without_path_fails() {
        let mut buf = Buffer::from_text("echo hi");
        assert!(buf.save().is_err());
    }

    #[test]
    fn save_clears_dirty_and_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.bat");
        let mut buf = Buffer::from_text("echo hi\n");
        buf.insert_char(0, 0, '@');
        buf.save_as(path.clone()).unwrap();
        assert!(!buf.is_dirty());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "@echo hi\n");
    }

    #[test]
    fn clean_save_still_writes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.bat");
        let mut buf = Buffer::with_path(path.clone());
        buf.save().unwrap();
        assert!(path.exists());
    }

    #[test]
    fn from_file_reads_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("in.bat");
        std::fs::write(&path, "rem hello\n").unwrap();
        let buf = Buffer::from_file(path.clone()).unwrap();
        assert_eq!(buf.path(), Some(path.as_path()));
        assert_eq!(buf.line(0).to_string(), "rem hello\n");
        assert!(!buf.is_dirty());
    }

    #[test]
    fn from_missing_file_errors() {
        let err = Buffer::from_file(PathBuf::from("/nonexistent/x.bat")).err().unwrap();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
