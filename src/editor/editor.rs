use std::{io, path::PathBuf};

use super::search::{self, Search};
use super::{Buffer, Cursor, Mode, samples};
use crate::config::Settings;
use crate::console::{Console, LineKind};
use crate::runner::{RunError, RunEvent, RunEventKind, RunOutcome, RunRequest, Runner};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// A one-line notice shown on the status line until the next key press
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub text: String,
    pub level: NoticeLevel,
}

pub struct Editor {
    pub buffer: Buffer,
    pub cursor: Cursor,
    pub mode: Mode,
    pub command_buffer: String,
    pub running: bool,
    pub message: Option<Notice>,
    pub scroll_offset: usize,
    pub console: Console,
    pub runner: Runner,
    pub search: Search,
    pub settings: Settings,
}

impl Editor {
    pub fn new(settings: Settings) -> Self {
        Self {
            buffer: Buffer::new(),
            cursor: Cursor::new(),
            mode: Mode::default(),
            command_buffer: String::new(),
            running: true,
            message: None,
            scroll_offset: 0,
            console: Console::new(settings.scrollback),
            runner: Runner::new(settings.shell.clone()),
            search: Search::new(),
            settings,
        }
    }

    /// Adjust scroll offset to keep cursor visible within viewport
    pub fn adjust_scroll(&mut self, viewport_height: usize) {
        if self.cursor.line < self.scroll_offset {
            self.scroll_offset = self.cursor.line;
        }
        if viewport_height > 0 && self.cursor.line >= self.scroll_offset + viewport_height {
            self.scroll_offset = self.cursor.line - viewport_height + 1;
        }
    }

    fn notify(&mut self, level: NoticeLevel, text: impl Into<String>) {
        self.message = Some(Notice {
            text: text.into(),
            level,
        });
    }

    pub fn set_message(&mut self, msg: impl Into<String>) {
        self.notify(NoticeLevel::Info, msg);
    }

    pub fn warn(&mut self, msg: impl Into<String>) {
        self.notify(NoticeLevel::Warning, msg);
    }

    pub fn error(&mut self, msg: impl Into<String>) {
        self.notify(NoticeLevel::Error, msg);
    }

    pub fn clear_message(&mut self) {
        self.message = None;
    }

    /// Name shown on the status line
    pub fn file_label(&self) -> String {
        let name = self
            .buffer
            .path()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "[No Name]".to_string());
        if self.buffer.is_dirty() {
            format!("{} (modified)", name)
        } else {
            name
        }
    }

    // Movement

    pub fn move_left(&mut self) {
        self.cursor.move_left();
    }

    pub fn move_right(&mut self) {
        let line_len = self.buffer.line_len(self.cursor.line);
        self.cursor.move_right(line_len);
    }

    pub fn move_up(&mut self) {
        let buffer = &self.buffer;
        self.cursor.move_up(|l| buffer.line_len(l));
    }

    pub fn move_down(&mut self) {
        let buffer = &self.buffer;
        self.cursor
            .move_down(buffer.line_count(), |l| buffer.line_len(l));
    }

    pub fn move_to_line_start(&mut self) {
        self.cursor.set(self.cursor.line, 0);
    }

    pub fn move_to_line_end(&mut self) {
        let line_len = self.buffer.line_len(self.cursor.line);
        self.cursor.set(self.cursor.line, line_len.saturating_sub(1));
    }

    pub fn move_to_first_line(&mut self) {
        self.cursor.set(0, 0);
    }

    pub fn move_to_last_line(&mut self) {
        self.cursor.set(self.buffer.line_count().saturating_sub(1), 0);
    }

    fn move_to_char(&mut self, idx: usize) {
        let (line, col) = self.buffer.char_to_line_col(idx);
        self.cursor.set(line, col);
    }

    fn cursor_char(&self) -> usize {
        self.buffer.line_col_to_char(self.cursor.line, self.cursor.col)
    }

    // Modes

    pub fn enter_insert_mode(&mut self) {
        self.mode = Mode::Insert;
    }

    /// Append after cursor (a)
    pub fn append(&mut self) {
        self.move_right();
        self.enter_insert_mode();
    }

    /// Append at end of line (A)
    pub fn append_end_of_line(&mut self) {
        let line_len = self.buffer.line_len(self.cursor.line);
        self.cursor.set(self.cursor.line, line_len);
        self.enter_insert_mode();
    }

    /// Open line below (o)
    pub fn open_line_below(&mut self) {
        let line_len = self.buffer.line_len(self.cursor.line);
        self.buffer.insert_newline(self.cursor.line, line_len);
        self.cursor.set(self.cursor.line + 1, 0);
        self.edited();
        self.enter_insert_mode();
    }

    /// Open line above (O)
    pub fn open_line_above(&mut self) {
        self.buffer.insert_newline(self.cursor.line, 0);
        self.cursor.set(self.cursor.line, 0);
        self.edited();
        self.enter_insert_mode();
    }

    pub fn enter_normal_mode(&mut self) {
        self.mode = Mode::Normal;
        self.command_buffer.clear();
        let line_len = self.buffer.line_len(self.cursor.line);
        if self.cursor.col > line_len {
            self.cursor.set(self.cursor.line, line_len);
        }
    }

    pub fn enter_command_mode(&mut self) {
        self.mode = Mode::Command;
        self.command_buffer.clear();
    }

    pub fn enter_search_mode(&mut self) {
        self.mode = Mode::Search;
        self.command_buffer.clear();
    }

    pub fn enter_console_mode(&mut self) {
        self.mode = Mode::Console;
        self.console.input.clear();
    }

    // Text editing

    /// Any edit invalidates the match a replace would act on
    fn edited(&mut self) {
        self.search.current = None;
    }

    pub fn insert_char(&mut self, ch: char) {
        self.buffer
            .insert_char(self.cursor.line, self.cursor.col, ch);
        self.cursor.set(self.cursor.line, self.cursor.col + 1);
        self.edited();
    }

    pub fn insert_tab(&mut self) {
        if self.settings.insert_spaces {
            let tab_width = self.settings.tab_width.max(1);
            let width = tab_width - self.cursor.col % tab_width;
            for _ in 0..width {
                self.insert_char(' ');
            }
        } else {
            self.insert_char('\t');
        }
    }

    pub fn delete_char(&mut self) {
        if self.cursor.col < self.buffer.line_len(self.cursor.line) {
            self.buffer.delete_char(self.cursor.line, self.cursor.col);
            self.edited();
        }
    }

    pub fn delete_char_backward(&mut self) {
        let idx = self.cursor_char();
        if self.buffer.delete_char_backward(self.cursor.line, self.cursor.col) {
            self.move_to_char(idx - 1);
            self.edited();
        }
    }

    pub fn insert_newline(&mut self) {
        self.buffer
            .insert_newline(self.cursor.line, self.cursor.col);
        self.cursor.set(self.cursor.line + 1, 0);
        self.edited();
    }

    // Commands

    pub fn execute_command(&mut self) {
        let input = std::mem::take(&mut self.command_buffer);
        self.mode = Mode::Normal;
        let input = input.trim();

        if let Some(cmd) = input.strip_prefix('!') {
            self.run_command(cmd);
            return;
        }

        let (name, arg) = match input.split_once(' ') {
            Some((name, arg)) => (name, arg.trim()),
            None => (input, ""),
        };
        match name {
            "q" | "quit" => self.quit(),
            "q!" | "quit!" => self.force_quit(),
            "w" | "write" => {
                self.write(arg);
            }
            "wq" => {
                if self.write(arg) {
                    self.quit();
                }
            }
            "e" | "edit" => self.edit(arg, false),
            "e!" | "edit!" => self.edit(arg, true),
            "run" => self.run_script(),
            "stop" => self.stop_run(),
            "clear" => self.console.clear(),
            "find" => self.find(arg),
            "replace" => self.replace_current(arg),
            "replaceall" => self.replace_all(arg),
            "set" => self.set_option(arg),
            "samples" => self.list_samples(),
            "sample" => self.insert_sample(arg),
            "" => {}
            _ => {
                self.warn(format!("Unknown command: {}", input));
            }
        }
    }

    /// Save, or save as when `path` is given. Returns whether it succeeded.
    fn write(&mut self, path: &str) -> bool {
        let result = if path.is_empty() {
            if self.buffer.path().is_none() {
                self.warn("No file name (use :w <path>)");
                return false;
            }
            self.save()
        } else {
            self.buffer.save_as(PathBuf::from(path))
        };
        match result {
            Ok(()) => {
                self.set_message(format!("{} written", self.file_label()));
                true
            }
            Err(e) => {
                self.error(format!("Cannot save file: {}", e));
                false
            }
        }
    }

    pub fn save(&mut self) -> io::Result<()> {
        self.buffer.save()
    }

    /// Load `path` into the buffer. A missing file starts a new buffer that
    /// will be created on save.
    pub fn edit(&mut self, path: &str, force: bool) {
        if path.is_empty() {
            self.warn("No file name");
            return;
        }
        if self.buffer.is_dirty() && !force {
            self.warn("No write since last change (add ! to override)");
            return;
        }
        let path = PathBuf::from(path);
        let loaded = match Buffer::from_file(path.clone()) {
            Ok(buffer) => Some(buffer),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => {
                self.error(format!("Cannot open file: {}", e));
                return;
            }
        };
        let is_new = loaded.is_none();
        self.buffer = loaded.unwrap_or_else(|| Buffer::with_path(path));
        self.cursor = Cursor::new();
        self.scroll_offset = 0;
        self.search.current = None;
        if is_new {
            self.set_message(format!("{} [New]", self.file_label()));
        } else {
            self.set_message(format!("{} loaded", self.file_label()));
        }
    }

    pub fn quit(&mut self) {
        if self.buffer.is_dirty() {
            self.warn("No write since last change (add ! to override)");
            return;
        }
        self.force_quit();
    }

    pub fn force_quit(&mut self) {
        if self.runner.stop().is_ok() {
            tracing::info!("stopping active run before exit");
        }
        self.running = false;
    }

    pub fn auto_save(&mut self) {
        if self.buffer.is_dirty() && self.buffer.path().is_some() {
            match self.save() {
                Ok(()) => self.set_message("Autosaved"),
                Err(e) => {
                    tracing::warn!(error = %e, "autosave failed");
                    self.error(format!("Autosave failed: {}", e));
                }
            }
        }
    }

    // Running

    /// Save the buffer and run it as a script
    pub fn run_script(&mut self) {
        if let Some(active) = self.runner.active_kind() {
            self.report_run_error(&RunError::ConcurrentRunRejected { active });
            return;
        }
        if self.buffer.is_blank() {
            self.warn("The script is empty");
            return;
        }
        if self.buffer.path().is_none() {
            self.buffer.set_path(self.settings.scratch_file.clone());
        }
        if let Err(e) = self.save() {
            self.error(format!("Cannot save script: {}", e));
            return;
        }
        let Some(path) = self.buffer.path().map(|p| p.to_path_buf()) else {
            return;
        };

        self.console.clear();
        match self.runner.start(RunRequest::script(&path)) {
            Ok(session) => {
                tracing::debug!(%session, path = %path.display(), "script run started");
                self.console
                    .info(format!("[INFO] Running {}", path.display()));
                self.set_message("Running...");
            }
            Err(e) => self.report_run_error(&e),
        }
    }

    /// Run a one-shot command typed into the console
    pub fn run_command(&mut self, cmd: &str) {
        let cmd = cmd.trim();
        if cmd.is_empty() {
            return;
        }
        self.console.push(LineKind::Echo, format!("> {}", cmd));
        match self.runner.start(RunRequest::command(cmd)) {
            Ok(_) => self.set_message("Running command..."),
            Err(e) => self.report_run_error(&e),
        }
    }

    pub fn stop_run(&mut self) {
        match self.runner.stop() {
            Ok(_) => self.set_message("Stopping..."),
            Err(e) => self.report_run_error(&e),
        }
    }

    fn report_run_error(&mut self, err: &RunError) {
        match err {
            RunError::NoActiveSession => self.set_message("Nothing is running"),
            RunError::ConcurrentRunRejected { .. } => self.warn(format!("Cannot run: {}", err)),
            _ => {
                tracing::warn!(error = %err, "run failed to start");
                self.error(format!("Cannot run: {}", err));
            }
        }
    }

    /// Apply an event relayed from the runner
    pub fn apply_run_event(&mut self, event: RunEvent) {
        self.runner.observe(&event);
        match event.kind {
            RunEventKind::Line(line) => self.console.push_output(line),
            RunEventKind::Finished(outcome) => match outcome {
                RunOutcome::Exited { code: Some(0) } => self.set_message("Run finished"),
                RunOutcome::Exited { code: Some(code) } => {
                    self.console.info(format!("[INFO] Exit code {}", code));
                    self.warn(format!("Run finished with exit code {}", code));
                }
                RunOutcome::Exited { code: None } => {
                    self.console.info("[INFO] Process terminated by signal");
                    self.warn("Run terminated");
                }
                RunOutcome::Cancelled => {
                    self.console.info("[INFO] Execution stopped by user.");
                    self.set_message("Run stopped");
                }
                RunOutcome::Failed(_) => self.error("Run failed"),
            },
        }
    }

    // Search

    fn case_sensitive(&self) -> bool {
        !self.settings.ignore_case
    }

    pub fn find(&mut self, query: &str) {
        if !query.is_empty() {
            self.search.query = query.to_string();
            self.search.current = None;
        }
        self.find_next();
    }

    pub fn find_next(&mut self) {
        if self.search.query.is_empty() {
            self.warn("No previous search");
            return;
        }
        let from = match &self.search.current {
            Some(range) => range.end,
            None => self.cursor_char(),
        };
        match search::find_next(&self.buffer, &self.search.query, from, self.case_sensitive()) {
            Some(range) => {
                self.move_to_char(range.start);
                self.search.current = Some(range);
            }
            None => {
                self.search.current = None;
                self.warn(format!("Pattern not found: {}", self.search.query));
            }
        }
    }

    /// Replace the current match with `text`
    pub fn replace_current(&mut self, text: &str) {
        let Some(range) = self.search.current.take() else {
            self.warn("No match selected");
            return;
        };
        let start = range.start;
        self.buffer.replace_range(range, text);
        self.move_to_char(start + text.chars().count());
        self.set_message("Replaced 1 occurrence");
    }

    /// Replace every occurrence of the last query with `text`
    pub fn replace_all(&mut self, text: &str) {
        if self.search.query.is_empty() {
            self.warn("No previous search");
            return;
        }
        let query = self.search.query.clone();
        let case_sensitive = self.case_sensitive();
        let count = search::replace_all(&mut self.buffer, &query, text, case_sensitive);
        self.search.current = None;
        let line = self
            .cursor
            .line
            .min(self.buffer.line_count().saturating_sub(1));
        let col = self.cursor.col.min(self.buffer.line_len(line));
        self.cursor.set(line, col);
        self.set_message(format!("Replaced {} occurrence(s)", count));
    }

    fn set_option(&mut self, option: &str) {
        match option {
            "ignorecase" | "ic" => self.settings.ignore_case = true,
            "noignorecase" | "noic" => self.settings.ignore_case = false,
            _ => {
                self.warn(format!("Unknown option: {}", option));
                return;
            }
        }
        self.search.current = None;
        self.set_message(option.to_string());
    }

    // Samples

    fn list_samples(&mut self) {
        for (i, sample) in samples::SAMPLES.iter().enumerate() {
            self.console.info(format!("{}. {}", i + 1, sample.title));
        }
        self.set_message("Insert a sample with :sample <n>");
    }

    fn insert_sample(&mut self, number: &str) {
        let Some(sample) = number.parse().ok().and_then(samples::get) else {
            self.warn(format!("No sample {}", number));
            return;
        };
        let idx = self.cursor_char();
        self.buffer
            .insert_str(self.cursor.line, self.cursor.col, sample.code);
        self.move_to_char(idx + sample.code.chars().count());
        self.edited();
        self.set_message(format!("Inserted: {}", sample.title));
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn editor_with_text(s: &str) -> Editor {
        let mut editor = Editor::default();
        editor.buffer = Buffer::from_text(s);
        editor
    }

    fn run_command(editor: &mut Editor, cmd: &str) {
        editor.command_buffer = cmd.to_string();
        editor.execute_command();
    }

    fn text(editor: &Editor) -> String {
        editor.buffer.chars().collect()
    }

    fn level(editor: &Editor) -> Option<NoticeLevel> {
        editor.message.as_ref().map(|m| m.level)
    }

    /// Pump runner events into the editor until the active run completes
    async fn drain_run(editor: &mut Editor) {
        while editor.runner.is_busy() {
            let event = tokio::time::timeout(Duration::from_secs(10), editor.runner.next_event())
                .await
                .expect("run timed out")
                .expect("runner closed");
            editor.apply_run_event(event);
        }
    }

    fn console_texts(editor: &Editor) -> Vec<(LineKind, String)> {
        editor
            .console
            .visible(usize::MAX)
            .map(|l| (l.kind, l.text.clone()))
            .collect()
    }

    #[test]
    fn new_editor_starts_in_normal_mode() {
        let editor = Editor::default();
        assert_eq!(editor.mode, Mode::Normal);
        assert!(editor.running);
    }

    #[test]
    fn enter_command_mode_clears_command_buffer() {
        let mut editor = Editor::default();
        editor.command_buffer = "leftover".to_string();
        editor.enter_command_mode();
        assert_eq!(editor.mode, Mode::Command);
        assert!(editor.command_buffer.is_empty());
    }

    #[test]
    fn move_down_clamps_col_to_shorter_line() {
        let mut editor = editor_with_text("hello world\nhi");
        editor.cursor.set(0, 10);
        editor.move_down();
        assert_eq!((editor.cursor.line, editor.cursor.col), (1, 2));
    }

    #[test]
    fn quit_refuses_dirty_buffer() {
        let mut editor = editor_with_text("x");
        editor.insert_char('a');
        run_command(&mut editor, "q");
        assert!(editor.running);
        assert_eq!(level(&editor), Some(NoticeLevel::Warning));
        run_command(&mut editor, "q!");
        assert!(!editor.running);
    }

    #[test]
    fn execute_command_returns_to_normal_mode() {
        let mut editor = Editor::default();
        editor.mode = Mode::Command;
        run_command(&mut editor, "unknown");
        assert_eq!(editor.mode, Mode::Normal);
        assert!(editor.command_buffer.is_empty());
        assert_eq!(level(&editor), Some(NoticeLevel::Warning));
    }

    #[test]
    fn backspace_joins_lines() {
        let mut editor = editor_with_text("ab\ncd");
        editor.cursor.set(1, 0);
        editor.delete_char_backward();
        assert_eq!(text(&editor), "abcd");
        assert_eq!((editor.cursor.line, editor.cursor.col), (0, 2));
    }

    #[test]
    fn insert_tab_uses_spaces_to_next_stop() {
        let mut editor = editor_with_text("");
        editor.settings.tab_width = 4;
        editor.insert_char('x');
        editor.insert_tab();
        assert_eq!(text(&editor), "x   ");
    }

    #[test]
    fn adjust_scroll_follows_cursor() {
        let mut editor = editor_with_text("1\n2\n3\n4\n5\n6\n7\n8\n9\n10");
        editor.cursor.set(8, 0);
        editor.adjust_scroll(5);
        assert_eq!(editor.scroll_offset, 4);
        editor.cursor.set(2, 0);
        editor.adjust_scroll(5);
        assert_eq!(editor.scroll_offset, 2);
    }

    #[test]
    fn write_and_edit_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.bat");
        let mut editor = editor_with_text("echo a\n");
        run_command(&mut editor, &format!("w {}", path.display()));
        assert!(!editor.buffer.is_dirty());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "echo a\n");

        let mut other = Editor::default();
        other.edit(&path.display().to_string(), false);
        assert_eq!(text(&other), "echo a\n");
        assert_eq!(other.file_label(), "a.bat");
    }

    #[test]
    fn write_without_name_warns() {
        let mut editor = editor_with_text("echo a");
        run_command(&mut editor, "w");
        assert_eq!(level(&editor), Some(NoticeLevel::Warning));
    }

    #[test]
    fn edit_refuses_to_drop_changes() {
        let mut editor = editor_with_text("keep");
        editor.insert_char('!');
        editor.edit("/nonexistent/other.bat", false);
        assert_eq!(text(&editor), "!keep");
        editor.edit("/nonexistent/other.bat", true);
        assert!(editor.buffer.is_blank());
        assert!(editor.file_label().starts_with("other.bat"));
    }

    #[test]
    fn file_label_marks_modified() {
        let mut editor = editor_with_text("");
        assert_eq!(editor.file_label(), "[No Name]");
        editor.insert_char('x');
        assert_eq!(editor.file_label(), "[No Name] (modified)");
    }

    #[test]
    fn auto_save_writes_dirty_named_buffer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("auto.bat");
        let mut editor = editor_with_text("");
        editor.buffer.set_path(path.clone());
        editor.insert_char('x');
        editor.auto_save();
        assert!(!editor.buffer.is_dirty());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "x");
    }

    #[test]
    fn auto_save_skips_unnamed_buffer() {
        let mut editor = editor_with_text("");
        editor.insert_char('x');
        editor.auto_save();
        assert!(editor.buffer.is_dirty());
        assert!(editor.message.is_none());
    }

    #[test]
    fn find_moves_cursor_and_wraps() {
        let mut editor = editor_with_text("echo a\nECHO b");
        run_command(&mut editor, "find echo");
        assert_eq!((editor.cursor.line, editor.cursor.col), (0, 0));
        editor.find_next();
        assert_eq!((editor.cursor.line, editor.cursor.col), (1, 0));
        editor.find_next();
        assert_eq!((editor.cursor.line, editor.cursor.col), (0, 0));
    }

    #[test]
    fn find_respects_case_option() {
        let mut editor = editor_with_text("ECHO a\necho b");
        run_command(&mut editor, "set noignorecase");
        run_command(&mut editor, "find echo");
        assert_eq!(editor.cursor.line, 1);
    }

    #[test]
    fn find_missing_pattern_warns() {
        let mut editor = editor_with_text("echo");
        editor.find("goto");
        assert_eq!(level(&editor), Some(NoticeLevel::Warning));
        assert!(editor.search.current.is_none());
    }

    #[test]
    fn replace_current_needs_a_match() {
        let mut editor = editor_with_text("echo");
        run_command(&mut editor, "replace x");
        assert_eq!(text(&editor), "echo");
        assert_eq!(level(&editor), Some(NoticeLevel::Warning));
    }

    #[test]
    fn replace_current_replaces_match() {
        let mut editor = editor_with_text("set a\nset b");
        editor.cursor.set(0, 2);
        editor.find("set");
        run_command(&mut editor, "replace SET");
        assert_eq!(text(&editor), "set a\nSET b");
        assert!(editor.search.current.is_none());
    }

    #[test]
    fn edit_clears_current_match() {
        let mut editor = editor_with_text("set a");
        editor.find("set");
        editor.insert_char('x');
        assert!(editor.search.current.is_none());
    }

    #[test]
    fn replace_all_reports_count() {
        let mut editor = editor_with_text("echo 1\necho 2\necho 3");
        editor.find("echo");
        run_command(&mut editor, "replaceall @echo");
        assert_eq!(text(&editor), "@echo 1\n@echo 2\n@echo 3");
        assert_eq!(
            editor.message.as_ref().map(|m| m.text.as_str()),
            Some("Replaced 3 occurrence(s)")
        );
    }

    #[test]
    fn replace_all_keeps_cursor_on_its_line() {
        let mut editor = editor_with_text("echo abc\nx");
        editor.search.query = "abc".to_string();
        editor.cursor.set(0, 8);
        run_command(&mut editor, "replaceall");
        assert_eq!(text(&editor), "echo \nx");
        assert_eq!((editor.cursor.line, editor.cursor.col), (0, 5));
    }

    #[test]
    fn replace_all_clamps_cursor_past_removed_lines() {
        let mut editor = editor_with_text("a\nb\nc");
        editor.search.query = "\n".to_string();
        editor.cursor.set(2, 1);
        editor.replace_all("");
        assert_eq!(text(&editor), "abc");
        assert_eq!((editor.cursor.line, editor.cursor.col), (0, 1));
    }

    #[test]
    fn sample_is_inserted_at_cursor() {
        let mut editor = editor_with_text("");
        run_command(&mut editor, "sample 3");
        assert_eq!(text(&editor), "@echo off\necho Hello World\n");
        assert_eq!((editor.cursor.line, editor.cursor.col), (2, 0));
    }

    #[test]
    fn unknown_sample_warns() {
        let mut editor = editor_with_text("");
        run_command(&mut editor, "sample 99");
        assert!(editor.buffer.is_blank());
        assert_eq!(level(&editor), Some(NoticeLevel::Warning));
    }

    #[test]
    fn samples_are_listed_in_console() {
        let mut editor = Editor::default();
        run_command(&mut editor, "samples");
        assert_eq!(editor.console.len(), samples::SAMPLES.len());
    }

    #[test]
    fn running_empty_script_warns() {
        let mut editor = editor_with_text("  \n");
        editor.run_script();
        assert!(!editor.runner.is_busy());
        assert_eq!(level(&editor), Some(NoticeLevel::Warning));
    }

    #[test]
    fn stop_without_run_reports_nothing_running() {
        let mut editor = Editor::default();
        run_command(&mut editor, "stop");
        assert_eq!(
            editor.message.as_ref().map(|m| m.text.as_str()),
            Some("Nothing is running")
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn run_script_uses_scratch_file_and_streams_output() {
        let dir = tempfile::tempdir().unwrap();
        let scratch = dir.path().join("temp_run.bat");
        let mut editor = editor_with_text("echo hi\necho oops 1>&2\n");
        editor.settings.scratch_file = scratch.clone();

        run_command(&mut editor, "run");
        assert!(editor.runner.is_busy());
        assert_eq!(editor.buffer.path(), Some(scratch.as_path()));
        assert_eq!(std::fs::read_to_string(&scratch).unwrap(), "echo hi\necho oops 1>&2\n");

        drain_run(&mut editor).await;
        let lines = console_texts(&editor);
        assert!(lines.contains(&(LineKind::Stdout, "hi".to_string())));
        assert!(lines.contains(&(LineKind::Stderr, "oops".to_string())));
        assert_eq!(
            editor.message.as_ref().map(|m| m.text.as_str()),
            Some("Run finished")
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn run_flushes_unsaved_changes_first() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("script.bat");
        std::fs::write(&path, "echo old\n").unwrap();
        let mut editor = Editor::default();
        editor.edit(&path.display().to_string(), false);
        editor.buffer.replace_range(5..8, "new");

        editor.run_script();
        drain_run(&mut editor).await;
        assert!(console_texts(&editor).contains(&(LineKind::Stdout, "new".to_string())));
        assert!(!editor.buffer.is_dirty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn second_run_is_rejected_while_busy() {
        let dir = tempfile::tempdir().unwrap();
        let mut editor = editor_with_text("sleep 5\n");
        editor.settings.scratch_file = dir.path().join("slow.bat");

        editor.run_script();
        assert!(editor.runner.is_busy());
        run_command(&mut editor, "!echo second");
        assert_eq!(level(&editor), Some(NoticeLevel::Warning));
        editor.run_script();
        assert_eq!(level(&editor), Some(NoticeLevel::Warning));

        editor.stop_run();
        drain_run(&mut editor).await;
        assert!(console_texts(&editor).contains(&(
            LineKind::Info,
            "[INFO] Execution stopped by user.".to_string()
        )));
        assert_eq!(
            editor.message.as_ref().map(|m| m.text.as_str()),
            Some("Run stopped")
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn console_command_is_echoed_and_run() {
        let mut editor = Editor::default();
        run_command(&mut editor, "!echo from console");
        drain_run(&mut editor).await;
        assert_eq!(
            console_texts(&editor),
            vec![
                (LineKind::Echo, "> echo from console".to_string()),
                (LineKind::Stdout, "from console".to_string()),
            ]
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn non_zero_exit_is_reported() {
        let mut editor = Editor::default();
        editor.run_command("exit 2");
        drain_run(&mut editor).await;
        assert!(console_texts(&editor).contains(&(LineKind::Info, "[INFO] Exit code 2".to_string())));
        assert_eq!(level(&editor), Some(NoticeLevel::Warning));
    }

    #[tokio::test]
    async fn spawn_failure_is_an_error_notice() {
        let mut editor = Editor::new(Settings {
            shell: crate::runner::Shell::new("/nonexistent/batchpad-shell", "-c"),
            ..Settings::default()
        });
        editor.run_command("echo hi");
        assert!(!editor.runner.is_busy());
        assert_eq!(level(&editor), Some(NoticeLevel::Error));
    }
}
