use std::io::{self, Write, stdout};
use std::ops::Range;

use crossterm::{
    cursor::{Hide, MoveTo, SetCursorStyle, Show},
    execute, queue,
    style::{Attribute, Print, SetAttribute, SetBackgroundColor, SetForegroundColor},
    terminal::{
        self, Clear, ClearType, DisableLineWrap, EnableLineWrap, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};

use super::layout::{Layout, Rect};
use crate::console::LineKind;
use crate::editor::{Editor, Mode, NoticeLevel};
use crate::runner::RunKind;
use crate::theme::{Color, Theme};

const GUTTER_WIDTH: u16 = 5;

pub struct Renderer {
    pub width: u16,
    pub height: u16,
}

impl Renderer {
    pub fn new() -> io::Result<Self> {
        let (width, height) = terminal::size()?;
        Ok(Self { width, height })
    }

    pub fn setup() -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            stdout(),
            EnterAlternateScreen,
            DisableLineWrap,
            Hide,
            Clear(ClearType::All)
        )?;
        Ok(())
    }

    pub fn teardown() -> io::Result<()> {
        execute!(
            stdout(),
            SetCursorStyle::DefaultUserShape,
            Show,
            EnableLineWrap,
            LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
    }

    fn layout(&self, editor: &Editor) -> Layout {
        Layout::compute(self.width, self.height, editor.settings.console_height)
    }

    /// Rows available to the text area, for scroll adjustment
    pub fn editor_height(&self, editor: &Editor) -> usize {
        self.layout(editor).editor.height as usize
    }

    pub fn render(&self, editor: &Editor, theme: &Theme) -> io::Result<()> {
        let mut stdout = stdout();
        let layout = self.layout(editor);

        // Hide cursor during redraw to prevent flicker
        queue!(stdout, Hide)?;

        self.render_editor_pane(&mut stdout, editor, &layout.editor, theme)?;
        self.render_console_pane(&mut stdout, editor, &layout, theme)?;
        self.render_status_line(&mut stdout, editor, layout.status, theme)?;
        self.position_cursor(&mut stdout, editor, &layout)?;

        stdout.flush()?;
        Ok(())
    }

    fn render_editor_pane(
        &self,
        stdout: &mut impl Write,
        editor: &Editor,
        rect: &Rect,
        theme: &Theme,
    ) -> io::Result<()> {
        let buffer = &editor.buffer;
        let line_count = buffer.line_count();
        let text_width = rect.width.saturating_sub(GUTTER_WIDTH) as usize;
        let tab_width = editor.settings.tab_width;

        queue!(stdout, SetBackgroundColor(theme.background.to_crossterm()))?;

        for row in 0..rect.height {
            let line_idx = row as usize + editor.scroll_offset;
            queue!(stdout, MoveTo(rect.x, rect.y + row))?;

            if line_idx >= line_count {
                // Empty line indicator
                queue!(stdout, SetForegroundColor(theme.line_number.to_crossterm()))?;
                queue!(stdout, Print("   ~ "))?;
                queue!(stdout, Print(" ".repeat(text_width)))?;
                continue;
            }

            let line_num_color = if line_idx == editor.cursor.line {
                theme.line_number_active
            } else {
                theme.line_number
            };
            queue!(stdout, SetForegroundColor(line_num_color.to_crossterm()))?;
            queue!(stdout, Print(format!("{:>4} ", line_idx + 1)))?;

            let line: String = buffer.line(line_idx).chars().collect();
            let line = line.trim_end_matches(['\n', '\r']);
            let line_start = buffer.line_col_to_char(line_idx, 0);
            let highlight = editor
                .search
                .current
                .as_ref()
                .map(|r| r.start.saturating_sub(line_start)..r.end.saturating_sub(line_start));

            let mut used = 0;
            for (text, matched) in expand_line(line, tab_width, highlight) {
                let text: String = text.chars().take(text_width - used).collect();
                used += text.chars().count();
                if matched {
                    queue!(stdout, SetBackgroundColor(theme.search_match.to_crossterm()))?;
                    queue!(stdout, SetForegroundColor(theme.background.to_crossterm()))?;
                } else {
                    queue!(stdout, SetBackgroundColor(theme.background.to_crossterm()))?;
                    queue!(stdout, SetForegroundColor(theme.foreground.to_crossterm()))?;
                }
                queue!(stdout, Print(text))?;
                if used >= text_width {
                    break;
                }
            }
            queue!(stdout, SetBackgroundColor(theme.background.to_crossterm()))?;
            queue!(stdout, Print(" ".repeat(text_width - used)))?;
        }

        Ok(())
    }

    fn render_console_pane(
        &self,
        stdout: &mut impl Write,
        editor: &Editor,
        layout: &Layout,
        theme: &Theme,
    ) -> io::Result<()> {
        let width = self.width as usize;
        if layout.console_title >= layout.status {
            return Ok(());
        }

        queue!(stdout, MoveTo(0, layout.border))?;
        queue!(stdout, SetBackgroundColor(theme.background.to_crossterm()))?;
        queue!(stdout, SetForegroundColor(theme.pane_border.to_crossterm()))?;
        queue!(stdout, Print("─".repeat(width)))?;

        // Title row
        queue!(stdout, MoveTo(0, layout.console_title))?;
        queue!(stdout, SetBackgroundColor(theme.console_bg.to_crossterm()))?;
        queue!(stdout, SetForegroundColor(theme.foreground.to_crossterm()))?;
        queue!(stdout, SetAttribute(Attribute::Bold))?;
        let mut title = " Console".to_string();
        if let Some(kind) = editor.runner.active_kind() {
            title.push_str(&format!(" [running {}]", kind));
        }
        if editor.console.scroll_offset > 0 {
            title.push_str(&format!(
                " [{} of {} lines up]",
                editor.console.scroll_offset,
                editor.console.len()
            ));
        }
        queue!(stdout, Print(pad(&title, width)))?;
        queue!(stdout, SetAttribute(Attribute::Reset))?;

        let rect = &layout.console;
        let input_rows = if editor.mode == Mode::Console { 1 } else { 0 };
        let output_rows = rect.height.saturating_sub(input_rows);
        let lines: Vec<_> = editor.console.visible(output_rows as usize).collect();

        queue!(stdout, SetBackgroundColor(theme.console_bg.to_crossterm()))?;
        for row in 0..output_rows {
            queue!(stdout, MoveTo(rect.x, rect.y + row))?;
            if row == 0 && editor.console.is_empty() {
                queue!(stdout, SetForegroundColor(theme.line_number.to_crossterm()))?;
                queue!(stdout, Print(pad(" F5 runs the script, ! runs a command", width)))?;
                continue;
            }
            match lines.get(row as usize) {
                Some(line) => {
                    let color = console_color(line.kind, theme);
                    queue!(stdout, SetForegroundColor(color.to_crossterm()))?;
                    let text = printable(&line.text, editor.settings.tab_width);
                    queue!(stdout, Print(pad(&text, width)))?;
                }
                None => queue!(stdout, Print(" ".repeat(width)))?,
            }
        }

        if input_rows > 0 && rect.height > 0 {
            queue!(stdout, MoveTo(rect.x, rect.y + output_rows))?;
            queue!(stdout, SetForegroundColor(theme.console_echo.to_crossterm()))?;
            let input = printable(&editor.console.input, editor.settings.tab_width);
            queue!(stdout, Print(pad(&format!("> {}", input), width)))?;
        }

        queue!(stdout, SetBackgroundColor(theme.background.to_crossterm()))?;
        Ok(())
    }

    fn render_status_line(
        &self,
        stdout: &mut impl Write,
        editor: &Editor,
        status_row: u16,
        theme: &Theme,
    ) -> io::Result<()> {
        queue!(stdout, MoveTo(0, status_row))?;

        // Prompt modes - just show what is being typed
        let prompt = match editor.mode {
            Mode::Command => Some(':'),
            Mode::Search => Some('/'),
            _ => None,
        };
        if let Some(prompt) = prompt {
            queue!(stdout, SetBackgroundColor(theme.background.to_crossterm()))?;
            queue!(stdout, SetForegroundColor(theme.foreground.to_crossterm()))?;
            queue!(stdout, Clear(ClearType::CurrentLine))?;
            queue!(stdout, Print(format!("{}{}", prompt, editor.command_buffer)))?;
            return Ok(());
        }

        // Message - show prominently
        if let Some(ref notice) = editor.message {
            let color = match notice.level {
                NoticeLevel::Info => theme.info,
                NoticeLevel::Warning => theme.warning,
                NoticeLevel::Error => theme.error,
            };
            queue!(stdout, SetBackgroundColor(theme.background.to_crossterm()))?;
            queue!(stdout, SetForegroundColor(color.to_crossterm()))?;
            queue!(stdout, Clear(ClearType::CurrentLine))?;
            queue!(stdout, Print(printable(&notice.text, editor.settings.tab_width)))?;
            return Ok(());
        }

        queue!(
            stdout,
            SetBackgroundColor(theme.status_bar_bg.to_crossterm())
        )?;
        queue!(
            stdout,
            SetForegroundColor(theme.status_bar_fg.to_crossterm())
        )?;
        queue!(stdout, Print(status_text(editor, self.width as usize)))?;
        queue!(stdout, SetBackgroundColor(theme.background.to_crossterm()))?;

        Ok(())
    }

    fn position_cursor(
        &self,
        stdout: &mut impl Write,
        editor: &Editor,
        layout: &Layout,
    ) -> io::Result<()> {
        match editor.mode {
            Mode::Command | Mode::Search => {
                let cmd_col = 1 + editor.command_buffer.chars().count() as u16;
                queue!(stdout, MoveTo(cmd_col, layout.status))?;
                queue!(stdout, SetCursorStyle::BlinkingBar)?;
                queue!(stdout, Show)?;
            }
            Mode::Console => {
                if layout.console.height == 0 {
                    queue!(stdout, Hide)?;
                    return Ok(());
                }
                let input_col = 2 + editor.console.input.chars().count() as u16;
                let input_row = layout.console.bottom() - 1;
                queue!(stdout, MoveTo(input_col, input_row))?;
                queue!(stdout, SetCursorStyle::BlinkingBar)?;
                queue!(stdout, Show)?;
            }
            Mode::Normal | Mode::Insert => {
                let rect = &layout.editor;
                let row = editor.cursor.line.saturating_sub(editor.scroll_offset);
                if row >= rect.height as usize {
                    queue!(stdout, Hide)?;
                    return Ok(());
                }
                let line: String = editor.buffer.line(editor.cursor.line).chars().collect();
                let col = display_col(&line, editor.cursor.col, editor.settings.tab_width);
                let max_x = rect.width.saturating_sub(1);
                let cursor_x = (GUTTER_WIDTH as usize + col).min(max_x as usize) as u16;
                queue!(stdout, MoveTo(cursor_x, rect.y + row as u16))?;

                let cursor_style = match editor.mode {
                    Mode::Insert => SetCursorStyle::BlinkingBar,
                    _ => SetCursorStyle::SteadyBlock,
                };
                queue!(stdout, cursor_style)?;
                queue!(stdout, Show)?;
            }
        }
        Ok(())
    }
}

fn console_color(kind: LineKind, theme: &Theme) -> Color {
    match kind {
        LineKind::Stdout => theme.console_stdout,
        LineKind::Stderr => theme.console_stderr,
        LineKind::Info => theme.console_info,
        LineKind::Echo => theme.console_echo,
    }
}

/// Truncate or pad `text` to exactly `width` columns
/// Make child output safe to print: tabs expand to the next stop and other
/// control characters (escape sequences, bare `\r`) become U+FFFD
fn printable(text: &str, tab_width: usize) -> String {
    let tab_width = tab_width.max(1);
    let mut out = String::with_capacity(text.len());
    let mut col = 0;
    for ch in text.chars() {
        if ch == '\t' {
            let width = tab_width - col % tab_width;
            out.push_str(&" ".repeat(width));
            col += width;
        } else {
            out.push(if ch.is_control() { '\u{fffd}' } else { ch });
            col += 1;
        }
    }
    out
}

fn pad(text: &str, width: usize) -> String {
    format!("{:width$}", text, width = width)
        .chars()
        .take(width)
        .collect()
}

/// Split a line into runs of display text, expanding tabs, flagging the runs
/// that fall inside `highlight` (a char range relative to the line start)
fn expand_line(
    line: &str,
    tab_width: usize,
    highlight: Option<Range<usize>>,
) -> Vec<(String, bool)> {
    let tab_width = tab_width.max(1);
    let mut runs: Vec<(String, bool)> = Vec::new();
    let mut col = 0;
    for (idx, ch) in line.chars().enumerate() {
        let matched = highlight.as_ref().is_some_and(|r| r.contains(&idx));
        if runs.last().is_none_or(|(_, m)| *m != matched) {
            runs.push((String::new(), matched));
        }
        let Some((run, _)) = runs.last_mut() else {
            continue;
        };
        if ch == '\t' {
            let width = tab_width - col % tab_width;
            run.push_str(&" ".repeat(width));
            col += width;
        } else {
            run.push(if ch.is_control() { '\u{fffd}' } else { ch });
            col += 1;
        }
    }
    runs
}

/// Screen column of char `col` once tabs are expanded
fn display_col(line: &str, col: usize, tab_width: usize) -> usize {
    let tab_width = tab_width.max(1);
    line.chars().take(col).fold(0, |x, ch| {
        if ch == '\t' {
            x + tab_width - x % tab_width
        } else {
            x + 1
        }
    })
}

/// Status bar: mode, file name, run state on the left; position on the right
fn status_text(editor: &Editor, width: usize) -> String {
    let running = match editor.runner.active_kind() {
        Some(RunKind::Script) => " | running script...",
        Some(RunKind::Command) => " | running command...",
        None => "",
    };
    let left = format!(
        " {} | {}{} ",
        editor.mode.display(),
        editor.file_label(),
        running
    );
    let right = format!(" {}:{} ", editor.cursor.line + 1, editor.cursor.col + 1);

    let padding = width.saturating_sub(left.chars().count() + right.chars().count());
    let status = format!("{}{}{}", left, " ".repeat(padding), right);
    status.chars().take(width).collect()
}
