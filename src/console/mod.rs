use std::collections::VecDeque;

use crate::runner::{OutputLine, Stream};

/// What produced a console line, used to pick its color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Stdout,
    Stderr,
    /// Status text from the editor itself
    Info,
    /// A command typed into the console, echoed back as `> cmd`
    Echo,
}

impl From<Stream> for LineKind {
    fn from(stream: Stream) -> Self {
        match stream {
            Stream::Stdout => LineKind::Stdout,
            Stream::Stderr => LineKind::Stderr,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleLine {
    pub kind: LineKind,
    pub text: String,
}

/// Scrollback of run output shown below the editor
pub struct Console {
    lines: VecDeque<ConsoleLine>,
    scrollback: usize,
    /// Lines scrolled up from the bottom; 0 follows new output
    pub scroll_offset: usize,
    pub input: String,
}

impl Console {
    pub fn new(scrollback: usize) -> Self {
        Self {
            lines: VecDeque::new(),
            scrollback: scrollback.max(1),
            scroll_offset: 0,
            input: String::new(),
        }
    }

    pub fn push(&mut self, kind: LineKind, text: impl Into<String>) {
        if self.lines.len() == self.scrollback {
            self.lines.pop_front();
        }
        self.lines.push_back(ConsoleLine {
            kind,
            text: text.into(),
        });
        self.scroll_offset = 0;
    }

    pub fn push_output(&mut self, line: OutputLine) {
        self.push(line.stream.into(), line.text);
    }

    pub fn info(&mut self, text: impl Into<String>) {
        self.push(LineKind::Info, text);
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.scroll_offset = 0;
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn scroll_up(&mut self, amount: usize) {
        let max = self.lines.len().saturating_sub(1);
        self.scroll_offset = (self.scroll_offset + amount).min(max);
    }

    pub fn scroll_down(&mut self, amount: usize) {
        self.scroll_offset = self.scroll_offset.saturating_sub(amount);
    }

    /// The lines visible in a viewport of `height` rows, oldest first
    pub fn visible(&self, height: usize) -> impl Iterator<Item = &ConsoleLine> {
        let end = self.lines.len().saturating_sub(self.scroll_offset);
        let start = end.saturating_sub(height);
        self.lines.range(start..end)
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::new(1000)
    }
}
