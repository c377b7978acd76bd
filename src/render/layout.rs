/// A rectangle of screen cells
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl Rect {
    pub fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Split off the bottom `percent` of the rows (top/bottom)
    pub fn split_horizontal(&self, percent: u16) -> (Rect, Rect) {
        let bottom_height = (self.height as u32 * percent.min(100) as u32 / 100) as u16;
        let top_height = self.height - bottom_height;
        let top = Rect::new(self.x, self.y, self.width, top_height);
        let bottom = Rect::new(self.x, self.y + top_height, self.width, bottom_height);
        (top, bottom)
    }

    pub fn bottom(&self) -> u16 {
        self.y + self.height
    }
}

/// Screen areas for one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub editor: Rect,
    /// Row separating the editor from the console
    pub border: u16,
    /// Console title row
    pub console_title: u16,
    pub console: Rect,
    pub status: u16,
}

impl Layout {
    /// Editor on top, console below a border and title row, status line last
    pub fn compute(width: u16, height: u16, console_percent: u16) -> Self {
        let status = height.saturating_sub(1);
        let body = Rect::new(0, 0, width, status);
        let (_, lower) = body.split_horizontal(console_percent);

        // Border and title take two rows from the console share; the editor
        // keeps at least one row.
        let lower_height = lower.height.max(2).min(body.height.saturating_sub(1));
        let editor = Rect::new(0, 0, width, body.height.saturating_sub(lower_height));
        let border = editor.bottom();
        let console_title = border + 1;
        let console = Rect::new(
            0,
            console_title + 1,
            width,
            lower_height.saturating_sub(2),
        );
        Self {
            editor,
            border,
            console_title,
            console,
            status,
        }
    }
}
