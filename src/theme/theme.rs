use super::Color;

/// Complete theme definition
#[derive(Debug, Clone)]
pub struct Theme {
    pub name: String,

    // Editor chrome
    pub background: Color,
    pub foreground: Color,
    pub search_match: Color,

    // UI elements
    pub line_number: Color,
    pub line_number_active: Color,
    pub status_bar_bg: Color,
    pub status_bar_fg: Color,
    pub pane_border: Color,

    // Console
    pub console_bg: Color,
    pub console_stdout: Color,
    pub console_stderr: Color,
    pub console_info: Color,
    pub console_echo: Color,

    // Notices
    pub error: Color,
    pub warning: Color,
    pub info: Color,
}

impl Theme {
    /// One Dark, the default palette
    pub fn one_dark() -> Self {
        Self {
            name: "one-dark".to_string(),
            background: Color::hex(0x1e2127),
            foreground: Color::hex(0xabb2bf),
            search_match: Color::hex(0x3e4451),

            line_number: Color::hex(0x4b5263),
            line_number_active: Color::hex(0xe5c07b),
            status_bar_bg: Color::hex(0x21252b),
            status_bar_fg: Color::hex(0xabb2bf),
            pane_border: Color::hex(0x3a3f4b),

            console_bg: Color::hex(0x21252b),
            console_stdout: Color::hex(0x98c379),
            console_stderr: Color::hex(0xff5555),
            console_info: Color::hex(0x61afef),
            console_echo: Color::hex(0xe5c07b),

            error: Color::hex(0xe06c75),
            warning: Color::hex(0xe5c07b),
            info: Color::hex(0x61afef),
        }
    }

    /// Gruvbox Dark - warm retro theme
    pub fn gruvbox_dark() -> Self {
        Self {
            name: "gruvbox-dark".to_string(),
            background: Color::hex(0x282828),
            foreground: Color::hex(0xebdbb2),
            search_match: Color::hex(0x504945),

            line_number: Color::hex(0x665c54),
            line_number_active: Color::hex(0xfabd2f),
            status_bar_bg: Color::hex(0x3c3836),
            status_bar_fg: Color::hex(0xebdbb2),
            pane_border: Color::hex(0x504945),

            console_bg: Color::hex(0x1d2021),
            console_stdout: Color::hex(0xb8bb26),
            console_stderr: Color::hex(0xfb4934),
            console_info: Color::hex(0x83a598),
            console_echo: Color::hex(0xfabd2f),

            error: Color::hex(0xfb4934),
            warning: Color::hex(0xfabd2f),
            info: Color::hex(0x83a598),
        }
    }

    /// Nord - arctic, north-bluish theme
    pub fn nord() -> Self {
        Self {
            name: "nord".to_string(),
            background: Color::hex(0x2e3440),
            foreground: Color::hex(0xd8dee9),
            search_match: Color::hex(0x434c5e),

            line_number: Color::hex(0x4c566a),
            line_number_active: Color::hex(0xebcb8b),
            status_bar_bg: Color::hex(0x3b4252),
            status_bar_fg: Color::hex(0xd8dee9),
            pane_border: Color::hex(0x4c566a),

            console_bg: Color::hex(0x272c36),
            console_stdout: Color::hex(0xa3be8c),
            console_stderr: Color::hex(0xbf616a),
            console_info: Color::hex(0x81a1c1),
            console_echo: Color::hex(0xebcb8b),

            error: Color::hex(0xbf616a),
            warning: Color::hex(0xebcb8b),
            info: Color::hex(0x81a1c1),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::one_dark()
    }
}
