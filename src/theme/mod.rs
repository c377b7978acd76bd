mod colors;
mod theme;

pub use colors::Color;
pub use theme::Theme;

pub fn list_builtin_themes() -> Vec<&'static str> {
    vec!["one-dark", "gruvbox-dark", "nord"]
}

pub fn get_builtin_theme(name: &str) -> Option<Theme> {
    match name {
        "one-dark" => Some(Theme::one_dark()),
        "gruvbox-dark" => Some(Theme::gruvbox_dark()),
        "nord" => Some(Theme::nord()),
        _ => None,
    }
}
