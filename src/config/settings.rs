use std::path::PathBuf;

use crate::runner::Shell;

/// Editor settings that can be customized via the Rhai config
#[derive(Debug, Clone)]
pub struct Settings {
    // Display
    pub theme: String,
    /// Share of the screen given to the console, in percent
    pub console_height: u16,
    pub scrollback: usize,

    // Editing
    pub tab_width: usize,
    pub insert_spaces: bool, // Use spaces instead of tabs
    pub ignore_case: bool,

    // Running
    pub shell: Shell,
    /// Where an unsaved buffer is written before it is run
    pub scratch_file: PathBuf,
    /// Seconds between autosaves, 0 disables
    pub autosave_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: "one-dark".to_string(),
            console_height: 25,
            scrollback: 1000,

            tab_width: 4,
            insert_spaces: true,
            ignore_case: true,

            shell: Shell::platform_default(),
            scratch_file: default_scratch_file(),
            autosave_secs: 60,
        }
    }
}

fn default_scratch_file() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("temp_run.bat")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.autosave_secs, 60);
        assert!(settings.ignore_case);
        assert_eq!(
            settings.scratch_file.file_name().unwrap().to_str(),
            Some("temp_run.bat")
        );
    }
}
