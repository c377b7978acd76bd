use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use rhai::{Engine, Scope};

use super::Settings;
use crate::runner::Shell;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config parse error: {0}")]
    Parse(String),

    #[error("config error: {0}")]
    Eval(String),
}

/// The Rhai scripting engine for configuration
pub struct ConfigEngine {
    engine: Engine,
    settings: Arc<RwLock<Settings>>,
}

impl ConfigEngine {
    pub fn new() -> Self {
        let settings = Arc::new(RwLock::new(Settings::default()));
        let engine = Self::create_engine(Arc::clone(&settings));

        Self { engine, settings }
    }

    fn create_engine(settings: Arc<RwLock<Settings>>) -> Engine {
        let mut engine = Engine::new();

        // Limit script execution for safety
        engine.set_max_expr_depths(64, 64);
        engine.set_max_operations(100_000);

        {
            let s = Arc::clone(&settings);
            engine.register_fn("set_theme", move |name: &str| {
                if let Ok(mut settings) = s.write() {
                    settings.theme = name.to_string();
                }
            });
        }

        {
            let s = Arc::clone(&settings);
            engine.register_fn("get_theme", move || -> String {
                s.read().map(|s| s.theme.clone()).unwrap_or_default()
            });
        }

        {
            let s = Arc::clone(&settings);
            engine.register_fn("set_tab_width", move |width: i64| {
                if let Ok(mut settings) = s.write() {
                    settings.tab_width = width.clamp(1, 16) as usize;
                }
            });
        }

        {
            let s = Arc::clone(&settings);
            engine.register_fn("set_insert_spaces", move |enabled: bool| {
                if let Ok(mut settings) = s.write() {
                    settings.insert_spaces = enabled;
                }
            });
        }

        {
            let s = Arc::clone(&settings);
            engine.register_fn("set_ignore_case", move |enabled: bool| {
                if let Ok(mut settings) = s.write() {
                    settings.ignore_case = enabled;
                }
            });
        }

        // set_shell("bash", "-c"): scripts are passed as a bare argument
        {
            let s = Arc::clone(&settings);
            engine.register_fn("set_shell", move |program: &str, flag: &str| {
                if let Ok(mut settings) = s.write() {
                    settings.shell = Shell::new(program, flag);
                }
            });
        }

        // set_shell("cmd", "/C", "/C"): scripts need a flag too
        {
            let s = Arc::clone(&settings);
            engine.register_fn(
                "set_shell",
                move |program: &str, flag: &str, script_flag: &str| {
                    if let Ok(mut settings) = s.write() {
                        settings.shell = Shell {
                            program: program.to_string(),
                            command_flag: flag.to_string(),
                            script_flag: Some(script_flag.to_string()),
                        };
                    }
                },
            );
        }

        {
            let s = Arc::clone(&settings);
            engine.register_fn("set_scratch_file", move |path: &str| {
                if let Ok(mut settings) = s.write() {
                    settings.scratch_file = PathBuf::from(path);
                }
            });
        }

        {
            let s = Arc::clone(&settings);
            engine.register_fn("set_autosave_interval", move |secs: i64| {
                if let Ok(mut settings) = s.write() {
                    settings.autosave_secs = secs.max(0) as u64;
                }
            });
        }

        {
            let s = Arc::clone(&settings);
            engine.register_fn("set_console_height", move |percent: i64| {
                if let Ok(mut settings) = s.write() {
                    settings.console_height = percent.clamp(10, 90) as u16;
                }
            });
        }

        {
            let s = Arc::clone(&settings);
            engine.register_fn("set_scrollback", move |lines: i64| {
                if let Ok(mut settings) = s.write() {
                    settings.scrollback = lines.clamp(1, 100_000) as usize;
                }
            });
        }

        engine.register_fn("print", |msg: &str| {
            tracing::info!(target: "batchpad::config", "{msg}");
        });

        engine
    }

    /// Load and execute a config file
    pub fn load_file(&mut self, path: &Path) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        self.eval(&content)
    }

    /// Evaluate a Rhai script string
    pub fn eval(&mut self, script: &str) -> Result<(), ConfigError> {
        let ast = self
            .engine
            .compile(script)
            .map_err(|e| ConfigError::Parse(e.to_string()))?;

        let mut scope = Scope::new();
        self.engine
            .run_ast_with_scope(&mut scope, &ast)
            .map_err(|e| ConfigError::Eval(e.to_string()))?;

        Ok(())
    }

    /// Get the current settings (cloned)
    pub fn settings(&self) -> Settings {
        self.settings.read().map(|s| s.clone()).unwrap_or_default()
    }

    /// Get the config directory path
    pub fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("batchpad"))
    }

    /// Get the default config file path
    pub fn config_file() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("init.rhai"))
    }

    /// Load the default config file if it exists
    pub fn load_default(&mut self) -> Result<(), ConfigError> {
        if let Some(config_file) = Self::config_file() {
            if config_file.exists() {
                return self.load_file(&config_file);
            }
        }
        Ok(()) // No config file is fine
    }
}

impl Default for ConfigEngine {
    fn default() -> Self {
        Self::new()
    }
}
