use std::fmt;
use std::path::PathBuf;

use tokio::process::Command;

use super::RunError;

/// Which kind of run a request describes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunKind {
    /// A script file saved from the editor buffer
    Script,
    /// A one-shot command typed into the console
    Command,
}

impl fmt::Display for RunKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunKind::Script => f.write_str("script"),
            RunKind::Command => f.write_str("command"),
        }
    }
}

/// What to execute. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunRequest {
    Script(PathBuf),
    Command(String),
}

impl RunRequest {
    pub fn script(path: impl Into<PathBuf>) -> Self {
        RunRequest::Script(path.into())
    }

    pub fn command(cmd: impl Into<String>) -> Self {
        RunRequest::Command(cmd.into())
    }

    pub fn kind(&self) -> RunKind {
        match self {
            RunRequest::Script(_) => RunKind::Script,
            RunRequest::Command(_) => RunKind::Command,
        }
    }

    /// Reject requests that can never spawn
    pub fn validate(&self) -> Result<(), RunError> {
        match self {
            RunRequest::Script(path) if !path.is_file() => {
                Err(RunError::ScriptNotFound(path.clone()))
            }
            RunRequest::Command(cmd) if cmd.trim().is_empty() => Err(RunError::EmptyCommand),
            _ => Ok(()),
        }
    }

    /// Build the interpreter invocation for this request
    pub fn to_command(&self, shell: &Shell) -> Command {
        let mut cmd = Command::new(&shell.program);
        match self {
            RunRequest::Script(path) => {
                if let Some(flag) = &shell.script_flag {
                    cmd.arg(flag);
                }
                cmd.arg(path);
            }
            RunRequest::Command(line) => {
                cmd.arg(&shell.command_flag).arg(line.trim());
            }
        }
        cmd
    }

    /// Human-readable form used in logs and error messages
    pub fn describe(&self, shell: &Shell) -> String {
        match self {
            RunRequest::Script(path) => match &shell.script_flag {
                Some(flag) => format!("{} {} {}", shell.program, flag, path.display()),
                None => format!("{} {}", shell.program, path.display()),
            },
            RunRequest::Command(line) => {
                format!("{} {} {}", shell.program, shell.command_flag, line.trim())
            }
        }
    }
}

/// The command interpreter used to launch requests
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shell {
    pub program: String,
    /// Flag preceding a literal command line (`-c`, `/C`)
    pub command_flag: String,
    /// Flag preceding a script path, if the interpreter needs one
    pub script_flag: Option<String>,
}

impl Shell {
    pub fn new(program: impl Into<String>, command_flag: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            command_flag: command_flag.into(),
            script_flag: None,
        }
    }

    #[cfg(windows)]
    pub fn platform_default() -> Self {
        Self {
            program: "cmd".to_string(),
            command_flag: "/C".to_string(),
            script_flag: Some("/C".to_string()),
        }
    }

    #[cfg(not(windows))]
    pub fn platform_default() -> Self {
        Self::new("sh", "-c")
    }
}

impl Default for Shell {
    fn default() -> Self {
        Self::platform_default()
    }
}
