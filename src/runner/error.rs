use std::io;
use std::path::PathBuf;

use super::{RunKind, Stream};

/// Errors raised while starting, running or stopping a session
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("failed to start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("script not found: {}", .0.display())]
    ScriptNotFound(PathBuf),

    #[error("command is empty")]
    EmptyCommand,

    #[error("error reading {stream}: {source}")]
    Stream {
        stream: Stream,
        #[source]
        source: io::Error,
    },

    #[error("failed waiting for child: {0}")]
    Wait(#[source] io::Error),

    #[error("a {active} is already running")]
    ConcurrentRunRejected { active: RunKind },

    #[error("nothing is running")]
    NoActiveSession,
}
