//! Process execution and output relay.
//!
//! A [`Runner`] owns at most one [`RunSession`] at a time. Each session runs on
//! its own tokio task, reads the child's stdout and stderr line by line and
//! forwards every line, followed by exactly one completion event, through an
//! [`OutputRelay`]. The editor consumes those events from its own loop.

mod coordinator;
mod error;
mod relay;
mod request;
mod session;

pub use coordinator::Runner;
pub use error::RunError;
pub use relay::{ChannelRelay, OutputLine, OutputRelay, RunEvent, RunEventKind, Stream};
pub use request::{RunKind, RunRequest, Shell};
pub use session::{RunOutcome, RunSession, SessionId};
