use std::fmt;

use tokio::sync::mpsc::UnboundedSender;

use super::{RunOutcome, SessionId};

/// Which standard stream a line came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
}

impl fmt::Display for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stream::Stdout => f.write_str("stdout"),
            Stream::Stderr => f.write_str("stderr"),
        }
    }
}

/// One relayed line of child output, without its terminator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLine {
    pub stream: Stream,
    pub text: String,
}

/// Receives the events of one session.
///
/// Calls arrive from the session's task, never from the consumer's own
/// context, so implementations must forward rather than touch UI state.
/// Lines of the same stream arrive in source order; `finished` is called
/// exactly once and always last.
pub trait OutputRelay: Send + Sync + 'static {
    fn line(&self, stream: Stream, text: String);
    fn finished(&self, outcome: RunOutcome);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunEventKind {
    Line(OutputLine),
    Finished(RunOutcome),
}

/// A relay event tagged with the session that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunEvent {
    pub session: SessionId,
    pub kind: RunEventKind,
}

/// Relay that marshals events onto the consumer's loop through a channel
#[derive(Debug, Clone)]
pub struct ChannelRelay {
    session: SessionId,
    tx: UnboundedSender<RunEvent>,
}

impl ChannelRelay {
    pub fn new(session: SessionId, tx: UnboundedSender<RunEvent>) -> Self {
        Self { session, tx }
    }

    fn send(&self, kind: RunEventKind) {
        let event = RunEvent {
            session: self.session,
            kind,
        };
        if self.tx.send(event).is_err() {
            tracing::debug!(session = %self.session, "run event dropped, consumer is gone");
        }
    }
}

impl OutputRelay for ChannelRelay {
    fn line(&self, stream: Stream, text: String) {
        self.send(RunEventKind::Line(OutputLine { stream, text }));
    }

    fn finished(&self, outcome: RunOutcome) {
        self.send(RunEventKind::Finished(outcome));
    }
}

/// Strip the line terminator and decode, replacing invalid UTF-8
pub(crate) fn decode_line(bytes: &[u8]) -> String {
    let bytes = bytes.strip_suffix(b"\n").unwrap_or(bytes);
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}
