use std::fmt;
use std::future::Future;
use std::io;
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Child;
use tokio::sync::oneshot;

use super::relay::decode_line;
use super::{OutputRelay, RunError, RunRequest, Shell, Stream};

/// Prefix of the stderr line reported when a session fails internally
pub const ERROR_PREFIX: &str = "[ERROR] ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Terminal state of a session, carried by its completion event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Both streams closed and the child exited. `code` is `None` when the
    /// child was killed by a signal.
    Exited { code: Option<i32> },
    /// A stop was requested before the child finished
    Cancelled,
    /// Reading the child failed; the reason was already relayed as an
    /// `[ERROR]` line
    Failed(String),
}

/// Handle to one in-flight child process.
///
/// The child and its stream readers live on a dedicated task; this handle only
/// carries the stop channel. Dropping it does not stop the child.
pub struct RunSession {
    id: SessionId,
    request: RunRequest,
    stop_tx: Option<oneshot::Sender<()>>,
}

impl RunSession {
    /// Spawn the child for `request` and start relaying its output.
    ///
    /// Must be called from within a tokio runtime. Spawn failures are returned
    /// here and no events are ever relayed for them.
    pub fn start<R: OutputRelay>(
        id: SessionId,
        request: RunRequest,
        shell: &Shell,
        relay: R,
    ) -> Result<Self, RunError> {
        request.validate()?;

        let command_line = request.describe(shell);
        let mut command = request.to_command(shell);
        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = command.spawn().map_err(|source| RunError::Spawn {
            command: command_line.clone(),
            source,
        })?;
        tracing::info!(session = %id, pid = ?child.id(), command = %command_line, "session started");

        let (stop_tx, stop_rx) = oneshot::channel();
        let relay = Arc::new(relay);
        let task = drive(child, stop_rx, Arc::clone(&relay));
        tokio::spawn(supervise(id, task, relay));

        Ok(Self {
            id,
            request,
            stop_tx: Some(stop_tx),
        })
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn request(&self) -> &RunRequest {
        &self.request
    }

    /// Ask the session to stop. Returns false if a stop was already sent or
    /// the session has already completed.
    pub fn stop(&mut self) -> bool {
        match self.stop_tx.take() {
            Some(tx) => tx.send(()).is_ok(),
            None => false,
        }
    }
}

/// Runs the session `task` on an inner task so that a panic there still ends
/// in exactly one completion event.
async fn supervise<R, F>(id: SessionId, task: F, relay: Arc<R>)
where
    R: OutputRelay,
    F: Future<Output = RunOutcome> + Send + 'static,
{
    let outcome = match tokio::spawn(task).await {
        Ok(outcome) => outcome,
        Err(err) => RunOutcome::Failed(format!("session task aborted: {err}")),
    };

    match &outcome {
        RunOutcome::Exited { code } => {
            tracing::info!(session = %id, code = ?code, "session exited");
        }
        RunOutcome::Cancelled => tracing::info!(session = %id, "session cancelled"),
        RunOutcome::Failed(reason) => {
            tracing::warn!(session = %id, %reason, "session failed");
            relay.line(Stream::Stderr, format!("{ERROR_PREFIX}{reason}"));
        }
    }
    relay.finished(outcome);
}

async fn drive<R: OutputRelay>(
    mut child: Child,
    mut stop_rx: oneshot::Receiver<()>,
    relay: Arc<R>,
) -> RunOutcome {
    let stdout = child.stdout.take();
    let stderr = child.stderr.take();
    let relay = relay.as_ref();

    let finished = run_to_exit(stdout, stderr, child.wait(), relay);

    // A dropped handle closes the channel without a stop; only an explicit
    // stop matches `Ok(())`.
    tokio::select! {
        result = finished => return outcome_of(result),
        Ok(()) = &mut stop_rx => {}
    }

    // Best effort: the child may still be alive when completion is relayed.
    if let Err(err) = child.start_kill() {
        tracing::warn!(error = %err, "failed to signal child");
    }
    RunOutcome::Cancelled
}

/// Drain both streams, then wait for the exit status
async fn run_to_exit<O, E, W, R>(
    stdout: Option<O>,
    stderr: Option<E>,
    wait: W,
    relay: &R,
) -> Result<ExitStatus, RunError>
where
    O: AsyncRead + Unpin,
    E: AsyncRead + Unpin,
    W: Future<Output = io::Result<ExitStatus>>,
    R: OutputRelay + ?Sized,
{
    tokio::try_join!(
        pump(stdout, Stream::Stdout, relay),
        pump(stderr, Stream::Stderr, relay),
    )?;
    wait.await.map_err(RunError::Wait)
}

fn outcome_of(result: Result<ExitStatus, RunError>) -> RunOutcome {
    match result {
        Ok(status) => RunOutcome::Exited {
            code: status.code(),
        },
        Err(err) => RunOutcome::Failed(err.to_string()),
    }
}

/// Relay every line of `source` in order until end-of-stream
async fn pump<S, R>(source: Option<S>, stream: Stream, relay: &R) -> Result<(), RunError>
where
    S: AsyncRead + Unpin,
    R: OutputRelay + ?Sized,
{
    let Some(source) = source else {
        return Ok(());
    };
    let mut reader = BufReader::new(source);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .await
            .map_err(|source| RunError::Stream { stream, source })?;
        if read == 0 {
            return Ok(());
        }
        relay.line(stream, decode_line(&buf));
    }
}
