use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use super::{
    ChannelRelay, RunError, RunEvent, RunEventKind, RunKind, RunRequest, RunSession, SessionId,
    Shell,
};

/// Owns the single active session and the channel its events arrive on.
///
/// File runs and one-shot commands share the same slot: starting anything
/// while a session is active is rejected.
pub struct Runner {
    shell: Shell,
    tx: UnboundedSender<RunEvent>,
    rx: UnboundedReceiver<RunEvent>,
    active: Option<RunSession>,
    next_id: u64,
}

impl Runner {
    pub fn new(shell: Shell) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            shell,
            tx,
            rx,
            active: None,
            next_id: 1,
        }
    }

    /// Start a session for `request`. The active session, if any, is left
    /// untouched on rejection.
    pub fn start(&mut self, request: RunRequest) -> Result<SessionId, RunError> {
        if let Some(active) = &self.active {
            tracing::debug!(active = %active.id(), "run rejected, session active");
            return Err(RunError::ConcurrentRunRejected {
                active: active.request().kind(),
            });
        }

        let id = SessionId(self.next_id);
        let relay = ChannelRelay::new(id, self.tx.clone());
        let session = RunSession::start(id, request, &self.shell, relay)?;
        self.next_id += 1;
        self.active = Some(session);
        Ok(id)
    }

    /// Request a stop of the active session. It stays active until its
    /// completion event is observed.
    pub fn stop(&mut self) -> Result<SessionId, RunError> {
        let session = self.active.as_mut().ok_or(RunError::NoActiveSession)?;
        if session.stop() {
            tracing::info!(session = %session.id(), "stop requested");
        }
        Ok(session.id())
    }

    pub fn is_busy(&self) -> bool {
        self.active.is_some()
    }

    pub fn active_kind(&self) -> Option<RunKind> {
        self.active.as_ref().map(|s| s.request().kind())
    }

    /// Track completion of the active session. Events from older sessions
    /// are ignored.
    pub fn observe(&mut self, event: &RunEvent) {
        if !matches!(event.kind, RunEventKind::Finished(_)) {
            return;
        }
        if self.active.as_ref().map(RunSession::id) == Some(event.session) {
            self.active = None;
        }
    }

    /// Next event from any session. The runner keeps a sender alive, so this
    /// only returns `None` if the runner is being torn down.
    pub async fn next_event(&mut self) -> Option<RunEvent> {
        self.rx.recv().await
    }

    /// Non-blocking variant of [`Runner::next_event`]
    pub fn try_next_event(&mut self) -> Option<RunEvent> {
        self.rx.try_recv().ok()
    }
}

impl Default for Runner {
    fn default() -> Self {
        Self::new(Shell::platform_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::{OutputLine, RunOutcome, Stream};
    use std::time::Duration;
    use tokio::time::timeout;

    async fn next(runner: &mut Runner) -> RunEvent {
        let event = timeout(Duration::from_secs(10), runner.next_event())
            .await
            .expect("no event")
            .expect("channel closed");
        runner.observe(&event);
        event
    }

    #[test]
    fn stop_without_session_fails() {
        let mut runner = Runner::default();
        assert!(matches!(runner.stop(), Err(RunError::NoActiveSession)));
    }

    #[tokio::test]
    async fn spawn_failure_leaves_runner_idle() {
        let mut runner = Runner::new(Shell::new("/nonexistent/batchpad-shell", "-c"));
        let err = runner.start(RunRequest::command("echo hi")).unwrap_err();
        assert!(matches!(err, RunError::Spawn { .. }));
        assert!(!runner.is_busy());
    }

    #[tokio::test]
    async fn invalid_request_leaves_runner_idle() {
        let mut runner = Runner::default();
        assert!(matches!(
            runner.start(RunRequest::command("")),
            Err(RunError::EmptyCommand)
        ));
        assert!(!runner.is_busy());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn second_run_is_rejected_and_first_is_undisturbed() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("slow.bat");
        std::fs::write(&script, "echo one\nsleep 0.2\necho two\n").unwrap();

        let mut runner = Runner::default();
        let first = runner.start(RunRequest::script(&script)).unwrap();
        assert_eq!(runner.active_kind(), Some(RunKind::Script));

        let err = runner.start(RunRequest::script(&script)).unwrap_err();
        assert!(matches!(
            err,
            RunError::ConcurrentRunRejected {
                active: RunKind::Script
            }
        ));
        let err = runner.start(RunRequest::command("echo other")).unwrap_err();
        assert!(matches!(err, RunError::ConcurrentRunRejected { .. }));

        let mut lines = Vec::new();
        loop {
            let event = next(&mut runner).await;
            assert_eq!(event.session, first);
            match event.kind {
                RunEventKind::Line(line) => lines.push(line),
                RunEventKind::Finished(outcome) => {
                    assert_eq!(outcome, RunOutcome::Exited { code: Some(0) });
                    break;
                }
            }
        }
        let texts: Vec<_> = lines
            .iter()
            .filter(|l| l.stream == Stream::Stdout)
            .map(|l| l.text.as_str())
            .collect();
        assert_eq!(texts, vec!["one", "two"]);
        assert!(!runner.is_busy());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn runner_accepts_new_run_after_completion() {
        let mut runner = Runner::default();
        let first = runner.start(RunRequest::command("echo a")).unwrap();
        while !matches!(next(&mut runner).await.kind, RunEventKind::Finished(_)) {}

        let second = runner.start(RunRequest::command("echo b")).unwrap();
        assert_ne!(first, second);
        assert_eq!(
            next(&mut runner).await.kind,
            RunEventKind::Line(OutputLine {
                stream: Stream::Stdout,
                text: "b".to_string(),
            })
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn stop_keeps_session_active_until_completion() {
        let mut runner = Runner::default();
        let id = runner.start(RunRequest::command("sleep 5")).unwrap();
        assert_eq!(runner.stop().unwrap(), id);
        assert!(runner.is_busy());

        let event = timeout(Duration::from_millis(200), runner.next_event())
            .await
            .expect("completion not observed within 200ms")
            .unwrap();
        assert_eq!(event.kind, RunEventKind::Finished(RunOutcome::Cancelled));
        runner.observe(&event);
        assert!(!runner.is_busy());
    }

    #[test]
    fn stale_completion_is_ignored() {
        let mut runner = Runner::default();
        runner.observe(&RunEvent {
            session: SessionId(42),
            kind: RunEventKind::Finished(RunOutcome::Cancelled),
        });
        assert!(!runner.is_busy());
    }
}
