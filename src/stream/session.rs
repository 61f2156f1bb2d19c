//! Session state and the handles returned to callers.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Lifecycle of one streaming session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Created, request not yet dispatched
    Pending,
    /// Request dispatched (or being retried), or stream being read
    Active,
    /// Stream ended cleanly
    Completed,
    /// Unrecoverable error reported to the error callback
    Failed,
    /// Cancelled by the caller or by the external signal
    Cancelled,
}

impl SessionState {
    /// True for `Completed`, `Failed` and `Cancelled`.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionState::Completed | SessionState::Failed | SessionState::Cancelled
        )
    }

    /// Short label for logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Pending => "pending",
            SessionState::Active => "active",
            SessionState::Completed => "completed",
            SessionState::Failed => "failed",
            SessionState::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cancels one session.
///
/// Cloneable and safe to call from any task or thread, any number of times.
/// The first call makes the session report [`crate::error::StreamError::Cancelled`]
/// to its error callback, unless the session already reached a terminal state.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    token: CancellationToken,
    manual: Arc<AtomicBool>,
}

impl CancelHandle {
    pub(crate) fn new(token: CancellationToken) -> Self {
        Self {
            token,
            manual: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Cancel the session.
    pub fn cancel(&self) {
        self.manual.store(true, Ordering::SeqCst);
        self.token.cancel();
    }

    /// True once the session's token has been triggered, by either path.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub(crate) fn was_manual(&self) -> bool {
        self.manual.load(Ordering::SeqCst)
    }

    pub(crate) fn token(&self) -> &CancellationToken {
        &self.token
    }
}

/// Handle to a running session.
///
/// Dropping the handle does not cancel the session.
#[derive(Debug)]
pub struct StreamHandle {
    session_id: String,
    cancel: CancelHandle,
    state: watch::Receiver<SessionState>,
    task: JoinHandle<SessionState>,
}

impl StreamHandle {
    pub(crate) fn new(
        session_id: String,
        cancel: CancelHandle,
        state: watch::Receiver<SessionState>,
        task: JoinHandle<SessionState>,
    ) -> Self {
        Self {
            session_id,
            cancel,
            state,
            task,
        }
    }

    /// Cancel the session. See [`CancelHandle::cancel`].
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// A detached cancel capability, e.g. to move into a callback.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Identifier used in this session's log records.
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    /// Wait for the session to end and return its terminal state.
    ///
    /// All callbacks have returned by the time this resolves. A panic inside
    /// a callback is reported as `Failed`.
    pub async fn wait(self) -> SessionState {
        match self.task.await {
            Ok(state) => state,
            Err(err) => {
                tracing::error!(session_id = %self.session_id, "stream session task failed: {}", err);
                SessionState::Failed
            }
        }
    }
}
