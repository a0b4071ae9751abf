use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio_util::sync::CancellationToken;

/// Lifecycle of a single task.
///
/// Every task starts in [`TaskStatus::Init`] and ends in one of the terminal
/// states. `Skipped` and `Aborted` are only reachable through group semantics:
/// a sequential sibling failed before the task could start, or a parallel
/// sibling failed while the task's process was still running.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TaskStatus {
    #[default]
    Init,
    Running,
    Succeeded,
    Failed,
    Skipped,
    Aborted,
}

impl TaskStatus {
    /// Whether no further transition can happen from this status.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TaskStatus::Succeeded | TaskStatus::Failed | TaskStatus::Skipped | TaskStatus::Aborted
        )
    }

    #[must_use]
    pub fn is_failed(self) -> bool {
        self == TaskStatus::Failed
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TaskStatus::Init => "init",
            TaskStatus::Running => "running",
            TaskStatus::Succeeded => "succeeded",
            TaskStatus::Failed => "failed",
            TaskStatus::Skipped => "skipped",
            TaskStatus::Aborted => "aborted",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Default)]
struct HandleState {
    status: TaskStatus,
    // Kill switch of the running process, present only while it runs.
    process: Option<CancellationToken>,
    // Set once a parallel sibling failed; later processes are aborted at once.
    abort_requested: bool,
}

/// Status and process handle of a task, shared with its abort watcher.
///
/// Status and process slot live behind one lock, so an abort taking the
/// process can never interleave with the runner retiring it after exit.
#[derive(Debug, Clone, Default)]
pub(crate) struct TaskHandle {
    inner: std::sync::Arc<Mutex<HandleState>>,
}

impl TaskHandle {
    fn lock(&self) -> MutexGuard<'_, HandleState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn status(&self) -> TaskStatus {
        self.lock().status
    }

    pub(crate) fn set_status(&self, status: TaskStatus) {
        self.lock().status = status;
    }

    /// Publish the kill switch of a freshly spawned process and mark the task running.
    ///
    /// Returns `false` when an abort was requested before the process started.
    /// The task is then already aborted and the caller kills the process.
    pub(crate) fn publish_process(&self, kill: CancellationToken) -> bool {
        let mut state = self.lock();
        if state.abort_requested {
            state.status = TaskStatus::Aborted;
            return false;
        }
        state.status = TaskStatus::Running;
        state.process = Some(kill);
        true
    }

    /// Drop the kill switch once the process has exited.
    pub(crate) fn retire_process(&self) {
        self.lock().process = None;
    }

    #[cfg(test)]
    pub(crate) fn has_process(&self) -> bool {
        self.lock().process.is_some()
    }

    /// Mark the task aborted and hand out the kill switch of its live process.
    ///
    /// Returns `None` when no process was live, leaving the status untouched.
    /// The request is remembered, so a process published afterwards never runs
    /// to completion.
    pub(crate) fn abort(&self) -> Option<CancellationToken> {
        let mut state = self.lock();
        state.abort_requested = true;
        let kill = state.process.take()?;
        state.status = TaskStatus::Aborted;
        Some(kill)
    }

    /// Resolve the status after the process exited.
    ///
    /// A successful exit wins unless an earlier phase already failed. A failed
    /// exit only lands on a task that is still `Running`, so an abort stays put.
    pub(crate) fn finish_process(&self, success: bool, earlier_failure: bool) -> TaskStatus {
        let mut state = self.lock();
        state.process = None;
        if success {
            state.status = if earlier_failure {
                TaskStatus::Failed
            } else {
                TaskStatus::Succeeded
            };
        } else if state.status == TaskStatus::Running {
            state.status = TaskStatus::Failed;
        }
        state.status
    }
}
