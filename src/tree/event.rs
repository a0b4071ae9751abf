//! Progress events for task tree execution.
//!
//! Events are purely observational. They are sent over an unbounded channel so
//! that reporting never holds up a running task, and a dropped receiver is
//! silently tolerated.

use crate::tree::{
    error::TaskTreeError, output::StreamSource, runner::RunSummary, state::TaskStatus,
};

/// Events emitted while a task tree runs.
///
/// # Event Categories
///
/// - **Execution Events**: Whole-run boundaries (`ExecutionStarted`, `ExecutionCompleted`)
/// - **Task Events**: Per-task lifecycle (`Started`, `Output`, `Stopped`)
/// - **Group Events**: Outcomes imposed by a group (`Skipped`, `Aborted`)
/// - **Error Events**: A task's command could not be started
///
/// # Examples
///
/// ```rust
/// use tokio::sync::mpsc;
/// use tasktree::tree::{TaskRunner, config::TaskSpec, event::TaskTreeEvent};
///
/// # #[tokio::main]
/// # async fn main() {
/// let (event_tx, mut event_rx) = mpsc::unbounded_channel();
/// let mut runner = TaskRunner::new([TaskSpec::new("noop")]);
/// runner.execute_all(Some(event_tx)).await;
///
/// while let Some(event) = event_rx.recv().await {
///     if let TaskTreeEvent::ExecutionCompleted { summary } = event {
///         assert!(summary.is_success());
///     }
/// }
/// # }
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub enum TaskTreeEvent {
    /// A run is starting.
    ExecutionStarted {
        /// Number of nodes in the whole tree
        total_tasks: usize,
    },

    /// A task began running.
    Started { task_name: String },

    /// A line was read from a task's command.
    Output {
        task_name: String,
        line: String,
        src: StreamSource,
    },

    /// A task was not run because an earlier sequential sibling failed.
    Skipped { task_name: String },

    /// A task's process was killed because a parallel sibling failed.
    Aborted { task_name: String },

    /// A task's command could not be started.
    Error {
        task_name: String,
        error: TaskTreeError,
    },

    /// A task reached its terminal status.
    Stopped {
        task_name: String,
        status: TaskStatus,
    },

    /// A run finished.
    ExecutionCompleted { summary: RunSummary },
}

impl TaskTreeEvent {
    #[must_use]
    pub fn task_name(&self) -> Option<&str> {
        match self {
            TaskTreeEvent::Started { task_name }
            | TaskTreeEvent::Output { task_name, .. }
            | TaskTreeEvent::Skipped { task_name }
            | TaskTreeEvent::Aborted { task_name }
            | TaskTreeEvent::Error { task_name, .. }
            | TaskTreeEvent::Stopped { task_name, .. } => Some(task_name),
            TaskTreeEvent::ExecutionStarted { .. } | TaskTreeEvent::ExecutionCompleted { .. } => {
                None
            }
        }
    }

    #[must_use]
    pub fn is_task_event(&self) -> bool {
        self.task_name().is_some()
    }

    #[must_use]
    pub fn is_execution_event(&self) -> bool {
        !self.is_task_event()
    }
}
