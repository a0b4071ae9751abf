//! Error types for task tree execution.
//!
//! Only failures local to a single task are errors. Command failures, aborts
//! and skips are routine outcomes and are reported through
//! [`TaskStatus`](crate::tree::state::TaskStatus) instead.

use thiserror::Error;

use crate::tree::output::StreamSource;

/// Error raised while starting a task's command.
///
/// A task that hits one of these resolves to
/// [`TaskStatus::Failed`](crate::tree::state::TaskStatus::Failed); its group
/// then reacts exactly as it would to a failing command.
///
/// # Examples
///
/// ```rust
/// use tasktree::tree::error::TaskTreeError;
///
/// let error = TaskTreeError::Spawn {
///     task_name: "build".to_string(),
///     reason: "No such file or directory".to_string(),
/// };
/// assert!(error.to_string().contains("Failed to spawn"));
/// assert_eq!(error.task_name(), "build");
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TaskTreeError {
    /// The shell process could not be started.
    #[error("Failed to spawn command for task '{task_name}': {reason}")]
    Spawn {
        /// Name of the task whose command failed to start
        task_name: String,
        /// Underlying operating system error
        reason: String,
    },

    /// The process started but one of its output pipes was not attached.
    #[error("Failed to attach {stream} of task '{task_name}'")]
    StreamUnavailable {
        task_name: String,
        stream: StreamSource,
    },
}

impl TaskTreeError {
    #[must_use]
    pub fn task_name(&self) -> &str {
        match self {
            TaskTreeError::Spawn { task_name, .. }
            | TaskTreeError::StreamUnavailable { task_name, .. } => task_name,
        }
    }
}
