use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

use crate::tree::{
    config::TaskSpec, event::TaskTreeEvent, executor::run_sequential, state::TaskStatus,
    tasks::Task,
};

/// Shared context handed to every task of a run.
///
/// Cloning is cheap; clones report to the same event channel.
#[derive(Debug, Clone, Default)]
pub struct RunContext {
    events: Option<UnboundedSender<TaskTreeEvent>>,
}

impl RunContext {
    pub fn new(events: Option<UnboundedSender<TaskTreeEvent>>) -> Self {
        Self { events }
    }

    /// Forward an event without ever waiting on the receiver.
    pub fn emit(&self, event: TaskTreeEvent) {
        if let Some(tx) = &self.events {
            if tx.send(event).is_err() {
                debug!("Event receiver dropped");
            }
        }
    }
}

/// Per-status node counts of a finished run.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub total_tasks: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    pub aborted: usize,
    /// Nodes left in `Init` or `Running`
    pub unfinished: usize,
    /// Whether any top-level task failed
    pub top_level_failed: bool,
}

impl RunSummary {
    #[must_use]
    pub fn collect(tasks: &[Task]) -> Self {
        let mut summary = RunSummary::default();
        for task in tasks {
            task.walk(&mut |t| {
                summary.total_tasks += 1;
                match t.status() {
                    TaskStatus::Succeeded => summary.succeeded += 1,
                    TaskStatus::Failed => summary.failed += 1,
                    TaskStatus::Skipped => summary.skipped += 1,
                    TaskStatus::Aborted => summary.aborted += 1,
                    TaskStatus::Init | TaskStatus::Running => summary.unfinished += 1,
                }
            });
        }
        summary.top_level_failed = tasks.iter().any(|t| t.status().is_failed());
        summary
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        !self.top_level_failed
    }
}

/// Runs a top-level sequential group of tasks.
///
/// # Examples
///
/// ```rust,no_run
/// use tasktree::tree::{TaskRunner, TaskStatus, config::TaskSpec};
///
/// # #[tokio::main]
/// # async fn main() {
/// let mut runner = TaskRunner::new([
///     TaskSpec::new("setup").command("echo setup"),
///     TaskSpec::new("build").command("exit 1"),
///     TaskSpec::new("deploy").command("echo never"),
/// ]);
///
/// let summary = runner.execute_all(None).await;
/// assert!(!summary.is_success());
/// assert_eq!(runner.tasks[2].status(), TaskStatus::Skipped);
/// # }
/// ```
#[derive(Debug, Default)]
pub struct TaskRunner {
    pub tasks: Vec<Task>,
}

impl TaskRunner {
    pub fn new<I>(specs: I) -> Self
    where
        I: IntoIterator<Item = TaskSpec>,
    {
        Self {
            tasks: specs.into_iter().map(Task::from).collect(),
        }
    }

    /// Run a single task as the whole tree.
    pub fn from_task(task: Task) -> Self {
        Self { tasks: vec![task] }
    }

    #[must_use]
    pub fn total_tasks(&self) -> usize {
        self.tasks.iter().map(Task::count).sum()
    }

    /// Run every top-level task in order and report the outcome.
    ///
    /// Once a top-level task fails the remaining ones are skipped. Failures are
    /// only ever reported through statuses, so this never errors.
    pub async fn execute_all(
        &mut self,
        event_tx: Option<UnboundedSender<TaskTreeEvent>>,
    ) -> RunSummary {
        let ctx = RunContext::new(event_tx);
        let total_tasks = self.total_tasks();
        info!("Running {} tasks", total_tasks);
        ctx.emit(TaskTreeEvent::ExecutionStarted { total_tasks });

        run_sequential(&mut self.tasks, &ctx).await;

        let summary = RunSummary::collect(&self.tasks);
        if summary.is_success() {
            info!(
                "All tasks completed: {} succeeded, {} skipped",
                summary.succeeded, summary.skipped
            );
        } else {
            warn!(
                "Run failed: {} failed, {} aborted, {} skipped",
                summary.failed, summary.aborted, summary.skipped
            );
        }
        ctx.emit(TaskTreeEvent::ExecutionCompleted {
            summary: summary.clone(),
        });
        summary
    }
}
