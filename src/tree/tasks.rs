use std::{collections::HashMap, future::Future, pin::Pin};

use tokio::{sync::mpsc, task::JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::tree::{
    config::{TaskShell, TaskSpec},
    error::TaskTreeError,
    event::TaskTreeEvent,
    executor::{run_parallel, run_sequential},
    output::{StreamSource, TaskOutput, drain_lines},
    process::ShellProcess,
    runner::RunContext,
    state::{TaskHandle, TaskStatus},
};

/// Boxed future returned by [`Task::run`], boxed because runs recurse into children.
pub type TaskRunFuture<'a> =
    Pin<Box<dyn Future<Output = Result<TaskStatus, TaskTreeError>> + Send + 'a>>;

/// A node of the task tree.
///
/// The shape of the tree (name, command, children) is fixed once built; a run
/// only changes the status and the captured output.
#[derive(Debug)]
pub struct Task {
    pub name: String,
    pub command: Option<String>,
    pub shell: TaskShell,
    pub working_dir: Option<String>,
    pub env: Option<HashMap<String, String>>,
    pub parallel: Vec<Task>,
    pub sequential: Vec<Task>,
    output: TaskOutput,
    handle: TaskHandle,
}

impl From<TaskSpec> for Task {
    fn from(spec: TaskSpec) -> Self {
        let command = spec.effective_command().map(str::to_string);
        Task {
            name: spec.name,
            command,
            shell: spec.shell.unwrap_or_default(),
            working_dir: spec.working_dir,
            env: spec.env,
            parallel: spec.parallel.into_iter().map(Task::from).collect(),
            sequential: spec.sequential.into_iter().map(Task::from).collect(),
            output: TaskOutput::default(),
            handle: TaskHandle::default(),
        }
    }
}

impl Task {
    #[must_use]
    pub fn status(&self) -> TaskStatus {
        self.handle.status()
    }

    #[must_use]
    pub fn output(&self) -> &TaskOutput {
        &self.output
    }

    #[must_use]
    pub fn stdout(&self) -> &[String] {
        &self.output.stdout
    }

    #[must_use]
    pub fn stderr(&self) -> &[String] {
        &self.output.stderr
    }

    #[must_use]
    pub fn combined(&self) -> &[String] {
        &self.output.combined
    }

    /// Children of both groups, parallel first.
    pub fn children(&self) -> impl Iterator<Item = &Task> {
        self.parallel.iter().chain(self.sequential.iter())
    }

    /// Number of nodes in this subtree, including itself.
    #[must_use]
    pub fn count(&self) -> usize {
        1 + self.children().map(Task::count).sum::<usize>()
    }

    /// Visit this task and all its descendants, parents before children.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Task)) {
        visit(self);
        for child in self.children() {
            child.walk(visit);
        }
    }

    pub(crate) fn handle(&self) -> &TaskHandle {
        &self.handle
    }

    /// Mark this task and its whole subtree as skipped without running anything.
    pub(crate) fn skip(&mut self, ctx: &RunContext) {
        info!("[{}] Task skipped because previous task failed", self.name);
        self.handle.set_status(TaskStatus::Skipped);
        ctx.emit(TaskTreeEvent::Skipped {
            task_name: self.name.clone(),
        });
        for child in self.parallel.iter_mut().chain(self.sequential.iter_mut()) {
            child.skip(ctx);
        }
    }

    /// Run this task: parallel children, then sequential children, then the command.
    ///
    /// On return the status is terminal. A failure in any phase is sticky, so a
    /// succeeding command cannot hide a failed child. The command still runs
    /// after a failed child phase.
    ///
    /// # Errors
    ///
    /// Returns [`TaskTreeError`] when the command could not be started. The
    /// task is then [`TaskStatus::Failed`].
    pub fn run<'a>(&'a mut self, ctx: &'a RunContext) -> TaskRunFuture<'a> {
        Box::pin(async move {
            info!("[{}] Start task", self.name);
            ctx.emit(TaskTreeEvent::Started {
                task_name: self.name.clone(),
            });

            let result = self.run_phases(ctx).await;
            let status = self.handle.status();
            match &result {
                Ok(_) => info!("[{}] End task ({})", self.name, status),
                Err(e) => {
                    error!("[{}] {}", self.name, e);
                    ctx.emit(TaskTreeEvent::Error {
                        task_name: self.name.clone(),
                        error: e.clone(),
                    });
                }
            }
            ctx.emit(TaskTreeEvent::Stopped {
                task_name: self.name.clone(),
                status,
            });
            result.map(|()| status)
        })
    }

    async fn run_phases(&mut self, ctx: &RunContext) -> Result<(), TaskTreeError> {
        let mut children_failed = false;

        if !self.parallel.is_empty() {
            self.handle.set_status(TaskStatus::Running);
            run_parallel(&mut self.parallel, ctx).await;
            children_failed |= self.parallel.iter().any(|t| t.status().is_failed());
            self.settle_children(children_failed);
        }

        if !self.sequential.is_empty() {
            self.handle.set_status(TaskStatus::Running);
            run_sequential(&mut self.sequential, ctx).await;
            children_failed |= self.sequential.iter().any(|t| t.status().is_failed());
            self.settle_children(children_failed);
        }

        let Some(command) = self.command.clone() else {
            if self.parallel.is_empty() && self.sequential.is_empty() {
                self.handle.set_status(TaskStatus::Succeeded);
            }
            return Ok(());
        };

        if let Err(e) = self.run_command(&command, children_failed, ctx).await {
            self.handle.set_status(TaskStatus::Failed);
            return Err(e);
        }
        Ok(())
    }

    fn settle_children(&self, children_failed: bool) {
        let status = if children_failed {
            error!("[{}] Task failed because a child failed", self.name);
            TaskStatus::Failed
        } else {
            TaskStatus::Succeeded
        };
        self.handle.set_status(status);
    }

    async fn run_command(
        &mut self,
        command: &str,
        children_failed: bool,
        ctx: &RunContext,
    ) -> Result<(), TaskTreeError> {
        let (mut process, stdout, stderr) = ShellProcess::spawn(
            &self.name,
            command,
            &self.shell,
            self.working_dir.as_deref(),
            self.env.as_ref(),
        )?;

        let kill = CancellationToken::new();
        if !self.handle.publish_process(kill.clone()) {
            warn!("[{}] Task aborted because a parallel task failed", self.name);
            ctx.emit(TaskTreeEvent::Aborted {
                task_name: self.name.clone(),
            });
            kill.cancel();
        }

        let (line_tx, mut line_rx) = mpsc::unbounded_channel();
        let stdout_reader =
            drain_lines(self.name.clone(), stdout, StreamSource::Stdout, line_tx.clone());
        let stderr_reader = drain_lines(self.name.clone(), stderr, StreamSource::Stderr, line_tx);

        let name = self.name.as_str();
        let output = &mut self.output;
        let handle = &self.handle;

        // Both drainers hold a sender, so the channel closes once both streams end.
        let collect = async {
            while let Some((src, line)) = line_rx.recv().await {
                debug!("[{}] {}", name, line);
                ctx.emit(TaskTreeEvent::Output {
                    task_name: name.to_string(),
                    line: line.clone(),
                    src,
                });
                output.push(src, line);
            }
        };
        let wait = async {
            let success = process.wait_or_kill(&kill).await;
            handle.retire_process();
            success
        };
        let ((), success) = tokio::join!(collect, wait);
        join_readers(&self.name, stdout_reader, stderr_reader).await;

        let status = self.handle.finish_process(success, children_failed);
        if status.is_failed() {
            error!("[{}] Task failed", self.name);
        }
        Ok(())
    }
}

/// Wait for both stream drainers, re-raising a drainer panic on this task.
async fn join_readers(task_name: &str, stdout: JoinHandle<()>, stderr: JoinHandle<()>) {
    let (stdout_done, stderr_done) = tokio::join!(stdout, stderr);
    for joined in [stdout_done, stderr_done] {
        if let Err(e) = joined {
            if e.is_panic() {
                std::panic::resume_unwind(e.into_panic());
            }
            warn!("[{}] Output reader did not complete: {}", task_name, e);
        }
    }
}


#[cfg(all(test, unix))]
mod tests {
    use std::time::Duration;

    use tokio::time::timeout;

    use crate::tree::{
        config::TaskSpec, error::TaskTreeError, event::TaskTreeEvent, runner::RunContext,
        state::TaskStatus, tasks::Task,
    };

    async fn run(spec: TaskSpec) -> (Task, Result<TaskStatus, TaskTreeError>) {
        let mut task = Task::from(spec);
        let ctx = RunContext::default();
        let result = timeout(Duration::from_secs(10), task.run(&ctx))
            .await
            .expect("task run timed out");
        (task, result)
    }

    #[tokio::test]
    async fn test_noop_task_succeeds() {
        let (task, result) = run(TaskSpec::new("noop")).await;
        assert_eq!(result, Ok(TaskStatus::Succeeded));
        assert_eq!(task.status(), TaskStatus::Succeeded);
        assert!(task.output().is_empty());
    }

    #[tokio::test]
    async fn test_blank_command_is_noop() {
        let (task, result) = run(TaskSpec::new("blank").command("   ")).await;
        assert!(task.command.is_none());
        assert_eq!(result, Ok(TaskStatus::Succeeded));
    }

    #[tokio::test]
    async fn test_successful_command() {
        let (task, result) = run(TaskSpec::new("ok").command("exit 0")).await;
        assert_eq!(result, Ok(TaskStatus::Succeeded));
        assert_eq!(task.status(), TaskStatus::Succeeded);
    }

    #[tokio::test]
    async fn test_failing_command() {
        let (task, result) = run(TaskSpec::new("bad").command("exit 1")).await;
        assert_eq!(result, Ok(TaskStatus::Failed));
        assert_eq!(task.status(), TaskStatus::Failed);
    }

    #[tokio::test]
    async fn test_output_is_captured_per_stream() {
        let (task, result) = run(TaskSpec::new("talk").command(
            "echo out1; echo err1 1>&2; echo out2; echo err2 1>&2",
        ))
        .await;
        assert_eq!(result, Ok(TaskStatus::Succeeded));
        assert_eq!(task.stdout(), ["out1", "out2"]);
        assert_eq!(task.stderr(), ["err1", "err2"]);

        let combined = task.combined();
        assert_eq!(combined.len(), 4);
        let pos = |s: &str| combined.iter().position(|l| l == s).unwrap();
        assert!(pos("out1") < pos("out2"));
        assert!(pos("err1") < pos("err2"));
    }

    #[tokio::test]
    async fn test_output_of_failing_command_is_kept() {
        let (task, result) = run(TaskSpec::new("loud").command("echo before; exit 2")).await;
        assert_eq!(result, Ok(TaskStatus::Failed));
        assert_eq!(task.stdout(), ["before"]);
    }

    #[tokio::test]
    async fn test_env_and_working_dir() {
        let (task, _) = run(TaskSpec::new("env")
            .command("echo \"$GREETING\"; pwd")
            .env([("GREETING", "hello")])
            .working_dir("/"))
        .await;
        assert_eq!(task.stdout(), ["hello", "/"]);
    }

    #[tokio::test]
    async fn test_spawn_error_resolves_to_failed() {
        let (task, result) = run(TaskSpec::new("nowhere")
            .command("true")
            .working_dir("/definitely/not/a/real/dir"))
        .await;
        assert!(matches!(result, Err(TaskTreeError::Spawn { .. })));
        assert_eq!(task.status(), TaskStatus::Failed);
        assert!(!task.handle().has_process());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_parallel_children_all_succeed() {
        let (task, result) = run(TaskSpec::new("parent").parallel([
            TaskSpec::new("x").command("exit 0"),
            TaskSpec::new("y").command("exit 0"),
        ]))
        .await;
        assert_eq!(result, Ok(TaskStatus::Succeeded));
        assert!(task.parallel.iter().all(|t| t.status() == TaskStatus::Succeeded));
    }

    #[tokio::test]
    async fn test_sequential_child_failure_dominates_own_command() {
        let (task, result) = run(TaskSpec::new("parent")
            .sequential([
                TaskSpec::new("x").command("exit 0"),
                TaskSpec::new("y").command("exit 1"),
            ])
            .command("echo own"))
        .await;
        assert_eq!(task.sequential[0].status(), TaskStatus::Succeeded);
        assert_eq!(task.sequential[1].status(), TaskStatus::Failed);
        // The command still ran, but cannot upgrade the parent
        assert_eq!(task.stdout(), ["own"]);
        assert_eq!(result, Ok(TaskStatus::Failed));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_parallel_failure_is_not_undone_by_sequential_success() {
        let (task, result) = run(TaskSpec::new("parent")
            .parallel([TaskSpec::new("p").command("exit 1")])
            .sequential([TaskSpec::new("s").command("exit 0")]))
        .await;
        assert_eq!(task.parallel[0].status(), TaskStatus::Failed);
        assert_eq!(task.sequential[0].status(), TaskStatus::Succeeded);
        assert_eq!(result, Ok(TaskStatus::Failed));
    }

    #[tokio::test]
    async fn test_phases_run_parallel_then_sequential_then_command() {
        let dir = std::env::temp_dir().join(format!("tasktree-order-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let log = dir.join("order.log");
        let _ = std::fs::remove_file(&log);
        let append = |word: &str| format!("echo {} >> {}", word, log.display());

        let (_, result) = run(TaskSpec::new("parent")
            .parallel([TaskSpec::new("p").command(append("parallel"))])
            .sequential([TaskSpec::new("s").command(append("sequential"))])
            .command(append("own")))
        .await;
        assert_eq!(result, Ok(TaskStatus::Succeeded));

        let order = std::fs::read_to_string(&log).unwrap();
        assert_eq!(order.lines().collect::<Vec<_>>(), ["parallel", "sequential", "own"]);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_events_for_single_task() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let ctx = RunContext::new(Some(tx));
        let mut task = Task::from(TaskSpec::new("echo").command("echo hi"));
        task.run(&ctx).await.unwrap();
        drop(ctx);

        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        assert!(matches!(&events[0], TaskTreeEvent::Started { task_name } if task_name == "echo"));
        assert!(events.iter().any(
            |e| matches!(e, TaskTreeEvent::Output { line, .. } if line == "hi")
        ));
        assert!(matches!(
            events.last(),
            Some(TaskTreeEvent::Stopped { status: TaskStatus::Succeeded, .. })
        ));
    }
}
