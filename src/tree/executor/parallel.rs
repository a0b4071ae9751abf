use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use crate::tree::{
    event::TaskTreeEvent, runner::RunContext, state::TaskHandle, tasks::Task,
};

/// Run `tasks` concurrently, each on its own tokio task.
///
/// The first task to end [`Failed`](crate::tree::state::TaskStatus::Failed)
/// fires a one-shot failure signal. Every task has a watcher that, on the
/// signal, kills its task's process if it is still running and marks the task
/// aborted. Tasks that already finished keep their status, and so does the
/// failing task itself since its process is retired before the signal fires.
///
/// Returns once every task and every watcher has finished. Tasks come back in
/// their original order.
pub async fn run_parallel(tasks: &mut Vec<Task>, ctx: &RunContext) {
    let failed = CancellationToken::new();
    let finished = CancellationToken::new();
    let mut runners = JoinSet::new();
    let mut watchers = JoinSet::new();

    for (index, mut task) in std::mem::take(tasks).into_iter().enumerate() {
        watchers.spawn(watch_for_abort(
            task.name.clone(),
            task.handle().clone(),
            failed.clone(),
            finished.clone(),
            ctx.clone(),
        ));

        let failed = failed.clone();
        let ctx = ctx.clone();
        runners.spawn(async move {
            if let Err(e) = task.run(&ctx).await {
                debug!("[{}] Continuing group after error: {}", task.name, e);
            }
            if task.status().is_failed() {
                failed.cancel();
            }
            (index, task)
        });
    }

    let mut done = Vec::with_capacity(runners.len());
    while let Some(joined) = runners.join_next().await {
        match joined {
            Ok(entry) => done.push(entry),
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(e) => error!("Parallel task did not complete: {}", e),
        }
    }

    // Release watchers that never saw a failure.
    finished.cancel();
    while let Some(joined) = watchers.join_next().await {
        if let Err(e) = joined {
            if e.is_panic() {
                std::panic::resume_unwind(e.into_panic());
            }
        }
    }

    done.sort_by_key(|(index, _)| *index);
    tasks.extend(done.into_iter().map(|(_, task)| task));
}

async fn watch_for_abort(
    task_name: String,
    handle: TaskHandle,
    failed: CancellationToken,
    finished: CancellationToken,
    ctx: RunContext,
) {
    tokio::select! {
        biased;
        _ = failed.cancelled() => {
            if let Some(kill) = handle.abort() {
                warn!("[{}] Task aborted because a parallel task failed", task_name);
                ctx.emit(TaskTreeEvent::Aborted { task_name });
                kill.cancel();
            }
        }
        _ = finished.cancelled() => {}
    }
}
