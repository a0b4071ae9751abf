use tracing::debug;

use crate::tree::{runner::RunContext, tasks::Task};

/// Run `tasks` strictly in order.
///
/// After the first task that ends [`Failed`](crate::tree::state::TaskStatus::Failed),
/// every remaining task is marked skipped and never started. A task whose
/// command could not be spawned counts as failed.
pub async fn run_sequential(tasks: &mut [Task], ctx: &RunContext) {
    let mut failed = false;
    for task in tasks.iter_mut() {
        if failed {
            task.skip(ctx);
            continue;
        }
        if let Err(e) = task.run(ctx).await {
            debug!("[{}] Continuing group after error: {}", task.name, e);
        }
        failed = task.status().is_failed();
    }
}
