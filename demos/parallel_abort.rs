use tasktree::tree::{TaskRunner, TaskStatus, config::TaskSpec};

/// Example: Parallel abort
/// A failing parallel task kills its still-running siblings
#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let mut runner = TaskRunner::new([TaskSpec::new("checks").parallel([
        TaskSpec::new("long_suite").command("sleep 30"),
        TaskSpec::new("quick_lint").command("echo 'lint clean'"),
        TaskSpec::new("broken_check").command("sleep 1; echo 'check failed' 1>&2; exit 1"),
    ])]);

    let summary = runner.execute_all(None).await;

    for task in &runner.tasks[0].parallel {
        let note = match task.status() {
            TaskStatus::Aborted => " (killed after sibling failure)",
            _ => "",
        };
        println!("{:<14} {}{}", task.name, task.status(), note);
        for line in task.combined() {
            println!("    {}", line);
        }
    }
    println!("{} aborted, {} failed", summary.aborted, summary.failed);
}
