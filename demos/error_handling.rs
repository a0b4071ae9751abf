use tasktree::tree::{TaskRunner, TaskStatus, config::TaskSpec, event::TaskTreeEvent};
use tokio::sync::mpsc;

/// Example: Error handling
/// Demonstrates how a failure skips later sequential tasks and fails its parent
#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    println!("Running error handling example...");

    let mut runner = TaskRunner::new([
        TaskSpec::new("release")
            .sequential([
                TaskSpec::new("success_task").command("echo 'This task will succeed'"),
                TaskSpec::new("failing_task").command("echo 'This task will fail'; exit 1"),
                TaskSpec::new("blocked_task").command("echo 'This task will be skipped'"),
            ])
            .command("echo 'Release notes written'"),
        TaskSpec::new("publish").command("echo 'Never published'"),
    ]);

    let (event_tx, mut event_rx) = mpsc::unbounded_channel();

    let printer = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            match event {
                TaskTreeEvent::Skipped { task_name } => println!("Skipped: {}", task_name),
                TaskTreeEvent::Error { task_name, error } => {
                    eprintln!("Error: {} - {}", task_name, error)
                }
                TaskTreeEvent::Stopped {
                    task_name,
                    status: TaskStatus::Failed,
                } => eprintln!("Failed: {}", task_name),
                _ => {}
            }
        }
    });

    let summary = runner.execute_all(Some(event_tx)).await;
    let _ = printer.await;

    for task in &runner.tasks {
        task.walk(&mut |t| println!("{:<14} {}", t.name, t.status()));
    }
    println!("Run succeeded: {}", summary.is_success());
}
