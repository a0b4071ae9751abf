use tasktree::tree::{TaskRunner, config::TaskSpec, event::TaskTreeEvent};
use tokio::sync::mpsc;

/// Example: Basic task chain execution
/// Demonstrates a simple sequential chain: setup -> build -> test
#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    println!("Running basic task chain example...");

    let mut runner = TaskRunner::new([
        TaskSpec::new("setup").command("echo 'Setting up project...'"),
        TaskSpec::new("build").command("echo 'Building project...'"),
        TaskSpec::new("test").command("echo 'Running tests...'"),
    ]);

    let (event_tx, mut event_rx) = mpsc::unbounded_channel();

    let printer = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            match event {
                TaskTreeEvent::Started { task_name } => println!("Started: {}", task_name),
                TaskTreeEvent::Output { task_name, line, .. } => {
                    println!("  [{}] {}", task_name, line)
                }
                TaskTreeEvent::Stopped { task_name, status } => {
                    println!("Completed: {} ({})", task_name, status)
                }
                _ => {}
            }
        }
    });

    let summary = runner.execute_all(Some(event_tx)).await;
    let _ = printer.await;

    println!(
        "Done: {} succeeded, {} failed",
        summary.succeeded, summary.failed
    );
}
