//! Task tree execution module.
//!
//! A task tree is made of [`tasks::Task`] nodes. Each node may carry a shell
//! command, a group of children run in parallel and a group of children run
//! sequentially. Running a node runs its parallel children first, then its
//! sequential children, then its own command.
//!
//! ## Core Components
//!
//! - [`tasks::Task`]: A node of the tree and its single-task executor
//! - [`runner::TaskRunner`]: Entry point that runs a top-level sequential group
//! - [`config::TaskSpec`]: Tree description used to build tasks
//! - [`config::TaskShell`]: Cross-platform shell selection
//! - [`state::TaskStatus`]: Lifecycle of a single task
//! - [`event::TaskTreeEvent`]: Progress events emitted while running
//! - [`error::TaskTreeError`]: Errors local to a single task
//! - [`executor`]: Sequential and parallel group runners
//!
//! ## Usage
//!
//! ```rust,no_run
//! use tasktree::tree::{TaskRunner, config::TaskSpec};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let pipeline = TaskSpec::new("ci")
//!     .parallel([
//!         TaskSpec::new("lint").command("cargo clippy"),
//!         TaskSpec::new("fmt").command("cargo fmt --check"),
//!     ])
//!     .sequential([
//!         TaskSpec::new("build").command("cargo build"),
//!         TaskSpec::new("test").command("cargo test"),
//!     ]);
//!
//! let mut runner = TaskRunner::new([pipeline]);
//! let summary = runner.execute_all(None).await;
//! assert!(summary.is_success());
//! # }
//! ```

pub mod config;
pub mod error;
pub mod event;
pub mod executor;
pub mod output;
pub mod process;
pub mod runner;
pub mod state;
pub mod tasks;

#[cfg(test)]
mod tests;

pub use runner::{RunContext, RunSummary, TaskRunner};
pub use state::TaskStatus;
pub use tasks::Task;
