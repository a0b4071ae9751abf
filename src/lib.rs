pub mod tree;

pub use tree::{
    RunContext, RunSummary, Task, TaskRunner, TaskStatus,
    config::{TaskShell, TaskSpec},
    error::TaskTreeError,
    event::TaskTreeEvent,
};
