use crate::tree::{
    config::{TaskShell, TaskSpec},
    state::TaskStatus,
    tasks::Task,
};

#[test]
fn test_deserialize_tree() {
    let json = r#"{
        "name": "ci",
        "parallel": [
            { "name": "lint", "command": "cargo clippy" },
            { "name": "fmt", "command": "cargo fmt --check", "shell": "auto" }
        ],
        "sequential": [
            { "name": "build", "command": "cargo build", "env": { "CARGO_INCREMENTAL": "0" } },
            { "name": "test", "command": "cargo test", "working_dir": "." }
        ]
    }"#;

    let spec: TaskSpec = serde_json::from_str(json).unwrap();
    assert_eq!(spec.count(), 5);
    assert_eq!(spec.parallel[1].shell, Some(TaskShell::Auto));
    assert_eq!(spec.sequential[1].working_dir.as_deref(), Some("."));

    let task = Task::from(spec);
    assert!(task.command.is_none());
    assert_eq!(task.sequential[0].env.as_ref().unwrap()["CARGO_INCREMENTAL"], "0");
}

#[test]
fn test_missing_fields_default() {
    let spec: TaskSpec = serde_json::from_str(r#"{ "name": "empty" }"#).unwrap();
    assert_eq!(spec, TaskSpec::new("empty"));
}

#[test]
fn test_status_serializes_lowercase() {
    assert_eq!(
        serde_json::to_string(&TaskStatus::Aborted).unwrap(),
        "\"aborted\""
    );
}
