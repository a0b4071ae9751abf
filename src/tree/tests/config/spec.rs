use crate::tree::{
    config::{TaskShell, TaskSpec},
    state::TaskStatus,
    tasks::Task,
};

#[test]
fn test_builder_sets_fields() {
    let spec = TaskSpec::new("build")
        .command("cargo build")
        .shell(TaskShell::Auto)
        .working_dir("/tmp")
        .env([("RUST_LOG", "debug")]);

    assert_eq!(spec.name, "build");
    assert_eq!(spec.command.as_deref(), Some("cargo build"));
    assert_eq!(spec.shell, Some(TaskShell::Auto));
    assert_eq!(spec.working_dir.as_deref(), Some("/tmp"));
    assert_eq!(
        spec.env.as_ref().and_then(|e| e.get("RUST_LOG")).map(String::as_str),
        Some("debug")
    );
    assert!(spec.parallel.is_empty());
    assert!(spec.sequential.is_empty());
}

#[test]
fn test_effective_command_ignores_blank() {
    assert_eq!(TaskSpec::new("a").effective_command(), None);
    assert_eq!(TaskSpec::new("a").command("").effective_command(), None);
    assert_eq!(TaskSpec::new("a").command(" \t ").effective_command(), None);
    assert_eq!(
        TaskSpec::new("a").command("  make  ").effective_command(),
        Some("make")
    );
}

#[test]
fn test_tree_shape_is_preserved() {
    let spec = TaskSpec::new("root")
        .parallel([TaskSpec::new("p1"), TaskSpec::new("p2").command("echo p2")])
        .sequential([TaskSpec::new("s1").sequential([TaskSpec::new("s1a")])]);
    assert_eq!(spec.count(), 5);

    let task = Task::from(spec);
    assert_eq!(task.count(), 5);
    assert_eq!(task.parallel[1].command.as_deref(), Some("echo p2"));
    assert_eq!(task.sequential[0].sequential[0].name, "s1a");

    let mut names = Vec::new();
    task.walk(&mut |t| names.push(t.name.as_str()));
    assert_eq!(names, ["root", "p1", "p2", "s1", "s1a"]);
}

#[test]
fn test_new_tasks_start_in_init() {
    let task = Task::from(TaskSpec::new("root").sequential([TaskSpec::new("child")]));
    let mut statuses = Vec::new();
    task.walk(&mut |t| statuses.push(t.status()));
    assert_eq!(statuses, [TaskStatus::Init, TaskStatus::Init]);
    assert!(task.output().is_empty());
}

#[test]
fn test_duplicate_names_are_allowed() {
    let task = Task::from(
        TaskSpec::new("same").parallel([TaskSpec::new("same"), TaskSpec::new("same")]),
    );
    assert_eq!(task.count(), 3);
}
