use crate::tree::{
    config::{TaskShell, TaskSpec},
    tasks::Task,
};

#[test]
fn test_default_shell_is_auto() {
    assert_eq!(TaskShell::default(), TaskShell::Auto);
    let task = Task::from(TaskSpec::new("a").command("true"));
    assert_eq!(task.shell, TaskShell::Auto);
}

#[cfg(unix)]
#[test]
fn test_unix_shells() {
    assert_eq!(TaskShell::Auto.program(), ("sh", "-c"));
    assert_eq!(TaskShell::Sh.program(), ("sh", "-c"));
    assert_eq!(TaskShell::Bash.program(), ("bash", "-c"));
}

#[cfg(windows)]
#[test]
fn test_windows_shells() {
    assert_eq!(TaskShell::Auto.program(), ("powershell", "-Command"));
    assert_eq!(TaskShell::Powershell.program(), ("powershell", "-Command"));
    assert_eq!(TaskShell::Cmd.program(), ("cmd", "/C"));
}

#[test]
fn test_explicit_shell_is_kept() {
    #[cfg(unix)]
    let shell = TaskShell::Bash;
    #[cfg(windows)]
    let shell = TaskShell::Cmd;

    let task = Task::from(TaskSpec::new("a").command("echo hi").shell(shell.clone()));
    assert_eq!(task.shell, shell);
}
