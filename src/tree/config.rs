use std::collections::HashMap;

/// Description of one node of a task tree.
///
/// A spec is turned into a runnable [`Task`](crate::tree::tasks::Task) with
/// `Task::from(spec)`. With the `serde` feature enabled a whole tree can be
/// deserialized from any serde format.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskSpec {
    /// Name used in logs and events
    pub name: String,

    /// Shell command run after all children finished
    pub command: Option<String>,

    /// Shell used to interpret `command`
    pub shell: Option<TaskShell>,

    /// Working directory of the command
    pub working_dir: Option<String>,

    /// Extra environment variables of the command
    pub env: Option<HashMap<String, String>>,

    /// Children run concurrently, aborting each other on failure
    pub parallel: Vec<TaskSpec>,

    /// Children run in order, skipping the rest after a failure
    pub sequential: Vec<TaskSpec>,
}

impl TaskSpec {
    pub fn new(name: impl Into<String>) -> Self {
        TaskSpec {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    pub fn shell(mut self, shell: TaskShell) -> Self {
        self.shell = Some(shell);
        self
    }

    pub fn working_dir(mut self, dir: impl Into<String>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn env<I, K, V>(mut self, env: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env = Some(
            env.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    pub fn parallel<I>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = TaskSpec>,
    {
        self.parallel = children.into_iter().collect();
        self
    }

    pub fn sequential<I>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = TaskSpec>,
    {
        self.sequential = children.into_iter().collect();
        self
    }

    /// The command to run, with blank commands treated as no command.
    #[must_use]
    pub fn effective_command(&self) -> Option<&str> {
        self.command
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }

    /// Number of nodes in this subtree, including itself.
    #[must_use]
    pub fn count(&self) -> usize {
        1 + self
            .parallel
            .iter()
            .chain(self.sequential.iter())
            .map(TaskSpec::count)
            .sum::<usize>()
    }
}

/// Shell used to interpret a task's command.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum TaskShell {
    /// `sh` on unix, `powershell` on windows
    #[default]
    Auto,
    #[cfg(unix)]
    Sh,
    #[cfg(unix)]
    Bash,
    #[cfg(windows)]
    Cmd,
    #[cfg(windows)]
    Powershell,
}

impl TaskShell {
    /// Interpreter program and the flag that makes it run a command string.
    #[must_use]
    pub fn program(&self) -> (&'static str, &'static str) {
        match self {
            #[cfg(unix)]
            TaskShell::Auto | TaskShell::Sh => ("sh", "-c"),
            #[cfg(unix)]
            TaskShell::Bash => ("bash", "-c"),
            #[cfg(windows)]
            TaskShell::Auto | TaskShell::Powershell => ("powershell", "-Command"),
            #[cfg(windows)]
            TaskShell::Cmd => ("cmd", "/C"),
        }
    }
}
