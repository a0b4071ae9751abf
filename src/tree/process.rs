//! Shell process spawning for leaf commands.
//!
//! Starts a command through a [`TaskShell`], hands out its stdout and stderr
//! pipes, and waits for exit while listening for a kill request. On unix the
//! shell leads its own process group and a kill reaches the whole group.

use std::{collections::HashMap, process::Stdio};

use tokio::process::{Child, ChildStderr, ChildStdout, Command};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use crate::tree::{config::TaskShell, error::TaskTreeError, output::StreamSource};

/// A running shell process owned by one task.
#[derive(Debug)]
pub struct ShellProcess {
    task_name: String,
    child: Child,
}

impl ShellProcess {
    /// Start `command` through `shell` with both output streams piped.
    ///
    /// # Errors
    ///
    /// * [`TaskTreeError::Spawn`] - If the shell could not be started
    /// * [`TaskTreeError::StreamUnavailable`] - If a pipe was not attached
    pub fn spawn(
        task_name: &str,
        command: &str,
        shell: &TaskShell,
        working_dir: Option<&str>,
        env: Option<&HashMap<String, String>>,
    ) -> Result<(Self, ChildStdout, ChildStderr), TaskTreeError> {
        let (program, flag) = shell.program();
        let mut cmd = Command::new(program);
        cmd.arg(flag).arg(command);
        if let Some(dir) = working_dir {
            cmd.current_dir(dir);
        }
        if let Some(env) = env {
            cmd.envs(env);
        }
        #[cfg(unix)]
        cmd.process_group(0);
        cmd.kill_on_drop(true)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = cmd.spawn().map_err(|e| TaskTreeError::Spawn {
            task_name: task_name.to_string(),
            reason: e.to_string(),
        })?;
        debug!("[{}] Spawned {} {} {:?}", task_name, program, flag, command);

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| TaskTreeError::StreamUnavailable {
                task_name: task_name.to_string(),
                stream: StreamSource::Stdout,
            })?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| TaskTreeError::StreamUnavailable {
                task_name: task_name.to_string(),
                stream: StreamSource::Stderr,
            })?;

        let process = Self {
            task_name: task_name.to_string(),
            child,
        };
        Ok((process, stdout, stderr))
    }

    /// Wait for the process to exit, killing it first if `kill` fires.
    ///
    /// Returns whether the process exited successfully. A process that could
    /// not be waited on counts as unsuccessful.
    pub async fn wait_or_kill(&mut self, kill: &CancellationToken) -> bool {
        let status = tokio::select! {
            biased;
            status = self.child.wait() => status,
            _ = kill.cancelled() => {
                self.kill_group();
                self.child.wait().await
            }
        };

        match status {
            Ok(status) => {
                debug!("[{}] Exited with {}", self.task_name, status);
                status.success()
            }
            Err(e) => {
                error!("[{}] Waiting for process failed: {}", self.task_name, e);
                false
            }
        }
    }

    /// Send SIGKILL to the shell and everything it started.
    ///
    /// Falls back to killing the shell alone when the group signal fails.
    fn kill_group(&mut self) {
        #[cfg(unix)]
        if let Some(pid) = self.child.id() {
            let pgid = pid as libc::pid_t;
            // Negative pid addresses the process group led by the shell.
            if unsafe { libc::kill(-pgid, libc::SIGKILL) } == 0 {
                return;
            }
            warn!(
                "[{}] Killing process group {} failed: {}",
                self.task_name,
                pgid,
                std::io::Error::last_os_error()
            );
        }
        if let Err(e) = self.child.start_kill() {
            warn!("[{}] Kill failed: {}", self.task_name, e);
        }
    }
}
