//! Captured output of a task's command.

use tokio::{
    io::{AsyncBufReadExt, AsyncRead, BufReader},
    sync::mpsc::UnboundedSender,
    task::JoinHandle,
};
use tracing::warn;

/// Which standard stream a line came from.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamSource {
    Stdout,
    Stderr,
}

impl std::fmt::Display for StreamSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StreamSource::Stdout => f.write_str("stdout"),
            StreamSource::Stderr => f.write_str("stderr"),
        }
    }
}

/// Lines captured from a command, per stream and interleaved.
///
/// `combined` holds every line in the order it was observed, so each stream's
/// own order is preserved inside it but the interleaving between the two
/// streams is only as good as arrival order.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskOutput {
    pub stdout: Vec<String>,
    pub stderr: Vec<String>,
    pub combined: Vec<String>,
}

impl TaskOutput {
    pub fn push(&mut self, src: StreamSource, line: String) {
        match src {
            StreamSource::Stdout => self.stdout.push(line.clone()),
            StreamSource::Stderr => self.stderr.push(line.clone()),
        }
        self.combined.push(line);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.combined.is_empty()
    }

    #[must_use]
    pub fn lines(&self, src: StreamSource) -> &[String] {
        match src {
            StreamSource::Stdout => &self.stdout,
            StreamSource::Stderr => &self.stderr,
        }
    }
}

/// Read `reader` line by line on its own tokio task, forwarding each line.
///
/// The task ends at end-of-stream, on a read error, or once the receiving side
/// is gone. Bytes that are not valid UTF-8 are replaced rather than dropped.
pub(crate) fn drain_lines<R>(
    task_name: String,
    reader: R,
    src: StreamSource,
    tx: UnboundedSender<(StreamSource, String)>,
) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut segments = BufReader::new(reader).split(b'\n');
        loop {
            match segments.next_segment().await {
                Ok(Some(mut bytes)) => {
                    if bytes.last() == Some(&b'\r') {
                        bytes.pop();
                    }
                    let line = String::from_utf8_lossy(&bytes).into_owned();
                    if tx.send((src, line)).is_err() {
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    warn!("[{}] Reading {} failed: {}", task_name, src, e);
                    break;
                }
            }
        }
    })
}
