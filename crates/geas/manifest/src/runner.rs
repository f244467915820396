//! Bounded execution of the test command.

use crate::manifest::TestResultInfo;
use async_trait::async_trait;
use geas_types::Clock;
use parking_lot::Mutex;
use std::io;
use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::task::JoinHandle;
use tokio::time::timeout;

/// Exit code recorded when the command outlived its timeout. The result is
/// also marked `timed_out`, which is what tells it apart from a real exit 124.
pub const TIMEOUT_EXIT_CODE: i32 = 124;

/// How long output readers may keep draining after the process is gone.
const DRAIN_GRACE: Duration = Duration::from_millis(500);

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommandOutcome {
    Completed {
        exit_code: i32,
        stdout: String,
        stderr: String,
    },
    /// Killed at the deadline. Carries whatever was captured before.
    TimedOut { stdout: String, stderr: String },
}

#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `program` with `args` in `cwd`. Launch failures are errors;
    /// a non-zero exit or a timeout is an outcome.
    async fn run(
        &self,
        program: &str,
        args: &[String],
        cwd: &Path,
        limit: Duration,
    ) -> io::Result<CommandOutcome>;
}

/// Runs commands as child processes, without a shell.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(
        &self,
        program: &str,
        args: &[String],
        cwd: &Path,
        limit: Duration,
    ) -> io::Result<CommandOutcome> {
        tracing::debug!(program, ?args, cwd = %cwd.display(), "spawning command");
        let mut child = Command::new(program)
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let mut stdout = Capture::start(child.stdout.take());
        let mut stderr = Capture::start(child.stderr.take());

        match timeout(limit, child.wait()).await {
            Ok(status) => {
                let status = status?;
                stdout.settle().await;
                stderr.settle().await;
                Ok(CommandOutcome::Completed {
                    exit_code: status.code().unwrap_or(-1),
                    stdout: stdout.text(),
                    stderr: stderr.text(),
                })
            }
            Err(_) => {
                tracing::warn!(program, timeout_secs = limit.as_secs_f64(), "command timed out");
                if let Err(e) = child.kill().await {
                    tracing::warn!(program, error = %e, "failed to kill timed out command");
                }
                stdout.settle().await;
                stderr.settle().await;
                Ok(CommandOutcome::TimedOut {
                    stdout: stdout.text(),
                    stderr: stderr.text(),
                })
            }
        }
    }
}

/// Drains one pipe into a shared buffer so partial output survives a kill.
struct Capture {
    buf: Arc<Mutex<Vec<u8>>>,
    task: Option<JoinHandle<()>>,
}

impl Capture {
    fn start<R>(reader: Option<R>) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let buf = Arc::new(Mutex::new(Vec::new()));
        let task = reader.map(|mut reader| {
            let buf = buf.clone();
            tokio::spawn(async move {
                let mut chunk = [0u8; 8192];
                loop {
                    match reader.read(&mut chunk).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => {
                            buf.lock().extend_from_slice(&chunk[..n]);
                        }
                    }
                }
            })
        });
        Self { buf, task }
    }

    /// Wait briefly for the reader to hit end of stream. A descendant that
    /// still holds the pipe open is not waited for.
    async fn settle(&mut self) {
        if let Some(mut task) = self.task.take() {
            if timeout(DRAIN_GRACE, &mut task).await.is_err() {
                task.abort();
            }
        }
    }

    fn text(&self) -> String {
        String::from_utf8_lossy(&self.buf.lock()).into_owned()
    }
}

/// Split a command line into words, honoring single and double quotes and
/// backslash escapes. `None` when a quote is left open.
pub fn split_command(command: &str) -> Option<Vec<String>> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;
    let mut chars = command.chars();

    while let Some(c) = chars.next() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some('"'), '\\') => {
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            (Some(_), c) => current.push(c),
            (None, '\'' | '"') => {
                quote = Some(c);
                in_word = true;
            }
            (None, '\\') => {
                if let Some(next) = chars.next() {
                    current.push(next);
                }
                in_word = true;
            }
            (None, c) if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            (None, c) => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if quote.is_some() {
        return None;
    }
    if in_word {
        words.push(current);
    }
    Some(words)
}

/// Run the test command and describe the outcome.
///
/// Never fails: a timeout becomes exit code 124 with `timed_out` set and a
/// command that cannot be launched becomes exit code 1, both with
/// `passed = false`.
pub async fn run_tests(
    runner: &dyn CommandRunner,
    command: &str,
    cwd: &Path,
    limit: Duration,
    clock: &dyn Clock,
) -> TestResultInfo {
    let started = Instant::now();
    let outcome = match split_command(command) {
        Some(words) if !words.is_empty() => runner.run(&words[0], &words[1..], cwd, limit).await,
        Some(_) => Err(io::Error::new(io::ErrorKind::InvalidInput, "empty test command")),
        None => Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("unbalanced quotes in test command: {command}"),
        )),
    };
    let duration_seconds = started.elapsed().as_secs_f64();

    let (passed, exit_code, timed_out, output) = match outcome {
        Ok(CommandOutcome::Completed {
            exit_code,
            stdout,
            stderr,
        }) => (exit_code == 0, exit_code, false, format!("{stdout}\n{stderr}")),
        Ok(CommandOutcome::TimedOut { stdout, stderr }) => (
            false,
            TIMEOUT_EXIT_CODE,
            true,
            format!(
                "{stdout}\n{stderr}\nTimeout expired after {} seconds.",
                limit.as_secs()
            ),
        ),
        Err(e) => (false, 1, false, e.to_string()),
    };

    tracing::info!(command, passed, exit_code, timed_out, duration_seconds, "test run finished");
    TestResultInfo {
        passed,
        exit_code,
        timed_out,
        duration_seconds,
        timestamp: clock.now(),
        output,
    }
}
