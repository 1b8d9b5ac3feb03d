//! Per-request process execution.
//!
//! Every call spawns a fresh process and drives two futures to completion
//! together:
//!
//! ```text
//! spawn ─┬─ writer: input → stdin, then close ─────────┐
//!        └─ runner: output pipe → buffer, wait() ─────┴─ join → Ok(output) | Err
//! ```
//!
//! stdout and stderr are both the write end of one pipe, so the buffer holds
//! the bytes in exactly the order the process wrote them.
//!
//! Only the runner decides the outcome. Writer failures (typically a broken
//! pipe because the process exited without reading its input) are logged and
//! dropped. Writing and reading concurrently means neither side can block on a
//! full pipe buffer while the other waits.

use std::io;
use std::os::fd::OwnedFd;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::unix::pipe;
use tokio::process::{Child, ChildStdin, Command};
use tokio::sync::Semaphore;

use crate::config::FunctionConfig;
use crate::exec::command::{CommandLine, CommandLineError};
use crate::observability::metrics;

/// Why an invocation produced no output.
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("process exited unsuccessfully: {0}")]
    Exit(ExitStatus),

    #[error("I/O error while running process: {0}")]
    Io(#[from] io::Error),

    #[error("process killed after exceeding {0:?}")]
    Timeout(Duration),

    #[error("executor is shutting down")]
    Unavailable,
}

/// Runs the configured command once per call.
///
/// Holds no per-request state, so one instance is shared by all handlers.
#[derive(Debug)]
pub struct Executor {
    command: CommandLine,
    exec_timeout: Option<Duration>,
    limiter: Option<Semaphore>,
    max_inflight: usize,
}

impl Executor {
    /// Unbounded executor: no process deadline, no concurrency cap.
    pub fn new(command: CommandLine) -> Self {
        Self {
            command,
            exec_timeout: None,
            limiter: None,
            max_inflight: 0,
        }
    }

    pub fn from_config(config: &FunctionConfig) -> Result<Self, CommandLineError> {
        let command = CommandLine::parse(&config.command)?;
        Ok(Self::new(command)
            .with_exec_timeout(config.exec_timeout())
            .with_max_inflight(config.max_inflight))
    }

    /// Kill the process and fail the call once `timeout` elapses.
    pub fn with_exec_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.exec_timeout = timeout;
        self
    }

    /// Allow at most `max` processes at once; 0 removes the cap.
    pub fn with_max_inflight(mut self, max: usize) -> Self {
        self.limiter = (max > 0).then(|| Semaphore::new(max));
        self.max_inflight = max;
        self
    }

    pub fn command(&self) -> &CommandLine {
        &self.command
    }

    pub fn max_inflight(&self) -> usize {
        self.max_inflight
    }

    /// Free process slots, `None` when unbounded.
    pub fn available_slots(&self) -> Option<usize> {
        self.limiter.as_ref().map(Semaphore::available_permits)
    }

    /// Refuse calls still waiting for a slot, and any later ones.
    ///
    /// Processes already running are not affected. Without a concurrency cap
    /// nothing ever waits, so this is a no-op.
    pub fn close(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.close();
        }
    }

    /// Run the command with `input` on stdin and return its combined output.
    ///
    /// Waits for a free slot first when a concurrency cap is set, and fails
    /// with [`ExecutionError::Unavailable`] if the executor is closed meanwhile.
    pub async fn execute(&self, input: &[u8]) -> Result<Vec<u8>, ExecutionError> {
        let _slot = match &self.limiter {
            Some(limiter) => Some(
                limiter
                    .acquire()
                    .await
                    .map_err(|_| ExecutionError::Unavailable)?,
            ),
            None => None,
        };
        let _inflight = metrics::track_inflight();

        match self.exec_timeout {
            None => run(&self.command, input, false).await,
            Some(limit) => tokio::time::timeout(limit, run(&self.command, input, true))
                .await
                .map_err(|_| ExecutionError::Timeout(limit))?,
        }
    }
}

/// Spawn `command`, feed it `input` and capture its combined output.
///
/// No deadline applies: if the caller drops the returned future the process
/// keeps running.
pub async fn execute(command: &CommandLine, input: &[u8]) -> Result<Vec<u8>, ExecutionError> {
    run(command, input, false).await
}

async fn run(
    command: &CommandLine,
    input: &[u8],
    kill_on_drop: bool,
) -> Result<Vec<u8>, ExecutionError> {
    let (reader, writer) = io::pipe()?;

    let mut process = Command::new(command.program());
    process
        .args(command.args())
        .stdin(Stdio::piped())
        .stdout(writer.try_clone()?)
        .stderr(writer)
        .kill_on_drop(kill_on_drop);
    let spawned = process.spawn();
    // The child has its own copies; ours must close or the reader never sees EOF.
    drop(process);

    let mut child = spawned.map_err(|source| ExecutionError::Spawn {
        program: command.program().to_owned(),
        source,
    })?;
    let output = pipe::Receiver::from_owned_fd(OwnedFd::from(reader))?;

    tracing::debug!(
        pid = ?child.id(),
        command = %command,
        input_bytes = input.len(),
        "Process spawned"
    );

    let stdin = child.stdin.take();
    let ((), output) = tokio::join!(write_input(stdin, input), wait_with_output(&mut child, output));
    output
}

/// Writer half. Closes stdin when done, whatever happened.
async fn write_input(stdin: Option<ChildStdin>, input: &[u8]) {
    let Some(mut stdin) = stdin else {
        return;
    };
    if let Err(e) = stdin.write_all(input).await {
        tracing::debug!(error = %e, input_bytes = input.len(), "Process input not fully written");
    }
}

/// Runner half. Drains the shared output pipe, then reaps the process.
async fn wait_with_output(
    child: &mut Child,
    mut combined: pipe::Receiver,
) -> Result<Vec<u8>, ExecutionError> {
    let mut output = Vec::new();
    combined.read_to_end(&mut output).await?;
    let status = child.wait().await?;

    tracing::debug!(pid = ?child.id(), %status, output_bytes = output.len(), "Process exited");

    if status.success() {
        Ok(output)
    } else {
        Err(ExecutionError::Exit(status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Instant;

    fn cmd(line: &str) -> CommandLine {
        CommandLine::parse(line).unwrap()
    }

    fn shell(script: &str) -> CommandLine {
        CommandLine::from_argv(vec!["sh".into(), "-c".into(), script.into()]).unwrap()
    }

    #[tokio::test]
    async fn echoes_input_verbatim() {
        let input = b"hello\x00world\n\xff".to_vec();
        let output = execute(&cmd("cat"), &input).await.unwrap();
        assert_eq!(output, input);
    }

    #[tokio::test]
    async fn empty_input_closes_stdin() {
        let output = execute(&cmd("wc -c"), b"").await.unwrap();
        assert_eq!(String::from_utf8_lossy(&output).trim(), "0");
    }

    #[tokio::test]
    async fn captures_stderr_with_stdout() {
        let output = execute(&shell("echo out; echo err 1>&2"), b"").await.unwrap();
        assert_eq!(output, b"out\nerr\n");
    }

    #[tokio::test]
    async fn stdout_and_stderr_keep_write_order() {
        let script = shell("printf a; printf b 1>&2; printf c; printf d 1>&2; printf e");
        for _ in 0..20 {
            let output = execute(&script, b"").await.unwrap();
            assert_eq!(output, b"abcde");
        }
    }

    #[tokio::test]
    async fn non_zero_exit_is_an_error() {
        let err = execute(&cmd("false"), b"ignored").await.unwrap_err();
        assert!(matches!(err, ExecutionError::Exit(status) if !status.success()));
        assert!(err.to_string().contains("exit status"));
    }

    #[tokio::test]
    async fn failed_process_output_is_discarded() {
        let err = execute(&shell("echo partial; exit 3"), b"").await.unwrap_err();
        assert!(matches!(err, ExecutionError::Exit(status) if status.code() == Some(3)));
    }

    #[tokio::test]
    async fn missing_program_is_a_spawn_error() {
        let err = execute(&cmd("/definitely/not/a/program"), b"").await.unwrap_err();
        match &err {
            ExecutionError::Spawn { program, source } => {
                assert_eq!(program, "/definitely/not/a/program");
                assert_eq!(source.kind(), io::ErrorKind::NotFound);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!err.to_string().is_empty());
    }

    #[tokio::test]
    async fn input_larger_than_pipe_buffer() {
        let input: Vec<u8> = (0..5 * 1024 * 1024).map(|i| (i % 251) as u8).collect();
        let output = execute(&cmd("cat"), &input).await.unwrap();
        assert_eq!(output.len(), input.len());
        assert!(output == input);
    }

    #[tokio::test]
    async fn writer_failure_is_not_observable() {
        // `true` exits without reading, so the writer hits a broken pipe.
        let input = vec![b'x'; 1024 * 1024];
        let output = execute(&cmd("true"), &input).await.unwrap();
        assert!(output.is_empty());
    }

    #[tokio::test]
    async fn exec_timeout_kills_process() {
        let executor = Executor::new(cmd("sleep 10")).with_exec_timeout(Some(Duration::from_millis(200)));
        let start = Instant::now();
        let err = executor.execute(b"").await.unwrap_err();
        assert!(matches!(err, ExecutionError::Timeout(_)));
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn max_inflight_serialises_processes() {
        let executor = Arc::new(Executor::new(cmd("sleep 0.3")).with_max_inflight(1));
        assert_eq!(executor.available_slots(), Some(1));

        let start = Instant::now();
        let (a, b) = tokio::join!(executor.execute(b""), executor.execute(b""));
        a.unwrap();
        b.unwrap();

        assert!(start.elapsed() >= Duration::from_millis(550));
        assert_eq!(executor.available_slots(), Some(1));
    }

    #[tokio::test]
    async fn closed_executor_refuses_queued_calls() {
        let executor = Arc::new(Executor::new(cmd("sleep 0.3")).with_max_inflight(1));

        let running = tokio::spawn({
            let executor = executor.clone();
            async move { executor.execute(b"").await }
        });
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(executor.available_slots(), Some(0));

        let queued = tokio::spawn({
            let executor = executor.clone();
            async move { executor.execute(b"").await }
        });
        tokio::time::sleep(Duration::from_millis(50)).await;
        executor.close();

        let err = queued.await.unwrap().unwrap_err();
        assert!(matches!(err, ExecutionError::Unavailable));
        running.await.unwrap().unwrap();
        assert!(matches!(executor.execute(b"").await, Err(ExecutionError::Unavailable)));
    }

    #[tokio::test]
    async fn unbounded_executor_has_no_slots() {
        let executor = Executor::new(cmd("true"));
        assert_eq!(executor.available_slots(), None);
        assert_eq!(executor.max_inflight(), 0);
        executor.execute(b"").await.unwrap();
    }

    #[test]
    fn from_config_parses_command() {
        let config = FunctionConfig {
            command: "wc -l".into(),
            exec_timeout_secs: 2,
            max_inflight: 3,
        };
        let executor = Executor::from_config(&config).unwrap();
        assert_eq!(executor.command().program(), "wc");
        assert_eq!(executor.max_inflight(), 3);

        let empty = FunctionConfig::default();
        assert_eq!(Executor::from_config(&empty).unwrap_err(), CommandLineError::Empty);
    }
}
