use std::{
    io,
    path::PathBuf,
    process::Stdio,
    sync::Arc,
    time::Duration,
};

use tokio::{
    io::{AsyncRead, AsyncReadExt as _, AsyncWriteExt as _},
    process::Command,
    sync::Semaphore,
};

use crate::error::{JudgeError, Result};

/// Outcome of running one snippet of code against one input.
///
/// Every way the *submitted program* can fail (non-zero exit, death by
/// signal, deadline expiry) is represented here as data. [`Sandbox::execute`]
/// returns `Err` only when the host could not run the program at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    pub stdout: String,
    pub stderr: String,
    /// `None` when the process was killed by a signal (or by the deadline).
    pub exit_status: Option<i32>,
    pub timed_out: bool,
    pub execution_time: Duration,
}

impl ExecutionResult {
    pub fn success(&self) -> bool {
        !self.timed_out && self.exit_status == Some(0)
    }
}

/// Runs untrusted code, one interpreter process per call.
///
/// Isolation is a restricted process rather than a bare shell-out:
/// - interpreter launched in isolated mode (`-I`): no user site dir,
///   no script dir on the module path;
/// - cleared environment (only a minimal `PATH`);
/// - cwd is a fresh scratch dir, removed when the call returns;
/// - rlimits forbid fork bombs and large file writes (unix);
/// - a semaphore bounds concurrently running sandboxes host-wide.
///
/// Timeout policy: on deadline expiry the process is killed and any
/// partial stdout/stderr is discarded; the result carries `timed_out`
/// with empty output and no exit status.
#[derive(Debug, Clone)]
pub struct Sandbox {
    interpreter: PathBuf,
    stdout_capture_max_bytes: usize,
    stderr_capture_max_bytes: usize,
    permits: Arc<Semaphore>,
}

impl Sandbox {
    pub const DEFAULT_INTERPRETER: &str = "python3";
    pub const DEFAULT_MAX_CONCURRENCY: usize = 4;
    pub const DEFAULT_STDOUT_CAPTURE_MAX_BYTES: usize = 1 << 20;
    pub const DEFAULT_STDERR_CAPTURE_MAX_BYTES: usize = 1 << 16;

    const CHILD_PATH: &str = "/usr/local/bin:/usr/bin:/bin";
    const MAX_CHILD_PROCS: u64 = 64;
    const MAX_CHILD_FILE_BYTES: u64 = 32 << 20;

    pub fn new(max_concurrency: usize) -> Self {
        Self {
            interpreter: Self::DEFAULT_INTERPRETER.into(),
            stdout_capture_max_bytes: Self::DEFAULT_STDOUT_CAPTURE_MAX_BYTES,
            stderr_capture_max_bytes: Self::DEFAULT_STDERR_CAPTURE_MAX_BYTES,
            permits: Arc::new(Semaphore::new(max_concurrency.max(1))),
        }
    }

    pub fn interpreter(mut self, path: impl Into<PathBuf>) -> Self {
        self.interpreter = path.into();
        self
    }

    pub fn stdout_capture_max_bytes(mut self, n: usize) -> Self {
        self.stdout_capture_max_bytes = n;
        self
    }

    pub fn stderr_capture_max_bytes(mut self, n: usize) -> Self {
        self.stderr_capture_max_bytes = n;
        self
    }

    /// Runs `code` with `stdin` as standard input under a hard wall-clock
    /// deadline. Blocks until the process exits or the deadline fires;
    /// waits for a free sandbox slot first.
    pub async fn execute(
        &self,
        code: &str,
        stdin: &str,
        time_limit: Duration,
    ) -> Result<ExecutionResult> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|e| JudgeError::SandboxSpawn(io::Error::new(io::ErrorKind::Other, e)))?;

        let scratch = tempfile::Builder::new()
            .prefix("sabaki-scratch-")
            .tempdir()
            .map_err(JudgeError::SandboxSpawn)?;

        let mut cmd = Command::new(&self.interpreter);
        cmd.args(["-I", "-c", code])
            .current_dir(scratch.path())
            .env_clear()
            .env("PATH", Self::CHILD_PATH)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        #[cfg(unix)]
        unsafe {
            cmd.pre_exec(|| {
                use nix::sys::resource::{setrlimit, Resource};
                let errno = |e: nix::errno::Errno| io::Error::from_raw_os_error(e as i32);
                setrlimit(
                    Resource::RLIMIT_NPROC,
                    Sandbox::MAX_CHILD_PROCS,
                    Sandbox::MAX_CHILD_PROCS,
                )
                .map_err(errno)?;
                setrlimit(
                    Resource::RLIMIT_FSIZE,
                    Sandbox::MAX_CHILD_FILE_BYTES,
                    Sandbox::MAX_CHILD_FILE_BYTES,
                )
                .map_err(errno)?;
                Ok(())
            });
        }

        log::debug!(
            "Spawning sandbox: {} -I -c <{} bytes of code>",
            self.interpreter.to_string_lossy(),
            code.len()
        );

        let mut proc = cmd.spawn().map_err(JudgeError::SandboxSpawn)?;
        let mut child_stdin = proc.stdin.take().ok_or_else(Self::missing_pipe)?;
        let mut child_stdout = proc.stdout.take().ok_or_else(Self::missing_pipe)?;
        let mut child_stderr = proc.stderr.take().ok_or_else(Self::missing_pipe)?;

        // Feeding stdin must run under the same deadline as everything
        // else: a full pipe against a program that never reads would
        // otherwise block this call (and its pool permit) forever. The
        // program may also exit without reading stdin; a broken pipe
        // there is its business, not an infrastructure failure.
        let feed_stdin = async {
            match child_stdin.write_all(stdin.as_bytes()).await {
                Err(e) if e.kind() != io::ErrorKind::BrokenPipe => return Err(e),
                _ => {}
            }
            drop(child_stdin);
            Ok(())
        };

        let start_at = tokio::time::Instant::now();
        let res = tokio::time::timeout(time_limit, async {
            tokio::try_join!(
                feed_stdin,
                capped_read(&mut child_stdout, self.stdout_capture_max_bytes),
                capped_read(&mut child_stderr, self.stderr_capture_max_bytes),
                proc.wait(),
            )
        })
        .await;
        let execution_time = start_at.elapsed();

        match res {
            Err(_elapsed) => {
                proc.kill()
                    .await
                    .unwrap_or_else(|e| log::warn!("Failed to kill timed-out process: {:#}", e));
                Ok(ExecutionResult {
                    stdout: String::new(),
                    stderr: String::new(),
                    exit_status: None,
                    timed_out: true,
                    execution_time,
                })
            }
            Ok(Err(e)) => Err(JudgeError::SandboxIo(e)),
            Ok(Ok(((), stdout_buf, stderr_buf, exit_status))) => Ok(ExecutionResult {
                stdout: String::from_utf8_lossy(&stdout_buf).into(),
                stderr: String::from_utf8_lossy(&stderr_buf).into(),
                exit_status: exit_status.code(),
                timed_out: false,
                execution_time,
            }),
        }
    }

    fn missing_pipe() -> JudgeError {
        JudgeError::SandboxSpawn(io::Error::new(
            io::ErrorKind::BrokenPipe,
            "child process pipe was not opened",
        ))
    }
}

/// Reads at most `cap` bytes, then drains the rest so the child never
/// blocks on a full pipe.
async fn capped_read<R>(reader: &mut R, cap: usize) -> io::Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::new();
    let mut capped = (&mut *reader).take(cap as u64);
    tokio::io::copy(&mut capped, &mut buf).await?;
    tokio::io::copy(reader, &mut tokio::io::sink()).await?;
    Ok(buf)
}
