//! Runs Tabula as a child process.


use std::{
    ffi::OsString,
    fmt::Display,
    io::Read,
    path::{Path, PathBuf},
    process::{Child, Command, ExitStatus, Stdio},
    sync::mpsc,
    thread,
    time::{Duration, Instant},
};

use utils::mpscutil;

use crate::{
    error::{ExtractionError, Result},
    output::ExecutionOutput,
    platform::JvmOptions,
    render::RenderedCommand,
    request::OutputFormat,
};

/// Fully assembled command line for a single run of Tabula.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<OsString>,
    pub format: OutputFormat,
    pub output_path: Option<PathBuf>,
}

impl Invocation {
    /// Assembles `runtime [jvm options] -jar archive [rendered arguments]`.
    pub fn new(
        runtime: &Path,
        archive: &Path,
        jvm_options: &JvmOptions,
        command: &RenderedCommand,
    ) -> Self {
        let mut args = jvm_options.to_args();
        args.reserve(2 + command.len());
        args.push("-jar".into());
        args.push(archive.as_os_str().to_os_string());
        args.extend(command.args().iter().cloned());

        Self {
            program: runtime.to_path_buf(),
            args,
            format: command.output_format(),
            output_path: command.output_path().map(Path::to_path_buf),
        }
    }

    /// Arguments (excluding the program) as lossily converted strings.
    pub fn args_lossy(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect()
    }
}

impl Display for Invocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in self.args_lossy() {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " {arg:?}")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

/// Runs Tabula once for `command`, blocking until it exits or `timeout` elapses.
pub fn execute(
    runtime: &Path,
    archive: &Path,
    command: &RenderedCommand,
    jvm_options: &JvmOptions,
    timeout: Option<Duration>,
) -> Result<ExecutionOutput> {
    check_archive(archive)?;
    let invocation = Invocation::new(runtime, archive, jvm_options, command);
    SubprocessExecutor::new(timeout).execute(&invocation)
}

/// Fails with [ExtractionError::ArchiveNotFound] unless `archive` is an existing file.
pub fn check_archive(archive: &Path) -> Result<()> {
    if archive.is_file() {
        Ok(())
    } else {
        Err(ExtractionError::ArchiveNotFound {
            path: archive.to_path_buf(),
        })
    }
}

/// Executes an [Invocation] and classifies its outcome.
#[cfg_attr(test, mockall::automock)]
pub trait CommandExecutor: Send + Sync {
    fn execute(&self, invocation: &Invocation) -> Result<ExecutionOutput>;
}

/// [CommandExecutor] that spawns one child process per call and blocks until it exits.
#[derive(Clone, Debug)]
pub struct SubprocessExecutor {
    timeout: Option<Duration>,
    poll_interval: Duration,
}

impl SubprocessExecutor {
    const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(20);
    /// How long output is still collected after a timed out child was killed. Processes forked
    /// by the child may keep its pipes open well beyond that.
    const DRAIN_GRACE: Duration = Duration::from_millis(500);

    /// Creates an executor. With a `timeout`, a child still running after that long is killed.
    pub fn new(timeout: Option<Duration>) -> Self {
        Self {
            timeout,
            poll_interval: Self::DEFAULT_POLL_INTERVAL,
        }
    }

    fn wait(&self, child: &mut Child) -> Result<WaitOutcome> {
        let Some(timeout) = self.timeout else {
            return child
                .wait()
                .map(WaitOutcome::Exited)
                .map_err(|err| ExtractionError::io("waiting for Tabula to exit", err));
        };

        let deadline = Instant::now() + timeout;
        loop {
            if let Some(status) = child
                .try_wait()
                .map_err(|err| ExtractionError::io("waiting for Tabula to exit", err))?
            {
                return Ok(WaitOutcome::Exited(status));
            }

            let now = Instant::now();
            if now >= deadline {
                log::warn!("Tabula still running after {timeout:?}, terminating it.");
                if let Err(err) = child.kill() {
                    log::warn!("Failed to kill Tabula process: {err}");
                }
                child
                    .wait()
                    .map_err(|err| ExtractionError::io("reaping terminated Tabula", err))?;
                return Ok(WaitOutcome::TimedOut(timeout));
            }

            thread::sleep(self.poll_interval.min(deadline - now));
        }
    }
}

impl Default for SubprocessExecutor {
    fn default() -> Self {
        Self::new(None)
    }
}

impl CommandExecutor for SubprocessExecutor {
    fn execute(&self, invocation: &Invocation) -> Result<ExecutionOutput> {
        log::info!("Running {invocation}");

        let mut child = Command::new(&invocation.program)
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| ExtractionError::Spawn {
                program: invocation.program.clone(),
                source: err,
            })?;

        let (sender, receiver) = mpsc::channel();
        let mut drains = 0;
        if let Some(stdout) = child.stdout.take() {
            drain_stream(stdout, StreamId::Stdout, sender.clone());
            drains += 1;
        }
        if let Some(stderr) = child.stderr.take() {
            drain_stream(stderr, StreamId::Stderr, sender);
            drains += 1;
        }

        let wait_result = self.wait(&mut child);
        let drain_deadline = matches!(wait_result, Ok(WaitOutcome::TimedOut(_)))
            .then(|| Instant::now() + Self::DRAIN_GRACE);

        // Streams are drained before reporting any outcome. A timed out run only gets DRAIN_GRACE.
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        for _ in 0..drains {
            match receive_drained(&receiver, drain_deadline) {
                Some((StreamId::Stdout, Ok(data))) => stdout = data,
                Some((StreamId::Stderr, Ok(data))) => stderr = data,
                Some((stream, Err(err))) => {
                    return Err(ExtractionError::io(format!("reading Tabula {stream}"), err));
                }
                None => break,
            }
        }

        let status = match wait_result? {
            WaitOutcome::Exited(status) => status,
            WaitOutcome::TimedOut(after) => return Err(ExtractionError::Timeout { after }),
        };

        let stderr = String::from_utf8_lossy(&stderr).into_owned();
        if !status.success() {
            return Err(ExtractionError::ExternalToolFailed {
                status: status.code(),
                stderr,
            });
        }
        if !stderr.trim().is_empty() {
            log::warn!("Tabula succeeded with diagnostics: {}", stderr.trim_end());
        }

        log::info!("Tabula finished successfully.");
        Ok(ExecutionOutput {
            stdout: String::from_utf8_lossy(&stdout).into_owned(),
            stderr,
            format: invocation.format,
            output_path: invocation.output_path.clone(),
        })
    }
}

enum WaitOutcome {
    Exited(ExitStatus),
    TimedOut(Duration),
}

#[derive(Clone, Copy, Debug, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
enum StreamId {
    Stdout,
    Stderr,
}

type DrainMessage = (StreamId, std::io::Result<Vec<u8>>);

/// Waits for the next drained stream, giving up at `deadline` when one is set.
fn receive_drained(
    receiver: &mpsc::Receiver<DrainMessage>,
    deadline: Option<Instant>,
) -> Option<DrainMessage> {
    let received = match deadline {
        None => receiver
            .recv()
            .map_err(|_| mpsc::RecvTimeoutError::Disconnected),
        Some(deadline) => {
            receiver.recv_timeout(deadline.saturating_duration_since(Instant::now()))
        }
    };
    match received {
        Ok(message) => Some(message),
        Err(mpsc::RecvTimeoutError::Timeout) => {
            log::warn!("Output of terminated Tabula is still held open, abandoning it.");
            None
        }
        Err(mpsc::RecvTimeoutError::Disconnected) => {
            log::warn!("Output reader stopped without reporting.");
            None
        }
    }
}

fn drain_stream<R>(mut reader: R, stream: StreamId, sender: mpsc::Sender<DrainMessage>)
where
    R: Read + Send + 'static,
{
    thread::spawn(move || {
        let mut data = Vec::new();
        let result = reader.read_to_end(&mut data).map(|_| data);
        mpscutil::send_or_log_warning(&sender, "drained output", (stream, result));
    });
}
