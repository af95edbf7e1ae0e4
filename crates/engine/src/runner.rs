//! Encoder subprocess runner.
//!
//! The encoder's stdout and stderr share one pipe, which is streamed to the
//! terminal while the child runs. The orchestrator blocks until the pipe hits
//! end-of-file and the child has been reaped.

use episodic_config::EncoderConfig;
use std::ffi::OsString;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Stdio};
use thiserror::Error;
use tracing::{debug, warn};

/// Error type for encoder invocations
#[derive(Debug, Error)]
pub enum RunnerError {
    /// The encoder could not be started
    #[error("Failed to start {program}: {source}")]
    SpawnFailed {
        program: String,
        #[source]
        source: io::Error,
    },

    /// Encoder exited with a failing status
    #[error("Encoder failed with exit code: {0}")]
    NonZeroExit(i32),

    /// Encoder was killed by a signal
    #[error("Encoder was terminated by signal {0}")]
    Signaled(i32),

    /// Encoder ended without an exit code or signal
    #[error("Encoder terminated abnormally")]
    AbnormalTermination,

    /// IO error on the output pipe or terminal
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Which nonzero exit codes still count as success
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitPolicy {
    pub ignore_nonstandard: bool,
    pub nonstandard_code: i32,
}

impl ExitPolicy {
    pub fn strict(nonstandard_code: i32) -> Self {
        Self {
            ignore_nonstandard: false,
            nonstandard_code,
        }
    }

    pub fn from_config(config: &EncoderConfig) -> Self {
        Self {
            ignore_nonstandard: config.ignore_nonstandard_exit,
            nonstandard_code: config.nonstandard_exit_code,
        }
    }
}

/// How a child process ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    Exited(i32),
    Signaled(i32),
    Unknown,
}

impl From<ExitStatus> for Termination {
    fn from(status: ExitStatus) -> Self {
        if let Some(code) = status.code() {
            return Termination::Exited(code);
        }
        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return Termination::Signaled(signal);
            }
        }
        Termination::Unknown
    }
}

/// Map a termination onto success or failure under `policy`.
pub fn classify(termination: Termination, policy: ExitPolicy) -> Result<(), RunnerError> {
    match termination {
        Termination::Exited(0) => Ok(()),
        Termination::Exited(code) if policy.ignore_nonstandard && code == policy.nonstandard_code => {
            warn!(code, "encoder returned a nonstandard exit code, ignoring it");
            Ok(())
        }
        Termination::Exited(code) => Err(RunnerError::NonZeroExit(code)),
        Termination::Signaled(signal) => Err(RunnerError::Signaled(signal)),
        Termination::Unknown => Err(RunnerError::AbnormalTermination),
    }
}

/// Runs one encoder invocation to completion.
pub trait Execute {
    fn execute(&mut self, args: &[OsString]) -> Result<(), RunnerError>;
}

/// Spawns the encoder program as a child process
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    program: PathBuf,
    policy: ExitPolicy,
    force_color: bool,
}

impl ProcessRunner {
    pub fn new(program: impl Into<PathBuf>, policy: ExitPolicy) -> Self {
        Self {
            program: program.into(),
            policy,
            force_color: false,
        }
    }

    /// Set `AV_LOG_FORCE_COLOR=1` in the child's environment.
    pub fn force_color(mut self, enabled: bool) -> Self {
        self.force_color = enabled;
        self
    }

    /// Spawn, stream merged output into `sink` until EOF, wait, classify.
    pub fn invoke_with_sink<W: Write>(&self, args: &[OsString], sink: &mut W) -> Result<(), RunnerError> {
        debug!(program = %self.program.display(), ?args, "spawning encoder");

        let (mut reader, writer) = io::pipe()?;

        let mut cmd = Command::new(&self.program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(writer.try_clone()?)
            .stderr(writer);
        if self.force_color {
            cmd.env("AV_LOG_FORCE_COLOR", "1");
        }

        let spawned = cmd.spawn();
        // The command holds the parent's copies of the write end; they must be
        // closed before reading or EOF never arrives.
        drop(cmd);
        let mut child = spawned.map_err(|source| RunnerError::SpawnFailed {
            program: self.program.display().to_string(),
            source,
        })?;

        let streamed = stream(&mut reader, sink);
        // Closing the read end lets a child still writing die on EPIPE
        // instead of blocking on a full pipe while we wait.
        drop(reader);
        let status = child.wait()?;
        streamed?;

        debug!(?status, "encoder exited");
        classify(Termination::from(status), self.policy)
    }
}

impl Execute for ProcessRunner {
    fn execute(&mut self, args: &[OsString]) -> Result<(), RunnerError> {
        let stdout = io::stdout();
        let mut sink = stdout.lock();
        self.invoke_with_sink(args, &mut sink)
    }
}

fn stream<R: Read, W: Write>(reader: &mut R, sink: &mut W) -> io::Result<()> {
    let mut buf = [0u8; 8192];
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => return Ok(()),
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        sink.write_all(&buf[..n])?;
        // progress lines end in '\r', so flush every chunk
        sink.flush()?;
    }
}
