use crate::graph::StepId;
use camino::Utf8PathBuf;
use smol_str::SmolStr;
use std::io;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use tokio::process::Command;
use which::which;

/// A fully expanded command about to run for one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub step: StepId,
    pub program: SmolStr,
    pub args: Vec<String>,
    pub output: Utf8PathBuf,
}

/// Exit of a finished command. `code` is `None` when a signal ended it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunStatus {
    pub success: bool,
    pub code: Option<i32>,
}

impl RunStatus {
    pub const SUCCESS: RunStatus = RunStatus {
        success: true,
        code: Some(0),
    };

    pub fn failed(code: Option<i32>) -> Self {
        Self {
            success: false,
            code,
        }
    }
}

impl From<ExitStatus> for RunStatus {
    fn from(status: ExitStatus) -> Self {
        Self {
            success: status.success(),
            code: status.code(),
        }
    }
}

/// Executes invocations on behalf of the engine. An `Err` means the program never started.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    async fn run(&mut self, invocation: &Invocation) -> io::Result<RunStatus>;
}

/** Runs invocations as child processes
 *
 * # Behavior
 * - Bare program names are resolved through `PATH` with `which`; names
 *   containing a path separator are used as given
 * - stdin, stdout and stderr are inherited
 * - Waits for the child to exit, without timeout
 */
#[derive(Debug, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }

    pub fn find_executable(&self, name: &str) -> io::Result<Utf8PathBuf> {
        if name.contains(std::path::is_separator) {
            return Ok(Utf8PathBuf::from(name));
        }

        match which(name) {
            Ok(path) => utf8_executable(path),
            Err(_) => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("Executable not found: {}", name),
            )),
        }
    }
}

fn utf8_executable(path: PathBuf) -> io::Result<Utf8PathBuf> {
    Utf8PathBuf::try_from(path).map_err(|e| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Executable path is not valid UTF-8: {}", e.as_path().display()),
        )
    })
}

impl CommandRunner for ProcessRunner {
    async fn run(&mut self, invocation: &Invocation) -> io::Result<RunStatus> {
        let executable = self.find_executable(&invocation.program)?;

        let mut command = Command::new(executable.as_std_path());
        command.args(&invocation.args);
        command.stdout(Stdio::inherit());
        command.stderr(Stdio::inherit());
        command.stdin(Stdio::inherit());

        let mut child = command.spawn()?;
        let status = child.wait().await?;

        log::debug!(
            "{} exited with {:?} for {}",
            invocation.program,
            status.code(),
            invocation.output
        );

        Ok(status.into())
    }
}
