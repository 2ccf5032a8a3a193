//! The tmux subprocess seam.

use std::process::{Command, Output};

use crate::error::TmuxError;

/// Runs one tmux command and returns its stdout. Tests substitute a fake.
pub trait TmuxCommandRunner: Send + Sync {
    fn run(&self, args: &[&str]) -> Result<String, TmuxError>;
}

impl<T: TmuxCommandRunner + ?Sized> TmuxCommandRunner for &T {
    fn run(&self, args: &[&str]) -> Result<String, TmuxError> {
        (**self).run(args)
    }
}

/// Invokes the tmux binary, optionally against one server socket (`-S`).
#[derive(Debug, Clone)]
pub struct TmuxExecutor {
    program: String,
    socket: Option<String>,
}

impl TmuxExecutor {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            socket: None,
        }
    }

    #[must_use]
    pub fn with_socket_path(mut self, path: impl Into<String>) -> Self {
        self.socket = Some(path.into());
        self
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(self.socket.iter().flat_map(|s| ["-S", s.as_str()]));
        cmd.args(args);
        cmd
    }
}

/// Stdout of a successful run; a failure is classified from stderr.
fn into_stdout(output: Output) -> Result<String, TmuxError> {
    if output.status.success() {
        return Ok(String::from_utf8_lossy(&output.stdout).into_owned());
    }
    let stderr = String::from_utf8_lossy(&output.stderr);
    Err(TmuxError::from_failure(output.status.code(), &stderr))
}

impl TmuxCommandRunner for TmuxExecutor {
    fn run(&self, args: &[&str]) -> Result<String, TmuxError> {
        tracing::trace!("{} {}", self.program, args.join(" "));
        into_stdout(self.command(args).output()?)
    }
}
