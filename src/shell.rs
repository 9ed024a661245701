use std::process::Stdio;

use crate::Error;

/// Runs `STARTUP` and `CLEANUP` lines
pub trait Shell {
    /// Run `line`, returning its exit code
    fn execute(&self, line: &str) -> Result<i32, Error>;
}

impl<S: Shell + ?Sized> Shell for &S {
    fn execute(&self, line: &str) -> Result<i32, Error> {
        (**self).execute(line)
    }
}

/// The platform shell: `sh -c` or `cmd /C`
///
/// Hook output is discarded; only the exit code matters.
#[derive(Copy, Clone, Debug, Default)]
pub struct SystemShell;

impl Shell for SystemShell {
    fn execute(&self, line: &str) -> Result<i32, Error> {
        vival_macros::debug!("shell: {line}");
        let status = shell_command(line)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|e| Error::new(format!("Failed to run `{line}`: {e}")))?;
        // No code when killed by a signal
        Ok(status.code().unwrap_or(-1))
    }
}

#[cfg(windows)]
fn shell_command(line: &str) -> std::process::Command {
    let mut cmd = std::process::Command::new("cmd");
    cmd.arg("/C").arg(line);
    cmd
}

#[cfg(not(windows))]
fn shell_command(line: &str) -> std::process::Command {
    let mut cmd = std::process::Command::new("sh");
    cmd.arg("-c").arg(line);
    cmd
}
