use std::ffi::{OsStr, OsString};
use std::io::prelude::*;
use std::process::Stdio;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::{Duration, Instant};

use crate::Error;

/// How to launch the program under test, before per-test arguments
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Invocation {
    program: OsString,
    args: Vec<OsString>,
}

impl Invocation {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Run the current invocation as arguments of `wrapper`
    pub fn wrapped(
        self,
        wrapper: impl Into<OsString>,
        wrapper_args: impl IntoIterator<Item = impl Into<OsString>>,
    ) -> Self {
        let mut args: Vec<OsString> = wrapper_args.into_iter().map(Into::into).collect();
        args.push(self.program);
        args.extend(self.args);
        Self {
            program: wrapper.into(),
            args,
        }
    }

    /// Check memory errors and leaks with valgrind
    pub fn under_valgrind(self) -> Self {
        self.wrapped("valgrind", ["-q", "--leak-check=full"])
    }

    pub fn program(&self) -> &OsStr {
        &self.program
    }

    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    pub fn to_command(&self) -> std::process::Command {
        let mut cmd = std::process::Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }
}

impl std::fmt::Display for Invocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.program.to_string_lossy())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Result of running the program under test once
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Execution {
    /// Interleaved stdout and stderr
    Completed(String),
    /// Killed after exceeding the time limit
    TimedOut,
}

/// Runs the program under test
pub trait Execute {
    fn execute(
        &self,
        invocation: &Invocation,
        args: &[String],
        stdin: &str,
        timeout: Duration,
    ) -> Result<Execution, Error>;
}

impl<E: Execute + ?Sized> Execute for &E {
    fn execute(
        &self,
        invocation: &Invocation,
        args: &[String],
        stdin: &str,
        timeout: Duration,
    ) -> Result<Execution, Error> {
        (**self).execute(invocation, args, stdin, timeout)
    }
}

/// Spawns a child process with stdout and stderr sharing one pipe
#[derive(Copy, Clone, Debug, Default)]
pub struct ProcessExecutor;

impl Execute for ProcessExecutor {
    fn execute(
        &self,
        invocation: &Invocation,
        args: &[String],
        stdin: &str,
        timeout: Duration,
    ) -> Result<Execution, Error> {
        vival_macros::debug!("spawning `{invocation}` with {args:?}");
        let mut cmd = invocation.to_command();
        cmd.args(args);

        let (reader, writer) = os_pipe::pipe()?;
        let writer_clone = writer.try_clone()?;
        cmd.stdin(Stdio::piped());
        cmd.stdout(writer);
        cmd.stderr(writer_clone);
        let mut child = cmd
            .spawn()
            .map_err(|e| Error::new(format!("Failed to run `{invocation}`: {e}")))?;
        // Avoid a deadlock! This parent process is still holding open pipe
        // writers (inside the Command object), and we have to close those
        // before we read. Here we do this by dropping the Command object.
        drop(cmd);

        let start = Instant::now();

        let input = stdin.as_bytes().to_owned();
        // Programs may exit without reading all of their input, so the writer is never joined
        if let Some(mut stdin) = child.stdin.take() {
            std::thread::spawn(move || stdin.write_all(&input));
        }
        let (sender, receiver) = mpsc::channel();
        threaded_read(reader, sender);

        let Some(_status) = wait_timeout::ChildExt::wait_timeout(&mut child, timeout)? else {
            vival_macros::debug!("`{invocation}` exceeded {timeout:?}, killing");
            let _ = child.kill();
            let _ = child.wait();
            return Ok(Execution::TimedOut);
        };
        vival_macros::debug!("`{invocation}` exited with {_status}");

        // Background processes inheriting the pipe keep it open past the exit
        let remaining = timeout.saturating_sub(start.elapsed());
        let output = match receiver.recv_timeout(remaining) {
            Ok(output) => output?,
            Err(RecvTimeoutError::Timeout) => {
                vival_macros::debug!("output of `{invocation}` still open after {timeout:?}");
                return Ok(Execution::TimedOut);
            }
            Err(RecvTimeoutError::Disconnected) => {
                return Err(Error::new("Reading program output panicked"));
            }
        };
        let output = String::from_utf8_lossy(&output);
        Ok(Execution::Completed(vival_format::utils::normalize_lines(
            &output,
        )))
    }
}

type Stream = mpsc::Sender<Result<Vec<u8>, std::io::Error>>;

fn threaded_read<R>(mut input: R, sender: Stream)
where
    R: Read + Send + 'static,
{
    std::thread::spawn(move || {
        let mut ret = Vec::new();
        let read = input.read_to_end(&mut ret).map(|_| ret);
        let _ = sender.send(read);
    });
}
