//! Running a single test
//!
//! Order of operations: every `STARTUP` line, the program under test, every
//! `CLEANUP` line. The first failure decides the outcome; later failures are
//! only logged.

use std::time::Duration;

use vival_format::Test;

use crate::{Execute, Execution, Invocation, ProcessExecutor, Shell, SystemShell};

/// Captured output of a test whose program was killed for running too long
pub const TIMEOUT_OUTPUT: &str = "Time limit exceeded";

/// Why a test failed
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Failure {
    /// A `STARTUP` line exited non-zero; the program never ran
    StartupFailed { line: String },
    /// A `CLEANUP` line exited non-zero
    CleanupFailed { line: String },
    Timeout,
    /// The program could not be launched
    Spawn(String),
    /// The output differs from `OUTPUT`
    Mismatch,
}

impl std::fmt::Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StartupFailed { line } => write!(f, "environment preparation failed at `{line}`"),
            Self::CleanupFailed { line } => write!(f, "environment cleanup failed at `{line}`"),
            Self::Timeout => "time limit exceeded".fmt(f),
            Self::Spawn(_) => "program could not be run".fmt(f),
            Self::Mismatch => "wrong output".fmt(f),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Passed,
    Failed(Failure),
}

impl Outcome {
    pub fn is_passed(&self) -> bool {
        matches!(self, Self::Passed)
    }
}

/// Runs tests through a [`Shell`] for hooks and an [`Execute`] for the program
#[derive(Clone, Debug)]
pub struct Runtime<S = SystemShell, E = ProcessExecutor> {
    shell: S,
    executor: E,
}

impl Runtime {
    pub fn new() -> Self {
        Self::with(SystemShell, ProcessExecutor)
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Shell, E: Execute> Runtime<S, E> {
    pub fn with(shell: S, executor: E) -> Self {
        Self { shell, executor }
    }

    /// Run `test` once, recording the captured output on it
    ///
    /// Unfilled tests pass whenever nothing failed; filled tests must also
    /// [validate][Test::validate].
    pub fn run(&self, test: &mut Test, invocation: &Invocation, timeout: Duration) -> Outcome {
        let args = test.args();
        let stdin = test.stdin();

        for line in test.startup() {
            if !self.hook(&line) {
                test.record_run(
                    format!(
                        "The program was not executed due to errors during environment preparation stage. Failed to execute: {line}"
                    ),
                    true,
                );
                return Outcome::Failed(Failure::StartupFailed { line });
            }
        }

        let mut failure = None;
        let mut output = match self.executor.execute(invocation, &args, &stdin, timeout) {
            Ok(Execution::Completed(output)) => output,
            Ok(Execution::TimedOut) => {
                failure = Some(Failure::Timeout);
                TIMEOUT_OUTPUT.to_owned()
            }
            Err(err) => {
                let output = err.into_string();
                failure = Some(Failure::Spawn(output.clone()));
                output
            }
        };

        for line in test.cleanup() {
            if !self.hook(&line) {
                if failure.is_none() {
                    output = format!(
                        "Errors occurred during environment cleanup stage. Failed to execute: {line}"
                    );
                    failure = Some(Failure::CleanupFailed { line });
                } else {
                    vival_macros::debug!("{}: cleanup also failed at `{line}`", test.title());
                }
                break;
            }
        }

        test.record_run(output, failure.is_some());
        if failure.is_none() && test.is_filled() && !test.validate() {
            failure = Some(Failure::Mismatch);
            test.set_last_run_failed(true);
        }

        vival_macros::debug!("{}: {:?}", test.title(), failure);
        match failure {
            Some(failure) => Outcome::Failed(failure),
            None => Outcome::Passed,
        }
    }

    fn hook(&self, line: &str) -> bool {
        match self.shell.execute(line) {
            Ok(0) => true,
            Ok(_code) => {
                vival_macros::debug!("`{line}` exited with {_code}");
                false
            }
            Err(_err) => {
                vival_macros::debug!("{_err}");
                false
            }
        }
    }
}

#[cfg(test)]
mod test {
    use std::cell::{Cell, RefCell};

    use vival_format::{Parser, TagRegistry};

    use super::*;
    use crate::Error;

    /// Records every line; fails the ones listed
    #[derive(Default)]
    struct FakeShell {
        failing: Vec<&'static str>,
        executed: RefCell<Vec<String>>,
    }

    impl FakeShell {
        fn failing(lines: &[&'static str]) -> Self {
            Self {
                failing: lines.to_vec(),
                ..Default::default()
            }
        }
    }

    impl Shell for FakeShell {
        fn execute(&self, line: &str) -> Result<i32, Error> {
            self.executed.borrow_mut().push(line.to_owned());
            Ok(i32::from(self.failing.contains(&line)))
        }
    }

    struct FakeExecutor {
        result: Result<Execution, Error>,
        calls: Cell<usize>,
        seen: RefCell<Option<(Vec<String>, String)>>,
    }

    impl FakeExecutor {
        fn returning(result: Result<Execution, Error>) -> Self {
            Self {
                result,
                calls: Cell::new(0),
                seen: RefCell::new(None),
            }
        }

        fn printing(output: &str) -> Self {
            Self::returning(Ok(Execution::Completed(output.to_owned())))
        }
    }

    impl Execute for FakeExecutor {
        fn execute(
            &self,
            _invocation: &Invocation,
            args: &[String],
            stdin: &str,
            _timeout: Duration,
        ) -> Result<Execution, Error> {
            self.calls.set(self.calls.get() + 1);
            *self.seen.borrow_mut() = Some((args.to_vec(), stdin.to_owned()));
            self.result.clone()
        }
    }

    fn single(text: &str) -> Test {
        let registry = TagRegistry::new();
        let mut suite = Parser::new(&registry).parse(text).unwrap();
        suite.tests.remove(0)
    }

    fn run(shell: &FakeShell, executor: &FakeExecutor, test: &mut Test) -> Outcome {
        Runtime::with(shell, executor).run(test, &Invocation::new("prog"), Duration::from_secs(2))
    }

    #[test]
    fn passes_on_matching_output() {
        let shell = FakeShell::default();
        let executor = FakeExecutor::printing("2 3 4");
        let mut test = single("CMD /{-v}/ /{--fast}/ INPUT /{1 2 3}/ OUTPUT /{2 3 4}/");

        assert_eq!(run(&shell, &executor, &mut test), Outcome::Passed);
        assert_eq!(
            executor.seen.borrow().clone(),
            Some((vec!["-v".to_owned(), "--fast".to_owned()], "1 2 3".to_owned()))
        );
        assert_eq!(test.captured_output(), Some("2 3 4"));
        assert_eq!(test.last_run_failed(), Some(false));
    }

    #[test]
    fn mismatch_fails() {
        let shell = FakeShell::default();
        let executor = FakeExecutor::printing("2 3 5");
        let mut test = single("INPUT /{1 2 3}/ OUTPUT /{2 3 4}/");

        assert_eq!(
            run(&shell, &executor, &mut test),
            Outcome::Failed(Failure::Mismatch)
        );
        assert_eq!(test.captured_output(), Some("2 3 5"));
        assert_eq!(test.last_run_failed(), Some(true));
    }

    #[test]
    #[cfg(unix)]
    fn crlf_on_both_sides() {
        let mut test = single("INPUT /{}/\r\nOUTPUT /{a\r\nb\r\n}/");
        let invocation = Invocation::new("printf").arg("a\\r\\nb\\r\\n");
        let outcome = Runtime::new().run(&mut test, &invocation, Duration::from_secs(10));

        assert_eq!(outcome, Outcome::Passed, "{:?}", test.captured_output());
        assert_eq!(test.captured_output(), Some("a\nb\n"));
    }

    #[test]
    fn unfilled_passes_on_any_output() {
        let shell = FakeShell::default();
        let executor = FakeExecutor::printing("whatever");
        let mut test = single("INPUT /{1}/");

        assert!(run(&shell, &executor, &mut test).is_passed());
        assert_eq!(test.captured_output(), Some("whatever"));
    }

    #[test]
    fn startup_failure_skips_program_and_cleanup() {
        let shell = FakeShell::failing(&["false"]);
        let executor = FakeExecutor::printing("ok");
        let mut test = single(
            "STARTUP /{touch a}/ /{false}/ /{touch b}/ CLEANUP /{rm a}/ INPUT /{}/ OUTPUT /{ok}/",
        );

        assert_eq!(
            run(&shell, &executor, &mut test),
            Outcome::Failed(Failure::StartupFailed {
                line: "false".to_owned()
            })
        );
        assert_eq!(executor.calls.get(), 0);
        assert_eq!(*shell.executed.borrow(), ["touch a", "false"]);
        assert_eq!(
            test.captured_output(),
            Some("The program was not executed due to errors during environment preparation stage. Failed to execute: false")
        );
        assert_eq!(test.last_run_failed(), Some(true));
    }

    #[test]
    fn timeout_never_validates() {
        let shell = FakeShell::default();
        let executor = FakeExecutor::returning(Ok(Execution::TimedOut));
        let mut test = single("INPUT /{}/ OUTPUT /{Time limit exceeded}/");

        assert_eq!(
            run(&shell, &executor, &mut test),
            Outcome::Failed(Failure::Timeout)
        );
        assert_eq!(test.captured_output(), Some(TIMEOUT_OUTPUT));
    }

    #[test]
    fn cleanup_runs_after_timeout_without_overwriting() {
        let shell = FakeShell::failing(&["rm missing"]);
        let executor = FakeExecutor::returning(Ok(Execution::TimedOut));
        let mut test = single("CLEANUP /{rm missing}/ /{rm other}/ INPUT /{}/");

        assert_eq!(
            run(&shell, &executor, &mut test),
            Outcome::Failed(Failure::Timeout)
        );
        assert_eq!(*shell.executed.borrow(), ["rm missing"]);
        assert_eq!(test.captured_output(), Some(TIMEOUT_OUTPUT));
    }

    #[test]
    fn cleanup_failure_after_success() {
        let shell = FakeShell::failing(&["rm a"]);
        let executor = FakeExecutor::printing("ok");
        let mut test = single("CLEANUP /{rm a}/ INPUT /{}/ OUTPUT /{ok}/");

        assert_eq!(
            run(&shell, &executor, &mut test),
            Outcome::Failed(Failure::CleanupFailed {
                line: "rm a".to_owned()
            })
        );
        assert_eq!(
            test.captured_output(),
            Some("Errors occurred during environment cleanup stage. Failed to execute: rm a")
        );
    }

    #[test]
    fn spawn_error_is_recorded() {
        let shell = FakeShell::default();
        let executor = FakeExecutor::returning(Err(Error::new("Failed to run `prog`: not found")));
        let mut test = single("INPUT /{}/");

        assert_eq!(
            run(&shell, &executor, &mut test),
            Outcome::Failed(Failure::Spawn(
                "Failed to run `prog`: not found".to_owned()
            ))
        );
        assert_eq!(test.captured_output(), Some("Failed to run `prog`: not found"));
    }

    #[test]
    fn hooks_run_in_order() {
        let shell = FakeShell::default();
        let executor = FakeExecutor::printing("");
        let mut test = single("STARTUP /{a\nb}/ CLEANUP /{c}/ /{d}/ INPUT /{}/");

        assert!(run(&shell, &executor, &mut test).is_passed());
        assert_eq!(*shell.executed.borrow(), ["a", "b", "c", "d"]);
        assert_eq!(executor.calls.get(), 1);
    }
}
