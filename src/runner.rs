use std::time::Duration;

use vival_format::{Suite, Test};

use crate::report::FailureReport;
use crate::{Error, Execute, Failure, Invocation, Outcome, ProcessExecutor, Runtime, Shell, SystemShell};

/// What running a suite is for
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    /// Check filled tests against their expected output
    #[default]
    Test,
    /// Record the output of unfilled tests as their expected output
    Fill,
}

impl Mode {
    /// Whether `test` is run in this mode
    pub fn is_suitable(self, test: &Test) -> bool {
        match self {
            Self::Test => test.is_filled(),
            Self::Fill => !test.is_filled(),
        }
    }
}

impl std::str::FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "test" => Ok(Self::Test),
            "fill" => Ok(Self::Fill),
            _ => Err(Error::new(format!(
                "Unknown mode `{s}`, expected `test` or `fill`"
            ))),
        }
    }
}

/// Counts over the suitable tests of one suite
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Summary {
    pub mode: Mode,
    pub passed: usize,
    pub failed: usize,
    pub suitable: usize,
}

impl Summary {
    pub fn is_ok(&self) -> bool {
        self.failed == 0
    }
}

impl std::fmt::Display for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let verb = match self.mode {
            Mode::Test => "Passed",
            Mode::Fill => "Filled",
        };
        write!(f, "{verb} tests: {}/{}", self.passed, self.suitable)
    }
}

/// Result of [`Runner::run`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Run {
    pub summary: Summary,
    /// Index into [`Suite::tests`] of every failed test, in run order
    pub failures: Vec<(usize, Failure)>,
}

impl Run {
    /// Reports for the first `limit` failures
    pub fn reports(&self, suite: &Suite, limit: usize) -> Vec<FailureReport> {
        self.failures
            .iter()
            .take(limit)
            .filter_map(|(index, failure)| {
                let test = suite.tests.get(*index)?;
                Some(FailureReport::new(suite.registry(), test, failure.clone()))
            })
            .collect()
    }
}

/// Runs every suitable test of a suite, in file order
#[derive(Clone, Debug)]
pub struct Runner<S = SystemShell, E = ProcessExecutor> {
    runtime: Runtime<S, E>,
    mode: Mode,
    break_fail: Option<usize>,
    timeout: Option<Duration>,
}

impl Runner {
    pub fn new(mode: Mode) -> Self {
        Self::with_runtime(Runtime::new(), mode)
    }
}

impl<S: Shell, E: Execute> Runner<S, E> {
    pub fn with_runtime(runtime: Runtime<S, E>, mode: Mode) -> Self {
        Self {
            runtime,
            mode,
            break_fail: None,
            timeout: None,
        }
    }

    /// Stop after this many failures
    pub fn break_fail(mut self, failures: Option<usize>) -> Self {
        self.break_fail = failures.filter(|n| *n > 0);
        self
    }

    /// Time limit overriding the suite's `TIMEOUT`
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn run(&self, suite: &mut Suite, invocation: &Invocation) -> Result<Run, Error> {
        let timeout = match self.timeout {
            Some(timeout) => timeout,
            None => suite.timeout()?,
        };
        let registry = suite.registry().clone();

        let mut summary = Summary {
            mode: self.mode,
            ..Default::default()
        };
        let mut failures = Vec::new();
        for (index, test) in suite.tests.iter_mut().enumerate() {
            if !self.mode.is_suitable(test) {
                continue;
            }
            summary.suitable += 1;

            match self.runtime.run(test, invocation, timeout) {
                Outcome::Passed => {
                    summary.passed += 1;
                    if self.mode == Mode::Fill {
                        test.fill(&registry);
                    }
                }
                Outcome::Failed(failure) => {
                    summary.failed += 1;
                    failures.push((index, failure));
                    if self.break_fail.is_some_and(|n| summary.failed >= n) {
                        vival_macros::debug!("stopping after {} failures", summary.failed);
                        break;
                    }
                }
            }
        }

        Ok(Run { summary, failures })
    }
}
