//! # Run programs against tagged stdin/stdout test files
//!
//! A test file is a sequence of tagged blocks:
//! ```text
//! DESCRIPTION /{Sums two numbers}/
//! TIMEOUT /{2}/
//!
//! COMMENT /{small}/
//! INPUT /{1 2}/
//! OUTPUT /{3}/
//!
//! INPUT /{-1 1}/
//! OUTPUT /{0}/
//! ```
//! Each `INPUT` starts a new test once the previous one has its input. The
//! program is fed the input on stdin, optionally with `CMD` arguments and
//! `STARTUP`/`CLEANUP` shell lines around it, and its merged stdout and stderr
//! are compared with `OUTPUT`. Tests without `OUTPUT` can be filled in by
//! running them once.
//!
//! ## Getting Started
//!
//! From the command line:
//! ```console
//! $ vival -t tests.txt solution.cpp
//! ```
//! C and C++ sources are compiled with `gcc`/`g++`, Python is run with
//! `python3` and anything else is executed as-is.
//!
//! From `cargo test`, create a `tests/io_tests.rs` with
//! ```rust,no_run
//! #[test]
//! fn io_tests() {
//!     vival::TestFiles::new()
//!         .executable(vival::cargo_bin!("my-bin"))
//!         .case("tests/io/*.txt");
//! }
//! ```
//! Run with `VIVAL=fill cargo test` to record outputs of unfilled tests.
//!
//! ## Embedding
//!
//! The file format lives in [`format`]; [`Runtime`] runs a single [`format::Test`],
//! [`runner::Runner`] a whole [`format::Suite`].

#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![warn(clippy::print_stderr)]
#![warn(clippy::print_stdout)]

mod cases;
mod command;
mod error;
mod runtime;
mod shell;
mod spec;

pub mod compiler;
pub mod report;
pub mod runner;

pub use cases::TestFiles;
pub use command::{Execute, Execution, Invocation, ProcessExecutor};
pub use error::{Error, Result};
pub use runtime::{Failure, Outcome, Runtime, TIMEOUT_OUTPUT};
pub use shell::{Shell, SystemShell};
pub use vival_macros::cargo_bin;

/// The test file format: parsing, validation and rendering
pub use vival_format as format;
