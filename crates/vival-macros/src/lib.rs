//! Macros shared by `vival` and `vival-format`
//!
//! - [`debug!`]: tracing of parse and run decisions, compiled out unless the
//!   `debug` feature is on
//! - [`eprint!`]/[`eprintln!`]: stderr printing that drops styling when stderr
//!   is not a terminal (with `color`)
//! - [`cargo_bin!`]: path of a binary target from integration tests

#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![warn(clippy::print_stderr)]
#![warn(clippy::print_stdout)]

#[cfg(feature = "color")]
pub use anstream::{eprint, eprintln};
#[cfg(not(feature = "color"))]
pub use std::{eprint, eprintln};

/// Width the calling module is right-aligned to in [`debug!`] lines
#[doc(hidden)]
pub const MODULE_WIDTH: usize = 28;

/// Trace a decision to stderr as `[module] \t message`
///
/// ```rust
/// let tag = "INPUT";
/// vival_macros::debug!("inferred {tag}");
/// ```
#[cfg(feature = "debug")]
#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => ({
        $crate::eprint!("[{:>w$}] \t", module_path!(), w = $crate::MODULE_WIDTH);
        $crate::eprintln!($($arg)*);
    })
}

/// Trace a decision to stderr as `[module] \t message`
///
/// Expands to nothing; enable the `debug` feature to see the traces.
#[cfg(not(feature = "debug"))]
#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {};
}

/// Path of the executable built for binary target `name`
///
/// Only usable from integration tests and benchmarks, where Cargo sets
/// `CARGO_BIN_EXE_<name>`.
///
/// ```rust,ignore
/// #[test]
/// fn io_tests() {
///     vival::TestFiles::new()
///         .executable(vival::cargo_bin!("vival-fixture"))
///         .case("tests/io/*.txt");
/// }
/// ```
#[macro_export]
macro_rules! cargo_bin {
    ($name:expr) => {
        ::std::path::Path::new(env!(concat!("CARGO_BIN_EXE_", $name)))
    };
}
