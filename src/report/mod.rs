//! Human-readable output of failed tests

mod color;
mod diff;
mod failure;

pub use color::Palette;
pub use color::Styled;
pub use diff::write_diff;
pub use failure::FailureReport;
