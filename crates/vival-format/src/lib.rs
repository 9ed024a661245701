//! # Tagged-block test files
//!
//! `vival-format` reads and writes the text files `vival` runs programs
//! against. It is free of any process handling: parse a file into a
//! [`Suite`], inspect and [validate][Test::validate] its tests, then
//! [render] it back.
//!
//! ```rust
//! use vival_format::{Parser, Tag, TagRegistry};
//!
//! let registry = TagRegistry::new();
//! let mut suite = Parser::new(&registry)
//!     .parse("INPUT /{1 2 3}/ OUTPUT mSHUFFLED /{3}/ /{2}/ /{1}/")
//!     .unwrap();
//!
//! let test = &mut suite.tests[0];
//! assert_eq!(test.stdin(), "1 2 3");
//! test.record_run("1\n2\n3".to_owned(), false);
//! assert!(test.validate());
//! ```
//!
//! ## Feature Flags
//!
//! - `schema`: JSON schema for tag registry overrides
//! - `debug`: trace parse decisions to stderr

#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![warn(clippy::print_stderr)]
#![warn(clippy::print_stdout)]

mod case;
mod container;
mod error;
mod feature;
mod legacy;
mod parse;
mod render;
mod suite;
mod tag;
mod validate;

pub mod utils;

pub use case::Test;
pub use container::FeatureContainer;
pub use error::Error;
pub use error::ParseError;
pub use error::Result;
pub use feature::Feature;
pub use parse::Format;
pub use parse::Parser;
pub use render::render;
pub use suite::Suite;
pub use tag::Modifier;
pub use tag::RegistryFile;
pub use tag::Scope;
pub use tag::Tag;
pub use tag::TagOverride;
pub use tag::TagRegistry;
pub use tag::TagSpec;
