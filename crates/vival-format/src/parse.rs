//! Tagged-block test files
//!
//! A test file is free text in which content blocks are wrapped in `/{` and
//! `}/`. The tag of a block is inferred from the unbracketed "wild space"
//! in front of it: the tag keyword occurring last there wins. A block with no
//! keyword in front of it continues the previous tag.
//!
//! ```text
//! DESCRIPTION /{Adds one to every number}/
//! TIMEOUT /{0.5}/
//!
//! INPUT /{1 2 3}/
//! OUTPUT /{2 3 4}/
//!
//! INPUT /{5}/
//! OUTPUT mSHUFFLED /{6}/
//! ```
//!
//! Test boundaries are implicit: a test ends when a per-test tag it already
//! has shows up again.

use std::collections::BTreeSet;

use crate::utils::{find_all, slice};
use crate::{FeatureContainer, Modifier, ParseError, Scope, Suite, Tag, TagRegistry, Test};

pub(crate) const OPEN: &str = "/{";
pub(crate) const CLOSE: &str = "}/";

/// Which syntax to read a test file with
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Format {
    /// Bracketed blocks, see the [module docs][self]
    #[default]
    New,
    /// `[INPUT]` / `{CMD}` / `[OUTPUT]` sections
    Legacy,
}

/// Parses test files into a [`Suite`]
#[derive(Clone, Debug)]
pub struct Parser<'r> {
    registry: &'r TagRegistry,
    format: Format,
    expect_filled: bool,
}

impl<'r> Parser<'r> {
    pub fn new(registry: &'r TagRegistry) -> Self {
        Self {
            registry,
            format: Format::New,
            expect_filled: true,
        }
    }

    /// Force a syntax; files without any bracket fall back to [`Format::Legacy`] regardless
    pub fn format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    /// Legacy sections must carry `[OUTPUT]` when tests are expected to be filled
    pub fn expect_filled(mut self, yes: bool) -> Self {
        self.expect_filled = yes;
        self
    }

    /// Line endings are normalized to `\n` before anything else
    pub fn parse(&self, text: &str) -> Result<Suite, ParseError> {
        let text = crate::utils::normalize_lines(text);
        let text = text.as_str();
        let opens = find_all(text, OPEN);
        let closes = find_all(text, CLOSE);
        if opens.len() != closes.len() {
            return Err(ParseError::UnmatchedBrackets {
                open: opens.len(),
                close: closes.len(),
            });
        }

        let mut warnings = Vec::new();
        if opens.is_empty() || self.format == Format::Legacy {
            if self.format == Format::New {
                vival_macros::debug!("no brackets, falling back to legacy format");
                warnings.push("Old format detected!".to_owned());
            }
            let tests = crate::legacy::parse(self.registry, text, self.expect_filled)?;
            return Ok(Suite::new(
                self.registry.clone(),
                FeatureContainer::new(),
                tests,
                warnings,
                Format::Legacy,
            ));
        }

        let mut state = State::new(self.registry);
        let mut section_start = 0;
        for (open, close) in opens.into_iter().zip(closes) {
            let wild_space = slice(text, section_start, open);
            let content = slice(text, open + OPEN.len(), close);
            state.block(wild_space, content);
            section_start = close + CLOSE.len();
        }
        let (globals, tests) = state.finish();

        Ok(Suite::new(
            self.registry.clone(),
            globals,
            tests,
            warnings,
            Format::New,
        ))
    }
}

/// Progress of a single left-to-right pass over the bracket pairs
struct State<'r> {
    registry: &'r TagRegistry,
    globals: FeatureContainer,
    tests: Vec<Test>,
    current: Test,
    /// Per-test tags already seen in `current`
    filled: BTreeSet<Tag>,
    previous: Tag,
}

impl<'r> State<'r> {
    fn new(registry: &'r TagRegistry) -> Self {
        Self {
            registry,
            globals: FeatureContainer::new(),
            tests: Vec::new(),
            current: Test::new(test_title(0)),
            filled: BTreeSet::new(),
            previous: Tag::Description,
        }
    }

    fn block(&mut self, wild_space: &str, content: &str) {
        let inferred = infer_tag(wild_space);
        let tag = inferred.unwrap_or(self.previous);

        let mut feature = self.registry.feature(tag);
        feature.push(content);
        for modifier in find_modifiers(wild_space) {
            feature.apply(modifier);
        }

        match (inferred, tag.scope()) {
            (_, Scope::Global) => self.globals.add(feature),
            (None, Scope::PerTest) => self.current.add(feature),
            (Some(_), Scope::PerTest) => {
                if self.filled.contains(&tag) {
                    self.start_test();
                }
                self.filled.insert(tag);
                self.current.add(feature);
            }
        }

        if let Some(tag) = inferred {
            self.previous = tag;
        }
    }

    fn start_test(&mut self) {
        let next = Test::new(test_title(self.tests.len() + 1));
        let done = std::mem::replace(&mut self.current, next);
        vival_macros::debug!("{} complete, starting {}", done.title(), self.current.title());
        self.tests.push(done);
        self.filled.clear();
    }

    fn finish(mut self) -> (FeatureContainer, Vec<Test>) {
        self.tests.push(self.current);
        (self.globals, self.tests)
    }
}

pub(crate) fn test_title(index: usize) -> String {
    format!("Test {}", index + 1)
}

/// Tag whose keyword occurs last in `wild_space`
///
/// Equal offsets go to the tag declared first.
fn infer_tag(wild_space: &str) -> Option<Tag> {
    Tag::ALL
        .into_iter()
        .filter_map(|tag| wild_space.rfind(tag.keyword()).map(|pos| (pos, tag)))
        .max_by(|(a_pos, a), (b_pos, b)| a_pos.cmp(b_pos).then(b.cmp(a)))
        .map(|(_, tag)| tag)
}

/// Modifiers mentioned in `wild_space`, in order of their last mention
fn find_modifiers(wild_space: &str) -> Vec<Modifier> {
    let mut found: Vec<_> = Modifier::ALL
        .into_iter()
        .filter_map(|m| wild_space.rfind(m.keyword()).map(|pos| (pos, m)))
        .collect();
    found.sort();
    found.into_iter().map(|(_, m)| m).collect()
}
