use std::collections::BTreeSet;

use crate::{Modifier, Scope, Tag};

/// The realized value of one tag: an ordered list of content blocks
///
/// Blocks are joined with [`Feature::separator`] when the feature is used as a
/// whole ([`Feature::merged`]); shuffled validation looks at the blocks
/// individually.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Feature {
    tag: Tag,
    contents: Vec<String>,
    modifiers: BTreeSet<Modifier>,
    separator: String,
}

impl Feature {
    pub fn new(tag: Tag, separator: impl Into<String>) -> Self {
        Self {
            tag,
            contents: Vec::new(),
            modifiers: BTreeSet::new(),
            separator: separator.into(),
        }
    }

    pub fn with_contents<S: Into<String>>(mut self, contents: impl IntoIterator<Item = S>) -> Self {
        self.contents.extend(contents.into_iter().map(Into::into));
        self
    }

    pub fn with_modifier(mut self, modifier: Modifier) -> Self {
        self.apply(modifier);
        self
    }

    pub fn push(&mut self, block: impl Into<String>) {
        self.contents.push(block.into());
    }

    /// Record `modifier`; `END*` modifiers also replace the active separator
    pub fn apply(&mut self, modifier: Modifier) {
        self.modifiers.insert(modifier);
        if let Some(separator) = modifier.separator() {
            self.separator = separator.to_owned();
        }
    }

    pub fn tag(&self) -> Tag {
        self.tag
    }

    pub fn contents(&self) -> &[String] {
        &self.contents
    }

    pub fn modifiers(&self) -> impl Iterator<Item = Modifier> + '_ {
        self.modifiers.iter().copied()
    }

    pub fn has(&self, modifier: Modifier) -> bool {
        self.modifiers.contains(&modifier)
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }

    pub fn merged(&self) -> String {
        self.contents.join(&self.separator)
    }

    pub fn is_empty(&self) -> bool {
        self.merged().is_empty()
    }

    /// Pull `other` into `self`
    ///
    /// Per-test features accumulate blocks, global features are replaced by
    /// the newer blocks. Modifiers always accumulate.
    pub fn merge(&mut self, other: Feature) {
        debug_assert_eq!(self.tag, other.tag);
        let forces_separator = other.modifiers().any(|m| m.separator().is_some());
        self.modifiers.extend(other.modifiers.iter().copied());
        if forces_separator {
            self.separator = other.separator;
        }
        match self.tag.scope() {
            Scope::PerTest => self.contents.extend(other.contents),
            Scope::Global => self.contents = other.contents,
        }
    }

    /// Single-block copy holding the merged text
    pub(crate) fn collapsed(&self) -> Self {
        Self {
            tag: self.tag,
            contents: vec![self.merged()],
            modifiers: self.modifiers.clone(),
            separator: self.separator.clone(),
        }
    }

    /// Same text, modifiers and, for shuffled features, the same blocks
    pub fn content_eq(&self, other: &Feature) -> bool {
        if self.tag != other.tag || self.modifiers != other.modifiers {
            return false;
        }
        if self.has(Modifier::Shuffled) {
            self.contents == other.contents && self.separator == other.separator
        } else {
            self.merged() == other.merged()
        }
    }
}
