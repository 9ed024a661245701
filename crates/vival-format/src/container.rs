use std::collections::BTreeMap;

use crate::{Feature, Tag};

/// Features keyed by their tag
///
/// Serves both as the file-level container (global tags) and as the
/// container of a single test (per-test tags).
#[derive(Clone, Default, Debug, PartialEq, Eq)]
pub struct FeatureContainer {
    features: BTreeMap<Tag, Feature>,
}

impl FeatureContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `feature`, merging it into an existing feature of the same tag
    pub fn add(&mut self, feature: Feature) {
        match self.features.get_mut(&feature.tag()) {
            Some(existing) => existing.merge(feature),
            None => {
                self.features.insert(feature.tag(), feature);
            }
        }
    }

    /// Insert `feature`, discarding any existing feature of the same tag
    pub fn replace(&mut self, feature: Feature) {
        self.features.insert(feature.tag(), feature);
    }

    pub fn get(&self, tag: Tag) -> Option<&Feature> {
        self.features.get(&tag)
    }

    pub fn contains(&self, tag: Tag) -> bool {
        self.features.contains_key(&tag)
    }

    /// Joined contents of `tag`, if present
    pub fn merged(&self, tag: Tag) -> Option<String> {
        self.get(tag).map(Feature::merged)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Feature> {
        self.features.values()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Compare by content, treating an absent feature like an empty one
    pub fn content_eq(&self, other: &FeatureContainer) -> bool {
        Tag::ALL.into_iter().all(|tag| match (self.get(tag), other.get(tag)) {
            (Some(a), Some(b)) => a.content_eq(b),
            (Some(f), None) | (None, Some(f)) => f.is_empty() && f.modifiers().next().is_none(),
            (None, None) => true,
        })
    }
}
