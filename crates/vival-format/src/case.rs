use crate::{Feature, FeatureContainer, Tag, TagRegistry};

/// A single test: its per-test features plus the state of its last run
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Test {
    title: String,
    features: FeatureContainer,
    captured_output: Option<String>,
    filled: bool,
    last_run_failed: Option<bool>,
}

impl Test {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            features: FeatureContainer::new(),
            captured_output: None,
            filled: false,
            last_run_failed: None,
        }
    }

    pub fn with_feature(mut self, feature: Feature) -> Self {
        self.add(feature);
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn features(&self) -> &FeatureContainer {
        &self.features
    }

    /// Merge `feature` into this test; an `OUTPUT` feature marks it filled
    pub fn add(&mut self, feature: Feature) {
        debug_assert!(!feature.tag().is_global(), "{} is file-scoped", feature.tag());
        if feature.tag() == Tag::Output {
            self.filled = true;
        }
        self.features.add(feature);
    }

    pub fn get(&self, tag: Tag) -> Option<&Feature> {
        self.features.get(tag)
    }

    /// Joined contents of `tag`, empty when absent
    pub fn merged(&self, tag: Tag) -> String {
        self.features.merged(tag).unwrap_or_default()
    }

    /// Whether an expected output is known
    pub fn is_filled(&self) -> bool {
        self.filled
    }

    pub fn captured_output(&self) -> Option<&str> {
        self.captured_output.as_deref()
    }

    pub fn last_run_failed(&self) -> Option<bool> {
        self.last_run_failed
    }

    pub fn record_run(&mut self, captured_output: String, failed: bool) {
        self.captured_output = Some(captured_output);
        self.last_run_failed = Some(failed);
    }

    /// Override the verdict of the last run, e.g. after validating it
    pub fn set_last_run_failed(&mut self, failed: bool) {
        self.last_run_failed = Some(failed);
    }

    /// Adopt the last captured output as the expected output
    pub fn fill(&mut self, registry: &TagRegistry) {
        let captured = self.captured_output.clone().unwrap_or_default();
        self.filled = true;
        self.features
            .replace(registry.feature(Tag::Output).with_contents([captured]));
    }

    /// Trailing process arguments: `CMD` split on spaces
    pub fn args(&self) -> Vec<String> {
        self.merged(Tag::Cmd)
            .split(' ')
            .filter(|a| !a.is_empty())
            .map(ToOwned::to_owned)
            .collect()
    }

    /// Standard input of the target
    pub fn stdin(&self) -> String {
        self.merged(Tag::Input)
    }

    /// Shell lines to run before the target
    pub fn startup(&self) -> Vec<String> {
        self.lines(Tag::Startup)
    }

    /// Shell lines to run after the target
    pub fn cleanup(&self) -> Vec<String> {
        self.lines(Tag::Cleanup)
    }

    fn lines(&self, tag: Tag) -> Vec<String> {
        self.merged(tag)
            .split('\n')
            .filter(|l| !l.is_empty())
            .map(ToOwned::to_owned)
            .collect()
    }
}
