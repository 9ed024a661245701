use std::time::Duration;

use crate::{FeatureContainer, Format, Tag, TagRegistry, Test};

const SANITIZE_FLAG: &str = "-fsanitize=";

/// Everything read from one test file
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Suite {
    /// File-scoped features shared by every test
    pub globals: FeatureContainer,
    pub tests: Vec<Test>,
    /// Non-fatal parse diagnostics, e.g. the legacy format fallback
    pub warnings: Vec<String>,
    /// Syntax the file was actually read with
    pub format: Format,
    registry: TagRegistry,
}

impl Suite {
    pub(crate) fn new(
        registry: TagRegistry,
        globals: FeatureContainer,
        tests: Vec<Test>,
        warnings: Vec<String>,
        format: Format,
    ) -> Self {
        Self {
            globals,
            tests,
            warnings,
            format,
            registry,
        }
    }

    pub fn registry(&self) -> &TagRegistry {
        &self.registry
    }

    /// `DESCRIPTION`, falling back to the registry default
    pub fn description(&self) -> String {
        self.global_or_default(Tag::Description).unwrap_or_default()
    }

    /// Source text substituted for the program's own `main`
    pub fn main_text(&self) -> Option<String> {
        self.globals.merged(Tag::Main)
    }

    pub fn has_main(&self) -> bool {
        self.globals.contains(Tag::Main)
    }

    /// Compiler flags
    pub fn flags(&self) -> Option<String> {
        self.globals.merged(Tag::Flags)
    }

    /// Names listed by every `-fsanitize=` flag, in order
    pub fn sanitizers(&self) -> Vec<String> {
        let flags = self.flags().unwrap_or_default();
        flags
            .split_whitespace()
            .filter_map(|token| token.strip_prefix(SANITIZE_FLAG))
            .flat_map(|names| names.split(','))
            .filter(|name| !name.is_empty())
            .map(ToOwned::to_owned)
            .collect()
    }

    /// Drop every `-fsanitize=` flag from `FLAGS`
    pub fn strip_sanitizers(&mut self) {
        let Some(flags) = self.flags() else {
            return;
        };
        let kept = flags
            .split_whitespace()
            .filter(|token| !token.starts_with(SANITIZE_FLAG))
            .collect::<Vec<_>>()
            .join(" ");
        vival_macros::debug!("FLAGS without sanitizers: {kept:?}");
        self.globals
            .replace(self.registry.feature(Tag::Flags).with_contents([kept]));
    }

    /// Time limit for a single target run
    ///
    /// `TIMEOUT` is read as seconds (`2.5`) or as a duration (`1500ms`).
    pub fn timeout(&self) -> crate::Result<Duration> {
        let raw = self
            .global_or_default(Tag::Timeout)
            .ok_or_else(|| crate::Error::new("No TIMEOUT given and no default configured"))?;
        parse_timeout(raw.trim())
    }

    /// Serialize back into the bracketed format
    pub fn render(&self) -> String {
        crate::render(&self.registry, &self.globals, &self.tests)
    }

    fn global_or_default(&self, tag: Tag) -> Option<String> {
        self.globals
            .merged(tag)
            .or_else(|| self.registry.spec(tag).default.clone())
    }
}

impl std::fmt::Display for Suite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.description().fmt(f)
    }
}

fn parse_timeout(raw: &str) -> crate::Result<Duration> {
    if let Ok(secs) = raw.parse::<f64>() {
        return Duration::try_from_secs_f64(secs)
            .map_err(|e| crate::Error::new(format!("Invalid TIMEOUT `{raw}`: {e}")));
    }
    humantime::parse_duration(raw).map_err(|e| {
        crate::Error::new(format!(
            "Invalid TIMEOUT `{raw}`: expected seconds or a duration like `1500ms` ({e})"
        ))
    })
}
