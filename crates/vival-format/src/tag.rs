//! Catalog of recognized tags and modifiers
//!
//! [`TagRegistry`] is an immutable value: build it once (optionally layering
//! [`RegistryFile`] overrides on top) and pass it by reference to the parser,
//! the renderer and reporters.

use std::collections::BTreeMap;

use crate::Feature;

/// Category of a content block
///
/// Declaration order doubles as the default serialization order and as the
/// tie-break when two keywords start at the same offset.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tag {
    Description,
    Main,
    Flags,
    Timeout,
    Comment,
    Startup,
    Cleanup,
    Input,
    Cmd,
    Output,
}

impl Tag {
    pub const ALL: [Tag; 10] = [
        Tag::Description,
        Tag::Main,
        Tag::Flags,
        Tag::Timeout,
        Tag::Comment,
        Tag::Startup,
        Tag::Cleanup,
        Tag::Input,
        Tag::Cmd,
        Tag::Output,
    ];

    /// Keyword recognized in the wild space of a test file
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Description => "DESCRIPTION",
            Self::Main => "MAIN",
            Self::Flags => "FLAGS",
            Self::Timeout => "TIMEOUT",
            Self::Comment => "COMMENT",
            Self::Startup => "STARTUP",
            Self::Cleanup => "CLEANUP",
            Self::Input => "INPUT",
            Self::Cmd => "CMD",
            Self::Output => "OUTPUT",
        }
    }

    pub fn scope(self) -> Scope {
        match self {
            Self::Description | Self::Main | Self::Flags | Self::Timeout => Scope::Global,
            Self::Comment
            | Self::Startup
            | Self::Cleanup
            | Self::Input
            | Self::Cmd
            | Self::Output => Scope::PerTest,
        }
    }

    pub fn is_global(self) -> bool {
        self.scope() == Scope::Global
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.keyword().fmt(f)
    }
}

impl std::str::FromStr for Tag {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.keyword() == s)
            .ok_or_else(|| crate::Error::new(format!("Unknown tag `{s}`")))
    }
}

/// Where a tag's feature lives
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Scope {
    /// One instance per file, shared by every test; later blocks replace earlier ones
    Global,
    /// One instance per test; blocks accumulate
    PerTest,
}

/// Adjusts how a feature's blocks are joined or compared
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Modifier {
    Shuffled,
    EndNl,
    EndSpace,
    EndNone,
}

impl Modifier {
    pub const ALL: [Modifier; 4] = [
        Modifier::Shuffled,
        Modifier::EndNl,
        Modifier::EndSpace,
        Modifier::EndNone,
    ];

    pub fn keyword(self) -> &'static str {
        match self {
            Self::Shuffled => "mSHUFFLED",
            Self::EndNl => "mENDNL",
            Self::EndSpace => "mENDSPACE",
            Self::EndNone => "mENDNONE",
        }
    }

    /// Separator forced by an `END*` modifier
    pub fn separator(self) -> Option<&'static str> {
        match self {
            Self::Shuffled => None,
            Self::EndNl => Some("\n"),
            Self::EndSpace => Some(" "),
            Self::EndNone => Some(""),
        }
    }
}

impl std::fmt::Display for Modifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.keyword().fmt(f)
    }
}

/// Per-tag configuration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TagSpec {
    pub tag: Tag,
    /// Rank used for serialization order only
    pub order: i64,
    /// Joins a feature's blocks unless an `END*` modifier overrides it
    pub separator: String,
    /// Heading in failure reports, `None` to leave the feature out
    pub label: Option<String>,
    /// Content assumed when the tag is absent
    pub default: Option<String>,
}

impl TagSpec {
    fn builtin(tag: Tag) -> Self {
        let separator = match tag {
            Tag::Cmd => " ",
            _ => "\n",
        };
        let label = match tag {
            Tag::Startup => Some("ENVIRONMENT PREPARATION"),
            Tag::Cleanup => Some("ENVIRONMENT CLEANUP"),
            Tag::Cmd => Some("COMMAND LINE ARGUMENTS"),
            Tag::Input => Some("INPUT"),
            Tag::Output => Some("EXPECTED OUTPUT"),
            Tag::Description | Tag::Main | Tag::Flags | Tag::Timeout | Tag::Comment => None,
        };
        let default = match tag {
            Tag::Timeout => Some("2.0"),
            Tag::Description => Some("No description was provided for these tests."),
            _ => None,
        };
        Self {
            tag,
            order: tag.index() as i64,
            separator: separator.to_owned(),
            label: label.map(ToOwned::to_owned),
            default: default.map(ToOwned::to_owned),
        }
    }

    pub fn scope(&self) -> Scope {
        self.tag.scope()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TagRegistry {
    specs: [TagSpec; 10],
}

impl TagRegistry {
    pub fn new() -> Self {
        Self {
            specs: Tag::ALL.map(TagSpec::builtin),
        }
    }

    /// Built-in registry with the overrides of a TOML document applied
    ///
    /// ```toml
    /// [CMD]
    /// separator = ","
    ///
    /// [OUTPUT]
    /// label = "EXPECTED"
    /// ```
    pub fn from_toml(raw: &str) -> crate::Result<Self> {
        let file = RegistryFile::parse_toml(raw)?;
        Self::new().with_overrides(&file)
    }

    pub fn with_overrides(mut self, file: &RegistryFile) -> crate::Result<Self> {
        for (keyword, update) in &file.tags {
            let tag = keyword.parse::<Tag>()?;
            let spec = &mut self.specs[tag.index()];
            if let Some(order) = update.order {
                spec.order = order;
            }
            if let Some(separator) = &update.separator {
                spec.separator.clone_from(separator);
            }
            if let Some(label) = &update.label {
                spec.label = (!label.is_empty()).then(|| label.clone());
            }
            if let Some(default) = &update.default {
                spec.default = Some(default.clone());
            }
            vival_macros::debug!("{tag} overridden: {spec:?}");
        }
        Ok(self)
    }

    pub fn spec(&self, tag: Tag) -> &TagSpec {
        &self.specs[tag.index()]
    }

    /// Empty feature carrying the tag's configured separator
    pub fn feature(&self, tag: Tag) -> Feature {
        Feature::new(tag, self.spec(tag).separator.clone())
    }

    /// Tags of `scope` in serialization order
    pub fn ordered(&self, scope: Scope) -> Vec<Tag> {
        let mut tags: Vec<_> = Tag::ALL
            .into_iter()
            .filter(|t| t.scope() == scope)
            .collect();
        tags.sort_by_key(|t| (self.spec(*t).order, *t));
        tags
    }
}

impl Default for TagRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Top-level data in a tag registry override file
#[derive(Clone, Default, Debug, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(transparent)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct RegistryFile {
    /// Keyed by tag keyword, e.g. `CMD`
    pub tags: BTreeMap<String, TagOverride>,
}

impl RegistryFile {
    pub fn parse_toml(raw: &str) -> crate::Result<Self> {
        toml_edit::de::from_str(raw).map_err(|e| crate::Error::new(e.to_string()))
    }
}

/// Fields of a [`TagSpec`] that may be reconfigured
#[derive(Clone, Default, Debug, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct TagOverride {
    pub order: Option<i64>,
    pub separator: Option<String>,
    /// Empty to hide the feature from failure reports
    pub label: Option<String>,
    pub default: Option<String>,
}
