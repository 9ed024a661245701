pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Configuration error: bad registry overrides, unusable `TIMEOUT` values
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Error {
    inner: String,
}

impl Error {
    pub fn new(inner: impl std::fmt::Display) -> Self {
        Self {
            inner: inner.to_string(),
        }
    }

    pub fn into_string(self) -> String {
        self.inner
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.inner.fmt(f)
    }
}

impl std::error::Error for Error {}

impl<'s> From<&'s str> for Error {
    fn from(other: &'s str) -> Self {
        Self::new(other)
    }
}

impl From<String> for Error {
    fn from(other: String) -> Self {
        Self { inner: other }
    }
}

/// A test file could not be parsed
///
/// Parsing is all-or-nothing: no partial suite is produced alongside these.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParseError {
    /// The number of `/{` and `}/` markers differ
    UnmatchedBrackets { open: usize, close: usize },
    /// A legacy `[INPUT]` section lacks a marker the requested mode needs
    MalformedLegacySection { index: usize, marker: &'static str },
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnmatchedBrackets { open, close } => write!(
                f,
                "Wrong format! Unmatched number of /{{ and }}/ brackets ({open} opening, {close} closing)."
            ),
            Self::MalformedLegacySection { index, marker } => write!(
                f,
                "Wrong format! Section {index} is missing {}",
                marker.trim_end()
            ),
        }
    }
}

impl std::error::Error for ParseError {}
