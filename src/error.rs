pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failure of a collaborator: reading files, spawning, compiling
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Error {
    inner: String,
}

impl Error {
    pub fn new(inner: impl std::fmt::Display) -> Self {
        Self::with_string(inner.to_string())
    }

    fn with_string(inner: String) -> Self {
        Self { inner }
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
        Self::with_string(other.to_owned())
    }
}

impl From<String> for Error {
    fn from(other: String) -> Self {
        Self::with_string(other)
    }
}

impl From<std::io::Error> for Error {
    fn from(other: std::io::Error) -> Self {
        Self::new(other)
    }
}

impl From<vival_format::ParseError> for Error {
    fn from(other: vival_format::ParseError) -> Self {
        Self::new(other)
    }
}

impl From<vival_format::Error> for Error {
    fn from(other: vival_format::Error) -> Self {
        Self::with_string(other.into_string())
    }
}
