use std::fmt;

/// Boxed, thread-safe error used at crate seams (transport errors, causes).
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Identity of an error: which package raised it, its kind tag and the
/// fixed human readable description.
///
/// Two [`Error`]s are equal when their kinds are equal; detail and cause are
/// informational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Kind {
    pub package: &'static str,
    pub tag: &'static str,
    pub description: &'static str,
}

impl Kind {
    #[must_use]
    pub const fn new(package: &'static str, tag: &'static str, description: &'static str) -> Self {
        Self {
            package,
            tag,
            description,
        }
    }

    /// Bare error of this kind.
    #[must_use]
    pub fn error(self) -> Error {
        Error {
            kind: self,
            detail: None,
            source: None,
        }
    }

    /// Error of this kind carrying a free-form detail string.
    #[must_use]
    pub fn with_detail(self, detail: impl Into<String>) -> Error {
        self.error().with_detail(detail)
    }

    /// Error of this kind caused by `source`.
    #[must_use]
    pub fn wrap(self, source: impl Into<BoxError>) -> Error {
        self.error().with_source(source)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.package, self.tag)
    }
}

/// Error envelope shared by all gantry crates.
#[derive(Debug, thiserror::Error)]
#[error("{}{}{}", headline(.kind), detail_suffix(.detail), source_suffix(.source))]
pub struct Error {
    kind: Kind,
    detail: Option<String>,
    #[source]
    source: Option<BoxError>,
}

impl Error {
    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    #[must_use]
    pub fn with_source(mut self, source: impl Into<BoxError>) -> Self {
        self.source = Some(source.into());
        self
    }

    #[must_use]
    pub fn kind(&self) -> Kind {
        self.kind
    }

    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    /// The wrapped cause, if any.
    #[must_use]
    pub fn cause(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        self.source.as_deref()
    }

    /// Whether this error is of the given kind.
    #[must_use]
    pub fn is(&self, kind: Kind) -> bool {
        self.kind == kind
    }
}

impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

impl Eq for Error {}

impl PartialEq<Kind> for Error {
    fn eq(&self, other: &Kind) -> bool {
        self.kind == *other
    }
}

fn headline(kind: &Kind) -> String {
    format!("{} {}: {}", kind.package, kind.tag, kind.description)
}

fn detail_suffix(detail: &Option<String>) -> String {
    detail
        .as_deref()
        .map(|d| format!(" [{d}]"))
        .unwrap_or_default()
}

fn source_suffix(source: &Option<BoxError>) -> String {
    source
        .as_deref()
        .map(|e| format!(": {e}"))
        .unwrap_or_default()
}

pub type Result<T> = std::result::Result<T, Error>;
