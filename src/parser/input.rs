//! Types representing classified input.

use std::fmt;

/// Which classification rule accepted the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputType {
    /// Text already looked like a URL and is used verbatim
    Url,
    /// Exact BV id (`BV` + 10 alphanumerics)
    PlatformId,
    /// Bare 10-character id that became valid once `BV` was prefixed
    PrefixedId,
    /// Anything else that mentions the platform domain, passed through as-is
    DomainFragment,
}

impl fmt::Display for InputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Url => write!(f, "URL"),
            Self::PlatformId => write!(f, "BV id"),
            Self::PrefixedId => write!(f, "prefixed BV id"),
            Self::DomainFragment => write!(f, "domain fragment"),
        }
    }
}

/// Canonical fetch URL derived from user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    /// Trimmed input the target was derived from
    pub raw: String,
    /// Rule that produced the URL
    pub input_type: InputType,
    /// URL handed to the download engine
    pub canonical_url: String,
}

impl ResolvedTarget {
    /// Creates a new resolved target.
    #[must_use]
    pub fn new(
        raw: impl Into<String>,
        input_type: InputType,
        canonical_url: impl Into<String>,
    ) -> Self {
        Self {
            raw: raw.into(),
            input_type,
            canonical_url: canonical_url.into(),
        }
    }

    /// Creates a target that uses the input unchanged.
    #[must_use]
    pub fn passthrough(raw: &str, input_type: InputType) -> Self {
        Self::new(raw, input_type, raw)
    }
}

impl fmt::Display for ResolvedTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.input_type, self.canonical_url)
    }
}
