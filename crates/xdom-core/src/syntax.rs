//! Syntax identifiers.
//!
//! A syntax is identified by a type and a version, written `type/version`
//! (e.g. `xwiki/2.1`, `xhtml/1.0`). Parsers and renderers are registered
//! under these identifiers.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

/// Identifier of a markup syntax.
///
/// # Example
///
/// ```
/// use xdom_core::Syntax;
///
/// let syntax: Syntax = "xwiki/2.1".parse().unwrap();
/// assert_eq!(syntax, Syntax::XWIKI_2_1);
/// assert_eq!(syntax.to_string(), "xwiki/2.1");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Syntax {
    kind: Cow<'static, str>,
    version: Cow<'static, str>,
}

impl Syntax {
    /// XWiki syntax 2.1.
    pub const XWIKI_2_1: Self = Self::from_static("xwiki", "2.1");
    /// XHTML 1.0.
    pub const XHTML_1_0: Self = Self::from_static("xhtml", "1.0");
    /// HTML 5.0, used to tag raw HTML content.
    pub const HTML_5_0: Self = Self::from_static("html", "5.0");
    /// Plain text.
    pub const PLAIN_1_0: Self = Self::from_static("plain", "1.0");
    /// `CommonMark` Markdown.
    pub const MARKDOWN_1_2: Self = Self::from_static("markdown", "1.2");
    /// Human readable event trace, one event per line.
    pub const EVENT_1_0: Self = Self::from_static("event", "1.0");
    /// JSON serialization of the event stream.
    pub const XDOM_JSON_1_0: Self = Self::from_static("xdom+json", "1.0");

    /// Create a syntax identifier.
    pub fn new(kind: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            kind: Cow::Owned(kind.into()),
            version: Cow::Owned(version.into()),
        }
    }

    const fn from_static(kind: &'static str, version: &'static str) -> Self {
        Self {
            kind: Cow::Borrowed(kind),
            version: Cow::Borrowed(version),
        }
    }

    /// Syntax type (`xwiki` in `xwiki/2.1`).
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Syntax version (`2.1` in `xwiki/2.1`).
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Whether content in this syntax is HTML that XHTML output can embed as-is.
    #[must_use]
    pub fn is_html(&self) -> bool {
        matches!(self.kind(), "html" | "xhtml")
    }
}

impl fmt::Display for Syntax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.version)
    }
}

/// Error returned when a syntax identifier cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid syntax identifier '{0}': expected <type>/<version>")]
pub struct SyntaxIdError(pub String);

impl FromStr for Syntax {
    type Err = SyntaxIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, version) = s
            .trim()
            .split_once('/')
            .ok_or_else(|| SyntaxIdError(s.to_owned()))?;
        let valid = |part: &str| !part.is_empty() && !part.contains(char::is_whitespace);
        if !valid(kind) || !valid(version) {
            return Err(SyntaxIdError(s.to_owned()));
        }
        Ok(Self::new(kind, version))
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Syntax {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Syntax {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_roundtrip() {
        let syntax: Syntax = "markdown/1.2".parse().unwrap();
        assert_eq!(syntax.kind(), "markdown");
        assert_eq!(syntax.version(), "1.2");
        assert_eq!(syntax, Syntax::MARKDOWN_1_2);
    }

    #[test]
    fn test_owned_equals_static() {
        assert_eq!(Syntax::new("xhtml", "1.0"), Syntax::XHTML_1_0);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!("xwiki".parse::<Syntax>().is_err());
        assert!("/2.1".parse::<Syntax>().is_err());
        assert!("xwiki/".parse::<Syntax>().is_err());
        assert!("x wiki/2.1".parse::<Syntax>().is_err());
    }

    #[test]
    fn test_is_html() {
        assert!(Syntax::XHTML_1_0.is_html());
        assert!(Syntax::HTML_5_0.is_html());
        assert!(!Syntax::XWIKI_2_1.is_html());
    }
}
