//! Link and image references.

use std::fmt;

/// What a reference points at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ResourceType {
    Url,
    Document,
    Attachment,
    Mailto,
    Path,
    Unknown,
}

impl ResourceType {
    /// Prefix used when the reference is written in typed form (`doc:Page`).
    #[must_use]
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Url => "url",
            Self::Document => "doc",
            Self::Attachment => "attach",
            Self::Mailto => "mailto",
            Self::Path => "path",
            Self::Unknown => "unknown",
        }
    }

    fn from_prefix(prefix: &str) -> Option<Self> {
        Some(match prefix {
            "url" => Self::Url,
            "doc" => Self::Document,
            "attach" => Self::Attachment,
            "mailto" => Self::Mailto,
            "path" => Self::Path,
            _ => return None,
        })
    }
}

/// Target of a link or image.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourceReference {
    pub kind: ResourceType,
    pub reference: String,
    /// Whether the source spelled out the type prefix explicitly.
    pub typed: bool,
}

impl ResourceReference {
    #[must_use]
    pub fn new(kind: ResourceType, reference: impl Into<String>) -> Self {
        Self {
            kind,
            reference: reference.into(),
            typed: false,
        }
    }

    #[must_use]
    pub fn url(reference: impl Into<String>) -> Self {
        Self::new(ResourceType::Url, reference)
    }

    /// Parse a reference as written in wiki markup.
    ///
    /// Absolute `http(s)`/`ftp` URLs are untyped URLs. Explicit prefixes
    /// (`url:`, `doc:`, `attach:`, `path:`, `mailto:`) select the type.
    /// Anything else is a document reference.
    ///
    /// ```
    /// use xdom_core::{ResourceReference, ResourceType};
    ///
    /// let r = ResourceReference::parse("https://example.com");
    /// assert_eq!(r.kind, ResourceType::Url);
    /// assert!(!r.typed);
    ///
    /// let r = ResourceReference::parse("attach:file.png");
    /// assert_eq!(r.kind, ResourceType::Attachment);
    /// assert_eq!(r.reference, "file.png");
    /// ```
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        if is_absolute_url(raw) {
            return Self::url(raw);
        }
        if let Some((prefix, rest)) = raw.split_once(':')
            && let Some(kind) = ResourceType::from_prefix(prefix)
        {
            return Self {
                kind,
                reference: rest.to_owned(),
                typed: true,
            };
        }
        Self::new(ResourceType::Document, raw)
    }

    /// Reference as written back in wiki markup.
    #[must_use]
    pub fn to_syntax(&self) -> String {
        if self.typed {
            format!("{}:{}", self.kind.prefix(), self.reference)
        } else {
            self.reference.clone()
        }
    }

    /// Value suitable for an `href`/`src` attribute.
    #[must_use]
    pub fn href(&self) -> String {
        match self.kind {
            ResourceType::Mailto => format!("mailto:{}", self.reference),
            _ => self.reference.clone(),
        }
    }
}

impl fmt::Display for ResourceReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_syntax())
    }
}

/// Whether `raw` starts with a scheme recognised as a freestanding URL.
#[must_use]
pub fn is_absolute_url(raw: &str) -> bool {
    ["http://", "https://", "ftp://"]
        .iter()
        .any(|scheme| raw.starts_with(scheme) && raw.len() > scheme.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_document_reference() {
        let r = ResourceReference::parse("Main.WebHome");
        assert_eq!(r.kind, ResourceType::Document);
        assert_eq!(r.to_syntax(), "Main.WebHome");
    }

    #[test]
    fn test_typed_roundtrip() {
        let r = ResourceReference::parse("mailto:john@example.com");
        assert_eq!(r.kind, ResourceType::Mailto);
        assert_eq!(r.to_syntax(), "mailto:john@example.com");
        assert_eq!(r.href(), "mailto:john@example.com");
    }

    #[test]
    fn test_unknown_prefix_is_document() {
        let r = ResourceReference::parse("Space:Page");
        assert_eq!(r.kind, ResourceType::Document);
        assert_eq!(r.reference, "Space:Page");
    }

    #[test]
    fn test_bare_scheme_is_not_url() {
        assert!(!is_absolute_url("https://"));
        assert!(is_absolute_url("https://a"));
    }
}
