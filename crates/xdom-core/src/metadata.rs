//! Document metadata.

use std::collections::BTreeMap;

/// Block parameters (string key to string value, keys unique).
pub type Parameters = BTreeMap<String, String>;

/// Key/value metadata attached to documents and metadata blocks.
///
/// Lookups walk toward the root; the nearest block carrying a key wins.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct MetaData(BTreeMap<String, String>);

impl MetaData {
    /// Syntax the enclosed content was written in (`type/version`).
    pub const SYNTAX: &'static str = "syntax";
    /// Source the content was loaded from.
    pub const SOURCE: &'static str = "source";
    /// Base reference used to resolve relative references.
    pub const BASE: &'static str = "base";
    /// Marks macro output that came from user-authored content rather than
    /// being generated by the macro itself.
    pub const NON_GENERATED_CONTENT: &'static str = "non-generated-content";

    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn empty() -> Self {
        Self(BTreeMap::new())
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for MetaData {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
