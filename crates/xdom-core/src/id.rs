//! Collision-free identifier generation.

use std::collections::{HashMap, HashSet};
use std::fmt::Write;

use crate::error::IdError;

/// Default prefix; keeps ids from starting with a digit.
pub const DEFAULT_PREFIX: &str = "I";

/// Issues unique identifiers for headers and anchors within one document.
///
/// # Example
///
/// ```
/// use xdom_core::IdGenerator;
///
/// let mut ids = IdGenerator::new();
/// assert_eq!(ids.generate_unique_id("text"), "Itext");
/// assert_eq!(ids.generate_unique_id("te xt"), "Itext-1");
/// assert_eq!(ids.generate_unique_id("Hello World!"), "IHelloWorld21");
/// ```
#[derive(Clone, Debug, Default)]
pub struct IdGenerator {
    next_suffix: HashMap<String, usize>,
    issued: HashSet<String>,
}

impl IdGenerator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Unique id for `base`, prefixed with [`DEFAULT_PREFIX`].
    pub fn generate_unique_id(&mut self, base: &str) -> String {
        self.issue(DEFAULT_PREFIX, base)
    }

    /// Unique id for `base` with a caller-chosen prefix.
    ///
    /// The prefix must be non-empty and ASCII alphanumeric.
    pub fn generate_unique_id_with_prefix(
        &mut self,
        prefix: &str,
        base: &str,
    ) -> Result<String, IdError> {
        if prefix.is_empty() || !prefix.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(IdError::InvalidPrefix(prefix.to_owned()));
        }
        Ok(self.issue(prefix, base))
    }

    /// Reserve an id issued elsewhere so it is never handed out again.
    pub fn register(&mut self, id: impl Into<String>) {
        self.issued.insert(id.into());
    }

    #[must_use]
    pub fn is_issued(&self, id: &str) -> bool {
        self.issued.contains(id)
    }

    fn issue(&mut self, prefix: &str, base: &str) -> String {
        let candidate = format!("{prefix}{}", normalize(base));
        let mut id = candidate.clone();
        if self.issued.contains(&id) {
            let suffix = self.next_suffix.entry(candidate.clone()).or_insert(0);
            loop {
                *suffix += 1;
                id = format!("{candidate}-{suffix}");
                if !self.issued.contains(&id) {
                    break;
                }
            }
        }
        self.issued.insert(id.clone());
        id
    }
}

/// Map `base` onto identifier-safe characters.
///
/// ASCII alphanumerics and `:`, `_`, `.`, `-` are kept, whitespace is
/// dropped, and every other character becomes its code point in uppercase
/// hex.
#[must_use]
pub fn normalize(base: &str) -> String {
    let mut out = String::with_capacity(base.len());
    for c in base.chars() {
        if c.is_ascii_alphanumeric() || matches!(c, ':' | '_' | '.' | '-') {
            out.push(c);
        } else if !c.is_whitespace() {
            let _ = write!(out, "{:02X}", u32::from(c));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_id_is_prefixed_base() {
        let mut ids = IdGenerator::new();
        assert_eq!(ids.generate_unique_id("text"), "Itext");
    }

    #[test]
    fn test_collision_appends_suffix() {
        let mut ids = IdGenerator::new();
        assert_eq!(ids.generate_unique_id("text"), "Itext");
        assert_eq!(ids.generate_unique_id("te xt"), "Itext-1");
        assert_eq!(ids.generate_unique_id("text"), "Itext-2");
    }

    #[test]
    fn test_suffix_skips_registered_ids() {
        let mut ids = IdGenerator::new();
        ids.register("Ia");
        ids.register("Ia-1");
        assert_eq!(ids.generate_unique_id("a"), "Ia-2");
    }

    #[test]
    fn test_normalize_escapes_unsafe_characters() {
        assert_eq!(normalize("a:b_c.d-e"), "a:b_c.d-e");
        assert_eq!(normalize("a/b"), "a2Fb");
        assert_eq!(normalize("é"), "E9");
        assert_eq!(normalize("日"), "65E5");
        assert_eq!(normalize("😀"), "1F600");
    }

    #[test]
    fn test_empty_base_still_yields_token() {
        let mut ids = IdGenerator::new();
        assert_eq!(ids.generate_unique_id(""), "I");
        assert_eq!(ids.generate_unique_id("   "), "I-1");
    }

    #[test]
    fn test_custom_prefix() {
        let mut ids = IdGenerator::new();
        assert_eq!(ids.generate_unique_id_with_prefix("H", "Title").unwrap(), "HTitle");
        assert_eq!(ids.generate_unique_id_with_prefix("H", "Title").unwrap(), "HTitle-1");
    }

    #[test]
    fn test_invalid_prefix_rejected() {
        let mut ids = IdGenerator::new();
        assert!(matches!(
            ids.generate_unique_id_with_prefix("", "whatever"),
            Err(IdError::InvalidPrefix(_))
        ));
        assert!(matches!(
            ids.generate_unique_id_with_prefix("a-b", "whatever"),
            Err(IdError::InvalidPrefix(_))
        ));
    }

    #[test]
    fn test_ids_are_pairwise_distinct() {
        let mut ids = IdGenerator::new();
        let bases = ["a", "a", "a b", "ab", "a-1", "a", "H", ""];
        let mut seen = HashSet::new();
        for (i, base) in bases.iter().enumerate() {
            let id = if i % 2 == 0 {
                ids.generate_unique_id(base)
            } else {
                ids.generate_unique_id_with_prefix("Ia", base).unwrap()
            };
            assert!(seen.insert(id.clone()), "duplicate id {id}");
        }
    }
}
