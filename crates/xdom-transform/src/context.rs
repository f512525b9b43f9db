//! Ambient data shared by the transformations of one pass.

use std::cell::RefCell;

use xdom_core::{IdGenerator, Syntax};

/// Context handed to every transformation of a pass.
///
/// Nested passes started by macros on their own content get a copy with a
/// higher [`depth`](Self::depth); the id generator stays shared so ids
/// created during nested parses stay unique across the document.
#[derive(Clone, Debug, Default)]
pub struct TransformationContext<'a> {
    /// Identifier of the document being transformed, if any.
    pub id: Option<String>,
    /// Syntax of the source, used when the tree carries no syntax metadata.
    pub syntax: Option<Syntax>,
    /// Syntax the result will be rendered to.
    pub target_syntax: Option<Syntax>,
    /// Whether the content is untrusted.
    pub restricted: bool,
    depth: usize,
    ids: Option<&'a RefCell<IdGenerator>>,
}

impl<'a> TransformationContext<'a> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn with_syntax(mut self, syntax: Syntax) -> Self {
        self.syntax = Some(syntax);
        self
    }

    #[must_use]
    pub fn with_target_syntax(mut self, syntax: Syntax) -> Self {
        self.target_syntax = Some(syntax);
        self
    }

    #[must_use]
    pub fn with_restricted(mut self, restricted: bool) -> Self {
        self.restricted = restricted;
        self
    }

    /// Copy of this context drawing ids from `ids`.
    #[must_use]
    pub fn with_id_generator<'b>(&self, ids: &'b RefCell<IdGenerator>) -> TransformationContext<'b> {
        TransformationContext {
            id: self.id.clone(),
            syntax: self.syntax.clone(),
            target_syntax: self.target_syntax.clone(),
            restricted: self.restricted,
            depth: self.depth,
            ids: Some(ids),
        }
    }

    /// Copy of this context one nesting level deeper.
    #[must_use]
    pub fn nested(&self) -> Self {
        Self {
            depth: self.depth + 1,
            ..self.clone()
        }
    }

    /// Number of enclosing macro content transformations.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    #[must_use]
    pub fn id_generator(&self) -> Option<&'a RefCell<IdGenerator>> {
        self.ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_keeps_ambient_data() {
        let ids = RefCell::new(IdGenerator::new());
        let context = TransformationContext::new()
            .with_syntax(Syntax::XWIKI_2_1)
            .with_restricted(true);
        let context = context.with_id_generator(&ids);
        let nested = context.nested().nested();

        assert_eq!(nested.depth(), 2);
        assert!(nested.restricted);
        assert_eq!(nested.syntax, Some(Syntax::XWIKI_2_1));
        assert!(nested.id_generator().is_some_and(|cell| std::ptr::eq(cell, &ids)));
        assert_eq!(context.depth(), 0);
    }
}
