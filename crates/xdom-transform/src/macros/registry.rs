//! The macro capability and lookup by id and syntax.

use std::collections::BTreeMap;
use std::sync::Arc;

use xdom_core::{Block, Syntax};

use super::context::MacroTransformationContext;
use super::descriptor::MacroDescriptor;
use super::parameters::BoundParameters;
use crate::error::MacroError;

/// Content handed to a macro, prepared according to its descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MacroContent {
    None,
    Text(String),
    Blocks(Vec<Block>),
}

impl MacroContent {
    /// Raw text, if the content was passed through unparsed.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    #[must_use]
    pub fn into_blocks(self) -> Vec<Block> {
        match self {
            Self::Blocks(blocks) => blocks,
            Self::None | Self::Text(_) => Vec::new(),
        }
    }
}

/// A content-generating unit invoked by a macro block.
pub trait Macro: Send + Sync {
    fn descriptor(&self) -> &MacroDescriptor;

    /// Produce the blocks that replace the call.
    fn execute(
        &self,
        parameters: &BoundParameters,
        content: MacroContent,
        context: &MacroTransformationContext<'_>,
    ) -> Result<Vec<Block>, MacroError>;
}

/// Macros by lowercase id, either for every syntax or for one syntax only.
#[derive(Default)]
pub struct MacroRegistry {
    macros: BTreeMap<(String, Option<Syntax>), Arc<dyn Macro>>,
}

impl MacroRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a macro available in every syntax.
    pub fn register(&mut self, implementation: impl Macro + 'static) {
        self.insert(None, Arc::new(implementation));
    }

    /// Register a macro that only applies to content in `syntax`.
    pub fn register_for_syntax(&mut self, syntax: Syntax, implementation: impl Macro + 'static) {
        self.insert(Some(syntax), Arc::new(implementation));
    }

    fn insert(&mut self, syntax: Option<Syntax>, implementation: Arc<dyn Macro>) {
        let id = implementation.descriptor().id.to_ascii_lowercase();
        self.macros.insert((id, syntax), implementation);
    }

    /// Implementation for `id` in `syntax`, preferring a syntax-specific
    /// registration over a generic one.
    #[must_use]
    pub fn resolve(&self, id: &str, syntax: Option<&Syntax>) -> Option<Arc<dyn Macro>> {
        let id = id.to_ascii_lowercase();
        syntax
            .and_then(|syntax| self.macros.get(&(id.clone(), Some(syntax.clone()))))
            .or_else(|| self.macros.get(&(id, None)))
            .map(Arc::clone)
    }

    /// Descriptors in id order.
    pub fn descriptors(&self) -> impl Iterator<Item = &MacroDescriptor> {
        self.macros.values().map(|implementation| implementation.descriptor())
    }

    pub fn len(&self) -> usize {
        self.macros.len()
    }

    pub fn is_empty(&self) -> bool {
        self.macros.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Named(MacroDescriptor);

    impl Macro for Named {
        fn descriptor(&self) -> &MacroDescriptor {
            &self.0
        }

        fn execute(
            &self,
            _parameters: &BoundParameters,
            _content: MacroContent,
            _context: &MacroTransformationContext<'_>,
        ) -> Result<Vec<Block>, MacroError> {
            Ok(vec![Block::word(self.0.name.clone())])
        }
    }

    #[test]
    fn test_resolve_prefers_syntax_specific() {
        let mut registry = MacroRegistry::new();
        registry.register(Named(MacroDescriptor::new("Info", "generic")));
        registry.register_for_syntax(Syntax::MARKDOWN_1_2, Named(MacroDescriptor::new("info", "markdown")));

        let name = |syntax: Option<&Syntax>| registry.resolve("INFO", syntax).map(|m| m.descriptor().name.clone());
        assert_eq!(name(None).as_deref(), Some("generic"));
        assert_eq!(name(Some(&Syntax::XWIKI_2_1)).as_deref(), Some("generic"));
        assert_eq!(name(Some(&Syntax::MARKDOWN_1_2)).as_deref(), Some("markdown"));
        assert!(registry.resolve("missing", None).is_none());
        assert_eq!(registry.len(), 2);
    }
}
