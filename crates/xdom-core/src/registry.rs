//! Lookup of parsers and renderers by syntax.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::parser::Parser;
use crate::renderer::Renderer;
use crate::syntax::Syntax;

/// Parsers and renderers keyed by syntax.
///
/// Populated at startup and shared read-only afterwards.
#[derive(Clone, Default)]
pub struct SyntaxRegistry {
    parsers: BTreeMap<Syntax, Arc<dyn Parser>>,
    renderers: BTreeMap<Syntax, Arc<dyn Renderer>>,
}

impl SyntaxRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a parser under its own syntax, replacing any previous one.
    pub fn register_parser(&mut self, parser: impl Parser + 'static) {
        self.parsers.insert(parser.syntax(), Arc::new(parser));
    }

    /// Register a renderer under its own syntax, replacing any previous one.
    pub fn register_renderer(&mut self, renderer: impl Renderer + 'static) {
        self.renderers.insert(renderer.syntax(), Arc::new(renderer));
    }

    #[must_use]
    pub fn parser(&self, syntax: &Syntax) -> Option<Arc<dyn Parser>> {
        self.parsers.get(syntax).map(Arc::clone)
    }

    #[must_use]
    pub fn renderer(&self, syntax: &Syntax) -> Option<Arc<dyn Renderer>> {
        self.renderers.get(syntax).map(Arc::clone)
    }

    pub fn parser_syntaxes(&self) -> impl Iterator<Item = &Syntax> {
        self.parsers.keys()
    }

    pub fn renderer_syntaxes(&self) -> impl Iterator<Item = &Syntax> {
        self.renderers.keys()
    }
}

impl std::fmt::Debug for SyntaxRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyntaxRegistry")
            .field("parsers", &self.parsers.keys().collect::<Vec<_>>())
            .field("renderers", &self.renderers.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::ListenerChain;
    use crate::error::ParseError;
    use crate::id::IdGenerator;
    use crate::listener::Listener;

    struct Nothing;

    impl Parser for Nothing {
        fn syntax(&self) -> Syntax {
            Syntax::PLAIN_1_0
        }

        fn stream(&self, _: &str, _: &mut dyn Listener, _: &mut IdGenerator) -> Result<(), ParseError> {
            Ok(())
        }
    }

    impl Renderer for Nothing {
        fn syntax(&self) -> Syntax {
            Syntax::PLAIN_1_0
        }

        fn create_chain(&self) -> ListenerChain {
            ListenerChain::new()
        }
    }

    #[test]
    fn test_lookup_by_syntax() {
        let mut registry = SyntaxRegistry::new();
        registry.register_parser(Nothing);
        registry.register_renderer(Nothing);

        assert!(registry.parser(&Syntax::PLAIN_1_0).is_some());
        assert!(registry.renderer(&"plain/1.0".parse().unwrap()).is_some());
        assert!(registry.parser(&Syntax::XWIKI_2_1).is_none());
        assert_eq!(registry.parser_syntaxes().count(), 1);
    }

    #[test]
    fn test_default_parse_yields_empty_document() {
        let xdom = Nothing.parse("ignored").unwrap();
        assert!(xdom.children().is_empty());
    }
}
