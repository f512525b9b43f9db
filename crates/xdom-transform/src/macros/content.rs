//! Parsing of macro content into blocks.

use std::sync::Arc;

use xdom_core::{Block, Syntax, SyntaxRegistry};

use crate::context::TransformationContext;
use crate::error::MacroError;

/// Parses macro content with the parsers of a syntax registry.
#[derive(Clone)]
pub struct MacroContentParser {
    syntaxes: Arc<SyntaxRegistry>,
}

impl MacroContentParser {
    pub fn new(syntaxes: Arc<SyntaxRegistry>) -> Self {
        Self { syntaxes }
    }

    #[must_use]
    pub fn syntaxes(&self) -> &SyntaxRegistry {
        &self.syntaxes
    }

    /// Parse `content` in `syntax`.
    ///
    /// Ids are drawn from the context's generator so they stay unique
    /// within the enclosing document. With `inline` set, a single enclosing
    /// paragraph is removed.
    pub fn parse(
        &self,
        content: &str,
        syntax: &Syntax,
        inline: bool,
        context: &TransformationContext<'_>,
    ) -> Result<Vec<Block>, MacroError> {
        let parser = self
            .syntaxes
            .parser(syntax)
            .ok_or_else(|| MacroError::UnknownSyntax(syntax.to_string()))?;

        let ids = context.id_generator();
        let generator = ids.map(|cell| cell.borrow().clone()).unwrap_or_default();
        let xdom = parser
            .parse_with_ids(content, generator)
            .map_err(MacroError::ContentParse)?;
        if let Some(cell) = ids {
            cell.borrow_mut().clone_from(xdom.id_generator());
        }

        Ok(if inline {
            xdom.into_inline_children()
        } else {
            xdom.into_children()
        })
    }
}
