//! Per-invocation view handed to a macro.

use xdom_core::{Block, MacroCall, MetaData, Syntax};

use super::transformation::MacroTransformation;
use crate::context::TransformationContext;
use crate::error::MacroError;

/// What a macro sees while it runs: the call, the ambient transformation
/// data and the document being transformed.
///
/// Every execution gets its own instance. The document is read-only here;
/// the engine substitutes the result after the macro returns.
pub struct MacroTransformationContext<'a> {
    engine: &'a MacroTransformation,
    transformation: &'a TransformationContext<'a>,
    root: &'a Block,
    call: &'a MacroCall,
    syntax: Option<&'a Syntax>,
}

impl<'a> MacroTransformationContext<'a> {
    pub(crate) fn new(
        engine: &'a MacroTransformation,
        transformation: &'a TransformationContext<'a>,
        root: &'a Block,
        call: &'a MacroCall,
        syntax: Option<&'a Syntax>,
    ) -> Self {
        Self {
            engine,
            transformation,
            root,
            call,
            syntax,
        }
    }

    #[must_use]
    pub fn call(&self) -> &MacroCall {
        self.call
    }

    #[must_use]
    pub fn is_inline(&self) -> bool {
        self.call.inline
    }

    /// Syntax of the content surrounding the call.
    #[must_use]
    pub fn syntax(&self) -> Option<&Syntax> {
        self.syntax
    }

    #[must_use]
    pub fn is_restricted(&self) -> bool {
        self.transformation.restricted
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.transformation.depth()
    }

    #[must_use]
    pub fn transformation_context(&self) -> &TransformationContext<'a> {
        self.transformation
    }

    /// Root of the tree being transformed.
    #[must_use]
    pub fn root(&self) -> &Block {
        self.root
    }

    /// Parse `content` in the syntax surrounding the call.
    pub fn parse_content(&self, content: &str) -> Result<Vec<Block>, MacroError> {
        let syntax = self
            .syntax
            .ok_or_else(|| MacroError::Execution("no syntax to parse macro content with".to_owned()))?;
        self.parse_content_as(content, syntax)
    }

    pub fn parse_content_as(&self, content: &str, syntax: &Syntax) -> Result<Vec<Block>, MacroError> {
        self.engine
            .content_parser()
            .parse(content, syntax, self.call.inline, self.transformation)
    }

    /// Run the macro transformation over `blocks` one nesting level deeper.
    pub fn transform_content(&self, blocks: Vec<Block>) -> Result<Vec<Block>, MacroError> {
        let metadata = match self.syntax {
            Some(syntax) => MetaData::new().with(MetaData::SYNTAX, syntax.to_string()),
            None => MetaData::new(),
        };
        let mut root = Block::metadata(metadata, blocks);
        let nested = self.transformation.nested();
        self.engine
            .transform_tree(&mut root, &nested)
            .map_err(|e| MacroError::ContentTransformation(Box::new(e)))?;
        Ok(root.into_children())
    }
}
