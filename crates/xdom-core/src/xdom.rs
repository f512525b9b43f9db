//! The document root.

use crate::block::{Block, BlockKind};
use crate::error::RenderError;
use crate::event::EventKind;
use crate::id::IdGenerator;
use crate::listener::Listener;
use crate::metadata::MetaData;
use crate::syntax::Syntax;

static EMPTY_METADATA: MetaData = MetaData::empty();

/// A parsed document: the root block plus the id generator used to build it.
///
/// Transformations that create headers keep drawing ids from the same
/// generator so every id in the document stays unique.
#[derive(Clone, Debug)]
pub struct XDom {
    root: Block,
    id_generator: IdGenerator,
}

impl XDom {
    #[must_use]
    pub fn new(children: Vec<Block>, metadata: MetaData) -> Self {
        Self::with_id_generator(children, metadata, IdGenerator::new())
    }

    #[must_use]
    pub fn with_id_generator(children: Vec<Block>, metadata: MetaData, id_generator: IdGenerator) -> Self {
        Self {
            root: Block::new(BlockKind::Document(metadata)).with_children(children),
            id_generator,
        }
    }

    /// Wrap an existing `Document` block. Any other block is made the single
    /// child of a fresh document.
    #[must_use]
    pub fn from_root(root: Block, id_generator: IdGenerator) -> Self {
        let root = if root.event_kind() == EventKind::Document {
            root
        } else {
            Block::new(BlockKind::Document(MetaData::new())).with_children(vec![root])
        };
        Self { root, id_generator }
    }

    #[must_use]
    pub fn root(&self) -> &Block {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Block {
        &mut self.root
    }

    #[must_use]
    pub fn children(&self) -> &[Block] {
        self.root.children()
    }

    #[must_use]
    pub fn metadata(&self) -> &MetaData {
        match self.root.kind() {
            BlockKind::Document(metadata) => metadata,
            _ => &EMPTY_METADATA,
        }
    }

    pub fn metadata_mut(&mut self) -> Option<&mut MetaData> {
        match self.root.kind_mut() {
            BlockKind::Document(metadata) => Some(metadata),
            _ => None,
        }
    }

    /// Source syntax recorded in the document metadata.
    #[must_use]
    pub fn syntax(&self) -> Option<Syntax> {
        self.metadata().get(MetaData::SYNTAX)?.parse().ok()
    }

    #[must_use]
    pub fn id_generator(&self) -> &IdGenerator {
        &self.id_generator
    }

    pub fn id_generator_mut(&mut self) -> &mut IdGenerator {
        &mut self.id_generator
    }

    /// Split into root block and id generator.
    #[must_use]
    pub fn into_parts(self) -> (Block, IdGenerator) {
        (self.root, self.id_generator)
    }

    #[must_use]
    pub fn into_children(self) -> Vec<Block> {
        self.root.into_children()
    }

    /// Children with a single enclosing paragraph unwrapped.
    ///
    /// Content parsed for use inside a line of text would otherwise arrive
    /// wrapped in the paragraph every parser opens for loose text.
    #[must_use]
    pub fn into_inline_children(self) -> Vec<Block> {
        let mut children = self.into_children();
        if children.len() == 1
            && children[0].event_kind() == EventKind::Paragraph
            && let Some(paragraph) = children.pop()
        {
            return paragraph.into_children();
        }
        children
    }

    pub fn traverse(&self, listener: &mut dyn Listener) -> Result<(), RenderError> {
        self.root.traverse(listener)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_from_metadata() {
        let xdom = XDom::new(vec![], MetaData::new().with(MetaData::SYNTAX, "xwiki/2.1"));
        assert_eq!(xdom.syntax(), Some(Syntax::XWIKI_2_1));
    }

    #[test]
    fn test_into_inline_children_strips_paragraph() {
        let xdom = XDom::new(vec![Block::paragraph(vec![Block::word("a")])], MetaData::new());
        let children = xdom.into_inline_children();
        assert_eq!(children, vec![Block::word("a")]);
    }

    #[test]
    fn test_into_inline_children_keeps_multiple_blocks() {
        let xdom = XDom::new(
            vec![Block::paragraph(vec![]), Block::paragraph(vec![])],
            MetaData::new(),
        );
        assert_eq!(xdom.into_inline_children().len(), 2);
    }

    #[test]
    fn test_from_root_wraps_non_document() {
        let xdom = XDom::from_root(Block::word("x"), IdGenerator::new());
        assert_eq!(xdom.root().event_kind(), EventKind::Document);
        assert_eq!(xdom.children().len(), 1);
    }
}
