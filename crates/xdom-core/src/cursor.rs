//! Positioned views into a block tree.

use crate::block::{Block, BlockId, BlockKind};
use crate::event::EventKind;
use crate::metadata::MetaData;
use crate::syntax::Syntax;

/// A block together with the path that leads to it from the root.
///
/// Stands in for a parent back-reference: the ancestor chain is recorded
/// when the cursor is created, so parent and sibling queries never need the
/// tree to store upward links.
#[derive(Clone, Debug)]
pub struct BlockCursor<'a> {
    /// Ancestors from the root down, each with the index of the child that
    /// continues the path.
    path: Vec<(&'a Block, usize)>,
    block: &'a Block,
}

impl<'a> BlockCursor<'a> {
    #[must_use]
    pub fn root(block: &'a Block) -> Self {
        Self {
            path: Vec::new(),
            block,
        }
    }

    /// Cursor on the block `id` within `root`, if present.
    #[must_use]
    pub fn locate(root: &'a Block, id: BlockId) -> Option<Self> {
        let mut cursor = Self::root(root);
        if cursor.seek(id) { Some(cursor) } else { None }
    }

    fn seek(&mut self, id: BlockId) -> bool {
        if self.block.id() == id {
            return true;
        }
        let block = self.block;
        for (index, child) in block.children().iter().enumerate() {
            self.path.push((block, index));
            self.block = child;
            if self.seek(id) {
                return true;
            }
            self.path.pop();
            self.block = block;
        }
        false
    }

    #[must_use]
    pub fn block(&self) -> &'a Block {
        self.block
    }

    #[must_use]
    pub fn parent(&self) -> Option<&'a Block> {
        self.path.last().map(|(parent, _)| *parent)
    }

    /// Cursor on the parent, `None` at the root.
    #[must_use]
    pub fn up(&self) -> Option<Self> {
        let mut path = self.path.clone();
        let (parent, _) = path.pop()?;
        Some(Self { path, block: parent })
    }

    /// Cursor on the child at `index`.
    #[must_use]
    pub fn child(&self, index: usize) -> Option<Self> {
        let child = self.block.children().get(index)?;
        let mut path = self.path.clone();
        path.push((self.block, index));
        Some(Self { path, block: child })
    }

    /// Ancestors, nearest first.
    pub fn ancestors(&self) -> impl Iterator<Item = &'a Block> + '_ {
        self.path.iter().rev().map(|(block, _)| *block)
    }

    /// Number of ancestors.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.path.len()
    }

    /// Siblings preceding this block, nearest first.
    pub fn previous_siblings(&self) -> impl Iterator<Item = &'a Block> + '_ {
        self.path
            .last()
            .map(|&(parent, index)| &parent.children()[..index])
            .unwrap_or_default()
            .iter()
            .rev()
    }

    #[must_use]
    pub fn next_sibling(&self) -> Option<&'a Block> {
        let &(parent, index) = self.path.last()?;
        parent.children().get(index + 1)
    }

    /// First preceding sibling of the given kind.
    ///
    /// With `recurse`, the preceding siblings of each ancestor are searched
    /// in turn, nearest ancestor first.
    #[must_use]
    pub fn previous_block_by_type(&self, kind: EventKind, recurse: bool) -> Option<&'a Block> {
        for depth in (0..self.path.len()).rev() {
            let (parent, index) = self.path[depth];
            let found = parent.children()[..index]
                .iter()
                .rev()
                .find(|block| block.event_kind() == kind);
            if found.is_some() || !recurse {
                return found;
            }
        }
        None
    }

    /// Nearest metadata value for `key`, looking at this block first and then
    /// at each ancestor.
    #[must_use]
    pub fn metadata(&self, key: &str) -> Option<&'a str> {
        std::iter::once(self.block)
            .chain(self.ancestors())
            .find_map(|block| block_metadata(block)?.get(key))
    }

    /// Syntax in effect at this block.
    #[must_use]
    pub fn syntax(&self) -> Option<Syntax> {
        self.metadata(MetaData::SYNTAX)?.parse().ok()
    }
}

fn block_metadata(block: &Block) -> Option<&MetaData> {
    match block.kind() {
        BlockKind::Document(metadata) | BlockKind::MetaData(metadata) => Some(metadata),
        _ => None,
    }
}
