//! The block tree.
//!
//! A [`Block`] owns its children. Identity is carried by a process-unique
//! [`BlockId`], which structural operations use to name the child they act
//! on. Parent lookups go through [`BlockCursor`](crate::BlockCursor), which
//! records the path from the root instead of storing back-references.

use std::borrow::Cow;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::cursor::BlockCursor;
use crate::error::{RenderError, TreeError};
use crate::event::{Container, Event, EventKind};
use crate::listener::Listener;
use crate::metadata::{MetaData, Parameters};
use crate::reference::ResourceReference;
use crate::syntax::Syntax;

static NEXT_BLOCK_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique block identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(u64);

impl BlockId {
    fn next() -> Self {
        Self(NEXT_BLOCK_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Text formatting applied by a format block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Format {
    /// No formatting; carries parameters only.
    None,
    Bold,
    Italic,
    Underlined,
    Strikedout,
    Superscript,
    Subscript,
    Monospace,
}

/// Marker style of a list block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ListType {
    /// `*` in xwiki, `<ul>` in HTML.
    Bulleted,
    /// `1.` in xwiki, `<ol>` in HTML.
    Numbered,
}

/// A macro invocation as written in the source.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MacroCall {
    pub id: String,
    /// Raw text between the opening and closing tags.
    pub content: Option<String>,
    /// Whether the call appears inside a line of text.
    pub inline: bool,
}

impl MacroCall {
    pub fn new(id: impl Into<String>, content: Option<String>, inline: bool) -> Self {
        Self {
            id: id.into(),
            content,
            inline,
        }
    }
}

/// Kind-specific payload of a block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BlockKind {
    Document(MetaData),
    Group,
    Paragraph,
    Section,
    Header { level: u8, id: Option<String> },
    List(ListType),
    ListItem,
    DefinitionList,
    DefinitionTerm,
    DefinitionDescription,
    Table,
    TableRow,
    TableCell,
    TableHeadCell,
    Quotation,
    QuotationLine,
    Figure,
    FigureCaption,
    Format(Format),
    Link {
        reference: ResourceReference,
        freestanding: bool,
    },
    /// Wraps the output of an executed macro, keeping the call it came from.
    MacroMarker(MacroCall),
    MetaData(MetaData),
    /// An unexecuted macro call.
    Macro(MacroCall),
    Word(String),
    Space,
    SpecialSymbol(char),
    NewLine,
    EmptyLines(usize),
    HorizontalLine,
    Id(String),
    Verbatim { content: String, inline: bool },
    Raw { content: String, syntax: Syntax },
    Image {
        reference: ResourceReference,
        freestanding: bool,
        id: Option<String>,
    },
}

impl BlockKind {
    #[must_use]
    pub fn event_kind(&self) -> EventKind {
        match self {
            Self::Document(_) => EventKind::Document,
            Self::Group => EventKind::Group,
            Self::Paragraph => EventKind::Paragraph,
            Self::Section => EventKind::Section,
            Self::Header { .. } => EventKind::Header,
            Self::List(_) => EventKind::List,
            Self::ListItem => EventKind::ListItem,
            Self::DefinitionList => EventKind::DefinitionList,
            Self::DefinitionTerm => EventKind::DefinitionTerm,
            Self::DefinitionDescription => EventKind::DefinitionDescription,
            Self::Table => EventKind::Table,
            Self::TableRow => EventKind::TableRow,
            Self::TableCell => EventKind::TableCell,
            Self::TableHeadCell => EventKind::TableHeadCell,
            Self::Quotation => EventKind::Quotation,
            Self::QuotationLine => EventKind::QuotationLine,
            Self::Figure => EventKind::Figure,
            Self::FigureCaption => EventKind::FigureCaption,
            Self::Format(_) => EventKind::Format,
            Self::Link { .. } => EventKind::Link,
            Self::MacroMarker(_) => EventKind::MacroMarker,
            Self::MetaData(_) => EventKind::MetaData,
            Self::Macro(_) => EventKind::Macro,
            Self::Word(_) => EventKind::Word,
            Self::Space => EventKind::Space,
            Self::SpecialSymbol(_) => EventKind::SpecialSymbol,
            Self::NewLine => EventKind::NewLine,
            Self::EmptyLines(_) => EventKind::EmptyLines,
            Self::HorizontalLine => EventKind::HorizontalLine,
            Self::Id(_) => EventKind::Id,
            Self::Verbatim { .. } => EventKind::Verbatim,
            Self::Raw { .. } => EventKind::Raw,
            Self::Image { .. } => EventKind::Image,
        }
    }
}

/// A node of the document tree.
#[derive(Debug)]
pub struct Block {
    id: BlockId,
    kind: BlockKind,
    parameters: Parameters,
    children: Vec<Block>,
}

impl Clone for Block {
    /// Deep copy; every copied block gets a fresh id.
    fn clone(&self) -> Self {
        Self {
            id: BlockId::next(),
            kind: self.kind.clone(),
            parameters: self.parameters.clone(),
            children: self.children.clone(),
        }
    }
}

/// Structural equality; ids are ignored.
impl PartialEq for Block {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.parameters == other.parameters
            && self.children == other.children
    }
}

impl Eq for Block {}

impl Block {
    /// Childless block with no parameters and a fresh id.
    #[must_use]
    pub fn new(kind: BlockKind) -> Self {
        Self {
            id: BlockId::next(),
            kind,
            parameters: Parameters::new(),
            children: Vec::new(),
        }
    }

    /// Replace the children.
    #[must_use]
    pub fn with_children(mut self, children: Vec<Block>) -> Self {
        self.children = children;
        self
    }

    /// Replace the parameters.
    #[must_use]
    pub fn with_parameters(mut self, parameters: Parameters) -> Self {
        self.parameters = parameters;
        self
    }

    #[must_use]
    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    /// A single word, with no whitespace inside.
    #[must_use]
    pub fn word(text: impl Into<String>) -> Self {
        Self::new(BlockKind::Word(text.into()))
    }

    /// Paragraph holding `children`.
    #[must_use]
    pub fn paragraph(children: Vec<Block>) -> Self {
        Self::new(BlockKind::Paragraph).with_children(children)
    }

    /// Inline formatting around `children`.
    #[must_use]
    pub fn format(format: Format, children: Vec<Block>) -> Self {
        Self::new(BlockKind::Format(format)).with_children(children)
    }

    /// Group, an untyped block container.
    #[must_use]
    pub fn group(children: Vec<Block>) -> Self {
        Self::new(BlockKind::Group).with_children(children)
    }

    /// Scope `metadata` over `children`.
    #[must_use]
    pub fn metadata(metadata: MetaData, children: Vec<Block>) -> Self {
        Self::new(BlockKind::MetaData(metadata)).with_children(children)
    }

    /// Identity used by the structural operations.
    #[must_use]
    pub fn id(&self) -> BlockId {
        self.id
    }

    #[must_use]
    pub fn kind(&self) -> &BlockKind {
        &self.kind
    }

    pub fn kind_mut(&mut self) -> &mut BlockKind {
        &mut self.kind
    }

    /// Event kind this block replays as.
    #[must_use]
    pub fn event_kind(&self) -> EventKind {
        self.kind.event_kind()
    }

    #[must_use]
    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    #[must_use]
    pub fn parameter(&self, key: &str) -> Option<&str> {
        self.parameters.get(key).map(String::as_str)
    }

    pub fn set_parameter(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.parameters.insert(key.into(), value.into());
    }

    #[must_use]
    pub fn children(&self) -> &[Block] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut Vec<Block> {
        &mut self.children
    }

    #[must_use]
    pub fn into_children(self) -> Vec<Block> {
        self.children
    }

    /// Macro call of a `Macro` block.
    #[must_use]
    pub fn macro_call(&self) -> Option<&MacroCall> {
        match &self.kind {
            BlockKind::Macro(call) => Some(call),
            _ => None,
        }
    }

    /// Append `block` as the last child.
    pub fn add_child(&mut self, block: Block) {
        self.children.push(block);
    }

    pub fn add_children(&mut self, blocks: impl IntoIterator<Item = Block>) {
        self.children.extend(blocks);
    }

    fn child_index(&self, id: BlockId) -> Result<usize, TreeError> {
        self.children
            .iter()
            .position(|child| child.id == id)
            .ok_or(TreeError::NotAChild {
                parent: self.id,
                reference: id,
            })
    }

    /// Insert `block` immediately before the child `reference`.
    pub fn insert_child_before(&mut self, block: Block, reference: BlockId) -> Result<(), TreeError> {
        let index = self.child_index(reference)?;
        self.children.insert(index, block);
        Ok(())
    }

    /// Insert `block` immediately after the child `reference`.
    pub fn insert_child_after(&mut self, block: Block, reference: BlockId) -> Result<(), TreeError> {
        let index = self.child_index(reference)?;
        self.children.insert(index + 1, block);
        Ok(())
    }

    /// Swap the child `old` for `block` at the same position and return it.
    pub fn replace_child(&mut self, block: Block, old: BlockId) -> Result<Block, TreeError> {
        let index = self.child_index(old)?;
        Ok(std::mem::replace(&mut self.children[index], block))
    }

    /// Replace the child `old` with zero or more blocks.
    pub fn replace_child_with_blocks(
        &mut self,
        blocks: Vec<Block>,
        old: BlockId,
    ) -> Result<Block, TreeError> {
        let index = self.child_index(old)?;
        let mut removed = self.children.splice(index..=index, blocks);
        let previous = removed.next();
        drop(removed);
        previous.ok_or(TreeError::NotFound(old))
    }

    /// Detach the child `id` and return it.
    pub fn remove_child(&mut self, id: BlockId) -> Result<Block, TreeError> {
        let index = self.child_index(id)?;
        Ok(self.children.remove(index))
    }

    /// Replace the descendant `id` with whatever `f` builds from it.
    ///
    /// Fails with [`TreeError::NotFound`] when no descendant has that id.
    pub fn map_descendant(
        &mut self,
        id: BlockId,
        f: impl FnOnce(Block) -> Vec<Block>,
    ) -> Result<(), TreeError> {
        let parent = self.parent_of_mut(id).ok_or(TreeError::NotFound(id))?;
        let index = parent.child_index(id)?;
        let old = parent.children.remove(index);
        let replacement = f(old);
        parent.children.splice(index..index, replacement);
        Ok(())
    }

    /// Replace the descendant `id` with `blocks`, returning the removed block.
    pub fn replace_descendant(&mut self, id: BlockId, blocks: Vec<Block>) -> Result<Block, TreeError> {
        let parent = self.parent_of_mut(id).ok_or(TreeError::NotFound(id))?;
        parent.replace_child_with_blocks(blocks, id)
    }

    fn parent_of_mut(&mut self, id: BlockId) -> Option<&mut Block> {
        if self.children.iter().any(|child| child.id == id) {
            return Some(self);
        }
        self.children.iter_mut().find_map(|child| child.parent_of_mut(id))
    }

    /// Find this block or a descendant by id.
    #[must_use]
    pub fn find(&self, id: BlockId) -> Option<&Block> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }

    pub fn find_mut(&mut self, id: BlockId) -> Option<&mut Block> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter_mut().find_map(|child| child.find_mut(id))
    }

    /// Cursor positioned on this block, treated as the root.
    #[must_use]
    pub fn cursor(&self) -> BlockCursor<'_> {
        BlockCursor::root(self)
    }

    /// Cursor positioned on the descendant `id`, with its ancestor chain.
    #[must_use]
    pub fn locate(&self, id: BlockId) -> Option<BlockCursor<'_>> {
        BlockCursor::locate(self, id)
    }

    /// All descendants in depth-first pre-order, excluding `self`.
    pub fn descendants(&self) -> impl Iterator<Item = &Block> {
        Descendants {
            stack: vec![self.children.iter()],
        }
    }

    /// Descendants of the given kind in depth-first pre-order.
    ///
    /// With `recurse` unset, the search does not descend into a block once it
    /// matches, but keeps searching sibling branches and non-matching
    /// subtrees.
    pub fn children_by_type(&self, kind: EventKind, recurse: bool) -> ChildrenByType<'_> {
        ChildrenByType {
            kind,
            recurse,
            stack: vec![self.children.iter()],
        }
    }

    /// First descendant of the given kind, in pre-order.
    #[must_use]
    pub fn first_block_by_type(&self, kind: EventKind) -> Option<&Block> {
        self.children_by_type(kind, true).next()
    }

    /// Concatenated text of the words, spaces and symbols below this block.
    #[must_use]
    pub fn plain_text(&self) -> String {
        let mut text = String::new();
        self.collect_text(&mut text);
        text
    }

    fn collect_text(&self, text: &mut String) {
        match &self.kind {
            BlockKind::Word(word) => text.push_str(word),
            BlockKind::Space => text.push(' '),
            BlockKind::SpecialSymbol(symbol) => text.push(*symbol),
            BlockKind::NewLine => text.push('\n'),
            BlockKind::Verbatim { content, .. } => text.push_str(content),
            _ => {
                for child in &self.children {
                    child.collect_text(text);
                }
            }
        }
    }

    /// Replay this block and its subtree onto `listener`.
    pub fn traverse(&self, listener: &mut dyn Listener) -> Result<(), RenderError> {
        if let Some(container) = self.container() {
            listener.event(Event::Begin(container.clone(), Cow::Borrowed(&self.parameters)))?;
            for child in &self.children {
                child.traverse(listener)?;
            }
            listener.event(Event::End(container, Cow::Borrowed(&self.parameters)))
        } else if let Some(event) = self.atomic_event() {
            listener.event(event)
        } else {
            Ok(())
        }
    }

    /// Container payload for begin/end events, `None` for atomic kinds.
    #[must_use]
    pub fn container(&self) -> Option<Container<'_>> {
        Some(match &self.kind {
            BlockKind::Document(m) => Container::Document(Cow::Borrowed(m)),
            BlockKind::Group => Container::Group,
            BlockKind::Paragraph => Container::Paragraph,
            BlockKind::Section => Container::Section,
            BlockKind::Header { level, id } => Container::Header {
                level: *level,
                id: id.as_deref().map(Cow::Borrowed),
            },
            BlockKind::List(t) => Container::List(*t),
            BlockKind::ListItem => Container::ListItem,
            BlockKind::DefinitionList => Container::DefinitionList,
            BlockKind::DefinitionTerm => Container::DefinitionTerm,
            BlockKind::DefinitionDescription => Container::DefinitionDescription,
            BlockKind::Table => Container::Table,
            BlockKind::TableRow => Container::TableRow,
            BlockKind::TableCell => Container::TableCell,
            BlockKind::TableHeadCell => Container::TableHeadCell,
            BlockKind::Quotation => Container::Quotation,
            BlockKind::QuotationLine => Container::QuotationLine,
            BlockKind::Figure => Container::Figure,
            BlockKind::FigureCaption => Container::FigureCaption,
            BlockKind::Format(f) => Container::Format(*f),
            BlockKind::Link {
                reference,
                freestanding,
            } => Container::Link {
                reference: Cow::Borrowed(reference),
                freestanding: *freestanding,
            },
            BlockKind::MacroMarker(call) => Container::MacroMarker(Cow::Borrowed(call)),
            BlockKind::MetaData(m) => Container::MetaData(Cow::Borrowed(m)),
            _ => return None,
        })
    }

    /// The single event an atomic block replays as, `None` for containers.
    #[must_use]
    pub fn atomic_event(&self) -> Option<Event<'_>> {
        let parameters = Cow::Borrowed(&self.parameters);
        Some(match &self.kind {
            BlockKind::Macro(call) => Event::Macro {
                call: Cow::Borrowed(call),
                parameters,
            },
            BlockKind::Word(word) => Event::Word(Cow::Borrowed(word)),
            BlockKind::Space => Event::Space,
            BlockKind::SpecialSymbol(symbol) => Event::SpecialSymbol(*symbol),
            BlockKind::NewLine => Event::NewLine,
            BlockKind::EmptyLines(count) => Event::EmptyLines(*count),
            BlockKind::HorizontalLine => Event::HorizontalLine(parameters),
            BlockKind::Id(name) => Event::Id(Cow::Borrowed(name)),
            BlockKind::Verbatim { content, inline } => Event::Verbatim {
                content: Cow::Borrowed(content),
                inline: *inline,
                parameters,
            },
            BlockKind::Raw { content, syntax } => Event::Raw {
                content: Cow::Borrowed(content),
                syntax: Cow::Borrowed(syntax),
            },
            BlockKind::Image {
                reference,
                freestanding,
                id,
            } => Event::Image {
                reference: Cow::Borrowed(reference),
                freestanding: *freestanding,
                id: id.as_deref().map(Cow::Borrowed),
                parameters,
            },
            _ => return None,
        })
    }
}

struct Descendants<'a> {
    stack: Vec<std::slice::Iter<'a, Block>>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Block;

    fn next(&mut self) -> Option<&'a Block> {
        while let Some(top) = self.stack.last_mut() {
            let Some(block) = top.next() else {
                self.stack.pop();
                continue;
            };
            if !block.children.is_empty() {
                self.stack.push(block.children.iter());
            }
            return Some(block);
        }
        None
    }
}

/// Lazy iterator returned by [`Block::children_by_type`].
pub struct ChildrenByType<'a> {
    kind: EventKind,
    recurse: bool,
    stack: Vec<std::slice::Iter<'a, Block>>,
}

impl<'a> Iterator for ChildrenByType<'a> {
    type Item = &'a Block;

    fn next(&mut self) -> Option<&'a Block> {
        while let Some(top) = self.stack.last_mut() {
            let Some(block) = top.next() else {
                self.stack.pop();
                continue;
            };
            let matched = block.event_kind() == self.kind;
            if (self.recurse || !matched) && !block.children.is_empty() {
                self.stack.push(block.children.iter());
            }
            if matched {
                return Some(block);
            }
        }
        None
    }
}
