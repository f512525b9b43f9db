//! Building a block tree from an event stream.

use crate::block::{Block, BlockKind};
use crate::error::RenderError;
use crate::event::{Event, EventKind};
use crate::id::IdGenerator;
use crate::listener::Listener;
use crate::metadata::MetaData;
use crate::xdom::XDom;

struct Frame {
    kind: BlockKind,
    parameters: crate::metadata::Parameters,
    children: Vec<Block>,
}

/// Listener that assembles the events it receives into an [`XDom`].
///
/// The stream must be a single balanced `begin_document` .. `end_document`
/// sequence.
///
/// ```
/// use xdom_core::{Container, Event, Listener, MetaData, XDomBuilder};
/// use std::borrow::Cow;
///
/// let mut builder = XDomBuilder::new();
/// builder.event(Event::begin(Container::Document(Cow::Owned(MetaData::new())))).unwrap();
/// builder.event(Event::word("hello")).unwrap();
/// builder.event(Event::end(Container::Document(Cow::Owned(MetaData::new())))).unwrap();
///
/// let xdom = builder.finish().unwrap();
/// assert_eq!(xdom.root().plain_text(), "hello");
/// ```
#[derive(Default)]
pub struct XDomBuilder {
    stack: Vec<Frame>,
    finished: Option<Block>,
}

impl XDomBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Finish with a fresh id generator.
    pub fn finish(self) -> Result<XDom, RenderError> {
        self.finish_with(IdGenerator::new())
    }

    /// Finish, attaching the id generator the parser used.
    ///
    /// An empty stream yields an empty document.
    pub fn finish_with(self, id_generator: IdGenerator) -> Result<XDom, RenderError> {
        if !self.stack.is_empty() {
            return Err(RenderError::Incomplete(self.stack.len()));
        }
        Ok(match self.finished {
            Some(root) => XDom::from_root(root, id_generator),
            None => XDom::with_id_generator(Vec::new(), MetaData::new(), id_generator),
        })
    }

    fn check_open(&self, event: &Event<'_>) -> Result<(), RenderError> {
        if self.finished.is_some() {
            return Err(RenderError::OutsideDocument(event.name()));
        }
        Ok(())
    }
}

impl Listener for XDomBuilder {
    fn event(&mut self, event: Event<'_>) -> Result<(), RenderError> {
        self.check_open(&event)?;
        match event {
            Event::Begin(container, parameters) => {
                if self.stack.is_empty() && container.kind() != EventKind::Document {
                    return Err(RenderError::OutsideDocument(container.kind().name()));
                }
                self.stack.push(Frame {
                    kind: container.into_block_kind(),
                    parameters: parameters.into_owned(),
                    children: Vec::new(),
                });
            }
            Event::End(container, _) => {
                let found = container.kind();
                let frame = self
                    .stack
                    .pop()
                    .ok_or(RenderError::OutsideDocument(found.name()))?;
                let expected = frame.kind.event_kind();
                if expected != found {
                    return Err(RenderError::Unbalanced {
                        expected: expected.name(),
                        found: found.name(),
                    });
                }
                let block = Block::new(frame.kind)
                    .with_parameters(frame.parameters)
                    .with_children(frame.children);
                match self.stack.last_mut() {
                    Some(parent) => parent.children.push(block),
                    None => self.finished = Some(block),
                }
            }
            atomic => {
                let name = atomic.name();
                let parent = self.stack.last_mut().ok_or(RenderError::OutsideDocument(name))?;
                if let Some((kind, parameters)) = atomic.into_atomic_kind() {
                    parent
                        .children
                        .push(Block::new(kind).with_parameters(parameters));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::block::Format;
    use crate::event::Container;

    fn doc() -> Container<'static> {
        Container::Document(Cow::Owned(MetaData::new()))
    }

    #[test]
    fn test_builds_what_traverse_replays() {
        let original = XDom::new(
            vec![Block::paragraph(vec![
                Block::word("a"),
                Block::format(Format::Bold, vec![Block::word("b")]).with_parameter("class", "x"),
            ])],
            MetaData::new().with(MetaData::SYNTAX, "xwiki/2.1"),
        );

        let mut builder = XDomBuilder::new();
        original.traverse(&mut builder).unwrap();
        let rebuilt = builder.finish().unwrap();

        assert_eq!(rebuilt.root(), original.root());
    }

    #[test]
    fn test_rejects_mismatched_end() {
        let mut builder = XDomBuilder::new();
        builder.event(Event::begin(doc())).unwrap();
        builder.event(Event::begin(Container::Paragraph)).unwrap();

        let err = builder.event(Event::end(Container::Section)).unwrap_err();

        assert!(matches!(
            err,
            RenderError::Unbalanced {
                expected: "paragraph",
                found: "section"
            }
        ));
    }

    #[test]
    fn test_rejects_events_outside_document() {
        let mut builder = XDomBuilder::new();
        assert!(matches!(
            builder.event(Event::word("x")),
            Err(RenderError::OutsideDocument("on_word"))
        ));
        assert!(builder.event(Event::begin(Container::Paragraph)).is_err());
    }

    #[test]
    fn test_rejects_incomplete_stream() {
        let mut builder = XDomBuilder::new();
        builder.event(Event::begin(doc())).unwrap();
        builder.event(Event::begin(Container::Group)).unwrap();

        assert!(matches!(builder.finish(), Err(RenderError::Incomplete(2))));
    }

    #[test]
    fn test_rejects_events_after_document() {
        let mut builder = XDomBuilder::new();
        builder.event(Event::begin(doc())).unwrap();
        builder.event(Event::end(doc())).unwrap();

        assert!(builder.event(Event::Space).is_err());
    }

    #[test]
    fn test_empty_stream_is_empty_document() {
        let xdom = XDomBuilder::new().finish().unwrap();
        assert!(xdom.children().is_empty());
    }
}
