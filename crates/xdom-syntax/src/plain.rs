//! Plain text in and out.

use std::borrow::Cow;

use xdom_core::chain::{BlockStateChainingListener, MacroMarkerStrippingListener};
use xdom_core::{
    ChainState, ChainingListener, Container, Event, EventKind, IdGenerator, ListenerChain,
    Listener, MetaData, Next, ParseError, Parser, RenderError, Renderer, Syntax, plain,
};

/// Reads text as paragraphs separated by blank lines.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTextParser;

impl Parser for PlainTextParser {
    fn syntax(&self) -> Syntax {
        Syntax::PLAIN_1_0
    }

    fn stream(
        &self,
        source: &str,
        listener: &mut dyn Listener,
        _ids: &mut IdGenerator,
    ) -> Result<(), ParseError> {
        let metadata = MetaData::new().with(MetaData::SYNTAX, Syntax::PLAIN_1_0.to_string());
        let document = Container::Document(Cow::Owned(metadata));
        listener.event(Event::begin(document.clone()))?;

        let source = source.replace("\r\n", "\n");
        let mut paragraph: Vec<&str> = Vec::new();
        for line in source.split('\n').chain(std::iter::once("")) {
            if !line.trim().is_empty() {
                paragraph.push(line);
                continue;
            }
            if paragraph.is_empty() {
                continue;
            }
            listener.event(Event::begin(Container::Paragraph))?;
            plain::emit_text(&paragraph.join("\n"), listener)?;
            listener.event(Event::end(Container::Paragraph))?;
            paragraph.clear();
        }

        listener.event(Event::end(document))?;
        Ok(())
    }
}

/// Writes the text content of a tree, dropping all markup.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTextRenderer;

impl Renderer for PlainTextRenderer {
    fn syntax(&self) -> Syntax {
        Syntax::PLAIN_1_0
    }

    fn create_chain(&self) -> ListenerChain {
        ListenerChain::new()
            .with(MacroMarkerStrippingListener)
            .with(BlockStateChainingListener)
            .with(PlainTextPrinter::default())
    }
}

#[derive(Default)]
struct PlainTextPrinter {
    /// Separator owed before the next block.
    pending: Option<&'static str>,
    /// Output offset after each open link, for the empty-label fallback.
    links: Vec<(usize, String)>,
}

impl PlainTextPrinter {
    const NAME: &'static str = "plain-printer";

    /// Print the owed separator, counting new lines already at the end of
    /// the output.
    fn flush(&mut self, state: &mut ChainState) {
        let Some(separator) = self.pending.take() else { return };
        let output = state.output();
        if output.is_empty() {
            return;
        }
        let trailing = output.len() - output.trim_end_matches('\n').len();
        if let Some(missing) = separator.get(trailing..) {
            state.print(missing);
        }
    }

    /// Own a separator of at least `separator`'s strength.
    fn owe(&mut self, separator: &'static str) {
        if self.pending.is_none_or(|current| current.len() < separator.len()) {
            self.pending = Some(separator);
        }
    }
}

impl ChainingListener for PlainTextPrinter {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn on_event(&mut self, event: Event<'_>, next: &mut Next<'_>) -> Result<(), RenderError> {
        let state = next.state_mut();
        match &event {
            Event::Begin(container, _) => match container {
                Container::ListItem
                | Container::TableRow
                | Container::QuotationLine
                | Container::DefinitionTerm
                | Container::DefinitionDescription
                | Container::FigureCaption => {
                    self.owe("\n");
                    self.flush(state);
                }
                Container::TableCell | Container::TableHeadCell => {
                    if state.block.table_cell_index().is_some_and(|index| index > 0) {
                        state.print("\t");
                    }
                }
                Container::Link { reference, .. } => {
                    self.flush(state);
                    self.links.push((state.output_len(), reference.reference.clone()));
                }
                _ => self.flush(state),
            },
            Event::End(container, _) => match container.kind() {
                EventKind::Paragraph
                | EventKind::Header
                | EventKind::Table
                | EventKind::Quotation
                | EventKind::DefinitionList
                | EventKind::Group
                | EventKind::Figure => self.owe("\n\n"),
                EventKind::List if state.block.list_depth() <= 1 => self.owe("\n\n"),
                EventKind::Link => {
                    if let Some((start, reference)) = self.links.pop()
                        && state.output_len() == start
                    {
                        state.print(&reference);
                    }
                }
                _ => {}
            },
            Event::Word(word) => {
                self.flush(state);
                state.print(word);
            }
            Event::Space => state.print(" "),
            Event::SpecialSymbol(symbol) => {
                self.flush(state);
                let mut buf = [0; 4];
                state.print(symbol.encode_utf8(&mut buf));
            }
            Event::NewLine => state.print("\n"),
            Event::EmptyLines(count) => {
                self.flush(state);
                state.print(&"\n".repeat(*count));
            }
            Event::HorizontalLine(_) => {
                self.flush(state);
                state.print("----");
                self.owe("\n\n");
            }
            Event::Verbatim { content, inline, .. } => {
                self.flush(state);
                state.print(content);
                if !inline {
                    self.owe("\n\n");
                }
            }
            Event::Raw { content, syntax } => {
                if !syntax.is_html() {
                    self.flush(state);
                    state.print(content);
                }
            }
            Event::Id(_) | Event::Image { .. } | Event::Macro { .. } => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use xdom_core::{Block, BlockKind, ListType};

    use super::*;
    use crate::xwiki::XWikiParser;

    #[test]
    fn test_parse_paragraphs() {
        let xdom = PlainTextParser.parse("one two\nthree\n\n\nfour").unwrap();
        assert_eq!(xdom.syntax(), Some(Syntax::PLAIN_1_0));
        assert_eq!(xdom.children().len(), 2);
        assert_eq!(
            xdom.children()[0].children().iter().map(Block::event_kind).collect::<Vec<_>>(),
            vec![
                EventKind::Word,
                EventKind::Space,
                EventKind::Word,
                EventKind::NewLine,
                EventKind::Word
            ]
        );
    }

    #[test]
    fn test_parse_keeps_markup_as_text() {
        let xdom = PlainTextParser.parse("**not bold**").unwrap();
        assert_eq!(xdom.children()[0].plain_text(), "**not bold**");
    }

    #[test]
    fn test_render_drops_markup() {
        let xdom = XWikiParser
            .parse("= Title =\n\nSome **bold** [[label>>https://x.org]] and [[https://y.org]]\n\n* a\n* b")
            .unwrap();
        assert_eq!(
            PlainTextRenderer.render(xdom.root()).unwrap(),
            "Title\n\nSome bold label and https://y.org\n\na\nb"
        );
    }

    #[test]
    fn test_render_nested_list_and_table() {
        let list = Block::new(BlockKind::List(ListType::Bulleted)).with_children(vec![
            Block::new(BlockKind::ListItem).with_children(vec![
                Block::word("a"),
                Block::new(BlockKind::List(ListType::Bulleted)).with_children(vec![
                    Block::new(BlockKind::ListItem).with_children(vec![Block::word("b")]),
                ]),
            ]),
        ]);
        let table = Block::new(BlockKind::Table).with_children(vec![
            Block::new(BlockKind::TableRow).with_children(vec![
                Block::new(BlockKind::TableCell).with_children(vec![Block::word("1")]),
                Block::new(BlockKind::TableCell).with_children(vec![Block::word("2")]),
            ]),
        ]);
        let root = Block::group(vec![list, table]);
        assert_eq!(PlainTextRenderer.render(&root).unwrap(), "a\nb\n\n1\t2");
    }
}
