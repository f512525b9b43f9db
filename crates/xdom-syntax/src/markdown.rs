//! Markdown input through pulldown-cmark.

use std::borrow::Cow;

use pulldown_cmark::{self as md, CodeBlockKind, HeadingLevel, LinkType, Options, Tag};
use xdom_core::{
    Container, Event, EventKind, Format, IdGenerator, ListType, Listener, MetaData, ParseError,
    Parameters, Parser, RenderError, ResourceReference, ResourceType, Syntax, is_absolute_url,
    plain,
};

use crate::util::{SectionStack, events_text};

/// Prefix of generated header ids.
const HEADER_ID_PREFIX: &str = "H";

/// Parser for CommonMark with tables, strikethrough and definition lists.
#[derive(Debug, Default, Clone, Copy)]
pub struct MarkdownParser;

fn options() -> Options {
    Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_DEFINITION_LIST
}

impl Parser for MarkdownParser {
    fn syntax(&self) -> Syntax {
        Syntax::MARKDOWN_1_2
    }

    fn stream(
        &self,
        source: &str,
        listener: &mut dyn Listener,
        ids: &mut IdGenerator,
    ) -> Result<(), ParseError> {
        let metadata = MetaData::new().with(MetaData::SYNTAX, Syntax::MARKDOWN_1_2.to_string());
        let document = Container::Document(Cow::Owned(metadata));
        listener.event(Event::begin(document.clone()))?;

        let mut translator = Translator {
            listener: &mut *listener,
            ids,
            sections: SectionStack::default(),
            opened: Vec::new(),
            heading: None,
            table_head: false,
        };
        for event in md::Parser::new_ext(source, options()) {
            translator.event(event)?;
        }
        translator.sections.close_all(&mut *translator.listener)?;

        listener.event(Event::end(document))?;
        Ok(())
    }
}

/// What a pulldown-cmark start tag turned into, closed by the matching end.
enum Open {
    Container(Container<'static>, Parameters),
    /// Tags with no counterpart; their content still flows through.
    Skip,
    Heading(u8),
    CodeBlock {
        language: Option<String>,
        content: String,
    },
    Html(String),
    Image {
        reference: ResourceReference,
        title: String,
        alt: String,
    },
    /// Autolinks: the link was emitted whole, its text is dropped.
    Suppressed,
}

struct Translator<'l> {
    listener: &'l mut dyn Listener,
    ids: &'l mut IdGenerator,
    sections: SectionStack,
    opened: Vec<Open>,
    /// Events of the heading being read; its id needs the full text.
    heading: Option<Vec<Event<'static>>>,
    table_head: bool,
}

fn heading_level(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

fn link_reference(link_type: LinkType, destination: &str) -> ResourceReference {
    if link_type == LinkType::Email {
        return ResourceReference::new(
            ResourceType::Mailto,
            destination.trim_start_matches("mailto:"),
        );
    }
    if is_absolute_url(destination) || destination.starts_with("mailto:") {
        ResourceReference::parse(destination)
    } else {
        ResourceReference::new(ResourceType::Path, destination)
    }
}

fn title_parameters(title: &str) -> Parameters {
    let mut parameters = Parameters::new();
    if !title.is_empty() {
        parameters.insert("title".to_owned(), title.to_owned());
    }
    parameters
}

impl Translator<'_> {
    fn emit(&mut self, event: Event<'_>) -> Result<(), RenderError> {
        if matches!(self.opened.last(), Some(Open::Suppressed)) {
            return Ok(());
        }
        match &mut self.heading {
            Some(buffer) => {
                buffer.push(event.into_owned());
                Ok(())
            }
            None => self.listener.event(event),
        }
    }

    /// Nearest enclosing container.
    fn enclosing(&self) -> Option<EventKind> {
        self.opened.iter().rev().find_map(|open| match open {
            Open::Container(container, _) => Some(container.kind()),
            _ => None,
        })
    }

    fn open(
        &mut self,
        container: Container<'static>,
        parameters: Parameters,
    ) -> Result<Open, RenderError> {
        self.emit(Event::Begin(container.clone(), Cow::Borrowed(&parameters)))?;
        Ok(Open::Container(container, parameters))
    }

    fn event(&mut self, event: md::Event<'_>) -> Result<(), RenderError> {
        match event {
            md::Event::Start(tag) => {
                let open = self.start(tag)?;
                self.opened.push(open);
                Ok(())
            }
            md::Event::End(_) => self.end(),
            md::Event::Text(text) => self.text(&text),
            md::Event::Code(code) => self.emit(Event::Verbatim {
                content: Cow::Owned(code.into_string()),
                inline: true,
                parameters: Cow::Owned(Parameters::new()),
            }),
            md::Event::Html(html) | md::Event::InlineHtml(html) => {
                if let Some(Open::Html(buffer)) = self.opened.last_mut() {
                    buffer.push_str(&html);
                    return Ok(());
                }
                self.emit(Event::Raw {
                    content: Cow::Owned(html.into_string()),
                    syntax: Cow::Owned(Syntax::HTML_5_0),
                })
            }
            md::Event::SoftBreak => self.emit(Event::Space),
            md::Event::HardBreak => self.emit(Event::NewLine),
            md::Event::Rule => self.emit(Event::HorizontalLine(Cow::Owned(Parameters::new()))),
            md::Event::TaskListMarker(checked) => {
                self.emit(Event::SpecialSymbol('['))?;
                if checked {
                    self.emit(Event::word("x"))?;
                } else {
                    self.emit(Event::Space)?;
                }
                self.emit(Event::SpecialSymbol(']'))?;
                self.emit(Event::Space)
            }
            md::Event::FootnoteReference(_) | md::Event::InlineMath(_) | md::Event::DisplayMath(_) => {
                tracing::debug!("skipping unsupported markdown construct");
                Ok(())
            }
        }
    }

    fn text(&mut self, text: &str) -> Result<(), RenderError> {
        match self.opened.last_mut() {
            Some(Open::CodeBlock { content, .. }) => content.push_str(text),
            Some(Open::Html(buffer)) => buffer.push_str(text),
            Some(Open::Image { alt, .. }) => alt.push_str(text),
            Some(Open::Suppressed) => {}
            _ => {
                for token in plain::tokenize(text) {
                    self.emit(token.to_event())?;
                }
            }
        }
        Ok(())
    }

    #[allow(clippy::too_many_lines)]
    fn start(&mut self, tag: Tag<'_>) -> Result<Open, RenderError> {
        let none = Parameters::new;
        Ok(match tag {
            Tag::Paragraph => match self.enclosing() {
                Some(EventKind::ListItem | EventKind::DefinitionDescription) => Open::Skip,
                Some(EventKind::Quotation) => self.open(Container::QuotationLine, none())?,
                _ => self.open(Container::Paragraph, none())?,
            },
            Tag::Heading { level, .. } => {
                self.heading = Some(Vec::new());
                Open::Heading(heading_level(level))
            }
            Tag::BlockQuote(_) => self.open(Container::Quotation, none())?,
            Tag::CodeBlock(kind) => {
                let language = match kind {
                    CodeBlockKind::Fenced(info) => info
                        .split_whitespace()
                        .next()
                        .map(str::to_owned),
                    CodeBlockKind::Indented => None,
                };
                Open::CodeBlock {
                    language,
                    content: String::new(),
                }
            }
            Tag::HtmlBlock => Open::Html(String::new()),
            Tag::List(start) => {
                let kind = if start.is_some() {
                    ListType::Numbered
                } else {
                    ListType::Bulleted
                };
                self.open(Container::List(kind), none())?
            }
            Tag::Item => self.open(Container::ListItem, none())?,
            Tag::DefinitionList => self.open(Container::DefinitionList, none())?,
            Tag::DefinitionListTitle => self.open(Container::DefinitionTerm, none())?,
            Tag::DefinitionListDefinition => self.open(Container::DefinitionDescription, none())?,
            Tag::Table(_) => self.open(Container::Table, none())?,
            Tag::TableHead => {
                self.table_head = true;
                self.open(Container::TableRow, none())?
            }
            Tag::TableRow => self.open(Container::TableRow, none())?,
            Tag::TableCell => {
                let cell = if self.table_head {
                    Container::TableHeadCell
                } else {
                    Container::TableCell
                };
                self.open(cell, none())?
            }
            Tag::Emphasis => self.open(Container::Format(Format::Italic), none())?,
            Tag::Strong => self.open(Container::Format(Format::Bold), none())?,
            Tag::Strikethrough => self.open(Container::Format(Format::Strikedout), none())?,
            Tag::Superscript => self.open(Container::Format(Format::Superscript), none())?,
            Tag::Subscript => self.open(Container::Format(Format::Subscript), none())?,
            Tag::Link {
                link_type,
                dest_url,
                title,
                ..
            } => {
                let reference = link_reference(link_type, &dest_url);
                let parameters = title_parameters(&title);
                if matches!(link_type, LinkType::Autolink | LinkType::Email) {
                    let link = Container::Link {
                        reference: Cow::Owned(reference),
                        freestanding: true,
                    };
                    self.emit(Event::Begin(link.clone(), Cow::Borrowed(&parameters)))?;
                    self.emit(Event::End(link, Cow::Owned(parameters)))?;
                    Open::Suppressed
                } else {
                    let link = Container::Link {
                        reference: Cow::Owned(reference),
                        freestanding: false,
                    };
                    self.open(link, parameters)?
                }
            }
            Tag::Image {
                link_type,
                dest_url,
                title,
                ..
            } => Open::Image {
                reference: link_reference(link_type, &dest_url),
                title: title.into_string(),
                alt: String::new(),
            },
            Tag::FootnoteDefinition(_) | Tag::MetadataBlock(_) => Open::Skip,
        })
    }

    fn end(&mut self) -> Result<(), RenderError> {
        let Some(open) = self.opened.pop() else {
            return Ok(());
        };
        match open {
            Open::Container(container, parameters) => {
                if container.kind() == EventKind::TableRow {
                    self.table_head = false;
                }
                self.emit(Event::End(container, Cow::Owned(parameters)))
            }
            Open::Skip | Open::Suppressed => Ok(()),
            Open::Heading(level) => self.end_heading(level),
            Open::CodeBlock { language, content } => {
                let mut parameters = Parameters::new();
                if let Some(language) = language {
                    parameters.insert("language".to_owned(), language);
                }
                let content = content.strip_suffix('\n').unwrap_or(&content).to_owned();
                self.emit(Event::Verbatim {
                    content: Cow::Owned(content),
                    inline: false,
                    parameters: Cow::Owned(parameters),
                })
            }
            Open::Html(content) => self.emit(Event::Raw {
                content: Cow::Owned(content.trim_end_matches('\n').to_owned()),
                syntax: Cow::Owned(Syntax::HTML_5_0),
            }),
            Open::Image {
                reference,
                title,
                alt,
            } => {
                let mut parameters = title_parameters(&title);
                if !alt.is_empty() {
                    parameters.insert("alt".to_owned(), alt);
                }
                self.emit(Event::Image {
                    reference: Cow::Owned(reference),
                    freestanding: false,
                    id: None,
                    parameters: Cow::Owned(parameters),
                })
            }
        }
    }

    fn end_heading(&mut self, level: u8) -> Result<(), RenderError> {
        let events = self.heading.take().unwrap_or_default();
        let id = self
            .ids
            .generate_unique_id_with_prefix(HEADER_ID_PREFIX, &events_text(&events))
            .map_err(|e| RenderError::Message(e.to_string()))?;

        // Sections only nest at the top level of the document.
        if self.enclosing().is_none() {
            self.sections.open(level, &mut *self.listener)?;
        }
        let header = Container::Header {
            level,
            id: Some(Cow::Owned(id)),
        };
        self.emit(Event::begin(header.clone()))?;
        for event in events {
            self.emit(event)?;
        }
        self.emit(Event::end(header))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use xdom_core::{Block, BlockKind, XDom};

    use super::*;

    fn parse(source: &str) -> XDom {
        MarkdownParser.parse(source).unwrap()
    }

    fn kinds(block: &Block) -> Vec<EventKind> {
        block.children().iter().map(Block::event_kind).collect()
    }

    #[test]
    fn test_heading_opens_section() {
        let xdom = parse("# Title\n\nThis is **bold**");
        assert_eq!(xdom.syntax(), Some(Syntax::MARKDOWN_1_2));
        let section = &xdom.children()[0];
        assert_eq!(kinds(section), vec![EventKind::Header, EventKind::Paragraph]);
        assert_eq!(
            *section.children()[0].kind(),
            BlockKind::Header {
                level: 1,
                id: Some("HTitle".to_owned())
            }
        );
        assert_eq!(
            section.children()[1],
            Block::paragraph(vec![
                Block::word("This"),
                Block::new(BlockKind::Space),
                Block::word("is"),
                Block::new(BlockKind::Space),
                Block::format(Format::Bold, vec![Block::word("bold")]),
            ])
        );
    }

    #[test]
    fn test_code_block_and_list() {
        let xdom = parse("```rust\nfn x() {}\n```\n\n- a\n- b");
        assert_eq!(kinds(xdom.root()), vec![EventKind::Verbatim, EventKind::List]);
        let code = &xdom.children()[0];
        assert_eq!(code.parameter("language"), Some("rust"));
        assert_eq!(
            *code.kind(),
            BlockKind::Verbatim {
                content: "fn x() {}".to_owned(),
                inline: false
            }
        );
        assert_eq!(xdom.children()[1].children().len(), 2);
    }

    #[test]
    fn test_table_head_cells() {
        let xdom = parse("| A | B |\n|---|---|\n| 1 | 2 |");
        let table = &xdom.children()[0];
        assert_eq!(kinds(table), vec![EventKind::TableRow, EventKind::TableRow]);
        assert_eq!(
            kinds(&table.children()[0]),
            vec![EventKind::TableHeadCell, EventKind::TableHeadCell]
        );
        assert_eq!(kinds(&table.children()[1]), vec![EventKind::TableCell, EventKind::TableCell]);
    }

    #[test]
    fn test_links() {
        let xdom = parse("[site](https://x.org) <https://y.org> [rel](docs/a.md)");
        let links: Vec<_> = xdom
            .root()
            .children_by_type(EventKind::Link, true)
            .map(|block| match block.kind() {
                BlockKind::Link {
                    reference,
                    freestanding,
                } => (reference.kind, *freestanding, block.children().len()),
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(
            links,
            vec![
                (ResourceType::Url, false, 1),
                (ResourceType::Url, true, 0),
                (ResourceType::Path, false, 1),
            ]
        );
    }

    #[test]
    fn test_quotation_and_breaks() {
        let xdom = parse("> quoted\n\na\nb");
        let quote = &xdom.children()[0];
        assert_eq!(kinds(quote), vec![EventKind::QuotationLine]);
        assert_eq!(
            kinds(&xdom.children()[1]),
            vec![EventKind::Word, EventKind::Space, EventKind::Word]
        );
    }

    #[test]
    fn test_image_alt_text() {
        let xdom = parse("![a picture](pic.png)");
        let image = &xdom.children()[0].children()[0];
        assert_eq!(image.event_kind(), EventKind::Image);
        assert_eq!(image.parameter("alt"), Some("a picture"));
    }
}
