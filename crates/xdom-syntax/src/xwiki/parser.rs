//! Block-level parsing of XWiki 2.1 markup.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use xdom_core::{
    Container, Event, IdGenerator, ListType, Listener, MetaData, ParseError, Parameters,
    Parser, RenderError, Syntax,
};

use super::inline::InlineParser;
use super::macro_call::parse_macro;
use crate::util::{SectionStack, events_text, parse_parameters};

static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(={1,6})\s*(.*?)\s*=*\s*$").unwrap());
static HORIZONTAL_LINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*-{4,}\s*$").unwrap());
static LIST_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\*+|1+\.)\s+(.*)$").unwrap());
static DEFINITION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*([;:])\s+(.*)$").unwrap());
static QUOTATION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(>+)\s?(.*)$").unwrap());
static PARAMETERS_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\(%(.*?)%\)\s*$").unwrap());

/// Prefix of generated header ids.
const HEADER_ID_PREFIX: &str = "H";

/// Parser for the XWiki 2.1 syntax subset described in the crate docs.
#[derive(Debug, Default, Clone, Copy)]
pub struct XWikiParser;

impl Parser for XWikiParser {
    fn syntax(&self) -> Syntax {
        Syntax::XWIKI_2_1
    }

    fn stream(
        &self,
        source: &str,
        listener: &mut dyn Listener,
        ids: &mut IdGenerator,
    ) -> Result<(), ParseError> {
        let metadata = MetaData::new().with(MetaData::SYNTAX, Syntax::XWIKI_2_1.to_string());
        let document = Container::Document(Cow::Owned(metadata));
        listener.event(Event::begin(document.clone()))?;
        let source = source.replace("\r\n", "\n");
        BlockParser {
            source: &source,
            pos: 0,
            listener: &mut *listener,
            ids,
            sections: SectionStack::default(),
            pending: Parameters::new(),
        }
        .run()?;
        listener.event(Event::end(document))?;
        Ok(())
    }
}

struct BlockParser<'s, 'l> {
    source: &'s str,
    pos: usize,
    listener: &'l mut dyn Listener,
    ids: &'l mut IdGenerator,
    sections: SectionStack,
    /// Parameters from a `(% %)` line, applied to the next block.
    pending: Parameters,
}

impl<'s> BlockParser<'s, '_> {
    /// The line starting at `pos` and the offset of the following line.
    fn line_at(&self, pos: usize) -> (&'s str, usize) {
        let rest = &self.source[pos..];
        match rest.find('\n') {
            Some(end) => (&rest[..end], pos + end + 1),
            None => (rest, self.source.len()),
        }
    }

    fn emit(&mut self, event: Event<'_>) -> Result<(), RenderError> {
        self.listener.event(event)
    }

    fn begin(&mut self, container: Container<'_>) -> Result<(), RenderError> {
        let parameters = std::mem::take(&mut self.pending);
        self.listener.event(Event::Begin(container, Cow::Owned(parameters)))
    }

    fn inline(&mut self, text: &str) -> Result<(), RenderError> {
        InlineParser::new(&mut *self.listener).parse(text)
    }

    fn run(mut self) -> Result<(), RenderError> {
        while self.pos < self.source.len() {
            let (line, next) = self.line_at(self.pos);
            if line.trim().is_empty() {
                self.pos = next;
                continue;
            }
            if let Some(caps) = PARAMETERS_LINE.captures(line) {
                self.pending = parse_parameters(&caps[1]);
                self.pos = next;
            } else if let Some(caps) = HEADING.captures(line) {
                let level = u8::try_from(caps[1].len()).unwrap_or(6);
                self.heading(level, caps.get(2).map_or("", |m| m.as_str()))?;
                self.pos = next;
            } else if HORIZONTAL_LINE.is_match(line) {
                let parameters = std::mem::take(&mut self.pending);
                self.emit(Event::HorizontalLine(Cow::Owned(parameters)))?;
                self.pos = next;
            } else if let Some(end) = self.standalone_verbatim(line)? {
                self.pos = end;
            } else if let Some(end) = self.standalone_macro(line)? {
                self.pos = end;
            } else if LIST_ITEM.is_match(line) {
                self.list()?;
            } else if DEFINITION.is_match(line) {
                self.definition_list()?;
            } else if QUOTATION.is_match(line) {
                self.quotation()?;
            } else if line.trim_start().starts_with('|') {
                self.table()?;
            } else {
                self.paragraph()?;
            }
        }
        self.sections.close_all(&mut *self.listener)
    }

    fn heading(&mut self, level: u8, text: &str) -> Result<(), RenderError> {
        let mut recorded: Vec<Event<'static>> = Vec::new();
        InlineParser::new(&mut recorded).parse(text)?;
        let id = self
            .ids
            .generate_unique_id_with_prefix(HEADER_ID_PREFIX, &events_text(&recorded))
            .map_err(|e| RenderError::Message(e.to_string()))?;

        self.sections.open(level, &mut *self.listener)?;
        let header = Container::Header {
            level,
            id: Some(Cow::Owned(id)),
        };
        let parameters = std::mem::take(&mut self.pending);
        self.emit(Event::Begin(header.clone(), Cow::Borrowed(&parameters)))?;
        for event in recorded {
            self.emit(event)?;
        }
        self.emit(Event::End(header, Cow::Owned(parameters)))
    }

    /// `{{{ ... }}}` starting a block with nothing else on its last line.
    fn standalone_verbatim(&mut self, line: &str) -> Result<Option<usize>, RenderError> {
        let start = self.pos + (line.len() - line.trim_start().len());
        let Some(body) = self.source[start..].strip_prefix("{{{") else {
            return Ok(None);
        };
        let Some(end) = body.find("}}}") else {
            return Ok(None);
        };
        let (tail, next) = self.line_at(start + 3 + end + 3);
        if !tail.trim().is_empty() {
            return Ok(None);
        }
        let content = body[..end].strip_prefix('\n').unwrap_or(&body[..end]);
        let content = content.strip_suffix('\n').unwrap_or(content).to_owned();
        let parameters = std::mem::take(&mut self.pending);
        let event = Event::Verbatim {
            content: Cow::Owned(content),
            inline: false,
            parameters: Cow::Owned(parameters),
        };
        self.emit(event)?;
        Ok(Some(next))
    }

    /// A macro call starting a block with nothing else on its last line.
    fn standalone_macro(&mut self, line: &str) -> Result<Option<usize>, RenderError> {
        let start = self.pos + (line.len() - line.trim_start().len());
        let Some(parsed) = parse_macro(&self.source[start..], false) else {
            return Ok(None);
        };
        let (tail, next) = self.line_at(start + parsed.len);
        if !tail.trim().is_empty() {
            return Ok(None);
        }
        self.pending.clear();
        self.emit(Event::Macro {
            call: Cow::Owned(parsed.call),
            parameters: Cow::Owned(parsed.parameters),
        })?;
        Ok(Some(next))
    }

    fn starts_block(line: &str) -> bool {
        line.trim().is_empty()
            || HEADING.is_match(line)
            || HORIZONTAL_LINE.is_match(line)
            || PARAMETERS_LINE.is_match(line)
            || LIST_ITEM.is_match(line)
            || DEFINITION.is_match(line)
            || QUOTATION.is_match(line)
            || line.trim_start().starts_with('|')
    }

    fn paragraph(&mut self) -> Result<(), RenderError> {
        let start = self.pos;
        let (_, mut next) = self.line_at(start);
        while next < self.source.len() {
            let (line, after) = self.line_at(next);
            if Self::starts_block(line) {
                break;
            }
            next = after;
        }
        let text = self.source[start..next].trim_end_matches('\n');
        self.pos = next;

        self.begin(Container::Paragraph)?;
        self.inline(text)?;
        self.emit(Event::end(Container::Paragraph))
    }

    fn list(&mut self) -> Result<(), RenderError> {
        let mut levels: Vec<ListLevel> = Vec::new();

        while self.pos < self.source.len() {
            let (line, next) = self.line_at(self.pos);
            let Some(caps) = LIST_ITEM.captures(line) else { break };
            let marker = &caps[1];
            let (kind, depth) = if marker.starts_with('*') {
                (ListType::Bulleted, marker.len())
            } else {
                (ListType::Numbered, marker.len() - 1)
            };

            while levels.len() > depth
                && let Some(level) = levels.pop()
            {
                self.close_level(&level)?;
            }
            if levels.len() == depth
                && let Some(top) = levels.last_mut()
            {
                if top.kind == kind {
                    if top.item_open {
                        top.item_open = false;
                        self.emit(Event::end(Container::ListItem))?;
                    }
                } else if let Some(level) = levels.pop() {
                    self.close_level(&level)?;
                }
            }
            while levels.len() < depth {
                if let Some(parent) = levels.last_mut()
                    && !parent.item_open
                {
                    parent.item_open = true;
                    self.emit(Event::begin(Container::ListItem))?;
                }
                self.begin(Container::List(kind))?;
                levels.push(ListLevel {
                    kind,
                    item_open: false,
                });
            }
            if let Some(top) = levels.last_mut() {
                top.item_open = true;
            }
            self.emit(Event::begin(Container::ListItem))?;
            self.inline(caps.get(2).map_or("", |m| m.as_str()))?;
            self.pos = next;
        }

        while let Some(level) = levels.pop() {
            self.close_level(&level)?;
        }
        Ok(())
    }

    fn close_level(&mut self, level: &ListLevel) -> Result<(), RenderError> {
        if level.item_open {
            self.emit(Event::end(Container::ListItem))?;
        }
        self.emit(Event::end(Container::List(level.kind)))
    }

    fn definition_list(&mut self) -> Result<(), RenderError> {
        self.begin(Container::DefinitionList)?;
        while self.pos < self.source.len() {
            let (line, next) = self.line_at(self.pos);
            let Some(caps) = DEFINITION.captures(line) else { break };
            let container = if &caps[1] == ";" {
                Container::DefinitionTerm
            } else {
                Container::DefinitionDescription
            };
            self.emit(Event::begin(container.clone()))?;
            self.inline(caps.get(2).map_or("", |m| m.as_str()))?;
            self.emit(Event::end(container))?;
            self.pos = next;
        }
        self.emit(Event::end(Container::DefinitionList))
    }

    fn quotation(&mut self) -> Result<(), RenderError> {
        let mut depth = 0usize;
        while self.pos < self.source.len() {
            let (line, next) = self.line_at(self.pos);
            let Some(caps) = QUOTATION.captures(line) else { break };
            let level = caps[1].len();
            while depth > level {
                depth -= 1;
                self.emit(Event::end(Container::Quotation))?;
            }
            while depth < level {
                depth += 1;
                self.begin(Container::Quotation)?;
            }
            self.emit(Event::begin(Container::QuotationLine))?;
            self.inline(caps.get(2).map_or("", |m| m.as_str()))?;
            self.emit(Event::end(Container::QuotationLine))?;
            self.pos = next;
        }
        for _ in 0..depth {
            self.emit(Event::end(Container::Quotation))?;
        }
        Ok(())
    }

    fn table(&mut self) -> Result<(), RenderError> {
        self.begin(Container::Table)?;
        while self.pos < self.source.len() {
            let (line, next) = self.line_at(self.pos);
            let row = line.trim();
            if !row.starts_with('|') {
                break;
            }
            self.emit(Event::begin(Container::TableRow))?;
            let cells = row[1..].strip_suffix('|').unwrap_or(&row[1..]);
            for cell in split_cells(cells) {
                let (container, text) = match cell.strip_prefix('=') {
                    Some(head) => (Container::TableHeadCell, head),
                    None => (Container::TableCell, cell),
                };
                self.emit(Event::begin(container.clone()))?;
                self.inline(text.trim())?;
                self.emit(Event::end(container))?;
            }
            self.emit(Event::end(Container::TableRow))?;
            self.pos = next;
        }
        self.emit(Event::end(Container::Table))
    }
}

struct ListLevel {
    kind: ListType,
    item_open: bool,
}

/// Split a table row on `|`, ignoring separators inside `[[ ]]` and `{{ }}`.
fn split_cells(row: &str) -> Vec<&str> {
    let mut cells = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    let bytes = row.as_bytes();
    let mut index = 0;
    while index < bytes.len() {
        match bytes[index] {
            b'[' | b'{' if bytes.get(index + 1) == Some(&bytes[index]) => {
                depth += 1;
                index += 1;
            }
            b']' | b'}' if depth > 0 && bytes.get(index + 1) == Some(&bytes[index]) => {
                depth -= 1;
                index += 1;
            }
            b'|' if depth == 0 => {
                cells.push(&row[start..index]);
                start = index + 1;
            }
            _ => {}
        }
        index += 1;
    }
    cells.push(&row[start..]);
    cells
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use xdom_core::{Block, BlockKind, EventKind, Format};

    use super::*;

    fn parse(source: &str) -> xdom_core::XDom {
        XWikiParser.parse(source).unwrap()
    }

    fn kinds(block: &Block) -> Vec<EventKind> {
        block.children().iter().map(Block::event_kind).collect()
    }

    #[test]
    fn test_paragraph_with_bold() {
        let xdom = parse("This is **bold**");
        assert_eq!(xdom.syntax(), Some(Syntax::XWIKI_2_1));
        assert_eq!(
            xdom.children(),
            &[Block::paragraph(vec![
                Block::word("This"),
                Block::new(BlockKind::Space),
                Block::word("is"),
                Block::new(BlockKind::Space),
                Block::format(Format::Bold, vec![Block::word("bold")]),
            ])]
        );
    }

    #[test]
    fn test_paragraphs_split_on_blank_lines() {
        let xdom = parse("one\ntwo\n\nthree");
        assert_eq!(kinds(xdom.root()), vec![EventKind::Paragraph, EventKind::Paragraph]);
        assert_eq!(
            kinds(&xdom.children()[0]),
            vec![EventKind::Word, EventKind::NewLine, EventKind::Word]
        );
    }

    #[test]
    fn test_headings_open_nested_sections() {
        let xdom = parse("= A =\ntext\n== B ==\n= C =");
        let root = xdom.root();
        assert_eq!(kinds(root), vec![EventKind::Section, EventKind::Section]);
        let first = &root.children()[0];
        assert_eq!(
            kinds(first),
            vec![EventKind::Header, EventKind::Paragraph, EventKind::Section]
        );
        let BlockKind::Header { level, id } = first.children()[0].kind() else {
            panic!("expected header");
        };
        assert_eq!(*level, 1);
        assert_eq!(id.as_deref(), Some("HA"));
    }

    #[test]
    fn test_duplicate_headings_get_unique_ids() {
        let xdom = parse("= Title =\n= Title =");
        let ids: Vec<_> = xdom
            .root()
            .children_by_type(EventKind::Header, true)
            .filter_map(|b| match b.kind() {
                BlockKind::Header { id, .. } => id.clone(),
                _ => None,
            })
            .collect();
        assert_eq!(ids, vec!["HTitle", "HTitle-1"]);
    }

    #[test]
    fn test_standalone_macro() {
        let xdom = parse("{{id name=\"test\"/}}");
        let block = &xdom.children()[0];
        let call = block.macro_call().unwrap();
        assert_eq!(call.id, "id");
        assert!(!call.inline);
        assert_eq!(block.parameter("name"), Some("test"));
    }

    #[test]
    fn test_standalone_macro_with_multiline_content() {
        let xdom = parse("{{box title=\"t\"}}\nfirst\n\nsecond\n{{/box}}\n\nafter");
        assert_eq!(kinds(xdom.root()), vec![EventKind::Macro, EventKind::Paragraph]);
        let call = xdom.children()[0].macro_call().unwrap();
        assert_eq!(call.content.as_deref(), Some("first\n\nsecond"));
    }

    #[test]
    fn test_macro_inside_text_is_inline() {
        let xdom = parse("before {{id name=\"x\"/}}");
        let paragraph = &xdom.children()[0];
        let call = paragraph.children().last().and_then(Block::macro_call).unwrap();
        assert!(call.inline);
    }

    #[test]
    fn test_nested_lists() {
        let xdom = parse("* a\n** b\n* c\n1. d");
        let root = xdom.root();
        assert_eq!(kinds(root), vec![EventKind::List, EventKind::List]);
        let bulleted = &root.children()[0];
        assert_eq!(bulleted.children().len(), 2);
        let first_item = &bulleted.children()[0];
        assert_eq!(kinds(first_item), vec![EventKind::Word, EventKind::List]);
        assert_eq!(*root.children()[1].kind(), BlockKind::List(ListType::Numbered));
    }

    #[test]
    fn test_table() {
        let xdom = parse("|=A|=B\n|[[x>>y|z]]|2");
        let table = &xdom.children()[0];
        assert_eq!(table.event_kind(), EventKind::Table);
        let rows = table.children();
        assert_eq!(kinds(&rows[0]), vec![EventKind::TableHeadCell, EventKind::TableHeadCell]);
        assert_eq!(kinds(&rows[1]), vec![EventKind::TableCell, EventKind::TableCell]);
    }

    #[test]
    fn test_quotation_nesting() {
        let xdom = parse("> a\n>> b\n> c");
        let quote = &xdom.children()[0];
        assert_eq!(
            kinds(quote),
            vec![EventKind::QuotationLine, EventKind::Quotation, EventKind::QuotationLine]
        );
    }

    #[test]
    fn test_definition_list() {
        let xdom = parse("; term\n: meaning");
        assert_eq!(
            kinds(&xdom.children()[0]),
            vec![EventKind::DefinitionTerm, EventKind::DefinitionDescription]
        );
    }

    #[test]
    fn test_parameters_apply_to_next_block() {
        let xdom = parse("(% class=\"note\" %)\nhello");
        assert_eq!(xdom.children()[0].parameter("class"), Some("note"));
    }

    #[test]
    fn test_horizontal_line_and_verbatim() {
        let xdom = parse("----\n{{{\n**not bold**\n}}}");
        assert_eq!(kinds(xdom.root()), vec![EventKind::HorizontalLine, EventKind::Verbatim]);
        assert_eq!(
            *xdom.children()[1].kind(),
            BlockKind::Verbatim {
                content: "**not bold**".to_owned(),
                inline: false
            }
        );
    }
}
