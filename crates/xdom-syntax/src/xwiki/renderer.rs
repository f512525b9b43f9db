//! XWiki 2.1 output.

use xdom_core::chain::BlockStateChainingListener;
use xdom_core::{
    ChainState, ChainingListener, Container, Event, EventKind, Format, ListType, ListenerChain,
    MacroCall, Next, Parameters, RenderError, Renderer, ResourceReference, Syntax,
};

use crate::util::format_parameters;

/// Renders block trees back into XWiki 2.1 markup.
#[derive(Debug, Default, Clone, Copy)]
pub struct XWikiRenderer;

impl Renderer for XWikiRenderer {
    fn syntax(&self) -> Syntax {
        Syntax::XWIKI_2_1
    }

    fn create_chain(&self) -> ListenerChain {
        ListenerChain::new()
            .with(BlockStateChainingListener)
            .with(XWikiPrinter::default())
    }
}

/// Markup printed on both sides of formatted text.
fn format_marker(format: Format) -> &'static str {
    match format {
        Format::None => "",
        Format::Bold => "**",
        Format::Italic => "//",
        Format::Underlined => "__",
        Format::Strikedout => "--",
        Format::Superscript => "^^",
        Format::Subscript => ",,",
        Format::Monospace => "##",
    }
}

/// Symbols that form markup when doubled.
const DOUBLING_SYMBOLS: &str = "*/_-^,#[{";

/// Symbols that open a block construct at the start of a line.
const LINE_START_SYMBOLS: &str = "=*>|;:";

fn macro_call(call: &MacroCall, parameters: &Parameters) -> String {
    let mut out = format!("{{{{{}", call.id);
    if !parameters.is_empty() {
        out.push(' ');
        out.push_str(&format_parameters(parameters));
    }
    match &call.content {
        None => out.push_str("/}}"),
        Some(content) if call.inline => {
            out.push_str("}}");
            out.push_str(content);
            out.push_str(&format!("{{{{/{}}}}}", call.id));
        }
        Some(content) => {
            out.push_str("}}\n");
            out.push_str(content);
            out.push_str(&format!("\n{{{{/{}}}}}", call.id));
        }
    }
    out
}

struct OpenLink {
    start: usize,
    reference: ResourceReference,
    freestanding: bool,
    parameters: Parameters,
}

/// Printer at the end of the XWiki chain.
#[derive(Default)]
struct XWikiPrinter {
    /// A block has ended and the next one needs a blank line before it.
    separate: bool,
    lists: Vec<ListType>,
    quote_depth: usize,
    links: Vec<OpenLink>,
    /// Depth inside an executed macro whose output is not printed.
    skip: usize,
}

impl XWikiPrinter {
    const NAME: &'static str = "xwiki-printer";

    fn start_block(&mut self, state: &mut ChainState, parameters: &Parameters) {
        if self.separate {
            state.print("\n\n");
        } else if !state.output().is_empty() && !state.output().ends_with('\n') {
            state.print("\n");
        }
        self.separate = false;
        if !parameters.is_empty() {
            state.print(&format!("(% {} %)\n", format_parameters(parameters)));
        }
    }

    fn new_line(state: &mut ChainState) {
        if !state.output().is_empty() && !state.output().ends_with('\n') {
            state.print("\n");
        }
    }

    fn special_symbol(state: &mut ChainState, symbol: char) {
        let previous = state.output().chars().last();
        let at_line_start = previous.is_none_or(|c| c == '\n');
        let escape = symbol == '~'
            || (previous == Some(symbol) && DOUBLING_SYMBOLS.contains(symbol))
            || (previous == Some('(') && symbol == '%')
            || (at_line_start && LINE_START_SYMBOLS.contains(symbol));
        if escape {
            state.print("~");
        }
        let mut buf = [0; 4];
        state.print(symbol.encode_utf8(&mut buf));
    }

    fn begin(
        &mut self,
        container: &Container<'_>,
        parameters: &Parameters,
        block_level: bool,
        state: &mut ChainState,
    ) {
        match container {
            Container::Document(_) | Container::Section | Container::MetaData(_) => {}
            Container::Paragraph => {
                if block_level {
                    self.start_block(state, parameters);
                }
            }
            Container::Header { level, .. } => {
                self.start_block(state, parameters);
                state.print(&"=".repeat(usize::from(*level)));
                state.print(" ");
            }
            Container::Group => {
                if block_level {
                    self.start_block(state, parameters);
                }
                state.print("(((\n");
            }
            Container::List(kind) => {
                if self.lists.is_empty() {
                    self.start_block(state, parameters);
                }
                self.lists.push(*kind);
            }
            Container::ListItem => {
                Self::new_line(state);
                let depth = self.lists.len().max(1);
                match self.lists.last() {
                    Some(ListType::Numbered) => {
                        state.print(&"1".repeat(depth));
                        state.print(". ");
                    }
                    _ => {
                        state.print(&"*".repeat(depth));
                        state.print(" ");
                    }
                }
            }
            Container::DefinitionList | Container::Table => self.start_block(state, parameters),
            Container::DefinitionTerm => {
                Self::new_line(state);
                state.print("; ");
            }
            Container::DefinitionDescription => {
                Self::new_line(state);
                state.print(": ");
            }
            Container::TableRow => Self::new_line(state),
            Container::TableCell => state.print("|"),
            Container::TableHeadCell => state.print("|="),
            Container::Quotation => {
                if self.quote_depth == 0 {
                    self.start_block(state, parameters);
                }
                self.quote_depth += 1;
            }
            Container::QuotationLine => {
                Self::new_line(state);
                state.print(&">".repeat(self.quote_depth));
                state.print(" ");
            }
            Container::Figure => {
                self.start_block(state, parameters);
                state.print("{{figure}}\n");
            }
            Container::FigureCaption => {
                Self::new_line(state);
                state.print("{{figureCaption}}");
            }
            Container::Format(format) => {
                if !parameters.is_empty() {
                    state.print(&format!("(% {} %)", format_parameters(parameters)));
                }
                state.print(format_marker(*format));
            }
            Container::Link {
                reference,
                freestanding,
            } => self.links.push(OpenLink {
                start: state.output_len(),
                reference: reference.as_ref().clone(),
                freestanding: *freestanding,
                parameters: parameters.clone(),
            }),
            Container::MacroMarker(call) => {
                if !call.inline {
                    self.start_block(state, &Parameters::new());
                }
                state.print(&macro_call(call, parameters));
                self.skip = 1;
            }
        }
    }

    fn end(&mut self, container: &Container<'_>, parameters: &Parameters, state: &mut ChainState) {
        match container {
            Container::Document(_)
            | Container::Section
            | Container::MetaData(_)
            | Container::ListItem
            | Container::TableRow
            | Container::TableCell
            | Container::TableHeadCell
            | Container::QuotationLine
            | Container::DefinitionTerm
            | Container::DefinitionDescription => {}
            Container::Paragraph | Container::DefinitionList | Container::Table => {
                self.separate = true;
            }
            Container::Header { level, .. } => {
                state.print(" ");
                state.print(&"=".repeat(usize::from(*level)));
                self.separate = true;
            }
            Container::Group => {
                Self::new_line(state);
                state.print(")))");
                self.separate = true;
            }
            Container::List(_) => {
                self.lists.pop();
                if self.lists.is_empty() {
                    self.separate = true;
                }
            }
            Container::Quotation => {
                self.quote_depth = self.quote_depth.saturating_sub(1);
                if self.quote_depth == 0 {
                    self.separate = true;
                }
            }
            Container::Figure => {
                Self::new_line(state);
                state.print("{{/figure}}");
                self.separate = true;
            }
            Container::FigureCaption => state.print("{{/figureCaption}}"),
            Container::Format(format) => {
                state.print(format_marker(*format));
                if !parameters.is_empty() {
                    state.print("(%%)");
                }
            }
            Container::Link { .. } => self.end_link(state),
            Container::MacroMarker(call) => {
                if !call.inline {
                    self.separate = true;
                }
            }
        }
    }

    fn end_link(&mut self, state: &mut ChainState) {
        let Some(link) = self.links.pop() else { return };
        let label = state.take_output_from(link.start);
        if link.freestanding && label.is_empty() && link.parameters.is_empty() {
            state.print(&link.reference.to_syntax());
            return;
        }
        state.print("[[");
        if !label.is_empty() {
            state.print(&label);
            state.print(">>");
        }
        state.print(&link.reference.to_syntax());
        if !link.parameters.is_empty() {
            state.print("||");
            state.print(&format_parameters(&link.parameters));
        }
        state.print("]]");
    }

    fn atomic(&mut self, event: &Event<'_>, block_level: bool, state: &mut ChainState) {
        match event {
            Event::Word(word) => state.print(word),
            Event::Space => state.print(" "),
            Event::SpecialSymbol(symbol) => Self::special_symbol(state, *symbol),
            Event::NewLine => {
                if state.block.current() == Some(EventKind::Paragraph) {
                    state.print("\n");
                } else {
                    state.print("\\\\");
                }
            }
            Event::EmptyLines(count) => {
                self.start_block(state, &Parameters::new());
                state.print(&"\n".repeat(*count));
            }
            Event::HorizontalLine(parameters) => {
                self.start_block(state, parameters);
                state.print("----");
                self.separate = true;
            }
            Event::Id(name) => {
                let mut parameters = Parameters::new();
                parameters.insert("name".to_owned(), name.to_string());
                let call = MacroCall::new("id", None, !block_level);
                if block_level {
                    self.start_block(state, &Parameters::new());
                    self.separate = true;
                }
                state.print(&macro_call(&call, &parameters));
            }
            Event::Verbatim {
                content,
                inline,
                parameters,
            } => {
                if *inline || !block_level {
                    state.print(&format!("{{{{{{{content}}}}}}}"));
                } else {
                    self.start_block(state, parameters);
                    if content.contains('\n') {
                        state.print(&format!("{{{{{{\n{content}\n}}}}}}"));
                    } else {
                        state.print(&format!("{{{{{{{content}}}}}}}"));
                    }
                    self.separate = true;
                }
            }
            Event::Raw { content, syntax } => {
                if block_level {
                    self.start_block(state, &Parameters::new());
                    self.separate = true;
                }
                if syntax.kind() == Syntax::XWIKI_2_1.kind() {
                    state.print(content);
                } else if syntax.is_html() {
                    state.print(&format!("{{{{html}}}}{content}{{{{/html}}}}"));
                } else {
                    state.print(&format!("{{{{{{{content}}}}}}}"));
                }
            }
            Event::Image {
                reference,
                parameters,
                ..
            } => {
                state.print("[[image:");
                state.print(&reference.reference);
                if !parameters.is_empty() {
                    state.print("||");
                    state.print(&format_parameters(parameters));
                }
                state.print("]]");
            }
            Event::Macro { call, parameters } => {
                if !call.inline {
                    self.start_block(state, &Parameters::new());
                    self.separate = true;
                }
                state.print(&macro_call(call, parameters));
            }
            Event::Begin(..) | Event::End(..) => {}
        }
    }
}

/// Whether the event being handled sits directly in a block flow.
fn is_block_level(parent: Option<EventKind>) -> bool {
    matches!(
        parent,
        None | Some(
            EventKind::Document
                | EventKind::Section
                | EventKind::Group
                | EventKind::MetaData
                | EventKind::MacroMarker
                | EventKind::Figure
        )
    )
}

impl ChainingListener for XWikiPrinter {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn on_event(&mut self, event: Event<'_>, next: &mut Next<'_>) -> Result<(), RenderError> {
        if self.skip > 0 {
            match &event {
                Event::Begin(..) => self.skip += 1,
                Event::End(container, parameters) => {
                    self.skip -= 1;
                    if self.skip == 0 {
                        self.end(container, parameters, next.state_mut());
                    }
                }
                _ => {}
            }
            return Ok(());
        }

        let block_level = is_block_level(next.state().block.parent_event());
        let state = next.state_mut();
        match &event {
            Event::Begin(container, parameters) => {
                self.begin(container, parameters, block_level, state);
            }
            Event::End(container, parameters) => self.end(container, parameters, state),
            atomic => self.atomic(atomic, block_level, state),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use xdom_core::{Block, BlockKind, MetaData, Parser, XDom};

    use super::*;
    use crate::xwiki::XWikiParser;

    fn render(block: &Block) -> String {
        XWikiRenderer.render(block).unwrap()
    }

    fn roundtrip(source: &str) -> String {
        let xdom = XWikiParser.parse(source).unwrap();
        render(xdom.root())
    }

    #[test]
    fn test_paragraphs_and_formats() {
        let xdom = XDom::new(
            vec![
                Block::paragraph(vec![
                    Block::word("a"),
                    Block::new(BlockKind::Space),
                    Block::format(Format::Bold, vec![Block::word("b")]),
                ]),
                Block::paragraph(vec![Block::format(Format::Italic, vec![Block::word("c")])]),
            ],
            MetaData::new(),
        );
        assert_eq!(render(xdom.root()), "a **b**\n\n//c//");
    }

    #[test]
    fn test_headings_and_sections() {
        assert_eq!(roundtrip("= A =\n\ntext\n\n== B =="), "= A =\n\ntext\n\n== B ==");
    }

    #[test]
    fn test_lists() {
        assert_eq!(roundtrip("* a\n** b\n* c"), "* a\n** b\n* c");
        assert_eq!(roundtrip("1. one\n1. two"), "1. one\n1. two");
    }

    #[test]
    fn test_table() {
        assert_eq!(roundtrip("|=A|=B\n|1|2"), "|=A|=B\n|1|2");
    }

    #[test]
    fn test_links() {
        assert_eq!(
            roundtrip("[[label>>https://example.com]] and https://rust-lang.org"),
            "[[label>>https://example.com]] and https://rust-lang.org"
        );
        assert_eq!(roundtrip("[[doc:Main.WebHome]]"), "[[doc:Main.WebHome]]");
    }

    #[test]
    fn test_macro_and_verbatim() {
        assert_eq!(
            roundtrip("{{info}}\nbe careful\n{{/info}}\n\n{{{**raw**}}}"),
            "{{info}}\nbe careful\n{{/info}}\n\n{{{**raw**}}}"
        );
    }

    #[test]
    fn test_parameters_and_quotation() {
        assert_eq!(
            roundtrip("(% class=\"note\" %)\nhello\n\n> quoted\n>> deeper"),
            "(% class=\"note\" %)\nhello\n\n> quoted\n>> deeper"
        );
    }

    #[test]
    fn test_special_symbols_are_escaped() {
        let block = Block::paragraph(vec![
            Block::new(BlockKind::SpecialSymbol('*')),
            Block::new(BlockKind::SpecialSymbol('*')),
            Block::word("x"),
            Block::new(BlockKind::SpecialSymbol('~')),
        ]);
        assert_eq!(render(&block), "~*~*x~~");
    }

    #[test]
    fn test_executed_macro_prints_call() {
        let marker = Block::new(BlockKind::MacroMarker(MacroCall::new("toc", None, false)))
            .with_children(vec![Block::paragraph(vec![Block::word("generated")])]);
        let xdom = XDom::new(vec![marker], MetaData::new());
        assert_eq!(render(xdom.root()), "{{toc/}}");
    }

    #[test]
    fn test_newline_outside_paragraph() {
        assert_eq!(roundtrip("* a\\\\b"), "* a\\\\b");
        assert_eq!(roundtrip("a\nb"), "a\nb");
    }
}
