//! XHTML 1.0 output.

use xdom_core::chain::{
    BlockStateChainingListener, EmptyBlockChainingListener, MacroMarkerStrippingListener,
    MetaDataStateChainingListener,
};
use xdom_core::{
    ChainState, ChainingListener, Container, Event, EventKind, Format, ListType, ListenerChain,
    Next, Parameters, RenderError, Renderer, Syntax,
};

use crate::util::{escape_html, html_attributes};

/// Renders block trees as an XHTML fragment.
#[derive(Debug, Default, Clone, Copy)]
pub struct XhtmlRenderer;

impl Renderer for XhtmlRenderer {
    fn syntax(&self) -> Syntax {
        Syntax::XHTML_1_0
    }

    fn create_chain(&self) -> ListenerChain {
        ListenerChain::new()
            .with(MacroMarkerStrippingListener)
            .with(EmptyBlockChainingListener::new())
            .with(BlockStateChainingListener)
            .with(MetaDataStateChainingListener)
            .with(XhtmlPrinter::default())
    }
}

fn format_element(format: Format) -> Option<&'static str> {
    match format {
        Format::None => None,
        Format::Bold => Some("strong"),
        Format::Italic => Some("em"),
        Format::Underlined => Some("ins"),
        Format::Strikedout => Some("del"),
        Format::Superscript => Some("sup"),
        Format::Subscript => Some("sub"),
        Format::Monospace => Some("tt"),
    }
}

/// Element opened for a container, if any.
fn element(container: &Container<'_>, parameters: &Parameters) -> Option<&'static str> {
    Some(match container {
        Container::Document(_) | Container::Section | Container::MetaData(_) => return None,
        Container::MacroMarker(_) | Container::Link { .. } | Container::Header { .. } => {
            return None;
        }
        Container::Paragraph => "p",
        Container::Group => "div",
        Container::List(ListType::Bulleted) => "ul",
        Container::List(ListType::Numbered) => "ol",
        Container::ListItem => "li",
        Container::DefinitionList => "dl",
        Container::DefinitionTerm => "dt",
        Container::DefinitionDescription => "dd",
        Container::Table => "table",
        Container::TableRow => "tr",
        Container::TableCell => "td",
        Container::TableHeadCell => "th",
        Container::Quotation => "blockquote",
        Container::QuotationLine => return None,
        Container::Figure => "figure",
        Container::FigureCaption => "figcaption",
        Container::Format(Format::None) if parameters.is_empty() => return None,
        Container::Format(Format::None) => "span",
        Container::Format(format) => format_element(*format)?,
    })
}

/// Printer at the end of the XHTML chain.
#[derive(Default)]
struct XhtmlPrinter {
    /// Output offset after each open `<a>`, for the empty-label fallback.
    links: Vec<(usize, String)>,
}

impl XhtmlPrinter {
    const NAME: &'static str = "xhtml-printer";

    fn begin(
        &mut self,
        container: &Container<'_>,
        parameters: &Parameters,
        state: &mut ChainState,
    ) -> Result<(), RenderError> {
        match container {
            Container::Header { level, id } => {
                state.print_fmt(format_args!("<h{level}"))?;
                if let Some(id) = id {
                    state.print_fmt(format_args!(r#" id="{}""#, escape_html(id)))?;
                }
                state.print_fmt(format_args!("{}>", html_attributes(parameters)))?;
            }
            Container::Link {
                reference,
                freestanding,
            } => {
                state.print_fmt(format_args!(r#"<a href="{}""#, escape_html(&reference.href())))?;
                if *freestanding {
                    state.print(r#" class="wikimodel-freestanding""#);
                }
                state.print_fmt(format_args!("{}>", html_attributes(parameters)))?;
                self.links.push((state.output_len(), reference.reference.clone()));
            }
            Container::QuotationLine => {
                if state.block.previous_event() == Some(EventKind::QuotationLine) {
                    state.print("<br/>");
                }
            }
            _ => {
                if let Some(name) = element(container, parameters) {
                    state.print_fmt(format_args!("<{name}{}>", html_attributes(parameters)))?;
                }
            }
        }
        Ok(())
    }

    fn end(
        &mut self,
        container: &Container<'_>,
        parameters: &Parameters,
        state: &mut ChainState,
    ) -> Result<(), RenderError> {
        match container {
            Container::Header { level, .. } => state.print_fmt(format_args!("</h{level}>"))?,
            Container::Link { .. } => {
                if let Some((start, reference)) = self.links.pop()
                    && state.output_len() == start
                {
                    state.print(&escape_html(&reference));
                }
                state.print("</a>");
            }
            _ => {
                if let Some(name) = element(container, parameters) {
                    state.print_fmt(format_args!("</{name}>"))?;
                }
            }
        }
        Ok(())
    }

    fn atomic(event: &Event<'_>, state: &mut ChainState) -> Result<(), RenderError> {
        match event {
            Event::Word(word) => state.print(&escape_html(word)),
            Event::Space => state.print(" "),
            Event::SpecialSymbol(symbol) => {
                let mut buf = [0; 4];
                let escaped = escape_html(symbol.encode_utf8(&mut buf)).into_owned();
                state.print(&escaped);
            }
            Event::NewLine => state.print("<br/>"),
            Event::EmptyLines(count) => {
                for _ in 0..*count {
                    state.print(r#"<div class="wikimodel-emptyline"></div>"#);
                }
            }
            Event::HorizontalLine(parameters) => {
                state.print_fmt(format_args!("<hr{}/>", html_attributes(parameters)))?;
            }
            Event::Id(name) => {
                if state.block.is_in_line() {
                    state.print_fmt(format_args!(r#"<span id="{}"></span>"#, escape_html(name)))?;
                } else {
                    state.print_fmt(format_args!(r#"<div id="{}"></div>"#, escape_html(name)))?;
                }
            }
            Event::Verbatim {
                content,
                inline,
                parameters,
            } => {
                let attributes = html_attributes(parameters);
                if *inline {
                    state.print_fmt(format_args!(
                        r#"<tt class="wikimodel-verbatim"{attributes}>{}</tt>"#,
                        escape_html(content)
                    ))?;
                } else {
                    state.print_fmt(format_args!("<pre{attributes}>{}</pre>", escape_html(content)))?;
                }
            }
            Event::Raw { content, syntax } => {
                if syntax.is_html() {
                    state.print(content);
                } else {
                    state.print(&escape_html(content));
                }
            }
            Event::Image {
                reference,
                id,
                parameters,
                ..
            } => {
                let mut attributes = parameters.as_ref().clone();
                let alt = attributes
                    .remove("alt")
                    .unwrap_or_else(|| reference.reference.clone());
                state.print_fmt(format_args!(r#"<img src="{}""#, escape_html(&reference.href())))?;
                if let Some(id) = id {
                    state.print_fmt(format_args!(r#" id="{}""#, escape_html(id)))?;
                }
                state.print_fmt(format_args!(
                    r#" alt="{}"{}/>"#,
                    escape_html(&alt),
                    html_attributes(&attributes)
                ))?;
            }
            // Macros that were never executed have no HTML form.
            Event::Macro { .. } | Event::Begin(..) | Event::End(..) => {}
        }
        Ok(())
    }
}

impl ChainingListener for XhtmlPrinter {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn on_event(&mut self, event: Event<'_>, next: &mut Next<'_>) -> Result<(), RenderError> {
        let state = next.state_mut();
        match &event {
            Event::Begin(container, parameters) => self.begin(container, parameters, state),
            Event::End(container, parameters) => self.end(container, parameters, state),
            atomic => Self::atomic(atomic, state),
        }
    }
}
