//! `event/1.0`: one line per protocol call, for debugging and tests.

use std::fmt::Write as _;

use xdom_core::{
    ChainingListener, Container, Event, ListenerChain, MetaData, Next, RenderError, Renderer,
    ResourceReference, Syntax,
};

use crate::util::format_parameters;

/// Lists the event stream of a tree.
///
/// ```text
/// begin_paragraph
/// on_word [Hello]
/// on_space
/// begin_format [bold]
/// on_word [world]
/// end_format [bold]
/// end_paragraph
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct EventRenderer;

impl Renderer for EventRenderer {
    fn syntax(&self) -> Syntax {
        Syntax::EVENT_1_0
    }

    fn create_chain(&self) -> ListenerChain {
        ListenerChain::new().with(EventPrinter)
    }
}

struct EventPrinter;

fn metadata(metadata: &MetaData) -> String {
    metadata
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn reference(reference: &ResourceReference) -> String {
    format!("{}:{}", reference.kind.prefix(), reference.reference)
}

/// Payload values of an event, without its parameters.
fn payload(event: &Event<'_>) -> Vec<String> {
    let lower = |value: &dyn std::fmt::Debug| format!("{value:?}").to_lowercase();
    match event {
        Event::Begin(container, _) | Event::End(container, _) => match container {
            Container::Document(m) | Container::MetaData(m) if !m.is_empty() => vec![metadata(m)],
            Container::Header { level, id } => {
                let mut values = vec![level.to_string()];
                values.extend(id.as_deref().map(str::to_owned));
                values
            }
            Container::List(kind) => vec![lower(kind)],
            Container::Format(format) => vec![lower(format)],
            Container::Link {
                reference: r,
                freestanding,
            } => {
                let mut values = vec![reference(r)];
                if *freestanding {
                    values.push("freestanding".to_owned());
                }
                values
            }
            Container::MacroMarker(call) => {
                let mut values = vec![call.id.clone()];
                values.extend(call.content.clone());
                if call.inline {
                    values.push("inline".to_owned());
                }
                values
            }
            _ => Vec::new(),
        },
        Event::Word(word) => vec![word.to_string()],
        Event::SpecialSymbol(symbol) => vec![symbol.to_string()],
        Event::EmptyLines(count) => vec![count.to_string()],
        Event::Id(name) => vec![name.to_string()],
        Event::Verbatim { content, inline, .. } => {
            let mut values = vec![content.to_string()];
            if *inline {
                values.push("inline".to_owned());
            }
            values
        }
        Event::Raw { content, syntax } => vec![syntax.to_string(), content.to_string()],
        Event::Image {
            reference: r,
            freestanding,
            id,
            ..
        } => {
            let mut values = vec![reference(r)];
            if *freestanding {
                values.push("freestanding".to_owned());
            }
            values.extend(id.as_deref().map(str::to_owned));
            values
        }
        Event::Macro { call, .. } => {
            let mut values = vec![call.id.clone()];
            values.extend(call.content.clone());
            if call.inline {
                values.push("inline".to_owned());
            }
            values
        }
        Event::Space | Event::NewLine | Event::HorizontalLine(_) => Vec::new(),
    }
}

impl ChainingListener for EventPrinter {
    fn name(&self) -> &'static str {
        "event-printer"
    }

    fn on_event(&mut self, event: Event<'_>, next: &mut Next<'_>) -> Result<(), RenderError> {
        let mut line = event.name().to_owned();
        for value in payload(&event) {
            write!(line, " [{value}]")?;
        }
        if let Some(parameters) = event.parameters()
            && !parameters.is_empty()
        {
            write!(line, " {{{}}}", format_parameters(parameters))?;
        }

        let state = next.state_mut();
        if !state.output().is_empty() {
            state.print("\n");
        }
        state.print(&line);
        Ok(())
    }
}
