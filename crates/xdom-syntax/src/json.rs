//! `xdom+json/1.0`: the block tree as nested JSON objects.
//!
//! Each node carries a `type` (the construct name from the event table),
//! its payload fields under the names the event table declares, and for
//! containers a `children` array.

use serde_json::{Map, Value, json};
use xdom_core::{
    ChainingListener, Container, Event, ListenerChain, Next, RenderError, Renderer, Syntax,
};

/// Serializes a tree as pretty-printed JSON.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    fn syntax(&self) -> Syntax {
        Syntax::XDOM_JSON_1_0
    }

    fn create_chain(&self) -> ListenerChain {
        ListenerChain::new().with(JsonPrinter::default())
    }
}

fn to_value<T: serde::Serialize + ?Sized>(value: &T) -> Result<Value, RenderError> {
    serde_json::to_value(value).map_err(|e| RenderError::Other(Box::new(e)))
}

/// Payload fields of an event, named as in the event table.
pub(crate) fn fields(event: &Event<'_>) -> Result<Vec<(&'static str, Value)>, RenderError> {
    let parameters = || event.parameters().map(to_value).transpose();
    let mut fields = match event {
        Event::Begin(container, _) | Event::End(container, _) => match container {
            Container::Document(m) => vec![("metadata", to_value(m.as_ref())?)],
            Container::MetaData(m) => return Ok(vec![("metadata", to_value(m.as_ref())?)]),
            Container::Header { level, id } => vec![("level", json!(level)), ("id", json!(id))],
            Container::List(kind) => vec![("type", to_value(kind)?)],
            Container::Format(format) => vec![("format", to_value(format)?)],
            Container::Link {
                reference,
                freestanding,
            } => vec![
                ("reference", to_value(reference.as_ref())?),
                ("freestanding", json!(freestanding)),
            ],
            Container::MacroMarker(call) => vec![
                ("id", json!(call.id)),
                ("content", json!(call.content)),
                ("inline", json!(call.inline)),
            ],
            _ => Vec::new(),
        },
        Event::Word(word) => vec![("word", json!(word))],
        Event::SpecialSymbol(symbol) => vec![("symbol", json!(symbol.to_string()))],
        Event::EmptyLines(count) => vec![("count", json!(count))],
        Event::Id(name) => vec![("name", json!(name))],
        Event::Verbatim { content, inline, .. } => {
            vec![("content", json!(content)), ("inline", json!(inline))]
        }
        Event::Raw { content, syntax } => vec![
            ("content", json!(content)),
            ("syntax", to_value(syntax.as_ref())?),
        ],
        Event::Image {
            reference,
            freestanding,
            id,
            ..
        } => vec![
            ("reference", to_value(reference.as_ref())?),
            ("freestanding", json!(freestanding)),
            ("id", json!(id)),
        ],
        Event::Macro { call, .. } => vec![
            ("id", json!(call.id)),
            ("content", json!(call.content)),
            ("inline", json!(call.inline)),
        ],
        Event::Space | Event::NewLine | Event::HorizontalLine(_) => Vec::new(),
    };
    if let Some(parameters) = parameters()? {
        fields.push(("parameters", parameters));
    }
    Ok(fields)
}

fn node(event: &Event<'_>) -> Result<Map<String, Value>, RenderError> {
    let mut object = Map::new();
    object.insert("type".to_owned(), json!(event.kind().descriptor().name));
    for (name, value) in fields(event)? {
        object.insert(name.to_owned(), value);
    }
    Ok(object)
}

#[derive(Default)]
struct JsonPrinter {
    /// Open containers with the children collected so far.
    stack: Vec<(Map<String, Value>, Vec<Value>)>,
}

impl JsonPrinter {
    fn finish(&mut self, value: Value, next: &mut Next<'_>) -> Result<(), RenderError> {
        match self.stack.last_mut() {
            Some((_, children)) => children.push(value),
            None => {
                let text =
                    serde_json::to_string_pretty(&value).map_err(|e| RenderError::Other(Box::new(e)))?;
                next.state_mut().print(&text);
            }
        }
        Ok(())
    }
}

impl ChainingListener for JsonPrinter {
    fn name(&self) -> &'static str {
        "json-printer"
    }

    fn on_event(&mut self, event: Event<'_>, next: &mut Next<'_>) -> Result<(), RenderError> {
        match &event {
            Event::Begin(..) => {
                self.stack.push((node(&event)?, Vec::new()));
                Ok(())
            }
            Event::End(..) => {
                let Some((mut object, children)) = self.stack.pop() else {
                    return Err(RenderError::Unbalanced {
                        expected: "begin event",
                        found: event.name(),
                    });
                };
                object.insert("children".to_owned(), Value::Array(children));
                self.finish(Value::Object(object), next)
            }
            _ => {
                let object = node(&event)?;
                self.finish(Value::Object(object), next)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use xdom_core::{Block, BlockKind, EventKind, Format, MacroCall, ResourceReference};

    use super::*;

    #[test]
    fn test_paragraph_tree() {
        let block = Block::paragraph(vec![
            Block::word("Hi"),
            Block::format(Format::Bold, vec![Block::word("there")]),
        ]);
        let output = JsonRenderer.render(&block).unwrap();
        let value: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "paragraph",
                "parameters": {},
                "children": [
                    {"type": "word", "word": "Hi"},
                    {
                        "type": "format",
                        "format": "bold",
                        "parameters": {},
                        "children": [{"type": "word", "word": "there"}]
                    }
                ]
            })
        );
    }

    #[test]
    fn test_link_reference_fields() {
        let link = Block::new(BlockKind::Link {
            reference: ResourceReference::url("https://x.org"),
            freestanding: true,
        });
        let value: Value = serde_json::from_str(&JsonRenderer.render(&link).unwrap()).unwrap();
        assert_eq!(value["reference"]["reference"], json!("https://x.org"));
        assert_eq!(value["freestanding"], json!(true));
    }

    #[test]
    fn test_fields_follow_event_table() {
        let samples = vec![
            Event::begin(Container::Header {
                level: 2,
                id: None,
            }),
            Event::word("w"),
            Event::SpecialSymbol('!'),
            Event::Macro {
                call: std::borrow::Cow::Owned(MacroCall::new("id", None, false)),
                parameters: std::borrow::Cow::Owned(xdom_core::Parameters::new()),
            },
            Event::Space,
            Event::EmptyLines(2),
        ];
        for event in samples {
            let names: Vec<_> = fields(&event).unwrap().into_iter().map(|(n, _)| n).collect();
            let kind: EventKind = event.kind();
            assert_eq!(names, kind.descriptor().fields, "{}", event.name());
        }
    }
}
