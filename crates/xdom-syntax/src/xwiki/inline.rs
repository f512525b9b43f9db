//! Inline markup: formatting, links, images, inline verbatim and macros.

use std::borrow::Cow;

use xdom_core::{
    Container, Event, Format, Listener, Parameters, RenderError, ResourceReference, ResourceType,
    plain,
};

use super::macro_call::parse_macro;
use crate::util::parse_parameters;

const FORMAT_MARKERS: [(&str, Format); 7] = [
    ("**", Format::Bold),
    ("//", Format::Italic),
    ("__", Format::Underlined),
    ("--", Format::Strikedout),
    ("^^", Format::Superscript),
    (",,", Format::Subscript),
    ("##", Format::Monospace),
];

const URL_SCHEMES: [&str; 3] = ["http://", "https://", "ftp://"];

/// Emits the events for one run of inline text.
pub(crate) struct InlineParser<'l> {
    listener: &'l mut dyn Listener,
    formats: Vec<Format>,
    text: String,
}

impl<'l> InlineParser<'l> {
    pub(crate) fn new(listener: &'l mut dyn Listener) -> Self {
        Self {
            listener,
            formats: Vec::new(),
            text: String::new(),
        }
    }

    /// Parse `input`; formats still open at the end are closed.
    pub(crate) fn parse(&mut self, input: &str) -> Result<(), RenderError> {
        let base = self.formats.len();
        let mut index = 0;

        while index < input.len() {
            let rest = &input[index..];

            if let Some(escaped) = rest.strip_prefix('~').and_then(|r| r.chars().next()) {
                self.text.push(escaped);
                index += 1 + escaped.len_utf8();
                continue;
            }
            if let Some(format) = format_marker(rest) {
                self.flush()?;
                self.toggle(format, base)?;
                index += 2;
                continue;
            }
            if rest.starts_with("\\\\") {
                self.flush()?;
                self.listener.event(Event::NewLine)?;
                index += 2;
                continue;
            }
            if rest.starts_with("[[")
                && let Some(len) = self.link(rest)?
            {
                index += len;
                continue;
            }
            if let Some(body) = rest.strip_prefix("{{{")
                && let Some(end) = body.find("}}}")
            {
                self.flush()?;
                self.listener.event(Event::Verbatim {
                    content: Cow::Borrowed(&body[..end]),
                    inline: true,
                    parameters: Cow::Owned(Parameters::new()),
                })?;
                index += 3 + end + 3;
                continue;
            }
            if rest.starts_with("{{")
                && let Some(parsed) = parse_macro(rest, true)
            {
                self.flush()?;
                self.listener.event(Event::Macro {
                    call: Cow::Owned(parsed.call),
                    parameters: Cow::Owned(parsed.parameters),
                })?;
                index += parsed.len;
                continue;
            }
            if rest.starts_with("(%")
                && let Some(len) = self.parameter_format(rest)?
            {
                index += len;
                continue;
            }
            if at_word_start(input, index)
                && let Some(len) = url_len(rest)
            {
                self.flush()?;
                let reference = ResourceReference::url(&rest[..len]);
                let link = Container::Link {
                    reference: Cow::Owned(reference),
                    freestanding: true,
                };
                self.listener.event(Event::begin(link.clone()))?;
                self.listener.event(Event::end(link))?;
                index += len;
                continue;
            }

            let c = rest.chars().next().unwrap_or_default();
            self.text.push(c);
            index += c.len_utf8().max(1);
        }

        self.flush()?;
        while self.formats.len() > base {
            if let Some(format) = self.formats.pop() {
                self.listener.event(Event::end(Container::Format(format)))?;
            }
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), RenderError> {
        if self.text.is_empty() {
            return Ok(());
        }
        let text = std::mem::take(&mut self.text);
        plain::emit_text(&text, self.listener)
    }

    /// Close `format` if it is open above `base`, otherwise open it.
    ///
    /// Formats opened after it are closed first and reopened afterwards so
    /// the event stream stays properly nested.
    fn toggle(&mut self, format: Format, base: usize) -> Result<(), RenderError> {
        let Some(index) = self.formats[base..]
            .iter()
            .rposition(|open| *open == format)
            .map(|i| i + base)
        else {
            self.formats.push(format);
            return self.listener.event(Event::begin(Container::Format(format)));
        };

        let reopen: Vec<Format> = self.formats.drain(index + 1..).collect();
        for inner in reopen.iter().rev() {
            self.listener.event(Event::end(Container::Format(*inner)))?;
        }
        self.formats.pop();
        self.listener.event(Event::end(Container::Format(format)))?;
        for inner in reopen {
            self.formats.push(inner);
            self.listener.event(Event::begin(Container::Format(inner)))?;
        }
        Ok(())
    }

    /// `[[label>>reference||params]]`, `[[reference]]` or `[[image:src]]`.
    fn link(&mut self, rest: &str) -> Result<Option<usize>, RenderError> {
        let Some(end) = rest[2..].find("]]") else {
            return Ok(None);
        };
        let inner = &rest[2..2 + end];
        let (body, parameters) = match inner.split_once("||") {
            Some((body, params)) => (body, parse_parameters(params)),
            None => (inner, Parameters::new()),
        };
        let (label, target) = match body.rfind(">>") {
            Some(split) => (Some(&body[..split]), &body[split + 2..]),
            None => (None, body),
        };
        if target.trim().is_empty() {
            return Ok(None);
        }

        self.flush()?;
        if label.is_none()
            && let Some(source) = target.strip_prefix("image:")
        {
            self.listener.event(Event::Image {
                reference: Cow::Owned(image_reference(source)),
                freestanding: false,
                id: None,
                parameters: Cow::Owned(parameters),
            })?;
            return Ok(Some(2 + end + 2));
        }

        let container = Container::Link {
            reference: Cow::Owned(ResourceReference::parse(target.trim())),
            freestanding: false,
        };
        self.listener
            .event(Event::Begin(container.clone(), Cow::Owned(parameters.clone())))?;
        if let Some(label) = label {
            self.parse(label)?;
        }
        self.listener
            .event(Event::End(container, Cow::Owned(parameters)))?;
        Ok(Some(2 + end + 2))
    }

    /// `(% params %)text(%%)`: a parameter-only format around `text`.
    /// Without the closing `(%%)` it runs to the end of the input.
    fn parameter_format(&mut self, rest: &str) -> Result<Option<usize>, RenderError> {
        if rest.starts_with("(%%)") {
            return Ok(None);
        }
        let Some(params_end) = rest.find("%)") else {
            return Ok(None);
        };
        let parameters = parse_parameters(&rest[2..params_end]);
        let body = &rest[params_end + 2..];
        let (content, consumed) = match body.find("(%%)") {
            Some(close) => (&body[..close], params_end + 2 + close + 4),
            None => (body, rest.len()),
        };

        self.flush()?;
        let container = Container::Format(Format::None);
        self.listener
            .event(Event::Begin(container.clone(), Cow::Owned(parameters.clone())))?;
        self.parse(content)?;
        self.listener
            .event(Event::End(container, Cow::Owned(parameters)))?;
        Ok(Some(consumed))
    }
}

fn format_marker(text: &str) -> Option<Format> {
    FORMAT_MARKERS
        .iter()
        .find(|(marker, _)| text.starts_with(marker))
        .map(|(_, format)| *format)
}

fn at_word_start(input: &str, index: usize) -> bool {
    input[..index]
        .chars()
        .next_back()
        .is_none_or(|c| !c.is_alphanumeric())
}

/// Length of a freestanding URL at the start of `text`.
fn url_len(text: &str) -> Option<usize> {
    let scheme = URL_SCHEMES.iter().find(|scheme| text.starts_with(**scheme))?;
    let end = text
        .find(|c: char| c.is_whitespace() || matches!(c, '[' | ']' | '{' | '}' | '<' | '>' | '"' | '|'))
        .unwrap_or(text.len());
    let url = text[..end].trim_end_matches(['.', ',', ';', ':', '!', '?', ')', '\'']);
    (url.len() > scheme.len()).then_some(url.len())
}

fn image_reference(source: &str) -> ResourceReference {
    if xdom_core::is_absolute_url(source) {
        ResourceReference::url(source)
    } else {
        ResourceReference::new(ResourceType::Attachment, source)
    }
}
