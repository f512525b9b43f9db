//! Helpers shared by parsers and printers.

use std::borrow::Cow;

use xdom_core::{Container, Event, Listener, Parameters, RenderError};

/// Escape text for HTML content and attribute values.
#[must_use]
pub fn escape_html(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// HTML attributes for block parameters, each preceded by a space.
#[must_use]
pub fn html_attributes(parameters: &Parameters) -> String {
    parameters
        .iter()
        .map(|(key, value)| format!(r#" {}="{}""#, escape_html(key), escape_html(value)))
        .collect()
}

/// Parse `key="value" key2=value2` pairs as written in wiki markup.
///
/// Inside quoted values `~` escapes the next character. Tokens that are not
/// `key=value` pairs are skipped.
#[must_use]
pub fn parse_parameters(input: &str) -> Parameters {
    let mut parameters = Parameters::new();
    let mut rest = input.trim_start();

    while !rest.is_empty() {
        let Some(eq) = rest.find('=') else { break };
        let key = rest[..eq].trim();
        if key.is_empty() || key.contains(char::is_whitespace) {
            // Skip the stray token before the next key.
            let skip = rest.find(char::is_whitespace).unwrap_or(rest.len());
            rest = rest[skip..].trim_start();
            continue;
        }
        let after = &rest[eq + 1..];
        let (value, remaining) = if let Some(quoted) = after.strip_prefix('"') {
            parse_quoted(quoted)
        } else {
            let end = after.find(char::is_whitespace).unwrap_or(after.len());
            (after[..end].to_owned(), &after[end..])
        };
        parameters.insert(key.to_owned(), value);
        rest = remaining.trim_start();
    }
    parameters
}

fn parse_quoted(input: &str) -> (String, &str) {
    let mut value = String::new();
    let mut chars = input.char_indices();
    while let Some((index, c)) = chars.next() {
        match c {
            '~' => {
                if let Some((_, escaped)) = chars.next() {
                    value.push(escaped);
                }
            }
            '"' => return (value, &input[index + 1..]),
            _ => value.push(c),
        }
    }
    (value, "")
}

/// Render parameters as `key="value"` pairs, the inverse of
/// [`parse_parameters`].
#[must_use]
pub fn format_parameters(parameters: &Parameters) -> String {
    parameters
        .iter()
        .map(|(key, value)| {
            let mut escaped = String::with_capacity(value.len());
            for c in value.chars() {
                if c == '"' || c == '~' {
                    escaped.push('~');
                }
                escaped.push(c);
            }
            format!(r#"{key}="{escaped}""#)
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Opens and closes sections as headings of different levels arrive.
#[derive(Debug, Default)]
pub struct SectionStack {
    levels: Vec<u8>,
}

impl SectionStack {
    /// Close sections at `level` or deeper, then open one for `level`.
    pub fn open(&mut self, level: u8, listener: &mut dyn Listener) -> Result<(), RenderError> {
        while self.levels.last().is_some_and(|open| *open >= level) {
            self.levels.pop();
            listener.event(Event::end(Container::Section))?;
        }
        self.levels.push(level);
        listener.event(Event::begin(Container::Section))
    }

    pub fn close_all(&mut self, listener: &mut dyn Listener) -> Result<(), RenderError> {
        while self.levels.pop().is_some() {
            listener.event(Event::end(Container::Section))?;
        }
        Ok(())
    }
}

/// Text content of recorded events, used to derive header ids.
#[must_use]
pub fn events_text(events: &[Event<'_>]) -> String {
    let mut text = String::new();
    for event in events {
        match event {
            Event::Word(word) => text.push_str(word),
            Event::Space | Event::NewLine => text.push(' '),
            Event::SpecialSymbol(symbol) => text.push(*symbol),
            Event::Verbatim { content, .. } => text.push_str(content),
            _ => {}
        }
    }
    text
}
