//! `{{name params/}}` and `{{name params}}content{{/name}}`.

use xdom_core::{MacroCall, Parameters};

use crate::util::parse_parameters;

/// A macro call found in source text.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct ParsedMacro {
    pub call: MacroCall,
    pub parameters: Parameters,
    /// Bytes consumed from the start of the call.
    pub len: usize,
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | ':')
}

/// Parse a macro call at the start of `text`.
///
/// Returns `None` when `text` does not start with a well-formed call, in
/// which case the caller treats the characters as plain text.
pub(crate) fn parse_macro(text: &str, inline: bool) -> Option<ParsedMacro> {
    let body = text.strip_prefix("{{")?;
    if body.starts_with('{') || body.starts_with('/') {
        return None;
    }
    let name_len = body.find(|c: char| !is_name_char(c)).unwrap_or(body.len());
    if name_len == 0 {
        return None;
    }
    let name = &body[..name_len];
    let tag_end = find_tag_end(&body[name_len..])? + name_len;
    let tag = &body[name_len..tag_end];
    let (raw_params, self_closing) = match tag.strip_suffix('/') {
        Some(params) => (params, true),
        None => (tag, false),
    };
    let parameters = parse_parameters(raw_params);
    let open_len = 2 + tag_end + 2;

    if self_closing {
        return Some(ParsedMacro {
            call: MacroCall::new(name, None, inline),
            parameters,
            len: open_len,
        });
    }

    let after_open = &text[open_len..];
    let (content_len, close_len) = find_close(after_open, name)?;
    let content = strip_one_newline(&after_open[..content_len]);
    Some(ParsedMacro {
        call: MacroCall::new(name, Some(content.to_owned()), inline),
        parameters,
        len: open_len + content_len + close_len,
    })
}

/// Offset of the `}}` closing the opening tag, skipping quoted values.
fn find_tag_end(text: &str) -> Option<usize> {
    let mut in_quotes = false;
    let mut escaped = false;
    for (index, c) in text.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '~' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            '}' if !in_quotes && text[index..].starts_with("}}") => return Some(index),
            '\n' if !in_quotes => return None,
            _ => {}
        }
    }
    None
}

/// Offset and length of the `{{/name}}` closing an already opened call.
/// Complete nested calls are skipped as a whole.
fn find_close(text: &str, name: &str) -> Option<(usize, usize)> {
    let open = format!("{{{{{name}");
    let close = format!("{{{{/{name}}}}}");
    let mut index = 0;

    while index < text.len() {
        let rest = &text[index..];
        if rest.starts_with(&close) {
            return Some((index, close.len()));
        }
        if rest.starts_with(&open)
            && rest[open.len()..].starts_with(|c: char| !is_name_char(c))
            && let Some(nested) = parse_macro(rest, true)
        {
            index += nested.len;
            continue;
        }
        index += rest.chars().next().map_or(1, char::len_utf8);
    }
    None
}

fn strip_one_newline(content: &str) -> &str {
    let content = content
        .strip_prefix("\r\n")
        .or_else(|| content.strip_prefix('\n'))
        .unwrap_or(content);
    content
        .strip_suffix("\r\n")
        .or_else(|| content.strip_suffix('\n'))
        .unwrap_or(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_self_closing_with_parameters() {
        let parsed = parse_macro(r#"{{id name="test"/}} tail"#, false).unwrap();
        assert_eq!(parsed.call, MacroCall::new("id", None, false));
        assert_eq!(parsed.parameters.get("name").map(String::as_str), Some("test"));
        assert_eq!(parsed.len, r#"{{id name="test"/}}"#.len());
    }

    #[test]
    fn test_content_strips_single_newlines() {
        let source = "{{box}}\n\nline\n\n{{/box}}";
        let parsed = parse_macro(source, false).unwrap();
        assert_eq!(parsed.call.content.as_deref(), Some("\nline\n"));
        assert_eq!(parsed.len, source.len());
    }

    #[test]
    fn test_nested_same_name() {
        let source = "{{box}}a{{box}}b{{/box}}c{{/box}}!";
        let parsed = parse_macro(source, true).unwrap();
        assert_eq!(parsed.call.content.as_deref(), Some("a{{box}}b{{/box}}c"));
        assert_eq!(&source[parsed.len..], "!");
    }

    #[test]
    fn test_nested_self_closing_does_not_count() {
        let source = "{{box}}{{box/}}{{/box}}";
        let parsed = parse_macro(source, true).unwrap();
        assert_eq!(parsed.call.content.as_deref(), Some("{{box/}}"));
    }

    #[test]
    fn test_quoted_braces_in_parameters() {
        let parsed = parse_macro(r#"{{code title="a}}b"/}}"#, true).unwrap();
        assert_eq!(parsed.parameters.get("title").map(String::as_str), Some("a}}b"));
    }

    #[test]
    fn test_malformed_calls() {
        assert!(parse_macro("{{{verbatim}}}", true).is_none());
        assert!(parse_macro("{{/box}}", true).is_none());
        assert!(parse_macro("{{box}}never closed", true).is_none());
        assert!(parse_macro("{{ }}", true).is_none());
    }
}
