//! Visible placeholders for content that failed to render.

use xdom_core::{Block, BlockKind, Format, MacroCall, plain};

use crate::error::{MacroError, error_chain};

/// Class of the block holding the short error message.
pub const ERROR_CLASS: &str = "rendering-error";
/// Class of the block holding the error details.
pub const DESCRIPTION_CLASS: &str = "rendering-error-description";

/// A message and its details, as groups or, inline, as unformatted spans.
pub fn error_blocks(message: &str, description: &str, inline: bool) -> Vec<Block> {
    let wrap = |class: &str, text: &str| {
        let kind = if inline {
            BlockKind::Format(Format::None)
        } else {
            BlockKind::Group
        };
        Block::new(kind)
            .with_parameter("class", class)
            .with_children(plain::text_blocks(text))
    };
    vec![wrap(ERROR_CLASS, message), wrap(DESCRIPTION_CLASS, description)]
}

/// Error blocks standing in for a failed macro call.
pub fn macro_error_blocks(call: &MacroCall, error: &MacroError) -> Vec<Block> {
    let message = match error {
        MacroError::UnknownMacro(id) => format!("Unknown macro: {id}."),
        _ => format!("Failed to execute the [{}] macro.", call.id),
    };
    error_blocks(&message, &error_chain(error), call.inline)
}

#[cfg(test)]
mod tests {
    use xdom_core::EventKind;

    use super::*;

    #[test]
    fn test_block_and_inline_forms() {
        let call = MacroCall::new("nope", None, false);
        let blocks = macro_error_blocks(&call, &MacroError::UnknownMacro("nope".to_owned()));
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].event_kind(), EventKind::Group);
        assert_eq!(blocks[0].parameter("class"), Some(ERROR_CLASS));
        assert_eq!(blocks[0].plain_text(), "Unknown macro: nope.");
        assert_eq!(blocks[1].plain_text(), "unknown macro: nope");

        let call = MacroCall::new("box", None, true);
        let blocks = macro_error_blocks(&call, &MacroError::NotInline);
        assert_eq!(blocks[0].event_kind(), EventKind::Format);
        assert_eq!(blocks[0].plain_text(), "Failed to execute the [box] macro.");
        assert_eq!(blocks[1].parameter("class"), Some(DESCRIPTION_CLASS));
    }
}
