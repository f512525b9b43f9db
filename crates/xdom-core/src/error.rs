//! Error types shared by the tree, the id generator, parsers and renderers.

use crate::block::BlockId;

/// Structural misuse of the block tree.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    /// The referenced block is not a child of the block being mutated.
    #[error("invalid operation: block {reference} is not a child of block {parent}")]
    NotAChild { parent: BlockId, reference: BlockId },
    /// No block with the given id exists in the subtree.
    #[error("invalid operation: block {0} not found")]
    NotFound(BlockId),
}

/// Id generator misuse.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    #[error("invalid argument '{0}': prefix must be alphanumeric and non-empty")]
    InvalidPrefix(String),
}

/// Failure raised by a listener, a renderer or the XDOM builder.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// An end event did not match the innermost open container.
    #[error("unbalanced event stream: expected end of {expected}, got end of {found}")]
    Unbalanced {
        expected: &'static str,
        found: &'static str,
    },
    /// An event arrived before the document was opened or after it was closed.
    #[error("event {0} outside of document")]
    OutsideDocument(&'static str),
    /// The stream ended with containers still open.
    #[error("incomplete event stream: {0} container(s) left open")]
    Incomplete(usize),
    #[error(transparent)]
    Fmt(#[from] std::fmt::Error),
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// Failure to parse source markup.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },
    /// The listener the parser was feeding rejected an event.
    #[error("listener failed: {0}")]
    Listener(#[from] RenderError),
}

impl ParseError {
    pub fn syntax(line: usize, message: impl Into<String>) -> Self {
        Self::Syntax {
            line,
            message: message.into(),
        }
    }
}
