//! Transformation and macro errors.

use xdom_core::{ParseError, TreeError};

/// Failure of a transformation pass.
#[derive(Debug, thiserror::Error)]
pub enum TransformationError {
    /// A transformation in the pass failed; the pass stopped there.
    #[error("transformation '{transformation}' failed")]
    Failed {
        transformation: &'static str,
        #[source]
        source: Box<TransformationError>,
    },
    /// No transformation is registered under this name.
    #[error("unknown transformation: {0}")]
    Unknown(String),
    /// A macro failed while the engine was set to propagate macro errors.
    #[error(transparent)]
    Macro(#[from] MacroError),
    #[error(transparent)]
    Tree(#[from] TreeError),
    #[error("{0}")]
    Message(String),
}

/// Failure scoped to a single macro invocation.
#[derive(Debug, thiserror::Error)]
pub enum MacroError {
    #[error("unknown macro: {0}")]
    UnknownMacro(String),
    #[error("maximum recursion depth exceeded")]
    RecursionLimit,
    /// More macros were executed in one pass than allowed.
    #[error("maximum number of macro executions ({0}) exceeded")]
    IterationLimit(usize),
    #[error("invalid value '{value}' for parameter '{parameter}'")]
    InvalidParameter {
        parameter: String,
        value: String,
        #[source]
        reason: ConversionError,
    },
    #[error("missing mandatory parameter '{0}'")]
    MissingParameter(String),
    #[error("missing mandatory content")]
    MissingContent,
    #[error("macro cannot be used inline")]
    NotInline,
    #[error("macro is not allowed in restricted mode")]
    Restricted,
    #[error("no parser for syntax {0}")]
    UnknownSyntax(String),
    #[error("failed to parse macro content")]
    ContentParse(#[source] ParseError),
    #[error("failed to transform macro content")]
    ContentTransformation(#[source] Box<TransformationError>),
    #[error("{0}")]
    Execution(String),
}

/// A raw parameter value that does not fit the declared type.
///
/// The message names only the expected type; callers report the value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversionError {
    #[error("expected {expected}")]
    Invalid { expected: String, value: String },
}

impl ConversionError {
    pub fn invalid(expected: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Invalid {
            expected: expected.into(),
            value: value.into(),
        }
    }
}

/// Render an error and its sources as one line, outermost first.
pub fn error_chain(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(error) = source {
        message.push_str(": ");
        message.push_str(&error.to_string());
        source = error.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_chain_joins_sources() {
        let error = MacroError::InvalidParameter {
            parameter: "count".to_owned(),
            value: "many".to_owned(),
            reason: ConversionError::invalid("an integer", "many"),
        };
        assert_eq!(
            error_chain(&error),
            "invalid value 'many' for parameter 'count': expected an integer"
        );
    }

    #[test]
    fn test_failed_keeps_transformation_name() {
        let error = TransformationError::Failed {
            transformation: "macro",
            source: Box::new(TransformationError::Macro(MacroError::RecursionLimit)),
        };
        assert_eq!(
            error_chain(&error),
            "transformation 'macro' failed: maximum recursion depth exceeded"
        );
    }
}
