//! CLI error types.

use xdom::ConvertError;
use xdom_config::ConfigError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{message}")]
    Convert { message: String },

    #[error("{0}")]
    Validation(String),
}

impl From<ConvertError> for CliError {
    fn from(err: ConvertError) -> Self {
        Self::Convert {
            message: xdom_transform::error_chain(&err),
        }
    }
}
