//! `${VAR}` and `${VAR:-default}` expansion in configuration strings.

use crate::ConfigError;

/// Expand environment variable references in `value`.
///
/// `field` names the configuration key for error messages.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    shellexpand::env(value)
        .map(std::borrow::Cow::into_owned)
        .map_err(|e| ConfigError::EnvVar {
            field: field.to_owned(),
            message: format!("${{{}}} {}", e.var_name, e.cause),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_unchanged() {
        assert_eq!(expand_env("xwiki/2.1", "f").unwrap(), "xwiki/2.1");
    }

    #[test]
    fn test_default_used_when_unset() {
        assert_eq!(
            expand_env("${XDOM_CONFIG_TEST_UNSET_VAR:-plain/1.0}", "f").unwrap(),
            "plain/1.0"
        );
    }

    #[test]
    fn test_missing_variable_names_field() {
        let err = expand_env("${XDOM_CONFIG_TEST_UNSET_VAR}", "rendering.target_syntax").unwrap_err();
        match err {
            ConfigError::EnvVar { field, message } => {
                assert_eq!(field, "rendering.target_syntax");
                assert!(message.contains("XDOM_CONFIG_TEST_UNSET_VAR"), "{message}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
