//! Conversion of raw parameter strings into typed values.

use std::collections::BTreeMap;

use xdom_core::{Parameters, Syntax};

use super::descriptor::{MacroDescriptor, ParameterType};
use crate::error::{ConversionError, MacroError};

/// A converted parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterValue {
    String(String),
    Boolean(bool),
    Integer(i64),
    Float(f64),
    /// The declared spelling of the matched enum value.
    Enum(String),
    Syntax(Syntax),
}

/// Converts raw strings to the declared parameter types.
pub trait ParameterConverter: Send + Sync {
    fn convert(&self, target: &ParameterType, raw: &str) -> Result<ParameterValue, ConversionError>;
}

/// Converter covering every [`ParameterType`].
///
/// Booleans accept `true`/`false`, `yes`/`no` and `1`/`0` in any case.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultParameterConverter;

impl ParameterConverter for DefaultParameterConverter {
    fn convert(&self, target: &ParameterType, raw: &str) -> Result<ParameterValue, ConversionError> {
        let value = raw.trim();
        let invalid = || ConversionError::invalid(target.to_string(), raw);
        match target {
            ParameterType::String => Ok(ParameterValue::String(raw.to_owned())),
            ParameterType::Boolean => match value.to_ascii_lowercase().as_str() {
                "true" | "yes" | "1" => Ok(ParameterValue::Boolean(true)),
                "false" | "no" | "0" => Ok(ParameterValue::Boolean(false)),
                _ => Err(invalid()),
            },
            ParameterType::Integer => value
                .parse()
                .map(ParameterValue::Integer)
                .map_err(|_| invalid()),
            ParameterType::Float => value
                .parse()
                .map(ParameterValue::Float)
                .map_err(|_| invalid()),
            ParameterType::Enum(values) => values
                .iter()
                .find(|candidate| candidate.eq_ignore_ascii_case(value))
                .map(|candidate| ParameterValue::Enum(candidate.clone()))
                .ok_or_else(invalid),
            ParameterType::Syntax => value
                .parse()
                .map(ParameterValue::Syntax)
                .map_err(|_| invalid()),
        }
    }
}

/// Converted parameters of one macro call, keyed by lowercase name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundParameters {
    values: BTreeMap<String, ParameterValue>,
}

impl BoundParameters {
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ParameterValue> {
        self.values.get(&name.to_ascii_lowercase())
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// String form of a `String` or `Enum` parameter.
    #[must_use]
    pub fn string(&self, name: &str) -> Option<&str> {
        match self.get(name)? {
            ParameterValue::String(value) | ParameterValue::Enum(value) => Some(value),
            _ => None,
        }
    }

    #[must_use]
    pub fn boolean(&self, name: &str) -> Option<bool> {
        match self.get(name)? {
            ParameterValue::Boolean(value) => Some(*value),
            _ => None,
        }
    }

    #[must_use]
    pub fn integer(&self, name: &str) -> Option<i64> {
        match self.get(name)? {
            ParameterValue::Integer(value) => Some(*value),
            _ => None,
        }
    }

    #[must_use]
    pub fn float(&self, name: &str) -> Option<f64> {
        match self.get(name)? {
            ParameterValue::Float(value) => Some(*value),
            _ => None,
        }
    }

    #[must_use]
    pub fn syntax(&self, name: &str) -> Option<&Syntax> {
        match self.get(name)? {
            ParameterValue::Syntax(value) => Some(value),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Convert the raw `parameters` of a call against `descriptor`.
///
/// Names match case-insensitively. Parameters the descriptor does not
/// declare are ignored. Omitted parameters take their declared default.
pub fn bind_parameters(
    descriptor: &MacroDescriptor,
    parameters: &Parameters,
    converter: &dyn ParameterConverter,
) -> Result<BoundParameters, MacroError> {
    let mut bound = BoundParameters::default();

    for (name, raw) in parameters {
        let Some(declared) = descriptor.parameter(name) else {
            tracing::debug!(macro_id = %descriptor.id, parameter = %name, "Ignoring unknown macro parameter");
            continue;
        };
        let value = converter
            .convert(&declared.parameter_type, raw)
            .map_err(|reason| MacroError::InvalidParameter {
                parameter: declared.name.clone(),
                value: raw.clone(),
                reason,
            })?;
        bound.values.insert(declared.name.to_ascii_lowercase(), value);
    }

    for declared in &descriptor.parameters {
        let key = declared.name.to_ascii_lowercase();
        if bound.values.contains_key(&key) {
            continue;
        }
        if let Some(default) = &declared.default {
            let value = converter
                .convert(&declared.parameter_type, default)
                .map_err(|reason| MacroError::InvalidParameter {
                    parameter: declared.name.clone(),
                    value: default.clone(),
                    reason,
                })?;
            bound.values.insert(key, value);
        } else if declared.mandatory {
            return Err(MacroError::MissingParameter(declared.name.clone()));
        }
    }

    Ok(bound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::macros::descriptor::ParameterDescriptor;

    fn descriptor() -> MacroDescriptor {
        MacroDescriptor::new("sample", "Sample")
            .with_parameter(ParameterDescriptor::new("title", ParameterType::String).mandatory())
            .with_parameter(ParameterDescriptor::new("count", ParameterType::Integer).with_default("3"))
            .with_parameter(ParameterDescriptor::new("open", ParameterType::Boolean))
            .with_parameter(ParameterDescriptor::new(
                "kind",
                ParameterType::Enum(vec!["Info".to_owned(), "Warning".to_owned()]),
            ))
    }

    fn raw(pairs: &[(&str, &str)]) -> Parameters {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn test_bind_converts_and_defaults() {
        let bound = bind_parameters(
            &descriptor(),
            &raw(&[("Title", "Hi"), ("open", "YES"), ("kind", "warning"), ("extra", "x")]),
            &DefaultParameterConverter,
        )
        .unwrap();

        assert_eq!(bound.string("title"), Some("Hi"));
        assert_eq!(bound.integer("count"), Some(3));
        assert_eq!(bound.boolean("open"), Some(true));
        assert_eq!(bound.string("kind"), Some("Warning"));
        assert!(!bound.contains("extra"));
        assert_eq!(bound.len(), 4);
    }

    #[test]
    fn test_bind_reports_parameter_and_value() {
        let err = bind_parameters(
            &descriptor(),
            &raw(&[("title", "Hi"), ("count", "many")]),
            &DefaultParameterConverter,
        )
        .unwrap_err();

        match err {
            MacroError::InvalidParameter { parameter, value, .. } => {
                assert_eq!(parameter, "count");
                assert_eq!(value, "many");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_bind_requires_mandatory() {
        let err = bind_parameters(&descriptor(), &Parameters::new(), &DefaultParameterConverter);
        assert!(matches!(err, Err(MacroError::MissingParameter(name)) if name == "title"));
    }

    #[test]
    fn test_convert_syntax_and_float() {
        let converter = DefaultParameterConverter;
        assert_eq!(
            converter.convert(&ParameterType::Syntax, "markdown/1.2").unwrap(),
            ParameterValue::Syntax(Syntax::MARKDOWN_1_2)
        );
        assert_eq!(
            converter.convert(&ParameterType::Float, " 1.5 ").unwrap(),
            ParameterValue::Float(1.5)
        );
        assert!(converter.convert(&ParameterType::Boolean, "maybe").is_err());
    }
}
