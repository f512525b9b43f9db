//! Declarative description of a macro: its parameters and content.

use std::fmt;

/// Priority given to macros that do not declare one.
pub const DEFAULT_MACRO_PRIORITY: i32 = 1000;

/// Type a raw parameter string is converted to before execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterType {
    String,
    Boolean,
    Integer,
    Float,
    /// One of the listed values, matched case-insensitively.
    Enum(Vec<String>),
    /// A `type/version` syntax identifier.
    Syntax,
}

impl fmt::Display for ParameterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => f.write_str("string"),
            Self::Boolean => f.write_str("boolean"),
            Self::Integer => f.write_str("integer"),
            Self::Float => f.write_str("float"),
            Self::Enum(values) => write!(f, "one of {}", values.join(", ")),
            Self::Syntax => f.write_str("syntax"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterDescriptor {
    pub name: String,
    pub description: String,
    pub parameter_type: ParameterType,
    pub mandatory: bool,
    /// Raw value used when the call omits the parameter.
    pub default: Option<String>,
    /// UI grouping hint.
    pub group: Option<String>,
}

impl ParameterDescriptor {
    pub fn new(name: impl Into<String>, parameter_type: ParameterType) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            parameter_type,
            mandatory: false,
            default: None,
            group: None,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn mandatory(mut self) -> Self {
        self.mandatory = true;
        self
    }

    #[must_use]
    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    #[must_use]
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }
}

/// How the engine prepares macro content before execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    /// Passed through as the raw string.
    Text,
    /// Parsed in the current syntax.
    Blocks,
    /// Parsed, then run through the macro transformation one level deeper.
    TransformedBlocks,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentDescriptor {
    pub description: String,
    pub mandatory: bool,
    pub content_type: ContentType,
}

impl ContentDescriptor {
    pub fn new(content_type: ContentType) -> Self {
        Self {
            description: String::new(),
            mandatory: false,
            content_type,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn mandatory(mut self) -> Self {
        self.mandatory = true;
        self
    }
}

/// Everything the engine and documentation tooling know about a macro.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroDescriptor {
    pub id: String,
    pub name: String,
    pub description: String,
    pub default_category: Option<String>,
    pub parameters: Vec<ParameterDescriptor>,
    pub content: Option<ContentDescriptor>,
    pub supports_inline: bool,
    /// Lower values execute first within a pass.
    pub priority: i32,
    /// Refused in restricted mode.
    pub privileged: bool,
}

impl MacroDescriptor {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            default_category: None,
            parameters: Vec::new(),
            content: None,
            supports_inline: false,
            priority: DEFAULT_MACRO_PRIORITY,
            privileged: false,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.default_category = Some(category.into());
        self
    }

    #[must_use]
    pub fn with_parameter(mut self, parameter: ParameterDescriptor) -> Self {
        self.parameters.push(parameter);
        self
    }

    #[must_use]
    pub fn with_content(mut self, content: ContentDescriptor) -> Self {
        self.content = Some(content);
        self
    }

    #[must_use]
    pub fn inline(mut self) -> Self {
        self.supports_inline = true;
        self
    }

    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    #[must_use]
    pub fn privileged(mut self) -> Self {
        self.privileged = true;
        self
    }

    /// Parameter descriptor by name, ignoring case.
    #[must_use]
    pub fn parameter(&self, name: &str) -> Option<&ParameterDescriptor> {
        self.parameters
            .iter()
            .find(|parameter| parameter.name.eq_ignore_ascii_case(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameter_lookup_ignores_case() {
        let descriptor = MacroDescriptor::new("box", "Box")
            .with_parameter(ParameterDescriptor::new("title", ParameterType::String));
        assert!(descriptor.parameter("TITLE").is_some());
        assert!(descriptor.parameter("width").is_none());
        assert_eq!(descriptor.priority, DEFAULT_MACRO_PRIORITY);
    }

    #[test]
    fn test_parameter_type_display() {
        let kind = ParameterType::Enum(vec!["info".to_owned(), "warning".to_owned()]);
        assert_eq!(kind.to_string(), "one of info, warning");
    }
}
