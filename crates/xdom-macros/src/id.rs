//! The `id` macro: a named anchor.

use xdom_core::{Block, BlockKind};
use xdom_transform::{
    BoundParameters, Macro, MacroContent, MacroDescriptor, MacroError, MacroTransformationContext,
    ParameterDescriptor, ParameterType,
};

/// `{{id name="anchor"/}}`: an anchor other content can link to.
pub struct IdMacro {
    descriptor: MacroDescriptor,
}

impl IdMacro {
    #[must_use]
    pub fn new() -> Self {
        let descriptor = MacroDescriptor::new("id", "Id")
            .with_description("Allows to insert a reference that can be linked to.")
            .with_category("Navigation")
            .with_parameter(
                ParameterDescriptor::new("name", ParameterType::String)
                    .with_description("The name of the anchor.")
                    .mandatory(),
            )
            .inline();
        Self { descriptor }
    }
}

impl Default for IdMacro {
    fn default() -> Self {
        Self::new()
    }
}

impl Macro for IdMacro {
    fn descriptor(&self) -> &MacroDescriptor {
        &self.descriptor
    }

    fn execute(
        &self,
        parameters: &BoundParameters,
        _content: MacroContent,
        _context: &MacroTransformationContext<'_>,
    ) -> Result<Vec<Block>, MacroError> {
        let name = parameters
            .string("name")
            .ok_or_else(|| MacroError::MissingParameter("name".to_owned()))?;
        Ok(vec![Block::new(BlockKind::Id(name.to_owned()))])
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::test_support::xhtml;

    #[test]
    fn test_standalone_anchor() {
        assert_eq!(xhtml("{{id name=\"test\"/}}"), "<div id=\"test\"></div>");
    }

    #[test]
    fn test_inline_anchor() {
        assert_eq!(
            xhtml("Go {{id name=\"here\"/}}there"),
            "<p>Go <span id=\"here\"></span>there</p>"
        );
    }

    #[test]
    fn test_missing_name_is_error_block() {
        let output = xhtml("{{id/}}");
        assert!(output.contains("Failed to execute the [id] macro."), "{output}");
        assert!(output.contains("missing mandatory parameter &#39;name&#39;"), "{output}");
    }
}
