//! The `raw` macro, passing content straight to a renderer.

use xdom_core::{Block, BlockKind, Syntax};
use xdom_transform::{
    BoundParameters, ContentDescriptor, ContentType, Macro, MacroContent, MacroDescriptor,
    MacroError, MacroTransformationContext, ParameterDescriptor, ParameterType,
};

/// `{{raw syntax="html/5.0"}}...{{/raw}}`: output written directly in a
/// target syntax. Not available in restricted mode.
pub struct RawMacro {
    descriptor: MacroDescriptor,
}

impl RawMacro {
    #[must_use]
    pub fn new() -> Self {
        let descriptor = MacroDescriptor::new("raw", "Raw")
            .with_description("Outputs content as-is in the given syntax.")
            .with_category("Development")
            .with_parameter(
                ParameterDescriptor::new("syntax", ParameterType::Syntax)
                    .with_description("Syntax the content is written in.")
                    .mandatory(),
            )
            .with_content(ContentDescriptor::new(ContentType::Text).mandatory())
            .inline()
            .privileged();
        Self { descriptor }
    }
}

impl Default for RawMacro {
    fn default() -> Self {
        Self::new()
    }
}

impl Macro for RawMacro {
    fn descriptor(&self) -> &MacroDescriptor {
        &self.descriptor
    }

    fn execute(
        &self,
        parameters: &BoundParameters,
        content: MacroContent,
        _context: &MacroTransformationContext<'_>,
    ) -> Result<Vec<Block>, MacroError> {
        let syntax: Syntax = parameters
            .syntax("syntax")
            .cloned()
            .ok_or_else(|| MacroError::MissingParameter("syntax".to_owned()))?;
        let content = content.as_text().ok_or(MacroError::MissingContent)?.to_owned();
        Ok(vec![Block::new(BlockKind::Raw { content, syntax })])
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::test_support::{xhtml, xhtml_restricted};

    #[test]
    fn test_html_raw_passes_through() {
        assert_eq!(xhtml("{{raw syntax=\"html/5.0\"}}<hr/>{{/raw}}"), "<hr/>");
    }

    #[test]
    fn test_other_syntax_is_escaped() {
        assert_eq!(xhtml("{{raw syntax=\"plain/1.0\"}}<b>{{/raw}}"), "&lt;b&gt;");
    }

    #[test]
    fn test_refused_in_restricted_mode() {
        let output = xhtml_restricted("{{raw syntax=\"html/5.0\"}}<hr/>{{/raw}}");
        assert!(!output.contains("<hr/>"));
        assert!(output.contains("macro is not allowed in restricted mode"), "{output}");
    }

    #[test]
    fn test_invalid_syntax_parameter() {
        let output = xhtml("{{raw syntax=\"nonsense\"}}x{{/raw}}");
        assert!(output.contains("invalid value &#39;nonsense&#39; for parameter &#39;syntax&#39;"), "{output}");
    }
}
