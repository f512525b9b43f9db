//! The `content` macro, which parses its body in another syntax.

use xdom_core::{Block, MetaData};
use xdom_transform::{
    BoundParameters, ContentDescriptor, ContentType, Macro, MacroContent, MacroDescriptor,
    MacroError, MacroTransformationContext, ParameterDescriptor, ParameterType,
};

/// `{{content syntax="markdown/1.2"}}...{{/content}}`: content written in
/// another syntax.
///
/// The parsed blocks are tagged with their syntax, so macros they contain
/// resolve against it when the pass reaches them.
pub struct ContentMacro {
    descriptor: MacroDescriptor,
}

impl ContentMacro {
    #[must_use]
    pub fn new() -> Self {
        let descriptor = MacroDescriptor::new("content", "Content")
            .with_description("Allows writing content in a different syntax.")
            .with_category("Content")
            .with_parameter(
                ParameterDescriptor::new("syntax", ParameterType::Syntax)
                    .with_description("The syntax of the content. Defaults to the current syntax."),
            )
            .with_content(
                ContentDescriptor::new(ContentType::Text)
                    .with_description("The content to parse.")
                    .mandatory(),
            )
            .inline();
        Self { descriptor }
    }
}

impl Default for ContentMacro {
    fn default() -> Self {
        Self::new()
    }
}

impl Macro for ContentMacro {
    fn descriptor(&self) -> &MacroDescriptor {
        &self.descriptor
    }

    fn execute(
        &self,
        parameters: &BoundParameters,
        content: MacroContent,
        context: &MacroTransformationContext<'_>,
    ) -> Result<Vec<Block>, MacroError> {
        let text = content.as_text().ok_or(MacroError::MissingContent)?;
        let syntax = parameters
            .syntax("syntax")
            .or(context.syntax())
            .cloned()
            .ok_or_else(|| MacroError::Execution("no syntax given for the content".to_owned()))?;
        let blocks = context.parse_content_as(text, &syntax)?;
        let metadata = MetaData::new().with(MetaData::SYNTAX, syntax.to_string());
        Ok(vec![Block::metadata(metadata, blocks)])
    }
}
