//! The `box` macro.

use xdom_core::{Block, plain};
use xdom_transform::{
    BoundParameters, ContentDescriptor, ContentType, Macro, MacroContent, MacroDescriptor,
    MacroError, MacroTransformationContext, ParameterDescriptor, ParameterType,
    non_generated_content,
};

/// `{{box title="..."}}...{{/box}}`: content framed in a group.
pub struct BoxMacro {
    descriptor: MacroDescriptor,
}

impl BoxMacro {
    const CLASS: &'static str = "box";

    #[must_use]
    pub fn new() -> Self {
        let descriptor = MacroDescriptor::new("box", "Box")
            .with_description("Draws a box around the content.")
            .with_category("Layout")
            .with_parameter(
                ParameterDescriptor::new("title", ParameterType::String)
                    .with_description("Title displayed above the content."),
            )
            .with_parameter(
                ParameterDescriptor::new("cssClass", ParameterType::String)
                    .with_description("Additional class for the box.")
                    .with_group("Display"),
            )
            .with_content(ContentDescriptor::new(ContentType::Blocks).with_description("Content of the box."));
        Self { descriptor }
    }
}

impl Default for BoxMacro {
    fn default() -> Self {
        Self::new()
    }
}

impl Macro for BoxMacro {
    fn descriptor(&self) -> &MacroDescriptor {
        &self.descriptor
    }

    fn execute(
        &self,
        parameters: &BoundParameters,
        content: MacroContent,
        _context: &MacroTransformationContext<'_>,
    ) -> Result<Vec<Block>, MacroError> {
        let class = match parameters.string("cssClass") {
            Some(extra) if !extra.trim().is_empty() => format!("{} {}", Self::CLASS, extra.trim()),
            _ => Self::CLASS.to_owned(),
        };

        let mut children = Vec::new();
        if let Some(title) = parameters.string("title") {
            children.push(Block::paragraph(plain::text_blocks(title)).with_parameter("class", "box-title"));
        }
        children.push(non_generated_content(content.into_blocks()));

        Ok(vec![Block::group(children).with_parameter("class", class)])
    }
}
