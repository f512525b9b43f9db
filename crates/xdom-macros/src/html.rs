//! The `html` macro.

use xdom_core::{Block, BlockKind, Syntax};
use xdom_transform::{
    BoundParameters, ContentDescriptor, ContentType, Macro, MacroContent, MacroDescriptor,
    MacroError, MacroTransformationContext,
};

/// `{{html}}...{{/html}}`: markup passed through to HTML output.
///
/// In restricted mode the markup is shown as escaped source instead.
pub struct HtmlMacro {
    descriptor: MacroDescriptor,
}

impl HtmlMacro {
    #[must_use]
    pub fn new() -> Self {
        let descriptor = MacroDescriptor::new("html", "HTML")
            .with_description("Inserts HTML code into the page.")
            .with_category("Development")
            .with_content(
                ContentDescriptor::new(ContentType::Text)
                    .with_description("The HTML content to insert in the page.")
                    .mandatory(),
            )
            .inline();
        Self { descriptor }
    }
}

impl Default for HtmlMacro {
    fn default() -> Self {
        Self::new()
    }
}

impl Macro for HtmlMacro {
    fn descriptor(&self) -> &MacroDescriptor {
        &self.descriptor
    }

    fn execute(
        &self,
        _parameters: &BoundParameters,
        content: MacroContent,
        context: &MacroTransformationContext<'_>,
    ) -> Result<Vec<Block>, MacroError> {
        let content = content.as_text().ok_or(MacroError::MissingContent)?.to_owned();
        let block = if context.is_restricted() {
            tracing::debug!(inline = context.is_inline(), "Rendering html macro as source in restricted mode");
            Block::new(BlockKind::Verbatim {
                content,
                inline: context.is_inline(),
            })
        } else {
            Block::new(BlockKind::Raw {
                content,
                syntax: Syntax::HTML_5_0,
            })
        };
        Ok(vec![block])
    }
}
