//! The `comment` macro: content that never renders.

use xdom_core::Block;
use xdom_transform::{
    BoundParameters, ContentDescriptor, ContentType, Macro, MacroContent, MacroDescriptor,
    MacroError, MacroTransformationContext,
};

/// `{{comment}}...{{/comment}}`: content kept in the source only.
pub struct CommentMacro {
    descriptor: MacroDescriptor,
}

impl CommentMacro {
    #[must_use]
    pub fn new() -> Self {
        let descriptor = MacroDescriptor::new("comment", "Comment")
            .with_description("Allows to write content that is not rendered.")
            .with_category("Development")
            .with_content(ContentDescriptor::new(ContentType::Text).with_description("The comment text."))
            .inline();
        Self { descriptor }
    }
}

impl Default for CommentMacro {
    fn default() -> Self {
        Self::new()
    }
}

impl Macro for CommentMacro {
    fn descriptor(&self) -> &MacroDescriptor {
        &self.descriptor
    }

    fn execute(
        &self,
        _parameters: &BoundParameters,
        _content: MacroContent,
        _context: &MacroTransformationContext<'_>,
    ) -> Result<Vec<Block>, MacroError> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use xdom_core::{Renderer, Syntax};
    use xdom_syntax::XWikiRenderer;

    use crate::test_support::{transform, xhtml};

    #[test]
    fn test_renders_nothing() {
        assert_eq!(xhtml("before\n\n{{comment}}hidden{{/comment}}\n\nafter"), "<p>before</p><p>after</p>");
    }

    #[test]
    fn test_paragraph_with_only_a_comment_is_dropped() {
        assert_eq!(xhtml("x\n\n{{comment}}a{{/comment}}{{comment}}b{{/comment}}"), "<p>x</p>");
    }

    #[test]
    fn test_paragraph_with_only_an_emptied_format_is_dropped() {
        assert_eq!(xhtml("x\n\n**{{comment}}a{{/comment}}**"), "<p>x</p>");
    }

    #[test]
    fn test_round_trip_keeps_the_call() {
        let xdom = transform("{{comment}}hidden{{/comment}}", false);
        assert_eq!(xdom.syntax(), Some(Syntax::XWIKI_2_1));
        assert_eq!(
            XWikiRenderer.render(xdom.root()).unwrap(),
            "{{comment}}\nhidden\n{{/comment}}"
        );
    }
}
