//! The renderer capability.

use crate::block::Block;
use crate::chain::ListenerChain;
use crate::error::RenderError;
use crate::syntax::Syntax;

/// Serializes a block tree into a target syntax.
///
/// A renderer is a recipe for a [`ListenerChain`]; every call to
/// [`render`](Renderer::render) builds a fresh chain, since chain state is
/// only valid for a single pass.
pub trait Renderer: Send + Sync {
    /// Syntax this renderer writes.
    fn syntax(&self) -> Syntax;

    /// Chain for one rendering pass, ending in the printer.
    fn create_chain(&self) -> ListenerChain;

    fn render(&self, block: &Block) -> Result<String, RenderError> {
        let mut chain = self.create_chain();
        block.traverse(&mut chain)?;
        Ok(chain.into_output())
    }
}
