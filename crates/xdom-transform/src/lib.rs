//! Tree transformations and macro execution.
//!
//! A [`TransformationManager`] runs registered [`Transformation`]s over a
//! block tree in priority order. The [`MacroTransformation`] is the main
//! pass: it replaces every macro block with the output of the macro it
//! names, recovering from macro failures with visible error blocks.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use xdom_core::{Block, BlockKind, MacroCall, MetaData, XDom};
//! use xdom_transform::{
//!     BoundParameters, Macro, MacroContent, MacroDescriptor, MacroError, MacroRegistry,
//!     MacroTransformation, MacroTransformationContext, TransformationContext,
//!     TransformationManager,
//! };
//!
//! struct Hello(MacroDescriptor);
//!
//! impl Macro for Hello {
//!     fn descriptor(&self) -> &MacroDescriptor {
//!         &self.0
//!     }
//!
//!     fn execute(
//!         &self,
//!         _parameters: &BoundParameters,
//!         _content: MacroContent,
//!         _context: &MacroTransformationContext<'_>,
//!     ) -> Result<Vec<Block>, MacroError> {
//!         Ok(vec![Block::paragraph(vec![Block::word("hello")])])
//!     }
//! }
//!
//! let mut macros = MacroRegistry::new();
//! macros.register(Hello(MacroDescriptor::new("hello", "Hello")));
//! let engine = MacroTransformation::new(Arc::new(macros), Arc::default());
//! let manager = TransformationManager::new().with(engine);
//!
//! let call = Block::new(BlockKind::Macro(MacroCall::new("hello", None, false)));
//! let mut xdom = XDom::new(vec![call], MetaData::new());
//! manager.transform_xdom(&mut xdom, &TransformationContext::new()).unwrap();
//! assert_eq!(xdom.root().plain_text(), "hello");
//! ```

mod context;
mod error;
pub mod error_block;
mod macros;
mod manager;
mod transformation;

pub use context::TransformationContext;
pub use error::{ConversionError, MacroError, TransformationError, error_chain};
pub use macros::*;
pub use manager::{PassStatus, TransformationManager};
pub use transformation::{DEFAULT_PRIORITY, Transformation, TransformationRegistry};

#[cfg(test)]
mod tests {
    use static_assertions::assert_impl_all;

    use super::*;

    assert_impl_all!(TransformationManager: Send, Sync);
    assert_impl_all!(TransformationRegistry: Send, Sync);
    assert_impl_all!(MacroRegistry: Send, Sync);
    assert_impl_all!(MacroTransformation: Send, Sync);
}
