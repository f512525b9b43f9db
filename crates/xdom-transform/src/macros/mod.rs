//! Macro API and the engine that executes macro blocks.
//!
//! A [`Macro`] declares what it accepts through a [`MacroDescriptor`]. The
//! [`MacroTransformation`] resolves each macro block against a
//! [`MacroRegistry`], converts its parameters, prepares its content and
//! substitutes the blocks it returns.

mod content;
mod context;
mod descriptor;
mod parameters;
mod registry;
mod transformation;

use xdom_core::{Block, MetaData};

pub use content::MacroContentParser;
pub use context::MacroTransformationContext;
pub use descriptor::{
    ContentDescriptor, ContentType, DEFAULT_MACRO_PRIORITY, MacroDescriptor, ParameterDescriptor,
    ParameterType,
};
pub use parameters::{
    BoundParameters, DefaultParameterConverter, ParameterConverter, ParameterValue,
    bind_parameters,
};
pub use registry::{Macro, MacroContent, MacroRegistry};
pub use transformation::{ErrorPolicy, MacroTransformation, MacroTransformationConfig};

/// Wrap `blocks` so editors treat them as user content rather than macro
/// output.
pub fn non_generated_content(blocks: Vec<Block>) -> Block {
    Block::metadata(
        MetaData::new().with(MetaData::NON_GENERATED_CONTENT, "blocks"),
        blocks,
    )
}
