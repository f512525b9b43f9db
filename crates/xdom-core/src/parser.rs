//! The parser capability.

use crate::builder::XDomBuilder;
use crate::error::ParseError;
use crate::id::IdGenerator;
use crate::listener::Listener;
use crate::syntax::Syntax;
use crate::xdom::XDom;

/// Turns source markup into events.
///
/// Implementations only provide [`stream`](Parser::stream); building the
/// tree is handled here through an [`XDomBuilder`].
pub trait Parser: Send + Sync {
    /// Syntax this parser reads.
    fn syntax(&self) -> Syntax;

    /// Emit `source` as one balanced document event sequence. Header ids are
    /// drawn from `ids`.
    fn stream(
        &self,
        source: &str,
        listener: &mut dyn Listener,
        ids: &mut IdGenerator,
    ) -> Result<(), ParseError>;

    fn parse(&self, source: &str) -> Result<XDom, ParseError> {
        self.parse_with_ids(source, IdGenerator::new())
    }

    /// Parse, continuing from an existing id generator.
    fn parse_with_ids(&self, source: &str, mut ids: IdGenerator) -> Result<XDom, ParseError> {
        let mut builder = XDomBuilder::new();
        self.stream(source, &mut builder, &mut ids)?;
        Ok(builder.finish_with(ids)?)
    }
}
