//! CLI command implementations.

pub(crate) mod convert;
pub(crate) mod macros;
pub(crate) mod syntaxes;

pub(crate) use convert::ConvertArgs;
pub(crate) use macros::MacrosArgs;
