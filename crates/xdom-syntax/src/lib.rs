//! Reference parsers and renderers for the xdom event protocol.
//!
//! | Syntax          | Parser              | Renderer              |
//! |-----------------|---------------------|-----------------------|
//! | `xwiki/2.1`     | [`XWikiParser`]     | [`XWikiRenderer`]     |
//! | `markdown/1.2`  | [`MarkdownParser`]  |                       |
//! | `plain/1.0`     | [`PlainTextParser`] | [`PlainTextRenderer`] |
//! | `xhtml/1.0`     |                     | [`XhtmlRenderer`]     |
//! | `event/1.0`     |                     | [`EventRenderer`]     |
//! | `xdom+json/1.0` |                     | [`JsonRenderer`]      |
//!
//! # Example
//!
//! ```
//! use xdom_core::{Parser, Renderer};
//! use xdom_syntax::{XWikiParser, XhtmlRenderer};
//!
//! let xdom = XWikiParser.parse("This is **bold**").unwrap();
//! let html = XhtmlRenderer.render(xdom.root()).unwrap();
//! assert_eq!(html, "<p>This is <strong>bold</strong></p>");
//! ```

mod event;
mod json;
mod markdown;
mod plain;
pub mod util;
mod xhtml;
mod xwiki;

pub use event::EventRenderer;
pub use json::JsonRenderer;
pub use markdown::MarkdownParser;
pub use plain::{PlainTextParser, PlainTextRenderer};
pub use xhtml::XhtmlRenderer;
pub use xwiki::{XWikiParser, XWikiRenderer};
use xdom_core::SyntaxRegistry;

/// Registry holding every parser and renderer of this crate.
#[must_use]
pub fn default_registry() -> SyntaxRegistry {
    let mut registry = SyntaxRegistry::new();
    registry.register_parser(XWikiParser);
    registry.register_parser(MarkdownParser);
    registry.register_parser(PlainTextParser);
    registry.register_renderer(XWikiRenderer);
    registry.register_renderer(XhtmlRenderer);
    registry.register_renderer(PlainTextRenderer);
    registry.register_renderer(EventRenderer);
    registry.register_renderer(JsonRenderer);
    registry
}
