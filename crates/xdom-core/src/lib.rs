//! Document model and event protocol.
//!
//! Parsers turn markup into a stream of [`Event`]s; the [`XDomBuilder`]
//! assembles that stream into a [`Block`] tree rooted at an [`XDom`].
//! Renderers replay the tree through a [`ListenerChain`] whose links track
//! nesting state, filter events and finally print output.
//!
//! # Example
//!
//! ```
//! use xdom_core::{Block, BlockKind, Event, Format, MetaData, XDom};
//!
//! let xdom = XDom::new(
//!     vec![Block::paragraph(vec![
//!         Block::word("This"),
//!         Block::new(BlockKind::Space),
//!         Block::format(Format::Bold, vec![Block::word("bold")]),
//!     ])],
//!     MetaData::new(),
//! );
//!
//! let mut events: Vec<Event<'static>> = Vec::new();
//! xdom.traverse(&mut events).unwrap();
//! assert_eq!(events.len(), 9);
//! ```

mod block;
mod builder;
pub mod chain;
mod cursor;
mod error;
mod event;
pub mod id;
mod listener;
mod metadata;
pub mod plain;
mod parser;
mod reference;
mod registry;
mod renderer;
mod syntax;
mod xdom;

pub use block::{Block, BlockId, BlockKind, ChildrenByType, Format, ListType, MacroCall};
pub use builder::XDomBuilder;
pub use chain::{ChainState, ChainingListener, ListenerChain, Next};
pub use cursor::BlockCursor;
pub use error::{IdError, ParseError, RenderError, TreeError};
pub use event::{Container, EVENT_TABLE, Event, EventDescriptor, EventKind};
pub use id::IdGenerator;
pub use listener::Listener;
pub use metadata::{MetaData, Parameters};
pub use parser::Parser;
pub use reference::{ResourceReference, ResourceType, is_absolute_url};
pub use registry::SyntaxRegistry;
pub use renderer::Renderer;
pub use syntax::{Syntax, SyntaxIdError};
pub use xdom::XDom;
