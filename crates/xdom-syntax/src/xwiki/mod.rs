//! XWiki 2.1 markup.
//!
//! Block constructs are recognised line by line in [`parser`]; text inside
//! a block goes through the inline scanner in [`inline`]. Macro calls are
//! shared by both levels: a call alone on its lines is a block macro, any
//! other call is inline.

mod inline;
mod macro_call;
mod parser;
mod renderer;

pub use parser::XWikiParser;
pub use renderer::XWikiRenderer;
