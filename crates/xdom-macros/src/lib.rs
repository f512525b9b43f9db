//! Built-in macros.
//!
//! | Id        | Output                                               |
//! |-----------|------------------------------------------------------|
//! | `id`      | an anchor                                            |
//! | `html`    | raw HTML, or escaped source in restricted mode       |
//! | `content` | its content parsed in the `syntax` parameter         |
//! | `box`     | a group around its parsed content                    |
//! | `comment` | nothing                                              |
//! | `raw`     | raw output in the `syntax` parameter (privileged)    |

mod box_macro;
mod comment;
mod content;
mod html;
mod id;
mod raw;

pub use box_macro::BoxMacro;
pub use comment::CommentMacro;
pub use content::ContentMacro;
pub use html::HtmlMacro;
pub use id::IdMacro;
pub use raw::RawMacro;
use xdom_transform::MacroRegistry;

/// Register every built-in macro for all syntaxes.
pub fn register_builtin(registry: &mut MacroRegistry) {
    registry.register(IdMacro::new());
    registry.register(HtmlMacro::new());
    registry.register(ContentMacro::new());
    registry.register(BoxMacro::new());
    registry.register(CommentMacro::new());
    registry.register(RawMacro::new());
}

/// Registry holding the built-in macros.
#[must_use]
pub fn builtin_registry() -> MacroRegistry {
    let mut registry = MacroRegistry::new();
    register_builtin(&mut registry);
    registry
}
