//! Removal of macro marker events, keeping the generated content.

use crate::error::RenderError;
use crate::event::{Container, Event};

use super::{ChainingListener, Next};

/// Removes macro marker begin/end events, keeping the macro output between
/// them.
#[derive(Debug, Default)]
pub struct MacroMarkerStrippingListener;

impl MacroMarkerStrippingListener {
    pub const NAME: &'static str = "macro-marker-stripping";
}

impl ChainingListener for MacroMarkerStrippingListener {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn on_event(&mut self, event: Event<'_>, next: &mut Next<'_>) -> Result<(), RenderError> {
        match event {
            Event::Begin(Container::MacroMarker(_), _) | Event::End(Container::MacroMarker(_), _) => Ok(()),
            other => next.emit(other),
        }
    }
}
