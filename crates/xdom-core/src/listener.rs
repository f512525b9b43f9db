//! The listener capability.

use crate::error::RenderError;
use crate::event::Event;

/// Consumer of the event protocol.
///
/// Implemented by renderers, by the XDOM builder and by listener chains.
/// Errors propagate to whoever is driving the events.
pub trait Listener {
    fn event(&mut self, event: Event<'_>) -> Result<(), RenderError>;
}

impl<L: Listener + ?Sized> Listener for &mut L {
    fn event(&mut self, event: Event<'_>) -> Result<(), RenderError> {
        (**self).event(event)
    }
}

impl<L: Listener + ?Sized> Listener for Box<L> {
    fn event(&mut self, event: Event<'_>) -> Result<(), RenderError> {
        (**self).event(event)
    }
}

/// Records every event it receives.
impl Listener for Vec<Event<'static>> {
    fn event(&mut self, event: Event<'_>) -> Result<(), RenderError> {
        self.push(event.into_owned());
        Ok(())
    }
}
