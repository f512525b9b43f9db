//! Listener chains.
//!
//! A [`ListenerChain`] is an ordered list of [`ChainingListener`]s. Each link
//! receives an event together with a [`Next`] handle and decides whether to
//! forward it, drop it, or emit something else in its place. The last link
//! is normally a renderer's printer.
//!
//! State that several links care about (the container stack, the metadata
//! stack, the output buffer) lives in a [`ChainState`] owned by the chain and
//! handed to every link through [`Next`]. Links that update state do so on
//! the same call that forwards the event, so later links always read state
//! that matches the event they are handling.

mod block_state;
mod empty_block;
mod macro_marker;
mod metadata_state;

use std::fmt;

pub use block_state::{BlockState, BlockStateChainingListener};
pub use empty_block::EmptyBlockChainingListener;
pub use macro_marker::MacroMarkerStrippingListener;
pub use metadata_state::{MetaDataState, MetaDataStateChainingListener};

use crate::error::RenderError;
use crate::event::Event;
use crate::listener::Listener;

/// One link of a [`ListenerChain`].
pub trait ChainingListener: Send {
    /// Name used to locate the link within its chain.
    fn name(&self) -> &'static str;

    /// Handle `event`; call [`Next::emit`] to pass it on.
    fn on_event(&mut self, event: Event<'_>, next: &mut Next<'_>) -> Result<(), RenderError>;
}

/// State shared by all links of one chain.
#[derive(Debug, Default)]
pub struct ChainState {
    pub block: BlockState,
    pub metadata: MetaDataState,
    output: String,
}

impl ChainState {
    /// Append to the chain's output.
    pub fn print(&mut self, text: &str) {
        self.output.push_str(text);
    }

    pub fn print_fmt(&mut self, args: fmt::Arguments<'_>) -> Result<(), RenderError> {
        fmt::Write::write_fmt(&mut self.output, args)?;
        Ok(())
    }

    #[must_use]
    pub fn output(&self) -> &str {
        &self.output
    }

    #[must_use]
    pub fn output_len(&self) -> usize {
        self.output.len()
    }

    /// Remove and return everything printed since `pos`.
    pub fn take_output_from(&mut self, pos: usize) -> String {
        if pos >= self.output.len() {
            return String::new();
        }
        self.output.split_off(pos)
    }

    /// Drop trailing characters matching `pred` from the output.
    pub fn trim_output_end(&mut self, pred: impl Fn(char) -> bool) {
        let trimmed = self.output.trim_end_matches(pred).len();
        self.output.truncate(trimmed);
    }
}

/// The rest of the chain, as seen from one link.
pub struct Next<'c> {
    links: &'c mut [Box<dyn ChainingListener>],
    state: &'c mut ChainState,
}

impl Next<'_> {
    /// Pass `event` to the following link. Past the last link the event is
    /// discarded.
    pub fn emit(&mut self, event: Event<'_>) -> Result<(), RenderError> {
        let Some((head, rest)) = self.links.split_first_mut() else {
            return Ok(());
        };
        let mut next = Next {
            links: rest,
            state: &mut *self.state,
        };
        head.on_event(event, &mut next)
    }

    #[must_use]
    pub fn state(&self) -> &ChainState {
        &*self.state
    }

    pub fn state_mut(&mut self) -> &mut ChainState {
        &mut *self.state
    }

    /// Whether any link follows.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.links.is_empty()
    }
}

/// Ordered pipeline of chaining listeners.
#[derive(Default)]
pub struct ListenerChain {
    links: Vec<Box<dyn ChainingListener>>,
    state: ChainState,
}

impl ListenerChain {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a link (builder style).
    #[must_use]
    pub fn with(mut self, link: impl ChainingListener + 'static) -> Self {
        self.push(Box::new(link));
        self
    }

    pub fn push(&mut self, link: Box<dyn ChainingListener>) {
        self.links.push(link);
    }

    /// Insert `link` ahead of the link named `name`.
    ///
    /// Hands `link` back when no such link exists.
    pub fn insert_before(
        &mut self,
        name: &str,
        link: Box<dyn ChainingListener>,
    ) -> Result<(), Box<dyn ChainingListener>> {
        match self.position(name) {
            Some(index) => {
                self.links.insert(index, link);
                Ok(())
            }
            None => Err(link),
        }
    }

    /// Remove and return the link named `name`.
    pub fn remove(&mut self, name: &str) -> Option<Box<dyn ChainingListener>> {
        let index = self.position(name)?;
        Some(self.links.remove(index))
    }

    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.links.iter().position(|link| link.name() == name)
    }

    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.links.iter().map(|link| link.name()).collect()
    }

    #[must_use]
    pub fn state(&self) -> &ChainState {
        &self.state
    }

    #[must_use]
    pub fn into_output(self) -> String {
        self.state.output
    }
}

impl fmt::Debug for ListenerChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerChain")
            .field("links", &self.names())
            .field("state", &self.state)
            .finish()
    }
}

impl Listener for ListenerChain {
    fn event(&mut self, event: Event<'_>) -> Result<(), RenderError> {
        let mut next = Next {
            links: self.links.as_mut_slice(),
            state: &mut self.state,
        };
        next.emit(event)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::block::{Block, Format};

    /// Terminal link that records event names with the block state seen.
    pub(crate) struct EventRecorder(pub Arc<Mutex<Vec<String>>>);

    impl ChainingListener for EventRecorder {
        fn name(&self) -> &'static str {
            "event-recorder"
        }

        fn on_event(&mut self, event: Event<'_>, next: &mut Next<'_>) -> Result<(), RenderError> {
            let inline = if next.state().block.is_in_line() { " inline" } else { "" };
            self.0.lock().unwrap().push(format!("{}{inline}", event.name()));
            Ok(())
        }
    }

    struct Named(&'static str);

    impl ChainingListener for Named {
        fn name(&self) -> &'static str {
            self.0
        }

        fn on_event(&mut self, event: Event<'_>, next: &mut Next<'_>) -> Result<(), RenderError> {
            next.state_mut().print(self.0);
            next.emit(event)
        }
    }

    struct DropWords;

    impl ChainingListener for DropWords {
        fn name(&self) -> &'static str {
            "drop-words"
        }

        fn on_event(&mut self, event: Event<'_>, next: &mut Next<'_>) -> Result<(), RenderError> {
            match event {
                Event::Word(_) => Ok(()),
                other => next.emit(other),
            }
        }
    }

    struct Failing;

    impl ChainingListener for Failing {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn on_event(&mut self, _event: Event<'_>, _next: &mut Next<'_>) -> Result<(), RenderError> {
            Err(RenderError::Message("boom".to_owned()))
        }
    }

    #[test]
    fn test_links_run_in_order() {
        let mut chain = ListenerChain::new().with(Named("a")).with(Named("b"));

        chain.event(Event::Space).unwrap();

        assert_eq!(chain.into_output(), "ab");
    }

    #[test]
    fn test_link_can_suppress_events() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut chain = ListenerChain::new().with(DropWords).with(EventRecorder(Arc::clone(&seen)));

        Block::paragraph(vec![Block::word("a")]).traverse(&mut chain).unwrap();

        assert_eq!(*seen.lock().unwrap(), vec!["begin_paragraph", "end_paragraph"]);
    }

    #[test]
    fn test_insert_before_and_remove() {
        let mut chain = ListenerChain::new().with(Named("a")).with(Named("c"));

        assert!(chain.insert_before("c", Box::new(Named("b"))).is_ok());
        assert!(chain.insert_before("missing", Box::new(Named("x"))).is_err());
        assert_eq!(chain.names(), vec!["a", "b", "c"]);

        assert!(chain.remove("a").is_some());
        assert!(chain.remove("a").is_none());
        assert_eq!(chain.names(), vec!["b", "c"]);
    }

    #[test]
    fn test_errors_propagate_to_caller() {
        let mut chain = ListenerChain::new().with(Named("a")).with(Failing);

        let err = Block::format(Format::Bold, vec![]).traverse(&mut chain).unwrap_err();

        assert_eq!(err.to_string(), "boom");
        assert_eq!(chain.state().output(), "a");
    }
}
