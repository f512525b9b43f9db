//! Stack of metadata in scope, such as the current syntax.

use crate::error::RenderError;
use crate::event::{Container, Event};
use crate::metadata::MetaData;

use super::{ChainingListener, Next};

/// Stack of the metadata scopes the stream is inside.
#[derive(Debug, Default)]
pub struct MetaDataState {
    stack: Vec<MetaData>,
}

impl MetaDataState {
    /// Nearest value for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.stack.iter().rev().find_map(|metadata| metadata.get(key))
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}

/// Keeps [`ChainState::metadata`](super::ChainState::metadata) in step with
/// document and metadata containers.
#[derive(Debug, Default)]
pub struct MetaDataStateChainingListener;

impl MetaDataStateChainingListener {
    pub const NAME: &'static str = "metadata-state";
}

impl ChainingListener for MetaDataStateChainingListener {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn on_event(&mut self, event: Event<'_>, next: &mut Next<'_>) -> Result<(), RenderError> {
        if let Event::Begin(Container::Document(metadata) | Container::MetaData(metadata), _) = &event {
            let metadata = metadata.as_ref().clone();
            next.state_mut().metadata.stack.push(metadata);
        }
        let closes = matches!(
            &event,
            Event::End(Container::Document(_) | Container::MetaData(_), _)
        );
        let result = next.emit(event);
        if closes {
            next.state_mut().metadata.stack.pop();
        }
        result
    }
}
