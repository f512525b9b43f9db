//! Elision of containers with no content.

use crate::error::RenderError;
use crate::event::{Event, EventKind};

use super::{ChainingListener, Next};

/// Drops containers that open and close with nothing in between.
///
/// Begin events of elidable containers are held back on a stack. The first
/// event that is neither such a begin nor the end of the innermost held
/// container releases the whole stack in order. A matching end pops and
/// discards the innermost held begin, so nested containers that enclose
/// nothing vanish together.
#[derive(Debug, Default)]
pub struct EmptyBlockChainingListener {
    pending: Vec<Event<'static>>,
}

impl EmptyBlockChainingListener {
    pub const NAME: &'static str = "empty-block";

    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn is_elidable(kind: EventKind) -> bool {
        matches!(
            kind,
            EventKind::Paragraph
                | EventKind::Format
                | EventKind::Group
                | EventKind::Section
                | EventKind::Quotation
                | EventKind::QuotationLine
        )
    }

    fn flush(&mut self, next: &mut Next<'_>) -> Result<(), RenderError> {
        for event in self.pending.drain(..) {
            next.emit(event)?;
        }
        Ok(())
    }
}

impl ChainingListener for EmptyBlockChainingListener {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn on_event(&mut self, event: Event<'_>, next: &mut Next<'_>) -> Result<(), RenderError> {
        let kind = event.kind();
        if event.is_begin() && Self::is_elidable(kind) {
            self.pending.push(event.into_owned());
            return Ok(());
        }
        if event.is_end() && self.pending.last().is_some_and(|p| p.kind() == kind) {
            self.pending.pop();
            return Ok(());
        }
        self.flush(next)?;
        next.emit(event)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::block::{Block, Format};
    use crate::chain::ListenerChain;
    use crate::chain::tests::EventRecorder;

    fn run(tree: &Block) -> Vec<String> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut chain = ListenerChain::new()
            .with(EmptyBlockChainingListener::new())
            .with(EventRecorder(Arc::clone(&seen)));
        tree.traverse(&mut chain).unwrap();
        let out = seen.lock().unwrap().clone();
        out
    }

    #[test]
    fn test_empty_paragraph_is_dropped() {
        let tree = Block::group(vec![Block::word("a"), Block::paragraph(vec![])]);
        assert_eq!(run(&tree), vec!["begin_group", "on_word", "end_group"]);
    }

    #[test]
    fn test_non_empty_paragraph_is_kept() {
        let tree = Block::paragraph(vec![Block::word("a")]);
        assert_eq!(run(&tree), vec!["begin_paragraph", "on_word", "end_paragraph"]);
    }

    #[test]
    fn test_nested_empty_containers_are_dropped() {
        let tree = Block::group(vec![
            Block::word("a"),
            Block::paragraph(vec![Block::format(Format::Bold, vec![Block::format(Format::Italic, vec![])])]),
        ]);
        assert_eq!(run(&tree), vec!["begin_group", "on_word", "end_group"]);
    }

    #[test]
    fn test_content_releases_enclosing_containers_in_order() {
        let tree = Block::paragraph(vec![Block::format(Format::Bold, vec![Block::word("a")])]);
        assert_eq!(
            run(&tree),
            vec!["begin_paragraph", "begin_format", "on_word", "end_format", "end_paragraph"]
        );
    }

    #[test]
    fn test_empty_sibling_inside_kept_container() {
        let tree = Block::paragraph(vec![Block::format(Format::Bold, vec![]), Block::word("a")]);
        assert_eq!(run(&tree), vec!["begin_paragraph", "on_word", "end_paragraph"]);
    }
}
