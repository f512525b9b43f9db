//! Tracking of the enclosing block structure while events stream past.

use crate::error::RenderError;
use crate::event::{Event, EventKind};

use super::{ChainingListener, Next};

/// Where the event stream currently is.
///
/// Maintained by [`BlockStateChainingListener`]: a begin event is recorded
/// before it is forwarded, an end event is removed after it is forwarded, so
/// while a link handles `begin_paragraph` or `end_paragraph` the paragraph
/// is the current container.
#[derive(Debug, Default)]
pub struct BlockState {
    stack: Vec<EventKind>,
    inline_depth: usize,
    previous: Option<EventKind>,
    container_event: bool,
    list_items: Vec<usize>,
    tables: Vec<TableCounters>,
    marker_depth: usize,
}

#[derive(Debug, Default, Clone, Copy)]
struct TableCounters {
    rows: usize,
    cells: usize,
}

/// Containers whose content flows as a line of text.
fn is_inline_container(kind: EventKind) -> bool {
    matches!(
        kind,
        EventKind::Paragraph
            | EventKind::Header
            | EventKind::ListItem
            | EventKind::DefinitionTerm
            | EventKind::DefinitionDescription
            | EventKind::TableCell
            | EventKind::TableHeadCell
            | EventKind::QuotationLine
            | EventKind::FigureCaption
            | EventKind::Format
            | EventKind::Link
    )
}

impl BlockState {
    /// Whether the current event sits inside a line of text.
    #[must_use]
    pub fn is_in_line(&self) -> bool {
        self.inline_depth > 0
    }

    /// Innermost open container.
    #[must_use]
    pub fn current(&self) -> Option<EventKind> {
        self.stack.last().copied()
    }

    /// Container enclosing the event being handled.
    ///
    /// For begin/end events this is the container around the one opening or
    /// closing; for atomic events it is the innermost open container.
    #[must_use]
    pub fn parent_event(&self) -> Option<EventKind> {
        if self.container_event {
            self.stack.iter().rev().nth(1).copied()
        } else {
            self.current()
        }
    }

    /// Last construct that was fully handled (an end or an atomic event).
    #[must_use]
    pub fn previous_event(&self) -> Option<EventKind> {
        self.previous
    }

    /// Number of open containers.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    #[must_use]
    pub fn is_in(&self, kind: EventKind) -> bool {
        self.stack.contains(&kind)
    }

    /// Nesting depth of lists.
    #[must_use]
    pub fn list_depth(&self) -> usize {
        self.list_items.len()
    }

    /// Zero-based index of the current item in the innermost list.
    #[must_use]
    pub fn list_item_index(&self) -> Option<usize> {
        self.list_items.last().and_then(|n| n.checked_sub(1))
    }

    /// Zero-based index of the current row in the innermost table.
    #[must_use]
    pub fn table_row_index(&self) -> Option<usize> {
        self.tables.last().and_then(|t| t.rows.checked_sub(1))
    }

    /// Zero-based index of the current cell in the current row.
    #[must_use]
    pub fn table_cell_index(&self) -> Option<usize> {
        self.tables.last().and_then(|t| t.cells.checked_sub(1))
    }

    /// Whether the stream is inside executed macro output.
    #[must_use]
    pub fn is_in_macro_marker(&self) -> bool {
        self.marker_depth > 0
    }

    fn begin(&mut self, kind: EventKind) {
        self.container_event = true;
        self.stack.push(kind);
        if is_inline_container(kind) {
            self.inline_depth += 1;
        }
        match kind {
            EventKind::List => self.list_items.push(0),
            EventKind::ListItem => {
                if let Some(items) = self.list_items.last_mut() {
                    *items += 1;
                }
            }
            EventKind::Table => self.tables.push(TableCounters::default()),
            EventKind::TableRow => {
                if let Some(table) = self.tables.last_mut() {
                    table.rows += 1;
                    table.cells = 0;
                }
            }
            EventKind::TableCell | EventKind::TableHeadCell => {
                if let Some(table) = self.tables.last_mut() {
                    table.cells += 1;
                }
            }
            EventKind::MacroMarker => self.marker_depth += 1,
            _ => {}
        }
    }

    fn before_end(&mut self) {
        self.container_event = true;
    }

    fn end(&mut self, kind: EventKind) {
        if let Some(index) = self.stack.iter().rposition(|k| *k == kind) {
            self.stack.truncate(index);
        }
        if is_inline_container(kind) {
            self.inline_depth = self.inline_depth.saturating_sub(1);
        }
        match kind {
            EventKind::List => {
                self.list_items.pop();
            }
            EventKind::Table => {
                self.tables.pop();
            }
            EventKind::MacroMarker => self.marker_depth = self.marker_depth.saturating_sub(1),
            _ => {}
        }
        self.previous = Some(kind);
        self.container_event = false;
    }

    fn before_atomic(&mut self) {
        self.container_event = false;
    }

    fn after_atomic(&mut self, kind: EventKind) {
        self.previous = Some(kind);
    }
}

/// Keeps [`ChainState::block`](super::ChainState::block) in step with the stream.
#[derive(Debug, Default)]
pub struct BlockStateChainingListener;

impl BlockStateChainingListener {
    pub const NAME: &'static str = "block-state";
}

impl ChainingListener for BlockStateChainingListener {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn on_event(&mut self, event: Event<'_>, next: &mut Next<'_>) -> Result<(), RenderError> {
        let kind = event.kind();
        match event {
            Event::Begin(..) => {
                next.state_mut().block.begin(kind);
                let result = next.emit(event);
                next.state_mut().block.container_event = false;
                result
            }
            Event::End(..) => {
                next.state_mut().block.before_end();
                let result = next.emit(event);
                next.state_mut().block.end(kind);
                result
            }
            _ => {
                next.state_mut().block.before_atomic();
                next.emit(event)?;
                next.state_mut().block.after_atomic(kind);
                Ok(())
            }
        }
    }
}
