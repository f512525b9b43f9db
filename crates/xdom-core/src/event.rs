//! The event protocol.
//!
//! Every parser emits [`Event`]s and every renderer consumes them. Container
//! constructs produce a `Begin`/`End` pair around their content; atomic
//! constructs produce a single event. Events borrow from the tree they were
//! replayed from; [`Event::into_owned`] detaches them.

use std::borrow::Cow;

use crate::block::{BlockKind, Format, ListType, MacroCall};
use crate::metadata::{MetaData, Parameters};
use crate::reference::ResourceReference;
use crate::syntax::Syntax;

/// Discriminant shared by blocks and events.
///
/// The declaration order indexes [`EVENT_TABLE`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    Document,
    Group,
    Paragraph,
    Section,
    Header,
    List,
    ListItem,
    DefinitionList,
    DefinitionTerm,
    DefinitionDescription,
    Table,
    TableRow,
    TableCell,
    TableHeadCell,
    Quotation,
    QuotationLine,
    Figure,
    FigureCaption,
    Format,
    Link,
    MacroMarker,
    MetaData,
    Macro,
    Word,
    Space,
    SpecialSymbol,
    NewLine,
    EmptyLines,
    HorizontalLine,
    Id,
    Verbatim,
    Raw,
    Image,
}

/// Static description of one event kind.
#[derive(Debug, PartialEq, Eq)]
pub struct EventDescriptor {
    pub kind: EventKind,
    /// Construct name (`paragraph`).
    pub name: &'static str,
    /// Begin event name for containers (`begin_paragraph`).
    pub begin: Option<&'static str>,
    /// End event name for containers (`end_paragraph`).
    pub end: Option<&'static str>,
    /// Event name for atomic constructs (`on_word`).
    pub on: Option<&'static str>,
    /// Payload fields carried by the event, in serialization order.
    pub fields: &'static [&'static str],
}

const PARAMS: &[&str] = &["parameters"];

const fn container(
    kind: EventKind,
    name: &'static str,
    begin: &'static str,
    end: &'static str,
    fields: &'static [&'static str],
) -> EventDescriptor {
    EventDescriptor {
        kind,
        name,
        begin: Some(begin),
        end: Some(end),
        on: None,
        fields,
    }
}

const fn atomic(
    kind: EventKind,
    name: &'static str,
    on: &'static str,
    fields: &'static [&'static str],
) -> EventDescriptor {
    EventDescriptor {
        kind,
        name,
        begin: None,
        end: None,
        on: Some(on),
        fields,
    }
}

/// Every event kind with its shape, indexed by `EventKind as usize`.
pub static EVENT_TABLE: [EventDescriptor; 33] = [
    container(EventKind::Document, "document", "begin_document", "end_document", &["metadata", "parameters"]),
    container(EventKind::Group, "group", "begin_group", "end_group", PARAMS),
    container(EventKind::Paragraph, "paragraph", "begin_paragraph", "end_paragraph", PARAMS),
    container(EventKind::Section, "section", "begin_section", "end_section", PARAMS),
    container(EventKind::Header, "header", "begin_header", "end_header", &["level", "id", "parameters"]),
    container(EventKind::List, "list", "begin_list", "end_list", &["type", "parameters"]),
    container(EventKind::ListItem, "list_item", "begin_list_item", "end_list_item", PARAMS),
    container(EventKind::DefinitionList, "definition_list", "begin_definition_list", "end_definition_list", PARAMS),
    container(EventKind::DefinitionTerm, "definition_term", "begin_definition_term", "end_definition_term", PARAMS),
    container(
        EventKind::DefinitionDescription,
        "definition_description",
        "begin_definition_description",
        "end_definition_description",
        PARAMS,
    ),
    container(EventKind::Table, "table", "begin_table", "end_table", PARAMS),
    container(EventKind::TableRow, "table_row", "begin_table_row", "end_table_row", PARAMS),
    container(EventKind::TableCell, "table_cell", "begin_table_cell", "end_table_cell", PARAMS),
    container(EventKind::TableHeadCell, "table_head_cell", "begin_table_head_cell", "end_table_head_cell", PARAMS),
    container(EventKind::Quotation, "quotation", "begin_quotation", "end_quotation", PARAMS),
    container(EventKind::QuotationLine, "quotation_line", "begin_quotation_line", "end_quotation_line", PARAMS),
    container(EventKind::Figure, "figure", "begin_figure", "end_figure", PARAMS),
    container(EventKind::FigureCaption, "figure_caption", "begin_figure_caption", "end_figure_caption", PARAMS),
    container(EventKind::Format, "format", "begin_format", "end_format", &["format", "parameters"]),
    container(EventKind::Link, "link", "begin_link", "end_link", &["reference", "freestanding", "parameters"]),
    container(
        EventKind::MacroMarker,
        "macro_marker",
        "begin_macro_marker",
        "end_macro_marker",
        &["id", "content", "inline", "parameters"],
    ),
    container(EventKind::MetaData, "metadata", "begin_metadata", "end_metadata", &["metadata"]),
    atomic(EventKind::Macro, "macro", "on_macro", &["id", "content", "inline", "parameters"]),
    atomic(EventKind::Word, "word", "on_word", &["word"]),
    atomic(EventKind::Space, "space", "on_space", &[]),
    atomic(EventKind::SpecialSymbol, "special_symbol", "on_special_symbol", &["symbol"]),
    atomic(EventKind::NewLine, "new_line", "on_new_line", &[]),
    atomic(EventKind::EmptyLines, "empty_lines", "on_empty_lines", &["count"]),
    atomic(EventKind::HorizontalLine, "horizontal_line", "on_horizontal_line", PARAMS),
    atomic(EventKind::Id, "id", "on_id", &["name"]),
    atomic(EventKind::Verbatim, "verbatim", "on_verbatim", &["content", "inline", "parameters"]),
    atomic(EventKind::Raw, "raw", "on_raw_text", &["content", "syntax"]),
    atomic(EventKind::Image, "image", "on_image", &["reference", "freestanding", "id", "parameters"]),
];

impl EventKind {
    #[must_use]
    pub fn descriptor(self) -> &'static EventDescriptor {
        &EVENT_TABLE[self as usize]
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        self.descriptor().name
    }

    /// Whether this kind is replayed as a begin/end pair.
    #[must_use]
    pub fn is_container(self) -> bool {
        self.descriptor().begin.is_some()
    }

    /// All kinds in table order.
    pub fn all() -> impl Iterator<Item = Self> {
        EVENT_TABLE.iter().map(|d| d.kind)
    }
}

/// Payload of a container begin/end event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Container<'a> {
    Document(Cow<'a, MetaData>),
    Group,
    Paragraph,
    Section,
    Header { level: u8, id: Option<Cow<'a, str>> },
    List(ListType),
    ListItem,
    DefinitionList,
    DefinitionTerm,
    DefinitionDescription,
    Table,
    TableRow,
    TableCell,
    TableHeadCell,
    Quotation,
    QuotationLine,
    Figure,
    FigureCaption,
    Format(Format),
    Link {
        reference: Cow<'a, ResourceReference>,
        freestanding: bool,
    },
    MacroMarker(Cow<'a, MacroCall>),
    MetaData(Cow<'a, MetaData>),
}

impl Container<'_> {
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Document(_) => EventKind::Document,
            Self::Group => EventKind::Group,
            Self::Paragraph => EventKind::Paragraph,
            Self::Section => EventKind::Section,
            Self::Header { .. } => EventKind::Header,
            Self::List(_) => EventKind::List,
            Self::ListItem => EventKind::ListItem,
            Self::DefinitionList => EventKind::DefinitionList,
            Self::DefinitionTerm => EventKind::DefinitionTerm,
            Self::DefinitionDescription => EventKind::DefinitionDescription,
            Self::Table => EventKind::Table,
            Self::TableRow => EventKind::TableRow,
            Self::TableCell => EventKind::TableCell,
            Self::TableHeadCell => EventKind::TableHeadCell,
            Self::Quotation => EventKind::Quotation,
            Self::QuotationLine => EventKind::QuotationLine,
            Self::Figure => EventKind::Figure,
            Self::FigureCaption => EventKind::FigureCaption,
            Self::Format(_) => EventKind::Format,
            Self::Link { .. } => EventKind::Link,
            Self::MacroMarker(_) => EventKind::MacroMarker,
            Self::MetaData(_) => EventKind::MetaData,
        }
    }

    #[must_use]
    pub fn into_owned(self) -> Container<'static> {
        match self {
            Self::Document(m) => Container::Document(Cow::Owned(m.into_owned())),
            Self::Group => Container::Group,
            Self::Paragraph => Container::Paragraph,
            Self::Section => Container::Section,
            Self::Header { level, id } => Container::Header {
                level,
                id: id.map(|id| Cow::Owned(id.into_owned())),
            },
            Self::List(t) => Container::List(t),
            Self::ListItem => Container::ListItem,
            Self::DefinitionList => Container::DefinitionList,
            Self::DefinitionTerm => Container::DefinitionTerm,
            Self::DefinitionDescription => Container::DefinitionDescription,
            Self::Table => Container::Table,
            Self::TableRow => Container::TableRow,
            Self::TableCell => Container::TableCell,
            Self::TableHeadCell => Container::TableHeadCell,
            Self::Quotation => Container::Quotation,
            Self::QuotationLine => Container::QuotationLine,
            Self::Figure => Container::Figure,
            Self::FigureCaption => Container::FigureCaption,
            Self::Format(f) => Container::Format(f),
            Self::Link {
                reference,
                freestanding,
            } => Container::Link {
                reference: Cow::Owned(reference.into_owned()),
                freestanding,
            },
            Self::MacroMarker(call) => Container::MacroMarker(Cow::Owned(call.into_owned())),
            Self::MetaData(m) => Container::MetaData(Cow::Owned(m.into_owned())),
        }
    }

    /// Block kind this container builds into.
    #[must_use]
    pub fn into_block_kind(self) -> BlockKind {
        match self {
            Self::Document(m) => BlockKind::Document(m.into_owned()),
            Self::Group => BlockKind::Group,
            Self::Paragraph => BlockKind::Paragraph,
            Self::Section => BlockKind::Section,
            Self::Header { level, id } => BlockKind::Header {
                level,
                id: id.map(Cow::into_owned),
            },
            Self::List(t) => BlockKind::List(t),
            Self::ListItem => BlockKind::ListItem,
            Self::DefinitionList => BlockKind::DefinitionList,
            Self::DefinitionTerm => BlockKind::DefinitionTerm,
            Self::DefinitionDescription => BlockKind::DefinitionDescription,
            Self::Table => BlockKind::Table,
            Self::TableRow => BlockKind::TableRow,
            Self::TableCell => BlockKind::TableCell,
            Self::TableHeadCell => BlockKind::TableHeadCell,
            Self::Quotation => BlockKind::Quotation,
            Self::QuotationLine => BlockKind::QuotationLine,
            Self::Figure => BlockKind::Figure,
            Self::FigureCaption => BlockKind::FigureCaption,
            Self::Format(f) => BlockKind::Format(f),
            Self::Link {
                reference,
                freestanding,
            } => BlockKind::Link {
                reference: reference.into_owned(),
                freestanding,
            },
            Self::MacroMarker(call) => BlockKind::MacroMarker(call.into_owned()),
            Self::MetaData(m) => BlockKind::MetaData(m.into_owned()),
        }
    }
}

/// One call of the event protocol.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event<'a> {
    Begin(Container<'a>, Cow<'a, Parameters>),
    End(Container<'a>, Cow<'a, Parameters>),
    Word(Cow<'a, str>),
    Space,
    SpecialSymbol(char),
    NewLine,
    EmptyLines(usize),
    HorizontalLine(Cow<'a, Parameters>),
    Id(Cow<'a, str>),
    Verbatim {
        content: Cow<'a, str>,
        inline: bool,
        parameters: Cow<'a, Parameters>,
    },
    Raw {
        content: Cow<'a, str>,
        syntax: Cow<'a, Syntax>,
    },
    Image {
        reference: Cow<'a, ResourceReference>,
        freestanding: bool,
        id: Option<Cow<'a, str>>,
        parameters: Cow<'a, Parameters>,
    },
    /// A macro call that has not been executed.
    Macro {
        call: Cow<'a, MacroCall>,
        parameters: Cow<'a, Parameters>,
    },
}

impl<'a> Event<'a> {
    /// Begin event without parameters.
    #[must_use]
    pub fn begin(container: Container<'a>) -> Self {
        Self::Begin(container, Cow::Owned(Parameters::new()))
    }

    /// End event without parameters.
    #[must_use]
    pub fn end(container: Container<'a>) -> Self {
        Self::End(container, Cow::Owned(Parameters::new()))
    }

    #[must_use]
    pub fn word(word: impl Into<Cow<'a, str>>) -> Self {
        Self::Word(word.into())
    }

    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Begin(c, _) | Self::End(c, _) => c.kind(),
            Self::Word(_) => EventKind::Word,
            Self::Space => EventKind::Space,
            Self::SpecialSymbol(_) => EventKind::SpecialSymbol,
            Self::NewLine => EventKind::NewLine,
            Self::EmptyLines(_) => EventKind::EmptyLines,
            Self::HorizontalLine(_) => EventKind::HorizontalLine,
            Self::Id(_) => EventKind::Id,
            Self::Verbatim { .. } => EventKind::Verbatim,
            Self::Raw { .. } => EventKind::Raw,
            Self::Image { .. } => EventKind::Image,
            Self::Macro { .. } => EventKind::Macro,
        }
    }

    /// Protocol name of this call (`begin_paragraph`, `on_word`, ...).
    #[must_use]
    pub fn name(&self) -> &'static str {
        let descriptor = self.kind().descriptor();
        let name = match self {
            Self::Begin(..) => descriptor.begin,
            Self::End(..) => descriptor.end,
            _ => descriptor.on,
        };
        name.unwrap_or(descriptor.name)
    }

    /// Parameters carried by the event, if its kind has any.
    #[must_use]
    pub fn parameters(&self) -> Option<&Parameters> {
        match self {
            Self::Begin(_, p)
            | Self::End(_, p)
            | Self::HorizontalLine(p)
            | Self::Verbatim { parameters: p, .. }
            | Self::Image { parameters: p, .. }
            | Self::Macro { parameters: p, .. } => Some(p),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_begin(&self) -> bool {
        matches!(self, Self::Begin(..))
    }

    #[must_use]
    pub fn is_end(&self) -> bool {
        matches!(self, Self::End(..))
    }

    #[must_use]
    pub fn into_owned(self) -> Event<'static> {
        fn own<T: ToOwned + ?Sized + 'static>(value: Cow<'_, T>) -> Cow<'static, T> {
            Cow::Owned(value.into_owned())
        }

        match self {
            Self::Begin(c, p) => Event::Begin(c.into_owned(), own(p)),
            Self::End(c, p) => Event::End(c.into_owned(), own(p)),
            Self::Word(w) => Event::Word(own(w)),
            Self::Space => Event::Space,
            Self::SpecialSymbol(c) => Event::SpecialSymbol(c),
            Self::NewLine => Event::NewLine,
            Self::EmptyLines(n) => Event::EmptyLines(n),
            Self::HorizontalLine(p) => Event::HorizontalLine(own(p)),
            Self::Id(name) => Event::Id(own(name)),
            Self::Verbatim {
                content,
                inline,
                parameters,
            } => Event::Verbatim {
                content: own(content),
                inline,
                parameters: own(parameters),
            },
            Self::Raw { content, syntax } => Event::Raw {
                content: own(content),
                syntax: own(syntax),
            },
            Self::Image {
                reference,
                freestanding,
                id,
                parameters,
            } => Event::Image {
                reference: own(reference),
                freestanding,
                id: id.map(own),
                parameters: own(parameters),
            },
            Self::Macro { call, parameters } => Event::Macro {
                call: own(call),
                parameters: own(parameters),
            },
        }
    }

    /// Block kind of an atomic event, `None` for begin/end.
    #[must_use]
    pub fn into_atomic_kind(self) -> Option<(BlockKind, Parameters)> {
        let none = Parameters::new;
        Some(match self {
            Self::Begin(..) | Self::End(..) => return None,
            Self::Word(w) => (BlockKind::Word(w.into_owned()), none()),
            Self::Space => (BlockKind::Space, none()),
            Self::SpecialSymbol(c) => (BlockKind::SpecialSymbol(c), none()),
            Self::NewLine => (BlockKind::NewLine, none()),
            Self::EmptyLines(n) => (BlockKind::EmptyLines(n), none()),
            Self::HorizontalLine(p) => (BlockKind::HorizontalLine, p.into_owned()),
            Self::Id(name) => (BlockKind::Id(name.into_owned()), none()),
            Self::Verbatim {
                content,
                inline,
                parameters,
            } => (
                BlockKind::Verbatim {
                    content: content.into_owned(),
                    inline,
                },
                parameters.into_owned(),
            ),
            Self::Raw { content, syntax } => (
                BlockKind::Raw {
                    content: content.into_owned(),
                    syntax: syntax.into_owned(),
                },
                none(),
            ),
            Self::Image {
                reference,
                freestanding,
                id,
                parameters,
            } => (
                BlockKind::Image {
                    reference: reference.into_owned(),
                    freestanding,
                    id: id.map(Cow::into_owned),
                },
                parameters.into_owned(),
            ),
            Self::Macro { call, parameters } => {
                (BlockKind::Macro(call.into_owned()), parameters.into_owned())
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_indexed_by_kind() {
        for (index, descriptor) in EVENT_TABLE.iter().enumerate() {
            assert_eq!(descriptor.kind as usize, index, "{}", descriptor.name);
        }
    }

    #[test]
    fn test_table_shapes_are_exclusive() {
        for descriptor in &EVENT_TABLE {
            assert_eq!(descriptor.begin.is_some(), descriptor.end.is_some());
            assert_ne!(descriptor.begin.is_some(), descriptor.on.is_some());
        }
    }

    #[test]
    fn test_event_names() {
        assert_eq!(Event::begin(Container::Paragraph).name(), "begin_paragraph");
        assert_eq!(Event::end(Container::Paragraph).name(), "end_paragraph");
        assert_eq!(Event::word("x").name(), "on_word");
        assert_eq!(Event::Space.name(), "on_space");
    }

    #[test]
    fn test_into_owned_preserves_payload() {
        let word = String::from("hello");
        let event = Event::Word(Cow::Borrowed(&word));
        let owned = event.clone().into_owned();
        assert_eq!(event, owned);
    }

    #[test]
    fn test_container_flags() {
        assert!(EventKind::Paragraph.is_container());
        assert!(EventKind::MacroMarker.is_container());
        assert!(!EventKind::Macro.is_container());
        assert!(!EventKind::Word.is_container());
        assert_eq!(EventKind::all().count(), EVENT_TABLE.len());
    }
}
